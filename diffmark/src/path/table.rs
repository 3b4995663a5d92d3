//! `<table>:<row>[,<col>][:<check>][:<report>]` cell coordinates.

use crate::constants::WHOLE_ROW;

/// A parsed table coordinate. Row and column ids are 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCoordinate {
    pub table: String,
    pub row: usize,
    /// `None` addresses the whole row (`-1` or absent in the source).
    pub column: Option<usize>,
    pub check: Option<String>,
    pub report: Option<String>,
}

impl TableCoordinate {
    /// Parses a coordinate; `None` if malformed.
    pub fn parse(coordinate: &str) -> Option<TableCoordinate> {
        let mut parts = coordinate.trim().splitn(4, ':');
        let table = parts.next()?.trim();
        if table.is_empty() {
            return None;
        }

        let cell = parts.next()?.trim();
        let (row, column) = match cell.split_once(',') {
            Some((r, c)) => (r.trim(), Some(c.trim())),
            None => (cell, None),
        };
        let row: usize = row.parse().ok()?;
        let column = match column {
            None => None,
            Some(c) => {
                let c: i64 = c.parse().ok()?;
                if c == WHOLE_ROW {
                    None
                } else {
                    Some(usize::try_from(c).ok()?)
                }
            }
        };

        let non_empty = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        let check = parts.next().and_then(non_empty);
        let report = parts.next().and_then(non_empty);

        Some(TableCoordinate {
            table: table.to_string(),
            row,
            column,
            check,
            report,
        })
    }

    /// Returns true if the coordinate addresses a whole row.
    pub fn is_row(&self) -> bool {
        self.column.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell() {
        let c = TableCoordinate::parse("orders:3,2").unwrap();
        assert_eq!(c.table, "orders");
        assert_eq!(c.row, 3);
        assert_eq!(c.column, Some(2));
        assert!(c.check.is_none());
    }

    #[test]
    fn test_row_with_check_and_report() {
        let c = TableCoordinate::parse("orders:0,-1:amounts:row: not found").unwrap();
        assert!(c.is_row());
        assert_eq!(c.check.as_deref(), Some("amounts"));
        assert_eq!(c.report.as_deref(), Some("row: not found"));

        let bare = TableCoordinate::parse("orders:5").unwrap();
        assert!(bare.is_row());
    }

    #[test]
    fn test_malformed() {
        assert!(TableCoordinate::parse("orders").is_none());
        assert!(TableCoordinate::parse(":1,1").is_none());
        assert!(TableCoordinate::parse("orders:x,1").is_none());
        assert!(TableCoordinate::parse("orders:1,-2").is_none());
    }
}
