//! Table reconstruction.
//!
//! Diffs address cells as `table:row,col` and whole rows as `table:row` or
//! `table:row,-1`. A `parent:<table>` path on the rendered side inserts an
//! empty placeholder row at the origin row's index. A diff naming a table
//! that the rendered side does not have is fatal: without it the rows of
//! the two sides cannot be lined up.

use log::{debug, trace};
use rustc_hash::FxHashMap;

use super::markup::{escape, Marker};
use super::{insertion_plan, side_messages, Highlighted, Reconstructor, RenderedSide};
use crate::constants::{COMBINED_SEPARATOR_LABEL, SEPARATOR_CLASS};
use crate::error::{Error, Result};
use crate::message::{DiffMessage, Side, SideMessage};
use crate::path::{PathStyle, TableCoordinate};
use crate::rules::HighlightRules;
use crate::table::{Table, TableSet};

/// One rendered row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedRow {
    pub cells: Vec<String>,
    pub marker: Option<Marker>,
    pub cell_markers: FxHashMap<usize, Marker>,
    /// Row index in the source table; `None` for placeholders.
    pub source_row: Option<usize>,
}

impl MarkedRow {
    fn original(index: usize, cells: &[String]) -> Self {
        MarkedRow {
            cells: cells.to_vec(),
            marker: None,
            cell_markers: FxHashMap::default(),
            source_row: Some(index),
        }
    }

    fn placeholder(width: usize, marker: Marker) -> Self {
        MarkedRow {
            cells: vec![String::new(); width],
            marker: Some(marker),
            cell_markers: FxHashMap::default(),
            source_row: None,
        }
    }

    fn mark_cell(&mut self, column: usize, marker: Marker) {
        self.cell_markers.entry(column).or_insert(marker);
    }
}

/// A table with its markers and placeholders applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedTable {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<MarkedRow>,
}

impl MarkedTable {
    fn width(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.cells.len())
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0)
    }

    fn write_header(&self, out: &mut String) {
        out.push_str("<thead><tr>");
        for h in &self.header {
            out.push_str(&format!("<th>{}</th>", escape(h)));
        }
        out.push_str("</tr></thead>");
    }

    fn write_rows(&self, out: &mut String) {
        for row in &self.rows {
            match &row.marker {
                Some(m) => out.push_str(&format!("<tr{}>", m.attributes())),
                None => out.push_str("<tr>"),
            }
            for (i, cell) in row.cells.iter().enumerate() {
                let attributes = row
                    .cell_markers
                    .get(&i)
                    .map(Marker::attributes)
                    .unwrap_or_default();
                out.push_str(&format!("<td{attributes}>{}</td>", escape(cell)));
            }
            out.push_str("</tr>");
        }
    }

    /// Renders the table as HTML.
    pub fn to_html(&self) -> String {
        let mut out = format!("<table data-name=\"{}\">", escape(&self.name));
        self.write_header(&mut out);
        out.push_str("<tbody>");
        self.write_rows(&mut out);
        out.push_str("</tbody></table>");
        out
    }
}

/// State of one table while diffs are attached.
struct TableBuilder<'a> {
    table: &'a Table,
    rows: Vec<MarkedRow>,
    /// Placeholder rows by origin row index.
    pending: Vec<(usize, MarkedRow)>,
    /// Origin row of the last insertion, and its index in `pending`.
    last_insertion: Option<(usize, usize)>,
}

impl<'a> TableBuilder<'a> {
    fn new(table: &'a Table) -> Self {
        TableBuilder {
            table,
            rows: table
                .rows
                .iter()
                .enumerate()
                .map(|(i, r)| MarkedRow::original(i, r))
                .collect(),
            pending: Vec::new(),
            last_insertion: None,
        }
    }

    fn finish(self) -> MarkedTable {
        let mut rows = self.rows;
        let len = rows.len();
        for (index, row) in insertion_plan(self.pending, len) {
            rows.insert(index, row);
            trace!("inserted placeholder row in {} at {index}", self.table.name);
        }
        MarkedTable {
            name: self.table.name.clone(),
            header: self.table.header.clone(),
            rows,
        }
    }
}

/// Highlights named tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableReconstructor;

impl TableReconstructor {
    fn parse(raw: &str, rules: &HighlightRules) -> Result<TableSet> {
        TableSet::parse(&rules.apply_replacements(raw))
    }

    /// Attaches the messages of one side to its tables.
    pub fn annotate(
        tables: &TableSet,
        other: &TableSet,
        messages: &[SideMessage],
        rules: &HighlightRules,
    ) -> Result<Vec<MarkedTable>> {
        let mut builders: Vec<TableBuilder<'_>> =
            tables.tables().iter().map(TableBuilder::new).collect();
        let by_name: FxHashMap<&str, usize> = tables
            .tables()
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.as_str(), i))
            .collect();
        let lookup = |name: &str| {
            by_name.get(name).copied().ok_or_else(|| {
                Error::Comparator(format!("diff refers to unknown table {name:?}"))
            })
        };

        for msg in messages {
            if let Some(table_name) = msg.insertion_parent() {
                let builder = &mut builders[lookup(table_name)?];
                Self::plan_row(builder, other, msg);
                continue;
            }

            let Some(coordinate) = TableCoordinate::parse(&msg.own_path) else {
                debug!("diff {}: malformed coordinate {:?}", msg.order_id, msg.own_path);
                continue;
            };
            let builder = &mut builders[lookup(&coordinate.table)?];
            let table = builder.table;
            let Some(row) = builder.rows.get_mut(coordinate.row) else {
                debug!("diff {}: no row {} in {}", msg.order_id, coordinate.row, table.name);
                continue;
            };
            match coordinate.column {
                None => {
                    if row.marker.is_none() {
                        row.marker = Some(Marker::from_message(msg));
                    }
                }
                Some(column) => {
                    let header = table.header.get(column).map(String::as_str).unwrap_or("");
                    if !rules.column_allowed(coordinate.check.as_deref(), header) {
                        debug!("diff {}: column {header:?} is filtered out", msg.order_id);
                        continue;
                    }
                    if column >= row.cells.len() {
                        debug!("diff {}: no column {column} in {}", msg.order_id, table.name);
                        continue;
                    }
                    row.mark_cell(column, Marker::from_message(msg));
                }
            }
        }

        Ok(builders.into_iter().map(TableBuilder::finish).collect())
    }

    /// Queues a placeholder row for an insertion diff.
    ///
    /// Cell-level diffs on the row that was just inserted, carrying no
    /// report message of their own, refine that row instead of adding
    /// another one.
    fn plan_row(builder: &mut TableBuilder<'_>, other: &TableSet, msg: &SideMessage) {
        let Some(origin) = TableCoordinate::parse(&msg.other_path) else {
            debug!("diff {}: malformed origin {:?}", msg.order_id, msg.other_path);
            return;
        };

        if let (Some((last_row, slot)), Some(column)) = (builder.last_insertion, origin.column) {
            if last_row == origin.row && origin.report.is_none() {
                let (_, row) = &mut builder.pending[slot];
                if column < row.cells.len() {
                    row.mark_cell(column, Marker::from_message(msg));
                }
                return;
            }
        }

        let width = other
            .get(&origin.table)
            .and_then(|t| t.rows.get(origin.row))
            .map(Vec::len)
            .unwrap_or_else(|| builder.table.width());
        let mut row = MarkedRow::placeholder(width, Marker::from_message(msg));
        if let Some(column) = origin.column.filter(|c| *c < width) {
            row.mark_cell(column, Marker::from_message(msg));
        }
        builder.last_insertion = Some((origin.row, builder.pending.len()));
        builder.pending.push((origin.row, row));
    }

    fn render(tables: &[MarkedTable]) -> String {
        tables.iter().map(MarkedTable::to_html).collect()
    }

    /// Expected and actual tables in one view, separated by a labeled row.
    fn combine(er: &[MarkedTable], ar: &[MarkedTable]) -> String {
        if er.len() != ar.len() {
            return format!(
                "<p class=\"{SEPARATOR_CLASS}\">Cannot combine: expected has {} table(s), \
                 actual has {}.</p>",
                er.len(),
                ar.len()
            );
        }
        let mut out = String::new();
        for (e, a) in er.iter().zip(ar) {
            let width = e.width().max(a.width()).max(1);
            out.push_str(&format!("<table data-name=\"{}\">", escape(&e.name)));
            e.write_header(&mut out);
            out.push_str("<tbody>");
            e.write_rows(&mut out);
            out.push_str(&format!(
                "<tr class=\"{SEPARATOR_CLASS}\"><td colspan=\"{width}\">\
                 {COMBINED_SEPARATOR_LABEL}</td></tr>"
            ));
            a.write_rows(&mut out);
            out.push_str("</tbody></table>");
        }
        out
    }
}

impl Reconstructor for TableReconstructor {
    fn highlight(
        &self,
        diffs: &[DiffMessage],
        expected: &str,
        actual: &str,
        rules: &HighlightRules,
    ) -> Result<Highlighted> {
        let expected = Self::parse(expected, rules)?;
        let actual = Self::parse(actual, rules)?;

        let er_messages = side_messages(diffs, Side::Expected, rules, PathStyle::Table);
        let ar_messages = side_messages(diffs, Side::Actual, rules, PathStyle::Table);

        let er = Self::annotate(&expected, &actual, &er_messages, rules)?;
        let ar = Self::annotate(&actual, &expected, &ar_messages, rules)?;

        Ok(Highlighted {
            combined: Some(Self::combine(&er, &ar)),
            er: RenderedSide::Html(Self::render(&er)),
            ar: RenderedSide::Html(Self::render(&ar)),
        })
    }
}
