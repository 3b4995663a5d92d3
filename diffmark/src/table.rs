//! Named tables parsed from JSON.
//!
//! A table document is either an object mapping table names to tables, or
//! an array of tables carrying their own `name`:
//!
//! ```json
//! {"orders": {"header": ["id", "qty"], "rows": [["1", "5"]]}}
//! [{"name": "orders", "header": ["id", "qty"], "rows": [["1", 5]]}]
//! ```
//!
//! Non-string cells are stored in their JSON text form; `null` becomes an
//! empty cell.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// One named grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Number of columns: the header width, or the widest row.
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0)
    }
}

/// All tables of one side, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSet {
    tables: Vec<Table>,
}

#[derive(Deserialize)]
struct RawTable {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    header: Vec<Value>,
    #[serde(default)]
    rows: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTableSet {
    Named(serde_json::Map<String, Value>),
    List(Vec<RawTable>),
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl RawTable {
    fn into_table(self, name: String) -> Table {
        Table {
            name,
            header: self.header.into_iter().map(cell_text).collect(),
            rows: self
                .rows
                .into_iter()
                .map(|r| r.into_iter().map(cell_text).collect())
                .collect(),
        }
    }
}

impl TableSet {
    /// Parses a table document. Blank input yields no tables.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(TableSet::default());
        }
        let tables = match serde_json::from_str::<RawTableSet>(raw)? {
            RawTableSet::Named(map) => map
                .into_iter()
                .map(|(name, value)| {
                    let raw: RawTable = serde_json::from_value(value)?;
                    Ok(raw.into_table(name))
                })
                .collect::<Result<Vec<_>>>()?,
            RawTableSet::List(list) => list
                .into_iter()
                .enumerate()
                .map(|(i, raw)| {
                    let name = raw.name.clone().unwrap_or_else(|| format!("table{}", i + 1));
                    raw.into_table(name)
                })
                .collect(),
        };
        let mut set = TableSet::default();
        for table in tables {
            if set.get(&table.name).is_some() {
                return Err(Error::Parse(format!("duplicate table name {:?}", table.name)));
            }
            set.tables.push(table);
        }
        Ok(set)
    }

    /// Returns the tables in order.
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Looks up a table by name.
    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Number of tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if there are no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
