use core::fmt;

pub type RowId = u64;
pub type CellId = u64;

/// A cell value as loaded from the host. Filtering and sorting operate on this directly.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub id: CellId,
    pub value: CellValue,
}

impl Cell {
    pub fn new(id: CellId, value: impl Into<CellValue>) -> Self {
        Self {
            id,
            value: value.into(),
        }
    }
}

/// A dataset row. `cells` is in column order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Row {
    pub id: RowId,
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(id: RowId, cells: Vec<Cell>) -> Self {
        Self { id, cells }
    }

    /// Builds a row whose cell ids are derived from the row id and column index.
    ///
    /// Ids are `id * columns + column`, which keeps them unique across a dataset as long as
    /// every row uses the same column count.
    pub fn from_values<V: Into<CellValue>>(id: RowId, values: impl IntoIterator<Item = V>) -> Self {
        let values: Vec<CellValue> = values.into_iter().map(Into::into).collect();
        let columns = values.len() as u64;
        let cells = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| Cell {
                id: id.saturating_mul(columns).saturating_add(i as u64),
                value,
            })
            .collect();
        Self { id, cells }
    }

    pub fn cell(&self, column: usize) -> Option<&Cell> {
        self.cells.get(column)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    Horizontal,
    Vertical,
}
