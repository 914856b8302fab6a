use std::fmt::Write as _;

use crate::{Cancelled, Row};

/// Rows between two cancellation checks.
const CANCEL_CHECK_INTERVAL: usize = 1024;

/// A compiled filter: one lowercased query per configured column.
#[derive(Clone, Debug, Default)]
pub struct RowFilter {
    queries: Vec<(usize, String)>,
}

impl RowFilter {
    pub fn new<'a>(filter: impl IntoIterator<Item = (&'a usize, &'a String)>) -> Self {
        Self {
            queries: filter
                .into_iter()
                .filter(|(_, q)| !q.is_empty())
                .map(|(&column, q)| (column, q.to_lowercase()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Case-insensitive substring match of every configured column against the stringified
    /// cell value. A row missing a filtered column does not match.
    pub fn matches(&self, row: &Row, scratch: &mut String) -> bool {
        self.queries.iter().all(|(column, query)| {
            let Some(cell) = row.cell(*column) else {
                return false;
            };
            scratch.clear();
            // Writing into a String cannot fail.
            let _ = write!(scratch, "{}", cell.value);
            contains_ignore_case(scratch, query)
        })
    }

    /// Returns the positions of the rows that pass, in natural order.
    pub fn apply(
        &self,
        rows: &[Row],
        mut should_cancel: impl FnMut() -> bool,
    ) -> Result<Vec<u32>, Cancelled> {
        if self.is_empty() {
            return Ok((0..rows.len() as u32).collect());
        }
        let mut out = Vec::new();
        let mut scratch = String::new();
        for (pos, row) in rows.iter().enumerate() {
            if pos % CANCEL_CHECK_INTERVAL == 0 && should_cancel() {
                return Err(Cancelled);
            }
            if self.matches(row, &mut scratch) {
                out.push(pos as u32);
            }
        }
        Ok(out)
    }
}

fn contains_ignore_case(haystack: &str, lowered_needle: &str) -> bool {
    if haystack.is_ascii() {
        let needle = lowered_needle.as_bytes();
        if needle.is_empty() {
            return true;
        }
        return haystack
            .as_bytes()
            .windows(needle.len())
            .any(|w| w.eq_ignore_ascii_case(needle));
    }
    haystack.to_lowercase().contains(lowered_needle)
}
