use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SortKey {
    pub column: usize,
    pub direction: SortDirection,
}

/// Filter and sort configuration of the current view.
///
/// `sort` is ordered by priority: the first key decides, later keys break ties.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewConfig {
    pub filter: BTreeMap<usize, String>,
    pub sort: Vec<SortKey>,
    pub version: u64,
}

impl ViewConfig {
    /// No filter and no sort: the dataset is shown in natural order.
    pub fn is_empty(&self) -> bool {
        self.filter.is_empty() && self.sort.is_empty()
    }

    pub fn filter_for(&self, column: usize) -> Option<&str> {
        self.filter.get(&column).map(String::as_str)
    }

    pub fn sort_for(&self, column: usize) -> Option<SortDirection> {
        self.sort
            .iter()
            .find(|k| k.column == column)
            .map(|k| k.direction)
    }

    /// Sets or clears the query of `column`. An empty query clears.
    ///
    /// Returns `true` if the configuration changed.
    pub fn set_filter(&mut self, column: usize, query: Option<&str>) -> bool {
        match query {
            Some(q) if !q.is_empty() => {
                if self.filter.get(&column).is_some_and(|cur| cur == q) {
                    return false;
                }
                self.filter.insert(column, q.to_owned());
                true
            }
            _ => self.filter.remove(&column).is_some(),
        }
    }

    /// Cycles `column` through none → descending → ascending → none.
    ///
    /// A newly sorted column is appended with the lowest priority; removing a column keeps the
    /// relative priority of the others. Returns the column's new direction.
    pub fn toggle_sort(&mut self, column: usize) -> Option<SortDirection> {
        match self.sort.iter().position(|k| k.column == column) {
            None => {
                self.sort.push(SortKey {
                    column,
                    direction: SortDirection::Descending,
                });
                Some(SortDirection::Descending)
            }
            Some(i) if self.sort[i].direction == SortDirection::Descending => {
                self.sort[i].direction = SortDirection::Ascending;
                Some(SortDirection::Ascending)
            }
            Some(i) => {
                self.sort.remove(i);
                None
            }
        }
    }
}
