// src/aggregate/mod.rs
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{Result, RoamingError};
use crate::load::{utils::parse_number, Table};

/// What an [`AggregateSeries`] measures for each group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Measure {
    /// Number of rows in the group.
    Count,
    /// Sum of `column` over the rows in the group.
    Sum { column: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesEntry {
    pub key: String,
    pub value: f64,
}

/// Group key → value, ordered by value descending. Groups with equal values
/// keep the order in which their key first appeared in the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSeries {
    pub group_column: String,
    pub measure: Measure,
    entries: Vec<SeriesEntry>,
}

impl AggregateSeries {
    /// Wrap entries as given. No ordering or uniqueness is enforced here;
    /// the chart builder validates what it is handed.
    pub fn from_entries(group_column: &str, measure: Measure, entries: Vec<SeriesEntry>) -> Self {
        Self {
            group_column: group_column.to_string(),
            measure,
            entries,
        }
    }

    pub fn entries(&self) -> &[SeriesEntry] {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|e| e.value)
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries.iter().find(|e| e.key == key).map(|e| e.value)
    }

    pub fn total(&self) -> f64 {
        self.values().sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Accumulates per-group values in first-seen key order.
struct Groups {
    index: HashMap<String, usize>,
    entries: Vec<SeriesEntry>,
}

impl Groups {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    fn add(&mut self, key: &str, amount: f64) {
        match self.index.get(key) {
            Some(&i) => self.entries[i].value += amount,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push(SeriesEntry {
                    key: key.to_string(),
                    value: amount,
                });
            }
        }
    }

    /// Stable sort, so ties stay in first-seen order.
    fn into_sorted(mut self) -> Vec<SeriesEntry> {
        self.entries.sort_by(|a, b| b.value.total_cmp(&a.value));
        self.entries
    }
}

/// Row count per distinct non-empty value of `column`.
pub fn count_by(table: &Table, column: &str) -> Result<AggregateSeries> {
    let idx = table.column_index(column)?;

    let mut groups = Groups::new();
    for row in table.rows() {
        let key = row[idx].as_str();
        if key.is_empty() {
            continue;
        }
        groups.add(key, 1.0);
    }

    let entries = groups.into_sorted();
    debug!(column, groups = entries.len(), "count_by");
    Ok(AggregateSeries::from_entries(column, Measure::Count, entries))
}

/// Sum of `value_column` per distinct non-empty value of `column`.
///
/// Missing value cells add nothing. Any other cell that is not a finite
/// number fails the whole aggregation.
pub fn sum_by(table: &Table, column: &str, value_column: &str) -> Result<AggregateSeries> {
    let idx = table.column_index(column)?;
    let value_idx = table.column_index(value_column)?;

    let mut groups = Groups::new();
    for (row_no, row) in table.rows().iter().enumerate() {
        let key = row[idx].as_str();
        if key.is_empty() {
            continue;
        }
        let cell = row[value_idx].as_str();
        let amount = if cell.is_empty() {
            0.0
        } else {
            parse_number(cell).ok_or_else(|| {
                RoamingError::data_format(format!(
                    "non-numeric value {:?} in column `{}` at row {}",
                    cell,
                    value_column,
                    row_no + 1
                ))
            })?
        };
        groups.add(key, amount);
    }

    let entries = groups.into_sorted();
    debug!(column, value_column, groups = entries.len(), "sum_by");
    Ok(AggregateSeries::from_entries(
        column,
        Measure::Sum {
            column: value_column.to_string(),
        },
        entries,
    ))
}
