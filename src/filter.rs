//! Category filter over the dataset.
//!
//! An empty active set means "no filter": every record is visible.

use crate::data::Dataset;
use crate::types::{Category, InfrastructureRecord};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterState {
    active: BTreeSet<Category>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle `category` in the active set and return the new state.
    pub fn toggled(&self, category: Category) -> Self {
        let mut active = self.active.clone();
        if !active.remove(&category) {
            active.insert(category);
        }
        Self { active }
    }

    pub fn is_active(&self, category: Category) -> bool {
        self.active.contains(&category)
    }

    /// True when no category is active, i.e. everything is shown.
    pub fn is_unfiltered(&self) -> bool {
        self.active.is_empty()
    }

    pub fn is_visible(&self, record: &InfrastructureRecord) -> bool {
        self.active.is_empty() || self.active.contains(&record.category)
    }
}

impl FromIterator<Category> for FilterState {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        Self {
            active: iter.into_iter().collect(),
        }
    }
}

/// Records visible under `filter`, in dataset order.
pub fn compute_subset<'a>(dataset: &'a Dataset, filter: &FilterState) -> Vec<&'a InfrastructureRecord> {
    dataset.records().iter().filter(|r| filter.is_visible(r)).collect()
}
