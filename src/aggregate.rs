use crate::types::{Category, Condition, InfrastructureRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// Chart counts over a filtered subset. Every fixed label is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aggregates {
    pub category_counts: BTreeMap<Category, usize>,
    pub condition_counts: BTreeMap<Condition, usize>,
}

impl Aggregates {
    pub fn total(&self) -> usize {
        self.category_counts.values().sum()
    }

    pub fn category(&self, category: Category) -> usize {
        self.category_counts.get(&category).copied().unwrap_or(0)
    }

    pub fn condition(&self, condition: Condition) -> usize {
        self.condition_counts.get(&condition).copied().unwrap_or(0)
    }
}

pub fn aggregate<'a, I>(subset: I) -> Aggregates
where
    I: IntoIterator<Item = &'a InfrastructureRecord>,
{
    let mut category_counts: BTreeMap<Category, usize> = Category::ALL.iter().map(|&c| (c, 0)).collect();
    let mut condition_counts: BTreeMap<Condition, usize> = Condition::ALL.iter().map(|&c| (c, 0)).collect();

    for record in subset {
        *category_counts.entry(record.category).or_insert(0) += 1;
        *condition_counts.entry(record.attributes.condition).or_insert(0) += 1;
    }

    Aggregates {
        category_counts,
        condition_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dataset;
    use crate::filter::{compute_subset, FilterState};

    #[test]
    fn empty_subset_reports_every_label() {
        let aggregates = aggregate(std::iter::empty::<&InfrastructureRecord>());
        assert_eq!(aggregates.category_counts.len(), Category::ALL.len());
        assert_eq!(aggregates.condition_counts.len(), Condition::ALL.len());
        assert_eq!(aggregates.total(), 0);
    }

    #[test]
    fn hospital_only_counts() {
        let dataset = Dataset::builtin().unwrap();
        let filter = FilterState::new().toggled(Category::Hospital);
        let aggregates = aggregate(compute_subset(&dataset, &filter));
        assert_eq!(aggregates.category(Category::Hospital), 6);
        assert_eq!(aggregates.category(Category::School), 0);
        assert_eq!(aggregates.condition(Condition::Good), 3);
        assert_eq!(aggregates.condition(Condition::Fair), 2);
        assert_eq!(aggregates.condition(Condition::Poor), 1);
    }

    #[test]
    fn both_dimensions_sum_to_subset_size() {
        let dataset = Dataset::builtin().unwrap();
        for filter in [
            FilterState::new(),
            FilterState::new().toggled(Category::School),
            FilterState::new().toggled(Category::Hospital).toggled(Category::School),
        ] {
            let subset = compute_subset(&dataset, &filter);
            let aggregates = aggregate(subset.iter().copied());
            assert_eq!(aggregates.total(), subset.len());
            assert_eq!(aggregates.condition_counts.values().sum::<usize>(), subset.len());
        }
    }
}
