use std::collections::HashMap;

use super::filter::FilteredView;
use super::model::CostField;

// ---------------------------------------------------------------------------
// Scalar summary
// ---------------------------------------------------------------------------

/// Mean / min / max over the present unit costs of a view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Number of records that carried a cost.
    pub count: usize,
}

/// Outcome of [`summarize`].
///
/// `Undefined` means there was no cost to summarize (empty view, or every
/// cost absent). It is a state to branch on, not an error, and never zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Summary {
    Defined(CostStats),
    #[default]
    Undefined,
}

impl Summary {
    pub fn stats(&self) -> Option<&CostStats> {
        match self {
            Summary::Defined(stats) => Some(stats),
            Summary::Undefined => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Summary::Defined(_))
    }
}

/// Summarize the unit cost column of a view. Absent costs are skipped.
pub fn summarize(view: &FilteredView<'_>) -> Summary {
    let mut count = 0usize;
    let mut mean = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for cost in view.iter().filter_map(|r| r.unit_cost) {
        count += 1;
        // Running mean stays finite for any finite, non-negative costs.
        mean += (cost - mean) / count as f64;
        min = min.min(cost);
        max = max.max(cost);
    }

    if count == 0 {
        return Summary::Undefined;
    }
    Summary::Defined(CostStats {
        mean,
        min,
        max,
        count,
    })
}

// ---------------------------------------------------------------------------
// Grouped means
// ---------------------------------------------------------------------------

/// Mean cost of one group. `mean` is `None` when no record of the group
/// carried a cost.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMean {
    pub key: String,
    pub mean: Option<f64>,
    /// Records in the group, with or without a cost.
    pub records: usize,
}

/// Mean cost per distinct value of `by`, in first-occurrence order.
///
/// Records without a value for `by` belong to no group.
pub fn group_mean(view: &FilteredView<'_>, by: CostField) -> Vec<GroupMean> {
    struct Acc<'k> {
        key: &'k str,
        mean: f64,
        costs: usize,
        records: usize,
    }

    let mut order: Vec<Acc<'_>> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();

    for rec in view.iter() {
        let Some(key) = by.value(rec) else {
            continue;
        };
        let idx = *slot.entry(key).or_insert_with(|| {
            order.push(Acc {
                key,
                mean: 0.0,
                costs: 0,
                records: 0,
            });
            order.len() - 1
        });
        let acc = &mut order[idx];
        acc.records += 1;
        if let Some(cost) = rec.unit_cost {
            acc.costs += 1;
            acc.mean += (cost - acc.mean) / acc.costs as f64;
        }
    }

    order
        .into_iter()
        .map(|acc| GroupMean {
            key: acc.key.to_string(),
            mean: (acc.costs > 0).then_some(acc.mean),
            records: acc.records,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CostRecord;

    fn rec(region: &str, cost: Option<f64>) -> CostRecord {
        CostRecord::new(region, "化工", "VOCs", cost)
    }

    #[test]
    fn summarize_basic() {
        let records = [rec("A", Some(10.0)), rec("B", Some(20.0)), rec("C", Some(30.0))];
        let view: FilteredView = records.iter().collect();
        let stats = *summarize(&view).stats().unwrap();
        assert!((stats.mean - 20.0).abs() < 1e-12);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 30.0);
        assert_eq!(stats.count, 3);
    }

    #[test]
    fn summarize_empty_is_undefined() {
        let view = FilteredView::default();
        assert_eq!(summarize(&view), Summary::Undefined);
    }

    #[test]
    fn absent_costs_are_skipped_not_zeroed() {
        let records = [rec("A", None), rec("A", Some(40.0)), rec("B", None)];
        let view: FilteredView = records.iter().collect();
        let stats = *summarize(&view).stats().unwrap();
        assert_eq!(stats.mean, 40.0);
        assert_eq!(stats.min, 40.0);
        assert_eq!(stats.count, 1);

        let all_absent = [rec("A", None), rec("B", None)];
        let view: FilteredView = all_absent.iter().collect();
        assert!(!summarize(&view).is_defined());
    }

    #[test]
    fn group_mean_keeps_first_occurrence_order() {
        let records = [rec("A", Some(10.0)), rec("B", Some(20.0)), rec("A", Some(30.0))];
        let view: FilteredView = records.iter().collect();
        let groups = group_mean(&view, CostField::Region);
        let pairs: Vec<(&str, Option<f64>)> =
            groups.iter().map(|g| (g.key.as_str(), g.mean)).collect();
        assert_eq!(pairs, vec![("A", Some(20.0)), ("B", Some(20.0))]);
        assert_eq!(groups[0].records, 2);
    }

    #[test]
    fn group_mean_edge_cases() {
        let records = [
            rec("B", None),
            CostRecord {
                region: None,
                ..rec("", Some(99.0))
            },
            rec("A", Some(5.0)),
            rec("B", None),
        ];
        let view: FilteredView = records.iter().collect();
        let groups = group_mean(&view, CostField::Region);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "B");
        assert_eq!(groups[0].mean, None);
        assert_eq!(groups[0].records, 2);
        assert_eq!(groups[1].mean, Some(5.0));

        assert!(group_mean(&FilteredView::default(), CostField::Industry).is_empty());
    }

    #[test]
    fn huge_costs_keep_a_finite_mean() {
        let records = [
            rec("A", Some(f64::MAX)),
            rec("A", Some(f64::MAX)),
            rec("B", Some(f64::MAX / 2.0)),
        ];
        let view: FilteredView = records.iter().collect();

        let stats = *summarize(&view).stats().unwrap();
        assert!(stats.mean.is_finite());
        assert!(stats.mean <= stats.max && stats.mean >= stats.min);

        let groups = group_mean(&view, CostField::Region);
        assert_eq!(groups[0].mean, Some(f64::MAX));
        assert_eq!(groups[1].mean, Some(f64::MAX / 2.0));
    }
}
