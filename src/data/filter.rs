use super::model::{CostField, CostRecord, RecordStore};

// ---------------------------------------------------------------------------
// Filter predicate: one criterion per label column
// ---------------------------------------------------------------------------

/// Constraint on a single column.
///
/// `Unconstrained` is its own variant rather than a reserved string, so a
/// data value spelled "All" (or "全部") filters like any other value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Criterion {
    #[default]
    Unconstrained,
    Equals(String),
}

impl Criterion {
    pub fn equals(value: impl Into<String>) -> Self {
        Criterion::Equals(value.into())
    }

    /// Exact, case-sensitive match. An absent value only passes when the
    /// column is unconstrained.
    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            Criterion::Unconstrained => true,
            Criterion::Equals(expected) => value == Some(expected.as_str()),
        }
    }
}

/// Per-column selection state for the three label columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub region: Criterion,
    pub industry: Criterion,
    pub pollutant_type: Criterion,
}

impl FilterCriteria {
    /// Criteria that constrain nothing.
    pub fn unconstrained() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, field: CostField, criterion: Criterion) -> Self {
        *self.get_mut(field) = criterion;
        self
    }

    pub fn get(&self, field: CostField) -> &Criterion {
        match field {
            CostField::Region => &self.region,
            CostField::Industry => &self.industry,
            CostField::PollutantType => &self.pollutant_type,
        }
    }

    pub fn get_mut(&mut self, field: CostField) -> &mut Criterion {
        match field {
            CostField::Region => &mut self.region,
            CostField::Industry => &mut self.industry,
            CostField::PollutantType => &mut self.pollutant_type,
        }
    }

    /// A record passes when every column criterion matches (logical AND).
    pub fn matches(&self, record: &CostRecord) -> bool {
        CostField::ALL
            .iter()
            .all(|&field| self.get(field).matches(field.value(record)))
    }
}

// ---------------------------------------------------------------------------
// FilteredView – ordered, borrowed subset of a store
// ---------------------------------------------------------------------------

/// Records of a [`RecordStore`] that satisfied a set of criteria, in store
/// order. Built per request and dropped after use.
#[derive(Debug, Clone, Default)]
pub struct FilteredView<'a> {
    records: Vec<&'a CostRecord>,
}

impl<'a> FilteredView<'a> {
    pub fn records(&self) -> &[&'a CostRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a CostRecord> + '_ {
        self.records.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> FromIterator<&'a CostRecord> for FilteredView<'a> {
    fn from_iter<I: IntoIterator<Item = &'a CostRecord>>(iter: I) -> Self {
        FilteredView {
            records: iter.into_iter().collect(),
        }
    }
}

/// Return indices of records that pass all criteria.
pub fn filtered_indices(store: &RecordStore, criteria: &FilterCriteria) -> Vec<usize> {
    store
        .iter()
        .enumerate()
        .filter(|(_, rec)| criteria.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

/// Apply `criteria` to the whole store. An empty result is valid.
pub fn filter<'a>(store: &'a RecordStore, criteria: &FilterCriteria) -> FilteredView<'a> {
    store.iter().filter(|rec| criteria.matches(rec)).collect()
}

/// Materialise a view from previously computed indices.
pub fn view_from_indices<'a>(store: &'a RecordStore, indices: &[usize]) -> FilteredView<'a> {
    indices.iter().filter_map(|&i| store.get(i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RecordStore {
        RecordStore::from_records(vec![
            CostRecord::new("A", "化工", "VOCs", Some(10.0)),
            CostRecord::new("B", "化工", "SOx", Some(20.0)),
            CostRecord::new("A", "电力", "SOx", Some(30.0)),
            CostRecord::new("All", "电力", "VOCs", None),
            CostRecord {
                region: None,
                ..CostRecord::new("", "化工", "VOCs", Some(5.0))
            },
        ])
    }

    #[test]
    fn unconstrained_returns_whole_store_in_order() {
        let store = store();
        let view = filter(&store, &FilterCriteria::unconstrained());
        assert_eq!(view.len(), store.len());
        for (a, b) in view.iter().zip(store.iter()) {
            assert!(std::ptr::eq(a, b));
        }
    }

    #[test]
    fn every_combination_partitions_the_store() {
        let store = store();
        let mut options: Vec<Vec<Criterion>> = Vec::new();
        for field in CostField::ALL {
            let mut opts = vec![Criterion::Unconstrained];
            opts.extend(store.distinct(field).iter().map(Criterion::equals));
            opts.push(Criterion::equals("missing"));
            options.push(opts);
        }

        for region in &options[0] {
            for industry in &options[1] {
                for pollutant in &options[2] {
                    let criteria = FilterCriteria {
                        region: region.clone(),
                        industry: industry.clone(),
                        pollutant_type: pollutant.clone(),
                    };
                    let indices = filtered_indices(&store, &criteria);
                    for (i, rec) in store.iter().enumerate() {
                        let in_view = indices.contains(&i);
                        let satisfies = CostField::ALL
                            .iter()
                            .all(|&f| criteria.get(f).matches(f.value(rec)));
                        assert_eq!(in_view, satisfies, "record {i} with {criteria:?}");
                    }
                    assert_eq!(filter(&store, &criteria).len(), indices.len());
                }
            }
        }
    }

    #[test]
    fn equality_is_exact_and_case_sensitive() {
        let store = store();
        let view = filter(
            &store,
            &FilterCriteria::unconstrained().with(CostField::PollutantType, Criterion::equals("VOC")),
        );
        assert!(view.is_empty());

        let view = filter(
            &store,
            &FilterCriteria::unconstrained().with(CostField::PollutantType, Criterion::equals("sox")),
        );
        assert!(view.is_empty());
    }

    #[test]
    fn data_value_named_all_is_an_ordinary_value() {
        let store = store();
        let view = filter(
            &store,
            &FilterCriteria::unconstrained().with(CostField::Region, Criterion::equals("All")),
        );
        assert_eq!(view.len(), 1);
        assert_eq!(view.records()[0].industry.as_deref(), Some("电力"));
    }

    #[test]
    fn conjunction_across_fields() {
        let store = store();
        let criteria = FilterCriteria::unconstrained()
            .with(CostField::Region, Criterion::equals("A"))
            .with(CostField::PollutantType, Criterion::equals("SOx"));
        assert_eq!(filtered_indices(&store, &criteria), vec![2]);
    }

    #[test]
    fn absent_value_never_matches_a_constraint() {
        let store = store();
        let criteria =
            FilterCriteria::unconstrained().with(CostField::Industry, Criterion::equals("化工"));
        // Record 4 has no region but is still included when region is unconstrained.
        assert_eq!(filtered_indices(&store, &criteria), vec![0, 1, 4]);
        let view = view_from_indices(&store, &[4, 99]);
        assert_eq!(view.len(), 1);
        assert!(!Criterion::equals("").matches(None));
    }
}
