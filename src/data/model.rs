use std::collections::HashSet;
use std::fmt;

// ---------------------------------------------------------------------------
// CostField – the three label columns records can be filtered/grouped by
// ---------------------------------------------------------------------------

/// A label column of the cost dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CostField {
    Region,
    Industry,
    PollutantType,
}

impl CostField {
    pub const ALL: [CostField; 3] = [
        CostField::Region,
        CostField::Industry,
        CostField::PollutantType,
    ];

    /// Canonical (English) column name.
    pub fn name(self) -> &'static str {
        match self {
            CostField::Region => "region",
            CostField::Industry => "industry",
            CostField::PollutantType => "pollutant_type",
        }
    }

    /// Human-readable label for selectors and table headers.
    pub fn display_name(self) -> &'static str {
        match self {
            CostField::Region => "Region",
            CostField::Industry => "Industry",
            CostField::PollutantType => "Pollutant type",
        }
    }

    /// Header used when exporting (matches the source spreadsheets).
    pub fn export_header(self) -> &'static str {
        match self {
            CostField::Region => "地区",
            CostField::Industry => "所属行业",
            CostField::PollutantType => "污染物类型",
        }
    }

    /// Header spellings accepted when loading. Compared after trimming,
    /// ASCII-case-insensitively.
    pub fn header_aliases(self) -> &'static [&'static str] {
        match self {
            CostField::Region => &["region", "地区"],
            CostField::Industry => &["industry", "所属行业"],
            CostField::PollutantType => &["pollutant_type", "pollutant type", "污染物类型"],
        }
    }

    /// The record's value for this column, if present.
    pub fn value(self, record: &CostRecord) -> Option<&str> {
        match self {
            CostField::Region => record.region.as_deref(),
            CostField::Industry => record.industry.as_deref(),
            CostField::PollutantType => record.pollutant_type.as_deref(),
        }
    }
}

impl fmt::Display for CostField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Canonical name of the cost column.
pub const UNIT_COST_COLUMN: &str = "unit_cost";

/// Header spellings accepted for the unit cost column.
pub const UNIT_COST_ALIASES: &[&str] = &[
    "unit_cost",
    "unit cost",
    "单位治理成本（元/吨）",
    "单位治理成本(元/吨)",
];

/// Export header for the unit cost column.
pub const UNIT_COST_EXPORT_HEADER: &str = "单位治理成本（元/吨）";

// ---------------------------------------------------------------------------
// CostRecord – one row of the dataset
// ---------------------------------------------------------------------------

/// One historical observation of unit treatment cost.
///
/// Label fields are `None` for blank cells; `unit_cost` is `None` when the
/// observation has no cost and is then skipped by every aggregate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CostRecord {
    pub region: Option<String>,
    pub industry: Option<String>,
    pub pollutant_type: Option<String>,
    /// Currency per ton; finite and non-negative when present.
    pub unit_cost: Option<f64>,
}

impl CostRecord {
    pub fn new(
        region: impl Into<String>,
        industry: impl Into<String>,
        pollutant_type: impl Into<String>,
        unit_cost: Option<f64>,
    ) -> Self {
        Self {
            region: Some(region.into()),
            industry: Some(industry.into()),
            pollutant_type: Some(pollutant_type.into()),
            unit_cost,
        }
    }
}

// ---------------------------------------------------------------------------
// RecordStore – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The immutable, loaded dataset with pre-computed selector values.
///
/// Nothing mutates a store after construction; share it as
/// `Arc<RecordStore>` and derive views from it.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<CostRecord>,
    regions: Vec<String>,
    industries: Vec<String>,
    pollutant_types: Vec<String>,
}

impl RecordStore {
    /// Build the distinct-value indices from the loaded records.
    pub fn from_records(records: Vec<CostRecord>) -> Self {
        let regions = distinct_values(&records, CostField::Region);
        let industries = distinct_values(&records, CostField::Industry);
        let pollutant_types = distinct_values(&records, CostField::PollutantType);
        RecordStore {
            records,
            regions,
            industries,
            pollutant_types,
        }
    }

    pub fn records(&self) -> &[CostRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CostRecord> {
        self.records.iter()
    }

    pub fn get(&self, index: usize) -> Option<&CostRecord> {
        self.records.get(index)
    }

    /// Distinct values of `field`, in order of first occurrence.
    pub fn distinct(&self, field: CostField) -> &[String] {
        match field {
            CostField::Region => &self.regions,
            CostField::Industry => &self.industries,
            CostField::PollutantType => &self.pollutant_types,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a CostRecord;
    type IntoIter = std::slice::Iter<'a, CostRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn distinct_values(records: &[CostRecord], field: CostField) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for value in records.iter().filter_map(|r| field.value(r)) {
        if seen.insert(value) {
            out.push(value.to_string());
        }
    }
    out
}
