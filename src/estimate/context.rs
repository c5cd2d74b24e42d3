use std::fmt::Write;

use crate::data::model::{CostField, CostRecord, RecordStore, UNIT_COST_EXPORT_HEADER};

/// Every record whose pollutant type contains `pollutant` (case-sensitive
/// substring), in store order.
///
/// Deliberately broader than the equality filter: "VOC" also picks up
/// "VOCs" and "含VOC废气". Industry plays no part here.
pub fn select_by_pollutant<'a>(store: &'a RecordStore, pollutant: &str) -> Vec<&'a CostRecord> {
    store
        .iter()
        .filter(|rec| {
            rec.pollutant_type
                .as_deref()
                .is_some_and(|p| p.contains(pollutant))
        })
        .collect()
}

/// Serialized historical rows handed to the model.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContextBlock {
    pub text: String,
    /// Rows written into `text`.
    pub rows_included: usize,
    /// Rows that matched the selection.
    pub rows_matched: usize,
}

impl ContextBlock {
    pub fn is_empty(&self) -> bool {
        self.rows_matched == 0
    }

    pub fn is_truncated(&self) -> bool {
        self.rows_included < self.rows_matched
    }
}

/// Tab-separated table of `records`, capped at `max_rows` lines of data.
///
/// An empty selection yields an empty block.
pub fn build_context(records: &[&CostRecord], max_rows: usize) -> ContextBlock {
    if records.is_empty() {
        return ContextBlock::default();
    }

    let mut text = String::new();
    let header: Vec<&str> = CostField::ALL
        .iter()
        .map(|f| f.export_header())
        .chain(std::iter::once(UNIT_COST_EXPORT_HEADER))
        .collect();
    text.push_str(&header.join("\t"));
    text.push('\n');

    // At least one row goes out whenever something matched.
    let included = records.len().min(max_rows.max(1));
    for rec in &records[..included] {
        let cost = match rec.unit_cost {
            Some(c) => format!("{c:.2}"),
            None => "-".to_string(),
        };
        // Writing into a String cannot fail.
        let _ = writeln!(
            text,
            "{}\t{}\t{}\t{}",
            rec.region.as_deref().unwrap_or("-"),
            rec.industry.as_deref().unwrap_or("-"),
            rec.pollutant_type.as_deref().unwrap_or("-"),
            cost
        );
    }

    let omitted = records.len() - included;
    if omitted > 0 {
        let _ = writeln!(text, "（另有 {omitted} 条匹配记录未列出）");
    }

    ContextBlock {
        text,
        rows_included: included,
        rows_matched: records.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RecordStore {
        RecordStore::from_records(vec![
            CostRecord::new("浙江", "化工", "VOCs", Some(1200.0)),
            CostRecord::new("江苏", "电力", "SOx", Some(300.0)),
            CostRecord::new("广东", "印刷", "含VOC废气", None),
            CostRecord::new("浙江", "涂装", "voc", Some(50.0)),
            CostRecord {
                pollutant_type: None,
                ..CostRecord::new("山东", "化工", "", Some(1.0))
            },
        ])
    }

    #[test]
    fn substring_selection_is_case_sensitive() {
        let store = store();
        let selected = select_by_pollutant(&store, "VOC");
        let kinds: Vec<&str> = selected
            .iter()
            .filter_map(|r| r.pollutant_type.as_deref())
            .collect();
        assert_eq!(kinds, vec!["VOCs", "含VOC废气"]);
        assert!(select_by_pollutant(&store, "PM2.5").is_empty());
    }

    #[test]
    fn context_lists_rows_with_header() {
        let store = store();
        let selected = select_by_pollutant(&store, "VOC");
        let block = build_context(&selected, 10);

        assert_eq!(block.rows_matched, 2);
        assert!(!block.is_truncated());
        let lines: Vec<&str> = block.text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "地区\t所属行业\t污染物类型\t单位治理成本（元/吨）");
        assert_eq!(lines[1], "浙江\t化工\tVOCs\t1200.00");
        assert_eq!(lines[2], "广东\t印刷\t含VOC废气\t-");
    }

    #[test]
    fn context_is_bounded() {
        let records: Vec<CostRecord> = (0..5)
            .map(|i| CostRecord::new(format!("R{i}"), "化工", "VOCs", Some(i as f64)))
            .collect();
        let refs: Vec<&CostRecord> = records.iter().collect();
        let block = build_context(&refs, 2);

        assert_eq!(block.rows_included, 2);
        assert!(block.is_truncated());
        assert_eq!(block.text.lines().count(), 4);
        assert!(block.text.contains("另有 3 条"));
        assert!(!block.text.contains("R2"));
    }

    #[test]
    fn zero_budget_still_lists_one_row() {
        let store = store();
        let selected = select_by_pollutant(&store, "VOC");
        let block = build_context(&selected, 0);

        assert_eq!(block.rows_included, 1);
        assert!(block.text.contains("1200.00"));
        assert!(block.text.contains("另有 1 条"));
    }

    #[test]
    fn empty_selection_gives_empty_block() {
        let block = build_context(&[], 10);
        assert!(block.is_empty());
        assert!(block.text.is_empty());
    }
}
