use crate::data::stats::Summary;

/// Placeholder for values that cannot be computed (no costs in view).
pub const UNDEFINED: &str = "—";

/// `¥1,234.56/吨`
pub fn format_cost(value: f64) -> String {
    format!("¥{}/吨", group_thousands(value))
}

/// Mean / max / min of a summary, or placeholders when undefined.
pub fn summary_cells(summary: &Summary) -> [String; 3] {
    match summary.stats() {
        Some(s) => [format_cost(s.mean), format_cost(s.max), format_cost(s.min)],
        None => [UNDEFINED.to_string(), UNDEFINED.to_string(), UNDEFINED.to_string()],
    }
}

/// Two decimals with comma thousands separators.
fn group_thousands(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}
