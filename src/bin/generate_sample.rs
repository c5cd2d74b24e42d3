use std::sync::Arc;

use anyhow::Context;
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const REGIONS: [&str; 5] = ["浙江", "江苏", "山东", "广东", "河北"];

/// (industry, pollutant, baseline unit cost in 元/吨)
const PROFILES: [(&str, &str, f64); 9] = [
    ("化工", "VOCs", 18_500.0),
    ("化工", "含VOC废气", 16_200.0),
    ("化工", "NOx", 7_800.0),
    ("电力", "SOx", 1_350.0),
    ("电力", "NOx", 2_100.0),
    ("电力", "颗粒物", 420.0),
    ("钢铁", "SOx", 1_900.0),
    ("钢铁", "颗粒物", 650.0),
    ("印刷", "VOCs", 24_000.0),
];

/// Regional multiplier on the baseline cost.
const REGION_FACTOR: [f64; 5] = [1.10, 1.05, 0.92, 1.18, 0.88];

/// Share of rows written without a unit cost.
const MISSING_COST_RATE: f64 = 0.06;

/// Small deterministic PRNG (xorshift64*), enough for reproducible samples.
struct SampleRng(u64);

impl SampleRng {
    fn new(seed: u64) -> Self {
        SampleRng(seed.max(1))
    }

    fn next_f64(&mut self) -> f64 {
        self.0 ^= self.0 >> 12;
        self.0 ^= self.0 << 25;
        self.0 ^= self.0 >> 27;
        let x = self.0.wrapping_mul(0x2545_F491_4F6C_DD1D);
        (x >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in `[lo, hi)`.
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

struct SampleRow {
    region: &'static str,
    industry: &'static str,
    pollutant: &'static str,
    unit_cost: Option<f64>,
}

fn generate_rows(rng: &mut SampleRng) -> Vec<SampleRow> {
    let mut rows = Vec::new();
    for (region, factor) in REGIONS.iter().zip(REGION_FACTOR) {
        for &(industry, pollutant, baseline) in &PROFILES {
            // Two to four plants per combination.
            let plants = 2 + (rng.next_f64() * 3.0) as usize;
            for _ in 0..plants {
                let unit_cost = if rng.next_f64() < MISSING_COST_RATE {
                    None
                } else {
                    let cost = baseline * factor * rng.range(0.75, 1.25);
                    Some((cost * 100.0).round() / 100.0)
                };
                rows.push(SampleRow {
                    region,
                    industry,
                    pollutant,
                    unit_cost,
                });
            }
        }
    }
    rows
}

fn write_parquet(path: &str, rows: &[SampleRow]) -> anyhow::Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("地区", DataType::Utf8, false),
        Field::new("所属行业", DataType::Utf8, false),
        Field::new("污染物类型", DataType::Utf8, false),
        Field::new("单位治理成本（元/吨）", DataType::Float64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.region))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.industry))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.pollutant))),
            Arc::new(Float64Array::from_iter(rows.iter().map(|r| r.unit_cost))),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn write_csv(path: &str, rows: &[SampleRow]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(["地区", "所属行业", "污染物类型", "单位治理成本（元/吨）"])?;
    for row in rows {
        let cost = row.unit_cost.map(|c| format!("{c:.2}")).unwrap_or_default();
        writer.write_record([row.region, row.industry, row.pollutant, cost.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let mut rng = SampleRng::new(42);
    let rows = generate_rows(&mut rng);

    write_parquet("sample_costs.parquet", &rows)?;
    write_csv("sample_costs.csv", &rows)?;

    let missing = rows.iter().filter(|r| r.unit_cost.is_none()).count();
    println!(
        "Wrote {} cost records ({missing} without unit cost) to sample_costs.parquet and sample_costs.csv",
        rows.len()
    );
    Ok(())
}
