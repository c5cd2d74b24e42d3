use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::filter::FilteredView;
use super::model::{CostField, UNIT_COST_EXPORT_HEADER};

/// UTF-8 byte order mark so spreadsheet tools detect the encoding.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Write a filtered view as CSV, with the Chinese column headers.
pub fn write_view_csv(path: &Path, view: &FilteredView<'_>) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_view(file, view)?;
    log::info!("Exported {} records to {}", view.len(), path.display());
    Ok(())
}

fn write_view<W: Write>(mut out: W, view: &FilteredView<'_>) -> Result<()> {
    out.write_all(UTF8_BOM).context("writing CSV header")?;

    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(
            CostField::ALL
                .iter()
                .map(|f| f.export_header())
                .chain(std::iter::once(UNIT_COST_EXPORT_HEADER)),
        )
        .context("writing CSV header")?;

    for rec in view.iter() {
        let cost = rec.unit_cost.map(|c| c.to_string()).unwrap_or_default();
        writer
            .write_record([
                rec.region.as_deref().unwrap_or(""),
                rec.industry.as_deref().unwrap_or(""),
                rec.pollutant_type.as_deref().unwrap_or(""),
                cost.as_str(),
            ])
            .context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}
