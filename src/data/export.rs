use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::ProviderAggregate;
use crate::config::AGGREGATE_COLUMNS;

/// Write the aggregated view as UTF-8 CSV: header row, no index column,
/// missing values as empty fields.
pub fn write_csv<W: Write>(rows: &[ProviderAggregate], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        // serde only emits headers alongside the first record
        csv.write_record(AGGREGATE_COLUMNS)
            .context("writing CSV header")?;
    }
    for row in rows {
        csv.serialize(row).context("writing CSV row")?;
    }
    csv.flush().context("flushing CSV")?;
    Ok(())
}

/// Export the aggregated view to `path`.
pub fn export_csv(rows: &[ProviderAggregate], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_csv(rows, std::io::BufWriter::new(file))?;
    log::info!("Exported {} aggregated rows to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(provider: &str, value: f64, rating: Option<&str>) -> ProviderAggregate {
        ProviderAggregate {
            provider: Some(provider.to_string()),
            contract_value: value,
            org_type: Some("Independent Ltd/LLP/Co.".to_string()),
            category: Some("Care, Residential".to_string()),
            cqc_rating: rating.map(str::to_string),
            summary: None,
            companies_house_info: Some("Company 0123".to_string()),
        }
    }

    fn to_string(rows: &[ProviderAggregate]) -> String {
        let mut buf = Vec::new();
        write_csv(rows, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn header_matches_table_column_order() {
        let text = to_string(&[row("A", 1.0, None)]);
        assert_eq!(
            text.lines().next().unwrap(),
            "Provider,Contract Value,OrgType,Category,enr_CQC_Rating,enr_Summary,enr_Companies_House_Info"
        );
    }

    #[test]
    fn empty_view_still_has_header() {
        let text = to_string(&[]);
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("Provider,Contract Value,"));
    }

    #[test]
    fn round_trip_preserves_rows() {
        let rows = vec![row("Zeta Care", 1_250_000.5, Some("Good")), row("Ålesund Homes", 10.0, None)];
        let text = to_string(&rows);

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let back: Vec<ProviderAggregate> = reader.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn writes_file() {
        let dir = crate::data::loader::tests::scratch_dir("export_file");
        let path = dir.join(crate::config::EXPORT_FILE_NAME);
        export_csv(&[row("A", 2.0, None)], &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}
