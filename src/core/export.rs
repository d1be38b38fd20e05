//! CSV export of the current table view.

use super::record::CanonicalRecord;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// MIME type of exported files.
pub const CSV_MIME: &str = "text/csv";

/// Default file name for exports from the data page.
pub const DEFAULT_EXPORT_FILENAME: &str = "startups-data.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CsvColumn {
    Name,
    Sector,
    Country,
    City,
    FoundedYear,
    LastInvestment,
    TotalRaised,
    Investor,
    Stage,
    Website,
    Status,
}

impl CsvColumn {
    /// Column order used by the data page.
    pub const DEFAULT_ORDER: [CsvColumn; 11] = [
        CsvColumn::Name,
        CsvColumn::Sector,
        CsvColumn::Country,
        CsvColumn::City,
        CsvColumn::FoundedYear,
        CsvColumn::LastInvestment,
        CsvColumn::TotalRaised,
        CsvColumn::Investor,
        CsvColumn::Stage,
        CsvColumn::Website,
        CsvColumn::Status,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            CsvColumn::Name => "Nome",
            CsvColumn::Sector => "Setor",
            CsvColumn::Country => "País",
            CsvColumn::City => "Cidade",
            CsvColumn::FoundedYear => "Ano Fundação",
            CsvColumn::LastInvestment => "Último Investimento",
            CsvColumn::TotalRaised => "Total Captado",
            CsvColumn::Investor => "Investidor",
            CsvColumn::Stage => "Estágio",
            CsvColumn::Website => "Website",
            CsvColumn::Status => "Status",
        }
    }

    pub fn value(&self, record: &CanonicalRecord) -> String {
        match self {
            CsvColumn::Name => record.name.clone(),
            CsvColumn::Sector => record.sector.clone(),
            CsvColumn::Country => record.country.clone(),
            CsvColumn::City => record.city.clone(),
            CsvColumn::FoundedYear => record.founded_year.to_string(),
            // The API reports a single amount, used for both columns.
            CsvColumn::LastInvestment | CsvColumn::TotalRaised => record.investment_raw.clone(),
            CsvColumn::Investor => record.investor.clone(),
            CsvColumn::Stage => record.stage.clone(),
            CsvColumn::Website => record.website.clone(),
            CsvColumn::Status => record.status.clone(),
        }
    }
}

/// Renders the header line and one line per record, fields joined by
/// commas with no quoting.
///
/// Values containing commas or newlines will shift or split columns. Use
/// [`to_csv_quoted`] when that matters.
pub fn to_csv(records: &[CanonicalRecord], columns: &[CsvColumn]) -> String {
    let header = columns
        .iter()
        .map(CsvColumn::header)
        .collect::<Vec<_>>()
        .join(",");

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(header);
    for record in records {
        let row = columns
            .iter()
            .map(|c| c.value(record))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(row);
    }
    lines.join("\n")
}

/// Like [`to_csv`], but fields containing commas, quotes or newlines are
/// quoted per RFC 4180.
pub fn to_csv_quoted(records: &[CanonicalRecord], columns: &[CsvColumn]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer
        .write_record(columns.iter().map(CsvColumn::header))
        .context("Failed to write CSV header")?;
    for record in records {
        writer
            .write_record(columns.iter().map(|c| c.value(record)))
            .with_context(|| format!("Failed to write CSV row for {}", record.name))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {e}"))?;
    let mut text = String::from_utf8(bytes).context("CSV output is not valid UTF-8")?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// Writes exported CSV text to `path`, replacing any existing file.
pub fn write_csv<P: AsRef<Path>>(path: P, contents: &str) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write CSV file to {}", path.display()))?;
    debug!("Wrote {} bytes of {} to {}", contents.len(), CSV_MIME, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::money::ConversionRates;
    use crate::core::record::{RawRecord, normalize_all};
    use serde_json::json;

    fn sample() -> Vec<CanonicalRecord> {
        let raws: Vec<RawRecord> = [
            json!({"nome": "Foo", "setor": "Fintech", "localizacao": "Brasil",
                   "ano_fundacao": 2015, "valor_investimento": "R$10M",
                   "vc_investidor": "Kaszek", "rodada": "Seed", "site": "https://foo.io"}),
            json!({"nome": "Bar", "setor": "Health", "localizacao": "Chile",
                   "ano_fundacao": 2018, "valor_investimento": "US$2M",
                   "vc_investidor": "Monashees, Kaszek", "rodada": "Série A"}),
        ]
        .into_iter()
        .map(RawRecord::from_value)
        .collect();
        normalize_all(&raws, &ConversionRates::default())
    }

    #[test]
    fn test_to_csv_literal() {
        let csv = to_csv(&sample()[..1], &CsvColumn::DEFAULT_ORDER);
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "Nome,Setor,País,Cidade,Ano Fundação,Último Investimento,Total Captado,Investidor,Estágio,Website,Status"
        );
        assert_eq!(
            lines[1],
            "Foo,Fintech,Brasil,Brasil,2015,R$10M,R$10M,Kaszek,Seed,https://foo.io,Ativa"
        );
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn test_header_and_rows_have_same_width_without_embedded_commas() {
        let records = sample();
        let columns = [CsvColumn::Name, CsvColumn::Sector, CsvColumn::LastInvestment];
        let csv = to_csv(&records, &columns);

        let widths: Vec<_> = csv.lines().map(|l| l.split(',').count()).collect();
        assert_eq!(widths, vec![3, 3, 3]);

        let row: Vec<_> = csv.lines().nth(2).unwrap().split(',').collect();
        assert_eq!(row[0], records[1].name);
        assert_eq!(row[2], records[1].investment_raw);
    }

    #[test]
    fn test_literal_export_does_not_escape_commas() {
        let csv = to_csv(&sample()[1..], &[CsvColumn::Name, CsvColumn::Investor]);
        assert_eq!(csv.lines().nth(1), Some("Bar,Monashees, Kaszek"));
    }

    #[test]
    fn test_quoted_export_escapes_special_characters() {
        let mut records = sample();
        records[0].name = "Foo \"Labs\"\nLtda".to_string();

        let csv = to_csv_quoted(&records, &[CsvColumn::Name, CsvColumn::Investor]).unwrap();

        assert_eq!(
            csv,
            "Nome,Investidor\n\"Foo \"\"Labs\"\"\nLtda\",Kaszek\nBar,\"Monashees, Kaszek\""
        );
    }

    #[test]
    fn test_empty_export_is_header_only() {
        let csv = to_csv(&[], &[CsvColumn::Name, CsvColumn::Status]);
        assert_eq!(csv, "Nome,Status");
        assert_eq!(to_csv_quoted(&[], &[CsvColumn::Name]).unwrap(), "Nome");
    }

    #[test]
    fn test_write_csv() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join(DEFAULT_EXPORT_FILENAME);
        write_csv(&path, "Nome\nFoo")?;
        assert_eq!(std::fs::read_to_string(&path)?, "Nome\nFoo");
        Ok(())
    }
}
