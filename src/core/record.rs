//! Upstream startup payloads and their canonical form.

use super::money::{ConversionRates, RawAmount, parse_amount};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fallback for absent descriptive fields.
pub const NOT_AVAILABLE: &str = "N/A";

/// Every record is currently reported as active.
pub const ACTIVE_STATUS: &str = "Ativa";

/// A startup as returned by the API.
///
/// The payload has no enforced schema, so the record keeps the raw JSON
/// object and exposes typed, optional accessors over it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    /// Wraps any JSON value; non-objects become an empty record.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => RawRecord(map),
            _ => RawRecord::default(),
        }
    }

    fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Text form of a field. Numbers and booleans are rendered as text.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn integer(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn amount(&self, key: &str) -> Option<RawAmount> {
        match self.get(key)? {
            Value::Number(n) => n.as_f64().map(RawAmount::Number),
            Value::String(s) => Some(RawAmount::Text(s.clone())),
            _ => None,
        }
    }

    /// Parses an ISO-8601 timestamp. Values without an offset are taken as UTC.
    pub fn timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        let text = self.text(key)?;
        let text = text.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(dt.and_utc());
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f") {
            return Some(dt.and_utc());
        }
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    }
}

/// The normalized startup used by every projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalRecord {
    pub id: String,
    pub name: String,
    pub sector: String,
    pub country: String,
    pub city: String,
    pub founded_year: i32,
    /// Amount exactly as sent upstream, for display.
    pub investment_raw: String,
    /// Amount in canonical currency units.
    pub investment_amount: f64,
    /// Possibly several investors separated by commas.
    pub investor: String,
    pub stage: String,
    pub website: String,
    pub description: String,
    pub founder_linkedin: String,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl CanonicalRecord {
    /// The date used to place a record in a calendar month: its creation
    /// timestamp as seen in `zone`, or January 1st of its founding year.
    pub fn reference_date<Tz: TimeZone>(&self, zone: &Tz) -> Option<NaiveDate> {
        match self.created_at {
            Some(ts) => Some(ts.with_timezone(zone).date_naive()),
            None => NaiveDate::from_ymd_opt(self.founded_year, 1, 1),
        }
    }

    /// Individual investor names, trimmed, without empty entries.
    pub fn investors(&self) -> impl Iterator<Item = &str> {
        split_investors(&self.investor)
    }

    /// The first-listed investor, which filters attribute the record to.
    pub fn lead_investor(&self) -> &str {
        first_investor(&self.investor)
    }
}

pub fn split_investors(field: &str) -> impl Iterator<Item = &str> {
    field.split(',').map(str::trim).filter(|s| !s.is_empty())
}

pub fn first_investor(field: &str) -> &str {
    field.split(',').next().unwrap_or_default().trim()
}

/// Maps one upstream record to its canonical form. Never fails.
///
/// `index` is the record's position in the response and only serves as an
/// identifier when the payload carries none.
pub fn normalize(raw: &RawRecord, index: usize, rates: &ConversionRates) -> CanonicalRecord {
    let or_na = |key: &str| raw.text(key).unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let or_empty = |key: &str| raw.text(key).unwrap_or_default();

    let location = raw.text("localizacao");
    let country = location
        .clone()
        .or_else(|| raw.text("pais"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let city = location.unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let amount = raw.amount("valor_investimento");
    let investment_amount = amount
        .as_ref()
        .map_or(0.0, |a| parse_amount(a, rates));

    CanonicalRecord {
        id: raw.text("id").unwrap_or_else(|| format!("row-{index}")),
        name: or_na("nome"),
        sector: or_na("setor"),
        country,
        city,
        founded_year: raw
            .integer("ano_fundacao")
            .and_then(|y| i32::try_from(y).ok())
            .unwrap_or_default(),
        investment_raw: amount.map(|a| a.to_string()).unwrap_or_default(),
        investment_amount,
        investor: or_empty("vc_investidor"),
        stage: or_empty("rodada"),
        website: or_empty("site"),
        description: or_empty("descricao_breve"),
        founder_linkedin: or_empty("linkedin_fundador"),
        status: ACTIVE_STATUS.to_string(),
        created_at: raw.timestamp("created_at"),
    }
}

pub fn normalize_all(raws: &[RawRecord], rates: &ConversionRates) -> Vec<CanonicalRecord> {
    raws.iter()
        .enumerate()
        .map(|(i, raw)| normalize(raw, i, rates))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, FixedOffset, Timelike};
    use serde_json::json;

    fn rates() -> ConversionRates {
        ConversionRates::default()
    }

    #[test]
    fn test_normalize_full_record() {
        let raw = RawRecord::from_value(json!({
            "id": 7,
            "nome": "Nubank",
            "setor": "Fintech",
            "localizacao": "Brasil",
            "ano_fundacao": 2013,
            "valor_investimento": "US$750M",
            "vc_investidor": "Sequoia, Tiger Global",
            "site": "https://nubank.com.br",
            "rodada": "Série G",
            "descricao_breve": "Banco digital",
            "linkedin_fundador": "https://linkedin.com/in/davidvelez",
            "created_at": "2025-03-10T12:00:00Z"
        }));

        let record = normalize(&raw, 0, &rates());

        assert_eq!(record.id, "7");
        assert_eq!(record.name, "Nubank");
        assert_eq!(record.sector, "Fintech");
        assert_eq!(record.country, "Brasil");
        assert_eq!(record.city, "Brasil");
        assert_eq!(record.founded_year, 2013);
        assert_eq!(record.investment_raw, "US$750M");
        assert_eq!(record.investment_amount, 750_000_000.0 * 5.0);
        assert_eq!(record.lead_investor(), "Sequoia");
        assert_eq!(record.stage, "Série G");
        assert_eq!(record.status, ACTIVE_STATUS);
        assert_eq!(record.created_at.unwrap().month(), 3);
    }

    #[test]
    fn test_normalize_empty_record_uses_fallbacks() {
        let record = normalize(&RawRecord::default(), 4, &rates());

        assert_eq!(record.id, "row-4");
        assert_eq!(record.name, NOT_AVAILABLE);
        assert_eq!(record.sector, NOT_AVAILABLE);
        assert_eq!(record.country, NOT_AVAILABLE);
        assert_eq!(record.city, NOT_AVAILABLE);
        assert_eq!(record.founded_year, 0);
        assert_eq!(record.investment_raw, "");
        assert_eq!(record.investment_amount, 0.0);
        assert_eq!(record.investor, "");
        assert_eq!(record.website, "");
        assert!(record.created_at.is_none());
    }

    #[test]
    fn test_normalize_wrong_types() {
        let raw = RawRecord::from_value(json!({
            "nome": 123,
            "setor": null,
            "ano_fundacao": "2019",
            "valor_investimento": 1500000,
            "vc_investidor": ["not", "a", "string"],
            "created_at": "yesterday"
        }));

        let record = normalize(&raw, 0, &rates());

        assert_eq!(record.name, "123");
        assert_eq!(record.sector, NOT_AVAILABLE);
        assert_eq!(record.founded_year, 2019);
        assert_eq!(record.investment_raw, "1500000");
        assert_eq!(record.investment_amount, 1_500_000.0);
        assert_eq!(record.investor, "");
        assert!(record.created_at.is_none());
    }

    #[test]
    fn test_country_falls_back_to_pais() {
        let raw = RawRecord::from_value(json!({ "pais": "Chile" }));
        let record = normalize(&raw, 0, &rates());
        assert_eq!(record.country, "Chile");
        assert_eq!(record.city, NOT_AVAILABLE);
    }

    #[test]
    fn test_non_object_payload_becomes_empty_record() {
        let raw = RawRecord::from_value(json!("oops"));
        assert_eq!(raw, RawRecord::default());
    }

    #[test]
    fn test_timestamp_formats() {
        let raw = RawRecord::from_value(json!({
            "a": "2024-05-01T08:30:00.123456",
            "b": "2024-05-01",
            "c": "2024-05-01T08:30:00-03:00"
        }));
        assert_eq!(raw.timestamp("a").unwrap().day(), 1);
        assert_eq!(raw.timestamp("b").unwrap().month(), 5);
        assert_eq!(raw.timestamp("c").unwrap().hour(), 11);
    }

    #[test]
    fn test_updated_at_does_not_date_the_record() {
        let raw = RawRecord::from_value(json!({
            "ano_fundacao": 2013,
            "atualizado_em": "2026-10-02T09:00:00"
        }));
        let record = normalize(&raw, 0, &rates());
        assert!(record.created_at.is_none());
        assert_eq!(record.reference_date(&Utc), NaiveDate::from_ymd_opt(2013, 1, 1));
    }

    #[test]
    fn test_reference_date_uses_the_given_zone() {
        let raw = RawRecord::from_value(json!({ "created_at": "2026-10-31T22:00:00-03:00" }));
        let record = normalize(&raw, 0, &rates());
        let sao_paulo = FixedOffset::west_opt(3 * 3600).unwrap();

        assert_eq!(record.reference_date(&sao_paulo), NaiveDate::from_ymd_opt(2026, 10, 31));
        assert_eq!(record.reference_date(&Utc), NaiveDate::from_ymd_opt(2026, 11, 1));
    }

    #[test]
    fn test_reference_date_falls_back_to_founding_year() {
        let raw = RawRecord::from_value(json!({ "ano_fundacao": 2020 }));
        let record = normalize(&raw, 0, &rates());
        assert_eq!(record.reference_date(&Utc), NaiveDate::from_ymd_opt(2020, 1, 1));
    }

    #[test]
    fn test_split_investors() {
        let names: Vec<_> = split_investors(" A ,, B,  ").collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(first_investor(""), "");
        assert_eq!(first_investor(" Kaszek , Monashees"), "Kaszek");
    }
}
