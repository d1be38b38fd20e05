//! Filtering and sorting of canonical records.

use super::record::{CanonicalRecord, NOT_AVAILABLE};
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;

/// Inclusive bounds on `investment_amount`, in canonical units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvestmentRange {
    pub min: f64,
    pub max: f64,
}

impl InvestmentRange {
    pub fn contains(&self, amount: f64) -> bool {
        amount >= self.min && amount <= self.max
    }
}

/// The investment brackets offered on the startups page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangePreset {
    UpTo5M,
    From5To15M,
    From15To25M,
    Above25M,
}

impl RangePreset {
    pub const ALL: [RangePreset; 4] = [
        RangePreset::UpTo5M,
        RangePreset::From5To15M,
        RangePreset::From15To25M,
        RangePreset::Above25M,
    ];

    pub fn range(&self) -> InvestmentRange {
        const M: f64 = 1_000_000.0;
        let (min, max) = match self {
            RangePreset::UpTo5M => (0.0, 5.0 * M),
            RangePreset::From5To15M => (5.0 * M, 15.0 * M),
            RangePreset::From15To25M => (15.0 * M, 25.0 * M),
            RangePreset::Above25M => (25.0 * M, f64::INFINITY),
        };
        InvestmentRange { min, max }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RangePreset::UpTo5M => "Até R$ 5M",
            RangePreset::From5To15M => "R$ 5M - R$ 15M",
            RangePreset::From15To25M => "R$ 15M - R$ 25M",
            RangePreset::Above25M => "Acima de R$ 25M",
        }
    }
}

impl FromStr for RangePreset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "0-5m" | "upto5m" => Ok(RangePreset::UpTo5M),
            "5-15m" => Ok(RangePreset::From5To15M),
            "15-25m" => Ok(RangePreset::From15To25M),
            "25m+" | "above25m" => Ok(RangePreset::Above25M),
            _ => Err(anyhow!(
                "Invalid investment range: {s} (expected 0-5m, 5-15m, 15-25m or 25m+)"
            )),
        }
    }
}

/// Active filters. Empty or absent values impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub search_term: String,
    pub sector: Option<String>,
    pub country: Option<String>,
    pub stage: Option<String>,
    pub investor: Option<String>,
    pub investment_range: Option<InvestmentRange>,
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.search_term.trim().is_empty()
            && active(&self.sector).is_none()
            && active(&self.country).is_none()
            && active(&self.stage).is_none()
            && active(&self.investor).is_none()
            && self.investment_range.is_none()
    }

    /// True when the record satisfies every active predicate.
    pub fn matches(&self, record: &CanonicalRecord) -> bool {
        self.matches_search(record)
            && active(&self.sector).is_none_or(|s| record.sector == s)
            && active(&self.country).is_none_or(|c| record.country == c)
            && active(&self.stage).is_none_or(|s| record.stage == s)
            && active(&self.investor).is_none_or(|i| record.lead_investor() == i)
            && self
                .investment_range
                .is_none_or(|r| r.contains(record.investment_amount))
    }

    fn matches_search(&self, record: &CanonicalRecord) -> bool {
        let term = self.search_term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        [
            &record.name,
            &record.sector,
            &record.country,
            &record.investor,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&term))
    }
}

/// Keeps the records that pass every active filter, in input order.
pub fn apply_filters(records: &[CanonicalRecord], filters: &FilterState) -> Vec<CanonicalRecord> {
    records
        .iter()
        .filter(|r| filters.matches(r))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortField {
    Name,
    Sector,
    Country,
    City,
    FoundedYear,
    InvestmentRaw,
    InvestmentAmount,
    Investor,
    Stage,
    Website,
    Status,
}

impl Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SortField::Name => "name",
                SortField::Sector => "sector",
                SortField::Country => "country",
                SortField::City => "city",
                SortField::FoundedYear => "founded",
                SortField::InvestmentRaw => "investment-raw",
                SortField::InvestmentAmount => "investment",
                SortField::Investor => "investor",
                SortField::Stage => "stage",
                SortField::Website => "website",
                SortField::Status => "status",
            }
        )
    }
}

impl FromStr for SortField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(SortField::Name),
            "sector" => Ok(SortField::Sector),
            "country" => Ok(SortField::Country),
            "city" => Ok(SortField::City),
            "founded" | "year" => Ok(SortField::FoundedYear),
            "investment-raw" => Ok(SortField::InvestmentRaw),
            "investment" | "amount" => Ok(SortField::InvestmentAmount),
            "investor" => Ok(SortField::Investor),
            "stage" => Ok(SortField::Stage),
            "website" => Ok(SortField::Website),
            "status" => Ok(SortField::Status),
            _ => Err(anyhow!("Invalid sort field: {}", s)),
        }
    }
}

enum SortKey<'a> {
    Text(&'a str),
    Number(f64),
}

impl SortField {
    fn key<'a>(&self, record: &'a CanonicalRecord) -> SortKey<'a> {
        match self {
            SortField::Name => SortKey::Text(&record.name),
            SortField::Sector => SortKey::Text(&record.sector),
            SortField::Country => SortKey::Text(&record.country),
            SortField::City => SortKey::Text(&record.city),
            SortField::FoundedYear => SortKey::Number(f64::from(record.founded_year)),
            SortField::InvestmentRaw => SortKey::Text(&record.investment_raw),
            SortField::InvestmentAmount => SortKey::Number(record.investment_amount),
            SortField::Investor => SortKey::Text(&record.investor),
            SortField::Stage => SortKey::Text(&record.stage),
            SortField::Website => SortKey::Text(&record.website),
            SortField::Status => SortKey::Text(&record.status),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            field: SortField::Name,
            direction: SortDirection::Ascending,
        }
    }
}

impl SortState {
    /// Selecting the active field flips direction; a new field starts ascending.
    pub fn toggle(self, field: SortField) -> SortState {
        if self.field == field {
            let direction = match self.direction {
                SortDirection::Ascending => SortDirection::Descending,
                SortDirection::Descending => SortDirection::Ascending,
            };
            SortState { field, direction }
        } else {
            SortState {
                field,
                direction: SortDirection::Ascending,
            }
        }
    }

    fn compare(&self, a: &CanonicalRecord, b: &CanonicalRecord) -> Ordering {
        let ordering = match (self.field.key(a), self.field.key(b)) {
            (SortKey::Text(x), SortKey::Text(y)) => locale_compare(x, y),
            (SortKey::Number(x), SortKey::Number(y)) => x.total_cmp(&y),
            _ => Ordering::Equal,
        };
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Returns a stably sorted copy; the input is left untouched.
pub fn sort_records(records: &[CanonicalRecord], sort: &SortState) -> Vec<CanonicalRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| sort.compare(a, b));
    sorted
}

/// Filters then sorts, the composition every table view uses.
pub fn filter_and_sort(
    records: &[CanonicalRecord],
    filters: &FilterState,
    sort: &SortState,
) -> Vec<CanonicalRecord> {
    let mut view = apply_filters(records, filters);
    view.sort_by(|a, b| sort.compare(a, b));
    view
}

/// Orders strings the way a pt-BR reader expects: accents and case only
/// break ties between otherwise equal words.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let primary = a.chars().flat_map(fold_char).cmp(b.chars().flat_map(fold_char));
    primary
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| b.cmp(a))
}

fn fold_char(c: char) -> impl Iterator<Item = char> {
    let base = match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' | 'Á' | 'À' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'a',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'u',
        'ç' | 'Ç' => 'c',
        'ñ' | 'Ñ' => 'n',
        other => other,
    };
    base.to_lowercase()
}

/// Distinct values available for each categorical filter, sorted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub sectors: Vec<String>,
    pub countries: Vec<String>,
    pub stages: Vec<String>,
    /// Lead investors only, matching what the investor filter compares.
    pub investors: Vec<String>,
}

impl FilterOptions {
    pub fn from_records(records: &[CanonicalRecord]) -> Self {
        Self {
            sectors: distinct(records.iter().map(|r| r.sector.as_str())),
            countries: distinct(records.iter().map(|r| r.country.as_str())),
            stages: distinct(records.iter().map(|r| r.stage.as_str())),
            investors: distinct(records.iter().map(|r| r.lead_investor())),
        }
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = values
        .filter(|v| !v.is_empty() && *v != NOT_AVAILABLE)
        .map(str::to_string)
        .collect();
    out.sort_by(|a, b| locale_compare(a, b));
    out.dedup();
    out
}
