//! Derived metrics over the canonical record list: investor rollups,
//! rankings, month-over-month KPIs and yearly totals.
//!
//! Every function here is a pure fold over its input and can be called on
//! every state change.
use super::record::{CanonicalRecord, split_investors};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Total invested and number of startups backed by one investor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestorAggregate {
    pub name: String,
    pub total_invested: f64,
    pub record_count: usize,
}

/// Groups records by every investor they name.
///
/// A record listing several investors counts fully towards each of them.
/// A name repeated within one record is counted once for that record.
/// Output follows the order in which investors first appear.
pub fn build_investor_aggregates(records: &[CanonicalRecord]) -> Vec<InvestorAggregate> {
    let mut aggregates: Vec<InvestorAggregate> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let mut seen = HashSet::new();
        for name in record.investors() {
            if !seen.insert(name) {
                continue;
            }
            let slot = *index.entry(name.to_string()).or_insert_with(|| {
                aggregates.push(InvestorAggregate {
                    name: name.to_string(),
                    total_invested: 0.0,
                    record_count: 0,
                });
                aggregates.len() - 1
            });
            let aggregate = &mut aggregates[slot];
            aggregate.total_invested += record.investment_amount;
            aggregate.record_count += 1;
        }
    }

    debug!(
        "Built {} investor aggregates from {} records",
        aggregates.len(),
        records.len()
    );
    aggregates
}

/// The `n` investors with the largest total, ties kept in input order.
pub fn rank_by_volume(aggregates: &[InvestorAggregate], n: usize) -> Vec<InvestorAggregate> {
    let mut ranked = aggregates.to_vec();
    ranked.sort_by(|a, b| b.total_invested.total_cmp(&a.total_invested));
    ranked.truncate(n);
    ranked
}

/// Case-insensitive substring search over investor names.
pub fn search_investors(aggregates: &[InvestorAggregate], term: &str) -> Vec<InvestorAggregate> {
    let term = term.trim().to_lowercase();
    aggregates
        .iter()
        .filter(|a| term.is_empty() || a.name.to_lowercase().contains(&term))
        .cloned()
        .collect()
}

/// Headline numbers for the investors page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InvestorStats {
    pub investor_count: usize,
    pub total_volume: f64,
}

pub fn investor_stats(aggregates: &[InvestorAggregate]) -> InvestorStats {
    InvestorStats {
        investor_count: aggregates.len(),
        total_volume: aggregates.iter().map(|a| a.total_invested).sum(),
    }
}

/// Activity within one calendar month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MonthBucket {
    pub count: usize,
    pub invested: f64,
    pub distinct_investors: usize,
}

impl MonthBucket {
    fn from_records<'a>(records: impl Iterator<Item = &'a CanonicalRecord>) -> Self {
        let mut bucket = MonthBucket::default();
        let mut investors = HashSet::new();
        for record in records {
            bucket.count += 1;
            bucket.invested += record.investment_amount;
            investors.extend(record.investors());
        }
        bucket.distinct_investors = investors.len();
        bucket
    }
}

/// Dashboard KPIs: overall totals plus this month against the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KpiSnapshot {
    pub total_records: usize,
    pub total_invested: f64,
    pub total_investors: usize,
    pub this_month: MonthBucket,
    pub last_month: MonthBucket,
    pub count_delta: i64,
    pub invested_delta: f64,
    pub investors_delta: i64,
    /// Record-count growth, in percent.
    pub growth_pct: f64,
}

/// Month-over-month change relative to `now`.
///
/// Records are dated by their creation timestamp, falling back to January
/// 1st of their founding year. Calendar months are taken in the time zone
/// of `now`.
pub fn kpi_deltas<Tz: TimeZone>(
    records: &[CanonicalRecord],
    now: &DateTime<Tz>,
) -> KpiSnapshot {
    let zone = now.timezone();
    let this_start = first_of_month(now.date_naive());
    let last_start = previous_month(this_start);

    let month_of = |record: &CanonicalRecord| record.reference_date(&zone).map(first_of_month);
    let this_month =
        MonthBucket::from_records(records.iter().filter(|r| month_of(*r) == Some(this_start)));
    let last_month =
        MonthBucket::from_records(records.iter().filter(|r| month_of(*r) == Some(last_start)));
    let overall = MonthBucket::from_records(records.iter());

    debug!(
        "KPI buckets for {}: this month {} records, last month {} records",
        this_start, this_month.count, last_month.count
    );

    KpiSnapshot {
        total_records: overall.count,
        total_invested: overall.invested,
        total_investors: overall.distinct_investors,
        this_month,
        last_month,
        count_delta: this_month.count as i64 - last_month.count as i64,
        invested_delta: this_month.invested - last_month.invested,
        investors_delta: this_month.distinct_investors as i64
            - last_month.distinct_investors as i64,
        growth_pct: growth_percentage(this_month.count as f64, last_month.count as f64),
    }
}

/// Percentage change from `last` to `current`.
///
/// With no baseline the growth is 100 when there is current activity and 0
/// otherwise.
pub fn growth_percentage(current: f64, last: f64) -> f64 {
    if last > 0.0 {
        (current - last) / last * 100.0
    } else if current > 0.0 {
        100.0
    } else {
        0.0
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn previous_month(first: NaiveDate) -> NaiveDate {
    let (year, month) = if first.month() == 1 {
        (first.year() - 1, 12)
    } else {
        (first.year(), first.month() - 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(first)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearTotal {
    pub year: i32,
    pub total: f64,
}

/// Sum of investment per founding year, ascending by year.
pub fn investment_by_year(records: &[CanonicalRecord]) -> Vec<YearTotal> {
    let mut totals: BTreeMap<i32, f64> = BTreeMap::new();
    for record in records {
        *totals.entry(record.founded_year).or_insert(0.0) += record.investment_amount;
    }
    totals
        .into_iter()
        .map(|(year, total)| YearTotal { year, total })
        .collect()
}

/// The `n` most recently founded startups, ties kept in input order.
pub fn recent_startups(records: &[CanonicalRecord], n: usize) -> Vec<CanonicalRecord> {
    let mut recent = records.to_vec();
    recent.sort_by(|a, b| b.founded_year.cmp(&a.founded_year));
    recent.truncate(n);
    recent
}
