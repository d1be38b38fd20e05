//! The upstream data source and the load lifecycle of a page.

use super::money::ConversionRates;
use super::record::{CanonicalRecord, RawRecord, normalize_all};
use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// Something that can return the full current list of startups.
#[async_trait]
pub trait StartupSource: Send + Sync {
    async fn fetch_startups(&self) -> Result<Vec<RawRecord>>;
}

/// Identifies one load attempt. Only the latest token may complete a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded(Vec<CanonicalRecord>),
    Failed(String),
}

/// Data owned by one page between mount and teardown.
///
/// Each page fetches and keeps its own copy of the records; a completed
/// load replaces the whole list at once.
#[derive(Debug)]
pub struct PageState {
    rates: ConversionRates,
    generation: u64,
    state: LoadState,
}

impl PageState {
    pub fn new(rates: ConversionRates) -> Self {
        Self {
            rates,
            generation: 0,
            state: LoadState::Idle,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Loaded records, or an empty slice while loading or after a failure.
    pub fn records(&self) -> &[CanonicalRecord] {
        match &self.state {
            LoadState::Loaded(records) => records,
            _ => &[],
        }
    }

    /// Starts a load, invalidating any load still in flight.
    pub fn begin_load(&mut self) -> RequestToken {
        self.generation += 1;
        self.state = LoadState::Loading;
        debug!("Starting load #{}", self.generation);
        RequestToken(self.generation)
    }

    /// Applies the outcome of a fetch. Returns `false` and leaves the state
    /// untouched when `token` belongs to a superseded load.
    pub fn complete(&mut self, token: RequestToken, result: Result<Vec<RawRecord>>) -> bool {
        if token.0 != self.generation {
            warn!(
                "Dropping stale response for load #{} (current is #{})",
                token.0, self.generation
            );
            return false;
        }
        self.state = match result {
            Ok(raws) => {
                let records = normalize_all(&raws, &self.rates);
                info!("Loaded {} startups", records.len());
                LoadState::Loaded(records)
            }
            Err(e) => {
                warn!(error = %e, "Failed to load startups");
                LoadState::Failed(format!("{e:#}"))
            }
        };
        true
    }

    /// Fetches from `source` and applies the result.
    pub async fn load(&mut self, source: &(dyn StartupSource + Send + Sync)) -> &LoadState {
        let token = self.begin_load();
        let result = source.fetch_startups().await;
        self.complete(token, result);
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use serde_json::json;

    struct StaticSource(Vec<RawRecord>);

    #[async_trait]
    impl StartupSource for StaticSource {
        async fn fetch_startups(&self) -> Result<Vec<RawRecord>> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl StartupSource for FailingSource {
        async fn fetch_startups(&self) -> Result<Vec<RawRecord>> {
            Err(anyhow!("HTTP 500"))
        }
    }

    fn raw(name: &str) -> RawRecord {
        RawRecord::from_value(json!({ "nome": name }))
    }

    #[tokio::test]
    async fn test_load_success() {
        let mut page = PageState::new(ConversionRates::default());
        assert_eq!(page.state(), &LoadState::Idle);

        let source = StaticSource(vec![raw("Foo"), raw("Bar")]);
        page.load(&source).await;

        assert_eq!(page.records().len(), 2);
        assert_eq!(page.records()[0].name, "Foo");
    }

    #[tokio::test]
    async fn test_load_failure_is_terminal_state() {
        let mut page = PageState::new(ConversionRates::default());
        let state = page.load(&FailingSource).await;

        assert!(matches!(state, LoadState::Failed(msg) if msg.contains("HTTP 500")));
        assert!(page.records().is_empty());
    }

    #[test]
    fn test_stale_completion_is_dropped() {
        let mut page = PageState::new(ConversionRates::default());
        let first = page.begin_load();
        let second = page.begin_load();

        assert!(page.complete(second, Ok(vec![raw("New")])));
        assert!(!page.complete(first, Ok(vec![raw("Old")])));

        assert_eq!(page.records().len(), 1);
        assert_eq!(page.records()[0].name, "New");
    }

    #[test]
    fn test_reload_replaces_whole_list() {
        let mut page = PageState::new(ConversionRates::default());
        let token = page.begin_load();
        page.complete(token, Ok(vec![raw("A"), raw("B")]));

        let token = page.begin_load();
        assert_eq!(page.state(), &LoadState::Loading);
        assert!(page.records().is_empty());
        page.complete(token, Ok(vec![raw("C")]));

        assert_eq!(page.records().len(), 1);
    }
}
