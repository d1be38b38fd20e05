//! Terminal pages rendered from the projection engine.

pub mod dashboard;
pub mod data;
pub mod investors;
pub mod setup;
pub mod startups;
pub mod ui;

use crate::core::money::ConversionRates;
use crate::core::source::{LoadState, PageState, StartupSource};
use anyhow::{Result, bail};

/// Mounts a page and loads its records, showing a spinner meanwhile.
///
/// A failed load is reported to the user and returned as an error.
pub(crate) async fn load_page(
    source: &(dyn StartupSource + Send + Sync),
    rates: ConversionRates,
) -> Result<PageState> {
    let mut page = PageState::new(rates);
    let pb = ui::new_spinner("Fetching startups...");
    page.load(source).await;
    pb.finish_and_clear();

    if let LoadState::Failed(message) = page.state() {
        eprintln!(
            "{} {}",
            ui::style_text("Failed to load startups:", ui::StyleType::Error),
            message
        );
        bail!("Failed to load startups: {message}");
    }
    Ok(page)
}

/// Message shown when filters leave nothing to display.
pub(crate) fn empty_result_message(has_filters: bool) -> String {
    let hint = if has_filters {
        " Try clearing the filters."
    } else {
        ""
    };
    ui::style_text(
        &format!("No startups found.{hint}"),
        ui::StyleType::Subtle,
    )
}
