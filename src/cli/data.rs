use super::ui;
use crate::core::config::{AppConfig, ExportConfig};
use crate::core::export::{self, CsvColumn};
use crate::core::filter::{self, FilterState, SortDirection, SortState};
use crate::core::record::CanonicalRecord;
use crate::core::source::StartupSource;
use anyhow::Result;
use comfy_table::{Cell, CellAlignment};
use std::path::PathBuf;
use tracing::info;

/// Where the current view should be exported, if at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    /// The file name from the configuration.
    Configured,
    Path(PathBuf),
}

pub async fn run(
    source: &(dyn StartupSource + Send + Sync),
    config: &AppConfig,
    filters: &FilterState,
    sort: &SortState,
    export_target: Option<&ExportTarget>,
) -> Result<()> {
    let page = super::load_page(source, config.currency).await?;
    let records = page.records();

    let view = filter::filter_and_sort(records, filters, sort);
    println!("{}", render_table(&view, records.len(), filters, sort));

    if let Some(target) = export_target {
        let path = export_view(&view, &config.export, target)?;
        println!(
            "\n{} {}",
            ui::style_text("Exported to", ui::StyleType::TotalLabel),
            ui::style_text(&path.display().to_string(), ui::StyleType::TotalValue)
        );
    }
    Ok(())
}

/// Writes `view` as CSV and returns the path written.
pub fn export_view(
    view: &[CanonicalRecord],
    export_config: &ExportConfig,
    target: &ExportTarget,
) -> Result<PathBuf> {
    let path = match target {
        ExportTarget::Configured => PathBuf::from(&export_config.filename),
        ExportTarget::Path(path) => path.clone(),
    };
    let columns = CsvColumn::DEFAULT_ORDER;
    let contents = if export_config.quote_fields {
        export::to_csv_quoted(view, &columns)?
    } else {
        export::to_csv(view, &columns)
    };
    export::write_csv(&path, &contents)?;
    info!("Exported {} rows to {}", view.len(), path.display());
    Ok(path)
}

pub fn render_table(
    view: &[CanonicalRecord],
    total: usize,
    filters: &FilterState,
    sort: &SortState,
) -> String {
    let arrow = match sort.direction {
        SortDirection::Ascending => "↑",
        SortDirection::Descending => "↓",
    };
    let mut output = format!(
        "{}\n{}\n\n",
        ui::style_text("Startup Data", ui::StyleType::Title),
        ui::style_text(
            &format!(
                "{} of {} records, sorted by {} {}",
                view.len(),
                total,
                sort.field,
                arrow
            ),
            ui::StyleType::Subtle
        )
    );

    if view.is_empty() {
        output.push_str(&super::empty_result_message(!filters.is_empty()));
        return output;
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Name"),
        ui::header_cell("Sector"),
        ui::header_cell("Country"),
        ui::header_cell("City"),
        ui::header_cell("Founded"),
        ui::header_cell("Last investment"),
        ui::header_cell("Amount"),
        ui::header_cell("Investor"),
        ui::header_cell("Stage"),
        ui::header_cell("Status"),
    ]);
    for record in view {
        table.add_row(vec![
            Cell::new(&record.name),
            Cell::new(&record.sector),
            Cell::new(&record.country),
            Cell::new(&record.city),
            Cell::new(record.founded_year).set_alignment(CellAlignment::Right),
            ui::text_cell(&record.investment_raw),
            ui::amount_cell(record.investment_amount),
            ui::text_cell(&record.investor),
            ui::text_cell(&record.stage),
            Cell::new(&record.status),
        ]);
    }
    output.push_str(&table.to_string());
    output
}
