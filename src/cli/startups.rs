use super::ui;
use crate::core::config::AppConfig;
use crate::core::filter::{self, FilterOptions, FilterState};
use crate::core::record::CanonicalRecord;
use crate::core::source::StartupSource;
use anyhow::Result;
use comfy_table::Cell;

pub async fn run(
    source: &(dyn StartupSource + Send + Sync),
    config: &AppConfig,
    filters: &FilterState,
) -> Result<()> {
    let page = super::load_page(source, config.currency).await?;
    let records = page.records();

    let options = FilterOptions::from_records(records);
    let matches = filter::apply_filters(records, filters);

    println!("{}", render_options(&options));
    ui::print_separator();
    println!("{}", render_cards(&matches, records.len(), filters));
    Ok(())
}

/// Lists the values each categorical filter accepts.
pub fn render_options(options: &FilterOptions) -> String {
    let line = |label: &str, values: &[String]| {
        format!(
            "{} {}",
            ui::style_text(label, ui::StyleType::TotalLabel),
            if values.is_empty() {
                ui::style_text("none", ui::StyleType::Subtle)
            } else {
                values.join(", ")
            }
        )
    };

    [
        line("Sectors:", &options.sectors),
        line("Countries:", &options.countries),
        line("Lead investors:", &options.investors),
    ]
    .join("\n")
}

pub fn render_cards(matches: &[CanonicalRecord], total: usize, filters: &FilterState) -> String {
    let mut output = format!(
        "{}\n{}\n\n",
        ui::style_text("Startups", ui::StyleType::Title),
        ui::style_text(
            &format!("Showing {} of {} startups", matches.len(), total),
            ui::StyleType::Subtle
        )
    );

    if matches.is_empty() {
        output.push_str(&super::empty_result_message(!filters.is_empty()));
        return output;
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Startup"),
        ui::header_cell("Sector"),
        ui::header_cell("Country"),
        ui::header_cell("Founded"),
        ui::header_cell("Last investment"),
        ui::header_cell("Investor"),
        ui::header_cell("Description"),
    ]);
    for record in matches {
        table.add_row(vec![
            Cell::new(&record.name),
            Cell::new(&record.sector),
            Cell::new(&record.country),
            Cell::new(record.founded_year),
            ui::text_cell(&record.investment_raw),
            ui::text_cell(&record.investor),
            ui::text_cell(&record.description),
        ]);
    }
    output.push_str(&table.to_string());
    output
}
