use super::ui;
use crate::core::analytics::{self, KpiSnapshot, YearTotal};
use crate::core::config::AppConfig;
use crate::core::money::format_short;
use crate::core::record::CanonicalRecord;
use crate::core::source::StartupSource;
use anyhow::Result;
use chrono::{DateTime, Local};
use comfy_table::{Cell, CellAlignment};

const CHART_WIDTH: usize = 40;

pub async fn run(
    source: &(dyn StartupSource + Send + Sync),
    config: &AppConfig,
    now: DateTime<Local>,
) -> Result<()> {
    let page = super::load_page(source, config.currency).await?;
    let records = page.records();

    let kpi = analytics::kpi_deltas(records, &now);
    let recent = analytics::recent_startups(records, config.display.recent_count);
    let by_year = analytics::investment_by_year(records);

    println!("{}", render_kpis(&kpi));
    ui::print_separator();
    println!("{}", render_recent(&recent));
    ui::print_separator();
    println!("{}", render_investment_by_year(&by_year));
    Ok(())
}

pub fn render_kpis(kpi: &KpiSnapshot) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Metric"),
        ui::header_cell("Value"),
        ui::header_cell("vs. last month"),
    ]);

    table.add_row(vec![
        Cell::new("Total startups"),
        Cell::new(kpi.total_records).set_alignment(CellAlignment::Right),
        ui::delta_cell(ui::signed(kpi.count_delta), kpi.count_delta >= 0),
    ]);
    table.add_row(vec![
        Cell::new("Total invested"),
        ui::amount_cell(kpi.total_invested),
        ui::delta_cell(format_short(kpi.invested_delta), kpi.invested_delta >= 0.0),
    ]);
    table.add_row(vec![
        Cell::new("Active investors"),
        Cell::new(kpi.total_investors).set_alignment(CellAlignment::Right),
        ui::delta_cell(ui::signed(kpi.investors_delta), kpi.investors_delta >= 0),
    ]);
    let growth = format!("{:.1}%", kpi.growth_pct);
    table.add_row(vec![
        Cell::new("Monthly growth"),
        Cell::new(&growth).set_alignment(CellAlignment::Right),
        ui::delta_cell(growth.clone(), kpi.growth_pct >= 0.0),
    ]);

    format!(
        "{}\n\n{}",
        ui::style_text("Startup Dashboard", ui::StyleType::Title),
        table
    )
}

pub fn render_recent(recent: &[CanonicalRecord]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Startup"),
        ui::header_cell("Sector"),
        ui::header_cell("Country"),
        ui::header_cell("Founded"),
        ui::header_cell("Last investment"),
        ui::header_cell("Investor"),
        ui::header_cell("Website"),
    ]);
    for record in recent {
        table.add_row(vec![
            Cell::new(&record.name),
            Cell::new(&record.sector),
            Cell::new(&record.country),
            Cell::new(record.founded_year),
            ui::text_cell(&record.investment_raw),
            ui::text_cell(&record.investor),
            ui::text_cell(&record.website),
        ]);
    }

    format!(
        "{}\n\n{}",
        ui::style_text("Recent Startups", ui::StyleType::Title),
        table
    )
}

pub fn render_investment_by_year(by_year: &[YearTotal]) -> String {
    let mut output = format!(
        "{}\n\n",
        ui::style_text("Investment by Year", ui::StyleType::Title)
    );
    if by_year.is_empty() {
        output.push_str(&super::empty_result_message(false));
        return output;
    }

    let max = by_year.iter().map(|y| y.total).fold(0.0, f64::max);
    let lines: Vec<String> = by_year
        .iter()
        .map(|y| {
            format!(
                "{:>6} {:<width$} {}",
                y.year,
                ui::bar(y.total, max, CHART_WIDTH),
                format_short(y.total),
                width = CHART_WIDTH
            )
        })
        .collect();
    output.push_str(&lines.join("\n"));
    output
}
