use super::ui;
use crate::core::analytics::{self, InvestorAggregate, InvestorStats};
use crate::core::config::AppConfig;
use crate::core::source::StartupSource;
use anyhow::Result;
use comfy_table::{Cell, CellAlignment};

pub async fn run(
    source: &(dyn StartupSource + Send + Sync),
    config: &AppConfig,
    search: &str,
) -> Result<()> {
    let page = super::load_page(source, config.currency).await?;

    let aggregates = analytics::build_investor_aggregates(page.records());
    let listed = analytics::search_investors(&aggregates, search);
    let top = analytics::rank_by_volume(&aggregates, config.display.ranking_size);
    let stats = analytics::investor_stats(&aggregates);

    println!("{}", render_list(&listed, !search.trim().is_empty()));
    ui::print_separator();
    println!("{}", render_ranking(&top));
    println!("\n{}", render_stats(&stats));
    Ok(())
}

pub fn render_list(listed: &[InvestorAggregate], searching: bool) -> String {
    let mut output = format!(
        "{}\n\n",
        ui::style_text("Investors", ui::StyleType::Title)
    );
    if listed.is_empty() {
        let hint = if searching {
            "No investors found. Try a different search term."
        } else {
            "No investors found."
        };
        output.push_str(&ui::style_text(hint, ui::StyleType::Subtle));
        return output;
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Investor"),
        ui::header_cell("Startups"),
        ui::header_cell("Total invested"),
    ]);
    for investor in listed {
        table.add_row(vec![
            Cell::new(&investor.name),
            Cell::new(investor.record_count).set_alignment(CellAlignment::Right),
            ui::amount_cell(investor.total_invested),
        ]);
    }
    output.push_str(&table.to_string());
    output
}

pub fn render_ranking(top: &[InvestorAggregate]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("#"),
        ui::header_cell("Investor"),
        ui::header_cell("Total invested"),
    ]);
    for (i, investor) in top.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1).set_alignment(CellAlignment::Right),
            Cell::new(&investor.name),
            ui::amount_cell(investor.total_invested),
        ]);
    }
    format!(
        "{}\n\n{}",
        ui::style_text("Ranking by Volume", ui::StyleType::Title),
        table
    )
}

pub fn render_stats(stats: &InvestorStats) -> String {
    format!(
        "{} {}\n{} {}",
        ui::style_text("Total investors:", ui::StyleType::TotalLabel),
        stats.investor_count,
        ui::style_text("Total volume:", ui::StyleType::TotalLabel),
        ui::style_text(
            &crate::core::money::format_short(stats.total_volume),
            ui::StyleType::TotalValue
        )
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregate(name: &str, total: f64, count: usize) -> InvestorAggregate {
        InvestorAggregate {
            name: name.to_string(),
            total_invested: total,
            record_count: count,
        }
    }

    #[test]
    fn test_render_ranking_numbers_entries() {
        let top = vec![aggregate("Kaszek", 9e7, 3), aggregate("Monashees", 2e6, 1)];
        let output = render_ranking(&top);
        assert!(output.contains("Kaszek"));
        assert!(output.contains("R$ 90.0M"));
        assert!(output.contains("R$ 2.0M"));
    }

    #[test]
    fn test_render_list_empty_search() {
        assert!(render_list(&[], true).contains("Try a different search term"));
    }

    #[test]
    fn test_render_stats() {
        let stats = InvestorStats {
            investor_count: 4,
            total_volume: 1.5e9,
        };
        let output = render_stats(&stats);
        assert!(output.contains("4"));
        assert!(output.contains("R$ 1.5B"));
    }
}
