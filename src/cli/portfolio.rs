use super::ui;
use crate::core::record::StockRecord;
use crate::store::StockStore;
use anyhow::Result;
use comfy_table::Cell;
use std::collections::HashMap;

/// Prints the current model portfolio grouped by broad sector, largest
/// sector first, with per-sector subtotals.
pub fn run(store: &StockStore) -> Result<()> {
    let holdings: Vec<StockRecord> = store
        .all()?
        .into_iter()
        .filter(|r| r.portfolio_weight > 0.0)
        .collect();

    if holdings.is_empty() {
        println!("No portfolio allocation found. Run `rebalance` first.");
        return Ok(());
    }

    let mut sectors: HashMap<String, Vec<&StockRecord>> = HashMap::new();
    for record in &holdings {
        sectors
            .entry(record.broad_sector.clone())
            .or_default()
            .push(record);
    }

    let mut sectors: Vec<_> = sectors.into_iter().collect();
    sectors.sort_by(|(_, a), (_, b)| {
        let a_total: f64 = a.iter().map(|r| r.portfolio_weight).sum();
        let b_total: f64 = b.iter().map(|r| r.portfolio_weight).sum();
        b_total
            .partial_cmp(&a_total)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Sector"),
        ui::header_cell("Symbol"),
        ui::header_cell("Score"),
        ui::header_cell("Weight"),
    ]);

    for (sector, records) in &mut sectors {
        records.sort_by(|a, b| {
            b.portfolio_weight
                .partial_cmp(&a.portfolio_weight)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.symbol.cmp(&b.symbol))
        });

        let sector_total: f64 = records.iter().map(|r| r.portfolio_weight).sum();
        table.add_row(vec![
            Cell::new(&sector),
            Cell::new(""),
            Cell::new(""),
            ui::weight_cell(sector_total),
        ]);

        for record in records.iter() {
            table.add_row(vec![
                Cell::new(""),
                Cell::new(&record.symbol),
                ui::score_cell(record.final_score),
                ui::numeric_cell(format!("{:.2}%", record.portfolio_weight * 100.0)),
            ]);
        }
    }

    let total_weight: f64 = holdings.iter().map(|r| r.portfolio_weight).sum();

    println!(
        "\nModel Portfolio: {}\n",
        ui::style_text(&format!("{} positions", holdings.len()), ui::StyleType::Title)
    );
    println!("{table}");
    println!(
        "\nTotal Weight: {}",
        ui::style_text(
            &format!("{:.2}%", total_weight * 100.0),
            ui::StyleType::TotalValue
        )
    );

    Ok(())
}
