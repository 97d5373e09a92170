use super::ui;
use crate::store::StockStore;
use anyhow::Result;
use comfy_table::Cell;
use std::cmp::Ordering;

/// Prints stored records as a ranking table, best composite score first.
pub fn run(store: &StockStore, limit: Option<usize>) -> Result<()> {
    let mut records = store.all()?;
    if records.is_empty() {
        println!("No analyzed stocks found. Run `analyze` first.");
        return Ok(());
    }

    records.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    let total = records.len();
    if let Some(limit) = limit {
        records.truncate(limit);
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("#"),
        ui::header_cell("Symbol"),
        ui::header_cell("Company"),
        ui::header_cell("Sector"),
        ui::header_cell("Price"),
        ui::header_cell("Intrinsic"),
        ui::header_cell("ROCE (%)"),
        ui::header_cell("D/E"),
        ui::header_cell("Score"),
    ]);

    for (rank, record) in records.iter().enumerate() {
        let intrinsic = if record.intrinsic_price_per_share > 0.0 {
            ui::numeric_cell(format!("{:.2}", record.intrinsic_price_per_share))
        } else {
            ui::format_optional_cell(None::<f64>, |v| format!("{v:.2}"))
        };

        table.add_row(vec![
            ui::numeric_cell(format!("{}", rank + 1)),
            Cell::new(&record.symbol),
            Cell::new(&record.company_name),
            Cell::new(ui::style_text(&record.broad_sector, ui::StyleType::Subtle)),
            ui::numeric_cell(format!("{:.2}", record.current_price)),
            intrinsic,
            ui::numeric_cell(format!("{:.1}", record.roce)),
            ui::format_optional_cell(record.debt_to_equity, |de| format!("{de:.2}")),
            ui::score_cell(record.final_score),
        ]);
    }

    println!(
        "\nStock Rankings: {}\n",
        ui::style_text(
            &format!("{} of {} analyzed", records.len(), total),
            ui::StyleType::Title
        )
    );
    println!("{table}");

    Ok(())
}
