//! History command - saved calculations

use crate::domain::{CalculationResult, CalculationStore, JsonDirStore};
use crate::money::format_amount;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct HistoryCommand {
    /// Directory the calculations were saved to
    #[arg(short, long)]
    store: PathBuf,

    /// Only show calculations for this destination (na, za, bw, zm)
    #[arg(short, long)]
    country: Option<crate::domain::Country>,

    /// Output as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Tabled, Serialize)]
struct HistoryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Saved")]
    saved: String,
    #[tabled(rename = "Country")]
    country: String,
    #[tabled(rename = "Vehicle")]
    vehicle: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Days")]
    days: u32,
}

impl From<&CalculationResult> for HistoryRow {
    fn from(r: &CalculationResult) -> Self {
        HistoryRow {
            id: r.id.clone(),
            saved: r.created_at.format("%Y-%m-%d %H:%M").to_string(),
            country: r.country.code().to_string(),
            vehicle: format!("{} {}cc", r.vehicle.title(), r.vehicle.engine_cc),
            value: format_amount(r.breakdown.totals.vehicle_value, &r.currency),
            total: format_amount(r.total, &r.currency),
            days: r.timeline_days,
        }
    }
}

impl HistoryCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let store = JsonDirStore::new(&self.store);
        let rows: Vec<HistoryRow> = store
            .list()?
            .iter()
            .filter(|r| self.country.map_or(true, |c| r.country == c))
            .map(HistoryRow::from)
            .collect();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }

        if rows.is_empty() {
            println!("No saved calculations in {}", store.dir().display());
            return Ok(());
        }

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(4..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        Ok(())
    }
}
