//! Export command - printable HTML document for a saved calculation
//!
//! The document is self-contained (inline CSS) and embeds the calculation as JSON
//! so it can be handed on to other renderers unchanged.

use crate::domain::{CalculationResult, CalculationStore, JsonDirStore};
use crate::money::{format_amount, format_rate};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ExportCommand {
    /// ID of the saved calculation (see `importc history`)
    id: String,

    /// Directory the calculation was saved to
    #[arg(short, long)]
    store: PathBuf,

    /// Output file path (default: opens in browser)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl ExportCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let store = JsonDirStore::new(&self.store);
        let result = store.load(&self.id)?;
        let html = generate(&result);

        if let Some(ref output_path) = self.output {
            std::fs::write(output_path, &html)?;
            println!("Calculation written to: {}", output_path.display());
        } else {
            let temp_path = std::env::temp_dir().join(format!("importc-{}.html", result.id));
            std::fs::write(&temp_path, &html)?;
            opener::open(&temp_path)?;
            println!("Opened calculation in browser: {}", temp_path.display());
        }

        Ok(())
    }
}

/// Render a calculation as a standalone HTML page
pub fn generate(result: &CalculationResult) -> String {
    let b = &result.breakdown;
    let c = &result.currency;
    let t = &b.totals;
    let json_data = serde_json::to_string(result)
        .unwrap_or_else(|_| "{}".to_string())
        .replace("</", "<\\/");

    let mut fee_rows = String::new();
    for group in b.fees.groups() {
        for line in &group.lines {
            fee_rows.push_str(&format!(
                "<tr><td>{}</td><td>{}{}</td><td class=\"num\">{}</td></tr>\n",
                group.kind.display(),
                escape(&line.name),
                if line.user_edited { " <span class=\"edited\">edited</span>" } else { "" },
                format_amount(line.amount, c)
            ));
        }
    }

    let summary = [
        ("Vehicle value".to_string(), t.vehicle_value),
        ("Origin costs".to_string(), t.origin),
        ("Shipping costs".to_string(), t.shipping),
        ("CIF value".to_string(), t.cif),
        (
            format!("Import duty ({}, {})", b.duty.bracket, format_rate(b.duty.rate)),
            t.duty,
        ),
        ("Border levies".to_string(), t.pre_vat),
        (format!("VAT ({})", format_rate(b.vat_rate)), t.vat),
        ("Destination fees".to_string(), t.destination),
    ];
    let summary_rows: String = summary
        .iter()
        .map(|(label, amount)| {
            format!(
                "<tr><td>{}</td><td class=\"num\">{}</td></tr>\n",
                escape(label),
                format_amount(*amount, c)
            )
        })
        .collect();

    let savings: String = if b.savings.is_empty() {
        String::new()
    } else {
        let items: String = b
            .savings
            .iter()
            .map(|s| format!("<li>{}</li>", escape(&s.message)))
            .collect();
        format!("<section><h2>Savings opportunities</h2><ul>{}</ul></section>", items)
    };

    let vehicle = &result.vehicle;
    let details = [
        ("Vehicle", escape(&vehicle.title())),
        ("Engine", format!("{}cc", vehicle.engine_cc)),
        ("Age", format!("{} years", b.age_years)),
        ("Fuel", format!("{:?}", vehicle.fuel)),
        ("Transmission", format!("{:?}", vehicle.transmission)),
        (
            "Mileage",
            vehicle
                .mileage_km
                .map_or("-".to_string(), |km| format!("{} km", km)),
        ),
        (
            "Condition",
            vehicle
                .condition
                .map_or("-".to_string(), |g| g.display().to_string()),
        ),
    ];
    let detail_rows: String = details
        .iter()
        .map(|(k, v)| format!("<dt>{}</dt><dd>{}</dd>", k, v))
        .collect();

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Landed Cost Estimate {id}</title>
    <style>
{css}
    </style>
</head>
<body>
    <header>
        <h1>Landed Cost Estimate: {country}</h1>
        <p class="meta">Reference {id} &middot; {created}</p>
    </header>
    <main>
        <section class="total">
            <h2>Total landed cost</h2>
            <p class="value">{total}</p>
            <p>Estimated timeline: {days} days</p>
        </section>
        <section>
            <h2>Vehicle</h2>
            <dl>{details}</dl>
        </section>
        <section>
            <h2>Fees</h2>
            <table>
                <thead><tr><th>Group</th><th>Item</th><th class="num">Amount</th></tr></thead>
                <tbody>
{fee_rows}                </tbody>
            </table>
        </section>
        <section>
            <h2>Summary</h2>
            <table>
                <tbody>
{summary_rows}                    <tr class="grand"><td>Total</td><td class="num">{total}</td></tr>
                </tbody>
            </table>
        </section>
        {savings}
    </main>
    <script type="application/json" id="calculation-data">{json_data}</script>
</body>
</html>
"##,
        id = escape(&result.id),
        css = CSS,
        country = result.country,
        created = result.created_at.format("%Y-%m-%d %H:%M UTC"),
        total = format_amount(result.total, c),
        days = result.timeline_days,
        details = detail_rows,
        fee_rows = fee_rows,
        summary_rows = summary_rows,
        savings = savings,
        json_data = json_data,
    )
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const CSS: &str = r#"
        body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif; margin: 0; color: #1f2933; background: #f5f7fa; }
        header { background: #12355b; color: #fff; padding: 1.5rem 2rem; }
        header h1 { margin: 0; font-size: 1.5rem; }
        .meta { margin: 0.25rem 0 0; opacity: 0.8; font-size: 0.9rem; }
        main { max-width: 860px; margin: 0 auto; padding: 1.5rem 2rem; }
        section { background: #fff; border-radius: 8px; padding: 1rem 1.5rem; margin-bottom: 1rem; box-shadow: 0 1px 3px rgba(0,0,0,0.08); }
        h2 { font-size: 1.1rem; margin-top: 0; }
        .total .value { font-size: 2rem; font-weight: 600; margin: 0.25rem 0; color: #12355b; }
        table { width: 100%; border-collapse: collapse; }
        th, td { padding: 0.4rem 0.5rem; border-bottom: 1px solid #e4e7eb; text-align: left; }
        .num { text-align: right; font-variant-numeric: tabular-nums; }
        tr.grand td { font-weight: 600; border-top: 2px solid #12355b; }
        .edited { font-size: 0.75rem; color: #8d6e00; background: #fff7d6; border-radius: 4px; padding: 0 0.3rem; }
        dl { display: grid; grid-template-columns: max-content 1fr; gap: 0.25rem 1rem; margin: 0; }
        dt { color: #616e7c; }
        dd { margin: 0; }
        @media print { body { background: #fff; } section { box-shadow: none; } header { color: #000; background: none; } }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        estimate, Country, CountryImportConfig, EstimateRequest, FuelType, Transmission,
        UserInputs, VehicleAge, VehicleDetails,
    };
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn result(model: &str) -> CalculationResult {
        let request = EstimateRequest {
            country: Country::Namibia,
            vehicle: VehicleDetails {
                make: Some("Toyota".to_string()),
                model: Some(model.to_string()),
                age: VehicleAge::Years(3),
                engine_cc: 2000,
                fuel: FuelType::Diesel,
                transmission: Transmission::Manual,
                mileage_km: Some(40_000),
                condition: None,
            },
            inputs: UserInputs::new(dec!(400000)),
        };
        let config = CountryImportConfig::builtin(Country::Namibia);
        let breakdown = estimate(&request, &config, 2026).unwrap();
        let at = chrono::Utc.with_ymd_and_hms(2026, 5, 4, 12, 30, 0).unwrap();
        CalculationResult::new(&request, breakdown, at)
    }

    #[test]
    fn document_contains_totals_and_data() {
        let html = generate(&result("Hilux"));
        assert!(html.contains("Landed Cost Estimate: Namibia"));
        assert!(html.contains("N$ 714,375.00"));
        assert!(html.contains("Import duty (mid passenger, 25%)"));
        assert!(html.contains("Estimated timeline: 59 days"));
        assert!(html.contains("2026-05-04 12:30 UTC"));
        assert!(html.contains("id=\"calculation-data\""));
        assert!(html.contains("Savings opportunities"));
    }

    #[test]
    fn user_text_is_escaped() {
        let html = generate(&result("<script>alert(1)</script>"));
        assert!(html.contains("Toyota &lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>alert(1)</script>"));
    }
}
