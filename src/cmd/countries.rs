//! Countries command - destination rates and fee presets

use crate::cmd::load_rates;
use crate::domain::{Country, CountryImportConfig};
use crate::money::{format_amount, format_rate};
use clap::Args;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};

#[derive(Args, Debug)]
pub struct CountriesCommand {
    /// Show a single destination (na, za, bw, zm)
    country: Option<Country>,

    /// JSON file overriding the built-in country rates
    #[arg(long)]
    rates: Option<PathBuf>,

    /// Output the full configuration as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Tabled)]
struct CountryRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Country")]
    name: String,
    #[tabled(rename = "Currency")]
    currency: String,
    #[tabled(rename = "VAT")]
    vat: String,
    #[tabled(rename = "Duty brackets")]
    brackets: String,
    #[tabled(rename = "Age surcharge")]
    age_steps: String,
    #[tabled(rename = "Storage")]
    storage: String,
    #[tabled(rename = "Timeline")]
    timeline: String,
}

impl CountriesCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let rates = load_rates(self.rates.as_deref())?;
        let countries: Vec<Country> = match self.country {
            Some(c) => vec![c],
            None => Country::ALL.to_vec(),
        };

        if self.json {
            let configs: BTreeMap<Country, CountryImportConfig> =
                countries.iter().map(|c| (*c, rates.config(*c))).collect();
            println!("{}", serde_json::to_string_pretty(&configs)?);
            return Ok(());
        }

        let rows: Vec<CountryRow> = countries
            .iter()
            .map(|c| {
                let mut row = country_row(*c, &rates.config(*c));
                if rates.is_overridden(*c) {
                    row.name.push_str(" (custom rates)");
                }
                row
            })
            .collect();
        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{}", table);
        Ok(())
    }
}

fn country_row(country: Country, config: &CountryImportConfig) -> CountryRow {
    let c = &config.currency;
    let storage = config.destination.storage;
    CountryRow {
        code: country.code().to_string(),
        name: country.name().to_string(),
        currency: format!("{} ({})", c.code, c.symbol),
        vat: format_rate(config.vat_rate),
        brackets: describe_brackets(config),
        age_steps: config
            .age_steps
            .iter()
            .map(|s| format!("{}y+ +{}", s.min_age_years, format_rate(s.increment)))
            .collect::<Vec<_>>()
            .join(", "),
        storage: format!(
            "{} days free, then {}/day",
            storage.free_days,
            format_amount(storage.daily_rate, c)
        ),
        timeline: format!("{} days", config.timeline.total_days()),
    }
}

fn describe_brackets(config: &CountryImportConfig) -> String {
    let mut previous = None;
    config
        .duty_brackets
        .iter()
        .map(|b| {
            let range = match (b.max_engine_cc, previous) {
                (Some(max), _) => format!("<={}cc", max),
                (None, Some(prev)) => format!(">{}cc", prev),
                (None, None) => "any".to_string(),
            };
            previous = b.max_engine_cc;
            format!("{} {}", range, format_rate(b.rate))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namibia_row() {
        let row = country_row(
            Country::Namibia,
            &CountryImportConfig::builtin(Country::Namibia),
        );
        assert_eq!(row.code, "na");
        assert_eq!(row.currency, "NAD (N$)");
        assert_eq!(row.vat, "15%");
        assert_eq!(row.brackets, "<=1500cc 20%, <=3000cc 25%, >3000cc 30%");
        assert_eq!(row.age_steps, "5y+ +5%, 8y+ +5%");
        assert_eq!(row.storage, "7 days free, then N$ 350.00/day");
        assert_eq!(row.timeline, "59 days");
    }
}
