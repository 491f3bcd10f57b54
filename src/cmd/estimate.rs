//! Estimate command - landed cost for one vehicle

use crate::cmd::{current_year, load_rates};
use crate::domain::validation::{parse_decimal, parse_integer, ValidationError};
use crate::domain::{
    estimate, save_result, CalculationResult, ConditionGrade, CostBreakdown, Country,
    EstimateRequest, FuelType, JsonDirStore, SaveStatus, Transmission, UserInputs, VehicleAge,
    VehicleDetails,
};
use crate::money::{format_amount, format_rate};
use anyhow::Context;
use clap::{Args, ValueEnum};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct EstimateCommand {
    /// JSON estimate request (see `importc schema`). Replaces the vehicle and fee flags
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Destination country (na, za, bw, zm)
    #[arg(short, long, default_value = "na")]
    country: Country,

    /// Vehicle price in the destination currency
    #[arg(short, long)]
    value: Option<String>,

    /// Engine displacement in cc
    #[arg(short, long)]
    engine: Option<String>,

    /// Year of manufacture
    #[arg(short, long, conflicts_with = "age")]
    year: Option<String>,

    /// Vehicle age in years, instead of --year
    #[arg(long)]
    age: Option<String>,

    #[arg(long, value_enum, default_value_t = FuelArg::Petrol)]
    fuel: FuelArg,

    #[arg(long, value_enum, default_value_t = TransmissionArg::Automatic)]
    transmission: TransmissionArg,

    #[arg(long)]
    make: Option<String>,

    #[arg(long)]
    model: Option<String>,

    /// Odometer reading in km
    #[arg(long)]
    mileage: Option<String>,

    /// Auction grade (3, 3.5, 4, 4.5, 5, R)
    #[arg(long)]
    condition: Option<String>,

    /// Override the auction fee preset
    #[arg(long)]
    auction_fee: Option<String>,

    /// Override the transport-to-port preset
    #[arg(long)]
    transport: Option<String>,

    /// Override the agent commission preset
    #[arg(long)]
    agent_commission: Option<String>,

    /// Days the vehicle waits in port storage
    #[arg(long)]
    storage_days: Option<String>,

    /// Override the clearing agent preset
    #[arg(long)]
    clearing_fee: Option<String>,

    /// JSON file overriding the built-in country rates
    #[arg(long)]
    rates: Option<PathBuf>,

    /// Year used to derive vehicle age (defaults to this year)
    #[arg(long)]
    current_year: Option<i32>,

    /// Save the calculation into this directory
    #[arg(long)]
    save: Option<PathBuf>,

    /// Output as JSON instead of formatted tables
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum FuelArg {
    #[default]
    Petrol,
    Diesel,
    Hybrid,
    Electric,
}

impl From<FuelArg> for FuelType {
    fn from(arg: FuelArg) -> Self {
        match arg {
            FuelArg::Petrol => FuelType::Petrol,
            FuelArg::Diesel => FuelType::Diesel,
            FuelArg::Hybrid => FuelType::Hybrid,
            FuelArg::Electric => FuelType::Electric,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum TransmissionArg {
    Manual,
    #[default]
    Automatic,
}

impl From<TransmissionArg> for Transmission {
    fn from(arg: TransmissionArg) -> Self {
        match arg {
            TransmissionArg::Manual => Transmission::Manual,
            TransmissionArg::Automatic => Transmission::Automatic,
        }
    }
}

impl EstimateCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let rates = load_rates(self.rates.as_deref())?;
        let request = match &self.input {
            Some(path) => read_request(path)?,
            None => self.request_from_flags().map_err(invalid_input)?,
        };
        let config = rates.config(request.country);
        let year = current_year(self.current_year);

        let breakdown = estimate(&request, &config, year).map_err(invalid_input)?;
        let result = CalculationResult::new(&request, breakdown, chrono::Utc::now());

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            print_breakdown(&result);
        }

        if let Some(dir) = &self.save {
            match save_result(&JsonDirStore::new(dir), &result) {
                SaveStatus::Saved { id } => {
                    eprintln!("Saved calculation {} to {}", id, dir.display())
                }
                SaveStatus::Failed { reason } => eprintln!(
                    "Warning: calculation not saved ({}). The estimate above is unaffected.",
                    reason
                ),
            }
        }

        Ok(())
    }

    fn request_from_flags(&self) -> Result<EstimateRequest, ValidationError> {
        let fuel: FuelType = self.fuel.into();
        let value = required("vehicle_value", self.value.as_deref())?;

        let engine_cc = match self.engine.as_deref() {
            Some(raw) => parse_integer("engine_cc", raw)?,
            None if fuel == FuelType::Electric => 0,
            None => return Err(ValidationError::Missing { field: "engine_cc" }),
        };

        let age = match (self.year.as_deref(), self.age.as_deref()) {
            (Some(raw), _) => {
                let year = parse_integer("year", raw)?;
                VehicleAge::ManufactureYear(i32::try_from(year).unwrap_or(i32::MAX))
            }
            (None, Some(raw)) => VehicleAge::Years(parse_integer("vehicle_age", raw)?),
            (None, None) => return Err(ValidationError::Missing { field: "year" }),
        };

        let condition = match self.condition.as_deref() {
            Some(raw) => Some(ConditionGrade::from_str(raw).ok_or_else(|| {
                ValidationError::NotNumeric {
                    field: "condition",
                    value: raw.to_string(),
                }
            })?),
            None => None,
        };

        let vehicle = VehicleDetails {
            make: self.make.clone(),
            model: self.model.clone(),
            age,
            engine_cc,
            fuel,
            transmission: self.transmission.into(),
            mileage_km: optional_integer("mileage", self.mileage.as_deref())?,
            condition,
        };

        let inputs = UserInputs {
            vehicle_value: parse_decimal("vehicle_value", value)?,
            auction_fee: optional_decimal("auction_fee", self.auction_fee.as_deref())?,
            transport_to_port: optional_decimal("transport_to_port", self.transport.as_deref())?,
            agent_commission: optional_decimal(
                "agent_commission",
                self.agent_commission.as_deref(),
            )?,
            storage_days: optional_integer("storage_days", self.storage_days.as_deref())?
                .unwrap_or(0),
            clearing_agent_fee: optional_decimal(
                "clearing_agent_fee",
                self.clearing_fee.as_deref(),
            )?,
        };

        Ok(EstimateRequest {
            country: self.country,
            vehicle,
            inputs,
        })
    }
}

fn invalid_input(err: ValidationError) -> anyhow::Error {
    log::debug!("Rejected input field {}", err.field());
    anyhow::anyhow!("Invalid input: {}", err)
}

fn read_request(path: &Path) -> anyhow::Result<EstimateRequest> {
    let file =
        File::open(path).with_context(|| format!("cannot open request {}", path.display()))?;
    let request: EstimateRequest = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("invalid request {}", path.display()))?;
    log::info!("Read estimate request for {}", request.country);
    Ok(request)
}

fn required<'a>(
    field: &'static str,
    raw: Option<&'a str>,
) -> Result<&'a str, ValidationError> {
    raw.ok_or(ValidationError::Missing { field })
}

fn optional_decimal(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<rust_decimal::Decimal>, ValidationError> {
    raw.map(|r| parse_decimal(field, r)).transpose()
}

fn optional_integer(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<u32>, ValidationError> {
    raw.map(|r| parse_integer(field, r)).transpose()
}

#[derive(Debug, Clone, Tabled)]
struct FeeRow {
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Item")]
    item: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

#[derive(Debug, Clone, Tabled)]
struct SummaryRow {
    #[tabled(rename = "")]
    label: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

fn print_breakdown(result: &CalculationResult) {
    let b = &result.breakdown;
    let currency = &b.currency;
    let t = &b.totals;

    println!();
    println!(
        "LANDED COST ESTIMATE - {} ({}, {}cc, {} years)",
        b.country,
        result.vehicle.title(),
        b.engine_cc,
        b.age_years
    );
    println!();

    let fee_rows: Vec<FeeRow> = b
        .fees
        .groups()
        .iter()
        .flat_map(|g| {
            g.lines.iter().map(|l| FeeRow {
                group: g.kind.display().to_string(),
                item: if l.user_edited {
                    format!("{} *", l.name)
                } else {
                    l.name.clone()
                },
                amount: format_amount(l.amount, currency),
            })
        })
        .collect();
    let table = Table::new(fee_rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
    println!("  * edited value");
    println!();

    let summary = summary_rows(b);
    let table = Table::new(summary)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
    println!();
    println!("TOTAL LANDED COST: {}", format_amount(t.total, currency));
    println!("Estimated timeline: {} days", b.timeline_days);

    if !b.savings.is_empty() {
        println!();
        println!("SAVINGS OPPORTUNITIES");
        for s in &b.savings {
            println!("  - {}", s.message);
        }
    }
    println!();
}

fn summary_rows(b: &CostBreakdown) -> Vec<SummaryRow> {
    let c = &b.currency;
    let t = &b.totals;
    let row = |label: String, amount| SummaryRow {
        label,
        amount: format_amount(amount, c),
    };
    vec![
        row("Vehicle value".to_string(), t.vehicle_value),
        row("Origin costs".to_string(), t.origin),
        row("Shipping costs".to_string(), t.shipping),
        row("CIF value".to_string(), t.cif),
        row(
            format!(
                "Import duty ({}, {})",
                b.duty.bracket,
                format_rate(b.duty.rate)
            ),
            t.duty,
        ),
        row("Border levies".to_string(), t.pre_vat),
        row(
            format!(
                "VAT ({} of {})",
                format_rate(b.vat_rate),
                format_amount(t.vat_base, c)
            ),
            t.vat,
        ),
        row("Destination fees".to_string(), t.destination),
        row("Total".to_string(), t.total),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use rust_decimal_macros::dec;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        cmd: EstimateCommand,
    }

    fn parse(args: &[&str]) -> EstimateCommand {
        let mut argv = vec!["importc"];
        argv.extend_from_slice(args);
        Harness::parse_from(argv).cmd
    }

    #[test]
    fn builds_request_from_flags() {
        let cmd = parse(&[
            "-c", "na", "-v", "400,000", "-e", "2000", "--age", "3", "--storage-days", "9",
        ]);
        let request = cmd.request_from_flags().unwrap();
        assert_eq!(request.country, Country::Namibia);
        assert_eq!(request.inputs.vehicle_value, dec!(400000));
        assert_eq!(request.inputs.storage_days, 9);
        assert_eq!(request.vehicle.age, VehicleAge::Years(3));
        assert_eq!(request.inputs.auction_fee, None);
    }

    #[test]
    fn missing_value_names_field() {
        let cmd = parse(&["-e", "2000", "--age", "3"]);
        assert_eq!(
            cmd.request_from_flags().unwrap_err(),
            ValidationError::Missing {
                field: "vehicle_value"
            }
        );
    }

    #[test]
    fn non_numeric_fee_names_field() {
        let cmd = parse(&["-v", "1000", "-e", "1500", "-y", "2020", "--transport", "cheap"]);
        assert_eq!(cmd.request_from_flags().unwrap_err().field(), "transport_to_port");
    }

    #[test]
    fn electric_vehicle_may_omit_engine() {
        let cmd = parse(&["-v", "350000", "--fuel", "electric", "-y", "2022"]);
        let request = cmd.request_from_flags().unwrap();
        assert_eq!(request.vehicle.engine_cc, 0);
        assert_eq!(request.vehicle.age, VehicleAge::ManufactureYear(2022));
    }

    #[test]
    fn summary_lists_every_intermediate() {
        let cmd = parse(&["-v", "400000", "-e", "2000", "--age", "3"]);
        let request = cmd.request_from_flags().unwrap();
        let config = crate::domain::CountryImportConfig::builtin(Country::Namibia);
        let breakdown = estimate(&request, &config, 2026).unwrap();

        let rows = summary_rows(&breakdown);
        assert_eq!(rows.len(), 9);
        assert_eq!(rows[4].label, "Import duty (mid passenger, 25%)");
        assert_eq!(rows[6].label, "VAT (15% of N$ 602,500.00)");
        assert_eq!(rows[8].amount, "N$ 714,375.00");
    }
}
