//! Schema command - print expected input formats

use crate::domain::{Country, CountryImportConfig, Entitlement, EstimateRequest};
use clap::Args;
use schemars::schema_for;
use std::collections::BTreeMap;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Which format to describe
    #[arg(value_enum, default_value = "request")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for `estimate --input`
    Request,
    /// JSON Schema for `--rates` override files
    Rates,
    /// Entitlement CSV header row
    CsvHeader,
    /// Entitlement CSV column descriptions
    CsvFields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::Request => {
                let schema = schema_for!(EstimateRequest);
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
            SchemaFormat::Rates => {
                let schema = schema_for!(BTreeMap<Country, CountryImportConfig>);
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
            SchemaFormat::CsvHeader => println!("{}", Entitlement::csv_header().join(",")),
            SchemaFormat::CsvFields => self.print_csv_fields(),
        }
        Ok(())
    }

    fn print_csv_fields(&self) {
        println!("Entitlement CSV Format");
        println!("======================");
        println!();
        for field in Entitlement::csv_schema() {
            let req = if field.required { "required" } else { "optional" };
            println!("{:10} ({:8})  {}", field.name, req, field.description);
        }
        println!();
        println!("Tiers: mistake, mastery. Matching is by user_id or case-insensitive email.");
    }
}
