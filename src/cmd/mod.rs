pub mod access;
pub mod countries;
pub mod estimate;
pub mod export;
pub mod history;
pub mod schema;

use crate::domain::RateTable;
use anyhow::Context;
use chrono::Datelike;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Built-in rates, or the built-ins with overrides from a JSON file
pub fn load_rates(path: Option<&Path>) -> anyhow::Result<RateTable> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("cannot open rates file {}", path.display()))?;
            Ok(RateTable::load(BufReader::new(file))?)
        }
        None => Ok(RateTable::builtin()),
    }
}

/// Year used to derive vehicle age; pinned for reproducible output
pub fn current_year(pinned: Option<i32>) -> i32 {
    pinned.unwrap_or_else(|| chrono::Local::now().year())
}
