pub mod calculation;
pub mod country;
pub mod duty;
pub mod entitlement;
pub mod estimator;
pub mod fees;
pub mod savings;
pub mod validation;
pub mod vehicle;

// Flat public surface for domain types and functions.
pub use calculation::{save_result, CalculationResult, CalculationStore, JsonDirStore, SaveStatus};
pub use country::{Country, CountryImportConfig, RateTable};
pub use entitlement::{check_access, Access, CsvEntitlementStore, Entitlement, Identity, Tier};
pub use estimator::{estimate, CostBreakdown, EstimateRequest};
pub use fees::UserInputs;
pub use vehicle::{ConditionGrade, FuelType, Transmission, VehicleAge, VehicleDetails};

/// Failures of the external stores (entitlements, saved calculations)
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("malformed record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed row: {0}")]
    Csv(#[from] csv::Error),
}

/// Column description produced by `#[derive(CsvSchema)]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvField {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}
