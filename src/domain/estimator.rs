//! Landed-cost estimation
//!
//! 1. origin and shipping subtotals
//! 2. CIF = vehicle value + origin + shipping
//! 3. duty = CIF x (bracket rate + age steps)
//! 4. VAT = (CIF + duty + border levies) x VAT rate
//! 5. total = CIF + duty + VAT + border levies + destination fees

use super::country::{Country, CountryImportConfig};
use super::duty::{self, DutyAssessment};
use super::fees::{DerivedFees, UserInputs};
use super::savings::{self, SavingsOpportunity};
use super::validation::ValidationError;
use super::vehicle::VehicleDetails;
use crate::money::Currency;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Everything needed to run one estimate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EstimateRequest {
    pub country: Country,
    pub vehicle: VehicleDetails,
    pub inputs: UserInputs,
}

/// Running totals of the landed-cost sum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Landed {
    #[schemars(with = "f64")]
    pub vehicle_value: Decimal,
    #[schemars(with = "f64")]
    pub origin: Decimal,
    #[schemars(with = "f64")]
    pub shipping: Decimal,
    #[schemars(with = "f64")]
    pub cif: Decimal,
    #[schemars(with = "f64")]
    pub duty: Decimal,
    #[schemars(with = "f64")]
    pub pre_vat: Decimal,
    #[schemars(with = "f64")]
    pub vat_base: Decimal,
    #[schemars(with = "f64")]
    pub vat: Decimal,
    #[schemars(with = "f64")]
    pub destination: Decimal,
    #[schemars(with = "f64")]
    pub total: Decimal,
}

/// Sum fee groups, duty and VAT for a given duty rate
pub fn landed(
    vehicle_value: Decimal,
    fees: &DerivedFees,
    duty_rate: Decimal,
    vat_rate: Decimal,
) -> Landed {
    let origin = fees.origin.subtotal();
    let shipping = fees.shipping.subtotal();
    let cif = vehicle_value + origin + shipping;
    let duty = cif * duty_rate;
    let pre_vat = fees.pre_vat.subtotal();
    let vat_base = cif + duty + pre_vat;
    let vat = vat_base * vat_rate;
    let destination = fees.destination.subtotal();
    let total = cif + duty + vat + pre_vat + destination;

    Landed {
        vehicle_value,
        origin,
        shipping,
        cif,
        duty,
        pre_vat,
        vat_base,
        vat,
        destination,
        total,
    }
}

/// Full result of an estimate, every intermediate exposed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CostBreakdown {
    pub country: Country,
    pub currency: Currency,
    pub age_years: u32,
    pub engine_cc: u32,
    pub fees: DerivedFees,
    pub duty: DutyAssessment,
    #[schemars(with = "f64")]
    pub vat_rate: Decimal,
    pub totals: Landed,
    pub timeline_days: u32,
    pub savings: Vec<SavingsOpportunity>,
}

impl CostBreakdown {
    pub fn total(&self) -> Decimal {
        self.totals.total
    }
}

/// Estimate the landed cost. Pure: same request, config and year give the same result.
pub fn estimate(
    request: &EstimateRequest,
    config: &CountryImportConfig,
    current_year: i32,
) -> Result<CostBreakdown, ValidationError> {
    let EstimateRequest {
        country,
        vehicle,
        inputs,
    } = request;

    inputs.validate()?;
    let age_years = vehicle.validate(current_year)?;

    let fees = DerivedFees::derive(inputs, config);
    let duty = duty::assess(config, vehicle.engine_cc, age_years);
    let totals = landed(inputs.vehicle_value, &fees, duty.rate, config.vat_rate);
    let savings = savings::find(inputs, &fees, &duty, config, &totals);

    let timeline = config.timeline;
    let timeline_days = timeline.origin_days
        + timeline.transit_days
        + timeline.clearance_days.max(inputs.storage_days);

    log::debug!(
        "Estimate {}: value={} cif={} duty={} vat={} total={}",
        country,
        totals.vehicle_value,
        totals.cif,
        totals.duty,
        totals.vat,
        totals.total
    );

    Ok(CostBreakdown {
        country: *country,
        currency: config.currency.clone(),
        age_years,
        engine_cc: vehicle.engine_cc,
        fees,
        duty,
        vat_rate: config.vat_rate,
        totals,
        timeline_days,
        savings,
    })
}
