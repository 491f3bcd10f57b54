//! Input limits and field-level validation errors

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::str::FromStr;

pub const MAX_VEHICLE_VALUE: Decimal = dec!(50000000);
pub const MAX_ENGINE_CC: u32 = 10_000;
pub const MAX_VEHICLE_AGE: u32 = 50;
pub const MAX_STORAGE_DAYS: u32 = 365;
/// Money inputs other than the vehicle value share the value ceiling
pub const MAX_FEE: Decimal = MAX_VEHICLE_VALUE;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a number")]
    NotNumeric { field: &'static str, value: String },
    #[error("{field}: is required")]
    Missing { field: &'static str },
    #[error("{field}: must be greater than zero")]
    NotPositive { field: &'static str },
    #[error("{field}: must not be negative")]
    Negative { field: &'static str },
    #[error("{field}: {value} exceeds the maximum of {max}")]
    AboveCeiling {
        field: &'static str,
        value: String,
        max: String,
    },
    #[error("{field}: {year} is after the current year {current}")]
    InFuture {
        field: &'static str,
        year: i32,
        current: i32,
    },
}

impl ValidationError {
    /// Name of the offending input field
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::NotNumeric { field, .. }
            | ValidationError::Missing { field }
            | ValidationError::NotPositive { field }
            | ValidationError::Negative { field }
            | ValidationError::AboveCeiling { field, .. }
            | ValidationError::InFuture { field, .. } => field,
        }
    }
}

/// Parse raw form text as a decimal amount. Accepts `1,250.50` style separators.
pub fn parse_decimal(field: &'static str, raw: &str) -> Result<Decimal, ValidationError> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',' && *c != '_').collect();
    if cleaned.is_empty() {
        return Err(ValidationError::Missing { field });
    }
    Decimal::from_str(&cleaned).map_err(|_| ValidationError::NotNumeric {
        field,
        value: raw.to_string(),
    })
}

/// Parse raw form text as a whole number
pub fn parse_integer(field: &'static str, raw: &str) -> Result<u32, ValidationError> {
    let value = parse_decimal(field, raw)?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::Negative { field });
    }
    if !value.fract().is_zero() {
        return Err(ValidationError::NotNumeric {
            field,
            value: raw.to_string(),
        });
    }
    value.to_u32().ok_or_else(|| ValidationError::AboveCeiling {
        field,
        value: raw.to_string(),
        max: u32::MAX.to_string(),
    })
}

pub fn check_vehicle_value(value: Decimal) -> Result<Decimal, ValidationError> {
    let field = "vehicle_value";
    if value <= Decimal::ZERO {
        return Err(ValidationError::NotPositive { field });
    }
    if value > MAX_VEHICLE_VALUE {
        return Err(ValidationError::AboveCeiling {
            field,
            value: value.to_string(),
            max: MAX_VEHICLE_VALUE.to_string(),
        });
    }
    Ok(value)
}

/// Electric vehicles have no displacement, so zero is accepted for them only
pub fn check_engine_cc(engine_cc: u32, electric: bool) -> Result<u32, ValidationError> {
    let field = "engine_cc";
    if engine_cc == 0 && !electric {
        return Err(ValidationError::NotPositive { field });
    }
    if engine_cc > MAX_ENGINE_CC {
        return Err(ValidationError::AboveCeiling {
            field,
            value: engine_cc.to_string(),
            max: MAX_ENGINE_CC.to_string(),
        });
    }
    Ok(engine_cc)
}

pub fn check_age(age_years: u32) -> Result<u32, ValidationError> {
    if age_years > MAX_VEHICLE_AGE {
        return Err(ValidationError::AboveCeiling {
            field: "vehicle_age",
            value: age_years.to_string(),
            max: MAX_VEHICLE_AGE.to_string(),
        });
    }
    Ok(age_years)
}

pub fn check_fee(field: &'static str, amount: Decimal) -> Result<Decimal, ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ValidationError::Negative { field });
    }
    if amount > MAX_FEE {
        return Err(ValidationError::AboveCeiling {
            field,
            value: amount.to_string(),
            max: MAX_FEE.to_string(),
        });
    }
    Ok(amount)
}

pub fn check_storage_days(days: u32) -> Result<u32, ValidationError> {
    if days > MAX_STORAGE_DAYS {
        return Err(ValidationError::AboveCeiling {
            field: "storage_days",
            value: days.to_string(),
            max: MAX_STORAGE_DAYS.to_string(),
        });
    }
    Ok(days)
}
