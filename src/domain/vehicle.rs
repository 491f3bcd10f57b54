use super::validation::{check_age, check_engine_cc, ValidationError, MAX_VEHICLE_AGE};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    #[default]
    Petrol,
    Diesel,
    Hybrid,
    Electric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Transmission {
    Manual,
    #[default]
    Automatic,
}

/// Japanese auction sheet grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ConditionGrade {
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "3.5")]
    ThreeHalf,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "4.5")]
    FourHalf,
    #[serde(rename = "5")]
    Five,
    /// Repaired / accident history
    #[serde(rename = "R")]
    Repaired,
}

impl ConditionGrade {
    pub fn from_str(s: &str) -> Option<ConditionGrade> {
        match s.trim().to_uppercase().as_str() {
            "3" => Some(ConditionGrade::Three),
            "3.5" => Some(ConditionGrade::ThreeHalf),
            "4" => Some(ConditionGrade::Four),
            "4.5" => Some(ConditionGrade::FourHalf),
            "5" | "S" => Some(ConditionGrade::Five),
            "R" | "RA" => Some(ConditionGrade::Repaired),
            _ => None,
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            ConditionGrade::Three => "3",
            ConditionGrade::ThreeHalf => "3.5",
            ConditionGrade::Four => "4",
            ConditionGrade::FourHalf => "4.5",
            ConditionGrade::Five => "5",
            ConditionGrade::Repaired => "R",
        }
    }
}

/// How old the vehicle is: from its manufacture year, or stated directly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VehicleAge {
    ManufactureYear(i32),
    Years(u32),
}

impl VehicleAge {
    /// Resolve to whole years relative to `current_year`
    pub fn years(&self, current_year: i32) -> Result<u32, ValidationError> {
        match *self {
            VehicleAge::ManufactureYear(year) => {
                if year > current_year {
                    return Err(ValidationError::InFuture {
                        field: "year",
                        year,
                        current: current_year,
                    });
                }
                let age = current_year
                    .checked_sub(year)
                    .and_then(|age| u32::try_from(age).ok())
                    .ok_or_else(|| ValidationError::AboveCeiling {
                        field: "year",
                        value: year.to_string(),
                        max: format!("{} years of age", MAX_VEHICLE_AGE),
                    })?;
                check_age(age)
            }
            VehicleAge::Years(age) => check_age(age),
        }
    }
}

/// Descriptive attributes of the vehicle being imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VehicleDetails {
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    pub age: VehicleAge,
    /// Engine displacement in cc. Zero only for electric vehicles
    pub engine_cc: u32,
    #[serde(default)]
    pub fuel: FuelType,
    #[serde(default)]
    pub transmission: Transmission,
    #[serde(default)]
    pub mileage_km: Option<u32>,
    #[serde(default)]
    pub condition: Option<ConditionGrade>,
}

impl VehicleDetails {
    pub fn is_electric(&self) -> bool {
        self.fuel == FuelType::Electric
    }

    /// Validate engine size and age, returning the age in years
    pub fn validate(&self, current_year: i32) -> Result<u32, ValidationError> {
        check_engine_cc(self.engine_cc, self.is_electric())?;
        self.age.years(current_year)
    }

    pub fn title(&self) -> String {
        let parts: Vec<&str> = [self.make.as_deref(), self.model.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if parts.is_empty() {
            "Vehicle".to_string()
        } else {
            parts.join(" ")
        }
    }
}
