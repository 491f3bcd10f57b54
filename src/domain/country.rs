use crate::money::Currency;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;

/// Supported destination jurisdictions
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum Country {
    #[serde(rename = "na")]
    Namibia,
    #[serde(rename = "za")]
    SouthAfrica,
    #[serde(rename = "bw")]
    Botswana,
    #[serde(rename = "zm")]
    Zambia,
}

impl Country {
    pub const ALL: [Country; 4] = [
        Country::Namibia,
        Country::SouthAfrica,
        Country::Botswana,
        Country::Zambia,
    ];

    /// Parse a two-letter code or English name, case-insensitive
    pub fn from_code(s: &str) -> Option<Country> {
        match s.trim().to_lowercase().as_str() {
            "na" | "namibia" => Some(Country::Namibia),
            "za" | "south africa" | "south-africa" | "southafrica" => Some(Country::SouthAfrica),
            "bw" | "botswana" => Some(Country::Botswana),
            "zm" | "zambia" => Some(Country::Zambia),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Country::Namibia => "na",
            Country::SouthAfrica => "za",
            Country::Botswana => "bw",
            Country::Zambia => "zm",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Country::Namibia => "Namibia",
            Country::SouthAfrica => "South Africa",
            Country::Botswana => "Botswana",
            Country::Zambia => "Zambia",
        }
    }
}

impl std::fmt::Display for Country {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Country {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Country::from_code(s).ok_or_else(|| {
            format!(
                "unknown destination '{}', expected one of: na, za, bw, zm",
                s
            )
        })
    }
}

/// Engine-size bracket: applies up to and including `max_engine_cc`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DutyBracket {
    pub label: String,
    /// Upper bound in cc, inclusive. `None` for the open-ended top bracket
    #[serde(default)]
    pub max_engine_cc: Option<u32>,
    #[schemars(with = "f64")]
    pub rate: Decimal,
}

/// Duty surcharge once a vehicle reaches `min_age_years`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AgeStep {
    pub min_age_years: u32,
    #[schemars(with = "f64")]
    pub increment: Decimal,
}

/// Port storage: the first `free_days` are free, then `daily_rate` per day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StoragePolicy {
    pub free_days: u32,
    #[schemars(with = "f64")]
    pub daily_rate: Decimal,
}

impl StoragePolicy {
    pub fn fee(&self, days: u32) -> Decimal {
        let chargeable = days.saturating_sub(self.free_days);
        self.daily_rate * Decimal::from(chargeable)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OriginPresets {
    #[schemars(with = "f64")]
    pub auction_fee: Decimal,
    #[schemars(with = "f64")]
    pub transport_to_port: Decimal,
    #[schemars(with = "f64")]
    pub agent_commission: Decimal,
    #[schemars(with = "f64")]
    pub export_certificate: Decimal,
    #[schemars(with = "f64")]
    pub inspection: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ShippingPresets {
    #[schemars(with = "f64")]
    pub ocean_freight: Decimal,
    /// Marine insurance as a fraction of the vehicle value
    #[schemars(with = "f64")]
    pub insurance_rate: Decimal,
    #[schemars(with = "f64")]
    pub origin_port_handling: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DestinationPresets {
    #[schemars(with = "f64")]
    pub port_charges: Decimal,
    #[schemars(with = "f64")]
    pub clearing_agent: Decimal,
    /// Charged at the border and included in the VAT base
    #[schemars(with = "f64")]
    pub environmental_levy: Decimal,
    #[schemars(with = "f64")]
    pub registration: Decimal,
    #[schemars(with = "f64")]
    pub number_plates: Decimal,
    #[schemars(with = "f64")]
    pub roadworthy: Decimal,
    #[schemars(with = "f64")]
    pub inland_transport: Decimal,
    pub storage: StoragePolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TimelinePresets {
    pub origin_days: u32,
    pub transit_days: u32,
    pub clearance_days: u32,
}

impl TimelinePresets {
    pub fn total_days(&self) -> u32 {
        self.origin_days + self.transit_days + self.clearance_days
    }
}

/// Import rules and fee defaults for one destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CountryImportConfig {
    pub currency: Currency,
    /// Ordered by ascending engine size
    pub duty_brackets: Vec<DutyBracket>,
    /// Ordered by ascending age
    pub age_steps: Vec<AgeStep>,
    #[schemars(with = "f64")]
    pub vat_rate: Decimal,
    pub origin: OriginPresets,
    pub shipping: ShippingPresets,
    pub destination: DestinationPresets,
    pub timeline: TimelinePresets,
}

impl CountryImportConfig {
    /// Built-in defaults for a destination
    pub fn builtin(country: Country) -> Self {
        match country {
            Country::Namibia => CountryImportConfig {
                currency: Currency::nad(),
                duty_brackets: vec![
                    bracket("small passenger", Some(1500), dec!(0.20)),
                    bracket("mid passenger", Some(3000), dec!(0.25)),
                    bracket("large passenger", None, dec!(0.30)),
                ],
                age_steps: standard_age_steps(dec!(0.05), dec!(0.05)),
                vat_rate: dec!(0.15),
                origin: OriginPresets {
                    auction_fee: dec!(15000),
                    transport_to_port: dec!(6500),
                    agent_commission: dec!(12000),
                    export_certificate: dec!(2500),
                    inspection: dec!(3500),
                },
                shipping: ShippingPresets {
                    ocean_freight: dec!(28000),
                    insurance_rate: dec!(0.015),
                    origin_port_handling: dec!(4500),
                },
                destination: DestinationPresets {
                    port_charges: dec!(6000),
                    clearing_agent: dec!(8500),
                    environmental_levy: dec!(5000),
                    registration: dec!(1200),
                    number_plates: dec!(450),
                    roadworthy: dec!(850),
                    inland_transport: dec!(4500),
                    storage: StoragePolicy {
                        free_days: 7,
                        daily_rate: dec!(350),
                    },
                },
                timeline: TimelinePresets {
                    origin_days: 14,
                    transit_days: 35,
                    clearance_days: 10,
                },
            },
            Country::SouthAfrica => CountryImportConfig {
                currency: Currency::zar(),
                duty_brackets: vec![
                    bracket("small passenger", Some(1500), dec!(0.18)),
                    bracket("mid passenger", Some(3000), dec!(0.25)),
                    bracket("large passenger", None, dec!(0.30)),
                ],
                age_steps: standard_age_steps(dec!(0.05), dec!(0.05)),
                vat_rate: dec!(0.15),
                origin: OriginPresets {
                    auction_fee: dec!(15000),
                    transport_to_port: dec!(6500),
                    agent_commission: dec!(12000),
                    export_certificate: dec!(2500),
                    inspection: dec!(3500),
                },
                shipping: ShippingPresets {
                    ocean_freight: dec!(26000),
                    insurance_rate: dec!(0.015),
                    origin_port_handling: dec!(4500),
                },
                destination: DestinationPresets {
                    port_charges: dec!(7500),
                    clearing_agent: dec!(9500),
                    environmental_levy: dec!(6200),
                    registration: dec!(1500),
                    number_plates: dec!(600),
                    roadworthy: dec!(1100),
                    inland_transport: dec!(5500),
                    storage: StoragePolicy {
                        free_days: 3,
                        daily_rate: dec!(450),
                    },
                },
                timeline: TimelinePresets {
                    origin_days: 14,
                    transit_days: 30,
                    clearance_days: 14,
                },
            },
            Country::Botswana => CountryImportConfig {
                currency: Currency::bwp(),
                duty_brackets: vec![
                    bracket("compact passenger", Some(1000), dec!(0.15)),
                    bracket("small passenger", Some(2000), dec!(0.20)),
                    bracket("mid passenger", Some(3000), dec!(0.25)),
                    bracket("large passenger", None, dec!(0.30)),
                ],
                age_steps: standard_age_steps(dec!(0.05), dec!(0.05)),
                vat_rate: dec!(0.15),
                origin: OriginPresets {
                    auction_fee: dec!(11000),
                    transport_to_port: dec!(4800),
                    agent_commission: dec!(9000),
                    export_certificate: dec!(1900),
                    inspection: dec!(2600),
                },
                shipping: ShippingPresets {
                    ocean_freight: dec!(21000),
                    insurance_rate: dec!(0.015),
                    origin_port_handling: dec!(3400),
                },
                destination: DestinationPresets {
                    port_charges: dec!(4500),
                    clearing_agent: dec!(6500),
                    environmental_levy: dec!(3000),
                    registration: dec!(900),
                    number_plates: dec!(350),
                    roadworthy: dec!(600),
                    inland_transport: dec!(7500),
                    storage: StoragePolicy {
                        free_days: 7,
                        daily_rate: dec!(260),
                    },
                },
                timeline: TimelinePresets {
                    origin_days: 14,
                    transit_days: 35,
                    clearance_days: 12,
                },
            },
            Country::Zambia => CountryImportConfig {
                currency: Currency::zmw(),
                duty_brackets: vec![
                    bracket("small passenger", Some(1500), dec!(0.25)),
                    bracket("mid passenger", Some(2500), dec!(0.30)),
                    bracket("large passenger", None, dec!(0.35)),
                ],
                age_steps: standard_age_steps(dec!(0.05), dec!(0.10)),
                vat_rate: dec!(0.15),
                origin: OriginPresets {
                    auction_fee: dec!(21000),
                    transport_to_port: dec!(9100),
                    agent_commission: dec!(16800),
                    export_certificate: dec!(3500),
                    inspection: dec!(4900),
                },
                shipping: ShippingPresets {
                    ocean_freight: dec!(39000),
                    insurance_rate: dec!(0.015),
                    origin_port_handling: dec!(6300),
                },
                destination: DestinationPresets {
                    port_charges: dec!(8400),
                    clearing_agent: dec!(12000),
                    environmental_levy: dec!(4200),
                    registration: dec!(2100),
                    number_plates: dec!(700),
                    roadworthy: dec!(1200),
                    inland_transport: dec!(18000),
                    storage: StoragePolicy {
                        free_days: 5,
                        daily_rate: dec!(500),
                    },
                },
                timeline: TimelinePresets {
                    origin_days: 14,
                    transit_days: 35,
                    clearance_days: 21,
                },
            },
        }
    }

    /// Bracket for an engine size; falls through to the last bracket
    pub fn bracket_for(&self, engine_cc: u32) -> Option<(usize, &DutyBracket)> {
        self.duty_brackets
            .iter()
            .enumerate()
            .find(|(_, b)| b.max_engine_cc.map_or(true, |max| engine_cc <= max))
            .or_else(|| self.duty_brackets.iter().enumerate().last())
    }

    /// Sum of age increments that apply at `age_years`
    pub fn age_increment(&self, age_years: u32) -> Decimal {
        self.age_steps
            .iter()
            .filter(|s| age_years >= s.min_age_years)
            .map(|s| s.increment)
            .sum()
    }

    /// Check internal consistency of a (possibly user supplied) config
    pub fn check(&self) -> Result<(), String> {
        if self.duty_brackets.is_empty() {
            return Err("at least one duty bracket is required".to_string());
        }
        let mut previous: Option<u32> = None;
        for (i, b) in self.duty_brackets.iter().enumerate() {
            if b.rate.is_sign_negative() {
                return Err(format!("duty bracket '{}' has a negative rate", b.label));
            }
            match (b.max_engine_cc, previous) {
                (Some(max), Some(prev)) if max <= prev => {
                    return Err(format!(
                        "duty bracket '{}' is not in ascending engine order",
                        b.label
                    ))
                }
                (None, _) if i + 1 != self.duty_brackets.len() => {
                    return Err(format!(
                        "open-ended duty bracket '{}' must be the last bracket",
                        b.label
                    ))
                }
                _ => {}
            }
            previous = b.max_engine_cc;
        }
        if self.age_steps.iter().any(|s| s.increment.is_sign_negative()) {
            return Err("age step increments must not be negative".to_string());
        }
        if self.vat_rate.is_sign_negative() {
            return Err("VAT rate must not be negative".to_string());
        }
        if let Some((field, _)) = self.presets().into_iter().find(|(_, v)| *v < Decimal::ZERO) {
            return Err(format!("{} must not be negative", field));
        }
        Ok(())
    }

    /// Every fee preset and per-unit rate, keyed by its JSON path
    fn presets(&self) -> [(&'static str, Decimal); 16] {
        let (o, s, d) = (&self.origin, &self.shipping, &self.destination);
        [
            ("origin.auction_fee", o.auction_fee),
            ("origin.transport_to_port", o.transport_to_port),
            ("origin.agent_commission", o.agent_commission),
            ("origin.export_certificate", o.export_certificate),
            ("origin.inspection", o.inspection),
            ("shipping.ocean_freight", s.ocean_freight),
            ("shipping.insurance_rate", s.insurance_rate),
            ("shipping.origin_port_handling", s.origin_port_handling),
            ("destination.port_charges", d.port_charges),
            ("destination.clearing_agent", d.clearing_agent),
            ("destination.environmental_levy", d.environmental_levy),
            ("destination.registration", d.registration),
            ("destination.number_plates", d.number_plates),
            ("destination.roadworthy", d.roadworthy),
            ("destination.inland_transport", d.inland_transport),
            ("destination.storage.daily_rate", d.storage.daily_rate),
        ]
    }
}

fn bracket(label: &str, max_engine_cc: Option<u32>, rate: Decimal) -> DutyBracket {
    DutyBracket {
        label: label.to_string(),
        max_engine_cc,
        rate,
    }
}

fn standard_age_steps(first: Decimal, second: Decimal) -> Vec<AgeStep> {
    vec![
        AgeStep {
            min_age_years: 5,
            increment: first,
        },
        AgeStep {
            min_age_years: 8,
            increment: second,
        },
    ]
}

#[derive(Debug, thiserror::Error)]
pub enum RateTableError {
    #[error("invalid rates file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid rates for {country}: {reason}")]
    Invalid { country: Country, reason: String },
}

/// Per-destination configuration, built-in unless overridden
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    overrides: BTreeMap<Country, CountryImportConfig>,
}

impl RateTable {
    pub fn builtin() -> Self {
        RateTable::default()
    }

    /// Load overrides from JSON keyed by country code, e.g. `{"na": {...}}`
    pub fn load<R: Read>(reader: R) -> Result<Self, RateTableError> {
        let overrides: BTreeMap<Country, CountryImportConfig> = serde_json::from_reader(reader)?;
        for (country, config) in &overrides {
            config.check().map_err(|reason| RateTableError::Invalid {
                country: *country,
                reason,
            })?;
            log::info!("Using rate overrides for {}", country);
        }
        Ok(RateTable { overrides })
    }

    pub fn config(&self, country: Country) -> CountryImportConfig {
        self.overrides
            .get(&country)
            .cloned()
            .unwrap_or_else(|| CountryImportConfig::builtin(country))
    }

    pub fn is_overridden(&self, country: Country) -> bool {
        self.overrides.contains_key(&country)
    }
}
