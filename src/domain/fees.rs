//! Fee line items: editable user inputs and the read-only fees derived from them

use super::country::CountryImportConfig;
use super::validation::{check_fee, check_storage_days, check_vehicle_value, ValidationError};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FeeGroupKind {
    Origin,
    Shipping,
    /// Destination fees charged before VAT and included in its base
    DestinationPreVat,
    Destination,
}

impl FeeGroupKind {
    pub fn display(&self) -> &'static str {
        match self {
            FeeGroupKind::Origin => "Origin",
            FeeGroupKind::Shipping => "Shipping",
            FeeGroupKind::DestinationPreVat => "Border levies",
            FeeGroupKind::Destination => "Destination",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FeeLine {
    pub name: String,
    #[schemars(with = "f64")]
    pub amount: Decimal,
    /// True when the amount came from user input rather than presets
    #[serde(default)]
    pub user_edited: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FeeGroup {
    pub kind: FeeGroupKind,
    pub lines: Vec<FeeLine>,
}

impl FeeGroup {
    fn new(kind: FeeGroupKind) -> Self {
        FeeGroup {
            kind,
            lines: Vec::new(),
        }
    }

    fn line(mut self, name: &str, amount: Decimal) -> Self {
        self.lines.push(FeeLine {
            name: name.to_string(),
            amount,
            user_edited: false,
        });
        self
    }

    fn editable(mut self, name: &str, preset: Decimal, edited: Option<Decimal>) -> Self {
        self.lines.push(FeeLine {
            name: name.to_string(),
            amount: edited.unwrap_or(preset),
            user_edited: edited.is_some(),
        });
        self
    }

    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(|l| l.amount).sum()
    }

    pub fn get(&self, name: &str) -> Option<Decimal> {
        self.lines.iter().find(|l| l.name == name).map(|l| l.amount)
    }
}

/// Editable inputs. `None` means "use the destination preset"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UserInputs {
    /// Purchase price of the vehicle in the destination currency
    #[schemars(with = "f64")]
    pub vehicle_value: Decimal,
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub auction_fee: Option<Decimal>,
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub transport_to_port: Option<Decimal>,
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub agent_commission: Option<Decimal>,
    #[serde(default)]
    pub storage_days: u32,
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub clearing_agent_fee: Option<Decimal>,
}

impl UserInputs {
    pub fn new(vehicle_value: Decimal) -> Self {
        UserInputs {
            vehicle_value,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_vehicle_value(self.vehicle_value)?;
        let optional = [
            ("auction_fee", self.auction_fee),
            ("transport_to_port", self.transport_to_port),
            ("agent_commission", self.agent_commission),
            ("clearing_agent_fee", self.clearing_agent_fee),
        ];
        for (field, amount) in optional {
            if let Some(amount) = amount {
                check_fee(field, amount)?;
            }
        }
        check_storage_days(self.storage_days)?;
        Ok(())
    }
}

/// Fee names shared between derivation and the savings rules
pub mod names {
    pub const AUCTION_FEE: &str = "Auction fee";
    pub const TRANSPORT_TO_PORT: &str = "Transport to port";
    pub const AGENT_COMMISSION: &str = "Agent commission";
    pub const EXPORT_CERTIFICATE: &str = "Export certificate";
    pub const INSPECTION: &str = "Pre-shipment inspection";
    pub const OCEAN_FREIGHT: &str = "Ocean freight";
    pub const MARINE_INSURANCE: &str = "Marine insurance";
    pub const ORIGIN_PORT_HANDLING: &str = "Origin port handling";
    pub const ENVIRONMENTAL_LEVY: &str = "Environmental levy";
    pub const PORT_CHARGES: &str = "Port charges";
    pub const STORAGE: &str = "Port storage";
    pub const CLEARING_AGENT: &str = "Clearing agent";
    pub const REGISTRATION: &str = "Registration";
    pub const NUMBER_PLATES: &str = "Number plates";
    pub const ROADWORTHY: &str = "Roadworthy certificate";
    pub const INLAND_TRANSPORT: &str = "Inland transport";
}

/// Read-only fee groups derived from presets and user inputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DerivedFees {
    pub origin: FeeGroup,
    pub shipping: FeeGroup,
    pub pre_vat: FeeGroup,
    pub destination: FeeGroup,
}

impl DerivedFees {
    pub fn derive(inputs: &UserInputs, config: &CountryImportConfig) -> Self {
        let origin = FeeGroup::new(FeeGroupKind::Origin)
            .editable(
                names::AUCTION_FEE,
                config.origin.auction_fee,
                inputs.auction_fee,
            )
            .editable(
                names::TRANSPORT_TO_PORT,
                config.origin.transport_to_port,
                inputs.transport_to_port,
            )
            .editable(
                names::AGENT_COMMISSION,
                config.origin.agent_commission,
                inputs.agent_commission,
            )
            .line(names::EXPORT_CERTIFICATE, config.origin.export_certificate)
            .line(names::INSPECTION, config.origin.inspection);

        let shipping = FeeGroup::new(FeeGroupKind::Shipping)
            .line(names::OCEAN_FREIGHT, config.shipping.ocean_freight)
            .line(
                names::MARINE_INSURANCE,
                inputs.vehicle_value * config.shipping.insurance_rate,
            )
            .line(
                names::ORIGIN_PORT_HANDLING,
                config.shipping.origin_port_handling,
            );

        let pre_vat = FeeGroup::new(FeeGroupKind::DestinationPreVat).line(
            names::ENVIRONMENTAL_LEVY,
            config.destination.environmental_levy,
        );

        let storage_fee = config.destination.storage.fee(inputs.storage_days);
        let mut destination = FeeGroup::new(FeeGroupKind::Destination)
            .line(names::PORT_CHARGES, config.destination.port_charges)
            .line(names::STORAGE, storage_fee)
            .editable(
                names::CLEARING_AGENT,
                config.destination.clearing_agent,
                inputs.clearing_agent_fee,
            )
            .line(names::REGISTRATION, config.destination.registration)
            .line(names::NUMBER_PLATES, config.destination.number_plates)
            .line(names::ROADWORTHY, config.destination.roadworthy)
            .line(names::INLAND_TRANSPORT, config.destination.inland_transport);
        if let Some(line) = destination
            .lines
            .iter_mut()
            .find(|l| l.name == names::STORAGE)
        {
            line.user_edited = inputs.storage_days > 0;
        }

        DerivedFees {
            origin,
            shipping,
            pre_vat,
            destination,
        }
    }

    pub fn groups(&self) -> [&FeeGroup; 4] {
        [&self.origin, &self.shipping, &self.pre_vat, &self.destination]
    }
}
