use super::country::CountryImportConfig;
use super::duty::DutyAssessment;
use super::estimator::{landed, Landed};
use super::fees::{names, DerivedFees, FeeGroup, UserInputs};
use crate::money::{format_amount, format_rate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Agent commissions above this share of the vehicle value are flagged
pub const COMMISSION_BENCHMARK: Decimal = dec!(0.10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SavingsKind {
    SmallerEngine,
    YoungerVehicle,
    StorageDays,
    AgentCommission,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SavingsOpportunity {
    pub kind: SavingsKind,
    pub message: String,
    #[schemars(with = "f64")]
    pub amount: Decimal,
}

/// What-if rules: rerun the landed-cost sum with one input changed
pub fn find(
    inputs: &UserInputs,
    fees: &DerivedFees,
    duty: &DutyAssessment,
    config: &CountryImportConfig,
    current: &Landed,
) -> Vec<SavingsOpportunity> {
    let currency = &config.currency;
    let value = inputs.vehicle_value;
    let with_rate = |rate| landed(value, fees, rate, config.vat_rate);
    let mut out = Vec::new();

    if let Some(lower) = duty
        .bracket_index
        .checked_sub(1)
        .and_then(|i| config.duty_brackets.get(i))
    {
        let saving = current.total - with_rate(lower.rate + duty.age_increment).total;
        let limit = lower
            .max_engine_cc
            .map_or(String::new(), |cc| format!(" ({}cc or less)", cc));
        push(
            &mut out,
            SavingsKind::SmallerEngine,
            saving,
            format!(
                "A {} vehicle{} would lower duty and VAT by {}",
                lower.label,
                limit,
                format_amount(saving, currency)
            ),
        );
    }

    if let Some(first_step) = config.age_steps.first() {
        if duty.age_increment > Decimal::ZERO {
            let saving = current.total - with_rate(duty.base_rate).total;
            push(
                &mut out,
                SavingsKind::YoungerVehicle,
                saving,
                format!(
                    "A vehicle under {} years old avoids the {} age surcharge and saves {}",
                    first_step.min_age_years,
                    format_rate(duty.age_increment),
                    format_amount(saving, currency)
                ),
            );
        }
    }

    let storage = config.destination.storage;
    if inputs.storage_days > storage.free_days {
        let without = with_fee(fees, names::STORAGE, Decimal::ZERO);
        let saving = current.total - landed(value, &without, duty.rate, config.vat_rate).total;
        push(
            &mut out,
            SavingsKind::StorageDays,
            saving,
            format!(
                "Clearing within the {} free storage days saves {}",
                storage.free_days,
                format_amount(saving, currency)
            ),
        );
    }

    let benchmark = value * COMMISSION_BENCHMARK;
    if let Some(commission) = fees.origin.get(names::AGENT_COMMISSION) {
        if commission > benchmark {
            let negotiated = with_fee(fees, names::AGENT_COMMISSION, benchmark);
            let saving =
                current.total - landed(value, &negotiated, duty.rate, config.vat_rate).total;
            push(
                &mut out,
                SavingsKind::AgentCommission,
                saving,
                format!(
                    "Negotiating agent commission down to {} of the vehicle value saves {}",
                    format_rate(COMMISSION_BENCHMARK),
                    format_amount(saving, currency)
                ),
            );
        }
    }

    out
}

fn push(out: &mut Vec<SavingsOpportunity>, kind: SavingsKind, amount: Decimal, message: String) {
    if amount > Decimal::ZERO {
        out.push(SavingsOpportunity {
            kind,
            message,
            amount,
        });
    }
}

fn with_fee(fees: &DerivedFees, name: &str, amount: Decimal) -> DerivedFees {
    let replace = |group: &FeeGroup| {
        let mut group = group.clone();
        for line in group.lines.iter_mut().filter(|l| l.name == name) {
            line.amount = amount;
        }
        group
    };
    DerivedFees {
        origin: replace(&fees.origin),
        shipping: replace(&fees.shipping),
        pre_vat: replace(&fees.pre_vat),
        destination: replace(&fees.destination),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::country::Country;
    use crate::domain::estimator::{estimate, EstimateRequest};
    use crate::domain::vehicle::{FuelType, Transmission, VehicleAge, VehicleDetails};

    fn savings_for(inputs: UserInputs, engine_cc: u32, age: u32) -> Vec<SavingsOpportunity> {
        let request = EstimateRequest {
            country: Country::Namibia,
            vehicle: VehicleDetails {
                make: None,
                model: None,
                age: VehicleAge::Years(age),
                engine_cc,
                fuel: FuelType::Petrol,
                transmission: Transmission::Manual,
                mileage_km: None,
                condition: None,
            },
            inputs,
        };
        let config = CountryImportConfig::builtin(Country::Namibia);
        estimate(&request, &config, 2026).unwrap().savings
    }

    fn kinds(savings: &[SavingsOpportunity]) -> Vec<SavingsKind> {
        savings.iter().map(|s| s.kind).collect()
    }

    #[test]
    fn smaller_engine_saving() {
        let savings = savings_for(UserInputs::new(dec!(400000)), 2000, 3);
        assert_eq!(kinds(&savings), vec![SavingsKind::SmallerEngine]);
        // 5% of CIF 478000 = 23900 duty, plus 15% VAT on it = 3585
        assert_eq!(savings[0].amount, dec!(27485));
        assert!(savings[0].message.contains("1500cc or less"));
        assert!(savings[0].message.contains("N$ 27,485.00"));
    }

    #[test]
    fn nothing_to_save_for_small_young_car() {
        let savings = savings_for(UserInputs::new(dec!(400000)), 1300, 2);
        assert!(savings.is_empty());
    }

    #[test]
    fn older_vehicle_saving() {
        let savings = savings_for(UserInputs::new(dec!(400000)), 1300, 9);
        assert_eq!(kinds(&savings), vec![SavingsKind::YoungerVehicle]);
        // 10% of CIF 478000 = 47800 duty, plus 15% VAT = 7170
        assert_eq!(savings[0].amount, dec!(54970));
        assert!(savings[0].message.contains("under 5 years"));
    }

    #[test]
    fn storage_and_commission_savings() {
        let inputs = UserInputs {
            storage_days: 10,
            agent_commission: Some(dec!(50000)),
            ..UserInputs::new(dec!(400000))
        };
        let savings = savings_for(inputs, 1300, 2);
        assert_eq!(
            kinds(&savings),
            vec![SavingsKind::StorageDays, SavingsKind::AgentCommission]
        );
        assert_eq!(savings[0].amount, dec!(1050));
        // 10000 over benchmark, plus 20% duty and 15% VAT on the duty-inclusive amount
        assert_eq!(savings[1].amount, dec!(13800));
    }
}
