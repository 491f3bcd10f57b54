//! Saved calculation snapshots and where they are kept

use super::country::Country;
use super::estimator::{CostBreakdown, EstimateRequest};
use super::vehicle::VehicleDetails;
use super::StoreError;
use crate::money::Currency;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Immutable snapshot of one estimate. A new estimate supersedes, never edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CalculationResult {
    pub id: String,
    #[schemars(with = "String")]
    pub created_at: DateTime<Utc>,
    pub country: Country,
    pub currency: Currency,
    pub vehicle: VehicleDetails,
    pub breakdown: CostBreakdown,
    #[schemars(with = "f64")]
    pub total: Decimal,
    pub timeline_days: u32,
}

#[derive(Serialize)]
struct Payload<'a> {
    created_at: &'a DateTime<Utc>,
    country: Country,
    vehicle: &'a VehicleDetails,
    breakdown: &'a CostBreakdown,
}

impl CalculationResult {
    pub fn new(
        request: &EstimateRequest,
        breakdown: CostBreakdown,
        created_at: DateTime<Utc>,
    ) -> Self {
        let id = snapshot_id(&Payload {
            created_at: &created_at,
            country: request.country,
            vehicle: &request.vehicle,
            breakdown: &breakdown,
        });
        CalculationResult {
            id,
            created_at,
            country: request.country,
            currency: breakdown.currency.clone(),
            vehicle: request.vehicle.clone(),
            total: breakdown.total(),
            timeline_days: breakdown.timeline_days,
            breakdown,
        }
    }
}

/// Truncated SHA-256 of the serialized payload: the first 8 bytes, as 16 hex chars
fn snapshot_id(payload: &Payload) -> String {
    let mut hasher = Sha256::new();
    serde_json::to_writer(&mut hasher, payload)
        .expect("payload has only string keys and serializable fields");
    hex::encode(&hasher.finalize()[..8])
}

pub trait CalculationStore {
    fn save(&self, result: &CalculationResult) -> Result<(), StoreError>;
    fn load(&self, id: &str) -> Result<CalculationResult, StoreError>;
    /// All saved results, newest first
    fn list(&self) -> Result<Vec<CalculationResult>, StoreError>;
}

/// Outcome of trying to persist a result. The result itself is never touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Saved { id: String },
    Failed { reason: String },
}

pub fn save_result(store: &dyn CalculationStore, result: &CalculationResult) -> SaveStatus {
    match store.save(result) {
        Ok(()) => {
            log::info!("Saved calculation {}", result.id);
            SaveStatus::Saved {
                id: result.id.clone(),
            }
        }
        Err(err) => {
            log::warn!("Could not save calculation {}: {}", result.id, err);
            SaveStatus::Failed {
                reason: err.to_string(),
            }
        }
    }
}

/// One pretty-printed JSON file per calculation: `<dir>/<id>.json`
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonDirStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }
}

impl CalculationStore for JsonDirStore {
    fn save(&self, result: &CalculationResult) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(result)?;
        fs::write(self.path(&result.id), json)?;
        Ok(())
    }

    fn load(&self, id: &str) -> Result<CalculationResult, StoreError> {
        let valid = !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric());
        let path = self.path(id);
        if !valid || !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn list(&self) -> Result<Vec<CalculationResult>, StoreError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut results = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                match fs::read_to_string(&path)
                    .map_err(StoreError::from)
                    .and_then(|json| serde_json::from_str(&json).map_err(StoreError::from))
                {
                    Ok(result) => results.push(result),
                    Err(err) => log::warn!("Skipping {}: {}", path.display(), err),
                }
            }
        }
        results.sort_by(|a: &CalculationResult, b| b.created_at.cmp(&a.created_at));
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::country::CountryImportConfig;
    use crate::domain::estimator::estimate;
    use crate::domain::fees::UserInputs;
    use crate::domain::vehicle::{FuelType, Transmission, VehicleAge};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use std::cell::RefCell;

    fn result_at(value: Decimal, hour: u32) -> CalculationResult {
        let request = EstimateRequest {
            country: Country::Namibia,
            vehicle: VehicleDetails {
                make: Some("Honda".to_string()),
                model: Some("Fit".to_string()),
                age: VehicleAge::Years(4),
                engine_cc: 1300,
                fuel: FuelType::Hybrid,
                transmission: Transmission::Automatic,
                mileage_km: Some(62_000),
                condition: None,
            },
            inputs: UserInputs::new(value),
        };
        let config = CountryImportConfig::builtin(Country::Namibia);
        let breakdown = estimate(&request, &config, 2026).unwrap();
        let at = Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap();
        CalculationResult::new(&request, breakdown, at)
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("importc-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    struct FailingStore;

    impl CalculationStore for FailingStore {
        fn save(&self, _: &CalculationResult) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        fn load(&self, id: &str) -> Result<CalculationResult, StoreError> {
            Err(StoreError::NotFound(id.to_string()))
        }
        fn list(&self) -> Result<Vec<CalculationResult>, StoreError> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        saved: RefCell<Vec<CalculationResult>>,
    }

    impl CalculationStore for MemoryStore {
        fn save(&self, result: &CalculationResult) -> Result<(), StoreError> {
            self.saved.borrow_mut().push(result.clone());
            Ok(())
        }
        fn load(&self, id: &str) -> Result<CalculationResult, StoreError> {
            self.saved
                .borrow()
                .iter()
                .find(|r| r.id == id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(id.to_string()))
        }
        fn list(&self) -> Result<Vec<CalculationResult>, StoreError> {
            Ok(self.saved.borrow().clone())
        }
    }

    #[test]
    fn snapshot_carries_totals() {
        let result = result_at(dec!(180000), 9);
        assert_eq!(result.total, result.breakdown.total());
        assert_eq!(result.currency.code, "NAD");
        assert_eq!(result.id.len(), 16);
    }

    #[test]
    fn snapshot_id_is_truncated_digest() {
        let result = result_at(dec!(180000), 9);
        let request = EstimateRequest {
            country: result.country,
            vehicle: result.vehicle.clone(),
            inputs: UserInputs::new(dec!(180000)),
        };
        let payload = Payload {
            created_at: &result.created_at,
            country: result.country,
            vehicle: &result.vehicle,
            breakdown: &result.breakdown,
        };
        let digest = Sha256::digest(serde_json::to_vec(&payload).unwrap());
        assert_eq!(result.id, hex::encode(&digest[..8]));
        assert!(result.id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(
            CalculationResult::new(&request, result.breakdown.clone(), result.created_at).id,
            result.id
        );
    }

    #[test]
    fn equal_snapshots_share_an_id() {
        assert_eq!(result_at(dec!(180000), 9).id, result_at(dec!(180000), 9).id);
        assert_ne!(result_at(dec!(180000), 9).id, result_at(dec!(180001), 9).id);
        assert_ne!(result_at(dec!(180000), 9).id, result_at(dec!(180000), 10).id);
    }

    #[test]
    fn failed_save_leaves_result_unchanged() {
        let result = result_at(dec!(180000), 9);
        let before = result.clone();

        let status = save_result(&FailingStore, &result);

        assert!(matches!(
            status,
            SaveStatus::Failed { ref reason } if reason.contains("connection refused")
        ));
        assert_eq!(result, before);
    }

    #[test]
    fn successful_save_reports_id() {
        let store = MemoryStore::default();
        let result = result_at(dec!(180000), 9);
        assert_eq!(
            save_result(&store, &result),
            SaveStatus::Saved {
                id: result.id.clone()
            }
        );
        assert_eq!(store.load(&result.id).unwrap(), result);
    }

    #[test]
    fn json_dir_store_round_trip_and_ordering() {
        let dir = temp_dir("store");
        let store = JsonDirStore::new(&dir);
        assert!(store.list().unwrap().is_empty());

        let older = result_at(dec!(150000), 8);
        let newer = result_at(dec!(210000), 11);
        store.save(&older).unwrap();
        store.save(&newer).unwrap();
        fs::write(dir.join("junk.json"), "not json").unwrap();

        assert_eq!(store.load(&older.id).unwrap(), older);
        let ids: Vec<_> = store.list().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![newer.id.clone(), older.id.clone()]);

        assert!(matches!(store.load("missing"), Err(StoreError::NotFound(_))));
        assert!(matches!(store.load("../etc"), Err(StoreError::NotFound(_))));
        fs::remove_dir_all(&dir).unwrap();
    }
}
