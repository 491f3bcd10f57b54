//! Paid content tiers and who holds them

use super::country::Country;
use super::StoreError;
use importc_derive::CsvSchema;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

/// Purchased access level. Ordered: `Mastery` outranks `Mistake`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// The import mistakes guide
    Mistake,
    /// Full package: guides, calculators and directories
    Mastery,
}

impl Tier {
    pub fn from_str(s: &str) -> Option<Tier> {
        match s.trim().to_lowercase().as_str() {
            "mistake" => Some(Tier::Mistake),
            "mastery" => Some(Tier::Mastery),
            _ => None,
        }
    }

    /// Whether holding `self` unlocks content gated at `required`
    pub fn includes(&self, required: Tier) -> bool {
        *self >= required
    }

    pub fn display(&self) -> &'static str {
        match self {
            Tier::Mistake => "mistake",
            Tier::Mastery => "mastery",
        }
    }
}

/// One row of the entitlement table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, CsvSchema)]
pub struct Entitlement {
    /// Account id from the identity provider
    #[serde(default, deserialize_with = "empty_as_none")]
    pub user_id: Option<String>,
    /// Purchaser email address
    #[serde(default, deserialize_with = "empty_as_none")]
    pub email: Option<String>,
    /// Unrecognised tiers are kept as `None` and never grant access
    #[serde(deserialize_with = "lenient_tier")]
    pub tier: Option<Tier>,
    /// Only active rows grant access
    pub active: bool,
    /// Destination the purchase was made for (na, za, bw, zm)
    #[serde(default, deserialize_with = "lenient_country")]
    pub country: Option<Country>,
}

fn empty_as_none<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value: Option<String> = Option::deserialize(d)?;
    Ok(value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

fn lenient_tier<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Tier>, D::Error> {
    let value: Option<String> = Option::deserialize(d)?;
    Ok(value.as_deref().and_then(Tier::from_str))
}

fn lenient_country<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Country>, D::Error> {
    let value: Option<String> = Option::deserialize(d)?;
    Ok(value.as_deref().and_then(Country::from_code))
}

/// Who is asking. Either field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Option<String>,
    pub email: Option<String>,
}

impl Identity {
    pub fn new(user_id: Option<&str>, email: Option<&str>) -> Self {
        let clean = |s: Option<&str>| s.map(str::trim).filter(|s| !s.is_empty()).map(String::from);
        Identity {
            user_id: clean(user_id),
            email: clean(email),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none() && self.email.is_none()
    }

    /// Same user id, or same email ignoring case
    pub fn matches(&self, row: &Entitlement) -> bool {
        let by_id = matches!((&self.user_id, &row.user_id), (Some(a), Some(b)) if a == b);
        let by_email =
            matches!((&self.email, &row.email), (Some(a), Some(b)) if a.eq_ignore_ascii_case(b));
        by_id || by_email
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted(Tier),
    Denied,
}

impl Access {
    pub fn tier(&self) -> Option<Tier> {
        match self {
            Access::Granted(tier) => Some(*tier),
            Access::Denied => None,
        }
    }

    pub fn allows(&self, required: Tier) -> bool {
        self.tier().is_some_and(|t| t.includes(required))
    }
}

/// Highest tier among active rows matching the identity
pub fn resolve_tier<'a, I>(rows: I, identity: &Identity) -> Access
where
    I: IntoIterator<Item = &'a Entitlement>,
{
    rows.into_iter()
        .filter(|row| row.active && identity.matches(row))
        .filter_map(|row| row.tier)
        .max()
        .map_or(Access::Denied, Access::Granted)
}

pub trait EntitlementStore {
    /// Rows whose user id or email match, active or not
    fn find(&self, identity: &Identity) -> Result<Vec<Entitlement>, StoreError>;
}

/// Look up an identity. A miss is `Denied`; a store failure is an error.
pub fn check_access(
    store: &dyn EntitlementStore,
    identity: &Identity,
) -> Result<Access, StoreError> {
    if identity.is_anonymous() {
        return Ok(Access::Denied);
    }
    let rows = store.find(identity)?;
    let access = resolve_tier(&rows, identity);
    log::debug!("{} entitlement rows, access {:?}", rows.len(), access);
    Ok(access)
}

/// CSV export of the entitlement table
#[derive(Debug, Clone)]
pub struct CsvEntitlementStore {
    path: PathBuf,
}

impl CsvEntitlementStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvEntitlementStore { path: path.into() }
    }
}

pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Entitlement>, StoreError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: Entitlement = result?;
        rows.push(row);
    }
    log::info!("Read {} entitlement rows", rows.len());
    Ok(rows)
}

impl EntitlementStore for CsvEntitlementStore {
    fn find(&self, identity: &Identity) -> Result<Vec<Entitlement>, StoreError> {
        let file = File::open(&self.path)
            .map_err(|e| StoreError::Unavailable(format!("{}: {}", self.path.display(), e)))?;
        let rows = read_csv(file)?;
        Ok(rows.into_iter().filter(|r| identity.matches(r)).collect())
    }
}

#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryEntitlementStore {
    pub rows: Vec<Entitlement>,
}

#[cfg(test)]
impl EntitlementStore for MemoryEntitlementStore {
    fn find(&self, identity: &Identity) -> Result<Vec<Entitlement>, StoreError> {
        Ok(self
            .rows
            .iter()
            .filter(|r| identity.matches(r))
            .cloned()
            .collect())
    }
}
