//! Access command - which paid tier an identity holds

use crate::domain::{check_access, Access, CsvEntitlementStore, Identity, Tier};
use clap::{Args, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct AccessCommand {
    /// CSV export of the entitlement table
    #[arg(short, long)]
    entitlements: PathBuf,

    /// Account id from the identity provider
    #[arg(short, long)]
    user_id: Option<String>,

    /// Account email
    #[arg(short = 'm', long)]
    email: Option<String>,

    /// Exit non-zero unless this tier (or a higher one) is held
    #[arg(short, long, value_enum)]
    require: Option<TierArg>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TierArg {
    Mistake,
    Mastery,
}

impl From<TierArg> for Tier {
    fn from(arg: TierArg) -> Self {
        match arg {
            TierArg::Mistake => Tier::Mistake,
            TierArg::Mastery => Tier::Mastery,
        }
    }
}

#[derive(Debug, Serialize)]
struct AccessOutput {
    granted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    tier: Option<Tier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    required: Option<Tier>,
}

impl AccessCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let identity = Identity::new(self.user_id.as_deref(), self.email.as_deref());
        if identity.is_anonymous() {
            anyhow::bail!("Provide --user-id and/or --email to check access.");
        }

        let store = CsvEntitlementStore::new(&self.entitlements);
        let access = check_access(&store, &identity)?;
        let required = self.require.map(Tier::from);
        let granted = match required {
            Some(tier) => access.allows(tier),
            None => access != Access::Denied,
        };

        if self.json {
            let output = AccessOutput {
                granted,
                tier: access.tier(),
                required,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            match access {
                Access::Granted(tier) => println!("Access: {}", tier.display()),
                Access::Denied => println!("Access denied: no active entitlement found"),
            }
            if let (Some(required), Access::Granted(_)) = (required, access) {
                if !granted {
                    println!("Requires the {} tier", required.display());
                }
            }
        }

        // Exit with code 1 when access is not granted
        if !granted {
            std::process::exit(1);
        }
        Ok(())
    }
}
