//! Completion credential selection
//!
//! Saferpay test terminals share one public password; production terminals
//! need the merchant's own `spPassword` on PayComplete.

use crate::record::Action;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Account ids reserved for the public test terminal start with this prefix
pub const TEST_ACCOUNT_PREFIX: &str = "99867-";

/// Well-known completion password of the public test terminal
pub const TEST_ACCOUNT_PASSWORD: &str = "XAjc3Kna";

/// When a production account must supply a password
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialPolicy {
    /// Every completion needs a password
    #[default]
    Always,
    /// Settlements may go without; cancel/close need a password
    NonSettlementOnly,
}

impl std::str::FromStr for CredentialPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(CredentialPolicy::Always),
            "non_settlement_only" | "non-settlement-only" => {
                Ok(CredentialPolicy::NonSettlementOnly)
            }
            other => Err(Error::Configuration(format!(
                "unknown credential policy: {}",
                other
            ))),
        }
    }
}

/// Credential attached to a completion request
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Public test terminal password
    TestAccount,
    /// Merchant supplied password
    Supplied(String),
    /// No password is sent
    NotRequired,
}

impl Credential {
    /// Value for the `spPassword` field, if any
    pub fn password(&self) -> Option<&str> {
        match self {
            Credential::TestAccount => Some(TEST_ACCOUNT_PASSWORD),
            Credential::Supplied(password) => Some(password.as_str()),
            Credential::NotRequired => None,
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::TestAccount => write!(f, "TestAccount"),
            Credential::Supplied(_) => write!(f, "Supplied(***)"),
            Credential::NotRequired => write!(f, "NotRequired"),
        }
    }
}

/// Whether `account_id` belongs to the public test terminal.
///
/// Case-sensitive starts-with match; an id that merely contains the prefix
/// further in is a production id.
pub fn is_test_account(account_id: &str) -> bool {
    account_id.starts_with(TEST_ACCOUNT_PREFIX)
}

/// Pick the credential for completing a transaction on `account_id`.
pub fn resolve(
    account_id: &str,
    supplied_password: Option<&str>,
    action: Action,
    policy: CredentialPolicy,
) -> Result<Credential> {
    if is_test_account(account_id) {
        return Ok(Credential::TestAccount);
    }

    let supplied = supplied_password.filter(|p| !p.is_empty());
    match (supplied, policy, action) {
        (Some(password), _, _) => Ok(Credential::Supplied(password.to_string())),
        (None, CredentialPolicy::NonSettlementOnly, Action::Settlement) => {
            Ok(Credential::NotRequired)
        }
        (None, _, _) => Err(Error::MissingCredential {
            account_id: account_id.to_string(),
        }),
    }
}
