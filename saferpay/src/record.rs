//! Protocol records exchanged with the Saferpay hosting interface
//!
//! Every message is a flat set of named string fields. The record types only
//! differ in which endpoint they target and which fields are meaningful.

use crate::{Error, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Transaction identifier assigned by Saferpay
pub const FIELD_ID: &str = "ID";
/// Amount in minor units
pub const FIELD_AMOUNT: &str = "AMOUNT";
/// Saferpay terminal/account identifier
pub const FIELD_ACCOUNTID: &str = "ACCOUNTID";
/// ISO 4217 currency code
pub const FIELD_CURRENCY: &str = "CURRENCY";
/// Completion action
pub const FIELD_ACTION: &str = "ACTION";
/// Completion credential
pub const FIELD_SP_PASSWORD: &str = "spPassword";

/// Hosting interface endpoint a record is posted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Create a payment page link
    CreatePayInit,
    /// Verify a confirmation message and its signature
    VerifyPayConfirm,
    /// Settle, cancel or close an authorized transaction
    PayComplete,
}

impl Endpoint {
    /// Path of the endpoint below the configured base URL
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::CreatePayInit => "CreatePayInit.asp",
            Endpoint::VerifyPayConfirm => "VerifyPayConfirm.asp",
            Endpoint::PayComplete => "PayCompleteV2.asp",
        }
    }

    /// Full URL below `base_url`
    pub fn url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.path())
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::CreatePayInit => write!(f, "CreatePayInit"),
            Endpoint::VerifyPayConfirm => write!(f, "VerifyPayConfirm"),
            Endpoint::PayComplete => write!(f, "PayComplete"),
        }
    }
}

/// Completion action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Capture the authorized amount
    #[default]
    Settlement,
    /// Cancel the authorization
    Cancel,
    /// Close the batch
    Close,
}

impl Action {
    /// Wire value of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Settlement => "Settlement",
            Action::Cancel => "Cancel",
            Action::Close => "Close",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named field set of one protocol message.
///
/// A field that was never set (or was unset) is absent; an explicitly empty
/// value is present and will be sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    values: BTreeMap<String, String>,
}

impl Fields {
    /// Create an empty field set
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `name`, if present
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Set `name` to `value`, replacing any previous value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Make `name` absent again
    pub fn unset(&mut self, name: &str) -> Option<String> {
        self.values.remove(name)
    }

    /// Whether `name` is present
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Merge `other` into this set; values from `other` win
    pub fn merge<I, K, V>(&mut self, other: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in other {
            self.set(name, value);
        }
    }

    /// Iterate over present fields in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of present fields
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no field is present
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Export as a plain map
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.values.clone()
    }

    pub(crate) fn as_map(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        fields.merge(iter);
        fields
    }
}

/// Read access shared by every protocol record
pub trait Record {
    /// Endpoint this record belongs to; fixed per record type
    fn endpoint(&self) -> Endpoint;

    /// All present fields
    fn fields(&self) -> &Fields;

    /// Value of one field
    fn get(&self, name: &str) -> Option<&str> {
        self.fields().get(name)
    }
}

/// Records whose fields may be filled freely by callers or decoders
pub trait RecordMut: Record {
    /// Mutable access to the field set
    fn fields_mut(&mut self) -> &mut Fields;

    /// Set one field
    fn set(&mut self, name: impl Into<String>, value: impl Into<String>)
    where
        Self: Sized,
    {
        self.fields_mut().set(name, value);
    }

    /// Make one field absent
    fn unset(&mut self, name: &str) -> Option<String> {
        self.fields_mut().unset(name)
    }
}

macro_rules! record {
    ($(#[$meta:meta])* $name:ident => $endpoint:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            fields: Fields,
        }

        impl Record for $name {
            fn endpoint(&self) -> Endpoint {
                $endpoint
            }

            fn fields(&self) -> &Fields {
                &self.fields
            }
        }
    };
}

macro_rules! record_mut {
    ($name:ident) => {
        impl $name {
            /// Create an empty record
            pub fn new() -> Self {
                Self::default()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    fields: Fields::new(),
                }
            }
        }

        impl RecordMut for $name {
            fn fields_mut(&mut self) -> &mut Fields {
                &mut self.fields
            }
        }

        impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for $name {
            fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
                Self {
                    fields: iter.into_iter().collect(),
                }
            }
        }
    };
}

record! {
    /// Parameters for creating a payment page link
    PayInit => Endpoint::CreatePayInit
}
record_mut!(PayInit);

record! {
    /// Authorization result delivered through the confirmation callback
    PayConfirm => Endpoint::VerifyPayConfirm
}
record_mut!(PayConfirm);

record! {
    /// Completion request derived from a confirmed authorization.
    ///
    /// Only [`PayComplete::from_confirm`] builds one; there is no empty
    /// constructor:
    ///
    /// ```compile_fail
    /// let complete = saferpay::PayComplete::new();
    /// ```
    ///
    /// ```compile_fail
    /// let complete = saferpay::PayComplete::default();
    /// ```
    PayComplete => Endpoint::PayComplete
}

record! {
    /// Result of a completion request
    PayCompleteResponse => Endpoint::PayComplete
}
record_mut!(PayCompleteResponse);

impl PayInit {
    /// Saferpay account identifier
    pub fn account_id(mut self, account_id: impl Into<String>) -> Self {
        self.fields.set(FIELD_ACCOUNTID, account_id);
        self
    }

    /// Amount in minor units, e.g. `"1250"` for 12.50
    pub fn amount(mut self, amount: impl Into<String>) -> Self {
        self.fields.set(FIELD_AMOUNT, amount);
        self
    }

    /// Amount in major units; converted to minor units
    pub fn decimal_amount(self, amount: Decimal) -> Result<Self> {
        Ok(self.amount(minor_units(amount)?))
    }

    /// ISO 4217 currency code
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.fields.set(FIELD_CURRENCY, currency);
        self
    }

    /// Text shown on the payment page
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.fields.set("DESCRIPTION", description);
        self
    }

    /// Merchant order reference
    pub fn order_id(mut self, order_id: impl Into<String>) -> Self {
        self.fields.set("ORDERID", order_id);
        self
    }

    /// Redirect after successful authorization
    pub fn success_link(mut self, url: impl Into<String>) -> Self {
        self.fields.set("SUCCESSLINK", url);
        self
    }

    /// Redirect after failed authorization
    pub fn fail_link(mut self, url: impl Into<String>) -> Self {
        self.fields.set("FAILLINK", url);
        self
    }

    /// Redirect when the payer aborts
    pub fn back_link(mut self, url: impl Into<String>) -> Self {
        self.fields.set("BACKLINK", url);
        self
    }

    /// Server-to-server confirmation callback
    pub fn notify_url(mut self, url: impl Into<String>) -> Self {
        self.fields.set("NOTIFYURL", url);
        self
    }

    /// Payment page language (e.g. `de`, `en`)
    pub fn lang_id(mut self, lang: impl Into<String>) -> Self {
        self.fields.set("LANGID", lang);
        self
    }
}

impl PayConfirm {
    /// Transaction id; absent until the confirmation was decoded
    pub fn id(&self) -> Option<&str> {
        self.fields.get(FIELD_ID)
    }

    /// Authorized amount in minor units
    pub fn amount(&self) -> Option<&str> {
        self.fields.get(FIELD_AMOUNT)
    }

    /// Account the transaction was authorized on
    pub fn account_id(&self) -> Option<&str> {
        self.fields.get(FIELD_ACCOUNTID)
    }

    /// Currency of the authorization
    pub fn currency(&self) -> Option<&str> {
        self.fields.get(FIELD_CURRENCY)
    }

    /// Merchant order reference echoed back
    pub fn order_id(&self) -> Option<&str> {
        self.fields.get("ORDERID")
    }

    /// Payment means provider
    pub fn provider_id(&self) -> Option<&str> {
        self.fields.get("PROVIDERID")
    }
}

impl PayComplete {
    /// Derive the completion request for a confirmed authorization.
    ///
    /// Copies `ID`, `AMOUNT` and `ACCOUNTID` verbatim and adds `ACTION`.
    /// Fails when the confirmation carries no `ID`.
    pub fn from_confirm(confirm: &PayConfirm, action: Action) -> Result<Self> {
        let id = confirm.id().ok_or_else(|| {
            Error::Precondition("call confirm before complete".to_string())
        })?;

        let mut fields = Fields::new();
        fields.set(FIELD_ID, id);
        for name in [FIELD_AMOUNT, FIELD_ACCOUNTID] {
            if let Some(value) = confirm.get(name) {
                fields.set(name, value);
            }
        }
        fields.set(FIELD_ACTION, action.as_str());

        Ok(Self { fields })
    }

    /// Transaction id
    pub fn id(&self) -> Option<&str> {
        self.fields.get(FIELD_ID)
    }

    /// Amount in minor units
    pub fn amount(&self) -> Option<&str> {
        self.fields.get(FIELD_AMOUNT)
    }

    /// Account identifier
    pub fn account_id(&self) -> Option<&str> {
        self.fields.get(FIELD_ACCOUNTID)
    }

    /// Completion action
    pub fn action(&self) -> Option<&str> {
        self.fields.get(FIELD_ACTION)
    }
}

impl PayCompleteResponse {
    /// Transaction id echoed by the gateway
    pub fn id(&self) -> Option<&str> {
        self.fields.get(FIELD_ID)
    }

    /// Result field as sent by the gateway
    pub fn result(&self) -> Option<&str> {
        self.fields.get("RESULT")
    }

    /// Status field as sent by the gateway
    pub fn status(&self) -> Option<&str> {
        self.fields.get("STATUS")
    }
}

/// Convert a major-unit amount (`12.50`) to Saferpay minor units (`"1250"`).
pub fn minor_units(amount: Decimal) -> Result<String> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(Error::InvalidAmount(format!("{} is negative", amount)));
    }
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::ToZero);
    if rounded != amount {
        return Err(Error::InvalidAmount(format!(
            "{} has more than two fractional digits",
            amount
        )));
    }

    let cents = (rounded * Decimal::ONE_HUNDRED).normalize();
    Ok(cents.trunc().to_string())
}
