//! # Saferpay
//!
//! Client for the Saferpay hosting interface:
//! - PayInit: create the payment page link
//! - PayConfirm: decode and verify the signed confirmation callback
//! - PayComplete: settle, cancel or close the authorization
//!
//! ## Flow
//!
//! ```text
//!  merchant                      SaferpayClient                  Saferpay
//!     │  PayInit ───────────────▶ create_pay_init ─── POST ──────▶ CreatePayInit.asp
//!     │  ◀──────────────────────── payment page URL ◀──────────────┘
//!     │
//!     │  (payer authorizes, gateway calls back with DATA + SIGNATURE)
//!     │
//!     │  xml, signature ────────▶ verify_pay_confirm ─ POST ──────▶ VerifyPayConfirm.asp
//!     │  ◀──────────────────────── PayConfirm
//!     │
//!     │  PayConfirm, Action ────▶ pay_complete ────── POST ──────▶ PayCompleteV2.asp
//!     │  ◀──────────────────────── PayCompleteResponse ◀── "OK:<IDP .../>"
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use saferpay::{Action, Config, PayInit, SaferpayClient};
//!
//! #[tokio::main]
//! async fn main() -> saferpay::Result<()> {
//!     let client = SaferpayClient::new(Config::default())?;
//!
//!     let init = PayInit::new()
//!         .account_id("99867-94913159")
//!         .amount("1250")
//!         .currency("CHF")
//!         .description("Order 42");
//!     let redirect = client.create_pay_init(&init).await?;
//!     println!("send payer to {}", redirect);
//!
//!     // later, inside the success handler
//!     # let (data, signature) = (String::new(), String::new());
//!     let confirm = client.verify_pay_confirm(&data, &signature).await?;
//!     let completed = client.pay_complete(&confirm, Action::Settlement, None).await?;
//!     println!("completed: {:?}", completed.result());
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod client;
pub mod codec;
pub mod config;
pub mod credentials;
pub mod error;
pub mod logger;
pub mod metrics;
pub mod record;
pub mod transport;

pub use client::{SaferpayClient, SaferpayClientBuilder};
pub use config::Config;
pub use credentials::{is_test_account, Credential, CredentialPolicy};
pub use error::{Error, Result};
pub use logger::{EventLogger, NoopLogger, Severity, TracingLogger};
pub use record::*;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

/// Default hosting interface base URL
pub const DEFAULT_BASE_URL: &str = "https://www.saferpay.com/hosting";

/// Default request timeout (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// Length of the status marker (`OK:`) in front of completion responses
pub const ENVELOPE_MARKER_LEN: usize = 3;
