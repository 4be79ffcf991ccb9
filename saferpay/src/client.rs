//! Saferpay client (drives PayInit → PayConfirm → PayComplete)

use crate::{
    codec,
    credentials::{self, Credential},
    logger::{EventLogger, NoopLogger},
    metrics::*,
    record::*,
    transport::{HttpRequest, ReqwestTransport, Transport},
    Config, Error, Result, ENVELOPE_MARKER_LEN,
};
use std::sync::Arc;
use std::time::Instant;

/// Form field carrying the confirmation message on verification
const FIELD_DATA: &str = "DATA";
/// Form field carrying the confirmation signature on verification
const FIELD_SIGNATURE: &str = "SIGNATURE";

/// Marker Saferpay puts into the body of failed requests
const GATEWAY_ERROR_MARKER: &str = "ERROR";

/// Saferpay hosting interface client.
///
/// Holds no per-transaction state: which protocol step a transaction is in
/// is expressed by the record the caller holds. Clones share the transport
/// and logger, so one client can serve concurrent transactions.
#[derive(Clone)]
pub struct SaferpayClient {
    config: Arc<Config>,
    transport: Arc<dyn Transport>,
    logger: Arc<dyn EventLogger>,
}

/// Builder for [`SaferpayClient`]
pub struct SaferpayClientBuilder {
    config: Config,
    transport: Option<Arc<dyn Transport>>,
    logger: Arc<dyn EventLogger>,
}

impl SaferpayClientBuilder {
    /// Transport used for every gateway call (required)
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Shared transport used for every gateway call
    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sink for protocol events; defaults to [`NoopLogger`]
    pub fn logger(mut self, logger: impl EventLogger + 'static) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    /// Shared sink for protocol events
    pub fn shared_logger(mut self, logger: Arc<dyn EventLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Build the client; fails when no transport was configured
    pub fn build(self) -> Result<SaferpayClient> {
        let transport = self.transport.ok_or_else(|| {
            Error::Configuration("no HTTP transport configured for Saferpay client".to_string())
        })?;
        if self.config.base_url.trim().is_empty() {
            return Err(Error::Configuration("base_url must not be empty".to_string()));
        }

        Ok(SaferpayClient {
            config: Arc::new(self.config),
            transport,
            logger: self.logger,
        })
    }
}

impl SaferpayClient {
    /// Start building a client
    pub fn builder(config: Config) -> SaferpayClientBuilder {
        SaferpayClientBuilder {
            config,
            transport: None,
            logger: Arc::new(NoopLogger),
        }
    }

    /// Client with the bundled `reqwest` transport and no logging
    pub fn new(config: Config) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Self::builder(config).transport(transport).build()
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Create a payment page link.
    ///
    /// Returns the gateway body untouched; on success this is the URL the
    /// payer has to be redirected to.
    pub async fn create_pay_init(&self, pay_init: &PayInit) -> Result<String> {
        self.request(pay_init.endpoint(), pay_init.fields()).await
    }

    /// Decode and verify a confirmation delivered to the success/notify URL.
    pub async fn verify_pay_confirm(&self, xml: &str, signature: &str) -> Result<PayConfirm> {
        self.verify_pay_confirm_into(xml, signature, PayConfirm::new())
            .await
    }

    /// Like [`verify_pay_confirm`](Self::verify_pay_confirm), filling `pay_confirm`.
    ///
    /// The message is decoded first, then its signature is checked by posting
    /// `DATA`/`SIGNATURE` back to the gateway. Only a successful check yields
    /// the record.
    pub async fn verify_pay_confirm_into(
        &self,
        xml: &str,
        signature: &str,
        mut pay_confirm: PayConfirm,
    ) -> Result<PayConfirm> {
        self.fill_from_xml(&mut pay_confirm, xml)?;

        let mut verification = Fields::new();
        verification.set(FIELD_DATA, xml);
        verification.set(FIELD_SIGNATURE, signature);
        self.request(pay_confirm.endpoint(), &verification).await?;

        Ok(pay_confirm)
    }

    /// Settle, cancel or close a verified transaction.
    ///
    /// `sp_password` is ignored for test accounts.
    pub async fn pay_complete(
        &self,
        pay_confirm: &PayConfirm,
        action: Action,
        sp_password: Option<&str>,
    ) -> Result<PayCompleteResponse> {
        self.pay_complete_into(pay_confirm, action, sp_password, PayCompleteResponse::new())
            .await
    }

    /// Like [`pay_complete`](Self::pay_complete), filling `response`.
    pub async fn pay_complete_into(
        &self,
        pay_confirm: &PayConfirm,
        action: Action,
        sp_password: Option<&str>,
        mut response: PayCompleteResponse,
    ) -> Result<PayCompleteResponse> {
        let pay_complete = PayComplete::from_confirm(pay_confirm, action).map_err(|e| {
            self.logger.critical("Saferpay: call confirm before complete!", &[]);
            e
        })?;

        let account_id = pay_complete.account_id().unwrap_or_default();
        let credential = credentials::resolve(
            account_id,
            sp_password,
            action,
            self.config.credential_policy,
        )
        .map_err(|e| {
            self.logger.critical(
                "Saferpay: no spPassword given",
                &[("accountid", account_id), ("action", action.as_str())],
            );
            e
        })?;

        let mut payload = pay_complete.fields().clone();
        if let Some(password) = credential.password() {
            payload.set(FIELD_SP_PASSWORD, password);
        }
        if credential == Credential::NotRequired {
            self.logger.debug(
                "Saferpay: completing without spPassword",
                &[("accountid", account_id)],
            );
        }

        let body = self.request(pay_complete.endpoint(), &payload).await?;

        let xml = strip_envelope(&body).ok_or_else(|| {
            self.logger.critical(
                "Saferpay: Invalid xml received from saferpay",
                &[("content", body.as_str())],
            );
            Error::MalformedResponse(format!(
                "completion response shorter than {}-character envelope",
                ENVELOPE_MARKER_LEN
            ))
        })?;
        self.fill_from_xml(&mut response, xml)?;

        Ok(response)
    }

    /// POST `fields` to `endpoint` and return the raw body.
    ///
    /// Fails on any status other than 200 and on bodies containing `ERROR`.
    pub async fn request(&self, endpoint: Endpoint, fields: &Fields) -> Result<String> {
        let url = endpoint.url(&self.config.base_url);
        let body = codec::encode(fields)?;
        let logged_body = if fields.contains(FIELD_SP_PASSWORD) {
            codec::encode(&masked(fields))?
        } else {
            body.clone()
        };

        self.logger.debug(&url, &[]);
        self.logger.debug(&logged_body, &[]);

        let label = endpoint.to_string();
        let start = Instant::now();
        let result = self.transport.send(HttpRequest::form_post(url, body)).await;
        SAFERPAY_REQUEST_DURATION
            .with_label_values(&[label.as_str()])
            .observe(start.elapsed().as_secs_f64());

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                record_outcome(&label, "connection");
                return Err(e);
            }
        };

        self.logger.debug(&response.body, &[]);

        if response.status != 200 {
            record_outcome(&label, "status");
            let status = response.status.to_string();
            self.logger.critical(
                "Saferpay: request failed with statuscode",
                &[("statuscode", status.as_str())],
            );
            return Err(Error::Transport {
                status_code: response.status,
            });
        }

        if response.body.contains(GATEWAY_ERROR_MARKER) {
            record_outcome(&label, "gateway_error");
            self.logger
                .critical("Saferpay: request failed", &[("content", response.body.as_str())]);
            return Err(Error::Gateway {
                body: response.body,
            });
        }

        record_outcome(&label, "success");
        Ok(response.body)
    }

    fn fill_from_xml<R: RecordMut>(&self, record: &mut R, xml: &str) -> Result<()> {
        match codec::decode(xml) {
            Ok(values) => {
                record.fields_mut().merge(values);
                Ok(())
            }
            Err(e) => {
                let reason = e.to_string();
                self.logger.critical(
                    "Saferpay: Invalid xml received from saferpay",
                    &[("error", reason.as_str())],
                );
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for SaferpayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaferpayClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn record_outcome(endpoint: &str, outcome: &str) {
    SAFERPAY_REQUESTS_TOTAL
        .with_label_values(&[endpoint, outcome])
        .inc();
}

/// Drop the status marker in front of a completion body.
///
/// Counts characters, not bytes; `None` when the body is shorter than the marker.
fn strip_envelope(body: &str) -> Option<&str> {
    body.char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(body.len()))
        .nth(ENVELOPE_MARKER_LEN)
        .map(|offset| &body[offset..])
}

fn masked(fields: &Fields) -> Fields {
    let mut fields = fields.clone();
    if fields.contains(FIELD_SP_PASSWORD) {
        fields.set(FIELD_SP_PASSWORD, "***");
    }
    fields
}
