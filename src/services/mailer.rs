//! One-time code delivery.
//!
//! Every issued code is written to the diagnostic log. Delivery through a
//! transactional email API is optional and best-effort: failures are logged
//! and never fail the login or signup flow.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use strum_macros::Display;

use crate::{
    config::EmailConfig,
    error::{Error, Result},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OtpPurpose {
    Login,
    Signup,
}

/// A code addressed to one recipient.
#[derive(Debug, Clone, PartialEq)]
pub struct OtpDelivery {
    pub email: String,
    pub name: String,
    pub code: String,
    pub purpose: OtpPurpose,
}

/// Out-of-band channel for one-time codes.
#[async_trait]
pub trait OtpNotifier: Send + Sync {
    async fn send_code(&self, delivery: &OtpDelivery) -> Result<()>;
}

/// Relies on the diagnostic log only.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl OtpNotifier for LogNotifier {
    async fn send_code(&self, _delivery: &OtpDelivery) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct TemplateParams<'a> {
    to_email: &'a str,
    to_name: &'a str,
    otp_code: &'a str,
    purpose: OtpPurpose,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: TemplateParams<'a>,
}

/// Sends codes through an EmailJS-compatible `send` endpoint.
#[derive(Debug, Clone)]
pub struct TransactionalEmailNotifier {
    client: reqwest::Client,
    config: EmailConfig,
}

impl TransactionalEmailNotifier {
    pub fn new(config: EmailConfig) -> Result<Self> {
        if config.service_id.is_empty() || config.template_id.is_empty() || config.public_key.is_none() {
            return Err(Error::Internal(
                "Email delivery enabled but service_id, template_id or public_key is missing".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl OtpNotifier for TransactionalEmailNotifier {
    async fn send_code(&self, delivery: &OtpDelivery) -> Result<()> {
        let public_key = self
            .config
            .public_key
            .as_ref()
            .map(|k| k.expose_secret().to_string())
            .unwrap_or_default();

        let body = SendRequest {
            service_id: &self.config.service_id,
            template_id: &self.config.template_id,
            user_id: &public_key,
            template_params: TemplateParams {
                to_email: &delivery.email,
                to_name: &delivery.name,
                otp_code: &delivery.code,
                purpose: delivery.purpose,
            },
        };

        self.client
            .post(&self.config.endpoint)
            .json(&body)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| Error::Internal(format!("Email delivery failed: {}", e)))?;

        Ok(())
    }
}

/// Pick the notifier described by configuration.
pub fn notifier_from_config(config: &EmailConfig) -> Result<Arc<dyn OtpNotifier>> {
    if config.enabled {
        Ok(Arc::new(TransactionalEmailNotifier::new(config.clone())?))
    } else {
        Ok(Arc::new(LogNotifier))
    }
}

/// Log the code, then attempt delivery. Never fails.
pub async fn dispatch_code(notifier: &dyn OtpNotifier, delivery: OtpDelivery) {
    tracing::info!(
        email = %delivery.email,
        purpose = %delivery.purpose,
        code = %delivery.code,
        "One-time code issued"
    );

    if let Err(e) = notifier.send_code(&delivery).await {
        tracing::warn!(
            email = %delivery.email,
            purpose = %delivery.purpose,
            error = %e,
            "One-time code delivery failed; code remains available in the diagnostic log"
        );
    }
}
