//! Payment provider webhook verification and event parsing.
//!
//! Implements the `Stripe-Signature` scheme: HMAC-SHA256 over
//! `"<timestamp>.<raw body>"`, hex encoded, with a bounded timestamp window
//! against replays. Only events that pass verification are turned into
//! [`PaymentEvent`]s.

use std::collections::HashMap;

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use storefront_core::payment::PaymentEvent;
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Default maximum age of a signed event (5 minutes).
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Maximum allowed clock skew for events stamped in the future (1 minute).
const MAX_CLOCK_SKEW_SECS: i64 = 60;

pub const EVENT_PAYMENT_SUCCEEDED: &str = "payment_intent.succeeded";
pub const EVENT_PAYMENT_FAILED: &str = "payment_intent.payment_failed";

/// Metadata key under which the checkout flow records the buyer's user id.
const USER_ID_METADATA_KEY: &str = "userID";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("Missing Stripe-Signature header")]
    MissingSignature,

    #[error("Malformed signature header: {0}")]
    MalformedHeader(&'static str),

    #[error("Signature does not match payload")]
    InvalidSignature,

    #[error("Signature timestamp outside the accepted window")]
    TimestampOutOfRange,

    #[error("Malformed event payload: {0}")]
    MalformedPayload(String),
}

/// Parsed components of a `Stripe-Signature` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    /// Every `v1` signature present; one match is enough (secret rollover).
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    /// Parse `t=<unix>,v1=<hex>[,v1=<hex>...]`. Unknown keys are ignored.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp = None;
        let mut v1_signatures = Vec::new();

        for part in header.split(',') {
            let (key, value) = part
                .trim()
                .split_once('=')
                .ok_or(WebhookError::MalformedHeader("expected key=value pairs"))?;
            match key {
                "t" => {
                    timestamp = Some(
                        value
                            .parse()
                            .map_err(|_| WebhookError::MalformedHeader("invalid timestamp"))?,
                    );
                }
                "v1" => {
                    v1_signatures.push(
                        hex::decode(value)
                            .map_err(|_| WebhookError::MalformedHeader("invalid v1 signature hex"))?,
                    );
                }
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(WebhookError::MalformedHeader("missing timestamp"))?;
        if v1_signatures.is_empty() {
            return Err(WebhookError::MalformedHeader("missing v1 signature"));
        }

        Ok(Self {
            timestamp,
            v1_signatures,
        })
    }
}

/// Verifies webhook signatures with the shared signing secret.
pub struct WebhookVerifier {
    secret: String,
    tolerance_secs: i64,
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>, tolerance_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            tolerance_secs,
        }
    }

    /// Verify `payload` against the signature header at time `now` (unix seconds).
    pub fn verify(&self, payload: &[u8], signature_header: &str, now: i64) -> Result<(), WebhookError> {
        let header = SignatureHeader::parse(signature_header)?;

        let age = now
            .checked_sub(header.timestamp)
            .ok_or(WebhookError::TimestampOutOfRange)?;
        if age > self.tolerance_secs || age < -MAX_CLOCK_SKEW_SECS {
            return Err(WebhookError::TimestampOutOfRange);
        }

        let expected = self.compute_signature(header.timestamp, payload);
        let matched = header
            .v1_signatures
            .iter()
            .any(|candidate| candidate.len() == expected.len() && bool::from(candidate.ct_eq(&expected)));
        if matched {
            Ok(())
        } else {
            Err(WebhookError::InvalidSignature)
        }
    }

    /// HMAC-SHA256 of `"<timestamp>.<payload>"`.
    pub fn compute_signature(&self, timestamp: i64, payload: &[u8]) -> Vec<u8> {
        let mut mac =
            Hmac::<Sha256>::new_from_slice(self.secret.as_bytes()).expect("HMAC accepts any key");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }

    /// Build a header value for `payload`; used by tests and local tooling.
    pub fn sign(&self, timestamp: i64, payload: &[u8]) -> String {
        format!("t={timestamp},v1={}", hex::encode(self.compute_signature(timestamp, payload)))
    }
}

// ---------------------------------------------------------------------------
// Event payload
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct EventEnvelope {
    #[serde(rename = "type")]
    event_type: String,
    data: EventData,
}

#[derive(Debug, Deserialize)]
struct EventData {
    object: PaymentIntentObject,
}

#[derive(Debug, Deserialize)]
struct PaymentIntentObject {
    #[serde(default)]
    id: String,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

/// Turn a verified payload into a payment event.
///
/// Returns `Ok(None)` for event types this service does not act on. A
/// missing or non-UUID buyer id becomes the nil user, which the processor
/// rejects as a missing user.
pub fn parse_event(payload: &[u8]) -> Result<Option<PaymentEvent>, WebhookError> {
    let event_type = serde_json::from_slice::<serde_json::Value>(payload)
        .map_err(|e| WebhookError::MalformedPayload(e.to_string()))?
        .get("type")
        .and_then(|t| t.as_str())
        .map(str::to_string)
        .ok_or_else(|| WebhookError::MalformedPayload("missing event type".into()))?;

    if event_type != EVENT_PAYMENT_SUCCEEDED && event_type != EVENT_PAYMENT_FAILED {
        return Ok(None);
    }

    let envelope: EventEnvelope = serde_json::from_slice(payload)
        .map_err(|e| WebhookError::MalformedPayload(e.to_string()))?;
    let intent = envelope.data.object;

    let event = if envelope.event_type == EVENT_PAYMENT_SUCCEEDED {
        let user_id = intent
            .metadata
            .get(USER_ID_METADATA_KEY)
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .unwrap_or_else(Uuid::nil);
        PaymentEvent::Succeeded {
            payment_reference: intent.id,
            user_id,
        }
    } else {
        PaymentEvent::Failed {
            payment_reference: intent.id,
        }
    };
    Ok(Some(event))
}
