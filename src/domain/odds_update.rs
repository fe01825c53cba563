//! Push update value and the total decoder for inbound channel payloads.
//!
//! Channel payloads are loosely shaped JSON. [`decode_push_message`] never
//! panics: it returns a validated [`OddsUpdate`], `None` for payloads that
//! are well-formed but not odds updates (heartbeats, control frames), or a
//! [`PushDecodeError`] for garbage.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Coeff, EventId};

/// A single coefficient change delivered over the live channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OddsUpdate {
    /// Target event.
    pub id: EventId,
    /// New coefficient.
    pub coeff: Coeff,
    /// Epoch milliseconds the change is stamped with.
    pub at: i64,
}

/// Reasons a push payload was discarded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PushDecodeError {
    /// Payload is not valid JSON.
    #[error("payload is not valid JSON: {0}")]
    Json(String),

    /// Payload is JSON but not an object.
    #[error("payload is not a JSON object")]
    NotAnObject,

    /// `id` is present but not an integer.
    #[error("invalid event id: {0}")]
    InvalidId(String),

    /// `coeff` is present but not a finite number.
    #[error("invalid coefficient: {0}")]
    InvalidCoefficient(String),
}

/// Decodes one inbound channel payload.
///
/// `now` is used for `at` when the payload carries none or an unusable one.
///
/// # Errors
///
/// Returns [`PushDecodeError`] if the payload is not a JSON object, or if
/// it carries `id` and `coeff` but either fails numeric coercion.
pub fn decode_push_message(text: &str, now: i64) -> Result<Option<OddsUpdate>, PushDecodeError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| PushDecodeError::Json(e.to_string()))?;
    let Value::Object(map) = value else {
        return Err(PushDecodeError::NotAnObject);
    };

    let (Some(raw_id), Some(raw_coeff)) = (map.get("id"), map.get("coeff")) else {
        return Ok(None);
    };

    let id = coerce_i64(raw_id)
        .map(EventId::new)
        .ok_or_else(|| PushDecodeError::InvalidId(raw_id.to_string()))?;
    let coeff = coerce_f64(raw_coeff)
        .and_then(|v| Coeff::new(v).ok())
        .ok_or_else(|| PushDecodeError::InvalidCoefficient(raw_coeff.to_string()))?;
    let at = map.get("at").and_then(coerce_i64_lossy).unwrap_or(now);

    Ok(Some(OddsUpdate { id, coeff, at }))
}

/// Integer from a JSON number without fractional part or a numeric string.
fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .and_then(f64_to_i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Timestamps may arrive as floats (`performance.now()`-style); truncate.
fn coerce_i64_lossy(value: &Value) -> Option<i64> {
    coerce_i64(value).or_else(|| coerce_f64(value).map(f64::trunc).and_then(f64_to_i64))
}

fn coerce_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

#[allow(clippy::cast_possible_truncation)]
fn f64_to_i64(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
    (f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
}
