//! Response parsing.
//!
//! The explorer's JSON is owned by the remote service; only the fields read
//! here are relied upon. Anything that does not match is `Malformed`.

use serde_json::Value;

use vwm_model::{Amount, Epoch, Identity};

use crate::error::{Result, SourceError};

/// Sum the `resultSet[].amount` credits of a withdrawals page.
///
/// A missing or null `resultSet` means no withdrawals.
pub fn parse_withdrawals(body: &Value) -> Result<Amount> {
    let object = body
        .as_object()
        .ok_or_else(|| SourceError::Malformed("withdrawals: expected an object".into()))?;

    let items = match object.get("resultSet") {
        None | Some(Value::Null) => return Ok(Amount::ZERO),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(SourceError::Malformed(
                "withdrawals: resultSet is not an array".into(),
            ));
        }
    };

    let mut credits: u64 = 0;
    for item in items {
        let amount = item
            .get("amount")
            .and_then(credits_of)
            .ok_or_else(|| SourceError::Malformed("withdrawals: item without amount".into()))?;
        credits = credits
            .checked_add(amount)
            .ok_or_else(|| SourceError::Malformed("withdrawals: amount overflow".into()))?;
    }
    Ok(Amount::from_credits(credits))
}

/// Credits may arrive as a JSON number or a decimal string.
fn credits_of(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read the identity of a validator record.
///
/// `identity` may be a bare string or an object carrying `identifier`;
/// missing or null means the validator has no identity yet.
pub fn parse_identity(body: &Value) -> Result<Option<Identity>> {
    let object = body
        .as_object()
        .ok_or_else(|| SourceError::Malformed("validator: expected an object".into()))?;

    match object.get("identity") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(id)) if !id.is_empty() => Ok(Some(Identity::new(id.clone()))),
        Some(Value::String(_)) => Ok(None),
        Some(Value::Object(inner)) => match inner.get("identifier") {
            Some(Value::String(id)) if !id.is_empty() => Ok(Some(Identity::new(id.clone()))),
            None | Some(Value::Null) => Ok(None),
            Some(_) => Err(SourceError::Malformed(
                "validator: identity.identifier is not a string".into(),
            )),
        },
        Some(_) => Err(SourceError::Malformed(
            "validator: identity has an unexpected type".into(),
        )),
    }
}

/// Read `epoch.number` from the status endpoint.
pub fn parse_current_epoch(body: &Value) -> Result<Epoch> {
    body.get("epoch")
        .and_then(|epoch| epoch.get("number"))
        .and_then(Value::as_u64)
        .ok_or_else(|| SourceError::Malformed("status: missing epoch.number".into()))
}

/// Parse the ticker's plain-text decimal price.
pub fn parse_usd_rate(body: &str) -> Result<f64> {
    let rate: f64 = body
        .trim()
        .parse()
        .map_err(|_| SourceError::Malformed(format!("rate: not a number: {:?}", body.trim())))?;
    if !rate.is_finite() || rate <= 0.0 {
        return Err(SourceError::Malformed(format!("rate: out of range: {rate}")));
    }
    Ok(rate)
}
