use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;

use crate::utils::constants::{DEFAULT_PARTY_ID_TYPE, DEFAULT_PAYEE_NOTE, DEFAULT_PAYER_MESSAGE};

pub const MISSING_PAYMENT_FIELDS: &str =
    "Missing required fields: amount, currency, externalId, payer.partyId";
pub const MISSING_REFERENCE_ID: &str = "Reference ID is required";
pub const MISSING_ACCOUNT_HOLDER_FIELDS: &str =
    "accountHolderIdType and accountHolderId are required";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub &'static str);

/// ================================
/// Inbound bodies, as sent by callers
/// ================================
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RequestToPayBody {
    pub amount: Option<Value>,
    pub currency: Option<Value>,
    pub external_id: Option<Value>,
    pub payer: Option<PayerBody>,
    pub payer_message: Option<Value>,
    pub payee_note: Option<Value>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PayerBody {
    pub party_id_type: Option<Value>,
    pub party_id: Option<Value>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AccountHolderBody {
    pub account_holder_id_type: Option<Value>,
    pub account_holder_id: Option<Value>,
}

/// ================================
/// Validated requests
/// ================================

/// Body of an upstream request-to-pay call.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub amount: String,
    pub currency: String,
    pub external_id: String,
    pub payer: Party,
    pub payer_message: String,
    pub payee_note: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub party_id_type: String,
    pub party_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountHolder {
    pub id_type: String,
    pub id: String,
}

impl TryFrom<RequestToPayBody> for PaymentRequest {
    type Error = ValidationError;

    fn try_from(body: RequestToPayBody) -> Result<Self, Self::Error> {
        let party_id = body.payer.as_ref().and_then(|payer| present_text(&payer.party_id));

        let (Some(amount), Some(currency), Some(external_id), Some(party_id)) = (
            present_text(&body.amount),
            present_text(&body.currency),
            present_text(&body.external_id),
            party_id,
        ) else {
            return Err(ValidationError(MISSING_PAYMENT_FIELDS));
        };

        let party_id_type = body
            .payer
            .as_ref()
            .and_then(|payer| present_text(&payer.party_id_type))
            .unwrap_or_else(|| DEFAULT_PARTY_ID_TYPE.to_owned());

        Ok(Self {
            amount,
            currency,
            external_id,
            payer: Party { party_id_type, party_id },
            payer_message: present_text(&body.payer_message)
                .unwrap_or_else(|| DEFAULT_PAYER_MESSAGE.to_owned()),
            payee_note: present_text(&body.payee_note)
                .unwrap_or_else(|| DEFAULT_PAYEE_NOTE.to_owned()),
        })
    }
}

impl TryFrom<AccountHolderBody> for AccountHolder {
    type Error = ValidationError;

    fn try_from(body: AccountHolderBody) -> Result<Self, Self::Error> {
        match (
            present_text(&body.account_holder_id_type),
            present_text(&body.account_holder_id),
        ) {
            (Some(id_type), Some(id)) => Ok(Self { id_type, id }),
            _ => Err(ValidationError(MISSING_ACCOUNT_HOLDER_FIELDS)),
        }
    }
}

pub fn validate_reference_id(reference_id: &str) -> Result<&str, ValidationError> {
    let reference_id = reference_id.trim();
    if reference_id.is_empty() {
        return Err(ValidationError(MISSING_REFERENCE_ID));
    }
    Ok(reference_id)
}

/// A field counts as present when it is a non-empty string or a non-zero
/// number; numbers are carried on as their decimal text.
fn present_text(value: &Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.to_owned()),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => Some(number_text(n)),
        _ => None,
    }
}

/// Integral values lose the `.0` a float literal carries: `500.0` and `1e2`
/// become `500` and `100`.
fn number_text(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}
