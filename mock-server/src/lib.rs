use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

/// Stored billing info as returned by the API. Raw card and bank account
/// numbers are never stored; only their masked parts are.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BillingInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_six: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_four: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_on_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,
}

/// Accepted write body. Read-only fields are unknown here and make the
/// request fail with 422.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BillingWrite {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub vat_number: Option<String>,
    pub ip_address: Option<String>,
    pub number: Option<String>,
    pub month: Option<u8>,
    pub year: Option<u16>,
    pub verification_value: Option<String>,
    pub name_on_account: Option<String>,
    pub routing_number: Option<String>,
    pub account_number: Option<String>,
    pub account_type: Option<String>,
    pub token: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub symbol: String,
    pub description: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub errors: Vec<ErrorEntry>,
}

type ApiError = (StatusCode, Json<ErrorBody>);

pub type Db = Arc<RwLock<HashMap<String, BillingInfo>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route(
            "/accounts/{account_code}/billing_info",
            get(get_billing)
                .post(create_billing)
                .put(update_billing)
                .delete(clear_billing),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn get_billing(
    State(db): State<Db>,
    Path(account_code): Path<String>,
) -> Result<Json<BillingInfo>, ApiError> {
    let store = db.read().await;
    store.get(&account_code).cloned().map(Json).ok_or_else(not_found)
}

async fn create_billing(
    State(db): State<Db>,
    Path(account_code): Path<String>,
    Json(input): Json<BillingWrite>,
) -> Result<(StatusCode, Json<BillingInfo>), ApiError> {
    let info = resolve(input)?;
    debug!(%account_code, "billing info created");
    db.write().await.insert(account_code, info.clone());
    Ok((StatusCode::CREATED, Json(info)))
}

async fn update_billing(
    State(db): State<Db>,
    Path(account_code): Path<String>,
    Json(input): Json<BillingWrite>,
) -> Result<Json<BillingInfo>, ApiError> {
    let mut store = db.write().await;
    let slot = store.get_mut(&account_code).ok_or_else(not_found)?;
    *slot = resolve(input)?;
    debug!(%account_code, "billing info updated");
    Ok(Json(slot.clone()))
}

async fn clear_billing(
    State(db): State<Db>,
    Path(account_code): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut store = db.write().await;
    store.remove(&account_code).map(|_| StatusCode::NO_CONTENT).ok_or_else(not_found)
}

/// Turn a write body into the stored record. A token wins over raw card or
/// bank fields.
fn resolve(input: BillingWrite) -> Result<BillingInfo, ApiError> {
    let mut info = BillingInfo {
        ip_address_country: input.ip_address.as_ref().and(input.country.clone()),
        first_name: input.first_name,
        last_name: input.last_name,
        address1: input.address1,
        address2: input.address2,
        city: input.city,
        state: input.state,
        zip: input.zip,
        country: input.country,
        phone: input.phone,
        vat_number: input.vat_number,
        ip_address: input.ip_address,
        ..BillingInfo::default()
    };

    if let Some(token) = input.token {
        if !token.starts_with("tok_") {
            return Err(invalid("token", "token_invalid", "Token is either invalid or expired"));
        }
        apply_card(&mut info, "4111111111111111", Some(12), Some(2030));
    } else if let Some(number) = input.number {
        if !(12..=19).contains(&number.len()) || !number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("number", "invalid", "is not a valid credit card number"));
        }
        if !matches!(input.month, Some(1..=12)) {
            return Err(invalid("month", "invalid", "is not a valid month"));
        }
        apply_card(&mut info, &number, input.month, input.year);
    } else if let Some(account_number) = input.account_number {
        if account_number.len() < 4 || !account_number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("account_number", "invalid", "is not a valid account number"));
        }
        if input.routing_number.is_none() {
            return Err(invalid("routing_number", "required", "can't be blank"));
        }
        info.last_four = Some(tail(&account_number, 4));
        info.name_on_account = input.name_on_account;
        info.routing_number = input.routing_number;
        info.account_type = input.account_type;
    } else {
        return Err(invalid("number", "required", "can't be blank"));
    }
    Ok(info)
}

fn apply_card(info: &mut BillingInfo, number: &str, month: Option<u8>, year: Option<u16>) {
    info.first_six = Some(number[..6].to_string());
    info.last_four = Some(tail(number, 4));
    info.card_type = Some(
        match number.as_bytes()[0] {
            b'4' => "Visa",
            b'5' => "MasterCard",
            b'3' => "American Express",
            _ => "Unknown",
        }
        .to_string(),
    );
    info.month = month;
    info.year = year;
}

fn tail(s: &str, n: usize) -> String {
    s[s.len().saturating_sub(n)..].to_string()
}

fn not_found() -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            errors: vec![ErrorEntry {
                field: None,
                symbol: "not_found".to_string(),
                description: "Couldn't find BillingInfo".to_string(),
            }],
        }),
    )
}

fn invalid(field: &str, symbol: &str, description: &str) -> ApiError {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorBody {
            errors: vec![ErrorEntry {
                field: Some(field.to_string()),
                symbol: symbol.to_string(),
                description: description.to_string(),
            }],
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn billing_info_omits_unset_fields() {
        let info = BillingInfo {
            first_name: Some("Verena".to_string()),
            ..BillingInfo::default()
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json, serde_json::json!({ "first_name": "Verena" }));
    }

    #[test]
    fn write_rejects_read_only_fields() {
        let result: Result<BillingWrite, _> =
            serde_json::from_str(r#"{"token":"tok_1","last_four":"1111"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn token_resolves_to_test_card() {
        let info = resolve(BillingWrite {
            first_name: Some("Verena".to_string()),
            token: Some("tok_1".to_string()),
            ..BillingWrite::default()
        })
        .unwrap();
        assert_eq!(info.first_name.as_deref(), Some("Verena"));
        assert_eq!(info.first_six.as_deref(), Some("411111"));
        assert_eq!(info.last_four.as_deref(), Some("1111"));
        assert_eq!(info.card_type.as_deref(), Some("Visa"));
    }

    #[test]
    fn unknown_token_is_rejected() {
        let (status, Json(body)) = resolve(BillingWrite {
            token: Some("bogus".to_string()),
            ..BillingWrite::default()
        })
        .unwrap_err();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.errors[0].symbol, "token_invalid");
    }

    #[test]
    fn card_number_is_masked() {
        let info = resolve(BillingWrite {
            number: Some("5555555555554444".to_string()),
            month: Some(3),
            year: Some(2031),
            verification_value: Some("123".to_string()),
            ..BillingWrite::default()
        })
        .unwrap();
        assert_eq!(info.card_type.as_deref(), Some("MasterCard"));
        assert_eq!(info.last_four.as_deref(), Some("4444"));
        assert_eq!(info.month, Some(3));
    }

    #[test]
    fn bank_account_requires_routing_number() {
        let (status, Json(body)) = resolve(BillingWrite {
            account_number: Some("4444000044440000".to_string()),
            ..BillingWrite::default()
        })
        .unwrap_err();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.errors[0].field.as_deref(), Some("routing_number"));
    }

    #[test]
    fn write_without_payment_method_is_rejected() {
        let (status, _) = resolve(BillingWrite {
            first_name: Some("Verena".to_string()),
            ..BillingWrite::default()
        })
        .unwrap_err();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
