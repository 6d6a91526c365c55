//! Domain DTOs for the billing info resource.
//!
//! # Design
//! `Billing` is the full record as read back from the API, read-only fields
//! included. Writes that replace payment details go through `BillingUpdate`,
//! a projection holding only the fields the API accepts on update, so a
//! record fetched with `get` can be edited and sent back without leaking
//! server-assigned fields into the request.
//!
//! Every field is optional and omitted from JSON when unset. The mock-server
//! crate defines its own copies of these shapes; integration tests catch
//! schema drift between the two.

use serde::{Deserialize, Serialize};

/// Bank account kind for ACH billing info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BankAccountType {
    Checking,
    Savings,
}

/// Billing information attached to an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Billing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    /// Read-only. Country the server geolocated `ip_address` to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address_country: Option<String>,

    /// Read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_six: Option<String>,
    /// Read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_four: Option<String>,
    /// Read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_value: Option<String>,

    /// Read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paypal_billing_agreement_id: Option<String>,
    /// Read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amazon_billing_agreement_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_on_account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<BankAccountType>,

    /// Single-use token from the client-side payment widget. Replaces the
    /// raw card or bank fields on a write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Which payment method a billing record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Token,
    Card,
    BankAccount,
    PayPal,
    Amazon,
    None,
}

impl Billing {
    /// A record carrying only `token`, every other field unset.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Self::default()
        }
    }

    /// Classify the record. A token wins over raw fields because the server
    /// ignores raw payment fields when a token is present.
    pub fn payment_method(&self) -> PaymentMethod {
        if self.token.is_some() {
            PaymentMethod::Token
        } else if self.number.is_some() || self.last_four.is_some() {
            PaymentMethod::Card
        } else if self.account_number.is_some() || self.routing_number.is_some() {
            PaymentMethod::BankAccount
        } else if self.paypal_billing_agreement_id.is_some() {
            PaymentMethod::PayPal
        } else if self.amazon_billing_agreement_id.is_some() {
            PaymentMethod::Amazon
        } else {
            PaymentMethod::None
        }
    }
}

/// Write projection of `Billing` sent by `BillingService::update`.
///
/// Holds exactly the fields listed in `BillingUpdate::FIELDS`. Anything else
/// on the source record (read-only card details, agreement ids, the token)
/// has no slot here and cannot reach the request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BillingUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_on_account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<BankAccountType>,
}

impl BillingUpdate {
    /// Wire names of every field the API accepts on update.
    pub const FIELDS: [&'static str; 19] = [
        "first_name",
        "last_name",
        "address1",
        "address2",
        "city",
        "state",
        "zip",
        "country",
        "phone",
        "vat_number",
        "ip_address",
        "number",
        "month",
        "year",
        "verification_value",
        "name_on_account",
        "routing_number",
        "account_number",
        "account_type",
    ];
}

impl From<&Billing> for BillingUpdate {
    fn from(b: &Billing) -> Self {
        Self {
            first_name: b.first_name.clone(),
            last_name: b.last_name.clone(),
            address1: b.address1.clone(),
            address2: b.address2.clone(),
            city: b.city.clone(),
            state: b.state.clone(),
            zip: b.zip.clone(),
            country: b.country.clone(),
            phone: b.phone.clone(),
            vat_number: b.vat_number.clone(),
            ip_address: b.ip_address.clone(),
            number: b.number.clone(),
            month: b.month,
            year: b.year,
            verification_value: b.verification_value.clone(),
            name_on_account: b.name_on_account.clone(),
            routing_number: b.routing_number.clone(),
            account_number: b.account_number.clone(),
            account_type: b.account_type,
        }
    }
}

/// One entry of an API error document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// Body returned by the API alongside a 4xx/5xx status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDocument {
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetched_card() -> Billing {
        Billing {
            first_name: Some("Verena".to_string()),
            last_name: Some("Example".to_string()),
            address1: Some("123 Main St.".to_string()),
            city: Some("San Francisco".to_string()),
            state: Some("CA".to_string()),
            zip: Some("94105".to_string()),
            country: Some("US".to_string()),
            ip_address: Some("203.0.113.7".to_string()),
            ip_address_country: Some("US".to_string()),
            first_six: Some("411111".to_string()),
            last_four: Some("1111".to_string()),
            card_type: Some("Visa".to_string()),
            month: Some(11),
            year: Some(2030),
            paypal_billing_agreement_id: Some("B-1234".to_string()),
            token: Some("stale-token".to_string()),
            ..Billing::default()
        }
    }

    #[test]
    fn token_record_serializes_to_token_only() {
        let json = serde_json::to_value(Billing::with_token("tok_1")).unwrap();
        assert_eq!(json, serde_json::json!({ "token": "tok_1" }));
    }

    #[test]
    fn default_record_serializes_to_empty_object() {
        assert_eq!(serde_json::to_string(&Billing::default()).unwrap(), "{}");
    }

    #[test]
    fn update_projection_drops_read_only_fields() {
        let update = BillingUpdate::from(&fetched_card());
        let json = serde_json::to_value(&update).unwrap();
        let obj = json.as_object().unwrap();

        for key in obj.keys() {
            assert!(BillingUpdate::FIELDS.contains(&key.as_str()), "unexpected field {key}");
        }
        for decoy in [
            "ip_address_country",
            "first_six",
            "last_four",
            "card_type",
            "paypal_billing_agreement_id",
            "token",
        ] {
            assert!(obj.get(decoy).is_none(), "{decoy} leaked into update");
        }
        assert_eq!(obj["first_name"], "Verena");
        assert_eq!(obj["ip_address"], "203.0.113.7");
        assert_eq!(obj["month"], 11);
        assert_eq!(obj["year"], 2030);
    }

    #[test]
    fn update_projection_keeps_every_whitelisted_field() {
        let full = Billing {
            first_name: Some("a".into()),
            last_name: Some("b".into()),
            address1: Some("c".into()),
            address2: Some("d".into()),
            city: Some("e".into()),
            state: Some("f".into()),
            zip: Some("g".into()),
            country: Some("h".into()),
            phone: Some("i".into()),
            vat_number: Some("j".into()),
            ip_address: Some("127.0.0.1".into()),
            number: Some("4111111111111111".into()),
            month: Some(1),
            year: Some(2031),
            verification_value: Some("123".into()),
            name_on_account: Some("k".into()),
            routing_number: Some("065400137".into()),
            account_number: Some("4444000044440000".into()),
            account_type: Some(BankAccountType::Checking),
            ..Billing::default()
        };
        let json = serde_json::to_value(BillingUpdate::from(&full)).unwrap();
        let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        let mut expected = BillingUpdate::FIELDS.to_vec();
        keys.sort_unstable();
        expected.sort_unstable();
        assert_eq!(keys, expected);
        assert_eq!(json["account_type"], "checking");
    }

    #[test]
    fn decode_ignores_unknown_fields() {
        let billing: Billing = serde_json::from_str(
            r#"{"first_name":"Verena","last_four":"1111","updated_at":"2030-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(billing.first_name.as_deref(), Some("Verena"));
        assert_eq!(billing.last_four.as_deref(), Some("1111"));
    }

    #[test]
    fn ip_address_passes_through_unparsed() {
        let billing: Billing = serde_json::from_str(r#"{"first_name":"V","ip_address":""}"#).unwrap();
        assert_eq!(billing.ip_address.as_deref(), Some(""));

        let billing: Billing = serde_json::from_str(r#"{"ip_address":"unknown"}"#).unwrap();
        let json = serde_json::to_value(BillingUpdate::from(&billing)).unwrap();
        assert_eq!(json, serde_json::json!({ "ip_address": "unknown" }));
    }

    #[test]
    fn update_projection_rejects_read_only_fields_on_decode() {
        let result: Result<BillingUpdate, _> = serde_json::from_str(r#"{"last_four":"1111"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn payment_method_classification() {
        assert_eq!(Billing::with_token("t").payment_method(), PaymentMethod::Token);
        assert_eq!(fetched_card().payment_method(), PaymentMethod::Token);
        let card = Billing {
            token: None,
            ..fetched_card()
        };
        assert_eq!(card.payment_method(), PaymentMethod::Card);
        let bank = Billing {
            routing_number: Some("065400137".into()),
            account_number: Some("4444000044440000".into()),
            account_type: Some(BankAccountType::Savings),
            ..Billing::default()
        };
        assert_eq!(bank.payment_method(), PaymentMethod::BankAccount);
        let paypal = Billing {
            paypal_billing_agreement_id: Some("B-1".into()),
            ..Billing::default()
        };
        assert_eq!(paypal.payment_method(), PaymentMethod::PayPal);
        let amazon = Billing {
            amazon_billing_agreement_id: Some("C-1".into()),
            ..Billing::default()
        };
        assert_eq!(amazon.payment_method(), PaymentMethod::Amazon);
        assert_eq!(Billing::default().payment_method(), PaymentMethod::None);
    }

    #[test]
    fn error_document_tolerates_missing_parts() {
        let doc: ErrorDocument =
            serde_json::from_str(r#"{"errors":[{"field":"number","symbol":"invalid","description":"is invalid"},{"description":"Declined"}]}"#)
                .unwrap();
        assert_eq!(doc.errors.len(), 2);
        assert_eq!(doc.errors[0].field.as_deref(), Some("number"));
        assert!(doc.errors[1].symbol.is_none());
        let empty: ErrorDocument = serde_json::from_str("{}").unwrap();
        assert!(empty.errors.is_empty());
    }
}
