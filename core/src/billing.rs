//! Billing info operations for one account.
//!
//! Every call maps to a single request against
//! `accounts/{account_code}/billing_info`. `get` is the only operation that
//! withholds the record on a 4xx/5xx answer; the write operations return
//! whatever the destination holds, which is `Billing::default()` when the
//! server rejected the write. Callers of the writes must check
//! `Response::status` themselves.

use crate::client::{Client, Response};
use crate::error::ApiError;
use crate::http::{HttpExecutor, HttpMethod};
use crate::types::{Billing, BillingUpdate};

/// Billing info endpoints, borrowing a shared `Client`.
#[derive(Debug)]
pub struct BillingService<'c, E> {
    client: &'c Client<E>,
}

impl<E> Clone for BillingService<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for BillingService<'_, E> {}

impl<'c, E: HttpExecutor> BillingService<'c, E> {
    pub fn new(client: &'c Client<E>) -> Self {
        Self { client }
    }

    /// Fetch the account's current billing info.
    ///
    /// Returns `None` for the record when the status is 4xx/5xx, e.g. 404
    /// for an account without billing info.
    pub fn get(&self, account_code: &str) -> Result<(Response, Option<Billing>), ApiError> {
        let req = self
            .client
            .new_request::<()>(HttpMethod::Get, &path(account_code), &[], None)?;
        self.client.send(&req)
    }

    /// Create billing info from raw card or bank account fields. Prefer
    /// `create_with_token` so raw payment details never touch the caller.
    pub fn create(&self, account_code: &str, billing: &Billing) -> Result<(Response, Billing), ApiError> {
        self.write(HttpMethod::Post, account_code, billing)
    }

    /// Create billing info from a payment widget token.
    pub fn create_with_token(&self, account_code: &str, token: &str) -> Result<(Response, Billing), ApiError> {
        self.write(HttpMethod::Post, account_code, &Billing::with_token(token))
    }

    /// Replace billing info with the writable fields of `billing`.
    ///
    /// The record is projected through `BillingUpdate` first, so a value
    /// previously returned by `get` can be edited and passed back as is.
    pub fn update(&self, account_code: &str, billing: &Billing) -> Result<(Response, Billing), ApiError> {
        self.write(HttpMethod::Put, account_code, &BillingUpdate::from(billing))
    }

    /// Replace billing info from a payment widget token.
    pub fn update_with_token(&self, account_code: &str, token: &str) -> Result<(Response, Billing), ApiError> {
        self.write(HttpMethod::Put, account_code, &Billing::with_token(token))
    }

    /// Remove stored billing info. An active subscription on the account
    /// goes past due at renewal unless new billing info arrives first.
    pub fn clear(&self, account_code: &str) -> Result<Response, ApiError> {
        let req = self
            .client
            .new_request::<()>(HttpMethod::Delete, &path(account_code), &[], None)?;
        self.client.send_empty(&req)
    }

    fn write<B: serde::Serialize>(
        &self,
        method: HttpMethod,
        account_code: &str,
        body: &B,
    ) -> Result<(Response, Billing), ApiError> {
        let req = self
            .client
            .new_request(method, &path(account_code), &[], Some(body))?;
        let (resp, dst) = self.client.send::<Billing>(&req)?;
        Ok((resp, dst.unwrap_or_default()))
    }
}

/// Path segments of `accounts/{account_code}/billing_info`. The account code
/// stays one segment whatever characters it holds.
fn path(account_code: &str) -> [&str; 3] {
    ["accounts", account_code, "billing_info"]
}
