//! Synchronous client binding for the billing info resource of a
//! subscription-billing REST API.
//!
//! # Overview
//! `Client` composes requests against `accounts/{account_code}/billing_info`
//! and hands them to an injected `HttpExecutor` (host-does-IO pattern). The
//! core never opens a socket, which keeps it deterministic and testable
//! against recorded responses.
//!
//! # Design
//! - `Client` is stateless: configuration plus executor, nothing mutable.
//! - `BillingService` borrows the client and maps each operation to one
//!   request: `get`, `create`, `create_with_token`, `update`,
//!   `update_with_token`, `clear`.
//! - `update` sends a `BillingUpdate` projection so read-only fields of a
//!   fetched record never reach the server.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod billing;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod types;

pub use billing::BillingService;
pub use client::{Client, Response};
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpExecutor, HttpMethod, HttpRequest, HttpResponse};
pub use types::{BankAccountType, Billing, BillingUpdate, ErrorDetail, ErrorDocument, PaymentMethod};
