//! Synchronous client SDK for the Accredible credential service.
//!
//! # Overview
//! Builds authenticated requests for credentials, groups, designs, evidence
//! items, recipient SSO links and batch calls, and decodes the JSON
//! responses into generic objects.
//!
//! # Design
//! - Each operation has a `build_*` method producing a plain-data
//!   `HttpRequest`, so callers can do their own I/O (host-does-IO pattern).
//! - `CredentialServiceClient` pairs those builders with a `Transport`;
//!   `UreqTransport` is the stock blocking one.
//! - Create calls send their full payload, `null`s included. Update-style
//!   calls (credential and group updates, SSO links) pass through
//!   `strip_empty_keys` first.
//! - Grade, duration and transcript evidence are validated and assembled
//!   locally before delegating to the generic evidence-item call.

pub mod client;
pub mod config;
pub mod error;
pub mod evidence;
pub mod http;
pub mod operation;
pub mod payload;
pub mod types;

pub use client::CredentialServiceClient;
pub use config::{ClientConfig, Environment};
pub use error::{ApiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use operation::Operation;
pub use payload::strip_empty_keys;
pub use types::{
    ApiObject, CredentialUpdate, CustomAttributes, EvidenceCategory, EvidenceItem, GroupUpdate,
    LegacyCredential, NewCredential, NewGroup, Pagination, SsoLinkRequest,
};
