//! Request builders, response parsing and the transport-backed client.
//!
//! # Design
//! Every operation is split in two. A `build_*` method turns arguments into
//! an `HttpRequest` (absolute URL, auth header, JSON body) without touching
//! the network; `parse_response` turns the raw `HttpResponse` into an
//! `ApiObject` or an `ApiError`. The operation methods compose the two with
//! the injected `Transport`.
//!
//! The API key is copied into the request when it is built. `set_api_key`
//! needs `&mut self`, so it cannot run while a call on the same client is in
//! flight.

use std::fmt::Display;

use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::evidence;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::operation::Operation;
use crate::payload::{strip_empty_keys, to_json, to_value};
use crate::types::{
    ApiObject, BatchBody, CredentialBody, CredentialEnvelope, CredentialUpdate, EvidenceItem,
    EvidenceItemEnvelope, GroupBody, GroupEnvelope, GroupUpdate, LegacyCredential,
    LegacyCredentialBody, NewCredential, NewGroup, Pagination, SsoLinkRequest,
};

/// Synchronous client for the credential service.
#[derive(Debug, Clone)]
pub struct CredentialServiceClient<T> {
    config: ClientConfig,
    transport: T,
}

impl CredentialServiceClient<UreqTransport> {
    /// Client backed by a blocking `ureq` agent.
    pub fn with_default_transport(config: ClientConfig) -> Self {
        Self::new(config, UreqTransport::new())
    }
}

impl<T> CredentialServiceClient<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn api_key(&self) -> &str {
        self.config.api_key()
    }

    pub fn set_api_key(&mut self, key: impl Into<String>) {
        self.config.set_api_key(key);
    }

    // -----------------------------------------------------------------------
    // Credentials
    // -----------------------------------------------------------------------

    pub fn build_get_credential(&self, id: u64) -> Result<HttpRequest> {
        self.request(HttpMethod::Get, &format!("credentials/{id}"), &[], None)
    }

    /// `email` is percent-encoded once, so `+` travels as `%2B`.
    pub fn build_list_credentials(
        &self,
        group_id: Option<u64>,
        email: Option<&str>,
        pagination: Pagination,
    ) -> Result<HttpRequest> {
        let mut query = Vec::new();
        if let Some(group_id) = group_id {
            query.push(("group_id", group_id.to_string()));
        }
        if let Some(email) = email {
            query.push(("email", email.to_string()));
        }
        push_pagination(&mut query, pagination);
        self.request(HttpMethod::Get, "all_credentials", &query, None)
    }

    /// Create payloads are sent with every field, `null`s included.
    pub fn build_create_credential(&self, input: &NewCredential) -> Result<HttpRequest> {
        let body = to_json(&CredentialEnvelope {
            credential: CredentialBody::from(input),
        })?;
        self.request(HttpMethod::Post, "credentials", &[], Some(body))
    }

    pub fn build_create_credential_legacy(&self, input: &LegacyCredential) -> Result<HttpRequest> {
        let body = to_json(&CredentialEnvelope {
            credential: LegacyCredentialBody::from(input),
        })?;
        self.request(HttpMethod::Post, "credentials", &[], Some(body))
    }

    pub fn build_update_credential(
        &self,
        id: u64,
        update: &CredentialUpdate,
    ) -> Result<HttpRequest> {
        let payload = strip_empty_keys(to_value(&CredentialEnvelope {
            credential: CredentialBody::from(update),
        })?);
        self.request(
            HttpMethod::Put,
            &format!("credentials/{id}"),
            &[],
            Some(to_json(&payload)?),
        )
    }

    pub fn build_delete_credential(&self, id: u64) -> Result<HttpRequest> {
        self.request(HttpMethod::Delete, &format!("credentials/{id}"), &[], None)
    }

    // -----------------------------------------------------------------------
    // Groups and designs
    // -----------------------------------------------------------------------

    pub fn build_create_group(&self, input: &NewGroup) -> Result<HttpRequest> {
        let body = to_json(&GroupEnvelope {
            group: GroupBody::from(input),
        })?;
        self.request(HttpMethod::Post, "issuer/groups", &[], Some(body))
    }

    pub fn build_get_group(&self, id: u64) -> Result<HttpRequest> {
        self.request(HttpMethod::Get, &format!("issuer/groups/{id}"), &[], None)
    }

    pub fn build_list_groups(&self, pagination: Pagination) -> Result<HttpRequest> {
        let mut query = Vec::new();
        push_pagination(&mut query, pagination);
        self.request(HttpMethod::Get, "issuer/all_groups", &query, None)
    }

    pub fn build_update_group(&self, id: u64, update: &GroupUpdate) -> Result<HttpRequest> {
        let payload = strip_empty_keys(to_value(&GroupEnvelope {
            group: GroupBody::from(update),
        })?);
        self.request(
            HttpMethod::Put,
            &format!("issuer/groups/{id}"),
            &[],
            Some(to_json(&payload)?),
        )
    }

    pub fn build_delete_group(&self, id: u64) -> Result<HttpRequest> {
        self.request(HttpMethod::Delete, &format!("issuer/groups/{id}"), &[], None)
    }

    pub fn build_list_designs(&self, pagination: Pagination) -> Result<HttpRequest> {
        let mut query = Vec::new();
        push_pagination(&mut query, pagination);
        self.request(HttpMethod::Get, "issuer/all_designs", &query, None)
    }

    // -----------------------------------------------------------------------
    // Evidence items
    // -----------------------------------------------------------------------

    pub fn build_create_evidence_item(
        &self,
        item: &EvidenceItem,
        credential_id: u64,
    ) -> Result<HttpRequest> {
        let body = to_json(&EvidenceItemEnvelope {
            evidence_item: item,
        })?;
        self.request(
            HttpMethod::Post,
            &format!("credentials/{credential_id}/evidence_items"),
            &[],
            Some(body),
        )
    }

    /// Fails with `InvalidArgument` unless `grade` is a number in 0..=100.
    pub fn build_create_evidence_item_grade(
        &self,
        grade: impl Display,
        description: &str,
        credential_id: u64,
        hidden: bool,
    ) -> Result<HttpRequest> {
        let item = evidence::grade_item(grade, description, hidden)?;
        self.build_create_evidence_item(&item, credential_id)
    }

    pub fn build_create_evidence_item_duration(
        &self,
        start_date: &str,
        end_date: &str,
        credential_id: u64,
        hidden: bool,
    ) -> Result<HttpRequest> {
        let item = evidence::duration_item(start_date, end_date, hidden)?;
        self.build_create_evidence_item(&item, credential_id)
    }

    pub fn build_create_evidence_item_transcript<I, K, V>(
        &self,
        transcript: I,
        credential_id: u64,
        hidden: bool,
    ) -> Result<HttpRequest>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let item = evidence::transcript_item(transcript, hidden)?;
        self.build_create_evidence_item(&item, credential_id)
    }

    // -----------------------------------------------------------------------
    // SSO and batch
    // -----------------------------------------------------------------------

    pub fn build_generate_recipient_sso_link(&self, link: &SsoLinkRequest) -> Result<HttpRequest> {
        let payload = strip_empty_keys(to_value(link)?);
        self.request(
            HttpMethod::Post,
            "sso/generate_link",
            &[],
            Some(to_json(&payload)?),
        )
    }

    /// Ops are forwarded as-is; their shape is defined by the service.
    pub fn build_send_batch_requests(&self, ops: &[Value]) -> Result<HttpRequest> {
        let body = to_json(&BatchBody {
            ops,
            sequential: true,
        })?;
        self.request(HttpMethod::Post, "batch", &[], Some(body))
    }

    // -----------------------------------------------------------------------
    // Responses
    // -----------------------------------------------------------------------

    /// Decode a raw response. Any non-2xx status becomes `ApiError::Remote`
    /// carrying the JSON error document when the body holds one. An empty
    /// 2xx body decodes to an empty object.
    pub fn parse_response(&self, response: HttpResponse) -> Result<ApiObject> {
        if !(200..300).contains(&response.status) {
            return Err(ApiError::Remote {
                status: response.status,
                body: serde_json::from_str(&response.body).ok(),
            });
        }
        if response.body.trim().is_empty() {
            return Ok(ApiObject::new());
        }
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    fn request(
        &self,
        method: HttpMethod,
        route: &str,
        query: &[(&str, String)],
        body: Option<String>,
    ) -> Result<HttpRequest> {
        let mut url = self.config.endpoint(route)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        let mut headers = vec![(
            "authorization".to_string(),
            format!("Token token=\"{}\"", self.config.api_key()),
        )];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }

        Ok(HttpRequest {
            method,
            url: url.into(),
            headers,
            body,
        })
    }
}

impl<T: Transport> CredentialServiceClient<T> {
    pub fn get_credential(&self, id: u64) -> Result<ApiObject> {
        self.send(Operation::GetCredential, self.build_get_credential(id)?)
    }

    pub fn list_credentials(
        &self,
        group_id: Option<u64>,
        email: Option<&str>,
        pagination: Pagination,
    ) -> Result<ApiObject> {
        let request = self.build_list_credentials(group_id, email, pagination)?;
        self.send(Operation::ListCredentials, request)
    }

    pub fn create_credential(&self, input: &NewCredential) -> Result<ApiObject> {
        self.send(Operation::CreateCredential, self.build_create_credential(input)?)
    }

    pub fn create_credential_legacy(&self, input: &LegacyCredential) -> Result<ApiObject> {
        let request = self.build_create_credential_legacy(input)?;
        self.send(Operation::CreateCredentialLegacy, request)
    }

    pub fn update_credential(&self, id: u64, update: &CredentialUpdate) -> Result<ApiObject> {
        let request = self.build_update_credential(id, update)?;
        self.send(Operation::UpdateCredential, request)
    }

    pub fn delete_credential(&self, id: u64) -> Result<ApiObject> {
        self.send(Operation::DeleteCredential, self.build_delete_credential(id)?)
    }

    pub fn create_group(&self, input: &NewGroup) -> Result<ApiObject> {
        self.send(Operation::CreateGroup, self.build_create_group(input)?)
    }

    pub fn get_group(&self, id: u64) -> Result<ApiObject> {
        self.send(Operation::GetGroup, self.build_get_group(id)?)
    }

    pub fn list_groups(&self, pagination: Pagination) -> Result<ApiObject> {
        self.send(Operation::ListGroups, self.build_list_groups(pagination)?)
    }

    pub fn update_group(&self, id: u64, update: &GroupUpdate) -> Result<ApiObject> {
        self.send(Operation::UpdateGroup, self.build_update_group(id, update)?)
    }

    pub fn delete_group(&self, id: u64) -> Result<ApiObject> {
        self.send(Operation::DeleteGroup, self.build_delete_group(id)?)
    }

    pub fn list_designs(&self, pagination: Pagination) -> Result<ApiObject> {
        self.send(Operation::ListDesigns, self.build_list_designs(pagination)?)
    }

    pub fn create_evidence_item(
        &self,
        item: &EvidenceItem,
        credential_id: u64,
    ) -> Result<ApiObject> {
        let request = self.build_create_evidence_item(item, credential_id)?;
        self.send(Operation::CreateEvidenceItem, request)
    }

    pub fn create_evidence_item_grade(
        &self,
        grade: impl Display,
        description: &str,
        credential_id: u64,
        hidden: bool,
    ) -> Result<ApiObject> {
        let request =
            self.build_create_evidence_item_grade(grade, description, credential_id, hidden)?;
        self.send(Operation::CreateEvidenceItemGrade, request)
    }

    pub fn create_evidence_item_duration(
        &self,
        start_date: &str,
        end_date: &str,
        credential_id: u64,
        hidden: bool,
    ) -> Result<ApiObject> {
        let request =
            self.build_create_evidence_item_duration(start_date, end_date, credential_id, hidden)?;
        self.send(Operation::CreateEvidenceItemDuration, request)
    }

    pub fn create_evidence_item_transcript<I, K, V>(
        &self,
        transcript: I,
        credential_id: u64,
        hidden: bool,
    ) -> Result<ApiObject>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let request =
            self.build_create_evidence_item_transcript(transcript, credential_id, hidden)?;
        self.send(Operation::CreateEvidenceItemTranscript, request)
    }

    pub fn generate_recipient_sso_link(&self, link: &SsoLinkRequest) -> Result<ApiObject> {
        let request = self.build_generate_recipient_sso_link(link)?;
        self.send(Operation::GenerateRecipientSsoLink, request)
    }

    pub fn send_batch_requests(&self, ops: &[Value]) -> Result<ApiObject> {
        self.send(Operation::SendBatchRequests, self.build_send_batch_requests(ops)?)
    }

    fn send(&self, operation: Operation, request: HttpRequest) -> Result<ApiObject> {
        debug!(
            %operation,
            method = request.method.as_str(),
            url = %request.url,
            "sending request"
        );
        let response = self.transport.execute(&request)?;
        debug!(%operation, status = response.status, "received response");
        self.parse_response(response)
    }
}

fn push_pagination(query: &mut Vec<(&'static str, String)>, pagination: Pagination) {
    if let Some(page_size) = pagination.page_size {
        query.push(("page_size", page_size.to_string()));
    }
    query.push(("page", pagination.page.to_string()));
}
