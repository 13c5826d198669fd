//! Request inputs and wire payloads for the credential service.
//!
//! # Design
//! Public input structs (`NewCredential`, `CredentialUpdate`, ...) are what
//! callers fill in. The crate-private `*Body` structs are the exact JSON
//! shapes the service expects. Their optional fields serialize as `null`,
//! which is what create-style calls send. Update-style calls pass the
//! serialized body through `strip_empty_keys` instead.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A decoded response document.
pub type ApiObject = Map<String, Value>;

/// Free-form attributes attached to a credential.
pub type CustomAttributes = Map<String, Value>;

/// Page selection for list endpoints. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page_size: Option<u32>,
    pub page: u32,
}

impl Pagination {
    pub fn page(page: u32) -> Self {
        Self {
            page_size: None,
            page,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::page(1)
    }
}

/// Input for issuing a credential into an existing group.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCredential {
    pub recipient_name: String,
    pub recipient_email: String,
    pub group_id: u64,
    pub issued_on: Option<NaiveDate>,
    pub expired_on: Option<NaiveDate>,
    pub custom_attributes: Option<CustomAttributes>,
}

/// Input for the legacy creation path, which names the group (achievement)
/// instead of referencing it by id and carries course metadata inline.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyCredential {
    pub recipient_name: String,
    pub recipient_email: String,
    pub achievement_name: String,
    pub issued_on: Option<NaiveDate>,
    pub expired_on: Option<NaiveDate>,
    pub course_name: Option<String>,
    pub course_description: Option<String>,
    pub course_link: Option<String>,
    pub custom_attributes: Option<CustomAttributes>,
}

/// Partial update of a credential. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CredentialUpdate {
    pub recipient_name: Option<String>,
    pub recipient_email: Option<String>,
    pub group_id: Option<u64>,
    pub issued_on: Option<NaiveDate>,
    pub expired_on: Option<NaiveDate>,
    pub custom_attributes: Option<CustomAttributes>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGroup {
    pub name: String,
    pub course_name: String,
    pub course_description: String,
    pub course_link: Option<String>,
    pub design_id: Option<u64>,
}

/// Partial update of a group. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupUpdate {
    pub name: Option<String>,
    pub course_name: Option<String>,
    pub course_description: Option<String>,
    pub course_link: Option<String>,
    pub design_id: Option<u64>,
}

/// Parameters for a recipient single-sign-on link. The service expects at
/// least one identifying field; that is not checked locally.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SsoLinkRequest {
    pub credential_id: Option<u64>,
    pub recipient_id: Option<u64>,
    pub recipient_email: Option<String>,
    pub wallet_view: Option<bool>,
    pub group_id: Option<u64>,
    pub redirect_to: Option<String>,
}

/// Kind of supporting data attached to a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EvidenceCategory {
    Grade,
    CourseDuration,
    Transcript,
    Other(String),
}

impl EvidenceCategory {
    pub fn as_str(&self) -> &str {
        match self {
            EvidenceCategory::Grade => "grade",
            EvidenceCategory::CourseDuration => "course_duration",
            EvidenceCategory::Transcript => "transcript",
            EvidenceCategory::Other(name) => name,
        }
    }
}

impl From<String> for EvidenceCategory {
    fn from(value: String) -> Self {
        match value.as_str() {
            "grade" => EvidenceCategory::Grade,
            "course_duration" => EvidenceCategory::CourseDuration,
            "transcript" => EvidenceCategory::Transcript,
            _ => EvidenceCategory::Other(value),
        }
    }
}

impl From<&str> for EvidenceCategory {
    fn from(value: &str) -> Self {
        EvidenceCategory::from(value.to_string())
    }
}

impl From<EvidenceCategory> for String {
    fn from(value: EvidenceCategory) -> Self {
        value.as_str().to_string()
    }
}

/// Supporting data attached to a credential.
///
/// `string_object` holds category-specific content already serialized to a
/// string (a number for grades, a JSON document for durations and
/// transcripts).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub description: String,
    pub category: EvidenceCategory,
    pub string_object: String,
    pub hidden: bool,
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct Recipient<'a> {
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CredentialBody<'a> {
    pub group_id: Option<u64>,
    pub recipient: Recipient<'a>,
    pub issued_on: Option<NaiveDate>,
    pub expired_on: Option<NaiveDate>,
    pub custom_attributes: Option<&'a CustomAttributes>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LegacyCredentialBody<'a> {
    pub group_name: &'a str,
    pub recipient: Recipient<'a>,
    pub issued_on: Option<NaiveDate>,
    pub expired_on: Option<NaiveDate>,
    pub custom_attributes: Option<&'a CustomAttributes>,
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub course_link: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CredentialEnvelope<T> {
    pub credential: T,
}

#[derive(Debug, Serialize)]
pub(crate) struct GroupBody<'a> {
    pub name: Option<&'a str>,
    pub course_name: Option<&'a str>,
    pub course_description: Option<&'a str>,
    pub course_link: Option<&'a str>,
    pub design_id: Option<u64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GroupEnvelope<'a> {
    pub group: GroupBody<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EvidenceItemEnvelope<'a> {
    pub evidence_item: &'a EvidenceItem,
}

#[derive(Debug, Serialize)]
pub(crate) struct BatchBody<'a> {
    pub ops: &'a [Value],
    pub sequential: bool,
}

impl<'a> From<&'a NewCredential> for CredentialBody<'a> {
    fn from(input: &'a NewCredential) -> Self {
        Self {
            group_id: Some(input.group_id),
            recipient: Recipient {
                name: Some(&input.recipient_name),
                email: Some(&input.recipient_email),
            },
            issued_on: input.issued_on,
            expired_on: input.expired_on,
            custom_attributes: input.custom_attributes.as_ref(),
        }
    }
}

impl<'a> From<&'a CredentialUpdate> for CredentialBody<'a> {
    fn from(input: &'a CredentialUpdate) -> Self {
        Self {
            group_id: input.group_id,
            recipient: Recipient {
                name: input.recipient_name.as_deref(),
                email: input.recipient_email.as_deref(),
            },
            issued_on: input.issued_on,
            expired_on: input.expired_on,
            custom_attributes: input.custom_attributes.as_ref(),
        }
    }
}

impl<'a> From<&'a LegacyCredential> for LegacyCredentialBody<'a> {
    fn from(input: &'a LegacyCredential) -> Self {
        Self {
            group_name: &input.achievement_name,
            recipient: Recipient {
                name: Some(&input.recipient_name),
                email: Some(&input.recipient_email),
            },
            issued_on: input.issued_on,
            expired_on: input.expired_on,
            custom_attributes: input.custom_attributes.as_ref(),
            name: input.course_name.as_deref(),
            description: input.course_description.as_deref(),
            course_link: input.course_link.as_deref(),
        }
    }
}

impl<'a> From<&'a NewGroup> for GroupBody<'a> {
    fn from(input: &'a NewGroup) -> Self {
        Self {
            name: Some(&input.name),
            course_name: Some(&input.course_name),
            course_description: Some(&input.course_description),
            course_link: input.course_link.as_deref(),
            design_id: input.design_id,
        }
    }
}

impl<'a> From<&'a GroupUpdate> for GroupBody<'a> {
    fn from(input: &'a GroupUpdate) -> Self {
        Self {
            name: input.name.as_deref(),
            course_name: input.course_name.as_deref(),
            course_description: input.course_description.as_deref(),
            course_link: input.course_link.as_deref(),
            design_id: input.design_id,
        }
    }
}
