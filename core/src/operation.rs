//! Named operations and the compatibility alias table.
//!
//! Every public client call maps to one `Operation`. The canonical name is
//! the snake_case method name. Older integrations used camelCase names and a
//! few different snake_case spellings (`get_credentials` for listing,
//! `recipient_sso_link`); those resolve through a static table.

use std::fmt;
use std::str::FromStr;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetCredential,
    ListCredentials,
    CreateCredential,
    CreateCredentialLegacy,
    UpdateCredential,
    DeleteCredential,
    CreateGroup,
    GetGroup,
    ListGroups,
    UpdateGroup,
    DeleteGroup,
    ListDesigns,
    CreateEvidenceItem,
    CreateEvidenceItemGrade,
    CreateEvidenceItemDuration,
    CreateEvidenceItemTranscript,
    GenerateRecipientSsoLink,
    SendBatchRequests,
}

/// (canonical name, legacy camelCase name, extra legacy aliases)
#[rustfmt::skip]
const NAMES: &[(Operation, &str, &str, &[&str])] = &[
    (Operation::GetCredential, "get_credential", "getCredential", &[]),
    (Operation::ListCredentials, "list_credentials", "listCredentials", &["get_credentials", "getCredentials"]),
    (Operation::CreateCredential, "create_credential", "createCredential", &[]),
    (Operation::CreateCredentialLegacy, "create_credential_legacy", "createCredentialLegacy", &[]),
    (Operation::UpdateCredential, "update_credential", "updateCredential", &[]),
    (Operation::DeleteCredential, "delete_credential", "deleteCredential", &[]),
    (Operation::CreateGroup, "create_group", "createGroup", &[]),
    (Operation::GetGroup, "get_group", "getGroup", &[]),
    (Operation::ListGroups, "list_groups", "listGroups", &["get_groups", "getGroups"]),
    (Operation::UpdateGroup, "update_group", "updateGroup", &[]),
    (Operation::DeleteGroup, "delete_group", "deleteGroup", &[]),
    (Operation::ListDesigns, "list_designs", "listDesigns", &["get_designs", "getDesigns"]),
    (Operation::CreateEvidenceItem, "create_evidence_item", "createEvidenceItem", &[]),
    (Operation::CreateEvidenceItemGrade, "create_evidence_item_grade", "createEvidenceItemGrade", &[]),
    (Operation::CreateEvidenceItemDuration, "create_evidence_item_duration", "createEvidenceItemDuration", &[]),
    (Operation::CreateEvidenceItemTranscript, "create_evidence_item_transcript", "createEvidenceItemTranscript", &[]),
    (Operation::GenerateRecipientSsoLink, "generate_recipient_sso_link", "generateRecipientSsoLink", &["recipient_sso_link", "recipientSsoLink"]),
    (Operation::SendBatchRequests, "send_batch_requests", "sendBatchRequests", &[]),
];

impl Operation {
    pub const ALL: [Operation; 18] = [
        Operation::GetCredential,
        Operation::ListCredentials,
        Operation::CreateCredential,
        Operation::CreateCredentialLegacy,
        Operation::UpdateCredential,
        Operation::DeleteCredential,
        Operation::CreateGroup,
        Operation::GetGroup,
        Operation::ListGroups,
        Operation::UpdateGroup,
        Operation::DeleteGroup,
        Operation::ListDesigns,
        Operation::CreateEvidenceItem,
        Operation::CreateEvidenceItemGrade,
        Operation::CreateEvidenceItemDuration,
        Operation::CreateEvidenceItemTranscript,
        Operation::GenerateRecipientSsoLink,
        Operation::SendBatchRequests,
    ];

    /// Canonical snake_case name.
    pub fn name(&self) -> &'static str {
        self.entry().1
    }

    /// camelCase name used by older integrations.
    pub fn legacy_name(&self) -> &'static str {
        self.entry().2
    }

    /// Resolve a canonical, camelCase or legacy alias name.
    pub fn from_name(name: &str) -> Result<Self, ApiError> {
        NAMES
            .iter()
            .find(|(_, canonical, camel, aliases)| {
                *canonical == name || *camel == name || aliases.contains(&name)
            })
            .map(|(op, ..)| *op)
            .ok_or_else(|| ApiError::UnknownMethod(name.to_string()))
    }

    fn entry(&self) -> &'static (Operation, &'static str, &'static str, &'static [&'static str]) {
        // NAMES has one row per variant, in declaration order.
        &NAMES[*self as usize]
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::from_name(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_rows_line_up_with_variants() {
        for op in Operation::ALL {
            assert_eq!(NAMES[op as usize].0, op);
        }
        assert_eq!(NAMES.len(), Operation::ALL.len());
    }

    #[test]
    fn every_name_round_trips() {
        for op in Operation::ALL {
            assert_eq!(Operation::from_name(op.name()).unwrap(), op);
            assert_eq!(Operation::from_name(op.legacy_name()).unwrap(), op);
        }
    }

    #[test]
    fn legacy_snake_case_aliases_resolve() {
        assert_eq!(
            "get_credentials".parse::<Operation>().unwrap(),
            Operation::ListCredentials
        );
        assert_eq!(
            "recipient_sso_link".parse::<Operation>().unwrap(),
            Operation::GenerateRecipientSsoLink
        );
        assert_eq!("getDesigns".parse::<Operation>().unwrap(), Operation::ListDesigns);
    }

    #[test]
    fn unknown_name_fails() {
        let err = Operation::from_name("get_credential_by_magic").unwrap_err();
        match err {
            ApiError::UnknownMethod(name) => assert_eq!(name, "get_credential_by_magic"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn display_uses_canonical_name() {
        assert_eq!(Operation::CreateEvidenceItemGrade.to_string(), "create_evidence_item_grade");
    }
}
