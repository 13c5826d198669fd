//! Verify request builders against JSON test vectors stored in `test-vectors/`.
//!
//! Each case names its operation the way a caller of the older SDK might
//! (canonical, camelCase or legacy alias), so the vectors also exercise the
//! alias table. Bodies are compared as parsed JSON, not raw strings, to
//! avoid false negatives from key ordering.

use acms_client::{
    ApiError, ClientConfig, CredentialServiceClient, CredentialUpdate, EvidenceItem, GroupUpdate,
    HttpMethod, HttpRequest, LegacyCredential, NewCredential, NewGroup, Operation, Pagination,
    SsoLinkRequest,
};
use chrono::NaiveDate;
use serde_json::{Map, Value};

const BASE_URL: &str = "https://api.accredible.com/v1/";

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn opt_string(input: &Value, key: &str) -> Option<String> {
    input.get(key).and_then(Value::as_str).map(str::to_string)
}

fn string(input: &Value, key: &str) -> String {
    opt_string(input, key).unwrap_or_else(|| panic!("missing string field {key}"))
}

fn opt_u64(input: &Value, key: &str) -> Option<u64> {
    input.get(key).and_then(Value::as_u64)
}

fn id(input: &Value, key: &str) -> u64 {
    opt_u64(input, key).unwrap_or_else(|| panic!("missing id field {key}"))
}

fn date(input: &Value, key: &str) -> Option<NaiveDate> {
    opt_string(input, key).map(|s| s.parse().unwrap())
}

fn attributes(input: &Value) -> Option<Map<String, Value>> {
    input.get("custom_attributes").and_then(Value::as_object).cloned()
}

fn hidden(input: &Value) -> bool {
    input.get("hidden").and_then(Value::as_bool).unwrap_or(false)
}

fn pagination(input: &Value) -> Pagination {
    let page = opt_u64(input, "page").unwrap_or(1) as u32;
    let mut pagination = Pagination::page(page);
    if let Some(page_size) = opt_u64(input, "page_size") {
        pagination = pagination.with_page_size(page_size as u32);
    }
    pagination
}

/// Build the request for `operation` from a vector's `input` object.
fn build(
    c: &CredentialServiceClient<()>,
    operation: Operation,
    input: &Value,
) -> Result<HttpRequest, ApiError> {
    match operation {
        Operation::GetCredential => c.build_get_credential(id(input, "id")),
        Operation::ListCredentials => c.build_list_credentials(
            opt_u64(input, "group_id"),
            input.get("email").and_then(Value::as_str),
            pagination(input),
        ),
        Operation::CreateCredential => c.build_create_credential(&NewCredential {
            recipient_name: string(input, "recipient_name"),
            recipient_email: string(input, "recipient_email"),
            group_id: id(input, "group_id"),
            issued_on: date(input, "issued_on"),
            expired_on: date(input, "expired_on"),
            custom_attributes: attributes(input),
        }),
        Operation::CreateCredentialLegacy => c.build_create_credential_legacy(&LegacyCredential {
            recipient_name: string(input, "recipient_name"),
            recipient_email: string(input, "recipient_email"),
            achievement_name: string(input, "achievement_name"),
            issued_on: date(input, "issued_on"),
            expired_on: date(input, "expired_on"),
            course_name: opt_string(input, "course_name"),
            course_description: opt_string(input, "course_description"),
            course_link: opt_string(input, "course_link"),
            custom_attributes: attributes(input),
        }),
        Operation::UpdateCredential => c.build_update_credential(
            id(input, "id"),
            &CredentialUpdate {
                recipient_name: opt_string(input, "recipient_name"),
                recipient_email: opt_string(input, "recipient_email"),
                group_id: opt_u64(input, "group_id"),
                issued_on: date(input, "issued_on"),
                expired_on: date(input, "expired_on"),
                custom_attributes: attributes(input),
            },
        ),
        Operation::DeleteCredential => c.build_delete_credential(id(input, "id")),
        Operation::CreateGroup => c.build_create_group(&NewGroup {
            name: string(input, "name"),
            course_name: string(input, "course_name"),
            course_description: string(input, "course_description"),
            course_link: opt_string(input, "course_link"),
            design_id: opt_u64(input, "design_id"),
        }),
        Operation::GetGroup => c.build_get_group(id(input, "id")),
        Operation::ListGroups => c.build_list_groups(pagination(input)),
        Operation::UpdateGroup => c.build_update_group(
            id(input, "id"),
            &GroupUpdate {
                name: opt_string(input, "name"),
                course_name: opt_string(input, "course_name"),
                course_description: opt_string(input, "course_description"),
                course_link: opt_string(input, "course_link"),
                design_id: opt_u64(input, "design_id"),
            },
        ),
        Operation::DeleteGroup => c.build_delete_group(id(input, "id")),
        Operation::ListDesigns => c.build_list_designs(pagination(input)),
        Operation::CreateEvidenceItem => {
            let item: EvidenceItem =
                serde_json::from_value(input["evidence_item"].clone()).unwrap();
            c.build_create_evidence_item(&item, id(input, "credential_id"))
        }
        Operation::CreateEvidenceItemGrade => c.build_create_evidence_item_grade(
            string(input, "grade"),
            &string(input, "description"),
            id(input, "credential_id"),
            hidden(input),
        ),
        Operation::CreateEvidenceItemDuration => c.build_create_evidence_item_duration(
            &string(input, "start_date"),
            &string(input, "end_date"),
            id(input, "credential_id"),
            hidden(input),
        ),
        Operation::CreateEvidenceItemTranscript => {
            let entries: Vec<(String, Value)> = input["transcript"]
                .as_array()
                .unwrap()
                .iter()
                .map(|pair| (pair[0].as_str().unwrap().to_string(), pair[1].clone()))
                .collect();
            c.build_create_evidence_item_transcript(
                entries,
                id(input, "credential_id"),
                hidden(input),
            )
        }
        Operation::GenerateRecipientSsoLink => {
            c.build_generate_recipient_sso_link(&SsoLinkRequest {
                credential_id: opt_u64(input, "credential_id"),
                recipient_id: opt_u64(input, "recipient_id"),
                recipient_email: opt_string(input, "recipient_email"),
                wallet_view: input.get("wallet_view").and_then(Value::as_bool),
                group_id: opt_u64(input, "group_id"),
                redirect_to: opt_string(input, "redirect_to"),
            })
        }
        Operation::SendBatchRequests => {
            let ops = input["ops"].as_array().cloned().unwrap_or_default();
            c.build_send_batch_requests(&ops)
        }
    }
}

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let api_key = vectors["api_key"].as_str().unwrap();

    let c = CredentialServiceClient::new(ClientConfig::new(api_key, false), ());
    let expected_auth = format!("Token token=\"{api_key}\"");

    let mut covered = std::collections::HashSet::new();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let operation = Operation::from_name(case["operation"].as_str().unwrap())
            .unwrap_or_else(|e| panic!("{name}: {e}"));
        covered.insert(operation);

        let result = build(&c, operation, &case["input"]);

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected_error.as_str().unwrap() {
                "InvalidArgument" => assert!(
                    matches!(err, ApiError::InvalidArgument(_)),
                    "{name}: expected InvalidArgument, got {err:?}"
                ),
                other => panic!("{name}: unknown expected_error: {other}"),
            }
            continue;
        }

        let req = result.unwrap_or_else(|e| panic!("{name}: {e}"));
        let expected_req = &case["expected_request"];
        assert_eq!(
            req.method,
            parse_method(expected_req["method"].as_str().unwrap()),
            "{name}: method"
        );
        assert_eq!(
            req.url,
            format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()),
            "{name}: url"
        );
        assert_eq!(req.header("authorization"), Some(expected_auth.as_str()), "{name}: auth");

        match &expected_req["body"] {
            Value::Null => {
                assert!(req.body.is_none(), "{name}: body should be None");
                assert!(req.header("content-type").is_none(), "{name}: content-type");
            }
            expected_body => {
                assert_eq!(
                    req.header("content-type"),
                    Some("application/json"),
                    "{name}: content-type"
                );
                let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
                assert_eq!(&body, expected_body, "{name}: body");
            }
        }
    }

    for operation in Operation::ALL {
        assert!(covered.contains(&operation), "no vector for {operation}");
    }
}

#[test]
fn unknown_operation_name_is_rejected() {
    let err = Operation::from_name("getCertificate").unwrap_err();
    assert!(matches!(err, ApiError::UnknownMethod(_)));
    assert_eq!(err.to_string(), "call to undefined method getCertificate");
}
