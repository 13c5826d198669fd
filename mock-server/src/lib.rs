//! In-memory stand-in for the credential service REST API.
//!
//! Serves the `/v1` routes the client SDK talks to, checks the
//! `Authorization: Token token="..."` header on every request and keeps all
//! state in a single `RwLock`. Updates apply only the keys present in the
//! body; a key sent as `null` clears the field, as the real service does.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

const DEFAULT_PAGE_SIZE: usize = 50;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Recipient {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EvidenceItem {
    pub id: u64,
    pub description: String,
    pub category: String,
    pub string_object: String,
    pub hidden: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Credential {
    pub id: u64,
    pub group_id: u64,
    pub group_name: String,
    pub recipient: Recipient,
    pub issued_on: Option<String>,
    pub expired_on: Option<String>,
    pub custom_attributes: Option<Value>,
    pub evidence_items: Vec<EvidenceItem>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Group {
    pub id: u64,
    pub name: String,
    pub course_name: Option<String>,
    pub course_description: Option<String>,
    pub course_link: Option<String>,
    pub design_id: Option<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Design {
    pub id: u64,
    pub name: String,
}

#[derive(Debug)]
pub struct Store {
    next_id: u64,
    credentials: BTreeMap<u64, Credential>,
    groups: BTreeMap<u64, Group>,
    designs: Vec<Design>,
}

impl Store {
    fn new() -> Self {
        Self {
            next_id: 1,
            credentials: BTreeMap::new(),
            groups: BTreeMap::new(),
            designs: vec![
                Design {
                    id: 1,
                    name: "Classic Certificate".to_string(),
                },
                Design {
                    id: 2,
                    name: "Modern Badge".to_string(),
                },
            ],
        }
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    api_key: Arc<str>,
    db: Db,
}

/// Router for the mock service. Requests must present `api_key`.
pub fn app(api_key: &str) -> Router {
    let state = AppState {
        api_key: Arc::from(api_key),
        db: Arc::new(RwLock::new(Store::new())),
    };
    let api = Router::new()
        .route("/credentials", post(create_credential))
        .route(
            "/credentials/{id}",
            get(get_credential).put(update_credential).delete(delete_credential),
        )
        .route("/credentials/{id}/evidence_items", post(create_evidence_item))
        .route("/all_credentials", get(list_credentials))
        .route("/issuer/groups", post(create_group))
        .route(
            "/issuer/groups/{id}",
            get(get_group).put(update_group).delete(delete_group),
        )
        .route("/issuer/all_groups", get(list_groups))
        .route("/issuer/all_designs", get(list_designs))
        .route("/sso/generate_link", post(generate_sso_link))
        .route("/batch", post(batch))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token))
        .with_state(state);
    Router::new().nest("/v1", api)
}

pub async fn run(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(api_key)).await
}

// ---------------------------------------------------------------------------
// Plumbing
// ---------------------------------------------------------------------------

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn error(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "errors": message })))
}

fn not_found() -> (StatusCode, Json<Value>) {
    error(StatusCode::NOT_FOUND, "Not found")
}

async fn require_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let expected = format!("Token token=\"{}\"", state.api_key);
    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if presented == Some(expected.as_str()) {
        next.run(request).await
    } else {
        tracing::debug!("rejecting request with missing or invalid token");
        error(StatusCode::UNAUTHORIZED, "Invalid API key").into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page_size: Option<usize>,
    pub page: Option<usize>,
}

fn paginate<T: Serialize>(key: &str, items: Vec<T>, query: &PageQuery) -> Value {
    let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
    let page = query.page.unwrap_or(1).max(1);
    let total_count = items.len();
    let total_pages = total_count.div_ceil(page_size).max(1);
    let page_items: Vec<T> = items
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();
    json!({
        key: page_items,
        "meta": {
            "current_page": page,
            "next_page": (page < total_pages).then_some(page + 1),
            "prev_page": (page > 1).then_some(page - 1),
            "total_pages": total_pages,
            "total_count": total_count,
            "page_size": page_size,
        }
    })
}

/// Copy `key` from `patch` into `field` when present; `null` clears it.
fn patch_string(patch: &Value, key: &str, field: &mut Option<String>) {
    if let Some(value) = patch.get(key) {
        *field = value.as_str().map(str::to_string);
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateCredential {
    pub group_id: Option<u64>,
    pub group_name: Option<String>,
    pub recipient: Recipient,
    pub issued_on: Option<String>,
    pub expired_on: Option<String>,
    pub custom_attributes: Option<Value>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub course_link: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CredentialEnvelope {
    pub credential: CreateCredential,
}

async fn create_credential(
    State(state): State<AppState>,
    Json(input): Json<CredentialEnvelope>,
) -> ApiResult {
    let input = input.credential;
    if input.recipient.name.is_none() || input.recipient.email.is_none() {
        return Err(error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Recipient name and email are required",
        ));
    }

    let mut store = state.db.write().await;
    let group = match (input.group_id, input.group_name) {
        (Some(id), _) => store.groups.get(&id).cloned().ok_or_else(|| {
            error(StatusCode::UNPROCESSABLE_ENTITY, "Group not found")
        })?,
        // Legacy path: the group is looked up by name and created on demand.
        (None, Some(name)) => {
            let existing = store.groups.values().find(|g| g.name == name).cloned();
            match existing {
                Some(group) => group,
                None => {
                    let group = Group {
                        id: store.allocate_id(),
                        name,
                        course_name: input.name,
                        course_description: input.description,
                        course_link: input.course_link,
                        design_id: None,
                    };
                    store.groups.insert(group.id, group.clone());
                    group
                }
            }
        }
        (None, None) => {
            return Err(error(
                StatusCode::UNPROCESSABLE_ENTITY,
                "group_id or group_name is required",
            ))
        }
    };

    let credential = Credential {
        id: store.allocate_id(),
        group_id: group.id,
        group_name: group.name,
        recipient: input.recipient,
        issued_on: input.issued_on,
        expired_on: input.expired_on,
        custom_attributes: input.custom_attributes,
        evidence_items: Vec::new(),
    };
    store.credentials.insert(credential.id, credential.clone());
    Ok(Json(json!({ "credential": credential })))
}

async fn get_credential(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult {
    let store = state.db.read().await;
    let credential = store.credentials.get(&id).ok_or_else(not_found)?;
    Ok(Json(json!({ "credential": credential })))
}

async fn update_credential(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> ApiResult {
    let patch = body.get("credential").cloned().unwrap_or(Value::Null);
    let mut store = state.db.write().await;

    let new_group = match patch.get("group_id") {
        Some(Value::Number(n)) => {
            let group_id = n.as_u64().ok_or_else(not_found)?;
            let group = store.groups.get(&group_id).cloned().ok_or_else(|| {
                error(StatusCode::UNPROCESSABLE_ENTITY, "Group not found")
            })?;
            Some(group)
        }
        Some(Value::Null) => {
            return Err(error(
                StatusCode::UNPROCESSABLE_ENTITY,
                "group_id cannot be null",
            ))
        }
        _ => None,
    };

    let credential = store.credentials.get_mut(&id).ok_or_else(not_found)?;
    if let Some(group) = new_group {
        credential.group_id = group.id;
        credential.group_name = group.name;
    }
    match patch.get("recipient") {
        Some(Value::Null) => credential.recipient = Recipient::default(),
        Some(recipient) => {
            patch_string(recipient, "name", &mut credential.recipient.name);
            patch_string(recipient, "email", &mut credential.recipient.email);
        }
        None => {}
    }
    patch_string(&patch, "issued_on", &mut credential.issued_on);
    patch_string(&patch, "expired_on", &mut credential.expired_on);
    if let Some(attributes) = patch.get("custom_attributes") {
        credential.custom_attributes = (!attributes.is_null()).then(|| attributes.clone());
    }
    Ok(Json(json!({ "credential": credential })))
}

async fn delete_credential(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult {
    let mut store = state.db.write().await;
    let credential = store.credentials.remove(&id).ok_or_else(not_found)?;
    Ok(Json(json!({ "credential": credential })))
}

#[derive(Debug, Deserialize)]
pub struct CredentialQuery {
    pub group_id: Option<u64>,
    pub email: Option<String>,
    pub page_size: Option<usize>,
    pub page: Option<usize>,
}

async fn list_credentials(
    State(state): State<AppState>,
    Query(query): Query<CredentialQuery>,
) -> Json<Value> {
    let store = state.db.read().await;
    let matches: Vec<&Credential> = store
        .credentials
        .values()
        .filter(|c| query.group_id.map_or(true, |id| c.group_id == id))
        .filter(|c| {
            query
                .email
                .as_deref()
                .map_or(true, |email| c.recipient.email.as_deref() == Some(email))
        })
        .collect();
    let page = PageQuery {
        page_size: query.page_size,
        page: query.page,
    };
    Json(paginate("credentials", matches, &page))
}

#[derive(Debug, Deserialize)]
pub struct NewEvidenceItem {
    pub description: String,
    pub category: String,
    pub string_object: String,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Deserialize)]
pub struct EvidenceItemEnvelope {
    pub evidence_item: NewEvidenceItem,
}

async fn create_evidence_item(
    State(state): State<AppState>,
    Path(credential_id): Path<u64>,
    Json(input): Json<EvidenceItemEnvelope>,
) -> ApiResult {
    let input = input.evidence_item;
    let mut store = state.db.write().await;
    if !store.credentials.contains_key(&credential_id) {
        return Err(not_found());
    }
    let item = EvidenceItem {
        id: store.allocate_id(),
        description: input.description,
        category: input.category,
        string_object: input.string_object,
        hidden: input.hidden,
    };
    if let Some(credential) = store.credentials.get_mut(&credential_id) {
        credential.evidence_items.push(item.clone());
    }
    Ok(Json(json!({ "evidence_item": item })))
}

// ---------------------------------------------------------------------------
// Groups and designs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateGroup {
    pub name: String,
    pub course_name: Option<String>,
    pub course_description: Option<String>,
    pub course_link: Option<String>,
    pub design_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct GroupEnvelope {
    pub group: CreateGroup,
}

async fn create_group(
    State(state): State<AppState>,
    Json(input): Json<GroupEnvelope>,
) -> ApiResult {
    let input = input.group;
    if input.name.trim().is_empty() {
        return Err(error(StatusCode::UNPROCESSABLE_ENTITY, "Name can't be blank"));
    }
    let mut store = state.db.write().await;
    if store.groups.values().any(|g| g.name == input.name) {
        return Err(error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Name has already been taken",
        ));
    }
    let group = Group {
        id: store.allocate_id(),
        name: input.name,
        course_name: input.course_name,
        course_description: input.course_description,
        course_link: input.course_link,
        design_id: input.design_id,
    };
    store.groups.insert(group.id, group.clone());
    Ok(Json(json!({ "group": group })))
}

async fn get_group(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult {
    let store = state.db.read().await;
    let group = store.groups.get(&id).ok_or_else(not_found)?;
    Ok(Json(json!({ "group": group })))
}

async fn update_group(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> ApiResult {
    let patch = body.get("group").cloned().unwrap_or(Value::Null);
    let mut store = state.db.write().await;
    let group = store.groups.get_mut(&id).ok_or_else(not_found)?;
    if let Some(name) = patch.get("name") {
        match name.as_str() {
            Some(name) if !name.trim().is_empty() => group.name = name.to_string(),
            _ => {
                return Err(error(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "Name can't be blank",
                ))
            }
        }
    }
    patch_string(&patch, "course_name", &mut group.course_name);
    patch_string(&patch, "course_description", &mut group.course_description);
    patch_string(&patch, "course_link", &mut group.course_link);
    if let Some(design_id) = patch.get("design_id") {
        group.design_id = design_id.as_u64();
    }
    Ok(Json(json!({ "group": group })))
}

async fn delete_group(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult {
    let mut store = state.db.write().await;
    let group = store.groups.remove(&id).ok_or_else(not_found)?;
    Ok(Json(json!({ "group": group })))
}

async fn list_groups(State(state): State<AppState>, Query(query): Query<PageQuery>) -> Json<Value> {
    let store = state.db.read().await;
    let groups: Vec<&Group> = store.groups.values().collect();
    Json(paginate("groups", groups, &query))
}

async fn list_designs(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Json<Value> {
    let store = state.db.read().await;
    let designs: Vec<&Design> = store.designs.iter().collect();
    Json(paginate("designs", designs, &query))
}

// ---------------------------------------------------------------------------
// SSO and batch
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SsoLinkRequest {
    pub credential_id: Option<u64>,
    pub recipient_id: Option<u64>,
    pub recipient_email: Option<String>,
    pub wallet_view: Option<bool>,
    pub group_id: Option<u64>,
    pub redirect_to: Option<String>,
}

async fn generate_sso_link(Json(input): Json<SsoLinkRequest>) -> ApiResult {
    if input.credential_id.is_none()
        && input.recipient_id.is_none()
        && input.recipient_email.is_none()
    {
        return Err(error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "A credential or recipient identifier is required",
        ));
    }
    let mut link = format!("https://mock.accredible.test/sso/{}", Uuid::new_v4());
    if input.wallet_view == Some(true) {
        link.push_str("?view=wallet");
    }
    Ok(Json(json!({
        "link": link,
        "redirect_to": input.redirect_to,
        "group_id": input.group_id,
    })))
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub ops: Vec<Value>,
    pub sequential: bool,
}

/// Acknowledges each op in order without executing it.
async fn batch(Json(input): Json<BatchRequest>) -> ApiResult {
    if !input.sequential {
        return Err(error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Only sequential batches are supported",
        ));
    }
    let results: Vec<Value> = input
        .ops
        .into_iter()
        .map(|op| json!({ "status": 202, "request": op }))
        .collect();
    Ok(Json(json!({ "results": results })))
}
