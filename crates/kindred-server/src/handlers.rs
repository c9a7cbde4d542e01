//! Request handlers for the family tree API

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use kindred_core::limits::{validate_person, validate_relationship, validate_tree_name};
use kindred_core::passcode::{hash_passcode, verify_passcode};
use kindred_core::{
    resolve_relationship_path, HydratedPath, NewPerson, NewRelationship, Person, PersonId,
    Relationship, RelationshipId, TreeId, TreeSummary,
};
use kindred_storage::StorageBackend;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// Shared state for all handlers
pub struct AppState<S: StorageBackend> {
    pub storage: Arc<S>,
    pub passcode_cost: u32,
}

impl<S: StorageBackend> AppState<S> {
    pub fn new(storage: Arc<S>, passcode_cost: u32) -> Self {
        Self {
            storage,
            passcode_cost,
        }
    }

    async fn require_tree(&self, tree: TreeId) -> ApiResult<()> {
        match self.storage.get_tree(tree).await? {
            Some(_) => Ok(()),
            None => Err(ApiError::NotFound("Family tree not found".to_string())),
        }
    }
}

type SharedState<S> = State<Arc<AppState<S>>>;

// ─────────────────────────────────────────────────────────────────────────────
// Request / response bodies
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateTreeRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub passcode: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTreeResponse {
    pub id: TreeId,
    pub name: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub passcode: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub verified: bool,
    pub tree: TreeSummary,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: i64,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateRelationshipRequest {
    #[serde(default)]
    pub person1_id: Option<PersonId>,
    #[serde(default)]
    pub person2_id: Option<PersonId>,
    #[serde(default)]
    pub relationship_type: Option<String>,
}

impl CreateRelationshipRequest {
    /// Zero ids and blank kinds count as missing
    fn into_new(self) -> ApiResult<NewRelationship> {
        let person1 = self.person1_id.filter(|id| id.0 != 0);
        let person2 = self.person2_id.filter(|id| id.0 != 0);
        let kind = self.relationship_type.filter(|k| !k.trim().is_empty());

        match (person1, person2, kind) {
            (Some(p1), Some(p2), Some(kind)) => Ok(NewRelationship::new(p1, p2, kind)),
            _ => Err(ApiError::BadRequest("All fields are required".to_string())),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PathQuery {
    pub person1_id: Option<String>,
    pub person2_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PathResponse {
    pub path: Option<HydratedPath>,
}

fn parse_person_id(raw: &str) -> ApiResult<PersonId> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid person ID: {}", raw)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Health check endpoint
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "server": "kindred",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn create_tree<S: StorageBackend + 'static>(
    State(state): SharedState<S>,
    payload: Result<Json<CreateTreeRequest>, JsonRejection>,
) -> ApiResult<Json<CreateTreeResponse>> {
    let Json(request) = payload?;

    let (name, passcode) = match (request.name, request.passcode) {
        (Some(name), Some(passcode)) if !name.trim().is_empty() && !passcode.is_empty() => {
            (name.trim().to_string(), passcode)
        }
        _ => {
            return Err(ApiError::BadRequest(
                "Name and passcode are required".to_string(),
            ))
        }
    };
    validate_tree_name(&name)?;

    let cost = state.passcode_cost;
    let hash = tokio::task::spawn_blocking(move || hash_passcode(&passcode, cost)).await??;

    let tree = state.storage.create_tree(&name, &hash).await?;
    tracing::info!("Created family tree {} ({})", tree.id, tree.name);

    Ok(Json(CreateTreeResponse {
        id: tree.id,
        name: tree.name,
        message: "Family tree created successfully".to_string(),
    }))
}

pub async fn verify_tree<S: StorageBackend + 'static>(
    State(state): SharedState<S>,
    path: Result<Path<TreeId>, PathRejection>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> ApiResult<Json<VerifyResponse>> {
    let Path(tree_id) = path?;
    let Json(request) = payload?;

    let passcode = request
        .passcode
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Passcode is required".to_string()))?;

    let tree = state
        .storage
        .get_tree(tree_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Family tree not found".to_string()))?;

    let summary = tree.summary();
    let hash = tree.passcode_hash;
    let valid = tokio::task::spawn_blocking(move || verify_passcode(&passcode, &hash)).await??;

    if !valid {
        tracing::debug!("Rejected passcode for tree {}", tree_id);
        return Err(ApiError::Unauthorized("Invalid passcode".to_string()));
    }

    Ok(Json(VerifyResponse {
        verified: true,
        tree: summary,
    }))
}

pub async fn list_members<S: StorageBackend + 'static>(
    State(state): SharedState<S>,
    path: Result<Path<TreeId>, PathRejection>,
) -> ApiResult<Json<Vec<Person>>> {
    let Path(tree_id) = path?;
    state.require_tree(tree_id).await?;

    Ok(Json(state.storage.get_all_people(tree_id).await?))
}

pub async fn create_member<S: StorageBackend + 'static>(
    State(state): SharedState<S>,
    path: Result<Path<TreeId>, PathRejection>,
    payload: Result<Json<NewPerson>, JsonRejection>,
) -> ApiResult<Json<CreatedResponse>> {
    let Path(tree_id) = path?;
    let Json(details) = payload?;

    let details = details.normalized();
    validate_person(&details)?;

    let person = state.storage.create_person(tree_id, details).await?;
    tracing::info!("Added member {} to tree {}", person.id, tree_id);

    Ok(Json(CreatedResponse {
        id: person.id.0,
        message: "Member added successfully".to_string(),
    }))
}

pub async fn update_member<S: StorageBackend + 'static>(
    State(state): SharedState<S>,
    path: Result<Path<(TreeId, PersonId)>, PathRejection>,
    payload: Result<Json<NewPerson>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path((tree_id, member_id)) = path?;
    let Json(details) = payload?;

    let details = details.normalized();
    validate_person(&details)?;

    state
        .storage
        .update_person(tree_id, member_id, details)
        .await?;

    Ok(MessageResponse::new("Member updated successfully"))
}

pub async fn delete_member<S: StorageBackend + 'static>(
    State(state): SharedState<S>,
    path: Result<Path<(TreeId, PersonId)>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path((tree_id, member_id)) = path?;

    state.storage.delete_person(tree_id, member_id).await?;
    tracing::info!("Deleted member {} from tree {}", member_id, tree_id);

    Ok(MessageResponse::new("Member deleted successfully"))
}

pub async fn list_relationships<S: StorageBackend + 'static>(
    State(state): SharedState<S>,
    path: Result<Path<TreeId>, PathRejection>,
) -> ApiResult<Json<Vec<Relationship>>> {
    let Path(tree_id) = path?;
    state.require_tree(tree_id).await?;

    Ok(Json(state.storage.get_all_relationships(tree_id).await?))
}

pub async fn create_relationship<S: StorageBackend + 'static>(
    State(state): SharedState<S>,
    path: Result<Path<TreeId>, PathRejection>,
    payload: Result<Json<CreateRelationshipRequest>, JsonRejection>,
) -> ApiResult<Json<CreatedResponse>> {
    let Path(tree_id) = path?;
    let Json(request) = payload?;

    let relationship = request.into_new()?;
    validate_relationship(&relationship)?;

    let created = state
        .storage
        .create_relationship(tree_id, relationship)
        .await?;
    tracing::info!(
        "Recorded {} as {} of {} in tree {}",
        created.person1_id,
        created.relationship_type,
        created.person2_id,
        tree_id
    );

    Ok(Json(CreatedResponse {
        id: created.id.0,
        message: "Relationship added successfully".to_string(),
    }))
}

pub async fn delete_relationship<S: StorageBackend + 'static>(
    State(state): SharedState<S>,
    path: Result<Path<(TreeId, RelationshipId)>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path((tree_id, rel_id)) = path?;

    state.storage.delete_relationship(tree_id, rel_id).await?;

    Ok(MessageResponse::new("Relationship deleted successfully"))
}

pub async fn relationship_path<S: StorageBackend + 'static>(
    State(state): SharedState<S>,
    path: Result<Path<TreeId>, PathRejection>,
    query: Result<Query<PathQuery>, QueryRejection>,
) -> ApiResult<Json<PathResponse>> {
    let Path(tree_id) = path?;
    let Query(query) = query?;

    let (raw1, raw2) = match (query.person1_id, query.person2_id) {
        (Some(a), Some(b)) if !a.trim().is_empty() && !b.trim().is_empty() => (a, b),
        _ => {
            return Err(ApiError::BadRequest(
                "Both person IDs are required".to_string(),
            ))
        }
    };
    let person1 = parse_person_id(&raw1)?;
    let person2 = parse_person_id(&raw2)?;

    state.require_tree(tree_id).await?;
    let family = state.storage.load_family(tree_id).await?;

    let path = resolve_relationship_path(&family.people, &family.relationships, person1, person2)?;
    tracing::debug!(
        "Path {} -> {} in tree {}: {:?} steps",
        person1,
        person2,
        tree_id,
        path.as_ref().map(HydratedPath::len)
    );

    Ok(Json(PathResponse { path }))
}
