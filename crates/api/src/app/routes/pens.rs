use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;

use penstack_auth::{AuthzError, authorize_mutation};
use penstack_core::{NewPen, Pen, PenId, PenPatch, User, UserId};
use penstack_infra::BatchDelete;

use crate::app::dto::{ApiJson, BatchDeleteRequest, CreatePenRequest, PenWithAuthor};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz::{authorize_pen_mutation, authorize_pen_read};
use crate::context::AuthContext;

pub fn public_router() -> Router {
    Router::new().route("/public", get(list_public))
}

pub fn protected_router() -> Router {
    Router::new()
        .route("/", post(create_pen))
        .route("/batch-delete", post(batch_delete))
        .route("/user/:user_id", get(list_for_user))
        .route("/:id", get(get_pen).patch(update_pen).delete(delete_pen))
}

fn parse_pen_id(id: &str) -> Result<PenId, ApiError> {
    id.parse().map_err(|_| ApiError::bad_request("invalid pen id"))
}

async fn load_pen(services: &AppServices, id: PenId) -> Result<Pen, ApiError> {
    services
        .pens
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("pen not found"))
}

/// All public pens, newest first, each with its author's `{id, username}`.
pub async fn list_public(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<impl IntoResponse, ApiError> {
    let pens = services.pens.list_public().await?;

    let mut authors: HashMap<UserId, Option<User>> = HashMap::new();
    for owner in pens.iter().map(Pen::owner_id) {
        if !authors.contains_key(&owner) {
            let author = services.users.find_by_id(owner).await?;
            authors.insert(owner, author);
        }
    }

    let items = pens
        .iter()
        .map(|p| {
            let author = authors.get(&p.owner_id()).and_then(Option::as_ref);
            PenWithAuthor::new(p, author)
        })
        .collect::<Vec<_>>();

    // The views borrow `pens`, so render before they go out of scope.
    Ok(Json(items).into_response())
}

/// A user's pens, newest first. Callers other than the owner only see public ones.
pub async fn list_for_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<AuthContext>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let owner: UserId = user_id
        .parse()
        .map_err(|_| ApiError::bad_request("invalid user id"))?;

    let items = services
        .pens
        .list_by_owner(owner)
        .await?
        .into_iter()
        .filter(|p| authorize_pen_read(&caller, p).is_ok())
        .collect::<Vec<_>>();

    Ok(Json(items))
}

pub async fn create_pen(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<AuthContext>,
    ApiJson(body): ApiJson<CreatePenRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let new_pen = NewPen::new(
        body.title,
        body.description,
        body.html,
        body.css,
        body.js,
        body.is_public,
    )?;

    let pen = services.pens.insert(new_pen, caller.user_id(), Utc::now()).await?;

    tracing::info!(pen_id = %pen.id, owner = %caller.user_id(), public = pen.is_public, "pen created");

    Ok((StatusCode::CREATED, Json(pen)))
}

pub async fn get_pen(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let pen = load_pen(&services, parse_pen_id(&id)?).await?;
    authorize_pen_read(&caller, &pen)?;
    Ok(Json(pen))
}

pub async fn update_pen(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<AuthContext>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<PenPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_pen_id(&id)?;
    let pen = load_pen(&services, id).await?;
    authorize_pen_mutation(&caller, &pen)?;

    let updated = services
        .pens
        .update(id, patch, Utc::now())
        .await?
        .ok_or_else(|| ApiError::not_found("pen not found"))?;

    tracing::info!(pen_id = %id, owner = %caller.user_id(), "pen updated");

    Ok(Json(updated))
}

pub async fn delete_pen(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_pen_id(&id)?;
    let pen = load_pen(&services, id).await?;
    authorize_pen_mutation(&caller, &pen)?;

    let deleted = services
        .pens
        .delete(id)
        .await?
        .ok_or_else(|| ApiError::not_found("pen not found"))?;

    tracing::info!(pen_id = %deleted.id, owner = %caller.user_id(), "pen deleted");

    Ok(Json(json!({
        "message": "pen deleted",
        "id": deleted.id.to_string(),
    })))
}

/// Delete several pens at once. All ids must exist (`404`) and belong to the
/// caller (`403`), otherwise nothing is deleted.
pub async fn batch_delete(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<AuthContext>,
    ApiJson(body): ApiJson<BatchDeleteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let raw_ids = body
        .ids
        .filter(|ids| !ids.is_empty())
        .ok_or_else(|| ApiError::bad_request("ids must be a non-empty list"))?;

    let ids = raw_ids
        .iter()
        .map(|id| parse_pen_id(id))
        .collect::<Result<BTreeSet<_>, _>>()?
        .into_iter()
        .collect::<Vec<_>>();

    // Existence, ownership and removal are decided under one store write.
    let actor = caller.user_id();
    let owned_by_caller = move |pen: &Pen| authorize_mutation(actor, pen.owner_id()).is_allowed();

    let deleted = match services.pens.delete_all_or_none(&ids, &owned_by_caller).await? {
        BatchDelete::Deleted(pens) => pens,
        BatchDelete::Missing(id) => {
            tracing::debug!(pen_id = %id, "batch delete refused: pen not found");
            return Err(ApiError::not_found("pen not found"));
        }
        BatchDelete::Refused(pen) => {
            tracing::info!(pen_id = %pen.id, caller = %actor, "batch delete forbidden");
            return Err(AuthzError::NotOwner.into());
        }
    };

    tracing::info!(count = deleted.len(), owner = %caller.user_id(), "pens deleted");

    Ok(Json(json!({
        "message": "pens deleted",
        "deleted": deleted.iter().map(|p| p.id.to_string()).collect::<Vec<_>>(),
    })))
}
