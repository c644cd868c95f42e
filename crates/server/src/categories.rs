//! Categories API endpoints.

use api_types::category::{Category, CategoryDelete, CategoryNew};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::User;

use crate::{ServerError, ensure_owner, server::ServerState};

fn map_category(category: engine::Category) -> Category {
    Category {
        id: category.id,
        label: category.label,
        owner_id: category.owner_id,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Category>>, ServerError> {
    ensure_owner(&user, user_id)?;
    let categories = state
        .engine
        .list_categories(user_id)
        .await?
        .into_iter()
        .map(map_category)
        .collect();
    Ok(Json(categories))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<Category>), ServerError> {
    ensure_owner(&user, user_id)?;
    let category = state
        .engine
        .create_category(user_id, &payload.label)
        .await?;
    Ok((StatusCode::CREATED, Json(map_category(category))))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
    Query(query): Query<CategoryDelete>,
) -> Result<StatusCode, ServerError> {
    ensure_owner(&user, user_id)?;
    state
        .engine
        .delete_category(user_id, query.category_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
