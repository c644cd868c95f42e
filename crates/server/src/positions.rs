//! Asset and liability endpoints.
//!
//! `PUT` revalues a position (closing the current interval) and `DELETE`
//! closes it without a replacement.

use api_types::{
    IdQuery,
    position::{Position, PositionNew, PositionQuery, PositionUpdate},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{PositionEntry, PositionKind, User};

use crate::{ServerError, ensure_owner, server::ServerState};

fn map_position(position: PositionEntry) -> Position {
    Position {
        id: position.id,
        date_in: position.date_in.fixed_offset(),
        date_out: position.date_out.fixed_offset(),
        description: position.description,
        sum: position.amount,
        category_id: position.category_id,
        owner_id: position.owner_id,
    }
}

async fn list(
    kind: PositionKind,
    user: User,
    state: ServerState,
    user_id: i64,
    query: PositionQuery,
) -> Result<Json<Vec<Position>>, ServerError> {
    ensure_owner(&user, user_id)?;
    let at = query
        .date
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);
    let positions = state
        .engine
        .positions_at(kind, user_id, at)
        .await?
        .into_iter()
        .map(map_position)
        .collect();
    Ok(Json(positions))
}

async fn create(
    kind: PositionKind,
    user: User,
    state: ServerState,
    user_id: i64,
    payload: PositionNew,
) -> Result<(StatusCode, Json<Position>), ServerError> {
    ensure_owner(&user, user_id)?;
    let date = payload
        .date
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);
    let position = state
        .engine
        .create_position(
            kind,
            user_id,
            date,
            &payload.description,
            payload.sum,
            payload.category_id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(map_position(position))))
}

async fn revalue(
    kind: PositionKind,
    user: User,
    state: ServerState,
    user_id: i64,
    payload: PositionUpdate,
) -> Result<Json<Option<Position>>, ServerError> {
    ensure_owner(&user, user_id)?;
    let position = state
        .engine
        .revalue_position(
            kind,
            user_id,
            payload.id,
            payload.sum,
            payload.description.as_deref(),
            payload.category_id,
            Utc::now(),
        )
        .await?;
    Ok(Json(position.map(map_position)))
}

async fn close(
    kind: PositionKind,
    user: User,
    state: ServerState,
    user_id: i64,
    query: IdQuery,
) -> Result<StatusCode, ServerError> {
    ensure_owner(&user, user_id)?;
    state
        .engine
        .close_position(kind, user_id, query.id, Utc::now())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_assets(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
    Query(query): Query<PositionQuery>,
) -> Result<Json<Vec<Position>>, ServerError> {
    list(PositionKind::Asset, user, state, user_id, query).await
}

pub async fn create_asset(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<PositionNew>,
) -> Result<(StatusCode, Json<Position>), ServerError> {
    create(PositionKind::Asset, user, state, user_id, payload).await
}

pub async fn revalue_asset(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<PositionUpdate>,
) -> Result<Json<Option<Position>>, ServerError> {
    revalue(PositionKind::Asset, user, state, user_id, payload).await
}

pub async fn close_asset(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
    Query(query): Query<IdQuery>,
) -> Result<StatusCode, ServerError> {
    close(PositionKind::Asset, user, state, user_id, query).await
}

pub async fn list_liabilities(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
    Query(query): Query<PositionQuery>,
) -> Result<Json<Vec<Position>>, ServerError> {
    list(PositionKind::Liability, user, state, user_id, query).await
}

pub async fn create_liability(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<PositionNew>,
) -> Result<(StatusCode, Json<Position>), ServerError> {
    create(PositionKind::Liability, user, state, user_id, payload).await
}

pub async fn revalue_liability(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<PositionUpdate>,
) -> Result<Json<Option<Position>>, ServerError> {
    revalue(PositionKind::Liability, user, state, user_id, payload).await
}

pub async fn close_liability(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
    Query(query): Query<IdQuery>,
) -> Result<StatusCode, ServerError> {
    close(PositionKind::Liability, user, state, user_id, query).await
}
