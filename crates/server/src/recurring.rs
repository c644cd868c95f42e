//! Recurring (monthly) inflow and outflow endpoints.

use api_types::{
    IdQuery,
    recurring::{Recurring, RecurringNew, RecurringUpdate},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{FlowKind, RecurringFlow, User};

use crate::{ServerError, ensure_owner, server::ServerState};

fn map_recurring(recurring: RecurringFlow) -> Recurring {
    Recurring {
        id: recurring.id,
        description: recurring.description,
        sum: recurring.amount,
        owner_id: recurring.owner_id,
    }
}

async fn list(
    kind: FlowKind,
    user: User,
    state: ServerState,
    user_id: i64,
) -> Result<Json<Vec<Recurring>>, ServerError> {
    ensure_owner(&user, user_id)?;
    let recurring = state
        .engine
        .list_recurring(kind, user_id)
        .await?
        .into_iter()
        .map(map_recurring)
        .collect();
    Ok(Json(recurring))
}

async fn create(
    kind: FlowKind,
    user: User,
    state: ServerState,
    user_id: i64,
    payload: RecurringNew,
) -> Result<(StatusCode, Json<Recurring>), ServerError> {
    ensure_owner(&user, user_id)?;
    let recurring = state
        .engine
        .create_recurring(kind, user_id, payload.description.as_deref(), payload.sum)
        .await?;
    Ok((StatusCode::CREATED, Json(map_recurring(recurring))))
}

async fn update(
    kind: FlowKind,
    user: User,
    state: ServerState,
    user_id: i64,
    payload: RecurringUpdate,
) -> Result<Json<Recurring>, ServerError> {
    ensure_owner(&user, user_id)?;
    if payload.description.is_none() && payload.sum.is_none() {
        return Err(ServerError::Generic(
            "provide at least one of description or sum".to_string(),
        ));
    }
    let recurring = state
        .engine
        .update_recurring(
            kind,
            user_id,
            payload.id,
            payload.description.as_deref(),
            payload.sum,
        )
        .await?;
    Ok(Json(map_recurring(recurring)))
}

async fn delete(
    kind: FlowKind,
    user: User,
    state: ServerState,
    user_id: i64,
    query: IdQuery,
) -> Result<StatusCode, ServerError> {
    ensure_owner(&user, user_id)?;
    state.engine.delete_recurring(kind, user_id, query.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_inflow(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Recurring>>, ServerError> {
    list(FlowKind::Inflow, user, state, user_id).await
}

pub async fn create_inflow(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<RecurringNew>,
) -> Result<(StatusCode, Json<Recurring>), ServerError> {
    create(FlowKind::Inflow, user, state, user_id, payload).await
}

pub async fn update_inflow(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<RecurringUpdate>,
) -> Result<Json<Recurring>, ServerError> {
    update(FlowKind::Inflow, user, state, user_id, payload).await
}

pub async fn delete_inflow(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
    Query(query): Query<IdQuery>,
) -> Result<StatusCode, ServerError> {
    delete(FlowKind::Inflow, user, state, user_id, query).await
}

pub async fn list_outflow(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Recurring>>, ServerError> {
    list(FlowKind::Outflow, user, state, user_id).await
}

pub async fn create_outflow(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<RecurringNew>,
) -> Result<(StatusCode, Json<Recurring>), ServerError> {
    create(FlowKind::Outflow, user, state, user_id, payload).await
}

pub async fn update_outflow(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<RecurringUpdate>,
) -> Result<Json<Recurring>, ServerError> {
    update(FlowKind::Outflow, user, state, user_id, payload).await
}

pub async fn delete_outflow(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
    Query(query): Query<IdQuery>,
) -> Result<StatusCode, ServerError> {
    delete(FlowKind::Outflow, user, state, user_id, query).await
}
