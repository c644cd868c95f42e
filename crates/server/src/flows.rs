//! Inflow and outflow endpoints.

use api_types::{
    IdQuery, RangeQuery,
    flow::{Flow, FlowNew},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use engine::{FlowEntry, FlowKind, Month, User};

use crate::{ServerError, ensure_owner, server::ServerState};

fn map_flow(entry: FlowEntry) -> Flow {
    Flow {
        id: entry.id,
        date: entry.date.fixed_offset(),
        description: entry.description,
        sum: entry.amount,
        owner_id: entry.owner_id,
    }
}

/// Resolve a range query, defaulting each missing bound to the current month.
pub(crate) fn resolve_range(query: &RangeQuery) -> (DateTime<Utc>, DateTime<Utc>) {
    let month = Month::containing(Utc::now());
    let from = query
        .date_in
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|| month.begin());
    let to = query
        .date_out
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|| month.end());
    (from, to)
}

async fn list(
    kind: FlowKind,
    user: User,
    state: ServerState,
    user_id: i64,
    query: RangeQuery,
) -> Result<Json<Vec<Flow>>, ServerError> {
    ensure_owner(&user, user_id)?;
    let (from, to) = resolve_range(&query);
    let flows = state
        .engine
        .list_flows(kind, user_id, from, to)
        .await?
        .into_iter()
        .map(map_flow)
        .collect();
    Ok(Json(flows))
}

async fn create(
    kind: FlowKind,
    user: User,
    state: ServerState,
    user_id: i64,
    payload: FlowNew,
) -> Result<(StatusCode, Json<Flow>), ServerError> {
    ensure_owner(&user, user_id)?;
    let date = payload
        .date
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);
    let entry = state
        .engine
        .create_flow(kind, user_id, date, payload.description.as_deref(), payload.sum)
        .await?;
    Ok((StatusCode::CREATED, Json(map_flow(entry))))
}

async fn delete(
    kind: FlowKind,
    user: User,
    state: ServerState,
    user_id: i64,
    query: IdQuery,
) -> Result<StatusCode, ServerError> {
    ensure_owner(&user, user_id)?;
    state.engine.delete_flow(kind, user_id, query.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_inflow(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<Flow>>, ServerError> {
    list(FlowKind::Inflow, user, state, user_id, query).await
}

pub async fn create_inflow(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<FlowNew>,
) -> Result<(StatusCode, Json<Flow>), ServerError> {
    create(FlowKind::Inflow, user, state, user_id, payload).await
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
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<Flow>>, ServerError> {
    list(FlowKind::Outflow, user, state, user_id, query).await
}

pub async fn create_outflow(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<FlowNew>,
) -> Result<(StatusCode, Json<Flow>), ServerError> {
    create(FlowKind::Outflow, user, state, user_id, payload).await
}

pub async fn delete_outflow(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
    Query(query): Query<IdQuery>,
) -> Result<StatusCode, ServerError> {
    delete(FlowKind::Outflow, user, state, user_id, query).await
}
