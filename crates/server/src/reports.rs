//! Report, workbook export and description suggestions.

use api_types::{
    RangeQuery,
    report::{MonthSum, MostPopular, RecurringMatch, Report},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use chrono::Utc;
use engine::{Export, FlowEntry, User};

use crate::{ServerError, ensure_owner, flows::resolve_range, server::ServerState};

const XLSX_MEDIA_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

fn map_month(month: engine::MonthSum) -> MonthSum {
    MonthSum {
        label: month.label,
        sum: month.sum,
    }
}

fn map_match(entry: FlowEntry) -> RecurringMatch {
    RecurringMatch {
        date: entry.date.fixed_offset(),
        description: entry.description,
        sum: entry.amount,
    }
}

pub async fn report(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Report>, ServerError> {
    ensure_owner(&user, user_id)?;
    let report = state.engine.report(user_id, Utc::now()).await?;
    Ok(Json(Report {
        assets: report.assets.into_iter().map(map_month).collect(),
        liabilities: report.liabilities.into_iter().map(map_month).collect(),
        recurring_inflows: report.recurring_inflows.into_iter().map(map_match).collect(),
        recurring_outflows: report
            .recurring_outflows
            .into_iter()
            .map(map_match)
            .collect(),
    }))
}

pub async fn export(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, ServerError> {
    ensure_owner(&user, user_id)?;
    let export = state.engine.export(user_id, Utc::now()).await?;
    let disposition = format!("attachment; filename=\"{}\"", Export::file_name(user_id));
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_MEDIA_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.bytes,
    ))
}

pub async fn most_popular(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<MostPopular>, ServerError> {
    ensure_owner(&user, user_id)?;
    let (from, to) = resolve_range(&query);
    let popular = state.engine.most_popular(user_id, from, to).await?;
    Ok(Json(MostPopular {
        inflow: popular.inflow,
        outflow: popular.outflow,
    }))
}
