//! Monthly aggregation behind the report endpoint.
//!
//! [`PositionWalk`] visits months backward from "now", sampling assets and
//! liabilities on the 15th. The walk ends at the first month where neither
//! kind has a row.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sea_orm::{QueryFilter, QueryOrder, prelude::*};
use serde::Serialize;

use crate::{
    FlowEntry, FlowKind, Month, MonthsBack, PositionEntry, PositionKind, ResultEngine, flows,
};

use super::{Engine, MAX_WALK_MONTHS};

/// Asset and liability snapshot of one month.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthTotals {
    pub month: Month,
    pub label: String,
    pub assets: Vec<PositionEntry>,
    pub liabilities: Vec<PositionEntry>,
    pub asset_total: i64,
    pub liability_total: i64,
}

impl MonthTotals {
    fn new(month: Month, assets: Vec<PositionEntry>, liabilities: Vec<PositionEntry>) -> Self {
        Self {
            month,
            label: month.label(),
            asset_total: assets.iter().map(|p| p.amount).sum(),
            liability_total: liabilities.iter().map(|p| p.amount).sum(),
            assets,
            liabilities,
        }
    }
}

/// Backward month cursor over an owner's positions.
///
/// Each call to [`PositionWalk::next_month`] queries the store for one
/// month. Once the walk has ended it keeps returning `None`; walking again
/// needs a new cursor.
pub struct PositionWalk<'a> {
    engine: &'a Engine,
    owner_id: i64,
    months: std::iter::Take<MonthsBack>,
    finished: bool,
}

impl PositionWalk<'_> {
    pub async fn next_month(&mut self) -> ResultEngine<Option<MonthTotals>> {
        if self.finished {
            return Ok(None);
        }
        let Some(month) = self.months.next() else {
            self.finished = true;
            return Ok(None);
        };

        let probe = month.probe();
        let assets = self
            .engine
            .positions_at(PositionKind::Asset, self.owner_id, probe)
            .await?;
        let liabilities = self
            .engine
            .positions_at(PositionKind::Liability, self.owner_id, probe)
            .await?;

        if assets.is_empty() && liabilities.is_empty() {
            tracing::debug!(owner_id = self.owner_id, month = %month.label(), "position walk ended");
            self.finished = true;
            return Ok(None);
        }

        let totals = MonthTotals::new(month, assets, liabilities);
        tracing::debug!(
            owner_id = self.owner_id,
            month = %totals.label,
            asset_total = totals.asset_total,
            liability_total = totals.liability_total,
            "walked month"
        );
        Ok(Some(totals))
    }

    /// Drain the walk, newest month first.
    pub async fn into_months(mut self) -> ResultEngine<Vec<MonthTotals>> {
        let mut months = Vec::new();
        while let Some(totals) = self.next_month().await? {
            months.push(totals);
        }
        Ok(months)
    }
}

/// One point of an asset or liability series.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MonthSum {
    pub label: String,
    pub sum: i64,
}

/// The report shaped for API consumers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub assets: Vec<MonthSum>,
    pub liabilities: Vec<MonthSum>,
    pub recurring_inflows: Vec<FlowEntry>,
    pub recurring_outflows: Vec<FlowEntry>,
}

impl Engine {
    /// Start a backward position walk at the month containing `now`.
    pub fn position_walk(&self, owner_id: i64, now: DateTime<Utc>) -> PositionWalk<'_> {
        PositionWalk {
            engine: self,
            owner_id,
            months: Month::containing(now).walk_back().take(MAX_WALK_MONTHS),
            finished: false,
        }
    }

    /// Flow entries whose description matches one of the owner's recurring
    /// flows of the same kind, ordered by date.
    pub async fn recurring_matches(
        &self,
        kind: FlowKind,
        owner_id: i64,
    ) -> ResultEngine<Vec<FlowEntry>> {
        let descriptions: HashSet<String> = self
            .list_recurring(kind, owner_id)
            .await?
            .into_iter()
            .map(|recurring| recurring.description)
            .collect();
        if descriptions.is_empty() {
            return Ok(Vec::new());
        }

        flows::Entity::find()
            .filter(flows::Column::OwnerId.eq(owner_id))
            .filter(flows::Column::Kind.eq(kind.as_str()))
            .filter(flows::Column::Description.is_in(descriptions))
            .order_by_asc(flows::Column::Date)
            .order_by_asc(flows::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(FlowEntry::try_from)
            .collect()
    }

    /// Asset and liability series for the most recent months plus the
    /// flows matching recurring flows.
    ///
    /// The two series are independent: a month shows up in a series only
    /// when that kind has rows in it. Both are in chronological order.
    pub async fn report(&self, owner_id: i64, now: DateTime<Utc>) -> ResultEngine<Report> {
        let mut walk = self.position_walk(owner_id, now);
        let mut months = Vec::new();
        while months.len() < self.report_months {
            match walk.next_month().await? {
                Some(totals) => months.push(totals),
                None => break,
            }
        }

        let (assets, liabilities) = month_series(&months);
        Ok(Report {
            assets,
            liabilities,
            recurring_inflows: self.recurring_matches(FlowKind::Inflow, owner_id).await?,
            recurring_outflows: self.recurring_matches(FlowKind::Outflow, owner_id).await?,
        })
    }
}

/// Split walked months (newest first) into chronological asset and
/// liability series, skipping months where a kind has no rows.
fn month_series(months: &[MonthTotals]) -> (Vec<MonthSum>, Vec<MonthSum>) {
    let assets = months
        .iter()
        .rev()
        .filter(|m| !m.assets.is_empty())
        .map(|m| MonthSum {
            label: m.label.clone(),
            sum: m.asset_total,
        })
        .collect();
    let liabilities = months
        .iter()
        .rev()
        .filter(|m| !m.liabilities.is_empty())
        .map(|m| MonthSum {
            label: m.label.clone(),
            sum: m.liability_total,
        })
        .collect();
    (assets, liabilities)
}
