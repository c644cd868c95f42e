use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{QueryFilter, QueryOrder, prelude::*};
use serde::Serialize;

use crate::{
    EngineError, FlowEntry, FlowKind, ResultEngine, flows,
    util::{description_or, validate_range, whole_seconds},
};

use super::Engine;

/// How many suggestions `most_popular` returns per kind.
const MOST_POPULAR_LIMIT: usize = 10;

/// Most frequent flow descriptions in a range, most frequent first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MostPopular {
    pub inflow: Vec<String>,
    pub outflow: Vec<String>,
}

impl Engine {
    /// Record an inflow or an outflow.
    pub async fn create_flow(
        &self,
        kind: FlowKind,
        owner_id: i64,
        date: DateTime<Utc>,
        description: Option<&str>,
        amount: i64,
    ) -> ResultEngine<FlowEntry> {
        let description = description_or(description, kind.default_description());
        let model =
            flows::ActiveModel::new_entry(kind, whole_seconds(date), description, amount, owner_id)
                .insert(&self.database)
                .await?;
        FlowEntry::try_from(model)
    }

    /// Flows of one kind with `from <= date <= to`, ordered by date.
    pub async fn list_flows(
        &self,
        kind: FlowKind,
        owner_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ResultEngine<Vec<FlowEntry>> {
        validate_range(from, to)?;
        flows::Entity::find()
            .filter(flows::Column::OwnerId.eq(owner_id))
            .filter(flows::Column::Kind.eq(kind.as_str()))
            .filter(flows::Column::Date.gte(from))
            .filter(flows::Column::Date.lte(to))
            .order_by_asc(flows::Column::Date)
            .order_by_asc(flows::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(FlowEntry::try_from)
            .collect()
    }

    /// Hard delete a flow entry.
    pub async fn delete_flow(
        &self,
        kind: FlowKind,
        owner_id: i64,
        flow_id: i64,
    ) -> ResultEngine<()> {
        let result = flows::Entity::delete_many()
            .filter(flows::Column::Id.eq(flow_id))
            .filter(flows::Column::OwnerId.eq(owner_id))
            .filter(flows::Column::Kind.eq(kind.as_str()))
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(format!("{} not exists", kind.as_str())));
        }
        Ok(())
    }

    /// Descriptions used most often in `[from, to]`, for input suggestions.
    pub async fn most_popular(
        &self,
        owner_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ResultEngine<MostPopular> {
        let inflow = self.list_flows(FlowKind::Inflow, owner_id, from, to).await?;
        let outflow = self.list_flows(FlowKind::Outflow, owner_id, from, to).await?;
        Ok(MostPopular {
            inflow: rank_descriptions(&inflow),
            outflow: rank_descriptions(&outflow),
        })
    }
}

fn rank_descriptions(entries: &[FlowEntry]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for entry in entries {
        *counts.entry(entry.description.as_str()).or_default() += 1;
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(MOST_POPULAR_LIMIT)
        .map(|(description, _)| description.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(description: &str) -> FlowEntry {
        FlowEntry {
            id: 0,
            kind: FlowKind::Outflow,
            date: Utc::now(),
            description: description.to_string(),
            amount: 1,
            owner_id: 1,
        }
    }

    #[test]
    fn ranking_orders_by_frequency_then_name() {
        let entries = vec![
            entry("Coffee"),
            entry("Rent"),
            entry("Coffee"),
            entry("Bread"),
            entry("Rent"),
            entry("Coffee"),
        ];
        assert_eq!(rank_descriptions(&entries), vec!["Coffee", "Rent", "Bread"]);
    }

    #[test]
    fn ranking_is_capped() {
        let entries: Vec<FlowEntry> = (0..25).map(|i| entry(&format!("item {i:02}"))).collect();
        assert_eq!(rank_descriptions(&entries).len(), MOST_POPULAR_LIMIT);
    }
}
