use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, FlowKind, RecurringFlow, ResultEngine, recurring_flows,
    util::{description_or, normalize_optional_text},
};

use super::{Engine, with_tx};

impl Engine {
    pub async fn create_recurring(
        &self,
        kind: FlowKind,
        owner_id: i64,
        description: Option<&str>,
        amount: i64,
    ) -> ResultEngine<RecurringFlow> {
        let description = description_or(description, kind.default_recurring_description());
        let model = recurring_flows::ActiveModel::new_recurring(kind, description, amount, owner_id)
            .insert(&self.database)
            .await?;
        RecurringFlow::try_from(model)
    }

    pub async fn list_recurring(
        &self,
        kind: FlowKind,
        owner_id: i64,
    ) -> ResultEngine<Vec<RecurringFlow>> {
        recurring_flows::Entity::find()
            .filter(recurring_flows::Column::OwnerId.eq(owner_id))
            .filter(recurring_flows::Column::Kind.eq(kind.as_str()))
            .order_by_asc(recurring_flows::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(RecurringFlow::try_from)
            .collect()
    }

    /// Change the description and/or the amount of a recurring flow.
    pub async fn update_recurring(
        &self,
        kind: FlowKind,
        owner_id: i64,
        recurring_id: i64,
        description: Option<&str>,
        amount: Option<i64>,
    ) -> ResultEngine<RecurringFlow> {
        with_tx!(self, |db_tx| {
            let model = recurring_flows::Entity::find_by_id(recurring_id)
                .filter(recurring_flows::Column::OwnerId.eq(owner_id))
                .filter(recurring_flows::Column::Kind.eq(kind.as_str()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound(format!("recurring {} not exists", kind.as_str()))
                })?;

            let description = normalize_optional_text(description);
            if description.is_none() && amount.is_none() {
                return RecurringFlow::try_from(model);
            }

            let mut active: recurring_flows::ActiveModel = model.into();
            if let Some(description) = description {
                active.description = ActiveValue::Set(description);
            }
            if let Some(amount) = amount {
                active.amount = ActiveValue::Set(amount);
            }
            let model = active.update(&db_tx).await?;
            RecurringFlow::try_from(model)
        })
    }

    pub async fn delete_recurring(
        &self,
        kind: FlowKind,
        owner_id: i64,
        recurring_id: i64,
    ) -> ResultEngine<()> {
        let result = recurring_flows::Entity::delete_many()
            .filter(recurring_flows::Column::Id.eq(recurring_id))
            .filter(recurring_flows::Column::OwnerId.eq(owner_id))
            .filter(recurring_flows::Column::Kind.eq(kind.as_str()))
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(format!(
                "recurring {} not exists",
                kind.as_str()
            )));
        }
        Ok(())
    }
}
