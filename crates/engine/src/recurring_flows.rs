//! Recurring flows: expected amounts matched against flow entries by
//! description.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, FlowKind};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringFlow {
    pub id: i64,
    pub kind: FlowKind,
    pub description: String,
    pub amount: i64,
    pub owner_id: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "recurring_flows")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub kind: String,
    pub description: String,
    pub amount: i64,
    pub owner_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Owner,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn new_recurring(
        kind: FlowKind,
        description: String,
        amount: i64,
        owner_id: i64,
    ) -> Self {
        Self {
            id: ActiveValue::NotSet,
            kind: ActiveValue::Set(kind.as_str().to_string()),
            description: ActiveValue::Set(description),
            amount: ActiveValue::Set(amount),
            owner_id: ActiveValue::Set(owner_id),
        }
    }
}

impl TryFrom<Model> for RecurringFlow {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            kind: FlowKind::try_from(model.kind.as_str())?,
            description: model.description,
            amount: model.amount,
            owner_id: model.owner_id,
        })
    }
}
