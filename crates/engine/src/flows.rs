//! Flow entries: dated, point-in-time inflows and outflows.
//!
//! Both kinds share the `flows` table and are told apart by `kind`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    Inflow,
    Outflow,
}

impl FlowKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inflow => "inflow",
            Self::Outflow => "outflow",
        }
    }

    /// Description used when the caller leaves it blank.
    pub(crate) fn default_description(self) -> &'static str {
        match self {
            Self::Inflow => "Прочие доходы",
            Self::Outflow => "Прочие расходы",
        }
    }

    /// Description used for recurring flows left blank.
    pub(crate) fn default_recurring_description(self) -> &'static str {
        match self {
            Self::Inflow => "Ежемесячные доходы",
            Self::Outflow => "Ежемесячные расходы",
        }
    }
}

impl TryFrom<&str> for FlowKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "inflow" => Ok(Self::Inflow),
            "outflow" => Ok(Self::Outflow),
            other => Err(EngineError::InvalidData(format!("invalid flow kind: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowEntry {
    pub id: i64,
    pub kind: FlowKind,
    pub date: DateTime<Utc>,
    pub description: String,
    pub amount: i64,
    pub owner_id: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "flows")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub kind: String,
    pub date: DateTimeUtc,
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
    pub(crate) fn new_entry(
        kind: FlowKind,
        date: DateTime<Utc>,
        description: String,
        amount: i64,
        owner_id: i64,
    ) -> Self {
        Self {
            id: ActiveValue::NotSet,
            kind: ActiveValue::Set(kind.as_str().to_string()),
            date: ActiveValue::Set(date),
            description: ActiveValue::Set(description),
            amount: ActiveValue::Set(amount),
            owner_id: ActiveValue::Set(owner_id),
        }
    }
}

impl TryFrom<Model> for FlowEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            kind: FlowKind::try_from(model.kind.as_str())?,
            date: model.date,
            description: model.description,
            amount: model.amount,
            owner_id: model.owner_id,
        })
    }
}
