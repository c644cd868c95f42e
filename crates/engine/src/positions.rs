//! Positions: assets and liabilities valid over a date interval.
//!
//! A position never changes its amount in place. Revaluing closes the
//! current interval and opens a new one, so the rows of one lineage form a
//! chain of contiguous intervals and "value at time T" is answered by
//! interval containment (`date_in <= T <= date_out`).

use chrono::{DateTime, Datelike, TimeDelta, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Length of the interval given to a freshly opened position.
pub const OPEN_INTERVAL_DAYS: i64 = 100_000;

const MAX_STORED_YEAR: i32 = 9999;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionKind {
    Asset,
    Liability,
}

impl PositionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
        }
    }
}

impl TryFrom<&str> for PositionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "asset" => Ok(Self::Asset),
            "liability" => Ok(Self::Liability),
            other => Err(EngineError::InvalidData(format!(
                "invalid position kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionEntry {
    pub id: i64,
    pub kind: PositionKind,
    pub date_in: DateTime<Utc>,
    pub date_out: DateTime<Utc>,
    pub description: String,
    pub amount: i64,
    pub category_id: Option<i64>,
    pub owner_id: i64,
}

impl PositionEntry {
    /// Whether the interval contains `instant` (both bounds inclusive).
    pub fn is_valid_at(&self, instant: DateTime<Utc>) -> bool {
        self.date_in <= instant && instant <= self.date_out
    }
}

/// `date_out` of a position opened at `date_in`.
///
/// Stored timestamps sort as text, so the open interval must end within
/// four-digit years.
pub(crate) fn open_date_out(date_in: DateTime<Utc>) -> ResultEngine<DateTime<Utc>> {
    date_in
        .checked_add_signed(TimeDelta::days(OPEN_INTERVAL_DAYS))
        .filter(|date_out| date_out.year() <= MAX_STORED_YEAR)
        .ok_or_else(|| {
            EngineError::InvalidAmount(format!("position date {date_in} is too far in the future"))
        })
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "positions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub kind: String,
    pub date_in: DateTimeUtc,
    pub date_out: DateTimeUtc,
    pub description: String,
    pub amount: i64,
    pub category_id: Option<i64>,
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
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Category,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn open(
        kind: PositionKind,
        date_in: DateTime<Utc>,
        description: String,
        amount: i64,
        category_id: Option<i64>,
        owner_id: i64,
    ) -> ResultEngine<Self> {
        Ok(Self {
            id: ActiveValue::NotSet,
            kind: ActiveValue::Set(kind.as_str().to_string()),
            date_in: ActiveValue::Set(date_in),
            date_out: ActiveValue::Set(open_date_out(date_in)?),
            description: ActiveValue::Set(description),
            amount: ActiveValue::Set(amount),
            category_id: ActiveValue::Set(category_id),
            owner_id: ActiveValue::Set(owner_id),
        })
    }
}

impl TryFrom<Model> for PositionEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            kind: PositionKind::try_from(model.kind.as_str())?,
            date_in: model.date_in,
            date_out: model.date_out,
            description: model.description,
            amount: model.amount,
            category_id: model.category_id,
            owner_id: model.owner_id,
        })
    }
}
