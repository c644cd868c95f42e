use chrono::{DateTime, TimeDelta, Utc};
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, Month, PositionEntry, PositionKind, ResultEngine,
    positions::{self, open_date_out},
    util::{ensure_positive, normalize_optional_text, normalize_required_name, whole_seconds},
};

use super::{Engine, categories::require_category, with_tx};

impl Engine {
    /// Open a position. The interval starts at the first instant of the
    /// month containing `date`.
    pub async fn create_position(
        &self,
        kind: PositionKind,
        owner_id: i64,
        date: DateTime<Utc>,
        description: &str,
        amount: i64,
        category_id: Option<i64>,
    ) -> ResultEngine<PositionEntry> {
        let description = normalize_required_name(description, "description")?;
        ensure_positive(amount, "amount")?;

        with_tx!(self, |db_tx| {
            if let Some(category_id) = category_id {
                require_category(&db_tx, owner_id, category_id).await?;
            }
            let date_in = Month::containing(date).begin();
            let opening = positions::ActiveModel::open(
                kind,
                date_in,
                description.clone(),
                amount,
                category_id,
                owner_id,
            )?;
            ensure_lineage_free(
                &db_tx,
                kind,
                owner_id,
                &description,
                category_id,
                date_in,
                None,
            )
            .await?;
            let model = opening.insert(&db_tx).await?;
            PositionEntry::try_from(model)
        })
    }

    pub async fn position(
        &self,
        kind: PositionKind,
        owner_id: i64,
        position_id: i64,
    ) -> ResultEngine<PositionEntry> {
        let model = require_position(&self.database, kind, owner_id, position_id).await?;
        PositionEntry::try_from(model)
    }

    /// Positions of one kind whose interval contains `instant`.
    pub async fn positions_at(
        &self,
        kind: PositionKind,
        owner_id: i64,
        instant: DateTime<Utc>,
    ) -> ResultEngine<Vec<PositionEntry>> {
        positions::Entity::find()
            .filter(positions::Column::OwnerId.eq(owner_id))
            .filter(positions::Column::Kind.eq(kind.as_str()))
            .filter(positions::Column::DateIn.lte(instant))
            .filter(positions::Column::DateOut.gte(instant))
            .order_by_asc(positions::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(PositionEntry::try_from)
            .collect()
    }

    /// Every interval of an owner's positions of one kind, oldest first.
    pub async fn position_history(
        &self,
        kind: PositionKind,
        owner_id: i64,
    ) -> ResultEngine<Vec<PositionEntry>> {
        positions::Entity::find()
            .filter(positions::Column::OwnerId.eq(owner_id))
            .filter(positions::Column::Kind.eq(kind.as_str()))
            .order_by_asc(positions::Column::DateIn)
            .order_by_asc(positions::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(PositionEntry::try_from)
            .collect()
    }

    /// Revalue an open position.
    ///
    /// The current interval is closed at the end of the month preceding
    /// `now` (or at its own `date_in` when it was opened this month). A
    /// positive `amount` opens the next interval one second later, keeping
    /// description and category unless new ones are given; otherwise the
    /// lineage ends and `None` is returned.
    pub async fn revalue_position(
        &self,
        kind: PositionKind,
        owner_id: i64,
        position_id: i64,
        amount: i64,
        description: Option<&str>,
        category_id: Option<i64>,
        now: DateTime<Utc>,
    ) -> ResultEngine<Option<PositionEntry>> {
        let now = whole_seconds(now);
        with_tx!(self, |db_tx| {
            let current = require_position(&db_tx, kind, owner_id, position_id).await?;
            if current.date_out < now {
                return Err(EngineError::KeyNotFound(format!(
                    "open {} not exists",
                    kind.as_str()
                )));
            }

            let close_at = close_instant(current.date_in, now);
            let reopened = if amount > 0 {
                let category_id = category_id.or(current.category_id);
                if let Some(category_id) = category_id {
                    require_category(&db_tx, owner_id, category_id).await?;
                }
                let description = normalize_optional_text(description)
                    .unwrap_or_else(|| current.description.clone());
                Some((description, category_id))
            } else {
                None
            };

            let mut closing: positions::ActiveModel = current.into();
            closing.date_out = ActiveValue::Set(close_at);
            closing.update(&db_tx).await?;

            match reopened {
                Some((description, category_id)) => {
                    let date_in = close_at + TimeDelta::seconds(1);
                    let opening = positions::ActiveModel::open(
                        kind,
                        date_in,
                        description.clone(),
                        amount,
                        category_id,
                        owner_id,
                    )?;
                    ensure_lineage_free(
                        &db_tx,
                        kind,
                        owner_id,
                        &description,
                        category_id,
                        date_in,
                        Some(position_id),
                    )
                    .await?;
                    let model = opening.insert(&db_tx).await?;
                    tracing::debug!(
                        owner_id,
                        closed = position_id,
                        opened = model.id,
                        "revalued {}",
                        kind.as_str()
                    );
                    Ok(Some(PositionEntry::try_from(model)?))
                }
                None => Ok(None),
            }
        })
    }

    /// Close an open position without opening a replacement.
    pub async fn close_position(
        &self,
        kind: PositionKind,
        owner_id: i64,
        position_id: i64,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        self.revalue_position(kind, owner_id, position_id, 0, None, None, now)
            .await
            .map(|_| ())
    }
}

/// Where a revaluation at `now` closes an interval opened at `date_in`.
fn close_instant(date_in: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let previous_month_end = Month::containing(now).begin() - TimeDelta::seconds(1);
    previous_month_end.max(date_in)
}

/// A lineage (description and category) may hold one interval at any
/// instant. Fails with `ExistingKey` when an interval of the lineage other
/// than `except` overlaps a new open interval starting at `date_in`.
async fn ensure_lineage_free<C: ConnectionTrait>(
    db: &C,
    kind: PositionKind,
    owner_id: i64,
    description: &str,
    category_id: Option<i64>,
    date_in: DateTime<Utc>,
    except: Option<i64>,
) -> ResultEngine<()> {
    let date_out = open_date_out(date_in)?;
    let category = match category_id {
        Some(id) => positions::Column::CategoryId.eq(id),
        None => positions::Column::CategoryId.is_null(),
    };
    let mut query = positions::Entity::find()
        .filter(positions::Column::OwnerId.eq(owner_id))
        .filter(positions::Column::Kind.eq(kind.as_str()))
        .filter(positions::Column::Description.eq(description))
        .filter(category)
        .filter(positions::Column::DateIn.lte(date_out))
        .filter(positions::Column::DateOut.gte(date_in));
    if let Some(id) = except {
        query = query.filter(positions::Column::Id.ne(id));
    }

    if query.one(db).await?.is_some() {
        return Err(EngineError::ExistingKey(format!(
            "{} {description}",
            kind.as_str()
        )));
    }
    Ok(())
}

async fn require_position<C: ConnectionTrait>(
    db: &C,
    kind: PositionKind,
    owner_id: i64,
    position_id: i64,
) -> ResultEngine<positions::Model> {
    positions::Entity::find_by_id(position_id)
        .filter(positions::Column::OwnerId.eq(owner_id))
        .filter(positions::Column::Kind.eq(kind.as_str()))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("{} not exists", kind.as_str())))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn close_lands_on_previous_month_end() {
        let date_in = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        assert_eq!(
            close_instant(date_in, now),
            Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap()
        );
    }

    #[test]
    fn close_never_precedes_date_in() {
        let date_in = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        assert_eq!(close_instant(date_in, now), date_in);
    }
}
