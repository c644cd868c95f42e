use sea_orm::{
    ActiveValue, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};

use crate::{
    Category, EngineError, ResultEngine, categories, positions, util::normalize_required_name,
};

use super::{Engine, with_tx};

impl Engine {
    /// Create a category; labels are unique per owner.
    pub async fn create_category(&self, owner_id: i64, label: &str) -> ResultEngine<Category> {
        let label = normalize_required_name(label, "category")?;
        with_tx!(self, |db_tx| {
            let existing = categories::Entity::find()
                .filter(categories::Column::OwnerId.eq(owner_id))
                .filter(categories::Column::Label.eq(label.clone()))
                .count(&db_tx)
                .await?;
            if existing > 0 {
                return Err(EngineError::ExistingKey(label));
            }

            let model = categories::ActiveModel {
                id: ActiveValue::NotSet,
                label: ActiveValue::Set(label),
                owner_id: ActiveValue::Set(owner_id),
            }
            .insert(&db_tx)
            .await?;
            Ok(Category::from(model))
        })
    }

    /// Categories of an owner in creation order.
    pub async fn list_categories(&self, owner_id: i64) -> ResultEngine<Vec<Category>> {
        Ok(categories::Entity::find()
            .filter(categories::Column::OwnerId.eq(owner_id))
            .order_by_asc(categories::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Category::from)
            .collect())
    }

    /// Delete a category that no asset or liability refers to.
    pub async fn delete_category(&self, owner_id: i64, category_id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let category = require_category(&db_tx, owner_id, category_id).await?;

            let references = positions::Entity::find()
                .filter(positions::Column::OwnerId.eq(owner_id))
                .filter(positions::Column::CategoryId.eq(category_id))
                .count(&db_tx)
                .await?;
            if references > 0 {
                return Err(EngineError::CategoryInUse(category.label));
            }

            categories::Entity::delete_by_id(category.id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}

/// Load a category owned by `owner_id`.
pub(super) async fn require_category<C: ConnectionTrait>(
    db: &C,
    owner_id: i64,
    category_id: i64,
) -> ResultEngine<categories::Model> {
    categories::Entity::find_by_id(category_id)
        .filter(categories::Column::OwnerId.eq(owner_id))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))
}
