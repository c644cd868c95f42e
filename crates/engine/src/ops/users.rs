use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use sea_orm::{ActiveValue, Condition, QueryFilter, TransactionTrait, prelude::*};

use crate::{
    EngineError, ResultEngine, User, users,
    util::normalize_required_name,
};

use super::{Engine, with_tx};

impl Engine {
    /// Register a new user; username and email must be unused.
    pub async fn register_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ResultEngine<User> {
        let username = normalize_required_name(username, "username")?;
        let email = normalize_required_name(email, "email")?;
        if password.is_empty() {
            return Err(EngineError::InvalidName(
                "password must not be empty".to_string(),
            ));
        }
        let password_hash = hash_password(password)?;

        with_tx!(self, |db_tx| {
            let existing = users::Entity::find()
                .filter(
                    Condition::any()
                        .add(users::Column::Username.eq(username.clone()))
                        .add(users::Column::Email.eq(email.clone())),
                )
                .one(&db_tx)
                .await?;
            if let Some(existing) = existing {
                let key = if existing.username == username {
                    username.clone()
                } else {
                    email.clone()
                };
                return Err(EngineError::ExistingKey(key));
            }

            let model = users::ActiveModel {
                id: ActiveValue::NotSet,
                username: ActiveValue::Set(username.clone()),
                email: ActiveValue::Set(email.clone()),
                password_hash: ActiveValue::Set(password_hash),
                is_active: ActiveValue::Set(true),
            }
            .insert(&db_tx)
            .await?;
            tracing::info!(user_id = model.id, "registered user");
            Ok(User::from(model))
        })
    }

    /// Check credentials. Returns `None` for unknown users, wrong passwords
    /// and inactive accounts alike.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<Option<User>> {
        let Some(model) = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.database)
            .await?
        else {
            return Ok(None);
        };

        if !model.is_active || !verify_password(password, &model.password_hash)? {
            return Ok(None);
        }
        Ok(Some(User::from(model)))
    }

    pub async fn user(&self, owner_id: i64) -> ResultEngine<User> {
        users::Entity::find_by_id(owner_id)
            .one(&self.database)
            .await?
            .map(User::from)
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }
}

fn hash_password(password: &str) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| EngineError::InvalidData(format!("failed to hash password: {err}")))
}

fn verify_password(password: &str, stored: &str) -> ResultEngine<bool> {
    let parsed = PasswordHash::new(stored)
        .map_err(|err| EngineError::InvalidData(format!("invalid password hash: {err}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
