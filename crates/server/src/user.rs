//! Registration and the authenticated user.

use api_types::user::{User as UserView, UserNew};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::User;

use crate::{ServerError, server::ServerState};

fn map_user(user: User) -> UserView {
    UserView {
        id: user.id,
        username: user.username,
        email: user.email,
    }
}

pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    if let Some(invite) = &state.invite
        && payload.invite.as_deref() != Some(invite.as_str())
    {
        return Err(ServerError::Forbidden("invalid invite".to_string()));
    }

    let user = state
        .engine
        .register_user(&payload.username, &payload.email, &payload.password)
        .await?;
    Ok((StatusCode::CREATED, Json(map_user(user))))
}

pub async fn me(Extension(user): Extension<User>) -> Json<UserView> {
    Json(map_user(user))
}
