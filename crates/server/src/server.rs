use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::sync::Arc;

use crate::{categories, flows, positions, recurring, reports, user};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    /// Invite code `/register` requires, if any.
    pub invite: Option<String>,
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user = state
        .engine
        .authenticate(auth_header.username(), auth_header.password())
        .await
        .map_err(|err| {
            tracing::error!("authentication failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/user", get(user::me))
        .route(
            "/users/{user_id}/inflow",
            get(flows::list_inflow)
                .post(flows::create_inflow)
                .delete(flows::delete_inflow),
        )
        .route(
            "/users/{user_id}/outflow",
            get(flows::list_outflow)
                .post(flows::create_outflow)
                .delete(flows::delete_outflow),
        )
        .route(
            "/users/{user_id}/inflow_regular",
            get(recurring::list_inflow)
                .post(recurring::create_inflow)
                .put(recurring::update_inflow)
                .delete(recurring::delete_inflow),
        )
        .route(
            "/users/{user_id}/outflow_regular",
            get(recurring::list_outflow)
                .post(recurring::create_outflow)
                .put(recurring::update_outflow)
                .delete(recurring::delete_outflow),
        )
        .route(
            "/users/{user_id}/assets",
            get(positions::list_assets)
                .post(positions::create_asset)
                .put(positions::revalue_asset)
                .delete(positions::close_asset),
        )
        .route(
            "/users/{user_id}/liabilities",
            get(positions::list_liabilities)
                .post(positions::create_liability)
                .put(positions::revalue_liability)
                .delete(positions::close_liability),
        )
        .route(
            "/users/{user_id}/categories",
            get(categories::list)
                .post(categories::create)
                .delete(categories::delete),
        )
        .route("/users/{user_id}/reports", get(reports::report))
        .route("/users/{user_id}/export", get(reports::export))
        .route("/users/{user_id}/most_popular", get(reports::most_popular))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/register", post(user::register))
        .merge(protected)
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    invite: Option<String>,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        invite,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    invite: Option<String>,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, invite, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
