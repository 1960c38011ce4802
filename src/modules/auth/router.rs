use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::middleware::auth::authenticate;
use crate::state::AppState;

use super::controller::{
    change_password, get_current_operator, login, request_reset, reset_password,
    validate_reset_token, verify_token,
};

pub fn init_auth_router(state: AppState) -> Router<AppState> {
    // Login and the reset flow are reachable without a bearer token; the
    // reset endpoints are what a locked-out operator uses.
    let public = Router::new()
        .route("/login", post(login))
        .route("/request-reset", post(request_reset))
        .route("/validate-reset-token/{token}", get(validate_reset_token))
        .route("/reset-password", post(reset_password));

    let protected = Router::new()
        .route("/verify", get(verify_token))
        .route("/change-password", post(change_password))
        .route("/me", get(get_current_operator))
        .route_layer(middleware::from_fn_with_state(state, authenticate));

    public.merge(protected)
}
