use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::middleware::auth::authenticate;
use crate::state::AppState;

use super::controller::{
    create_operator, delete_operator, filter_operators, get_all_operators, get_operator,
    update_operator,
};

pub fn init_operators_router(state: AppState) -> Router<AppState> {
    // Reads are open to every authenticated profile (guests included);
    // write handlers carry their own profile/write-access guards.
    Router::new()
        .route("/", get(get_all_operators).post(create_operator))
        .route("/filter", post(filter_operators))
        .route(
            "/{id}",
            get(get_operator).put(update_operator).delete(delete_operator),
        )
        .route_layer(middleware::from_fn_with_state(state, authenticate))
}
