use axum::{
    routing::{get, on},
    Router,
};
use model::paddock::PaddockRecord;

use crate::{
    common::{route_not_found, schema, METHOD_FILTER_ALL},
    WebState,
};

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/schema", get(schema::<PaddockRecord>))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}
