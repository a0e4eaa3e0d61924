//! The device position as reported by the location provider. A provider
//! pushes updates with `PUT`, the session samples the latest one.

use std::sync::Arc;

use axum::{
    extract::{OriginalUri, State},
    http::{Method, StatusCode},
    routing::{get, on},
    Extension, Json, Router,
};
use demarcation::location::LocationFeed;
use model::location::LocationState;

use crate::{
    common::{route_not_found, schema, HateoasResult, RouteErrorResponse, METHOD_FILTER_ALL},
    hateoas,
    middleware::base_url::BaseUrl,
    WebState,
};

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::v1::resource!("/location{}", format_args!($($arg)*))
    };
}

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/schema", get(schema::<LocationState>))
        .route("/", get(get_location).put(put_location))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

async fn get_location(
    State(feed): State<Arc<LocationFeed>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<LocationState> {
    Ok(location_hateoas(feed.sampler().snapshot(), base_url).json())
}

async fn put_location(
    OriginalUri(original_uri): OriginalUri,
    State(feed): State<Arc<LocationFeed>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    Json(mut location): Json<LocationState>,
) -> HateoasResult<LocationState> {
    location.fix = location
        .fix
        .map(|fix| fix.validate())
        .transpose()
        .map_err(|why| {
            RouteErrorResponse::new(StatusCode::BAD_REQUEST)
                .with_message("The reported fix is not a valid coordinate.")
                .with_detailed_information(why.to_string())
                .with_method(&Method::PUT)
                .with_uri(original_uri.path())
        })?;

    log::debug!("location update: {:?}", location);
    feed.publish(location);

    Ok(location_hateoas(feed.sampler().snapshot(), base_url).json())
}

fn location_hateoas(
    location: LocationState,
    base_url: Arc<BaseUrl>,
) -> hateoas::Response<LocationState> {
    hateoas::Response::builder(location, base_url)
        .link("self", resource!(""))
        .link("schema", resource!("/schema"))
        .build()
}
