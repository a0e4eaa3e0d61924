use std::sync::Arc;

use actors::actor_ref::ActorRef;
use axum::{
    extract::{OriginalUri, State},
    http::Method,
    routing::{get, on, post},
    Extension, Json, Router,
};
use demarcation::{
    service::{DemarcationRef, SessionActor},
    session::{SessionPhase, SessionSnapshot},
};
use model::{location::GeoPoint, overlay::MapOverlay, paddock::PaddockMetadata};

use crate::{
    common::{route_not_found, HateoasResult, RouteErrorResponse, METHOD_FILTER_ALL},
    hateoas,
    middleware::base_url::BaseUrl,
    WebState,
};

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::v1::resource!("/session{}", format_args!($($arg)*))
    };
}

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/", get(get_session))
        .route("/overlay", get(get_overlay))
        .route("/start", post(start))
        .route("/points", post(add_point))
        .route("/clear", post(clear))
        .route("/save", post(save))
        .route("/cancel", post(cancel))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

async fn get_session(
    OriginalUri(original_uri): OriginalUri,
    State(session): State<ActorRef<SessionActor>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<SessionSnapshot> {
    session
        .snapshot()
        .await
        .map(|snapshot| session_hateoas(snapshot, base_url).json())
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

async fn get_overlay(
    OriginalUri(original_uri): OriginalUri,
    State(session): State<ActorRef<SessionActor>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<MapOverlay> {
    session
        .overlay()
        .await
        .map(|overlay| {
            hateoas::Response::builder(overlay, base_url)
                .link("self", resource!("/overlay"))
                .link("session", resource!(""))
                .build()
                .json()
        })
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

async fn start(
    OriginalUri(original_uri): OriginalUri,
    State(session): State<ActorRef<SessionActor>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<SessionSnapshot> {
    session
        .start()
        .await
        .map(|snapshot| session_hateoas(snapshot, base_url).json())
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::POST)
                .with_uri(original_uri.path())
        })
}

async fn add_point(
    OriginalUri(original_uri): OriginalUri,
    State(session): State<ActorRef<SessionActor>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<GeoPoint> {
    let point = session.add_point().await.map_err(|why| {
        RouteErrorResponse::from(why)
            .with_method(&Method::POST)
            .with_message("Could not capture a boundary point.")
            .with_uri(original_uri.path())
    })?;
    log::debug!("captured boundary point {:?}", point);

    Ok(hateoas::Response::builder(point, base_url)
        .link("session", resource!(""))
        .link("overlay", resource!("/overlay"))
        .link("points", resource!("/points"))
        .build()
        .json())
}

async fn clear(
    OriginalUri(original_uri): OriginalUri,
    State(session): State<ActorRef<SessionActor>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<SessionSnapshot> {
    session
        .clear()
        .await
        .map(|snapshot| session_hateoas(snapshot, base_url).json())
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::POST)
                .with_uri(original_uri.path())
        })
}

async fn save(
    OriginalUri(original_uri): OriginalUri,
    State(session): State<ActorRef<SessionActor>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    Json(metadata): Json<PaddockMetadata>,
) -> HateoasResult<SessionSnapshot> {
    session
        .request_save(metadata)
        .await
        .map(|snapshot| session_hateoas(snapshot, base_url).json())
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::POST)
                .with_uri(original_uri.path())
        })
}

async fn cancel(
    OriginalUri(original_uri): OriginalUri,
    State(session): State<ActorRef<SessionActor>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<SessionSnapshot> {
    session
        .cancel()
        .await
        .map(|snapshot| session_hateoas(snapshot, base_url).json())
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::POST)
                .with_uri(original_uri.path())
        })
}

/// Links only the actions the session accepts in its current phase.
pub(crate) fn session_hateoas(
    snapshot: SessionSnapshot,
    base_url: Arc<BaseUrl>,
) -> hateoas::Response<SessionSnapshot> {
    let phase = snapshot.phase;
    let collecting = matches!(phase, SessionPhase::Collecting | SessionPhase::ReadyToSave);
    let failed = phase == SessionPhase::SaveFailed;

    hateoas::Response::builder(snapshot, base_url)
        .link("self", resource!(""))
        .link("overlay", resource!("/overlay"))
        .link_if(
            matches!(
                phase,
                SessionPhase::Idle | SessionPhase::Saved | SessionPhase::SaveFailed
            ),
            "start",
            resource!("/start"),
        )
        .link_if(collecting, "points", resource!("/points"))
        .link_if(collecting || failed, "clear", resource!("/clear"))
        .link_if(
            phase == SessionPhase::ReadyToSave || failed,
            "save",
            resource!("/save"),
        )
        .link_if(
            collecting || failed || phase == SessionPhase::Saving,
            "cancel",
            resource!("/cancel"),
        )
        .build()
}
