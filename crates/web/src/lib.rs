pub use crate::common::RouteResult;

use std::sync::Arc;

use actors::actor_ref::ActorRef;
use axum::{extract::FromRef, Router};
use demarcation::{location::LocationFeed, service::SessionActor};
use tokio::net::TcpListener;

pub mod api;
pub mod common;
pub mod hateoas;
pub mod middleware;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

#[derive(Clone, FromRef)]
pub struct WebState {
    pub session: ActorRef<SessionActor>,
    pub location: Arc<LocationFeed>,
}

pub async fn start_web_server(state: WebState, bind_address: &str) -> std::io::Result<()> {
    let routes = Router::new().nest_service("/api", api::routes(state));

    let listener = TcpListener::bind(bind_address).await?;
    log::info!("listening on {}", bind_address);
    axum::serve(listener, routes.into_make_service()).await?;

    Ok(())
}
