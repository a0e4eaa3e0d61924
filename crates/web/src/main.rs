use std::{env, process, sync::Arc};

use demarcation::{
    location::location_channel,
    repository::{InMemoryPaddockRepository, PaddockRepository},
    rest::{RestPaddockRepository, RestRepositoryInfo},
    service::spawn_session,
    settings::DemarcationSettings,
};
use web::{start_web_server, WebState, DEFAULT_BIND_ADDRESS};

#[tokio::main]
async fn main() {
    env_logger::init();

    // persistence
    let repository: Arc<dyn PaddockRepository> = match RestRepositoryInfo::from_env() {
        Some(info) => {
            log::info!("paddocks are saved to {}", info.base_url);
            Arc::new(RestPaddockRepository::new(info))
        }
        None => {
            log::warn!("PADDOCK_API_URL is not set, paddocks are only kept in memory");
            Arc::new(InMemoryPaddockRepository::new())
        }
    };

    // demarcation session
    let settings = DemarcationSettings::from_env();
    let (feed, sampler) = location_channel();
    let session = spawn_session(settings, sampler, repository);

    // web server
    let bind_address =
        env::var("WEB_BIND_ADDRESS").unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_owned());
    let state = WebState {
        session,
        location: Arc::new(feed),
    };
    if let Err(why) = start_web_server(state, &bind_address).await {
        log::error!("web server stopped: {}", why);
        process::exit(1);
    }
}
