//! Runs a `DemarcationSession` inside an actor, so that user actions keep
//! being processed while a save is waiting for the repository.

use std::{any::Any, error::Error, fmt, sync::Arc};

use actors::{
    actor::{Actor, ActorError, SupervisionStrategy},
    actor_ref::{ActorRef, WeakActorRef},
    handler::{Handler, Message},
};
use async_trait::async_trait;
use model::{
    location::GeoPoint,
    overlay::MapOverlay,
    paddock::{PaddockMetadata, PaddockRecord},
};
use utility::id::Id;

use crate::{
    location::LocationSampler,
    repository::{PaddockRepository, PersistenceError},
    session::{DemarcationSession, SaveHandle, SaveOutcome, SaveTicket, SessionSnapshot},
    settings::DemarcationSettings,
    DemarcationError, DemarcationResult,
};

pub struct SessionActor {
    session: DemarcationSession,
    repository: Arc<dyn PaddockRepository>,
    myself: WeakActorRef<SessionActor>,
}

impl SessionActor {
    fn spawn_save(&self, ticket: SaveTicket) {
        let SaveTicket { handle, record } = ticket;
        let repository = self.repository.clone();
        let myself = self.myself.clone();
        tokio::spawn(async move {
            let result = repository.create(record).await;
            match myself.upgrade() {
                Some(actor) => {
                    if let Err(why) = actor.tell(SaveFinished { handle, result }).await {
                        log::warn!("could not report save result: {}", why);
                    }
                }
                None => log::warn!("session service stopped before the save finished"),
            }
        });
    }
}

impl Actor for SessionActor {
    fn on_fail(&mut self, _error: Box<dyn Any + Send>) -> SupervisionStrategy {
        log::error!("demarcation session crashed, starting over");
        SupervisionStrategy::Restart
    }
}

/// Starts the session actor. The session starts out idle.
pub fn spawn_session(
    settings: DemarcationSettings,
    sampler: LocationSampler,
    repository: Arc<dyn PaddockRepository>,
) -> ActorRef<SessionActor> {
    actors::run(move |myself| SessionActor {
        session: DemarcationSession::new(settings.clone(), sampler.clone()),
        repository: repository.clone(),
        myself,
    })
}

pub struct Start;

impl Message for Start {
    type Response = DemarcationResult<SessionSnapshot>;
}

pub struct AddPoint;

impl Message for AddPoint {
    type Response = DemarcationResult<GeoPoint>;
}

pub struct Clear;

impl Message for Clear {
    type Response = DemarcationResult<SessionSnapshot>;
}

pub struct RequestSave(pub PaddockMetadata);

impl Message for RequestSave {
    type Response = DemarcationResult<SessionSnapshot>;
}

pub struct Cancel;

impl Message for Cancel {
    type Response = DemarcationResult<SessionSnapshot>;
}

pub struct GetSnapshot;

impl Message for GetSnapshot {
    type Response = SessionSnapshot;
}

pub struct GetOverlay;

impl Message for GetOverlay {
    type Response = MapOverlay;
}

/// Sent by the spawned save task once the repository answered.
pub struct SaveFinished {
    handle: SaveHandle,
    result: Result<Id<PaddockRecord>, PersistenceError>,
}

impl Message for SaveFinished {
    type Response = SaveOutcome;
}

#[async_trait]
impl Handler<Start> for SessionActor {
    async fn handle(&mut self, _: Start) -> DemarcationResult<SessionSnapshot> {
        self.session.start()?;
        Ok(self.session.snapshot())
    }
}

#[async_trait]
impl Handler<AddPoint> for SessionActor {
    async fn handle(&mut self, _: AddPoint) -> DemarcationResult<GeoPoint> {
        self.session.add_point_from_sampler()
    }
}

#[async_trait]
impl Handler<Clear> for SessionActor {
    async fn handle(&mut self, _: Clear) -> DemarcationResult<SessionSnapshot> {
        self.session.clear()?;
        Ok(self.session.snapshot())
    }
}

#[async_trait]
impl Handler<RequestSave> for SessionActor {
    async fn handle(&mut self, message: RequestSave) -> DemarcationResult<SessionSnapshot> {
        let ticket = self.session.begin_save(message.0)?;
        self.spawn_save(ticket);
        Ok(self.session.snapshot())
    }
}

#[async_trait]
impl Handler<Cancel> for SessionActor {
    async fn handle(&mut self, _: Cancel) -> DemarcationResult<SessionSnapshot> {
        self.session.cancel()?;
        Ok(self.session.snapshot())
    }
}

#[async_trait]
impl Handler<GetSnapshot> for SessionActor {
    async fn handle(&mut self, _: GetSnapshot) -> SessionSnapshot {
        self.session.snapshot()
    }
}

#[async_trait]
impl Handler<GetOverlay> for SessionActor {
    async fn handle(&mut self, _: GetOverlay) -> MapOverlay {
        self.session.overlay()
    }
}

#[async_trait]
impl Handler<SaveFinished> for SessionActor {
    async fn handle(&mut self, message: SaveFinished) -> SaveOutcome {
        self.session.complete_save(message.handle, message.result)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    Demarcation(DemarcationError),
    Actor(ActorError),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Demarcation(why) => write!(f, "{}", why),
            Self::Actor(why) => write!(f, "session service unavailable: {}", why),
        }
    }
}

impl Error for ServiceError {}

impl From<DemarcationError> for ServiceError {
    fn from(value: DemarcationError) -> Self {
        Self::Demarcation(value)
    }
}

impl From<ActorError> for ServiceError {
    fn from(value: ActorError) -> Self {
        Self::Actor(value)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Typed access to a running session actor.
#[async_trait]
pub trait DemarcationRef {
    async fn start(&self) -> ServiceResult<SessionSnapshot>;
    async fn add_point(&self) -> ServiceResult<GeoPoint>;
    async fn clear(&self) -> ServiceResult<SessionSnapshot>;
    /// Returns as soon as the save was started, the session is `Saving`
    /// then. The outcome shows up in later snapshots.
    async fn request_save(&self, metadata: PaddockMetadata) -> ServiceResult<SessionSnapshot>;
    async fn cancel(&self) -> ServiceResult<SessionSnapshot>;
    async fn snapshot(&self) -> ServiceResult<SessionSnapshot>;
    async fn overlay(&self) -> ServiceResult<MapOverlay>;
}

#[async_trait]
impl DemarcationRef for ActorRef<SessionActor> {
    async fn start(&self) -> ServiceResult<SessionSnapshot> {
        Ok(self.ask(Start).await??)
    }

    async fn add_point(&self) -> ServiceResult<GeoPoint> {
        Ok(self.ask(AddPoint).await??)
    }

    async fn clear(&self) -> ServiceResult<SessionSnapshot> {
        Ok(self.ask(Clear).await??)
    }

    async fn request_save(&self, metadata: PaddockMetadata) -> ServiceResult<SessionSnapshot> {
        Ok(self.ask(RequestSave(metadata)).await??)
    }

    async fn cancel(&self) -> ServiceResult<SessionSnapshot> {
        Ok(self.ask(Cancel).await??)
    }

    async fn snapshot(&self) -> ServiceResult<SessionSnapshot> {
        Ok(self.ask(GetSnapshot).await?)
    }

    async fn overlay(&self) -> ServiceResult<MapOverlay> {
        Ok(self.ask(GetOverlay).await?)
    }
}
