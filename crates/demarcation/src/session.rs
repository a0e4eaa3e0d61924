use model::{
    location::GeoPoint,
    overlay::MapOverlay,
    paddock::{Group, PaddockMetadata, PaddockRecord},
};
use schemars::JsonSchema;
use serde::Serialize;
use utility::id::Id;

use crate::{
    area, encoder,
    location::LocationSampler,
    polygon::PolygonBuilder,
    repository::{PaddockRepository, PersistenceError},
    settings::DemarcationSettings,
    validation::{self, ValidationIssue, MIN_VERTICES},
    DemarcationError, DemarcationResult, Operation, SessionState,
};

/// `SessionState` as shown to the user: collecting with enough vertices is
/// reported as `ReadyToSave`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    Idle,
    Collecting,
    ReadyToSave,
    Saving,
    Saved,
    SaveFailed,
}

/// The paddock while it is being walked.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaddockDraft {
    pub name: String,
    pub max_occupancy: u32,
    pub group_id: Option<Id<Group>>,
    pub vertices: Vec<GeoPoint>,
    pub computed_area_m2: f64,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub phase: SessionPhase,
    pub ready_to_save: bool,
    pub draft: PaddockDraft,
    pub perimeter_m: f64,
    pub last_error: Option<String>,
    pub saved_id: Option<Id<PaddockRecord>>,
}

/// Identifies the save a repository result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveHandle {
    epoch: u64,
}

/// Everything needed to perform a save outside of the session.
#[derive(Debug, Clone)]
pub struct SaveTicket {
    pub handle: SaveHandle,
    pub record: PaddockRecord,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved(Id<PaddockRecord>),
    Failed(PersistenceError),
    /// The session was cancelled or restarted while the save was running.
    Discarded,
}

/// Walks the user through demarcating one paddock: start, capture points
/// from the current fix, save. The vertex list is only ever changed from
/// here.
pub struct DemarcationSession {
    settings: DemarcationSettings,
    sampler: LocationSampler,
    builder: PolygonBuilder,
    metadata: PaddockMetadata,
    state: SessionState,
    // bumped whenever the draft is thrown away, so late save results can be
    // told apart from the current one
    epoch: u64,
    last_error: Option<PersistenceError>,
    saved_id: Option<Id<PaddockRecord>>,
}

impl DemarcationSession {
    pub fn new(settings: DemarcationSettings, sampler: LocationSampler) -> Self {
        let builder = PolygonBuilder::new(settings.min_movement_degrees);
        Self {
            settings,
            sampler,
            builder,
            metadata: PaddockMetadata::default(),
            state: SessionState::Idle,
            epoch: 0,
            last_error: None,
            saved_id: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn phase(&self) -> SessionPhase {
        match self.state {
            SessionState::Idle => SessionPhase::Idle,
            SessionState::Collecting if self.builder.count() >= MIN_VERTICES => {
                SessionPhase::ReadyToSave
            }
            SessionState::Collecting => SessionPhase::Collecting,
            SessionState::Saving => SessionPhase::Saving,
            SessionState::Saved => SessionPhase::Saved,
            SessionState::SaveFailed => SessionPhase::SaveFailed,
        }
    }

    pub fn vertices(&self) -> &[GeoPoint] {
        self.builder.vertices()
    }

    pub fn metadata(&self) -> &PaddockMetadata {
        &self.metadata
    }

    /// Live area of what was captured so far.
    pub fn area_m2(&self) -> f64 {
        area::compute_area_m2(self.builder.vertices())
    }

    pub fn last_error(&self) -> Option<&PersistenceError> {
        self.last_error.as_ref()
    }

    pub fn saved_id(&self) -> Option<&Id<PaddockRecord>> {
        self.saved_id.as_ref()
    }

    pub fn draft(&self) -> PaddockDraft {
        PaddockDraft {
            name: self.metadata.name.clone(),
            max_occupancy: self.metadata.max_occupancy,
            group_id: self.metadata.group_id.clone(),
            vertices: self.builder.vertices().to_vec(),
            computed_area_m2: self.area_m2(),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            phase: self.phase(),
            ready_to_save: self.phase() == SessionPhase::ReadyToSave,
            draft: self.draft(),
            perimeter_m: area::perimeter_m(self.builder.vertices()),
            last_error: self.last_error.as_ref().map(|why| why.to_string()),
            saved_id: self.saved_id.clone(),
        }
    }

    pub fn overlay(&self) -> MapOverlay {
        let vertices = self.builder.vertices();
        MapOverlay {
            ring: (!vertices.is_empty()).then(|| encoder::encode(vertices)),
            vertices: vertices.to_vec(),
            current_fix: self.sampler.current_fix(),
        }
    }

    pub fn start(&mut self) -> DemarcationResult<()> {
        match self.state {
            SessionState::Idle | SessionState::Saved | SessionState::SaveFailed => {
                self.discard_draft();
                self.state = SessionState::Collecting;
                log::info!("demarcation started");
                Ok(())
            }
            state => Err(DemarcationError::invalid_state(Operation::Start, state)),
        }
    }

    /// Captures the fix the sampler holds right now.
    pub fn add_point_from_sampler(&mut self) -> DemarcationResult<GeoPoint> {
        if self.state != SessionState::Collecting {
            return Err(DemarcationError::invalid_state(
                Operation::AddPoint,
                self.state,
            ));
        }

        let location = self.sampler.snapshot();
        let fix = match location.fix {
            Some(fix) if !location.acquiring => fix.validate()?,
            _ => {
                log::warn!("capture rejected, no usable fix");
                return Err(DemarcationError::LocationUnavailable {
                    acquiring: location.acquiring,
                    provider_error: location.error,
                });
            }
        };

        self.builder.add_point(fix).map_err(|why| {
            log::warn!("capture rejected: {}", why);
            DemarcationError::from(why)
        })?;
        log::debug!(
            "captured vertex {} at ({}, {})",
            self.builder.count(),
            fix.latitude,
            fix.longitude
        );
        Ok(fix)
    }

    pub fn clear(&mut self) -> DemarcationResult<()> {
        match self.state {
            SessionState::Collecting => {
                self.builder.clear();
                Ok(())
            }
            SessionState::SaveFailed => {
                self.builder.clear();
                self.last_error = None;
                self.state = SessionState::Collecting;
                Ok(())
            }
            state => Err(DemarcationError::invalid_state(Operation::Clear, state)),
        }
    }

    /// Validates the draft and moves to `Saving`. The returned record has to
    /// be handed to a repository and the result reported through
    /// `complete_save`.
    pub fn begin_save(&mut self, metadata: PaddockMetadata) -> DemarcationResult<SaveTicket> {
        match self.state {
            SessionState::Collecting | SessionState::SaveFailed => {}
            state => {
                return Err(DemarcationError::invalid_state(
                    Operation::RequestSave,
                    state,
                ))
            }
        }

        let issues = validation::validate(&metadata, self.builder.count());
        if !issues.is_empty() {
            return Err(DemarcationError::Validation(issues));
        }
        let group_id = metadata.group_id.clone().ok_or_else(|| {
            DemarcationError::Validation(vec![ValidationIssue::MissingGroup])
        })?;

        let vertices = self.builder.vertices();
        let record = PaddockRecord {
            name: metadata.name.trim().to_owned(),
            property_id: self.settings.property_id.clone(),
            group_id,
            paddock_type: self.settings.paddock_type,
            status: self.settings.paddock_status,
            description: String::new(),
            max_occupancy: metadata.max_occupancy,
            area_m2: area::compute_area_m2(vertices),
            geography: encoder::encode(vertices),
        };

        self.metadata = metadata;
        self.last_error = None;
        self.state = SessionState::Saving;
        log::info!(
            "saving paddock \"{}\" with {} vertices ({:.1} m²)",
            record.name,
            vertices.len(),
            record.area_m2
        );

        Ok(SaveTicket {
            handle: SaveHandle { epoch: self.epoch },
            record,
        })
    }

    /// Applies the repository result of a save started by `begin_save`.
    pub fn complete_save(
        &mut self,
        handle: SaveHandle,
        result: Result<Id<PaddockRecord>, PersistenceError>,
    ) -> SaveOutcome {
        if handle.epoch != self.epoch || self.state != SessionState::Saving {
            log::warn!("ignoring the result of an abandoned save: {:?}", result);
            return SaveOutcome::Discarded;
        }

        match result {
            Ok(id) => {
                log::info!("paddock saved with id {}", id);
                self.builder.clear();
                self.metadata = PaddockMetadata::default();
                self.saved_id = Some(id.clone());
                self.state = SessionState::Saved;
                SaveOutcome::Saved(id)
            }
            Err(why) => {
                log::error!("{}", why);
                self.last_error = Some(why.clone());
                self.state = SessionState::SaveFailed;
                SaveOutcome::Failed(why)
            }
        }
    }

    /// Validates, saves through the repository and waits for the result.
    pub async fn request_save<R>(
        &mut self,
        repository: &R,
        metadata: PaddockMetadata,
    ) -> DemarcationResult<Id<PaddockRecord>>
    where
        R: PaddockRepository + ?Sized,
    {
        let SaveTicket { handle, record } = self.begin_save(metadata)?;
        let result = repository.create(record).await;
        match self.complete_save(handle, result) {
            SaveOutcome::Saved(id) => Ok(id),
            SaveOutcome::Failed(why) => Err(DemarcationError::Persistence(why)),
            SaveOutcome::Discarded => Err(DemarcationError::invalid_state(
                Operation::RequestSave,
                self.state,
            )),
        }
    }

    pub fn cancel(&mut self) -> DemarcationResult<()> {
        match self.state {
            SessionState::Saved => Err(DemarcationError::invalid_state(
                Operation::Cancel,
                SessionState::Saved,
            )),
            SessionState::Idle => Ok(()),
            state => {
                if state == SessionState::Saving {
                    log::info!("demarcation cancelled while saving, the result will be ignored");
                } else {
                    log::info!("demarcation cancelled");
                }
                self.discard_draft();
                self.state = SessionState::Idle;
                Ok(())
            }
        }
    }

    fn discard_draft(&mut self) {
        self.builder.clear();
        self.metadata = PaddockMetadata::default();
        self.last_error = None;
        self.saved_id = None;
        self.epoch += 1;
    }
}

#[cfg(test)]
mod tests {
    use model::location::LocationState;

    use super::*;
    use crate::{
        location::{location_channel, LocationFeed},
        repository::InMemoryPaddockRepository,
    };

    fn point(latitude: f64, longitude: f64) -> GeoPoint {
        GeoPoint {
            latitude,
            longitude,
        }
    }

    fn session() -> (LocationFeed, DemarcationSession) {
        let (feed, sampler) = location_channel();
        (feed, DemarcationSession::new(DemarcationSettings::default(), sampler))
    }

    fn capture(feed: &LocationFeed, session: &mut DemarcationSession, points: &[(f64, f64)]) {
        for &(latitude, longitude) in points {
            feed.push_fix(point(latitude, longitude));
            session.add_point_from_sampler().unwrap();
        }
    }

    fn metadata() -> PaddockMetadata {
        PaddockMetadata::new("Pasto 1", 20, Some(Id::from("G1")))
    }

    const TRIANGLE: [(f64, f64); 3] = [
        (-24.497, -47.842),
        (-24.496, -47.842),
        (-24.496, -47.841),
    ];

    #[test]
    fn new_session_is_idle() {
        let (_feed, session) = session();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.vertices().is_empty());
    }

    #[test]
    fn capture_requires_collecting() {
        let (feed, mut session) = session();
        feed.push_fix(point(1.0, 1.0));
        assert_eq!(
            session.add_point_from_sampler(),
            Err(DemarcationError::invalid_state(
                Operation::AddPoint,
                SessionState::Idle
            ))
        );
    }

    #[test]
    fn capture_without_fix_fails_without_state_change() {
        let (feed, mut session) = session();
        session.start().unwrap();

        let err = session.add_point_from_sampler().unwrap_err();
        assert!(matches!(
            err,
            DemarcationError::LocationUnavailable {
                acquiring: true,
                ..
            }
        ));

        feed.report_error("signal lost");
        let err = session.add_point_from_sampler().unwrap_err();
        assert_eq!(
            err,
            DemarcationError::LocationUnavailable {
                acquiring: false,
                provider_error: Some("signal lost".to_owned()),
            }
        );
        assert_eq!(session.state(), SessionState::Collecting);
        assert!(session.vertices().is_empty());
    }

    #[test]
    fn acquiring_sampler_blocks_capture_even_with_a_fix() {
        let (feed, mut session) = session();
        session.start().unwrap();
        feed.publish(LocationState {
            fix: Some(point(1.0, 1.0)),
            acquiring: true,
            ..Default::default()
        });
        assert!(matches!(
            session.add_point_from_sampler(),
            Err(DemarcationError::LocationUnavailable { .. })
        ));
    }

    #[test]
    fn capture_reads_the_fix_at_capture_time() {
        let (feed, mut session) = session();
        session.start().unwrap();
        feed.push_fix(point(1.0, 1.0));
        feed.push_fix(point(2.0, 2.0));
        assert_eq!(session.add_point_from_sampler(), Ok(point(2.0, 2.0)));
        assert_eq!(session.vertices(), &[point(2.0, 2.0)]);
    }

    #[test]
    fn duplicate_capture_is_surfaced() {
        let (feed, mut session) = session();
        session.start().unwrap();
        feed.push_fix(point(1.0, 1.0));
        session.add_point_from_sampler().unwrap();
        assert!(matches!(
            session.add_point_from_sampler(),
            Err(DemarcationError::DuplicatePoint(_))
        ));
        assert_eq!(session.vertices().len(), 1);
        assert_eq!(session.state(), SessionState::Collecting);
    }

    #[test]
    fn ready_to_save_is_derived_from_vertex_count() {
        let (feed, mut session) = session();
        session.start().unwrap();
        capture(&feed, &mut session, &TRIANGLE[..2]);
        assert_eq!(session.phase(), SessionPhase::Collecting);
        capture(&feed, &mut session, &TRIANGLE[2..]);
        assert_eq!(session.phase(), SessionPhase::ReadyToSave);
        assert!(session.snapshot().ready_to_save);
        session.clear().unwrap();
        assert_eq!(session.phase(), SessionPhase::Collecting);
    }

    #[test]
    fn live_area_follows_the_vertices() {
        let (feed, mut session) = session();
        session.start().unwrap();
        capture(&feed, &mut session, &TRIANGLE[..2]);
        assert_eq!(session.area_m2(), 0.0);
        capture(&feed, &mut session, &TRIANGLE[2..]);
        // right triangle with legs of 0.001°
        assert!((session.area_m2() - 0.5).abs() < 1e-6);
        assert_eq!(session.draft().computed_area_m2, session.area_m2());
    }

    #[test]
    fn save_with_missing_everything_lists_all_issues() {
        let (_feed, mut session) = session();
        session.start().unwrap();
        let err = session.begin_save(PaddockMetadata::default()).unwrap_err();
        assert_eq!(
            err,
            DemarcationError::Validation(vec![
                ValidationIssue::MissingName,
                ValidationIssue::TooFewVertices {
                    count: 0,
                    required: 3
                },
                ValidationIssue::MissingGroup,
            ])
        );
        assert_eq!(session.state(), SessionState::Collecting);
        assert_eq!(session.metadata(), &PaddockMetadata::default());
    }

    #[test]
    fn begin_save_builds_the_record() {
        let (feed, mut session) = session();
        session.start().unwrap();
        capture(&feed, &mut session, &TRIANGLE);

        let ticket = session.begin_save(metadata()).unwrap();
        assert_eq!(session.state(), SessionState::Saving);
        assert_eq!(ticket.record.name, "Pasto 1");
        assert_eq!(ticket.record.group_id, Id::from("G1"));
        assert_eq!(ticket.record.property_id, Id::from("default"));
        assert_eq!(ticket.record.max_occupancy, 20);
        assert!(ticket.record.area_m2 > 0.0);
        assert_eq!(ticket.record.geography.ring().len(), 4);
        assert_eq!(ticket.record.geography.ring()[0], [-47.842, -24.497]);
    }

    #[test]
    fn saving_rejects_further_actions() {
        let (feed, mut session) = session();
        session.start().unwrap();
        capture(&feed, &mut session, &TRIANGLE);
        session.begin_save(metadata()).unwrap();

        feed.push_fix(point(-24.4965, -47.8405));
        assert_eq!(
            session.add_point_from_sampler(),
            Err(DemarcationError::invalid_state(
                Operation::AddPoint,
                SessionState::Saving
            ))
        );
        assert!(matches!(
            session.begin_save(metadata()),
            Err(DemarcationError::InvalidState {
                operation: Operation::RequestSave,
                state: SessionState::Saving
            })
        ));
        assert!(session.clear().is_err());
        assert!(session.start().is_err());
        assert_eq!(session.vertices().len(), 3);
    }

    #[test]
    fn successful_save_discards_the_draft() {
        let (feed, mut session) = session();
        session.start().unwrap();
        capture(&feed, &mut session, &TRIANGLE);
        let ticket = session.begin_save(metadata()).unwrap();

        let outcome = session.complete_save(ticket.handle, Ok(Id::from("7")));
        assert_eq!(outcome, SaveOutcome::Saved(Id::from("7")));
        assert_eq!(session.state(), SessionState::Saved);
        assert!(session.vertices().is_empty());
        assert_eq!(session.saved_id(), Some(&Id::from("7")));
        assert!(session.cancel().is_err());

        // a new paddock can be started from the saved state
        session.start().unwrap();
        assert_eq!(session.saved_id(), None);
    }

    #[test]
    fn failed_save_keeps_the_draft_for_retry() {
        let (feed, mut session) = session();
        session.start().unwrap();
        capture(&feed, &mut session, &TRIANGLE);
        let ticket = session.begin_save(metadata()).unwrap();

        let error = PersistenceError::new("timeout");
        let outcome = session.complete_save(ticket.handle, Err(error.clone()));
        assert_eq!(outcome, SaveOutcome::Failed(error.clone()));
        assert_eq!(session.state(), SessionState::SaveFailed);
        assert_eq!(session.vertices().len(), 3);
        assert_eq!(session.metadata(), &metadata());
        assert_eq!(session.last_error(), Some(&error));

        // capturing needs a clear first
        assert!(session.add_point_from_sampler().is_err());

        let retry = session.begin_save(metadata()).unwrap();
        assert_eq!(session.state(), SessionState::Saving);
        assert_eq!(session.last_error(), None);
        session.complete_save(retry.handle, Ok(Id::from("1")));
        assert_eq!(session.state(), SessionState::Saved);
    }

    #[test]
    fn clear_after_failure_returns_to_collecting() {
        let (feed, mut session) = session();
        session.start().unwrap();
        capture(&feed, &mut session, &TRIANGLE);
        let ticket = session.begin_save(metadata()).unwrap();
        session.complete_save(ticket.handle, Err(PersistenceError::new("offline")));

        session.clear().unwrap();
        assert_eq!(session.state(), SessionState::Collecting);
        assert!(session.vertices().is_empty());
    }

    #[test]
    fn result_after_cancel_is_ignored() {
        let (feed, mut session) = session();
        session.start().unwrap();
        capture(&feed, &mut session, &TRIANGLE);
        let ticket = session.begin_save(metadata()).unwrap();

        session.cancel().unwrap();
        assert_eq!(session.state(), SessionState::Idle);

        session.start().unwrap();
        let outcome = session.complete_save(ticket.handle, Ok(Id::from("9")));
        assert_eq!(outcome, SaveOutcome::Discarded);
        assert_eq!(session.state(), SessionState::Collecting);
        assert_eq!(session.saved_id(), None);
    }

    #[test]
    fn cancel_in_idle_is_a_no_op() {
        let (_feed, mut session) = session();
        assert_eq!(session.cancel(), Ok(()));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn start_is_rejected_while_collecting() {
        let (_feed, mut session) = session();
        session.start().unwrap();
        assert_eq!(
            session.start(),
            Err(DemarcationError::invalid_state(
                Operation::Start,
                SessionState::Collecting
            ))
        );
    }

    #[test]
    fn overlay_contains_ring_and_fix() {
        let (feed, mut session) = session();
        assert_eq!(session.overlay().ring, None);

        session.start().unwrap();
        capture(&feed, &mut session, &TRIANGLE[..2]);
        feed.push_fix(point(-24.4962, -47.8415));

        let overlay = session.overlay();
        assert_eq!(overlay.vertices.len(), 2);
        assert_eq!(overlay.ring.map(|ring| ring.ring().len()), Some(3));
        assert_eq!(overlay.current_fix, Some(point(-24.4962, -47.8415)));
    }

    #[tokio::test]
    async fn request_save_uses_the_repository() {
        let (feed, mut session) = session();
        let repository = InMemoryPaddockRepository::new();
        session.start().unwrap();
        capture(&feed, &mut session, &TRIANGLE);

        let id = session.request_save(&repository, metadata()).await.unwrap();
        assert_eq!(id.raw(), "1");
        assert_eq!(session.state(), SessionState::Saved);
        let records = repository.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content.name, "Pasto 1");
    }
}
