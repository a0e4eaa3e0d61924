use std::{error::Error, fmt};

use model::location::CoordinateError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub mod area;
pub mod encoder;
pub mod location;
pub mod polygon;
pub mod repository;
pub mod rest;
pub mod service;
pub mod session;
pub mod settings;
pub mod validation;

pub use polygon::DuplicatePointError;
pub use repository::PersistenceError;
pub use validation::ValidationIssue;

/// The user actions a session reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Start,
    AddPoint,
    Clear,
    RequestSave,
    Cancel,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::AddPoint => "add point",
            Self::Clear => "clear",
            Self::RequestSave => "request save",
            Self::Cancel => "cancel",
        };
        write!(f, "{}", name)
    }
}

/// The states of a demarcation session. `ReadyToSave` is not a state of
/// its own, see `session::SessionPhase`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    Idle,
    Collecting,
    Saving,
    Saved,
    SaveFailed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Collecting => "collecting",
            Self::Saving => "saving",
            Self::Saved => "saved",
            Self::SaveFailed => "save failed",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DemarcationError {
    /// There is no usable fix right now. Retry the capture later.
    LocationUnavailable {
        acquiring: bool,
        provider_error: Option<String>,
    },
    /// The device did not move far enough since the last capture.
    DuplicatePoint(DuplicatePointError),
    /// Every precondition of a save that is not met, in check order.
    Validation(Vec<ValidationIssue>),
    /// The operation is not allowed in the current state.
    InvalidState {
        operation: Operation,
        state: SessionState,
    },
    Persistence(PersistenceError),
}

impl DemarcationError {
    pub fn invalid_state(operation: Operation, state: SessionState) -> Self {
        Self::InvalidState { operation, state }
    }
}

impl fmt::Display for DemarcationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocationUnavailable {
                acquiring: true, ..
            } => write!(f, "location is still being acquired"),
            Self::LocationUnavailable {
                provider_error: Some(why),
                ..
            } => write!(f, "location unavailable: {}", why),
            Self::LocationUnavailable { .. } => write!(f, "location unavailable"),
            Self::DuplicatePoint(why) => write!(f, "{}", why),
            Self::Validation(issues) => {
                let issues = issues
                    .iter()
                    .map(|issue| issue.to_string())
                    .collect::<Vec<_>>()
                    .join("; ");
                write!(f, "validation failed: {}", issues)
            }
            Self::InvalidState { operation, state } => {
                write!(f, "can not {} while the session is {}", operation, state)
            }
            Self::Persistence(why) => write!(f, "{}", why),
        }
    }
}

impl Error for DemarcationError {}

impl From<DuplicatePointError> for DemarcationError {
    fn from(value: DuplicatePointError) -> Self {
        Self::DuplicatePoint(value)
    }
}

impl From<PersistenceError> for DemarcationError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value)
    }
}

impl From<CoordinateError> for DemarcationError {
    fn from(value: CoordinateError) -> Self {
        Self::LocationUnavailable {
            acquiring: false,
            provider_error: Some(value.to_string()),
        }
    }
}

pub type DemarcationResult<T> = Result<T, DemarcationError>;
