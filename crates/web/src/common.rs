use axum::{
    extract::{OriginalUri, Query, Request},
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::MethodFilter,
    Json,
};
use demarcation::{service::ServiceError, DemarcationError};
use model::ExampleData;
use schemars::{schema_for, schema_for_value, JsonSchema};
use serde::{Deserialize, Serialize};

use crate::hateoas;

pub type RouteResult<O> = Result<O, RouteErrorResponse>;
pub type HateoasResult<O> = RouteResult<Json<hateoas::Response<O>>>;

/// A `MethodFilter` that matches all http methods.
pub(crate) const METHOD_FILTER_ALL: MethodFilter = MethodFilter::GET
    .or(MethodFilter::POST)
    .or(MethodFilter::PATCH)
    .or(MethodFilter::PUT)
    .or(MethodFilter::DELETE);

// - Services returning commonly used responses -

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SchemaParams {
    #[serde(default = "Default::default")]
    example_data: bool,
}

pub(crate) async fn schema<T: ExampleData + JsonSchema + Serialize>(
    Query(params): Query<SchemaParams>,
) -> impl IntoResponse {
    if params.example_data {
        Json(schema_for_value!(T::example_data()))
    } else {
        Json(schema_for!(T))
    }
}

pub(crate) async fn route_not_found(
    OriginalUri(original_uri): OriginalUri,
    req: Request,
) -> impl IntoResponse {
    RouteErrorResponse::not_found(req.method(), original_uri.path())
}

// - Commonly used responeses -

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteErrorResponse {
    #[serde(skip)]
    pub status_code: StatusCode,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_method: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_uri: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_information: Option<String>,
}

impl RouteErrorResponse {
    pub fn new(status_code: StatusCode) -> Self {
        Self {
            status_code,
            http_method: None,
            requested_uri: None,
            message: None,
            detailed_information: None,
        }
    }

    pub fn not_found(method: &Method, uri: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND)
            .with_method(method)
            .with_uri(uri)
            .with_default_message()
    }

    pub fn with_method(mut self, method: &Method) -> Self {
        self.http_method = Some(method.to_string());
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.requested_uri = Some(uri.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_default_message(self) -> Self {
        let message = self
            .status_code
            .canonical_reason()
            .unwrap_or("i dunno what happened here :/");
        self.with_message(message)
    }

    pub fn with_detailed_information(mut self, message: impl Into<String>) -> Self {
        self.detailed_information = Some(message.into());
        self
    }
}

impl From<DemarcationError> for RouteErrorResponse {
    fn from(value: DemarcationError) -> Self {
        let status_code = match &value {
            DemarcationError::LocationUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            DemarcationError::DuplicatePoint(_) => StatusCode::CONFLICT,
            DemarcationError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DemarcationError::InvalidState { .. } => StatusCode::CONFLICT,
            DemarcationError::Persistence(_) => StatusCode::BAD_GATEWAY,
        };
        let response = Self::new(status_code).with_message(value.to_string());
        match value {
            DemarcationError::Validation(issues) => {
                let issues = issues
                    .iter()
                    .map(|issue| issue.to_string())
                    .collect::<Vec<_>>()
                    .join("; ");
                response.with_detailed_information(issues)
            }
            _ => response,
        }
    }
}

impl From<ServiceError> for RouteErrorResponse {
    fn from(value: ServiceError) -> Self {
        match value {
            ServiceError::Demarcation(why) => why.into(),
            ServiceError::Actor(why) => {
                log::error!("session actor unreachable: {}", why);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR)
                    .with_message(format!("{}", why))
            }
        }
    }
}

impl IntoResponse for RouteErrorResponse {
    fn into_response(self) -> axum::response::Response {
        (self.status_code, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use actors::actor::ActorError;
    use demarcation::{
        DuplicatePointError, Operation, PersistenceError, SessionState, ValidationIssue,
    };

    use super::*;

    #[test]
    fn demarcation_errors_map_to_status_codes() {
        let cases = [
            (
                DemarcationError::LocationUnavailable {
                    acquiring: true,
                    provider_error: None,
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                DemarcationError::DuplicatePoint(DuplicatePointError {
                    distance_degrees: 0.0,
                    threshold_degrees: 0.00001,
                }),
                StatusCode::CONFLICT,
            ),
            (
                DemarcationError::invalid_state(Operation::AddPoint, SessionState::Idle),
                StatusCode::CONFLICT,
            ),
            (
                DemarcationError::Persistence(PersistenceError::new("down").with_status(500)),
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(RouteErrorResponse::from(error).status_code, expected);
        }
    }

    #[test]
    fn validation_issues_are_listed_in_order() {
        let response = RouteErrorResponse::from(DemarcationError::Validation(vec![
            ValidationIssue::MissingName,
            ValidationIssue::MissingGroup,
        ]));

        assert_eq!(response.status_code, StatusCode::UNPROCESSABLE_ENTITY);
        let details = response.detailed_information.unwrap();
        assert_eq!(
            details,
            format!(
                "{}; {}",
                ValidationIssue::MissingName,
                ValidationIssue::MissingGroup
            )
        );
    }

    #[test]
    fn unreachable_actor_is_an_internal_error() {
        let response = RouteErrorResponse::from(ServiceError::Actor(ActorError::MailboxClosed));
        assert_eq!(response.status_code, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.message.is_some());
    }
}
