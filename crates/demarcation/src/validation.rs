use std::fmt;

use model::paddock::PaddockMetadata;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A paddock needs at least a triangle.
pub const MIN_VERTICES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "issue", rename_all = "camelCase")]
pub enum ValidationIssue {
    MissingName,
    TooFewVertices { count: usize, required: usize },
    MissingGroup,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingName => write!(f, "the paddock needs a name"),
            Self::TooFewVertices { count, required } => write!(
                f,
                "at least {} points are needed, {} captured",
                required, count
            ),
            Self::MissingGroup => write!(f, "a group has to be selected"),
        }
    }
}

/// Checks everything a save needs. All issues are collected, in the order
/// name, vertex count, group.
pub fn validate(metadata: &PaddockMetadata, vertex_count: usize) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    if metadata.name.trim().is_empty() {
        issues.push(ValidationIssue::MissingName);
    }
    if vertex_count < MIN_VERTICES {
        issues.push(ValidationIssue::TooFewVertices {
            count: vertex_count,
            required: MIN_VERTICES,
        });
    }
    if metadata.group_id.as_ref().map_or(true, |id| id.is_blank()) {
        issues.push(ValidationIssue::MissingGroup);
    }
    issues
}
