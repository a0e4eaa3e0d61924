use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{geography::ClosedRing, location::GeoPoint};

/// Read-only view of an in-progress demarcation for the map surface.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MapOverlay {
    pub ring: Option<ClosedRing>,
    pub vertices: Vec<GeoPoint>,
    pub current_fix: Option<GeoPoint>,
}
