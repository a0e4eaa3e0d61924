use std::{fmt, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id};

use crate::{geography::ClosedRing, ExampleData};

/// The farm a paddock belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Property {
    pub name: String,
}

impl HasId for Property {
    type IdType = String;
}

/// The animal group (lot) that grazes a paddock.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Group {
    pub name: String,
}

impl HasId for Group {
    type IdType = String;
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum PaddockType {
    #[default]
    Pasture,
    Confinement,
    Reserve,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum PaddockStatus {
    #[default]
    Active,
    Resting,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown variant `{}`", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

impl FromStr for PaddockType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pasture" => Ok(Self::Pasture),
            "confinement" => Ok(Self::Confinement),
            "reserve" => Ok(Self::Reserve),
            other => Err(UnknownVariant(other.to_owned())),
        }
    }
}

impl FromStr for PaddockStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "resting" => Ok(Self::Resting),
            "inactive" => Ok(Self::Inactive),
            other => Err(UnknownVariant(other.to_owned())),
        }
    }
}

/// What the user types in before saving a demarcated paddock.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaddockMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub max_occupancy: u32,
    pub group_id: Option<Id<Group>>,
}

impl PaddockMetadata {
    pub fn new<S: Into<String>>(
        name: S,
        max_occupancy: u32,
        group_id: Option<Id<Group>>,
    ) -> Self {
        Self {
            name: name.into(),
            max_occupancy,
            group_id,
        }
    }
}

/// A paddock as it is sent to the persistence api.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaddockRecord {
    pub name: String,
    pub property_id: Id<Property>,
    pub group_id: Id<Group>,
    #[serde(rename = "type")]
    pub paddock_type: PaddockType,
    pub status: PaddockStatus,
    pub description: String,
    pub max_occupancy: u32,
    pub area_m2: f64,
    pub geography: ClosedRing,
}

impl HasId for PaddockRecord {
    type IdType = String;
}

impl ExampleData for PaddockRecord {
    fn example_data() -> Self {
        Self {
            name: "Pasto 1".to_owned(),
            property_id: Id::from("default"),
            group_id: Id::from("G1"),
            paddock_type: PaddockType::Pasture,
            status: PaddockStatus::Active,
            description: String::new(),
            max_occupancy: 20,
            area_m2: 0.5,
            geography: ClosedRing::polygon(vec![
                [-47.842, -24.497],
                [-47.842, -24.496],
                [-47.841, -24.496],
                [-47.842, -24.497],
            ]),
        }
    }
}
