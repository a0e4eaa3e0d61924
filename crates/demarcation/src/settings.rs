use std::{env, fmt::Display, str::FromStr};

use model::paddock::{PaddockStatus, PaddockType, Property};
use utility::id::Id;

/// Roughly 1.1 m at the equator.
pub const DEFAULT_MIN_MOVEMENT_DEGREES: f64 = 0.00001;

#[derive(Debug, Clone)]
pub struct DemarcationSettings {
    /// Captures closer than this to the previous vertex are rejected.
    pub min_movement_degrees: f64,
    /// Written into every record, the api scopes paddocks by property.
    pub property_id: Id<Property>,
    pub paddock_type: PaddockType,
    pub paddock_status: PaddockStatus,
}

impl Default for DemarcationSettings {
    fn default() -> Self {
        Self {
            min_movement_degrees: DEFAULT_MIN_MOVEMENT_DEGREES,
            property_id: Id::from("default"),
            paddock_type: PaddockType::default(),
            paddock_status: PaddockStatus::default(),
        }
    }
}

impl DemarcationSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Missing values fall back to the defaults, unparsable ones too (with
    /// a warning).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            min_movement_degrees: parse_or(
                &lookup,
                "DEMARCATION_MIN_MOVEMENT_DEGREES",
                defaults.min_movement_degrees,
            ),
            property_id: lookup("DEMARCATION_PROPERTY_ID")
                .map(Id::new)
                .unwrap_or(defaults.property_id),
            paddock_type: parse_or(
                &lookup,
                "DEMARCATION_PADDOCK_TYPE",
                defaults.paddock_type,
            ),
            paddock_status: parse_or(
                &lookup,
                "DEMARCATION_PADDOCK_STATUS",
                defaults.paddock_status,
            ),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(value) => value.parse().unwrap_or_else(|why| {
            log::warn!("ignoring {}={:?}: {}", key, value, why);
            default
        }),
        None => default,
    }
}
