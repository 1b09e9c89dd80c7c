//! Entity kinds synchronized by the engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a domain record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// An application user (clinician or staff).
    User,
    /// A patient file.
    Patient,
    /// A consultation attached to a patient.
    Consultation,
    /// An appointment attached to a patient.
    Appointment,
}

impl EntityType {
    /// The fixed processing order for a sync pass.
    ///
    /// Referenced entities come before their dependents so the remote
    /// side never sees a consultation or appointment for a patient it
    /// does not know yet.
    pub const SYNC_ORDER: [EntityType; 4] = [
        EntityType::User,
        EntityType::Patient,
        EntityType::Consultation,
        EntityType::Appointment,
    ];

    /// Returns the stable string name of this entity type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::User => "user",
            EntityType::Patient => "patient",
            EntityType::Consultation => "consultation",
            EntityType::Appointment => "appointment",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
