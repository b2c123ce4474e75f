//! Resource DTOs for the animal API.
//!
//! # Design
//! These mirror the server's schema but are defined independently, so the
//! client never links against axum. The live integration test catches schema
//! drift between the two crates.
//!
//! Hydration is plain serde: an `Animal` without an `id` (or with any other
//! field missing or mistyped) fails to deserialize instead of producing a
//! half-filled resource.

use serde::{Deserialize, Serialize};

/// Prefix of every resource anchor id in the document.
pub const ANCHOR_PREFIX: &str = "animal";

/// A single animal as stored by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Animal {
    pub id: u64,
    pub name: String,
    pub age: u32,
    pub is_mammal: bool,
}

impl Animal {
    /// Anchor id of the element rendering this animal, e.g. `animal-7`.
    pub fn dom_id(&self) -> String {
        anchor_id(self.id)
    }

    /// Copy of `self` carrying the edited values. The id never changes.
    pub fn with_values(&self, values: NewAnimal) -> Animal {
        Animal {
            id: self.id,
            name: values.name,
            age: values.age,
            is_mammal: values.is_mammal,
        }
    }
}

pub fn anchor_id(id: u64) -> String {
    format!("{ANCHOR_PREFIX}-{id}")
}

/// Payload for creating an animal. The server assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewAnimal {
    pub name: String,
    pub age: u32,
    pub is_mammal: bool,
}
