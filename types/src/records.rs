//! Wire records as served by the pets API.
//!
//! Every field is optional on the wire. Decoding never fails because a field is
//! missing; whether a record is usable is decided later by [`crate::PetVetRow`].

use serde::{Deserialize, Serialize};

use crate::VetId;

/// One entry of the `/pets` collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetRecord {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Foreign key into `/practitioners/{id}`. Pets without one are never paired.
    #[serde(default)]
    pub practitioner_id: Option<VetId>,
}

impl PetRecord {
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        practitioner_id: Option<VetId>,
    ) -> Self {
        Self {
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            practitioner_id,
        }
    }

    #[must_use]
    pub fn vet_id(&self) -> Option<VetId> {
        self.practitioner_id
    }
}

/// A practitioner fetched by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VetRecord {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl VetRecord {
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            title: Some(title.into()),
        }
    }
}
