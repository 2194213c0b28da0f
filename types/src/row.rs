//! The display-ready pairing of a pet and its vet.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{NonEmptyString, PetRecord, VetRecord};

/// Why a (pet, vet) pair could not become a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("pet record is missing `{0}`")]
    MissingPetField(&'static str),
    #[error("vet record is missing `{0}`")]
    MissingVetField(&'static str),
}

/// A fully validated pet/vet pairing.
///
/// Built through [`PetVetRow::try_build`], so every row was made from two
/// records whose display fields were all present and non-blank. There are no
/// placeholder rows. `Deserialize` exists for reading back rendered output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetVetRow {
    pet_name: String,
    vet_name_and_title: String,
}

impl PetVetRow {
    /// Validate both records and format the row.
    ///
    /// Field values are trimmed before use. The first missing or blank field
    /// fails the whole pair; no defaults are substituted.
    pub fn try_build(pet: &PetRecord, vet: &VetRecord) -> Result<Self, RowError> {
        let pet_first = required(pet.first_name.as_deref())
            .ok_or(RowError::MissingPetField("firstName"))?;
        let pet_last =
            required(pet.last_name.as_deref()).ok_or(RowError::MissingPetField("lastName"))?;

        let vet_first = required(vet.first_name.as_deref())
            .ok_or(RowError::MissingVetField("firstName"))?;
        let vet_last =
            required(vet.last_name.as_deref()).ok_or(RowError::MissingVetField("lastName"))?;
        let title = required(vet.title.as_deref()).ok_or(RowError::MissingVetField("title"))?;

        Ok(Self {
            pet_name: format!("{pet_first} {pet_last}"),
            vet_name_and_title: format!("{vet_first} {vet_last}, {title}"),
        })
    }

    /// Pair a pet with a possibly-absent vet. An absent vet yields no row.
    #[must_use]
    pub fn from_pair(pet: &PetRecord, vet: Option<&VetRecord>) -> Option<Self> {
        vet.and_then(|vet| Self::try_build(pet, vet).ok())
    }

    #[must_use]
    pub fn pet_name(&self) -> &str {
        &self.pet_name
    }

    #[must_use]
    pub fn vet_name_and_title(&self) -> &str {
        &self.vet_name_and_title
    }
}

fn required(value: Option<&str>) -> Option<NonEmptyString> {
    value.and_then(|v| NonEmptyString::trimmed(v).ok())
}
