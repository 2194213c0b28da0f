use std::fmt;

/// Identifier of a practitioner (vet), as referenced by `practitionerId` on a pet.
///
/// Signed: the service's ids are plain integers and a negative one must still
/// decode so that only its own pet is affected.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct VetId(i64);

impl VetId {
    #[must_use]
    pub fn new(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for VetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for VetId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}
