use std::num::NonZeroUsize;

use serde::Deserialize;

/// Order of rows in the delivered set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultOrder {
    /// Pet collection order.
    #[default]
    #[serde(alias = "pets")]
    Primary,
    /// Order in which vet fetches finished.
    #[serde(alias = "arrival")]
    Completion,
}

impl ResultOrder {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "primary" | "pets" => Some(Self::Primary),
            "completion" | "arrival" => Some(Self::Completion),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Completion => "completion",
        }
    }
}

/// Per-run tuning. The default matches an uncapped fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateOptions {
    /// Cap on concurrent vet fetches; `None` dispatches all at once.
    pub max_in_flight: Option<NonZeroUsize>,
    pub order: ResultOrder,
}

impl AggregateOptions {
    #[must_use]
    pub fn with_max_in_flight(mut self, limit: usize) -> Self {
        self.max_in_flight = NonZeroUsize::new(limit);
        self
    }

    #[must_use]
    pub fn with_order(mut self, order: ResultOrder) -> Self {
        self.order = order;
        self
    }
}
