use serde::{Deserialize, Serialize};

/// One of the four sequential booking steps.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BookingStage {
    Passengers,
    Confirmation,
    Payment,
    Completion,
}

impl BookingStage {
    /// Canonical linear order of the funnel.
    pub const ALL: [BookingStage; 4] = [
        BookingStage::Passengers,
        BookingStage::Confirmation,
        BookingStage::Payment,
        BookingStage::Completion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStage::Passengers => "passengers",
            BookingStage::Confirmation => "confirmation",
            BookingStage::Payment => "payment",
            BookingStage::Completion => "completion",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "passengers" => Some(BookingStage::Passengers),
            "confirmation" => Some(BookingStage::Confirmation),
            "payment" => Some(BookingStage::Payment),
            "completion" => Some(BookingStage::Completion),
            _ => None,
        }
    }

    /// The stage that follows this one, if any.
    pub fn next(&self) -> Option<Self> {
        let idx = Self::ALL.iter().position(|s| s == self)?;
        Self::ALL.get(idx + 1).copied()
    }
}

impl std::fmt::Display for BookingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
