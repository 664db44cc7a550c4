//! Discrete trading signal derived from daily news features.

use serde::{Deserialize, Serialize};

/// Direction of a same-day or executed signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    /// Bearish burst day - short the ticker
    Short,
    /// No position
    #[default]
    Flat,
    /// Bullish burst day - long the ticker
    Long,
}

impl Signal {
    /// Returns the signal as -1, 0 or +1.
    #[must_use]
    pub const fn value(self) -> i8 {
        match self {
            Self::Short => -1,
            Self::Flat => 0,
            Self::Long => 1,
        }
    }

    /// Returns the signal as a position multiplier.
    #[must_use]
    pub fn multiplier(self) -> f64 {
        f64::from(self.value())
    }

    /// Returns true if the signal holds a position.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Flat)
    }
}

impl From<Signal> for i8 {
    fn from(signal: Signal) -> Self {
        signal.value()
    }
}
