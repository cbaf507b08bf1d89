use std::fmt;

use serde::{Deserialize, Serialize};

/// Direction of the recent net price move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Neutral,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDirection::Up => write!(f, "up"),
            TrendDirection::Down => write!(f, "down"),
            TrendDirection::Neutral => write!(f, "neutral"),
        }
    }
}

/// Trend classification with a 0-100 confidence score.
///
/// A zero score and a neutral direction always go together; `new` folds
/// either one into the other so the pair can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSignal")]
pub struct TrendSignal {
    #[serde(rename = "trend")]
    direction: TrendDirection,
    score: u8,
}

impl TrendSignal {
    pub const MAX_SCORE: u8 = 100;

    pub fn new(direction: TrendDirection, score: u8) -> Self {
        let score = score.min(Self::MAX_SCORE);
        if direction == TrendDirection::Neutral || score == 0 {
            return Self::neutral();
        }
        Self { direction, score }
    }

    pub fn neutral() -> Self {
        Self {
            direction: TrendDirection::Neutral,
            score: 0,
        }
    }

    pub fn direction(&self) -> TrendDirection {
        self.direction
    }

    pub fn score(&self) -> u8 {
        self.score
    }

    pub fn is_neutral(&self) -> bool {
        self.direction == TrendDirection::Neutral
    }
}

#[derive(Deserialize)]
struct RawSignal {
    trend: TrendDirection,
    score: u8,
}

impl TryFrom<RawSignal> for TrendSignal {
    type Error = String;

    fn try_from(raw: RawSignal) -> Result<Self, Self::Error> {
        if raw.score > Self::MAX_SCORE {
            return Err(format!("score {} exceeds {}", raw.score, Self::MAX_SCORE));
        }
        let signal = Self::new(raw.trend, raw.score);
        if signal.direction != raw.trend {
            return Err(format!("trend {} does not match score {}", raw.trend, raw.score));
        }
        Ok(signal)
    }
}

impl Default for TrendSignal {
    fn default() -> Self {
        Self::neutral()
    }
}

impl fmt::Display for TrendSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}/100)", self.direction, self.score)
    }
}
