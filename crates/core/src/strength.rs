//! Heuristic password strength scoring.

use serde::{Deserialize, Serialize};

/// Highest score [`score`] can return.
pub const MAX_SCORE: u8 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrengthLabel {
    Weak,
    Fair,
    Good,
    Strong,
}

/// Display tag paired with a [`StrengthLabel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorHint {
    Red,
    Yellow,
    Blue,
    Green,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrengthReport {
    pub score: u8,
    pub label: StrengthLabel,
    pub color: ColorHint,
}

impl StrengthLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weak => "Weak",
            Self::Fair => "Fair",
            Self::Good => "Good",
            Self::Strong => "Strong",
        }
    }

    pub fn color(self) -> ColorHint {
        match self {
            Self::Weak => ColorHint::Red,
            Self::Fair => ColorHint::Yellow,
            Self::Good => ColorHint::Blue,
            Self::Strong => ColorHint::Green,
        }
    }

    fn from_score(score: u8) -> Self {
        match score {
            0..=2 => Self::Weak,
            3..=4 => Self::Fair,
            5..=6 => Self::Good,
            _ => Self::Strong,
        }
    }
}

impl std::fmt::Display for StrengthLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score `password` from 0 to [`MAX_SCORE`].
///
/// One point per length threshold reached (8, 12, 16 chars) and one point per
/// character class present: lowercase, uppercase, digit, anything else.
pub fn score(password: &str) -> StrengthReport {
    let length = password.chars().count();
    let thresholds = [8, 12, 16].iter().filter(|&&t| length >= t).count();

    let classes = [
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ]
    .into_iter()
    .filter(|present| *present)
    .count();

    // Both counts are bounded by the array sizes above.
    let score = (thresholds + classes) as u8;
    let label = StrengthLabel::from_score(score);

    StrengthReport {
        score,
        label,
        color: label.color(),
    }
}
