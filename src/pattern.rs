use crate::util::secs_label;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// A named interval within the breathing cycle, with its own configured
/// duration. Phases advance in a fixed sequence: Inhale -> Hold -> Exhale
/// and back around to Inhale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Inhale,
    Hold,
    Exhale,
}

impl Phase {
    /// The phase that follows this one in the cycle.
    pub fn next(self) -> Phase {
        match self {
            Phase::Inhale => Phase::Hold,
            Phase::Hold => Phase::Exhale,
            Phase::Exhale => Phase::Inhale,
        }
    }

    /// Guidance text shown to the user while this phase is running.
    pub fn instruction(self) -> &'static str {
        match self {
            Phase::Inhale => "Breathe in slowly through your nose...",
            Phase::Hold => "Hold your breath gently...",
            Phase::Exhale => "Breathe out slowly through your mouth...",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Inhale => "Inhale",
            Phase::Hold => "Hold",
            Phase::Exhale => "Exhale",
        };
        write!(f, "{}", label)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("{phase} duration must be positive")]
    ZeroDuration { phase: Phase },
    #[error("pattern name cannot be empty")]
    EmptyName,
}

/// A named triple of phase durations plus descriptive text, selectable by
/// the user. Immutable once built; `new` rejects zero durations so every
/// pattern in circulation is safe to time against.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreathingPattern {
    pub name: String,
    pub inhale_ms: u64,
    pub hold_ms: u64,
    pub exhale_ms: u64,
    #[serde(default)]
    pub description: String,
}

impl BreathingPattern {
    pub fn new(
        name: impl Into<String>,
        inhale_ms: u64,
        hold_ms: u64,
        exhale_ms: u64,
        description: impl Into<String>,
    ) -> Result<Self, PatternError> {
        let pattern = Self {
            name: name.into(),
            inhale_ms,
            hold_ms,
            exhale_ms,
            description: description.into(),
        };
        pattern.validate()?;
        Ok(pattern)
    }

    /// Re-check the invariants. Needed for patterns that arrive through
    /// deserialization and therefore bypass `new`.
    pub fn validate(&self) -> Result<(), PatternError> {
        if self.name.trim().is_empty() {
            return Err(PatternError::EmptyName);
        }
        for (phase, ms) in [
            (Phase::Inhale, self.inhale_ms),
            (Phase::Hold, self.hold_ms),
            (Phase::Exhale, self.exhale_ms),
        ] {
            if ms == 0 {
                return Err(PatternError::ZeroDuration { phase });
            }
        }
        Ok(())
    }

    pub fn duration_of(&self, phase: Phase) -> Duration {
        let ms = match phase {
            Phase::Inhale => self.inhale_ms,
            Phase::Hold => self.hold_ms,
            Phase::Exhale => self.exhale_ms,
        };
        Duration::from_millis(ms)
    }

    /// Total length of one full cycle in milliseconds.
    pub fn cycle_ms(&self) -> u64 {
        self.inhale_ms + self.hold_ms + self.exhale_ms
    }

    /// One-line duration summary, e.g. "Inhale: 4s | Hold: 4s | Exhale: 6s".
    pub fn summary(&self) -> String {
        format!(
            "Inhale: {} | Hold: {} | Exhale: {}",
            secs_label(self.inhale_ms),
            secs_label(self.hold_ms),
            secs_label(self.exhale_ms)
        )
    }
}

/// The built-in pattern catalog, in display order.
pub fn builtin_patterns() -> Vec<BreathingPattern> {
    vec![
        BreathingPattern {
            name: "4-4-6 (Relaxing)".into(),
            inhale_ms: 4000,
            hold_ms: 4000,
            exhale_ms: 6000,
            description: "Great for general relaxation and stress relief".into(),
        },
        BreathingPattern {
            name: "4-7-8 (Sleep)".into(),
            inhale_ms: 4000,
            hold_ms: 7000,
            exhale_ms: 8000,
            description: "Ideal for falling asleep and deep relaxation".into(),
        },
        BreathingPattern {
            name: "6-2-6 (Balanced)".into(),
            inhale_ms: 6000,
            hold_ms: 2000,
            exhale_ms: 6000,
            description: "Balanced breathing for focus and calm".into(),
        },
        BreathingPattern {
            name: "4-4-4 (Box)".into(),
            inhale_ms: 4000,
            hold_ms: 4000,
            exhale_ms: 4000,
            description: "Box breathing for anxiety and stress management".into(),
        },
    ]
}
