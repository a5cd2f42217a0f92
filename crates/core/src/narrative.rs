//! Structured inputs for the narrative generator and their fallback text.
//!
//! The runtime hands these summaries to an external text generator. When that
//! fails, [`TurnSummary::fallback_narrative`] and
//! [`VictorySummary::fallback_narrative`] produce a plain sentence from the
//! same fields.
use crate::action::Sentiment;
use crate::session::EncounterOutcome;

/// How the fight is progressing compared with its projected length.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "lowercase")]
pub enum Pacing {
    /// Enemies are losing hp slower than rounds are passing.
    Slow,
    Steady,
    /// Enemies are losing hp faster than rounds are passing.
    Fast,
}

impl Pacing {
    /// Points of divergence tolerated before pacing leaves `Steady`.
    pub const TOLERANCE: i64 = 20;

    /// Compare plot progress (0–100) with round progress (0–100).
    pub fn from_progress(plot_percent: u32, round_percent: u32) -> Self {
        let delta = i64::from(plot_percent) - i64::from(round_percent);
        if delta < -Self::TOLERANCE {
            Self::Slow
        } else if delta > Self::TOLERANCE {
            Self::Fast
        } else {
            Self::Steady
        }
    }
}

/// Player performance over the whole encounter, from sentiment history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Performance {
    Excellent,
    Good,
    Average,
    Poor,
    Terrible,
}

impl Performance {
    /// Grade the mean sentiment modifier; no history grades as `Average`.
    pub fn from_history(history: &[Sentiment]) -> Self {
        if history.is_empty() {
            return Self::Average;
        }
        let total: i32 = history.iter().map(|s| s.modifier()).sum();
        // Scaled by 2 to keep the thresholds (±0.5, ±2.5) in integers.
        let mean_x2 = (total * 2) as f64 / history.len() as f64;
        if mean_x2 >= 5.0 {
            Self::Excellent
        } else if mean_x2 >= 1.0 {
            Self::Good
        } else if mean_x2 > -1.0 {
            Self::Average
        } else if mean_x2 > -5.0 {
            Self::Poor
        } else {
            Self::Terrible
        }
    }
}

/// Qualitative health of the player side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HealthStatus {
    #[strum(to_string = "Mostly healthy")]
    MostlyHealthy,
    #[strum(to_string = "Badly wounded")]
    BadlyWounded,
    #[strum(to_string = "Near death")]
    NearDeath,
    Defeated,
}

impl HealthStatus {
    pub fn from_hp(hp: u32, max_hp: u32) -> Self {
        if hp == 0 || max_hp == 0 {
            return Self::Defeated;
        }
        let percent = u64::from(hp) * 100 / u64::from(max_hp);
        if percent > 66 {
            Self::MostlyHealthy
        } else if percent > 33 {
            Self::BadlyWounded
        } else {
            Self::NearDeath
        }
    }
}

/// What happened on a resolved turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TurnOutcome {
    Hit,
    Miss,
    Pass,
    #[strum(to_string = "No target")]
    NoTarget,
}

/// Turn information handed to the narrative generator.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnSummary {
    pub actor_name: String,
    pub target_name: Option<String>,
    pub action_text: String,
    pub sentiment: Sentiment,
    pub roll_summary: String,
    pub outcome: TurnOutcome,
    pub damage: u32,
    pub pacing: Pacing,
}

impl TurnSummary {
    /// Deterministic sentence used when the generator is unavailable.
    pub fn fallback_narrative(&self) -> String {
        match (self.outcome, &self.target_name) {
            (TurnOutcome::Pass, _) => format!("{} hesitates.", self.actor_name),
            (TurnOutcome::NoTarget, _) | (_, None) => {
                format!("{} looks around but finds no one to attack.", self.actor_name)
            }
            (TurnOutcome::Hit, Some(target)) => {
                format!("{} attacks {}! The attack hits.", self.actor_name, target)
            }
            (TurnOutcome::Miss, Some(target)) => {
                format!("{} attacks {}! The attack misses.", self.actor_name, target)
            }
        }
    }
}

/// End-of-encounter information handed to the narrative generator.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VictorySummary {
    pub outcome: EncounterOutcome,
    /// "Players", "Enemies", or "No one".
    pub winner: String,
    pub survivors: Vec<String>,
    pub total_rounds: u32,
    pub player_health: HealthStatus,
    pub performance: Performance,
}

impl VictorySummary {
    pub fn fallback_narrative(&self) -> String {
        format!("The combat is over. The winner is {}.", self.winner)
    }
}
