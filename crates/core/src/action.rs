//! Submitted combat actions and their validation verdicts.
//!
//! Free text is scored by an external validator (see the runtime crate). The
//! numeric [`Sentiment::modifier`] is always derived here from the fixed
//! table, never taken from the validator.
use crate::ids::FighterId;

/// Validator judgment of whether an action is permissible.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum Classification {
    #[default]
    Acceptable,
    Unacceptable,
    Vague,
}

/// Qualitative score of an action's descriptiveness and tactical quality.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum Sentiment {
    #[strum(to_string = "Very-Poor", serialize = "VeryPoor")]
    VeryPoor,
    Poor,
    #[default]
    Average,
    Good,
    #[strum(to_string = "Very-Good", serialize = "VeryGood")]
    VeryGood,
}

impl Sentiment {
    /// Fixed sentiment → modifier table.
    pub const fn modifier(self) -> i32 {
        match self {
            Self::VeryPoor => -4,
            Self::Poor => -2,
            Self::Average => 0,
            Self::Good => 2,
            Self::VeryGood => 4,
        }
    }
}

/// Verdict returned by the action validator.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Validation {
    pub classification: Classification,
    pub sentiment: Sentiment,
    pub feedback: String,
}

impl Validation {
    pub const FALLBACK_FEEDBACK: &'static str = "Your action is noted.";

    /// Safe verdict substituted whenever the validator is unavailable.
    pub fn fallback() -> Self {
        Self {
            classification: Classification::Acceptable,
            sentiment: Sentiment::Average,
            feedback: Self::FALLBACK_FEEDBACK.to_string(),
        }
    }

    pub fn is_acceptable(&self) -> bool {
        matches!(self.classification, Classification::Acceptable)
    }

    /// Feedback shown when the verdict refuses the action.
    ///
    /// Falls back to a generic hint when the validator left feedback empty.
    pub fn refusal_feedback(&self) -> String {
        if !self.feedback.trim().is_empty() {
            return self.feedback.clone();
        }
        match self.classification {
            Classification::Vague => "Be more specific about what you do.".to_string(),
            Classification::Unacceptable | Classification::Acceptable => {
                "That isn't something you can do right now.".to_string()
            }
        }
    }
}

impl Default for Validation {
    fn default() -> Self {
        Self::fallback()
    }
}

/// What the action does mechanically.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionIntent {
    /// Attack `target`, or a random opponent when `None`.
    Attack { target: Option<FighterId> },
    /// Do nothing this turn.
    Pass,
}

/// How the action came to exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ActionOrigin {
    /// Typed by the participant.
    Submitted,
    /// Synthesized by the scheduler after the turn timer expired.
    TimedOut,
    /// Chosen by the rules for a non-player fighter.
    Automatic,
}

/// Action recorded for a fighter in the current round.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Action {
    pub actor: FighterId,
    pub raw_text: String,
    pub intent: ActionIntent,
    pub origin: ActionOrigin,
    pub classification: Classification,
    pub sentiment: Sentiment,
    pub feedback: String,
}

impl Action {
    pub const PASS_TEXT: &'static str = "pass";

    /// Builds a submitted action from its text, intent and validator verdict.
    pub fn submitted(
        actor: FighterId,
        raw_text: impl Into<String>,
        intent: ActionIntent,
        validation: Validation,
    ) -> Self {
        Self {
            actor,
            raw_text: raw_text.into(),
            intent,
            origin: ActionOrigin::Submitted,
            classification: validation.classification,
            sentiment: validation.sentiment,
            feedback: validation.feedback,
        }
    }

    /// Neutral pass forced by the turn timeout.
    pub fn timed_out(actor: FighterId) -> Self {
        Self {
            actor,
            raw_text: Self::PASS_TEXT.to_string(),
            intent: ActionIntent::Pass,
            origin: ActionOrigin::TimedOut,
            classification: Classification::Acceptable,
            sentiment: Sentiment::Average,
            feedback: String::new(),
        }
    }

    /// Attack on a random opponent, taken by a non-player fighter.
    pub fn automatic(actor: FighterId) -> Self {
        Self {
            actor,
            raw_text: String::new(),
            intent: ActionIntent::Attack { target: None },
            origin: ActionOrigin::Automatic,
            classification: Classification::Acceptable,
            sentiment: Sentiment::Average,
            feedback: String::new(),
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self.intent, ActionIntent::Pass)
    }

    /// Numeric modifier derived from the sentiment.
    ///
    /// Exposed for display and summaries; attack and damage rolls do not use it.
    pub fn modifier(&self) -> i32 {
        self.sentiment.modifier()
    }

    /// True when the text is the literal pass keyword.
    pub fn is_pass_text(text: &str) -> bool {
        text.trim().eq_ignore_ascii_case(Self::PASS_TEXT)
    }
}
