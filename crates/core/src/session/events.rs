//! Session events and the participant-facing text derived from them.
use super::{CombatSession, EncounterOutcome};
use crate::action::{Action, ActionIntent, ActionOrigin};
use crate::combat::AttackResult;
use crate::fighter::ControlKind;
use crate::ids::FighterId;
use crate::initiative::InitiativeRoll;
use crate::narrative::Pacing;

/// Everything observable that happens inside a session, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatEvent {
    CombatStarted {
        /// Rolls in turn order.
        initiative: Vec<InitiativeRoll>,
        projected_rounds: u32,
    },
    RoundStarted {
        round: u32,
        /// One line per player-controlled fighter.
        status_lines: Vec<String>,
    },
    RoundEnded {
        round: u32,
    },
    TurnStarted {
        fighter: FighterId,
        control: ControlKind,
    },
    /// The fighter is defeated; no time was consumed.
    TurnSkipped {
        fighter: FighterId,
    },
    TimeoutWarning {
        fighter: FighterId,
        remaining: u32,
    },
    TurnTimedOut {
        fighter: FighterId,
    },
    ActionRecorded {
        fighter: FighterId,
        text: String,
        feedback: String,
    },
    TurnResolved(TurnReport),
    FighterDefeated {
        fighter: FighterId,
    },
    CombatEnded {
        outcome: EncounterOutcome,
    },
}

/// Outcome of one resolved turn.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnReport {
    pub actor: FighterId,
    pub action: Action,
    /// `None` for a pass or when nobody was left to attack.
    pub target: Option<FighterId>,
    pub attack: Option<AttackResult>,
    pub target_hp_after: Option<u32>,
    /// Pacing measured after the turn's damage was applied.
    pub pacing: Pacing,
}

/// Who receives an announcement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Audience {
    /// Every player-controlled fighter in the session.
    Participants,
    Fighter(FighterId),
}

/// Text line for participants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Announcement {
    pub audience: Audience,
    pub text: String,
}

impl Announcement {
    fn all(text: impl Into<String>) -> Self {
        Self {
            audience: Audience::Participants,
            text: text.into(),
        }
    }

    fn to(fighter: FighterId, text: impl Into<String>) -> Self {
        Self {
            audience: Audience::Fighter(fighter),
            text: text.into(),
        }
    }
}

impl CombatSession {
    /// Renders an event as participant messages.
    pub fn announce(&self, event: &CombatEvent) -> Vec<Announcement> {
        match event {
            CombatEvent::CombatStarted { initiative, .. } => {
                let order = initiative
                    .iter()
                    .map(|roll| format!("{} ({})", self.name_of(roll.fighter), roll.total))
                    .collect::<Vec<_>>()
                    .join(", ");
                vec![
                    Announcement::all("A fight has broken out!"),
                    Announcement::all(format!("Initiative order: {order}")),
                ]
            }
            CombatEvent::RoundStarted { status_lines, .. } => status_lines
                .iter()
                .map(|line| Announcement::all(line.clone()))
                .collect(),
            CombatEvent::RoundEnded { .. } => vec![Announcement::all("--- End of Round ---")],
            CombatEvent::TurnStarted { fighter, control } => match control {
                ControlKind::Player => vec![Announcement::to(
                    *fighter,
                    "It's your turn! What do you do? (e.g., 'do ...')",
                )],
                ControlKind::NonPlayer => Vec::new(),
            },
            CombatEvent::TurnSkipped { fighter } => vec![Announcement::all(format!(
                "{} is defeated and cannot act.",
                self.name_of(*fighter)
            ))],
            CombatEvent::TimeoutWarning { fighter, remaining } => vec![Announcement::to(
                *fighter,
                format!("You have {remaining} seconds to enter your action."),
            )],
            CombatEvent::TurnTimedOut { fighter } => vec![Announcement::all(format!(
                "{}'s turn has timed out! They hesitate.",
                self.name_of(*fighter)
            ))],
            CombatEvent::ActionRecorded {
                fighter,
                text,
                feedback,
            } => {
                let mut lines = vec![Announcement::to(*fighter, format!("You will: {text}"))];
                if !feedback.trim().is_empty() {
                    lines.push(Announcement::to(*fighter, feedback.clone()));
                }
                lines
            }
            CombatEvent::TurnResolved(report) => self.announce_turn(report),
            CombatEvent::FighterDefeated { fighter } => vec![Announcement::all(format!(
                "{} has been defeated!",
                self.name_of(*fighter)
            ))],
            CombatEvent::CombatEnded { outcome } => vec![
                Announcement::all(outcome.message()),
                Announcement::all("Combat has ended."),
            ],
        }
    }

    fn announce_turn(&self, report: &TurnReport) -> Vec<Announcement> {
        let actor = self.name_of(report.actor);
        let mut lines = vec![Announcement::all(format!("--- {actor}'s turn ---"))];

        match (&report.action.intent, &report.attack) {
            (ActionIntent::Pass, _) => {
                if report.action.origin != ActionOrigin::TimedOut {
                    lines.push(Announcement::all(format!("{actor} holds back this turn.")));
                }
            }
            (ActionIntent::Attack { .. }, None) => {
                lines.push(Announcement::all(format!(
                    "{actor} looks around but finds no one to attack."
                )));
            }
            (ActionIntent::Attack { .. }, Some(attack)) => {
                let target = self.name_of(attack.defender);
                lines.push(Announcement::all(format!("{actor} attacks {target}!")));
                if attack.is_hit() {
                    lines.push(Announcement::all(format!(
                        "{target} takes {} damage!",
                        attack.damage
                    )));
                } else {
                    lines.push(Announcement::all(format!("{actor}'s attack misses!")));
                }
                lines.push(Announcement::all(attack.roll_summary()));
            }
        }
        lines
    }

    /// Display name, or the id when the fighter is unknown.
    pub fn name_of(&self, id: FighterId) -> String {
        self.fighter(id)
            .map(|f| f.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}
