//! Read-only views over a session: status lines, pacing and summaries.
use super::{CombatSession, TurnReport};
use crate::action::ActionIntent;
use crate::combat::AttackOutcome;
use crate::fighter::{ControlKind, Fighter, StatusEffect};
use crate::ids::FighterId;
use crate::narrative::{
    HealthStatus, Pacing, Performance, TurnOutcome, TurnSummary, VictorySummary,
};

/// Public attributes of the acting fighter, as given to the validator.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorProfile {
    pub id: FighterId,
    pub name: String,
    pub control: ControlKind,
    pub hp: u32,
    pub max_hp: u32,
    pub strength: i32,
    pub dexterity: i32,
    pub effects: Vec<StatusEffect>,
}

impl From<&Fighter> for ActorProfile {
    fn from(fighter: &Fighter) -> Self {
        Self {
            id: fighter.id,
            name: fighter.name.clone(),
            control: fighter.control,
            hp: fighter.hp(),
            max_hp: fighter.max_hp(),
            strength: fighter.strength,
            dexterity: fighter.dexterity,
            effects: fighter.effects().to_vec(),
        }
    }
}

/// `Name (hp/max) effects`, without trailing whitespace.
fn fighter_status(fighter: &Fighter) -> String {
    let effects = fighter.display_effects();
    if effects.is_empty() {
        format!("{} {}", fighter.name, fighter.display_hp())
    } else {
        format!("{} {} {}", fighter.name, fighter.display_hp(), effects)
    }
}

impl CombatSession {
    fn side(&self, control: ControlKind) -> impl Iterator<Item = &Fighter> {
        self.fighters.iter().filter(move |f| f.control == control)
    }

    /// One status line per player:
    /// `Name: (hp/max) effects - Round (n/projected) - vs. Enemy (hp/max) [A > B]`.
    pub fn status_lines(&self) -> Vec<String> {
        let projected = if self.projected_rounds == 0 {
            "?".to_string()
        } else {
            self.projected_rounds.to_string()
        };
        let round = format!("Round ({}/{})", self.round_number, projected);

        let enemies: Vec<String> = self.side(ControlKind::NonPlayer).map(fighter_status).collect();
        let versus = if enemies.is_empty() {
            "vs. no one".to_string()
        } else {
            format!("vs. {}", enemies.join(", "))
        };

        let order = self
            .turn_order
            .iter()
            .map(|id| self.name_of(*id))
            .collect::<Vec<_>>()
            .join(" > ");

        self.side(ControlKind::Player)
            .map(|player| {
                let effects = player.display_effects();
                let own = if effects.is_empty() {
                    format!("{}: {}", player.name, player.display_hp())
                } else {
                    format!("{}: {} {}", player.name, player.display_hp(), effects)
                };
                format!("{own} - {round} - {versus} [{order}]")
            })
            .collect()
    }

    /// Share of the enemies' starting hp already removed, 0–100.
    pub fn action_plot_percentage(&self) -> u32 {
        let (initial, remaining) = self.side(ControlKind::NonPlayer).fold(
            (0u64, 0u64),
            |(initial, remaining), enemy| {
                let start = self.initial_hp(enemy.id).unwrap_or(enemy.max_hp());
                (
                    initial + u64::from(start),
                    remaining + u64::from(enemy.hp().min(start)),
                )
            },
        );
        if initial == 0 {
            return 100;
        }
        ((initial - remaining) * 100 / initial) as u32
    }

    /// Elapsed share of the projected rounds, 0–100.
    pub fn round_percentage(&self) -> u32 {
        if self.projected_rounds == 0 {
            return 100;
        }
        (self.round_number.saturating_mul(100) / self.projected_rounds).min(100)
    }

    pub fn pacing(&self) -> Pacing {
        Pacing::from_progress(self.action_plot_percentage(), self.round_percentage())
    }

    /// Remaining hp share across every player.
    pub fn player_health(&self) -> HealthStatus {
        let (hp, max_hp) = self
            .side(ControlKind::Player)
            .fold((0u32, 0u32), |(hp, max), p| {
                (hp.saturating_add(p.hp()), max.saturating_add(p.max_hp()))
            });
        HealthStatus::from_hp(hp, max_hp)
    }

    pub fn performance(&self) -> Performance {
        Performance::from_history(&self.sentiment_history)
    }

    pub fn actor_profile(&self, actor: FighterId) -> Option<ActorProfile> {
        self.fighter(actor).map(ActorProfile::from)
    }

    /// Short situation summary handed to the validator with an action.
    pub fn combat_context(&self, actor: FighterId) -> String {
        let Some(me) = self.fighter(actor) else {
            return format!("Round {}.", self.round_number);
        };
        let opponent = me.control.opponent();
        let describe = |control: ControlKind| {
            let names: Vec<String> = self
                .fighters
                .iter()
                .filter(|f| f.id != actor && f.control == control && !f.is_defeated())
                .map(fighter_status)
                .collect();
            if names.is_empty() {
                "none".to_string()
            } else {
                names.join(", ")
            }
        };
        format!(
            "Round {} of about {}. Allies: {}. Opponents: {}.",
            self.round_number,
            self.projected_rounds,
            describe(me.control),
            describe(opponent)
        )
    }

    /// Summary of a resolved turn for the narrative generator.
    pub fn turn_summary(&self, report: &TurnReport) -> TurnSummary {
        let outcome = match (&report.action.intent, &report.attack) {
            (ActionIntent::Pass, _) => TurnOutcome::Pass,
            (_, None) => TurnOutcome::NoTarget,
            (_, Some(attack)) => match attack.outcome {
                AttackOutcome::Hit => TurnOutcome::Hit,
                AttackOutcome::Miss => TurnOutcome::Miss,
            },
        };
        TurnSummary {
            actor_name: self.name_of(report.actor),
            target_name: report.target.map(|id| self.name_of(id)),
            action_text: report.action.raw_text.clone(),
            sentiment: report.action.sentiment,
            roll_summary: report
                .attack
                .as_ref()
                .map(|a| a.roll_summary())
                .unwrap_or_default(),
            outcome,
            damage: report.attack.as_ref().map_or(0, |a| a.damage),
            pacing: report.pacing,
        }
    }

    /// End-of-encounter summary; `None` until the session has ended.
    pub fn victory_summary(&self) -> Option<VictorySummary> {
        let outcome = self.outcome?;
        Some(VictorySummary {
            outcome,
            winner: outcome.winner().to_string(),
            survivors: self
                .fighters
                .iter()
                .filter(|f| !f.is_defeated())
                .map(|f| f.name.clone())
                .collect(),
            total_rounds: self.round_number,
            player_health: self.player_health(),
            performance: self.performance(),
        })
    }
}
