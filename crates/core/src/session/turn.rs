//! Turn loop: submissions, timer ticks and advancement.
use super::{CombatEvent, CombatSession, EncounterOutcome, SessionStatus, TurnReport};
use crate::action::{Action, ActionIntent, ActionOrigin, Validation};
use crate::combat::{named_target, resolve_attack, select_target};
use crate::dice::Dice;
use crate::error::Rejection;
use crate::fighter::ControlKind;
use crate::ids::FighterId;

impl CombatSession {
    /// Checks whether `actor` may submit `text` right now.
    ///
    /// Checks run in a fixed order so the participant always gets the most
    /// relevant reason.
    pub fn check_submission(&self, actor: FighterId, text: &str) -> Result<(), Rejection> {
        if !self.is_active() || !self.contains(actor) {
            return Err(Rejection::NotInCombat);
        }
        if self.pending_action(actor).is_some() {
            return Err(Rejection::AlreadyActed);
        }
        if self.current_actor() != Some(actor) {
            return Err(Rejection::NotYourTurn);
        }
        if text.trim().is_empty() {
            return Err(Rejection::EmptyAction);
        }
        Ok(())
    }

    /// False for the pass keyword, which never goes to the validator.
    pub fn needs_validation(&self, text: &str) -> bool {
        !Action::is_pass_text(text)
    }

    /// Interprets free text as a mechanical intent.
    pub fn parse_intent(&self, actor: FighterId, text: &str) -> ActionIntent {
        if Action::is_pass_text(text) {
            return ActionIntent::Pass;
        }
        let target = self
            .fighter(actor)
            .and_then(|fighter| named_target(text, fighter, &self.fighters));
        ActionIntent::Attack { target }
    }

    /// Records and resolves the current player's action, then advances.
    ///
    /// A verdict other than `Acceptable` refuses the action; the turn and
    /// its timer keep running. On any rejection the session is unchanged.
    pub fn submit_action(
        &mut self,
        actor: FighterId,
        text: &str,
        validation: Validation,
        dice: &mut (impl Dice + ?Sized),
    ) -> Result<Vec<CombatEvent>, Rejection> {
        self.check_submission(actor, text)?;

        let text = text.trim();
        let intent = self.parse_intent(actor, text);
        if intent != ActionIntent::Pass && !validation.is_acceptable() {
            return Err(Rejection::Refused {
                classification: validation.classification,
                feedback: validation.refusal_feedback(),
            });
        }

        let action = Action::submitted(actor, text, intent, validation);
        let mut events = vec![CombatEvent::ActionRecorded {
            fighter: actor,
            text: action.raw_text.clone(),
            feedback: action.feedback.clone(),
        }];
        self.resolve_turn(action, dice, &mut events);
        self.advance(&mut events);
        self.drive(dice, &mut events);
        Ok(events)
    }

    /// One scheduler tick.
    ///
    /// Only counts down while a living player holds the turn without having
    /// acted. Warns once at the threshold; at zero a neutral pass is forced.
    pub fn tick(&mut self, dice: &mut (impl Dice + ?Sized)) -> Vec<CombatEvent> {
        let mut events = Vec::new();
        let Some(actor) = self.current_actor() else {
            return events;
        };
        let waiting = self
            .fighter(actor)
            .is_some_and(|f| f.is_player() && !f.is_defeated());
        if !waiting || self.pending_action(actor).is_some() {
            return events;
        }

        self.turn_timer -= to_timer(self.config.tick_amount);

        if self.turn_timer <= 0 {
            tracing::debug!(
                target: "combat::session",
                session = %self.id,
                fighter = %actor,
                "turn timed out"
            );
            events.push(CombatEvent::TurnTimedOut { fighter: actor });
            self.resolve_turn(Action::timed_out(actor), dice, &mut events);
            self.advance(&mut events);
            self.drive(dice, &mut events);
        } else if self.turn_timer <= to_timer(self.config.warning_threshold)
            && !self.timeout_warning_given
        {
            self.timeout_warning_given = true;
            events.push(CombatEvent::TimeoutWarning {
                fighter: actor,
                remaining: self.turn_timer.unsigned_abs(),
            });
        }
        events
    }

    /// Opens turns until a player has to act or combat ends.
    pub(super) fn drive(&mut self, dice: &mut (impl Dice + ?Sized), events: &mut Vec<CombatEvent>) {
        while self.is_active() {
            if !self.open_turn(dice, events) {
                return;
            }
            self.advance(events);
        }
    }

    /// Starts the turn at the current index.
    ///
    /// Returns `true` when the turn finished on its own (skipped, resolved
    /// automatically, or combat ended) and `false` when a player must act.
    pub(super) fn open_turn(
        &mut self,
        dice: &mut (impl Dice + ?Sized),
        events: &mut Vec<CombatEvent>,
    ) -> bool {
        let Some(actor_id) = self.turn_order.get(self.current_turn_index).copied() else {
            self.end(EncounterOutcome::NoneStanding, events);
            return true;
        };

        self.turn_timer = to_timer(self.config.turn_timeout);
        self.timeout_warning_given = false;

        let Some(actor) = self.fighter(actor_id) else {
            self.end(EncounterOutcome::NoneStanding, events);
            return true;
        };
        if actor.is_defeated() {
            events.push(CombatEvent::TurnSkipped { fighter: actor_id });
            return true;
        }

        let control = actor.control;
        events.push(CombatEvent::TurnStarted {
            fighter: actor_id,
            control,
        });
        match control {
            ControlKind::Player => false,
            ControlKind::NonPlayer => {
                self.resolve_turn(Action::automatic(actor_id), dice, events);
                true
            }
        }
    }

    /// Victory check, then moves to the next turn, wrapping into a new round.
    pub(super) fn advance(&mut self, events: &mut Vec<CombatEvent>) {
        if !self.is_active() {
            return;
        }
        if let Some(outcome) = self.victory_check() {
            self.end(outcome, events);
            return;
        }

        self.current_turn_index += 1;
        if self.current_turn_index >= self.turn_order.len() {
            events.push(CombatEvent::RoundEnded {
                round: self.round_number,
            });
            self.open_round(events);
        }
    }

    pub(super) fn open_round(&mut self, events: &mut Vec<CombatEvent>) {
        self.round_number += 1;
        self.current_turn_index = 0;
        self.pending_actions.clear();
        events.push(CombatEvent::RoundStarted {
            round: self.round_number,
            status_lines: self.status_lines(),
        });
    }

    fn victory_check(&self) -> Option<EncounterOutcome> {
        let standing = |control: ControlKind| {
            self.fighters
                .iter()
                .any(|f| f.control == control && !f.is_defeated())
        };
        if !standing(ControlKind::Player) {
            Some(EncounterOutcome::PlayersDefeated)
        } else if !standing(ControlKind::NonPlayer) {
            Some(EncounterOutcome::EnemiesDefeated)
        } else {
            None
        }
    }

    fn end(&mut self, outcome: EncounterOutcome, events: &mut Vec<CombatEvent>) {
        self.status = SessionStatus::Ended;
        self.outcome = Some(outcome);
        self.pending_actions.clear();
        tracing::info!(
            target: "combat::session",
            session = %self.id,
            ?outcome,
            rounds = self.round_number,
            "combat ended"
        );
        events.push(CombatEvent::CombatEnded { outcome });
    }

    /// Applies one action: target selection, attack roll, damage.
    fn resolve_turn(
        &mut self,
        action: Action,
        dice: &mut (impl Dice + ?Sized),
        events: &mut Vec<CombatEvent>,
    ) {
        let actor_id = action.actor;
        let Some(actor) = self.fighter(actor_id).cloned() else {
            return;
        };

        let (target, attack) = match action.intent {
            ActionIntent::Pass => (None, None),
            ActionIntent::Attack { target } => {
                let defender = select_target(&actor, &self.fighters, target, dice)
                    .and_then(|id| self.fighter(id));
                match defender {
                    Some(defender) => (
                        Some(defender.id),
                        Some(resolve_attack(&actor, defender, dice)),
                    ),
                    None => (None, None),
                }
            }
        };

        let mut target_hp_after = None;
        let mut defeated = None;
        if let Some(result) = attack.as_ref().filter(|r| r.is_hit())
            && let Some(defender) = self.fighter_mut(result.defender)
        {
            let applied = defender.apply_damage(result.damage);
            target_hp_after = Some(applied.hp_after);
            if applied.defeated {
                defeated = Some(defender.id);
            }
        } else if let Some(id) = target {
            target_hp_after = self.fighter(id).map(|f| f.hp());
        }

        if actor.is_player() && action.origin == ActionOrigin::Submitted && !action.is_pass() {
            self.sentiment_history.push(action.sentiment);
        }
        self.pending_actions.push(action.clone());

        events.push(CombatEvent::TurnResolved(TurnReport {
            actor: actor_id,
            action,
            target,
            attack,
            target_hp_after,
            pacing: self.pacing(),
        }));
        if let Some(fighter) = defeated {
            events.push(CombatEvent::FighterDefeated { fighter });
        }
    }
}

fn to_timer(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
