//! Deterministic combat rules shared by the runtime and offline tools.
//!
//! `combat-core` defines fighters, actions, dice, initiative, attack
//! resolution and the [`CombatSession`] state machine. Everything here is
//! synchronous and free of I/O; randomness enters only through a [`Dice`]
//! source supplied by the caller. All session mutation flows through
//! [`CombatSession`], and the runtime crate depends on the types re-exported
//! here.
pub mod action;
pub mod combat;
pub mod config;
pub mod dice;
pub mod error;
pub mod fighter;
pub mod ids;
pub mod initiative;
pub mod narrative;
pub mod session;

pub use action::{
    Action, ActionIntent, ActionOrigin, Classification, Sentiment, Validation,
};
pub use combat::{
    AttackOutcome, AttackResult, DamageDice, calculate_damage, check_hit, defense_value,
    resolve_attack, select_target,
};
pub use config::CombatConfig;
pub use dice::{Dice, FixedRolls, PcgDice, roll_d20, roll_dice};
pub use error::{Rejection, SessionError};
pub use fighter::{ControlKind, DamageApplied, Fighter, StatusEffect};
pub use ids::{FighterId, LocationId, SessionId};
pub use initiative::{InitiativeRoll, rank};
pub use narrative::{
    HealthStatus, Pacing, Performance, TurnOutcome, TurnSummary, VictorySummary,
};
pub use session::{
    ActorProfile, Announcement, Audience, CombatEvent, CombatSession, EncounterOutcome,
    SessionStatus, TurnReport,
};
