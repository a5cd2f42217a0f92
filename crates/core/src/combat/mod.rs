//! Combat resolution.
//!
//! Pure functions for a single attack exchange. Nothing here looks at the
//! validator's verdict; the sentiment modifier does not enter any formula.
//!
//! # Core Functions
//!
//! - `resolve_attack`: complete attack resolution (hit check + damage)
//! - `defense_value` / `check_hit`: `d20 + STR` against `10 + DEX`
//! - `calculate_damage`: `1d8 + STR` for players, `1d6 + STR` otherwise
//! - `select_target`: named target or a uniform pick among opponents

pub mod damage;
pub mod hit;
pub mod result;
pub mod targeting;

pub use damage::{DamageDice, calculate_damage};
pub use hit::{attack_total, check_hit, defense_value};
pub use result::{AttackOutcome, AttackResult, resolve_attack};
pub use targeting::{eligible_targets, named_target, select_target};
