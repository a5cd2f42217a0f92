//! Attack and defense values.

use crate::config::CombatConfig;
use crate::fighter::Fighter;

/// Attack total: natural d20 plus the attacker's strength.
pub fn attack_total(die: u32, attacker: &Fighter) -> i32 {
    die as i32 + attacker.strength
}

/// Static defense: `10 + dexterity`.
pub fn defense_value(defender: &Fighter) -> i32 {
    CombatConfig::DEFENSE_BASE + defender.dexterity
}

/// An attack hits when it meets or beats the defense.
pub fn check_hit(attack_total: i32, defense: i32) -> bool {
    attack_total >= defense
}
