//! Attack resolution results.

use super::damage::{DamageDice, calculate_damage};
use super::hit::{attack_total, check_hit, defense_value};
use crate::dice::{Dice, roll_d20};
use crate::fighter::Fighter;
use crate::ids::FighterId;

/// Whether the attack connected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackOutcome {
    Hit,
    Miss,
}

/// Everything rolled during one attack.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackResult {
    pub attacker: FighterId,
    pub defender: FighterId,
    /// Natural d20 face.
    pub attack_die: u32,
    /// Attacker strength at the time of the roll.
    pub strength: i32,
    pub attack_total: i32,
    pub defense: i32,
    pub outcome: AttackOutcome,
    pub damage_dice: DamageDice,
    /// Damage dice total; `None` on a miss (no damage dice are rolled).
    pub damage_roll: Option<u32>,
    pub damage: u32,
}

impl AttackResult {
    pub fn is_hit(&self) -> bool {
        matches!(self.outcome, AttackOutcome::Hit)
    }

    /// Dice line shown to participants.
    ///
    /// `Attack: d20(12)+5=17 vs 15 | Damage: 1d8+5=9`
    pub fn roll_summary(&self) -> String {
        let attack = format!(
            "Attack: d20({}){:+}={} vs {}",
            self.attack_die, self.strength, self.attack_total, self.defense
        );
        match self.damage_roll {
            Some(roll) => format!(
                "{attack} | Damage: {}({}){:+}={}",
                self.damage_dice, roll, self.strength, self.damage
            ),
            None => format!("{attack} | Miss"),
        }
    }
}

/// Resolve one attack: `d20 + STR` vs `10 + DEX`, then damage on a hit.
///
/// Consumes one d20, plus the damage dice when the attack hits. Does not
/// mutate either fighter; the caller applies `damage`.
pub fn resolve_attack(
    attacker: &Fighter,
    defender: &Fighter,
    dice: &mut (impl Dice + ?Sized),
) -> AttackResult {
    let attack_die = roll_d20(dice);
    let total = attack_total(attack_die, attacker);
    let defense = defense_value(defender);
    let damage_dice = DamageDice::for_control(attacker.control);

    let (outcome, damage_roll, damage) = if check_hit(total, defense) {
        let roll = damage_dice.roll(dice);
        (
            AttackOutcome::Hit,
            Some(roll),
            calculate_damage(roll, attacker.strength),
        )
    } else {
        (AttackOutcome::Miss, None, 0)
    };

    AttackResult {
        attacker: attacker.id,
        defender: defender.id,
        attack_die,
        strength: attacker.strength,
        attack_total: total,
        defense,
        outcome,
        damage_dice,
        damage_roll,
        damage,
    }
}
