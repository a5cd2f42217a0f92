//! Damage dice and calculation.

use std::fmt;

use crate::dice::{Dice, roll_dice};
use crate::fighter::ControlKind;

/// Damage dice expression such as `1d8`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageDice {
    pub count: u32,
    pub sides: u32,
}

impl DamageDice {
    pub const PLAYER: Self = Self { count: 1, sides: 8 };
    pub const NON_PLAYER: Self = Self { count: 1, sides: 6 };

    /// Damage dice used by an attacker of the given control kind.
    pub const fn for_control(control: ControlKind) -> Self {
        match control {
            ControlKind::Player => Self::PLAYER,
            ControlKind::NonPlayer => Self::NON_PLAYER,
        }
    }

    pub fn roll(self, dice: &mut (impl Dice + ?Sized)) -> u32 {
        roll_dice(dice, self.count, self.sides)
    }
}

impl fmt::Display for DamageDice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)
    }
}

/// Damage from a dice total plus strength, never negative.
pub fn calculate_damage(dice_total: u32, strength: i32) -> u32 {
    (dice_total as i32 + strength).max(0) as u32
}
