//! Initiative ranking, run once when an encounter starts.
use crate::dice::{Dice, roll_d20};
use crate::fighter::Fighter;
use crate::ids::FighterId;

/// One fighter's initiative result.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InitiativeRoll {
    pub fighter: FighterId,
    /// Natural d20 face.
    pub die: u32,
    /// `die + dexterity`.
    pub total: i32,
}

/// Rank fighters by `d20 + dexterity`, highest first.
///
/// Dice are consumed in join order (one d20 per fighter). Ties keep join
/// order because the sort is stable.
pub fn rank(fighters: &[Fighter], dice: &mut (impl Dice + ?Sized)) -> Vec<InitiativeRoll> {
    let mut rolls: Vec<InitiativeRoll> = fighters
        .iter()
        .map(|fighter| {
            let die = roll_d20(dice);
            InitiativeRoll {
                fighter: fighter.id,
                die,
                total: die as i32 + fighter.dexterity,
            }
        })
        .collect();

    rolls.sort_by(|a, b| b.total.cmp(&a.total));
    rolls
}
