//! Target selection.

use crate::dice::Dice;
use crate::fighter::Fighter;
use crate::ids::FighterId;

/// Opposing, non-defeated fighters in join order.
pub fn eligible_targets<'a>(attacker: &Fighter, fighters: &'a [Fighter]) -> Vec<&'a Fighter> {
    let opponent = attacker.control.opponent();
    fighters
        .iter()
        .filter(|f| f.id != attacker.id && f.control == opponent && !f.is_defeated())
        .collect()
}

/// Eligible target whose name appears in `text` (case-insensitive).
///
/// The longest matching name wins so "Orc Chief" beats "Orc"; equal lengths
/// keep join order.
pub fn named_target(text: &str, attacker: &Fighter, fighters: &[Fighter]) -> Option<FighterId> {
    let text = text.to_lowercase();
    let mut best: Option<&Fighter> = None;
    for candidate in eligible_targets(attacker, fighters) {
        let name = candidate.name.trim().to_lowercase();
        if name.is_empty() || !text.contains(&name) {
            continue;
        }
        if best.is_none_or(|b| candidate.name.trim().len() > b.name.trim().len()) {
            best = Some(candidate);
        }
    }
    best.map(|f| f.id)
}

/// Resolve the defender for an attack.
///
/// Keeps `requested` when it is still eligible; otherwise picks uniformly
/// among eligible targets. `None` means nobody is left to attack.
pub fn select_target(
    attacker: &Fighter,
    fighters: &[Fighter],
    requested: Option<FighterId>,
    dice: &mut (impl Dice + ?Sized),
) -> Option<FighterId> {
    let targets = eligible_targets(attacker, fighters);
    if let Some(requested) = requested
        && targets.iter().any(|f| f.id == requested)
    {
        return Some(requested);
    }
    dice.pick(targets.len()).map(|index| targets[index].id)
}
