//! Per-participant combat state.
//!
//! A [`Fighter`] is a snapshot of a character taken when it joins an
//! encounter. All fields are explicit; hp is kept inside `[0, max_hp]` by
//! every mutating method.
use crate::ids::FighterId;

/// Who decides a fighter's actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ControlKind {
    /// Acts through submitted free text; subject to the turn timeout.
    Player,
    /// Acts automatically the moment its turn starts.
    NonPlayer,
}

impl ControlKind {
    /// The side this fighter attacks.
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::NonPlayer,
            Self::NonPlayer => Self::Player,
        }
    }
}

/// Display-only conditions on a fighter.
///
/// Effects are carried for status lines and validator context; the rules
/// never branch on them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum StatusEffect {
    Poisoned,
    Stunned,
    Bleeding,
    Burning,
    Weakened,
    Shielded,
    Hasted,
    Frightened,
}

/// Combat participant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fighter {
    pub id: FighterId,
    pub name: String,
    pub control: ControlKind,
    hp: u32,
    max_hp: u32,
    pub strength: i32,
    pub dexterity: i32,
    effects: Vec<StatusEffect>,
}

/// Result of a single damage application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageApplied {
    pub amount: u32,
    pub hp_after: u32,
    /// True when this application left the fighter at 0 hp.
    pub defeated: bool,
}

impl Fighter {
    /// Creates a fighter at full health with no effects.
    pub fn new(id: FighterId, name: impl Into<String>, control: ControlKind, max_hp: u32) -> Self {
        Self {
            id,
            name: name.into(),
            control,
            hp: max_hp,
            max_hp,
            strength: 0,
            dexterity: 0,
            effects: Vec::new(),
        }
    }

    pub fn player(id: FighterId, name: impl Into<String>, max_hp: u32) -> Self {
        Self::new(id, name, ControlKind::Player, max_hp)
    }

    pub fn non_player(id: FighterId, name: impl Into<String>, max_hp: u32) -> Self {
        Self::new(id, name, ControlKind::NonPlayer, max_hp)
    }

    pub fn with_attributes(mut self, strength: i32, dexterity: i32) -> Self {
        self.strength = strength;
        self.dexterity = dexterity;
        self
    }

    /// Sets current hp, clamped to `[0, max_hp]`.
    pub fn with_hp(mut self, hp: u32) -> Self {
        self.hp = hp.min(self.max_hp);
        self
    }

    pub fn with_effect(mut self, effect: StatusEffect) -> Self {
        self.add_effect(effect);
        self
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    pub fn is_player(&self) -> bool {
        matches!(self.control, ControlKind::Player)
    }

    pub fn is_defeated(&self) -> bool {
        self.hp == 0
    }

    /// Reduces hp by `amount`, saturating at zero.
    pub fn apply_damage(&mut self, amount: u32) -> DamageApplied {
        self.hp = self.hp.saturating_sub(amount);
        DamageApplied {
            amount,
            hp_after: self.hp,
            defeated: self.is_defeated(),
        }
    }

    pub fn effects(&self) -> &[StatusEffect] {
        &self.effects
    }

    /// Adds an effect once; insertion order is kept for display.
    pub fn add_effect(&mut self, effect: StatusEffect) -> bool {
        if self.effects.contains(&effect) {
            return false;
        }
        self.effects.push(effect);
        true
    }

    pub fn remove_effect(&mut self, effect: StatusEffect) -> bool {
        let before = self.effects.len();
        self.effects.retain(|e| *e != effect);
        before != self.effects.len()
    }

    /// `(hp/max_hp)` as shown in status lines.
    pub fn display_hp(&self) -> String {
        format!("({}/{})", self.hp, self.max_hp)
    }

    /// Comma-separated effect names, empty when there are none.
    pub fn display_effects(&self) -> String {
        self.effects
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goblin() -> Fighter {
        Fighter::non_player(FighterId(7), "Goblin", 30).with_attributes(2, 3)
    }

    #[test]
    fn apply_damage_clamps_at_zero() {
        for amount in [0u32, 1, 29, 30, 31, 500, u32::MAX] {
            let mut fighter = goblin();
            let applied = fighter.apply_damage(amount);
            assert_eq!(fighter.hp(), 30u32.saturating_sub(amount));
            assert_eq!(applied.hp_after, fighter.hp());
            assert_eq!(applied.defeated, fighter.hp() == 0);
        }
    }

    #[test]
    fn defeated_fighter_reports_defeat_on_every_application() {
        let mut fighter = goblin().with_hp(4);
        assert!(fighter.apply_damage(4).defeated);
        assert!(fighter.apply_damage(3).defeated);
        assert_eq!(fighter.hp(), 0);
    }

    #[test]
    fn hp_never_exceeds_max() {
        let mut fighter = goblin().with_hp(500);
        assert_eq!(fighter.hp(), 30);

        assert_eq!(fighter.apply_damage(10).hp_after, 20);
        assert!(fighter.hp() <= fighter.max_hp());
    }

    #[test]
    fn effects_are_a_set_in_insertion_order() {
        let mut fighter = goblin();
        assert!(fighter.add_effect(StatusEffect::Poisoned));
        assert!(fighter.add_effect(StatusEffect::Stunned));
        assert!(!fighter.add_effect(StatusEffect::Poisoned));
        assert_eq!(fighter.display_effects(), "Poisoned, Stunned");

        assert!(fighter.remove_effect(StatusEffect::Poisoned));
        assert_eq!(fighter.effects(), &[StatusEffect::Stunned]);
    }

    #[test]
    fn opponents_are_the_other_control_kind() {
        assert_eq!(ControlKind::Player.opponent(), ControlKind::NonPlayer);
        assert_eq!(ControlKind::NonPlayer.opponent(), ControlKind::Player);
    }
}
