//! Fighters for the demo arena.
use combat_core::{Fighter, FighterId, LocationId, StatusEffect};
use combat_runtime::ScriptedWorld;
use rand::Rng;
use rand::seq::SliceRandom;

pub const ARENA: LocationId = LocationId(1);
pub const PLAYER: FighterId = FighterId(1);

const OPPONENT_NAMES: &[&str] = &[
    "Goblin", "Kobold", "Bandit", "Skeleton", "Cultist", "Wolf", "Orc", "Ghoul",
];

/// Place the player and `opponents` randomly rolled enemies in the arena.
pub fn populate(player_name: &str, opponents: usize) -> ScriptedWorld {
    let mut rng = rand::thread_rng();
    let world = ScriptedWorld::new();

    world.place(ARENA, Fighter::player(PLAYER, player_name, 40).with_attributes(3, 2));

    let mut names = OPPONENT_NAMES.to_vec();
    names.shuffle(&mut rng);
    for (index, name) in names.into_iter().cycle().take(opponents).enumerate() {
        let id = FighterId(100 + index as u32);
        let hp = rng.gen_range(8..=20);
        let mut fighter = Fighter::non_player(id, name, hp)
            .with_attributes(rng.gen_range(0..=3), rng.gen_range(0..=2));
        if rng.gen_bool(0.2) {
            fighter = fighter.with_effect(StatusEffect::Hasted);
        }
        world.place(ARENA, fighter);
    }

    world
}
