#![allow(dead_code)]

use std::time::Duration;

use combat_core::{CombatConfig, Fighter, FighterId, LocationId};
use combat_runtime::{Event, MessageEvent, RuntimeConfig, ScriptedWorld};
use tokio::sync::broadcast::{self, error::TryRecvError};

pub const ARENA: LocationId = LocationId(1);
pub const ARIA: FighterId = FighterId(1);
pub const BRAM: FighterId = FighterId(2);
pub const ORC: FighterId = FighterId(10);

/// Manual ticking and a short turn timer.
pub fn manual_config() -> RuntimeConfig {
    RuntimeConfig {
        combat: CombatConfig::new()
            .with_turn_timeout(10)
            .with_warning_threshold(5)
            .with_tick_amount(5),
        tick_interval: None,
        service_timeout: Duration::from_millis(200),
        ..RuntimeConfig::default()
    }
}

pub fn duel_world(player_hp: u32, orc_hp: u32) -> ScriptedWorld {
    ScriptedWorld::new()
        .with_fighter(ARENA, Fighter::player(ARIA, "Aria", player_hp).with_attributes(5, 2))
        .with_fighter(ARENA, Fighter::non_player(ORC, "Orc", orc_hp).with_attributes(3, 1))
}

/// Messages already published, in order.
pub fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<MessageEvent> {
    let mut messages = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(Event::Message(message)) => messages.push(message),
            Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty | TryRecvError::Closed) => return messages,
        }
    }
}

pub fn texts_for(messages: &[MessageEvent], recipient: FighterId) -> Vec<String> {
    messages
        .iter()
        .filter(|m| m.recipient == recipient)
        .map(|m| m.text.clone())
        .collect()
}
