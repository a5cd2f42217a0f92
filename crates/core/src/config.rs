/// Combat timing constants and tunable parameters.
///
/// Time values are abstract "time units"; the runtime maps one unit to one
/// wall-clock second when it drives the scheduler.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatConfig {
    /// Time a player-controlled fighter has to submit an action.
    pub turn_timeout: u32,
    /// Remaining time at which the acting player receives a single warning.
    pub warning_threshold: u32,
    /// Time removed from the turn timer by each scheduler tick.
    pub tick_amount: u32,
}

impl CombatConfig {
    // ===== fixed rules =====
    /// Fewest fighters that can start an encounter.
    pub const MIN_FIGHTERS: usize = 2;
    /// Base of the defense value (`10 + dexterity`).
    pub const DEFENSE_BASE: i32 = 10;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_TURN_TIMEOUT: u32 = 60;
    pub const DEFAULT_WARNING_THRESHOLD: u32 = 15;
    pub const DEFAULT_TICK_AMOUNT: u32 = 5;

    pub fn new() -> Self {
        Self {
            turn_timeout: Self::DEFAULT_TURN_TIMEOUT,
            warning_threshold: Self::DEFAULT_WARNING_THRESHOLD,
            tick_amount: Self::DEFAULT_TICK_AMOUNT,
        }
    }

    pub fn with_turn_timeout(mut self, turn_timeout: u32) -> Self {
        self.turn_timeout = turn_timeout;
        self
    }

    pub fn with_warning_threshold(mut self, warning_threshold: u32) -> Self {
        self.warning_threshold = warning_threshold;
        self
    }

    /// Tick amounts below one would stall timeouts forever.
    pub fn with_tick_amount(mut self, tick_amount: u32) -> Self {
        self.tick_amount = tick_amount.max(1);
        self
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
