//! Dice sources for every random decision in combat.
//!
//! All randomness (initiative, projected rounds, target picks, attack and
//! damage rolls) flows through a [`Dice`] implementation passed in by the
//! caller, so the rules stay deterministic under a fixed source.
//!
//! - [`PcgDice`]: seeded PCG stream; serializable so a persisted session
//!   resumes the exact same sequence after a restart.
//! - [`FixedRolls`]: replays a scripted list of die faces.

/// Source of dice rolls.
pub trait Dice {
    /// Next raw 32-bit value.
    fn next_u32(&mut self) -> u32;

    /// Roll a die with `sides` faces (1..=sides). Zero sides rolls 0.
    fn roll_die(&mut self, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        (self.next_u32() % sides) + 1
    }

    /// Uniform value in `[min, max]` inclusive.
    fn range(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        min + self.roll_die(max - min + 1) - 1
    }

    /// Uniform index into a collection of `len` elements.
    ///
    /// Returns `None` for an empty collection. A single candidate is chosen
    /// without consuming a roll.
    fn pick(&mut self, len: usize) -> Option<usize> {
        match len {
            0 => None,
            1 => Some(0),
            _ => Some((self.roll_die(len as u32) - 1) as usize),
        }
    }
}

/// Rolls a 20-sided die.
pub fn roll_d20(dice: &mut (impl Dice + ?Sized)) -> u32 {
    dice.roll_die(20)
}

/// Sums `count` dice of `sides` faces.
pub fn roll_dice(dice: &mut (impl Dice + ?Sized), count: u32, sides: u32) -> u32 {
    (0..count).map(|_| dice.roll_die(sides)).sum()
}

/// Seeded PCG dice (PCG-XSH-RR output over a SplitMix-style mixed state).
///
/// Each roll is a pure function of `(seed, cursor)`; persisting both is
/// enough to continue the stream exactly where it stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PcgDice {
    seed: u64,
    cursor: u64,
}

impl PcgDice {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        Self { seed, cursor: 0 }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of values drawn so far.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Mix seed and cursor so consecutive cursors land far apart.
    fn mix(seed: u64, cursor: u64) -> u64 {
        let mut hash = seed ^ cursor.wrapping_mul(0x9e3779b97f4a7c15);
        hash ^= hash >> 33;
        hash = hash.wrapping_mul(0xff51afd7ed558ccd);
        hash ^= hash >> 33;
        hash
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let state = state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl Dice for PcgDice {
    fn next_u32(&mut self) -> u32 {
        let value = Self::pcg_output(Self::mix(self.seed, self.cursor));
        self.cursor = self.cursor.wrapping_add(1);
        value
    }
}

/// Scripted dice for tests and replays.
///
/// Every roll returns the next scripted face (clamped to the die), cycling
/// when the script runs out. An empty script always rolls 1.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FixedRolls {
    faces: Vec<u32>,
    position: usize,
}

impl FixedRolls {
    pub fn new(faces: impl Into<Vec<u32>>) -> Self {
        Self {
            faces: faces.into(),
            position: 0,
        }
    }

    /// Faces consumed so far.
    pub fn consumed(&self) -> usize {
        self.position
    }

    fn next_face(&mut self) -> u32 {
        if self.faces.is_empty() {
            return 1;
        }
        let face = self.faces[self.position % self.faces.len()];
        self.position += 1;
        face
    }
}

impl Dice for FixedRolls {
    fn next_u32(&mut self) -> u32 {
        self.next_face()
    }

    fn roll_die(&mut self, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        self.next_face().clamp(1, sides)
    }
}
