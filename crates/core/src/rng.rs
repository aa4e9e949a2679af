//! RNG module - shape selection for newly spawned pieces
//!
//! Spawning never reaches for ambient randomness. Every operation that needs a
//! new piece takes a [`ShapeChooser`], so games can be replayed exactly:
//!
//! - [`ThreadRngChooser`]: uniform over the 7 kinds, backed by `rand::thread_rng`
//! - [`SimpleRng`]: seeded LCG, uniform and deterministic per seed
//! - [`ScriptedChooser`]: replays a fixed sequence (tests, replays)

use rand::Rng;

use crate::types::PieceKind;

/// Source of piece kinds for newly spawned pieces
pub trait ShapeChooser {
    fn choose(&mut self) -> PieceKind;
}

impl<C: ShapeChooser + ?Sized> ShapeChooser for Box<C> {
    fn choose(&mut self) -> PieceKind {
        (**self).choose()
    }
}

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        // LCG low bits cycle with short periods; use the high half.
        (self.next_u32() >> 16) % max
    }

    /// Current internal state (usable as a seed to resume the sequence)
    pub fn state(&self) -> u32 {
        self.state
    }
}

impl ShapeChooser for SimpleRng {
    fn choose(&mut self) -> PieceKind {
        PieceKind::ALL[self.next_range(PieceKind::ALL.len() as u32) as usize]
    }
}

/// Uniform chooser backed by the thread-local OS-seeded generator
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngChooser;

impl ShapeChooser for ThreadRngChooser {
    fn choose(&mut self) -> PieceKind {
        PieceKind::ALL[rand::thread_rng().gen_range(0..PieceKind::ALL.len())]
    }
}

/// Replays a fixed sequence of kinds, wrapping around at the end
#[derive(Debug, Clone)]
pub struct ScriptedChooser {
    script: Vec<PieceKind>,
    cursor: usize,
}

impl ScriptedChooser {
    /// Returns None for an empty script.
    pub fn new(script: impl Into<Vec<PieceKind>>) -> Option<Self> {
        let script = script.into();
        if script.is_empty() {
            return None;
        }
        Some(Self { script, cursor: 0 })
    }

    /// A chooser that always yields `kind`
    pub fn repeat(kind: PieceKind) -> Self {
        Self {
            script: vec![kind],
            cursor: 0,
        }
    }

    /// How many kinds have been handed out so far
    pub fn drawn(&self) -> usize {
        self.cursor
    }
}

impl ShapeChooser for ScriptedChooser {
    fn choose(&mut self) -> PieceKind {
        let kind = self.script[self.cursor % self.script.len()];
        self.cursor += 1;
        kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);

        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_rng_different_seeds() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(54321);

        assert_ne!(rng1.next_u32(), rng2.next_u32());
    }

    #[test]
    fn test_zero_seed_is_remapped() {
        assert_eq!(SimpleRng::new(0).state(), 1);
    }

    #[test]
    fn test_simple_rng_covers_every_kind() {
        let mut rng = SimpleRng::new(7);
        let mut seen = [false; 7];
        for _ in 0..700 {
            seen[rng.choose().index()] = true;
        }
        assert!(seen.iter().all(|&s| s), "seen: {:?}", seen);
    }

    #[test]
    fn test_thread_chooser_yields_known_kinds() {
        let mut chooser = ThreadRngChooser;
        for _ in 0..50 {
            assert!(PieceKind::ALL.contains(&chooser.choose()));
        }
    }

    #[test]
    fn test_scripted_chooser_wraps() {
        let mut chooser = ScriptedChooser::new([PieceKind::I, PieceKind::O]).unwrap();
        assert_eq!(chooser.choose(), PieceKind::I);
        assert_eq!(chooser.choose(), PieceKind::O);
        assert_eq!(chooser.choose(), PieceKind::I);
        assert_eq!(chooser.drawn(), 3);
    }

    #[test]
    fn test_scripted_chooser_rejects_empty_script() {
        assert!(ScriptedChooser::new(Vec::new()).is_none());
    }
}
