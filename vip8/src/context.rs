//! Context for accessing functionalities of the platform that `Vip8` is
//! emulated on.
//!
//! The engine never reaches for a global generator or an audio device on its
//! own; everything with a side effect outside of the machine state goes
//! through this trait.

use nanorand::{rand::pcg64::Pcg64 as Rng, RNG};

/// Trait aggregating platform functionalities
pub trait Context {
    /// Generate random 8-bit number
    ///
    /// Called by `tick_chip` whenever requested by executing program
    fn gen_random(&mut self) -> u8;
    /// Turn sound on
    ///
    /// Called by `tick_timers` on every tick the sound timer keeps running
    fn sound_on(&mut self) {}
    /// Turn sound off
    ///
    /// Called by `tick_timers` when sound timer reaches zero
    fn sound_off(&mut self) {}
}

/// Silent context with a seedable PCG64 random source
///
/// Two contexts created with the same seed produce the same sequence, so a
/// program using `CXNN` replays deterministically.
pub struct SeededContext {
    rng: Rng,
}

impl SeededContext {
    pub fn new(seed: u128) -> Self {
        Self {
            rng: Rng::new_seed(seed),
        }
    }
}

impl Context for SeededContext {
    fn gen_random(&mut self) -> u8 {
        self.rng.generate::<u8>()
    }
}
