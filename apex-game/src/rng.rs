//! Deterministic random streams, one per simulation domain.
use hmac::{Hmac, Mac};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sha2::Sha256;
use std::cell::{RefCell, RefMut};

/// Deterministic bundle of RNG streams segregated by simulation domain.
///
/// Each domain draws from its own stream, so adding a roll to one session type
/// never shifts the outcomes of another.
#[derive(Debug, Clone)]
pub struct RngBundle {
    practice: RefCell<CountingRng<SmallRng>>,
    qualifying: RefCell<CountingRng<SmallRng>>,
    race: RefCell<CountingRng<SmallRng>>,
    finish: RefCell<CountingRng<SmallRng>>,
    decision: RefCell<CountingRng<SmallRng>>,
}

impl RngBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            practice: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"practice"))),
            qualifying: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"qualifying"))),
            race: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"race"))),
            finish: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"finish"))),
            decision: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"decision"))),
        }
    }

    /// Practice boost rolls.
    #[must_use]
    pub fn practice(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.practice.borrow_mut()
    }

    /// Lap time and sector jitter.
    #[must_use]
    pub fn qualifying(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.qualifying.borrow_mut()
    }

    /// Per-lap position rolls.
    #[must_use]
    pub fn race(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.race.borrow_mut()
    }

    /// Driver-of-the-day roll at the flag.
    #[must_use]
    pub fn finish(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.finish.borrow_mut()
    }

    /// Post-race decision draw.
    #[must_use]
    pub fn decision(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.decision.borrow_mut()
    }
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<SmallRng> {
    fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: rand::RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: rand::RngCore> rand::RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

/// Uniform roll in `[0, 1)`.
pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.r#gen::<f64>()
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    // HMAC accepts keys of any length, so the error arm is unreachable in practice.
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}
