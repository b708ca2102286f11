use std::{
    sync::{Mutex, PoisonError},
    time::SystemTime,
};

#[cfg(feature = "rand")]
use rand::{rngs::StdRng, Rng as _, SeedableRng as _}; // cspell:disable-line
use tracing::{trace, warn};

use crate::{Error, Ulid, RANDOM_LEN, TIME_ENCODABLE_MAX};

/// Source of the current time for a [`Generator`].
///
/// # Example
///
/// ```
/// struct FrozenClock(u64);
///
/// impl crock_ulid::Clock for FrozenClock {
///     fn now_millis(&self) -> Option<u64> {
///         Some(self.0)
///     }
/// }
/// ```
pub trait Clock: Send + Sync {
    /// Returns the current timestamp in milliseconds since the Unix epoch.
    fn now_millis(&self) -> Option<u64>;
}

/// Source of random Base32 digits for a [`Generator`].
///
/// The random part of a ULID is its only defense against collisions, so
/// implementations should be backed by a cryptographically strong generator.
pub trait RandomSource: Send {
    /// Fills `digits` with independent, uniformly distributed values in `0..32`.
    fn fill_digits(&mut self, digits: &mut [u8]);
}

/// Wall clock backed by [`SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> Option<u64> {
        let since_epoch = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).ok()?;
        u64::try_from(since_epoch.as_millis()).ok()
    }
}

/// Random digits from [`StdRng`], seeded from the operating system on first use.
#[cfg(feature = "rand")]
#[derive(Debug, Default)]
pub struct StdRandom {
    rng: Option<StdRng>,
}

#[cfg(feature = "rand")]
impl StdRandom {
    /// Creates a source which seeds its [`StdRng`] on the first draw.
    #[must_use]
    pub const fn new() -> Self {
        Self { rng: None }
    }
}

#[cfg(feature = "rand")]
impl RandomSource for StdRandom {
    fn fill_digits(&mut self, digits: &mut [u8]) {
        let rng = self.rng.get_or_insert_with(StdRng::from_entropy);
        for digit in digits {
            *digit = rng.gen_range(0..32);
        }
    }
}

struct State<R> {
    random: R,
    last_timestamp: Option<u64>,
    last_digits: [u8; RANDOM_LEN],
}

/// Issues ULIDs which are strictly increasing within one generator.
///
/// When a ULID is requested for the same millisecond as the previous one, the previous
/// random digits are incremented by one instead of drawing new ones.
///
/// A `Generator` can be shared between threads; every generation step runs under a lock.
///
/// # Example
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use crock_ulid::Generator;
///
/// let generator = Generator::new();
///
/// let u1 = generator.generate_with_timestamp(1_593_048_767_015, false)?;
/// let u2 = generator.generate_with_timestamp(1_593_048_767_015, false)?;
///
/// assert_eq!(u1.time(), u2.time());
/// assert_eq!(u1.randomness_value() + 1, u2.randomness_value());
/// # Ok(()) }
/// ```
pub struct Generator<C, R> {
    clock: C,
    state: Mutex<State<R>>,
}

impl<C, R> Generator<C, R> {
    /// Creates a generator from a clock and a random source.
    #[must_use]
    pub const fn with_sources(clock: C, random: R) -> Self {
        Self {
            clock,
            state: Mutex::new(State {
                random,
                last_timestamp: None,
                last_digits: [0; RANDOM_LEN],
            }),
        }
    }
}

#[cfg(feature = "rand")]
impl Generator<SystemClock, StdRandom> {
    /// Creates a generator using the system clock and [`StdRandom`].
    #[must_use]
    pub const fn new() -> Self {
        Self::with_sources(SystemClock, StdRandom::new())
    }
}

#[cfg(feature = "rand")]
impl Default for Generator<SystemClock, StdRandom> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock, R: RandomSource> Generator<C, R> {
    /// Generates a ULID for the current time of the clock.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::ClockUnavailable`] if the clock has no reading, otherwise
    /// like [`Generator::generate_with_timestamp`].
    pub fn generate(&self, lowercase: bool) -> Result<Ulid, Error> {
        // Clock readings are taken under the lock and committed in the same order.
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(now) = self.clock.now_millis() else {
            warn!("clock returned no timestamp");
            return Err(Error::ClockUnavailable);
        };
        generate_locked(&mut state, now, lowercase)
    }

    /// Generates a ULID for the given millisecond.
    ///
    /// Timestamps above [`TIME_MAX`](crate::TIME_MAX) are still encoded as long as they
    /// fit into ten Base32 characters; [`Ulid::to_timestamp`] rejects them later.
    ///
    /// # Errors
    ///
    /// - [`Error::TimestampOverflow`] if the timestamp needs more than ten characters.
    /// - [`Error::RandomnessExhausted`] if the timestamp equals the previous one and all
    ///   random digits are already at their maximum. The generator state is left as is.
    /// - [`Error::InvalidEntropy`] if the random source produced digits outside `0..32`.
    pub fn generate_with_timestamp(&self, timestamp: u64, lowercase: bool) -> Result<Ulid, Error> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        generate_locked(&mut state, timestamp, lowercase)
    }
}

/// Runs one generation step. The caller holds the state lock.
fn generate_locked<R: RandomSource>(state: &mut State<R>, timestamp: u64, lowercase: bool) -> Result<Ulid, Error> {
    if timestamp > TIME_ENCODABLE_MAX {
        return Err(Error::TimestampOverflow);
    }

    let duplicate = state.last_timestamp == Some(timestamp);

    let digits = if duplicate {
        increment(state.last_digits).ok_or_else(|| {
            warn!(timestamp, "randomness exhausted within one millisecond");
            Error::RandomnessExhausted
        })?
    } else {
        let mut digits = [0; RANDOM_LEN];
        state.random.fill_digits(&mut digits);
        if digits.iter().any(|&digit| digit >= 32) {
            warn!(timestamp, "random source produced digits outside of 0..32");
            return Err(Error::InvalidEntropy);
        }
        digits
    };

    state.last_timestamp = Some(timestamp);
    state.last_digits = digits;

    trace!(timestamp, incremented = duplicate, "generated ULID");

    Ok(Ulid::from_fields(timestamp, &digits, lowercase))
}

/// Adds one to the digits, read as a big-endian base-32 number.
///
/// Returns `None` when every digit is already 31.
fn increment(mut digits: [u8; RANDOM_LEN]) -> Option<[u8; RANDOM_LEN]> {
    for digit in digits.iter_mut().rev() {
        if *digit < 31 {
            *digit += 1;
            return Some(digits);
        }
        *digit = 0;
    }
    None
}

#[cfg(feature = "rand")]
static GENERATOR: Generator<SystemClock, StdRandom> = Generator::new();

/// Returns the process-wide generator used by [`Ulid::generate`] and [`Ulid::from_timestamp`].
#[cfg(feature = "rand")]
#[must_use]
pub fn default_generator() -> &'static Generator<SystemClock, StdRandom> {
    &GENERATOR
}

#[cfg(test)]
pub(crate) mod test_sources {
    use std::sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    };

    use super::{Clock, RandomSource};

    #[derive(Clone)]
    pub(crate) struct TestClock {
        now: Arc<AtomicU64>,
    }

    impl TestClock {
        pub(crate) fn new(now: u64) -> Self {
            Self {
                now: Arc::new(AtomicU64::new(now)),
            }
        }

        pub(crate) fn set(&self, now: u64) {
            self.now.store(now, Ordering::SeqCst);
        }
    }

    impl Clock for TestClock {
        fn now_millis(&self) -> Option<u64> {
            Some(self.now.load(Ordering::SeqCst))
        }
    }

    /// Hands out the same digits on every draw.
    pub(crate) struct FixedRandom(pub(crate) [u8; 16]);

    impl RandomSource for FixedRandom {
        fn fill_digits(&mut self, digits: &mut [u8]) {
            digits.copy_from_slice(&self.0[..digits.len()]);
        }
    }
}
