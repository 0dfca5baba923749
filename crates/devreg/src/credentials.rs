//! Default device names and passwords.

use devreg_core::CredentialSource;
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

/// Length of generated passwords
pub const PASSWORD_LENGTH: usize = 20;

const ADVERBS: &[&str] = &[
    "barely", "boldly", "calmly", "deeply", "early", "fairly", "finally", "gently", "gladly",
    "highly", "kindly", "largely", "lately", "mainly", "mostly", "neatly", "nicely", "openly",
    "quickly", "quietly", "rarely", "really", "simply", "slowly", "surely", "truly", "wildly",
];

const ADJECTIVES: &[&str] = &[
    "able", "amber", "brave", "bright", "busy", "clever", "cosmic", "crisp", "eager", "fancy",
    "fond", "funny", "giving", "golden", "happy", "humble", "jolly", "keen", "lucky", "merry",
    "noble", "proud", "quiet", "rapid", "sharp", "steady", "sunny", "tidy", "vast", "witty",
];

const ANIMALS: &[&str] = &[
    "albatross", "bat", "bellbird", "dolphin", "falcon", "ferret", "gecko", "heron", "kaka",
    "kea", "kiwi", "kereru", "lizard", "moa", "morepork", "otter", "owl", "penguin", "possum",
    "robin", "ruru", "seal", "stoat", "takahe", "tomtit", "tui", "weka", "weta", "whio",
];

/// [`CredentialSource`] backed by a random number generator.
///
/// Names are three hyphen-joined words (`adverb-adjective-animal`),
/// passwords are [`PASSWORD_LENGTH`] alphanumeric characters.
pub struct RandomCredentials<R = StdRng> {
    rng: Mutex<R>,
}

impl RandomCredentials<StdRng> {
    /// Seeded from operating-system entropy
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic sequence, for tests
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send> RandomCredentials<R> {
    /// Draw from `rng`
    pub const fn with_rng(rng: R) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    fn with<T>(&self, f: impl FnOnce(&mut R) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *rng)
    }
}

impl Default for RandomCredentials<StdRng> {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl<R: Rng + Send> CredentialSource for RandomCredentials<R> {
    fn device_name(&self) -> String {
        self.with(|rng| {
            [ADVERBS, ADJECTIVES, ANIMALS]
                .iter()
                .filter_map(|words| words.choose(rng).copied())
                .collect::<Vec<_>>()
                .join("-")
        })
    }

    fn password(&self) -> String {
        self.with(|rng| {
            rng.sample_iter(&Alphanumeric)
                .take(PASSWORD_LENGTH)
                .map(char::from)
                .collect()
        })
    }
}
