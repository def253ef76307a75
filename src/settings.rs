use crate::error::{Error, Result};

/// Analysis settings.
///
/// Use `Settings::default()` for standard settings and the setters to change them.
/// Setters reject out-of-range values with [`Error::InvalidSettings`].
///
/// # Examples
///
/// ```
/// use fta_rs::settings::Settings;
///
/// let mut settings = Settings::default();
/// settings.limit_order(4)?.rare_event(true).num_trials(10_000).seed(42);
/// assert_eq!(settings.get_limit_order(), 4);
/// assert!(settings.limit_order(0).is_err());
/// # Ok::<(), fta_rs::error::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Largest cut-set order kept (default: 20)
    limit_order: usize,
    /// Number of inclusion-exclusion terms evaluated (default: 1 000 000)
    nsums: usize,
    /// Use the rare-event approximation instead of inclusion-exclusion (default: false)
    rare_event: bool,
    /// Compute the top-event probability (default: true)
    probability: bool,
    /// Monte Carlo trials, 0 to skip simulation (default: 0)
    num_trials: usize,
    /// Seed of the first trial (default: 0)
    seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            limit_order: 20,
            nsums: 1_000_000,
            rare_event: false,
            probability: true,
            num_trials: 0,
            seed: 0,
        }
    }
}

// Setters
impl Settings {
    pub fn limit_order(&mut self, order: usize) -> Result<&mut Self> {
        if order == 0 {
            return Err(Error::InvalidSettings("limit order must be at least 1".to_string()));
        }
        self.limit_order = order;
        Ok(self)
    }

    pub fn nsums(&mut self, nsums: usize) -> Result<&mut Self> {
        if nsums == 0 {
            return Err(Error::InvalidSettings("number of sums must be at least 1".to_string()));
        }
        self.nsums = nsums;
        Ok(self)
    }

    pub fn rare_event(&mut self, flag: bool) -> &mut Self {
        self.rare_event = flag;
        self
    }

    pub fn probability(&mut self, flag: bool) -> &mut Self {
        self.probability = flag;
        self
    }

    pub fn num_trials(&mut self, n: usize) -> &mut Self {
        self.num_trials = n;
        self
    }

    pub fn seed(&mut self, seed: u64) -> &mut Self {
        self.seed = seed;
        self
    }
}

// Getters
impl Settings {
    pub fn get_limit_order(&self) -> usize {
        self.limit_order
    }

    pub fn get_nsums(&self) -> usize {
        self.nsums
    }

    pub fn get_rare_event(&self) -> bool {
        self.rare_event
    }

    pub fn get_probability(&self) -> bool {
        self.probability
    }

    pub fn get_num_trials(&self) -> usize {
        self.num_trials
    }

    pub fn get_seed(&self) -> u64 {
        self.seed
    }
}
