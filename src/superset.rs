use crate::bitset::BitSet;
use crate::types::BasicId;

/// Accumulator for one AND-branch during cut-set expansion.
///
/// Holds the basic events of the branch and whether a false house event made the
/// whole branch impossible. A nullified superset absorbs every union.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Superset {
    basic: BitSet,
    null: bool,
}

impl Superset {
    /// The neutral branch: no events, not nullified.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_basic(event: BasicId) -> Self {
        let mut set = Self::new();
        set.insert_basic(event);
        set
    }

    pub fn with_house(state: bool) -> Self {
        let mut set = Self::new();
        set.insert_house(state);
        set
    }

    pub fn insert_basic(&mut self, event: BasicId) {
        self.basic.insert(event.index());
    }

    /// Folds a house event into the branch: true is neutral, false nullifies.
    pub fn insert_house(&mut self, state: bool) {
        if !state {
            self.null = true;
        }
    }

    /// Merges another branch into this one (logical AND).
    pub fn insert_set(&mut self, other: &Superset) {
        if other.null {
            self.null = true;
        }
        if !self.null {
            self.basic.union_with(&other.basic);
        }
    }

    /// AND of two branches. Fails if the result is nullified or holds more than
    /// `limit_order` events.
    pub fn join(&self, other: &Superset, limit_order: usize) -> Result<Superset, Overflow> {
        if self.null || other.null {
            return Err(Overflow::Null);
        }
        if self.basic.union_len(&other.basic) > limit_order {
            return Err(Overflow::Order);
        }
        let mut set = self.clone();
        set.insert_set(other);
        Ok(set)
    }

    pub fn is_null(&self) -> bool {
        self.null
    }

    pub fn order(&self) -> usize {
        self.basic.len()
    }

    pub fn basic(&self) -> &BitSet {
        &self.basic
    }

    pub fn into_basic(self) -> BitSet {
        self.basic
    }

    /// Returns true if every event of `self` is in `other`.
    pub fn is_subset(&self, other: &Superset) -> bool {
        self.basic.is_subset(&other.basic)
    }
}

/// Why [`Superset::join`] dropped a branch.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Overflow {
    /// A false house event nullified the branch.
    Null,
    /// The branch exceeded the order limit.
    Order,
}
