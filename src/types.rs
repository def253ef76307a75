//! Type-safe identifiers for events in a fault tree model.
//!
//! Every event lives in an arena owned by the [`Model`][crate::model::Model] and is
//! addressed by a stable index. Gates, basic events and house events have separate
//! arenas, so the newtypes below keep their indices apart at compile time.
use std::fmt;

/// Index of a gate in the model.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct GateId(u32);

impl GateId {
    pub fn new(index: usize) -> Self {
        assert!(index <= u32::MAX as usize, "Gate index overflow");
        GateId(index as u32)
    }

    /// Returns the raw index as a `usize`.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for GateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// Index of a basic event in the model.
///
/// Basic event indices are dense, which is what makes them usable as bit positions
/// in a [`CutSet`][crate::cut_set::CutSet] and as offsets into probability vectors.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct BasicId(u32);

impl BasicId {
    pub fn new(index: usize) -> Self {
        assert!(index <= u32::MAX as usize, "Basic event index overflow");
        BasicId(index as u32)
    }

    /// Returns the raw index as a `usize`.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BasicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

impl From<BasicId> for usize {
    fn from(id: BasicId) -> Self {
        id.index()
    }
}

/// Index of a house event in the model.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct HouseId(u32);

impl HouseId {
    pub fn new(index: usize) -> Self {
        assert!(index <= u32::MAX as usize, "House event index overflow");
        HouseId(index as u32)
    }

    /// Returns the raw index as a `usize`.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for HouseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h{}", self.0)
    }
}

/// Any event of the model, tagged by its kind.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum EventRef {
    Gate(GateId),
    Basic(BasicId),
    House(HouseId),
}

impl EventRef {
    pub fn is_gate(self) -> bool {
        matches!(self, EventRef::Gate(_))
    }

    pub fn is_primary(self) -> bool {
        !self.is_gate()
    }
}

impl fmt::Display for EventRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventRef::Gate(id) => write!(f, "{}", id),
            EventRef::Basic(id) => write!(f, "{}", id),
            EventRef::House(id) => write!(f, "{}", id),
        }
    }
}

/// Normalizes an event identifier: ids are case-insensitive.
pub fn normalize_id(name: &str) -> String {
    name.trim().to_lowercase()
}
