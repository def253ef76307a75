//! Fault tree construction and structural validation.
//!
//! A [`FaultTree`] selects the gates of one tree from a [`Model`]. The first gate
//! added becomes the top event; every later gate must have a parent that is already
//! part of the tree. [`FaultTree::validate`] then checks the structure:
//!
//! - no gate is its own ancestor (cycle detection),
//! - every child is a gate or a declared primary event,
//! - every gate has a number of children its connective accepts,
//!
//! and gathers the primary events reachable from the top. Gates reached only as
//! children (never added explicitly) are registered as *implicit* gates and are
//! checked exactly like the others.
//!
//! # Example
//!
//! ```
//! use fta_rs::fault_tree::FaultTree;
//! use fta_rs::gate::Gate;
//! use fta_rs::model::Model;
//!
//! let mut model = Model::new();
//! let top = model.add_gate(Gate::and("top", &["g1", "c"])).unwrap();
//! let g1 = model.add_gate(Gate::or("g1", &["a", "b"])).unwrap();
//! for name in ["a", "b", "c"] {
//!     model.add_basic_event_with_probability(name, 0.1).unwrap();
//! }
//!
//! let mut tree = FaultTree::new("example");
//! tree.add_gate(&model, top).unwrap();
//! tree.add_gate(&model, g1).unwrap();
//! tree.validate(&model).unwrap();
//! assert_eq!(tree.basic_events().len(), 3);
//! ```

use std::collections::{BTreeSet, HashMap};

use log::{debug, info};

use crate::bitset::BitSet;
use crate::error::{Error, Result};
use crate::model::Model;
use crate::types::{BasicId, EventRef, GateId, HouseId};

#[derive(Debug, Clone)]
pub struct FaultTree {
    name: String,
    top: Option<GateId>,
    /// Every gate of the tree except the top, explicit or implicit.
    inter_gates: BTreeSet<GateId>,
    implicit_gates: BTreeSet<GateId>,
    basic_events: BTreeSet<BasicId>,
    house_events: BTreeSet<HouseId>,
    validated: bool,
    /// Parent index of the model, with the number of gates it was built from.
    parents: HashMap<GateId, Vec<GateId>>,
    indexed_gates: usize,
}

impl FaultTree {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            top: None,
            inter_gates: BTreeSet::new(),
            implicit_gates: BTreeSet::new(),
            basic_events: BTreeSet::new(),
            house_events: BTreeSet::new(),
            validated: false,
            parents: HashMap::new(),
            indexed_gates: 0,
        }
    }
}

// Getters
impl FaultTree {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn top(&self) -> Option<GateId> {
        self.top
    }

    pub fn is_validated(&self) -> bool {
        self.validated
    }

    /// Returns true if the gate is the top or an intermediate gate of this tree.
    pub fn contains_gate(&self, gate: GateId) -> bool {
        self.top == Some(gate) || self.inter_gates.contains(&gate)
    }

    /// All gates of the tree, top first.
    pub fn gates(&self) -> impl Iterator<Item = GateId> + '_ {
        self.top.into_iter().chain(self.inter_gates.iter().copied())
    }

    pub fn inter_gates(&self) -> &BTreeSet<GateId> {
        &self.inter_gates
    }

    pub fn implicit_gates(&self) -> &BTreeSet<GateId> {
        &self.implicit_gates
    }

    pub fn basic_events(&self) -> &BTreeSet<BasicId> {
        &self.basic_events
    }

    pub fn house_events(&self) -> &BTreeSet<HouseId> {
        &self.house_events
    }

    /// Basic events followed by house events.
    pub fn primary_events(&self) -> Vec<EventRef> {
        let basic = self.basic_events.iter().map(|&b| EventRef::Basic(b));
        let house = self.house_events.iter().map(|&h| EventRef::House(h));
        basic.chain(house).collect()
    }
}

impl FaultTree {
    /// Adds a gate to the tree. The first gate becomes the top event.
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateDefinition`] if the gate is already in the tree.
    /// - [`Error::DanglingGate`] if no gate of the model lists it as a child,
    ///   or none of its parents has been added yet.
    pub fn add_gate(&mut self, model: &Model, gate: GateId) -> Result<()> {
        let declaration = model.gate(gate);
        debug!("add_gate({} = '{}') to '{}'", gate, declaration.name(), self.name);

        let Some(top) = self.top else {
            self.top = Some(gate);
            self.validated = false;
            return Ok(());
        };

        if self.contains_gate(gate) {
            return Err(Error::DuplicateDefinition(declaration.name().to_string()));
        }

        // Gates are only ever appended to a model, so the count tells a stale index.
        if self.indexed_gates != model.num_gates() {
            self.parents = model.parent_index();
            self.indexed_gates = model.num_gates();
        }
        let parents = self.parents.get(&gate).map(Vec::as_slice).unwrap_or_default();
        if parents.is_empty() {
            return Err(self.dangling(declaration.name(), "it has no parent gates"));
        }
        if !parents.iter().any(|&p| p == top || self.inter_gates.contains(&p)) {
            return Err(self.dangling(declaration.name(), "none of its parents is declared before it"));
        }

        self.inter_gates.insert(gate);
        self.validated = false;
        Ok(())
    }

    fn dangling(&self, gate: &str, reason: &str) -> Error {
        Error::DanglingGate {
            tree: self.name.clone(),
            gate: gate.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Checks the structure of the tree and gathers its primary events.
    ///
    /// May be called again after more gates are added; primary-event indices are
    /// rebuilt from scratch every time.
    pub fn validate(&mut self, model: &Model) -> Result<()> {
        let top = self.top.ok_or_else(|| Error::EmptyTree(self.name.clone()))?;
        self.validated = false;

        self.check_cycles(model, top)?;
        self.gather_primary_events(model)?;
        self.check_gates(model)?;

        info!(
            "Fault tree '{}' is valid: {} gates ({} implicit), {} basic events, {} house events",
            self.name,
            self.inter_gates.len() + 1,
            self.implicit_gates.len(),
            self.basic_events.len(),
            self.house_events.len()
        );
        self.validated = true;
        Ok(())
    }

    /// Iterative depth-first search from the top.
    ///
    /// The explicit stack holds the gates of the current path together with the
    /// index of the next child to visit. Gates whose whole sub-DAG was explored are
    /// marked done and never entered again, so shared sub-trees cost one visit.
    fn check_cycles(&mut self, model: &Model, top: GateId) -> Result<()> {
        let n = model.num_gates();
        let mut on_path = BitSet::new(n);
        let mut done = BitSet::new(n);
        let mut path: Vec<GateId> = vec![top];
        let mut stack: Vec<(GateId, usize)> = vec![(top, 0)];
        on_path.insert(top.index());

        while let Some((gate, next)) = stack.last().copied() {
            let children = model.gate(gate).children();
            if next == children.len() {
                stack.pop();
                path.pop();
                on_path.remove(gate.index());
                done.insert(gate.index());
                continue;
            }
            if let Some(frame) = stack.last_mut() {
                frame.1 += 1;
            }

            let Some(EventRef::Gate(child)) = model.lookup(&children[next]) else {
                continue;
            };

            if !self.contains_gate(child) {
                debug!("implicit gate '{}' under '{}'", model.gate(child).name(), model.gate(gate).name());
                self.inter_gates.insert(child);
                self.implicit_gates.insert(child);
            }

            if on_path.contains(child.index()) {
                return Err(self.cycle_error(model, &path, child));
            }
            if done.contains(child.index()) {
                continue;
            }

            on_path.insert(child.index());
            path.push(child);
            stack.push((child, 0));
        }
        Ok(())
    }

    fn cycle_error(&self, model: &Model, path: &[GateId], repeated: GateId) -> Error {
        let start = path.iter().position(|&g| g == repeated).unwrap_or(0);
        let cycle = path[start..]
            .iter()
            .chain(std::iter::once(&repeated))
            .map(|&g| model.gate(g).name().to_string())
            .collect();
        Error::CycleDetected {
            tree: self.name.clone(),
            path: cycle,
        }
    }

    fn gather_primary_events(&mut self, model: &Model) -> Result<()> {
        self.basic_events.clear();
        self.house_events.clear();

        let gates: Vec<GateId> = self.gates().collect();
        for gate in gates {
            for child in model.gate(gate).children() {
                match model.lookup(child) {
                    Some(EventRef::Gate(g)) => debug_assert!(self.contains_gate(g)),
                    Some(EventRef::Basic(b)) => {
                        self.basic_events.insert(b);
                    }
                    Some(EventRef::House(h)) => {
                        self.house_events.insert(h);
                    }
                    None => {
                        return Err(Error::UndefinedNode {
                            tree: self.name.clone(),
                            node: child.clone(),
                        })
                    }
                }
            }
        }
        Ok(())
    }

    fn check_gates(&self, model: &Model) -> Result<()> {
        for gate in self.gates() {
            let declaration = model.gate(gate);
            let children = declaration.children();
            let invalid = |reason: String| Error::InvalidGate {
                gate: declaration.name().to_string(),
                reason,
            };

            if let Some(reason) = declaration.connective().check_arity(children.len()) {
                return Err(invalid(reason));
            }
            let unique: BTreeSet<&String> = children.iter().collect();
            if unique.len() != children.len() {
                return Err(invalid("duplicate children".to_string()));
            }
        }
        Ok(())
    }
}
