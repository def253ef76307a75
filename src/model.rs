//! The model: an arena owning every declared event and expression.
//!
//! Events are addressed by stable ids ([`GateId`], [`BasicId`], [`HouseId`]) and
//! looked up by their case-insensitive id through [`Model::lookup`]. Gates store
//! only forward child lists; the parents of a gate are derived on demand by a
//! pass over those lists, never kept as back-references.
//!
//! # Example
//!
//! ```
//! use fta_rs::gate::Gate;
//! use fta_rs::model::Model;
//! use fta_rs::types::EventRef;
//!
//! let mut model = Model::new();
//! model.add_basic_event_with_probability("pump", 0.1).unwrap();
//! model.add_basic_event_with_probability("valve", 0.2).unwrap();
//! let top = model.add_gate(Gate::or("top", &["pump", "valve"])).unwrap();
//!
//! assert_eq!(model.lookup("TOP"), Some(EventRef::Gate(top)));
//! assert_eq!(model.num_basic_events(), 2);
//! ```

use std::collections::HashMap;

use log::debug;

use crate::error::{Error, Result};
use crate::expression::{ExprArena, ExprId};
use crate::gate::Gate;
use crate::types::{normalize_id, BasicId, EventRef, GateId, HouseId};

/// A leaf failure event with an optional probability expression.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicEvent {
    id: String,
    name: String,
    expression: Option<ExprId>,
}

impl BasicEvent {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expression(&self) -> Option<ExprId> {
        self.expression
    }
}

/// A leaf event with a fixed boolean state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HouseEvent {
    id: String,
    name: String,
    state: bool,
}

impl HouseEvent {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> bool {
        self.state
    }
}

#[derive(Debug, Default, Clone)]
pub struct Model {
    gates: Vec<Gate>,
    basic_events: Vec<BasicEvent>,
    house_events: Vec<HouseEvent>,
    index: HashMap<String, EventRef>,
    exprs: ExprArena,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&mut self, id: &str, event: EventRef) -> Result<()> {
        if id.is_empty() {
            return Err(Error::InvalidArgument("event id must not be empty".to_string()));
        }
        if self.index.contains_key(id) {
            return Err(Error::DuplicateDefinition(id.to_string()));
        }
        debug!("register({} as {})", id, event);
        self.index.insert(id.to_string(), event);
        Ok(())
    }

    pub fn add_gate(&mut self, gate: Gate) -> Result<GateId> {
        let id = GateId::new(self.gates.len());
        self.register(gate.id(), EventRef::Gate(id))?;
        self.gates.push(gate);
        Ok(id)
    }

    /// Declares a basic event. Without an expression, the event can take part in
    /// cut-set generation but not in probability analysis.
    pub fn add_basic_event(&mut self, name: &str, expression: Option<ExprId>) -> Result<BasicId> {
        let id = BasicId::new(self.basic_events.len());
        let event = BasicEvent {
            id: normalize_id(name),
            name: name.trim().to_string(),
            expression,
        };
        self.register(&event.id, EventRef::Basic(id))?;
        self.basic_events.push(event);
        Ok(id)
    }

    /// Declares a basic event with a constant probability.
    pub fn add_basic_event_with_probability(&mut self, name: &str, p: f64) -> Result<BasicId> {
        let expr = self.exprs.constant(p);
        self.add_basic_event(name, Some(expr))
    }

    pub fn add_house_event(&mut self, name: &str, state: bool) -> Result<HouseId> {
        let id = HouseId::new(self.house_events.len());
        let event = HouseEvent {
            id: normalize_id(name),
            name: name.trim().to_string(),
            state,
        };
        self.register(&event.id, EventRef::House(id))?;
        self.house_events.push(event);
        Ok(id)
    }

    /// Attaches (or replaces) the probability expression of a basic event.
    pub fn set_expression(&mut self, event: BasicId, expression: ExprId) {
        self.basic_events[event.index()].expression = Some(expression);
    }
}

// Getters
impl Model {
    pub fn lookup(&self, id: &str) -> Option<EventRef> {
        self.index.get(&normalize_id(id)).copied()
    }

    pub fn gate(&self, id: GateId) -> &Gate {
        &self.gates[id.index()]
    }

    pub fn basic_event(&self, id: BasicId) -> &BasicEvent {
        &self.basic_events[id.index()]
    }

    pub fn house_event(&self, id: HouseId) -> &HouseEvent {
        &self.house_events[id.index()]
    }

    pub fn num_gates(&self) -> usize {
        self.gates.len()
    }

    pub fn num_basic_events(&self) -> usize {
        self.basic_events.len()
    }

    pub fn num_house_events(&self) -> usize {
        self.house_events.len()
    }

    pub fn gate_ids(&self) -> impl Iterator<Item = GateId> + '_ {
        (0..self.gates.len()).map(GateId::new)
    }

    pub fn basic_ids(&self) -> impl Iterator<Item = BasicId> + '_ {
        (0..self.basic_events.len()).map(BasicId::new)
    }

    /// Original display name of any event.
    pub fn name_of(&self, event: EventRef) -> &str {
        match event {
            EventRef::Gate(id) => self.gate(id).name(),
            EventRef::Basic(id) => self.basic_event(id).name(),
            EventRef::House(id) => self.house_event(id).name(),
        }
    }

    pub fn expressions(&self) -> &ExprArena {
        &self.exprs
    }

    pub fn expressions_mut(&mut self) -> &mut ExprArena {
        &mut self.exprs
    }
}

// Derived structure
impl Model {
    /// Parent index of every gate, built in one pass over the child lists.
    pub fn parent_index(&self) -> HashMap<GateId, Vec<GateId>> {
        let mut parents: HashMap<GateId, Vec<GateId>> = HashMap::new();
        for parent in self.gate_ids() {
            for child in self.gate(parent).children() {
                if let Some(EventRef::Gate(child)) = self.index.get(child).copied() {
                    parents.entry(child).or_default().push(parent);
                }
            }
        }
        parents
    }

    /// Best-estimate probability of a basic event.
    ///
    /// Validates the expression and checks that the value is a probability.
    pub fn probability(&self, id: BasicId) -> Result<f64> {
        let event = self.basic_event(id);
        let expr = event
            .expression
            .ok_or_else(|| Error::MissingProbability(event.name.clone()))?;
        self.exprs.validate(expr)?;
        let p = self.exprs.mean(expr);
        if !(0.0..=1.0).contains(&p) {
            return Err(Error::InvalidArgument(format!(
                "probability of basic event '{}' must be in [0, 1], got {}",
                event.name, p
            )));
        }
        Ok(p)
    }

    /// Best-estimate probability of every basic event, indexed by [`BasicId`].
    pub fn probabilities(&self) -> Result<Vec<f64>> {
        self.basic_ids().map(|id| self.probability(id)).collect()
    }
}
