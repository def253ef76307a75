//! Minimal cut sets of a fault tree.
//!
//! [`CutSetGenerator`] expands the top gate top-down into sets of basic events:
//! OR gates append one branch per child, AND gates cross-union their children's
//! branches, and `Atleast(k)` gates take the OR of the ANDs of every k-combination
//! of children. Each gate's result is minimized (no set contains another) and
//! memoized, so a gate shared by several parents is expanded once.
//!
//! Sets with more than `limit_order` events are discarded during expansion; the
//! result records whether that happened.
//!
//! # Example
//!
//! ```
//! use fta_rs::cut_set::CutSetGenerator;
//! use fta_rs::fault_tree::FaultTree;
//! use fta_rs::gate::Gate;
//! use fta_rs::model::Model;
//!
//! let mut model = Model::new();
//! let top = model.add_gate(Gate::or("top", &["g1", "c"])).unwrap();
//! model.add_gate(Gate::and("g1", &["a", "b"])).unwrap();
//! for name in ["a", "b", "c"] {
//!     model.add_basic_event(name, None).unwrap();
//! }
//! let mut tree = FaultTree::new("ft");
//! tree.add_gate(&model, top).unwrap();
//! tree.validate(&model).unwrap();
//!
//! let result = CutSetGenerator::new(&model, &tree, 20).generate().unwrap();
//! assert_eq!(result.len(), 2);
//! assert_eq!(result.max_order(), 2);
//! assert_eq!(result.cut_sets()[0].names(&model), vec!["c"]);
//! ```

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use log::{debug, info};

use crate::bitset::BitSet;
use crate::combination::Combinations;
use crate::error::{Error, Result};
use crate::fault_tree::FaultTree;
use crate::gate::Connective;
use crate::model::Model;
use crate::superset::{Overflow, Superset};
use crate::types::{BasicId, EventRef, GateId};

/// An immutable set of basic events.
///
/// Ordered by size first, then by member ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CutSet {
    members: BitSet,
}

impl CutSet {
    pub fn new(members: BitSet) -> Self {
        Self { members }
    }

    pub fn from_events(events: impl IntoIterator<Item = BasicId>) -> Self {
        Self::new(events.into_iter().map(usize::from).collect())
    }

    pub fn order(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, event: BasicId) -> bool {
        self.members.contains(event.index())
    }

    pub fn events(&self) -> impl Iterator<Item = BasicId> + '_ {
        self.members.iter().map(BasicId::new)
    }

    pub fn bits(&self) -> &BitSet {
        &self.members
    }

    /// Returns true if every event of `self` is in `other`.
    pub fn is_subset(&self, other: &CutSet) -> bool {
        self.members.is_subset(&other.members)
    }

    /// Display names of the members, in id order.
    pub fn names<'m>(&self, model: &'m Model) -> Vec<&'m str> {
        self.events()
            .map(|b| model.name_of(EventRef::Basic(b)))
            .collect()
    }
}

impl Ord for CutSet {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order()
            .cmp(&other.order())
            .then_with(|| self.members.iter().cmp(other.members.iter()))
    }
}

impl PartialOrd for CutSet {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for CutSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, b) in self.events().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", b)?;
        }
        write!(f, "}}")
    }
}

/// Minimal cut sets of a tree, up to the order limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinimalCutSets {
    cut_sets: Vec<CutSet>,
    limit_order: usize,
    truncated: bool,
}

impl MinimalCutSets {
    pub fn new(mut cut_sets: Vec<CutSet>, limit_order: usize, truncated: bool) -> Self {
        cut_sets.sort();
        Self {
            cut_sets,
            limit_order,
            truncated,
        }
    }

    /// Cut sets sorted by (order, members).
    pub fn cut_sets(&self) -> &[CutSet] {
        &self.cut_sets
    }

    pub fn into_cut_sets(self) -> Vec<CutSet> {
        self.cut_sets
    }

    pub fn len(&self) -> usize {
        self.cut_sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cut_sets.is_empty()
    }

    /// Largest order among the cut sets, 0 if there are none.
    pub fn max_order(&self) -> usize {
        self.cut_sets.last().map_or(0, CutSet::order)
    }

    pub fn limit_order(&self) -> usize {
        self.limit_order
    }

    /// Whether some sets were dropped for exceeding the order limit.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// The top event cannot occur.
    pub fn is_impossible(&self) -> bool {
        self.cut_sets.is_empty()
    }

    /// The top event always occurs.
    pub fn is_certain(&self) -> bool {
        self.cut_sets.first().is_some_and(CutSet::is_empty)
    }

    /// Number of cut sets of each order; index 0 is order 1.
    pub fn distribution(&self) -> Vec<usize> {
        let mut counts = vec![0; self.max_order()];
        for cs in &self.cut_sets {
            if cs.order() > 0 {
                counts[cs.order() - 1] += 1;
            }
        }
        counts
    }
}

/// Top-down expansion of a validated fault tree into minimal cut sets.
pub struct CutSetGenerator<'a> {
    model: &'a Model,
    tree: &'a FaultTree,
    limit_order: usize,
    memo: HashMap<GateId, Vec<Superset>>,
    truncated: bool,
}

impl<'a> CutSetGenerator<'a> {
    pub fn new(model: &'a Model, tree: &'a FaultTree, limit_order: usize) -> Self {
        Self {
            model,
            tree,
            limit_order,
            memo: HashMap::new(),
            truncated: false,
        }
    }

    /// Expands the top gate and returns its minimal cut sets.
    pub fn generate(mut self) -> Result<MinimalCutSets> {
        let top = match self.tree.top() {
            Some(top) if self.tree.is_validated() => top,
            _ => return Err(Error::NotValidated(self.tree.name().to_string())),
        };

        let mut sets = Vec::new();
        self.expand_sets(top, &mut sets)?;
        let sets = minimize(sets);

        let cut_sets: Vec<CutSet> = sets.into_iter().map(|s| CutSet::new(s.into_basic())).collect();
        let result = MinimalCutSets::new(cut_sets, self.limit_order, self.truncated);
        info!(
            "Fault tree '{}': {} minimal cut sets, max order {}{}",
            self.tree.name(),
            result.len(),
            result.max_order(),
            if result.truncated() { " (truncated)" } else { "" }
        );
        Ok(result)
    }

    /// Appends the minimized supersets of `gate` to `out`.
    pub fn expand_sets(&mut self, gate: GateId, out: &mut Vec<Superset>) -> Result<()> {
        if let Some(sets) = self.memo.get(&gate) {
            out.extend(sets.iter().cloned());
            return Ok(());
        }

        let declaration = self.model.gate(gate);
        let children = declaration.children();
        let sets = match declaration.connective() {
            Connective::Or => {
                let mut sets = Vec::new();
                for child in children {
                    sets.extend(self.child_sets(child)?);
                }
                sets
            }
            Connective::And | Connective::Inhibit => {
                let mut sets = vec![Superset::new()];
                for child in children {
                    let branch = self.child_sets(child)?;
                    sets = self.cross(&sets, &branch);
                    if sets.is_empty() {
                        break;
                    }
                }
                sets
            }
            Connective::Atleast(k) => {
                let mut branches = Vec::with_capacity(children.len());
                for child in children {
                    branches.push(self.child_sets(child)?);
                }
                let mut sets = Vec::new();
                for combination in Combinations::new(children.len(), k) {
                    let mut acc = vec![Superset::new()];
                    for i in combination {
                        acc = self.cross(&acc, &branches[i]);
                        if acc.is_empty() {
                            break;
                        }
                    }
                    sets.extend(acc);
                }
                sets
            }
            Connective::Null => match children.first() {
                Some(child) => self.child_sets(child)?,
                None => Vec::new(),
            },
        };

        let sets = self.restrict(sets);
        let sets = minimize(sets);
        debug!("expand_sets({} = '{}') -> {} sets", gate, declaration.name(), sets.len());

        out.extend(sets.iter().cloned());
        self.memo.insert(gate, sets);
        Ok(())
    }

    /// Supersets contributed by one child of a gate.
    fn child_sets(&mut self, child: &str) -> Result<Vec<Superset>> {
        match self.model.lookup(child) {
            Some(EventRef::Gate(g)) => {
                let mut sets = Vec::new();
                self.expand_sets(g, &mut sets)?;
                Ok(sets)
            }
            Some(EventRef::Basic(b)) => Ok(vec![Superset::with_basic(b)]),
            Some(EventRef::House(h)) => Ok(vec![Superset::with_house(self.model.house_event(h).state())]),
            None => Err(Error::UndefinedNode {
                tree: self.tree.name().to_string(),
                node: child.to_string(),
            }),
        }
    }

    /// AND of two families of branches.
    fn cross(&mut self, left: &[Superset], right: &[Superset]) -> Vec<Superset> {
        let mut result = Vec::with_capacity(left.len() * right.len());
        for a in left {
            for b in right {
                match a.join(b, self.limit_order) {
                    Ok(set) => result.push(set),
                    Err(Overflow::Order) => self.truncated = true,
                    Err(Overflow::Null) => {}
                }
            }
        }
        result
    }

    /// Drops nullified branches and branches above the order limit.
    fn restrict(&mut self, sets: Vec<Superset>) -> Vec<Superset> {
        let before = sets.len();
        let limit = self.limit_order;
        let sets: Vec<Superset> = sets.into_iter().filter(|s| !s.is_null()).collect();
        let nulls = before - sets.len();
        let sets: Vec<Superset> = sets.into_iter().filter(|s| s.order() <= limit).collect();
        if before - nulls != sets.len() {
            self.truncated = true;
        }
        sets
    }
}

/// Removes duplicates and every set that contains another set of the family.
pub fn minimize(mut sets: Vec<Superset>) -> Vec<Superset> {
    sets.sort_by_key(Superset::order);
    let mut kept: Vec<Superset> = Vec::with_capacity(sets.len());
    for set in sets {
        if !kept.iter().any(|k| k.is_subset(&set)) {
            kept.push(set);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::gate::Gate;
    use test_log::test;

    fn build(gates: Vec<Gate>, basic: &[&str]) -> (Model, FaultTree) {
        let mut model = Model::new();
        let mut ids = Vec::new();
        for gate in gates {
            ids.push(model.add_gate(gate).unwrap());
        }
        for name in basic {
            model.add_basic_event(name, None).unwrap();
        }
        let mut tree = FaultTree::new("ft");
        tree.add_gate(&model, ids[0]).unwrap();
        tree.validate(&model).unwrap();
        (model, tree)
    }

    fn names(model: &Model, result: &MinimalCutSets) -> Vec<Vec<String>> {
        result
            .cut_sets()
            .iter()
            .map(|cs| cs.names(model).into_iter().map(String::from).collect())
            .collect()
    }

    #[test]
    fn test_or_of_basic_events() {
        let (model, tree) = build(vec![Gate::or("top", &["a", "b", "c"])], &["a", "b", "c"]);
        let result = CutSetGenerator::new(&model, &tree, 20).generate().unwrap();
        assert_eq!(names(&model, &result), vec![vec!["a"], vec!["b"], vec!["c"]]);
        assert_eq!(result.max_order(), 1);
        assert!(!result.truncated());
    }

    #[test]
    fn test_and_of_or() {
        let (model, tree) = build(
            vec![
                Gate::and("top", &["g1", "g2"]),
                Gate::or("g1", &["a", "b"]),
                Gate::or("g2", &["c", "d"]),
            ],
            &["a", "b", "c", "d"],
        );
        let result = CutSetGenerator::new(&model, &tree, 20).generate().unwrap();
        assert_eq!(
            names(&model, &result),
            vec![vec!["a", "c"], vec!["a", "d"], vec!["b", "c"], vec!["b", "d"]]
        );
        assert_eq!(result.distribution(), vec![0, 4]);
    }

    #[test]
    fn test_minimization_by_subsumption() {
        // top = (a & b) | (a & b & c)
        let (model, tree) = build(
            vec![
                Gate::or("top", &["g1", "g2"]),
                Gate::and("g1", &["a", "b"]),
                Gate::and("g2", &["a", "b", "c"]),
            ],
            &["a", "b", "c"],
        );
        let result = CutSetGenerator::new(&model, &tree, 20).generate().unwrap();
        assert_eq!(names(&model, &result), vec![vec!["a", "b"]]);
    }

    #[test]
    fn test_duplicate_sets_merged() {
        // top = (a & b) | (b & a) via a shared gate
        let (model, tree) = build(
            vec![
                Gate::or("top", &["g1", "g2"]),
                Gate::and("g1", &["a", "b"]),
                Gate::and("g2", &["b", "a"]),
            ],
            &["a", "b"],
        );
        let result = CutSetGenerator::new(&model, &tree, 20).generate().unwrap();
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_repeated_event_absorbed() {
        // top = a & (a | b) = a
        let (model, tree) = build(
            vec![Gate::and("top", &["a", "g1"]), Gate::or("g1", &["a", "b"])],
            &["a", "b"],
        );
        let result = CutSetGenerator::new(&model, &tree, 20).generate().unwrap();
        assert_eq!(names(&model, &result), vec![vec!["a"]]);
    }

    #[test]
    fn test_limit_order() {
        let (model, tree) = build(
            vec![Gate::or("top", &["a", "g1"]), Gate::and("g1", &["b", "c", "d"])],
            &["a", "b", "c", "d"],
        );
        let full = CutSetGenerator::new(&model, &tree, 20).generate().unwrap();
        assert_eq!(full.len(), 2);
        assert!(!full.truncated());

        let limited = CutSetGenerator::new(&model, &tree, 2).generate().unwrap();
        assert_eq!(names(&model, &limited), vec![vec!["a"]]);
        assert!(limited.truncated());
        assert!(limited.cut_sets().iter().all(|cs| cs.order() <= 2));
    }

    #[test]
    fn test_atleast_two_of_three() {
        let (model, tree) = build(vec![Gate::atleast("top", 2, &["a", "b", "c"])], &["a", "b", "c"]);
        let result = CutSetGenerator::new(&model, &tree, 20).generate().unwrap();
        assert_eq!(
            names(&model, &result),
            vec![vec!["a", "b"], vec!["a", "c"], vec!["b", "c"]]
        );
    }

    #[test]
    fn test_inhibit_and_null() {
        let (model, tree) = build(
            vec![Gate::inhibit("top", "g1", "cond"), Gate::null("g1", "a")],
            &["a", "cond"],
        );
        let result = CutSetGenerator::new(&model, &tree, 20).generate().unwrap();
        assert_eq!(names(&model, &result), vec![vec!["a", "cond"]]);
    }

    #[test]
    fn test_house_events() {
        let mut model = Model::new();
        let top = model.add_gate(Gate::or("top", &["g1", "g2"])).unwrap();
        model.add_gate(Gate::and("g1", &["a", "on"])).unwrap();
        model.add_gate(Gate::and("g2", &["b", "off"])).unwrap();
        model.add_basic_event("a", None).unwrap();
        model.add_basic_event("b", None).unwrap();
        model.add_house_event("on", true).unwrap();
        model.add_house_event("off", false).unwrap();
        let mut tree = FaultTree::new("ft");
        tree.add_gate(&model, top).unwrap();
        tree.validate(&model).unwrap();

        let result = CutSetGenerator::new(&model, &tree, 20).generate().unwrap();
        assert_eq!(names(&model, &result), vec![vec!["a"]]);
    }

    #[test]
    fn test_true_house_under_or_is_certain() {
        let mut model = Model::new();
        let top = model.add_gate(Gate::or("top", &["a", "on"])).unwrap();
        model.add_basic_event("a", None).unwrap();
        model.add_house_event("on", true).unwrap();
        let mut tree = FaultTree::new("ft");
        tree.add_gate(&model, top).unwrap();
        tree.validate(&model).unwrap();

        let result = CutSetGenerator::new(&model, &tree, 20).generate().unwrap();
        assert!(result.is_certain());
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_false_house_under_and_is_impossible() {
        let mut model = Model::new();
        let top = model.add_gate(Gate::and("top", &["a", "off"])).unwrap();
        model.add_basic_event("a", None).unwrap();
        model.add_house_event("off", false).unwrap();
        let mut tree = FaultTree::new("ft");
        tree.add_gate(&model, top).unwrap();
        tree.validate(&model).unwrap();

        let result = CutSetGenerator::new(&model, &tree, 20).generate().unwrap();
        assert!(result.is_impossible());
        assert!(!result.truncated());
        assert_eq!(result.max_order(), 0);
    }

    #[test]
    fn test_requires_validation() {
        let mut model = Model::new();
        let top = model.add_gate(Gate::or("top", &["a", "b"])).unwrap();
        let mut tree = FaultTree::new("ft");
        tree.add_gate(&model, top).unwrap();
        assert_eq!(
            CutSetGenerator::new(&model, &tree, 20).generate(),
            Err(Error::NotValidated("ft".to_string()))
        );
    }

    #[test]
    fn test_cut_set_ordering_and_display() {
        let a = CutSet::from_events([BasicId::new(2)]);
        let b = CutSet::from_events([BasicId::new(0), BasicId::new(5)]);
        let c = CutSet::from_events([BasicId::new(1), BasicId::new(2)]);
        let mut sets = vec![c.clone(), b.clone(), a.clone()];
        sets.sort();
        assert_eq!(sets, vec![a, b.clone(), c]);
        assert_eq!(b.to_string(), "{b0, b5}");
    }
}
