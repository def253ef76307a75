use std::fmt::{Display, Formatter};

/// Logical connective of a gate.
///
/// Only coherent connectives are supported: every gate output is monotone in its
/// inputs, so a minimal cut set is a plain set of basic events.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Connective {
    And,
    Or,
    /// K-out-of-N vote: fails when at least `k` children fail.
    Atleast(usize),
    /// AND of an input event and a conditioning event.
    Inhibit,
    /// Pass-through of a single child.
    Null,
}

impl Connective {
    /// Checks the number of children against the connective.
    ///
    /// Returns a description of the problem, if any.
    pub fn check_arity(self, num_children: usize) -> Option<String> {
        match self {
            Connective::And | Connective::Or if num_children < 2 => Some(format!(
                "{} gate must have at least 2 children, got {}",
                self, num_children
            )),
            Connective::Atleast(k) if k < 2 => Some(format!("vote number must be at least 2, got {}", k)),
            Connective::Atleast(k) if num_children <= k => Some(format!(
                "{} gate must have more than {} children, got {}",
                self, k, num_children
            )),
            Connective::Inhibit if num_children != 2 => Some(format!(
                "inhibit gate must have exactly 2 children, got {}",
                num_children
            )),
            Connective::Null if num_children != 1 => Some(format!(
                "null gate must have exactly 1 child, got {}",
                num_children
            )),
            _ => None,
        }
    }
}

impl Display for Connective {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Connective::And => write!(f, "and"),
            Connective::Or => write!(f, "or"),
            Connective::Atleast(k) => write!(f, "atleast-{}", k),
            Connective::Inhibit => write!(f, "inhibit"),
            Connective::Null => write!(f, "null"),
        }
    }
}

/// A gate declaration: a connective over an ordered list of children.
///
/// Children are referenced by (normalized) id and resolved against the model during
/// validation, so a gate may name events that are declared after it.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Gate {
    id: String,
    name: String,
    connective: Connective,
    children: Vec<String>,
}

// Constructors
impl Gate {
    pub fn new(name: &str, connective: Connective, children: Vec<String>) -> Gate {
        Gate {
            id: crate::types::normalize_id(name),
            name: name.trim().to_string(),
            connective,
            children: children.iter().map(|c| crate::types::normalize_id(c)).collect(),
        }
    }

    pub fn and(name: &str, children: &[&str]) -> Gate {
        Gate::new(name, Connective::And, to_owned(children))
    }

    pub fn or(name: &str, children: &[&str]) -> Gate {
        Gate::new(name, Connective::Or, to_owned(children))
    }

    pub fn atleast(name: &str, k: usize, children: &[&str]) -> Gate {
        Gate::new(name, Connective::Atleast(k), to_owned(children))
    }

    pub fn inhibit(name: &str, input: &str, condition: &str) -> Gate {
        Gate::new(name, Connective::Inhibit, to_owned(&[input, condition]))
    }

    pub fn null(name: &str, child: &str) -> Gate {
        Gate::new(name, Connective::Null, to_owned(&[child]))
    }
}

fn to_owned(children: &[&str]) -> Vec<String> {
    children.iter().map(|c| c.to_string()).collect()
}

// Getters
impl Gate {
    /// Normalized id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Original display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn connective(&self) -> Connective {
        self.connective
    }

    pub fn children(&self) -> &[String] {
        &self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_gate_and() {
        let gate = Gate::and("Top", &["A", "b"]);
        assert_eq!(gate.id(), "top");
        assert_eq!(gate.name(), "Top");
        assert_eq!(gate.children(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_gate_inhibit() {
        let gate = Gate::inhibit("g", "x", "cond");
        assert_eq!(gate.connective(), Connective::Inhibit);
        assert_eq!(gate.children().len(), 2);
    }

    #[test]
    fn test_arity() {
        assert!(Connective::And.check_arity(2).is_none());
        assert!(Connective::Or.check_arity(1).is_some());
        assert!(Connective::Atleast(2).check_arity(3).is_none());
        assert!(Connective::Atleast(2).check_arity(2).is_some());
        assert!(Connective::Atleast(1).check_arity(3).is_some());
        assert!(Connective::Inhibit.check_arity(3).is_some());
        assert!(Connective::Null.check_arity(1).is_none());
        assert!(Connective::Null.check_arity(2).is_some());
    }

    #[test]
    fn test_display() {
        assert_eq!(Connective::Atleast(2).to_string(), "atleast-2");
        assert_eq!(Connective::Or.to_string(), "or");
    }
}
