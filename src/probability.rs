//! Top-event probability from minimal cut sets.
//!
//! The exact method is the inclusion-exclusion expansion of the union of cut sets:
//!
//! ```text
//! P(C1 | ... | Cn) = sum P(Ci) - sum P(Ci & Cj) + sum P(Ci & Cj & Ck) - ...
//! ```
//!
//! where every term is the product of the probabilities of the basic events in the
//! union of the participating cut sets. There are `2^n - 1` terms, so the series is
//! generated lazily by increasing combination size and cut after `nsums` terms.
//! The rare-event approximation keeps only the first sum.
//!
//! The series is built once as an [`Equation`] of positive and negative terms,
//! which Monte Carlo simulation then re-evaluates for every sampled set of
//! basic-event probabilities.

use std::cmp::Ordering;

use log::{debug, info};
use num_bigint::BigUint;

use crate::analysis::push_warning;
use crate::bitset::BitSet;
use crate::combination::{binomial, Subsets};
use crate::cut_set::{CutSet, MinimalCutSets};
use crate::error::Result;
use crate::fault_tree::FaultTree;
use crate::model::Model;
use crate::types::{BasicId, EventRef};

/// Rare-event approximation is flagged as inaccurate above this cut-set probability.
pub const RARE_EVENT_THRESHOLD: f64 = 0.1;

/// Probability that every event of the set occurs: the product of member
/// probabilities, 1 for the empty set.
pub fn prob_and(events: &BitSet, probs: &[f64]) -> f64 {
    events.iter().map(|i| probs[i]).product()
}

/// Inclusion-exclusion over `cut_sets`, cut after `nsums` terms.
pub fn prob_or(cut_sets: &[CutSet], probs: &[f64], nsums: usize) -> f64 {
    Equation::new(cut_sets, nsums).evaluate(probs)
}

/// Sum of cut-set probabilities. Not clamped.
pub fn rare_event(cut_sets: &[CutSet], probs: &[f64]) -> f64 {
    cut_sets.iter().map(|cs| prob_and(cs.bits(), probs)).sum()
}

/// Number of terms of the full inclusion-exclusion series over `n` sets: `2^n - 1`.
pub fn total_terms(n: usize) -> BigUint {
    (BigUint::from(1u32) << n) - 1u32
}

/// Numbers of positive and negative terms among the first `nsums` terms over `n` sets.
fn kept_terms(n: usize, nsums: usize) -> (usize, usize) {
    let mut budget = nsums;
    let (mut pos, mut neg) = (0, 0);
    for k in 1..=n {
        if budget == 0 {
            break;
        }
        let count = binomial(n, k).min(budget);
        budget -= count;
        if k % 2 == 1 {
            pos += count;
        } else {
            neg += count;
        }
    }
    (pos, neg)
}

/// Signed terms of a (possibly truncated) inclusion-exclusion series.
///
/// Each term is the union of the basic events of one combination of cut sets.
/// Terms from odd-sized combinations are added, even-sized ones subtracted.
#[derive(Debug, Clone, Default)]
pub struct Equation {
    pos_terms: Vec<BitSet>,
    neg_terms: Vec<BitSet>,
    total_terms: BigUint,
}

impl Equation {
    pub fn new(cut_sets: &[CutSet], nsums: usize) -> Self {
        let (num_pos, num_neg) = kept_terms(cut_sets.len(), nsums);
        let mut pos_terms = Vec::with_capacity(num_pos);
        let mut neg_terms = Vec::with_capacity(num_neg);
        for combination in Subsets::new(cut_sets.len()).take(nsums) {
            let mut term = BitSet::empty();
            for &i in &combination {
                term.union_with(cut_sets[i].bits());
            }
            if combination.len() % 2 == 1 {
                pos_terms.push(term);
            } else {
                neg_terms.push(term);
            }
        }
        let equation = Self {
            pos_terms,
            neg_terms,
            total_terms: total_terms(cut_sets.len()),
        };
        debug!(
            "Equation over {} cut sets: {} positive, {} negative terms",
            cut_sets.len(),
            equation.pos_terms.len(),
            equation.neg_terms.len()
        );
        equation
    }

    pub fn pos_terms(&self) -> &[BitSet] {
        &self.pos_terms
    }

    pub fn neg_terms(&self) -> &[BitSet] {
        &self.neg_terms
    }

    /// Number of terms kept.
    pub fn num_terms(&self) -> usize {
        self.pos_terms.len() + self.neg_terms.len()
    }

    /// Number of terms of the full series.
    pub fn total_terms(&self) -> &BigUint {
        &self.total_terms
    }

    pub fn is_truncated(&self) -> bool {
        BigUint::from(self.num_terms()) < self.total_terms
    }

    /// Warning text for a series cut before its last term.
    pub fn truncation_warning(&self) -> Option<String> {
        self.is_truncated().then(|| {
            format!(
                "Inclusion-exclusion series truncated after {} of {} terms",
                self.num_terms(),
                self.total_terms
            )
        })
    }

    pub fn evaluate(&self, probs: &[f64]) -> f64 {
        let pos: f64 = self.pos_terms.iter().map(|t| prob_and(t, probs)).sum();
        let neg: f64 = self.neg_terms.iter().map(|t| prob_and(t, probs)).sum();
        pos - neg
    }
}

/// Contribution of one basic event to the top-event probability.
#[derive(Debug, Clone, PartialEq)]
pub struct Importance {
    pub event: BasicId,
    pub name: String,
    /// Sum of the probabilities of the cut sets containing the event.
    pub contribution: f64,
    /// Contribution relative to the top-event probability.
    pub share: f64,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Method {
    Exact,
    RareEvent,
}

#[derive(Debug, Clone)]
pub struct ProbabilityReport {
    pub method: Method,
    /// Top-event probability, in [0, 1].
    pub p_total: f64,
    /// Cut sets with their probabilities, most probable first.
    pub cut_sets: Vec<(CutSet, f64)>,
    /// Basic events ranked by decreasing contribution.
    pub importance: Vec<Importance>,
    pub num_terms: usize,
    pub total_terms: BigUint,
    pub warnings: Vec<String>,
}

/// Probability analysis of one validated tree.
pub struct ProbabilityAnalysis<'a> {
    model: &'a Model,
    tree: &'a FaultTree,
    nsums: usize,
    rare_event: bool,
}

impl<'a> ProbabilityAnalysis<'a> {
    pub fn new(model: &'a Model, tree: &'a FaultTree, nsums: usize, rare_event: bool) -> Self {
        Self {
            model,
            tree,
            nsums,
            rare_event,
        }
    }

    /// Best-estimate probability of every basic event, indexed by [`BasicId`].
    ///
    /// Only the events of the tree are evaluated; the others stay at 0.
    pub fn probabilities(&self) -> Result<Vec<f64>> {
        let mut probs = vec![0.0; self.model.num_basic_events()];
        for &b in self.tree.basic_events() {
            probs[b.index()] = self.model.probability(b)?;
        }
        Ok(probs)
    }

    pub fn analyze(&self, mcs: &MinimalCutSets) -> Result<ProbabilityReport> {
        let probs = self.probabilities()?;
        let mut warnings = Vec::new();

        let mut cut_sets: Vec<(CutSet, f64)> = mcs
            .cut_sets()
            .iter()
            .map(|cs| (cs.clone(), prob_and(cs.bits(), &probs)))
            .collect();

        let (method, p_total, num_terms, total) = if self.rare_event {
            let sum: f64 = cut_sets.iter().map(|(_, p)| p).sum();
            if let Some((cs, p)) = cut_sets.iter().find(|(_, p)| *p > RARE_EVENT_THRESHOLD) {
                push_warning(
                    &mut warnings,
                    format!(
                        "Rare-event approximation may be inaccurate: cut set {{{}}} has probability {:.4} > {}",
                        cs.names(self.model).join(", "),
                        p,
                        RARE_EVENT_THRESHOLD
                    ),
                );
            }
            let p = if sum > 1.0 {
                push_warning(
                    &mut warnings,
                    format!("Rare-event approximation exceeds 1 ({:.4}); clamped to 1", sum),
                );
                1.0
            } else {
                sum
            };
            (Method::RareEvent, p, cut_sets.len(), BigUint::from(cut_sets.len()))
        } else {
            let sets: Vec<CutSet> = mcs.cut_sets().to_vec();
            let equation = Equation::new(&sets, self.nsums);
            let value = equation.evaluate(&probs);
            if let Some(message) = equation.truncation_warning() {
                push_warning(&mut warnings, message);
            }
            let p = value.clamp(0.0, 1.0);
            if p != value {
                push_warning(
                    &mut warnings,
                    format!("Truncated series gave {:.6}; clamped to {}", value, p),
                );
            }
            (Method::Exact, p, equation.num_terms(), equation.total_terms().clone())
        };

        cut_sets.sort_by(|(a, pa), (b, pb)| pb.partial_cmp(pa).unwrap_or(Ordering::Equal).then_with(|| a.cmp(b)));
        let importance = self.importance(&cut_sets, p_total);

        info!(
            "Fault tree '{}': top-event probability {:.6e} ({:?}, {} terms)",
            self.tree.name(),
            p_total,
            method,
            num_terms
        );

        Ok(ProbabilityReport {
            method,
            p_total,
            cut_sets,
            importance,
            num_terms,
            total_terms: total,
            warnings,
        })
    }

    fn importance(&self, cut_sets: &[(CutSet, f64)], p_total: f64) -> Vec<Importance> {
        let mut contribution = vec![0.0; self.model.num_basic_events()];
        let mut seen = BitSet::new(self.model.num_basic_events());
        for (cs, p) in cut_sets {
            for b in cs.events() {
                contribution[b.index()] += p;
                seen.insert(b.index());
            }
        }

        let mut ranked: Vec<Importance> = seen
            .iter()
            .map(|i| {
                let event = BasicId::new(i);
                let c = contribution[i];
                Importance {
                    event,
                    name: self.model.name_of(EventRef::Basic(event)).to_string(),
                    contribution: c,
                    share: if p_total > 0.0 { c / p_total } else { 0.0 },
                }
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.contribution
                .partial_cmp(&a.contribution)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.event.cmp(&b.event))
        });
        ranked
    }
}
