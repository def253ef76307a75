//! Monte Carlo simulation of the top-event probability.
//!
//! The inclusion-exclusion [`Equation`] is built once from the minimal cut sets.
//! Each trial then draws one value from every expression of the model, reads the
//! probability of every basic event of the tree, and evaluates the equation.
//! Expressions are sampled in arena order, one draw per node, so a parameter
//! shared by several events takes the same value across them within a trial.
//!
//! Trial `i` seeds its own generator with `seed + i`, so the samples do not depend
//! on how rayon schedules the trials.

use std::fmt::{Display, Formatter};

use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::cut_set::MinimalCutSets;
use crate::error::{Error, Result};
use crate::expression::ExprId;
use crate::fault_tree::FaultTree;
use crate::model::Model;
use crate::probability::Equation;
use crate::types::BasicId;

/// Two-sided 95% normal quantile.
const Z_95: f64 = 1.959_963_984_540_054;

/// Quantile levels reported with every simulation.
pub const QUANTILES: [f64; 5] = [0.05, 0.25, 0.5, 0.75, 0.95];

/// A confidence interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    /// Confidence level (e.g., 0.95 for 95%).
    pub confidence: f64,
}

impl ConfidenceInterval {
    pub fn new(lower: f64, upper: f64, confidence: f64) -> Self {
        Self { lower, upper, confidence }
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

impl Display for ConfidenceInterval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:.6}, {:.6}] ({:.0}% CI)", self.lower, self.upper, self.confidence * 100.0)
    }
}

/// Summary of the sampled top-event probabilities.
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    /// Sample size
    pub n: usize,
    pub mean: f64,
    /// Unbiased sample variance (n - 1)
    pub variance: f64,
    pub std_dev: f64,
    /// Standard error of the mean
    pub std_error: f64,
    pub min: f64,
    pub max: f64,
    /// 95% confidence interval of the mean
    pub confidence_interval: ConfidenceInterval,
    /// `(level, value)` pairs for [`QUANTILES`]
    pub quantiles: Vec<(f64, f64)>,
}

impl Statistics {
    /// Computes statistics from a non-empty sample.
    pub fn from_sample(sample: &[f64]) -> Option<Self> {
        if sample.is_empty() {
            return None;
        }

        let n = sample.len();
        let mean = sample.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            sample.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let std_dev = variance.sqrt();
        let std_error = std_dev / (n as f64).sqrt();
        let margin = Z_95 * std_error;

        let mut sorted = sample.to_vec();
        sorted.sort_by(f64::total_cmp);
        let quantiles = QUANTILES.iter().map(|&q| (q, quantile(&sorted, q))).collect();

        Some(Self {
            n,
            mean,
            variance,
            std_dev,
            std_error,
            min: sorted[0],
            max: sorted[n - 1],
            confidence_interval: ConfidenceInterval::new(mean - margin, mean + margin, 0.95),
            quantiles,
        })
    }

    pub fn quantile(&self, level: f64) -> Option<f64> {
        self.quantiles
            .iter()
            .find(|(q, _)| (q - level).abs() < 1e-12)
            .map(|&(_, v)| v)
    }

    pub fn median(&self) -> Option<f64> {
        self.quantile(0.5)
    }
}

/// Linear interpolation between the closest ranks of a sorted sample.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Monte Carlo estimator for one validated tree.
pub struct MonteCarlo<'a> {
    model: &'a Model,
    /// Basic events of the tree with the expressions they read.
    events: Vec<(BasicId, ExprId)>,
    equation: Equation,
    num_trials: usize,
    seed: u64,
}

impl<'a> MonteCarlo<'a> {
    pub fn new(
        model: &'a Model,
        tree: &FaultTree,
        mcs: &MinimalCutSets,
        nsums: usize,
        num_trials: usize,
        seed: u64,
    ) -> Result<Self> {
        if num_trials == 0 {
            return Err(Error::InvalidSettings("number of trials must be positive".to_string()));
        }

        let mut events = Vec::with_capacity(tree.basic_events().len());
        for &b in tree.basic_events() {
            let event = model.basic_event(b);
            let expr = event
                .expression()
                .ok_or_else(|| Error::MissingProbability(event.name().to_string()))?;
            model.expressions().validate(expr)?;
            events.push((b, expr));
        }

        let equation = Equation::new(mcs.cut_sets(), nsums);
        Ok(Self {
            model,
            events,
            equation,
            num_trials,
            seed,
        })
    }

    pub fn equation(&self) -> &Equation {
        &self.equation
    }

    /// Top-event probability for trial `i`.
    pub fn sample(&self, i: u64) -> f64 {
        let mut values = Vec::new();
        let mut probs = vec![0.0; self.model.num_basic_events()];
        self.sample_with(i, &mut values, &mut probs)
    }

    fn sample_with(&self, i: u64, values: &mut Vec<f64>, probs: &mut [f64]) -> f64 {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(i));
        self.model.expressions().sample_into(&mut rng, values);
        for &(b, expr) in &self.events {
            probs[b.index()] = values[expr.index()].clamp(0.0, 1.0);
        }
        self.equation.evaluate(probs).clamp(0.0, 1.0)
    }

    /// Runs every trial in parallel and returns the samples, in trial order.
    pub fn samples(&self) -> Vec<f64> {
        let n = self.model.num_basic_events();
        (0..self.num_trials)
            .into_par_iter()
            .map_init(
                || (Vec::new(), vec![0.0; n]),
                |(values, probs), i| self.sample_with(i as u64, values, probs),
            )
            .collect()
    }

    pub fn run(&self) -> Result<Statistics> {
        debug!(
            "Monte Carlo: {} trials over {} terms, seed {}",
            self.num_trials,
            self.equation.num_terms(),
            self.seed
        );
        let samples = self.samples();
        let stats = Statistics::from_sample(&samples)
            .ok_or_else(|| Error::InvalidSettings("number of trials must be positive".to_string()))?;
        info!(
            "Monte Carlo: mean {:.6e}, std dev {:.3e}, {}",
            stats.mean, stats.std_dev, stats.confidence_interval
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::cut_set::CutSetGenerator;
    use crate::gate::Gate;
    use test_log::test;

    fn two_pumps(model: &mut Model, pa: ExprId, pb: ExprId) -> FaultTree {
        let top = model.add_gate(Gate::or("top", &["pump_a", "pump_b"])).unwrap();
        model.add_basic_event("pump_a", Some(pa)).unwrap();
        model.add_basic_event("pump_b", Some(pb)).unwrap();
        let mut tree = FaultTree::new("pumps");
        tree.add_gate(model, top).unwrap();
        tree.validate(model).unwrap();
        tree
    }

    #[test]
    fn test_statistics() {
        let stats = Statistics::from_sample(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(stats.n, 5);
        assert_eq!(stats.mean, 3.0);
        assert!((stats.variance - 2.5).abs() < 1e-12);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 5.0);
        assert_eq!(stats.median(), Some(3.0));
        assert_eq!(stats.quantile(0.25), Some(2.0));
        assert!(stats.confidence_interval.contains(3.0));
        assert!(Statistics::from_sample(&[]).is_none());
    }

    #[test]
    fn test_constant_probabilities() {
        let mut model = Model::new();
        let pa = model.expressions_mut().constant(0.1);
        let pb = model.expressions_mut().constant(0.2);
        let tree = two_pumps(&mut model, pa, pb);
        let mcs = CutSetGenerator::new(&model, &tree, 20).generate().unwrap();

        let mc = MonteCarlo::new(&model, &tree, &mcs, 1_000_000, 100, 0).unwrap();
        let stats = mc.run().unwrap();
        assert!((stats.mean - 0.28).abs() < 1e-12);
        assert!(stats.std_dev < 1e-12);
    }

    #[test]
    fn test_uniform_probabilities() {
        let mut model = Model::new();
        let lo = model.expressions_mut().constant(0.0);
        let hi_a = model.expressions_mut().constant(0.2);
        let hi_b = model.expressions_mut().constant(0.4);
        let pa = model.expressions_mut().uniform(lo, hi_a);
        let pb = model.expressions_mut().uniform(lo, hi_b);
        let tree = two_pumps(&mut model, pa, pb);
        let mcs = CutSetGenerator::new(&model, &tree, 20).generate().unwrap();

        // E[1 - (1 - a)(1 - b)] = 1 - 0.9 * 0.8 = 0.28 for independent uniforms.
        let mc = MonteCarlo::new(&model, &tree, &mcs, 1_000_000, 100_000, 7).unwrap();
        let stats = mc.run().unwrap();
        assert!((stats.mean - 0.28).abs() < 0.01, "mean = {}", stats.mean);
        assert!(stats.std_dev > 0.0);
        assert!(stats.min >= 0.0 && stats.max <= 1.0);
    }

    #[test]
    fn test_reproducible() {
        let mut model = Model::new();
        let mu = model.expressions_mut().constant(-3.0);
        let sigma = model.expressions_mut().constant(0.5);
        let pa = model.expressions_mut().lognormal(mu, sigma);
        let pb = model.expressions_mut().lognormal(mu, sigma);
        let tree = two_pumps(&mut model, pa, pb);
        let mcs = CutSetGenerator::new(&model, &tree, 20).generate().unwrap();

        let mc = MonteCarlo::new(&model, &tree, &mcs, 1_000_000, 1000, 42).unwrap();
        let first = mc.samples();
        let second = mc.samples();
        assert_eq!(first, second);
        assert_eq!(first[17], mc.sample(17));
    }

    #[test]
    fn test_zero_trials() {
        let mut model = Model::new();
        let pa = model.expressions_mut().constant(0.1);
        let pb = model.expressions_mut().constant(0.2);
        let tree = two_pumps(&mut model, pa, pb);
        let mcs = CutSetGenerator::new(&model, &tree, 20).generate().unwrap();
        assert!(matches!(
            MonteCarlo::new(&model, &tree, &mcs, 1_000_000, 0, 0),
            Err(Error::InvalidSettings(_))
        ));
    }
}
