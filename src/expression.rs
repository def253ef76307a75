//! Expressions supplying probability values to basic events.
//!
//! Expressions live in an [`ExprArena`] and reference their arguments by [`ExprId`].
//! An argument is always allocated before the expression using it, so the arena is
//! topologically sorted by construction: a single forward pass evaluates every node
//! after its children. Monte Carlo sampling relies on this to draw each node exactly
//! once per trial, so a parameter shared by several events gets one value per trial.
//!
//! Every node yields four values:
//!
//! - [`mean`][ExprArena::mean]: the best estimate,
//! - [`min`][ExprArena::min] and [`max`][ExprArena::max]: low and high bounds,
//! - one stochastic draw, via [`sample_all`][ExprArena::sample_all].
//!
//! Bounds are propagated according to the monotonicity of each formula in each
//! argument. Formulas that are not monotone (GLM, periodic test) report `[0, 1]`.
//!
//! # Example
//!
//! ```
//! use fta_rs::expression::ExprArena;
//!
//! let mut arena = ExprArena::new();
//! let lambda = arena.constant(1e-3);
//! let time = arena.constant(1000.0);
//! let p = arena.exponential(lambda, time);
//!
//! assert!((arena.mean(p) - (1.0 - (-1.0f64).exp())).abs() < 1e-12);
//! assert!(arena.validate(p).is_ok());
//! ```

use std::f64::consts::PI;

use log::debug;
use rand::Rng;

use crate::error::{Error, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ExprId(usize);

impl ExprId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Flavor of the periodic-test model, fixed at construction.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PeriodicTest<I = ExprId> {
    /// Tests and repairs are instantaneous and always successful.
    InstantRepair { lambda: I, tau: I, theta: I, time: I },
    /// Tests are instantaneous, repairs take time with rate `mu`.
    InstantTest { lambda: I, mu: I, tau: I, theta: I, time: I },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Expr<I = ExprId> {
    Constant(f64),
    /// `1 - exp(-lambda * time)`.
    Exponential { lambda: I, time: I },
    /// Probability on demand `gamma`, failure rate `lambda`, repair rate `mu`.
    Glm { gamma: I, lambda: I, mu: I, time: I },
    /// Scale `alpha`, shape `beta`, time shift `t0`.
    Weibull { alpha: I, beta: I, t0: I, time: I },
    PeriodicTest(PeriodicTest<I>),
    Uniform { min: I, max: I },
    Normal { mean: I, sigma: I },
    /// Log-normal deviate given by the parameters of the underlying normal.
    LogNormal { mu: I, sigma: I },
}

impl<A: Copy> PeriodicTest<A> {
    #[inline(always)]
    pub fn fmap<B, F>(&self, mut f: F) -> PeriodicTest<B>
    where
        F: FnMut(A) -> B,
    {
        match *self {
            PeriodicTest::InstantRepair { lambda, tau, theta, time } => PeriodicTest::InstantRepair {
                lambda: f(lambda),
                tau: f(tau),
                theta: f(theta),
                time: f(time),
            },
            PeriodicTest::InstantTest {
                lambda,
                mu,
                tau,
                theta,
                time,
            } => PeriodicTest::InstantTest {
                lambda: f(lambda),
                mu: f(mu),
                tau: f(tau),
                theta: f(theta),
                time: f(time),
            },
        }
    }
}

impl<A: Copy> Expr<A> {
    /// Maps every argument of the node, keeping its shape.
    #[inline(always)]
    pub fn fmap<B, F>(&self, mut f: F) -> Expr<B>
    where
        F: FnMut(A) -> B,
    {
        match *self {
            Expr::Constant(value) => Expr::Constant(value),
            Expr::Exponential { lambda, time } => Expr::Exponential {
                lambda: f(lambda),
                time: f(time),
            },
            Expr::Glm { gamma, lambda, mu, time } => Expr::Glm {
                gamma: f(gamma),
                lambda: f(lambda),
                mu: f(mu),
                time: f(time),
            },
            Expr::Weibull { alpha, beta, t0, time } => Expr::Weibull {
                alpha: f(alpha),
                beta: f(beta),
                t0: f(t0),
                time: f(time),
            },
            Expr::PeriodicTest(test) => Expr::PeriodicTest(test.fmap(f)),
            Expr::Uniform { min, max } => Expr::Uniform { min: f(min), max: f(max) },
            Expr::Normal { mean, sigma } => Expr::Normal {
                mean: f(mean),
                sigma: f(sigma),
            },
            Expr::LogNormal { mu, sigma } => Expr::LogNormal { mu: f(mu), sigma: f(sigma) },
        }
    }

    /// Arguments of the node, in declaration order.
    pub fn args(&self) -> Vec<A> {
        let mut args = Vec::new();
        self.fmap(|a| args.push(a));
        args
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Expr::Constant(_) => "constant",
            Expr::Exponential { .. } => "exponential",
            Expr::Glm { .. } => "glm",
            Expr::Weibull { .. } => "weibull",
            Expr::PeriodicTest(_) => "periodic-test",
            Expr::Uniform { .. } => "uniform-deviate",
            Expr::Normal { .. } => "normal-deviate",
            Expr::LogNormal { .. } => "lognormal-deviate",
        }
    }
}

impl Expr<f64> {
    /// Deterministic value of the node given the values of its arguments.
    ///
    /// Random deviates evaluate to their mean.
    fn compute(&self) -> f64 {
        match *self {
            Expr::Constant(value) => value,
            Expr::Exponential { lambda, time } => exponential(lambda, time),
            Expr::Glm { gamma, lambda, mu, time } => glm(gamma, lambda, mu, time),
            Expr::Weibull { alpha, beta, t0, time } => weibull(alpha, beta, t0, time),
            Expr::PeriodicTest(PeriodicTest::InstantRepair { lambda, tau, theta, time }) => {
                periodic_instant_repair(lambda, tau, theta, time)
            }
            Expr::PeriodicTest(PeriodicTest::InstantTest {
                lambda,
                mu,
                tau,
                theta,
                time,
            }) => periodic_instant_test(lambda, mu, tau, theta, time),
            Expr::Uniform { min, max } => (min + max) / 2.0,
            Expr::Normal { mean, .. } => mean,
            Expr::LogNormal { mu, sigma } => (mu + sigma * sigma / 2.0).exp(),
        }
    }

    /// One draw of the node given sampled values of its arguments.
    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            Expr::Uniform { min, max } => {
                if min < max {
                    rng.random_range(min..max)
                } else {
                    min
                }
            }
            Expr::Normal { mean, sigma } => mean + sigma * standard_normal(rng),
            Expr::LogNormal { mu, sigma } => (mu + sigma * standard_normal(rng)).exp(),
            _ => self.compute(),
        }
    }
}

/// Box-Muller transform.
fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1: f64 = 1.0 - rng.random::<f64>(); // (0, 1]
    let u2: f64 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

pub fn exponential(lambda: f64, time: f64) -> f64 {
    1.0 - (-(lambda * time)).exp()
}

pub fn glm(gamma: f64, lambda: f64, mu: f64, time: f64) -> f64 {
    let r = lambda + mu;
    (lambda - (lambda - gamma * r) * (-r * time).exp()) / r
}

pub fn weibull(alpha: f64, beta: f64, t0: f64, time: f64) -> f64 {
    if time <= t0 {
        return 0.0;
    }
    1.0 - (-((time - t0) / alpha).powf(beta)).exp()
}

pub fn periodic_instant_repair(lambda: f64, tau: f64, theta: f64, time: f64) -> f64 {
    if time <= theta {
        return exponential(lambda, time);
    }
    let delta = (time - theta) % tau;
    exponential(lambda, delta)
}

/// Unavailability with instantaneous tests and exponential repair.
///
/// Right after a test, a component is either available (probability `A`) or under
/// repair (`1 - A`): the test converts an undetected failure into a repair.
/// Between tests, availability follows `A' = -lambda A + mu R`. The availability
/// right after the n-th test is the linear recurrence `A(n+1) = (a - b) A(n) + b`,
/// solved in closed form.
pub fn periodic_instant_test(lambda: f64, mu: f64, tau: f64, theta: f64, time: f64) -> f64 {
    if time <= theta {
        return exponential(lambda, time);
    }

    // Probability that a component under repair at the start of an interval of
    // length `d` is repaired and still functioning at its end.
    let repaired = |d: f64| -> f64 {
        if (lambda - mu).abs() < 1e-12 * (lambda + mu) {
            mu * d * (-lambda * d).exp()
        } else {
            mu * ((-mu * d).exp() - (-lambda * d).exp()) / (lambda - mu)
        }
    };

    let delta = time - theta;
    let num_tests = (delta / tau).floor();
    let d = delta - num_tests * tau;

    let a = (-lambda * tau).exp();
    let b = repaired(tau);
    let first = (-lambda * theta).exp();
    let fixed = b / (1.0 - a + b);
    let steps = num_tests.min(i32::MAX as f64) as i32;
    let available = fixed + (first - fixed) * (a - b).powi(steps);

    let available_now = available * (-lambda * d).exp() + (1.0 - available) * repaired(d);
    (1.0 - available_now).clamp(0.0, 1.0)
}

/// Arena of expressions, topologically sorted by construction.
#[derive(Debug, Default, Clone)]
pub struct ExprArena {
    exprs: Vec<Expr>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    pub fn get(&self, id: ExprId) -> &Expr {
        &self.exprs[id.0]
    }

    /// Adds a node. Every argument must already be in the arena.
    pub fn add(&mut self, expr: Expr) -> ExprId {
        let len = self.exprs.len();
        for arg in expr.args() {
            assert!(arg.0 < len, "Expression argument {:?} is not in the arena", arg);
        }
        self.exprs.push(expr);
        ExprId(len)
    }
}

// Constructors
impl ExprArena {
    pub fn constant(&mut self, value: f64) -> ExprId {
        self.add(Expr::Constant(value))
    }

    pub fn exponential(&mut self, lambda: ExprId, time: ExprId) -> ExprId {
        self.add(Expr::Exponential { lambda, time })
    }

    pub fn glm(&mut self, gamma: ExprId, lambda: ExprId, mu: ExprId, time: ExprId) -> ExprId {
        self.add(Expr::Glm { gamma, lambda, mu, time })
    }

    pub fn weibull(&mut self, alpha: ExprId, beta: ExprId, t0: ExprId, time: ExprId) -> ExprId {
        self.add(Expr::Weibull { alpha, beta, t0, time })
    }

    pub fn periodic_test(&mut self, lambda: ExprId, tau: ExprId, theta: ExprId, time: ExprId) -> ExprId {
        self.add(Expr::PeriodicTest(PeriodicTest::InstantRepair { lambda, tau, theta, time }))
    }

    pub fn periodic_test_with_repair(
        &mut self,
        lambda: ExprId,
        mu: ExprId,
        tau: ExprId,
        theta: ExprId,
        time: ExprId,
    ) -> ExprId {
        self.add(Expr::PeriodicTest(PeriodicTest::InstantTest {
            lambda,
            mu,
            tau,
            theta,
            time,
        }))
    }

    pub fn uniform(&mut self, min: ExprId, max: ExprId) -> ExprId {
        self.add(Expr::Uniform { min, max })
    }

    pub fn normal(&mut self, mean: ExprId, sigma: ExprId) -> ExprId {
        self.add(Expr::Normal { mean, sigma })
    }

    pub fn lognormal(&mut self, mu: ExprId, sigma: ExprId) -> ExprId {
        self.add(Expr::LogNormal { mu, sigma })
    }
}

// Evaluation
impl ExprArena {
    /// Best estimate.
    pub fn mean(&self, id: ExprId) -> f64 {
        self.get(id).fmap(|arg| self.mean(arg)).compute()
    }

    /// Low bound.
    pub fn min(&self, id: ExprId) -> f64 {
        match *self.get(id) {
            Expr::Constant(value) => value,
            Expr::Exponential { lambda, time } => exponential(self.min(lambda), self.min(time)),
            Expr::Weibull { alpha, beta, t0, time } => {
                let (alpha, t0, time) = (self.max(alpha), self.max(t0), self.min(time));
                // Below the scale, a larger shape lowers the probability.
                let beta = if time - t0 < alpha { self.max(beta) } else { self.min(beta) };
                weibull(alpha, beta, t0, time)
            }
            Expr::Glm { .. } | Expr::PeriodicTest(_) => 0.0,
            Expr::Uniform { min, .. } => self.min(min),
            Expr::Normal { mean, sigma } => self.min(mean) - 6.0 * self.max(sigma),
            Expr::LogNormal { .. } => 0.0,
        }
    }

    /// High bound.
    pub fn max(&self, id: ExprId) -> f64 {
        match *self.get(id) {
            Expr::Constant(value) => value,
            Expr::Exponential { lambda, time } => exponential(self.max(lambda), self.max(time)),
            Expr::Weibull { alpha, beta, t0, time } => {
                let (alpha, t0, time) = (self.min(alpha), self.min(t0), self.max(time));
                let beta = if time - t0 < alpha { self.min(beta) } else { self.max(beta) };
                weibull(alpha, beta, t0, time)
            }
            Expr::Glm { .. } | Expr::PeriodicTest(_) => 1.0,
            Expr::Uniform { max, .. } => self.max(max),
            Expr::Normal { mean, sigma } => self.max(mean) + 6.0 * self.max(sigma),
            Expr::LogNormal { mu, sigma } => (self.max(mu) + 6.0 * self.max(sigma)).exp(),
        }
    }

    /// Best estimates of every node, in arena order.
    pub fn mean_all(&self) -> Vec<f64> {
        let mut values: Vec<f64> = Vec::with_capacity(self.exprs.len());
        for expr in self.exprs.iter() {
            let value = expr.fmap(|arg| values[arg.0]).compute();
            values.push(value);
        }
        values
    }

    /// One joint draw of every node, in arena order.
    pub fn sample_all<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        let mut values = Vec::with_capacity(self.exprs.len());
        self.sample_into(rng, &mut values);
        values
    }

    /// Same as [`sample_all`][Self::sample_all], reusing the buffer.
    pub fn sample_into<R: Rng + ?Sized>(&self, rng: &mut R, values: &mut Vec<f64>) {
        values.clear();
        for expr in self.exprs.iter() {
            let value = expr.fmap(|arg| values[arg.0]).draw(rng);
            values.push(value);
        }
    }
}

// Validation
impl ExprArena {
    /// Checks the domain of every parameter reachable from `id`.
    ///
    /// Parameters are themselves expressions, so checks use their best estimates.
    pub fn validate(&self, id: ExprId) -> Result<()> {
        let expr = self.get(id);
        for arg in expr.args() {
            self.validate(arg)?;
        }

        let fail = |what: &str, value: f64| -> Result<()> {
            debug!("validate({:?}): {} = {}", id, what, value);
            Err(Error::InvalidArgument(format!(
                "{} expression #{}: {}, got {}",
                expr.kind(),
                id.0,
                what,
                value
            )))
        };
        let m = |arg: ExprId| self.mean(arg);

        match *expr {
            Expr::Constant(_) => {}
            Expr::Exponential { lambda, time } => {
                if m(lambda) < 0.0 {
                    return fail("failure rate must be non-negative", m(lambda));
                }
                if m(time) < 0.0 {
                    return fail("mission time must be non-negative", m(time));
                }
            }
            Expr::Glm { gamma, lambda, mu, time } => {
                if !(0.0..=1.0).contains(&m(gamma)) {
                    return fail("probability on demand must be in [0, 1]", m(gamma));
                }
                if m(lambda) < 0.0 {
                    return fail("failure rate must be non-negative", m(lambda));
                }
                if m(mu) < 0.0 {
                    return fail("repair rate must be non-negative", m(mu));
                }
                if m(lambda) + m(mu) <= 0.0 {
                    return fail("sum of failure and repair rates must be positive", m(lambda) + m(mu));
                }
                if m(time) < 0.0 {
                    return fail("mission time must be non-negative", m(time));
                }
            }
            Expr::Weibull { alpha, beta, t0, time } => {
                if m(alpha) <= 0.0 {
                    return fail("scale parameter must be positive", m(alpha));
                }
                if m(beta) <= 0.0 {
                    return fail("shape parameter must be positive", m(beta));
                }
                if m(t0) < 0.0 {
                    return fail("time shift must be non-negative", m(t0));
                }
                if m(time) < 0.0 {
                    return fail("mission time must be non-negative", m(time));
                }
            }
            Expr::PeriodicTest(test) => {
                let (lambda, mu, tau, theta, time) = match test {
                    PeriodicTest::InstantRepair { lambda, tau, theta, time } => (lambda, None, tau, theta, time),
                    PeriodicTest::InstantTest {
                        lambda,
                        mu,
                        tau,
                        theta,
                        time,
                    } => (lambda, Some(mu), tau, theta, time),
                };
                if m(lambda) < 0.0 {
                    return fail("failure rate must be non-negative", m(lambda));
                }
                if let Some(mu) = mu {
                    if m(mu) <= 0.0 {
                        return fail("repair rate must be positive", m(mu));
                    }
                }
                if m(tau) <= 0.0 {
                    return fail("time between tests must be positive", m(tau));
                }
                if m(theta) < 0.0 {
                    return fail("time before the first test must be non-negative", m(theta));
                }
                if m(time) < 0.0 {
                    return fail("mission time must be non-negative", m(time));
                }
            }
            Expr::Uniform { min, max } => {
                if m(min) > m(max) {
                    return fail("lower bound must not exceed the upper bound", m(min));
                }
            }
            Expr::Normal { sigma, .. } | Expr::LogNormal { sigma, .. } => {
                if m(sigma) <= 0.0 {
                    return fail("standard deviation must be positive", m(sigma));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use test_log::test;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_exponential_zero_rate() {
        let mut arena = ExprArena::new();
        let lambda = arena.constant(0.0);
        let time = arena.constant(500.0);
        let p = arena.exponential(lambda, time);
        assert_eq!(arena.mean(p), 0.0);
        assert!(arena.validate(p).is_ok());
    }

    #[test]
    fn test_exponential_zero_time() {
        let mut arena = ExprArena::new();
        let lambda = arena.constant(0.3);
        let time = arena.constant(0.0);
        let p = arena.exponential(lambda, time);
        assert_eq!(arena.mean(p), 0.0);
    }

    #[test]
    fn test_exponential_negative_arguments() {
        let mut arena = ExprArena::new();
        let neg = arena.constant(-1.0);
        let pos = arena.constant(1.0);
        let bad_rate = arena.exponential(neg, pos);
        let bad_time = arena.exponential(pos, neg);
        assert!(matches!(arena.validate(bad_rate), Err(Error::InvalidArgument(_))));
        assert!(matches!(arena.validate(bad_time), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_exponential_bounds_follow_arguments() {
        let mut arena = ExprArena::new();
        let lo = arena.constant(1e-3);
        let hi = arena.constant(3e-3);
        let lambda = arena.uniform(lo, hi);
        let time = arena.constant(100.0);
        let p = arena.exponential(lambda, time);
        assert!(approx(arena.min(p), exponential(1e-3, 100.0)));
        assert!(approx(arena.max(p), exponential(3e-3, 100.0)));
        assert!(approx(arena.mean(p), exponential(2e-3, 100.0)));
        assert!(arena.min(p) <= arena.mean(p) && arena.mean(p) <= arena.max(p));
    }

    #[test]
    fn test_glm() {
        // With no repair, GLM is exponential plus demand failure.
        let g = glm(0.0, 0.01, 0.0, 100.0);
        assert!(approx(g, exponential(0.01, 100.0)));
        // At time zero, only demand failure.
        assert!(approx(glm(0.2, 0.01, 0.1, 0.0), 0.2));
        // Steady state is lambda / (lambda + mu).
        assert!(approx(glm(0.0, 0.01, 0.09, 1e6), 0.1));
    }

    #[test]
    fn test_glm_validation() {
        let mut arena = ExprArena::new();
        let gamma = arena.constant(1.5);
        let zero = arena.constant(0.0);
        let time = arena.constant(10.0);
        let bad_gamma = arena.glm(gamma, zero, zero, time);
        assert!(arena.validate(bad_gamma).is_err());

        let ok_gamma = arena.constant(0.5);
        let no_rates = arena.glm(ok_gamma, zero, zero, time);
        assert!(arena.validate(no_rates).is_err());
    }

    #[test]
    fn test_weibull() {
        // Shape 1 is the exponential distribution with rate 1/alpha.
        assert!(approx(weibull(100.0, 1.0, 0.0, 50.0), exponential(0.01, 50.0)));
        // Before the time shift nothing can fail.
        assert_eq!(weibull(100.0, 2.0, 10.0, 5.0), 0.0);

        let mut arena = ExprArena::new();
        let alpha = arena.constant(0.0);
        let beta = arena.constant(2.0);
        let t0 = arena.constant(0.0);
        let time = arena.constant(1.0);
        let w = arena.weibull(alpha, beta, t0, time);
        assert!(arena.validate(w).is_err());
    }

    #[test]
    fn test_weibull_bounds_with_uncertain_shape() {
        let mut arena = ExprArena::new();
        let lo = arena.constant(1.0);
        let hi = arena.constant(2.0);
        let beta = arena.uniform(lo, hi);
        let t0 = arena.constant(0.0);
        let time = arena.constant(50.0);

        // Scaled time 0.5: the probability falls as the shape grows.
        let slow = arena.constant(100.0);
        let early = arena.weibull(slow, beta, t0, time);
        assert!(approx(arena.min(early), weibull(100.0, 2.0, 0.0, 50.0)));
        assert!(approx(arena.max(early), weibull(100.0, 1.0, 0.0, 50.0)));

        // Scaled time 5: the probability rises with the shape.
        let fast = arena.constant(10.0);
        let late = arena.weibull(fast, beta, t0, time);
        assert!(approx(arena.min(late), weibull(10.0, 1.0, 0.0, 50.0)));
        assert!(approx(arena.max(late), weibull(10.0, 2.0, 0.0, 50.0)));

        for w in [early, late] {
            assert!(arena.min(w) <= arena.mean(w), "{} > {}", arena.min(w), arena.mean(w));
            assert!(arena.mean(w) <= arena.max(w), "{} > {}", arena.mean(w), arena.max(w));
        }
    }

    #[test]
    fn test_periodic_instant_repair() {
        // Before the first test: plain exponential.
        assert!(approx(periodic_instant_repair(0.01, 10.0, 20.0, 15.0), exponential(0.01, 15.0)));
        // Right after a test the component is as good as new.
        assert!(approx(periodic_instant_repair(0.01, 10.0, 20.0, 40.0), 0.0));
        // Within a period, only the time since the last test matters.
        assert!(approx(periodic_instant_repair(0.01, 10.0, 20.0, 43.0), exponential(0.01, 3.0)));
    }

    #[test]
    fn test_periodic_instant_test_converges_to_instant_repair() {
        // A very fast repair behaves like an instantaneous one.
        let slow = periodic_instant_test(0.01, 1e9, 10.0, 20.0, 43.0);
        let fast = periodic_instant_repair(0.01, 10.0, 20.0, 43.0);
        assert!((slow - fast).abs() < 1e-6);
    }

    #[test]
    fn test_periodic_instant_test_repair_pending() {
        // Right after the first test, the unavailability is the failure probability
        // accumulated before it (all of it is now under repair).
        let q = periodic_instant_test(0.01, 0.1, 10.0, 20.0, 20.0 + 1e-12);
        assert!((q - exponential(0.01, 20.0)).abs() < 1e-9);
        for t in [5.0, 25.0, 100.0, 1234.5] {
            let q = periodic_instant_test(0.01, 0.1, 10.0, 20.0, t);
            assert!((0.0..=1.0).contains(&q), "q({}) = {}", t, q);
        }
    }

    #[test]
    fn test_periodic_validation() {
        let mut arena = ExprArena::new();
        let lambda = arena.constant(0.01);
        let tau = arena.constant(0.0);
        let theta = arena.constant(1.0);
        let time = arena.constant(5.0);
        let p = arena.periodic_test(lambda, tau, theta, time);
        assert!(arena.validate(p).is_err());
        assert_eq!(arena.min(p), 0.0);
        assert_eq!(arena.max(p), 1.0);
    }

    #[test]
    fn test_mean_all_matches_mean() {
        let mut arena = ExprArena::new();
        let lambda = arena.constant(2e-3);
        let time = arena.constant(100.0);
        let p = arena.exponential(lambda, time);
        let mu = arena.constant(-3.0);
        let sigma = arena.constant(0.5);
        let ln = arena.lognormal(mu, sigma);
        let all = arena.mean_all();
        assert_eq!(all.len(), arena.len());
        assert!(approx(all[p.index()], arena.mean(p)));
        assert!(approx(all[ln.index()], (-3.0f64 + 0.125).exp()));
    }

    #[test]
    fn test_sample_shares_parameters() {
        let mut arena = ExprArena::new();
        let lo = arena.constant(0.001);
        let hi = arena.constant(0.01);
        let lambda = arena.uniform(lo, hi);
        let t1 = arena.constant(10.0);
        let p1 = arena.exponential(lambda, t1);
        let p2 = arena.exponential(lambda, t1);

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            let values = arena.sample_all(&mut rng);
            let l = values[lambda.index()];
            assert!((0.001..0.01).contains(&l));
            assert_eq!(values[p1.index()], values[p2.index()]);
        }
    }

    #[test]
    fn test_normal_sample_mean() {
        let mut arena = ExprArena::new();
        let mean = arena.constant(0.2);
        let sigma = arena.constant(0.01);
        let n = arena.normal(mean, sigma);

        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let trials = 20_000;
        let total: f64 = (0..trials).map(|_| arena.sample_all(&mut rng)[n.index()]).sum();
        assert!((total / trials as f64 - 0.2).abs() < 1e-3);
    }

    #[test]
    #[should_panic(expected = "is not in the arena")]
    fn test_dangling_argument_panics() {
        let mut arena = ExprArena::new();
        arena.add(Expr::Exponential {
            lambda: ExprId(3),
            time: ExprId(4),
        });
    }
}
