//! # fta-rs: Fault Tree Analysis in Rust
//!
//! **`fta-rs`** analyzes fault trees for probabilistic risk and reliability assessment.
//! It validates the structure of a tree, finds its **minimal cut sets**, and computes the
//! probability of the top event both analytically and by Monte Carlo simulation.
//!
//! ## What is a fault tree?
//!
//! A fault tree describes how an undesired *top event* (a system failure) follows from
//! *basic events* (component failures) through logic gates. A **cut set** is a set of
//! basic events whose joint occurrence causes the top event; it is **minimal** if no
//! proper subset of it is a cut set. Minimal cut sets are the canonical, gate-free form
//! of a coherent fault tree, and every probability computation here starts from them.
//!
//! ## Key Features
//!
//! - **Arena model**: every event lives in a [`Model`][crate::model::Model] and is addressed by a
//!   stable id. Gates keep forward child lists only; parents are derived on demand.
//! - **Structural validation**: duplicate and dangling gates, cycles (with the full path),
//!   undefined children and malformed gates are reported as typed [`Error`][crate::error::Error]s.
//! - **Coherent gates**: AND, OR, k-out-of-n vote, INHIBIT, NULL, and boolean house events.
//! - **Probability**: truncated inclusion-exclusion, rare-event approximation, importance ranking.
//! - **Uncertainty**: basic-event probabilities are expressions (exponential, GLM, Weibull,
//!   periodic test, random deviates) sampled by a parallel, seed-reproducible Monte Carlo engine.
//!
//! ## Basic Usage
//!
//! ```rust
//! use fta_rs::analysis::FaultTreeAnalysis;
//! use fta_rs::fault_tree::FaultTree;
//! use fta_rs::gate::Gate;
//! use fta_rs::model::Model;
//! use fta_rs::settings::Settings;
//!
//! // 1. Declare gates and basic events
//! let mut model = Model::new();
//! let top = model.add_gate(Gate::or("no_cooling", &["both_pumps", "valve"])).unwrap();
//! let pumps = model.add_gate(Gate::and("both_pumps", &["pump_a", "pump_b"])).unwrap();
//! model.add_basic_event_with_probability("pump_a", 0.1).unwrap();
//! model.add_basic_event_with_probability("pump_b", 0.1).unwrap();
//! model.add_basic_event_with_probability("valve", 0.01).unwrap();
//!
//! // 2. Build and validate the tree (the first gate is the top event)
//! let mut tree = FaultTree::new("cooling");
//! tree.add_gate(&model, top).unwrap();
//! tree.add_gate(&model, pumps).unwrap();
//! tree.validate(&model).unwrap();
//!
//! // 3. Analyze
//! let report = FaultTreeAnalysis::analyze(&model, &tree, &Settings::default()).unwrap();
//! assert_eq!(report.cut_sets.len(), 2);
//! let p = report.p_total().unwrap();
//! assert!((p - (0.01 + 0.01 - 0.0001)).abs() < 1e-12);
//! ```
//!
//! ## Core Components
//!
//! - **[`fault_tree`]**: tree construction and structural validation.
//! - **[`cut_set`]**: minimal cut set generation.
//! - **[`probability`]**: top-event probability and importance.
//! - **[`simulation`]**: Monte Carlo uncertainty analysis.
//! - **[`expression`]**: probability expressions of basic events.
//! - **[`analysis`]**: all phases in one call, driven by [`settings`].
//!
//! The library logs through the [`log`] facade and never installs a logger.

pub mod analysis;
pub mod bitset;
pub mod combination;
pub mod cut_set;
pub mod error;
pub mod expression;
pub mod fault_tree;
pub mod gate;
pub mod model;
pub mod probability;
pub mod settings;
pub mod simulation;
pub mod superset;
pub mod types;
