//! One-call fault tree analysis.
//!
//! [`FaultTreeAnalysis::analyze`] runs the phases in order: minimal cut sets,
//! then the top-event probability (unless disabled), then Monte Carlo simulation
//! (if trials are requested). Conditions that degrade the result without making it
//! wrong are collected as warnings on the [`AnalysisReport`] and logged.
//!
//! # Example
//!
//! ```
//! use fta_rs::analysis::FaultTreeAnalysis;
//! use fta_rs::fault_tree::FaultTree;
//! use fta_rs::gate::Gate;
//! use fta_rs::model::Model;
//! use fta_rs::settings::Settings;
//!
//! let mut model = Model::new();
//! let top = model.add_gate(Gate::or("top", &["pump", "valve"])).unwrap();
//! model.add_basic_event_with_probability("pump", 0.1).unwrap();
//! model.add_basic_event_with_probability("valve", 0.2).unwrap();
//!
//! let mut tree = FaultTree::new("cooling");
//! tree.add_gate(&model, top).unwrap();
//! tree.validate(&model).unwrap();
//!
//! let report = FaultTreeAnalysis::analyze(&model, &tree, &Settings::default()).unwrap();
//! assert!((report.p_total().unwrap() - 0.28).abs() < 1e-12);
//! ```

use log::{info, warn};

use crate::cut_set::{CutSetGenerator, MinimalCutSets};
use crate::error::{Error, Result};
use crate::fault_tree::FaultTree;
use crate::model::Model;
use crate::probability::{Method, ProbabilityAnalysis, ProbabilityReport};
use crate::settings::Settings;
use crate::simulation::{MonteCarlo, Statistics};

/// Logs a warning and records it.
pub(crate) fn push_warning(warnings: &mut Vec<String>, message: String) {
    warn!("{}", message);
    warnings.push(message);
}

#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub tree: String,
    pub cut_sets: MinimalCutSets,
    pub probability: Option<ProbabilityReport>,
    pub simulation: Option<Statistics>,
    /// Every warning of every phase, in order.
    pub warnings: Vec<String>,
}

impl AnalysisReport {
    /// Top-event probability, if it was computed.
    pub fn p_total(&self) -> Option<f64> {
        self.probability.as_ref().map(|p| p.p_total)
    }
}

pub struct FaultTreeAnalysis;

impl FaultTreeAnalysis {
    pub fn analyze(model: &Model, tree: &FaultTree, settings: &Settings) -> Result<AnalysisReport> {
        if !tree.is_validated() {
            return Err(Error::NotValidated(tree.name().to_string()));
        }
        info!("Analyzing fault tree '{}' with {:?}", tree.name(), settings);

        let mut warnings = Vec::new();

        let cut_sets = CutSetGenerator::new(model, tree, settings.get_limit_order()).generate()?;
        if cut_sets.truncated() {
            push_warning(
                &mut warnings,
                format!(
                    "Cut sets above order {} were discarded; results are minimal cut sets up to that order",
                    settings.get_limit_order()
                ),
            );
        }
        if cut_sets.is_impossible() {
            info!("Fault tree '{}': the top event cannot occur", tree.name());
        } else if cut_sets.is_certain() {
            info!("Fault tree '{}': the top event always occurs", tree.name());
        }

        let probability = if settings.get_probability() {
            let analysis = ProbabilityAnalysis::new(model, tree, settings.get_nsums(), settings.get_rare_event());
            let report = analysis.analyze(&cut_sets)?;
            warnings.extend(report.warnings.iter().cloned());
            Some(report)
        } else {
            None
        };

        let simulation = if settings.get_num_trials() > 0 {
            let mc = MonteCarlo::new(
                model,
                tree,
                &cut_sets,
                settings.get_nsums(),
                settings.get_num_trials(),
                settings.get_seed(),
            )?;
            // The exact method already reported the same cut of the series.
            let reported = probability.as_ref().is_some_and(|p| p.method == Method::Exact);
            if !reported {
                if let Some(message) = mc.equation().truncation_warning() {
                    push_warning(&mut warnings, format!("Monte Carlo: {}", message));
                }
            }
            Some(mc.run()?)
        } else {
            None
        };

        Ok(AnalysisReport {
            tree: tree.name().to_string(),
            cut_sets,
            probability,
            simulation,
            warnings,
        })
    }
}
