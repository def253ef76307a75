use clap::Parser;

use fta_rs::analysis::{AnalysisReport, FaultTreeAnalysis};
use fta_rs::fault_tree::FaultTree;
use fta_rs::gate::Gate;
use fta_rs::model::Model;
use fta_rs::settings::Settings;
use fta_rs::types::EventRef;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Mission time, in hours.
    #[arg(value_name = "HOURS", default_value = "8760")]
    time: f64,

    /// Largest cut-set order to keep.
    #[clap(long, value_name = "INT", default_value = "20")]
    limit_order: usize,

    /// Use the rare-event approximation.
    #[clap(long)]
    rare_event: bool,

    /// Number of Monte Carlo trials (0 to skip simulation).
    #[clap(long, value_name = "INT", default_value = "10000")]
    trials: usize,

    /// Seed of the first Monte Carlo trial.
    #[clap(long, value_name = "INT", default_value = "0")]
    seed: u64,
}

/// Cooling system: two redundant pump trains (each a pump and its motor-operated
/// valve) fed by one power bus, with a 2-out-of-3 vote over the flow sensors.
fn build_model(time: f64) -> color_eyre::Result<Model> {
    let mut model = Model::new();

    model.add_gate(Gate::or("no_cooling", &["both_trains", "power", "sensing"]))?;
    model.add_gate(Gate::and("both_trains", &["train_a", "train_b"]))?;
    model.add_gate(Gate::or("train_a", &["pump_a", "valve_a"]))?;
    model.add_gate(Gate::or("train_b", &["pump_b", "valve_b"]))?;
    model.add_gate(Gate::atleast("sensing", 2, &["sensor_1", "sensor_2", "sensor_3"]))?;

    let exprs = model.expressions_mut();
    let mission = exprs.constant(time);

    // Pumps share an uncertain failure rate (log-normal around 1e-5 per hour).
    let mu = exprs.constant((1e-5f64).ln());
    let sigma = exprs.constant(0.5);
    let pump_rate = exprs.lognormal(mu, sigma);
    let pump = exprs.exponential(pump_rate, mission);

    // Valves are tested every 720 hours, first test after 360.
    let valve_rate = exprs.constant(2e-6);
    let tau = exprs.constant(720.0);
    let theta = exprs.constant(360.0);
    let valve = exprs.periodic_test(valve_rate, tau, theta, mission);

    let power_alpha = exprs.constant(5e4);
    let power_beta = exprs.constant(1.5);
    let power_t0 = exprs.constant(0.0);
    let power = exprs.weibull(power_alpha, power_beta, power_t0, mission);

    let lo = exprs.constant(1e-3);
    let hi = exprs.constant(5e-2);
    let sensor = exprs.uniform(lo, hi);

    model.add_basic_event("pump_a", Some(pump))?;
    model.add_basic_event("pump_b", Some(pump))?;
    model.add_basic_event("valve_a", Some(valve))?;
    model.add_basic_event("valve_b", Some(valve))?;
    model.add_basic_event("power", Some(power))?;
    for name in ["sensor_1", "sensor_2", "sensor_3"] {
        model.add_basic_event(name, Some(sensor))?;
    }

    Ok(model)
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let args = Cli::parse();
    println!("args = {:?}", args);

    let model = build_model(args.time)?;

    let mut tree = FaultTree::new("cooling");
    for gate in ["no_cooling", "both_trains", "train_a", "train_b", "sensing"] {
        if let Some(EventRef::Gate(id)) = model.lookup(gate) {
            tree.add_gate(&model, id)?;
        }
    }
    tree.validate(&model)?;

    let mut settings = Settings::default();
    settings
        .limit_order(args.limit_order)?
        .rare_event(args.rare_event)
        .num_trials(args.trials)
        .seed(args.seed);

    let report = FaultTreeAnalysis::analyze(&model, &tree, &settings)?;
    print_report(&model, &report);

    let time_total = time_total.elapsed();
    println!("Done in {:.3} s", time_total.as_secs_f64());

    Ok(())
}

fn print_report(model: &Model, report: &AnalysisReport) {
    println!("Fault tree: {}", report.tree);
    println!(
        "Minimal cut sets: {} (max order {})",
        report.cut_sets.len(),
        report.cut_sets.max_order()
    );
    for (order, count) in report.cut_sets.distribution().iter().enumerate() {
        println!("  order {}: {}", order + 1, count);
    }

    if let Some(p) = &report.probability {
        println!("Top event probability ({:?}): {:.6e}", p.method, p.p_total);
        println!("Terms: {} of {}", p.num_terms, p.total_terms);
        for (cs, prob) in &p.cut_sets {
            println!("  {{{}}}: {:.6e}", cs.names(model).join(", "), prob);
        }
        println!("Importance:");
        for imp in &p.importance {
            println!("  {}: {:.6e} ({:.2}%)", imp.name, imp.contribution, imp.share * 100.0);
        }
    }

    if let Some(s) = &report.simulation {
        println!("Monte Carlo ({} trials):", s.n);
        println!("  mean: {:.6e}, std dev: {:.6e}, std error: {:.6e}", s.mean, s.std_dev, s.std_error);
        println!("  {}", s.confidence_interval);
        println!("  min: {:.6e}, max: {:.6e}", s.min, s.max);
        for (q, v) in &s.quantiles {
            println!("  q{:.2}: {:.6e}", q, v);
        }
    }

    for w in &report.warnings {
        println!("Warning: {}", w);
    }
}
