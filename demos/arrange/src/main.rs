//! arrange: records a small synthetic wealth-transfer experiment, saves it,
//! loads it back and prints a few arrangements.
//!
//! Usage: `arrange [OUTPUT_DIR]` (default `ap_output`).  Set `RUST_LOG` to
//! control verbosity, e.g. `RUST_LOG=dt_output=debug`.

use std::env;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dt_output::{ArrangeOptions, DataDict, OutputConfig, load, mapping_from};
use dt_table::{Table, Value};

// ── Constants ─────────────────────────────────────────────────────────────────

const EXP_NAME:   &str  = "wealth transfer";
const BETAS:      [f64; 3] = [0.1, 0.5, 0.9];
const ITERATIONS: usize = 2;
const AGENTS:     i64   = 2;
const STEPS:      i64   = 3;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

// ── Synthetic recording ───────────────────────────────────────────────────────

/// Agent wealth after `t` steps, covering `t/(t+1)` of the way to `beta`.
/// Deterministic, so repeated runs print the same tables.
fn wealth(beta: f64, agent: i64, t: i64) -> f64 {
    let start = 1.0 + agent as f64;
    start + (beta - start) * (t as f64 / (t as f64 + 1.0))
}

fn record() -> Result<DataDict> {
    let runs = BETAS.len() * ITERATIONS;

    let (mut a_run, mut a_obj, mut a_t, mut a_wealth) = (vec![], vec![], vec![], vec![]);
    let (mut e_run, mut e_obj, mut e_t, mut e_total) = (vec![], vec![], vec![], vec![]);
    let (mut m_run, mut m_final) = (vec![], vec![]);

    for run in 0..runs {
        let beta = BETAS[run % BETAS.len()];
        let run = Value::from(run);
        let mut total = 0.0_f64;
        for t in 0..STEPS {
            total = (0..AGENTS).map(|agent| wealth(beta, agent, t)).sum::<f64>();
            for agent in 0..AGENTS {
                a_run.push(run.clone());
                a_obj.push(Value::Int(agent + 1));
                a_t.push(Value::Int(t));
                a_wealth.push(Value::Float(wealth(beta, agent, t)));
            }
            e_run.push(run.clone());
            e_obj.push(Value::Int(0));
            e_t.push(Value::Int(t));
            e_total.push(Value::Float(total));
        }
        m_run.push(run);
        m_final.push(Value::Float(total));
    }

    let index = ["run_id", "obj_id", "t"];
    let agents = Table::from_columns([("run_id", a_run), ("obj_id", a_obj), ("t", a_t), ("wealth", a_wealth)])?
        .set_index(&index)?;
    let env = Table::from_columns([("run_id", e_run), ("obj_id", e_obj), ("t", e_t), ("total", e_total)])?
        .set_index(&index)?;
    let measures = Table::from_columns([("run_id", m_run), ("final_total", m_final)])?.set_index(&["run_id"])?;

    let varied = Table::from_columns([
        ("sample_id", (0..BETAS.len()).map(Value::from).collect()),
        ("beta", BETAS.iter().copied().map(Value::from).collect()),
    ])?
    .set_index(&["sample_id"])?;

    Ok(DataDict::new()
        .with(
            "log",
            mapping_from([
                ("name", Value::from(EXP_NAME)),
                ("iterations", Value::from(ITERATIONS)),
                ("n_runs", Value::from(runs)),
            ]),
        )
        .with(
            "parameters",
            DataDict::new()
                .with("fixed", mapping_from([("agents", AGENTS), ("steps", STEPS)]))
                .with("varied", varied),
        )
        .with("variables", DataDict::new().with("Agent", agents).with("Env", env))
        .with("measures", measures))
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_logging();

    let config = match env::args().nth(1) {
        Some(path) => OutputConfig::new(path),
        None => OutputConfig::default(),
    };

    let data = record()?;
    println!("{data}");

    let dir = data.save(None, None, &config).context("saving experiment")?;
    info!(dir = %dir.display(), "experiment saved");

    let loaded = load(EXP_NAME, None, &config).context("loading experiment")?;

    println!("\n── Measures with parameters ──");
    println!("{}", loaded.arrange(&ArrangeOptions::new().data_keys(["measures", "parameters"]))?);

    println!("\n── Agent wealth with beta ──");
    println!(
        "{}",
        loaded.arrange(
            &ArrangeOptions::new()
                .data_keys(["variables", "parameters"])
                .obj_types(["Agent"])
                .param_keys(["beta"]),
        )?
    );

    println!("\n── Everything ──");
    println!("{}", loaded.arrange(&ArrangeOptions::new())?);

    Ok(())
}
