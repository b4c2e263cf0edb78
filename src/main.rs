use std::{env, process};

use env_logger::Env;
use log::{SetLoggerError, error, info, warn};
use ndarray::Array1;
use ndarray_stats::QuantileExt;

use dg_spatial::{error::Result, initialization, io::write_to_csv::write_to_csv};

/// Logs to stderr at the level named by `DG_LOG`, `info` when unset.
fn init_logger() -> std::result::Result<(), SetLoggerError> {
    env_logger::Builder::from_env(Env::default().filter_or("DG_LOG", "info")).try_init()
}

fn run(param_file: &str) -> Result<()> {
    let params = initialization::initialize_params_by_file(param_file)?;
    let mesh = initialization::initialize_mesh(&params)?;
    let mut disc = initialization::initialize_disc(&mesh, &params)?;
    let (mut u, mut res, mut mets) = (Vec::new(), Vec::new(), Vec::new());
    disc.spatial_setup(&mut u, &mut res, &mut mets);
    let initial = |x: f64, y: f64| (-20.0 * ((x - 0.5).powi(2) + (y - 0.5).powi(2))).exp();
    for comp in 0..params.nvars {
        disc.set_initial_condition_projected(comp, initial, &mut u)?;
    }
    disc.update_residual(&u, &mut res)?;
    let mets = Array1::from_vec(mets);
    match mets.min() {
        Ok(dt) => info!("max explicit time step: {dt:e}"),
        Err(e) => warn!("no time step bound: {e}"),
    }
    info!("l2 norm of initial state: {:e}", disc.compute_l2_norm(&u, 0)?);
    let res_norm: f64 = res.iter().map(|r| r.iter().map(|v| v * v).sum::<f64>()).sum();
    info!("residual norm: {:e}", res_norm.sqrt());
    let vertex_values = disc.postprocess(&u)?;
    write_to_csv(&params.output_file, &mesh, vertex_values.view())?;
    info!("wrote {}", params.output_file);
    Ok(())
}

fn main() {
    if let Err(e) = init_logger() {
        eprintln!("logger already initialized: {e}");
    }
    let param_file = env::args()
        .nth(1)
        .unwrap_or_else(|| "inputs/advection.json".to_string());
    if let Err(e) = run(&param_file) {
        error!("{e}");
        process::exit(1);
    }
}
