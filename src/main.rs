//! Command-line front end: load configuration, run one simulation, print the
//! report.
//!
//! Usage: `multiqueue_sim [SERVERS MAX_QUEUE] [--json]`
//!
//! Without positional arguments the configuration comes from `SIM_*`
//! environment variables (a `.env` file is honoured).

use anyhow::Context;

use multiqueue_sim::config::SimulationConfig;
use multiqueue_sim::core::{AppResult, SimulationError};
use multiqueue_sim::runtime::Simulation;
use multiqueue_sim::util::init_tracing;

fn main() -> AppResult<()> {
    init_tracing();

    let mut json = false;
    let mut positional = Vec::new();
    for arg in std::env::args().skip(1) {
        if arg == "--json" {
            json = true;
        } else {
            positional.push(arg);
        }
    }

    let config = match positional.as_slice() {
        [] => SimulationConfig::from_env().map_err(SimulationError::ConfigLoad)?,
        [servers, max_queue] => {
            let servers = servers
                .parse()
                .with_context(|| format!("SERVERS must be a positive integer, got {servers:?}"))?;
            let max_queue = max_queue
                .parse()
                .with_context(|| format!("MAX_QUEUE must be a positive integer, got {max_queue:?}"))?;
            SimulationConfig::new(servers, max_queue)
        }
        _ => anyhow::bail!("usage: multiqueue_sim [SERVERS MAX_QUEUE] [--json]"),
    };

    let report = Simulation::new(config)?.run()?;
    if json {
        println!("{}", report.to_json()?);
    } else {
        println!("{report}");
    }
    Ok(())
}
