use pagesim::{
    cli::args::{CliArgs, usage},
    sim::{driver::run_simulation, workload::SimConfig},
};
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("pagesim");
    let cli = match CliArgs::parse(args.get(1..).unwrap_or_default()) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            eprintln!("{}", usage(program));
            std::process::exit(1);
        }
    };

    let config = match SimConfig::from_file(&cli.description) {
        Ok(config) => config.with_eviction(cli.eviction).with_seed(cli.seed),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    let rt = Runtime::new()?;
    let report = rt.block_on(run_simulation(&config, &cli.log_path))?;
    if let Some(path) = &cli.report {
        report.write_json(path)?;
    }

    println!(
        "Simulation complete. Output written to {}",
        cli.log_path.display()
    );
    Ok(())
}
