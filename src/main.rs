use anyhow::Result;
use clap::Parser;
use minebench::cli::{Cli, Commands};
use minebench::config::BenchmarkConfig;
use minebench::core::types::{parse_duration, ParameterRange};
use minebench::miners::{available_miners, resolve_miners};
use minebench::runner::Benchmark;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            logs,
            miners,
            miner_timeout,
            metric_timeout,
            folds,
            fitness_threads,
            parameter_range,
            output,
            config,
        } => {
            let mut cfg = match config {
                Some(path) => BenchmarkConfig::load(&path)?,
                None => BenchmarkConfig::default(),
            };

            if let Some(logs) = logs {
                cfg.log_folder = logs;
            }
            if let Some(output) = output {
                cfg.output_dir = output;
            }
            if let Some(timeout) = miner_timeout {
                cfg.miner_timeout_ms = parse_duration(&timeout)?.as_millis() as u64;
            }
            if let Some(timeout) = metric_timeout {
                cfg.metric_timeout_ms = parse_duration(&timeout)?.as_millis() as u64;
            }
            if let Some(folds) = folds {
                cfg.folds = folds;
            }
            if let Some(threads) = fitness_threads {
                cfg.fitness_threads = threads;
            }
            if let Some(range) = parameter_range {
                cfg.parameter_range = Some(parse_parameter_range(&range)?);
            }

            let miners = resolve_miners(&miners)?;
            Benchmark::new(cfg).run(&miners)?;
        }
        Commands::List => {
            println!("Mining algorithms available:");
            for (index, miner) in available_miners().iter().enumerate() {
                println!("{index} - {} ({})", miner.name(), miner.acronym());
            }
        }
    }

    Ok(())
}

fn parse_parameter_range(args: &[String]) -> Result<ParameterRange> {
    let parse = |value: &str| -> Result<f64> {
        value
            .parse::<f64>()
            .map_err(|_| anyhow::anyhow!("invalid parameter range value: {value}"))
    };
    Ok(ParameterRange::new(
        args[0].clone(),
        parse(&args[1])?,
        parse(&args[2])?,
        parse(&args[3])?,
    ))
}
