use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use token_scout::cli::Cli;
use token_scout::config::Config;
use token_scout::evaluator::TokenEvaluator;
use token_scout::validation::validate_token_address;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = token_scout::logging::init(cli.debug, cli.log_file.as_deref()) {
        eprintln!("Failed to initialise logging: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<token_scout::Error>() {
                Some(err) if err.is_terminal() => eprintln!("Cannot evaluate this token: {}", err),
                _ => eprintln!("Evaluation failed: {:#}", e),
            }
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let token = validate_token_address(&cli.token)?;

    let mut config = Config::resolve(cli.config.as_deref()).context("Configuration loading failed")?;
    cli.apply_overrides(&mut config);
    info!("Configuration loaded successfully.");

    let evaluator = TokenEvaluator::from_config(&config)?;
    info!("Evaluating {}", token);
    let report = evaluator.evaluate(token).await?;

    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        println!("{}", report);
    }
    Ok(())
}
