//! fraudscore entrypoint: score a transaction table against a behavioral
//! pattern table and print the result bundle as JSON on stdout.

use fraudscore::{
    config::PipelineConfig,
    features::MODEL_FEATURE_NAMES,
    ingest,
    logging::StructuredLogger,
    model::OnnxClassifier,
    pipeline::{self, Pipeline},
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

fn run(
    config: &PipelineConfig,
    first_path: &str,
    second_path: &str,
) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let first = ingest::read_table(Path::new(first_path))?;
    let second = ingest::read_table(Path::new(second_path))?;
    let (transactions, patterns) = ingest::assign_roles(first, second);
    info!(
        transaction_columns = transactions.column_count(),
        pattern_columns = patterns.column_count(),
        "tables read"
    );

    let classifier = Arc::new(OnnxClassifier::load(
        &config.model_path,
        MODEL_FEATURE_NAMES.len(),
    )?);

    let bundle = Pipeline::new(config, classifier).run(&transactions, &patterns)?;
    Ok(serde_json::to_string(&bundle)?)
}

fn main() -> ExitCode {
    let config_path = std::env::var("FRAUDSCORE_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.json"));
    let config = PipelineConfig::load(&config_path);

    StructuredLogger::init(config.log.json, &config.log.level);

    let mut args = std::env::args().skip(1);
    let (Some(first), Some(second)) = (args.next(), args.next()) else {
        eprintln!("usage: fraudscore <transactions-file> <patterns-file>");
        return ExitCode::from(2);
    };

    match run(&config, &first, &second) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "pipeline failed");
            println!("{}", pipeline::error_json(&e));
            ExitCode::FAILURE
        }
    }
}
