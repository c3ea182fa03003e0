//! catc: compress a folder of text files and hide the result in a carrier
//! image, or recover it again.

mod batch;
mod config;

use catc_core::metrics::Metrics;
use config::{Command, Config};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!();
            config::print_help();
            return ExitCode::from(2);
        }
    };

    if config.command == Command::Help {
        config::print_help();
        return ExitCode::SUCCESS;
    }

    env_logger::Builder::new()
        .filter_level(config.log_level)
        .parse_default_env()
        .format_timestamp(None)
        .init();

    if config.print_config {
        config.print();
    }

    let mut metrics = Metrics::new();
    let result = run(&config, &mut metrics);
    metrics.complete();

    if config.print_metrics {
        metrics.print_summary();
    }
    metrics.print_result();

    if let Some(path) = &config.metrics_file {
        if let Err(e) = std::fs::write(path, metrics.export_text()) {
            log::error!("failed to write metrics to '{}': {e}", path.display());
            return ExitCode::FAILURE;
        }
    }

    match result {
        Ok(()) if metrics.is_success() => ExitCode::SUCCESS,
        Ok(()) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config, metrics: &mut Metrics) -> catc_core::Result<()> {
    match &config.command {
        Command::Compress { input_folder, .. } => {
            let (Some(carrier), Some(output)) = (config.carrier_path(), config.output_path()) else {
                return Err(catc_core::Error::Config("compress needs a carrier and an output".into()));
            };
            batch::compress_and_attach(input_folder, &config.text_ext, &carrier, &output, metrics)
        }
        Command::Extract {
            input_folder,
            output_folder,
        } => {
            let found = batch::extract_folder(input_folder, output_folder, &config.carrier_ext, metrics)?;
            log::info!("processed {found} carrier files from '{}'", input_folder.display());
            Ok(())
        }
        Command::Pack { input, output } => batch::pack_file(input, output, metrics),
        Command::Unpack { input, output } => batch::unpack_file(input, output, metrics),
        Command::Help => Ok(()),
    }
}
