use clap::Parser;
use code_insight::cli::commands;
use code_insight::cli::{Cli, Commands, Verbosity};
use code_insight::config::Config;
use code_insight::ui::formatter::Formatter;
use code_insight::InsightError;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn initialize_tracing(verbosity: Verbosity) {
    let log_level = verbosity.to_log_level();
    let fallback_filter = format!("code_insight={}", log_level);

    let use_json = std::env::var("CODE_INSIGHT_JSON").is_ok();

    if use_json {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true);

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| fallback_filter.clone().into()),
            )
            .with(json_layer)
            .init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true);

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| fallback_filter.into()),
            )
            .with(fmt_layer)
            .init();
    }
}

/// Library errors get the full diagnostic rendering, everything else a
/// plain message with its context chain.
fn report(err: anyhow::Error) {
    match err.downcast::<InsightError>() {
        Ok(err) => eprintln!("{:?}", miette::Report::new(err)),
        Err(err) => eprintln!("{}", Formatter::error(format!("Error: {:#}", err))),
    }
}

fn main() -> ExitCode {
    Formatter::configure_colors_from_env();

    let cli = Cli::parse();
    let verbosity = cli.verbosity();

    initialize_tracing(verbosity);

    let config = Config::load_or_default();

    let result = match cli.command {
        Commands::Decode(mut args) => {
            args.merge_config(&config);
            commands::decode(args)
        }
        Commands::Stack(mut args) => {
            args.merge_config(&config);
            commands::stack(args, &config)
        }
        Commands::Modules(mut args) => {
            args.merge_config(&config);
            commands::modules(args)
        }
        Commands::ApplyEdit(args) => commands::apply_edit(args),
        Commands::Lookup(mut args) => {
            args.merge_config(&config);
            commands::lookup(args)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(err);
            ExitCode::FAILURE
        }
    }
}
