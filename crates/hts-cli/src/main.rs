//! HTS additive-duty schedule builder CLI.

use clap::{ColorChoice, Parser};
use hts_cli::logging::{LogConfig, LogFormat, init_logging};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{
    run_analyze, run_combine, run_dedupe, run_extract_list, run_preprocess, run_revision,
    run_rules,
};
use crate::summary::{
    print_analysis, print_combine_summary, print_dedup_report, print_preprocess_summary,
    print_rules,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        println!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let outcome = match &cli.command {
        Command::ExtractList(args) => run_extract_list(args).map(|count| {
            println!("Extracted {count} codes to {}", args.output.display());
        }),
        Command::Combine(args) => run_combine(args).map(|result| print_combine_summary(&result)),
        Command::Analyze(args) => {
            run_analyze(args).map(|analysis| print_analysis(&analysis, args.top))
        }
        Command::Dedupe(args) => run_dedupe(args).map(|report| {
            print_dedup_report(&report);
            println!("Output: {}", args.output.display());
        }),
        Command::Preprocess(args) => {
            run_preprocess(args).map(|result| print_preprocess_summary(&result))
        }
        Command::Revision(args) => run_revision(args).map(|revision| match revision {
            Some(revision) => println!("{revision}"),
            None => println!("No revision found"),
        }),
        Command::Rules(args) => run_rules(args).map(|catalog| print_rules(&catalog)),
    };
    let exit_code = match outcome {
        Ok(()) => 0,
        Err(error) => {
            println!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
