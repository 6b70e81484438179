use std::{path::PathBuf, process::ExitCode};

use ariadne::{ColorGenerator, Config, IndexType, Label, Report, ReportKind, Source};
use clap::Parser as ClapParser;
use llir::{loader::TextualLoader, utils::Error};
use tracing_subscriber::EnvFilter;

/// Print per-function statistics and gas estimates for a textual IR module.
#[derive(ClapParser)]
#[command(version, about)]
pub struct Arguments {
    /// Path to the input `.ll` file
    input: PathBuf,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn print_diagnostics(error: &Error) {
    match error {
        Error::ParserErrors { errors } => {
            let mut colors = ColorGenerator::new();
            let a = colors.next();

            for error in errors {
                let file = error.file.clone().unwrap_or_else(|| "<input>".to_string());
                let span = (file.clone(), error.start..error.end);
                let source = std::fs::read_to_string(&file).unwrap_or_default();

                // Diagnostics carry byte offsets
                let printed = Report::build(ReportKind::Error, span.clone())
                    .with_config(Config::default().with_index_type(IndexType::Byte))
                    .with_message(&error.message)
                    .with_label(
                        Label::new(span)
                            .with_message("The error occurred here")
                            .with_color(a),
                    )
                    .finish()
                    .eprint((file.clone(), Source::from(source)));

                if printed.is_err() {
                    eprintln!("{}", error);
                }
            }
        }
        Error::Io { .. } => eprintln!("{}", error),
    }
}

fn main() -> ExitCode {
    let args = match Arguments::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // Help and version go to stdout and are not failures
            let code = if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            let _ = err.print();
            return code;
        }
    };

    init_logging();

    match llgas::run(TextualLoader, &args.input) {
        Ok(report) => {
            print!("{}", report);
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("Error parsing IR file: {}", args.input.display());
            print_diagnostics(&error);
            ExitCode::FAILURE
        }
    }
}
