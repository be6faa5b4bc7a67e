//! resticup command-line entry point.

// CLI binary needs to output to stdout/stderr - this is intentional
#![allow(clippy::print_stdout, clippy::print_stderr)]

use resticup::cli::{self, CliError, EXIT_OK, exit_code_for, render_error};
use resticup::outputs::render_report;
use resticup::tracing::{TracingConfig, init_tracing};

fn main() {
    // NOTE: tracing may be unusable during a panic, so print directly.
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::parse();

    if let Err(e) = init_tracing(TracingConfig {
        format: cli.log_format,
        level: cli.level.into(),
        ..TracingConfig::default()
    }) {
        eprintln!("Warning: failed to initialize tracing: {e}");
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            let err = CliError::other(format!("Failed to start async runtime: {e}"));
            render_error(&err, cli.json);
            std::process::exit(exit_code_for(&err));
        }
    };

    let exit_code = match runtime.block_on(resticup::run(&cli)) {
        Ok(report) => match render_report(&report, cli.json) {
            Ok(text) => {
                println!("{text}");
                EXIT_OK
            }
            Err(e) => {
                let err = CliError::other(format!("Failed to render summary: {e}"));
                render_error(&err, cli.json);
                exit_code_for(&err)
            }
        },
        Err(err) => {
            render_error(&err, cli.json);
            exit_code_for(&err)
        }
    };

    std::process::exit(exit_code);
}
