//! Command-line surface of the `javalintd` binary.

use std::ffi::OsString;
use std::io::{Read, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use javalint_config::Config;

use crate::client::Client;
use crate::diagnostics::wire::{Reply, parse_reply};
use crate::process::{report_launch_failure, run_server};

/// Java lint daemon and its client helpers.
#[derive(Debug, Parser)]
#[command(name = "javalintd", version, about)]
pub struct Cli {
    /// Shared daemon settings.
    #[command(flatten)]
    pub config: Config,
    /// Port to serve on; wins over `--port` and `JAVALINT_PORT`.
    #[arg(value_name = "PORT")]
    pub port_override: Option<u16>,
    /// Action to run. Serving is the default.
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

/// Subcommands of the binary.
#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Runs the daemon in the foreground.
    Serve {
        /// Port to serve on.
        #[arg(value_name = "PORT")]
        port: Option<u16>,
    },
    /// Asks a running daemon to exit.
    Stop {
        /// Port of the running daemon.
        #[arg(value_name = "PORT")]
        port: Option<u16>,
    },
    /// Lints source read from stdin and prints the response line.
    Lint {
        /// Dotted type name, for example `com.example.Main`.
        unit: String,
        /// Port of the running daemon.
        #[arg(value_name = "PORT")]
        port: Option<u16>,
    },
}

impl Cli {
    /// Configuration with the most specific port applied.
    #[must_use]
    pub fn resolved_config(&self) -> Config {
        let subcommand_port = match &self.command {
            Some(
                CliCommand::Serve { port } | CliCommand::Stop { port } | CliCommand::Lint { port, .. },
            ) => *port,
            None => None,
        };
        match subcommand_port.or(self.port_override) {
            Some(port) => self.config.clone().with_port(port),
            None => self.config.clone(),
        }
    }
}

/// Parses `args` and runs the selected command.
pub fn run<I, T, R, O, E>(args: I, stdin: R, stdout: &mut O, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    R: Read,
    O: Write,
    E: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let rendered = error.render().to_string();
            let _ = if error.use_stderr() {
                stderr.write_all(rendered.as_bytes())
            } else {
                stdout.write_all(rendered.as_bytes())
            };
            return ExitCode::from(u8::try_from(error.exit_code()).unwrap_or(2));
        }
    };
    let config = cli.resolved_config();
    match cli.command {
        None | Some(CliCommand::Serve { .. }) => serve(config, stdout, stderr),
        Some(CliCommand::Stop { .. }) => stop(&config, stderr),
        Some(CliCommand::Lint { unit, .. }) => lint(&config, &unit, stdin, stdout, stderr),
    }
}

fn serve<O: Write, E: Write>(config: Config, stdout: &mut O, stderr: &mut E) -> ExitCode {
    match run_server(config, &mut *stdout) {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => ExitCode::from(report_launch_failure(&error, stdout, stderr)),
    }
}

fn stop<E: Write>(config: &Config, stderr: &mut E) -> ExitCode {
    match Client::new(config.endpoint()).kill() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(stderr, "javalintd: {error}");
            ExitCode::FAILURE
        }
    }
}

fn lint<R: Read, O: Write, E: Write>(
    config: &Config,
    unit: &str,
    mut stdin: R,
    stdout: &mut O,
    stderr: &mut E,
) -> ExitCode {
    let mut body = String::new();
    if let Err(error) = stdin.read_to_string(&mut body) {
        let _ = writeln!(stderr, "javalintd: failed to read source from stdin: {error}");
        return ExitCode::FAILURE;
    }
    let line = match Client::new(config.endpoint()).lint_raw(unit, &body) {
        Ok(line) => line,
        Err(error) => {
            let _ = writeln!(stderr, "javalintd: {error}");
            return ExitCode::FAILURE;
        }
    };
    let _ = writeln!(stdout, "{line}");
    match parse_reply(&line) {
        Ok(Reply::Diagnostics(_)) => ExitCode::SUCCESS,
        Ok(Reply::Rejected(body)) => {
            let _ = writeln!(stderr, "javalintd: {}: {}", body.kind, body.message);
            ExitCode::FAILURE
        }
        Err(error) => {
            let _ = writeln!(stderr, "javalintd: {error}");
            ExitCode::FAILURE
        }
    }
}
