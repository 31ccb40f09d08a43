//! Command routing and the session state it mutates.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use camino::Utf8Path;
use tracing::{debug, info, warn};

use crate::compiler::{
    CompilationInvoker, CompilerOptions, SourceUnit, ToolchainError, ToolchainResolver,
};
use crate::diagnostics::Diagnostic;
use crate::health::HealthReporter;
use crate::protocol::{Command, Setting};
use crate::session::SessionConfig;

use super::errors::DispatchError;
use super::response::ResponseWriter;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// What the connection loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Keep accepting connections.
    Continue,
    /// Stop accepting and let the process exit.
    Terminate,
}

enum Toolchain {
    Ready(Box<dyn CompilationInvoker>),
    Unavailable(ToolchainError),
}

impl fmt::Debug for Toolchain {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(_) => formatter.write_str("Ready"),
            Self::Unavailable(error) => formatter.debug_tuple("Unavailable").field(error).finish(),
        }
    }
}

/// Executes commands against the session configuration and current compiler.
pub struct Dispatcher {
    session: SessionConfig,
    resolver: Box<dyn ToolchainResolver>,
    toolchain: Toolchain,
    retain_artifacts: bool,
    reporter: Arc<dyn HealthReporter>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Dispatcher")
            .field("session", &self.session)
            .field("toolchain", &self.toolchain)
            .field("retain_artifacts", &self.retain_artifacts)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Creates a dispatcher and resolves the initial compiler.
    pub fn new(
        session: SessionConfig,
        resolver: Box<dyn ToolchainResolver>,
        reporter: Arc<dyn HealthReporter>,
    ) -> Self {
        let toolchain = resolve_toolchain(
            resolver.as_ref(),
            session.toolchain_location(),
            reporter.as_ref(),
        );
        Self {
            session,
            resolver,
            toolchain,
            retain_artifacts: false,
            reporter,
        }
    }

    /// Keeps compiler scratch directories after each `LINT`.
    #[must_use]
    pub fn with_retain_artifacts(mut self, retain: bool) -> Self {
        self.retain_artifacts = retain;
        self
    }

    /// Current session configuration.
    #[must_use]
    pub fn session(&self) -> &SessionConfig {
        &self.session
    }

    /// Whether a compiler is currently resolved.
    #[must_use]
    pub fn toolchain_ready(&self) -> bool {
        matches!(self.toolchain, Toolchain::Ready(_))
    }

    pub(crate) fn reporter(&self) -> &dyn HealthReporter {
        self.reporter.as_ref()
    }

    /// Executes `command`, writing a reply when the command has one.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] for unknown commands, compiler invocation
    /// failures, and write failures.
    pub fn dispatch<W: Write>(
        &mut self,
        command: Command,
        writer: &mut ResponseWriter<W>,
    ) -> Result<DispatchOutcome, DispatchError> {
        debug!(
            target: DISPATCH_TARGET,
            command = command.name(),
            "dispatching command"
        );
        match command {
            Command::Lint(unit) => {
                self.lint(&unit, writer)?;
                Ok(DispatchOutcome::Continue)
            }
            Command::Set(setting) => {
                self.apply(setting);
                Ok(DispatchOutcome::Continue)
            }
            Command::Kill => {
                info!(target: DISPATCH_TARGET, "kill requested");
                Ok(DispatchOutcome::Terminate)
            }
            Command::Unknown(header) => Err(DispatchError::unknown_command(header)),
        }
    }

    fn lint<W: Write>(
        &self,
        unit: &SourceUnit,
        writer: &mut ResponseWriter<W>,
    ) -> Result<(), DispatchError> {
        let diagnostics = match &self.toolchain {
            Toolchain::Ready(invoker) => {
                let options = CompilerOptions::new(self.session.classpath())
                    .with_retain_artifacts(self.retain_artifacts);
                invoker
                    .compile(unit, &options)
                    .map_err(|source| DispatchError::Invocation {
                        unit: unit.name().to_owned(),
                        source,
                    })?
            }
            Toolchain::Unavailable(error) => {
                warn!(
                    target: DISPATCH_TARGET,
                    unit = unit.name(),
                    error = %error,
                    "lint requested without a compiler"
                );
                vec![Diagnostic::toolchain_unavailable(error)]
            }
        };
        debug!(
            target: DISPATCH_TARGET,
            unit = unit.name(),
            diagnostics = diagnostics.len(),
            "lint completed"
        );
        writer.write_diagnostics(&diagnostics)
    }

    fn apply(&mut self, setting: Setting) {
        match setting {
            Setting::Classpath(classpath) => {
                debug!(target: DISPATCH_TARGET, classpath = %classpath, "classpath updated");
                self.session.set_classpath(classpath);
            }
            Setting::ToolchainLocation(location) => {
                self.session.set_toolchain_location(location);
                self.toolchain = resolve_toolchain(
                    self.resolver.as_ref(),
                    self.session.toolchain_location(),
                    self.reporter.as_ref(),
                );
            }
        }
    }
}

fn resolve_toolchain(
    resolver: &dyn ToolchainResolver,
    location: Option<&Utf8Path>,
    reporter: &dyn HealthReporter,
) -> Toolchain {
    match resolver.resolve(location) {
        Ok(invoker) => {
            reporter.toolchain_ready(location);
            Toolchain::Ready(invoker)
        }
        Err(error) => {
            reporter.toolchain_unavailable(location, &error);
            Toolchain::Unavailable(error)
        }
    }
}
