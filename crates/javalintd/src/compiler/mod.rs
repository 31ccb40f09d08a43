//! Boundary between the daemon and the Java toolchain.
//!
//! The dispatcher never talks to `javac` directly. It holds a
//! [`CompilationInvoker`] produced by a [`ToolchainResolver`] and re-resolves
//! it whenever a client moves the toolchain location with `SET JDK`. The
//! production implementations live in [`javac`]; tests substitute doubles at
//! both seams.

mod javac;
mod javac_output;
mod unit;

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use crate::diagnostics::Diagnostic;

pub use self::javac::{JavacInvoker, JavacResolver};
pub use self::javac_output::parse_javac_output;
pub use self::unit::{SourceUnit, UnitNameError};

/// Tracing target for toolchain resolution and compiler runs.
pub(crate) const COMPILER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::compiler");

/// Options applied to a single compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerOptions {
    classpath: String,
    retain_artifacts: bool,
}

impl CompilerOptions {
    /// Builds options for the given classpath.
    #[must_use]
    pub fn new(classpath: impl Into<String>) -> Self {
        Self {
            classpath: classpath.into(),
            retain_artifacts: false,
        }
    }

    /// Keeps generated class files and scratch sources on disk.
    #[must_use]
    pub const fn with_retain_artifacts(mut self, retain: bool) -> Self {
        self.retain_artifacts = retain;
        self
    }

    /// Classpath passed to the compiler.
    #[must_use]
    pub fn classpath(&self) -> &str {
        &self.classpath
    }

    /// Whether scratch output survives the compilation.
    #[must_use]
    pub const fn retain_artifacts(&self) -> bool {
        self.retain_artifacts
    }

    /// Ordered compiler arguments derived from these options.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        vec!["-cp".to_owned(), self.classpath.clone()]
    }
}

/// Compiles one unit and reports what the compiler found.
pub trait CompilationInvoker: Send {
    /// Compiles `unit`, returning diagnostics in the order they were reported.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError`] when the compiler could not be run at all.
    /// Compilation errors in the unit are diagnostics, not failures.
    fn compile(
        &self,
        unit: &SourceUnit,
        options: &CompilerOptions,
    ) -> Result<Vec<Diagnostic>, InvocationError>;
}

/// Locates a compiler for an optional toolchain location.
pub trait ToolchainResolver: Send {
    /// Resolves an invoker. `None` means "use the environment".
    ///
    /// # Errors
    ///
    /// Returns [`ToolchainError`] when no usable compiler exists.
    fn resolve(&self, location: Option<&Utf8Path>)
    -> Result<Box<dyn CompilationInvoker>, ToolchainError>;
}

/// Failures resolving a toolchain.
#[derive(Debug, Error)]
pub enum ToolchainError {
    /// The location exists in configuration but holds no compiler.
    #[error("no javac found at {path}")]
    MissingCompiler {
        /// Expected compiler path.
        path: Utf8PathBuf,
    },
    /// Neither `JAVA_HOME` nor `PATH` yielded a compiler.
    #[error("javac not found via JAVA_HOME or PATH")]
    NotFound,
    /// A discovered compiler path cannot be represented as UTF-8.
    #[error("compiler path {path} is not valid UTF-8")]
    NonUtf8Path {
        /// Lossy rendering of the path.
        path: String,
    },
}

/// Failures running a resolved compiler.
#[derive(Debug, Error)]
pub enum InvocationError {
    /// The scratch directory could not be created.
    #[error("failed to create scratch directory: {0}")]
    Scratch(#[source] io::Error),
    /// The unit could not be written into the scratch directory.
    #[error("failed to write source file {path}: {source}")]
    WriteSource {
        /// Target file.
        path: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The compiler process could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Compiler binary.
        program: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The compiler crashed or reported an internal failure.
    #[error("{program} terminated abnormally ({status})")]
    Abnormal {
        /// Compiler binary.
        program: Utf8PathBuf,
        /// Rendered exit status.
        status: String,
    },
}
