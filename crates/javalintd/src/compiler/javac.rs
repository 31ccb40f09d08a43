//! `javac`-backed toolchain resolution and invocation.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info};

use super::{
    COMPILER_TARGET, CompilationInvoker, CompilerOptions, InvocationError, SourceUnit,
    ToolchainError, ToolchainResolver, parse_javac_output,
};
use crate::diagnostics::Diagnostic;

/// Keeps compiler messages stable regardless of the host locale.
const JVM_LOCALE_ARGS: [&str; 2] = ["-J-Duser.language=en", "-J-Duser.country=US"];
const SCRATCH_PREFIX: &str = "javalintd-";
/// Highest exit code javac uses for ordinary compilation failures.
const LAST_NORMAL_EXIT: i32 = 2;

fn javac_file_name() -> String {
    format!("javac{}", env::consts::EXE_SUFFIX)
}

/// Finds `javac` under an explicit JDK, then `JAVA_HOME`, then `PATH`.
#[derive(Debug, Clone, Default)]
pub struct JavacResolver {
    java_home: Option<Utf8PathBuf>,
    search_path: bool,
}

impl JavacResolver {
    /// Resolver that falls back to `JAVA_HOME` and `PATH`.
    #[must_use]
    pub fn from_env() -> Self {
        let java_home = env::var("JAVA_HOME")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(Utf8PathBuf::from);
        Self {
            java_home,
            search_path: true,
        }
    }

    /// Resolver that only honours explicit locations.
    #[must_use]
    pub fn explicit_only() -> Self {
        Self::default()
    }

    fn from_home(home: &Utf8Path) -> Result<JavacInvoker, ToolchainError> {
        let javac = home.join("bin").join(javac_file_name());
        if javac.is_file() {
            Ok(JavacInvoker::new(javac))
        } else {
            Err(ToolchainError::MissingCompiler { path: javac })
        }
    }

    fn from_search_path() -> Result<JavacInvoker, ToolchainError> {
        let found = which::which("javac").map_err(|_| ToolchainError::NotFound)?;
        let javac = Utf8PathBuf::from_path_buf(found).map_err(|path| ToolchainError::NonUtf8Path {
            path: path.display().to_string(),
        })?;
        Ok(JavacInvoker::new(javac))
    }

    fn locate(&self, location: Option<&Utf8Path>) -> Result<JavacInvoker, ToolchainError> {
        if let Some(home) = location {
            return Self::from_home(home);
        }
        if let Some(home) = self.java_home.as_deref()
            && let Ok(invoker) = Self::from_home(home)
        {
            return Ok(invoker);
        }
        if self.search_path {
            return Self::from_search_path();
        }
        Err(ToolchainError::NotFound)
    }
}

impl ToolchainResolver for JavacResolver {
    fn resolve(
        &self,
        location: Option<&Utf8Path>,
    ) -> Result<Box<dyn CompilationInvoker>, ToolchainError> {
        let invoker = self.locate(location)?;
        debug!(
            target: COMPILER_TARGET,
            javac = %invoker.javac(),
            "resolved compiler"
        );
        Ok(Box::new(invoker))
    }
}

/// Runs one `javac` process per compilation in a scratch directory.
#[derive(Debug, Clone)]
pub struct JavacInvoker {
    javac: Utf8PathBuf,
}

impl JavacInvoker {
    /// Wraps the compiler binary at `javac`.
    #[must_use]
    pub fn new(javac: impl Into<Utf8PathBuf>) -> Self {
        Self {
            javac: javac.into(),
        }
    }

    /// Compiler binary in use.
    #[must_use]
    pub fn javac(&self) -> &Utf8Path {
        &self.javac
    }

    fn check_status(&self, status: ExitStatus) -> Result<(), InvocationError> {
        match status.code() {
            Some(code) if code <= LAST_NORMAL_EXIT => Ok(()),
            _ => Err(InvocationError::Abnormal {
                program: self.javac.clone(),
                status: status.to_string(),
            }),
        }
    }
}

impl CompilationInvoker for JavacInvoker {
    fn compile(
        &self,
        unit: &SourceUnit,
        options: &CompilerOptions,
    ) -> Result<Vec<Diagnostic>, InvocationError> {
        let scratch = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir()
            .map_err(InvocationError::Scratch)?;
        let source_file = Path::new("src").join(unit.relative_path().as_std_path());
        write_source(&scratch.path().join(&source_file), unit.body())?;
        fs::create_dir_all(scratch.path().join("classes")).map_err(InvocationError::Scratch)?;

        let output = Command::new(self.javac.as_std_path())
            .current_dir(scratch.path())
            .args(JVM_LOCALE_ARGS)
            .args(["-encoding", "UTF-8"])
            .args(options.to_args())
            .args(["-d", "classes", "-implicit:none"])
            .arg(&source_file)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| InvocationError::Spawn {
                program: self.javac.clone(),
                source,
            })?;
        self.check_status(output.status)?;

        let mut report = String::from_utf8_lossy(&output.stderr).into_owned();
        report.push_str(&String::from_utf8_lossy(&output.stdout));
        let diagnostics = parse_javac_output(&report, &source_file.display().to_string());
        debug!(
            target: COMPILER_TARGET,
            unit = unit.name(),
            diagnostics = diagnostics.len(),
            status = %output.status,
            "compilation finished"
        );

        if options.retain_artifacts() {
            let kept: PathBuf = scratch.keep();
            info!(
                target: COMPILER_TARGET,
                unit = unit.name(),
                path = %kept.display(),
                "retained compiler scratch directory"
            );
        }
        Ok(diagnostics)
    }
}

fn write_source(path: &Path, body: &str) -> Result<(), InvocationError> {
    let wrap = |source| InvocationError::WriteSource {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(wrap)?;
    }
    fs::write(path, body).map_err(wrap)
}
