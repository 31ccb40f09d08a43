//! Doubles for the compiler seams.
//!
//! [`RecordingInvoker`] stands in for `javac` and remembers every unit it was
//! asked to compile. [`StubResolver`] hands out queued invokers, falls back to
//! a shared one when configured, and records each location it was asked for.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use camino::{Utf8Path, Utf8PathBuf};

use crate::compiler::{
    CompilationInvoker, CompilerOptions, InvocationError, SourceUnit, ToolchainError,
    ToolchainResolver,
};
use crate::diagnostics::Diagnostic;

/// One recorded compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCompile {
    pub unit: String,
    pub body: String,
    pub classpath: String,
}

#[derive(Debug, Default)]
struct InvokerState {
    calls: Vec<RecordedCompile>,
    responses: VecDeque<Vec<Diagnostic>>,
    fail_next: bool,
}

/// Invoker that records requests and replays scripted diagnostics.
#[derive(Debug, Clone, Default)]
pub struct RecordingInvoker {
    state: Arc<Mutex<InvokerState>>,
}

impl RecordingInvoker {
    /// Returns every compilation seen so far.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCompile> {
        self.lock().calls.clone()
    }

    /// Queues the diagnostics returned by the next compilation.
    pub fn respond_with(&self, diagnostics: Vec<Diagnostic>) {
        self.lock().responses.push_back(diagnostics);
    }

    /// Makes the next compilation fail as if `javac` crashed.
    pub fn fail_next(&self) {
        self.lock().fail_next = true;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, InvokerState> {
        self.state.lock().expect("invoker state mutex poisoned")
    }
}

impl CompilationInvoker for RecordingInvoker {
    fn compile(
        &self,
        unit: &SourceUnit,
        options: &CompilerOptions,
    ) -> Result<Vec<Diagnostic>, InvocationError> {
        let mut state = self.lock();
        state.calls.push(RecordedCompile {
            unit: unit.name().to_owned(),
            body: unit.body().to_owned(),
            classpath: options.classpath().to_owned(),
        });
        if std::mem::take(&mut state.fail_next) {
            return Err(InvocationError::Abnormal {
                program: Utf8PathBuf::from("javac"),
                status: "exit status: 4".to_owned(),
            });
        }
        Ok(state.responses.pop_front().unwrap_or_default())
    }
}

#[derive(Default)]
struct ResolverState {
    queued: VecDeque<Result<Box<dyn CompilationInvoker>, ToolchainError>>,
    fallback: Option<RecordingInvoker>,
    broken: HashSet<Utf8PathBuf>,
}

/// Resolver returning queued results, then the fallback invoker if any.
#[derive(Clone, Default)]
pub struct StubResolver {
    state: Arc<Mutex<ResolverState>>,
    requests: Arc<Mutex<Vec<Option<Utf8PathBuf>>>>,
}

impl StubResolver {
    /// Resolver with nothing queued; every resolution fails with
    /// [`ToolchainError::NotFound`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver that always succeeds with `invoker`, except for broken locations.
    #[must_use]
    pub fn serving(invoker: RecordingInvoker) -> Self {
        let resolver = Self::new();
        resolver.lock().fallback = Some(invoker);
        resolver
    }

    /// Queues a successful resolution.
    pub fn push_ready(&self, invoker: Box<dyn CompilationInvoker>) {
        self.lock().queued.push_back(Ok(invoker));
    }

    /// Queues a failed resolution.
    pub fn push_failure(&self, error: ToolchainError) {
        self.lock().queued.push_back(Err(error));
    }

    /// Makes `location` resolve to [`ToolchainError::MissingCompiler`].
    pub fn break_location(&self, location: impl Into<Utf8PathBuf>) {
        self.lock().broken.insert(location.into());
    }

    /// Shared log of requested locations.
    #[must_use]
    pub fn requests(&self) -> Arc<Mutex<Vec<Option<Utf8PathBuf>>>> {
        Arc::clone(&self.requests)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ResolverState> {
        self.state.lock().expect("resolver state mutex poisoned")
    }
}

impl ToolchainResolver for StubResolver {
    fn resolve(
        &self,
        location: Option<&Utf8Path>,
    ) -> Result<Box<dyn CompilationInvoker>, ToolchainError> {
        self.requests
            .lock()
            .expect("resolver requests mutex poisoned")
            .push(location.map(Utf8Path::to_path_buf));
        let mut state = self.lock();
        if let Some(result) = state.queued.pop_front() {
            return result;
        }
        if let Some(path) = location.filter(|path| state.broken.contains(*path)) {
            return Err(ToolchainError::MissingCompiler {
                path: path.join("bin").join("javac"),
            });
        }
        match &state.fallback {
            Some(invoker) => Ok(Box::new(invoker.clone())),
            None => Err(ToolchainError::NotFound),
        }
    }
}
