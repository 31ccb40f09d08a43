//! Named source units submitted by `LINT`.

use camino::Utf8PathBuf;
use thiserror::Error;

const SOURCE_SUFFIX: &str = ".java";

/// A single compilation unit held in memory for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    name: String,
    body: String,
}

/// Reasons a unit name is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitNameError {
    /// Nothing remained once the optional suffix was removed.
    #[error("unit name is empty")]
    Empty,
    /// The dotted name contained an empty segment, such as `foo..Bar`.
    #[error("unit name '{name}' contains an empty segment")]
    EmptySegment {
        /// Name as received.
        name: String,
    },
    /// The name tried to address a filesystem path.
    #[error("unit name '{name}' must not contain path separators")]
    PathSeparator {
        /// Name as received.
        name: String,
    },
}

impl SourceUnit {
    /// Validates `name` and pairs it with `body`.
    ///
    /// Accepts dotted type names (`foo.Bar`) with an optional `.java` suffix,
    /// which editor clients send when they pass a file name.
    ///
    /// # Errors
    ///
    /// Returns [`UnitNameError`] for empty names, empty segments, and names
    /// containing `/` or `\`.
    pub fn new(name: &str, body: impl Into<String>) -> Result<Self, UnitNameError> {
        let stripped = name.strip_suffix(SOURCE_SUFFIX).unwrap_or(name);
        if stripped.is_empty() {
            return Err(UnitNameError::Empty);
        }
        if stripped.contains(['/', '\\']) {
            return Err(UnitNameError::PathSeparator {
                name: name.to_owned(),
            });
        }
        if stripped.split('.').any(str::is_empty) {
            return Err(UnitNameError::EmptySegment {
                name: name.to_owned(),
            });
        }
        Ok(Self {
            name: stripped.to_owned(),
            body: body.into(),
        })
    }

    /// Dotted type name without the `.java` suffix.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source text exactly as framed from the request body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Path of the unit relative to a source root, e.g. `foo/Bar.java`.
    #[must_use]
    pub fn relative_path(&self) -> Utf8PathBuf {
        let mut path: Utf8PathBuf = self.name.split('.').collect();
        path.set_extension("java");
        path
    }
}
