// crates/folio-config/src/data_dir.rs
// ============================================================================
// Module: Data Directory Resolution
// Description: Locates the storage root across deployment layouts.
// Purpose: Always produce a usable root without failing startup.
// Dependencies: tracing
// ============================================================================

//! ## Overview
//! Candidates are tried in order: the configured directory, the
//! `FOLIO_DATA_DIR` and `DATA_DIR` environment variables, then conventional
//! locations used by source checkouts, containers and packaged installs. The
//! first candidate that is an existing directory wins. When none exists the
//! fallback directory is created; a creation failure is logged and the
//! fallback path is still returned, so resolution never fails.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fs;
use std::path::PathBuf;

use tracing::info;
use tracing::warn;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variables consulted for the storage root, in order.
pub const DATA_DIR_ENV_VARS: [&str; 2] = ["FOLIO_DATA_DIR", "DATA_DIR"];

/// Conventional storage roots, in order.
pub const CONVENTIONAL_DATA_DIRS: [&str; 5] =
    ["data", "../data", "server/data", "backend/data", "/var/lib/folio"];

/// Directory created when no candidate exists.
pub const FALLBACK_DATA_DIR: &str = "data";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Where a resolved storage root came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataDirOrigin {
    /// Configured explicitly.
    Explicit,
    /// Named by the given environment variable.
    Environment(String),
    /// A conventional deployment location.
    Conventional,
    /// Nothing existed; the fallback was used.
    Fallback,
}

impl fmt::Display for DataDirOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit => f.write_str("explicit"),
            Self::Environment(var) => write!(f, "env:{var}"),
            Self::Conventional => f.write_str("conventional"),
            Self::Fallback => f.write_str("fallback"),
        }
    }
}

/// A resolved storage root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDataDir {
    /// Storage root path.
    pub path: PathBuf,
    /// How the path was chosen.
    pub origin: DataDirOrigin,
}

/// Environment variable lookup.
type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Ordered storage root candidates.
pub struct DataDirResolver {
    /// Configured root, tried first.
    explicit: Option<PathBuf>,
    /// Reads environment variables.
    env: EnvLookup,
    /// Conventional roots.
    conventional: Vec<PathBuf>,
    /// Root created when nothing else exists.
    fallback: PathBuf,
}

impl fmt::Debug for DataDirResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataDirResolver")
            .field("explicit", &self.explicit)
            .field("conventional", &self.conventional)
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

impl DataDirResolver {
    /// Creates a resolver reading the process environment.
    #[must_use]
    pub fn new(explicit: Option<PathBuf>) -> Self {
        Self {
            explicit,
            env: Box::new(|name| std::env::var(name).ok()),
            conventional: CONVENTIONAL_DATA_DIRS.iter().map(PathBuf::from).collect(),
            fallback: PathBuf::from(FALLBACK_DATA_DIR),
        }
    }

    /// Replaces the environment lookup.
    #[must_use]
    pub fn with_env_lookup(
        mut self,
        lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.env = Box::new(lookup);
        self
    }

    /// Replaces the conventional locations.
    #[must_use]
    pub fn with_conventional(mut self, dirs: Vec<PathBuf>) -> Self {
        self.conventional = dirs;
        self
    }

    /// Replaces the fallback directory.
    #[must_use]
    pub fn with_fallback(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fallback = dir.into();
        self
    }

    /// Returns every candidate in resolution order.
    #[must_use]
    pub fn candidates(&self) -> Vec<ResolvedDataDir> {
        let mut candidates = Vec::new();
        if let Some(path) = &self.explicit {
            candidates.push(ResolvedDataDir {
                path: path.clone(),
                origin: DataDirOrigin::Explicit,
            });
        }
        for var in DATA_DIR_ENV_VARS {
            if let Some(value) = (self.env)(var).filter(|value| !value.trim().is_empty()) {
                candidates.push(ResolvedDataDir {
                    path: PathBuf::from(value.trim()),
                    origin: DataDirOrigin::Environment(var.to_string()),
                });
            }
        }
        candidates.extend(self.conventional.iter().map(|path| ResolvedDataDir {
            path: path.clone(),
            origin: DataDirOrigin::Conventional,
        }));
        candidates
    }

    /// Resolves the storage root. Never fails.
    #[must_use]
    pub fn resolve(&self) -> ResolvedDataDir {
        if let Some(found) = self.candidates().into_iter().find(|candidate| candidate.path.is_dir())
        {
            info!(path = %found.path.display(), origin = %found.origin, "resolved data directory");
            return found;
        }
        if let Err(err) = fs::create_dir_all(&self.fallback) {
            warn!(
                path = %self.fallback.display(),
                error = %err,
                "failed to create fallback data directory"
            );
        } else {
            info!(path = %self.fallback.display(), "using fallback data directory");
        }
        ResolvedDataDir {
            path: self.fallback.clone(),
            origin: DataDirOrigin::Fallback,
        }
    }
}
