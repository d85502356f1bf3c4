//! Helpful error types for CLI commands
//!
//! Every error includes:
//! - What went wrong
//! - Context about the situation
//! - Suggestions for how to fix it

use quarry_finder::{FinderError, MetadataError};
use std::fmt;
use std::path::Path;

/// An error with helpful context and suggestions
#[derive(Debug)]
pub struct HelpfulError {
    /// The main error message
    pub message: String,
    /// Additional context about what was happening
    pub context: Option<String>,
    /// Suggestions for how to fix the error
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    /// Create a new helpful error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a suggestion for fixing the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add multiple suggestions
    pub fn with_suggestions(
        mut self,
        suggestions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.suggestions
            .extend(suggestions.into_iter().map(|s| s.into()));
        self
    }

    // === Common error constructors ===

    /// Job file missing or unparseable
    pub fn cannot_read_job(path: &Path, err: &FinderError) -> Self {
        Self::new(format!("Cannot read job file {}: {}", path.display(), err))
            .with_context("Job files are TOML; nested tables are flattened into dotted keys")
            .with_suggestions([
                format!("TRY: Check that the file exists: ls -la {}", path.display()),
                "TRY: Validate the TOML syntax of the job file".to_string(),
            ])
    }

    /// Job file resolved to an unusable finder config
    pub fn invalid_job(path: &Path, err: &FinderError) -> Self {
        let base = Self::new(format!("Invalid job {}: {}", path.display(), err));
        match err {
            FinderError::MissingConfig { key } => base
                .with_context("Every job needs a store URI, a whitelist tag and a common dataset root")
                .with_suggestion(format!("TRY: Add `{} = \"...\"` to {}", key, path.display())),
            FinderError::InvalidLocation { key, .. } => base
                .with_context("Store URIs need a scheme or a leading '/'")
                .with_suggestion(format!("TRY: Fix the value of `{}`", key)),
            _ => base,
        }
    }

    /// Store file missing or unparseable
    pub fn cannot_load_store(path: &Path, err: &MetadataError) -> Self {
        Self::new(format!("Cannot load tag store {}: {}", path.display(), err))
            .with_context("Store files are TOML with a `root` and `[[node]]` entries")
            .with_suggestion(format!("TRY: Check that the file exists: ls -la {}", path.display()))
    }

    /// Discovery aborted
    pub fn discovery_failed(err: &FinderError) -> Self {
        let base = Self::new(format!("Dataset discovery failed: {}", err));
        match err {
            FinderError::Metadata {
                source: MetadataError::FactoryMissing { scheme },
                ..
            } => base
                .with_context(format!("No --store file has a root with scheme '{}'", scheme))
                .with_suggestion("TRY: Pass the store file for the job's store URI with --store"),
            FinderError::Metadata {
                source: MetadataError::StoreCreation { .. },
                ..
            } => base
                .with_context("A tag lies outside every loaded store root")
                .with_suggestion("TRY: Compare `quarry.store.uri` with the `root` of each store file"),
            FinderError::Metadata {
                source: MetadataError::VersionUnresolvable { .. },
                ..
            } => base
                .with_context("The job pins `quarry.store.version`")
                .with_suggestion("TRY: Update the pinned version or load the matching store file"),
            _ => base,
        }
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}
