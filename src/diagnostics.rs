// ABOUTME: Diagnostics accumulator for non-fatal warnings during build and lifecycle actions.
// ABOUTME: Collects warnings that shouldn't fail an action but should be shown to users.

/// Collects non-fatal warnings.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!(kind = ?warning.kind, "{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A non-fatal issue with its category.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// A required credential replaced an optional or derived variable of the same name.
    pub fn shadowed_env(provider: &str, key: &str) -> Self {
        Self {
            kind: WarningKind::ShadowedEnv,
            message: format!(
                "provider `{provider}`: required variable `{key}` overrides an optional value"
            ),
        }
    }

    /// `down` found no services of the project.
    pub fn nothing_to_stop(project: &str) -> Self {
        Self {
            kind: WarningKind::NothingToStop,
            message: format!("no services of project `{project}` were running"),
        }
    }

    /// `down` could not list the project's services and removed them blind.
    pub fn listing_unavailable(project: &str, error: &impl std::fmt::Display) -> Self {
        Self {
            kind: WarningKind::ListingUnavailable,
            message: format!("could not list services of project `{project}`: {error}"),
        }
    }
}

/// Categories of warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    ShadowedEnv,
    NothingToStop,
    ListingUnavailable,
}
