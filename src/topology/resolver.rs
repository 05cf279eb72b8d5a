// ABOUTME: Credential resolution for required-env placeholders.
// ABOUTME: Looks up provider-scoped then bare variables in the environment and a .env file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::ConfigError;
use crate::types::{Placeholder, ProviderName, Secret};

/// Raised by a resolver when no value exists for a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MissingCredential {
    pub tried: Vec<String>,
}

/// Supplies credential values for placeholders at build time.
pub trait CredentialResolver {
    fn resolve(
        &self,
        placeholder: &Placeholder,
        provider: &ProviderName,
    ) -> Result<Secret, MissingCredential>;
}

impl<F> CredentialResolver for F
where
    F: Fn(&Placeholder, &ProviderName) -> Option<String>,
{
    fn resolve(
        &self,
        placeholder: &Placeholder,
        provider: &ProviderName,
    ) -> Result<Secret, MissingCredential> {
        self(placeholder, provider)
            .filter(|value| !value.is_empty())
            .map(Secret::new)
            .ok_or_else(MissingCredential::default)
    }
}

/// Resolves credentials from the process environment, falling back to a `.env` file.
///
/// For placeholder `USERNAME` of provider `proton-vpn` the candidates are
/// `PROTON_VPN_USERNAME` then `USERNAME`. Each candidate is checked in the
/// process environment before the file. Empty values count as missing.
#[derive(Debug, Default)]
pub struct EnvCredentials {
    dotenv: HashMap<String, String>,
    dotenv_path: Option<PathBuf>,
}

impl EnvCredentials {
    /// Resolve from the process environment only.
    pub fn from_process() -> Self {
        Self::default()
    }

    /// Resolve from the process environment and the given `.env` file.
    ///
    /// A missing file is not an error; an unparsable one is. The file's values
    /// are never exported into the process environment.
    pub fn with_dotenv(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "no .env file, using process environment only");
            return Ok(Self::default());
        }

        let malformed = |e: dotenvy::Error| ConfigError::Malformed {
            message: format!("{}: {e}", path.display()),
        };

        let dotenv = dotenvy::from_path_iter(path)
            .map_err(malformed)?
            .collect::<Result<HashMap<_, _>, _>>()
            .map_err(malformed)?;

        tracing::debug!(path = %path.display(), entries = dotenv.len(), "loaded .env file");

        Ok(Self {
            dotenv,
            dotenv_path: Some(path.to_path_buf()),
        })
    }

    /// Variable names consulted for a placeholder, most specific first.
    pub fn candidates(placeholder: &Placeholder, provider: &ProviderName) -> [String; 2] {
        [
            format!("{}_{}", provider.env_prefix(), placeholder),
            placeholder.to_string(),
        ]
    }

    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name)
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.dotenv.get(name).filter(|v| !v.is_empty()).cloned())
    }
}

impl CredentialResolver for EnvCredentials {
    fn resolve(
        &self,
        placeholder: &Placeholder,
        provider: &ProviderName,
    ) -> Result<Secret, MissingCredential> {
        let candidates = Self::candidates(placeholder, provider);

        if let Some(value) = candidates.iter().find_map(|name| self.lookup(name)) {
            return Ok(Secret::new(value));
        }

        let mut tried: Vec<String> = candidates.iter().map(|name| format!("${name}")).collect();
        if let Some(path) = &self.dotenv_path {
            tried.push(path.display().to_string());
        }
        Err(MissingCredential { tried })
    }
}
