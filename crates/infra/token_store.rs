use anyhow::{Context, Result};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use crate::domain::repositories::token_store::TokenStore;

/// Keeps the bearer token in a single file, read on every request.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn token(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Some(raw.trim().to_string()).filter(|t| !t.is_empty()),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "token_store: failed to read token"
                );
                None
            }
        }
    }

    fn set_token(&self, token: &str) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            anyhow::bail!("token must not be empty");
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&self.path, token)
            .with_context(|| format!("failed to write token to {}", self.path.display()))?;

        debug!(path = %self.path.display(), "token_store: token saved");
        Ok(())
    }

    fn clear_token(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err)
                .with_context(|| format!("failed to remove token file {}", self.path.display())),
        }
    }
}

/// A fixed token (from `AUTH_TOKEN`) that shadows the wrapped store on reads.
pub struct OverrideTokenStore<S> {
    token: Option<String>,
    inner: S,
}

impl<S: TokenStore> OverrideTokenStore<S> {
    pub fn new(token: Option<String>, inner: S) -> Self {
        let token = token.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
        Self { token, inner }
    }

    pub fn is_overridden(&self) -> bool {
        self.token.is_some()
    }
}

impl<S: TokenStore> TokenStore for OverrideTokenStore<S> {
    fn token(&self) -> Option<String> {
        self.token.clone().or_else(|| self.inner.token())
    }

    fn set_token(&self, token: &str) -> Result<()> {
        if self.is_overridden() {
            warn!("token_store: AUTH_TOKEN is set and takes precedence over the saved token");
        }
        self.inner.set_token(token)
    }

    fn clear_token(&self) -> Result<()> {
        if self.is_overridden() {
            warn!("token_store: AUTH_TOKEN is set and will still be sent");
        }
        self.inner.clear_token()
    }
}
