use anyhow::Result;
use mockall::automock;

/// Where the bearer token attached to outgoing requests lives.
#[automock]
pub trait TokenStore {
    fn token(&self) -> Option<String>;

    fn set_token(&self, token: &str) -> Result<()>;

    fn clear_token(&self) -> Result<()>;
}
