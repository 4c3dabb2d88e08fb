use anyhow::{Context, Error};
use git2::Signature;

use super::core::GitRepo;

impl GitRepo {
    pub(crate) fn create_signature(&self) -> Result<Signature<'static>, Error> {
        let config = self
            .repo()
            .config()
            .context("Failed to get repository config")?;

        let fallback = self.identity();

        let author_name = match config.get_string("user.name") {
            Ok(name) => name,
            Err(_) => fallback.map(|id| id.name.clone()).context(
                "Failed to get user.name from git config. Run: git config user.name \"Your Name\"",
            )?,
        };

        let author_email = match config.get_string("user.email") {
            Ok(email) => email,
            Err(_) => fallback.map(|id| id.email.clone()).context(
                "Failed to get user.email from git config. Run: git config user.email \"your@email.com\"",
            )?,
        };

        Signature::now(&author_name, &author_email)
            .context("Failed to create signature with git config values")
    }
}
