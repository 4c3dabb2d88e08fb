use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "repodesk")]
#[command(about = "HTTP backend for versioned JSON records, user accounts and email notifications")]
pub struct Cli {
    /// Configuration file; defaults apply when it does not exist
    #[arg(long, default_value = "repodesk.toml")]
    pub config: PathBuf,

    /// Address to listen on, overriding `server.bind`
    #[arg(long)]
    pub bind: Option<SocketAddr>,

    /// Working copy of the managed repository, overriding `repository.path`
    #[arg(long)]
    pub repo: Option<PathBuf>,
}

impl Cli {
    pub fn apply(&self, config: &mut Config) {
        if let Some(bind) = self.bind {
            config.server.bind = bind;
        }
        if let Some(repo) = &self.repo {
            config.repository.path = repo.clone();
        }
    }
}
