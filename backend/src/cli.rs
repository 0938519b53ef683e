//! Minimal CLI parsing for the subcommand to run.

use std::env;

use anyhow::{Result, bail};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server
    #[default]
    Serve,
    /// Replace the database contents with demo data
    Demo,
}

impl Command {
    pub fn from_args() -> Result<Self> {
        Self::parse(env::args().skip(1))
    }

    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut command = Command::default();
        for arg in args {
            command = match arg.as_str() {
                "serve" => Command::Serve,
                "demo" | "--demo" => Command::Demo,
                other => bail!("Unknown argument: {} (expected `serve` or `demo`)", other),
            };
        }
        Ok(command)
    }
}
