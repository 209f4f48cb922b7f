//! CLI module for Relaymesh
//!
//! Provides commands:
//! - `serve`: run the orchestrator HTTP server
//! - `relay`: run the forwarding gateway in front of an orchestrator
//! - `run`: route and execute one task, then exit
//! - `agents`: list the executor registry

use clap::{Parser, Subcommand};

pub mod agents;
pub mod run;

/// Relaymesh CLI
#[derive(Parser, Debug)]
#[command(name = "relaymesh")]
#[command(about = "Capability-routed executor mesh with a semantic cache")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the orchestrator server
    Serve,
    /// Start the relay gateway
    Relay,
    /// Run a single task and print the result
    Run {
        /// Task text
        task: String,
        /// User id recorded with the run
        #[arg(short, long, default_value = "cli")]
        user: String,
    },
    /// List loaded executors
    Agents,
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Serve) => crate::server::run().await,
        Some(Commands::Relay) => crate::server::run_relay().await,
        Some(Commands::Run { task, user }) => run::run(&task, &user).await,
        Some(Commands::Agents) => agents::run(),
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_command() {
        let cli = Cli::try_parse_from(["relaymesh", "run", "Research AI trends", "--user", "u1"])
            .unwrap();
        match cli.command {
            Some(Commands::Run { task, user }) => {
                assert_eq!(task, "Research AI trends");
                assert_eq!(user, "u1");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_run_user_defaults_to_cli() {
        let cli = Cli::try_parse_from(["relaymesh", "run", "plan"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Run { user, .. }) if user == "cli"));
    }

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::try_parse_from(["relaymesh"]).unwrap();
        assert!(cli.command.is_none());
    }
}
