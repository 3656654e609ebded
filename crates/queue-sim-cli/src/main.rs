use queue_sim_cli::{run_cli, CliError};
use tracing::error;

#[tokio::main]
async fn main() {
    // Run CLI and handle errors
    if let Err(e) = run_cli().await {
        match e {
            // These fail before a subscriber is installed
            CliError::Configuration(_) | CliError::Logging { .. } => {
                eprintln!("queue-sim: {}", e)
            }
            _ => error!("CLI error: {}", e),
        }

        // Exit with appropriate code based on error type
        let exit_code = match e {
            CliError::Configuration(_) => 1,
            CliError::Logging { .. } => 2,
            CliError::CommandFailed { .. } => 3,
            CliError::Io(_) => 4,
            CliError::Output(_) => 5,
        };

        std::process::exit(exit_code);
    }
}
