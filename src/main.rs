use std::process::ExitCode;

use edgepass::cli;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if it exists; a missing file is not an error
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    match cli::run_cli().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(cli::exit_code(&e))
        }
    }
}
