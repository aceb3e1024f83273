mod cli;
mod commands;
mod infra;

use carbon_ledger::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
