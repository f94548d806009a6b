mod cli;
mod commands;
mod infra;

use blood_panel::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
