//! codechain binary entry point.

use std::process::ExitCode;

fn main() -> ExitCode {
    match codechain::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            codechain::ui::output::error(format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
