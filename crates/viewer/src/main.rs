use std::process::ExitCode;

mod app;

fn main() -> ExitCode {
    match app::build_app(std::env::args_os().nth(1)) {
        Ok(wiring) => app::run(wiring),
        Err(err) => {
            tracing::error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
    }
}
