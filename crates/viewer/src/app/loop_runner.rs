use std::process::ExitCode;

use engine::{DesktopHost, DiskImageLoader, WorldLoop};
use tracing::{error, info};

use super::bootstrap::AppWiring;
use super::AppError;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    match run_world(app) {
        Ok(()) => {
            info!("viewer_exited");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
    }
}

fn run_world(app: AppWiring) -> Result<(), AppError> {
    let host = DesktopHost::init(&app.config.window_title, app.config.viewport)?;
    let mut world = WorldLoop::new(host, app.tilemap, app.config, &DiskImageLoader);
    world.run();
    Ok(())
}
