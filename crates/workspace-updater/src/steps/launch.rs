//! Start the main application.

use std::path::Path;

use crate::error::{Result, UpdateError};
use crate::process::ProcessControl;

/// Start `main_executable` from `app_dir`, detached, with `app_dir` as its
/// working directory.
///
/// A missing executable is [`UpdateError::MainAppMissing`]. There is nothing
/// left to fall back to after that.
pub fn launch_main_app(
    processes: &dyn ProcessControl,
    app_dir: &Path,
    main_executable: &str,
) -> Result<u32> {
    let exe = app_dir.join(main_executable);
    if !exe.is_file() {
        tracing::error!("Main application not found at {}", exe.display());
        return Err(UpdateError::MainAppMissing(exe));
    }

    tracing::info!("Launching {}", exe.display());
    processes.spawn_detached(&exe, &[], Some(app_dir))
}
