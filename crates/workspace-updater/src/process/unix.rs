//! Unix process group setup.

use std::os::unix::process::CommandExt;
use std::process::Command;

/// The child leads its own process group, so terminal signals aimed at the
/// launcher do not reach it.
pub(super) fn configure_detached(command: &mut Command) {
    command.process_group(0);
}
