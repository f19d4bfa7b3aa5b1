//! CLI library components for the Workspace launcher.

#![allow(missing_docs)]

pub mod cli;
pub mod commands;
pub mod logging;
