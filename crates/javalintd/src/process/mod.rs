//! Process-level launch sequencing and the stdout handshake.

mod errors;
mod launch;

pub use errors::LaunchError;
pub use launch::{
    PORT_USED_TOKEN, READY_TOKEN, RunningServer, report_launch_failure, run_server,
    run_server_with, start_server,
};

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
