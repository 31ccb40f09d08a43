//! Test suites for the lint daemon.

mod behaviour;
pub(crate) mod support;
