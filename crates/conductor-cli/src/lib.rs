//! Conductor CLI library: the subcommand implementations behind the
//! `conductor` binary, exposed for integration tests.

pub mod commands;
