//! Subcommand implementations. Each module owns its clap `Args` struct and a
//! `run(self)` consuming entry point.

pub mod apply;
pub mod init;
pub mod plan;
pub mod state;
