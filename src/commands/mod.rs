//! Command handlers, one module per subcommand.

pub mod activate;
pub mod create;
pub mod info;
pub mod list;
pub mod remove;
