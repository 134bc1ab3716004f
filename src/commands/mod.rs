//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands wire the library components to files, stdout and the network.

pub mod aggregate;
pub mod serve;
pub mod utils;

// Re-export main command functions
pub use aggregate::{execute_aggregate, validate_args, AggregateArgs};
pub use serve::{execute_serve, resolve_config, ServeArgs};
pub use utils::{display_schema, display_version};
