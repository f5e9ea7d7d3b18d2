//! # Custody Node
//!
//! Command-line host for the custody registry.
//!
//! ## Modules
//!
//! - `script` - JSON-lines operation scripts and their result lines
//! - `demo` - the built-in widget walk-through
//! - `snapshot` - JSON snapshot files
//! - `logging` - `tracing-subscriber` setup
//!
//! ## Startup Sequence
//!
//! 1. Load `RegistryConfig` from the environment, then apply CLI overrides
//!    (`demo` skips this and uses only the log flags)
//! 2. Install logging
//! 3. Restore from `--snapshot-in` or build a fresh registry from config
//! 4. Execute the script, printing one JSON line per operation
//! 5. Write `--snapshot-out` if requested

#![warn(missing_docs)]

pub mod demo;
pub mod logging;
pub mod script;
pub mod snapshot;

pub use demo::{run_demo, DemoReport};
pub use logging::init_logging;
pub use script::{execute, run_script, Command, ExecuteError, Outcome};
pub use snapshot::{read_snapshot, write_snapshot};
