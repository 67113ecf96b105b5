//! moviedb common library
//!
//! Shared pieces used by every moviedb workspace member:
//!
//! - **Error Handling**: the common error type and result alias
//! - **Logging**: tracing subscriber setup driven by `LOG_*` variables
//! - **Schema**: table, view and column names of the normalized catalog
//!
//! # Example
//!
//! ```no_run
//! use moviedb_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> moviedb_common::Result<()> {
//!     let _guard = init_logging(&LogConfig::from_env()?)?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod error;
pub mod logging;
pub mod schema;

pub use error::{CommonError, Result};
