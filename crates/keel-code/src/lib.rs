//! Terminal coding assistant powered by keel-rs.
//!
//! `keel-code` wires a [`keel_rs::agent::Agent`] to the OpenRouter API, the
//! file tools and a JSON session file, and exposes the pieces so other front
//! ends can reuse them.
//!
//! # Library usage
//!
//! ```ignore
//! use keel_code::{CodeConfig, Overrides};
//! use keel_rs::prelude::*;
//!
//! let config = CodeConfig::load(None)?
//!     .with_overrides(Overrides::default())
//!     .with_env(|k| std::env::var(k).ok());
//! let agent = Agent::new(
//!     config.client()?,
//!     config.tool_set(),
//!     config.session_store(),
//!     config.agent_config(),
//! );
//! ```
//!
//! # Binary
//!
//! ```sh
//! # One turn per invocation
//! keel-code --workdir /path/to/project "Add error handling to src/main.rs"
//!
//! # Or one slash command
//! keel-code /focus src/main.rs
//! ```

pub mod config;
pub mod dispatch;
pub mod prompt;

pub use config::{CodeConfig, ConfigError, Overrides};
pub use prompt::coding_system_prompt;
