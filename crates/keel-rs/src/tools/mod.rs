//! Tool abstractions for LLM function-calling agents.
//!
//! Every agent capability is a [`Tool`] trait implementor. Tools are
//! collected into a [`ToolSet`] which handles dispatch, validation,
//! truncation, and timeouts, and reports each call as a [`ToolOutcome`].
//!
//! # Submodules
//!
//! - [`core`]: [`Tool`] trait, [`ToolSet`], [`ToolOutcome`], helpers.
//! - [`common`]: built-in file tools `read_file`, `write_file` and
//!   `list_directory`. Register all at once with
//!   [`ToolSet::with_file_tools()`].
//! - [`names`]: canonical tool names.

pub mod common;
pub mod core;
pub mod names;

pub use common::{ListDirectory, ReadFile, WriteFile, resolve_path};
pub use core::{
    DEFAULT_MAX_RESULT_BYTES, Tool, ToolFuture, ToolOutcome, ToolSet, parse_tool_args,
    truncate_result, validate_tool_arguments,
};
