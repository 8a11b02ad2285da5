//! Canonical tool name constants.
//!
//! `EDIT_FILE` and `FIND_FILES` have no built-in implementation; the agent
//! still recognizes them for file tracking when a host registers them.

pub const READ_FILE: &str = "read_file";
pub const WRITE_FILE: &str = "write_file";
pub const EDIT_FILE: &str = "edit_file";
pub const LIST_DIRECTORY: &str = "list_directory";
pub const FIND_FILES: &str = "find_files";
