//! Built-in filesystem tools.
//!
//! Each tool is rooted at a working directory. Relative paths resolve
//! against it; absolute paths must stay inside it, and `..` components are
//! rejected outright.
//!
//! | Tool | Name | Purpose |
//! |------|------|---------|
//! | [`ReadFile`] | `read_file` | Read a single file |
//! | [`WriteFile`] | `write_file` | Create or overwrite a file |
//! | [`ListDirectory`] | `list_directory` | List a directory |
//!
//! Register all three with [`ToolSet::with_file_tools`](crate::tools::ToolSet::with_file_tools).

use std::path::{Component, Path, PathBuf};

use schemars::JsonSchema;
use serde::Deserialize;
use tokio::fs;

use crate::tools::core::{Tool, ToolFuture, parse_tool_args};
use crate::tools::names;
use crate::{ToolDef, json_schema_for};

// ── Typed argument structs ──────────────────────────────────────────

/// Typed arguments for `read_file`.
#[derive(Deserialize, JsonSchema)]
pub struct ReadFileArgs {
    /// Path to the file to read (e.g. 'src/main.rs').
    pub path: String,
}

/// Typed arguments for `write_file`.
#[derive(Deserialize, JsonSchema)]
pub struct WriteFileArgs {
    /// Path to the file to write. Missing parent directories are created.
    pub path: String,
    /// Full content to write to the file.
    pub content: String,
}

/// Typed arguments for `list_directory`.
#[derive(Deserialize, JsonSchema)]
pub struct ListDirectoryArgs {
    /// Directory to list (e.g. '.', 'src').
    pub path: String,
}

/// Make a tool root absolute so absolute paths inside it are accepted.
fn rooted(workdir: PathBuf) -> PathBuf {
    std::path::absolute(&workdir).unwrap_or(workdir)
}

/// Resolve a tool-supplied path against `workdir`.
pub fn resolve_path(workdir: &Path, path: &str) -> Result<PathBuf, String> {
    let requested = Path::new(path);
    if requested.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err("path traversal not allowed".to_string());
    }
    if requested.is_absolute() {
        if requested.starts_with(workdir) {
            Ok(requested.to_path_buf())
        } else {
            Err(format!("path '{path}' is outside the working directory"))
        }
    } else {
        Ok(workdir.join(requested))
    }
}

// ── ReadFile ────────────────────────────────────────────────────────

/// Read a file from the working directory.
pub struct ReadFile {
    workdir: PathBuf,
}

impl ReadFile {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: rooted(workdir.into()),
        }
    }
}

impl Tool for ReadFile {
    fn definition(&self) -> ToolDef {
        ToolDef::new(
            names::READ_FILE,
            "Read the contents of a file",
            json_schema_for::<ReadFileArgs>(),
        )
    }

    fn execute(&self, arguments: &str) -> ToolFuture<'_> {
        let arguments = arguments.to_string();
        Box::pin(async move { self.read(&arguments).await })
    }
}

impl ReadFile {
    async fn read(&self, arguments: &str) -> Result<String, String> {
        let args: ReadFileArgs = parse_tool_args(arguments)?;
        let full_path = resolve_path(&self.workdir, &args.path)?;

        if let Ok(meta) = fs::metadata(&full_path).await
            && meta.is_dir()
        {
            return Err(format!(
                "'{}' is a directory, not a file. Use list_directory to browse directories.",
                args.path
            ));
        }

        fs::read_to_string(&full_path)
            .await
            .map_err(|e| format!("failed to read '{}': {e}", full_path.display()))
    }
}

// ── WriteFile ───────────────────────────────────────────────────────

/// Create or overwrite a file in the working directory.
pub struct WriteFile {
    workdir: PathBuf,
}

impl WriteFile {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: rooted(workdir.into()),
        }
    }
}

impl Tool for WriteFile {
    fn definition(&self) -> ToolDef {
        ToolDef::new(
            names::WRITE_FILE,
            "Write content to a file, creating it if it doesn't exist",
            json_schema_for::<WriteFileArgs>(),
        )
    }

    fn execute(&self, arguments: &str) -> ToolFuture<'_> {
        let arguments = arguments.to_string();
        Box::pin(async move { self.write(&arguments).await })
    }
}

impl WriteFile {
    async fn write(&self, arguments: &str) -> Result<String, String> {
        let args: WriteFileArgs = parse_tool_args(arguments)?;
        let full_path = resolve_path(&self.workdir, &args.path)?;

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| format!("failed to create directory: {e}"))?;
        }
        fs::write(&full_path, &args.content)
            .await
            .map_err(|e| format!("failed to write '{}': {e}", full_path.display()))?;

        Ok(format!(
            "Successfully wrote {} bytes to {}",
            args.content.len(),
            args.path
        ))
    }
}

// ── ListDirectory ───────────────────────────────────────────────────

/// List a directory under the working directory, one entry per line,
/// sorted by name.
pub struct ListDirectory {
    workdir: PathBuf,
}

impl ListDirectory {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: rooted(workdir.into()),
        }
    }
}

impl Tool for ListDirectory {
    fn definition(&self) -> ToolDef {
        ToolDef::new(
            names::LIST_DIRECTORY,
            "List the contents of a directory",
            json_schema_for::<ListDirectoryArgs>(),
        )
    }

    fn execute(&self, arguments: &str) -> ToolFuture<'_> {
        let arguments = arguments.to_string();
        Box::pin(async move { self.list(&arguments).await })
    }
}

impl ListDirectory {
    async fn list(&self, arguments: &str) -> Result<String, String> {
        let args: ListDirectoryArgs = parse_tool_args(arguments)?;
        let full_path = resolve_path(&self.workdir, &args.path)?;

        let mut dir = fs::read_dir(&full_path)
            .await
            .map_err(|e| format!("failed to read directory '{}': {e}", args.path))?;

        let mut entries = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| format!("failed to read directory '{}': {e}", args.path))?
        {
            let Ok(meta) = entry.metadata().await else {
                continue;
            };
            let kind = if meta.is_dir() { "directory" } else { "file" };
            entries.push((
                entry.file_name().to_string_lossy().into_owned(),
                kind,
                meta.len(),
            ));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut out = format!("Contents of {}:\n", args.path);
        for (name, kind, size) in entries {
            out.push_str(&format!("  {name} ({kind}, {size} bytes)\n"));
        }
        Ok(out)
    }
}
