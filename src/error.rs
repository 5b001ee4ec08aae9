use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TfimportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found - {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("File is empty - {}", .0.display())]
    EmptyFile(PathBuf),

    #[error("Failed to parse JSON in file {}: {message}", path.display())]
    Json { path: PathBuf, message: String },

    #[error("Missing top-level key `{key}` in {}", path.display())]
    MissingKey { path: PathBuf, key: &'static str },

    #[error("No patterns found - {}", .0.display())]
    EmptyPatterns(PathBuf),

    #[error("Error writing to output file {}: {source}", path.display())]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Command execution error: {0}")]
    CommandExecutionError(String),

    #[error("Terraform error: {0}")]
    TerraformError(String),
}

pub type Result<T> = std::result::Result<T, TfimportError>;

/// Reads a file to a string, mapping a missing file to `FileNotFound`
/// and a whitespace-only file to `EmptyFile`.
pub(crate) fn read_non_empty(path: &std::path::Path) -> Result<String> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => TfimportError::FileNotFound(path.to_owned()),
        _ => TfimportError::Io(e),
    })?;
    if content.trim().is_empty() {
        return Err(TfimportError::EmptyFile(path.to_owned()));
    }
    Ok(content)
}
