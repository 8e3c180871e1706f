use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the dashboard.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A required source file is missing or could not be read.
    #[error("Failed to read data source {path}: {source}")]
    DataSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source file does not carry a required header column.
    #[error("Missing column '{column}' in {path}")]
    MissingColumn { path: PathBuf, column: String },

    /// A source file could not be parsed as a delimited table.
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// The expected data directory does not exist.
    #[error("Data directory not found: {0}")]
    DataDirNotFound(PathBuf),

    /// An error originating from the terminal / TUI layer.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_data_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = DashboardError::DataSource {
            path: PathBuf::from("/data/Facebook.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read data source"));
        assert!(msg.contains("/data/Facebook.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_missing_column() {
        let err = DashboardError::MissingColumn {
            path: PathBuf::from("/data/Google.csv"),
            column: "spend".to_string(),
        };
        assert_eq!(err.to_string(), "Missing column 'spend' in /data/Google.csv");
    }

    #[test]
    fn test_error_display_data_dir_not_found() {
        let err = DashboardError::DataDirNotFound(PathBuf::from("/missing/dir"));
        assert_eq!(err.to_string(), "Data directory not found: /missing/dir");
    }

    #[test]
    fn test_error_display_terminal() {
        let err = DashboardError::Terminal("crossterm failure".to_string());
        assert_eq!(err.to_string(), "Terminal error: crossterm failure");
    }

    #[test]
    fn test_error_display_config() {
        let err = DashboardError::Config("bad refresh rate".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad refresh rate");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: DashboardError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }
}
