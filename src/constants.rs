//! Application constants for Tube Fetcher
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain for maintainability and clarity.

/// Application identity and default locations
pub mod app {
    /// Directory name under the platform config directory
    pub const APP_DIR_NAME: &str = "tube-fetcher";

    /// Configuration file name
    pub const CONFIG_FILE_NAME: &str = "config.toml";
}

/// Persistent store constants
pub mod store {
    /// Database file name inside the data directory
    pub const DB_FILE_NAME: &str = "library.db";

    /// Offset added to the schema version before writing `PRAGMA user_version`,
    /// so an unrelated SQLite file is never mistaken for one of ours
    pub const BASE_USER_VERSION: usize = 77000;
}

/// Filename generation constants
pub mod naming {
    /// Characters stripped from rendered filenames
    pub const ILLEGAL_FILENAME_CHARS: &[char] =
        &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

    /// Template applied when the user has not configured one
    pub const DEFAULT_TEMPLATE: &str = "{title} [{quality}].{format}";

    /// Hard cap applied after sanitation
    pub const MAX_FILENAME_LEN: usize = 200;
}

/// Queue bookkeeping constants
pub mod queue {
    /// Upper bound for the derived progress percentage
    pub const PROGRESS_MAX: f64 = 100.0;
}
