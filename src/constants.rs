//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Model gateway constants
pub mod gateway {
    /// Default maximum attempts per generation request
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 1_000;

    /// Maximum delay between retries (seconds)
    pub const MAX_DELAY_SECS: u64 = 60;
}

/// Pipeline constants
pub mod pipeline {
    /// Delay between processed records (milliseconds)
    pub const RECORD_DELAY_MS: u64 = 1_000;

    /// Delay between record patches in a cleanup pass (milliseconds)
    pub const CLEANUP_DELAY_MS: u64 = 200;

    /// Closed answer alphabet for multiple-choice clones
    pub const ANSWER_ALPHABET: &str = "ABCDE";

    /// Substituted when the model omits the analysis section
    pub const MISSING_ANALYSIS: &str = "No analysis provided";

    /// Substituted when the model omits the explanation section
    pub const MISSING_EXPLANATION: &str = "No explanation provided";
}

/// HTTP/Network constants
pub mod network {
    /// Default per-attempt request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Default maximum tokens requested from a backend
    pub const DEFAULT_MAX_TOKENS: usize = 1_000;
}

/// Record store constants
pub mod store {
    /// Airtable REST API root
    pub const API_ROOT: &str = "https://api.airtable.com/v0";

    /// Upstream filter selecting source questions cleared for cloning
    pub const SOURCE_READY_CHECK: &str = "✅ Match";

    /// Field carrying the source question markup
    pub const SOURCE_BODY_FIELD: &str = "LatexMarkdown";

    /// Default field rewritten by a cleanup pass
    pub const CLEANUP_FIELD: &str = "Explanation 4o";
}
