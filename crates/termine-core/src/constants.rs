/// Identification sent with every outgoing HTTP request
pub const APP_NAME: &str = "termine";
pub const USER_AGENT: &str = const_str::concat!(APP_NAME, "/", env!("CARGO_PKG_VERSION"));

/// Timeout applied to feed downloads and wiki API calls
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Display zone used when the configuration names none
pub const DEFAULT_TIMEZONE: &str = "Europe/Berlin";

/// Edit summary used when the configuration names none
pub const DEFAULT_EDIT_SUMMARY: &str = "refreshed via script";
