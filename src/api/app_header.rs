//! Identification headers sent with every API request.

/// Header naming the calling application.
pub const APP_HEADER: &str = "X-RosetteAPI-App";

/// Header carrying the API key.
pub const KEY_HEADER: &str = "X-RosetteAPI-Key";

/// Default application identifier: `<package>-<version>/<os>`.
pub fn default_app_header() -> String {
    format!(
        "{}-{}/{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    )
}

/// Resolve the application header from config.
/// - None or empty => default identifier
/// - other => custom identifier
pub fn resolve_app_header(config: Option<&str>) -> String {
    match config.map(str::trim) {
        None | Some("") => default_app_header(),
        Some(custom) => custom.to_string(),
    }
}
