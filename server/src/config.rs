use std::time::Duration;

pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_ASSET_DIR: &str = "assets";
pub const DEFAULT_LAYERS_MANIFEST: &str = "config/layers.json";
pub const DEFAULT_LAYER_REFRESH_SECS: u64 = 600; // re-fetch URL layers every 10 minutes
pub const DEFAULT_UPSTREAM_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS: u64 = 3;

pub fn server_port() -> u16 {
    std::env::var("MERIDIAN_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SERVER_PORT)
}

pub fn asset_dir() -> String {
    std::env::var("MERIDIAN_ASSET_DIR")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ASSET_DIR.to_string())
}

pub fn layers_manifest_path() -> String {
    std::env::var("MERIDIAN_LAYERS")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LAYERS_MANIFEST.to_string())
}

/// Refresh interval for URL-sourced layers. `0` disables refresh entirely.
pub fn layer_refresh_secs() -> u64 {
    std::env::var("LAYER_REFRESH_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(DEFAULT_LAYER_REFRESH_SECS)
}

pub fn upstream_http_timeout() -> Duration {
    std::env::var("UPSTREAM_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_UPSTREAM_HTTP_TIMEOUT_SECS))
}

pub fn upstream_connect_timeout() -> Duration {
    std::env::var("UPSTREAM_CONNECT_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_port_falls_back_on_garbage() {
        temp_env::with_var("MERIDIAN_PORT", Some("not-a-port"), || {
            assert_eq!(server_port(), DEFAULT_SERVER_PORT);
        });
        temp_env::with_var("MERIDIAN_PORT", Some("0"), || {
            assert_eq!(server_port(), DEFAULT_SERVER_PORT);
        });
        temp_env::with_var("MERIDIAN_PORT", Some("8081"), || {
            assert_eq!(server_port(), 8081);
        });
    }

    #[test]
    fn layer_refresh_accepts_zero_to_disable() {
        temp_env::with_var("LAYER_REFRESH_SECS", Some("0"), || {
            assert_eq!(layer_refresh_secs(), 0);
        });
        temp_env::with_var("LAYER_REFRESH_SECS", None::<&str>, || {
            assert_eq!(layer_refresh_secs(), DEFAULT_LAYER_REFRESH_SECS);
        });
    }

    #[test]
    fn blank_paths_fall_back_to_defaults() {
        temp_env::with_var("MERIDIAN_LAYERS", Some("   "), || {
            assert_eq!(layers_manifest_path(), DEFAULT_LAYERS_MANIFEST);
        });
        temp_env::with_var("MERIDIAN_ASSET_DIR", Some("public"), || {
            assert_eq!(asset_dir(), "public");
        });
    }
}
