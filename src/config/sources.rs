use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "SHAREBOX_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/sharebox.toml";
const ENV_PREFIX: &str = "SHAREBOX";
const ENV_SEPARATOR: &str = "__";
const PORT_ENV_VAR: &str = "PORT";

/// Merges the TOML file named by `SHAREBOX_CONFIG` (default
/// `config/sharebox.toml`) with `SHAREBOX__*` variables, `.env` included,
/// then applies `PORT`.
pub fn load() -> Result<Config, ConfigError> {
    let _ = dotenvy::dotenv();

    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = load_from_sources(config_path)?;
    apply_port_override(&mut config, env::var(PORT_ENV_VAR).ok().as_deref());

    Ok(config)
}

/// Hosting platforms hand out the listen port as a bare `PORT` variable.
fn apply_port_override(config: &mut Config, port: Option<&str>) {
    let Some(raw) = port else {
        return;
    };

    match raw.trim().parse::<u16>() {
        Ok(port) => config.server.bind_addr.set_port(port),
        Err(_) => tracing::warn!(value = raw, "Ignoring unparseable PORT variable"),
    }
}

/// File at `config_path` (missing is fine) overlaid with `SHAREBOX__*` variables
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // SHAREBOX__SERVER__BIND_ADDR -> server.bind_addr
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::humanize::ByteSize;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_only() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:3000");
        assert_eq!(config.extractor.raw_html_limit, 20_000);
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[server]
bind_addr = "127.0.0.1:9000"
max_body_bytes = "256KB"

[http]
user_agent = "Mozilla/5.0 (X11; Linux x86_64)"
page_timeout_secs = 5

[extractor]
list_api_paths = ["/api/list?surl={share_id}"]

[logs]
capacity = 50
idle_ttl_secs = 60
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.server.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.server.max_body_bytes, ByteSize::kib(256));
        assert_eq!(config.http.user_agent, "Mozilla/5.0 (X11; Linux x86_64)");
        assert_eq!(config.http.page_timeout_secs, 5);
        assert_eq!(config.http.connect_timeout_secs, 10);
        assert_eq!(config.extractor.list_api_paths, vec!["/api/list?surl={share_id}"]);
        assert_eq!(config.logs.capacity, 50);
    }

    #[test]
    fn test_port_override() {
        let mut config = Config::default();

        apply_port_override(&mut config, Some("8081"));
        assert_eq!(config.server.bind_addr.port(), 8081);

        apply_port_override(&mut config, Some("not-a-port"));
        assert_eq!(config.server.bind_addr.port(), 8081);

        apply_port_override(&mut config, None);
        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:8081");
    }
}
