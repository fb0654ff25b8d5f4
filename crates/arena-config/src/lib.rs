//! Configuration management for the arena dashboard server.
//!
//! Parses `arena.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - every path in `[mounts]`
//! - `dashboard.tournaments_file`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Port used when neither the config file, `--port` nor `PORT` set one.
pub const DEFAULT_PORT: u16 = 4000;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "arena.toml";

/// Upper bound for `server.request_timeout_secs`.
const MAX_REQUEST_TIMEOUT_SECS: u64 = 3600;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override public assets directory.
    pub public_dir: Option<PathBuf>,
    /// Override entry-point document.
    pub entry_point: Option<PathBuf>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Static mount directories (relative strings from TOML).
    mounts: MountsConfigRaw,
    /// Dashboard data configuration (relative strings from TOML).
    dashboard: DashboardConfigRaw,

    /// Resolved mount directories (set after loading).
    #[serde(skip)]
    pub mounts_resolved: MountsConfig,
    /// Resolved dashboard data configuration (set after loading).
    #[serde(skip)]
    pub dashboard_resolved: DashboardConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: DEFAULT_PORT,
            request_timeout_secs: 30,
        }
    }
}

/// Raw mount configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct MountsConfigRaw {
    public_dir: Option<String>,
    pages_dir: Option<String>,
    source_dir: Option<String>,
    framework_dir: Option<String>,
    entry_point: Option<String>,
}

/// Resolved mount directories with absolute paths.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MountsConfig {
    /// Public assets root, served under `/public` and at the site root.
    pub public_dir: PathBuf,
    /// Pages root, served under `/pages`.
    pub pages_dir: PathBuf,
    /// Source root, served under `/src`.
    pub source_dir: PathBuf,
    /// Third-party framework assets root, served under `/Miku`.
    pub framework_dir: PathBuf,
    /// Entry-point document returned for every unmatched request.
    pub entry_point: PathBuf,
}

impl MountsConfig {
    /// Mount directories relative to `base`, using the default `web/` layout.
    fn default_with_base(base: &Path) -> Self {
        Self {
            public_dir: base.join("web/public"),
            pages_dir: base.join("web/pages"),
            source_dir: base.join("web/src"),
            framework_dir: base.join("web/vendor/miku"),
            entry_point: base.join("web/index.html"),
        }
    }
}

/// Raw dashboard configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DashboardConfigRaw {
    tournaments_file: Option<String>,
}

/// Resolved dashboard data configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// JSON file with tournament cards (`None` disables `/api/tournaments`).
    pub tournaments_file: Option<PathBuf>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`mounts.public_dir`").
        field: String,
        /// Error message (e.g., "${`ARENA_WEB`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `arena.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the final configuration does not validate.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(public_dir) = &settings.public_dir {
            self.mounts_resolved.public_dir.clone_from(public_dir);
        }
        if let Some(entry_point) = &settings.entry_point {
            self.mounts_resolved.entry_point.clone_from(entry_point);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            mounts: MountsConfigRaw::default(),
            dashboard: DashboardConfigRaw::default(),
            mounts_resolved: MountsConfig::default_with_base(base),
            dashboard_resolved: DashboardConfig::default(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;
        // An empty path would resolve to the config directory itself
        config.validate_raw_paths()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called by [`Config::load`] after CLI settings are applied.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_mounts()?;
        Ok(())
    }

    /// Validate server configuration.
    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 lets the OS pick, which makes the dashboard unreachable by URL
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        let timeout = self.server.request_timeout_secs;
        if timeout == 0 {
            return Err(ConfigError::Validation(
                "server.request_timeout_secs must be greater than 0".to_owned(),
            ));
        }
        if timeout > MAX_REQUEST_TIMEOUT_SECS {
            return Err(ConfigError::Validation(format!(
                "server.request_timeout_secs cannot exceed {MAX_REQUEST_TIMEOUT_SECS}"
            )));
        }

        Ok(())
    }

    /// Validate that no mount path was configured as an empty string.
    fn validate_mounts(&self) -> Result<(), ConfigError> {
        let m = &self.mounts_resolved;
        for (path, field) in [
            (&m.public_dir, "mounts.public_dir"),
            (&m.pages_dir, "mounts.pages_dir"),
            (&m.source_dir, "mounts.source_dir"),
            (&m.framework_dir, "mounts.framework_dir"),
            (&m.entry_point, "mounts.entry_point"),
        ] {
            require_non_empty(&path.to_string_lossy(), field)?;
        }
        Ok(())
    }

    /// Reject paths given as empty strings in the file, before they are joined
    /// onto the config directory.
    fn validate_raw_paths(&self) -> Result<(), ConfigError> {
        let m = &self.mounts;
        for (value, field) in [
            (&m.public_dir, "mounts.public_dir"),
            (&m.pages_dir, "mounts.pages_dir"),
            (&m.source_dir, "mounts.source_dir"),
            (&m.framework_dir, "mounts.framework_dir"),
            (&m.entry_point, "mounts.entry_point"),
            (&self.dashboard.tournaments_file, "dashboard.tournaments_file"),
        ] {
            if let Some(raw) = value {
                require_non_empty(raw.trim(), field)?;
            }
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        let mounts = &mut self.mounts;
        for (value, field) in [
            (&mut mounts.public_dir, "mounts.public_dir"),
            (&mut mounts.pages_dir, "mounts.pages_dir"),
            (&mut mounts.source_dir, "mounts.source_dir"),
            (&mut mounts.framework_dir, "mounts.framework_dir"),
            (&mut mounts.entry_point, "mounts.entry_point"),
            (
                &mut self.dashboard.tournaments_file,
                "dashboard.tournaments_file",
            ),
        ] {
            if let Some(raw) = value {
                *raw = expand::expand_env(raw, field)?;
            }
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let defaults = MountsConfig::default_with_base(config_dir);
        let resolve = |path: Option<&str>, default: PathBuf| {
            path.map_or(default, |p| config_dir.join(p))
        };

        self.mounts_resolved = MountsConfig {
            public_dir: resolve(self.mounts.public_dir.as_deref(), defaults.public_dir),
            pages_dir: resolve(self.mounts.pages_dir.as_deref(), defaults.pages_dir),
            source_dir: resolve(self.mounts.source_dir.as_deref(), defaults.source_dir),
            framework_dir: resolve(self.mounts.framework_dir.as_deref(), defaults.framework_dir),
            entry_point: resolve(self.mounts.entry_point.as_deref(), defaults.entry_point),
        };

        self.dashboard_resolved = DashboardConfig {
            tournaments_file: self
                .dashboard
                .tournaments_file
                .as_deref()
                .map(|p| config_dir.join(p)),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(
            config.mounts_resolved.public_dir,
            PathBuf::from("/test/web/public")
        );
        assert_eq!(
            config.mounts_resolved.framework_dir,
            PathBuf::from("/test/web/vendor/miku")
        );
        assert_eq!(
            config.mounts_resolved.entry_point,
            PathBuf::from("/test/web/index.html")
        );
        assert!(config.dashboard_resolved.tournaments_file.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, DEFAULT_PORT);
    }

    #[test]
    fn test_parse_server_config() {
        let toml = r#"
[server]
host = "0.0.0.0"
port = 9000
request_timeout_secs = 5
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.request_timeout_secs, 5);
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[mounts]
public_dir = "static"
entry_point = "static/app.html"

[dashboard]
tournaments_file = "data/tournaments.json"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.mounts_resolved,
            MountsConfig {
                public_dir: PathBuf::from("/project/static"),
                pages_dir: PathBuf::from("/project/web/pages"),
                source_dir: PathBuf::from("/project/web/src"),
                framework_dir: PathBuf::from("/project/web/vendor/miku"),
                entry_point: PathBuf::from("/project/static/app.html"),
            }
        );
        assert_eq!(
            config.dashboard_resolved.tournaments_file,
            Some(PathBuf::from("/project/data/tournaments.json"))
        );
    }

    #[test]
    fn test_absolute_mount_path_is_kept() {
        let toml = r#"
[mounts]
framework_dir = "/opt/miku/dist"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));
        assert_eq!(
            config.mounts_resolved.framework_dir,
            PathBuf::from("/opt/miku/dist")
        );
    }

    #[test]
    fn test_apply_cli_settings_port() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            port: Some(9000),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1"); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_paths() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            public_dir: Some(PathBuf::from("/srv/public")),
            entry_point: Some(PathBuf::from("/srv/index.html")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(
            config.mounts_resolved.public_dir,
            PathBuf::from("/srv/public")
        );
        assert_eq!(
            config.mounts_resolved.entry_point,
            PathBuf::from("/srv/index.html")
        );
        assert_eq!(
            config.mounts_resolved.pages_dir,
            PathBuf::from("/test/web/pages")
        );
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let before = Config::default_with_base(Path::new("/test"));
        let mut config = Config::default_with_base(Path::new("/test"));

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.server.host, before.server.host);
        assert_eq!(config.server.port, before.server.port);
        assert_eq!(config.mounts_resolved, before.mounts_resolved);
    }

    #[test]
    fn test_expand_env_vars_mounts() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("ARENA_TEST_VENDOR", "/opt/vendor");
        }

        let toml = r#"
[mounts]
framework_dir = "${ARENA_TEST_VENDOR}/miku"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.mounts_resolved.framework_dir,
            PathBuf::from("/opt/vendor/miku")
        );

        unsafe {
            std::env::remove_var("ARENA_TEST_VENDOR");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("ARENA_TEST_MISSING_DATA");
        }

        let toml = r#"
[dashboard]
tournaments_file = "${ARENA_TEST_MISSING_DATA}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("dashboard.tournaments_file"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            "[server]\nport = 8123\n\n[mounts]\npages_dir = \"site/pages\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.server.port, 8123);
        assert_eq!(
            config.mounts_resolved.pages_dir,
            dir.path().join("site/pages")
        );
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_cli_port_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[server]\nport = 8123\n").unwrap();

        let settings = CliSettings {
            port: Some(5050),
            ..Default::default()
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.server.port, 5050);
    }

    #[test]
    fn test_load_rejects_empty_mount_path_before_resolving() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);

        for (toml, field) in [
            ("[mounts]\npublic_dir = \"\"\n", "mounts.public_dir"),
            ("[mounts]\nentry_point = \"  \"\n", "mounts.entry_point"),
            ("[dashboard]\ntournaments_file = \"\"\n", "dashboard.tournaments_file"),
        ] {
            std::fs::write(&path, toml).unwrap();
            let err = Config::load(Some(&path), None).unwrap_err();
            assert!(
                matches!(&err, ConfigError::Validation(msg) if msg.contains(field)),
                "{field}: got {err:?}"
            );
        }
    }

    #[test]
    fn test_load_rejects_empty_path_from_env_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            "[mounts]\nsource_dir = \"${ARENA_TEST_UNSET_SOURCE:-}\"\n",
        )
        .unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(err.to_string().contains("mounts.source_dir"));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/nonexistent/arena.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    // Validation tests

    /// Assert that validation fails with expected substrings in the error message.
    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        let config = Config::default_with_base(Path::new("/test"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_server_host_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.server.host = String::new();
        assert_validation_error(&config, &["server.host", "empty"]);
    }

    #[test]
    fn test_validate_server_port_zero() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.server.port = 0;
        assert_validation_error(&config, &["server.port"]);
    }

    #[test]
    fn test_validate_request_timeout_bounds() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.server.request_timeout_secs = 0;
        assert_validation_error(&config, &["request_timeout_secs", "greater than 0"]);

        config.server.request_timeout_secs = 7200;
        assert_validation_error(&config, &["request_timeout_secs", "3600"]);
    }

    #[test]
    fn test_validate_empty_entry_point() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.mounts_resolved.entry_point = PathBuf::new();
        assert_validation_error(&config, &["mounts.entry_point", "empty"]);
    }
}
