// Configuration loading and parsing (parade.toml).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::clan::{Clan, ClanEntry, Rgb};
use crate::draft::pool::ClanPool;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// parade.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire parade.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ParadeFile {
    profile: ProfileSection,
    parade: ParadeSection,
    database: DatabaseSection,
    #[serde(default)]
    pool: Vec<PoolEntryRow>,
}

#[derive(Debug, Clone, Deserialize)]
struct ProfileSection {
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ParadeSection {
    wave_size: usize,
    show_count: usize,
    /// Whether a second pick may overwrite the first within a session.
    #[serde(default = "default_allow_reselect")]
    allow_reselect: bool,
}

fn default_allow_reselect() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    path: String,
}

/// One `[[pool]]` row: a clan with its button label and `#RRGGBB` color.
#[derive(Debug, Clone, Deserialize)]
struct PoolEntryRow {
    clan: Clan,
    name: String,
    color: String,
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub profile_name: String,
    pub wave_size: usize,
    pub show_count: usize,
    pub allow_reselect: bool,
    pub db_path: String,
    pub pool: ClanPool,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/parade.toml` relative to
/// `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy the
/// default file. Prefer `load_config()` which handles default initialization
/// automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join("parade.toml");
    let text = std::fs::read_to_string(&path).map_err(|_| ConfigError::FileNotFound {
        path: path.clone(),
    })?;
    let file: ParadeFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    validate(&file)?;

    let entries = file
        .pool
        .into_iter()
        .map(|row| {
            // validate() already checked every color parses.
            let color = Rgb::from_hex(&row.color).unwrap_or(Rgb::WHITE);
            ClanEntry {
                clan: row.clan,
                name: row.name,
                color,
            }
        })
        .collect();

    Ok(Config {
        profile_name: file.profile.name,
        wave_size: file.parade.wave_size,
        show_count: file.parade.show_count,
        allow_reselect: file.parade.allow_reselect,
        db_path: file.database.path,
        pool: ClanPool::new(entries),
    })
}

/// Ensure `config/parade.toml` exists by copying it from `defaults/` when
/// missing. Returns true when a copy was made. An existing config file is
/// never overwritten.
pub fn ensure_config_file(base_dir: &Path) -> Result<bool, ConfigError> {
    let config_dir = base_dir.join("config");
    let target = config_dir.join("parade.toml");
    if target.exists() {
        return Ok(false);
    }

    let source = base_dir.join("defaults").join("parade.toml");
    if !source.exists() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "neither {} nor {} found; run from the project root or create the config",
                target.display(),
                source.display()
            ),
        });
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;
    std::fs::copy(&source, &target).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!(
            "failed to copy {} to {}: {e}",
            source.display(),
            target.display()
        ),
    })?;
    Ok(true)
}

/// Convenience wrapper: loads config relative to the current working
/// directory, copying the default config file first if needed.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_file(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(file: &ParadeFile) -> Result<(), ConfigError> {
    if file.profile.name.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "profile.name".into(),
            message: "must not be empty".into(),
        });
    }

    if file.parade.wave_size == 0 {
        return Err(ConfigError::ValidationError {
            field: "parade.wave_size".into(),
            message: "must be greater than 0".into(),
        });
    }

    if file.parade.show_count == 0 {
        return Err(ConfigError::ValidationError {
            field: "parade.show_count".into(),
            message: "must be greater than 0".into(),
        });
    }

    if file.database.path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "database.path".into(),
            message: "must not be empty".into(),
        });
    }

    if file.pool.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "pool".into(),
            message: "must contain at least one clan entry".into(),
        });
    }

    let mut seen = HashSet::new();
    for (i, row) in file.pool.iter().enumerate() {
        if !seen.insert(row.clan) {
            return Err(ConfigError::ValidationError {
                field: format!("pool[{i}].clan"),
                message: format!("duplicate clan `{}`", row.clan),
            });
        }
        if row.name.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: format!("pool[{i}].name"),
                message: "must not be empty".into(),
            });
        }
        if let Err(e) = Rgb::from_hex(&row.color) {
            return Err(ConfigError::ValidationError {
                field: format!("pool[{i}].color"),
                message: e.to_string(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const VALID_TOML: &str = r##"
[profile]
name = "starter"

[parade]
wave_size = 6
show_count = 3

[database]
path = "parade.db"

[[pool]]
clan = "Ocean"
name = "Oceano"
color = "#2255CC"

[[pool]]
clan = "Inferno"
name = "Infierno"
color = "#CC2211"

[[pool]]
clan = "Frost"
name = "Gelido"
color = "#88DDEE"
"##;

    /// Create a temp base dir with `config/parade.toml` holding `content`.
    fn write_config(tag: &str, content: &str) -> PathBuf {
        let base = std::env::temp_dir().join(format!("parade_config_test_{tag}"));
        let _ = fs::remove_dir_all(&base);
        fs::create_dir_all(base.join("config")).unwrap();
        fs::write(base.join("config/parade.toml"), content).unwrap();
        base
    }

    #[test]
    fn load_valid_config() {
        let base = write_config("valid", VALID_TOML);
        let config = load_config_from(&base).expect("should load valid config");

        assert_eq!(config.profile_name, "starter");
        assert_eq!(config.wave_size, 6);
        assert_eq!(config.show_count, 3);
        assert!(config.allow_reselect); // defaulted
        assert_eq!(config.db_path, "parade.db");
        assert_eq!(config.pool.len(), 3);
        assert_eq!(config.pool.name_for(Clan::Ocean), "Oceano");
        assert_eq!(
            config.pool.color_for(Clan::Frost),
            Rgb::from_hex("#88DDEE").unwrap()
        );

        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn allow_reselect_can_be_disabled() {
        let toml = VALID_TOML.replace(
            "show_count = 3",
            "show_count = 3\nallow_reselect = false",
        );
        let base = write_config("no_reselect", &toml);
        let config = load_config_from(&base).unwrap();
        assert!(!config.allow_reselect);
        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn missing_file_reports_file_not_found() {
        let base = std::env::temp_dir().join("parade_config_test_missing");
        let _ = fs::remove_dir_all(&base);
        fs::create_dir_all(base.join("config")).unwrap();

        let err = load_config_from(&base).unwrap_err();
        match err {
            ConfigError::FileNotFound { path } => assert!(path.ends_with("parade.toml")),
            other => panic!("expected FileNotFound, got: {other}"),
        }
        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn invalid_toml_reports_parse_error() {
        let base = write_config("bad_toml", "this is not valid [[[ toml");
        let err = load_config_from(&base).unwrap_err();
        match err {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with("parade.toml")),
            other => panic!("expected ParseError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn rejects_zero_wave_size() {
        let toml = VALID_TOML.replace("wave_size = 6", "wave_size = 0");
        let base = write_config("zero_wave", &toml);
        let err = load_config_from(&base).unwrap_err();
        match err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "parade.wave_size"),
            other => panic!("expected ValidationError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn rejects_zero_show_count() {
        let toml = VALID_TOML.replace("show_count = 3", "show_count = 0");
        let base = write_config("zero_show", &toml);
        let err = load_config_from(&base).unwrap_err();
        match err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "parade.show_count"),
            other => panic!("expected ValidationError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn rejects_empty_pool() {
        let start = VALID_TOML.find("[[pool]]").unwrap();
        let toml = &VALID_TOML[..start];
        let base = write_config("empty_pool", toml);
        let err = load_config_from(&base).unwrap_err();
        match err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "pool"),
            other => panic!("expected ValidationError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn rejects_duplicate_pool_clan() {
        let toml = VALID_TOML.replace("clan = \"Frost\"", "clan = \"Ocean\"");
        let base = write_config("dup_clan", &toml);
        let err = load_config_from(&base).unwrap_err();
        match err {
            ConfigError::ValidationError { field, message } => {
                assert_eq!(field, "pool[2].clan");
                assert!(message.contains("Ocean"));
            }
            other => panic!("expected ValidationError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn rejects_bad_color() {
        let toml = VALID_TOML.replace("#88DDEE", "88DDEE");
        let base = write_config("bad_color", &toml);
        let err = load_config_from(&base).unwrap_err();
        match err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "pool[2].color"),
            other => panic!("expected ValidationError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn rejects_unknown_clan_name_at_parse() {
        let toml = VALID_TOML.replace("clan = \"Frost\"", "clan = \"Water\"");
        let base = write_config("bad_clan", &toml);
        let err = load_config_from(&base).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn ensure_config_file_copies_default() {
        let base = std::env::temp_dir().join("parade_config_test_ensure");
        let _ = fs::remove_dir_all(&base);
        fs::create_dir_all(base.join("defaults")).unwrap();
        fs::write(base.join("defaults/parade.toml"), VALID_TOML).unwrap();

        assert!(ensure_config_file(&base).unwrap());
        assert!(base.join("config/parade.toml").exists());
        // Second call finds the file and copies nothing.
        assert!(!ensure_config_file(&base).unwrap());

        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn ensure_config_file_preserves_existing() {
        let base = write_config("ensure_existing", "# custom\n");
        fs::create_dir_all(base.join("defaults")).unwrap();
        fs::write(base.join("defaults/parade.toml"), VALID_TOML).unwrap();

        assert!(!ensure_config_file(&base).unwrap());
        let content = fs::read_to_string(base.join("config/parade.toml")).unwrap();
        assert_eq!(content, "# custom\n");

        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn ensure_config_file_errors_when_both_missing() {
        let base = std::env::temp_dir().join("parade_config_test_both_missing");
        let _ = fs::remove_dir_all(&base);
        fs::create_dir_all(&base).unwrap();

        let err = ensure_config_file(&base).unwrap_err();
        assert!(matches!(err, ConfigError::DefaultsCopyError { .. }));

        let _ = fs::remove_dir_all(&base);
    }
}
