//! Init command implementation

use anyhow::{Result, bail};
use std::path::PathBuf;

use studyhub::config::Config;

/// Default configuration content for studyhub init
pub const DEFAULT_CONFIG: &str = r#"# StudyHub Configuration
# ======================

# ============================================================================
# STORAGE - Where progression data lives
# ============================================================================
#
# Available options:
#   database_path - SQLite progress database (default: ~/.studyhub/progress.db)
#   cache_dir     - Local fallback cache used while the database is
#                   unreachable (default: ~/.studyhub/cache)

[storage]
# database_path = "/path/to/progress.db"
# cache_dir = "/path/to/cache"

# ============================================================================
# LOGGING
# ============================================================================
#
# filter - tracing filter directive; RUST_LOG overrides it, --verbose forces debug

[logging]
filter = "info"
"#;

/// Write the default configuration file
pub async fn init_command(config_path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = config_path.unwrap_or_else(Config::global_config_path);

    if config_path.exists() && !force {
        bail!(
            "Configuration already exists: {}\nUse --force to overwrite.",
            config_path.display()
        );
    }

    Config::write_file(&config_path, DEFAULT_CONFIG)?;
    println!("Created: {}", config_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_parses_to_defaults() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, Config::default());
    }

    #[tokio::test]
    async fn test_init_writes_default_and_refuses_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("studyhub").join("config.toml");

        init_command(Some(path.clone()), false).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
        assert!(!path.with_extension("toml.tmp").exists());

        assert!(init_command(Some(path.clone()), false).await.is_err());
        init_command(Some(path), true).await.unwrap();
    }
}
