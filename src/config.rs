use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub posts: PostsConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PostsConfig {
    pub dir: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
}

fn default_include_globs() -> Vec<String> {
    vec!["*.txt".to_string()]
}

/// Query-side limits, handed to the engine at construction time rather than
/// read from ambient state.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct QueryConfig {
    #[serde(default = "default_limit")]
    pub default_limit: i64,
    #[serde(default = "default_max_limit")]
    pub max_limit: i64,
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: i64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            suggestion_limit: default_suggestion_limit(),
        }
    }
}

fn default_limit() -> i64 {
    50
}
fn default_max_limit() -> i64 {
    1000
}
fn default_suggestion_limit() -> i64 {
    10
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.query.max_limit < 1 {
        anyhow::bail!("query.max_limit must be >= 1");
    }

    if config.query.default_limit < 1 || config.query.default_limit > config.query.max_limit {
        anyhow::bail!("query.default_limit must be in 1..=query.max_limit");
    }

    if config.query.suggestion_limit < 1 {
        anyhow::bail!("query.suggestion_limit must be >= 1");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<Config> {
        let config: Config = toml::from_str(content)?;
        validate(&config)?;
        Ok(config)
    }

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config = parse(
            r#"
            [db]
            path = "./data/zoolog.sqlite"

            [posts]
            dir = "./posts"
            "#,
        )
        .unwrap();

        assert_eq!(config.query.default_limit, 50);
        assert_eq!(config.query.max_limit, 1000);
        assert_eq!(config.query.suggestion_limit, 10);
        assert_eq!(config.posts.include_globs, vec!["*.txt".to_string()]);
    }

    #[test]
    fn test_default_limit_above_max_rejected() {
        let result = parse(
            r#"
            [db]
            path = "./data/zoolog.sqlite"

            [posts]
            dir = "./posts"

            [query]
            default_limit = 500
            max_limit = 100
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_max_limit_rejected() {
        let result = parse(
            r#"
            [db]
            path = "./data/zoolog.sqlite"

            [posts]
            dir = "./posts"

            [query]
            max_limit = 0
            "#,
        );
        assert!(result.is_err());
    }
}
