use crate::error::ConfigError;
use ahash::AHashMap;
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const PROJECT_ENV: &str = "RELEVANCE_PROJECT_ID";
pub const API_KEY_ENV: &str = "RELEVANCE_API_KEY";
pub const REGION_ENV: &str = "RELEVANCE_REGION";

/// Env files read by [`EnvLoader::default`], in order. Later files win.
pub const DEFAULT_ENV_FILES: &[&str] = &[".env", "chains/.relevance"];

/// Credentials for an execution client, passed explicitly to its constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub project: String,
    pub api_key: String,
    pub region: String,
}

impl ClientConfig {
    pub fn new(project: &str, api_key: &str, region: &str) -> Self {
        Self {
            project: project.to_string(),
            api_key: api_key.to_string(),
            region: region.to_string(),
        }
    }

    /// Parses a `<project>:<api_key>:<region>` token.
    pub fn from_token(token: &str) -> Result<Self, ConfigError> {
        let mut parts = token.trim().split(':');
        let (Some(project), Some(api_key), Some(region), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(ConfigError::InvalidToken);
        };
        if project.is_empty() || api_key.is_empty() || region.is_empty() {
            return Err(ConfigError::InvalidToken);
        }
        Ok(Self::new(project, api_key, region))
    }

    /// The authorization token in `<project>:<api_key>:<region>` form.
    pub fn token(&self) -> String {
        format!("{}:{}:{}", self.project, self.api_key, self.region)
    }

    pub fn base_url(&self) -> String {
        format!("https://api-{}.stack.tryrelevance.com/latest", self.region)
    }

    /// Authenticated trigger endpoint for a chain.
    pub fn trigger_url(&self, chain_id: &str) -> String {
        format!("{}/studios/{}/trigger", self.base_url(), chain_id)
    }

    /// Unauthenticated endpoint for publicly triggerable chains.
    pub fn limited_trigger_url(&self, chain_id: &str) -> String {
        format!("{}/studios/{}/trigger_limited", self.base_url(), chain_id)
    }
}

/// Loads `KEY=VALUE` env files once and resolves configuration from them.
///
/// Nothing is cached implicitly: [`EnvLoader::load`] reads the files the first
/// time it is called and is a no-op afterwards, [`EnvLoader::reload`] forces a
/// fresh read. Lookups consult the loaded files first, then the process
/// environment.
#[derive(Debug, Clone)]
pub struct EnvLoader {
    files: Vec<PathBuf>,
    vars: AHashMap<String, String>,
    loaded: bool,
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::with_files(DEFAULT_ENV_FILES.iter().map(PathBuf::from))
    }
}

impl EnvLoader {
    pub fn with_files(files: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            files: files.into_iter().collect(),
            vars: AHashMap::new(),
            loaded: false,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn load(&mut self) -> Result<(), ConfigError> {
        if self.loaded {
            return Ok(());
        }
        self.reload()
    }

    pub fn reload(&mut self) -> Result<(), ConfigError> {
        let mut vars = AHashMap::new();
        for path in &self.files {
            match fs::read_to_string(path) {
                Ok(content) => {
                    let parsed = parse_env_file(&content);
                    debug!(path = %path.display(), vars = parsed.len(), "loaded env file");
                    vars.extend(parsed);
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!(path = %path.display(), "env file not found, skipping");
                }
                Err(e) => {
                    return Err(ConfigError::Io {
                        path: display_path(path),
                        message: e.to_string(),
                    });
                }
            }
        }
        self.vars = vars;
        self.loaded = true;
        Ok(())
    }

    /// A non-empty value from the loaded files or the process environment.
    pub fn get(&self, name: &str) -> Option<String> {
        self.vars
            .get(name)
            .cloned()
            .or_else(|| env::var(name).ok())
            .filter(|value| !value.is_empty())
    }

    /// Loads if needed, then builds a [`ClientConfig`] from the
    /// `RELEVANCE_*` variables.
    pub fn client_config(&mut self) -> Result<ClientConfig, ConfigError> {
        self.load()?;
        let require = |name: &str| {
            self.get(name).ok_or_else(|| ConfigError::MissingVar {
                name: name.to_string(),
            })
        };
        Ok(ClientConfig {
            project: require(PROJECT_ENV)?,
            api_key: require(API_KEY_ENV)?,
            region: require(REGION_ENV)?,
        })
    }
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

/// Parses dotenv-style content: `KEY=VALUE` lines, `#` comments, an optional
/// `export ` prefix and optional matching quotes around the value.
fn parse_env_file(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), unquote(value.trim()).to_string()))
        })
        .collect()
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
