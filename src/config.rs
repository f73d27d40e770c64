//! Configuration for pillarpost.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (ANTHROPIC_API_KEY, TWITTER_*, MEDIUM_*, LINKEDIN_*,
//!    PILLARPOST_SYSTEM_PROMPT)
//! 2. Config file (.pillarpost/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .pillarpost/config.yaml,
//!   then ~/.pillarpost/config.yaml
//! - Relative paths in the config file resolve against the project root
//!   (the directory containing .pillarpost/)
//!
//! This is the only module that reads the environment. Adapters receive the
//! resolved structs.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::anthropic::{default_max_tokens, default_model, default_timeout_secs};
use crate::adapters::medium::default_publish_status;
use crate::adapters::{AnthropicConfig, LinkedInConfig, MediumConfig, OAuth1Credentials};
use crate::core::ContentValidator;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const CONFIG_DIR: &str = ".pillarpost";
const CONFIG_FILE: &str = "config.yaml";
const DEFAULT_SYSTEM_PROMPT: &str = "prompts/system_prompt.txt";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub generation: GenerationFileConfig,
    #[serde(default)]
    pub validation: Option<ContentValidator>,
    #[serde(default)]
    pub publishers: PublishersFileConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationFileConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    /// Per-request timeout for the generation API
    pub timeout_secs: Option<u64>,
    /// Path to the system prompt (relative to project root)
    pub system_prompt: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublishersFileConfig {
    pub x: Option<XFileConfig>,
    pub medium: Option<MediumFileConfig>,
    pub linkedin: Option<LinkedInFileConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct XFileConfig {
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<String>,
    pub access_token: Option<String>,
    pub access_token_secret: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediumFileConfig {
    pub integration_token: Option<String>,
    pub publish_status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkedInFileConfig {
    pub access_token: Option<String>,
    pub author_urn: Option<String>,
}

/// Resolved generation settings
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub system_prompt: PathBuf,
}

impl GenerationSettings {
    /// Backend config, if an API key is available
    pub fn anthropic(&self) -> Option<AnthropicConfig> {
        let api_key = self.api_key.clone()?;
        Some(AnthropicConfig {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            timeout_secs: self.timeout_secs,
            ..AnthropicConfig::new(api_key)
        })
    }
}

/// Publishers with complete credentials
#[derive(Debug, Clone, Default)]
pub struct PublishersConfig {
    pub x: Option<OAuth1Credentials>,
    pub medium: Option<MediumConfig>,
    pub linkedin: Option<LinkedInConfig>,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub generation: GenerationSettings,
    pub validation: ContentValidator,
    pub publishers: PublishersConfig,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

/// Source of environment overrides (injectable for tests)
trait Env {
    fn get(&self, key: &str) -> Option<String>;
}

struct ProcessEnv;

impl Env for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.trim().is_empty())
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    // Fall back to ~/.pillarpost/config.yaml
    dirs::home_dir()
        .map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
        .filter(|path| path.exists())
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Pick the env value, then the file value
fn layered(env: &dyn Env, key: &str, file: Option<&String>) -> Option<String> {
    env.get(key).or_else(|| file.cloned())
}

fn resolve_x(env: &dyn Env, file: &XFileConfig) -> Option<OAuth1Credentials> {
    Some(OAuth1Credentials {
        consumer_key: layered(env, "TWITTER_CONSUMER_KEY", file.consumer_key.as_ref())?,
        consumer_secret: layered(env, "TWITTER_CONSUMER_SECRET", file.consumer_secret.as_ref())?,
        access_token: layered(env, "TWITTER_ACCESS_TOKEN", file.access_token.as_ref())?,
        access_token_secret: layered(
            env,
            "TWITTER_ACCESS_TOKEN_SECRET",
            file.access_token_secret.as_ref(),
        )?,
    })
}

fn resolve_medium(env: &dyn Env, file: &MediumFileConfig) -> Option<MediumConfig> {
    Some(MediumConfig {
        integration_token: layered(env, "MEDIUM_INTEGRATION_TOKEN", file.integration_token.as_ref())?,
        publish_status: layered(env, "MEDIUM_PUBLISH_STATUS", file.publish_status.as_ref())
            .unwrap_or_else(default_publish_status),
    })
}

fn resolve_linkedin(env: &dyn Env, file: &LinkedInFileConfig) -> Option<LinkedInConfig> {
    Some(LinkedInConfig {
        access_token: layered(env, "LINKEDIN_ACCESS_TOKEN", file.access_token.as_ref())?,
        author_urn: layered(env, "LINKEDIN_AUTHOR_URN", file.author_urn.as_ref())?,
    })
}

/// Keep only publishers whose credentials are complete
fn resolve_publishers(env: &dyn Env, file: &PublishersFileConfig) -> PublishersConfig {
    PublishersConfig {
        x: resolve_x(env, &file.x.clone().unwrap_or_default()),
        medium: resolve_medium(env, &file.medium.clone().unwrap_or_default()),
        linkedin: resolve_linkedin(env, &file.linkedin.clone().unwrap_or_default()),
    }
}

/// Merge environment, optional config file and defaults
fn resolve(env: &dyn Env, file: Option<(&Path, ConfigFile)>) -> ResolvedConfig {
    let (base_dir, config_file, file) = match file {
        Some((path, parsed)) => {
            // Base directory is the parent of .pillarpost/
            let base_dir = path
                .parent()
                .and_then(|p| p.parent())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            (base_dir, Some(path.to_path_buf()), Some(parsed))
        }
        None => (PathBuf::from("."), None, None),
    };

    let generation_file = file
        .as_ref()
        .map(|f| f.generation.clone())
        .unwrap_or_default();

    let system_prompt = match env.get("PILLARPOST_SYSTEM_PROMPT") {
        Some(path) => PathBuf::from(path),
        None => resolve_path(
            &base_dir,
            generation_file
                .system_prompt
                .as_deref()
                .unwrap_or(DEFAULT_SYSTEM_PROMPT),
        ),
    };

    let generation = GenerationSettings {
        api_key: layered(env, "ANTHROPIC_API_KEY", generation_file.api_key.as_ref()),
        model: generation_file.model.unwrap_or_else(default_model),
        max_tokens: generation_file.max_tokens.unwrap_or_else(default_max_tokens),
        timeout_secs: generation_file
            .timeout_secs
            .unwrap_or_else(default_timeout_secs),
        system_prompt,
    };

    let publishers = resolve_publishers(
        env,
        &file
            .as_ref()
            .map(|f| f.publishers.clone())
            .unwrap_or_default(),
    );

    let validation = file
        .and_then(|f| f.validation)
        .unwrap_or_default();

    ResolvedConfig {
        generation,
        validation,
        publishers,
        config_file,
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let config = match find_config_file() {
        Some(path) => {
            let parsed = load_config_file(&path)?;
            resolve(&ProcessEnv, Some((path.as_path(), parsed)))
        }
        None => resolve(&ProcessEnv, None),
    };

    Ok(config)
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
