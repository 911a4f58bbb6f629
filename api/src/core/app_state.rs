use std::{path::PathBuf, sync::Arc};

use ai_llm_service::{
    LlmModelConfig, OllamaService, config::default_config::config_ollama_review_from,
    health_service::HealthService,
};
use mr_reviewer::{
    ProjectRef, Reviewer,
    git_providers::ProviderConfig,
    review::{ReviewLedger, RuleSet},
};
use thiserror::Error;
use tracing::info;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DEDUP_TTL_SECS: u64 = 3600;

/// Startup configuration problems. All of them are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid value in {var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },

    #[error("cannot read review rules from {path}: {source}")]
    RulesFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Llm(#[from] ai_llm_service::error_handler::ConfigError),

    #[error(transparent)]
    Reviewer(#[from] mr_reviewer::errors::ConfigError),
}

/// Everything read from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `host:port` to listen on.
    pub bind_addr: String,
    pub gitlab: ProviderConfig,
    /// Used when a webhook payload names no project.
    pub default_project: Option<ProjectRef>,
    pub webhook_secret: Option<String>,
    /// `0` disables review deduplication.
    pub dedup_ttl_secs: u64,
    pub rules: RuleSet,
    pub llm: LlmModelConfig,
}

impl AppConfig {
    /// Loads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let llm = config_ollama_review_from(&lookup)?;

        let gitlab_url = get("GITLAB_URL").ok_or(ConfigError::MissingVar("GITLAB_URL"))?;
        let token = get("GITLAB_TOKEN")
            .or_else(|| get("GITLAB_PRIVATE_TOKEN"))
            .ok_or(ConfigError::MissingVar("GITLAB_TOKEN"))?;
        let gitlab = ProviderConfig::from_host_url(&gitlab_url, token);

        let default_project = get("GITLAB_PROJECT_ID").and_then(|v| ProjectRef::parse(&v));

        let bind_addr = match get("API_ADDRESS") {
            Some(addr) => addr,
            None => {
                let port = match get("PORT") {
                    Some(p) => p.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                        var: "PORT",
                        reason: e.to_string(),
                    })?,
                    None => DEFAULT_PORT,
                };
                format!("0.0.0.0:{port}")
            }
        };

        let dedup_ttl_secs = match get("REVIEW_DEDUP_TTL_SECS") {
            Some(v) => v.parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                var: "REVIEW_DEDUP_TTL_SECS",
                reason: e.to_string(),
            })?,
            None => DEFAULT_DEDUP_TTL_SECS,
        };

        let rules = match get("REVIEW_RULES_PATH") {
            Some(path) => {
                let path = PathBuf::from(path);
                let text = std::fs::read_to_string(&path).map_err(|source| {
                    ConfigError::RulesFile {
                        path: path.clone(),
                        source,
                    }
                })?;
                RuleSet::new(text)?
            }
            None => RuleSet::builtin(),
        };

        Ok(Self {
            bind_addr,
            gitlab,
            default_project,
            webhook_secret: get("WEBHOOK_SECRET"),
            dedup_ttl_secs,
            rules,
            llm,
        })
    }
}

/// Shared state for all HTTP handlers.
pub struct AppState {
    pub reviewer: Reviewer,
    pub health: HealthService,
    /// Generation backend config, probed by `/health`.
    pub llm: LlmModelConfig,
    pub default_project: Option<ProjectRef>,
    /// Expected `X-Gitlab-Token`; `None` accepts any caller.
    pub webhook_secret: Option<String>,
}

impl AppState {
    /// Builds clients from `config`. No network traffic happens here.
    pub fn build(config: AppConfig) -> Result<Arc<Self>, crate::error_handler::AppError> {
        let generator = OllamaService::new(config.llm.clone())
            .map_err(|e| crate::error_handler::AppError::Startup(e.to_string()))?;
        let health = HealthService::new(None)
            .map_err(|e| crate::error_handler::AppError::Startup(e.to_string()))?;
        let ledger = Arc::new(ReviewLedger::from_ttl_secs(config.dedup_ttl_secs));

        info!(
            model = %config.llm.model,
            gitlab = %config.gitlab.base_api,
            dedup = ledger.is_enabled(),
            webhook_secret = config.webhook_secret.is_some(),
            "application state ready"
        );

        Ok(Arc::new(Self {
            reviewer: Reviewer::new(config.gitlab, generator, config.rules, ledger),
            health,
            llm: config.llm,
            default_project: config.default_project,
            webhook_secret: config.webhook_secret,
        }))
    }
}
