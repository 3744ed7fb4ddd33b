//! Deployment configuration for the scenario API.
//!
//! Values are baked defaults overridden by environment variables. The
//! token can also live in the OS keychain; env wins.

use super::extract::ReplyStrategy;
use crate::error::OcrError;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://qa.agent.authme.ai";
pub const DEFAULT_USER: &str = "ocr-web";

/// Keychain service/account holding the bearer token.
pub const KEYRING_SERVICE: &str = "scenario-ocr";
pub const KEYRING_ACCOUNT: &str = "api-token";

/// How the image reaches the scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestFlow {
    /// One call, image inlined as base64.
    #[default]
    Inline,
    /// Multipart upload first, then a run referencing the file id.
    UploadThenRun,
}

impl RequestFlow {
    pub fn parse(value: &str) -> Result<Self, OcrError> {
        match value.trim().to_lowercase().as_str() {
            "inline" | "base64" => Ok(RequestFlow::Inline),
            "upload" | "upload-then-run" | "local_file" => Ok(RequestFlow::UploadThenRun),
            other => Err(OcrError::Config(format!(
                "unknown request flow: {}. Use 'inline' or 'upload'.",
                other
            ))),
        }
    }

    /// The normalization each flow shipped with.
    pub fn default_strategy(self) -> ReplyStrategy {
        match self {
            RequestFlow::Inline => ReplyStrategy::UnwrapText,
            RequestFlow::UploadThenRun => ReplyStrategy::Coerce,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    pub api_base: String,
    pub token: String,
    pub user: String,
    pub flow: RequestFlow,
    pub reply: ReplyStrategy,
    /// Show results as rendered Markdown + raw text tabs.
    pub dual_view: bool,
    /// Re-encode images as JPEG before sending.
    pub transcode_jpeg: bool,
    pub timeout: Option<Duration>,
}

impl ScenarioConfig {
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            token: token.into(),
            user: DEFAULT_USER.to_string(),
            flow: RequestFlow::Inline,
            reply: RequestFlow::Inline.default_strategy(),
            dual_view: false,
            transcode_jpeg: false,
            timeout: None,
        }
    }

    /// Read configuration from the process environment, falling back to the
    /// OS keychain for the token.
    pub fn from_env() -> Result<Self, OcrError> {
        let mut config = Self::from_lookup(|key| std::env::var(key).ok())?;
        if config.token.is_empty() {
            config.token = keychain_token().unwrap_or_default();
        }
        if config.token.is_empty() {
            return Err(OcrError::Config(
                "no SCENARIO_API_TOKEN set and no keychain entry found".to_string(),
            ));
        }
        log::info!(
            "[CONFIG] api={} user={} flow={:?} reply={:?} token={} chars",
            config.api_base,
            config.user,
            config.flow,
            config.reply,
            config.token.len()
        );
        Ok(config)
    }

    /// Build a configuration from any key lookup. Unset keys keep defaults;
    /// the token may come back empty.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, OcrError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_base = get("SCENARIO_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let mut config = Self::new(
            api_base.trim_end_matches('/'),
            get("SCENARIO_API_TOKEN").unwrap_or_default(),
        );

        if let Some(user) = get("SCENARIO_USER") {
            config.user = user;
        }
        if let Some(flow) = get("SCENARIO_FLOW") {
            config.flow = RequestFlow::parse(&flow)?;
        }
        config.reply = match get("SCENARIO_REPLY") {
            Some(reply) => ReplyStrategy::parse(&reply)?,
            None => config.flow.default_strategy(),
        };
        config.dual_view = get("SCENARIO_DUAL_VIEW").map(|v| is_truthy(&v)).unwrap_or(false);
        config.transcode_jpeg = get("SCENARIO_TRANSCODE_JPEG")
            .map(|v| is_truthy(&v))
            .unwrap_or(false);
        if let Some(secs) = get("SCENARIO_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                OcrError::Config(format!("SCENARIO_TIMEOUT_SECS is not a number: {}", secs))
            })?;
            config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn run_url(&self) -> String {
        format!("{}/v1/scenarios/run", self.api_base)
    }

    pub fn upload_url(&self) -> String {
        format!("{}/v1/files/upload", self.api_base)
    }
}

/// Look up the bearer token in the OS keychain.
pub fn keychain_token() -> Option<String> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_ACCOUNT).ok()?;
    match entry.get_password() {
        Ok(token) if !token.is_empty() => {
            log::info!("[CONFIG] Loaded API token from OS keychain");
            Some(token)
        }
        _ => None,
    }
}

/// Store the bearer token in the OS keychain.
pub fn save_keychain_token(token: &str) -> Result<(), OcrError> {
    keyring::Entry::new(KEYRING_SERVICE, KEYRING_ACCOUNT)
        .and_then(|entry| entry.set_password(token))
        .map_err(|e| OcrError::Config(format!("keyring error: {}", e)))
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
