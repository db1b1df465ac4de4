//! Provider router: builds the text and vision providers from config.
//!
//! Typed-in problems, reports and quizzes go to the default provider.
//! Photographed mistakes go to the vision provider, which may be a
//! different service with its own key.

use crate::openai_compat::OpenAiCompatProvider;
use mathdesk_config::AppConfig;
use mathdesk_core::error::ProviderError;
use mathdesk_core::provider::Provider;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Routes completion requests to the correct provider.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
    vision_provider: Option<String>,
}

impl ProviderRouter {
    /// Create a new router with a default provider.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
            vision_provider: None,
        }
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Route image requests to the provider registered as `name`.
    pub fn set_vision(&mut self, name: impl Into<String>) {
        self.vision_provider = Some(name.into());
    }

    /// Get the default (text) provider.
    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    /// Get the image-capable provider, if one is configured.
    pub fn vision(&self) -> Option<Arc<dyn Provider>> {
        self.vision_provider
            .as_ref()
            .and_then(|name| self.providers.get(name).cloned())
    }

    /// Get a specific provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// List all registered provider names.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// Build providers from configuration.
///
/// Fails only when the default provider cannot be built; a vision provider
/// with no known endpoint is skipped with a warning.
pub fn build_from_config(config: &AppConfig) -> Result<ProviderRouter, ProviderError> {
    let mut router = ProviderRouter::new(&config.default_provider);
    let timeout = Duration::from_secs(config.request_timeout_secs);

    for (name, provider_config) in &config.providers {
        let api_key = provider_config
            .api_key
            .clone()
            .or_else(|| fallback_key(config, name))
            .unwrap_or_default();

        let Some(base_url) = provider_config
            .api_url
            .clone()
            .or_else(|| default_base_url(name).map(String::from))
        else {
            warn!(provider = %name, "No api_url and no well-known endpoint; skipping");
            continue;
        };

        router.register(
            name.clone(),
            Arc::new(OpenAiCompatProvider::with_timeout(name, base_url, api_key, timeout)),
        );
    }

    // Ensure the default provider exists (even if not explicitly configured)
    if router.get(&config.default_provider).is_none() {
        let base_url = default_base_url(&config.default_provider).ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "provider '{}' needs an api_url under [providers.{}]",
                config.default_provider, config.default_provider
            ))
        })?;
        let api_key = config.api_key.clone().unwrap_or_default();
        router.register(
            config.default_provider.clone(),
            Arc::new(OpenAiCompatProvider::with_timeout(
                &config.default_provider,
                base_url,
                api_key,
                timeout,
            )),
        );
    }

    if config.vision.enabled {
        let name = &config.vision.provider;
        if router.get(name).is_none() {
            match default_base_url(name) {
                Some(base_url) => {
                    let api_key = fallback_key(config, name).unwrap_or_default();
                    router.register(
                        name.clone(),
                        Arc::new(OpenAiCompatProvider::with_timeout(name, base_url, api_key, timeout)),
                    );
                }
                None => warn!(provider = %name, "Vision provider has no known endpoint; image analysis disabled"),
            }
        }
        if router.get(name).is_some() {
            router.set_vision(name.clone());
        }
    }

    debug!(providers = ?router.list(), "Provider router ready");
    Ok(router)
}

/// Key to use for `name` when its own section has none. A provider shared
/// by text and vision uses the text key when there is one.
fn fallback_key(config: &AppConfig, name: &str) -> Option<String> {
    if name == config.default_provider {
        if let Some(key) = &config.api_key {
            return Some(key.clone());
        }
    }
    if name == config.vision.provider {
        return config.vision.api_key.clone();
    }
    None
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> Option<&'static str> {
    match provider_name {
        "deepseek" => Some("https://api.deepseek.com"),
        "dashscope" | "qwen" => Some("https://dashscope.aliyuncs.com/compatible-mode/v1"),
        "openai" => Some("https://api.openai.com/v1"),
        "openrouter" => Some("https://openrouter.ai/api/v1"),
        "moonshot" => Some("https://api.moonshot.cn/v1"),
        "ollama" => Some("http://localhost:11434/v1"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathdesk_config::ProviderConfig;

    #[test]
    fn router_register_and_lookup() {
        let mut router = ProviderRouter::new("deepseek");
        router.register("deepseek", Arc::new(OpenAiCompatProvider::deepseek("sk-test")));

        assert!(router.get("deepseek").is_some());
        assert!(router.get("nonexistent").is_none());
        assert!(router.default().is_some());
        assert!(router.vision().is_none());
    }

    #[test]
    fn default_base_urls() {
        assert_eq!(default_base_url("deepseek"), Some("https://api.deepseek.com"));
        assert!(default_base_url("dashscope").unwrap().contains("compatible-mode"));
        assert!(default_base_url("mystery").is_none());
    }

    #[test]
    fn build_from_default_config() {
        let config = AppConfig::default();
        let router = build_from_config(&config).unwrap();
        assert_eq!(router.default().unwrap().name(), "deepseek");
        assert_eq!(router.vision().unwrap().name(), "dashscope");
        assert_eq!(router.list(), vec!["dashscope", "deepseek"]);
    }

    #[test]
    fn vision_can_share_the_text_provider() {
        let mut config = AppConfig::default();
        config.default_provider = "openai".into();
        config.vision.provider = "openai".into();
        let router = build_from_config(&config).unwrap();
        assert_eq!(router.list(), vec!["openai"]);
        assert_eq!(router.vision().unwrap().name(), "openai");
    }

    #[test]
    fn unknown_default_without_url_is_not_configured() {
        let mut config = AppConfig::default();
        config.default_provider = "mystery".into();
        let err = build_from_config(&config).err().unwrap();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[test]
    fn custom_endpoint_from_config() {
        let mut config = AppConfig::default();
        config.default_provider = "school-proxy".into();
        config.providers.insert(
            "school-proxy".into(),
            ProviderConfig {
                api_key: None,
                api_url: Some("http://10.0.0.5:8000/v1".into()),
                default_model: None,
            },
        );
        config.vision.enabled = false;
        let router = build_from_config(&config).unwrap();
        assert_eq!(router.default().unwrap().name(), "school-proxy");
        assert!(router.vision().is_none());
    }

    #[test]
    fn unknown_vision_provider_is_skipped() {
        let mut config = AppConfig::default();
        config.vision.provider = "mystery".into();
        let router = build_from_config(&config).unwrap();
        assert!(router.default().is_some());
        assert!(router.vision().is_none());
    }

    #[test]
    fn vision_key_prefers_vision_section() {
        let mut config = AppConfig::default();
        config.api_key = Some("text-key".into());
        config.vision.api_key = Some("vision-key".into());
        assert_eq!(fallback_key(&config, "dashscope").as_deref(), Some("vision-key"));
        assert_eq!(fallback_key(&config, "deepseek").as_deref(), Some("text-key"));
        assert_eq!(fallback_key(&config, "openai"), None);
    }

    #[test]
    fn shared_provider_prefers_the_text_key() {
        let mut config = AppConfig::default();
        config.default_provider = "dashscope".into();
        config.api_key = Some("text-key".into());
        config.vision.api_key = Some("vision-key".into());
        assert_eq!(fallback_key(&config, "dashscope").as_deref(), Some("text-key"));

        config.api_key = None;
        assert_eq!(fallback_key(&config, "dashscope").as_deref(), Some("vision-key"));
    }
}
