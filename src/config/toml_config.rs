use crate::adapters::openai::DEFAULT_ENDPOINT;
use crate::core::activity_log::DEFAULT_CAPACITY;
use crate::core::classifier::ClassifierSettings;
use crate::core::query::EnrichmentSettings;
use crate::core::router::RouterSettings;
use crate::utils::error::{RouterError, Result};
use crate::utils::validation::{
    validate_at_least, validate_db_path, validate_endpoint, validate_env_var_name,
    validate_non_blank, validate_range, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern compiles"));

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub classifier: ClassifierConfig,
    pub enrichment: EnrichmentConfig,
    pub store: StoreConfig,
    pub activity_log: ActivityLogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_seconds: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_seconds: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub max_tokens: u32,
    pub allow_fallback: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            max_tokens: 20,
            allow_fallback: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub enabled: bool,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_tokens: 150,
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite file, or `:memory:` for a throwaway store.
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "support.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityLogConfig {
    pub capacity: usize,
}

impl Default for ActivityLogConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RouterError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| RouterError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_BASE})，未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_endpoint("service.endpoint", &self.service.endpoint)?;
        validate_non_blank("service.model", &self.service.model)?;
        validate_env_var_name("service.api_key_env", &self.service.api_key_env)?;
        validate_at_least("service.timeout_seconds", self.service.timeout_seconds, 1)?;
        validate_at_least("classifier.max_tokens", self.classifier.max_tokens, 1)?;
        validate_at_least("enrichment.max_tokens", self.enrichment.max_tokens, 1)?;
        validate_range("enrichment.temperature", self.enrichment.temperature, 0.0, 2.0)?;
        validate_db_path("store.path", &self.store.path)?;
        validate_at_least("activity_log.capacity", self.activity_log.capacity, 1)?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.service.timeout_seconds)
    }

    pub fn router_settings(&self) -> RouterSettings {
        RouterSettings {
            classifier: ClassifierSettings {
                model: self.service.model.clone(),
                max_tokens: self.classifier.max_tokens,
                allow_fallback: self.classifier.allow_fallback,
            },
            enrichment: EnrichmentSettings {
                enabled: self.enrichment.enabled,
                model: self.service.model.clone(),
                max_tokens: self.enrichment.max_tokens,
                temperature: self.enrichment.temperature,
            },
            log_capacity: self.activity_log.capacity,
        }
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.service.endpoint, "https://api.openai.com/v1");
        assert_eq!(config.store.path, "support.db");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[service]
endpoint = "http://localhost:8080/v1"
model = "gpt-4o-mini"
api_key_env = "SUPPORT_KEY"
timeout_seconds = 5

[classifier]
max_tokens = 10
allow_fallback = false

[enrichment]
enabled = false
temperature = 0.2

[store]
path = ":memory:"

[activity_log]
capacity = 50
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        let settings = config.router_settings();

        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(settings.classifier.model, "gpt-4o-mini");
        assert_eq!(settings.classifier.max_tokens, 10);
        assert!(!settings.classifier.allow_fallback);
        assert!(!settings.enrichment.enabled);
        assert_eq!(settings.enrichment.max_tokens, 150);
        assert_eq!(settings.log_capacity, 50);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SUPPORT_ROUTER_TEST_ENDPOINT", "https://llm.internal.example/v1");

        let toml_content = r#"
[service]
endpoint = "${SUPPORT_ROUTER_TEST_ENDPOINT}"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.service.endpoint, "https://llm.internal.example/v1");

        std::env::remove_var("SUPPORT_ROUTER_TEST_ENDPOINT");
    }

    #[test]
    fn test_config_validation() {
        let invalid_endpoint = AppConfig::from_toml_str(
            r#"
[service]
endpoint = "invalid-url"
"#,
        )
        .unwrap();
        assert!(invalid_endpoint.validate().is_err());

        let zero_capacity = AppConfig::from_toml_str(
            r#"
[activity_log]
capacity = 0
"#,
        )
        .unwrap();
        assert!(zero_capacity.validate().is_err());

        let hot_temperature = AppConfig::from_toml_str(
            r#"
[enrichment]
temperature = 3.5
"#,
        )
        .unwrap();
        assert!(hot_temperature.validate().is_err());

        // a pasted key instead of the variable that holds it
        let literal_key = AppConfig::from_toml_str(
            r#"
[service]
api_key_env = "sk-proj-abc123"
"#,
        )
        .unwrap();
        assert!(literal_key.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_reported() {
        let err = AppConfig::from_toml_str("[service\nendpoint = 1").unwrap_err();
        assert!(matches!(err, RouterError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[store]
path = "./data/tickets.db"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.store.path, "./data/tickets.db");
    }
}
