use crate::error::{to_env_var, ConfigError};
use config::{Config, Environment};
use parlance::config::{ChatConfig, HistoryProfile, NormalizerLimits, DEFAULT_PERSONA};
use parlance::providers::configs::{OpenAiProviderConfig, ProviderConfig};
use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// When set, chat and thread routes require `Authorization: Bearer <token>`
    #[serde(default)]
    pub api_token: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            host: default_host(),
            port: default_port(),
            api_token: None,
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Failed to parse socket address")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum ProviderSettings {
    OpenAi {
        #[serde(default = "default_openai_host")]
        host: String,
        api_key: String,
        #[serde(default = "default_model")]
        model: String,
        #[serde(default = "default_temperature")]
        temperature: Option<f32>,
        #[serde(default = "default_max_tokens")]
        max_tokens: Option<i32>,
    },
}

impl ProviderSettings {
    // Convert to the parlance ProviderConfig
    pub fn into_config(self) -> ProviderConfig {
        match self {
            ProviderSettings::OpenAi {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
            } => ProviderConfig::OpenAi(OpenAiProviderConfig {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatProfile {
    Text,
    Multimodal,
}

#[derive(Debug, Deserialize)]
pub struct ChatSettings {
    #[serde(default = "default_profile")]
    pub profile: ChatProfile,
    #[serde(default)]
    pub persona: Option<String>,
}

impl Default for ChatSettings {
    fn default() -> Self {
        ChatSettings {
            profile: default_profile(),
            persona: None,
        }
    }
}

impl ChatSettings {
    pub fn into_config(self) -> ChatConfig {
        ChatConfig {
            limits: NormalizerLimits::default(),
            profile: match self.profile {
                ChatProfile::Text => HistoryProfile::text_only(),
                ChatProfile::Multimodal => HistoryProfile::multimodal(),
            },
            persona: self
                .persona
                .unwrap_or_else(|| DEFAULT_PERSONA.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    #[serde(default)]
    pub chat: ChatSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        // Start with default configuration
        let config = Config::builder()
            // Server defaults
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            // Provider defaults
            .set_default("provider.host", default_openai_host())?
            .set_default("provider.model", default_model())?
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix("PARLANCE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        // Try to deserialize the configuration
        let result: Result<Self, config::ConfigError> = config.try_deserialize();

        // Handle missing field errors specially
        match result {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                // Handle both NotFound and missing field message variants
                let error_str = err.to_string();
                if error_str.starts_with("missing field") {
                    // Extract field name from error message "missing field `type`"
                    let field = error_str
                        .trim_start_matches("missing field `")
                        .trim_end_matches("`");
                    let env_var = to_env_var(field);
                    Err(ConfigError::MissingEnvVar { env_var })
                } else if let config::ConfigError::NotFound(field) = &err {
                    let env_var = to_env_var(field);
                    Err(ConfigError::MissingEnvVar { env_var })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_openai_host() -> String {
    "https://api.openai.com".to_string()
}

fn default_temperature() -> Option<f32> {
    Some(0.7)
}

fn default_max_tokens() -> Option<i32> {
    Some(1000)
}

fn default_profile() -> ChatProfile {
    ChatProfile::Multimodal
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clean_env() {
        for (key, _) in env::vars() {
            if key.starts_with("PARLANCE_") {
                env::remove_var(&key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_settings() {
        clean_env();

        // Set required provider settings for test
        env::set_var("PARLANCE_PROVIDER__TYPE", "openai");
        env::set_var("PARLANCE_PROVIDER__API_KEY", "test-key");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 4000);
        assert_eq!(settings.server.api_token, None);
        assert_eq!(settings.chat.profile, ChatProfile::Multimodal);

        let ProviderSettings::OpenAi {
            host,
            api_key,
            model,
            temperature,
            max_tokens,
        } = settings.provider;

        assert_eq!(host, "https://api.openai.com");
        assert_eq!(api_key, "test-key");
        assert_eq!(model, "gpt-4o-mini");
        assert_eq!(temperature, Some(0.7));
        assert_eq!(max_tokens, Some(1000));

        // Clean up
        env::remove_var("PARLANCE_PROVIDER__TYPE");
        env::remove_var("PARLANCE_PROVIDER__API_KEY");
    }

    #[test]
    #[serial]
    fn test_missing_api_key_names_the_env_var() {
        clean_env();
        env::set_var("PARLANCE_PROVIDER__TYPE", "openai");

        let err = Settings::new().unwrap_err();
        match err {
            ConfigError::MissingEnvVar { env_var } => {
                assert_eq!(env_var, "PARLANCE_PROVIDER__API_KEY");
            }
            other => panic!("Expected MissingEnvVar, got {:?}", other),
        }

        env::remove_var("PARLANCE_PROVIDER__TYPE");
    }

    #[test]
    #[serial]
    fn test_environment_override() {
        clean_env();
        env::set_var("PARLANCE_SERVER__PORT", "8080");
        env::set_var("PARLANCE_SERVER__API_TOKEN", "secret");
        env::set_var("PARLANCE_PROVIDER__TYPE", "openai");
        env::set_var("PARLANCE_PROVIDER__API_KEY", "test-key");
        env::set_var("PARLANCE_PROVIDER__HOST", "https://custom.openai.com");
        env::set_var("PARLANCE_PROVIDER__MODEL", "gpt-4o");
        env::set_var("PARLANCE_PROVIDER__TEMPERATURE", "0.2");
        env::set_var("PARLANCE_CHAT__PROFILE", "text");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.api_token.as_deref(), Some("secret"));
        assert_eq!(settings.chat.profile, ChatProfile::Text);

        let ProviderSettings::OpenAi {
            host,
            api_key,
            model,
            temperature,
            ..
        } = settings.provider;

        assert_eq!(host, "https://custom.openai.com");
        assert_eq!(api_key, "test-key");
        assert_eq!(model, "gpt-4o");
        assert_eq!(temperature, Some(0.2));

        // Clean up
        env::remove_var("PARLANCE_SERVER__PORT");
        env::remove_var("PARLANCE_SERVER__API_TOKEN");
        env::remove_var("PARLANCE_PROVIDER__TYPE");
        env::remove_var("PARLANCE_PROVIDER__API_KEY");
        env::remove_var("PARLANCE_PROVIDER__HOST");
        env::remove_var("PARLANCE_PROVIDER__MODEL");
        env::remove_var("PARLANCE_PROVIDER__TEMPERATURE");
        env::remove_var("PARLANCE_CHAT__PROFILE");
    }

    #[test]
    fn test_chat_settings_select_the_profile() {
        let config = ChatSettings {
            profile: ChatProfile::Text,
            persona: None,
        }
        .into_config();
        assert_eq!(config.profile, HistoryProfile::text_only());
        assert_eq!(config.persona, DEFAULT_PERSONA);

        let config = ChatSettings {
            profile: ChatProfile::Multimodal,
            persona: Some("be terse".to_string()),
        }
        .into_config();
        assert_eq!(config.profile, HistoryProfile::multimodal());
        assert_eq!(config.persona, "be terse");
    }

    #[test]
    fn test_socket_addr_conversion() {
        let server_settings = ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 4000,
            api_token: None,
        };
        let addr = server_settings.socket_addr();
        assert_eq!(addr.to_string(), "127.0.0.1:4000");
    }
}
