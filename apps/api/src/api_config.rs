use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use consorciatech_core::AppError;
use consorciatech_infrastructure::{ConversionApiSettings, DEFAULT_POSTAL_CODE_API_BASE_URL};
use tracing_subscriber::EnvFilter;

const DEFAULT_PIXEL_API_BASE_URL: &str = "https://graph.facebook.com";
const DEFAULT_PIXEL_API_VERSION: &str = "v19.0";
const DEFAULT_SECURITY_RULES_PATH: &str = "firestore.rules";
const DEFAULT_OUTBOUND_HTTP_TIMEOUT_SECONDS: u64 = 15;

/// Where user profile documents live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileStoreConfig {
    Postgres { database_url: String },
    Memory,
}

#[derive(Debug, Clone)]
pub struct EmailValidationConfig {
    pub api_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct DownloadConfig {
    pub base_url: String,
    pub bearer_token: String,
}

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    pub api_url: String,
    pub api_token: String,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub api_host: String,
    pub api_port: u16,
    pub frontend_url: String,
    pub profile_store: ProfileStoreConfig,
    pub internal_events_token: String,
    pub operator_token: String,
    pub outbound_http_timeout: Duration,
    pub cep_api_base_url: String,
    pub email_validation: EmailValidationConfig,
    pub download: DownloadConfig,
    pub pixel: ConversionApiSettings,
    pub cloudinary: CloudinaryConfig,
    pub security_rules_path: PathBuf,
    pub whatsapp: WhatsAppConfig,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Self::from_lookup(migrate_only, |name| env::var(name).ok())
    }

    fn from_lookup<F>(migrate_only: bool, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = EnvVars { lookup };

        let profile_store = match vars.or_default("PROFILE_STORE", "postgres").as_str() {
            "postgres" => ProfileStoreConfig::Postgres {
                database_url: vars.required_non_empty("DATABASE_URL")?,
            },
            "memory" => ProfileStoreConfig::Memory,
            other => {
                return Err(AppError::Validation(format!(
                    "PROFILE_STORE must be either 'postgres' or 'memory', got '{other}'"
                )));
            }
        };

        if migrate_only && profile_store == ProfileStoreConfig::Memory {
            return Err(AppError::Validation(
                "migrate requires PROFILE_STORE=postgres".to_owned(),
            ));
        }

        let api_port = match vars.optional("API_PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|error| AppError::Validation(format!("invalid API_PORT: {error}")))?,
            None => 3001,
        };

        let timeout_seconds = match vars.optional("OUTBOUND_HTTP_TIMEOUT_SECONDS") {
            Some(value) => value.parse::<u64>().map_err(|error| {
                AppError::Validation(format!("invalid OUTBOUND_HTTP_TIMEOUT_SECONDS: {error}"))
            })?,
            None => DEFAULT_OUTBOUND_HTTP_TIMEOUT_SECONDS,
        };

        if migrate_only {
            return Ok(Self::migrate_only(profile_store));
        }

        Ok(Self {
            migrate_only,
            api_host: vars.or_default("API_HOST", "127.0.0.1"),
            api_port,
            frontend_url: vars.or_default("FRONTEND_URL", "http://localhost:3000"),
            profile_store,
            internal_events_token: vars.required_non_empty("INTERNAL_EVENTS_TOKEN")?,
            operator_token: vars.required_non_empty("OPERATOR_TOKEN")?,
            outbound_http_timeout: Duration::from_secs(timeout_seconds.max(1)),
            cep_api_base_url: vars.or_default("CEP_API_BASE_URL", DEFAULT_POSTAL_CODE_API_BASE_URL),
            email_validation: EmailValidationConfig {
                api_url: vars.required_non_empty("EMAIL_VALIDATION_API_URL")?,
                api_key: vars.required_non_empty("EMAIL_VALIDATION_API_KEY")?,
            },
            download: DownloadConfig {
                base_url: vars.required_non_empty("DOWNLOAD_BASE_URL")?,
                bearer_token: vars.required_non_empty("DOWNLOAD_BEARER_TOKEN")?,
            },
            pixel: ConversionApiSettings {
                base_url: vars.or_default("PIXEL_API_BASE_URL", DEFAULT_PIXEL_API_BASE_URL),
                api_version: vars.or_default("PIXEL_API_VERSION", DEFAULT_PIXEL_API_VERSION),
                pixel_id: vars.required_non_empty("PIXEL_ID")?,
                access_token: vars.required_non_empty("PIXEL_ACCESS_TOKEN")?,
                test_event_code: vars.optional("PIXEL_TEST_EVENT_CODE"),
            },
            cloudinary: CloudinaryConfig {
                cloud_name: vars.required_non_empty("CLOUDINARY_CLOUD_NAME")?,
                api_key: vars.required_non_empty("CLOUDINARY_API_KEY")?,
                api_secret: vars.required_non_empty("CLOUDINARY_API_SECRET")?,
            },
            security_rules_path: PathBuf::from(
                vars.or_default("SECURITY_RULES_PATH", DEFAULT_SECURITY_RULES_PATH),
            ),
            whatsapp: WhatsAppConfig {
                api_url: vars.required_non_empty("WHATSAPP_API_URL")?,
                api_token: vars.required_non_empty("WHATSAPP_API_TOKEN")?,
            },
        })
    }

    /// Settings for `migrate`, which only needs the database.
    fn migrate_only(profile_store: ProfileStoreConfig) -> Self {
        Self {
            migrate_only: true,
            api_host: String::new(),
            api_port: 0,
            frontend_url: String::new(),
            profile_store,
            internal_events_token: String::new(),
            operator_token: String::new(),
            outbound_http_timeout: Duration::from_secs(DEFAULT_OUTBOUND_HTTP_TIMEOUT_SECONDS),
            cep_api_base_url: String::new(),
            email_validation: EmailValidationConfig {
                api_url: String::new(),
                api_key: String::new(),
            },
            download: DownloadConfig {
                base_url: String::new(),
                bearer_token: String::new(),
            },
            pixel: ConversionApiSettings {
                base_url: String::new(),
                api_version: String::new(),
                pixel_id: String::new(),
                access_token: String::new(),
                test_event_code: None,
            },
            cloudinary: CloudinaryConfig {
                cloud_name: String::new(),
                api_key: String::new(),
                api_secret: String::new(),
            },
            security_rules_path: PathBuf::new(),
            whatsapp: WhatsAppConfig {
                api_url: String::new(),
                api_token: String::new(),
            },
        }
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

struct EnvVars<F> {
    lookup: F,
}

impl<F> EnvVars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|value| !value.trim().is_empty())
    }

    fn or_default(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_owned())
    }

    fn required(&self, name: &str) -> Result<String, AppError> {
        (self.lookup)(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
    }

    fn required_non_empty(&self, name: &str) -> Result<String, AppError> {
        let value = self.required(name)?;
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{name} must not be empty")));
        }

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use consorciatech_core::AppError;

    use super::{ApiConfig, ProfileStoreConfig};

    fn complete_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("PROFILE_STORE", "memory"),
            ("INTERNAL_EVENTS_TOKEN", "events-secret"),
            ("OPERATOR_TOKEN", "operator-secret"),
            ("EMAIL_VALIDATION_API_URL", "https://emailvalidation.example.com/v1/"),
            ("EMAIL_VALIDATION_API_KEY", "key"),
            ("DOWNLOAD_BASE_URL", "https://storage.example.com/o"),
            ("DOWNLOAD_BEARER_TOKEN", "storage-token"),
            ("PIXEL_ID", "123"),
            ("PIXEL_ACCESS_TOKEN", "pixel-token"),
            ("CLOUDINARY_CLOUD_NAME", "demo"),
            ("CLOUDINARY_API_KEY", "1234"),
            ("CLOUDINARY_API_SECRET", "abcd"),
            ("WHATSAPP_API_URL", "https://whatsapp.example.com/send"),
            ("WHATSAPP_API_TOKEN", "wa-token"),
        ])
    }

    fn load(
        migrate_only: bool,
        env: &HashMap<&'static str, &'static str>,
    ) -> Result<ApiConfig, AppError> {
        ApiConfig::from_lookup(migrate_only, |name| env.get(name).map(|value| (*value).to_owned()))
    }

    #[test]
    fn defaults_fill_optional_settings() {
        let config = load(false, &complete_env()).unwrap_or_else(|error| panic!("{error}"));

        assert_eq!(config.api_host, "127.0.0.1");
        assert_eq!(config.api_port, 3001);
        assert_eq!(config.profile_store, ProfileStoreConfig::Memory);
        assert_eq!(config.cep_api_base_url, "https://viacep.com.br/ws");
        assert_eq!(config.outbound_http_timeout, Duration::from_secs(15));
        assert_eq!(config.pixel.api_version, "v19.0");
    }

    #[test]
    fn postgres_store_requires_database_url() {
        let mut env = complete_env();
        env.insert("PROFILE_STORE", "postgres");

        assert!(matches!(
            load(false, &env),
            Err(AppError::Validation(message)) if message == "DATABASE_URL is required"
        ));
    }

    #[test]
    fn unknown_profile_store_is_rejected() {
        let mut env = complete_env();
        env.insert("PROFILE_STORE", "firestore");

        assert!(load(false, &env).is_err());
    }

    #[test]
    fn blank_internal_token_is_rejected() {
        let mut env = complete_env();
        env.insert("INTERNAL_EVENTS_TOKEN", "  ");

        assert!(matches!(
            load(false, &env),
            Err(AppError::Validation(message))
                if message == "INTERNAL_EVENTS_TOKEN must not be empty"
        ));
    }

    #[test]
    fn migrate_needs_only_the_database() {
        let env = std::collections::HashMap::from([("DATABASE_URL", "postgres://localhost/crm")]);

        let config = load(true, &env).unwrap_or_else(|error| panic!("{error}"));

        assert!(config.migrate_only);
        assert_eq!(
            config.profile_store,
            ProfileStoreConfig::Postgres {
                database_url: "postgres://localhost/crm".to_owned()
            }
        );
    }
}
