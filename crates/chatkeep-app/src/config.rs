use std::time::Duration;

use chatkeep_core::models::ConversationId;

use crate::handler::DEFAULT_MAX_SAVE_ATTEMPTS;

const DEFAULT_BUCKET: &str = "conversations";
const DEFAULT_CONVERSATION_ID: &str = "default_session";
const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_MODEL_ID: &str = "us.anthropic.claude-sonnet-4-6";
const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. Answer the user's questions clearly and concisely.";
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;

/// Process-wide settings, read once at startup from the environment.
#[derive(Clone)]
pub struct AppConfig {
    pub bucket: String,
    pub conversation_id: ConversationId,
    pub store: StoreBackend,
    pub region: String,
    /// Custom S3 endpoint (MinIO). `None` targets AWS S3.
    pub endpoint_url: Option<String>,
    pub storage_credentials: CredentialSource,
    pub model_credentials: CredentialSource,
    pub model_id: String,
    pub system_prompt: String,
    pub store_timeout: Duration,
    pub max_save_attempts: u32,
    pub log_json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    S3,
    Memory,
}

#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Inline {
        access_key_id: String,
        secret_access_key: String,
    },
    Profile {
        profile_name: String,
    },
    DefaultChain,
}

/// Redacted config summary, safe to log.
#[derive(Debug, Clone)]
pub struct ConfigInfo {
    pub bucket: String,
    pub conversation_id: String,
    pub store: StoreBackend,
    pub region: String,
    pub endpoint_url: Option<String>,
    pub storage_credentials: String,
    pub model_id: String,
}

impl AppConfig {
    /// Read from the process environment.
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let store = match var("CHATKEEP_STORE").as_deref() {
            None | Some("s3") => StoreBackend::S3,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(eyre::eyre!(
                    "CHATKEEP_STORE must be `s3` or `memory`, got `{other}`"
                ));
            }
        };

        let conversation_id = ConversationId::new(
            var("CHATKEEP_CONVERSATION_ID").unwrap_or_else(|| DEFAULT_CONVERSATION_ID.to_string()),
        )?;

        let storage_credentials = match (var("MINIO_ACCESS_KEY"), var("MINIO_SECRET_KEY")) {
            (Some(access_key_id), Some(secret_access_key)) => CredentialSource::Inline {
                access_key_id,
                secret_access_key,
            },
            (Some(_), None) | (None, Some(_)) => {
                return Err(eyre::eyre!(
                    "MINIO_ACCESS_KEY and MINIO_SECRET_KEY must be set together"
                ));
            }
            (None, None) => profile_or_default_chain(var("AWS_PROFILE")),
        };

        let store_timeout_secs = match var("CHATKEEP_STORE_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    eyre::eyre!("CHATKEEP_STORE_TIMEOUT_SECS must be a positive integer, got `{raw}`")
                })?,
            None => DEFAULT_STORE_TIMEOUT_SECS,
        };

        let max_save_attempts = match var("CHATKEEP_MAX_SAVE_ATTEMPTS") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    eyre::eyre!("CHATKEEP_MAX_SAVE_ATTEMPTS must be a positive integer, got `{raw}`")
                })?,
            None => DEFAULT_MAX_SAVE_ATTEMPTS,
        };

        Ok(Self {
            bucket: var("CHATKEEP_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            conversation_id,
            store,
            region: var("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            endpoint_url: var("CHATKEEP_S3_ENDPOINT").or_else(|| var("MINIO_ENDPOINT")),
            storage_credentials,
            model_credentials: profile_or_default_chain(var("AWS_PROFILE")),
            model_id: var("CHATKEEP_MODEL_ID").unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
            system_prompt: var("CHATKEEP_SYSTEM_PROMPT")
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            store_timeout: Duration::from_secs(store_timeout_secs),
            max_save_attempts,
            log_json: var("CHATKEEP_LOG_JSON").is_some_and(|v| v == "1" || v == "true"),
        })
    }

    pub fn info(&self) -> ConfigInfo {
        let storage_credentials = match &self.storage_credentials {
            CredentialSource::Inline { access_key_id, .. } => {
                format!("inline ({})", redact_access_key(access_key_id))
            }
            CredentialSource::Profile { profile_name } => format!("profile ({profile_name})"),
            CredentialSource::DefaultChain => "default_chain".to_string(),
        };

        ConfigInfo {
            bucket: self.bucket.clone(),
            conversation_id: self.conversation_id.to_string(),
            store: self.store,
            region: self.region.clone(),
            endpoint_url: self.endpoint_url.clone(),
            storage_credentials,
            model_id: self.model_id.clone(),
        }
    }
}

fn profile_or_default_chain(profile: Option<String>) -> CredentialSource {
    match profile {
        Some(profile_name) => CredentialSource::Profile { profile_name },
        None => CredentialSource::DefaultChain,
    }
}

fn redact_access_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let prefix: String = chars[..4].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{prefix}...{suffix}")
}
