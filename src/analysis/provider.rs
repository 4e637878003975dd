//! LLM collaborator

use async_trait::async_trait;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::ChatMessage;
use log::{debug, warn};
use std::fmt;

use crate::config::{AnalyzerConfig, ProviderKind};
use crate::exceptions::ProviderError;

/// Sends one system instruction and one user message, returns the reply text
#[async_trait]
pub trait AnalysisProvider: Send + Sync + fmt::Debug {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError>;
}

fn backend(kind: ProviderKind) -> LLMBackend {
    match kind {
        ProviderKind::OpenAi => LLMBackend::OpenAI,
        ProviderKind::Anthropic => LLMBackend::Anthropic,
        ProviderKind::Google => LLMBackend::Google,
        ProviderKind::Ollama => LLMBackend::Ollama,
        ProviderKind::Groq => LLMBackend::Groq,
        ProviderKind::Mistral => LLMBackend::Mistral,
        ProviderKind::DeepSeek => LLMBackend::DeepSeek,
    }
}

/// [`AnalysisProvider`] backed by the `llm` crate
#[derive(Clone)]
pub struct LlmProvider {
    kind: ProviderKind,
    model: String,
    api_key: String,
    temperature: f32,
}

impl fmt::Debug for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmProvider")
            .field("kind", &self.kind)
            .field("model", &self.model)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl LlmProvider {
    /// # Errors
    ///
    /// [`ProviderError::NotConfigured`] for an unknown provider name, or a
    /// provider that needs an API key when none is set.
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, ProviderError> {
        let kind = ProviderKind::parse(&config.llm_provider).ok_or_else(|| {
            ProviderError::NotConfigured(format!("unknown provider: {}", config.llm_provider))
        })?;

        if kind.requires_api_key() && config.llm_api_key.trim().is_empty() {
            return Err(ProviderError::NotConfigured(format!(
                "no API key set for {} (SLICELENS_LLM_API_KEY)",
                kind.as_str()
            )));
        }

        Ok(Self {
            kind,
            model: config.llm_model.clone(),
            api_key: config.llm_api_key.clone(),
            temperature: config.llm_temperature,
        })
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl AnalysisProvider for LlmProvider {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        debug!("🤖 Sending {} chars to {} ({})", user.len(), self.kind.as_str(), self.model);

        let mut builder = LLMBuilder::new()
            .backend(backend(self.kind))
            .model(&self.model)
            .system(system)
            .temperature(self.temperature);

        if !self.api_key.is_empty() {
            builder = builder.api_key(&self.api_key);
        }

        let llm = builder
            .build()
            .map_err(|e| ProviderError::Build(e.to_string()))?;

        let messages = vec![ChatMessage::user().content(user).build()];

        let response = llm
            .chat(&messages)
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        match response.text() {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(ProviderError::EmptyResponse),
        }
    }
}

/// Stands in when no usable provider is configured; every call fails with
/// the configuration problem so callers fall back instead of aborting.
#[derive(Debug, Clone)]
pub struct UnavailableProvider {
    reason: ProviderError,
}

impl UnavailableProvider {
    pub fn new(reason: ProviderError) -> Self {
        Self { reason }
    }
}

#[async_trait]
impl AnalysisProvider for UnavailableProvider {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, ProviderError> {
        Err(self.reason.clone())
    }
}

/// Build the configured provider, or an [`UnavailableProvider`] explaining
/// why none could be built
pub fn provider_from_config(config: &AnalyzerConfig) -> Box<dyn AnalysisProvider> {
    match LlmProvider::from_config(config) {
        Ok(provider) => Box::new(provider),
        Err(e) => {
            warn!("⚠️ {e}; analysis will use the fallback result");
            Box::new(UnavailableProvider::new(e))
        }
    }
}
