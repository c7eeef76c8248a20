use std::future::Future;
use std::pin::Pin;

/// Text-completion capability backing the guidance broker.
///
/// Implementations are stateless per call; errors are returned as `anyhow`
/// chains and classified by [`super::invoker::ProviderInvoker`].
pub trait Provider: Send + Sync {
    /// Provider identifier (e.g. "gemini", "openai").
    fn name(&self) -> &str;

    fn chat_with_system<'a>(
        &'a self,
        system_prompt: Option<&'a str>,
        message: &'a str,
        model: &'a str,
        temperature: f64,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;
}
