use super::GenerationError;

/// Abstraction over the generative model so the pipeline and the chat
/// responder can run against a mock.
pub trait LlmClient {
    /// Send `prompt` to `model` and return the reply text.
    fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError>;
}

impl<T: LlmClient + ?Sized> LlmClient for &T {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        (**self).generate(model, prompt)
    }
}

impl<T: LlmClient + ?Sized> LlmClient for Box<T> {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        (**self).generate(model, prompt)
    }
}
