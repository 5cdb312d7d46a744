use crate::domain::error::ProviderError;
use crate::domain::ports::ai_provider::AiProvider;
use crate::infrastructure::http::decode;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Text completions through the OpenAI Responses API.
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct ResponsesReply {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Deserialize)]
struct ContentPart {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: Option<String>) -> Self {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, model: Option<String>, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl AiProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let resp = self
            .client
            .post(format!("{}/v1/responses", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&ResponsesRequest {
                model: &self.model,
                input: prompt,
            })
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let reply: ResponsesReply = decode("openai", resp).await?;
        extract_text(&reply).ok_or_else(|| ProviderError::NoData("OpenAI reply had no text".into()))
    }
}

/// First `output_text` part; any other text part is accepted as a fallback.
fn extract_text(reply: &ResponsesReply) -> Option<String> {
    let parts = || reply.output.iter().flat_map(|item| item.content.iter());
    parts()
        .find(|p| p.kind == "output_text" && p.text.is_some())
        .or_else(|| parts().find(|p| p.text.is_some()))
        .and_then(|p| p.text.as_deref())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(json: &str) -> ResponsesReply {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_extract_prefers_output_text() {
        let r = reply(
            r#"{"output":[
                {"type":"reasoning","content":[]},
                {"type":"message","content":[
                    {"type":"refusal_note","text":"ignored"},
                    {"type":"output_text","text":"  BUY. Momentum strong.  "}
                ]}
            ]}"#,
        );
        assert_eq!(extract_text(&r).as_deref(), Some("BUY. Momentum strong."));
    }

    #[test]
    fn test_extract_empty_output() {
        assert_eq!(extract_text(&reply(r#"{"output":[]}"#)), None);
        assert_eq!(extract_text(&reply(r#"{}"#)), None);
    }

    #[test]
    fn test_default_model() {
        let p = OpenAiProvider::new("sk-test".into(), None);
        assert_eq!(p.model(), "gpt-4.1-mini");
    }
}
