//! Qualitative ratings from the DeepSeek chat-completions API.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::core::qualitative::QualitativeProvider;
use crate::core::record::QualitativeScores;

const SYSTEM_PROMPT: &str = "You are a cynical and extremely conservative hedge fund analyst. \
    Your job is to find reasons NOT to buy a stock. You are stingy with praise and only award \
    high scores to companies with unquestionable, objective market dominance.";

fn user_prompt(symbol: &str) -> String {
    format!(
        "Analyze the Indian stock '{symbol}' and score each category from 0 to 100.\n\
         Be brutally skeptical. High scores are rare.\n\n\
         RUBRIC:\n\
         \x20 90-100  World-class monopoly (e.g., Google, Asian Paints)\n\
         \x20 75-89   Dominant with clear competitive advantages\n\
         \x20 50-74   Average, significant competition\n\
         \x20 0-49    Weak, commoditized, or governance red flags\n\n\
         CATEGORIES:\n\
         \x20 1. customer_satisfaction - Verified brand loyalty and repeat purchase behaviour\n\
         \x20 2. moat - Structural barriers: network effects, switching costs, legal monopoly. \
         Brand alone is NOT a moat.\n\
         \x20 3. tailwind - Structural growth sector (AI, Defence, EV). Penalise over-hyped themes.\n\
         \x20 4. management_quality - Capital allocation track record, promoter integrity, \
         pledging level\n\n\
         Respond ONLY in valid JSON with exactly these keys:\n\
         {{\"customer_satisfaction\": int, \"moat\": int, \"tailwind\": int, \
         \"management_quality\": int, \"notes\": string}}\n\n\
         The \"notes\" must cover all four dimensions concisely but critically."
    )
}

pub struct DeepSeekProvider {
    base_url: String,
    api_key: String,
    model: String,
}

impl DeepSeekProvider {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        DeepSeekProvider {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize, Debug)]
struct ChatMessage {
    content: String,
}

#[async_trait]
impl QualitativeProvider for DeepSeekProvider {
    #[instrument(
        name = "QualitativeAnalysis",
        skip(self),
        fields(symbol = %symbol)
    )]
    async fn analyze(&self, symbol: &str) -> Result<QualitativeScores> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!("Requesting qualitative analysis from {}", url);

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": user_prompt(symbol)},
            ],
            "response_format": {"type": "json_object"},
        });

        let client = reqwest::Client::builder().user_agent("eqsift/0.2").build()?;
        let response = client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for symbol: {}", e, symbol))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for symbol: {}",
                response.status(),
                symbol
            ));
        }

        let data = response.json::<ChatResponse>().await?;
        let content = &data
            .choices
            .first()
            .ok_or_else(|| anyhow!("No completion returned for symbol: {}", symbol))?
            .message
            .content;

        serde_json::from_str(content)
            .map_err(|e| anyhow!("Failed to parse qualitative scores for {}: {}", symbol, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(status: u16, body: String) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    fn chat_body(content: &str) -> String {
        serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_successful_analysis() {
        let content = r#"{"customer_satisfaction": 62, "moat": 55, "tailwind": 70,
            "management_quality": 58, "notes": "Competitive market, average governance."}"#;
        let mock_server = create_mock_server(200, chat_body(content)).await;
        let provider = DeepSeekProvider::new(&mock_server.uri(), "sk-test", "deepseek-chat");

        let scores = provider.analyze("KRSNAA").await.unwrap();
        assert_eq!(scores.customer_satisfaction, 62);
        assert_eq!(scores.moat, 55);
        assert_eq!(scores.tailwind, 70);
        assert_eq!(scores.management_quality, 58);
        assert!(scores.notes.contains("Competitive"));
    }

    #[tokio::test]
    async fn test_api_error_propagates() {
        let mock_server = create_mock_server(429, "rate limited".to_string()).await;
        let provider = DeepSeekProvider::new(&mock_server.uri(), "sk-test", "deepseek-chat");

        let result = provider.analyze("KRSNAA").await;
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .starts_with("HTTP error: 429")
        );
    }

    #[tokio::test]
    async fn test_non_json_content_is_error() {
        let mock_server =
            create_mock_server(200, chat_body("I cannot rate this stock.")).await;
        let provider = DeepSeekProvider::new(&mock_server.uri(), "sk-test", "deepseek-chat");

        let result = provider.analyze("KRSNAA").await;
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse qualitative scores for KRSNAA")
        );
    }

    #[tokio::test]
    async fn test_empty_choices_is_error() {
        let mock_server = create_mock_server(200, r#"{"choices": []}"#.to_string()).await;
        let provider = DeepSeekProvider::new(&mock_server.uri(), "sk-test", "deepseek-chat");

        let result = provider.analyze("KRSNAA").await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "No completion returned for symbol: KRSNAA"
        );
    }
}
