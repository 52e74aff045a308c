use std::time::Duration;

use log::{info, warn};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::JobPreferences;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const MODEL: &str = "gpt-4o-mini";
const MAX_TOKENS: u32 = 150;

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

pub struct CoverLetterGenerator {
    client: Client,
    api_key: String,
}

impl CoverLetterGenerator {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to build OpenAI client");

        CoverLetterGenerator { client, api_key }
    }

    pub fn available(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Drafts a short cover letter for the given listing. Best-effort: any
    /// transport, status, or decode failure logs a diagnostic and yields None
    /// so the apply flow is never blocked on generation.
    pub fn generate(&self, job_title: &str, prefs: &JobPreferences, resume: &str) -> Option<String> {
        if !self.available() {
            return None;
        }

        let request = ChatCompletionRequest {
            model: MODEL.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: build_prompt(job_title, prefs, resume),
            }],
            max_tokens: MAX_TOKENS,
        };

        let resp = match self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .and_then(|r| r.error_for_status())
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!("OpenAI API error: {}", e);
                return None;
            }
        };

        let parsed: ChatCompletionResponse = match resp.json() {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Failed to decode OpenAI response: {}", e);
                return None;
            }
        };

        let letter = extract_letter(parsed)?;
        info!("Generated cover letter for '{}' ({} chars)", job_title, letter.len());
        Some(letter)
    }
}

fn build_prompt(job_title: &str, prefs: &JobPreferences, resume: &str) -> String {
    format!(
        "Write a brief cover letter for a job titled '{title}'. \
         The applicant prefers jobs in {location} with a salary around {salary}. \
         Use this resume:\n{resume}\n",
        title = job_title,
        location = prefs.locations.join(", "),
        salary = prefs.salary_range,
        resume = resume,
    )
}

fn extract_letter(resp: ChatCompletionResponse) -> Option<String> {
    resp.choices
        .into_iter()
        .next()
        .map(|c| c.message.content.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs() -> JobPreferences {
        serde_json::from_str(
            r#"{
                "locations": ["Bangalore", "Remote"],
                "job_roles": ["Software Engineer"],
                "salary_range": "10-12 LPA"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_prompt_embeds_title_preferences_and_resume() {
        let prompt = build_prompt("Senior Software Engineer", &prefs(), "My resume body");
        assert!(prompt.contains("'Senior Software Engineer'"));
        assert!(prompt.contains("Bangalore, Remote"));
        assert!(prompt.contains("10-12 LPA"));
        assert!(prompt.contains("My resume body"));
    }

    #[test]
    fn test_extract_letter_takes_first_choice_trimmed() {
        let resp: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "  Dear hiring team,...  "}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_letter(resp).unwrap(), "Dear hiring team,...");
    }

    #[test]
    fn test_extract_letter_handles_empty_choices() {
        let resp: ChatCompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(extract_letter(resp).is_none());
    }

    #[test]
    fn test_generator_without_key_skips_generation() {
        let generator = CoverLetterGenerator::new(String::new());
        assert!(!generator.available());
        assert!(generator.generate("Software Engineer", &prefs(), "resume").is_none());
    }
}
