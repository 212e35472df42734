//! LanguageTool client — the only code in this service that talks to the grammar engine.
//!
//! Every request goes out exactly once, with no retries; the shared budget
//! admits one call per check. Failures surface to the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::RETRY_AFTER, Client, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{GrammarChecker, GrammarError, GrammarMatch};

pub const ATTRIBUTION: &str = "Grammar checking provided by LanguageTool (https://languagetool.org)";

#[derive(Debug, Deserialize)]
struct CheckResponse {
    #[serde(default)]
    matches: Vec<RawMatch>,
}

#[derive(Debug, Deserialize)]
struct RawMatch {
    message: String,
    offset: usize,
    length: usize,
    #[serde(default)]
    replacements: Vec<Replacement>,
    rule: Rule,
}

#[derive(Debug, Deserialize)]
struct Replacement {
    value: String,
}

#[derive(Debug, Deserialize)]
struct Rule {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LanguageEntry {
    code: String,
    long_code: String,
}

impl From<RawMatch> for GrammarMatch {
    fn from(raw: RawMatch) -> Self {
        GrammarMatch {
            message: raw.message,
            offset: raw.offset,
            length: raw.length,
            replacements: raw.replacements.into_iter().map(|r| r.value).collect(),
            rule_id: raw.rule.id,
        }
    }
}

/// HTTP client for a LanguageTool server (public API or self-hosted), fixed to one locale.
#[derive(Clone)]
pub struct LanguageToolClient {
    client: Client,
    base_url: String,
    language: String,
}

impl LanguageToolClient {
    pub fn new(base_url: &str, language: &str, timeout: Duration) -> Result<Self, GrammarError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            language: language.to_string(),
        })
    }

    /// Startup check that the server knows the configured locale.
    pub async fn verify_language(&self) -> Result<(), GrammarError> {
        let response = self
            .client
            .get(format!("{}/languages", self.base_url))
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let languages: Vec<LanguageEntry> = response.json().await?;

        if languages
            .iter()
            .any(|l| l.long_code.eq_ignore_ascii_case(&self.language) || l.code == self.language)
        {
            info!("Grammar engine supports '{}'", self.language);
            Ok(())
        } else {
            Err(GrammarError::UnsupportedLanguage(self.language.clone()))
        }
    }
}

#[async_trait]
impl GrammarChecker for LanguageToolClient {
    async fn check(&self, text: &str) -> Result<Vec<GrammarMatch>, GrammarError> {
        let response = self
            .client
            .post(format!("{}/check", self.base_url))
            .form(&[("text", text), ("language", self.language.as_str())])
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let body: CheckResponse = response.json().await?;

        debug!("LanguageTool returned {} matches", body.matches.len());
        Ok(body.matches.into_iter().map(GrammarMatch::from).collect())
    }

    fn attribution(&self) -> Option<&str> {
        Some(ATTRIBUTION)
    }
}

/// Maps non-success statuses onto `GrammarError`; 429 becomes `Throttled`.
async fn ensure_success(response: Response) -> Result<Response, GrammarError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = parse_retry_after(
            response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok()),
        );
        warn!("LanguageTool returned 429 (retry after {retry_after_secs:?}s)");
        return Err(GrammarError::Throttled { retry_after_secs });
    }

    let message = response.text().await.unwrap_or_default();
    warn!("LanguageTool returned {}: {}", status, message);
    Err(GrammarError::Api {
        status: status.as_u16(),
        message,
    })
}

fn parse_retry_after(value: Option<&str>) -> Option<u64> {
    value.and_then(|v| v.trim().parse::<u64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECK_FIXTURE: &str = r#"{
        "software": {"name": "LanguageTool", "version": "6.5"},
        "language": {"name": "English (GB)", "code": "en-GB"},
        "matches": [
            {
                "message": "Possible spelling mistake found.",
                "shortMessage": "Spelling mistake",
                "replacements": [{"value": "the"}, {"value": "tech"}],
                "offset": 4,
                "length": 3,
                "context": {"text": "led teh team", "offset": 4, "length": 3},
                "sentence": "led teh team",
                "rule": {"id": "MORFOLOGIK_RULE_EN_GB", "description": "Spelling"}
            },
            {
                "message": "This sentence does not start with an uppercase letter.",
                "offset": 0,
                "length": 3,
                "rule": {"id": "UPPERCASE_SENTENCE_START"}
            }
        ]
    }"#;

    #[test]
    fn test_check_response_deserializes_into_matches() {
        let body: CheckResponse = serde_json::from_str(CHECK_FIXTURE).unwrap();
        let matches: Vec<GrammarMatch> = body.matches.into_iter().map(GrammarMatch::from).collect();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].offset, 4);
        assert_eq!(matches[0].length, 3);
        assert_eq!(matches[0].replacements, vec!["the", "tech"]);
        assert_eq!(matches[0].rule_id, "MORFOLOGIK_RULE_EN_GB");
        assert!(matches[1].replacements.is_empty());
    }

    #[test]
    fn test_response_without_matches_is_empty() {
        let body: CheckResponse = serde_json::from_str(r#"{"software": {}}"#).unwrap();
        assert!(body.matches.is_empty());
    }

    #[test]
    fn test_language_list_deserializes() {
        let json = r#"[
            {"name": "English", "code": "en", "longCode": "en"},
            {"name": "English (GB)", "code": "en", "longCode": "en-GB"}
        ]"#;
        let languages: Vec<LanguageEntry> = serde_json::from_str(json).unwrap();
        assert!(languages.iter().any(|l| l.long_code == "en-GB"));
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after(Some("30")), Some(30));
        assert_eq!(parse_retry_after(Some(" 5 ")), Some(5));
        assert_eq!(parse_retry_after(Some("Wed, 21 Oct 2015 07:28:00 GMT")), None);
        assert_eq!(parse_retry_after(None), None);
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client =
            LanguageToolClient::new("http://localhost:8081/v2/", "en-GB", Duration::from_secs(5))
                .unwrap();
        assert_eq!(client.base_url, "http://localhost:8081/v2");
        assert_eq!(client.attribution(), Some(ATTRIBUTION));
    }
}
