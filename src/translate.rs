use anyhow::{Context, Result};
use futures::future::join_all;
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

/// Texts longer than this are cut before translation.
pub const MAX_TRANSLATE_CHARS: usize = 500;
const TRUNCATED_CHARS: usize = 499;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Tr,
    Es,
    De,
    Ru,
    Fr,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::En,
        Language::Tr,
        Language::Es,
        Language::De,
        Language::Ru,
        Language::Fr,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Tr => "tr",
            Language::Es => "es",
            Language::De => "de",
            Language::Ru => "ru",
            Language::Fr => "fr",
        }
    }

    /// Dropdown label.
    pub fn label(self) -> &'static str {
        match self {
            Language::En => "ENGLISH (ORIGINAL)",
            Language::Tr => "TURKISH (TÜRKÇE)",
            Language::Es => "SPANISH (ESPAÑOL)",
            Language::De => "GERMAN (DEUTSCH)",
            Language::Ru => "RUSSIAN (РУССКИЙ)",
            Language::Fr => "FRENCH (FRANÇAIS)",
        }
    }

    pub fn is_original(self) -> bool {
        self == Language::En
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("translation request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("translation service returned {0}")]
    Status(StatusCode),
    #[error("translation page contained no result")]
    MissingResult,
}

/// Replace Turkish-specific letters with their plain Latin counterparts,
/// for the display font which lacks them.
pub fn fold_turkish(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'ğ' => 'g',
            'Ğ' => 'G',
            'ş' => 's',
            'Ş' => 'S',
            'ı' => 'i',
            'İ' => 'I',
            'ç' => 'c',
            'Ç' => 'C',
            'ü' => 'u',
            'Ü' => 'U',
            'ö' => 'o',
            'Ö' => 'O',
            other => other,
        })
        .collect()
}

/// Cut `text` to 499 characters when it exceeds 500.
pub fn truncate_for_translation(text: &str) -> &str {
    if text.chars().count() > MAX_TRANSLATE_CHARS {
        match text.char_indices().nth(TRUNCATED_CHARS) {
            Some((idx, _)) => &text[..idx],
            None => text,
        }
    } else {
        text
    }
}

fn parse_translation(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("div.result-container").ok()?;
    let text = document
        .select(&selector)
        .next()?
        .text()
        .collect::<String>()
        .trim()
        .to_string();
    (!text.is_empty()).then_some(text)
}

pub struct Translator {
    client: Client,
    base_url: String,
}

impl Translator {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to build translator HTTP client")?;

        Ok(Translator {
            client,
            base_url: config.translate_url.clone(),
        })
    }

    async fn request(&self, text: &str, target: Language) -> Result<String, TranslateError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("sl", "auto"), ("tl", target.code()), ("q", text)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslateError::Status(status));
        }

        let body = response.text().await?;
        parse_translation(&body).ok_or(TranslateError::MissingResult)
    }

    /// Translate `text` into `target`. English and failures return the input unchanged.
    pub async fn translate(&self, text: &str, target: Language) -> String {
        if target.is_original() || text.trim().is_empty() {
            return text.to_string();
        }

        match self.request(truncate_for_translation(text), target).await {
            Ok(translated) => translated,
            Err(e) => {
                warn!("Translation to {} failed, keeping original: {}", target, e);
                text.to_string()
            }
        }
    }

    /// Translate several texts concurrently, preserving order.
    pub async fn translate_all(&self, texts: &[&str], target: Language) -> Vec<String> {
        if target.is_original() {
            return texts.iter().map(|t| t.to_string()).collect();
        }
        debug!("Translating {} texts to {}", texts.len(), target);
        join_all(texts.iter().map(|t| self.translate(t, target))).await
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::result_page;
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_fold_turkish() {
        assert_eq!(fold_turkish("ÇİN ŞİRKETİ ığüö"), "CIN SIRKETI iguo");
        assert_eq!(fold_turkish("plain"), "plain");
        assert_eq!(fold_turkish(""), "");
    }

    #[test]
    fn test_truncate_boundaries() {
        let exactly = "a".repeat(500);
        assert_eq!(truncate_for_translation(&exactly).len(), 500);

        let over = "a".repeat(501);
        assert_eq!(truncate_for_translation(&over).len(), 499);

        // counted in characters, not bytes
        let wide = "ş".repeat(600);
        let cut = truncate_for_translation(&wide);
        assert_eq!(cut.chars().count(), 499);
    }

    #[test]
    fn test_language_serde_codes() {
        assert_eq!(serde_json::to_value(Language::Tr).unwrap(), "tr");
        let lang: Language = serde_json::from_value(serde_json::json!("ru")).unwrap();
        assert_eq!(lang, Language::Ru);
        assert!(serde_json::from_value::<Language>(serde_json::json!("xx")).is_err());
        assert_eq!(Language::default(), Language::En);
    }

    #[test]
    fn test_parse_translation() {
        assert_eq!(
            parse_translation(&result_page(" Merhaba ")).as_deref(),
            Some("Merhaba")
        );
        assert_eq!(parse_translation("<html></html>"), None);
        assert_eq!(parse_translation(&result_page("  ")), None);
    }

    #[tokio::test]
    async fn test_english_skips_network() {
        // unroutable base url: any request would fail and still return input
        let translator = Translator::new(&Config::for_base_url("http://127.0.0.1:9")).unwrap();
        assert_eq!(translator.translate("Hello", Language::En).await, "Hello");
    }

    #[tokio::test]
    async fn test_translate_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/m"))
            .and(query_param("sl", "auto"))
            .and(query_param("tl", "de"))
            .and(query_param("q", "Hello"))
            .respond_with(ResponseTemplate::new(200).set_body_string(result_page("Hallo")))
            .mount(&server)
            .await;

        let translator = Translator::new(&Config::for_base_url(&server.uri())).unwrap();
        assert_eq!(translator.translate("Hello", Language::De).await, "Hallo");
    }

    #[tokio::test]
    async fn test_translate_failure_returns_original() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/m"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let translator = Translator::new(&Config::for_base_url(&server.uri())).unwrap();
        let long = "x".repeat(800);
        assert_eq!(translator.translate(&long, Language::Fr).await, long);
    }

    #[tokio::test]
    async fn test_translate_sends_truncated_text() {
        let server = MockServer::start().await;
        let long = "y".repeat(520);
        Mock::given(method("GET"))
            .and(path("/m"))
            .and(query_param("q", "y".repeat(499)))
            .respond_with(ResponseTemplate::new(200).set_body_string(result_page("kurz")))
            .expect(1)
            .mount(&server)
            .await;

        let translator = Translator::new(&Config::for_base_url(&server.uri())).unwrap();
        assert_eq!(translator.translate(&long, Language::De).await, "kurz");
    }

    #[tokio::test]
    async fn test_translate_all_preserves_order() {
        let server = MockServer::start().await;
        for (src, dst) in [("one", "uno"), ("two", "dos"), ("three", "tres")] {
            Mock::given(method("GET"))
                .and(path("/m"))
                .and(query_param("q", src))
                .respond_with(ResponseTemplate::new(200).set_body_string(result_page(dst)))
                .mount(&server)
                .await;
        }

        let translator = Translator::new(&Config::for_base_url(&server.uri())).unwrap();
        let out = translator
            .translate_all(&["one", "two", "three"], Language::Es)
            .await;
        assert_eq!(out, vec!["uno", "dos", "tres"]);
    }
}
