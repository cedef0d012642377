//! Klemy translation service client.
//!
//! The service takes a form-encoded POST and answers with an HTML page; the
//! translation, when there is one, sits inside a `<p class="fs-3">`
//! paragraph. An empty or missing paragraph is the explicit "no translation"
//! signal, distinct from an error.

use crate::models::{Result, ScrapeError};
use regex::Regex;
use reqwest::header::ACCEPT;
use std::future::Future;
use std::time::Duration;

/// Request/response contract of a translation backend.
///
/// `Ok(Some(text))` is a translation, `Ok(None)` the explicit
/// "no translation" signal; errors are classified by
/// [`ScrapeError::is_transient`].
pub trait TranslationService {
    fn translate(&self, english: &str) -> impl Future<Output = Result<Option<String>>>;
}

/// HTTP client for the Klemy staging endpoint.
pub struct KlemyClient {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
    paragraph: Regex,
    tag: Regex,
}

impl KlemyClient {
    /// Create a new client with a per-request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ScrapeError::Network)?;

        Ok(Self {
            http,
            url: url.into(),
            timeout,
            paragraph: Regex::new(r#"(?is)<p[^>]*class="fs-3"[^>]*>(.*?)</p>"#).unwrap(),
            tag: Regex::new(r"(?s)<.*?>").unwrap(),
        })
    }

    /// POST one sentence and return the raw HTML response body.
    async fn fetch(&self, english: &str) -> Result<String> {
        let form = [
            ("target_lang", "Tunisian Dialect"),
            ("output_alphabet", "Arabic"),
            ("text", english),
        ];

        let response = self
            .http
            .post(&self.url)
            .header(ACCEPT, "*/*")
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ScrapeError::Timeout(self.timeout)
                } else {
                    ScrapeError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Http {
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(ScrapeError::Network)
    }

    /// Extract the translation from the fs-3 paragraph, stripping nested
    /// tags and normalizing whitespace.
    fn extract_translation(&self, html: &str) -> Option<String> {
        let captures = self.paragraph.captures(html)?;
        let inner = captures.get(1)?.as_str();
        let text = self.tag.replace_all(inner, "");
        let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if cleaned.is_empty() {
            None
        } else {
            Some(cleaned)
        }
    }
}

impl TranslationService for KlemyClient {
    async fn translate(&self, english: &str) -> Result<Option<String>> {
        let html = self.fetch(english).await?;
        Ok(self.extract_translation(&html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> KlemyClient {
        KlemyClient::new("http://localhost/staging", Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn extracts_paragraph_text() {
        let html = r#"<html><body><p class="fs-3">خلينا نجربو حاجة</p></body></html>"#;
        assert_eq!(
            client().extract_translation(html),
            Some("خلينا نجربو حاجة".to_string())
        );
    }

    #[test]
    fn strips_nested_tags_and_collapses_whitespace() {
        let html = "<p class=\"fs-3\">\n  <span>خلينا</span>\n  نجربو   حاجة\n</p>";
        assert_eq!(
            client().extract_translation(html),
            Some("خلينا نجربو حاجة".to_string())
        );
    }

    #[test]
    fn missing_or_empty_paragraph_is_no_translation() {
        assert_eq!(client().extract_translation("<html><body>nope</body></html>"), None);
        assert_eq!(client().extract_translation(r#"<p class="fs-3">   </p>"#), None);
        assert_eq!(client().extract_translation(r#"<p class="fs-3"><br/></p>"#), None);
    }

    #[test]
    fn paragraph_match_is_case_insensitive() {
        let html = r#"<P CLASS="fs-3">آش حوالك</P>"#;
        assert_eq!(client().extract_translation(html), Some("آش حوالك".to_string()));
    }
}
