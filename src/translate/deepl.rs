//! DeepL translation provider client.
//!
//! Authenticates with the `DeepL-Auth-Key` header and always translates into
//! English. The client refuses to exist without an API key, so a missing
//! credential surfaces at startup instead of on every article.

use super::Translator;
use crate::config::TranslatorConfig;
use crate::error::TranslateError;
use crate::languages::normalize_language;
use async_trait::async_trait;
use reqwest::{Client, Response, header::AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

const TARGET_LANG: &str = "EN";

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    text: String,
}

/// Character quota of the account behind the API key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Usage {
    pub character_count: u64,
    pub character_limit: u64,
}

#[derive(Clone)]
pub struct DeepLClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl std::fmt::Debug for DeepLClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepLClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl DeepLClient {
    /// Build a client, failing with [`TranslateError::Unconfigured`] when the key is absent or blank.
    pub fn new(api_key: Option<&str>, config: &TranslatorConfig) -> Result<Self, TranslateError> {
        let api_key = api_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(TranslateError::Unconfigured)?;

        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn auth_header(&self) -> String {
        format!("DeepL-Auth-Key {}", self.api_key)
    }

    /// Fetch the account's character usage.
    #[instrument(level = "info", skip(self))]
    pub async fn usage(&self) -> Result<Usage, TranslateError> {
        let response = self
            .client
            .get(format!("{}/usage", self.endpoint))
            .header(AUTHORIZATION, self.auth_header())
            .send()
            .await?;

        let usage: Usage = decode_success(response).await?;
        info!(used = usage.character_count, limit = usage.character_limit, "Fetched usage");
        Ok(usage)
    }
}

#[async_trait]
impl Translator for DeepLClient {
    #[instrument(level = "debug", skip(self, text))]
    async fn translate(&self, text: &str, source_lang: &str) -> Result<String, TranslateError> {
        let source = normalize_language(source_lang);
        let response = self
            .client
            .post(format!("{}/translate", self.endpoint))
            .header(AUTHORIZATION, self.auth_header())
            .form(&translate_form(text, &source))
            .send()
            .await?;

        first_translation(decode_success(response).await?)
    }
}

/// Decode a 2xx JSON body, or surface the status with the provider's error text.
async fn decode_success<T: DeserializeOwned>(response: Response) -> Result<T, TranslateError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await?;
        return Err(TranslateError::Status { status, body });
    }
    response.json::<T>().await.map_err(|e| {
        if e.is_decode() {
            TranslateError::Decode(e.to_string())
        } else {
            TranslateError::Http(e)
        }
    })
}

fn translate_form<'a>(text: &'a str, source: &'a str) -> [(&'static str, &'a str); 3] {
    [
        ("text", text),
        ("source_lang", source),
        ("target_lang", TARGET_LANG),
    ]
}

fn first_translation(parsed: TranslateResponse) -> Result<String, TranslateError> {
    parsed
        .translations
        .into_iter()
        .next()
        .map(|t| t.text)
        .ok_or(TranslateError::Empty)
}
