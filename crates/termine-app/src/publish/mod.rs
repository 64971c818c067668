//! Publishing the rendered page through the wiki action API.

use std::time::Duration;

use serde_json::Value;
use termine_core::config::WikiConfig;
use termine_core::constants::{HTTP_TIMEOUT_SECS, USER_AGENT};

use crate::error::{AppError, AppResult};

/// Token types requested from `meta=tokens`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Login,
    Csrf,
}

impl TokenKind {
    const fn field(self) -> &'static str {
        match self {
            Self::Login => "logintoken",
            Self::Csrf => "csrftoken",
        }
    }
}

/// Bot login and page edit against one wiki.
///
/// The client keeps cookies, so the session from the login carries over to
/// the edit.
#[derive(Debug, Clone)]
pub struct MediaWikiPublisher {
    client: reqwest::Client,
    api_url: String,
    username: String,
    password: String,
}

impl MediaWikiPublisher {
    /// ## Summary
    /// Creates a publisher for the configured wiki.
    ///
    /// ## Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(wiki: &WikiConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .cookie_store(true)
            .build()?;
        Ok(Self {
            client,
            api_url: wiki.api_url.clone(),
            username: wiki.username.clone(),
            password: wiki.password.clone(),
        })
    }

    /// ## Summary
    /// Logs in and replaces the page text.
    ///
    /// Returns the API response to the edit.
    ///
    /// ## Errors
    /// Returns an error if a request fails, the login is rejected, the API
    /// reports an error or a token is missing from a response.
    #[tracing::instrument(skip(self, text), fields(api = %self.api_url, bytes = text.len()))]
    pub async fn publish(&self, title: &str, text: &str, summary: &str) -> AppResult<Value> {
        let login_token = self.token(TokenKind::Login).await?;
        self.login(&login_token).await?;
        let csrf_token = self.token(TokenKind::Csrf).await?;

        let response = self
            .post(
                "edit",
                &[
                    ("action", "edit"),
                    ("title", title),
                    ("text", text),
                    ("summary", summary),
                    ("bot", "1"),
                    ("token", csrf_token.as_str()),
                    ("format", "json"),
                ],
            )
            .await?;

        tracing::info!(%title, response = %response, "Page edited");
        Ok(response)
    }

    async fn token(&self, kind: TokenKind) -> AppResult<String> {
        let mut query = vec![("action", "query"), ("meta", "tokens"), ("format", "json")];
        if kind == TokenKind::Login {
            query.push(("type", "login"));
        }

        let response = self
            .client
            .get(&self.api_url)
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        check_api_error("query", &response)?;

        response
            .pointer("/query/tokens")
            .and_then(|tokens| tokens.get(kind.field()))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(AppError::UnexpectedResponse {
                action: "query",
                field: kind.field(),
            })
    }

    async fn login(&self, token: &str) -> AppResult<()> {
        let response = self
            .post(
                "login",
                &[
                    ("action", "login"),
                    ("lgname", self.username.as_str()),
                    ("lgpassword", self.password.as_str()),
                    ("lgtoken", token),
                    ("format", "json"),
                ],
            )
            .await?;

        match response.pointer("/login/result").and_then(Value::as_str) {
            Some("Success") => {
                tracing::debug!(user = %self.username, "Logged in");
                Ok(())
            }
            _ => {
                let reason = response
                    .pointer("/login/reason")
                    .and_then(Value::as_str)
                    .map_or_else(|| response.to_string(), str::to_string);
                Err(AppError::LoginRejected(reason))
            }
        }
    }

    async fn post(&self, action: &'static str, form: &[(&str, &str)]) -> AppResult<Value> {
        let response = self
            .client
            .post(&self.api_url)
            .form(form)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        check_api_error(action, &response)?;
        Ok(response)
    }
}

/// Turns an API `error` object into an error.
fn check_api_error(action: &'static str, response: &Value) -> AppResult<()> {
    let Some(error) = response.get("error") else {
        return Ok(());
    };
    let field = |name: &str| {
        error
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    Err(AppError::WikiApiError {
        action,
        code: field("code"),
        info: field("info"),
    })
}
