//! Retrieval of the raw calendar feed.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use termine_core::constants::{HTTP_TIMEOUT_SECS, USER_AGENT};

use crate::error::{AppError, AppResult};

/// Anything that can deliver the bytes of a calendar feed.
pub trait FeedSource {
    /// ## Summary
    /// Fetches the complete feed.
    ///
    /// ## Errors
    /// Returns an error if the feed cannot be retrieved.
    fn fetch(&self) -> impl Future<Output = AppResult<Vec<u8>>> + Send;
}

/// Feed served over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpFeed {
    client: reqwest::Client,
    url: String,
}

impl HttpFeed {
    /// ## Summary
    /// Creates a feed for `url` with the default timeout and user agent.
    ///
    /// ## Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl FeedSource for HttpFeed {
    #[tracing::instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> AppResult<Vec<u8>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?;
        let bytes = response.bytes().await?;

        tracing::debug!(bytes = bytes.len(), "Downloaded feed");
        Ok(bytes.to_vec())
    }
}

/// Feed stored on the local file system.
#[derive(Debug, Clone)]
pub struct FileFeed {
    path: PathBuf,
}

impl FileFeed {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FeedSource for FileFeed {
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch(&self) -> AppResult<Vec<u8>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| AppError::FeedFileError {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!(bytes = bytes.len(), "Read feed file");
        Ok(bytes)
    }
}

/// Feed chosen from the configured location.
#[derive(Debug, Clone)]
pub enum Feed {
    Http(HttpFeed),
    File(FileFeed),
}

impl Feed {
    /// ## Summary
    /// Picks the feed kind by scheme.
    ///
    /// `http://` and `https://` locations are downloaded. A `file://` location
    /// or anything without a scheme is read from disk.
    ///
    /// ## Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_location(location: &str) -> AppResult<Self> {
        let location = location.trim();
        let lower = location.to_ascii_lowercase();

        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(Self::Http(HttpFeed::new(location)?));
        }

        let path = location.strip_prefix("file://").unwrap_or(location);
        Ok(Self::File(FileFeed::new(path)))
    }
}

impl FeedSource for Feed {
    async fn fetch(&self) -> AppResult<Vec<u8>> {
        match self {
            Self::Http(feed) => feed.fetch().await,
            Self::File(feed) => feed.fetch().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn location_scheme_selects_feed() {
        assert!(matches!(
            Feed::from_location("https://cloud.example.org/cal.ics").unwrap(),
            Feed::Http(_)
        ));
        assert!(matches!(
            Feed::from_location("HTTP://cloud.example.org/cal.ics").unwrap(),
            Feed::Http(_)
        ));

        let Feed::File(file) = Feed::from_location("file:///srv/cal.ics").unwrap() else {
            panic!("expected a file feed");
        };
        assert_eq!(file.path, PathBuf::from("/srv/cal.ics"));

        let Feed::File(file) = Feed::from_location(" termine.ics ").unwrap() else {
            panic!("expected a file feed");
        };
        assert_eq!(file.path, PathBuf::from("termine.ics"));
    }

    #[test_log::test(tokio::test)]
    async fn http_feed_downloads_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cal.ics"))
            .and(header("user-agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string("BEGIN:VCALENDAR"))
            .expect(1)
            .mount(&server)
            .await;

        let feed = Feed::from_location(&format!("{}/cal.ics", server.uri())).unwrap();
        assert_eq!(feed.fetch().await.unwrap(), b"BEGIN:VCALENDAR");
    }

    #[tokio::test]
    async fn http_error_status_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let feed = HttpFeed::new(format!("{}/missing.ics", server.uri())).unwrap();
        assert!(matches!(
            feed.fetch().await.unwrap_err(),
            AppError::HttpError(_)
        ));
    }

    #[tokio::test]
    async fn missing_file_fails() {
        let feed = FileFeed::new("/nonexistent/termine.ics");
        assert!(matches!(
            feed.fetch().await.unwrap_err(),
            AppError::FeedFileError { .. }
        ));
    }
}
