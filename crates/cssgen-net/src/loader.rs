//! Resource Loader
//!
//! Fetches `http`/`https` URLs with reqwest's blocking client on smol's
//! blocking pool, and `file` URLs straight from disk.

use std::time::Duration;

use url::Url;

use crate::{FetchJson, FetchResponse, JsonFuture, NetError, Response};

const DEFAULT_USER_AGENT: &str = concat!("cssgen/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builder for `ResourceLoader`
#[derive(Debug, Clone)]
pub struct ResourceLoaderBuilder {
    user_agent: String,
    timeout: Duration,
    base_url: Option<String>,
}

impl Default for ResourceLoaderBuilder {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            base_url: None,
        }
    }
}

impl ResourceLoaderBuilder {
    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base that relative URLs resolve against
    pub fn base_url(mut self, base_url: Option<&str>) -> Self {
        self.base_url = base_url.map(str::to_string);
        self
    }

    pub fn build(self) -> Result<ResourceLoader, NetError> {
        let base = self
            .base_url
            .as_deref()
            .map(|b| Url::parse(b).map_err(|e| NetError::InvalidUrl(format!("{b}: {e}"))))
            .transpose()?;

        let client = reqwest::blocking::Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.timeout)
            .build()
            .map_err(|e| NetError::Network(e.to_string()))?;

        Ok(ResourceLoader {
            client,
            base,
            timeout: self.timeout,
        })
    }
}

/// Load resources from network or disk
#[derive(Debug, Clone)]
pub struct ResourceLoader {
    client: reqwest::blocking::Client,
    base: Option<Url>,
    timeout: Duration,
}

impl ResourceLoader {
    /// Loader with the default user agent and timeout, and no base URL
    pub fn new() -> Result<Self, NetError> {
        Self::builder().build()
    }

    pub fn builder() -> ResourceLoaderBuilder {
        ResourceLoaderBuilder::default()
    }

    pub fn base(&self) -> Option<&Url> {
        self.base.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve `url` against `base`, else the loader's base URL
    ///
    /// With neither, a string that is not an absolute URL is taken as a
    /// filesystem path relative to the working directory.
    pub fn resolve(&self, url: &str, base: Option<&str>) -> Result<Url, NetError> {
        let invalid = |e: url::ParseError| NetError::InvalidUrl(format!("{url}: {e}"));

        if let Some(base) = base {
            return Url::parse(base).and_then(|b| b.join(url)).map_err(invalid);
        }
        if let Some(base) = &self.base {
            return base.join(url).map_err(invalid);
        }
        match Url::parse(url) {
            Ok(parsed) => Ok(parsed),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let path = std::path::absolute(url)?;
                Url::from_file_path(&path)
                    .map_err(|_| NetError::InvalidUrl(path.display().to_string()))
            }
            Err(e) => Err(invalid(e)),
        }
    }

    /// Fetch a resolved URL
    pub async fn fetch(&self, url: &Url) -> Result<Response, NetError> {
        match url.scheme() {
            "http" | "https" => {
                tracing::info!("GET {}", url);
                let client = self.client.clone();
                let target = url.clone();
                let timeout = self.timeout;
                smol::unblock(move || http_get(&client, target, timeout)).await
            }
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| NetError::InvalidUrl(url.to_string()))?;
                tracing::debug!("Reading {}", path.display());
                let body = smol::fs::read(&path).await?;
                Ok(Response {
                    status: 200,
                    headers: Vec::new(),
                    body,
                })
            }
            scheme => Err(NetError::InvalidUrl(format!("unsupported scheme {scheme:?} in {url}"))),
        }
    }

    /// Fetch text, returning it with the URL it was resolved to
    pub async fn fetch_text(&self, url: &str, base: Option<&str>) -> Result<(Url, String), NetError> {
        let resolved = self.resolve(url, base)?;
        let text = FetchResponse::from(self.fetch(&resolved).await?).text()?;
        Ok((resolved, text))
    }

    /// Fetch and decode a JSON document
    pub async fn get_json(&self, url: &str) -> Result<serde_json::Value, NetError> {
        let resolved = self.resolve(url, None)?;
        let response = FetchResponse::from(self.fetch(&resolved).await?);
        if let Some(kind) = response.header("content-type").filter(|k| !k.contains("json")) {
            tracing::debug!("{} served as {}, decoding as JSON anyway", resolved, kind);
        }
        response.json()
    }
}

fn http_get(client: &reqwest::blocking::Client, url: Url, timeout: Duration) -> Result<Response, NetError> {
    let response = client.get(url).send().map_err(|e| {
        if e.is_timeout() {
            NetError::Timeout(timeout)
        } else {
            NetError::Network(e.to_string())
        }
    })?;

    let status = response.status().as_u16();
    if !response.status().is_success() {
        return Err(NetError::HttpError { status });
    }

    let headers = response
        .headers()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
        .collect();
    let body = response
        .bytes()
        .map_err(|e| NetError::Network(e.to_string()))?
        .to_vec();

    Ok(Response {
        status,
        headers,
        body,
    })
}

impl FetchJson for ResourceLoader {
    fn fetch_json(&self, url: &str) -> JsonFuture {
        let loader = self.clone();
        let url = url.to_string();
        Box::pin(async move { loader.get_json(&url).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_against_explicit_base() {
        let loader = ResourceLoader::new().unwrap();
        let url = loader
            .resolve("b.css", Some("https://example.com/css/a.css"))
            .unwrap();
        assert_eq!(url.as_str(), "https://example.com/css/b.css");
    }

    #[test]
    fn test_resolve_against_loader_base() {
        let loader = ResourceLoader::builder()
            .base_url(Some("https://example.com/data/"))
            .build()
            .unwrap();
        assert_eq!(
            loader.resolve("items.json", None).unwrap().as_str(),
            "https://example.com/data/items.json"
        );
        assert_eq!(
            loader.resolve("/root.json", None).unwrap().as_str(),
            "https://example.com/root.json"
        );
    }

    #[test]
    fn test_bare_path_becomes_file_url() {
        let loader = ResourceLoader::new().unwrap();
        let url = loader.resolve("some/file.json", None).unwrap();
        assert_eq!(url.scheme(), "file");
        assert!(url.path().ends_with("/some/file.json"));
    }

    #[test]
    fn test_bad_base_rejected() {
        let err = ResourceLoader::builder()
            .base_url(Some("not a url"))
            .build()
            .unwrap_err();
        assert!(matches!(err, NetError::InvalidUrl(_)));
    }

    #[test]
    fn test_unsupported_scheme() {
        let loader = ResourceLoader::new().unwrap();
        let url = Url::parse("ftp://example.com/x").unwrap();
        let err = smol::block_on(loader.fetch(&url)).unwrap_err();
        assert!(matches!(err, NetError::InvalidUrl(_)));
    }
}
