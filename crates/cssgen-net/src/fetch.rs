//! Fetch responses
//!
//! Convenience accessors over a raw `Response`.

use crate::{NetError, Response};

/// Fetch response with convenience methods
#[derive(Debug, Clone)]
pub struct FetchResponse {
    inner: Response,
}

impl FetchResponse {
    /// Header value, matched case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner
            .headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body as UTF-8 text
    pub fn text(&self) -> Result<String, NetError> {
        String::from_utf8(self.inner.body.clone()).map_err(|e| NetError::Decode(e.to_string()))
    }

    /// Body decoded as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, NetError> {
        serde_json::from_slice(&self.inner.body).map_err(|e| NetError::Decode(e.to_string()))
    }
}

impl From<Response> for FetchResponse {
    fn from(inner: Response) -> Self {
        Self { inner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(body: &str) -> FetchResponse {
        FetchResponse::from(Response {
            status: 200,
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: body.as_bytes().to_vec(),
        })
    }

    #[test]
    fn test_json_body() {
        let value: serde_json::Value = response(r#"{"a":1}"#).json().unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_bad_json_is_decode_error() {
        let err = response("{nope").json::<serde_json::Value>().unwrap_err();
        assert!(matches!(err, NetError::Decode(_)));
    }

    #[test]
    fn test_header_case_insensitive() {
        let resp = response("");
        assert_eq!(resp.header("content-type"), Some("application/json"));
        assert_eq!(resp.header("x-missing"), None);
    }
}
