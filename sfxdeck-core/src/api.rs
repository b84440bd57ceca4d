//! JSON HTTP client shared by the catalog reads and the remote list backend.
//!
//! Status handling follows the server's conventions: `401` means the session
//! is gone, `400` carries a user-facing `{"error": ...}` message, `404` means
//! the resource is missing or belongs to someone else. A successful response
//! that is not JSON is the sign-in page reached through a redirect and is
//! treated as `401`.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Fallback for a rejected request whose body has no message.
const REJECTED_FALLBACK: &str = "Request failed";

/// Fallback for a missing resource whose body has no message.
const NOT_FOUND_FALLBACK: &str = "Not found";

/// Error body returned by the server.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Cookie-carrying JSON client bound to one server origin.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client for `base_url` (e.g. `http://127.0.0.1:5000`).
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder().cookie_store(true).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Creates a client reusing an existing reqwest client.
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Returns the server origin this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a server path.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET `path` with query parameters and decode the JSON body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        tracing::debug!("GET {}", path);
        let response = self.client.get(self.url(path)).query(query).send().await?;
        decode(response).await
    }

    /// Sends a request with an optional JSON body and decodes the JSON response.
    pub async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!("{} {}", method, path);
        let mut request = self.client.request(method, self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        decode(request.send().await?).await
    }

    /// Sends a request whose response body is not needed.
    pub async fn send_discarding<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let _: serde_json::Value = self.send(method, path, body).await?;
        Ok(())
    }
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v.contains("application/json"))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(Error::AuthRequired);
    }

    let json = is_json(&response);
    if status.is_success() {
        if !json {
            return Err(Error::AuthRequired);
        }
        return Ok(response.json::<T>().await?);
    }

    let message = if json {
        response.json::<ErrorBody>().await.ok().and_then(|b| b.error)
    } else {
        None
    };

    Err(match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            Error::Validation(message.unwrap_or_else(|| REJECTED_FALLBACK.to_string()))
        }
        StatusCode::NOT_FOUND | StatusCode::FORBIDDEN => {
            Error::NotFound(message.unwrap_or_else(|| NOT_FOUND_FALLBACK.to_string()))
        }
        other => Error::Server(other.as_u16(), message.unwrap_or_default()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let api = ApiClient::with_client(Client::new(), "http://localhost:5000/");
        assert_eq!(api.base_url(), "http://localhost:5000");
        assert_eq!(api.url("/api/sounds"), "http://localhost:5000/api/sounds");
        assert_eq!(api.url("api/sounds"), "http://localhost:5000/api/sounds");
        assert_eq!(api.url("https://cdn.example/a.mp3"), "https://cdn.example/a.mp3");
    }
}
