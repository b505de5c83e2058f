//! HTTP client for the backends the app talks to: the DeSo node API, the
//! CloutFeed companion API (saved/pinned posts, clout tags) and the CloutCast
//! promotion API.
//!
//! All requests go out with the same fixed headers; 2xx responses are parsed
//! as JSON and everything else is normalized into [`ApiError`]. Nothing here
//! retries — retries are user-initiated, upstream.

mod cloutcast;
mod cloutfeed;
mod error;
pub mod models;
mod posts;
mod signer;
mod users;

pub use error::ApiError;
pub use posts::{FeedKind, NewPost, SubmitTransactionResponse, UnsignedTransaction};
pub use signer::{user_visible_signer_error, SignerError, TransactionSigner};
pub use users::{BlockPublicKeyResponse, HodlersPage, NotificationsPage};

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

pub const DEFAULT_NODE_API_URL: &str = "https://node.deso.org/api/v0/";
pub const DEFAULT_COMPANION_API_URL: &str = "https://api.cloutapis.com/";
pub const DEFAULT_CLOUTCAST_API_URL: &str = "https://cloutcast.io/api/";

/// Fee rate attached to every constructed transaction.
pub const MIN_FEE_RATE_NANOS_PER_KB: u64 = 1000;

/// The node rejects requests without a browser-looking user agent.
const STATIC_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_6) \
    AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0.1 Safari/605.1.15";

/// Which backend a route belongs to.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Api {
    Node,
    Companion,
    CloutCast,
}

#[derive(Debug, Clone)]
pub struct DesoClient {
    http: reqwest::Client,
    node_url: Url,
    companion_url: Url,
    cloutcast_url: Url,
}

impl DesoClient {
    /// Client against the given base URLs. Each must be absolute and is
    /// treated as a directory (routes are joined underneath it).
    pub fn new(node_url: &str, companion_url: &str, cloutcast_url: &str) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(STATIC_USER_AGENT));

        let http = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            node_url: parse_base_url(node_url)?,
            companion_url: parse_base_url(companion_url)?,
            cloutcast_url: parse_base_url(cloutcast_url)?,
        })
    }

    /// Client against the public production backends.
    pub fn default_urls() -> Self {
        Self::new(
            DEFAULT_NODE_API_URL,
            DEFAULT_COMPANION_API_URL,
            DEFAULT_CLOUTCAST_API_URL,
        )
        .expect("default API URLs are valid")
    }

    fn base(&self, api: Api) -> &Url {
        match api {
            Api::Node => &self.node_url,
            Api::Companion => &self.companion_url,
            Api::CloutCast => &self.cloutcast_url,
        }
    }

    fn route(&self, api: Api, route: &str) -> Result<Url, ApiError> {
        self.base(api)
            .join(route)
            .map_err(|e| ApiError::Validation(format!("invalid route {route}: {e}")))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        api: Api,
        route: &str,
    ) -> Result<T, ApiError> {
        let url = self.route(api, route)?;
        tracing::debug!(%url, "GET");
        let response = self.http.get(url).send().await?;
        handle_response(response).await
    }

    pub(crate) async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        api: Api,
        route: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.route(api, route)?;
        tracing::debug!(%url, "POST");
        let response = self.http.post(url).json(body).send().await?;
        handle_response(response).await
    }

    pub(crate) async fn post_json_bearer<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        api: Api,
        route: &str,
        bearer: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.route(api, route)?;
        tracing::debug!(%url, "POST (authorized)");
        let response = self
            .http
            .post(url)
            .bearer_auth(bearer)
            .json(body)
            .send()
            .await?;
        handle_response(response).await
    }

    pub(crate) async fn get_json_bearer<T: DeserializeOwned>(
        &self,
        api: Api,
        route: &str,
        bearer: &str,
    ) -> Result<T, ApiError> {
        let url = self.route(api, route)?;
        tracing::debug!(%url, "GET (authorized)");
        let response = self.http.get(url).bearer_auth(bearer).send().await?;
        handle_response(response).await
    }

    /// GET against a fully-qualified URL outside the configured backends
    /// (e.g. the open exchange-rate API).
    pub async fn get_absolute<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let url =
            Url::parse(url).map_err(|e| ApiError::Validation(format!("invalid url {url}: {e}")))?;
        tracing::debug!(%url, "GET (absolute)");
        let response = self.http.get(url).send().await?;
        handle_response(response).await
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let url =
        Url::parse(raw).map_err(|e| ApiError::Validation(format!("invalid base url {raw}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::Validation(format!("invalid base url {raw}")));
    }
    Ok(url)
}

/// Success = 2xx with a JSON body of the expected shape; everything else
/// becomes a structured error. 429 is picked off before the generic arm.
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        let bytes = response.bytes().await?;
        return serde_json::from_slice(&bytes).map_err(ApiError::Parse);
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ApiError::RateLimited);
    }
    let body = response
        .bytes()
        .await
        .ok()
        .and_then(|bytes| serde_json::from_slice::<serde_json::Value>(&bytes).ok());
    Err(ApiError::Http {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_join_under_the_base() {
        let client = DesoClient::default_urls();
        let url = client.route(Api::Node, "get-posts-stateless").unwrap();
        assert_eq!(
            url.as_str(),
            "https://node.deso.org/api/v0/get-posts-stateless"
        );
        let url = client
            .route(Api::Companion, "saved-posts/BC1me?jwt=abc")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.cloutapis.com/saved-posts/BC1me?jwt=abc"
        );
    }

    #[test]
    fn bad_base_url_is_a_validation_error() {
        let err = DesoClient::new("not a url", DEFAULT_COMPANION_API_URL, DEFAULT_CLOUTCAST_API_URL)
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
