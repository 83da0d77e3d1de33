use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use log::{debug, info};
use once_cell::sync::Lazy;
use reqwest::header::{HeaderMap, CONTENT_DISPOSITION, USER_AGENT};
use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::generator::ContentDisposition;
use crate::models::{ClientKind, UpstreamHeaders};
use crate::Settings;

pub const SUBSCRIPTION_USERINFO: &str = "subscription-userinfo";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    #[error("Failed to send request: {0}")]
    Request(reqwest::Error),

    #[error("HTTP error: {0}")]
    Status(StatusCode),

    #[error("Response body exceeds {0} bytes")]
    TooLarge(usize),

    #[error("Failed to read response body: {0}")]
    Body(reqwest::Error),
}

/// An upstream subscription as received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedSubscription {
    pub body: String,
    pub headers: UpstreamHeaders,
}

struct CacheEntry {
    fetched_at: Instant,
    subscription: FetchedSubscription,
}

/// Recently fetched subscriptions keyed by url and client kind
static SUBSCRIPTION_CACHE: Lazy<Mutex<HashMap<(String, ClientKind), CacheEntry>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn cache_get(url: &str, kind: ClientKind, ttl: Duration) -> Option<FetchedSubscription> {
    let mut cache = SUBSCRIPTION_CACHE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let key = (url.to_string(), kind);
    match cache.get(&key) {
        Some(entry) if entry.fetched_at.elapsed() < ttl => Some(entry.subscription.clone()),
        Some(_) => {
            cache.remove(&key);
            None
        }
        None => None,
    }
}

fn cache_put(url: &str, kind: ClientKind, subscription: &FetchedSubscription, ttl: Duration) {
    let mut cache = SUBSCRIPTION_CACHE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    cache.retain(|_, entry| entry.fetched_at.elapsed() < ttl);
    cache.insert(
        (url.to_string(), kind),
        CacheEntry {
            fetched_at: Instant::now(),
            subscription: subscription.clone(),
        },
    );
}

/// Extract the headers the rewrite cares about from an upstream response
pub fn upstream_headers(headers: &HeaderMap) -> UpstreamHeaders {
    let disposition = headers
        .get(CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .map(ContentDisposition::parse)
        .unwrap_or_default();

    UpstreamHeaders {
        content_disposition_type: disposition.disposition_type,
        content_disposition_filename: disposition.filename,
        subscription_userinfo: headers
            .get(SUBSCRIPTION_USERINFO)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    }
}

/// Append a body chunk, failing as soon as the total passes `cap` bytes
fn append_capped(buf: &mut Vec<u8>, chunk: &[u8], cap: usize) -> Result<(), FetchError> {
    if buf.len() + chunk.len() > cap {
        return Err(FetchError::TooLarge(cap));
    }
    buf.extend_from_slice(chunk);
    Ok(())
}

/// Fetch a subscription with the client kind as `User-Agent`
///
/// Responses are reused for `cache_subscription` seconds per url and
/// client kind.
///
/// # Arguments
/// * `url` - The subscription URL
/// * `kind` - The client the subscription is fetched for
///
/// # Returns
/// * `Ok(FetchedSubscription)` - The body and relevant headers
/// * `Err(FetchError)` - If the request failed
pub async fn fetch_subscription(
    url: &str,
    kind: ClientKind,
) -> Result<FetchedSubscription, FetchError> {
    let settings = Settings::current();
    let ttl = Duration::from_secs(settings.cache_subscription);

    if !ttl.is_zero() {
        if let Some(cached) = cache_get(url, kind, ttl) {
            debug!("Serving cached subscription for {}", url);
            return Ok(cached);
        }
    }

    let client = Client::builder()
        .timeout(Duration::from_secs(settings.fetch_timeout))
        .build()
        .map_err(FetchError::Client)?;

    let start = Instant::now();
    let mut response = client
        .get(url)
        .header(USER_AGENT, kind.user_agent())
        .send()
        .await
        .map_err(FetchError::Request)?;
    info!("Time: {}ms, URI: {}", start.elapsed().as_millis(), url);

    if response.status() != StatusCode::OK {
        return Err(FetchError::Status(response.status()));
    }
    if response
        .content_length()
        .is_some_and(|len| len as usize > settings.max_download_size)
    {
        return Err(FetchError::TooLarge(settings.max_download_size));
    }

    let headers = upstream_headers(response.headers());
    let mut buf = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(FetchError::Body)? {
        append_capped(&mut buf, &chunk, settings.max_download_size)?;
    }
    let body = String::from_utf8_lossy(&buf).into_owned();

    let subscription = FetchedSubscription { body, headers };
    if !ttl.is_zero() {
        cache_put(url, kind, &subscription, ttl);
    }
    Ok(subscription)
}
