use futures_util::{StreamExt, future::BoxFuture};
use reqwest::header::{ACCEPT_ENCODING, HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Invalid header {0}")]
    InvalidHeader(String),
}

#[derive(Debug, Clone, Default)]
pub struct Request {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Fetches a URL and hands back the status and the whole body.
/// Non-success statuses are not errors at this level.
pub trait Transport: Send + Sync {
    fn get(&self, request: Request) -> BoxFuture<'_, Result<Response, Error>>;
}

#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn get(&self, request: Request) -> BoxFuture<'_, Result<Response, Error>> {
        Box::pin(async move {
            let mut headers = HeaderMap::new();
            headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate"));
            for (name, value) in request.headers.iter() {
                let name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|_| Error::InvalidHeader(name.clone()))?;
                let value =
                    HeaderValue::from_str(value).map_err(|_| Error::InvalidHeader(name.to_string()))?;
                headers.insert(name, value);
            }

            let response = self.client.get(&request.url).headers(headers).send().await?;
            let status = response.status().as_u16();
            let mut body = Vec::new();
            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                body.extend_from_slice(&chunk?);
            }
            debug!("GET {} -> {status} ({} bytes)", request.url, body.len());
            Ok(Response { status, body })
        })
    }
}
