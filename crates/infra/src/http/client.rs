use std::time::Duration;

use reqwest::{Client as ReqwestClient, Method, Request, RequestBuilder, Response};
use selfcare_domain::{ErpError, Result};
use tracing::debug;

use crate::errors::InfraError;

const READ_RETRY_DELAY: Duration = Duration::from_millis(200);

/// Transport for the ERP adapters.
///
/// Every request is bounded by the client timeout. Reads (`GET`, `HEAD`) get
/// one more try after a 5xx or a connection failure; writes are sent exactly
/// once and any retry is left to the job runner, which replays them with the
/// same payment reference.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    read_retries: u32,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute a request.
    ///
    /// Non-success statuses come back as responses; callers decide what a
    /// 404 means. Transport failures become `ErpError::Adapter`.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let request = builder.build().map_err(|err| ErpError::from(InfraError::from(err)))?;
        let retries = if is_read(request.method()) { self.read_retries } else { 0 };

        let mut attempt = 0;
        let mut next = Some(request);
        while let Some(request) = next.take() {
            attempt += 1;
            // Reads carry no body, so the copy is always available.
            let spare = if attempt <= retries { request.try_clone() } else { None };

            match self.execute(request, attempt).await {
                Ok(response) if response.status().is_server_error() && spare.is_some() => {}
                Ok(response) => return Ok(response),
                Err(err) if spare.is_some() && is_connection_failure(&err) => {}
                Err(err) => return Err(InfraError::from(err).into()),
            }

            tokio::time::sleep(READ_RETRY_DELAY).await;
            next = spare;
        }

        Err(ErpError::internal("http client finished without a response"))
    }

    async fn execute(&self, request: Request, attempt: u32) -> reqwest::Result<Response> {
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(attempt, %method, %url, "sending HTTP request");

        let result = self.client.execute(request).await;
        match &result {
            Ok(response) => {
                debug!(attempt, %method, %url, status = %response.status(), "received HTTP response");
            }
            Err(err) => debug!(attempt, %method, %url, error = %err, "HTTP request failed"),
        }
        result
    }
}

fn is_read(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD
}

fn is_connection_failure(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    read_retries: u32,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), read_retries: 1, user_agent: None, default_headers: None }
    }
}

impl HttpClientBuilder {
    /// Upper bound for a single request, connect through body.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Extra tries for reads after a 5xx or connection failure.
    pub fn read_retries(mut self, retries: u32) -> Self {
        self.read_retries = retries;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| ErpError::from(InfraError::from(err)))?;

        Ok(HttpClient { client, read_retries: self.read_retries })
    }
}
