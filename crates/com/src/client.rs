use {
    crate::*,
    bytes::Bytes,
    http::{
        HeaderMap, HeaderValue,
        header::{ACCEPT, CONTENT_TYPE},
    },
    std::time::Duration,
};

/// Configuration for the snapshot upload client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    endpoint: String,
    fingerprint: String,
    token: String,
    timeout: Duration,
    accept_invalid_certs: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://connect.prusa3d.com/c/snapshot".to_string(),
            fingerprint: String::new(),
            token: String::new(),
            timeout: Duration::from_secs(10),
            accept_invalid_certs: false,
        }
    }
}

impl ClientConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the device identifier sent in the `fingerprint` header.
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = fingerprint.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Set the limit for one whole request, connect included.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Skip TLS certificate verification (self-signed endpoints).
    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn accept_invalid_certs(&self) -> bool {
        self.accept_invalid_certs
    }
}

/// Uploads JPEG snapshots to the remote endpoint.
#[derive(Clone, Debug)]
pub struct Client {
    config: ClientConfig,
    http: reqwest::Client,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self, ComError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("image/jpg"));
        headers.insert("fingerprint", HeaderValue::from_str(&config.fingerprint)?);
        let mut token = HeaderValue::from_str(&config.token)?;
        token.set_sensitive(true);
        headers.insert("token", token);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;
        if config.accept_invalid_certs {
            log::warn!("upload: TLS certificate verification is disabled");
        }
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `PUT` one JPEG to the endpoint and return the response status.
    pub async fn upload(&self, body: Bytes) -> Result<u16, ComError> {
        let response = self.http.put(&self.config.endpoint).body(body).send().await?;
        Ok(response.status().as_u16())
    }
}

impl SnapshotSink for Client {
    fn put(&self, body: Bytes) -> impl Future<Output = Result<u16, ComError>> + Send {
        self.upload(body)
    }
}
