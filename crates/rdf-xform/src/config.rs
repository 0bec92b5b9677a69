//! Store and run configuration.

use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_BUFFER_SIZE: usize = 1000;
pub const DEFAULT_REGISTRY_URL: &str = "http://prefix.cc/context";

/// HTTP client settings shared by the SPARQL client and the registry loader.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            request_timeout_secs: 300,
            user_agent: format!("rdf-xform/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpConfig {
    pub fn agent(&self) -> ureq::Agent {
        ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(self.connect_timeout_secs))
            .timeout(Duration::from_secs(self.request_timeout_secs))
            .user_agent(&self.user_agent)
            .build()
    }
}

/// Connection settings for a SPARQL 1.1 Protocol endpoint.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Query endpoint URL
    pub query_endpoint: String,
    /// Update endpoint URL (defaults to the query endpoint)
    pub update_endpoint: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub http: HttpConfig,
}

impl StoreConfig {
    pub fn new(query_endpoint: impl Into<String>) -> Self {
        Self {
            query_endpoint: query_endpoint.into(),
            update_endpoint: None,
            username: None,
            password: None,
            http: HttpConfig::default(),
        }
    }

    pub fn with_update_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.update_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn update_url(&self) -> &str {
        self.update_endpoint
            .as_deref()
            .unwrap_or(&self.query_endpoint)
    }
}

/// Settings that apply to every transform in a run.
#[derive(Debug, Clone)]
pub struct TransformConfig {
    /// Write every output triple to this graph instead of the source graph.
    pub output_graph: Option<String>,
    /// Number of buffered triples that triggers a flush.
    pub buffer_size: usize,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            output_graph: None,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl TransformConfig {
    pub fn with_output_graph(mut self, graph: impl Into<String>) -> Self {
        self.output_graph = Some(graph.into());
        self
    }

    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(Error::Config("buffer size must be at least 1".into()));
        }
        if let Some(graph) = &self.output_graph {
            if graph.trim().is_empty() {
                return Err(Error::Config("output graph must not be empty".into()));
            }
        }
        Ok(())
    }
}
