//! SPARQL 1.1 Protocol client.
//!
//! - SELECT: POST `application/sparql-query`, TSV results streamed line by line
//! - updates: POST `application/sparql-update`
//! - bulk writes: `INSERT DATA { GRAPH <g> { ... } }`

use std::fmt::Write as _;
use std::io::BufReader;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

use super::tsv::TsvResultStream;
use super::{ResultStream, Selection, TripleStore};
use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::model::Triple;

const TSV_RESULTS: &str = "text/tab-separated-values";

/// A remote store reached over HTTP.
pub struct SparqlStore {
    config: StoreConfig,
    agent: ureq::Agent,
    authorization: Option<String>,
}

impl SparqlStore {
    pub fn new(config: StoreConfig) -> Self {
        let agent = config.http.agent();
        let authorization = config.username.as_ref().map(|user| {
            let password = config.password.as_deref().unwrap_or("");
            format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
        });
        Self {
            config,
            agent,
            authorization,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn post(&self, url: &str, content_type: &str) -> ureq::Request {
        let request = self.agent.post(url).set("Content-Type", content_type);
        match &self.authorization {
            Some(auth) => request.set("Authorization", auth),
            None => request,
        }
    }

    fn send_update(&self, sparql: &str) -> std::result::Result<(), String> {
        debug!(update = sparql, "sending SPARQL update");
        self.post(self.config.update_url(), "application/sparql-update")
            .send_string(sparql)
            .map(|_| ())
            .map_err(describe)
    }
}

/// Render a ureq failure, including the response body for status errors.
fn describe(err: ureq::Error) -> String {
    match err {
        ureq::Error::Status(code, response) => {
            let body = response.into_string().unwrap_or_default();
            format!("HTTP {code}: {}", body.trim())
        }
        ureq::Error::Transport(transport) => transport.to_string(),
    }
}

/// Build an `INSERT DATA` update for one graph.
pub fn insert_data(graph: &str, triples: &[Triple]) -> String {
    let mut update = format!("INSERT DATA {{ GRAPH <{graph}> {{\n");
    for triple in triples {
        let _ = writeln!(
            update,
            "{} <{}> {} .",
            triple.subject, triple.predicate, triple.object
        );
    }
    update.push_str("} }");
    update
}

impl TripleStore for SparqlStore {
    fn select(&self, selection: &Selection) -> Result<Box<dyn ResultStream + '_>> {
        let query = selection.select_query();
        debug!(query = %query, "sending SPARQL select");
        let response = self
            .post(&self.config.query_endpoint, "application/sparql-query")
            .set("Accept", TSV_RESULTS)
            .send_string(&query)
            .map_err(|e| Error::MalformedSelection {
                query: query.clone(),
                reason: describe(e),
            })?;
        let reader = BufReader::new(response.into_reader());
        let stream = TsvResultStream::new(reader, selection.value_var)?;
        Ok(Box::new(stream))
    }

    fn insert(&self, graph: &str, triples: &[Triple]) -> Result<()> {
        if triples.is_empty() {
            return Ok(());
        }
        self.send_update(&insert_data(graph, triples))
            .map_err(|reason| Error::WriteFailure {
                graph: graph.to_string(),
                reason,
            })
    }

    fn delete(&self, selection: &Selection) -> Result<()> {
        self.update(&selection.delete_update())
    }

    fn update(&self, sparql: &str) -> Result<()> {
        self.send_update(sparql).map_err(|reason| Error::UpdateFailure {
            query: sparql.to_string(),
            reason,
        })
    }
}
