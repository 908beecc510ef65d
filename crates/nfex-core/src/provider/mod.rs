//! Fiscal document provider client.
//!
//! Fetches an NFe by access key from an NSDocs-style HTTP API. Endpoints are
//! probed in configured order with per-endpoint retries; the first usable
//! response wins. The payload may be XML, provider JSON, JSON carrying the
//! XML inline, or just a provider document id that needs a second lookup.

mod retry;

pub use retry::RetryPolicy;

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{AttemptFailure, ProviderError};
use crate::models::config::ProviderConfig;
use crate::models::document::FiscalDocument;
use crate::nfe::resolver::{leaf_text, resolve};
use crate::nfe::rules::paths::Candidates;
use crate::nfe::rules::AccessKey;
use crate::nfe::{locate_inf_nfe, FieldMapper, SourceDocument};
use crate::xml::{parse_xml, write_xml};

use retry::AttemptError;

/// Root elements a provider JSON document is re-emitted under.
const DOCUMENT_ROOTS: &[&str] = &["nfeProc", "NFe", "nfe", "infNFe"];

/// Keys under which some API versions inline the XML text.
const INLINE_XML: Candidates = &[
    &["xml"],
    &["xml_content"],
    &["data", "xml"],
    &["content", "xml"],
    &["nfe", "xml"],
    &["nfeProc", "xml"],
    &["NFe", "xml"],
    &["response", "xml"],
    &["xml_data"],
];

/// Keys under which the provider's internal document id is returned.
const DOCUMENT_ID: Candidates = &[
    &["id"],
    &["document_id"],
    &["documentId"],
    &["data", "id"],
    &["data", "document_id"],
    &["nfe", "id"],
    &["response", "id"],
    &["result", "id"],
];

/// A document fetched and mapped.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// Mapped record.
    pub document: FiscalDocument,
    /// XML for archival: as received, or re-emitted from provider JSON.
    pub xml: String,
    /// Endpoint path that produced the document.
    pub endpoint: String,
    /// Validation warnings on the mapped record.
    pub warnings: Vec<String>,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'static str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    token: Option<String>,
}

/// What a successful document response turned out to contain.
#[derive(Debug, PartialEq)]
enum Payload {
    Xml(String),
    Json(Value),
    DocumentId(String),
}

struct Found {
    endpoint: String,
    body: String,
}

/// HTTP client for the provider API.
pub struct ProviderClient {
    config: ProviderConfig,
    http: Client,
    retry: RetryPolicy,
    mapper: FieldMapper,
    token: Mutex<Option<String>>,
}

impl ProviderClient {
    /// Build a client from configuration.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            retry: RetryPolicy::from_config(&config),
            config,
            http,
            mapper: FieldMapper::new(),
            token: Mutex::new(None),
        })
    }

    /// Use a configured mapper for fetched documents.
    pub fn with_mapper(mut self, mapper: FieldMapper) -> Self {
        self.mapper = mapper;
        self
    }

    /// Fetch the NFe with the given access key and map it.
    ///
    /// The key is validated before any request is made.
    pub async fn fetch(&self, access_key: &str) -> Result<FetchedDocument, ProviderError> {
        let key = AccessKey::parse(access_key)
            .map_err(|_| ProviderError::InvalidKey(access_key.trim().to_string()))?;
        let secret = self
            .config
            .client_secret
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ProviderError::MissingCredentials)?;

        info!("Fetching NFe {} from {}", key, self.config.base_url);

        let token = self.bearer_token(secret).await;
        let endpoints = expand(&self.config.document_endpoints, "{key}", key.as_str());
        let found = self.probe(&endpoints, &token, recognized_document).await?;

        let (xml, tree) = match classify(&found.body)? {
            Payload::Xml(xml) => {
                let tree = parse_xml(&xml)?;
                (xml, tree)
            }
            Payload::Json(value) => {
                let tree = SourceDocument::from_json(value).into_tree()?;
                let xml = archival_xml(&tree)?;
                (xml, tree)
            }
            Payload::DocumentId(id) => {
                debug!("Provider returned document id {}, fetching XML", id);
                let xml = self.fetch_xml(&id, &token).await?;
                let tree = parse_xml(&xml)?;
                (xml, tree)
            }
        };

        let document = self.mapper.map(&tree, Some(key.as_str()))?;
        let warnings = document.validate_with(self.mapper.validates_check_digits());
        for warning in &warnings {
            warn!("NFe {}: {}", document.numero_nota, warning);
        }

        info!("Fetched NFe {} via {}", document.chave_nota_fiscal, found.endpoint);

        Ok(FetchedDocument {
            document,
            xml,
            endpoint: found.endpoint,
            warnings,
        })
    }

    /// Second stage: download the XML for a provider document id.
    async fn fetch_xml(&self, id: &str, token: &str) -> Result<String, ProviderError> {
        let endpoints = expand(&self.config.xml_endpoints, "{id}", id);
        match self.probe(&endpoints, token, nfe_xml).await {
            Ok(found) => Ok(found.body),
            Err(ProviderError::NotFound { failures }) => Err(ProviderError::XmlUnavailable {
                id: id.to_string(),
                failures,
            }),
            Err(e) => Err(e),
        }
    }

    /// Token from the client-credentials grant, cached for the client's
    /// lifetime. Falls back to using the secret itself as bearer API key.
    async fn bearer_token(&self, secret: &str) -> String {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            return token.clone();
        }

        let request = TokenRequest {
            client_id: &self.config.client_id,
            client_secret: secret,
            grant_type: "client_credentials",
        };

        for endpoint in &self.config.auth_endpoints {
            let url = self.url(endpoint);
            let response = match self.http.post(&url).json(&request).send().await {
                Ok(response) => response,
                Err(e) => {
                    debug!("Auth endpoint {} failed: {}", endpoint, e);
                    continue;
                }
            };

            if !response.status().is_success() {
                debug!("Auth endpoint {} returned {}", endpoint, response.status());
                continue;
            }

            match response.json::<TokenResponse>().await {
                Ok(TokenResponse {
                    access_token: Some(token),
                    ..
                })
                | Ok(TokenResponse {
                    token: Some(token), ..
                }) => {
                    info!("Authenticated with provider via {}", endpoint);
                    *cached = Some(token.clone());
                    return token;
                }
                Ok(_) => debug!("Auth endpoint {} returned no token", endpoint),
                Err(e) => debug!("Auth endpoint {} returned unreadable body: {}", endpoint, e),
            }
        }

        warn!("Token exchange failed on every endpoint, using the secret as API key");
        secret.to_string()
    }

    /// Try each endpoint in order, retrying transient failures with backoff.
    ///
    /// A successful body that `accept` rejects is recorded as a failure and
    /// the next endpoint is tried.
    async fn probe(
        &self,
        endpoints: &[String],
        token: &str,
        accept: fn(&str) -> Result<(), &'static str>,
    ) -> Result<Found, ProviderError> {
        let mut failures = Vec::new();

        for endpoint in endpoints {
            let url = self.url(endpoint);

            for attempt in 1..=self.retry.max_attempts {
                let mut fail = |reason: String| {
                    failures.push(AttemptFailure {
                        endpoint: endpoint.clone(),
                        attempt,
                        reason,
                    })
                };

                match self.get(&url, token).await {
                    Ok(body) => match accept(&body) {
                        Ok(()) => {
                            debug!("{} answered on attempt {}", endpoint, attempt);
                            return Ok(Found {
                                endpoint: endpoint.clone(),
                                body,
                            });
                        }
                        Err(reason) => {
                            debug!("{} rejected: {}", endpoint, reason);
                            fail(reason.to_string());
                            break;
                        }
                    },
                    Err(AttemptError::NotFound) => {
                        debug!("{} returned 404", endpoint);
                        fail("HTTP 404 Not Found".to_string());
                        break;
                    }
                    Err(AttemptError::Unauthorized) => {
                        // A rejected token must not be reused by later fetches
                        self.token.lock().await.take();
                        return Err(ProviderError::Unauthorized {
                            endpoint: endpoint.clone(),
                        });
                    }
                    Err(AttemptError::Transient(reason)) => {
                        warn!(
                            "{} failed (attempt {}/{}): {}",
                            endpoint, attempt, self.retry.max_attempts, reason
                        );
                        fail(reason);
                        if attempt < self.retry.max_attempts {
                            tokio::time::sleep(self.retry.delay(attempt)).await;
                        }
                    }
                }
            }
        }

        Err(ProviderError::NotFound { failures })
    }

    async fn get(&self, url: &str, token: &str) -> Result<String, AttemptError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json, application/xml")
            .send()
            .await
            .map_err(|e| AttemptError::Transient(e.to_string()))?;

        match response.status() {
            status if status.is_success() => response
                .text()
                .await
                .map_err(|e| AttemptError::Transient(e.to_string())),
            StatusCode::NOT_FOUND => Err(AttemptError::NotFound),
            StatusCode::UNAUTHORIZED => Err(AttemptError::Unauthorized),
            status => Err(AttemptError::Transient(format!("HTTP {}", status))),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }
}

fn expand(templates: &[String], placeholder: &str, value: &str) -> Vec<String> {
    templates.iter().map(|t| t.replace(placeholder, value)).collect()
}

fn looks_like_nfe_xml(body: &str) -> bool {
    body.contains("<NFe") || body.contains("<nfeProc")
}

fn nfe_xml(body: &str) -> Result<(), &'static str> {
    if looks_like_nfe_xml(body) {
        Ok(())
    } else {
        Err("response does not contain NFe XML")
    }
}

fn recognized_document(body: &str) -> Result<(), &'static str> {
    classify(body)
        .map(|_| ())
        .map_err(|_| "unrecognized response body")
}

/// Decide what kind of document a successful response carries.
///
/// JSON only counts as the document itself when an `infNFe` node resolves;
/// envelopes such as `{"nfe": {"xml": ...}}` go on to the inline XML and
/// document id lookups.
fn classify(body: &str) -> Result<Payload, ProviderError> {
    let trimmed = body.trim_start_matches('\u{feff}').trim();
    if trimmed.starts_with('<') {
        return if looks_like_nfe_xml(trimmed) {
            Ok(Payload::Xml(trimmed.to_string()))
        } else {
            Err(ProviderError::UnrecognizedResponse)
        };
    }

    let value: Value =
        serde_json::from_str(trimmed).map_err(|_| ProviderError::UnrecognizedResponse)?;

    if locate_inf_nfe(&value).is_some() {
        return Ok(Payload::Json(value));
    }

    if let Some(xml) = resolve(&value, INLINE_XML)
        .and_then(leaf_text)
        .filter(|text| looks_like_nfe_xml(text))
    {
        return Ok(Payload::Xml(xml));
    }

    if let Some(id) = resolve(&value, DOCUMENT_ID).and_then(leaf_text) {
        return Ok(Payload::DocumentId(id));
    }

    Err(ProviderError::UnrecognizedResponse)
}

/// Re-emit a provider JSON tree as XML under its document root. A flattened
/// tree is written as `infNFe` itself.
fn archival_xml(tree: &Value) -> Result<String, ProviderError> {
    let (name, value) = DOCUMENT_ROOTS
        .iter()
        .find_map(|root| tree.get(root).map(|value| (*root, value)))
        .unwrap_or(("infNFe", tree));
    Ok(write_xml(name, value)?)
}
