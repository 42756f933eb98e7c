//! Content API client.
//!
//! Talks to the Prismic REST API v2. Every query is made against a *ref*, an
//! opaque id of one published state of the repository: the master ref for
//! live content, or a preview/release ref when one is configured.
//!
//! ```text
//! GET {endpoint}                      → refs (pick isMasterRef)
//! GET {endpoint}/documents/search     ?ref=…&q=[[at(document.type, "posts")]]
//!                                     &pageSize=…&page=…&orderings=…
//! ```
//!
//! The stage logic never sees HTTP: it goes through [`ContentSource`], which
//! [`PrismicClient`] implements and tests replace with an in-memory source.

use crate::config::ApiConfig;
use crate::types::PostDocument;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Newest first.
pub const NEWEST_FIRST: &str = "[document.first_publication_date desc]";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("No API endpoint configured (set api.endpoint or PRISMIC_API_ENDPOINT)")]
    MissingEndpoint,
    #[error("API did not advertise a master ref")]
    NoMasterRef,
}

/// Response of the API root.
#[derive(Debug, Deserialize)]
pub struct ApiInfo {
    pub refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
pub struct ApiRef {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(rename = "isMasterRef", default)]
    pub is_master_ref: bool,
}

/// One page of search results. Only the fields paging relies on are read.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub total_pages: u32,
    pub results: Vec<PostDocument>,
}

/// A query predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `at(path, "value")`: exact match on a field.
    At { path: String, value: String },
}

impl Predicate {
    pub fn at(path: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::At {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Render in the API query language.
    pub fn to_query(&self) -> String {
        match self {
            Predicate::At { path, value } => {
                let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
                format!("[at({path}, \"{escaped}\")]")
            }
        }
    }
}

/// A search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub predicates: Vec<Predicate>,
    pub page: u32,
    pub page_size: u32,
    pub orderings: Option<String>,
}

impl Query {
    pub fn new(predicates: Vec<Predicate>) -> Self {
        Self {
            predicates,
            page: 1,
            page_size: 20,
            orderings: None,
        }
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn orderings(mut self, orderings: impl Into<String>) -> Self {
        self.orderings = Some(orderings.into());
        self
    }

    /// The `q` parameter: all predicates inside one outer bracket pair.
    pub fn q(&self) -> String {
        let inner: String = self.predicates.iter().map(Predicate::to_query).collect();
        format!("[{inner}]")
    }

    /// Query-string parameters, without `ref` and `access_token`.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", self.q()),
            ("pageSize", self.page_size.to_string()),
            ("page", self.page.to_string()),
        ];
        if let Some(orderings) = &self.orderings {
            params.push(("orderings", orderings.clone()));
        }
        params
    }
}

/// Where documents come from.
pub trait ContentSource {
    /// The ref every query of this run is made against.
    fn resolve_ref(&self) -> Result<String, ClientError>;

    /// Run one search page.
    fn search(&self, reference: &str, query: &Query) -> Result<SearchResponse, ClientError>;
}

/// Blocking HTTP client for the Prismic REST API.
pub struct PrismicClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    access_token: Option<String>,
    preview_ref: Option<String>,
}

impl PrismicClient {
    pub fn new(api: &ApiConfig) -> Result<Self, ClientError> {
        let endpoint = api.endpoint.trim().trim_end_matches('/').to_string();
        if endpoint.is_empty() {
            return Err(ClientError::MissingEndpoint);
        }
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .user_agent(concat!("spacetraveling/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint,
            access_token: api.access_token.clone(),
            preview_ref: api.preview_ref.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the API root (refs, types, languages).
    pub fn api_info(&self) -> Result<ApiInfo, ClientError> {
        self.get_json(&self.endpoint, &[])
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let mut request = self.http.get(url).query(params);
        if let Some(token) = &self.access_token {
            request = request.query(&[("access_token", token)]);
        }
        debug!(url, ?params, "GET");
        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.json()?)
    }
}

impl ContentSource for PrismicClient {
    fn resolve_ref(&self) -> Result<String, ClientError> {
        if let Some(reference) = &self.preview_ref {
            debug!(%reference, "using configured preview ref");
            return Ok(reference.clone());
        }
        self.api_info()?
            .refs
            .into_iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference)
            .ok_or(ClientError::NoMasterRef)
    }

    fn search(&self, reference: &str, query: &Query) -> Result<SearchResponse, ClientError> {
        let url = format!("{}/documents/search", self.endpoint);
        let mut params = vec![("ref", reference.to_string())];
        params.extend(query.params());
        self.get_json(&url, &params)
    }
}

/// Fetch every document of `doc_type`, newest first, walking all result pages.
pub fn fetch_all<S: ContentSource + ?Sized>(
    source: &S,
    reference: &str,
    doc_type: &str,
    page_size: u32,
) -> Result<Vec<PostDocument>, ClientError> {
    let mut documents = Vec::new();
    let mut page = 1;
    loop {
        let query = Query::new(vec![Predicate::at("document.type", doc_type)])
            .page(page)
            .page_size(page_size)
            .orderings(NEWEST_FIRST);
        let response = source.search(reference, &query)?;
        debug!(
            page,
            total_pages = response.total_pages,
            results = response.results.len(),
            "search page"
        );
        let empty = response.results.is_empty();
        documents.extend(response.results);
        if empty || page >= response.total_pages {
            break;
        }
        page += 1;
    }
    Ok(documents)
}

/// Fetch a single document by its uid.
pub fn get_by_uid<S: ContentSource + ?Sized>(
    source: &S,
    reference: &str,
    doc_type: &str,
    uid: &str,
) -> Result<Option<PostDocument>, ClientError> {
    let query = Query::new(vec![
        Predicate::at("document.type", doc_type),
        Predicate::at(format!("my.{doc_type}.uid"), uid),
    ])
    .page_size(1);
    let response = source.search(reference, &query)?;
    Ok(response.results.into_iter().next())
}
