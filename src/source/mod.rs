//! HTTP data sources for the World Bank APIs.
//!
//! Thin fetch clients: each source issues one GET and hands back the parsed
//! JSON body. Pagination parameters are passed through as-is; retry, rate
//! limiting, and paging loops stay outside this crate.

use std::fs;
use std::path::Path;

use async_trait::async_trait;
use log::{error, info};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to write fetched data: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize fetched data: {0}")]
    Json(#[from] serde_json::Error),
}

/// A remote JSON source. Returns a parsed JSON value or a network error;
/// the fetched shape is whatever the API produced (typically the
/// `[metadata, payload]` envelope).
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Output name; fetched data lands in `<name>.json`.
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<Value, SourceError>;
}

async fn get_json(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<Value, SourceError> {
    info!("Requesting {url}");
    let response = client
        .get(url)
        .header("Accept", "application/json")
        .query(query)
        .send()
        .await?
        .error_for_status()?;
    Ok(response.json().await?)
}

/// World Bank data catalog (source 2) — dataset descriptions.
pub struct DataCatalogSource {
    client: reqwest::Client,
    base_url: String,
    pub page: u32,
    pub per_page: u32,
}

impl DataCatalogSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: "https://api.worldbank.org/v2/sources/2".to_string(),
            page: 1,
            per_page: 100,
        }
    }
}

#[async_trait]
impl DataSource for DataCatalogSource {
    fn name(&self) -> &str {
        "datasets"
    }

    async fn fetch(&self) -> Result<Value, SourceError> {
        get_json(
            &self.client,
            &self.base_url,
            &[
                ("format", "json".to_string()),
                ("page", self.page.to_string()),
                ("per_page", self.per_page.to_string()),
            ],
        )
        .await
    }
}

/// World Bank projects search API.
pub struct ProjectsSource {
    client: reqwest::Client,
    base_url: String,
    pub country_code: Option<String>,
    pub status: Option<String>,
    pub page: u32,
}

impl ProjectsSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: "https://search.worldbank.org/api/v2/projects".to_string(),
            country_code: None,
            status: None,
            page: 1,
        }
    }
}

#[async_trait]
impl DataSource for ProjectsSource {
    fn name(&self) -> &str {
        "projects"
    }

    async fn fetch(&self) -> Result<Value, SourceError> {
        let mut query = vec![
            ("format", "json".to_string()),
            ("page", self.page.to_string()),
            ("rows", "100".to_string()),
        ];
        if let Some(code) = &self.country_code {
            query.push(("country", code.clone()));
        }
        if let Some(status) = &self.status {
            query.push(("status", status.clone()));
        }
        get_json(&self.client, &self.base_url, &query).await
    }
}

/// IBRD statement-of-loans resource on the finances API.
pub struct LoansSource {
    client: reqwest::Client,
    url: String,
    pub country_code: Option<String>,
}

impl LoansSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            url: "https://financesdata.worldbank.org/resource/g5kz-zdi6.json".to_string(),
            country_code: None,
        }
    }
}

#[async_trait]
impl DataSource for LoansSource {
    fn name(&self) -> &str {
        "loans"
    }

    async fn fetch(&self) -> Result<Value, SourceError> {
        let mut query = vec![("$limit", "1000".to_string())];
        if let Some(code) = &self.country_code {
            query.push(("$where", format!("country_code = '{code}'")));
        }
        get_json(&self.client, &self.url, &query).await
    }
}

/// IDA statement-of-credits resource on the finances API.
pub struct DisbursementsSource {
    client: reqwest::Client,
    url: String,
    pub country_code: Option<String>,
}

impl DisbursementsSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            url: "https://financesdata.worldbank.org/resource/dd6r-pdh4.json".to_string(),
            country_code: None,
        }
    }
}

#[async_trait]
impl DataSource for DisbursementsSource {
    fn name(&self) -> &str {
        "disbursements"
    }

    async fn fetch(&self) -> Result<Value, SourceError> {
        let mut query = vec![("$limit", "1000".to_string())];
        if let Some(code) = &self.country_code {
            query.push(("$where", format!("country_code = '{code}'")));
        }
        get_json(&self.client, &self.url, &query).await
    }
}

/// The default source set covering every registered entity type.
pub fn default_sources() -> Vec<Box<dyn DataSource>> {
    let client = reqwest::Client::new();
    vec![
        Box::new(DataCatalogSource::new(client.clone())),
        Box::new(ProjectsSource::new(client.clone())),
        Box::new(LoansSource::new(client.clone())),
        Box::new(DisbursementsSource::new(client)),
    ]
}

/// Fetch every source and write `<name>.json` into `out_dir`. Per-source
/// failures are logged and skipped; returns the names that were written.
pub async fn fetch_all(sources: &[Box<dyn DataSource>], out_dir: &Path) -> Result<Vec<String>, SourceError> {
    fs::create_dir_all(out_dir)?;
    let mut written = Vec::new();
    for source in sources {
        match source.fetch().await {
            Ok(value) => {
                let path = out_dir.join(format!("{}.json", source.name()));
                fs::write(&path, serde_json::to_string_pretty(&value)?)?;
                info!("Saved {} to {}", source.name(), path.display());
                written.push(source.name().to_string());
            }
            Err(err) => error!("Failed to fetch {}: {}", source.name(), err),
        }
    }
    Ok(written)
}
