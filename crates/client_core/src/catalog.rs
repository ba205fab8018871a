//! Music-release catalog client: search, release detail and marketplace price.

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Client, RequestBuilder, Response};
use serde::Deserialize;
use shared::{
    domain::{
        CatalogId, Format, PriceSuggestion, Record, RecordDetail, RecordId, ReleaseYear, Track,
    },
    error::ApiError,
};
use tracing::{debug, warn};

use crate::config::Settings;

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_COUNTRY: &str = "Unknown";
const SEARCH_PAGE_SIZE: &str = "20";

#[async_trait]
pub trait RemoteCatalog: Send + Sync {
    /// Blank queries resolve to an empty list without touching the network.
    async fn search(&self, query: &str) -> Result<Vec<Record>, ApiError>;
    async fn details(&self, id: RecordId) -> Result<RecordDetail, ApiError>;
}

/// Stand-in used when no catalog token is configured.
pub struct MissingCatalog;

#[async_trait]
impl RemoteCatalog for MissingCatalog {
    async fn search(&self, query: &str) -> Result<Vec<Record>, ApiError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        Err(ApiError::unavailable(
            "catalog token is not configured (set DISCOGS_API_TOKEN)",
        ))
    }

    async fn details(&self, id: RecordId) -> Result<RecordDetail, ApiError> {
        Err(ApiError::unavailable(format!(
            "catalog token is not configured; cannot look up record {id}"
        )))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: i64,
    title: String,
    #[serde(default)]
    year: Option<ReleaseYear>,
    #[serde(default)]
    cover_image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReleaseResponse {
    id: i64,
    title: String,
    #[serde(default)]
    artists: Vec<ReleaseArtist>,
    #[serde(default)]
    year: Option<i64>,
    #[serde(default)]
    images: Vec<ReleaseImage>,
    #[serde(default)]
    tracklist: Vec<Track>,
    #[serde(default)]
    formats: Vec<Format>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReleaseArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ReleaseImage {
    #[serde(default)]
    uri: String,
}

#[derive(Debug, Deserialize)]
struct MarketplaceStats {
    #[serde(default)]
    lowest_price: Option<PriceSuggestion>,
}

pub struct CatalogClient {
    http: Client,
    base_url: String,
    token: String,
    currency: String,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_http(
            Client::new(),
            base_url,
            token,
            crate::config::DEFAULT_PRICE_CURRENCY,
        )
    }

    pub fn with_http(
        http: Client,
        base_url: impl Into<String>,
        token: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            currency: currency.into(),
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Builds the catalog from settings, or `None` when no token is configured.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Option<Self>> {
        let Some(token) = settings.catalog_token() else {
            return Ok(None);
        };
        let base_url = settings.catalog_endpoint()?;
        let http = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.request_timeout())
            .build()?;
        Ok(Some(Self::with_http(
            http,
            base_url.as_str(),
            token,
            settings.price_currency.as_str(),
        )))
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http
            .get(format!("{}{path}", self.base_url))
            .header(AUTHORIZATION, format!("Discogs token={}", self.token))
    }

    async fn fetch_release(&self, id: RecordId) -> Result<ReleaseResponse, ApiError> {
        let res = self
            .get(&format!("/releases/{id}"))
            .send()
            .await
            .map_err(|e| ApiError::network(format!("release lookup failed: {e}")))?;

        if !res.status().is_success() {
            debug!(record_id = id.0, status = %res.status(), "release lookup unsuccessful");
            return Err(ApiError::not_found(format!("Record not found: {id}")));
        }

        res.json()
            .await
            .map_err(|e| ApiError::malformed(format!("unreadable release data: {e}")))
    }

    /// Best effort: every failure collapses to `None`.
    async fn fetch_price(&self, id: RecordId) -> Option<PriceSuggestion> {
        let res = match self
            .get(&format!("/marketplace/stats/{id}"))
            .query(&[("curr_abbr", self.currency.as_str())])
            .send()
            .await
        {
            Ok(res) => res,
            Err(err) => {
                warn!(record_id = id.0, "price lookup failed: {err}");
                return None;
            }
        };
        parse_price(id, res).await
    }
}

async fn parse_price(id: RecordId, res: Response) -> Option<PriceSuggestion> {
    if !res.status().is_success() {
        debug!(record_id = id.0, status = %res.status(), "no marketplace stats");
        return None;
    }
    match res.json::<MarketplaceStats>().await {
        Ok(stats) => stats.lowest_price,
        Err(err) => {
            warn!(record_id = id.0, "could not parse pricing data: {err}");
            None
        }
    }
}

#[async_trait]
impl RemoteCatalog for CatalogClient {
    async fn search(&self, query: &str) -> Result<Vec<Record>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        debug!(query, "searching catalog");
        let res = self
            .get("/database/search")
            .query(&[
                ("q", query),
                ("type", "release"),
                ("per_page", SEARCH_PAGE_SIZE),
            ])
            .send()
            .await
            .map_err(|e| ApiError::network(format!("failed to fetch from catalog: {e}")))?;

        let status = res.status();
        if !status.is_success() {
            return Err(ApiError::network(format!(
                "failed to fetch from catalog: HTTP {status}"
            )));
        }

        let body: SearchResponse = res
            .json()
            .await
            .map_err(|e| ApiError::malformed(format!("unreadable search results: {e}")))?;
        Ok(body.results.into_iter().map(search_result_to_record).collect())
    }

    async fn details(&self, id: RecordId) -> Result<RecordDetail, ApiError> {
        let (release, price_suggestion) =
            futures::join!(self.fetch_release(id), self.fetch_price(id));
        let release = release?;
        Ok(release_to_detail(release, price_suggestion))
    }
}

/// Splits a combined `"Artist - Title"` string on the first separator.
pub fn split_artist_title(combined: &str) -> (String, String) {
    match combined.split_once(" - ") {
        Some((artist, title)) => {
            let artist = artist.trim();
            let title = title.trim();
            let artist = if artist.is_empty() { UNKNOWN_ARTIST } else { artist };
            let title = if title.is_empty() { combined } else { title };
            (artist.to_string(), title.to_string())
        }
        None => (UNKNOWN_ARTIST.to_string(), combined.to_string()),
    }
}

fn search_result_to_record(item: SearchResult) -> Record {
    let (artist, title) = split_artist_title(&item.title);
    let year = match item.year {
        Some(ReleaseYear::Text(text)) if text.trim().is_empty() => ReleaseYear::unknown(),
        Some(year) => year,
        None => ReleaseYear::unknown(),
    };
    Record {
        id: RecordId(item.id),
        title,
        artist,
        year,
        cover_image: item.cover_image.unwrap_or_default(),
        priority: None,
        discogs_id: None,
    }
}

fn release_to_detail(
    release: ReleaseResponse,
    price_suggestion: Option<PriceSuggestion>,
) -> RecordDetail {
    let artist = release
        .artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let year = match release.year {
        Some(year) if year > 0 => ReleaseYear::Year(year),
        _ => ReleaseYear::unknown(),
    };
    let cover_image = release
        .images
        .into_iter()
        .next()
        .map(|image| image.uri)
        .unwrap_or_default();
    let country = release
        .country
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_COUNTRY.to_string());

    RecordDetail {
        record: Record {
            id: RecordId(release.id),
            title: release.title,
            artist,
            year,
            cover_image,
            priority: None,
            discogs_id: Some(CatalogId(release.id)),
        },
        tracklist: release.tracklist,
        formats: release.formats,
        country,
        notes: release.notes.filter(|n| !n.trim().is_empty()),
        price_suggestion,
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
