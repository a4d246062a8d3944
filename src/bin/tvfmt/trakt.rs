//! Trakt API client module.
//!
//! Provides show search and season and episode listings from the Trakt API.
//!
//! Documentation:
//! <https://trakt.docs.apiary.io>

use anyhow::{Context, Result, bail};
use colored::Colorize;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use tvfmt::tv_format::{Episode, Season, Show};

use crate::provider::MetadataProvider;

/// Trakt API base url.
const BASE_URL: &str = "https://api.trakt.tv";

/// Trakt API version sent with every request.
const API_VERSION: &str = "2";

/// Trakt API client.
#[derive(Debug)]
pub struct TraktClient {
    client: Client,
    base_url: String,
    api_key: String,
    verbose: bool,
}

/// Item in the `/search/show` response.
#[derive(Debug, Deserialize)]
struct SearchResult {
    show: Option<ShowItem>,
}

#[derive(Debug, Deserialize)]
struct ShowItem {
    title: Option<String>,
    year: Option<u32>,
    #[serde(default)]
    ids: Ids,
}

#[derive(Debug, Deserialize)]
struct SeasonItem {
    title: Option<String>,
    episode_count: Option<u32>,
    number: Option<i64>,
    #[serde(default)]
    ids: Ids,
}

#[derive(Debug, Deserialize)]
struct EpisodeItem {
    title: Option<String>,
    number: Option<u32>,
    #[serde(default)]
    ids: Ids,
}

#[derive(Debug, Default, Deserialize)]
struct Ids {
    trakt: Option<u64>,
}

impl TraktClient {
    /// Create a new Trakt client.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(api_key: &str, verbose: bool) -> Result<Self> {
        let client = Client::builder().build().context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
            api_key: api_key.to_string(),
            verbose,
        })
    }

    /// Send a GET request and return the response body.
    async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String> {
        let url = self.build_url(endpoint, params)?;
        if self.verbose {
            println!("{} {}", "GET".cyan(), url.as_str().dimmed());
        }

        let response = self
            .client
            .get(url)
            .header("trakt-api-key", &self.api_key)
            .header("trakt-api-version", API_VERSION)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .context("Trakt API unavailable: failed to send request")?;

        let status = response.status();
        match status {
            status if status.is_success() => response.text().await.context("Failed to read Trakt response"),
            StatusCode::NOT_FOUND => bail!("Not found on Trakt: {endpoint}"),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                bail!("Trakt API key was rejected: HTTP {status}")
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                bail!("Trakt API unavailable: HTTP {status} - {body}")
            }
        }
    }

    /// Build full API url from the base url, given endpoint, and query parameters.
    fn build_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/{endpoint}", self.base_url))
            .with_context(|| format!("Invalid Trakt url for endpoint: {endpoint}"))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }
}

impl MetadataProvider for TraktClient {
    async fn search_shows(&self, query: &str, limit: usize) -> Result<Vec<Show>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let body = self.get("search/show", &[("query", query)]).await?;
        parse_search_results(&body, limit)
    }

    async fn list_seasons(&self, show_id: u64) -> Result<Vec<Season>> {
        let body = self
            .get(&format!("shows/{show_id}/seasons"), &[("extended", "full")])
            .await?;
        parse_seasons(&body)
    }

    async fn list_episodes(&self, show_id: u64, season_number: u32) -> Result<Vec<Episode>> {
        let body = self
            .get(&format!("shows/{show_id}/seasons/{season_number}/episodes"), &[])
            .await?;
        parse_episodes(&body)
    }
}

/// Parse the show search response, keeping at most `limit` shows.
fn parse_search_results(body: &str, limit: usize) -> Result<Vec<Show>> {
    let results: Vec<SearchResult> = serde_json::from_str(body).context("Failed to parse show search JSON")?;
    let shows = results
        .into_iter()
        .filter_map(|result| result.show)
        .filter_map(|show| {
            Some(Show {
                id: show.ids.trakt?,
                name: show.title.unwrap_or_default(),
                year: show.year.map(|year| year.to_string()).unwrap_or_default(),
            })
        })
        .take(limit)
        .collect();
    Ok(shows)
}

/// Parse the season list response. Specials with season number zero are dropped.
fn parse_seasons(body: &str) -> Result<Vec<Season>> {
    let items: Vec<SeasonItem> = serde_json::from_str(body).context("Failed to parse season list JSON")?;
    let seasons = items
        .into_iter()
        .filter_map(|item| {
            let number = u32::try_from(item.number?).ok().filter(|number| *number > 0)?;
            Some(Season {
                name: item
                    .title
                    .filter(|title| !title.is_empty())
                    .unwrap_or_else(|| format!("Season {number}")),
                episode_count: item.episode_count.unwrap_or_default(),
                number,
                id: item.ids.trakt?,
            })
        })
        .collect();
    Ok(seasons)
}

/// Parse the episode list response.
fn parse_episodes(body: &str) -> Result<Vec<Episode>> {
    let items: Vec<EpisodeItem> = serde_json::from_str(body).context("Failed to parse episode list JSON")?;
    let episodes = items
        .into_iter()
        .filter_map(|item| {
            Some(Episode {
                name: item.title.unwrap_or_default(),
                number: item.number?,
                id: item.ids.trakt?,
            })
        })
        .collect();
    Ok(episodes)
}
