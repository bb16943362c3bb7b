use anyhow::Context;
use domain::models::VideoCandidate;
use domain::ports::VideoSearch;
use reqwest::Client;
use serde::Deserialize;
use shared::types::Result;
use tracing::{debug, warn};

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    #[serde(default)]
    id: Option<ItemId>,
    #[serde(default)]
    snippet: Option<Snippet>,
}

#[derive(Deserialize)]
struct ItemId {
    #[serde(rename = "videoId", default)]
    video_id: Option<String>,
}

#[derive(Deserialize)]
struct Snippet {
    #[serde(default)]
    title: String,
}

/// YouTube Data API v3 search.
#[derive(Clone)]
pub struct YoutubeSearchClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl YoutubeSearchClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn parse_items(body: &str) -> Vec<VideoCandidate> {
        let response: SearchResponse = match serde_json::from_str(body) {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "video search returned invalid JSON");
                return Vec::new();
            }
        };
        response
            .items
            .into_iter()
            .filter_map(|item| {
                let title = item.snippet.map(|s| s.title).unwrap_or_default();
                match item.id.and_then(|id| id.video_id) {
                    Some(video_id) => Some(VideoCandidate { video_id, title }),
                    None => {
                        debug!(%title, "skipping search item without videoId");
                        None
                    }
                }
            })
            .collect()
    }
}

impl VideoSearch for YoutubeSearchClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<VideoCandidate>> {
        let url = format!("{}/youtube/v3/search", self.base_url);
        let max_results = max_results.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet"),
                ("q", query),
                ("key", self.api_key.as_str()),
                ("maxResults", max_results.as_str()),
            ])
            .send()
            .await
            .context("Failed contacting video search")?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            warn!(status = status.as_u16(), %body, "video search failed");
            return Ok(Vec::new());
        }
        Ok(Self::parse_items(&body))
    }
}
