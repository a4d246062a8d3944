use anyhow::Result;

use tvfmt::tv_format::{Episode, Season, Show};

/// A source of show, season, and episode metadata.
///
/// Calls are awaited one at a time by the caller.
pub trait MetadataProvider {
    /// Search shows matching the query, in provider relevance order.
    /// Returns at most `limit` results.
    async fn search_shows(&self, query: &str, limit: usize) -> Result<Vec<Show>>;

    /// List the regular seasons of a show. Specials are not included.
    async fn list_seasons(&self, show_id: u64) -> Result<Vec<Season>>;

    /// List the episodes of one season.
    async fn list_episodes(&self, show_id: u64, season_number: u32) -> Result<Vec<Episode>>;
}
