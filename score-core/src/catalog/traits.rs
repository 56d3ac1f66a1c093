use crate::common::error::Result;
use crate::domain::*;
use async_trait::async_trait;

/// Read-only access to the song/chart reference catalog.
///
/// Lookups return `Ok(None)` when nothing matches; `Err` is reserved for the
/// catalog itself failing.
#[async_trait]
pub trait ReferenceCatalog: Send + Sync {
    async fn lookup_chart(&self, query: &ChartQuery) -> Result<Option<ChartIdentity>>;

    async fn lookup_song(&self, game: Game, song_id: u32) -> Result<Option<SongIdentity>>;

    async fn lookup_song_by_title(&self, game: Game, title: &str) -> Result<Option<SongIdentity>>;
}
