use super::traits::ReferenceCatalog;
use crate::common::error::{CatalogError, Result};
use crate::domain::*;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Serialized form of a catalog: every song and chart it knows about.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub songs: Vec<SongIdentity>,
    #[serde(default)]
    pub charts: Vec<ChartIdentity>,
}

/// In-memory catalog for development and testing
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    songs: Arc<RwLock<HashMap<(Game, u32), SongIdentity>>>,
    charts: Arc<RwLock<Vec<ChartIdentity>>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Self {
        let songs = snapshot
            .songs
            .into_iter()
            .map(|s| ((s.game, s.id), s))
            .collect();

        Self {
            songs: Arc::new(RwLock::new(songs)),
            charts: Arc::new(RwLock::new(snapshot.charts)),
        }
    }

    /// Load a JSON snapshot (`{"songs": [...], "charts": [...]}`) from disk
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let snapshot: CatalogSnapshot = serde_json::from_str(&content)?;
        debug!(
            "Loaded catalog from {}: {} songs, {} charts",
            path.as_ref().display(),
            snapshot.songs.len(),
            snapshot.charts.len()
        );
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn insert_song(&self, song: SongIdentity) -> Result<()> {
        let mut songs = self.songs.write().map_err(poisoned)?;
        songs.insert((song.game, song.id), song);
        Ok(())
    }

    pub fn insert_chart(&self, chart: ChartIdentity) -> Result<()> {
        let mut charts = self.charts.write().map_err(poisoned)?;
        charts.push(chart);
        Ok(())
    }

    /// Drop a song while leaving its charts behind
    pub fn remove_song(&self, game: Game, song_id: u32) -> Result<Option<SongIdentity>> {
        let mut songs = self.songs.write().map_err(poisoned)?;
        Ok(songs.remove(&(game, song_id)))
    }

    pub fn song_count(&self) -> usize {
        self.songs.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn chart_count(&self) -> usize {
        self.charts.read().map(|c| c.len()).unwrap_or(0)
    }
}

fn poisoned<T>(err: std::sync::PoisonError<T>) -> CatalogError {
    CatalogError::Poisoned(err.to_string())
}

#[async_trait]
impl ReferenceCatalog for InMemoryCatalog {
    async fn lookup_chart(&self, query: &ChartQuery) -> Result<Option<ChartIdentity>> {
        let charts = self.charts.read().map_err(poisoned)?;
        Ok(charts.iter().find(|c| query.matches(c)).cloned())
    }

    async fn lookup_song(&self, game: Game, song_id: u32) -> Result<Option<SongIdentity>> {
        let songs = self.songs.read().map_err(poisoned)?;
        Ok(songs.get(&(game, song_id)).cloned())
    }

    async fn lookup_song_by_title(&self, game: Game, title: &str) -> Result<Option<SongIdentity>> {
        let songs = self.songs.read().map_err(poisoned)?;
        let mut matching: Vec<&SongIdentity> = songs
            .values()
            .filter(|s| s.game == game && s.matches_title(title))
            .collect();
        // HashMap order is arbitrary; lowest id wins for duplicate titles
        matching.sort_by_key(|s| s.id);
        Ok(matching.first().map(|s| (*s).clone()))
    }
}
