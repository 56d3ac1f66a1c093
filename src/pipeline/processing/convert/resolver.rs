use std::sync::Arc;

use score_core::{
    ChartIdentity, ChartLookup, ChartQuery, DifficultySelector, Game, Playtype, ReferenceCatalog,
    SongIdentity,
};

use super::failure::ConverterFailure;

/// Read-only lookups from source identifiers to canonical charts and songs.
///
/// Absence is `Ok(None)`; the caller decides what a miss means. `Err` only
/// carries catalog failures, already classified as internal.
#[derive(Clone)]
pub struct ReferenceResolver {
    catalog: Arc<dyn ReferenceCatalog>,
}

impl ReferenceResolver {
    pub fn new(catalog: Arc<dyn ReferenceCatalog>) -> Self {
        Self { catalog }
    }

    /// Find a chart. `difficulty` must already be decoded with the same
    /// version-aware normalizer the converter uses.
    pub async fn resolve_chart(
        &self,
        game: Game,
        playtype: Playtype,
        lookup: ChartLookup,
        difficulty: DifficultySelector,
        version: Option<&str>,
    ) -> Result<Option<ChartIdentity>, ConverterFailure> {
        let query = ChartQuery {
            game,
            playtype,
            lookup,
            difficulty,
            version: version.map(str::to_string),
        };
        Ok(self.catalog.lookup_chart(&query).await?)
    }

    pub async fn resolve_song(
        &self,
        game: Game,
        song_id: u32,
    ) -> Result<Option<SongIdentity>, ConverterFailure> {
        Ok(self.catalog.lookup_song(game, song_id).await?)
    }

    pub async fn resolve_song_by_title(
        &self,
        game: Game,
        title: &str,
    ) -> Result<Option<SongIdentity>, ConverterFailure> {
        Ok(self.catalog.lookup_song_by_title(game, title).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use score_core::{CatalogError, InMemoryCatalog};

    struct UnreachableCatalog;

    #[async_trait]
    impl ReferenceCatalog for UnreachableCatalog {
        async fn lookup_chart(
            &self,
            _query: &ChartQuery,
        ) -> score_core::common::error::Result<Option<ChartIdentity>> {
            Err(CatalogError::Unavailable {
                message: "timed out".to_string(),
            })
        }

        async fn lookup_song(
            &self,
            _game: Game,
            _song_id: u32,
        ) -> score_core::common::error::Result<Option<SongIdentity>> {
            Err(CatalogError::Unavailable {
                message: "timed out".to_string(),
            })
        }

        async fn lookup_song_by_title(
            &self,
            _game: Game,
            _title: &str,
        ) -> score_core::common::error::Result<Option<SongIdentity>> {
            Err(CatalogError::Unavailable {
                message: "timed out".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_absence_is_none() {
        let resolver = ReferenceResolver::new(Arc::new(InMemoryCatalog::new()));
        let chart = resolver
            .resolve_chart(
                Game::Sdvx,
                Playtype::Single,
                ChartLookup::InGameId(1),
                DifficultySelector::AnyInfinite,
                Some("exceed"),
            )
            .await
            .unwrap();
        assert!(chart.is_none());
        assert!(resolver.resolve_song(Game::Sdvx, 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_catalog_error_is_internal() {
        let resolver = ReferenceResolver::new(Arc::new(UnreachableCatalog));
        let err = resolver.resolve_song(Game::Iidx, 1).await.unwrap_err();
        assert_eq!(err.kind(), super::super::failure::FailureKind::Internal);
    }
}
