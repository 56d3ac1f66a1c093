use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use score_core::{ConversionResult, Game, ImportType, Playtype};

use crate::observability::metrics;

use super::converters::{BatchManualConverter, CgSdvxConverter, EamusementIidxConverter};
use super::{
    ConverterFailure, ImportContext, ImportLogger, MetricsConverter, RecordConverter,
    ReferenceResolver, ScoreConverter,
};

/// Converters are registered per import type, game and playtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConverterKey {
    pub import_type: ImportType,
    pub game: Game,
    pub playtype: Playtype,
}

impl ConverterKey {
    pub fn new(import_type: ImportType, game: Game, playtype: Playtype) -> Self {
        Self {
            import_type,
            game,
            playtype,
        }
    }
}

impl fmt::Display for ConverterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} {})", self.import_type, self.game, self.playtype)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("More than one converter registered for {0}")]
    DuplicateKey(ConverterKey),

    #[error("Converter registered for {game} {playtype}, which {game} does not have")]
    UnsupportedPlaytype { game: Game, playtype: Playtype },

    #[error("No converter registered for import type {0}")]
    UnsupportedImportType(ImportType),
}

/// Collects converters, then checks the set is coherent before handing out a
/// [`ConverterRegistry`].
#[derive(Default)]
pub struct ConverterRegistryBuilder {
    entries: Vec<(ConverterKey, Arc<dyn RecordConverter>)>,
}

impl ConverterRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one converter under every key it handles. The keys share a
    /// single instance.
    pub fn register<C>(mut self, converter: C, keys: impl IntoIterator<Item = ConverterKey>) -> Self
    where
        C: ScoreConverter + 'static,
    {
        let converter: Arc<dyn RecordConverter> = Arc::new(MetricsConverter::new(converter));
        for key in keys {
            self.entries.push((key, Arc::clone(&converter)));
        }
        self
    }

    pub fn build(self) -> Result<ConverterRegistry, RegistryError> {
        let mut converters = HashMap::with_capacity(self.entries.len());

        for (key, converter) in self.entries {
            if !key.game.supports(key.playtype) {
                return Err(RegistryError::UnsupportedPlaytype {
                    game: key.game,
                    playtype: key.playtype,
                });
            }
            if converters.insert(key, converter).is_some() {
                return Err(RegistryError::DuplicateKey(key));
            }
        }

        Ok(ConverterRegistry { converters })
    }
}

/// Registry mapping import types to their converters
pub struct ConverterRegistry {
    converters: HashMap<ConverterKey, Arc<dyn RecordConverter>>,
}

impl ConverterRegistry {
    pub fn builder() -> ConverterRegistryBuilder {
        ConverterRegistryBuilder::new()
    }

    /// The full set of built-in converters, all sharing one resolver
    pub fn standard(resolver: ReferenceResolver) -> Result<Self, RegistryError> {
        let cg_keys = [
            ImportType::ApiCgDevSdvx,
            ImportType::ApiCgNagSdvx,
            ImportType::ApiCgGanSdvx,
        ]
        .into_iter()
        .map(|t| ConverterKey::new(t, Game::Sdvx, Playtype::Single));

        let csv_keys = [ImportType::FileEamusementIidxCsv, ImportType::FilePliIidxCsv]
            .into_iter()
            .flat_map(|t| {
                [Playtype::Sp, Playtype::Dp]
                    .into_iter()
                    .map(move |p| ConverterKey::new(t, Game::Iidx, p))
            });

        let batch_keys = Game::ALL.into_iter().flat_map(|g| {
            g.playtypes()
                .iter()
                .map(move |p| ConverterKey::new(ImportType::FileBatchManual, g, *p))
        });

        Self::builder()
            .register(CgSdvxConverter::new(resolver.clone()), cg_keys)
            .register(EamusementIidxConverter::new(resolver.clone()), csv_keys)
            .register(BatchManualConverter::new(resolver), batch_keys)
            .build()
    }

    pub fn get_converter(&self, key: &ConverterKey) -> Option<&dyn RecordConverter> {
        self.converters.get(key).map(|c| c.as_ref())
    }

    /// Convert one raw record with the converter registered for `key`.
    ///
    /// Successes are counted here rather than in the converter, since a
    /// result for the wrong game or playtype is still a failure.
    pub async fn convert(
        &self,
        key: ConverterKey,
        data: &Value,
        context: &ImportContext,
    ) -> Result<ConversionResult, ConverterFailure> {
        let logger = ImportLogger::new(key.import_type, &context.service, context.user_id);

        let Some(converter) = self.get_converter(&key) else {
            let failure = ConverterFailure::internal(format!("No converter registered for {}", key));
            return Err(Self::reject(failure, key, data, context, &logger));
        };

        let result = converter
            .convert_raw(data, context, key.import_type, &logger)
            .await?;

        let score = result.dry_score();
        if score.game != key.game || score.playtype != key.playtype {
            let failure = ConverterFailure::internal(format!(
                "{} returned a {} {} score for {}",
                converter.name(),
                score.game,
                score.playtype,
                key
            ));
            return Err(Self::reject(failure, key, data, context, &logger));
        }

        metrics::convert::conversion_succeeded(key.import_type.as_str());
        Ok(result)
    }

    /// Failures raised by the registry itself get the same treatment as a
    /// converter's: diagnostics attached, counted, logged.
    fn reject(
        failure: ConverterFailure,
        key: ConverterKey,
        data: &Value,
        context: &ImportContext,
        logger: &ImportLogger,
    ) -> ConverterFailure {
        let context_json = serde_json::to_value(context).unwrap_or(Value::Null);
        let failure = failure.with_diagnostics(key.import_type, data, &context_json);
        metrics::convert::conversion_failed(key.import_type.as_str(), failure.kind().as_str());
        failure.log(logger);
        failure
    }

    /// All registered keys, sorted
    pub fn list_keys(&self) -> Vec<ConverterKey> {
        let mut keys: Vec<ConverterKey> = self.converters.keys().copied().collect();
        keys.sort();
        keys
    }

    /// Fail if any of `import_types` has no converter at all
    pub fn ensure_supported(&self, import_types: &[ImportType]) -> Result<(), RegistryError> {
        match import_types
            .iter()
            .find(|t| !self.converters.keys().any(|k| k.import_type == **t))
        {
            Some(missing) => Err(RegistryError::UnsupportedImportType(*missing)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::convert::converters::base::fixtures;
    use crate::pipeline::processing::convert::logger::capture::CapturedLogs;
    use crate::pipeline::processing::convert::{EmptyContext, FailureKind};
    use async_trait::async_trait;
    use serde_json::json;

    fn registry() -> ConverterRegistry {
        ConverterRegistry::standard(fixtures::resolver()).unwrap()
    }

    #[test]
    fn test_standard_registry_covers_every_import_type() {
        let registry = registry();
        assert!(registry.ensure_supported(&ImportType::ALL).is_ok());

        let keys = registry.list_keys();
        // 3 CG + 2 CSV x 2 playtypes + batch-manual on 3 game/playtypes
        assert_eq!(keys.len(), 10);
        assert!(keys.contains(&ConverterKey::new(
            ImportType::ApiCgGanSdvx,
            Game::Sdvx,
            Playtype::Single
        )));
        assert!(!keys.contains(&ConverterKey::new(
            ImportType::ApiCgGanSdvx,
            Game::Iidx,
            Playtype::Sp
        )));
    }

    struct NeverCalled;

    #[async_trait]
    impl ScoreConverter for NeverCalled {
        type Record = Value;
        type Context = EmptyContext;

        fn name(&self) -> &str {
            "never"
        }

        async fn convert(
            &self,
            _data: &Value,
            _context: &ImportContext<EmptyContext>,
            _import_type: ImportType,
            _logger: &ImportLogger,
        ) -> Result<ConversionResult, ConverterFailure> {
            Err(ConverterFailure::internal("unreachable"))
        }
    }

    #[test]
    fn test_duplicate_and_unsupported_keys_are_rejected() {
        let key = ConverterKey::new(ImportType::FileBatchManual, Game::Iidx, Playtype::Sp);
        let err = ConverterRegistry::builder()
            .register(NeverCalled, [key])
            .register(NeverCalled, [key])
            .build()
            .err();
        assert_eq!(err, Some(RegistryError::DuplicateKey(key)));

        let bad = ConverterKey::new(ImportType::FileBatchManual, Game::Sdvx, Playtype::Sp);
        let err = ConverterRegistry::builder().register(NeverCalled, [bad]).build().err();
        assert_eq!(
            err,
            Some(RegistryError::UnsupportedPlaytype {
                game: Game::Sdvx,
                playtype: Playtype::Sp
            })
        );
    }

    #[test]
    fn test_ensure_supported_names_the_missing_type() {
        let key = ConverterKey::new(ImportType::FileBatchManual, Game::Iidx, Playtype::Sp);
        let registry = ConverterRegistry::builder()
            .register(NeverCalled, [key])
            .build()
            .unwrap();

        assert_eq!(
            registry.ensure_supported(&[ImportType::FileBatchManual, ImportType::ApiCgDevSdvx]),
            Err(RegistryError::UnsupportedImportType(ImportType::ApiCgDevSdvx))
        );
    }

    #[tokio::test]
    async fn test_unregistered_key_is_internal_with_diagnostics() {
        let key = ConverterKey::new(ImportType::ApiCgDevSdvx, Game::Iidx, Playtype::Sp);
        let data = json!({"internalId": 1});
        let err = registry()
            .convert(key, &data, &ImportContext::new("CG Dev", Some(8)))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::Internal);
        assert_eq!(err.detail().import_type, Some(ImportType::ApiCgDevSdvx));
        assert_eq!(err.detail().data, Some(data));
        let context = err.detail().context.as_ref().unwrap();
        assert_eq!(context["service"], json!("CG Dev"));
        assert_eq!(context["userId"], json!(8));
    }

    #[tokio::test]
    async fn test_malformed_record_is_invalid_with_diagnostics() {
        let key = ConverterKey::new(ImportType::ApiCgDevSdvx, Game::Sdvx, Playtype::Single);
        let data = json!({"internalId": "not a number"});
        let err = registry()
            .convert(key, &data, &ImportContext::new("CG Dev", Some(3)))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::InvalidScore);
        assert_eq!(err.detail().import_type, Some(ImportType::ApiCgDevSdvx));
        assert_eq!(err.detail().data, Some(data));
        assert_eq!(err.detail().context.as_ref().unwrap()["userId"], json!(3));
    }

    #[tokio::test]
    async fn test_unreadable_context_is_internal() {
        let key = ConverterKey::new(ImportType::FileEamusementIidxCsv, Game::Iidx, Playtype::Sp);
        let data = json!({
            "title": "5.1.1.", "difficulty": "ANOTHER", "level": "12",
            "exScore": "1400", "pgreat": "600", "great": "200", "missCount": "14",
            "lamp": "HARD CLEAR", "djLevel": "AA", "timestamp": "2022-03-01 21:00"
        });
        let err = registry()
            .convert(key, &data, &ImportContext::new("e-amusement", None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Internal);
    }

    #[tokio::test]
    async fn test_result_playtype_must_match_key() {
        // The record is converted as DP because that is what its context says,
        // but it was routed under the SP key.
        let key = ConverterKey::new(ImportType::FileBatchManual, Game::Iidx, Playtype::Sp);
        let data = json!({
            "score": 1000, "lamp": "CLEAR", "matchType": "songTitle",
            "identifier": "5.1.1.", "difficulty": "ANOTHER"
        });
        let mut context = ImportContext::new("scorebook", None);
        context.data = json!({"game": "iidx", "playtype": "DP"});

        let err = registry().convert(key, &data, &context).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Internal);
        assert!(err.message().contains("DP"));

        assert_eq!(err.detail().import_type, Some(ImportType::FileBatchManual));
        assert_eq!(err.detail().data, Some(data));
        let recorded = err.detail().context.as_ref().unwrap();
        assert_eq!(recorded["service"], json!("scorebook"));
        assert_eq!(recorded["data"]["playtype"], json!("DP"));
    }

    #[tokio::test]
    async fn test_song_chart_desync_is_logged_once() {
        let logs = CapturedLogs::default();
        let _guard = tracing::subscriber::set_default(logs.subscriber());

        let key = ConverterKey::new(ImportType::ApiCgDevSdvx, Game::Sdvx, Playtype::Single);
        let data = json!({
            "internalId": 404, "difficulty": 2, "version": 6, "clearType": 1,
            "score": 9000000, "critical": 1200, "near": 50, "error": 10,
            "maxChain": 900, "dateTime": "2021-08-13 20:15:00"
        });
        let err = registry()
            .convert(key, &data, &ImportContext::new("CG Dev", None))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::Internal);
        let severe = logs.severe();
        assert_eq!(severe.len(), 1, "desync logged {} times", severe.len());
        assert!(severe[0]["fields"]["message"]
            .as_str()
            .unwrap()
            .contains("Song-Chart desync"));
    }
}
