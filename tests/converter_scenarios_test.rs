use std::sync::Arc;

use serde_json::{json, Value};

use score_core::{
    ChartData, ChartIdentity, Difficulty, Game, Grade, ImportType, InMemoryCatalog, Lamp,
    Playtype, SdvxDifficulty, SdvxLamp, SongIdentity,
};
use score_import::pipeline::normalize::sdvx::{convert_cg_lamp, convert_cg_version};
use score_import::{ConverterKey, ConverterRegistry, FailureKind, ImportContext, ReferenceResolver};

const ALL_VERSIONS: &[&str] = &["booth", "inf", "gw", "heaven", "vivid", "exceed"];

fn chart(song_id: u32, difficulty: SdvxDifficulty, versions: &[&str]) -> ChartIdentity {
    ChartIdentity {
        chart_id: format!("sdvx-{}-{}", song_id, difficulty.as_str().to_lowercase()),
        song_id,
        game: Game::Sdvx,
        playtype: Playtype::Single,
        difficulty: Difficulty::Sdvx(difficulty),
        versions: versions.iter().map(|v| v.to_string()).collect(),
        data: ChartData::Sdvx { in_game_id: song_id },
    }
}

/// Songs 1 to 5 with NOV, ADV, EXH and MXM everywhere, an INF chart from
/// inf onwards on odd songs, and an orphaned chart for song 6.
fn catalog() -> InMemoryCatalog {
    let catalog = InMemoryCatalog::new();
    for id in 1..=5 {
        catalog
            .insert_song(SongIdentity {
                id,
                game: Game::Sdvx,
                title: format!("Song {}", id),
                artist: "artist".to_string(),
                alt_titles: Vec::new(),
            })
            .unwrap();

        for difficulty in [
            SdvxDifficulty::Nov,
            SdvxDifficulty::Adv,
            SdvxDifficulty::Exh,
            SdvxDifficulty::Mxm,
        ] {
            catalog.insert_chart(chart(id, difficulty, ALL_VERSIONS)).unwrap();
        }
        if id % 2 == 1 {
            catalog
                .insert_chart(chart(id, SdvxDifficulty::Inf, &ALL_VERSIONS[1..]))
                .unwrap();
        }
    }
    catalog.insert_chart(chart(6, SdvxDifficulty::Exh, ALL_VERSIONS)).unwrap();
    catalog
}

fn registry() -> Arc<ConverterRegistry> {
    let resolver = ReferenceResolver::new(Arc::new(catalog()));
    Arc::new(ConverterRegistry::standard(resolver).unwrap())
}

fn key() -> ConverterKey {
    ConverterKey::new(ImportType::ApiCgDevSdvx, Game::Sdvx, Playtype::Single)
}

fn context() -> ImportContext {
    ImportContext::new("CG Dev", Some(42))
}

fn cg_record(internal_id: u32, difficulty: i64, version: i64, clear_type: i64, score: u32) -> Value {
    json!({
        "internalId": internal_id,
        "difficulty": difficulty,
        "version": version,
        "clearType": clear_type,
        "score": score,
        "critical": 1000,
        "near": 10,
        "error": 2,
        "maxChain": 1012,
        "dateTime": "2022-02-22 22:22:22"
    })
}

#[tokio::test]
async fn scenario_clear_type_depends_on_version() {
    let registry = registry();

    let booth = registry
        .convert(key(), &cg_record(1, 2, 1, 2, 9_800_000), &context())
        .await
        .unwrap();
    assert_eq!(
        booth.dry_score().score_data.lamp,
        Lamp::Sdvx(SdvxLamp::UltimateChain)
    );

    let exceed = registry
        .convert(key(), &cg_record(1, 2, 6, 2, 9_800_000), &context())
        .await
        .unwrap();
    assert_eq!(
        exceed.dry_score().score_data.lamp,
        Lamp::Sdvx(SdvxLamp::ExcessiveClear)
    );
}

#[tokio::test]
async fn scenario_unknown_song_is_data_not_found() {
    let err = registry()
        .convert(key(), &cg_record(77, 2, 6, 1, 9_000_000), &context())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::DataNotFound);
}

#[tokio::test]
async fn scenario_chart_without_song_is_internal() {
    let err = registry()
        .convert(key(), &cg_record(6, 2, 6, 1, 9_000_000), &context())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::Internal);
    assert_eq!(err.detail().import_type, Some(ImportType::ApiCgDevSdvx));
}

#[tokio::test]
async fn scenario_timestamps() {
    let registry = registry();

    let mut bad = cg_record(1, 2, 6, 1, 9_000_000);
    bad["dateTime"] = json!("yesterday-ish");
    let err = registry.convert(key(), &bad, &context()).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::InvalidScore);
    assert!(err.message().contains("yesterday-ish"));

    let mut missing = cg_record(1, 2, 6, 1, 9_000_000);
    missing["dateTime"] = Value::Null;
    let result = registry.convert(key(), &missing, &context()).await.unwrap();
    assert!(result.dry_score().time_achieved.is_none());
}

/// Every generated record either converts into a self-consistent result or
/// fails with the kind its inputs call for.
#[tokio::test]
async fn generated_cg_records_are_consistent() {
    let registry = registry();
    let scores = [0, 6_999_999, 8_700_000, 9_900_000, 10_000_000];

    for internal_id in 1..=5u32 {
        for difficulty in 0..=4i64 {
            for version in 1..=6i64 {
                for clear_type in 0..=4i64 {
                    for score in scores {
                        let record = cg_record(internal_id, difficulty, version, clear_type, score);
                        let outcome = registry.convert(key(), &record, &context()).await;

                        let sdvx_version = convert_cg_version(version).unwrap();
                        let expected_lamp = convert_cg_lamp(sdvx_version, clear_type).ok();
                        let inf_missing = difficulty == 3 && (internal_id % 2 == 0 || version == 1);

                        match outcome {
                            Ok(result) => {
                                assert!(!inf_missing);
                                let (song, chart, dry) = result.clone().into_parts();
                                assert_eq!(song.id, chart.song_id);
                                assert_eq!(chart.in_game_id(), Some(internal_id));
                                assert!(chart.appears_in(sdvx_version.as_str()));
                                assert_eq!(dry.game, chart.game);
                                assert_eq!(dry.playtype, chart.playtype);
                                assert_eq!(dry.score_data.lamp, Lamp::Sdvx(expected_lamp.unwrap()));
                                assert!(matches!(dry.score_data.grade, Grade::Sdvx(_)));
                                let percent = f64::from(score) / 100_000.0;
                                assert!((dry.score_data.percent - percent).abs() < 1e-9);

                                let again = registry.convert(key(), &record, &context()).await.unwrap();
                                assert_eq!(again, result);
                            }
                            Err(failure) if inf_missing => {
                                assert_eq!(failure.kind(), FailureKind::DataNotFound)
                            }
                            Err(failure) => {
                                assert!(expected_lamp.is_none(), "{}", failure);
                                assert_eq!(failure.kind(), FailureKind::InvalidScore);
                            }
                        }
                    }
                }
            }
        }
    }
}

#[tokio::test]
async fn shared_registry_converts_concurrently() {
    let registry = registry();
    let context = Arc::new(context());

    let mut handles = Vec::new();
    for i in 0..50u32 {
        let registry = Arc::clone(&registry);
        let context = Arc::clone(&context);
        handles.push(tokio::spawn(async move {
            let record = cg_record(i % 5 + 1, 2, 6, 1, 9_000_000 + i);
            registry.convert(key(), &record, &context).await
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result.dry_score().score_data.score, 9_000_000 + i as u32);
        assert_eq!(result.song().id, i as u32 % 5 + 1);
    }
}
