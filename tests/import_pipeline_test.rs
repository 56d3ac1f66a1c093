use std::io::Write;
use std::sync::Arc;

use serde_json::json;
use tempfile::NamedTempFile;

use score_core::{Game, IidxLamp, ImportType, InMemoryCatalog, Lamp, Playtype};
use score_import::app::ports::NullOutput;
use score_import::config::Config;
use score_import::pipeline::parser::{parse_batch_manual, parse_eamusement_iidx_csv};
use score_import::{ConvertUseCase, ConverterKey, ConverterRegistry, FailureKind, ReferenceResolver};

const CATALOG: &str = r#"{
    "songs": [
        {"id": 1, "game": "iidx", "title": "5.1.1.", "artist": "dj nagureo"},
        {"id": 2, "game": "iidx", "title": "Verflucht", "artist": "Zektbach"},
        {"id": 10, "game": "sdvx", "title": "Lachryma", "artist": "Kanekochiharu"}
    ],
    "charts": [
        {"chartID": "iidx-1-sp-a", "songID": 1, "game": "iidx", "playtype": "SP",
         "difficulty": "ANOTHER", "versions": ["29", "30"], "data": {"notecount": 786}},
        {"chartID": "iidx-1-sp-h", "songID": 1, "game": "iidx", "playtype": "SP",
         "difficulty": "HYPER", "versions": ["29", "30"], "data": {"notecount": 500}},
        {"chartID": "iidx-2-sp-l", "songID": 2, "game": "iidx", "playtype": "SP",
         "difficulty": "LEGGENDARIA", "versions": ["30"], "data": {"notecount": 1700}},
        {"chartID": "sdvx-10-exh", "songID": 10, "game": "sdvx", "playtype": "Single",
         "difficulty": "EXH", "versions": ["exceed"], "data": {"inGameID": 100}}
    ]
}"#;

const HEADER: &str = "バージョン,タイトル,ジャンル,アーティスト,プレー回数,\
BEGINNER 難易度,BEGINNER スコア,BEGINNER PGreat,BEGINNER Great,BEGINNER ミスカウント,BEGINNER クリアタイプ,BEGINNER DJ LEVEL,\
NORMAL 難易度,NORMAL スコア,NORMAL PGreat,NORMAL Great,NORMAL ミスカウント,NORMAL クリアタイプ,NORMAL DJ LEVEL,\
HYPER 難易度,HYPER スコア,HYPER PGreat,HYPER Great,HYPER ミスカウント,HYPER クリアタイプ,HYPER DJ LEVEL,\
ANOTHER 難易度,ANOTHER スコア,ANOTHER PGreat,ANOTHER Great,ANOTHER ミスカウント,ANOTHER クリアタイプ,ANOTHER DJ LEVEL,\
LEGGENDARIA 難易度,LEGGENDARIA スコア,LEGGENDARIA PGreat,LEGGENDARIA Great,LEGGENDARIA ミスカウント,LEGGENDARIA クリアタイプ,LEGGENDARIA DJ LEVEL,\
最終プレー日時";

const UNPLAYED: &str = "0,0,0,0,---,NO PLAY,---";

fn temp_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn registry_from_file() -> Arc<ConverterRegistry> {
    let file = temp_file(CATALOG);
    let catalog = InMemoryCatalog::load_from_file(file.path()).unwrap();
    assert_eq!(catalog.song_count(), 3);
    Arc::new(ConverterRegistry::standard(ReferenceResolver::new(Arc::new(catalog))).unwrap())
}

#[tokio::test]
async fn iidx_csv_file_converts_end_to_end() {
    let rows = [
        // HYPER and ANOTHER played; HYPER EX score does not add up
        format!(
            "RESIDENT,5.1.1.,TECHNO,dj nagureo,9,{},{},10,900,400,101,5,CLEAR,AAA,11,1400,600,200,14,FULLCOMBO CLEAR,AAA,{},2023-01-02 03:04",
            UNPLAYED, UNPLAYED, UNPLAYED
        ),
        // LEGGENDARIA of a song the catalog does not have
        format!(
            "RESIDENT,Unknown Song,TECHNO,nobody,1,{},{},{},{},12,2000,800,400,80,FAILED,B,2023-01-02 03:04",
            UNPLAYED, UNPLAYED, UNPLAYED, UNPLAYED
        ),
    ];
    let csv = format!("{}\n{}\n", HEADER, rows.join("\n"));
    let file = temp_file(&csv);

    let bytes = std::fs::read(file.path()).unwrap();
    let parsed = parse_eamusement_iidx_csv(&bytes, "e-amusement", Playtype::Sp, None).unwrap();
    assert_eq!(parsed.records.len(), 3);

    let use_case = ConvertUseCase::new(registry_from_file(), Box::new(NullOutput), 4);
    let key = ConverterKey::new(ImportType::FileEamusementIidxCsv, Game::Iidx, Playtype::Sp);
    let report = use_case
        .convert_batch(key, parsed.records, parsed.context)
        .await
        .unwrap();

    assert_eq!(report.converted.len(), 1);
    let converted = &report.converted[0];
    assert_eq!(converted.index, 1);
    assert_eq!(converted.result.chart().chart_id, "iidx-1-sp-a");
    assert_eq!(
        converted.result.dry_score().score_data.lamp,
        Lamp::Iidx(IidxLamp::FullCombo)
    );

    assert_eq!(report.invalid.len(), 1);
    assert_eq!(report.invalid[0].index, 0);
    assert_eq!(report.unresolved.len(), 1);
    assert_eq!(report.unresolved[0].failure.kind(), FailureKind::DataNotFound);
    assert!(report.internal.is_empty());
}

#[tokio::test]
async fn batch_manual_file_converts_end_to_end() {
    let body = json!({
        "meta": {"game": "sdvx", "playtype": "Single", "service": "scorebook", "version": "exceed"},
        "scores": [
            {"score": 9_990_000, "lamp": "EXCESSIVE CLEAR", "matchType": "inGameID",
             "identifier": "100", "difficulty": "EXH", "timeAchieved": 1_650_000_000_000i64},
            {"score": 9_990_000, "lamp": "EXCESSIVE CLEAR", "matchType": "songTitle",
             "identifier": "lachryma", "difficulty": "EXH", "hitMeta": {"bp": 1, "unknown": 2}},
            {"score": 9_990_000, "lamp": "HARD CLEAR", "matchType": "songTitle",
             "identifier": "Lachryma", "difficulty": "EXH"}
        ]
    });
    let file = temp_file(&body.to_string());

    let parsed = parse_batch_manual(&std::fs::read(file.path()).unwrap()).unwrap();
    let use_case = ConvertUseCase::new(registry_from_file(), Box::new(NullOutput), 1);
    let key = ConverterKey::new(ImportType::FileBatchManual, Game::Sdvx, Playtype::Single);
    let report = use_case
        .convert_batch(key, parsed.records, parsed.context)
        .await
        .unwrap();

    let summary = report.summary();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.converted, 1);
    assert_eq!(summary.invalid, 2);
    assert_eq!(report.converted[0].result.dry_score().service, "scorebook");
}

#[test]
fn config_file_is_validated_against_registry() {
    let file = temp_file(
        r#"
[catalog]
path = "catalog.json"

[import]
enabled_import_types = ["file/pli-iidx-csv"]
max_concurrency = 3

[logging]
directory = "/tmp/score-import-logs"
file_prefix = "import.log"
"#,
    );

    let config = Config::load_from(file.path()).unwrap();
    assert_eq!(config.import.max_concurrency, 3);
    assert_eq!(config.logging.file_prefix, "import.log");
    assert!(config.validate_against(&registry_from_file()).is_ok());

    let key = ConverterKey::new(ImportType::FilePliIidxCsv, Game::Iidx, Playtype::Sp);
    let empty = ConverterRegistry::builder().build().unwrap();
    assert!(empty.get_converter(&key).is_none());
    assert!(config.validate_against(&empty).is_err());
}
