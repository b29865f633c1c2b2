// ==========================================
// 작업자 명부 가져오기 통합 테스트
// ==========================================
// 범위: 필수값 누락 제외, 덮어쓰기 갱신, 계정 연결 충돌, 설정 덮어쓰기
// ==========================================


use test_helpers::{create_test_db, create_test_store, paste, seed_corpus};
use worksite_import::config::{config_keys, ConfigManager, ImportConfig};
use worksite_import::domain::{EntityKind, ReconcileStatus};
use worksite_import::importer::{CommitOptions, DailyReportImporter, ImportError, WorkerImporter};
use worksite_import::logging;
use worksite_import::repository::{ImportStore, SqliteImportStore};

#[tokio::test]
async fn test_missing_id_number_excluded_others_saved() {
    logging::init_test();
    let (_file, store) = create_test_store();
    let importer = WorkerImporter::new(store.clone(), ImportConfig::default());

    let text = paste(
        &["이름", "주민번호", "단가"],
        &[
            &["홍길동", "", "150000"],
            &["정신입", "880808-1111111", "200,000"],
        ],
    );
    let preview = importer.preview(&text).await.unwrap();

    assert!(!preview.rows[0].is_valid());
    assert!(preview.rows[0]
        .verdict
        .errors
        .contains(&"주민번호 누락".to_string()));
    assert_eq!(preview.rows[1].status, Some(ReconcileStatus::New));

    let summary = importer
        .commit(&preview.rows, &CommitOptions::default())
        .await
        .unwrap();
    assert_eq!(summary.success, 1);
    assert_eq!(summary.failed, 1);
    assert!(summary.logs[0].contains("주민번호 누락"));

    let workers = store.list_workers().await.unwrap();
    assert_eq!(workers.len(), 1);
    assert_eq!(workers[0].name, "정신입");
    assert_eq!(workers[0].unit_price, Some(200_000));
}

#[tokio::test]
async fn test_overwrite_keeps_team_id_and_name_in_sync() {
    logging::init_test();
    let (_file, store) = create_test_store();
    seed_corpus(&*store).await;
    let importer = WorkerImporter::new(store.clone(), ImportConfig::default());

    let text = paste(
        &["성명", "주민등록번호", "소속팀"],
        &[&["홍길동", "9001011234567", "형틀팀"]],
    );
    let preview = importer.preview(&text).await.unwrap();
    assert_eq!(preview.rows[0].status, Some(ReconcileStatus::Update));
    assert!(preview.rows[0].changes.iter().any(|c| c.field == "teamName"));

    let kept = importer
        .commit(&preview.rows, &CommitOptions::default())
        .await
        .unwrap();
    assert_eq!(kept.skipped, 1);

    let options = CommitOptions::default().with_overwrite(true);
    let summary = importer.commit(&preview.rows, &options).await.unwrap();
    assert_eq!(summary.success, 1);
    assert!(summary.created.is_empty());

    let workers = store.list_workers().await.unwrap();
    let hong = workers.iter().find(|w| w.id == "W-HONG").unwrap();
    assert_eq!(hong.team_id.as_deref(), Some("T-FORM"));
    assert_eq!(hong.team_name.as_deref(), Some("형틀팀"));
    assert_eq!(workers.len(), 3);
}

#[tokio::test]
async fn test_link_account_one_to_one() {
    logging::init_test();
    let (_file, store) = create_test_store();
    seed_corpus(&*store).await;
    let importer = WorkerImporter::new(store.clone(), ImportConfig::default());

    let linked = importer
        .link_account("홍길동", "9001011234567", "acc-1")
        .await
        .unwrap();
    assert_eq!(linked.linked_account_id.as_deref(), Some("acc-1"));

    let again = importer
        .link_account("홍길동", "900101-1234567", "acc-1")
        .await
        .unwrap();
    assert_eq!(again.id, "W-HONG");

    let other_worker = importer
        .link_account("김철수", "850505-2222222", "acc-1")
        .await;
    assert!(matches!(other_worker, Err(ImportError::AccountConflict { .. })));

    let other_account = importer
        .link_account("홍길동", "900101-1234567", "acc-2")
        .await;
    assert!(matches!(other_account, Err(ImportError::AccountConflict { .. })));

    let unknown = importer.link_account("홍길동", "000000-0000000", "acc-3").await;
    assert!(matches!(unknown, Err(ImportError::WorkerNotFound { .. })));
}

#[tokio::test]
async fn test_config_kv_permissive_worker_policy() {
    logging::init_test();
    let (_file, db_path) = create_test_db().unwrap();
    let store = SqliteImportStore::new(&db_path).unwrap();
    seed_corpus(&store).await;

    let manager = ConfigManager::new(&db_path).unwrap();
    manager
        .set_config_value(config_keys::WORKER_POLICY, "PERMISSIVE")
        .unwrap();
    let importer = DailyReportImporter::new(store, manager);

    let text = paste(
        &["날짜", "현장명", "팀명", "작업자명", "공수"],
        &[&["2024-03-05", "A현장", "철근팀", "박신규", "1"]],
    );
    let (preview, summary) = importer.import_text(&text, None).await.unwrap();

    assert!(preview.rows[0].is_valid());
    assert!(preview.rows[0]
        .verdict
        .warnings
        .contains(&"신규 작업자 자동 생성 예정: 박신규".to_string()));
    assert_eq!(summary.success, 1);
    assert_eq!(summary.created.len(), 1);
    assert_eq!(summary.created[0].kind, EntityKind::Worker);

    let workers = importer.store().list_workers().await.unwrap();
    assert!(workers.iter().any(|w| w.name == "박신규"));
}
