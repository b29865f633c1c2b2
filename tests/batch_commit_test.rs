// ==========================================
// 일괄 커밋 통합 테스트
// ==========================================
// 범위: 그룹 단위 부분 실패, 합계 재계산, 덮어쓰기, 취소
// ==========================================


use test_helpers::{create_test_store, paste, seed_corpus, FailingStore};
use worksite_import::config::ImportConfig;
use worksite_import::domain::{AggregateKey, DailyReportAggregate, ReconcileStatus, ReportLine};
use worksite_import::importer::{CancelFlag, CommitOptions, DailyReportImporter};
use worksite_import::logging;
use worksite_import::repository::ImportStore;

const HEADER: &[&str] = &["날짜", "현장명", "팀명", "작업자명", "공수", "단가"];

fn stored_line(worker_id: &str, name: &str, man_day: f64) -> ReportLine {
    ReportLine {
        worker_id: worker_id.to_string(),
        name: name.to_string(),
        man_day,
        unit_price: Some(100_000),
        ..Default::default()
    }
}

/// A현장/철근팀 2024-03-05 집계 (홍길동 1.5, 김철수 1.0, 이영희 1.0)
async fn seed_aggregate<S: ImportStore + ?Sized>(store: &S) {
    let mut aggregate = DailyReportAggregate {
        date: "2024-03-05".to_string(),
        site_id: "S-A".to_string(),
        site_name: "A현장".to_string(),
        team_id: "T-REBAR".to_string(),
        team_name: "철근팀".to_string(),
        lines: vec![
            stored_line("W-HONG", "홍길동", 1.5),
            stored_line("W-KIM", "김철수", 1.0),
            stored_line("W-LEE", "이영희", 1.0),
        ],
        ..Default::default()
    };
    aggregate.recompute_totals();
    store.create_aggregate(aggregate).await.unwrap();
}

#[tokio::test]
async fn test_failed_group_does_not_block_others() {
    logging::init_test();
    let (_file, store) = create_test_store();
    seed_corpus(&*store).await;
    let failing = FailingStore::new(store.clone(), &["S-B"]);
    let importer = DailyReportImporter::new(failing, ImportConfig::default());

    let text = paste(
        HEADER,
        &[
            &["2024-03-05", "A현장", "철근팀", "홍길동", "1", "150000"],
            &["2024-03-05", "B현장", "철근팀", "김철수", "1", "150000"],
            &["2024-03-05", "C현장", "철근팀", "이영희", "1", "150000"],
        ],
    );
    let (_, summary) = importer.import_text(&text, None).await.unwrap();

    assert_eq!(summary.success, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.logs.len(), 1);
    assert!(summary.logs[0].contains("김철수"));
    assert_eq!(importer.store().aggregate_writes(), 2);

    for (site, expected) in [("S-A", true), ("S-B", false), ("S-C", true)] {
        let key = AggregateKey::new("2024-03-05", site, "T-REBAR");
        let found = store.get_aggregate_by_key(&key).await.unwrap();
        assert_eq!(found.is_some(), expected, "{} 집계 저장 여부", site);
    }
}

#[tokio::test]
async fn test_overwrite_recomputes_totals() {
    logging::init_test();
    let (_file, store) = create_test_store();
    seed_corpus(&*store).await;
    seed_aggregate(&*store).await;
    let importer = DailyReportImporter::new(store.clone(), ImportConfig::default());

    let text = paste(
        &["날짜", "현장명", "팀명", "작업자명", "공수"],
        &[&["2024-03-05", "A현장", "철근팀", "홍길동", "1"]],
    );

    let preview = importer.preview(&text).await.unwrap();
    assert_eq!(preview.rows[0].status, Some(ReconcileStatus::Update));
    assert_eq!(preview.rows[0].changes.len(), 1);
    assert_eq!(preview.rows[0].changes[0].field, "manDay");

    let options = CommitOptions::default().with_overwrite(true);
    let summary = importer.commit(&preview.rows, &options).await.unwrap();
    assert_eq!(summary.success, 1);

    let aggregate = store
        .get_aggregate_by_key(&AggregateKey::new("2024-03-05", "S-A", "T-REBAR"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(aggregate.lines.len(), 3);
    assert_eq!(aggregate.total_man_day, 3.0);
    assert_eq!(aggregate.total_amount, 300_000);
    let hong = aggregate.find_line("W-HONG").unwrap();
    assert_eq!(hong.man_day, 1.0);
    assert_eq!(hong.unit_price, Some(100_000));
}

#[tokio::test]
async fn test_existing_line_kept_without_overwrite() {
    logging::init_test();
    let (_file, store) = create_test_store();
    seed_corpus(&*store).await;
    seed_aggregate(&*store).await;
    let importer = DailyReportImporter::new(store.clone(), ImportConfig::default());

    let text = paste(
        &["날짜", "현장명", "팀명", "작업자명", "공수"],
        &[&["2024-03-05", "A현장", "철근팀", "홍길동", "0.5"]],
    );
    let (_, summary) = importer.import_text(&text, Some(false)).await.unwrap();

    assert_eq!(summary.success, 0);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 0);

    let aggregate = store
        .get_aggregate_by_key(&AggregateKey::new("2024-03-05", "S-A", "T-REBAR"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(aggregate.find_line("W-HONG").unwrap().man_day, 1.5);
    assert_eq!(aggregate.total_man_day, 3.5);
}

#[tokio::test]
async fn test_cancel_before_commit_writes_nothing() {
    logging::init_test();
    let (_file, store) = create_test_store();
    seed_corpus(&*store).await;
    let importer = DailyReportImporter::new(store.clone(), ImportConfig::default());

    let text = paste(
        HEADER,
        &[
            &["2024-03-05", "A현장", "철근팀", "홍길동", "1", "150000"],
            &["2024-03-05", "B현장", "신설팀", "김철수", "1", "150000"],
        ],
    );
    let preview = importer.preview(&text).await.unwrap();

    let cancel = CancelFlag::new();
    cancel.cancel();
    let options = CommitOptions::default().with_cancel(cancel);
    let summary = importer.commit(&preview.rows, &options).await.unwrap();

    assert_eq!(summary.cancelled, 2);
    assert_eq!(summary.success, 0);
    assert!(summary.created.is_empty());
    assert!(store
        .list_teams()
        .await
        .unwrap()
        .iter()
        .all(|t| t.name != "신설팀"));
    assert!(store
        .get_aggregate_by_key(&AggregateKey::new("2024-03-05", "S-A", "T-REBAR"))
        .await
        .unwrap()
        .is_none());
}
