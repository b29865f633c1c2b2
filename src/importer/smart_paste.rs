// ==========================================
// 현장 인력 관리 시스템 - 스마트 붙여넣기
// ==========================================
// 책임: 스키마(필드 정의표)로 매개변수화된 직접 입력 흐름
// 흐름: 파이프라인 → 참조 정책 검증 → 호출자 훅 → 미리보기 (커밋 전 모든 판정 노출)
// 훅:
// - validate_row: 호출자 추가 검증 (스키마 검증 결과에 합쳐짐)
// - BatchSink::save_batch: 유효 행 저장 (일보/작업자/팀 가져오기가 구현)
// ==========================================

use crate::config::{ImportConfig, ImportConfigReader};
use crate::domain::import_row::{CommitSummary, ImportRow, RowVerdict};
use crate::importer::entity_resolver::EntityResolver;
use crate::importer::error::ImportResult;
use crate::importer::import_session::{ImportPipeline, ImportPreview};
use crate::importer::schema::ImportSchema;
use crate::repository::ImportStore;
use async_trait::async_trait;
use tracing::{info, instrument};

// ==========================================
// BatchSink Trait
// ==========================================
// 구현: DailyReportImporter, WorkerImporter, TeamImporter
#[async_trait]
pub trait BatchSink: Send + Sync {
    /// 유효 행 일괄 저장
    ///
    /// # 인자
    /// - rows: 검증을 통과한 행만 전달됨
    /// - overwrite: 기존 레코드/라인 덮어쓰기 여부
    async fn save_batch(&self, rows: &[ImportRow], overwrite: bool) -> ImportResult<CommitSummary>;
}

/// 호출자 행 검증 훅
pub type RowHook = Box<dyn Fn(&ImportRow) -> RowVerdict + Send + Sync>;

pub struct SmartPaste {
    schema: ImportSchema,
    pipeline: ImportPipeline,
    validate_row: Option<RowHook>,
}

impl SmartPaste {
    pub fn new(schema: ImportSchema) -> Self {
        Self {
            schema,
            pipeline: ImportPipeline::standard(),
            validate_row: None,
        }
    }

    pub fn with_pipeline(mut self, pipeline: ImportPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_row_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ImportRow) -> RowVerdict + Send + Sync + 'static,
    {
        self.validate_row = Some(Box::new(hook));
        self
    }

    pub fn schema(&self) -> &ImportSchema {
        &self.schema
    }

    /// 붙여넣기 → 미리보기 (저장소 스냅샷 기준 참조 검증 포함)
    #[instrument(skip_all, fields(kind = %self.schema.kind))]
    pub async fn preview<S, C>(
        &self,
        text: &str,
        store: &S,
        config_reader: &C,
    ) -> ImportResult<ImportPreview>
    where
        S: ImportStore + ?Sized,
        C: ImportConfigReader + ?Sized,
    {
        let config = config_reader.load_import_config().await?;
        let resolver = EntityResolver::load(store).await?;
        self.parse(text, &resolver, &config)
    }

    /// 붙여넣기 → 미리보기
    ///
    /// 스키마 검증, 참조 정책 검증(Strict 미등록 = 오류, Permissive 미등록 = 자동 생성 경고),
    /// 호출자 훅 순서로 판정을 합친다.
    pub fn parse(
        &self,
        text: &str,
        resolver: &EntityResolver,
        config: &ImportConfig,
    ) -> ImportResult<ImportPreview> {
        let mut preview = self.pipeline.prepare(text, &self.schema)?;
        self.pipeline
            .check_references(&mut preview, &self.schema, resolver, config);
        if let Some(hook) = &self.validate_row {
            for row in preview.rows.iter_mut() {
                let verdict = hook(row);
                row.verdict.merge(verdict);
            }
        }
        Ok(preview)
    }

    /// 유효 행만 sink 로 전달, 무효 행은 failed 로 집계
    #[instrument(skip_all, fields(kind = %self.schema.kind, rows = preview.rows.len()))]
    pub async fn save<K: BatchSink + ?Sized>(
        &self,
        preview: &ImportPreview,
        sink: &K,
        overwrite: bool,
    ) -> ImportResult<CommitSummary> {
        let (valid, invalid): (Vec<&ImportRow>, Vec<&ImportRow>) =
            preview.rows.iter().partition(|r| r.is_valid());

        let mut summary = CommitSummary::default();
        for row in &invalid {
            summary.failed += 1;
            summary.logs.push(format!(
                "{}행: 검증 오류로 제외 ({})",
                row.row_number,
                row.verdict.errors.join(", ")
            ));
        }

        if !valid.is_empty() {
            let rows: Vec<ImportRow> = valid.into_iter().cloned().collect();
            summary.absorb(sink.save_batch(&rows, overwrite).await?);
        }

        info!(
            success = summary.success,
            failed = summary.failed,
            skipped = summary.skipped,
            "스마트 붙여넣기 저장 완료"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Site, Team, Worker};
    use crate::domain::field::FieldKey;
    use std::sync::Mutex;

    fn corpus() -> EntityResolver {
        EntityResolver::from_snapshot(
            vec![Worker {
                id: "W1".to_string(),
                name: "홍길동".to_string(),
                ..Default::default()
            }],
            vec![Team {
                id: "T1".to_string(),
                name: "철근팀".to_string(),
                ..Default::default()
            }],
            vec![Site {
                id: "S1".to_string(),
                name: "A현장".to_string(),
                ..Default::default()
            }],
            vec![],
        )
    }

    /// 받은 행을 기록만 하는 sink
    #[derive(Default)]
    struct RecordingSink {
        received: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl BatchSink for RecordingSink {
        async fn save_batch(&self, rows: &[ImportRow], _overwrite: bool) -> ImportResult<CommitSummary> {
            let mut received = self.received.lock().unwrap();
            received.extend(rows.iter().map(|r| r.row_number));
            Ok(CommitSummary {
                success: rows.len(),
                ..Default::default()
            })
        }
    }

    #[tokio::test]
    async fn test_row_hook_blocks_rows() {
        let paste = SmartPaste::new(ImportSchema::team()).with_row_hook(|row| {
            let mut verdict = RowVerdict::default();
            if row.get(FieldKey::Name) == Some("금지팀") {
                verdict.error("사용할 수 없는 팀명");
            }
            verdict
        });

        let preview = paste
            .parse(
                "팀명\t팀장\n철근팀\t김반장\n금지팀\t이반장",
                &corpus(),
                &ImportConfig::default(),
            )
            .unwrap();
        assert!(preview.rows[0].is_valid());
        assert!(!preview.rows[1].is_valid());

        let sink = RecordingSink::default();
        let summary = paste.save(&preview, &sink, false).await.unwrap();

        assert_eq!(summary.success, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(*sink.received.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_all_invalid_skips_sink() {
        let paste = SmartPaste::new(ImportSchema::worker());
        let preview = paste
            .parse("이름\t주민번호\n홍길동\t", &corpus(), &ImportConfig::default())
            .unwrap();

        let sink = RecordingSink::default();
        let summary = paste.save(&preview, &sink, false).await.unwrap();

        assert_eq!(summary.failed, 1);
        assert!(sink.received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reference_verdicts_visible_before_save() {
        let paste = SmartPaste::new(ImportSchema::daily_report());
        let text = "날짜\t현장명\t팀명\t작업자명\t공수\n\
                    2024-03-05\tA현장\t철근팀\t박신규\t1\n\
                    2024-03-05\tA현장\t새팀\t홍길동\t1";

        let preview = paste
            .parse(text, &corpus(), &ImportConfig::default())
            .unwrap();

        assert!(!preview.rows[0].is_valid());
        assert!(preview.rows[0]
            .verdict
            .errors
            .contains(&"등록되지 않은 작업자: 박신규".to_string()));
        assert!(preview.rows[1].is_valid());
        assert!(preview.rows[1]
            .verdict
            .warnings
            .contains(&"신규 팀 자동 생성 예정: 새팀".to_string()));

        let sink = RecordingSink::default();
        let summary = paste.save(&preview, &sink, false).await.unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(*sink.received.lock().unwrap(), vec![2]);
    }
}
