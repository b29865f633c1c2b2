// ==========================================
// 현장 인력 관리 시스템 - 작업 일보 일괄 가져오기
// ==========================================
// 책임: 일보 붙여넣기 세션 (미리보기 → 커밋)
// 흐름: 파이프라인(파싱/매핑/정제/검증) → 참조 검증(작업자 Strict, 팀/현장 Permissive)
//       → 저장된 집계와 대조(NEW/UPDATE/IDENTICAL) → BatchCommitter
// 범위: 해석기 캐시는 세션 1회 한정, 세션 간 공유 없음
// ==========================================

use crate::config::{ImportConfig, ImportConfigReader};
use crate::domain::daily_report::{AggregateKey, ReportLine};
use crate::domain::field::FieldKey;
use crate::domain::import_row::{CommitSummary, ImportRow};
use crate::domain::types::{EntityKind, ReconcileStatus};
use crate::importer::batch_committer::{BatchCommitter, CommitOptions};
use crate::importer::entity_resolver::EntityResolver;
use crate::importer::error::ImportResult;
use crate::importer::import_pipeline_trait::LineDiffer;
use crate::importer::import_session::{ImportPipeline, ImportPreview};
use crate::importer::reconcile_differ::{report_line_from_row, ReconcileDiffer};
use crate::importer::schema::ImportSchema;
use crate::importer::smart_paste::BatchSink;
use crate::repository::ImportStore;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

// ==========================================
// DailyReportImporter
// ==========================================
pub struct DailyReportImporter<S, C>
where
    S: ImportStore,
    C: ImportConfigReader,
{
    store: S,
    config_reader: C,
    pipeline: ImportPipeline,
    differ: Box<dyn LineDiffer>,
    schema: ImportSchema,
}

impl<S, C> DailyReportImporter<S, C>
where
    S: ImportStore,
    C: ImportConfigReader,
{
    /// 기본 파이프라인 + 일보 스키마로 생성
    pub fn new(store: S, config_reader: C) -> Self {
        Self {
            store,
            config_reader,
            pipeline: ImportPipeline::standard(),
            differ: Box::new(ReconcileDiffer),
            schema: ImportSchema::daily_report(),
        }
    }

    pub fn with_pipeline(mut self, pipeline: ImportPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_differ(mut self, differ: Box<dyn LineDiffer>) -> Self {
        self.differ = differ;
        self
    }

    /// 필드 정의표 교체 (별칭 추가 등)
    pub fn with_schema(mut self, schema: ImportSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ==========================================
    // 미리보기
    // ==========================================

    /// 붙여넣기 원문 → 행별 판정/대조 결과 (저장소 변경 없음)
    #[instrument(skip_all)]
    pub async fn preview(&self, text: &str) -> ImportResult<ImportPreview> {
        let config = self.config_reader.load_import_config().await?;
        let resolver = EntityResolver::load(&self.store).await?;
        self.preview_with(text, &resolver, &config).await
    }

    async fn preview_with(
        &self,
        text: &str,
        resolver: &EntityResolver,
        config: &ImportConfig,
    ) -> ImportResult<ImportPreview> {
        let mut preview = self.pipeline.prepare(text, &self.schema)?;
        self.pipeline
            .check_references(&mut preview, &self.schema, resolver, config);
        self.reconcile(&mut preview.rows, resolver).await?;

        info!(
            rows = preview.rows.len(),
            invalid = preview.invalid_count(),
            new = preview.count_status(ReconcileStatus::New),
            update = preview.count_status(ReconcileStatus::Update),
            identical = preview.count_status(ReconcileStatus::Identical),
            "일보 미리보기 완료"
        );
        Ok(preview)
    }

    /// 유효 행을 저장된 집계 라인과 대조
    ///
    /// 현장/팀/작업자 중 하나라도 아직 없으면 (커밋 시 생성 예정) NEW 로 본다.
    async fn reconcile(&self, rows: &mut [ImportRow], resolver: &EntityResolver) -> ImportResult<()> {
        let mut stored: HashMap<AggregateKey, Vec<ReportLine>> = HashMap::new();

        for row in rows.iter_mut().filter(|r| r.is_valid()) {
            let resolved = (
                row.get(FieldKey::Date),
                row.get(FieldKey::SiteName)
                    .and_then(|n| resolver.resolve(n, EntityKind::Site)),
                row.get(FieldKey::TeamName)
                    .and_then(|n| resolver.resolve(n, EntityKind::Team)),
                row.get(FieldKey::WorkerName)
                    .and_then(|n| resolver.resolve(n, EntityKind::Worker)),
            );
            let (Some(date), Some(site), Some(team), Some(worker)) = resolved else {
                row.status = Some(ReconcileStatus::New);
                continue;
            };

            let key = AggregateKey::new(date, &site.id, &team.id);
            if !stored.contains_key(&key) {
                let lines = self
                    .store
                    .get_aggregate_by_key(&key)
                    .await?
                    .map(|a| a.lines)
                    .unwrap_or_default();
                debug!(key = %key, lines = lines.len(), "저장된 집계 조회");
                stored.insert(key.clone(), lines);
            }
            let existing = stored.get(&key).map(Vec::as_slice).unwrap_or_default();

            let line = report_line_from_row(row, &worker);
            let outcome = self.differ.diff(&line, existing);
            if outcome.status == ReconcileStatus::Update {
                row.verdict.warn(format!(
                    "기존 라인 변경 {}건 (덮어쓰기 시 반영)",
                    outcome.changes.len()
                ));
            }
            row.status = Some(outcome.status);
            row.changes = outcome.changes;
        }
        Ok(())
    }

    // ==========================================
    // 커밋
    // ==========================================

    /// 미리보기 행 커밋 (새 해석기 세션)
    pub async fn commit(&self, rows: &[ImportRow], options: &CommitOptions) -> ImportResult<CommitSummary> {
        let config = self.config_reader.load_import_config().await?;
        let mut resolver = EntityResolver::load(&self.store).await?;
        let committer = BatchCommitter::new(&self.store, &config);
        Ok(committer.commit(rows, &mut resolver, options).await)
    }

    /// 미리보기 + 커밋을 한 세션으로 수행
    ///
    /// # 인자
    /// - overwrite: None 이면 설정값(import.overwrite_existing) 사용
    #[instrument(skip_all)]
    pub async fn import_text(
        &self,
        text: &str,
        overwrite: Option<bool>,
    ) -> ImportResult<(ImportPreview, CommitSummary)> {
        let config = self.config_reader.load_import_config().await?;
        let mut resolver = EntityResolver::load(&self.store).await?;
        let preview = self.preview_with(text, &resolver, &config).await?;

        let mut options = CommitOptions::from_config(&config);
        if let Some(overwrite) = overwrite {
            options = options.with_overwrite(overwrite);
        }
        let committer = BatchCommitter::new(&self.store, &config);
        let summary = committer.commit(&preview.rows, &mut resolver, &options).await;
        Ok((preview, summary))
    }
}

#[async_trait]
impl<S, C> BatchSink for DailyReportImporter<S, C>
where
    S: ImportStore,
    C: ImportConfigReader,
{
    async fn save_batch(&self, rows: &[ImportRow], overwrite: bool) -> ImportResult<CommitSummary> {
        let config = self.config_reader.load_import_config().await?;
        let options = CommitOptions::from_config(&config).with_overwrite(overwrite);
        self.commit(rows, &options).await
    }
}
