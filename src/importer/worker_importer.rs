// ==========================================
// 현장 인력 관리 시스템 - 작업자 일괄 등록
// ==========================================
// 책임: 작업자 명부 붙여넣기 세션 (미리보기 → 커밋), 작업자 계정 연결
// 규칙:
// - 기존 작업자 식별은 (이름, 주민번호) 정확 일치
// - NEW → 생성, UPDATE → overwrite 일 때만 변경 필드 갱신, IDENTICAL → 건너뜀
// - 팀/회사 참조는 정책에 따라 자동 생성, (id, 이름) 쌍은 항상 함께 갱신
// ==========================================

use crate::config::{ImportConfig, ImportConfigReader};
use crate::domain::entity::Worker;
use crate::domain::field::FieldKey;
use crate::domain::import_row::{CommitSummary, ImportRow};
use crate::domain::types::{EntityKind, ReconcileStatus, SalaryModel, TeamType};
use crate::importer::batch_committer::CommitOptions;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::entity_resolver::EntityResolver;
use crate::importer::error::ImportResult;
use crate::importer::import_pipeline_trait::DataCleaner as DataCleanerTrait;
use crate::importer::import_session::{tally_row, ImportPipeline, ImportPreview, RowOutcome};
use crate::importer::reconcile_differ::diff_entity_fields;
use crate::importer::schema::ImportSchema;
use crate::importer::smart_paste::BatchSink;
use crate::repository::ImportStore;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{info, instrument, warn};

/// 기존 작업자와 비교하는 필드 (camelCase)
pub const WORKER_COMPARE_FIELDS: &[&str] = &[
    "contact",
    "address",
    "bankName",
    "accountNumber",
    "accountHolder",
    "role",
    "teamName",
    "companyName",
    "unitPrice",
    "salaryModel",
    "teamType",
];

/// 정제된 행 → 작업자 초안 (id/참조 id 는 비어 있음)
pub fn worker_from_row(row: &ImportRow) -> Worker {
    let cleaner = DataCleaner::default();
    let text = |key: FieldKey| row.get(key).map(str::to_string);

    Worker {
        name: row.get(FieldKey::Name).unwrap_or_default().to_string(),
        id_number: text(FieldKey::IdNumber),
        contact: text(FieldKey::Contact),
        address: text(FieldKey::Address),
        bank_name: text(FieldKey::BankName),
        account_number: text(FieldKey::AccountNumber),
        account_holder: text(FieldKey::AccountHolder),
        role: text(FieldKey::Role),
        team_name: text(FieldKey::TeamName),
        company_name: text(FieldKey::CompanyName),
        unit_price: row
            .get(FieldKey::UnitPrice)
            .and_then(|v| cleaner.parse_amount(v)),
        salary_model: row.get(FieldKey::SalaryModel).and_then(SalaryModel::parse),
        team_type: row.get(FieldKey::TeamType).and_then(TeamType::parse),
        ..Default::default()
    }
}

/// 참조 이름을 해석기의 정식 이름으로 맞춤 (표기 차이로 인한 허위 변경 방지)
fn canonicalize_refs(draft: &mut Worker, resolver: &EntityResolver) {
    if let Some(team) = draft.team_name.as_deref().and_then(|n| resolver.team(n)) {
        draft.team_name = Some(team.name.clone());
    }
    if let Some(company) = draft.company_name.as_deref().and_then(|n| resolver.company(n)) {
        draft.company_name = Some(company.name.clone());
    }
}

fn existing_worker<'r>(row: &ImportRow, resolver: &'r EntityResolver) -> Option<&'r Worker> {
    match (row.get(FieldKey::Name), row.get(FieldKey::IdNumber)) {
        (Some(name), Some(id_number)) => resolver.worker_exact(name, id_number),
        _ => None,
    }
}

// ==========================================
// WorkerImporter
// ==========================================
pub struct WorkerImporter<S, C>
where
    S: ImportStore,
    C: ImportConfigReader,
{
    store: S,
    config_reader: C,
    pipeline: ImportPipeline,
    schema: ImportSchema,
}

impl<S, C> WorkerImporter<S, C>
where
    S: ImportStore,
    C: ImportConfigReader,
{
    pub fn new(store: S, config_reader: C) -> Self {
        Self {
            store,
            config_reader,
            pipeline: ImportPipeline::standard(),
            schema: ImportSchema::worker(),
        }
    }

    pub fn with_pipeline(mut self, pipeline: ImportPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_schema(mut self, schema: ImportSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 붙여넣기 → 행별 판정 + 기존 작업자 대조
    #[instrument(skip_all)]
    pub async fn preview(&self, text: &str) -> ImportResult<ImportPreview> {
        let config = self.config_reader.load_import_config().await?;
        let resolver = EntityResolver::load(&self.store).await?;

        let mut preview = self.pipeline.prepare(text, &self.schema)?;
        self.pipeline
            .check_references(&mut preview, &self.schema, &resolver, &config);

        for row in preview.rows.iter_mut().filter(|r| r.is_valid()) {
            let mut draft = worker_from_row(row);
            canonicalize_refs(&mut draft, &resolver);

            let (status, changes) = match existing_worker(row, &resolver) {
                None => (ReconcileStatus::New, Vec::new()),
                Some(existing) => {
                    let changes = diff_entity_fields(existing, &draft, WORKER_COMPARE_FIELDS);
                    if changes.is_empty() {
                        (ReconcileStatus::Identical, changes)
                    } else {
                        row.verdict.warn(format!(
                            "기존 작업자 정보 변경 {}건 (덮어쓰기 시 반영)",
                            changes.len()
                        ));
                        (ReconcileStatus::Update, changes)
                    }
                }
            };
            row.status = Some(status);
            row.changes = changes;
        }

        info!(
            rows = preview.rows.len(),
            invalid = preview.invalid_count(),
            new = preview.count_status(ReconcileStatus::New),
            update = preview.count_status(ReconcileStatus::Update),
            "작업자 미리보기 완료"
        );
        Ok(preview)
    }

    /// 행 순서대로 커밋 (행 실패는 요약에 집계)
    #[instrument(skip_all, fields(rows = rows.len(), overwrite = options.overwrite))]
    pub async fn commit(&self, rows: &[ImportRow], options: &CommitOptions) -> ImportResult<CommitSummary> {
        let config = self.config_reader.load_import_config().await?;
        let mut resolver = EntityResolver::load(&self.store).await?;
        let created_before = resolver.created().len();
        let mut summary = CommitSummary::default();

        for (idx, row) in rows.iter().enumerate() {
            if options.cancel.is_cancelled() {
                summary.cancelled += rows.len() - idx;
                warn!(remaining = rows.len() - idx, "작업자 등록 취소됨");
                break;
            }
            if !row.is_valid() {
                summary.failed += 1;
                summary.logs.push(format!(
                    "{}행: 검증 오류로 제외 ({})",
                    row.row_number,
                    row.verdict.errors.join(", ")
                ));
                continue;
            }
            let result = self
                .commit_row(row, &mut resolver, &config, options.overwrite)
                .await;
            tally_row(&mut summary, row, result);
        }

        summary.created = resolver.created()[created_before..].to_vec();
        info!(
            success = summary.success,
            failed = summary.failed,
            skipped = summary.skipped,
            "작업자 등록 완료"
        );
        Ok(summary)
    }

    async fn commit_row(
        &self,
        row: &ImportRow,
        resolver: &mut EntityResolver,
        config: &ImportConfig,
        overwrite: bool,
    ) -> ImportResult<RowOutcome> {
        let mut draft = worker_from_row(row);

        let company = match draft.company_name.clone() {
            Some(name) => Some(resolver.ensure_company(&self.store, &name, config).await?),
            None => None,
        };
        if let Some(company) = &company {
            draft.company_id = Some(company.id.clone());
            draft.company_name = Some(company.name.clone());
        }
        if let Some(name) = draft.team_name.clone() {
            let team = resolver
                .ensure_team_with_leader(
                    &self.store,
                    &name,
                    row.get(FieldKey::LeaderName),
                    company.as_ref(),
                    config,
                )
                .await?;
            draft.team_id = Some(team.id);
            draft.team_name = Some(team.name);
        }

        let Some(existing) = existing_worker(row, resolver).cloned() else {
            draft.id = self.store.create_worker(draft.clone()).await?;
            info!(worker_id = %draft.id, name = %draft.name, "작업자 생성");
            let id = draft.id.clone();
            resolver.register_worker(draft);
            return Ok(RowOutcome::Created(id));
        };

        let changes = diff_entity_fields(&existing, &draft, WORKER_COMPARE_FIELDS);
        if changes.is_empty() {
            return Ok(RowOutcome::Skipped("변경 없음".to_string()));
        }
        if !overwrite {
            return Ok(RowOutcome::Skipped(format!(
                "기존 작업자 유지 (변경 {}건, 덮어쓰기 꺼짐)",
                changes.len()
            )));
        }

        let mut fields = Map::new();
        for change in changes {
            match change.field.as_str() {
                "teamName" => {
                    fields.insert("teamId".to_string(), json!(draft.team_id));
                }
                "companyName" => {
                    fields.insert("companyId".to_string(), json!(draft.company_id));
                }
                _ => {}
            }
            fields.insert(change.field, change.new_value);
        }

        self.store
            .update_entity(EntityKind::Worker, &existing.id, fields.clone())
            .await?;
        info!(worker_id = %existing.id, fields = fields.len(), "작업자 갱신");

        let mut merged = serde_json::to_value(&existing)?;
        if let Value::Object(doc) = &mut merged {
            doc.extend(fields);
        }
        resolver.register_worker(serde_json::from_value(merged)?);
        Ok(RowOutcome::Updated(existing.id))
    }

    /// 작업자 ↔ 계정 연결 (1:1, 충돌 시 AccountConflict)
    pub async fn link_account(&self, name: &str, id_number: &str, account_id: &str) -> ImportResult<Worker> {
        let mut resolver = EntityResolver::load(&self.store).await?;
        resolver
            .link_worker_account(&self.store, name, id_number, account_id)
            .await
    }
}

#[async_trait]
impl<S, C> BatchSink for WorkerImporter<S, C>
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
