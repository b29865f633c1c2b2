// ==========================================
// 현장 인력 관리 시스템 - 팀 일괄 등록
// ==========================================
// 책임: 팀 목록 붙여넣기 세션 (미리보기 → 커밋)
// 규칙: 팀은 정규화 이름으로 식별, 팀장 미입력 시 `미지정`
// ==========================================

use crate::config::{ImportConfig, ImportConfigReader};
use crate::domain::entity::Team;
use crate::domain::field::FieldKey;
use crate::domain::import_row::{CommitSummary, ImportRow};
use crate::domain::types::{EntityKind, ReconcileStatus, TeamType};
use crate::importer::batch_committer::CommitOptions;
use crate::importer::entity_resolver::EntityResolver;
use crate::importer::error::ImportResult;
use crate::importer::import_session::{tally_row, ImportPipeline, ImportPreview, RowOutcome};
use crate::importer::reconcile_differ::diff_entity_fields;
use crate::importer::schema::ImportSchema;
use crate::importer::smart_paste::BatchSink;
use crate::repository::ImportStore;
use async_trait::async_trait;
use serde_json::{json, Map};
use tracing::{info, instrument, warn};

pub const TEAM_COMPARE_FIELDS: &[&str] = &["leaderName", "companyName", "teamType", "contact"];

pub fn team_from_row(row: &ImportRow) -> Team {
    Team {
        name: row.get(FieldKey::Name).unwrap_or_default().to_string(),
        leader_name: row.get(FieldKey::LeaderName).unwrap_or_default().to_string(),
        company_name: row.get(FieldKey::CompanyName).map(str::to_string),
        team_type: row.get(FieldKey::TeamType).and_then(TeamType::parse),
        contact: row.get(FieldKey::Contact).map(str::to_string),
        ..Default::default()
    }
}

pub struct TeamImporter<S, C>
where
    S: ImportStore,
    C: ImportConfigReader,
{
    store: S,
    config_reader: C,
    pipeline: ImportPipeline,
    schema: ImportSchema,
}

impl<S, C> TeamImporter<S, C>
where
    S: ImportStore,
    C: ImportConfigReader,
{
    pub fn new(store: S, config_reader: C) -> Self {
        Self {
            store,
            config_reader,
            pipeline: ImportPipeline::standard(),
            schema: ImportSchema::team(),
        }
    }

    pub fn with_schema(mut self, schema: ImportSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    #[instrument(skip_all)]
    pub async fn preview(&self, text: &str) -> ImportResult<ImportPreview> {
        let config = self.config_reader.load_import_config().await?;
        let resolver = EntityResolver::load(&self.store).await?;

        let mut preview = self.pipeline.prepare(text, &self.schema)?;
        self.pipeline
            .check_references(&mut preview, &self.schema, &resolver, &config);

        for row in preview.rows.iter_mut().filter(|r| r.is_valid()) {
            let mut draft = team_from_row(row);
            if let Some(company) = draft.company_name.as_deref().and_then(|n| resolver.company(n)) {
                draft.company_name = Some(company.name.clone());
            }
            let existing = row.get(FieldKey::Name).and_then(|n| resolver.team(n));
            let (status, changes) = match existing {
                None => (ReconcileStatus::New, Vec::new()),
                Some(existing) => {
                    let changes = diff_entity_fields(existing, &draft, TEAM_COMPARE_FIELDS);
                    let status = if changes.is_empty() {
                        ReconcileStatus::Identical
                    } else {
                        ReconcileStatus::Update
                    };
                    (status, changes)
                }
            };
            row.status = Some(status);
            row.changes = changes;
        }
        Ok(preview)
    }

    #[instrument(skip_all, fields(rows = rows.len(), overwrite = options.overwrite))]
    pub async fn commit(&self, rows: &[ImportRow], options: &CommitOptions) -> ImportResult<CommitSummary> {
        let config = self.config_reader.load_import_config().await?;
        let mut resolver = EntityResolver::load(&self.store).await?;
        let created_before = resolver.created().len();
        let mut summary = CommitSummary::default();

        for (idx, row) in rows.iter().enumerate() {
            if options.cancel.is_cancelled() {
                summary.cancelled += rows.len() - idx;
                warn!(remaining = rows.len() - idx, "팀 등록 취소됨");
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
            "팀 등록 완료"
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
        let mut draft = team_from_row(row);
        if let Some(name) = draft.company_name.clone() {
            let company = resolver.ensure_company(&self.store, &name, config).await?;
            draft.company_id = Some(company.id);
            draft.company_name = Some(company.name);
        }

        let Some(existing) = resolver.team(&draft.name).cloned() else {
            if draft.leader_name.is_empty() {
                draft.leader_name = config.unassigned_label.clone();
            }
            draft.id = self.store.create_team(draft.clone()).await?;
            info!(team_id = %draft.id, name = %draft.name, "팀 생성");
            let id = draft.id.clone();
            resolver.register_team(draft);
            return Ok(RowOutcome::Created(id));
        };

        let changes = diff_entity_fields(&existing, &draft, TEAM_COMPARE_FIELDS);
        if changes.is_empty() {
            return Ok(RowOutcome::Skipped("변경 없음".to_string()));
        }
        if !overwrite {
            return Ok(RowOutcome::Skipped(format!(
                "기존 팀 유지 (변경 {}건, 덮어쓰기 꺼짐)",
                changes.len()
            )));
        }

        let mut fields = Map::new();
        let mut updated = existing.clone();
        for change in changes {
            match change.field.as_str() {
                "leaderName" => updated.leader_name = draft.leader_name.clone(),
                "companyName" => {
                    fields.insert("companyId".to_string(), json!(draft.company_id));
                    updated.company_id = draft.company_id.clone();
                    updated.company_name = draft.company_name.clone();
                }
                "teamType" => updated.team_type = draft.team_type,
                "contact" => updated.contact = draft.contact.clone(),
                _ => {}
            }
            fields.insert(change.field, change.new_value);
        }

        self.store
            .update_entity(EntityKind::Team, &existing.id, fields)
            .await?;
        info!(team_id = %existing.id, "팀 갱신");
        resolver.register_team(updated);
        Ok(RowOutcome::Updated(existing.id))
    }
}

#[async_trait]
impl<S, C> BatchSink for TeamImporter<S, C>
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
