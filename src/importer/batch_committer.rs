// ==========================================
// 현장 인력 관리 시스템 - 일보 일괄 커밋
// ==========================================
// 책임: 검증된 일보 행 → (날짜, 현장, 팀) 그룹 → 집계 문서 쓰기
// 흐름:
// 1) 해석 단계 (순차): 회사/팀/현장/작업자 참조 해석, 필요 시 자동 생성
//    → 그룹 키별 대기 라인 수집
// 2) 커밋 단계 (그룹 간 동시): 기존 집계 조회 → 라인 병합
//    (덮어쓰기/건너뛰기) → 합계 전체 재계산 → 갱신 또는 생성
// 실패 격리: 행/그룹 단위 실패는 failed 로 집계하고 나머지는 계속 진행
// 주의: 해석 단계에서 자동 생성된 엔티티는 이후 그룹 실패와 무관하게 남는다
// ==========================================

use crate::config::ImportConfig;
use crate::domain::daily_report::{AggregateKey, AggregatePatch, DailyReportAggregate, ReportLine};
use crate::domain::entity::Worker;
use crate::domain::field::FieldKey;
use crate::domain::import_row::{CommitSummary, ImportRow};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::entity_resolver::{EntityResolver, ResolvedRef};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::import_pipeline_trait::DataCleaner as DataCleanerTrait;
use crate::importer::reconcile_differ::{find_matching_index, merge_line, report_line_from_row};
use crate::repository::ImportStore;
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

// ==========================================
// CancelFlag - 협조적 취소
// ==========================================
// 그룹 시작 전에만 확인한다 (진행 중인 그룹 쓰기는 끝까지 수행)
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct CommitOptions {
    /// 기존 라인 덮어쓰기 여부 (false 면 건너뜀)
    pub overwrite: bool,
    /// 그룹 커밋 동시 실행 수
    pub concurrency: usize,
    pub cancel: CancelFlag,
}

impl CommitOptions {
    pub fn from_config(config: &ImportConfig) -> Self {
        Self {
            overwrite: config.overwrite_existing,
            concurrency: config.commit_concurrency.max(1),
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }
}

impl Default for CommitOptions {
    fn default() -> Self {
        Self::from_config(&ImportConfig::default())
    }
}

// ==========================================
// 그룹 계획 (해석 단계 산출물)
// ==========================================

#[derive(Debug, Clone)]
struct PendingLine {
    row_number: usize,
    line: ReportLine,
}

#[derive(Debug, Clone)]
struct GroupPlan {
    key: AggregateKey,
    site: ResolvedRef,
    team: ResolvedRef,
    responsible_team: Option<ResolvedRef>,
    company: Option<ResolvedRef>,
    lines: Vec<PendingLine>,
}

impl GroupPlan {
    fn worker_names(&self) -> String {
        self.lines
            .iter()
            .map(|p| p.line.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn new_aggregate(&self) -> DailyReportAggregate {
        DailyReportAggregate {
            date: self.key.date.clone(),
            site_id: self.site.id.clone(),
            site_name: self.site.name.clone(),
            team_id: self.team.id.clone(),
            team_name: self.team.name.clone(),
            responsible_team_id: self.responsible_team.as_ref().map(|t| t.id.clone()),
            responsible_team_name: self.responsible_team.as_ref().map(|t| t.name.clone()),
            company_id: self.company.as_ref().map(|c| c.id.clone()),
            company_name: self.company.as_ref().map(|c| c.name.clone()),
            ..Default::default()
        }
    }
}

/// 라인 병합 결과
#[derive(Debug, Default, PartialEq)]
struct MergeOutcome {
    applied: usize,
    skipped: usize,
    skipped_rows: Vec<usize>,
}

/// 대기 라인을 집계 라인 목록에 병합
///
/// 같은 작업자 라인이 이미 있으면 (저장된 라인이든 같은 붙여넣기의 앞 행이든)
/// overwrite 일 때만 덮어쓰고, 아니면 건너뛴다. 없으면 추가한다.
fn merge_pending(
    aggregate: &mut DailyReportAggregate,
    pending: &[PendingLine],
    overwrite: bool,
) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    for item in pending {
        match find_matching_index(&item.line, &aggregate.lines) {
            Some(idx) if overwrite => {
                aggregate.lines[idx] = merge_line(&aggregate.lines[idx], &item.line);
                outcome.applied += 1;
            }
            Some(_) => {
                outcome.skipped += 1;
                outcome.skipped_rows.push(item.row_number);
            }
            None => {
                aggregate.lines.push(item.line.clone());
                outcome.applied += 1;
            }
        }
    }

    aggregate.recompute_totals();
    outcome
}

// ==========================================
// BatchCommitter
// ==========================================
pub struct BatchCommitter<'a, S: ImportStore + ?Sized> {
    store: &'a S,
    config: &'a ImportConfig,
}

impl<'a, S: ImportStore + ?Sized> BatchCommitter<'a, S> {
    pub fn new(store: &'a S, config: &'a ImportConfig) -> Self {
        Self { store, config }
    }

    /// 일보 행 일괄 커밋 (행 단위 실패로 전체를 중단하지 않음)
    ///
    /// # 인자
    /// - rows: 정제/검증된 행 (무효 행은 failed 로 집계되고 쓰지 않음)
    /// - resolver: 세션 해석기 (자동 생성 엔티티가 캐시에 반영됨)
    /// - options: 덮어쓰기 / 동시성 / 취소
    ///
    /// # 반환
    /// 성공/실패/건너뜀/취소 건수와 실패 로그, 자동 생성 엔티티 목록
    #[instrument(skip_all, fields(rows = rows.len(), overwrite = options.overwrite))]
    pub async fn commit(
        &self,
        rows: &[ImportRow],
        resolver: &mut EntityResolver,
        options: &CommitOptions,
    ) -> CommitSummary {
        let created_before = resolver.created().len();
        let mut summary = CommitSummary::default();

        // ===== 1) 해석 + 그룹화 (순차) =====
        let mut groups: BTreeMap<AggregateKey, GroupPlan> = BTreeMap::new();
        for (idx, row) in rows.iter().enumerate() {
            if options.cancel.is_cancelled() {
                summary.cancelled += rows.len() - idx;
                warn!(remaining = rows.len() - idx, "해석 단계에서 취소됨");
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

            if let Err(e) = self.plan_row(row, resolver, &mut groups).await {
                let name = row.get(FieldKey::WorkerName).unwrap_or_default();
                warn!(row = row.row_number, worker = %name, error = %e, "행 해석 실패");
                summary.failed += 1;
                summary
                    .logs
                    .push(format!("{}행 {}: {}", row.row_number, name, e));
            }
        }

        // ===== 2) 그룹 커밋 (그룹 간 동시) =====
        info!(groups = groups.len(), "그룹 커밋 시작");
        let results: Vec<CommitSummary> = stream::iter(groups.into_values())
            .map(|plan| self.commit_group(plan, options))
            .buffer_unordered(options.concurrency.max(1))
            .collect()
            .await;
        for result in results {
            summary.absorb(result);
        }

        summary.created = resolver.created()[created_before..].to_vec();
        info!(
            success = summary.success,
            failed = summary.failed,
            skipped = summary.skipped,
            cancelled = summary.cancelled,
            created = summary.created.len(),
            "일괄 커밋 완료"
        );
        summary
    }

    /// 한 행의 참조를 해석하고 그룹 계획에 라인을 추가
    async fn plan_row(
        &self,
        row: &ImportRow,
        resolver: &mut EntityResolver,
        groups: &mut BTreeMap<AggregateKey, GroupPlan>,
    ) -> ImportResult<()> {
        let required = |key: FieldKey| {
            row.get(key)
                .map(str::to_string)
                .ok_or_else(|| ImportError::MissingField(key.to_string()))
        };
        let date = required(FieldKey::Date)?;
        let site_name = required(FieldKey::SiteName)?;
        let team_name = required(FieldKey::TeamName)?;
        let worker_name = required(FieldKey::WorkerName)?;

        let company = match row.get(FieldKey::CompanyName) {
            Some(name) => Some(resolver.ensure_company(self.store, name, self.config).await?),
            None => None,
        };
        let team = resolver
            .ensure_team(self.store, &team_name, company.as_ref(), self.config)
            .await?;
        let responsible_team = match row.get(FieldKey::ResponsibleTeamName) {
            Some(name) => Some(
                resolver
                    .ensure_team(self.store, name, company.as_ref(), self.config)
                    .await?,
            ),
            None => None,
        };
        let site = resolver
            .ensure_site(
                self.store,
                &site_name,
                company.as_ref(),
                responsible_team.as_ref(),
                self.config,
            )
            .await?;

        let cleaner = DataCleaner::default();
        let draft = Worker {
            name: worker_name,
            role: row.get(FieldKey::Role).map(str::to_string),
            team_id: Some(team.id.clone()),
            team_name: Some(team.name.clone()),
            site_id: Some(site.id.clone()),
            site_name: Some(site.name.clone()),
            company_id: company.as_ref().map(|c| c.id.clone()),
            company_name: company.as_ref().map(|c| c.name.clone()),
            unit_price: row.get(FieldKey::UnitPrice).and_then(|v| cleaner.parse_amount(v)),
            ..Default::default()
        };
        let worker = resolver.ensure_worker(self.store, draft, self.config).await?;

        let key = AggregateKey::new(&date, &site.id, &team.id);
        let line = report_line_from_row(row, &worker);
        groups
            .entry(key.clone())
            .or_insert_with(|| GroupPlan {
                key,
                site,
                team,
                responsible_team,
                company,
                lines: Vec::new(),
            })
            .lines
            .push(PendingLine {
                row_number: row.row_number,
                line,
            });
        Ok(())
    }

    /// 그룹 1건 커밋 (실패는 요약으로 변환)
    async fn commit_group(&self, plan: GroupPlan, options: &CommitOptions) -> CommitSummary {
        let mut summary = CommitSummary::default();
        if options.cancel.is_cancelled() {
            summary.cancelled = plan.lines.len();
            return summary;
        }

        let existing = match self.store.get_aggregate_by_key(&plan.key).await {
            Ok(existing) => existing,
            Err(e) => {
                error!(key = %plan.key, workers = %plan.worker_names(), error = %e, "집계 조회 실패");
                summary.failed = plan.lines.len();
                summary.logs.push(format!(
                    "{} ({}) 조회 실패: {}",
                    plan.key,
                    plan.worker_names(),
                    e
                ));
                return summary;
            }
        };

        let is_update = existing.is_some();
        let mut aggregate = existing.unwrap_or_else(|| plan.new_aggregate());
        let outcome = merge_pending(&mut aggregate, &plan.lines, options.overwrite);
        summary.skipped = outcome.skipped;
        for row_number in &outcome.skipped_rows {
            summary
                .logs
                .push(format!("{}행: 기존 라인 유지 (덮어쓰기 꺼짐)", row_number));
        }
        if outcome.applied == 0 {
            return summary;
        }

        let persisted = if is_update {
            self.store
                .update_aggregate(&aggregate.id, AggregatePatch::from(&aggregate))
                .await
        } else {
            self.store.create_aggregate(aggregate).await.map(|_| ())
        };

        match persisted {
            Ok(()) => {
                info!(key = %plan.key, applied = outcome.applied, update = is_update, "그룹 커밋 완료");
                summary.success = outcome.applied;
            }
            Err(e) => {
                error!(key = %plan.key, workers = %plan.worker_names(), error = %e, "그룹 커밋 실패");
                summary.failed = outcome.applied;
                summary.logs.push(format!(
                    "{} ({}) 저장 실패: {}",
                    plan.key,
                    plan.worker_names(),
                    e
                ));
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(row_number: usize, worker_id: &str, man_day: f64) -> PendingLine {
        PendingLine {
            row_number,
            line: ReportLine {
                worker_id: worker_id.to_string(),
                name: worker_id.to_string(),
                man_day,
                unit_price: Some(100_000),
                ..Default::default()
            },
        }
    }

    fn stored(lines: &[(&str, f64)]) -> DailyReportAggregate {
        let mut aggregate = DailyReportAggregate {
            id: "R1".to_string(),
            lines: lines
                .iter()
                .map(|(id, md)| ReportLine {
                    worker_id: id.to_string(),
                    name: id.to_string(),
                    man_day: *md,
                    unit_price: Some(100_000),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };
        aggregate.recompute_totals();
        aggregate
    }

    #[test]
    fn test_overwrite_recomputes_totals() {
        let mut aggregate = stored(&[("W1", 1.5), ("W2", 1.0), ("W3", 1.0)]);
        assert_eq!(aggregate.total_man_day, 3.5);

        let outcome = merge_pending(&mut aggregate, &[pending(1, "W1", 1.0)], true);

        assert_eq!(outcome.applied, 1);
        assert_eq!(aggregate.total_man_day, 3.0);
        assert_eq!(aggregate.total_amount, 300_000);
    }

    #[test]
    fn test_no_overwrite_skips_existing() {
        let mut aggregate = stored(&[("W1", 1.5)]);

        let outcome = merge_pending(
            &mut aggregate,
            &[pending(1, "W1", 1.0), pending(2, "W2", 1.0)],
            false,
        );

        assert_eq!(outcome.applied, 1);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.skipped_rows, vec![1]);
        assert_eq!(aggregate.find_line("W1").map(|l| l.man_day), Some(1.5));
        assert_eq!(aggregate.total_man_day, 2.5);
    }

    #[test]
    fn test_same_name_workers_keep_separate_lines() {
        let mut aggregate = stored(&[]);
        aggregate.lines.push(ReportLine {
            worker_id: "W1".to_string(),
            name: "김철수".to_string(),
            man_day: 1.0,
            unit_price: Some(100_000),
            ..Default::default()
        });
        let mut other = pending(1, "W2", 0.5);
        other.line.name = "김철수".to_string();

        let outcome = merge_pending(&mut aggregate, &[other], true);

        assert_eq!((outcome.applied, outcome.skipped), (1, 0));
        assert_eq!(aggregate.lines.len(), 2);
        assert_eq!(aggregate.find_line("W1").map(|l| l.man_day), Some(1.0));
        assert_eq!(aggregate.find_line("W2").map(|l| l.man_day), Some(0.5));
        assert_eq!(aggregate.total_man_day, 1.5);
    }

    #[test]
    fn test_same_paste_duplicate_follows_overwrite() {
        let rows = [pending(1, "W1", 1.0), pending(2, "W1", 0.5)];

        let mut kept = stored(&[]);
        let outcome = merge_pending(&mut kept, &rows, false);
        assert_eq!((outcome.applied, outcome.skipped), (1, 1));
        assert_eq!(kept.total_man_day, 1.0);

        let mut replaced = stored(&[]);
        let outcome = merge_pending(&mut replaced, &rows, true);
        assert_eq!((outcome.applied, outcome.skipped), (2, 0));
        assert_eq!(replaced.lines.len(), 1);
        assert_eq!(replaced.total_man_day, 0.5);
    }

    #[test]
    fn test_cancel_flag_shared_between_clones() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        clone.cancel();
        assert!(flag.is_cancelled());
    }
}
