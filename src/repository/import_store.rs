// ==========================================
// 현장 인력 관리 시스템 - 일괄 등록 저장소 Trait
// ==========================================
// 책임: 일괄 등록 엔진이 소비하는 좁은 CRUD 계약 (구현 없음)
// 금지: 업무 규칙 (저장소는 문서 CRUD 만 담당)
// ==========================================

use crate::domain::daily_report::{AggregateKey, AggregatePatch, DailyReportAggregate};
use crate::domain::entity::{Company, Site, Team, Worker};
use crate::domain::types::EntityKind;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

// ==========================================
// ImportStore Trait
// ==========================================
// 구현: SqliteImportStore
#[async_trait]
pub trait ImportStore: Send + Sync {
    // ===== 전체 스냅샷 조회 =====

    async fn list_workers(&self) -> RepositoryResult<Vec<Worker>>;

    async fn list_teams(&self) -> RepositoryResult<Vec<Team>>;

    async fn list_sites(&self) -> RepositoryResult<Vec<Site>>;

    async fn list_companies(&self) -> RepositoryResult<Vec<Company>>;

    // ===== 생성 (생성된 id 반환) =====

    async fn create_worker(&self, worker: Worker) -> RepositoryResult<String>;

    async fn create_team(&self, team: Team) -> RepositoryResult<String>;

    async fn create_site(&self, site: Site) -> RepositoryResult<String>;

    async fn create_company(&self, company: Company) -> RepositoryResult<String>;

    // ===== 부분 갱신 =====

    /// 엔티티 부분 갱신
    ///
    /// # 인자
    /// - kind: 엔티티 종류
    /// - id: 엔티티 id
    /// - fields: camelCase 필드명 → 새 값
    async fn update_entity(
        &self,
        kind: EntityKind,
        id: &str,
        fields: Map<String, Value>,
    ) -> RepositoryResult<()>;

    // ===== 일보 집계 =====

    async fn get_aggregate_by_key(
        &self,
        key: &AggregateKey,
    ) -> RepositoryResult<Option<DailyReportAggregate>>;

    async fn create_aggregate(&self, aggregate: DailyReportAggregate) -> RepositoryResult<String>;

    async fn update_aggregate(&self, id: &str, patch: AggregatePatch) -> RepositoryResult<()>;
}

// ==========================================
// Arc 공유 (여러 가져오기 세션이 같은 저장소를 쓸 때)
// ==========================================
#[async_trait]
impl<T: ImportStore + ?Sized> ImportStore for Arc<T> {
    async fn list_workers(&self) -> RepositoryResult<Vec<Worker>> {
        (**self).list_workers().await
    }

    async fn list_teams(&self) -> RepositoryResult<Vec<Team>> {
        (**self).list_teams().await
    }

    async fn list_sites(&self) -> RepositoryResult<Vec<Site>> {
        (**self).list_sites().await
    }

    async fn list_companies(&self) -> RepositoryResult<Vec<Company>> {
        (**self).list_companies().await
    }

    async fn create_worker(&self, worker: Worker) -> RepositoryResult<String> {
        (**self).create_worker(worker).await
    }

    async fn create_team(&self, team: Team) -> RepositoryResult<String> {
        (**self).create_team(team).await
    }

    async fn create_site(&self, site: Site) -> RepositoryResult<String> {
        (**self).create_site(site).await
    }

    async fn create_company(&self, company: Company) -> RepositoryResult<String> {
        (**self).create_company(company).await
    }

    async fn update_entity(
        &self,
        kind: EntityKind,
        id: &str,
        fields: Map<String, Value>,
    ) -> RepositoryResult<()> {
        (**self).update_entity(kind, id, fields).await
    }

    async fn get_aggregate_by_key(
        &self,
        key: &AggregateKey,
    ) -> RepositoryResult<Option<DailyReportAggregate>> {
        (**self).get_aggregate_by_key(key).await
    }

    async fn create_aggregate(&self, aggregate: DailyReportAggregate) -> RepositoryResult<String> {
        (**self).create_aggregate(aggregate).await
    }

    async fn update_aggregate(&self, id: &str, patch: AggregatePatch) -> RepositoryResult<()> {
        (**self).update_aggregate(id, patch).await
    }
}
