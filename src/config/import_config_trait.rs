// ==========================================
// 현장 인력 관리 시스템 - 일괄 등록 설정 읽기 Trait
// ==========================================
// 책임: 일괄 등록 모듈이 필요로 하는 설정 읽기 인터페이스 (구현 없음)
// 금지: 설정 쓰기, 업무 로직
// ==========================================

use crate::config::import_config::ImportConfig;
use crate::domain::types::ReferencePolicy;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 구현: ConfigManager (config_kv 테이블)
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 작업자 참조 정책 (기본값: STRICT)
    async fn get_worker_policy(&self) -> RepositoryResult<ReferencePolicy>;

    /// 팀 참조 정책 (기본값: PERMISSIVE)
    async fn get_team_policy(&self) -> RepositoryResult<ReferencePolicy>;

    /// 현장 참조 정책 (기본값: PERMISSIVE)
    async fn get_site_policy(&self) -> RepositoryResult<ReferencePolicy>;

    /// 회사 참조 정책 (기본값: PERMISSIVE)
    async fn get_company_policy(&self) -> RepositoryResult<ReferencePolicy>;

    /// 기존 라인 덮어쓰기 기본값 (기본값: false)
    async fn get_overwrite_existing(&self) -> RepositoryResult<bool>;

    /// 그룹 커밋 동시 실행 수 (기본값: 4, 최소 1)
    async fn get_commit_concurrency(&self) -> RepositoryResult<usize>;

    /// 일괄 생성 팀장 자리표시 (기본값: 일괄생성)
    async fn get_batch_leader_placeholder(&self) -> RepositoryResult<String>;

    /// 전체 설정 스냅샷
    async fn load_import_config(&self) -> RepositoryResult<ImportConfig> {
        let defaults = ImportConfig::default();
        Ok(ImportConfig {
            worker_policy: self.get_worker_policy().await?,
            team_policy: self.get_team_policy().await?,
            site_policy: self.get_site_policy().await?,
            company_policy: self.get_company_policy().await?,
            overwrite_existing: self.get_overwrite_existing().await?,
            commit_concurrency: self.get_commit_concurrency().await?,
            batch_leader_placeholder: self.get_batch_leader_placeholder().await?,
            unassigned_label: defaults.unassigned_label,
        })
    }
}

// ==========================================
// 고정 설정 (테스트 / 직접 입력 흐름)
// ==========================================
#[async_trait]
impl ImportConfigReader for ImportConfig {
    async fn get_worker_policy(&self) -> RepositoryResult<ReferencePolicy> {
        Ok(self.worker_policy)
    }

    async fn get_team_policy(&self) -> RepositoryResult<ReferencePolicy> {
        Ok(self.team_policy)
    }

    async fn get_site_policy(&self) -> RepositoryResult<ReferencePolicy> {
        Ok(self.site_policy)
    }

    async fn get_company_policy(&self) -> RepositoryResult<ReferencePolicy> {
        Ok(self.company_policy)
    }

    async fn get_overwrite_existing(&self) -> RepositoryResult<bool> {
        Ok(self.overwrite_existing)
    }

    async fn get_commit_concurrency(&self) -> RepositoryResult<usize> {
        Ok(self.commit_concurrency.max(1))
    }

    async fn get_batch_leader_placeholder(&self) -> RepositoryResult<String> {
        Ok(self.batch_leader_placeholder.clone())
    }

    async fn load_import_config(&self) -> RepositoryResult<ImportConfig> {
        Ok(self.clone())
    }
}
