// ==========================================
// 현장 인력 관리 시스템 - 일괄 등록 설정
// ==========================================
// 책임: 참조 정책, 덮어쓰기 기본값, 그룹 커밋 동시성, 자리표시 값
// ==========================================

use crate::domain::types::{EntityKind, ReferencePolicy};
use serde::{Deserialize, Serialize};

/// 일괄 등록 설정
///
/// 작업자는 신원/계좌 같은 보호 필드를 가지므로 기본값이 Strict,
/// 팀/현장/회사 같은 조직 단위는 Permissive (자동 생성) 이다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportConfig {
    pub worker_policy: ReferencePolicy,
    pub team_policy: ReferencePolicy,
    pub site_policy: ReferencePolicy,
    pub company_policy: ReferencePolicy,

    /// 기존 라인/레코드 덮어쓰기 기본값
    pub overwrite_existing: bool,

    /// 그룹 커밋 동시 실행 수 (해석 단계는 항상 순차)
    pub commit_concurrency: usize,

    /// 일괄 생성 팀의 팀장 자리표시
    pub batch_leader_placeholder: String,

    /// 알 수 없는 값 자리표시
    pub unassigned_label: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            worker_policy: ReferencePolicy::Strict,
            team_policy: ReferencePolicy::Permissive,
            site_policy: ReferencePolicy::Permissive,
            company_policy: ReferencePolicy::Permissive,
            overwrite_existing: false,
            commit_concurrency: 4,
            batch_leader_placeholder: "일괄생성".to_string(),
            unassigned_label: "미지정".to_string(),
        }
    }
}

impl ImportConfig {
    /// 엔티티 종류별 참조 정책
    pub fn policy_for(&self, kind: EntityKind) -> ReferencePolicy {
        match kind {
            EntityKind::Worker => self.worker_policy,
            EntityKind::Team => self.team_policy,
            EntityKind::Site => self.site_policy,
            EntityKind::Company => self.company_policy,
            EntityKind::DailyReportLine => ReferencePolicy::Permissive,
        }
    }

    /// 직접 입력(스마트 붙여넣기) 흐름용: 작업자도 자동 생성 허용
    pub fn permissive() -> Self {
        Self {
            worker_policy: ReferencePolicy::Permissive,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policies() {
        let config = ImportConfig::default();
        assert_eq!(config.policy_for(EntityKind::Worker), ReferencePolicy::Strict);
        assert_eq!(config.policy_for(EntityKind::Team), ReferencePolicy::Permissive);
        assert_eq!(config.policy_for(EntityKind::Site), ReferencePolicy::Permissive);
        assert!(!config.overwrite_existing);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ImportConfig =
            serde_json::from_str(r#"{"overwriteExisting": true, "workerPolicy": "PERMISSIVE"}"#)
                .unwrap();
        assert!(config.overwrite_existing);
        assert_eq!(config.worker_policy, ReferencePolicy::Permissive);
        assert_eq!(config.commit_concurrency, 4);
        assert_eq!(config.batch_leader_placeholder, "일괄생성");
    }
}
