// ==========================================
// 현장 인력 관리 시스템 - 도메인 타입 정의
// ==========================================
// 책임: 일괄 등록 파이프라인 전반에서 공유하는 열거형
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 엔티티 종류 (Entity Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Worker,
    Team,
    Site,
    Company,
    DailyReportLine,
}

impl EntityKind {
    /// 저장소 테이블 이름
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Worker => "worker",
            EntityKind::Team => "team",
            EntityKind::Site => "site",
            EntityKind::Company => "company",
            EntityKind::DailyReportLine => "daily_report",
        }
    }

    /// 화면 표시용 한글 이름
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Worker => "작업자",
            EntityKind::Team => "팀",
            EntityKind::Site => "현장",
            EntityKind::Company => "회사",
            EntityKind::DailyReportLine => "일보",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ==========================================
// 급여 방식 (Salary Model)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SalaryModel {
    #[serde(rename = "일급")]
    Daily,
    #[serde(rename = "주급")]
    Weekly,
    #[serde(rename = "월급")]
    Monthly,
    #[serde(rename = "지원")]
    Support,
    #[serde(rename = "용역")]
    Service,
}

impl SalaryModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SalaryModel::Daily => "일급",
            SalaryModel::Weekly => "주급",
            SalaryModel::Monthly => "월급",
            SalaryModel::Support => "지원",
            SalaryModel::Service => "용역",
        }
    }

    /// 표기값 → SalaryModel (정확히 일치하는 경우만)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "일급" => Some(SalaryModel::Daily),
            "주급" => Some(SalaryModel::Weekly),
            "월급" => Some(SalaryModel::Monthly),
            "지원" => Some(SalaryModel::Support),
            "용역" => Some(SalaryModel::Service),
            _ => None,
        }
    }
}

impl fmt::Display for SalaryModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 팀 구분 (Team Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamType {
    #[serde(rename = "직영")]
    Direct,
    #[serde(rename = "시공")]
    Construction,
}

impl TeamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamType::Direct => "직영",
            TeamType::Construction => "시공",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let v = value.trim();
        if v.starts_with("직영") {
            Some(TeamType::Direct)
        } else if v.starts_with("시공") {
            Some(TeamType::Construction)
        } else {
            None
        }
    }
}

impl fmt::Display for TeamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 대조 상태 (Reconciliation Status)
// ==========================================
// NEW: 저장된 대상 없음 / UPDATE: 필드 차이 있음 / IDENTICAL: 차이 없음
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconcileStatus {
    New,
    Update,
    Identical,
}

impl fmt::Display for ReconcileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileStatus::New => write!(f, "NEW"),
            ReconcileStatus::Update => write!(f, "UPDATE"),
            ReconcileStatus::Identical => write!(f, "IDENTICAL"),
        }
    }
}

// ==========================================
// 참조 정책 (Reference Policy)
// ==========================================
// Strict: 미등록 참조 = 차단 오류
// Permissive: 미등록 참조 = 경고 + 커밋 시 자동 생성
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferencePolicy {
    Strict,
    Permissive,
}

impl ReferencePolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "STRICT" => Some(ReferencePolicy::Strict),
            "PERMISSIVE" => Some(ReferencePolicy::Permissive),
            _ => None,
        }
    }
}

// ==========================================
// 행 검증 메시지 수준
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueLevel {
    Error,   // 커밋 차단
    Warning, // 커밋 전 운영자 확인
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salary_model_roundtrip_labels() {
        for model in [
            SalaryModel::Daily,
            SalaryModel::Weekly,
            SalaryModel::Monthly,
            SalaryModel::Support,
            SalaryModel::Service,
        ] {
            assert_eq!(SalaryModel::parse(model.as_str()), Some(model));
        }
        assert_eq!(SalaryModel::parse("시급"), None);
    }

    #[test]
    fn test_team_type_prefix() {
        assert_eq!(TeamType::parse("직영팀"), Some(TeamType::Direct));
        assert_eq!(TeamType::parse(" 시공 "), Some(TeamType::Construction));
        assert_eq!(TeamType::parse("외주"), None);
    }

    #[test]
    fn test_reference_policy_parse() {
        assert_eq!(ReferencePolicy::parse("strict"), Some(ReferencePolicy::Strict));
        assert_eq!(
            ReferencePolicy::parse("PERMISSIVE"),
            Some(ReferencePolicy::Permissive)
        );
        assert_eq!(ReferencePolicy::parse("maybe"), None);
    }
}
