// ==========================================
// 현장 인력 관리 시스템 - 표준 필드 키
// ==========================================
// 책임: 헤더 추론의 목표가 되는 언어 독립적 필드 키
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 표준 필드 키
///
/// 작업자 / 팀 / 일보 라인 필드의 합집합.
/// 직렬화 이름은 camelCase 키 (`idNumber`, `manDay` 등).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKey {
    // ===== 작업자 =====
    Name,
    IdNumber,
    Contact,
    Address,
    BankName,
    AccountNumber,
    AccountHolder,
    Role,
    TeamName,
    CompanyName,
    LeaderName,
    UnitPrice,
    SalaryModel,
    TeamType,
    Category,

    // ===== 일보 라인 =====
    Date,
    SiteName,
    WorkerName,
    ManDay,
    ResponsibleTeamName,
    PayType,
    Content,
}

impl FieldKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKey::Name => "name",
            FieldKey::IdNumber => "idNumber",
            FieldKey::Contact => "contact",
            FieldKey::Address => "address",
            FieldKey::BankName => "bankName",
            FieldKey::AccountNumber => "accountNumber",
            FieldKey::AccountHolder => "accountHolder",
            FieldKey::Role => "role",
            FieldKey::TeamName => "teamName",
            FieldKey::CompanyName => "companyName",
            FieldKey::LeaderName => "leaderName",
            FieldKey::UnitPrice => "unitPrice",
            FieldKey::SalaryModel => "salaryModel",
            FieldKey::TeamType => "teamType",
            FieldKey::Category => "category",
            FieldKey::Date => "date",
            FieldKey::SiteName => "siteName",
            FieldKey::WorkerName => "workerName",
            FieldKey::ManDay => "manDay",
            FieldKey::ResponsibleTeamName => "responsibleTeamName",
            FieldKey::PayType => "payType",
            FieldKey::Content => "content",
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
