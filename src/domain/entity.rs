// ==========================================
// 현장 인력 관리 시스템 - 기준 엔티티
// ==========================================
// 책임: 작업자 / 팀 / 현장 / 회사 문서 구조
// 주의: 소속 참조는 (id, name) 쌍으로 비정규화되어 있으며 항상 함께 갱신한다
// ==========================================

use crate::domain::types::{SalaryModel, TeamType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Worker - 작업자
// ==========================================
// 이름 + 주민번호가 실질적 식별자 (하드 키로 강제하지 않음)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Worker {
    pub id: String,
    pub name: String,
    pub id_number: Option<String>,
    pub contact: Option<String>,
    pub address: Option<String>,

    // ===== 급여 계좌 (보호 필드) =====
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub account_holder: Option<String>,

    // ===== 소속 =====
    pub role: Option<String>,
    pub team_id: Option<String>,
    pub team_name: Option<String>,
    pub site_id: Option<String>,
    pub site_name: Option<String>,
    pub company_id: Option<String>,
    pub company_name: Option<String>,

    // ===== 급여 =====
    pub unit_price: Option<i64>,
    pub salary_model: Option<SalaryModel>,
    pub team_type: Option<TeamType>,

    // 계정 연결 (1:1)
    pub linked_account_id: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ==========================================
// Team - 팀
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub leader_name: String,
    pub company_id: Option<String>,
    pub company_name: Option<String>,
    pub team_type: Option<TeamType>,
    pub contact: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ==========================================
// Site - 현장
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Site {
    pub id: String,
    pub name: String,
    pub code: String,
    pub company_id: Option<String>,
    pub company_name: Option<String>,
    pub responsible_team_id: Option<String>,
    pub responsible_team_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ==========================================
// Company - 회사
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub code: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// 세션 중 자동 생성된 엔티티 기록
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEntity {
    pub kind: crate::domain::types::EntityKind,
    pub id: String,
    pub name: String,
}
