// ==========================================
// 현장 인력 관리 시스템 - 일괄 등록 작업 단위
// ==========================================
// 책임: 파이프라인을 흐르는 임시 행 (저장되지 않음)
// ==========================================

use crate::domain::entity::CreatedEntity;
use crate::domain::field::FieldKey;
use crate::domain::types::ReconcileStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ==========================================
// RowVerdict - 행 검증 결과
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowVerdict {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Default for RowVerdict {
    fn default() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl RowVerdict {
    /// 차단 오류 추가 (행은 무효 처리되지만 목록에서 제거하지 않음)
    pub fn error(&mut self, message: impl Into<String>) {
        self.is_valid = false;
        self.errors.push(message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn merge(&mut self, other: RowVerdict) {
        self.is_valid &= other.is_valid;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

// ==========================================
// FieldChange - 필드 단위 변경분
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    pub field: String,
    pub old_value: Value,
    pub new_value: Value,
}

// ==========================================
// ImportRow - 파이프라인 작업 단위
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRow {
    /// 원본 표 기준 행 번호 (헤더 다음 행이 1)
    pub row_number: usize,
    pub cells: Vec<String>,
    pub fields: BTreeMap<FieldKey, String>,
    pub verdict: RowVerdict,
    pub status: Option<ReconcileStatus>,
    pub changes: Vec<FieldChange>,
}

impl ImportRow {
    pub fn new(row_number: usize, cells: Vec<String>, fields: BTreeMap<FieldKey, String>) -> Self {
        Self {
            row_number,
            cells,
            fields,
            verdict: RowVerdict::default(),
            status: None,
            changes: Vec::new(),
        }
    }

    /// 비어 있지 않은 필드 값
    pub fn get(&self, key: FieldKey) -> Option<&str> {
        self.fields
            .get(&key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn has(&self, key: FieldKey) -> bool {
        self.get(key).is_some()
    }

    pub fn set(&mut self, key: FieldKey, value: impl Into<String>) {
        self.fields.insert(key, value.into());
    }

    pub fn is_valid(&self) -> bool {
        self.verdict.is_valid
    }
}

// ==========================================
// CommitSummary - 커밋 결과 요약
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitSummary {
    pub success: usize,
    pub failed: usize,
    pub skipped: usize,
    /// 취소로 처리되지 않은 행 수
    pub cancelled: usize,
    pub logs: Vec<String>,
    pub created: Vec<CreatedEntity>,
}

impl CommitSummary {
    pub fn absorb(&mut self, other: CommitSummary) {
        self.success += other.success;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.cancelled += other.cancelled;
        self.logs.extend(other.logs);
        self.created.extend(other.created);
    }
}
