// ==========================================
// 현장 인력 관리 시스템 - 행 검증기 구현
// ==========================================
// 책임: 필수값 / 형식 검증, 참조 정책 검증, 붙여넣기 내 중복 검출
// 원칙: 검증 결과는 데이터로 반환 (행을 제거하거나 오류를 던지지 않음)
// ==========================================

use crate::config::ImportConfig;
use crate::domain::field::FieldKey;
use crate::domain::import_row::{ImportRow, RowVerdict};
use crate::domain::types::{EntityKind, IssueLevel, ReferencePolicy, SalaryModel};
use crate::importer::data_cleaner::{normalize_name, normalize_worker_name, DataCleaner};
use crate::importer::entity_resolver::EntityResolver;
use crate::importer::import_pipeline_trait::{
    DataCleaner as DataCleanerTrait, RowValidator as RowValidatorTrait,
};
use crate::importer::schema::ImportSchema;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// RowIssue - 개별 검증 위반
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowIssue {
    pub row_number: usize,
    pub level: IssueLevel,
    pub field: Option<FieldKey>,
    pub message: String,
}

impl RowIssue {
    fn error(row: &ImportRow, field: FieldKey, message: String) -> Self {
        Self {
            row_number: row.row_number,
            level: IssueLevel::Error,
            field: Some(field),
            message,
        }
    }

    fn warning(row: &ImportRow, field: FieldKey, message: String) -> Self {
        Self {
            row_number: row.row_number,
            level: IssueLevel::Warning,
            field: Some(field),
            message,
        }
    }
}

/// 위반 목록 → 행 판정
pub fn verdict_from_issues(issues: Vec<RowIssue>) -> RowVerdict {
    let mut verdict = RowVerdict::default();
    for issue in issues {
        match issue.level {
            IssueLevel::Error => verdict.error(issue.message),
            IssueLevel::Warning => verdict.warn(issue.message),
        }
    }
    verdict
}

pub struct RowValidator {
    cleaner: DataCleaner,
}

impl RowValidator {
    pub fn new() -> Self {
        Self {
            cleaner: DataCleaner::default(),
        }
    }

    /// 필수 필드 누락 (`{label} 누락`)
    pub fn required_issues(&self, row: &ImportRow, schema: &ImportSchema) -> Vec<RowIssue> {
        schema
            .required_fields()
            .filter(|def| !row.has(def.key))
            .map(|def| RowIssue::error(row, def.key, format!("{} 누락", def.label)))
            .collect()
    }

    /// 값 형식 검사
    pub fn format_issues(&self, row: &ImportRow) -> Vec<RowIssue> {
        let mut issues = Vec::new();

        if let Some(date) = row.get(FieldKey::Date) {
            if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
                issues.push(RowIssue::error(
                    row,
                    FieldKey::Date,
                    format!("날짜 형식 오류: {}", date),
                ));
            }
        }

        if let Some(raw) = row.get(FieldKey::ManDay) {
            match self.cleaner.parse_man_day(raw) {
                Some(v) if v > 0.0 => {}
                _ => issues.push(RowIssue::error(
                    row,
                    FieldKey::ManDay,
                    format!("공수 형식 오류: {}", raw),
                )),
            }
        }

        if let Some(raw) = row.get(FieldKey::UnitPrice) {
            if self.cleaner.parse_amount(raw).is_none() {
                issues.push(RowIssue::warning(
                    row,
                    FieldKey::UnitPrice,
                    format!("단가 형식 오류 (무시됨): {}", raw),
                ));
            }
        }

        if let Some(raw) = row.get(FieldKey::IdNumber) {
            let digits = raw.chars().filter(|c| c.is_ascii_digit()).count();
            if digits != 13 {
                issues.push(RowIssue::warning(
                    row,
                    FieldKey::IdNumber,
                    "주민번호 자릿수 확인 필요".to_string(),
                ));
            }
        }

        for key in [FieldKey::SalaryModel, FieldKey::PayType] {
            if let Some(raw) = row.get(key) {
                if SalaryModel::parse(raw).is_none() {
                    issues.push(RowIssue::warning(
                        row,
                        key,
                        format!("알 수 없는 급여방식 (무시됨): {}", raw),
                    ));
                }
            }
        }

        issues
    }

    /// 참조 위반 목록
    pub fn reference_issues(
        &self,
        row: &ImportRow,
        schema: &ImportSchema,
        resolver: &EntityResolver,
        config: &ImportConfig,
    ) -> Vec<RowIssue> {
        let references: &[(FieldKey, EntityKind)] = match schema.kind {
            EntityKind::DailyReportLine => &[
                (FieldKey::WorkerName, EntityKind::Worker),
                (FieldKey::SiteName, EntityKind::Site),
                (FieldKey::TeamName, EntityKind::Team),
                (FieldKey::ResponsibleTeamName, EntityKind::Team),
                (FieldKey::CompanyName, EntityKind::Company),
            ],
            EntityKind::Worker => &[
                (FieldKey::TeamName, EntityKind::Team),
                (FieldKey::CompanyName, EntityKind::Company),
            ],
            EntityKind::Team => &[(FieldKey::CompanyName, EntityKind::Company)],
            _ => &[],
        };

        let mut issues = Vec::new();
        for (field, kind) in references {
            let Some(name) = row.get(*field) else {
                continue;
            };

            if resolver.resolve(name, *kind).is_some() {
                if *kind == EntityKind::Worker && resolver.is_ambiguous_worker(name) {
                    issues.push(RowIssue::warning(
                        row,
                        *field,
                        format!("동명이인 존재: {} (첫 번째 작업자로 처리)", name),
                    ));
                }
                continue;
            }

            let issue = match config.policy_for(*kind) {
                ReferencePolicy::Strict => RowIssue::error(
                    row,
                    *field,
                    format!("등록되지 않은 {}: {}", kind.label(), name),
                ),
                ReferencePolicy::Permissive => RowIssue::warning(
                    row,
                    *field,
                    format!("신규 {} 자동 생성 예정: {}", kind.label(), name),
                ),
            };
            issues.push(issue);
        }
        issues
    }
}

impl Default for RowValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl RowValidatorTrait for RowValidator {
    fn validate(&self, row: &ImportRow, schema: &ImportSchema) -> RowVerdict {
        let mut issues = self.required_issues(row, schema);
        issues.extend(self.format_issues(row));
        verdict_from_issues(issues)
    }

    fn check_references(
        &self,
        row: &ImportRow,
        schema: &ImportSchema,
        resolver: &EntityResolver,
        config: &ImportConfig,
    ) -> RowVerdict {
        verdict_from_issues(self.reference_issues(row, schema, resolver, config))
    }
}

// ==========================================
// 붙여넣기 내 중복 검출
// ==========================================

/// 같은 붙여넣기 안에서 반복된 키를 경고로 표시
///
/// 먼저 나온 행은 그대로 두고, 뒤에 나온 행에 `n행과 중복` 경고를 붙인다.
/// 작업 일보: (날짜, 현장, 팀, 작업자), 작업자: (이름, 주민번호), 팀: 팀명
pub fn find_duplicate_rows(rows: &[ImportRow], kind: EntityKind) -> Vec<RowIssue> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut issues = Vec::new();

    for row in rows.iter().filter(|r| r.is_valid()) {
        let key = match kind {
            EntityKind::DailyReportLine => format!(
                "{}|{}|{}|{}",
                row.get(FieldKey::Date).unwrap_or_default(),
                normalize_name(row.get(FieldKey::SiteName).unwrap_or_default()),
                normalize_name(row.get(FieldKey::TeamName).unwrap_or_default()),
                normalize_worker_name(row.get(FieldKey::WorkerName).unwrap_or_default()),
            ),
            EntityKind::Worker => format!(
                "{}|{}",
                normalize_worker_name(row.get(FieldKey::Name).unwrap_or_default()),
                row.get(FieldKey::IdNumber).unwrap_or_default(),
            ),
            _ => normalize_name(row.get(FieldKey::Name).unwrap_or_default()),
        };

        match seen.get(&key) {
            Some(first) => issues.push(RowIssue {
                row_number: row.row_number,
                level: IssueLevel::Warning,
                field: None,
                message: format!("{}행과 중복 (덮어쓰기 설정에 따라 처리)", first),
            }),
            None => {
                seen.insert(key, row.row_number);
            }
        }
    }
    issues
}
