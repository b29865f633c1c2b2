// ==========================================
// 현장 인력 관리 시스템 - 대조기 구현
// ==========================================
// 책임: 신규 일보 라인 vs 저장된 집계 라인 → NEW / UPDATE / IDENTICAL
// 비교 필드: manDay, role, workContent, payType, unitPrice
// 비교 규칙: loose_equals (문자열화 + TRIM, 숫자 표기 차이 무시)
// 주의: 신규 라인에 값이 없는 선택 필드는 비교하지 않는다
//       (붙여넣기에 없는 열은 "변경 없음" 으로 본다)
// ==========================================

use crate::domain::daily_report::ReportLine;
use crate::domain::field::FieldKey;
use crate::domain::import_row::{FieldChange, ImportRow};
use crate::domain::types::{ReconcileStatus, SalaryModel};
use crate::importer::data_cleaner::{loose_equals, loose_string, normalize_worker_name, DataCleaner};
use crate::importer::entity_resolver::ResolvedRef;
use crate::importer::import_pipeline_trait::{
    DataCleaner as DataCleanerTrait, LineDiffer as LineDifferTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// 공수 열이 없을 때의 기본값
pub const DEFAULT_MAN_DAY: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffOutcome {
    pub status: ReconcileStatus,
    pub changes: Vec<FieldChange>,
}

impl DiffOutcome {
    pub fn new_line() -> Self {
        Self {
            status: ReconcileStatus::New,
            changes: Vec::new(),
        }
    }
}

/// 같은 작업자 라인 위치
///
/// workerId 가 양쪽에 모두 있으면 workerId 로만 비교한다 (동명이인 보호).
/// 한쪽이라도 비어 있을 때만 정규화 이름으로 맞춘다.
pub fn find_matching_index(new_line: &ReportLine, existing_lines: &[ReportLine]) -> Option<usize> {
    if !new_line.worker_id.is_empty() {
        if let Some(idx) = existing_lines
            .iter()
            .position(|l| l.worker_id == new_line.worker_id)
        {
            return Some(idx);
        }
    }
    let wanted = normalize_worker_name(&new_line.name);
    existing_lines.iter().position(|l| {
        (new_line.worker_id.is_empty() || l.worker_id.is_empty())
            && normalize_worker_name(&l.name) == wanted
    })
}

pub fn find_matching_line<'a>(
    new_line: &ReportLine,
    existing_lines: &'a [ReportLine],
) -> Option<&'a ReportLine> {
    find_matching_index(new_line, existing_lines).map(|idx| &existing_lines[idx])
}

/// 신규 라인 값을 기존 라인에 덮어쓴 결과 (신규 쪽에 없는 선택 필드는 기존 값 유지)
pub fn merge_line(existing: &ReportLine, new_line: &ReportLine) -> ReportLine {
    ReportLine {
        worker_id: if new_line.worker_id.is_empty() {
            existing.worker_id.clone()
        } else {
            new_line.worker_id.clone()
        },
        name: new_line.name.clone(),
        role: new_line.role.clone().or_else(|| existing.role.clone()),
        man_day: new_line.man_day,
        work_content: new_line
            .work_content
            .clone()
            .or_else(|| existing.work_content.clone()),
        unit_price: new_line.unit_price.or(existing.unit_price),
        pay_type: new_line.pay_type.or(existing.pay_type),
    }
}

/// 정제된 행 → 일보 라인
///
/// 작업자 참조는 이미 해석된 상태여야 한다.
pub fn report_line_from_row(row: &ImportRow, worker: &ResolvedRef) -> ReportLine {
    let cleaner = DataCleaner::default();
    let pay_type = row
        .get(FieldKey::PayType)
        .and_then(SalaryModel::parse)
        .or_else(|| row.get(FieldKey::SalaryModel).and_then(SalaryModel::parse));

    ReportLine {
        worker_id: worker.id.clone(),
        name: worker.name.clone(),
        role: row.get(FieldKey::Role).map(str::to_string),
        man_day: row
            .get(FieldKey::ManDay)
            .and_then(|v| cleaner.parse_man_day(v))
            .unwrap_or(DEFAULT_MAN_DAY),
        work_content: row.get(FieldKey::Content).map(str::to_string),
        unit_price: row
            .get(FieldKey::UnitPrice)
            .and_then(|v| cleaner.parse_amount(v)),
        pay_type,
    }
}

fn opt_json<T: Serialize>(value: &Option<T>) -> Value {
    value
        .as_ref()
        .and_then(|v| serde_json::to_value(v).ok())
        .unwrap_or(Value::Null)
}

/// 엔티티 문서 필드 비교
///
/// incoming 쪽에 값이 있는 필드만 비교한다 (camelCase 필드명).
pub fn diff_entity_fields<T: Serialize>(
    existing: &T,
    incoming: &T,
    fields: &[&str],
) -> Vec<FieldChange> {
    let (Ok(Value::Object(old)), Ok(Value::Object(new))) =
        (serde_json::to_value(existing), serde_json::to_value(incoming))
    else {
        return Vec::new();
    };

    fields
        .iter()
        .filter_map(|field| {
            let new_value = new.get(*field).cloned().unwrap_or(Value::Null);
            if loose_string(&new_value).is_empty() {
                return None;
            }
            let old_value = old.get(*field).cloned().unwrap_or(Value::Null);
            (!loose_equals(&old_value, &new_value)).then(|| FieldChange {
                field: field.to_string(),
                old_value,
                new_value,
            })
        })
        .collect()
}

pub struct ReconcileDiffer;

impl ReconcileDiffer {
    /// 필드 단위 변경분 계산
    pub fn field_changes(&self, existing: &ReportLine, new_line: &ReportLine) -> Vec<FieldChange> {
        let mut pairs: Vec<(&str, Value, Value)> =
            vec![("manDay", json!(existing.man_day), json!(new_line.man_day))];
        if new_line.role.is_some() {
            pairs.push(("role", opt_json(&existing.role), opt_json(&new_line.role)));
        }
        if new_line.work_content.is_some() {
            pairs.push((
                "workContent",
                opt_json(&existing.work_content),
                opt_json(&new_line.work_content),
            ));
        }
        if new_line.pay_type.is_some() {
            pairs.push((
                "payType",
                opt_json(&existing.pay_type),
                opt_json(&new_line.pay_type),
            ));
        }
        if new_line.unit_price.is_some() {
            pairs.push((
                "unitPrice",
                opt_json(&existing.unit_price),
                opt_json(&new_line.unit_price),
            ));
        }

        pairs
            .into_iter()
            .filter(|(_, old, new)| !loose_equals(old, new))
            .map(|(field, old_value, new_value)| FieldChange {
                field: field.to_string(),
                old_value,
                new_value,
            })
            .collect()
    }
}

impl LineDifferTrait for ReconcileDiffer {
    fn diff(&self, new_line: &ReportLine, existing_lines: &[ReportLine]) -> DiffOutcome {
        let Some(existing) = find_matching_line(new_line, existing_lines) else {
            return DiffOutcome::new_line();
        };

        let changes = self.field_changes(existing, new_line);
        let status = if changes.is_empty() {
            ReconcileStatus::Identical
        } else {
            ReconcileStatus::Update
        };
        DiffOutcome { status, changes }
    }
}
