// ==========================================
// 현장 인력 관리 시스템 - 데이터 정제기 구현
// ==========================================
// 책임: 공백/유니코드 정규화, 숫자·날짜·주민번호 정제,
//       자유 텍스트(구분 열) 키워드 추론, 느슨한 값 비교
// ==========================================

use crate::domain::field::FieldKey;
use crate::domain::import_row::ImportRow;
use crate::importer::import_pipeline_trait::DataCleaner as DataCleanerTrait;
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref PAREN_RE: Regex = Regex::new(r"\([^)]*\)").unwrap();
}

// ==========================================
// 정규화 함수 (순수 함수)
// ==========================================

/// 헤더 정규화: NFKC + 모든 공백 제거 + 소문자
pub fn normalize_header(value: &str) -> String {
    value
        .nfkc()
        .filter(|c| !c.is_whitespace())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// 이름 정규화: NFKC + 모든 공백 제거
pub fn normalize_name(value: &str) -> String {
    value.nfkc().filter(|c| !c.is_whitespace()).collect()
}

/// 작업자 이름 정규화: 괄호 접미사 제거 후 이름 정규화
///
/// `홍길동(A)`, `홍길동 (반장)` → `홍길동`
pub fn normalize_worker_name(value: &str) -> String {
    let nfkc: String = value.nfkc().collect();
    normalize_name(&PAREN_RE.replace_all(&nfkc, ""))
}

/// 비교용 문자열화
///
/// 정수값인 숫자는 소수점 없이 표기해 `1` / `1.0` / `"1"` 이 같은 문자열이 된다.
pub fn loose_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            Some(f) => format!("{}", f),
            None => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// 느슨한 값 비교: 문자열화 + trim 후 비교, 양쪽 모두 숫자로 읽히면 수치 비교
pub fn loose_equals(a: &Value, b: &Value) -> bool {
    let left = loose_string(a);
    let right = loose_string(b);
    if left == right {
        return true;
    }
    match (left.parse::<f64>(), right.parse::<f64>()) {
        (Ok(x), Ok(y)) => x == y,
        _ => false,
    }
}

// ==========================================
// 키워드 추론 규칙
// ==========================================
// 구분/비고 같은 자유 텍스트 열에서 구조화 필드를 채운다.
// 대상 필드가 이미 채워져 있으면 적용하지 않는다 (명시 열 우선).
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceRule {
    pub keywords: Vec<String>,
    pub target: FieldKey,
    pub value: String,
}

impl InferenceRule {
    pub fn new(keywords: &[&str], target: FieldKey, value: &str) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            target,
            value: value.to_string(),
        }
    }
}

/// 기본 규칙표 (평가 순서 = 우선순위)
pub fn default_inference_rules() -> Vec<InferenceRule> {
    vec![
        InferenceRule::new(&["일급", "일당"], FieldKey::SalaryModel, "일급"),
        InferenceRule::new(&["주급"], FieldKey::SalaryModel, "주급"),
        InferenceRule::new(&["월급"], FieldKey::SalaryModel, "월급"),
        InferenceRule::new(&["지원"], FieldKey::SalaryModel, "지원"),
        InferenceRule::new(&["용역"], FieldKey::SalaryModel, "용역"),
        InferenceRule::new(&["직영"], FieldKey::TeamType, "직영"),
        InferenceRule::new(&["시공"], FieldKey::TeamType, "시공"),
    ]
}

/// 규칙표를 행에 적용, 적용된 (필드, 값) 목록 반환
pub fn apply_inference_rules(
    row: &mut ImportRow,
    source: FieldKey,
    rules: &[InferenceRule],
) -> Vec<(FieldKey, String)> {
    let text = match row.get(source) {
        Some(t) => t.to_string(),
        None => return Vec::new(),
    };

    let mut applied = Vec::new();
    for rule in rules {
        if row.has(rule.target) {
            continue;
        }
        if rule.keywords.iter().any(|k| text.contains(k.as_str())) {
            row.set(rule.target, rule.value.clone());
            applied.push((rule.target, rule.value.clone()));
        }
    }
    applied
}

// ==========================================
// DataCleaner 구현
// ==========================================
pub struct DataCleaner {
    rules: Vec<InferenceRule>,
}

impl DataCleaner {
    pub fn new(rules: Vec<InferenceRule>) -> Self {
        Self { rules }
    }
}

impl Default for DataCleaner {
    fn default() -> Self {
        Self::new(default_inference_rules())
    }
}

impl DataCleanerTrait for DataCleaner {
    fn clean_text(&self, value: &str) -> String {
        value.nfkc().collect::<String>().trim().to_string()
    }

    fn normalize_null(&self, value: Option<String>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() || trimmed == "-" {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    fn parse_amount(&self, value: &str) -> Option<i64> {
        let cleaned: String = value
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ',' && *c != '원' && *c != '₩')
            .collect();
        cleaned
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| v.round() as i64)
    }

    fn parse_man_day(&self, value: &str) -> Option<f64> {
        let cleaned: String = value
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .trim_end_matches("공수")
            .to_string();
        cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    fn normalize_date(&self, value: &str) -> Option<String> {
        let unified: String = value
            .trim()
            .replace(['.', '/'], "-")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let unified = unified.trim_end_matches('-');

        // 두 자리 연도 (24.03.05)
        let short_year = unified.split('-').next().is_some_and(|p| p.len() == 2);
        let formats: &[&str] = if short_year {
            &["%y-%m-%d"]
        } else {
            &["%Y-%m-%d", "%Y%m%d"]
        };

        for fmt in formats {
            if let Ok(date) = NaiveDate::parse_from_str(unified, fmt) {
                return Some(date.format("%Y-%m-%d").to_string());
            }
        }
        None
    }

    fn normalize_id_number(&self, value: &str) -> String {
        let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() == 13 {
            format!("{}-{}", &digits[..6], &digits[6..])
        } else {
            value.trim().to_string()
        }
    }

    fn clean_row(&self, row: &mut ImportRow) {
        // 1) 전 필드 TRIM + NFKC, 빈 값/`-` 제거
        let keys: Vec<FieldKey> = row.fields.keys().copied().collect();
        for key in keys {
            let raw = row.fields.remove(&key).unwrap_or_default();
            if let Some(v) = self.normalize_null(Some(self.clean_text(&raw))) {
                row.fields.insert(key, v);
            }
        }

        // 2) 필드별 형식 정제 (해석 불가 값은 원문 유지 → 검증기에서 판정)
        if let Some(raw) = row.get(FieldKey::UnitPrice).map(str::to_string) {
            if let Some(amount) = self.parse_amount(&raw) {
                row.set(FieldKey::UnitPrice, amount.to_string());
            }
        }
        if let Some(raw) = row.get(FieldKey::Date).map(str::to_string) {
            if let Some(date) = self.normalize_date(&raw) {
                row.set(FieldKey::Date, date);
            }
        }
        if let Some(raw) = row.get(FieldKey::IdNumber).map(str::to_string) {
            row.set(FieldKey::IdNumber, self.normalize_id_number(&raw));
        }

        // 3) 구분 열 키워드 추론
        apply_inference_rules(row, FieldKey::Category, &self.rules);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn row_with(fields: &[(FieldKey, &str)]) -> ImportRow {
        let map: BTreeMap<FieldKey, String> =
            fields.iter().map(|(k, v)| (*k, v.to_string())).collect();
        ImportRow::new(1, vec![], map)
    }

    #[test]
    fn test_normalize_header_removes_whitespace_and_fullwidth() {
        assert_eq!(normalize_header(" 현장 담당 "), "현장담당");
        assert_eq!(normalize_header("ＩＤ"), "id");
    }

    #[test]
    fn test_normalize_worker_name_strips_parenthetical() {
        assert_eq!(normalize_worker_name("홍길동(A)"), "홍길동");
        assert_eq!(normalize_worker_name(" 홍 길동 （반장） "), "홍길동");
    }

    #[test]
    fn test_loose_equals_number_vs_string() {
        assert!(loose_equals(&json!(1), &json!("1")));
        assert!(loose_equals(&json!(1.0), &json!("1")));
        assert!(loose_equals(&json!(" 150000 "), &json!(150000)));
        assert!(loose_equals(&Value::Null, &json!("")));
        assert!(!loose_equals(&json!(1.0), &json!(1.5)));
        assert!(!loose_equals(&json!("철근"), &json!("형틀")));
    }

    #[test]
    fn test_parse_amount_with_separators() {
        let cleaner = DataCleaner::default();
        assert_eq!(cleaner.parse_amount("150,000원"), Some(150_000));
        assert_eq!(cleaner.parse_amount(" 120000 "), Some(120_000));
        assert_eq!(cleaner.parse_amount("협의"), None);
    }

    #[test]
    fn test_normalize_date_variants() {
        let cleaner = DataCleaner::default();
        assert_eq!(cleaner.normalize_date("2024.3.5"), Some("2024-03-05".to_string()));
        assert_eq!(cleaner.normalize_date("2024/03/05"), Some("2024-03-05".to_string()));
        assert_eq!(cleaner.normalize_date("20240305"), Some("2024-03-05".to_string()));
        assert_eq!(cleaner.normalize_date("2024.03.05."), Some("2024-03-05".to_string()));
        assert_eq!(cleaner.normalize_date("24.03.05"), Some("2024-03-05".to_string()));
        assert_eq!(cleaner.normalize_date("내일"), None);
    }

    #[test]
    fn test_normalize_id_number() {
        let cleaner = DataCleaner::default();
        assert_eq!(cleaner.normalize_id_number("9001011234567"), "900101-1234567");
        assert_eq!(cleaner.normalize_id_number("900101-1234567"), "900101-1234567");
        assert_eq!(cleaner.normalize_id_number("900101"), "900101");
    }

    #[test]
    fn test_inference_fills_only_empty_targets() {
        let cleaner = DataCleaner::default();
        let mut row = row_with(&[(FieldKey::Category, "직영 / 월급")]);
        cleaner.clean_row(&mut row);
        assert_eq!(row.get(FieldKey::SalaryModel), Some("월급"));
        assert_eq!(row.get(FieldKey::TeamType), Some("직영"));

        // 명시 열이 우선
        let mut row = row_with(&[
            (FieldKey::Category, "직영 월급"),
            (FieldKey::SalaryModel, "일급"),
        ]);
        cleaner.clean_row(&mut row);
        assert_eq!(row.get(FieldKey::SalaryModel), Some("일급"));
        assert_eq!(row.get(FieldKey::TeamType), Some("직영"));
    }

    #[test]
    fn test_inference_first_matching_rule_wins() {
        let mut row = row_with(&[(FieldKey::Category, "주급(월급 전환 예정)")]);
        let applied =
            apply_inference_rules(&mut row, FieldKey::Category, &default_inference_rules());
        assert_eq!(applied, vec![(FieldKey::SalaryModel, "주급".to_string())]);
    }

    #[test]
    fn test_clean_row_drops_blank_and_dash() {
        let cleaner = DataCleaner::default();
        let mut row = row_with(&[
            (FieldKey::Name, " 홍길동 "),
            (FieldKey::Contact, "-"),
            (FieldKey::UnitPrice, "150,000"),
        ]);
        cleaner.clean_row(&mut row);
        assert_eq!(row.get(FieldKey::Name), Some("홍길동"));
        assert!(!row.fields.contains_key(&FieldKey::Contact));
        assert_eq!(row.get(FieldKey::UnitPrice), Some("150000"));
    }
}
