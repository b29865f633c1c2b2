// ==========================================
// 현장 인력 관리 시스템 - 일괄 등록 파이프라인 Trait
// ==========================================
// 책임: 파이프라인 각 단계의 인터페이스 정의 (구현 없음)
// 흐름: 텍스트 → 파서 → 헤더 매퍼(표당 1회) → 정제 → 검증
//       → 참조 해석 → 대조 → 일괄 커밋
// ==========================================

use crate::domain::daily_report::ReportLine;
use crate::domain::import_row::{ImportRow, RowVerdict};
use crate::importer::entity_resolver::EntityResolver;
use crate::importer::error::ImportResult;
use crate::importer::header_mapper::HeaderMapping;
use crate::importer::reconcile_differ::DiffOutcome;
use crate::importer::schema::{ImportSchema, SynonymDictionary};
use crate::config::ImportConfig;

// ==========================================
// TextParser Trait
// ==========================================
// 용도: 붙여넣기 원문 → 셀 격자
// 구현: PasteParser
pub trait TextParser: Send + Sync {
    /// 원문을 행/셀 격자로 분리
    ///
    /// # 반환
    /// - Ok(grid): 첫 행은 헤더, 셀은 trim 됨, 완전히 빈 행은 제외
    /// - Err(EmptyInput): 내용 없음
    fn parse_grid(&self, text: &str) -> ImportResult<Vec<Vec<String>>>;
}

// ==========================================
// HeaderMapper Trait
// ==========================================
// 용도: 헤더 행 → 열 번호별 표준 필드
// 구현: HeaderMapper
pub trait HeaderMapper: Send + Sync {
    fn map_headers(&self, headers: &[String], dictionary: &SynonymDictionary) -> HeaderMapping;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 용도: 값 정제와 자유 텍스트 키워드 추론
// 구현: DataCleaner
pub trait DataCleaner: Send + Sync {
    /// NFKC + TRIM
    fn clean_text(&self, value: &str) -> String;

    /// 빈 값 / 공백 / `-` → None
    fn normalize_null(&self, value: Option<String>) -> Option<String>;

    /// 금액 파싱 (`150,000원` → 150000)
    fn parse_amount(&self, value: &str) -> Option<i64>;

    /// 공수 파싱 (`1.5`, `1.5공수`)
    fn parse_man_day(&self, value: &str) -> Option<f64>;

    /// 날짜 → `YYYY-MM-DD` (해석 불가 시 None)
    fn normalize_date(&self, value: &str) -> Option<String>;

    /// 13자리 주민번호 → `######-#######`
    fn normalize_id_number(&self, value: &str) -> String;

    /// 행 전체 정제 + 키워드 추론 (명시 값은 덮어쓰지 않음)
    fn clean_row(&self, row: &mut ImportRow);
}

// ==========================================
// RowValidator Trait
// ==========================================
// 용도: 필수값 / 형식 검증, 참조 정책 검증
// 구현: RowValidator
pub trait RowValidator: Send + Sync {
    /// 스키마 필수 필드 + 형식 검증
    ///
    /// 누락 시 `{label} 누락` 오류를 추가하고 무효 처리한다.
    /// 행은 제거하지 않는다.
    fn validate(&self, row: &ImportRow, schema: &ImportSchema) -> RowVerdict;

    /// 참조 정책 검증
    ///
    /// - Strict 참조 미해석 → 오류 (자동 생성 금지)
    /// - Permissive 참조 미해석 → 경고 (커밋 시 자동 생성)
    fn check_references(
        &self,
        row: &ImportRow,
        schema: &ImportSchema,
        resolver: &EntityResolver,
        config: &ImportConfig,
    ) -> RowVerdict;
}

// ==========================================
// LineDiffer Trait
// ==========================================
// 용도: 신규 라인 vs 저장된 집계 라인 대조
// 구현: ReconcileDiffer
pub trait LineDiffer: Send + Sync {
    fn diff(&self, new_line: &ReportLine, existing_lines: &[ReportLine]) -> DiffOutcome;
}
