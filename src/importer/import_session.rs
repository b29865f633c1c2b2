// ==========================================
// 현장 인력 관리 시스템 - 가져오기 공통 파이프라인
// ==========================================
// 책임: 원문 → 격자 → 헤더 매핑 → 행 구성 → 정제 → 필수/형식 검증
//       (저장소를 건드리지 않는 순수 단계만 포함)
// 흐름: 참조 검증 / 대조 / 커밋은 각 세션 가져오기 모듈이 이어서 수행
// ==========================================

use crate::config::ImportConfig;
use crate::domain::field::FieldKey;
use crate::domain::import_row::{CommitSummary, ImportRow};
use crate::domain::types::ReconcileStatus;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::entity_resolver::EntityResolver;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::header_mapper::{HeaderMapper, HeaderMapping};
use crate::importer::import_pipeline_trait::{
    DataCleaner as DataCleanerTrait, HeaderMapper as HeaderMapperTrait, RowValidator as RowValidatorTrait,
    TextParser,
};
use crate::importer::row_parser::{build_rows, PasteParser};
use crate::importer::row_validator::{find_duplicate_rows, RowValidator};
use crate::importer::schema::ImportSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

// ==========================================
// ImportPreview - 커밋 전 운영자에게 보여줄 결과
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    pub index: usize,
    pub header: String,
    pub field: Option<FieldKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreview {
    pub columns: Vec<ColumnMapping>,
    pub rows: Vec<ImportRow>,
}

impl ImportPreview {
    pub fn valid_rows(&self) -> impl Iterator<Item = &ImportRow> {
        self.rows.iter().filter(|r| r.is_valid())
    }

    pub fn invalid_count(&self) -> usize {
        self.rows.iter().filter(|r| !r.is_valid()).count()
    }

    pub fn count_status(&self, status: ReconcileStatus) -> usize {
        self.rows.iter().filter(|r| r.status == Some(status)).count()
    }

    /// 매핑되지 않아 무시되는 헤더
    pub fn unmapped_headers(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.field.is_none())
            .map(|c| c.header.as_str())
            .collect()
    }
}

// ==========================================
// ImportPipeline - 교체 가능한 단계 묶음
// ==========================================
pub struct ImportPipeline {
    parser: Box<dyn TextParser>,
    header_mapper: Box<dyn HeaderMapperTrait>,
    cleaner: Box<dyn DataCleanerTrait>,
    validator: Box<dyn RowValidatorTrait>,
}

impl ImportPipeline {
    pub fn new(
        parser: Box<dyn TextParser>,
        header_mapper: Box<dyn HeaderMapperTrait>,
        cleaner: Box<dyn DataCleanerTrait>,
        validator: Box<dyn RowValidatorTrait>,
    ) -> Self {
        Self {
            parser,
            header_mapper,
            cleaner,
            validator,
        }
    }

    /// 기본 구성 (붙여넣기 파서, 동의어 매퍼, 기본 추론 규칙)
    pub fn standard() -> Self {
        Self::new(
            Box::new(PasteParser),
            Box::new(HeaderMapper),
            Box::new(DataCleaner::default()),
            Box::new(RowValidator::new()),
        )
    }

    /// 원문 → 정제/검증된 행
    ///
    /// # 반환
    /// - Ok(preview): 무효 행도 포함 (verdict 로 구분)
    /// - Err(EmptyInput): 내용 없음
    /// - Err(NoMappedColumns): 헤더가 하나도 매핑되지 않음
    /// - Err(DuplicateSynonym): 스키마 동의어 충돌
    #[instrument(skip_all, fields(kind = %schema.kind))]
    pub fn prepare(&self, text: &str, schema: &ImportSchema) -> ImportResult<ImportPreview> {
        let dictionary = schema.synonym_dictionary()?;
        let grid = self.parser.parse_grid(text)?;
        let (headers, data_rows) = grid.split_first().ok_or(ImportError::EmptyInput)?;

        let mapping: HeaderMapping = self.header_mapper.map_headers(headers, &dictionary);
        if mapping.is_empty() {
            return Err(ImportError::NoMappedColumns(headers.join(", ")));
        }

        let columns = headers
            .iter()
            .enumerate()
            .map(|(index, header)| ColumnMapping {
                index,
                header: header.clone(),
                field: mapping.get(&index).copied(),
            })
            .collect();

        let mut rows = build_rows(data_rows, &mapping);
        for row in rows.iter_mut() {
            self.cleaner.clean_row(row);
            row.verdict = self.validator.validate(row, schema);
        }

        for issue in find_duplicate_rows(&rows, schema.kind) {
            if let Some(row) = rows.iter_mut().find(|r| r.row_number == issue.row_number) {
                row.verdict.warn(issue.message);
            }
        }

        let preview = ImportPreview { columns, rows };
        info!(
            rows = preview.rows.len(),
            mapped = mapping.len(),
            invalid = preview.invalid_count(),
            "붙여넣기 해석 완료"
        );
        Ok(preview)
    }

    /// 참조 정책 검증 결과를 각 행 판정에 합친다
    pub fn check_references(
        &self,
        preview: &mut ImportPreview,
        schema: &ImportSchema,
        resolver: &EntityResolver,
        config: &ImportConfig,
    ) {
        for row in preview.rows.iter_mut() {
            let verdict = self
                .validator
                .check_references(row, schema, resolver, config);
            row.verdict.merge(verdict);
        }
        debug!(invalid = preview.invalid_count(), "참조 검증 완료");
    }
}

impl Default for ImportPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

// ==========================================
// 행 단위 커밋 결과 집계 (작업자/팀 등록)
// ==========================================

/// 행 1건 커밋 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Created(String),
    Updated(String),
    Skipped(String),
}

/// 행 결과를 요약에 반영 (오류는 failed + 로그, 전파하지 않음)
pub fn tally_row(summary: &mut CommitSummary, row: &ImportRow, result: ImportResult<RowOutcome>) {
    match result {
        Ok(RowOutcome::Created(_)) | Ok(RowOutcome::Updated(_)) => summary.success += 1,
        Ok(RowOutcome::Skipped(reason)) => {
            summary.skipped += 1;
            summary.logs.push(format!("{}행: {}", row.row_number, reason));
        }
        Err(e) => {
            warn!(row = row.row_number, error = %e, "행 커밋 실패");
            summary.failed += 1;
            summary.logs.push(format!("{}행: {}", row.row_number, e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_maps_and_validates() {
        let text = "이름\t주민번호\t단가\t비고\n홍길동\t\t150,000\t일당 직영\n김철수\t8505052222222\t\t";
        let preview = ImportPipeline::standard()
            .prepare(text, &ImportSchema::worker())
            .unwrap();

        assert_eq!(preview.rows.len(), 2);
        let hong = &preview.rows[0];
        assert!(!hong.is_valid());
        assert_eq!(hong.verdict.errors, vec!["주민번호 누락".to_string()]);
        assert_eq!(hong.get(FieldKey::UnitPrice), Some("150000"));
        assert_eq!(hong.get(FieldKey::SalaryModel), Some("일급"));
        assert_eq!(hong.get(FieldKey::TeamType), Some("직영"));

        let kim = &preview.rows[1];
        assert!(kim.is_valid());
        assert_eq!(kim.get(FieldKey::IdNumber), Some("850505-2222222"));
    }

    #[test]
    fn test_tally_row_counts() {
        let row = ImportRow::new(7, vec![], Default::default());
        let mut summary = CommitSummary::default();

        tally_row(&mut summary, &row, Ok(RowOutcome::Created("W1".to_string())));
        tally_row(&mut summary, &row, Ok(RowOutcome::Skipped("변경 없음".to_string())));
        tally_row(&mut summary, &row, Err(ImportError::InternalError("x".to_string())));

        assert_eq!((summary.success, summary.skipped, summary.failed), (1, 1, 1));
        assert_eq!(summary.logs[0], "7행: 변경 없음");
    }

    #[test]
    fn test_prepare_rejects_unmapped_table() {
        let result = ImportPipeline::standard().prepare("가\t나\n1\t2", &ImportSchema::team());
        assert!(matches!(result, Err(ImportError::NoMappedColumns(_))));
    }

    #[test]
    fn test_prepare_reports_unmapped_headers() {
        let text = "팀명\t메모\n철근팀\t아무거나";
        let preview = ImportPipeline::standard()
            .prepare(text, &ImportSchema::team())
            .unwrap();
        assert_eq!(preview.unmapped_headers(), vec!["메모"]);
    }

    #[test]
    fn test_prepare_flags_duplicate_rows() {
        let text = "날짜\t현장명\t팀명\t작업자명\n2024.03.05\tA현장\t철근팀\t홍길동\n2024-03-05\tA현장\t철근팀\t홍길동";
        let preview = ImportPipeline::standard()
            .prepare(text, &ImportSchema::daily_report())
            .unwrap();

        assert!(preview.rows[0].verdict.warnings.is_empty());
        assert_eq!(preview.rows[1].verdict.warnings.len(), 1);
        assert!(preview.rows[1].is_valid());
    }
}
