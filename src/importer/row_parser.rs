// ==========================================
// 현장 인력 관리 시스템 - 붙여넣기 텍스트 파서 구현
// ==========================================
// 책임: 원문 텍스트 → 2차원 셀 격자 → ImportRow 목록
// 구분자 판정 (첫 줄만 검사):
// - 탭 포함 → 탭 구분 (따옴표로 감싼 여러 줄 셀 허용)
// - 공백 2개 이상 연속 포함 → 2개 이상 공백 구간으로 분리
// - 그 외 → 한 줄 = 한 셀 (단일 공백 구분은 지원하지 않음, 검증 단계에서 걸러짐)
// ==========================================

use crate::domain::field::FieldKey;
use crate::domain::import_row::ImportRow;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::header_mapper::HeaderMapping;
use crate::importer::import_pipeline_trait::TextParser;
use csv::ReaderBuilder;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

lazy_static! {
    static ref MULTI_SPACE_RE: Regex = Regex::new(r" {2,}").unwrap();
}

/// 구분자 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Tab,
    MultiSpace,
    /// 구분자 없음 (한 줄 한 셀)
    None,
}

/// 첫 줄 기준 구분자 판정
pub fn detect_delimiter(first_line: &str) -> Delimiter {
    if first_line.contains('\t') {
        Delimiter::Tab
    } else if MULTI_SPACE_RE.is_match(first_line) {
        Delimiter::MultiSpace
    } else {
        Delimiter::None
    }
}

// ==========================================
// PasteParser - 붙여넣기 텍스트 파서
// ==========================================
pub struct PasteParser;

impl PasteParser {
    fn parse_tab(&self, text: &str) -> ImportResult<Vec<Vec<String>>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true) // 행마다 열 개수가 다를 수 있음
            .from_reader(text.as_bytes());

        let mut grid = Vec::new();
        for result in reader.records() {
            let record = result?;
            grid.push(record.iter().map(|v| v.trim().to_string()).collect());
        }
        Ok(grid)
    }

    fn parse_lines(&self, text: &str, delimiter: Delimiter) -> Vec<Vec<String>> {
        text.lines()
            .map(|line| match delimiter {
                // 앞쪽 구분자 묶음은 빈 첫 셀로 남긴다 (열 밀림 방지)
                Delimiter::MultiSpace => MULTI_SPACE_RE
                    .split(line.trim_end())
                    .map(|v| v.trim().to_string())
                    .collect(),
                _ => vec![line.trim().to_string()],
            })
            .collect()
    }
}

impl TextParser for PasteParser {
    fn parse_grid(&self, text: &str) -> ImportResult<Vec<Vec<String>>> {
        let text = text.trim_start_matches('\u{feff}');
        let first_line = text
            .lines()
            .find(|l| !l.trim().is_empty())
            .ok_or(ImportError::EmptyInput)?;

        let delimiter = detect_delimiter(first_line);
        debug!(?delimiter, "구분자 판정");

        let grid = match delimiter {
            Delimiter::Tab => self.parse_tab(text)?,
            other => self.parse_lines(text, other),
        };

        // 완전히 빈 행 제거
        let grid: Vec<Vec<String>> = grid
            .into_iter()
            .filter(|row| row.iter().any(|cell| !cell.is_empty()))
            .collect();

        if grid.is_empty() {
            return Err(ImportError::EmptyInput);
        }
        Ok(grid)
    }
}

// ==========================================
// 격자 → ImportRow
// ==========================================

/// 헤더를 제외한 격자를 매핑에 따라 ImportRow 로 변환
///
/// 같은 필드로 매핑된 열이 여럿이면 앞쪽 열의 비어 있지 않은 값이 우선한다.
pub fn build_rows(data_rows: &[Vec<String>], mapping: &HeaderMapping) -> Vec<ImportRow> {
    data_rows
        .iter()
        .enumerate()
        .map(|(idx, cells)| {
            let mut fields: BTreeMap<FieldKey, String> = BTreeMap::new();
            for (col, field) in mapping {
                let value = match cells.get(*col) {
                    Some(v) if !v.trim().is_empty() => v.trim().to_string(),
                    _ => continue,
                };
                fields.entry(*field).or_insert(value);
            }
            ImportRow::new(idx + 1, cells.clone(), fields)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("이름\t주민번호"), Delimiter::Tab);
        assert_eq!(detect_delimiter("이름  주민번호"), Delimiter::MultiSpace);
        assert_eq!(detect_delimiter("이름 주민번호"), Delimiter::None);
    }

    #[test]
    fn test_parse_tab_grid_trims_cells() {
        let text = "이름\t주민번호\t단가\n 홍길동 \t900101-1234567\t150,000\n";
        let grid = PasteParser.parse_grid(text).unwrap();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid[1], vec!["홍길동", "900101-1234567", "150,000"]);
    }

    #[test]
    fn test_parse_tab_allows_ragged_rows_and_crlf() {
        let text = "이름\t팀\r\n김철수\r\n\r\n이영희\t형틀1팀\r\n";
        let grid = PasteParser.parse_grid(text).unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[1], vec!["김철수"]);
        assert_eq!(grid[2], vec!["이영희", "형틀1팀"]);
    }

    #[test]
    fn test_parse_multi_space_grid() {
        let text = "이름    주민번호   팀\n홍 길동  900101-1234567  철근팀";
        let grid = PasteParser.parse_grid(text).unwrap();
        assert_eq!(grid[0], vec!["이름", "주민번호", "팀"]);
        // 단일 공백은 셀 내부로 유지
        assert_eq!(grid[1], vec!["홍 길동", "900101-1234567", "철근팀"]);
    }

    #[test]
    fn test_multi_space_leading_blank_cell_keeps_columns() {
        let text = "이름    연락처    팀\n        010-1111-2222    철근팀\n홍길동    010-3333-4444    형틀팀   ";
        let grid = PasteParser.parse_grid(text).unwrap();
        assert_eq!(grid[1], vec!["", "010-1111-2222", "철근팀"]);
        assert_eq!(grid[2], vec!["홍길동", "010-3333-4444", "형틀팀"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(PasteParser.parse_grid(""), Err(ImportError::EmptyInput)));
        assert!(matches!(
            PasteParser.parse_grid("  \n \n"),
            Err(ImportError::EmptyInput)
        ));
    }

    #[test]
    fn test_build_rows_first_non_empty_column_wins() {
        let mut mapping = HeaderMapping::new();
        mapping.insert(0, FieldKey::Name);
        mapping.insert(1, FieldKey::Contact);
        mapping.insert(2, FieldKey::Contact);

        let rows = build_rows(
            &[
                vec!["홍길동".into(), "".into(), "010-1111-2222".into()],
                vec!["김철수".into(), "010-3333-4444".into(), "02-000-0000".into()],
            ],
            &mapping,
        );

        assert_eq!(rows[0].row_number, 1);
        assert_eq!(rows[0].get(FieldKey::Contact), Some("010-1111-2222"));
        assert_eq!(rows[1].get(FieldKey::Contact), Some("010-3333-4444"));
    }
}
