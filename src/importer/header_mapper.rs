// ==========================================
// 현장 인력 관리 시스템 - 헤더 매퍼 구현
// ==========================================
// 책임: 원본 열 헤더 → 표준 필드 키 (열 번호 → FieldKey)
// 규칙:
// 1. 헤더 정규화 (NFKC, 공백 제거)
// 2. 정확 일치 → 즉시 확정
// 3. 아니면 가장 긴 부분 일치 (길이가 같으면 사전 앞쪽 항목)
// 4. 아무것도 일치하지 않으면 미매핑 → 해당 열 무시
// ==========================================

use crate::domain::field::FieldKey;
use crate::importer::data_cleaner::normalize_header;
use crate::importer::import_pipeline_trait::HeaderMapper as HeaderMapperTrait;
use crate::importer::schema::SynonymDictionary;
use std::collections::BTreeMap;
use tracing::debug;

/// 열 번호 → 필드 키
pub type HeaderMapping = BTreeMap<usize, FieldKey>;

/// 단일 헤더 매핑 (순수 함수)
pub fn map_header(header: &str, dictionary: &SynonymDictionary) -> Option<FieldKey> {
    let clean = normalize_header(header);
    if clean.is_empty() {
        return None;
    }

    let mut best: Option<(FieldKey, usize)> = None;
    for (field, synonyms) in dictionary.entries() {
        for synonym in synonyms {
            if clean == *synonym {
                return Some(*field);
            }
            if clean.contains(synonym.as_str()) {
                let len = synonym.chars().count();
                // 같은 길이면 먼저 나온 항목 유지
                if best.map_or(true, |(_, best_len)| len > best_len) {
                    best = Some((*field, len));
                }
            }
        }
    }

    best.map(|(field, _)| field)
}

pub struct HeaderMapper;

impl HeaderMapperTrait for HeaderMapper {
    fn map_headers(&self, headers: &[String], dictionary: &SynonymDictionary) -> HeaderMapping {
        let mut mapping = HeaderMapping::new();
        for (idx, header) in headers.iter().enumerate() {
            match map_header(header, dictionary) {
                Some(field) => {
                    mapping.insert(idx, field);
                }
                None => {
                    debug!(column = idx, header = %header, "헤더 미매핑, 열 무시");
                }
            }
        }
        mapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::schema::ImportSchema;

    fn dict(entries: &[(FieldKey, &[&str])]) -> SynonymDictionary {
        SynonymDictionary::new(
            entries
                .iter()
                .map(|(f, s)| (*f, s.iter().map(|x| x.to_string()).collect()))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_exact_match_wins_over_partial() {
        let d = dict(&[
            (FieldKey::SiteName, &["현장"]),
            (FieldKey::ResponsibleTeamName, &["현장담당"]),
        ]);
        assert_eq!(map_header("현장담당", &d), Some(FieldKey::ResponsibleTeamName));
        assert_eq!(map_header("현장", &d), Some(FieldKey::SiteName));
    }

    #[test]
    fn test_exact_match_independent_of_dictionary_order() {
        let forward = dict(&[
            (FieldKey::SiteName, &["현장"]),
            (FieldKey::ResponsibleTeamName, &["현장담당"]),
        ]);
        let reverse = dict(&[
            (FieldKey::ResponsibleTeamName, &["현장담당"]),
            (FieldKey::SiteName, &["현장"]),
        ]);
        for header in ["현장", "현장담당"] {
            assert_eq!(map_header(header, &forward), map_header(header, &reverse));
        }
    }

    #[test]
    fn test_longest_partial_match() {
        let d = dict(&[
            (FieldKey::SiteName, &["현장"]),
            (FieldKey::TeamName, &["담당팀"]),
            (FieldKey::ResponsibleTeamName, &["현장담당"]),
        ]);
        // "현장"(2) / "현장담당"(4) 모두 부분 일치 → 긴 쪽
        assert_eq!(map_header("현장담당자", &d), Some(FieldKey::ResponsibleTeamName));
        assert_eq!(map_header("현장 위치", &d), Some(FieldKey::SiteName));
    }

    #[test]
    fn test_equal_length_tie_uses_dictionary_order() {
        let d = dict(&[
            (FieldKey::Contact, &["연락처"]),
            (FieldKey::LeaderName, &["팀장님"]),
        ]);
        assert_eq!(map_header("팀장님연락처", &d), Some(FieldKey::Contact));

        let d = dict(&[
            (FieldKey::LeaderName, &["팀장님"]),
            (FieldKey::Contact, &["연락처"]),
        ]);
        assert_eq!(map_header("팀장님연락처", &d), Some(FieldKey::LeaderName));
    }

    #[test]
    fn test_whitespace_and_unknown_headers() {
        let d = ImportSchema::worker().synonym_dictionary().unwrap();
        assert_eq!(map_header(" 주 민 번 호 ", &d), Some(FieldKey::IdNumber));
        assert_eq!(map_header("", &d), None);
        assert_eq!(map_header("순번", &d), None);
    }

    #[test]
    fn test_map_headers_skips_unmapped_columns() {
        let d = ImportSchema::worker().synonym_dictionary().unwrap();
        let headers: Vec<String> = ["순번", "이름", "주민번호", "단가"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mapping = HeaderMapper.map_headers(&headers, &d);

        assert_eq!(mapping.get(&0), None);
        assert_eq!(mapping.get(&1), Some(&FieldKey::Name));
        assert_eq!(mapping.get(&2), Some(&FieldKey::IdNumber));
        assert_eq!(mapping.get(&3), Some(&FieldKey::UnitPrice));
    }

    #[test]
    fn test_daily_report_preset_responsible_team() {
        let d = ImportSchema::daily_report().synonym_dictionary().unwrap();
        assert_eq!(map_header("현장담당", &d), Some(FieldKey::ResponsibleTeamName));
        assert_eq!(map_header("현장담당자", &d), Some(FieldKey::ResponsibleTeamName));
        assert_eq!(map_header("현장", &d), Some(FieldKey::SiteName));
        assert_eq!(map_header("작업자", &d), Some(FieldKey::WorkerName));
        assert_eq!(map_header("작업내용", &d), Some(FieldKey::Content));
    }
}
