// ==========================================
// 현장 인력 관리 시스템 - 가져오기 스키마 / 동의어 사전
// ==========================================
// 책임: 필드 정의표 {key, label, required, aliases} 와
//       헤더 추론에 쓰이는 순서 있는 동의어 사전
// 주의: 사전 항목 순서 = 동일 길이 부분 일치 시 우선순위
// ==========================================

use crate::domain::field::FieldKey;
use crate::domain::types::EntityKind;
use crate::importer::data_cleaner::normalize_header;
use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// FieldDefinition - 필드 정의
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub key: FieldKey,
    /// 오류 메시지에 쓰이는 표시 이름 (`{label} 누락`)
    pub label: String,
    pub required: bool,
    pub aliases: Vec<String>,
}

impl FieldDefinition {
    pub fn new(key: FieldKey, label: &str, required: bool, aliases: &[&str]) -> Self {
        Self {
            key,
            label: label.to_string(),
            required,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }
}

// ==========================================
// SynonymDictionary - 동의어 사전
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct SynonymDictionary {
    // (필드, 정규화된 동의어 목록), 선언 순서 유지
    entries: Vec<(FieldKey, Vec<String>)>,
}

impl SynonymDictionary {
    /// 사전 생성
    ///
    /// 동의어는 헤더와 같은 방식으로 정규화된다.
    /// 하나의 동의어가 서로 다른 두 필드에 등록되면 정확 일치 결과가
    /// 순회 순서에 의존하게 되므로 거부한다.
    pub fn new(entries: Vec<(FieldKey, Vec<String>)>) -> ImportResult<Self> {
        let mut owner: HashMap<String, FieldKey> = HashMap::new();
        let mut normalized = Vec::with_capacity(entries.len());

        for (field, synonyms) in entries {
            let mut list = Vec::with_capacity(synonyms.len());
            for synonym in synonyms {
                let clean = normalize_header(&synonym);
                if clean.is_empty() {
                    continue;
                }
                match owner.get(&clean) {
                    Some(existing) if *existing != field => {
                        return Err(ImportError::DuplicateSynonym {
                            synonym: clean,
                            first: existing.to_string(),
                            second: field.to_string(),
                        });
                    }
                    Some(_) => continue,
                    None => {
                        owner.insert(clean.clone(), field);
                        list.push(clean);
                    }
                }
            }
            normalized.push((field, list));
        }

        Ok(Self {
            entries: normalized,
        })
    }

    pub fn entries(&self) -> &[(FieldKey, Vec<String>)] {
        &self.entries
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldKey> + '_ {
        self.entries.iter().map(|(f, _)| *f)
    }
}

// ==========================================
// ImportSchema - 대상 엔티티별 필드 정의표
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSchema {
    pub kind: EntityKind,
    pub fields: Vec<FieldDefinition>,
}

impl ImportSchema {
    pub fn new(kind: EntityKind, fields: Vec<FieldDefinition>) -> Self {
        Self { kind, fields }
    }

    /// 필드 정의표 → 동의어 사전 (label 도 동의어로 포함)
    pub fn synonym_dictionary(&self) -> ImportResult<SynonymDictionary> {
        let entries = self
            .fields
            .iter()
            .map(|def| {
                let mut synonyms = vec![def.label.clone()];
                synonyms.extend(def.aliases.iter().cloned());
                (def.key, synonyms)
            })
            .collect();
        SynonymDictionary::new(entries)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|f| f.required)
    }

    pub fn definition(&self, key: FieldKey) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// 작업자 등록 스키마 (필수: 이름, 주민번호)
    pub fn worker() -> Self {
        Self::new(
            EntityKind::Worker,
            vec![
                FieldDefinition::new(FieldKey::Name, "이름", true, &["성명", "작업자명", "근로자명", "작업자", "근로자"]),
                FieldDefinition::new(FieldKey::IdNumber, "주민번호", true, &["주민등록번호", "생년월일"]),
                FieldDefinition::new(FieldKey::Contact, "연락처", false, &["전화번호", "휴대폰", "핸드폰", "전화"]),
                FieldDefinition::new(FieldKey::Address, "주소", false, &["거주지"]),
                FieldDefinition::new(FieldKey::BankName, "은행명", false, &["은행"]),
                FieldDefinition::new(FieldKey::AccountNumber, "계좌번호", false, &["계좌"]),
                FieldDefinition::new(FieldKey::AccountHolder, "예금주", false, &[]),
                FieldDefinition::new(FieldKey::Role, "직종", false, &["공종", "직책", "역할"]),
                FieldDefinition::new(FieldKey::LeaderName, "팀장", false, &["팀장명", "반장"]),
                FieldDefinition::new(FieldKey::TeamType, "팀구분", false, &["팀유형"]),
                FieldDefinition::new(FieldKey::TeamName, "팀명", false, &["소속팀", "팀"]),
                FieldDefinition::new(FieldKey::CompanyName, "회사명", false, &["소속회사", "회사", "업체명", "업체"]),
                FieldDefinition::new(FieldKey::UnitPrice, "단가", false, &["일당", "노임단가", "노임"]),
                FieldDefinition::new(FieldKey::SalaryModel, "급여방식", false, &["급여형태", "급여유형"]),
                FieldDefinition::new(FieldKey::Category, "구분", false, &["비고", "분류"]),
            ],
        )
    }

    /// 팀 등록 스키마 (필수: 팀명)
    pub fn team() -> Self {
        Self::new(
            EntityKind::Team,
            vec![
                FieldDefinition::new(FieldKey::Name, "팀명", true, &["팀이름", "팀"]),
                FieldDefinition::new(FieldKey::LeaderName, "팀장", false, &["팀장명", "반장"]),
                FieldDefinition::new(FieldKey::CompanyName, "회사명", false, &["소속회사", "회사", "업체명", "업체"]),
                FieldDefinition::new(FieldKey::TeamType, "팀구분", false, &["유형", "구분"]),
                FieldDefinition::new(FieldKey::Contact, "연락처", false, &["전화번호", "휴대폰", "전화"]),
            ],
        )
    }

    /// 작업 일보 라인 스키마 (필수: 날짜, 현장명, 팀명, 작업자명)
    ///
    /// `현장담당` 계열을 `현장` 보다 먼저 두어 동일 길이 부분 일치에서도 우선한다.
    pub fn daily_report() -> Self {
        Self::new(
            EntityKind::DailyReportLine,
            vec![
                FieldDefinition::new(FieldKey::Date, "날짜", true, &["일자", "작업일", "작업일자", "출역일"]),
                FieldDefinition::new(FieldKey::ResponsibleTeamName, "현장담당", false, &["현장담당팀", "담당팀"]),
                FieldDefinition::new(FieldKey::SiteName, "현장명", true, &["현장"]),
                FieldDefinition::new(FieldKey::TeamName, "팀명", true, &["소속팀", "팀"]),
                FieldDefinition::new(FieldKey::WorkerName, "작업자명", true, &["이름", "성명", "작업자", "근로자"]),
                FieldDefinition::new(FieldKey::ManDay, "공수", false, &["출력", "출역", "공수(일)"]),
                FieldDefinition::new(FieldKey::PayType, "급여방식", false, &["지급방식", "급여형태"]),
                FieldDefinition::new(FieldKey::UnitPrice, "단가", false, &["일당", "노임단가"]),
                FieldDefinition::new(FieldKey::CompanyName, "회사명", false, &["업체명", "회사", "업체"]),
                FieldDefinition::new(FieldKey::Content, "작업내용", false, &["내용", "작업"]),
                FieldDefinition::new(FieldKey::Role, "직종", false, &["공종", "역할"]),
                FieldDefinition::new(FieldKey::Category, "구분", false, &["비고"]),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_have_no_duplicate_synonyms() {
        for schema in [
            ImportSchema::worker(),
            ImportSchema::team(),
            ImportSchema::daily_report(),
        ] {
            assert!(
                schema.synonym_dictionary().is_ok(),
                "{:?} 스키마에 중복 동의어가 있습니다",
                schema.kind
            );
        }
    }

    #[test]
    fn test_duplicate_synonym_rejected() {
        let result = SynonymDictionary::new(vec![
            (FieldKey::SiteName, vec!["현장".to_string()]),
            (FieldKey::ResponsibleTeamName, vec![" 현 장 ".to_string()]),
        ]);
        assert!(matches!(
            result,
            Err(ImportError::DuplicateSynonym { .. })
        ));
    }

    #[test]
    fn test_required_fields_per_kind() {
        let worker: Vec<FieldKey> = ImportSchema::worker().required_fields().map(|f| f.key).collect();
        assert_eq!(worker, vec![FieldKey::Name, FieldKey::IdNumber]);

        let team: Vec<FieldKey> = ImportSchema::team().required_fields().map(|f| f.key).collect();
        assert_eq!(team, vec![FieldKey::Name]);

        let mut report: Vec<FieldKey> = ImportSchema::daily_report()
            .required_fields()
            .map(|f| f.key)
            .collect();
        report.sort();
        let mut expected = vec![
            FieldKey::Date,
            FieldKey::SiteName,
            FieldKey::TeamName,
            FieldKey::WorkerName,
        ];
        expected.sort();
        assert_eq!(report, expected);
    }
}
