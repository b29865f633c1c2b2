// ==========================================
// 현장 인력 관리 시스템 - 일괄 등록 모듈 오류 타입
// ==========================================
// 도구: thiserror 파생 매크로
// 주의: 행 단위 문제(필수값 누락 등)는 오류가 아니라 RowVerdict 데이터로 반환한다
// ==========================================

use crate::domain::types::EntityKind;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 일괄 등록 모듈 오류 타입
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 입력 관련 =====
    #[error("붙여넣은 내용이 비어 있습니다")]
    EmptyInput,

    #[error("인식 가능한 헤더가 없습니다: {0}")]
    NoMappedColumns(String),

    #[error("동의어 사전 중복: '{synonym}' 이(가) {first} 와 {second} 에 모두 등록됨")]
    DuplicateSynonym {
        synonym: String,
        first: String,
        second: String,
    },

    #[error("텍스트 파싱 실패: {0}")]
    ParseError(String),

    #[error("필수 항목 누락: {0}")]
    MissingField(String),

    // ===== 참조 해석 =====
    #[error("등록되지 않은 {kind}: {name}")]
    UnresolvedReference { kind: EntityKind, name: String },

    #[error("작업자를 찾을 수 없습니다: {name} ({id_number})")]
    WorkerNotFound { name: String, id_number: String },

    // ===== 충돌 (항상 차단) =====
    #[error("이미 다른 계정에 연결된 작업자: {worker} (연결됨: {linked}, 요청: {requested})")]
    AccountConflict {
        worker: String,
        linked: String,
        requested: String,
    },

    // ===== 저장소 =====
    #[error("저장소 오류: {0}")]
    Repository(#[from] RepositoryError),

    // ===== 일반 =====
    #[error("내부 오류: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::ParseError(err.to_string())
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::Repository(RepositoryError::from(err))
    }
}

/// Result 타입 별칭
pub type ImportResult<T> = Result<T, ImportError>;
