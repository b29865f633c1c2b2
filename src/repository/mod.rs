// ==========================================
// 현장 인력 관리 시스템 - 데이터 저장소 계층
// ==========================================
// 금지: 저장소에 업무 로직을 두지 않는다
// ==========================================
// 책임: 일괄 등록 엔진이 쓰는 CRUD 계약과 SQLite 구현
// 제약: 모든 쿼리는 파라미터 바인딩 사용
// ==========================================

pub mod error;
pub mod import_store;
pub mod sqlite_import_store;

// 핵심 저장소 재노출
pub use error::{RepositoryError, RepositoryResult};
pub use import_store::ImportStore;
pub use sqlite_import_store::SqliteImportStore;
