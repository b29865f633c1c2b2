// ==========================================
// 현장 인력 관리 시스템 - 일괄 등록 계층
// ==========================================
// 책임: 붙여넣기 표 → 검증/해석/대조 → 일괄 쓰기
// 흐름: 파서 → 헤더 매퍼 → 정제 → 검증 → 해석 → 대조 → 커밋
// 지원: 작업 일보, 작업자 명부, 팀 목록, 스키마 지정 스마트 붙여넣기
// ==========================================

// 모듈 선언
pub mod batch_committer;
pub mod daily_report_importer;
pub mod data_cleaner;
pub mod entity_resolver;
pub mod error;
pub mod header_mapper;
pub mod import_pipeline_trait;
pub mod import_session;
pub mod reconcile_differ;
pub mod row_parser;
pub mod row_validator;
pub mod schema;
pub mod smart_paste;
pub mod team_importer;
pub mod worker_importer;

// 핵심 타입 재노출
pub use batch_committer::{BatchCommitter, CancelFlag, CommitOptions};
pub use daily_report_importer::DailyReportImporter;
pub use data_cleaner::{
    default_inference_rules, loose_equals, normalize_header, normalize_name,
    normalize_worker_name, DataCleaner as DataCleanerImpl, InferenceRule,
};
pub use entity_resolver::{EntityResolver, ResolvedRef};
pub use error::{ImportError, ImportResult};
pub use header_mapper::{map_header, HeaderMapper as HeaderMapperImpl, HeaderMapping};
pub use import_session::{ColumnMapping, ImportPipeline, ImportPreview};
pub use reconcile_differ::{DiffOutcome, ReconcileDiffer};
pub use row_parser::{detect_delimiter, Delimiter, PasteParser};
pub use row_validator::{RowIssue, RowValidator as RowValidatorImpl};
pub use schema::{FieldDefinition, ImportSchema, SynonymDictionary};
pub use smart_paste::{BatchSink, SmartPaste};
pub use team_importer::TeamImporter;
pub use worker_importer::WorkerImporter;

// Trait 인터페이스 재노출
pub use import_pipeline_trait::{DataCleaner, HeaderMapper, LineDiffer, RowValidator, TextParser};
