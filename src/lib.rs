// ==========================================
// 현장 인력 관리 시스템 - 일괄 등록 엔진 라이브러리
// ==========================================
// 범위: 붙여넣은 표 → 검증/해석/대조된 쓰기 작업
// 기술 스택: Rust + SQLite (문서 저장)
// 원칙: 커밋 전 행별 상태를 운영자가 확인 (최종 결정은 사람)
// ==========================================

// ==========================================
// 모듈 선언
// ==========================================

// 도메인 계층 - 엔티티와 타입
pub mod domain;

// 저장소 계층 - 데이터 접근
pub mod repository;

// 일괄 등록 계층 - 파이프라인
pub mod importer;

// 설정 계층
pub mod config;

// 데이터베이스 기반 (연결 초기화/PRAGMA 통일)
pub mod db;

// 로그
pub mod logging;

// ==========================================
// 핵심 타입 재노출
// ==========================================

// 도메인 타입
pub use domain::types::{
    EntityKind, IssueLevel, ReconcileStatus, ReferencePolicy, SalaryModel, TeamType,
};

// 도메인 엔티티
pub use domain::{
    AggregateKey, CommitSummary, Company, DailyReportAggregate, FieldChange, FieldKey, ImportRow,
    ReportLine, RowVerdict, Site, Team, Worker,
};

// 일괄 등록
pub use importer::{
    BatchCommitter, BatchSink, CancelFlag, CommitOptions, DailyReportImporter, EntityResolver,
    ImportError, ImportPreview, ImportResult, ImportSchema, SmartPaste, TeamImporter,
    WorkerImporter,
};

// 저장소 / 설정
pub use config::{ConfigManager, ImportConfig, ImportConfigReader};
pub use repository::{ImportStore, RepositoryError, SqliteImportStore};

// ==========================================
// 상수 정의
// ==========================================

// 시스템 버전
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 시스템 이름
pub const APP_NAME: &str = "현장 인력 일괄 등록";
