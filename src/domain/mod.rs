// ==========================================
// 현장 인력 관리 시스템 - 도메인 모델 계층
// ==========================================
// 책임: 엔티티, 집계 문서, 임시 행, 공용 타입 정의
// 금지: 데이터 접근 로직, 파이프라인 로직
// ==========================================

pub mod daily_report;
pub mod entity;
pub mod field;
pub mod import_row;
pub mod types;

// 핵심 타입 재노출
pub use daily_report::{AggregateKey, AggregatePatch, DailyReportAggregate, ReportLine};
pub use entity::{Company, CreatedEntity, Site, Team, Worker};
pub use field::FieldKey;
pub use import_row::{CommitSummary, FieldChange, ImportRow, RowVerdict};
pub use types::{EntityKind, IssueLevel, ReconcileStatus, ReferencePolicy, SalaryModel, TeamType};
