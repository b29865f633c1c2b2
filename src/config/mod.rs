// ==========================================
// 현장 인력 관리 시스템 - 설정 계층
// ==========================================
// 책임: 일괄 등록 정책 설정, config_kv 덮어쓰기
// ==========================================

pub mod config_manager;
pub mod import_config;
pub mod import_config_trait;

// 핵심 설정 재노출
pub use config_manager::{config_keys, ConfigManager};
pub use import_config::ImportConfig;
pub use import_config_trait::ImportConfigReader;
