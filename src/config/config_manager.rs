// ==========================================
// 현장 인력 관리 시스템 - 설정 관리자
// ==========================================
// 책임: 설정 조회/덮어쓰기
// 저장: config_kv 테이블 (key-value), 누락 키는 기본값
// ==========================================

use crate::config::import_config::ImportConfig;
use crate::config::import_config_trait::ImportConfigReader;
use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::domain::types::ReferencePolicy;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};
use tracing::warn;

// ==========================================
// 설정 키
// ==========================================
pub mod config_keys {
    // 참조 정책
    pub const WORKER_POLICY: &str = "import.worker_policy";
    pub const TEAM_POLICY: &str = "import.team_policy";
    pub const SITE_POLICY: &str = "import.site_policy";
    pub const COMPANY_POLICY: &str = "import.company_policy";

    // 커밋
    pub const OVERWRITE_EXISTING: &str = "import.overwrite_existing";
    pub const COMMIT_CONCURRENCY: &str = "import.commit_concurrency";

    // 자리표시
    pub const BATCH_LEADER_PLACEHOLDER: &str = "import.batch_leader_placeholder";
}

// ==========================================
// ConfigManager - 설정 관리자
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 새 ConfigManager 생성
    ///
    /// # 인자
    /// - db_path: 데이터베이스 파일 경로
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 기존 연결로 생성 (PRAGMA 재적용, 멱등)
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
        }
        Ok(Self { conn })
    }

    /// config_kv 에서 값 읽기
    pub fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// config_kv 에 값 쓰기 (UPSERT)
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    fn get_policy(&self, key: &str, default: ReferencePolicy) -> RepositoryResult<ReferencePolicy> {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => Ok(ReferencePolicy::parse(&raw).unwrap_or_else(|| {
                warn!(key = key, value = %raw, "알 수 없는 참조 정책, 기본값 사용");
                default
            })),
        }
    }
}

#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_worker_policy(&self) -> RepositoryResult<ReferencePolicy> {
        self.get_policy(config_keys::WORKER_POLICY, ImportConfig::default().worker_policy)
    }

    async fn get_team_policy(&self) -> RepositoryResult<ReferencePolicy> {
        self.get_policy(config_keys::TEAM_POLICY, ImportConfig::default().team_policy)
    }

    async fn get_site_policy(&self) -> RepositoryResult<ReferencePolicy> {
        self.get_policy(config_keys::SITE_POLICY, ImportConfig::default().site_policy)
    }

    async fn get_company_policy(&self) -> RepositoryResult<ReferencePolicy> {
        self.get_policy(config_keys::COMPANY_POLICY, ImportConfig::default().company_policy)
    }

    async fn get_overwrite_existing(&self) -> RepositoryResult<bool> {
        let value = self.get_config_or_default(config_keys::OVERWRITE_EXISTING, "false")?;
        Ok(matches!(
            value.trim().to_lowercase().as_str(),
            "1" | "true" | "y" | "yes"
        ))
    }

    async fn get_commit_concurrency(&self) -> RepositoryResult<usize> {
        let value = self.get_config_or_default(config_keys::COMMIT_CONCURRENCY, "4")?;
        Ok(value.trim().parse::<usize>().unwrap_or(4).max(1))
    }

    async fn get_batch_leader_placeholder(&self) -> RepositoryResult<String> {
        self.get_config_or_default(config_keys::BATCH_LEADER_PLACEHOLDER, "일괄생성")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use tempfile::NamedTempFile;

    fn setup() -> (NamedTempFile, ConfigManager) {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let conn = open_sqlite_connection(&path).unwrap();
        init_schema(&conn).unwrap();
        (file, ConfigManager::new(&path).unwrap())
    }

    #[tokio::test]
    async fn test_defaults_when_table_empty() {
        let (_file, manager) = setup();
        let config = manager.load_import_config().await.unwrap();
        assert_eq!(config, ImportConfig::default());
    }

    #[tokio::test]
    async fn test_overrides_from_config_kv() {
        let (_file, manager) = setup();
        manager
            .set_config_value(config_keys::WORKER_POLICY, "permissive")
            .unwrap();
        manager
            .set_config_value(config_keys::OVERWRITE_EXISTING, "true")
            .unwrap();
        manager
            .set_config_value(config_keys::COMMIT_CONCURRENCY, "0")
            .unwrap();

        let config = manager.load_import_config().await.unwrap();
        assert_eq!(config.worker_policy, ReferencePolicy::Permissive);
        assert!(config.overwrite_existing);
        assert_eq!(config.commit_concurrency, 1);
    }

    #[tokio::test]
    async fn test_unknown_policy_falls_back() {
        let (_file, manager) = setup();
        manager
            .set_config_value(config_keys::TEAM_POLICY, "sometimes")
            .unwrap();
        assert_eq!(
            manager.get_team_policy().await.unwrap(),
            ReferencePolicy::Permissive
        );
    }
}
