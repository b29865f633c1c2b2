// ==========================================
// 현장 인력 관리 시스템 - 일괄 등록 저장소 구현
// ==========================================
// 책임: ImportStore 계약을 rusqlite 문서 테이블로 구현
// 금지: 업무 규칙 (문서 CRUD 만 수행)
// ==========================================

use crate::db::{init_schema, open_in_memory_connection, open_sqlite_connection};
use crate::domain::daily_report::{AggregateKey, AggregatePatch, DailyReportAggregate};
use crate::domain::entity::{Company, Site, Team, Worker};
use crate::domain::types::EntityKind;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::import_store::ImportStore;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

// ==========================================
// SqliteImportStore
// ==========================================
pub struct SqliteImportStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteImportStore {
    /// 파일 DB 로 생성 (스키마 자동 생성)
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 메모리 DB 로 생성
    pub fn in_memory() -> RepositoryResult<Self> {
        let conn = open_in_memory_connection()?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 기존 연결 공유 (ConfigManager 와 같은 연결을 쓸 때)
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            init_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn list_docs<T: DeserializeOwned>(&self, table: &str) -> RepositoryResult<Vec<T>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("SELECT doc FROM {} ORDER BY rowid", table))?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut docs = Vec::new();
        for raw in rows {
            docs.push(serde_json::from_str(&raw?)?);
        }
        Ok(docs)
    }

    fn insert_doc<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        name: &str,
        doc: &T,
    ) -> RepositoryResult<()> {
        let json = serde_json::to_string(doc)?;
        let conn = self.lock()?;
        conn.execute(
            &format!(
                "INSERT INTO {} (id, name, doc, updated_at) VALUES (?1, ?2, ?3, datetime('now'))",
                table
            ),
            params![id, name, json],
        )?;
        Ok(())
    }

    fn assign_id(id: &str) -> String {
        if id.trim().is_empty() {
            Uuid::new_v4().to_string()
        } else {
            id.to_string()
        }
    }
}

#[async_trait]
impl ImportStore for SqliteImportStore {
    async fn list_workers(&self) -> RepositoryResult<Vec<Worker>> {
        self.list_docs(EntityKind::Worker.table_name())
    }

    async fn list_teams(&self) -> RepositoryResult<Vec<Team>> {
        self.list_docs(EntityKind::Team.table_name())
    }

    async fn list_sites(&self) -> RepositoryResult<Vec<Site>> {
        self.list_docs(EntityKind::Site.table_name())
    }

    async fn list_companies(&self) -> RepositoryResult<Vec<Company>> {
        self.list_docs(EntityKind::Company.table_name())
    }

    async fn create_worker(&self, mut worker: Worker) -> RepositoryResult<String> {
        worker.id = Self::assign_id(&worker.id);
        let now = Utc::now();
        worker.created_at = Some(now);
        worker.updated_at = Some(now);
        self.insert_doc(EntityKind::Worker.table_name(), &worker.id, &worker.name, &worker)?;
        Ok(worker.id)
    }

    async fn create_team(&self, mut team: Team) -> RepositoryResult<String> {
        team.id = Self::assign_id(&team.id);
        let now = Utc::now();
        team.created_at = Some(now);
        team.updated_at = Some(now);
        self.insert_doc(EntityKind::Team.table_name(), &team.id, &team.name, &team)?;
        Ok(team.id)
    }

    async fn create_site(&self, mut site: Site) -> RepositoryResult<String> {
        site.id = Self::assign_id(&site.id);
        let now = Utc::now();
        site.created_at = Some(now);
        site.updated_at = Some(now);
        self.insert_doc(EntityKind::Site.table_name(), &site.id, &site.name, &site)?;
        Ok(site.id)
    }

    async fn create_company(&self, mut company: Company) -> RepositoryResult<String> {
        company.id = Self::assign_id(&company.id);
        let now = Utc::now();
        company.created_at = Some(now);
        company.updated_at = Some(now);
        self.insert_doc(
            EntityKind::Company.table_name(),
            &company.id,
            &company.name,
            &company,
        )?;
        Ok(company.id)
    }

    async fn update_entity(
        &self,
        kind: EntityKind,
        id: &str,
        fields: Map<String, Value>,
    ) -> RepositoryResult<()> {
        let table = kind.table_name();
        let conn = self.lock()?;

        let raw: Option<String> = conn
            .query_row(
                &format!("SELECT doc FROM {} WHERE id = ?1", table),
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        let raw = raw.ok_or_else(|| RepositoryError::NotFound {
            entity: kind.to_string(),
            id: id.to_string(),
        })?;

        let mut doc: Value = serde_json::from_str(&raw)?;
        let obj = doc.as_object_mut().ok_or_else(|| {
            RepositoryError::InternalError(format!("{} 문서가 객체가 아님: {}", table, id))
        })?;
        for (k, v) in fields {
            obj.insert(k, v);
        }
        obj.insert("updatedAt".to_string(), serde_json::to_value(Utc::now())?);
        let name = obj
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string);

        let json = serde_json::to_string(&doc)?;
        match (kind, name) {
            (EntityKind::DailyReportLine, _) | (_, None) => conn.execute(
                &format!(
                    "UPDATE {} SET doc = ?1, updated_at = datetime('now') WHERE id = ?2",
                    table
                ),
                params![json, id],
            )?,
            (_, Some(name)) => conn.execute(
                &format!(
                    "UPDATE {} SET doc = ?1, name = ?2, updated_at = datetime('now') WHERE id = ?3",
                    table
                ),
                params![json, name, id],
            )?,
        };
        Ok(())
    }

    async fn get_aggregate_by_key(
        &self,
        key: &AggregateKey,
    ) -> RepositoryResult<Option<DailyReportAggregate>> {
        let conn = self.lock()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT doc FROM daily_report WHERE date = ?1 AND site_id = ?2 AND team_id = ?3",
                params![key.date, key.site_id, key.team_id],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn create_aggregate(
        &self,
        mut aggregate: DailyReportAggregate,
    ) -> RepositoryResult<String> {
        aggregate.id = Self::assign_id(&aggregate.id);
        aggregate.date = aggregate.key().date;
        let now = Utc::now();
        aggregate.created_at = Some(now);
        aggregate.updated_at = Some(now);

        let json = serde_json::to_string(&aggregate)?;
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO daily_report (id, date, site_id, team_id, doc, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, datetime('now'))
            "#,
            params![
                aggregate.id,
                aggregate.date,
                aggregate.site_id,
                aggregate.team_id,
                json
            ],
        )?;
        Ok(aggregate.id)
    }

    async fn update_aggregate(&self, id: &str, patch: AggregatePatch) -> RepositoryResult<()> {
        let fields = match serde_json::to_value(&patch)? {
            Value::Object(map) => map,
            _ => {
                return Err(RepositoryError::InternalError(
                    "AggregatePatch 직렬화 결과가 객체가 아님".to_string(),
                ))
            }
        };
        self.update_entity(EntityKind::DailyReportLine, id, fields).await
    }
}
