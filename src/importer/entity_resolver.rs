// ==========================================
// 현장 인력 관리 시스템 - 엔티티 해석기
// ==========================================
// 책임: 자유 텍스트 이름 → 저장된 엔티티 (작업자/팀/현장/회사)
// 범위: 가져오기 세션 1회 (세션 간 공유 상태 없음)
// 규칙:
// - 세션 시작 시 전체 스냅샷으로 이름 → 엔티티 맵 구성
// - 이름은 공백 제거 정규화, 작업자 이름은 괄호 접미사도 제거
// - 미해석 + Permissive → 자리표시 엔티티 생성 후 세션 캐시에도 등록
//   (같은 배치의 후속 행이 같은 이름을 참조하면 재사용)
// - 미해석 + Strict → UnresolvedReference 오류
// ==========================================

use crate::config::ImportConfig;
use crate::domain::entity::{Company, CreatedEntity, Site, Team, Worker};
use crate::domain::types::{EntityKind, ReferencePolicy};
use crate::importer::data_cleaner::{normalize_name, normalize_worker_name};
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::ImportStore;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 해석된 참조 (id, 이름) 쌍
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRef {
    pub id: String,
    pub name: String,
    /// 이번 세션에서 자동 생성되었는지
    pub created: bool,
}

impl ResolvedRef {
    fn existing(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            created: false,
        }
    }
}

fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn generated_code(prefix: &str) -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, raw[..8].to_uppercase())
}

// ==========================================
// EntityResolver - 세션 범위 이름 캐시
// ==========================================
#[derive(Debug, Default)]
pub struct EntityResolver {
    workers: HashMap<String, Vec<Worker>>,
    teams: HashMap<String, Team>,
    sites: HashMap<String, Site>,
    companies: HashMap<String, Company>,
    created: Vec<CreatedEntity>,
}

impl EntityResolver {
    /// 스냅샷으로 캐시 구성 (동명 팀/현장/회사는 먼저 나온 항목 유지)
    pub fn from_snapshot(
        workers: Vec<Worker>,
        teams: Vec<Team>,
        sites: Vec<Site>,
        companies: Vec<Company>,
    ) -> Self {
        let mut resolver = Self::default();
        for worker in workers {
            resolver.register_worker(worker);
        }
        for team in teams {
            resolver.teams.entry(normalize_name(&team.name)).or_insert(team);
        }
        for site in sites {
            resolver.sites.entry(normalize_name(&site.name)).or_insert(site);
        }
        for company in companies {
            resolver
                .companies
                .entry(normalize_name(&company.name))
                .or_insert(company);
        }
        resolver
    }

    /// 저장소 전체 스냅샷 로드
    pub async fn load<S: ImportStore + ?Sized>(store: &S) -> ImportResult<Self> {
        let workers = store.list_workers().await?;
        let teams = store.list_teams().await?;
        let sites = store.list_sites().await?;
        let companies = store.list_companies().await?;
        info!(
            workers = workers.len(),
            teams = teams.len(),
            sites = sites.len(),
            companies = companies.len(),
            "엔티티 스냅샷 로드 완료"
        );
        Ok(Self::from_snapshot(workers, teams, sites, companies))
    }

    // ==========================================
    // 조회
    // ==========================================

    /// 종류 무관 이름 해석
    pub fn resolve(&self, name: &str, kind: EntityKind) -> Option<ResolvedRef> {
        match kind {
            EntityKind::Worker => self.worker(name).map(|w| ResolvedRef::existing(&w.id, &w.name)),
            EntityKind::Team => self.team(name).map(|t| ResolvedRef::existing(&t.id, &t.name)),
            EntityKind::Site => self.site(name).map(|s| ResolvedRef::existing(&s.id, &s.name)),
            EntityKind::Company => self
                .company(name)
                .map(|c| ResolvedRef::existing(&c.id, &c.name)),
            EntityKind::DailyReportLine => None,
        }
    }

    /// 이름으로 작업자 조회 (동명이인이면 첫 번째)
    pub fn worker(&self, name: &str) -> Option<&Worker> {
        self.workers
            .get(&normalize_worker_name(name))
            .and_then(|list| list.first())
    }

    /// 이름 + 주민번호 정확 조회
    pub fn worker_exact(&self, name: &str, id_number: &str) -> Option<&Worker> {
        let wanted = digits_only(id_number);
        if wanted.is_empty() {
            return None;
        }
        self.workers
            .get(&normalize_worker_name(name))?
            .iter()
            .find(|w| {
                w.id_number
                    .as_deref()
                    .is_some_and(|id| digits_only(id) == wanted)
            })
    }

    /// 같은 정규화 이름의 작업자가 둘 이상인지
    pub fn is_ambiguous_worker(&self, name: &str) -> bool {
        self.workers
            .get(&normalize_worker_name(name))
            .is_some_and(|list| list.len() > 1)
    }

    pub fn team(&self, name: &str) -> Option<&Team> {
        self.teams.get(&normalize_name(name))
    }

    pub fn site(&self, name: &str) -> Option<&Site> {
        self.sites.get(&normalize_name(name))
    }

    pub fn company(&self, name: &str) -> Option<&Company> {
        self.companies.get(&normalize_name(name))
    }

    /// 세션 중 자동 생성된 엔티티
    pub fn created(&self) -> &[CreatedEntity] {
        &self.created
    }

    // ==========================================
    // 캐시 갱신
    // ==========================================

    /// 작업자 캐시 등록/교체 (id 기준)
    pub fn register_worker(&mut self, worker: Worker) {
        let list = self
            .workers
            .entry(normalize_worker_name(&worker.name))
            .or_default();
        match list.iter_mut().find(|w| !worker.id.is_empty() && w.id == worker.id) {
            Some(slot) => *slot = worker,
            None => list.push(worker),
        }
    }

    pub fn register_team(&mut self, team: Team) {
        self.teams.insert(normalize_name(&team.name), team);
    }

    pub fn register_company(&mut self, company: Company) {
        self.companies.insert(normalize_name(&company.name), company);
    }

    fn record_created(&mut self, kind: EntityKind, id: &str, name: &str) {
        info!(kind = %kind, id = %id, name = %name, "엔티티 자동 생성");
        self.created.push(CreatedEntity {
            kind,
            id: id.to_string(),
            name: name.to_string(),
        });
    }

    // ==========================================
    // 해석 + 자동 생성
    // ==========================================

    /// 회사 해석 (Permissive 이면 자동 생성)
    pub async fn ensure_company<S: ImportStore + ?Sized>(
        &mut self,
        store: &S,
        name: &str,
        config: &ImportConfig,
    ) -> ImportResult<ResolvedRef> {
        if let Some(found) = self.company(name) {
            return Ok(ResolvedRef::existing(&found.id, &found.name));
        }
        if config.company_policy == ReferencePolicy::Strict {
            return Err(ImportError::UnresolvedReference {
                kind: EntityKind::Company,
                name: name.to_string(),
            });
        }

        let mut company = Company {
            name: name.trim().to_string(),
            code: generated_code("CMP"),
            ..Default::default()
        };
        company.id = store.create_company(company.clone()).await?;
        let resolved = ResolvedRef {
            id: company.id.clone(),
            name: company.name.clone(),
            created: true,
        };
        self.record_created(EntityKind::Company, &company.id, &company.name);
        self.register_company(company);
        Ok(resolved)
    }

    /// 팀 해석 (Permissive 이면 자리표시 팀장으로 자동 생성)
    pub async fn ensure_team<S: ImportStore + ?Sized>(
        &mut self,
        store: &S,
        name: &str,
        company: Option<&ResolvedRef>,
        config: &ImportConfig,
    ) -> ImportResult<ResolvedRef> {
        self.ensure_team_with_leader(store, name, None, company, config)
            .await
    }

    /// 팀 해석, 자동 생성 시 팀장 지정 (없으면 자리표시)
    ///
    /// 이미 있는 팀의 팀장은 바꾸지 않는다.
    pub async fn ensure_team_with_leader<S: ImportStore + ?Sized>(
        &mut self,
        store: &S,
        name: &str,
        leader: Option<&str>,
        company: Option<&ResolvedRef>,
        config: &ImportConfig,
    ) -> ImportResult<ResolvedRef> {
        if let Some(found) = self.team(name) {
            return Ok(ResolvedRef::existing(&found.id, &found.name));
        }
        if config.team_policy == ReferencePolicy::Strict {
            return Err(ImportError::UnresolvedReference {
                kind: EntityKind::Team,
                name: name.to_string(),
            });
        }

        let mut team = Team {
            name: name.trim().to_string(),
            leader_name: leader
                .map(str::to_string)
                .unwrap_or_else(|| config.batch_leader_placeholder.clone()),
            company_id: company.map(|c| c.id.clone()),
            company_name: company.map(|c| c.name.clone()),
            ..Default::default()
        };
        team.id = store.create_team(team.clone()).await?;
        let resolved = ResolvedRef {
            id: team.id.clone(),
            name: team.name.clone(),
            created: true,
        };
        self.record_created(EntityKind::Team, &team.id, &team.name);
        self.register_team(team);
        Ok(resolved)
    }

    /// 현장 해석 (Permissive 이면 생성 코드로 자동 생성)
    pub async fn ensure_site<S: ImportStore + ?Sized>(
        &mut self,
        store: &S,
        name: &str,
        company: Option<&ResolvedRef>,
        responsible_team: Option<&ResolvedRef>,
        config: &ImportConfig,
    ) -> ImportResult<ResolvedRef> {
        if let Some(found) = self.site(name) {
            return Ok(ResolvedRef::existing(&found.id, &found.name));
        }
        if config.site_policy == ReferencePolicy::Strict {
            return Err(ImportError::UnresolvedReference {
                kind: EntityKind::Site,
                name: name.to_string(),
            });
        }

        let mut site = Site {
            name: name.trim().to_string(),
            code: generated_code("SITE"),
            company_id: company.map(|c| c.id.clone()),
            company_name: company.map(|c| c.name.clone()),
            responsible_team_id: responsible_team.map(|t| t.id.clone()),
            responsible_team_name: responsible_team.map(|t| t.name.clone()),
            ..Default::default()
        };
        site.id = store.create_site(site.clone()).await?;
        let resolved = ResolvedRef {
            id: site.id.clone(),
            name: site.name.clone(),
            created: true,
        };
        self.record_created(EntityKind::Site, &site.id, &site.name);
        self.sites.insert(normalize_name(&site.name), site);
        Ok(resolved)
    }

    /// 작업자 해석
    ///
    /// 주민번호가 있으면 (이름, 주민번호) 정확 조회, 없으면 이름 조회.
    /// Strict 정책에서는 절대 생성하지 않는다.
    /// Permissive 정책(직접 입력 흐름)에서는 draft 로 최소 작업자를 생성한다.
    pub async fn ensure_worker<S: ImportStore + ?Sized>(
        &mut self,
        store: &S,
        draft: Worker,
        config: &ImportConfig,
    ) -> ImportResult<ResolvedRef> {
        let found = match draft.id_number.as_deref() {
            Some(id_number) if !id_number.trim().is_empty() => {
                self.worker_exact(&draft.name, id_number)
            }
            _ => self.worker(&draft.name),
        };
        if let Some(found) = found {
            return Ok(ResolvedRef::existing(&found.id, &found.name));
        }
        if config.worker_policy == ReferencePolicy::Strict {
            return Err(ImportError::UnresolvedReference {
                kind: EntityKind::Worker,
                name: draft.name.clone(),
            });
        }

        let mut worker = draft;
        worker.name = worker.name.trim().to_string();
        worker.id = store.create_worker(worker.clone()).await?;
        let resolved = ResolvedRef {
            id: worker.id.clone(),
            name: worker.name.clone(),
            created: true,
        };
        self.record_created(EntityKind::Worker, &worker.id, &worker.name);
        self.register_worker(worker);
        Ok(resolved)
    }

    // ==========================================
    // 계정 연결 (1:1)
    // ==========================================

    /// 작업자 ↔ 계정 연결
    ///
    /// - (이름, 주민번호) 정확 조회 실패 → WorkerNotFound
    /// - 작업자가 다른 계정에 이미 연결됨 → AccountConflict
    /// - 계정이 다른 작업자에 이미 연결됨 → AccountConflict
    /// - 같은 계정에 이미 연결됨 → 변경 없음
    pub async fn link_worker_account<S: ImportStore + ?Sized>(
        &mut self,
        store: &S,
        name: &str,
        id_number: &str,
        account_id: &str,
    ) -> ImportResult<Worker> {
        let worker = self
            .worker_exact(name, id_number)
            .cloned()
            .ok_or_else(|| ImportError::WorkerNotFound {
                name: name.to_string(),
                id_number: id_number.to_string(),
            })?;

        match worker.linked_account_id.as_deref() {
            Some(linked) if linked == account_id => {
                debug!(worker_id = %worker.id, "이미 같은 계정에 연결됨");
                return Ok(worker);
            }
            Some(linked) => {
                warn!(worker_id = %worker.id, linked = %linked, requested = %account_id, "계정 연결 충돌");
                return Err(ImportError::AccountConflict {
                    worker: worker.name.clone(),
                    linked: linked.to_string(),
                    requested: account_id.to_string(),
                });
            }
            None => {}
        }

        let other = self
            .workers
            .values()
            .flatten()
            .find(|w| w.id != worker.id && w.linked_account_id.as_deref() == Some(account_id));
        if let Some(other) = other {
            warn!(account = %account_id, other_worker = %other.id, "계정이 다른 작업자에 연결됨");
            return Err(ImportError::AccountConflict {
                worker: other.name.clone(),
                linked: account_id.to_string(),
                requested: account_id.to_string(),
            });
        }

        let mut fields = Map::new();
        fields.insert("linkedAccountId".to_string(), json!(account_id));
        store
            .update_entity(EntityKind::Worker, &worker.id, fields)
            .await?;

        let mut linked = worker;
        linked.linked_account_id = Some(account_id.to_string());
        self.register_worker(linked.clone());
        info!(worker_id = %linked.id, account = %account_id, "작업자 계정 연결 완료");
        Ok(linked)
    }
}
