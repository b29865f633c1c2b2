// ==========================================
// 현장 인력 관리 시스템 - 작업 일보 집계
// ==========================================
// 책임: (날짜, 현장, 팀) 단위 일보 문서와 작업자별 라인
// 불변식:
// - (date, siteId, teamId) 당 집계 문서는 최대 1건
// - 집계 내 workerId 당 라인은 최대 1건
// - totalManDay / totalAmount 는 라인 목록 전체에서 재계산한 값
// ==========================================

use crate::domain::types::SalaryModel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// AggregateKey - 집계 복합 키
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateKey {
    pub date: String,
    pub site_id: String,
    pub team_id: String,
}

impl AggregateKey {
    /// 날짜의 `.` 구분자는 `-` 로 치환해 키를 만든다
    pub fn new(date: &str, site_id: &str, team_id: &str) -> Self {
        Self {
            date: date.trim().replace('.', "-"),
            site_id: site_id.to_string(),
            team_id: team_id.to_string(),
        }
    }
}

impl fmt::Display for AggregateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.date, self.site_id, self.team_id)
    }
}

// ==========================================
// ReportLine - 작업자별 일보 라인
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportLine {
    pub worker_id: String,
    pub name: String,
    pub role: Option<String>,
    pub man_day: f64,
    pub work_content: Option<String>,
    pub unit_price: Option<i64>,
    pub pay_type: Option<SalaryModel>,
}

impl ReportLine {
    /// 라인 금액 (공수 × 단가, 원 단위 반올림)
    pub fn amount(&self) -> i64 {
        match self.unit_price {
            Some(price) => (self.man_day * price as f64).round() as i64,
            None => 0,
        }
    }
}

// ==========================================
// DailyReportAggregate - 일보 집계 문서
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DailyReportAggregate {
    pub id: String,
    pub date: String,
    pub site_id: String,
    pub site_name: String,
    pub team_id: String,
    pub team_name: String,
    pub responsible_team_id: Option<String>,
    pub responsible_team_name: Option<String>,
    pub company_id: Option<String>,
    pub company_name: Option<String>,
    pub lines: Vec<ReportLine>,
    pub total_man_day: f64,
    pub total_amount: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl DailyReportAggregate {
    pub fn key(&self) -> AggregateKey {
        AggregateKey::new(&self.date, &self.site_id, &self.team_id)
    }

    pub fn find_line(&self, worker_id: &str) -> Option<&ReportLine> {
        self.lines.iter().find(|l| l.worker_id == worker_id)
    }

    /// 합계를 라인 목록 전체에서 다시 계산
    ///
    /// 덮어쓰기 이후에도 정확해야 하므로 증분 계산을 하지 않는다.
    pub fn recompute_totals(&mut self) {
        self.total_man_day = self.lines.iter().map(|l| l.man_day).sum();
        self.total_amount = self.lines.iter().map(ReportLine::amount).sum();
    }
}

/// 집계 문서 부분 갱신 내용
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatePatch {
    pub lines: Vec<ReportLine>,
    pub total_man_day: f64,
    pub total_amount: i64,
}

impl From<&DailyReportAggregate> for AggregatePatch {
    fn from(aggregate: &DailyReportAggregate) -> Self {
        Self {
            lines: aggregate.lines.clone(),
            total_man_day: aggregate.total_man_day,
            total_amount: aggregate.total_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(worker_id: &str, man_day: f64, unit_price: Option<i64>) -> ReportLine {
        ReportLine {
            worker_id: worker_id.to_string(),
            name: worker_id.to_string(),
            man_day,
            unit_price,
            ..Default::default()
        }
    }

    #[test]
    fn test_aggregate_key_normalizes_dots() {
        let key = AggregateKey::new("2024.03.05", "S1", "T1");
        assert_eq!(key.to_string(), "2024-03-05_S1_T1");
        assert_eq!(key, AggregateKey::new("2024-03-05", "S1", "T1"));
    }

    #[test]
    fn test_recompute_totals_full_sum() {
        let mut aggregate = DailyReportAggregate {
            lines: vec![
                line("W1", 1.5, Some(150_000)),
                line("W2", 1.0, Some(100_000)),
                line("W3", 1.0, None),
            ],
            total_man_day: 99.0,
            ..Default::default()
        };

        aggregate.recompute_totals();

        assert_eq!(aggregate.total_man_day, 3.5);
        assert_eq!(aggregate.total_amount, 325_000);
    }

    #[test]
    fn test_find_line_by_worker() {
        let aggregate = DailyReportAggregate {
            lines: vec![line("W1", 1.0, None)],
            ..Default::default()
        };
        assert!(aggregate.find_line("W1").is_some());
        assert!(aggregate.find_line("W2").is_none());
    }
}
