#[cfg(test)]
#[path = "knowledge_test.rs"]
mod tests;

use super::HealthReport;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum HealthStatus {
    /// No health probe has settled yet.
    #[default]
    Unknown,
    Healthy,
    Limited,
    Error,
}

impl HealthStatus {
    pub fn from_report(report: &HealthReport) -> HealthStatus {
        match report.status.to_lowercase().as_str() {
            "healthy" => return HealthStatus::Healthy,
            "limited" => return HealthStatus::Limited,
            _ => return HealthStatus::Error,
        }
    }
}

/// Client-side cache of the knowledge service's aggregate state. Only ever
/// refreshed by polling, so it may lag behind the service.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KnowledgeSummary {
    pub total_entries: Option<u64>,
    pub health: HealthStatus,
    pub health_report: Option<HealthReport>,
    pub mode: Option<String>,
}

impl KnowledgeSummary {
    pub fn status_line(&self) -> String {
        let mut parts = vec![format!("● {}", self.health)];

        if let Some(report) = &self.health_report {
            if let Some(db) = &report.mongodb {
                parts.push(format!("db {db}"));
            }
            if let Some(engine) = &report.groq {
                parts.push(format!("ai {engine}"));
            }
        }

        match self.total_entries {
            Some(1) => parts.push("1 entry".to_string()),
            Some(total) => parts.push(format!("{total} entries")),
            None => parts.push("entries unknown".to_string()),
        }

        if let Some(mode) = &self.mode {
            parts.push(format!("{mode} mode"));
        }

        return parts.join(" | ");
    }
}
