use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::error;

use crate::config_loader::AppConfig;
use crate::dashboard::{PriceDashboard, SatisfactionDashboard};
use crate::errors::{DashError, DashResult};
use crate::schema::ExpectedSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DashboardKind {
    Price,
    Satisfaction,
}

impl DashboardKind {
    pub fn slug(&self) -> &'static str {
        match self {
            DashboardKind::Price => "price",
            DashboardKind::Satisfaction => "satisfaction",
        }
    }
}

impl fmt::Display for DashboardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for DashboardKind {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price" => Ok(DashboardKind::Price),
            "satisfaction" => Ok(DashboardKind::Satisfaction),
            other => Err(DashError::not_found("dashboard", other)),
        }
    }
}

/// Loaded dashboards, shared read-only by every request.
///
/// A dashboard whose model or dataset failed to load keeps the failure
/// message; its endpoints report it while the other dashboard keeps serving.
pub struct AppState {
    price: Result<PriceDashboard, String>,
    satisfaction: Result<SatisfactionDashboard, String>,
    started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Availability {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Readiness {
    pub ready: bool,
    pub started_at: DateTime<Utc>,
    pub price: Availability,
    pub satisfaction: Availability,
}

impl AppState {
    pub fn load(config: &AppConfig) -> Self {
        Self::from_parts(
            PriceDashboard::load(&config.price),
            SatisfactionDashboard::load(&config.satisfaction),
        )
    }

    pub fn from_parts(
        price: DashResult<PriceDashboard>,
        satisfaction: DashResult<SatisfactionDashboard>,
    ) -> Self {
        Self {
            price: price.map_err(|e| unavailable(DashboardKind::Price, e)),
            satisfaction: satisfaction.map_err(|e| unavailable(DashboardKind::Satisfaction, e)),
            started_at: Utc::now(),
        }
    }

    pub fn price(&self) -> DashResult<&PriceDashboard> {
        self.price.as_ref().map_err(|m| DashError::config(m.clone()))
    }

    pub fn satisfaction(&self) -> DashResult<&SatisfactionDashboard> {
        self.satisfaction
            .as_ref()
            .map_err(|m| DashError::config(m.clone()))
    }

    pub fn schema(&self, kind: DashboardKind) -> DashResult<&ExpectedSchema> {
        match kind {
            DashboardKind::Price => Ok(self.price()?.schema()),
            DashboardKind::Satisfaction => Ok(self.satisfaction()?.schema()),
        }
    }

    pub fn readiness(&self) -> Readiness {
        let price = availability(self.price.as_ref().map(|d| d.model_id()));
        let satisfaction = availability(self.satisfaction.as_ref().map(|d| d.model_id()));
        Readiness {
            ready: price.ready && satisfaction.ready,
            started_at: self.started_at,
            price,
            satisfaction,
        }
    }
}

fn unavailable(kind: DashboardKind, err: DashError) -> String {
    let message = err.display_chain();
    error!(dashboard = %kind, error = %message, "Dashboard unavailable");
    format!("{kind} dashboard unavailable: {message}")
}

fn availability(slot: Result<&str, &String>) -> Availability {
    match slot {
        Ok(model_id) => Availability {
            ready: true,
            model_id: Some(model_id.to_string()),
            error: None,
        },
        Err(message) => Availability {
            ready: false,
            model_id: None,
            error: Some(message.clone()),
        },
    }
}
