//! Application state for the AquaAlert HTTP API.
//!
//! Holds the report store, the session service, the aggregator and the clock
//! that stamps new records. Cloned per request; everything lives behind an
//! `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::alerting::{AggregatorConfig, AlertAggregator, DashboardData};
use crate::auth::{AuthService, Session};
use crate::clock::{Clock, SystemClock};
use crate::domain::{
    HealthReport, NewHealthReport, NewWaterQualityReport, VillageRegistry, WaterQualityReport,
};
use crate::store::{InMemoryStore, ReportStore};

/// Shared application state for the API.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn ReportStore>,
    auth: AuthService,
    aggregator: AlertAggregator,
    clock: Arc<dyn Clock>,
}

impl AppState {
    /// Volatile in-memory state on the system clock.
    pub fn new() -> Self {
        Self::with_store(Arc::new(InMemoryStore::new()))
    }

    /// State over an existing store on the system clock.
    pub fn with_store(store: Arc<dyn ReportStore>) -> Self {
        Self::with_parts(store, AlertAggregator::default(), Arc::new(SystemClock))
    }

    /// Fully specified state.
    pub fn with_parts(
        store: Arc<dyn ReportStore>,
        aggregator: AlertAggregator,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                auth: AuthService::new(store.clone(), clock.clone()),
                store,
                aggregator,
                clock,
            }),
        }
    }

    /// Report store
    pub fn store(&self) -> &dyn ReportStore {
        self.inner.store.as_ref()
    }

    /// Session service
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    /// Village registry used for aggregation
    pub fn registry(&self) -> &VillageRegistry {
        self.inner.aggregator.registry()
    }

    /// Aggregator thresholds
    pub fn aggregator_config(&self) -> &AggregatorConfig {
        self.inner.aggregator.config()
    }

    /// Session named by an `Authorization: Bearer <token>` header.
    pub fn session_from_headers(&self, headers: &HeaderMap) -> Option<Session> {
        let token = bearer_token(headers)?;
        self.inner.auth.session(token)
    }

    /// Validate and persist a health report stamped with the current time.
    pub fn submit_health_report(&self, report: NewHealthReport) -> crate::Result<HealthReport> {
        report.validate()?;
        self.warn_if_unregistered(&report.village);
        let report = report.into_report(self.inner.clock.now());
        let saved = self.inner.store.insert_health_report(report)?;
        tracing::info!(
            report_id = %saved.id,
            village = %saved.village,
            reported_by = %saved.reported_by,
            "health report saved"
        );
        Ok(saved)
    }

    /// Validate and persist a water-quality reading stamped with the current
    /// time.
    pub fn submit_water_report(
        &self,
        report: NewWaterQualityReport,
    ) -> crate::Result<WaterQualityReport> {
        report.validate()?;
        self.warn_if_unregistered(&report.village);
        let report = report.into_report(self.inner.clock.now());
        let saved = self.inner.store.insert_water_report(report)?;
        tracing::debug!(
            village = %saved.village,
            turbidity = %saved.turbidity,
            "water reading saved"
        );
        Ok(saved)
    }

    /// Dashboard payload at the current time.
    pub fn dashboard(&self) -> DashboardData {
        let now = self.inner.clock.now();
        let aggregator = &self.inner.aggregator;
        let reports = self
            .inner
            .store
            .health_reports_since(aggregator.window_start(now));

        let latest_water: HashMap<String, WaterQualityReport> = aggregator
            .registry()
            .iter()
            .filter_map(|village| {
                self.inner
                    .store
                    .latest_water_report(village.id)
                    .map(|reading| (village.id.to_string(), reading))
            })
            .collect();

        aggregator.aggregate(now, &reports, &latest_water, &mut rand::thread_rng())
    }

    fn warn_if_unregistered(&self, village: &str) {
        if !self.registry().contains(village) {
            tracing::warn!(village, "report for unregistered village will not be aggregated");
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}
