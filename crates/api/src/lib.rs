//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes per actor role
//! - Authentication and role-guard middleware
//! - Error responses mapped from domain errors

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use mealcard_core::analytics::{AnalyticsCache, AnalyticsService};
use mealcard_core::catalog::CatalogService;
use mealcard_core::ledger::LedgerService;
use mealcard_core::purchase::PurchaseService;
use mealcard_core::recharge::RechargeService;
use mealcard_db::{CardRepository, MenuRepository, RechargeRepository};
use mealcard_shared::JwtService;
use mealcard_shared::config::{AnalyticsConfig, LedgerConfig};
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token verification.
    pub jwt_service: Arc<JwtService>,
    /// Analytics cache shared by every mutating service.
    pub analytics_cache: AnalyticsCache,
    /// Card provisioning policy.
    pub ledger_config: Arc<LedgerConfig>,
    /// Analytics settings.
    pub analytics_config: Arc<AnalyticsConfig>,
}

impl AppState {
    /// Builds the state. The analytics cache is sized from `analytics_config`.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        jwt_service: JwtService,
        ledger_config: LedgerConfig,
        analytics_config: AnalyticsConfig,
    ) -> Self {
        Self {
            db: Arc::new(db),
            jwt_service: Arc::new(jwt_service),
            analytics_cache: AnalyticsCache::from_config(&analytics_config),
            ledger_config: Arc::new(ledger_config),
            analytics_config: Arc::new(analytics_config),
        }
    }

    fn cards(&self) -> Arc<CardRepository> {
        Arc::new(CardRepository::new((*self.db).clone()))
    }

    fn requests(&self) -> Arc<RechargeRepository> {
        Arc::new(RechargeRepository::new((*self.db).clone()))
    }

    fn menu(&self) -> Arc<MenuRepository> {
        Arc::new(MenuRepository::new((*self.db).clone()))
    }

    /// Ledger service over Postgres.
    #[must_use]
    pub fn ledger(&self) -> LedgerService<CardRepository> {
        LedgerService::from_config(self.cards(), &self.ledger_config)
            .with_cache(self.analytics_cache.clone())
    }

    /// Recharge workflow over Postgres.
    #[must_use]
    pub fn recharge(&self) -> RechargeService<CardRepository, RechargeRepository> {
        RechargeService::new(self.cards(), self.requests())
            .with_cache(self.analytics_cache.clone())
    }

    /// Menu catalog over Postgres.
    #[must_use]
    pub fn catalog(&self) -> CatalogService<MenuRepository> {
        CatalogService::new(self.menu())
    }

    /// Counter purchases over Postgres.
    #[must_use]
    pub fn purchase(&self) -> PurchaseService<CardRepository, MenuRepository> {
        PurchaseService::new(self.ledger(), self.catalog())
    }

    /// Cached analytics over Postgres.
    #[must_use]
    pub fn analytics(&self) -> AnalyticsService<CardRepository, RechargeRepository> {
        AnalyticsService::new(
            self.cards(),
            self.requests(),
            self.analytics_cache.clone(),
            self.analytics_config.timezone,
        )
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
