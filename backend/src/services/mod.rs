//! Business services

pub mod auth;
pub mod authorization;
pub mod catalog;
pub mod circulation;
pub mod reading;
pub mod reviews;
pub mod session_token;

pub use auth::{AuthConfig, AuthService, LoginResult, SignupInput};
pub use authorization::{Authorizer, Role, require_role};
pub use catalog::{CatalogService, NewBook};
pub use circulation::{CirculationService, FinePolicy};
pub use reading::ReadingService;
pub use reviews::ReviewService;
pub use session_token::SessionTokens;

use crate::config::Config;
use crate::db::Database;

/// Every service the GraphQL layer needs, built once at startup
#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub catalog: CatalogService,
    pub reading: ReadingService,
    pub circulation: CirculationService,
    pub reviews: ReviewService,
}

impl Services {
    pub fn new(db: Database, config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            auth: AuthService::new(db.clone(), AuthConfig::from_config(config))?,
            catalog: CatalogService::new(db.clone()),
            reading: ReadingService::new(db.clone()),
            circulation: CirculationService::new(
                db.clone(),
                FinePolicy::new(config.overdue_fine_amount),
            ),
            reviews: ReviewService::new(db),
        })
    }
}
