//! Service wiring shared by all routes.

use std::sync::Arc;

use sqlx::PgPool;

use supplydesk_auth::{Hs256TokenValidator, TokenValidator};
use supplydesk_infra::config::AuthConfig;
use supplydesk_infra::records::{contracts, roles, users, Contract, PermissionRecord, RoleRecord, User};
use supplydesk_infra::{IdentityStore, PgIdentityStore, PgRecordService, PgUserAdmin, RecordService, UserAdmin};
use supplydesk_query::KeyRegistry;

#[derive(Clone)]
pub struct AppServices {
    pub contracts: Arc<dyn RecordService<Contract>>,
    pub users: Arc<dyn RecordService<User>>,
    pub roles: Arc<dyn RecordService<RoleRecord>>,
    pub permissions: Arc<dyn RecordService<PermissionRecord>>,
    pub user_admin: Arc<dyn UserAdmin>,
    pub identities: Arc<dyn IdentityStore>,
    pub tokens: Arc<dyn TokenValidator>,
}

impl AppServices {
    /// Postgres-backed services; registries are built once here.
    pub fn postgres(pool: PgPool, auth: &AuthConfig) -> Self {
        Self {
            contracts: Arc::new(PgRecordService::<Contract>::new(pool.clone(), contracts::registry())),
            users: Arc::new(PgRecordService::<User>::new(pool.clone(), users::registry())),
            roles: Arc::new(PgRecordService::<RoleRecord>::new(pool.clone(), roles::registry())),
            permissions: Arc::new(PgRecordService::<PermissionRecord>::new(
                pool.clone(),
                KeyRegistry::empty("permissions"),
            )),
            user_admin: Arc::new(PgUserAdmin::new(pool.clone())),
            identities: Arc::new(PgIdentityStore::new(pool)),
            tokens: token_validator(auth),
        }
    }
}

pub fn token_validator(auth: &AuthConfig) -> Arc<dyn TokenValidator> {
    Arc::new(Hs256TokenValidator::new(auth.secret.as_bytes(), auth.issuer.as_deref()))
}
