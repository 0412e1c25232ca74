use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;

use supplydesk_api::app::{build_app, services, AppServices};
use supplydesk_auth::permissions::names;
use supplydesk_auth::{Identity, JwtClaims, Permission, Role};
use supplydesk_core::{ContractId, Entity, OrgId, RoleId, UserId};
use supplydesk_infra::config::AuthConfig;
use supplydesk_infra::records::{Contract, PermissionRecord, RoleRecord, User};
use supplydesk_infra::{IdentityStore, InMemoryIdentityStore, RecordService, RepoError, UserAdmin};
use supplydesk_query::{Filter, ListRequest, Page};

const SECRET: &str = "test-secret";

const VENDOR_ORG: OrgId = OrgId::new(10);
const OTHER_ORG: OrgId = OrgId::new(20);

/// Contract service double: filters on `supply_vendor_id` like the SQL
/// scope would and records what it was asked.
#[derive(Default)]
struct FakeContracts {
    rows: Vec<Contract>,
    lists: Mutex<Vec<ListRequest>>,
    gets: Mutex<Vec<(ContractId, Vec<Filter>)>>,
}

impl FakeContracts {
    fn seeded() -> Self {
        Self {
            rows: vec![contract(1, VENDOR_ORG), contract(2, OTHER_ORG), contract(3, VENDOR_ORG)],
            ..Self::default()
        }
    }

    fn visible<'a>(&'a self, filters: &'a [Filter]) -> impl Iterator<Item = &'a Contract> + 'a {
        self.rows.iter().filter(move |c| {
            filters
                .iter()
                .filter(|f| f.key == "supply_vendor_id" && f.operator == "eq")
                .all(|f| f.value == c.supply_vendor_id.to_string())
        })
    }

    fn calls(&self) -> usize {
        self.lists.lock().unwrap().len() + self.gets.lock().unwrap().len()
    }

    fn last_list(&self) -> ListRequest {
        self.lists.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl RecordService<Contract> for FakeContracts {
    async fn list(&self, request: ListRequest) -> Result<Page<Contract>, RepoError> {
        let rows: Vec<Contract> = self.visible(&request.filters).cloned().collect();
        let total = rows.len() as i64;
        self.lists.lock().unwrap().push(request.clone());
        Ok(Page::new(request.offset, request.limit, request.sort, total, rows))
    }

    async fn get(&self, id: ContractId, scope: Vec<Filter>) -> Result<Contract, RepoError> {
        let found = self
            .visible(&scope)
            .find(|c| c.id == id)
            .cloned()
            .ok_or(RepoError::NotFound);
        self.gets.lock().unwrap().push((id, scope));
        found
    }

    async fn all(&self) -> Result<Vec<Contract>, RepoError> {
        Ok(self.rows.clone())
    }
}

/// Empty catalog for endpoints these tests do not look into.
struct Empty<E>(PhantomData<fn() -> E>);

impl<E> Empty<E> {
    fn new() -> Arc<Self> {
        Arc::new(Self(PhantomData))
    }
}

#[async_trait]
impl<E: Entity + Send + 'static> RecordService<E> for Empty<E> {
    async fn list(&self, request: ListRequest) -> Result<Page<E>, RepoError> {
        Ok(Page::new(request.offset, request.limit, request.sort, 0, Vec::new()))
    }

    async fn get(&self, _id: E::Id, _scope: Vec<Filter>) -> Result<E, RepoError> {
        Err(RepoError::NotFound)
    }

    async fn all(&self) -> Result<Vec<E>, RepoError> {
        Ok(Vec::new())
    }
}

/// Admin writes applied to the in-memory identities. Deactivated users are
/// parked so reactivation restores them; roles resolve from a fixed catalog.
struct StoreAdmin {
    identities: Arc<InMemoryIdentityStore>,
    catalog: Vec<Role>,
    parked: Mutex<HashMap<UserId, Identity>>,
}

impl StoreAdmin {
    async fn current(&self, user: UserId) -> Option<(Identity, bool)> {
        if let Ok(identity) = self.identities.fetch_identity(user).await {
            return Some((identity, true));
        }
        self.parked.lock().unwrap().get(&user).cloned().map(|identity| (identity, false))
    }
}

#[async_trait]
impl UserAdmin for StoreAdmin {
    async fn assign_roles(&self, user: UserId, roles: Vec<RoleId>, full_name: Option<String>) -> Result<(), RepoError> {
        let (mut identity, active) = self.current(user).await.ok_or(RepoError::NotFound)?;
        if !roles.is_empty() {
            let mut granted = Vec::new();
            for id in roles {
                let role = self
                    .catalog
                    .iter()
                    .find(|r| r.id == id)
                    .cloned()
                    .ok_or_else(|| RepoError::Rejected(format!("role_ids: role {id} does not exist")))?;
                granted.push(role);
            }
            granted.sort_by_key(|r| r.id);
            identity.roles = granted;
        }
        if let Some(name) = full_name {
            identity.full_name = name;
        }
        if active {
            self.identities.upsert(identity);
        } else {
            self.parked.lock().unwrap().insert(user, identity);
        }
        Ok(())
    }

    async fn set_active(&self, user: UserId, active: bool) -> Result<(), RepoError> {
        let (identity, was_active) = self.current(user).await.ok_or(RepoError::NotFound)?;
        match (was_active, active) {
            (true, false) => {
                self.identities.remove(user);
                self.parked.lock().unwrap().insert(user, identity);
            }
            (false, true) => {
                self.parked.lock().unwrap().remove(&user);
                self.identities.upsert(identity);
            }
            _ => {}
        }
        Ok(())
    }
}

fn contract(id: i64, vendor: OrgId) -> Contract {
    Contract {
        id: ContractId::new(id),
        supply_vendor_id: vendor,
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
        end_date: NaiveDate::from_ymd_opt(2024, 12, 31),
        base_amount: 1000,
        actual_amount: 900,
        code: format!("C-{id}"),
        supply_vendor_name: format!("vendor {vendor}"),
    }
}

fn role(id: i64, perms: &[&'static str]) -> Role {
    Role::new(
        RoleId::new(id),
        format!("role-{id}"),
        perms.iter().map(|p| Permission::new(*p)).collect(),
    )
}

struct TestServer {
    base_url: String,
    contracts: Arc<FakeContracts>,
    identities: Arc<InMemoryIdentityStore>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(AuthConfig {
            secret: SECRET.to_string(),
            ..AuthConfig::default()
        })
        .await
    }

    async fn spawn_with(auth: AuthConfig) -> Self {
        let contracts = Arc::new(FakeContracts::seeded());
        let identities = Arc::new(InMemoryIdentityStore::new());

        let app_services = AppServices {
            contracts: contracts.clone(),
            users: Empty::<User>::new(),
            roles: Empty::<RoleRecord>::new(),
            permissions: Empty::<PermissionRecord>::new(),
            user_admin: Arc::new(StoreAdmin {
                identities: identities.clone(),
                catalog: vec![role(3, &[names::VIEW_CONTRACT_LIST]), role(4, &[names::VIEW_LIST_USER])],
                parked: Mutex::new(HashMap::new()),
            }),
            identities: identities.clone(),
            tokens: services::token_validator(&auth),
        };

        // Same router as prod, bound to an ephemeral port.
        let app = build_app(&auth, app_services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            contracts,
            identities,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Register `identity` and return a valid token for it.
    fn login(&self, identity: Identity) -> String {
        let id = identity.id;
        self.identities.upsert(identity);
        mint_jwt(id, ChronoDuration::minutes(10))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(user: UserId, ttl: ChronoDuration) -> String {
    let now = Utc::now();
    let claims = JwtClaims::new(user, now - ChronoDuration::minutes(1), now + ttl);

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn vendor_user(id: i64) -> Identity {
    Identity::new(UserId::new(id), VENDOR_ORG, vec![role(3, &[names::VIEW_CONTRACT_LIST])])
}

fn ids(body: &serde_json::Value) -> Vec<i64> {
    body["list"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn health_is_public_and_tagged_with_request_id() {
    let srv = TestServer::spawn().await;

    let res = reqwest::get(srv.url("/health")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("request-id"));
}

#[tokio::test]
async fn missing_or_malformed_credentials_are_unauthorized() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = srv.login(vendor_user(1));

    let res = client.get(srv.url("/contracts")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(srv.url("/contracts"))
        .header("Authorization", format!("Token {token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(srv.url("/contracts"))
        .header("Authorization", format!("bearer {token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn expired_token_is_rejected_before_any_query() {
    let srv = TestServer::spawn().await;
    srv.identities.upsert(vendor_user(1));
    let token = mint_jwt(UserId::new(1), ChronoDuration::minutes(-5));

    let res = reqwest::Client::new()
        .get(srv.url("/contracts?filters.0.key=code&filters.0.operator=eq&filters.0.value=C-1"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthorized");
    assert_eq!(srv.contracts.calls(), 0);
}

#[tokio::test]
async fn token_signed_with_another_key_is_rejected() {
    let srv = TestServer::spawn().await;
    srv.identities.upsert(vendor_user(1));
    let claims = JwtClaims::new(UserId::new(1), Utc::now(), Utc::now() + ChronoDuration::minutes(5));
    let forged = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"other-secret"),
    )
    .unwrap();

    let res = reqwest::Client::new()
        .get(srv.url("/me"))
        .bearer_auth(forged)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn deactivated_user_is_unauthorized_on_next_request() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = srv.login(vendor_user(1));

    let res = client.get(srv.url("/me")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["org_id"], VENDOR_ORG.get());

    srv.identities.remove(UserId::new(1));

    let res = client.get(srv.url("/me")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn caller_without_contract_permissions_is_forbidden() {
    let srv = TestServer::spawn().await;
    let token = srv.login(Identity::new(
        UserId::new(2),
        OTHER_ORG,
        vec![role(1, &[names::VIEW_LIST_USER])],
    ));

    let res = reqwest::Client::new()
        .get(srv.url("/contracts"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "forbidden");
    assert_eq!(srv.contracts.calls(), 0);
}

#[tokio::test]
async fn only_the_first_role_is_consulted() {
    let srv = TestServer::spawn().await;
    let token = srv.login(Identity::new(
        UserId::new(3),
        VENDOR_ORG,
        vec![role(1, &[]), role(2, &[names::VIEW_ALL_CONTRACT_LIST])],
    ));

    let res = reqwest::Client::new()
        .get(srv.url("/contracts"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn narrow_holder_sees_only_own_org_contracts() {
    let srv = TestServer::spawn().await;
    let token = srv.login(vendor_user(1));

    let res = reqwest::Client::new()
        .get(srv.url("/contracts?limit=5&filters.0.key=code&filters.0.operator=like&filters.0.value=C-"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(ids(&body), vec![1, 3]);
    assert_eq!(body["total"], 2);
    assert_eq!(body["total_page"], 1);
    assert_eq!(body["limit"], 5);
    assert!(body["list"][0].get("supply_vendor_id").is_none());

    let seen = srv.contracts.last_list();
    assert_eq!(seen.sort, "id desc");
    assert_eq!(
        seen.filters,
        vec![
            Filter::new("code", "like", "C-"),
            Filter::eq("supply_vendor_id", VENDOR_ORG.get()),
        ]
    );
}

#[tokio::test]
async fn broad_permission_wins_over_narrow() {
    let srv = TestServer::spawn().await;
    let token = srv.login(Identity::new(
        UserId::new(4),
        VENDOR_ORG,
        vec![role(5, &[names::VIEW_CONTRACT_LIST, names::VIEW_ALL_CONTRACT_LIST])],
    ));

    let res = reqwest::Client::new()
        .get(srv.url("/contracts"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(ids(&body), vec![1, 2, 3]);
    assert!(srv.contracts.last_list().filters.is_empty());
}

#[tokio::test]
async fn admin_bypasses_permissions_and_row_scope() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = srv.login(Identity::admin(UserId::new(9), OTHER_ORG));

    let res = client.get(srv.url("/contracts")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["total"], 3);

    let res = client
        .get(srv.url("/auth/permissions"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn permission_catalog_is_admin_only() {
    let srv = TestServer::spawn().await;
    let token = srv.login(Identity::new(
        UserId::new(2),
        OTHER_ORG,
        vec![role(1, &[names::VIEW_LIST_USER, names::VIEW_ALL_CONTRACT_LIST])],
    ));

    let res = reqwest::Client::new()
        .get(srv.url("/auth/permissions"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn contract_detail_is_row_scoped() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = srv.login(vendor_user(1));

    let res = client.get(srv.url("/contracts/3")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["code"], "C-3");

    let res = client.get(srv.url("/contracts/2")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.get(srv.url("/contracts/abc")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client.get(srv.url("/contracts/0")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn revoked_permission_applies_on_next_request() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = srv.login(vendor_user(1));

    let res = client.get(srv.url("/contracts")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    srv.identities
        .upsert(Identity::new(UserId::new(1), VENDOR_ORG, vec![role(3, &[])]));

    let res = client.get(srv.url("/contracts")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn filter_on_unexposed_key_is_a_bad_request() {
    let srv = TestServer::spawn().await;
    let token = srv.login(vendor_user(1));

    let res = reqwest::Client::new()
        .get(srv.url("/contracts?filters.0.key=supply_vendor_id&filters.0.operator=eq&filters.0.value=20"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
    assert_eq!(srv.contracts.calls(), 0);
}

#[tokio::test]
async fn unknown_operator_does_not_fail_the_request() {
    let srv = TestServer::spawn().await;
    let token = srv.login(vendor_user(1));

    let res = reqwest::Client::new()
        .get(srv.url("/contracts?filters.0.key=code&filters.0.operator=between&filters.0.value=x"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn header_and_scheme_come_from_config() {
    let srv = TestServer::spawn_with(AuthConfig {
        header: "X-Access-Token".to_string(),
        token_scheme: "JWT".to_string(),
        secret: SECRET.to_string(),
        issuer: None,
    })
    .await;
    let client = reqwest::Client::new();
    let token = srv.login(vendor_user(1));

    let res = client.get(srv.url("/me")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(srv.url("/me"))
        .header("X-Access-Token", format!("jwt {token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn user_routes_have_their_own_permissions() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = srv.login(Identity::new(
        UserId::new(6),
        VENDOR_ORG,
        vec![role(7, &[names::VIEW_CURRENT_USER])],
    ));

    let res = client.get(srv.url("/users")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Permitted, but the empty catalog has no such user.
    let res = client.get(srv.url("/users/6")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_writes_are_admin_only() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = srv.login(Identity::new(
        UserId::new(1),
        VENDOR_ORG,
        vec![role(4, &[names::VIEW_LIST_USER, names::VIEW_CURRENT_USER])],
    ));

    let res = client
        .put(srv.url("/users/is-active"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "id": 1, "is_active": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .put(srv.url("/users/assign-role"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "id": 1, "role_ids": [4] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn deactivated_user_is_locked_out_until_reactivated() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin = srv.login(Identity::admin(UserId::new(99), VENDOR_ORG));
    let token = srv.login(vendor_user(1));

    let set_active = |active: bool| {
        client
            .put(srv.url("/users/is-active"))
            .bearer_auth(&admin)
            .json(&serde_json::json!({ "id": 1, "is_active": active }))
            .send()
    };

    assert_eq!(set_active(false).await.unwrap().status(), StatusCode::OK);
    let res = client.get(srv.url("/contracts")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(set_active(true).await.unwrap().status(), StatusCode::OK);
    let res = client.get(srv.url("/contracts")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .put(srv.url("/users/is-active"))
        .bearer_auth(&admin)
        .json(&serde_json::json!({ "id": 404, "is_active": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reassigned_roles_apply_on_next_request() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin = srv.login(Identity::admin(UserId::new(99), VENDOR_ORG));
    let token = srv.login(vendor_user(1));

    let res = client.get(srv.url("/contracts")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .put(srv.url("/users/assign-role"))
        .bearer_auth(&admin)
        .json(&serde_json::json!({ "id": 1, "role_ids": [4] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(srv.url("/contracts")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let res = client.get(srv.url("/users")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn assign_role_rejects_empty_and_unknown_changes() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin = srv.login(Identity::admin(UserId::new(99), VENDOR_ORG));
    srv.identities.upsert(vendor_user(1));

    for body in [
        serde_json::json!({ "id": 1 }),
        serde_json::json!({ "id": 1, "role_ids": [], "user_name": "" }),
        serde_json::json!({ "id": 1, "role_ids": [77] }),
    ] {
        let res = client
            .put(srv.url("/users/assign-role"))
            .bearer_auth(&admin)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{body}");
        let err: serde_json::Value = res.json().await.unwrap();
        assert_eq!(err["error"], "validation_error");
    }

    let still = srv.identities.fetch_identity(UserId::new(1)).await.unwrap();
    assert_eq!(still.roles[0].id, RoleId::new(3));
}
