// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Resolver implementations.
//!
//! Every REST-backed operation follows the same shape: arguments were
//! validated when the [`Operation`] was built, then exactly one request is
//! dispatched, then the response is written into the cache. `confirmUser`
//! alone logs and absorbs failures after validation; every other operation
//! returns them to the caller.

use serde_json::{json, Value};
use tracing::{error, info};

use super::documents::{CURRENT_USER_QUERY, DAPP_USER_FRAGMENT, JWT_TOKEN_FIELD};
use super::Operation;
use crate::cache::Cache;
use crate::error::ResolveError;
use crate::gateway::{GatewayResponse, RestGateway};
use crate::models::{id_key, DappUser, UserProfile, DAPP_USER_TYPENAME};
use crate::storage::SessionStore;

#[derive(Debug, Clone)]
pub struct CacheBridge {
    pub(crate) cache: Cache,
    pub(crate) gateway: RestGateway,
    pub(crate) session: SessionStore,
}

impl CacheBridge {
    pub fn new(cache: Cache, gateway: RestGateway, session: SessionStore) -> Self {
        Self {
            cache,
            gateway,
            session,
        }
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn gateway(&self) -> &RestGateway {
        &self.gateway
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Run `operation` and return its result in the shape callers read.
    pub async fn execute(&self, operation: Operation) -> Result<Value, ResolveError> {
        match operation {
            Operation::CurrentUser => Ok(self.current_user().unwrap_or(Value::Null)),
            Operation::JwtToken => Ok(self.jwt_token().map(Value::String).unwrap_or(Value::Null)),
            Operation::DappUser { dapp_user_id } => self.resolve_dapp_user(&dapp_user_id).await,
            Operation::SignIn { email, password } => {
                let profile = self.resolve_sign_in(&email, &password).await?;
                to_value(&profile)
            }
            Operation::ConfirmUser {
                one_time_key,
                password,
            } => match self.resolve_confirm_user(&one_time_key, &password).await {
                Some(profile) => to_value(&profile),
                None => Ok(Value::Null),
            },
            Operation::ConfirmDappUser { request_key } => {
                let response = self.resolve_confirm_dapp_user(&request_key).await?;
                to_value(&response)
            }
        }
    }

    // ========== Client-only reads ==========

    /// The cached current user, shaped by `currentUserQuery`.
    pub fn current_user(&self) -> Option<Value> {
        self.cache
            .read_query(&CURRENT_USER_QUERY)
            .filter(|value| !value.is_null())
    }

    pub fn jwt_token(&self) -> Option<String> {
        match self.cache.read_field(JWT_TOKEN_FIELD)? {
            Value::String(token) => Some(token),
            _ => None,
        }
    }

    // ========== Typed entry points ==========

    pub async fn dapp_user(&self, dapp_user_id: &str) -> Result<DappUser, ResolveError> {
        Operation::dapp_user(dapp_user_id)?;
        let stored = self.resolve_dapp_user(dapp_user_id).await?;
        serde_json::from_value(stored)
            .map_err(|e| ResolveError::InvalidResponse(format!("dapp user: {e}")))
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserProfile, ResolveError> {
        Operation::sign_in(email, password)?;
        self.resolve_sign_in(email, password).await
    }

    /// `Ok(None)` when confirmation failed after validation; the failure
    /// has been logged.
    pub async fn confirm_user(
        &self,
        one_time_key: &str,
        password: &str,
    ) -> Result<Option<UserProfile>, ResolveError> {
        Operation::confirm_user(one_time_key, password)?;
        Ok(self.resolve_confirm_user(one_time_key, password).await)
    }

    pub async fn confirm_dapp_user(
        &self,
        request_key: &str,
    ) -> Result<GatewayResponse, ResolveError> {
        Operation::confirm_dapp_user(request_key)?;
        self.resolve_confirm_dapp_user(request_key).await
    }

    // ========== Resolvers (arguments already validated) ==========

    async fn resolve_dapp_user(&self, dapp_user_id: &str) -> Result<Value, ResolveError> {
        let response = self
            .gateway
            .get(&["dapp-users", dapp_user_id], &[])
            .await?;

        let Value::Object(mut data) = response.data else {
            return Err(ResolveError::InvalidResponse(
                "dapp user is not an object".to_string(),
            ));
        };
        let id = match data.get("id").and_then(id_key) {
            Some(id) => id,
            None => {
                data.insert("id".to_string(), Value::String(dapp_user_id.to_string()));
                dapp_user_id.to_string()
            }
        };

        let key = format!("{DAPP_USER_TYPENAME}:{id}");
        let stored = self
            .cache
            .write_fragment(&key, &DAPP_USER_FRAGMENT, Value::Object(data))?;
        Ok(stored)
    }

    async fn resolve_sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, ResolveError> {
        let response = self
            .gateway
            .get(&["sign-in"], &[("email", email), ("password", password)])
            .await?;
        let profile = self.establish_session(response).await?;
        info!(operation = "signIn", user_id = %profile.id, "Signed in");
        Ok(profile)
    }

    async fn resolve_confirm_user(&self, one_time_key: &str, password: &str) -> Option<UserProfile> {
        let result: Result<UserProfile, ResolveError> = async {
            let response = self
                .gateway
                .post(
                    &["users", "confirm"],
                    &json!({ "password": password }),
                    Some(one_time_key),
                )
                .await?;
            self.establish_session(response).await
        }
        .await;

        match result {
            Ok(profile) => {
                info!(operation = "confirmUser", user_id = %profile.id, "User confirmed");
                Some(profile)
            }
            Err(e) => {
                error!(operation = "confirmUser", error = %e, "Confirmation failed");
                None
            }
        }
    }

    async fn resolve_confirm_dapp_user(
        &self,
        request_key: &str,
    ) -> Result<GatewayResponse, ResolveError> {
        let response = self
            .gateway
            .post(
                &["dapp-users", "confirm"],
                &json!({ "requestKey": request_key }),
                None,
            )
            .await?;
        info!(operation = "confirmDappUser", status = response.status, "Dapp user confirmed");
        Ok(response)
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, ResolveError> {
    serde_json::to_value(value).map_err(|e| ResolveError::InvalidResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayError;
    use crate::models::SessionToken;
    use crate::test_support::MockApi;
    use axum::http::StatusCode;

    struct Fixture {
        api: MockApi,
        bridge: CacheBridge,
        dir: tempfile::TempDir,
    }

    async fn fixture() -> Fixture {
        let api = MockApi::start().await;
        let dir = tempfile::tempdir().unwrap();
        let bridge = CacheBridge::new(
            Cache::new(),
            RestGateway::new(&api.base_uri(), None).unwrap(),
            SessionStore::open(dir.path()),
        );
        Fixture { api, bridge, dir }
    }

    fn profile_json() -> Value {
        json!({"id": 1, "email": "ada@notus.events", "confirmedAt": "2026-03-01T12:00:00Z"})
    }

    #[tokio::test]
    async fn sign_in_with_missing_arguments_makes_no_request() {
        let f = fixture().await;

        for (email, password) in [("", "pw"), ("ada@notus.events", ""), ("", "")] {
            let err = f.bridge.sign_in(email, password).await.unwrap_err();
            assert!(err.is_validation());
        }
        assert!(f.api.requests().is_empty());
        assert!(f.bridge.jwt_token().is_none());
    }

    #[tokio::test]
    async fn sign_in_mirrors_token_before_fetching_profile() {
        let f = fixture().await;
        f.api.respond("GET", "/sign-in", StatusCode::OK, json!("T"));
        f.api.respond("GET", "/users", StatusCode::OK, profile_json());
        f.api.watch_file(f.dir.path().join("session.json"));

        let profile = f.bridge.sign_in("ada@notus.events", "pw").await.unwrap();
        assert_eq!(profile.email.as_deref(), Some("ada@notus.events"));

        let sign_in = f.api.requests_to("GET", "/sign-in");
        assert_eq!(sign_in.len(), 1);
        assert_eq!(sign_in[0].query_param("email").as_deref(), Some("ada@notus.events"));
        assert_eq!(sign_in[0].query_param("password").as_deref(), Some("pw"));

        let users = f.api.requests_to("GET", "/users");
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].authorization.as_deref(), Some("Bearer T"));
        assert_eq!(users[0].watched.as_deref(), Some(r#"{"jwtToken":"T"}"#));

        assert_eq!(f.bridge.jwt_token().as_deref(), Some("T"));
        assert_eq!(f.bridge.session().read(), SessionToken::new("T"));
        assert_eq!(f.bridge.gateway().auth_header().as_deref(), Some("Bearer T"));

        let current = f.bridge.current_user().unwrap();
        assert_eq!(current["__typename"], "User");
        assert_eq!(current["id"], 1);
        assert_eq!(current["email"], "ada@notus.events");
    }

    #[tokio::test]
    async fn sign_in_http_failure_propagates() {
        let f = fixture().await;
        f.api.respond(
            "GET",
            "/sign-in",
            StatusCode::UNAUTHORIZED,
            json!({"error": "bad credentials"}),
        );

        let err = f.bridge.sign_in("ada@notus.events", "nope").await.unwrap_err();
        assert!(matches!(err, ResolveError::Gateway(ref e) if e.status() == Some(401)));
        assert!(f.api.requests_to("GET", "/users").is_empty());
        assert!(f.bridge.jwt_token().is_none());
        assert!(f.bridge.session().read().is_none());
    }

    #[tokio::test]
    async fn sign_in_with_empty_token_writes_nothing() {
        let f = fixture().await;
        f.api.respond("GET", "/sign-in", StatusCode::OK, json!(""));

        let err = f.bridge.sign_in("ada@notus.events", "pw").await.unwrap_err();
        assert!(matches!(err, ResolveError::InvalidResponse(_)));
        assert!(f.bridge.jwt_token().is_none());
        assert!(f.bridge.gateway().auth_header().is_none());
        assert!(f.api.requests_to("GET", "/users").is_empty());
    }

    #[tokio::test]
    async fn dapp_user_is_reachable_by_composite_key() {
        let f = fixture().await;
        f.api.respond(
            "GET",
            "/dapp-users/42",
            StatusCode::OK,
            json!({"id": 42, "name": "x"}),
        );

        let dapp_user = f.bridge.dapp_user("42").await.unwrap();
        assert_eq!(dapp_user.id, json!(42));
        assert_eq!(dapp_user.extra["name"], "x");

        let record = f.bridge.cache().record("DappUser:42").unwrap();
        assert_eq!(record["name"], "x");
        assert_eq!(record["__typename"], "DappUser");
    }

    #[tokio::test]
    async fn self_referencing_dapp_user_is_written_once() {
        let f = fixture().await;
        f.api.respond(
            "GET",
            "/dapp-users/1",
            StatusCode::OK,
            json!({
                "id": 1,
                "a": {"__typename": "DappUser", "id": 1},
                "b": {"__typename": "DappUser", "id": 1}
            }),
        );

        let value = f
            .bridge
            .execute(Operation::dapp_user("1").unwrap())
            .await
            .unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["a"], json!({"__ref": "DappUser:1"}));
        assert_eq!(value["b"], json!({"__ref": "DappUser:1"}));
        assert_eq!(f.bridge.cache().snapshot().len(), 1);
    }

    #[tokio::test]
    async fn dapp_user_id_stays_one_path_segment() {
        let f = fixture().await;
        f.api.respond("GET", "/users", StatusCode::OK, profile_json());
        f.bridge
            .gateway()
            .set_auth_header(SessionToken::new("T").as_ref());

        let err = f
            .bridge
            .execute(Operation::dapp_user("../users").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::Gateway(ref e) if e.status() == Some(404)));

        let err = f.bridge.dapp_user("5?x=1").await.unwrap_err();
        assert!(matches!(err, ResolveError::Gateway(_)));

        let err = f.bridge.dapp_user("..").await.unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Gateway(GatewayError::InvalidSegment(_))
        ));

        let seen: Vec<_> = f
            .api
            .requests()
            .into_iter()
            .map(|r| (r.path, r.query))
            .collect();
        assert_eq!(
            seen,
            vec![
                ("/dapp-users/..%2Fusers".to_string(), None),
                ("/dapp-users/5%3Fx=1".to_string(), None),
            ]
        );
        assert!(f.bridge.cache().snapshot().is_empty());
    }

    #[tokio::test]
    async fn dapp_user_without_id_in_response_uses_requested_id() {
        let f = fixture().await;
        f.api.respond("GET", "/dapp-users/7", StatusCode::OK, json!({"name": "y"}));

        let value = f
            .bridge
            .execute(Operation::dapp_user("7").unwrap())
            .await
            .unwrap();
        assert_eq!(value["id"], "7");
        assert!(f.bridge.cache().record("DappUser:7").is_some());
    }

    #[tokio::test]
    async fn dapp_user_errors() {
        let f = fixture().await;
        let err = f.bridge.dapp_user("").await.unwrap_err();
        assert_eq!(err.to_string(), "You must pass the dappUserId");
        assert!(f.api.requests().is_empty());

        let err = f.bridge.dapp_user("404").await.unwrap_err();
        assert!(matches!(err, ResolveError::Gateway(ref e) if e.status() == Some(404)));
    }

    #[tokio::test]
    async fn confirm_dapp_user_posts_once_and_returns_raw_response() {
        let f = fixture().await;
        let body = json!({"confirmed": true, "dappUser": {"id": 3}});
        f.api.respond("POST", "/dapp-users/confirm", StatusCode::OK, body.clone());

        let response = f.bridge.confirm_dapp_user("abc").await.unwrap();
        assert_eq!(response, GatewayResponse { status: 200, data: body.clone() });

        let requests = f.api.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/dapp-users/confirm");
        assert_eq!(requests[0].body, json!({"requestKey": "abc"}));

        // No cache side effects.
        assert!(f.bridge.cache().snapshot().is_empty());

        let value = f
            .bridge
            .execute(Operation::confirm_dapp_user("abc").unwrap())
            .await
            .unwrap();
        assert_eq!(value, json!({"status": 200, "data": body}));
    }

    #[tokio::test]
    async fn confirm_dapp_user_requires_request_key() {
        let f = fixture().await;
        let err = f.bridge.confirm_dapp_user("").await.unwrap_err();
        assert_eq!(err.to_string(), "requestKey is not defined");
        assert!(f.api.requests().is_empty());
    }

    #[tokio::test]
    async fn confirm_user_uses_one_time_key_and_establishes_session() {
        let f = fixture().await;
        f.api.respond("POST", "/users/confirm", StatusCode::OK, json!("T2"));
        f.api.respond("GET", "/users", StatusCode::OK, profile_json());

        let profile = f
            .bridge
            .confirm_user("one-time", "pw")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.id, json!(1));

        let confirm = f.api.requests_to("POST", "/users/confirm");
        assert_eq!(confirm[0].authorization.as_deref(), Some("Bearer one-time"));
        assert_eq!(confirm[0].body, json!({"password": "pw"}));

        let users = f.api.requests_to("GET", "/users");
        assert_eq!(users[0].authorization.as_deref(), Some("Bearer T2"));
        assert_eq!(f.bridge.jwt_token().as_deref(), Some("T2"));
        assert_eq!(f.bridge.current_user().unwrap()["id"], 1);
    }

    #[tokio::test]
    async fn confirm_user_failure_is_absorbed_without_state_changes() {
        let f = fixture().await;

        // An existing session must survive the failed confirmation.
        f.api.respond("GET", "/sign-in", StatusCode::OK, json!("T"));
        f.api.respond("GET", "/users", StatusCode::OK, profile_json());
        f.bridge.sign_in("ada@notus.events", "pw").await.unwrap();
        let before = f.bridge.cache().snapshot();

        f.api.respond(
            "POST",
            "/users/confirm",
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({"error": "key expired"}),
        );
        let result = f.bridge.confirm_user("stale-key", "pw").await;
        assert!(matches!(result, Ok(None)));

        let value = f
            .bridge
            .execute(Operation::confirm_user("stale-key", "pw").unwrap())
            .await
            .unwrap();
        assert_eq!(value, Value::Null);

        assert_eq!(f.bridge.cache().snapshot(), before);
        assert_eq!(f.bridge.jwt_token().as_deref(), Some("T"));
        assert_eq!(f.bridge.gateway().auth_header().as_deref(), Some("Bearer T"));
    }

    #[tokio::test]
    async fn confirm_user_argument_errors_still_propagate() {
        let f = fixture().await;
        let err = f.bridge.confirm_user("", "pw").await.unwrap_err();
        assert_eq!(err.to_string(), "oneTimeKey is not defined");
        let err = f.bridge.confirm_user("key", "").await.unwrap_err();
        assert_eq!(err.to_string(), "You must pass a password");
        assert!(f.api.requests().is_empty());
    }

    #[tokio::test]
    async fn client_only_reads() {
        let f = fixture().await;
        assert_eq!(f.bridge.execute(Operation::CurrentUser).await.unwrap(), Value::Null);
        assert_eq!(f.bridge.execute(Operation::JwtToken).await.unwrap(), Value::Null);

        f.bridge.authenticate(SessionToken::new("T").unwrap());
        assert_eq!(f.bridge.execute(Operation::JwtToken).await.unwrap(), json!("T"));
        assert!(f.api.requests().is_empty());
    }
}
