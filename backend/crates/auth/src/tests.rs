//! Unit tests for Auth crate
//! Use cases run against the in-memory store; routers are driven with `oneshot`.

#[cfg(test)]
mod support {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use crate::application::config::AuthConfig;
    use crate::application::register::RegisterInput;
    use crate::infra::memory::InMemoryUserStore;

    pub const PASSWORD: &str = "secret123";

    pub fn setup() -> (Arc<InMemoryUserStore>, Arc<AuthConfig>) {
        (
            Arc::new(InMemoryUserStore::new()),
            Arc::new(AuthConfig::with_random_secret()),
        )
    }

    pub fn register_input(email: &str) -> RegisterInput {
        RegisterInput {
            email: email.to_string(),
            password: PASSWORD.to_string(),
            inn: "7707083893".to_string(),
            phone: "+7 999 000-00-00".to_string(),
            first_name: "Ivan".to_string(),
            last_name: "Petrov".to_string(),
            middle_name: Some("   ".to_string()),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
        }
    }
}

#[cfg(test)]
mod config_tests {
    use crate::application::config::*;
    use std::time::Duration;

    #[test]
    fn test_default_config() {
        let config = AuthConfig::default();

        assert_eq!(config.token_ttl, Duration::from_secs(3600));
        assert_eq!(config.token_ttl_secs(), 3600);
        assert!(config.pepper().is_none());
    }

    #[test]
    fn test_with_random_secret() {
        let config1 = AuthConfig::with_random_secret();
        let config2 = AuthConfig::with_random_secret();

        assert_ne!(config1.token_secret, config2.token_secret);
        assert!(config1.token_secret.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_development_config() {
        let config = AuthConfig::development();

        assert_eq!(config.token_ttl, Duration::from_secs(24 * 3600));
        assert!(config.token_secret.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = AuthConfig {
            password_pepper: Some(b"pepper".to_vec()),
            ..AuthConfig::with_random_secret()
        };

        let debug = format!("{:?}", config);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains(&format!("{:?}", config.token_secret)));
    }
}

#[cfg(test)]
mod models_tests {
    use crate::domain::value_object::user_role::UserRole;
    use crate::presentation::dto::*;

    #[test]
    fn test_token_response_serialization() {
        let response = TokenResponse {
            access_token: "a.b.c".to_string(),
            token_type: "bearer",
            expires_in: 3600,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""access_token":"a.b.c""#));
        assert!(json.contains(r#""token_type":"bearer""#));
        assert!(json.contains(r#""expires_in":3600"#));
    }

    #[test]
    fn test_register_request_without_middle_name() {
        let json = r#"{
            "email": "user@example.com",
            "password": "secret123",
            "inn": "7707083893",
            "phone": "+79990000000",
            "first_name": "Ivan",
            "last_name": "Petrov",
            "birth_date": "1990-05-17"
        }"#;
        let request: RegisterRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.email, "user@example.com");
        assert!(request.middle_name.is_none());
        assert_eq!(request.birth_date.to_string(), "1990-05-17");
    }

    #[test]
    fn test_users_page_query_defaults() {
        let query: UsersPageQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.size, 20);
    }

    #[test]
    fn test_user_short_role_code() {
        let short = UserShort {
            id: "id".to_string(),
            email: "staff@example.com".to_string(),
            role: UserRole::Staff,
        };

        let json = serde_json::to_string(&short).unwrap();
        assert!(json.contains(r#""role":"STAFF""#));
    }
}

#[cfg(test)]
mod register_tests {
    use super::support::*;
    use crate::application::register::RegisterUseCase;
    use crate::domain::repository::{UserField, UserRepository};
    use crate::domain::value_object::user_role::UserRole;
    use crate::error::AuthError;
    use kernel::query::Filter;

    #[tokio::test]
    async fn test_register_creates_user_and_profile() {
        let (store, config) = setup();
        let use_case = RegisterUseCase::new(store.clone(), config);

        let output = use_case
            .execute(register_input("  citizen@example.com "))
            .await
            .unwrap();

        assert_eq!(output.role, UserRole::User);
        assert_eq!(output.email.as_str(), "citizen@example.com");

        let user = store.get_by_id(&output.user_id).await.unwrap().unwrap();
        assert_eq!(user.role, UserRole::User);

        let profile = store.get_profile(&output.user_id).await.unwrap().unwrap();
        assert_eq!(profile.user_id, output.user_id);
        assert_eq!(profile.details.first_name, "Ivan");
        assert!(profile.details.middle_name.is_none());
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let (store, config) = setup();
        let use_case = RegisterUseCase::new(store.clone(), config);

        use_case
            .execute(register_input("citizen@example.com"))
            .await
            .unwrap();
        let err = use_case
            .execute(register_input("citizen@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::DuplicateEmail));
        let count = store
            .count(Filter::new().eq(UserField::Email, "citizen@example.com"))
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_register_store_rejects_duplicate_insert() {
        let (store, config) = setup();
        let use_case = RegisterUseCase::new(store.clone(), config.clone());
        let output = use_case
            .execute(register_input("citizen@example.com"))
            .await
            .unwrap();

        // Bypass the pre-check: the store itself must refuse
        let existing = store.get_by_id(&output.user_id).await.unwrap().unwrap();
        let twin = crate::domain::entity::user::User::new(
            existing.email.clone(),
            existing.password_hash.clone(),
            UserRole::User,
        );
        let err = store.create(&twin).await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateEmail));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let (store, config) = setup();
        let use_case = RegisterUseCase::new(store.clone(), config);

        let mut input = register_input("citizen@example.com");
        input.password = "short".to_string();
        let err = use_case.execute(input).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));

        let mut input = register_input("citizen@example.com");
        input.inn = "   ".to_string();
        let err = use_case.execute(input).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));

        let input = register_input("not-an-email");
        let err = use_case.execute(input).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));

        assert_eq!(store.count(Filter::new()).await.unwrap(), 0);
    }
}

#[cfg(test)]
mod login_tests {
    use super::support::*;
    use crate::application::login::{LoginInput, LoginUseCase, TOKEN_TYPE};
    use crate::application::register::RegisterUseCase;
    use crate::error::AuthError;
    use chrono::Utc;

    #[tokio::test]
    async fn test_login_issues_token_for_subject() {
        let (store, config) = setup();
        let registered = RegisterUseCase::new(store.clone(), config.clone())
            .execute(register_input("citizen@example.com"))
            .await
            .unwrap();

        let output = LoginUseCase::new(store, config.clone())
            .execute(LoginInput {
                email: "citizen@example.com".to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .unwrap();

        assert_eq!(output.token_type, TOKEN_TYPE);
        assert_eq!(output.expires_in, config.token_ttl_secs());

        let claims = config
            .signer()
            .verify(&output.access_token, Utc::now().timestamp())
            .unwrap();
        assert_eq!(claims.sub, registered.user_id.to_string());
        assert_eq!(claims.role, "USER");
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (store, config) = setup();
        RegisterUseCase::new(store.clone(), config.clone())
            .execute(register_input("citizen@example.com"))
            .await
            .unwrap();
        let use_case = LoginUseCase::new(store, config);

        let wrong_password = use_case
            .execute(LoginInput {
                email: "citizen@example.com".to_string(),
                password: "wrong-password".to_string(),
            })
            .await
            .unwrap_err();
        let unknown_email = use_case
            .execute(LoginInput {
                email: "nobody@example.com".to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .unwrap_err();
        let policy_violation = use_case
            .execute(LoginInput {
                email: "citizen@example.com".to_string(),
                password: "x".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_email, AuthError::InvalidCredentials));
        assert!(matches!(policy_violation, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }
}

#[cfg(test)]
mod access_tests {
    use super::support::*;
    use crate::application::access::AccessControl;
    use crate::application::admin::AdminUseCase;
    use crate::application::config::AuthConfig;
    use crate::application::login::{LoginInput, LoginUseCase};
    use crate::application::register::RegisterUseCase;
    use crate::domain::value_object::user_role::UserRole;
    use crate::error::AuthError;
    use chrono::Utc;
    use kernel::id::UserId;
    use platform::token::{TokenClaims, TokenSigner};
    use std::sync::Arc;

    async fn user_token(
        store: &Arc<crate::infra::memory::InMemoryUserStore>,
        config: &Arc<AuthConfig>,
    ) -> (UserId, String) {
        let registered = RegisterUseCase::new(store.clone(), config.clone())
            .execute(register_input("citizen@example.com"))
            .await
            .unwrap();
        let login = LoginUseCase::new(store.clone(), config.clone())
            .execute(LoginInput {
                email: "citizen@example.com".to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .unwrap();
        (registered.user_id, login.access_token)
    }

    #[tokio::test]
    async fn test_authenticate_resolves_principal() {
        let (store, config) = setup();
        let (user_id, token) = user_token(&store, &config).await;

        let principal = AccessControl::new(store, config)
            .authenticate(&token)
            .await
            .unwrap();

        assert_eq!(principal.user_id, user_id);
        assert_eq!(principal.role, UserRole::User);
    }

    #[tokio::test]
    async fn test_rejected_tokens_are_unauthorized() {
        let (store, config) = setup();
        let (user_id, token) = user_token(&store, &config).await;
        let access = AccessControl::new(store, config.clone());
        let now = Utc::now().timestamp();

        let foreign = TokenSigner::new(b"another-secret".to_vec())
            .sign(&TokenClaims::new(user_id.to_string(), "USER", now, 600))
            .unwrap();
        let expired = config
            .signer()
            .sign(&TokenClaims::new(user_id.to_string(), "USER", now - 7200, 3600))
            .unwrap();
        let orphan = config
            .signer()
            .sign(&TokenClaims::new(UserId::new().to_string(), "USER", now, 600))
            .unwrap();
        let bad_subject = config
            .signer()
            .sign(&TokenClaims::new("not-a-uuid", "USER", now, 600))
            .unwrap();
        let bad_role = config
            .signer()
            .sign(&TokenClaims::new(user_id.to_string(), "ROOT", now, 600))
            .unwrap();

        let swapped = config
            .signer()
            .sign(&TokenClaims::new(user_id.to_string(), "ADMIN", now, 600))
            .unwrap();
        let forged_payload = swapped.split('.').nth(1).unwrap().to_string();
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = &forged_payload;
        let tampered = parts.join(".");

        for token in [
            foreign,
            expired,
            orphan,
            bad_subject,
            bad_role,
            tampered,
            "garbage".to_string(),
        ] {
            let err = access.authenticate(&token).await.unwrap_err();
            assert!(matches!(err, AuthError::Unauthorized), "token {token}");
        }
    }

    #[tokio::test]
    async fn test_authorize_checks_role() {
        let (store, config) = setup();
        let (_, token) = user_token(&store, &config).await;
        let access = AccessControl::new(store, config);

        assert!(access.authorize(&token, &[UserRole::User]).await.is_ok());

        let err = access
            .authorize(&token, &[UserRole::Staff, UserRole::Admin])
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Forbidden));
    }

    #[tokio::test]
    async fn test_promotion_applies_after_next_login() {
        let (store, config) = setup();
        let (user_id, token) = user_token(&store, &config).await;

        AdminUseCase::new(store.clone(), config.clone())
            .promote_to_staff(&user_id)
            .await
            .unwrap();

        let access = AccessControl::new(store.clone(), config.clone());

        // The earlier token still carries USER
        let err = access
            .authorize(&token, &[UserRole::Staff])
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Forbidden));
        assert_eq!(
            access.authenticate(&token).await.unwrap().role,
            UserRole::User
        );

        let fresh = LoginUseCase::new(store, config)
            .execute(LoginInput {
                email: "citizen@example.com".to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .unwrap();
        let principal = access
            .authorize(&fresh.access_token, &[UserRole::Staff])
            .await
            .unwrap();
        assert_eq!(principal.user_id, user_id);
        assert_eq!(principal.role, UserRole::Staff);
    }
}

#[cfg(test)]
mod admin_tests {
    use super::support::*;
    use crate::application::admin::AdminUseCase;
    use crate::application::register::RegisterUseCase;
    use crate::domain::repository::UserRepository;
    use crate::domain::value_object::user_role::UserRole;
    use crate::error::AuthError;
    use kernel::id::UserId;

    #[tokio::test]
    async fn test_create_and_list_staff() {
        let (store, config) = setup();
        let admin = AdminUseCase::new(store.clone(), config.clone());

        let first = admin
            .create_staff("first@example.com".to_string(), PASSWORD.to_string())
            .await
            .unwrap();
        let second = admin
            .create_staff("second@example.com".to_string(), PASSWORD.to_string())
            .await
            .unwrap();
        admin
            .create_admin("root@example.com".to_string(), PASSWORD.to_string())
            .await
            .unwrap();

        assert_eq!(first.role, UserRole::Staff);

        let staff = admin.list_staff().await.unwrap();
        let ids: Vec<UserId> = staff.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert!(store.get_profile(&first.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_staff_duplicate_email() {
        let (store, config) = setup();
        RegisterUseCase::new(store.clone(), config.clone())
            .execute(register_input("taken@example.com"))
            .await
            .unwrap();

        let err = AdminUseCase::new(store, config)
            .create_staff("taken@example.com".to_string(), PASSWORD.to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateEmail));
    }

    #[tokio::test]
    async fn test_list_users_paginated() {
        let (store, config) = setup();
        let register = RegisterUseCase::new(store.clone(), config.clone());
        for i in 0..3 {
            register
                .execute(register_input(&format!("user{i}@example.com")))
                .await
                .unwrap();
        }
        let admin = AdminUseCase::new(store, config);
        admin
            .create_staff("staff@example.com".to_string(), PASSWORD.to_string())
            .await
            .unwrap();

        let page = admin.list_users_paginated(1, 2).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].email.as_str(), "user0@example.com");

        let page = admin.list_users_paginated(2, 2).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].email.as_str(), "user2@example.com");

        let page = admin.list_users_paginated(3, 2).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn test_list_users_paginated_bounds() {
        let (store, config) = setup();
        let admin = AdminUseCase::new(store, config);

        for (page, size) in [(0, 10), (1, 0), (1, 101), (-1, 10)] {
            let err = admin.list_users_paginated(page, size).await.unwrap_err();
            assert!(matches!(err, AuthError::Validation(_)), "{page}/{size}");
        }
        assert!(admin.list_users_paginated(1, 100).await.is_ok());
    }

    #[tokio::test]
    async fn test_promote_to_staff() {
        let (store, config) = setup();
        let registered = RegisterUseCase::new(store.clone(), config.clone())
            .execute(register_input("citizen@example.com"))
            .await
            .unwrap();
        let admin = AdminUseCase::new(store, config);

        let promoted = admin.promote_to_staff(&registered.user_id).await.unwrap();
        assert_eq!(promoted.role, UserRole::Staff);

        let again = admin.promote_to_staff(&registered.user_id).await.unwrap_err();
        assert!(matches!(again, AuthError::Validation(_)));

        let missing = admin.promote_to_staff(&UserId::new()).await.unwrap_err();
        assert!(matches!(missing, AuthError::UserNotFound));
    }
}

#[cfg(test)]
mod router_tests {
    use super::support::*;
    use crate::application::admin::AdminUseCase;
    use crate::presentation::router::{admin_router, auth_router};
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    fn app() -> (
        Router,
        std::sync::Arc<crate::infra::memory::InMemoryUserStore>,
        std::sync::Arc<crate::application::config::AuthConfig>,
    ) {
        let (store, config) = setup();
        let router = Router::new()
            .nest("/auth", auth_router(store.clone(), config.clone()))
            .nest("/admin", admin_router(store.clone(), config.clone()));
        (router, store, config)
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_with_token(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn login(router: &Router, email: &str) -> String {
        let response = router
            .clone()
            .oneshot(post_json(
                "/auth/login",
                serde_json::json!({ "email": email, "password": PASSWORD }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        json_body(response).await["access_token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_register_and_login_over_http() {
        let (router, _, _) = app();

        let response = router
            .clone()
            .oneshot(post_json(
                "/auth/register",
                serde_json::json!({
                    "email": "citizen@example.com",
                    "password": PASSWORD,
                    "inn": "7707083893",
                    "phone": "+79990000000",
                    "first_name": "Ivan",
                    "last_name": "Petrov",
                    "birth_date": "1990-05-17"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["email"], "citizen@example.com");
        assert_eq!(body["role"], "USER");

        let token = login(&router, "citizen@example.com").await;
        assert_eq!(token.split('.').count(), 3);
    }

    #[tokio::test]
    async fn test_login_failure_is_problem_json() {
        let (router, _, _) = app();

        let response = router
            .oneshot(post_json(
                "/auth/login",
                serde_json::json!({ "email": "nobody@example.com", "password": PASSWORD }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["status"], 401);
    }

    #[tokio::test]
    async fn test_admin_routes_are_guarded() {
        let (router, store, config) = app();
        let admin = AdminUseCase::new(store.clone(), config.clone());
        admin
            .create_admin("root@example.com".to_string(), PASSWORD.to_string())
            .await
            .unwrap();
        admin
            .create_staff("staff@example.com".to_string(), PASSWORD.to_string())
            .await
            .unwrap();

        let anonymous = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/admin/staff")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let staff_token = login(&router, "staff@example.com").await;
        let forbidden = router
            .clone()
            .oneshot(get_with_token("/admin/staff", &staff_token))
            .await
            .unwrap();
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

        let admin_token = login(&router, "root@example.com").await;
        let allowed = router
            .clone()
            .oneshot(get_with_token("/admin/staff", &admin_token))
            .await
            .unwrap();
        assert_eq!(allowed.status(), StatusCode::OK);
        let body = json_body(allowed).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["email"], "staff@example.com");

        let page = router
            .oneshot(get_with_token("/admin/users?page=1&size=5", &admin_token))
            .await
            .unwrap();
        assert_eq!(page.status(), StatusCode::OK);
        let body = json_body(page).await;
        assert_eq!(body["total"], 0);
        assert_eq!(body["size"], 5);
    }

    #[tokio::test]
    async fn test_promote_with_malformed_id_is_not_found() {
        let (router, store, config) = app();
        AdminUseCase::new(store, config)
            .create_admin("root@example.com".to_string(), PASSWORD.to_string())
            .await
            .unwrap();
        let token = login(&router, "root@example.com").await;

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/admin/staff/not-a-uuid/promote")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

#[cfg(test)]
mod error_tests {
    use crate::error::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use kernel::error::app_error::AppError;

    #[test]
    fn test_error_into_response_status_codes() {
        let test_cases: Vec<(AuthError, StatusCode)> = vec![
            (AuthError::Unauthorized, StatusCode::UNAUTHORIZED),
            (AuthError::Forbidden, StatusCode::FORBIDDEN),
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::DuplicateEmail, StatusCode::CONFLICT),
            (AuthError::UserNotFound, StatusCode::NOT_FOUND),
            (
                AuthError::Validation("bad".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                AuthError::Database(sqlx::Error::RowNotFound),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AuthError::Internal("test".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected_status) in test_cases {
            assert_eq!(error.status_code(), expected_status);
            let response = error.into_response();
            assert_eq!(
                response.status(),
                expected_status,
                "Error should return correct status code"
            );
        }
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let app_error = AuthError::Internal("connection string leaked".into()).to_app_error();
        assert!(!app_error.message().contains("leaked"));
    }

    #[test]
    fn test_from_app_error() {
        let err: AuthError = AppError::bad_request("Invalid email format").into();
        assert!(matches!(err, AuthError::Validation(ref m) if m == "Invalid email format"));

        let err: AuthError = AppError::internal("boom").into();
        assert!(matches!(err, AuthError::Internal(_)));
    }
}
