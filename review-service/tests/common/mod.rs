pub mod db;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::TokenConfig;
use auth::TokenIssuer;
use chrono::DateTime;
use chrono::Utc;
use review_service::authentication::errors::AuthError;
use review_service::authentication::errors::MailerError;
use review_service::authentication::models::ResetToken;
use review_service::authentication::ports::Mailer;
use review_service::authentication::ports::ResetTokenRepository;
use review_service::authentication::service::AuthenticationService;
use review_service::inbound::http::cookies::CookieSettings;
use review_service::inbound::http::router::create_router;
use review_service::user::errors::UserError;
use review_service::user::models::EmailAddress;
use review_service::user::models::Role;
use review_service::user::models::User;
use review_service::user::models::UserId;
use review_service::user::ports::UserRepository;
use review_service::user::service::UserService;
use serde_json::json;
use serde_json::Value;

pub const RESET_LINK_BASE: &str = "http://localhost/api/authentication/reset-password";

/// User storage backed by a map, enforcing the same uniqueness rules as
/// the database constraints.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    fn check_unique(users: &HashMap<UserId, User>, user: &User) -> Result<(), UserError> {
        for other in users.values().filter(|other| other.id != user.id) {
            if other.username == user.username {
                return Err(UserError::UsernameAlreadyExists(
                    user.username.as_str().to_string(),
                ));
            }
            if other.email == user.email {
                return Err(UserError::EmailAlreadyExists(user.email.as_str().to_string()));
            }
        }
        Ok(())
    }

    /// Grant the administrator role directly in storage.
    pub fn promote_to_admin(&self, id: &UserId) {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(id).expect("User to promote does not exist");
        user.role = Role::Admin;
    }

    pub fn password_hash(&self, id: &UserId) -> Option<String> {
        self.users
            .lock()
            .unwrap()
            .get(id)
            .map(|user| user.password_hash.clone())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();
        Self::check_unique(&users, &user)?;
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.lock().unwrap().get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|user| user.email.as_str() == email)
            .cloned())
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();
        Self::check_unique(&users, &user)?;
        let stored = users
            .get_mut(&user.id)
            .ok_or_else(|| UserError::NotFound(user.id.to_string()))?;
        stored.username = user.username;
        stored.email = user.email;
        stored.role = user.role;
        stored.permissions = user.permissions;
        Ok(stored.clone())
    }

    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<(), UserError> {
        let mut users = self.users.lock().unwrap();
        let stored = users
            .get_mut(id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;
        stored.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn set_refresh_token_hash(
        &self,
        id: &UserId,
        refresh_token_hash: Option<String>,
    ) -> Result<(), UserError> {
        if let Some(stored) = self.users.lock().unwrap().get_mut(id) {
            stored.refresh_token_hash = refresh_token_hash;
        }
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        self.users
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }
}

#[derive(Default)]
pub struct InMemoryResetTokenRepository {
    tokens: Mutex<HashMap<String, ResetToken>>,
}

impl InMemoryResetTokenRepository {
    pub fn len(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }
}

#[async_trait]
impl ResetTokenRepository for InMemoryResetTokenRepository {
    async fn create(&self, token: ResetToken) -> Result<(), AuthError> {
        self.tokens
            .lock()
            .unwrap()
            .insert(token.token.clone(), token);
        Ok(())
    }

    async fn consume(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ResetToken>, AuthError> {
        let mut tokens = self.tokens.lock().unwrap();
        let redeemable = tokens
            .get(token)
            .is_some_and(|stored| stored.is_redeemable_at(now));
        if redeemable {
            Ok(tokens.remove(token))
        } else {
            Ok(None)
        }
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let mut tokens = self.tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|_, stored| stored.is_redeemable_at(now));
        Ok((before - tokens.len()) as u64)
    }
}

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Mailer that keeps every message instead of delivering it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(
        &self,
        to: &EmailAddress,
        subject: &str,
        html_body: &str,
    ) -> Result<(), MailerError> {
        self.sent.lock().unwrap().push(SentMail {
            to: to.as_str().to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        });
        Ok(())
    }
}

/// Test application that spawns a real server over in-memory storage
pub struct TestApp {
    pub address: String,
    /// Client with a cookie store, acting like a browser
    pub api_client: reqwest::Client,
    /// Client without cookies, for Bearer requests and replayed cookies
    pub bare_client: reqwest::Client,
    pub users: Arc<InMemoryUserRepository>,
    pub reset_tokens: Arc<InMemoryResetTokenRepository>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let users = Arc::new(InMemoryUserRepository::default());
        let reset_tokens = Arc::new(InMemoryResetTokenRepository::default());
        let mailer = Arc::new(RecordingMailer::default());

        let issuer = Arc::new(
            TokenIssuer::new(&TokenConfig {
                access_secret: "test-access-secret-at-least-32-bytes-long".to_string(),
                access_ttl: chrono::Duration::seconds(900),
                refresh_secret: "test-refresh-secret-at-least-32-bytes-long".to_string(),
                refresh_ttl: chrono::Duration::seconds(604800),
            })
            .expect("Failed to create token issuer"),
        );

        let user_service = Arc::new(UserService::new(Arc::clone(&users)));
        let authentication_service = Arc::new(AuthenticationService::new(
            Arc::clone(&users),
            Arc::clone(&reset_tokens),
            Arc::clone(&mailer),
            issuer,
            RESET_LINK_BASE.to_string(),
        ));

        let router = create_router(
            authentication_service,
            user_service,
            CookieSettings { secure: false },
        );

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::builder()
                .cookie_store(true)
                .build()
                .expect("Failed to create reqwest client"),
            bare_client: reqwest::Client::new(),
            users,
            reset_tokens,
            mailer,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(self.url(path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(self.url(path))
    }

    /// Helper to make PUT request
    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.put(self.url(path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.bare_client.get(self.url(path)).bearer_auth(token)
    }

    /// Helper to make PUT request with Bearer token
    pub fn put_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.bare_client.put(self.url(path)).bearer_auth(token)
    }

    /// Helper to make PATCH request with Bearer token
    pub fn patch_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.bare_client.patch(self.url(path)).bearer_auth(token)
    }

    /// Helper to make DELETE request with Bearer token
    pub fn delete_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.bare_client.delete(self.url(path)).bearer_auth(token)
    }

    /// Register an account and return its id.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> UserId {
        let response = self
            .post("/api/authentication/register")
            .json(&json!({
                "username": username,
                "email": email,
                "password": password,
                "repeat_password": password
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: Value = response.json().await.expect("Failed to parse response");
        UserId::from_string(body["data"]["id"].as_str().unwrap()).unwrap()
    }

    /// Log in through the browser-like client, storing the session cookies.
    pub async fn log_in(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/authentication/log-in")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in without touching the cookie store and return the access token.
    pub async fn access_token(&self, email: &str, password: &str) -> String {
        let response = self
            .bare_client
            .post(self.url("/api/authentication/log-in"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: Value = response.json().await.expect("Failed to parse response");
        body["data"]["access_token"].as_str().unwrap().to_string()
    }

    /// Token from the most recent password reset mail.
    pub fn last_reset_token(&self) -> String {
        let mail = self
            .mailer
            .sent()
            .pop()
            .expect("No password reset mail was sent");
        let start = mail
            .html_body
            .find("token=")
            .expect("Reset mail carries no token")
            + "token=".len();
        mail.html_body[start..start + 64].to_string()
    }
}
