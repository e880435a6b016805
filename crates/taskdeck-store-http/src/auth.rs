//! Login and registration against `{base}/api/auth`.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{check, HttpStoreError};

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 6;

/// Username and password sent to `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    /// Account name.
    pub username: String,
    /// Plain password; only ever sent over the wire.
    pub password: String,
}

/// New account sent to `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    /// Account name, at least three characters.
    pub username: String,
    /// Contact address.
    pub email: String,
    /// Password, at least six characters.
    pub password: String,
}

impl Registration {
    /// Check the form the way the service expects it before sending.
    ///
    /// # Errors
    /// Returns [`HttpStoreError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), HttpStoreError> {
        if self.username.trim().chars().count() < MIN_USERNAME_LEN {
            return Err(HttpStoreError::Invalid(format!(
                "username must be at least {MIN_USERNAME_LEN} characters"
            )));
        }
        let email = self.email.trim();
        let well_formed = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !well_formed {
            return Err(HttpStoreError::Invalid(format!("'{email}' is not an email address")));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(HttpStoreError::Invalid(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(())
    }
}

/// Account returned by the registration endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    /// Server-assigned id, when the service reports one.
    #[serde(default)]
    pub id: Option<i64>,
    /// Account name.
    pub username: String,
    /// Contact address.
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

/// Client for the authentication endpoints.
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: Client,
    base_url: String,
}

impl AuthClient {
    /// Client talking to `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Client reusing an existing HTTP client.
    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    /// [`HttpStoreError::Invalid`] for blank fields, otherwise transport or status errors.
    pub async fn login(&self, credentials: &Credentials) -> Result<String, HttpStoreError> {
        if credentials.username.trim().is_empty() || credentials.password.is_empty() {
            return Err(HttpStoreError::Invalid("username and password are required".into()));
        }
        let response = self
            .client
            .post(format!("{}/api/auth/login", self.base_url))
            .json(credentials)
            .send()
            .await?;
        let body: TokenResponse = check(response).await?.json().await?;
        info!(username = %credentials.username, "Logged in");
        Ok(body.token)
    }

    /// Create an account.
    ///
    /// # Errors
    /// [`HttpStoreError::Invalid`] when [`Registration::validate`] fails, otherwise
    /// transport or status errors.
    pub async fn register(&self, registration: &Registration) -> Result<User, HttpStoreError> {
        registration.validate()?;
        let response = self
            .client
            .post(format!("{}/api/auth/register", self.base_url))
            .json(registration)
            .send()
            .await?;
        let user: User = check(response).await?.json().await?;
        info!(username = %user.username, "Registered account");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn registration(username: &str, email: &str, password: &str) -> Registration {
        Registration {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn registration_rules() {
        assert!(registration("ann", "ann@example.com", "secret").validate().is_ok());
        assert!(registration("an", "ann@example.com", "secret").validate().is_err());
        assert!(registration("ann", "ann.example.com", "secret").validate().is_err());
        assert!(registration("ann", "@example.com", "secret").validate().is_err());
        assert!(registration("ann", "ann@example.com", "12345").validate().is_err());
    }

    #[tokio::test]
    async fn login_returns_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({ "username": "ann", "password": "secret" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "jwt-123" })))
            .mount(&server)
            .await;

        let client = AuthClient::new(server.uri());
        let token = client
            .login(&Credentials {
                username: "ann".into(),
                password: "secret".into(),
            })
            .await
            .unwrap_or_else(|err| panic!("login failed: {err}"));
        assert_eq!(token, "jwt-123");
    }

    #[tokio::test]
    async fn rejected_login_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
            .mount(&server)
            .await;

        let client = AuthClient::new(server.uri());
        let Err(err) = client
            .login(&Credentials {
                username: "ann".into(),
                password: "wrong".into(),
            })
            .await
        else {
            panic!("login should fail");
        };
        assert_eq!(err.status(), Some(401));
        assert!(err.to_string().contains("Bad credentials"));
    }

    #[tokio::test]
    async fn register_validates_before_sending() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/register"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 12,
                "username": "ann",
                "email": "ann@example.com"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = AuthClient::new(server.uri());
        let Err(HttpStoreError::Invalid(_)) = client.register(&registration("a", "x", "y")).await else {
            panic!("invalid registration should not be sent");
        };
        let user = client
            .register(&registration("ann", "ann@example.com", "secret"))
            .await
            .unwrap_or_else(|err| panic!("register failed: {err}"));
        assert_eq!(user.id, Some(12));
        assert_eq!(user.username, "ann");
    }
}
