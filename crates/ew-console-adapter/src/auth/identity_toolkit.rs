/*
[INPUT]:  Service account key, API key and subject uid
[OUTPUT]: Bearer ID tokens and custom principal claim administration
[POS]:    Auth layer - identity toolkit exchange (custom token -> ID token)
[UPDATE]: When identity endpoints, claim handling or token lifetimes change
*/

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::claims::{CLEAR_CLAIMS, ClaimsAdmin, merge_claim};
use super::IdentityProvider;
use crate::http::{AdapterError, JsonClient, RawResponse, Result};

pub const DEFAULT_IDENTITY_BASE_URL: &str = "https://identitytoolkit.googleapis.com";
pub const DEFAULT_CUSTOM_TOKEN_AUDIENCE: &str =
    "https://identitytoolkit.googleapis.com/google.identity.identitytoolkit.v1.IdentityToolkit";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ADMIN_SCOPE: &str =
    "https://www.googleapis.com/auth/identitytoolkit https://www.googleapis.com/auth/cloud-platform";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const CUSTOM_TOKEN_TTL_SECONDS: i64 = 60 * 60;

/// Service account credentials used to sign custom tokens and admin assertions
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl ServiceAccountKey {
    /// Load a service account key from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AdapterError::Config(format!(
                "Failed to read service account key {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    fn token_uri(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI)
    }
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Identity toolkit settings
#[derive(Debug, Clone)]
pub struct IdentityToolkitConfig {
    pub api_key: String,
    pub subject_uid: String,
    pub base_url: String,
    pub custom_token_audience: String,
}

impl IdentityToolkitConfig {
    pub fn new(api_key: impl Into<String>, subject_uid: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            subject_uid: subject_uid.into(),
            base_url: DEFAULT_IDENTITY_BASE_URL.to_string(),
            custom_token_audience: DEFAULT_CUSTOM_TOKEN_AUDIENCE.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CustomTokenClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
    uid: &'a str,
}

#[derive(Debug, Serialize)]
struct AdminAssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    id_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
}

/// Identity provider that signs a custom token and exchanges it for an ID token
pub struct IdentityToolkitProvider {
    client: JsonClient,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    config: IdentityToolkitConfig,
}

impl IdentityToolkitProvider {
    pub fn new(key: ServiceAccountKey, config: IdentityToolkitConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(AdapterError::Config("identity API key is not set".to_string()));
        }
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
        let client = JsonClient::new(&config.base_url)?;
        Ok(Self {
            client,
            key,
            encoding_key,
            config,
        })
    }

    pub fn subject_uid(&self) -> &str {
        &self.config.subject_uid
    }

    /// Sign a custom token for `uid`
    pub fn create_custom_token(&self, uid: &str) -> Result<String> {
        let iat = Utc::now().timestamp();
        let claims = CustomTokenClaims {
            iss: &self.key.client_email,
            sub: &self.key.client_email,
            aud: &self.config.custom_token_audience,
            iat,
            exp: iat + CUSTOM_TOKEN_TTL_SECONDS,
            uid,
        };
        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// Exchange a custom token for an ID token for `uid`
    ///
    /// POST /v1/accounts:signInWithCustomToken?key={api_key}
    pub async fn sign_in(&self, uid: &str) -> Result<String> {
        let custom_token = self.create_custom_token(uid)?;
        let body = serde_json::json!({
            "token": custom_token,
            "returnSecureToken": true,
        });

        let builder = self
            .client
            .request(Method::POST, "/v1/accounts:signInWithCustomToken")?
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body);
        let raw = self
            .client
            .send_raw(builder)
            .await
            .map_err(|e| AdapterError::auth_exchange(e.to_string()))?;
        let response: SignInResponse = parse_identity_response(&raw)?;

        response
            .id_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AdapterError::auth_exchange("exchange response missing idToken"))
    }

    /// Read the custom claims currently set on `uid` (`{}` when none)
    ///
    /// POST /v1/projects/{project}/accounts:lookup
    async fn lookup_claims(&self, uid: &str) -> Result<Value> {
        let access_token = self.admin_access_token().await?;
        let body = serde_json::json!({ "localId": [uid] });
        let endpoint = format!("/v1/projects/{}/accounts:lookup", self.key.project_id);

        let builder = self
            .client
            .request(Method::POST, &endpoint)?
            .bearer_auth(&access_token)
            .json(&body);
        let raw = self.client.send_raw(builder).await?;
        let payload: Value = parse_identity_response(&raw)?;

        let user = payload
            .get("users")
            .and_then(Value::as_array)
            .and_then(|users| users.first())
            .ok_or_else(|| AdapterError::InvalidResponse(format!("user '{uid}' not found")))?;

        match user.get("customAttributes").and_then(Value::as_str) {
            Some(raw_claims) if !raw_claims.trim().is_empty() => {
                Ok(serde_json::from_str(raw_claims)?)
            }
            _ => Ok(Value::Object(Map::new())),
        }
    }

    /// POST /v1/projects/{project}/accounts:update
    async fn update_claims(&self, uid: &str, claims: &Value) -> Result<()> {
        let access_token = self.admin_access_token().await?;
        let body = serde_json::json!({
            "localId": uid,
            "customAttributes": claims.to_string(),
        });
        let endpoint = format!("/v1/projects/{}/accounts:update", self.key.project_id);

        let builder = self
            .client
            .request(Method::POST, &endpoint)?
            .bearer_auth(&access_token)
            .json(&body);
        let raw = self.client.send_raw(builder).await?;
        let _: Value = parse_identity_response(&raw)?;
        Ok(())
    }

    async fn admin_access_token(&self) -> Result<String> {
        let iat = Utc::now().timestamp();
        let token_uri = self.key.token_uri();
        let claims = AdminAssertionClaims {
            iss: &self.key.client_email,
            scope: ADMIN_SCOPE,
            aud: token_uri,
            iat,
            exp: iat + CUSTOM_TOKEN_TTL_SECONDS,
        };
        let assertion =
            jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)?;

        let builder = self
            .client
            .request_absolute(Method::POST, token_uri)?
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())]);
        let raw = self.client.send_raw(builder).await?;
        let response: AccessTokenResponse = parse_identity_response(&raw)?;
        debug!("admin access token issued");
        Ok(response.access_token)
    }
}

impl std::fmt::Debug for IdentityToolkitProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityToolkitProvider")
            .field("key", &self.key)
            .field("subject_uid", &self.config.subject_uid)
            .field("base_url", &self.client.base_url().as_str())
            .finish()
    }
}

#[async_trait]
impl ClaimsAdmin for IdentityToolkitProvider {
    async fn get_custom_claims(&self, uid: &str) -> Result<Value> {
        self.lookup_claims(uid).await
    }

    async fn set_custom_claim(&self, uid: &str, claim_key: &str, claim_value: &str) -> Result<Value> {
        let current = if claim_value == CLEAR_CLAIMS {
            Value::Null
        } else {
            self.lookup_claims(uid).await?
        };
        let updated = merge_claim(current, claim_key, claim_value);
        self.update_claims(uid, &updated).await?;

        info!(uid, claim_key, cleared = claim_value == CLEAR_CLAIMS, "custom claims updated");
        Ok(updated)
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkitProvider {
    async fn exchange(&self) -> Result<String> {
        self.sign_in(&self.config.subject_uid).await
    }
}

/// Map non-success responses to `AuthExchange` carrying the provider's message
fn parse_identity_response<T: serde::de::DeserializeOwned>(raw: &RawResponse) -> Result<T> {
    if !raw.status.is_success() {
        return Err(AdapterError::auth_exchange(provider_error_message(raw)));
    }
    serde_json::from_str(&raw.body)
        .map_err(|e| AdapterError::auth_exchange(format!("malformed provider response: {e}")))
}

fn provider_error_message(raw: &RawResponse) -> String {
    let parsed: Option<Value> = serde_json::from_str(&raw.body).ok();
    let message = parsed.as_ref().and_then(|body| {
        body.pointer("/error/message")
            .and_then(Value::as_str)
            .or_else(|| body.get("error_description").and_then(Value::as_str))
            .or_else(|| body.get("error").and_then(Value::as_str))
    });
    match message {
        Some(message) => format!("Error: {message}"),
        None => format!("HTTP {}: {}", raw.status.as_u16(), raw.body.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use reqwest::StatusCode;

    const FIXTURE_KEY: &str = include_str!("../../tests/fixtures/service-account.json");

    fn test_provider() -> IdentityToolkitProvider {
        let key = ServiceAccountKey::from_json(FIXTURE_KEY).unwrap();
        IdentityToolkitProvider::new(key, IdentityToolkitConfig::new("api-key", "uid-1")).unwrap()
    }

    #[test]
    fn test_custom_token_carries_uid_and_audience() {
        let provider = test_provider();
        let token = provider.create_custom_token("uid-42").unwrap();

        let mut validation = jsonwebtoken::Validation::new(Algorithm::RS256);
        validation.insecure_disable_signature_validation();
        validation.set_audience(&[DEFAULT_CUSTOM_TOKEN_AUDIENCE]);
        let data = jsonwebtoken::decode::<Value>(
            &token,
            &jsonwebtoken::DecodingKey::from_secret(b"unused"),
            &validation,
        )
        .unwrap();

        assert_eq!(data.claims["uid"], "uid-42");
        assert_eq!(
            data.claims["iss"],
            "console-test@ew-console-test.iam.gserviceaccount.com"
        );
        let lifetime = data.claims["exp"].as_i64().unwrap() - data.claims["iat"].as_i64().unwrap();
        assert_eq!(lifetime, CUSTOM_TOKEN_TTL_SECONDS);
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let key = ServiceAccountKey::from_json(FIXTURE_KEY).unwrap();
        let err = IdentityToolkitProvider::new(key, IdentityToolkitConfig::new(" ", "uid")).unwrap_err();
        assert!(matches!(err, AdapterError::Config(_)));
    }

    #[test]
    fn test_provider_error_message_prefers_error_message() {
        let raw = RawResponse {
            status: StatusCode::BAD_REQUEST,
            body: r#"{"error":{"code":400,"message":"INVALID_CUSTOM_TOKEN"}}"#.to_string(),
        };
        assert_eq!(provider_error_message(&raw), "Error: INVALID_CUSTOM_TOKEN");

        let raw = RawResponse {
            status: StatusCode::BAD_GATEWAY,
            body: "upstream".to_string(),
        };
        assert_eq!(provider_error_message(&raw), "HTTP 502: upstream");
    }

    #[test]
    fn test_service_account_debug_redacts_key() {
        let key = ServiceAccountKey::from_json(FIXTURE_KEY).unwrap();
        let rendered = format!("{key:?}");
        assert!(!rendered.contains("BEGIN PRIVATE KEY"));
    }
}
