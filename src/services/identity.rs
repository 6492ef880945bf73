use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::Caller;

/// Errors that can occur while verifying a caller's identity
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Unsupported algorithm: {0:?}")]
    UnsupportedAlgorithm(Algorithm),

    #[error("Key set error: {0}")]
    KeySet(#[from] JwksError),

    #[error("Identity verification is not configured: {0}")]
    Misconfigured(String),
}

impl IdentityError {
    /// True when the caller presented something unusable, as opposed to the
    /// identity provider being unreachable or misconfigured
    pub fn is_rejection(&self) -> bool {
        match self {
            IdentityError::MissingToken
            | IdentityError::InvalidToken(_)
            | IdentityError::UnsupportedAlgorithm(_) => true,
            IdentityError::KeySet(JwksError::KeyNotFound(_)) => true,
            IdentityError::KeySet(_) | IdentityError::Misconfigured(_) => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum JwksError {
    #[error("Failed to fetch JWKS: {0}")]
    FetchError(String),

    #[error("Failed to parse JWKS: {0}")]
    ParseError(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Failed to convert key: {0}")]
    KeyConversionError(String),
}

#[derive(Debug, Clone, Deserialize)]
struct JwksResponse {
    keys: Vec<Jwk>,
}

#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
}

/// Unknown key ids never trigger more than one fetch per this interval
const MIN_REFETCH_INTERVAL: Duration = Duration::from_secs(30);

struct JwksCache {
    keys: HashMap<String, DecodingKey>,
    last_fetched: Instant,
}

/// Fetches and caches the identity provider's RSA signing keys
pub struct JwksClient {
    jwks_url: String,
    client: reqwest::Client,
    cache: Arc<RwLock<Option<JwksCache>>>,
    cache_ttl: Duration,
    min_refetch: Duration,
}

impl JwksClient {
    pub fn new(jwks_url: &str, cache_ttl: Duration) -> Self {
        Self {
            jwks_url: jwks_url.to_string(),
            client: reqwest::Client::new(),
            cache: Arc::new(RwLock::new(None)),
            cache_ttl,
            min_refetch: MIN_REFETCH_INTERVAL.min(cache_ttl),
        }
    }

    pub async fn get_key(&self, kid: &str) -> Result<DecodingKey, JwksError> {
        {
            let cache = self.cache.read().await;
            if let Some(ref cached) = *cache {
                let age = cached.last_fetched.elapsed();
                if age < self.cache_ttl {
                    if let Some(key) = cached.keys.get(kid) {
                        return Ok(key.clone());
                    }
                }
                if age < self.min_refetch {
                    return Err(JwksError::KeyNotFound(kid.to_string()));
                }
            }
        }

        // Unknown kid or stale set: the provider may have rotated keys
        self.fetch_jwks().await?;

        let cache = self.cache.read().await;
        cache
            .as_ref()
            .and_then(|cached| cached.keys.get(kid).cloned())
            .ok_or_else(|| JwksError::KeyNotFound(kid.to_string()))
    }

    async fn fetch_jwks(&self) -> Result<(), JwksError> {
        tracing::debug!("Fetching JWKS from {}", self.jwks_url);

        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| JwksError::FetchError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(JwksError::FetchError(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let jwks: JwksResponse = response
            .json()
            .await
            .map_err(|e| JwksError::ParseError(e.to_string()))?;

        let mut keys = HashMap::new();
        for jwk in jwks.keys {
            if let ("RSA", Some(n), Some(e)) = (jwk.kty.as_str(), &jwk.n, &jwk.e) {
                let decoding_key = DecodingKey::from_rsa_components(n, e)
                    .map_err(|e| JwksError::KeyConversionError(e.to_string()))?;
                keys.insert(jwk.kid, decoding_key);
            }
        }

        let mut cache = self.cache.write().await;
        *cache = Some(JwksCache {
            keys,
            last_fetched: Instant::now(),
        });

        Ok(())
    }
}

enum KeySource {
    Jwks(JwksClient),
    Shared(DecodingKey),
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
}

/// Turns a bearer token into a [`Caller`]
///
/// Signature, expiry and the optional issuer/audience are checked by
/// `jsonwebtoken`. Admin status comes from a configured allow-list of user ids.
pub struct IdentityVerifier {
    source: KeySource,
    issuer: Option<String>,
    audience: Option<String>,
    admin_user_ids: HashSet<String>,
    leeway: u64,
}

impl IdentityVerifier {
    /// Verify RS256 tokens against a JWKS endpoint
    pub fn with_jwks(
        jwks_url: &str,
        cache_ttl: Duration,
        admin_user_ids: impl IntoIterator<Item = String>,
    ) -> Self {
        Self::build(
            KeySource::Jwks(JwksClient::new(jwks_url, cache_ttl)),
            admin_user_ids,
        )
    }

    /// Verify HS256 tokens signed with a shared secret
    pub fn with_shared_secret(
        secret: &[u8],
        admin_user_ids: impl IntoIterator<Item = String>,
    ) -> Self {
        Self::build(
            KeySource::Shared(DecodingKey::from_secret(secret)),
            admin_user_ids,
        )
    }

    fn build(source: KeySource, admin_user_ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            source,
            issuer: None,
            audience: None,
            admin_user_ids: admin_user_ids.into_iter().collect(),
            leeway: 60,
        }
    }

    pub fn with_issuer(mut self, issuer: Option<String>) -> Self {
        self.issuer = issuer;
        self
    }

    pub fn with_audience(mut self, audience: Option<String>) -> Self {
        self.audience = audience;
        self
    }

    /// Build from settings, preferring JWKS when both modes are configured
    pub fn from_settings(settings: &crate::config::AuthSettings) -> Result<Self, IdentityError> {
        let admins = settings.admin_user_ids.clone();

        let verifier = match (&settings.jwks_url, &settings.hs256_secret) {
            (Some(url), _) if !url.is_empty() => Self::with_jwks(
                url,
                Duration::from_secs(settings.jwks_cache_ttl_secs.unwrap_or(3600)),
                admins,
            ),
            (_, Some(secret)) if !secret.is_empty() => {
                Self::with_shared_secret(secret.as_bytes(), admins)
            }
            _ => {
                return Err(IdentityError::Misconfigured(
                    "set auth.jwks_url or auth.hs256_secret".to_string(),
                ))
            }
        };

        Ok(verifier
            .with_issuer(settings.issuer.clone())
            .with_audience(settings.audience.clone()))
    }

    /// Verify a raw token
    pub async fn verify(&self, token: &str) -> Result<Caller, IdentityError> {
        let header =
            decode_header(token).map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

        let (key, algorithm) = match &self.source {
            KeySource::Jwks(client) => {
                let kid = header
                    .kid
                    .ok_or_else(|| IdentityError::InvalidToken("missing kid".to_string()))?;
                let key = client.get_key(&kid).await?;
                (key, Algorithm::RS256)
            }
            KeySource::Shared(key) => (key.clone(), Algorithm::HS256),
        };

        if header.alg != algorithm {
            return Err(IdentityError::UnsupportedAlgorithm(header.alg));
        }

        let mut validation = Validation::new(algorithm);
        validation.leeway = self.leeway;
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
            validation.required_spec_claims.insert("iss".to_string());
        }
        match &self.audience {
            Some(audience) => {
                validation.set_audience(&[audience]);
                validation.required_spec_claims.insert("aud".to_string());
            }
            None => validation.validate_aud = false,
        }

        let data = decode::<Claims>(token, &key, &validation)
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

        let user_id = data.claims.sub;
        if user_id.is_empty() {
            return Err(IdentityError::InvalidToken("empty subject".to_string()));
        }

        Ok(Caller {
            is_admin: self.admin_user_ids.contains(&user_id),
            user_id,
        })
    }

    /// Verify the value of an `Authorization` header
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<Caller, IdentityError> {
        let token = authorization
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(IdentityError::MissingToken)?;

        self.verify(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    const SECRET: &[u8] = b"test-secret";

    #[derive(Serialize)]
    struct TestClaims<'a> {
        sub: &'a str,
        exp: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        iss: Option<&'a str>,
    }

    fn token_with(header: Header, sub: &str, exp_offset: i64) -> String {
        let exp = (chrono::Utc::now().timestamp() + exp_offset) as usize;
        encode(
            &header,
            &TestClaims { sub, exp, iss: None },
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap()
    }

    fn token(sub: &str) -> String {
        token_with(Header::default(), sub, 3600)
    }

    #[tokio::test]
    async fn test_shared_secret_caller() {
        let verifier = IdentityVerifier::with_shared_secret(SECRET, vec!["admin_1".to_string()]);

        let caller = verifier.verify(&token("user_1")).await.unwrap();
        assert_eq!(caller.user_id, "user_1");
        assert!(!caller.is_admin);

        let admin = verifier.verify(&token("admin_1")).await.unwrap();
        assert!(admin.is_admin);
    }

    #[tokio::test]
    async fn test_rejects_bad_tokens() {
        let verifier = IdentityVerifier::with_shared_secret(SECRET, Vec::new());

        let expired = token_with(Header::default(), "user_1", -3600);
        assert!(matches!(
            verifier.verify(&expired).await,
            Err(IdentityError::InvalidToken(_))
        ));

        let other = IdentityVerifier::with_shared_secret(b"other-secret", Vec::new());
        assert!(other.verify(&token("user_1")).await.is_err());

        assert!(verifier.verify("not-a-token").await.is_err());
    }

    #[tokio::test]
    async fn test_authorization_header() {
        let verifier = IdentityVerifier::with_shared_secret(SECRET, Vec::new());

        assert!(matches!(
            verifier.authenticate(None).await,
            Err(IdentityError::MissingToken)
        ));
        assert!(matches!(
            verifier.authenticate(Some("Basic abc")).await,
            Err(IdentityError::MissingToken)
        ));

        let header = format!("Bearer {}", token("user_1"));
        let caller = verifier.authenticate(Some(&header)).await.unwrap();
        assert_eq!(caller.user_id, "user_1");
    }

    #[tokio::test]
    async fn test_issuer_checked_when_configured() {
        let verifier = IdentityVerifier::with_shared_secret(SECRET, Vec::new())
            .with_issuer(Some("https://id.example.com".to_string()));

        // Token carries no iss claim
        let err = verifier.verify(&token("user_1")).await.unwrap_err();
        assert!(err.is_rejection());

        let exp = (chrono::Utc::now().timestamp() + 3600) as usize;
        let claims = TestClaims { sub: "user_1", exp, iss: Some("https://id.example.com") };
        let signed = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).unwrap();
        assert_eq!(verifier.verify(&signed).await.unwrap().user_id, "user_1");

        let claims = TestClaims { sub: "user_1", exp, iss: Some("https://evil.example.com") };
        let signed = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).unwrap();
        assert!(verifier.verify(&signed).await.is_err());
    }

    #[tokio::test]
    async fn test_jwks_fetch_failure() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/jwks")
            .with_status(500)
            .create_async()
            .await;

        let verifier = IdentityVerifier::with_jwks(
            &format!("{}/jwks", server.url()),
            Duration::from_secs(60),
            Vec::new(),
        );

        let mut header = Header::default();
        header.kid = Some("k1".to_string());
        let err = verifier
            .verify(&token_with(header, "user_1", 3600))
            .await
            .unwrap_err();

        assert!(matches!(err, IdentityError::KeySet(JwksError::FetchError(_))));
        assert!(!err.is_rejection());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_jwks_unknown_kid_and_wrong_algorithm() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"{"keys":[{"kid":"k1","kty":"RSA","alg":"RS256","use":"sig","n":"0vx7agoebGcQSuuPiLJXZptN9nndrQmbXEps2aiAFbWhM78LhWx4cbbfAAtVT86zwu1RK7aPFFxuhDR1L6tSoc_BJECPebWKRXjBZCiFV4n3oknjhMstn64tZ_2W-5JsGY4Hc5n9yBXArwl93lqt7_RN5w6Cf0h4QyQ5v-65YGjQR0_FDW2QvzqY368QQMicAtaSqzs8KJZgnYb9c7d0zgdAZHzu6qMQvRL5hajrn1n91CbOpbISD08qNLyrdkt-bFTWhAI4vMQFh6WeZu0fM4lFd2NcRwr3XPksINHaQ-G_xBniIqbw0Ls1jF44-csFCur-kEgU8awapJzKnqDKgw","e":"AQAB"}]}"#;
        server
            .mock("GET", "/jwks")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let verifier = IdentityVerifier::with_jwks(
            &format!("{}/jwks", server.url()),
            Duration::from_secs(60),
            Vec::new(),
        );

        let mut header = Header::default();
        header.kid = Some("missing".to_string());
        let err = verifier
            .verify(&token_with(header, "user_1", 3600))
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::KeySet(JwksError::KeyNotFound(_))));

        // Known key, but HS256 is never accepted in JWKS mode
        let mut header = Header::default();
        header.kid = Some("k1".to_string());
        let err = verifier
            .verify(&token_with(header, "user_1", 3600))
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::UnsupportedAlgorithm(Algorithm::HS256)));
    }

    #[tokio::test]
    async fn test_unknown_kid_does_not_refetch_fresh_set() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/jwks")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"keys":[]}"#)
            .expect(1)
            .create_async()
            .await;

        let client = JwksClient::new(&format!("{}/jwks", server.url()), Duration::from_secs(3600));

        for kid in ["a", "b", "c"] {
            assert!(matches!(
                client.get_key(kid).await,
                Err(JwksError::KeyNotFound(_))
            ));
        }

        mock.assert_async().await;
    }
}
