use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g., DATABASE_URL loaded via COURIER__DATABASE__URL or DATABASE_URL
}

// --- Auth Config ---
// Shared secret for verifying the identity collaborator's bearer tokens.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String, // Loaded via COURIER__AUTH__JWT_SECRET or JWT_SECRET
}

// --- Push Config ---
// VAPID material for the Web Push transport. The private key is a PEM
// (PKCS#8 EC P-256); the public key is the base64url string handed to
// subscribing clients.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PushConfig {
    pub vapid_subject: String, // e.g. "mailto:ops@example.com"
    pub vapid_public_key: String,
    pub vapid_private_key_pem: String, // Loaded via COURIER__PUSH__VAPID_PRIVATE_KEY_PEM
    #[serde(default = "default_push_ttl")]
    pub ttl_seconds: u32,
}

fn default_push_ttl() -> u32 {
    86400
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // Auth config is mandatory: nothing in this service runs unauthenticated
    pub auth: AuthConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_push: bool,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub push: Option<PushConfig>,
}
