use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::clock::Latency;
use crate::evidence::{DEFAULT_GATEWAY, DEFAULT_MAX_EVIDENCE_BYTES};
use crate::store::{DEFAULT_ID_PREFIX, LookupPolicy};
use crate::wallet::DEMO_ACCOUNT;

/// Directory holding project state, relative to the project root.
pub const DFIR_DIR: &str = ".dfir";

/// Env var that turns simulated latency off when set to `0`, `false` or `off`.
pub const SIMULATE_LATENCY_ENV: &str = "DFIR_SIMULATE_LATENCY";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub latency: LatencyConfig,
    #[serde(default)]
    pub evidence: EvidenceConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,
    #[serde(default)]
    pub lookup: LookupPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            id_prefix: default_id_prefix(),
            lookup: LookupPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_submit_ms")]
    pub submit_ms: u64,
    #[serde(default = "default_fetch_ms")]
    pub fetch_ms: u64,
    #[serde(default = "default_update_ms")]
    pub update_ms: u64,
    #[serde(default = "default_upload_ms")]
    pub upload_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            submit_ms: default_submit_ms(),
            fetch_ms: default_fetch_ms(),
            update_ms: default_update_ms(),
            upload_ms: default_upload_ms(),
        }
    }
}

impl LatencyConfig {
    /// The delay profile this section describes.
    #[must_use]
    pub const fn to_latency(&self) -> Latency {
        if !self.enabled {
            return Latency::none();
        }
        Latency {
            submit: Duration::from_millis(self.submit_ms),
            fetch: Duration::from_millis(self.fetch_ms),
            update: Duration::from_millis(self.update_ms),
            upload: Duration::from_millis(self.upload_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceConfig {
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
    #[serde(default = "default_gateway")]
    pub gateway: String,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
            gateway: default_gateway(),
        }
    }
}

/// Wallet accounts allowed to use the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_accounts")]
    pub accounts: Vec<String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            accounts: default_admin_accounts(),
        }
    }
}

impl AdminConfig {
    #[must_use]
    pub fn is_authorized(&self, account: &str) -> bool {
        self.accounts
            .iter()
            .any(|a| a.trim().eq_ignore_ascii_case(account.trim()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
    /// Account the CLI presents as the connected wallet.
    #[serde(default)]
    pub account: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
    pub latency: Latency,
}

#[must_use]
pub fn config_path(project_root: &Path) -> PathBuf {
    project_root.join(DFIR_DIR).join("config.toml")
}

pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = config_path(project_root);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("dfir/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Project and user config merged with environment overrides.
pub fn resolve_config(project_root: &Path) -> Result<EffectiveConfig> {
    let project = load_project_config(project_root)?;
    let user = load_user_config()?;

    let env_latency = env::var(SIMULATE_LATENCY_ENV).ok();
    let latency = resolve_latency(&project.latency, env_latency.as_deref());

    Ok(EffectiveConfig {
        project,
        user,
        latency,
    })
}

fn resolve_latency(config: &LatencyConfig, env_value: Option<&str>) -> Latency {
    let disabled = env_value.is_some_and(|raw| {
        matches!(
            raw.trim().to_ascii_lowercase().as_str(),
            "0" | "false" | "off" | "no"
        )
    });
    if disabled {
        tracing::debug!("simulated latency disabled by {SIMULATE_LATENCY_ENV}");
        return Latency::none();
    }
    config.to_latency()
}

/// Default `config.toml` written by `dfir init`.
pub fn default_config_toml() -> Result<String> {
    toml::to_string_pretty(&ProjectConfig::default()).context("Failed to render default config")
}

const fn default_true() -> bool {
    true
}

fn default_id_prefix() -> String {
    DEFAULT_ID_PREFIX.to_string()
}

const fn default_submit_ms() -> u64 {
    2000
}

const fn default_fetch_ms() -> u64 {
    1500
}

const fn default_update_ms() -> u64 {
    1000
}

const fn default_upload_ms() -> u64 {
    1500
}

const fn default_max_bytes() -> u64 {
    DEFAULT_MAX_EVIDENCE_BYTES
}

fn default_gateway() -> String {
    DEFAULT_GATEWAY.to_string()
}

fn default_admin_accounts() -> Vec<String> {
    vec![DEMO_ACCOUNT.to_string()]
}
