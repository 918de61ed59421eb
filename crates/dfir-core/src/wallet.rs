//! Simulated wallet connection.

use crate::error::FirError;

/// Account exposed by the demo wallet provider.
pub const DEMO_ACCOUNT: &str = "0x1234567890abcdef1234567890abcdef12345678";

/// Connection state for one user session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletSession {
    account: Option<String>,
}

impl WalletSession {
    #[must_use]
    pub const fn new() -> Self {
        Self { account: None }
    }

    /// Connect to the account offered by the injected provider.
    ///
    /// `provider` is `None` when no wallet extension is installed.
    ///
    /// # Errors
    ///
    /// [`FirError::WalletUnavailable`] without a provider or when the
    /// provider offers something that is not an account address.
    pub fn connect(&mut self, provider: Option<&str>) -> Result<&str, FirError> {
        let Some(account) = provider.map(str::trim).filter(|a| is_valid_account(a)) else {
            tracing::warn!("wallet connection failed: no usable provider");
            return Err(FirError::WalletUnavailable);
        };

        let account = account.to_ascii_lowercase();
        tracing::info!(account = %truncate_address(&account), "wallet connected");
        Ok(self.account.insert(account).as_str())
    }

    pub fn disconnect(&mut self) {
        if self.account.take().is_some() {
            tracing::info!("wallet disconnected");
        }
    }

    #[must_use]
    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.account.is_some()
    }
}

/// `0x` followed by 40 hex digits.
#[must_use]
pub fn is_valid_account(raw: &str) -> bool {
    raw.strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Shorten an address for display: `0x1234...5678`.
#[must_use]
pub fn truncate_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
