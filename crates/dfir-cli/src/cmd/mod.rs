pub mod assign;
pub mod completions;
pub mod file;
pub mod identity;
pub mod init;
pub mod list;
pub mod stats;
pub mod status;
pub mod update;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dfir_core::clock::SystemClock;
use dfir_core::config::{self, DFIR_DIR, EffectiveConfig};
use dfir_core::error::{ErrorCode, FirError};
use dfir_core::evidence::MemoryEvidenceStore;
use dfir_core::pages::{AdminPage, Notice};
use dfir_core::snapshot;
use dfir_core::store::CaseStore;
use dfir_core::wallet::DEMO_ACCOUNT;

use crate::output::{CliError, OutputMode, report};

/// Find the directory containing `.dfir/` by walking up from `start`.
fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(DFIR_DIR).is_dir() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Everything a command needs: resolved config and a store loaded from
/// the project snapshot.
pub struct Session {
    pub root: PathBuf,
    pub config: EffectiveConfig,
    pub store: Arc<CaseStore>,
}

impl Session {
    /// Open the project containing `start`.
    ///
    /// # Errors
    ///
    /// Fails if no `.dfir/` directory is found, the config does not parse, or
    /// the snapshot is unreadable or corrupt. The error has already been
    /// rendered to stderr.
    pub fn open(start: &Path, output: OutputMode) -> Result<Self> {
        let Some(root) = find_project_root(start) else {
            let msg = "Not a dfir project: .dfir directory not found";
            return Err(report(
                output,
                &CliError::from_code(ErrorCode::NotInitialized, msg),
            ));
        };

        let config = match config::resolve_config(&root) {
            Ok(config) => config,
            Err(err) => {
                return Err(report(
                    output,
                    &CliError::from_code(ErrorCode::ConfigParseError, format!("{err:#}")),
                ));
            }
        };

        let store = CaseStore::new(Arc::new(SystemClock), config.latency)
            .with_lookup(config.project.store.lookup)
            .with_id_prefix(config.project.store.id_prefix.clone());

        if let Err(err) = snapshot::load_into(&store, &root) {
            return Err(report(
                output,
                &CliError::from_code(ErrorCode::CorruptSnapshot, format!("{err:#}")),
            ));
        }

        tracing::debug!(root = %root.display(), "session opened");
        Ok(Self {
            root,
            config,
            store: Arc::new(store),
        })
    }

    /// Evidence store configured from the project's `[evidence]` section.
    pub fn evidence(&self) -> Arc<MemoryEvidenceStore> {
        let evidence = &self.config.project.evidence;
        Arc::new(
            MemoryEvidenceStore::new(self.config.latency)
                .with_max_bytes(evidence.max_bytes)
                .with_gateway(evidence.gateway.clone()),
        )
    }

    /// Account the simulated wallet provider offers: the `--account` flag,
    /// then the user config, then the demo account.
    pub fn wallet_account(&self, flag: Option<&str>) -> String {
        flag.map(str::to_string)
            .or_else(|| self.config.user.account.clone())
            .unwrap_or_else(|| DEMO_ACCOUNT.to_string())
    }

    /// Persist the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written; it has already
    /// been rendered.
    pub fn save(&self, output: OutputMode) -> Result<()> {
        if let Err(err) = snapshot::save_from(&self.store, &self.root) {
            return Err(report(
                output,
                &CliError::from_code(ErrorCode::SnapshotWriteFailed, format!("{err:#}")),
            ));
        }
        Ok(())
    }
}

/// Admin dashboard connected with the session's wallet account.
///
/// # Errors
///
/// Fails, after rendering the denial, if the account is not an authorized
/// administrator.
pub fn admin_page(
    session: &Session,
    account_flag: Option<&str>,
    output: OutputMode,
) -> Result<AdminPage> {
    let page = AdminPage::new(session.store.clone(), session.config.project.admin.clone());
    let connected = page.connect_wallet(Some(&session.wallet_account(account_flag)));
    match &connected.result {
        Ok(_) => Ok(page),
        Err(err) => Err(fail(output, &connected.notice, err)),
    }
}

/// Render a failed page action and turn it into the command's error.
pub fn fail(output: OutputMode, notice: &Notice, err: &FirError) -> anyhow::Error {
    let mut cli = CliError::from(err);
    cli.message = format!("{}: {}", notice.title, err);
    report(output, &cli)
}
