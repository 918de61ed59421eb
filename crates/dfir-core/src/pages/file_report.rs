use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{BusyFlag, Notice, Outcome};
use crate::error::FirError;
use crate::evidence::{EvidenceStore, ensure_within_limit};
use crate::format::format_size;
use crate::model::form::FilingForm;
use crate::store::CaseStore;
use crate::validate;
use crate::wallet::{WalletSession, truncate_address};

/// Evidence picked by the user but not yet uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Attachment {
    file_name: String,
    bytes: Vec<u8>,
}

#[derive(Debug, Default)]
struct Draft {
    form: FilingForm,
    attachment: Option<Attachment>,
}

/// The report filing screen.
///
/// Holds the draft form and the wallet session. Submitting requires a
/// connected wallet; a successful submission clears the draft.
pub struct FileReportPage {
    store: Arc<CaseStore>,
    evidence: Arc<dyn EvidenceStore>,
    wallet: Mutex<WalletSession>,
    draft: Mutex<Draft>,
    busy: BusyFlag,
}

impl std::fmt::Debug for FileReportPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileReportPage")
            .field("wallet", &self.wallet)
            .field("busy", &self.busy)
            .finish_non_exhaustive()
    }
}

impl FileReportPage {
    #[must_use]
    pub fn new(store: Arc<CaseStore>, evidence: Arc<dyn EvidenceStore>) -> Self {
        Self {
            store,
            evidence,
            wallet: Mutex::new(WalletSession::new()),
            draft: Mutex::new(Draft::default()),
            busy: BusyFlag::default(),
        }
    }

    fn wallet(&self) -> MutexGuard<'_, WalletSession> {
        self.wallet.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn draft(&self) -> MutexGuard<'_, Draft> {
        self.draft.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn connect_wallet(&self, provider: Option<&str>) -> Outcome<String> {
        match self.wallet().connect(provider) {
            Ok(account) => {
                let account = account.to_string();
                let notice = Notice::success(
                    "Wallet Connected",
                    format!("Connected as {}", truncate_address(&account)),
                );
                Outcome::ok(account, notice)
            }
            Err(err) => Outcome::err(
                err,
                Notice::error(
                    "Connection Failed",
                    "Failed to connect wallet. Please try again.",
                ),
            ),
        }
    }

    #[must_use]
    pub fn account(&self) -> Option<String> {
        self.wallet().account().map(str::to_string)
    }

    /// Current draft contents.
    #[must_use]
    pub fn form(&self) -> FilingForm {
        self.draft().form.clone()
    }

    pub fn edit_form(&self, edit: impl FnOnce(&mut FilingForm)) {
        edit(&mut self.draft().form);
    }

    /// Pick an evidence file. Oversized files are refused on the spot and
    /// any earlier pick is kept.
    pub fn attach_evidence(&self, file_name: &str, bytes: Vec<u8>) -> Outcome<()> {
        let size = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        if let Err(err) = ensure_within_limit(size, self.evidence.max_bytes()) {
            return Outcome::err(err, file_too_large(self.evidence.max_bytes()));
        }

        self.draft().attachment = Some(Attachment {
            file_name: file_name.to_string(),
            bytes,
        });
        Outcome::ok((), Notice::success("Evidence Attached", file_name))
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Upload any attached evidence and file the draft.
    pub async fn submit(&self) -> Outcome<String> {
        let Ok(_guard) = self.busy.try_acquire() else {
            return Outcome::busy();
        };

        let Some(account) = self.account() else {
            return Outcome::err(
                FirError::WalletUnavailable,
                Notice::error(
                    "Wallet Required",
                    "Please connect your wallet before submitting",
                ),
            );
        };

        let (mut form, attachment) = {
            let draft = self.draft();
            (draft.form.clone(), draft.attachment.clone())
        };
        form.account = Some(account);

        if let Some(attachment) = &attachment {
            let size = u64::try_from(attachment.bytes.len()).unwrap_or(u64::MAX);
            if let Err(err) = ensure_within_limit(size, self.evidence.max_bytes()) {
                return Outcome::err(err, file_too_large(self.evidence.max_bytes()));
            }
        }

        if let Err(err) = validate::validate_filing(&form) {
            let notice = Notice::error("Submission Failed", err.to_string());
            return Outcome::err(err.into(), notice);
        }

        // Every check `submit` makes has passed by now, so an uploaded blob
        // is always referenced by the record that follows. Content
        // addressing makes a retried upload of the same file a no-op.
        if let Some(attachment) = attachment {
            match self
                .evidence
                .store(&attachment.file_name, attachment.bytes)
                .await
            {
                Ok(handle) => form.evidence = Some(handle),
                Err(err) => return submission_failed(err),
            }
        }

        match self.store.submit(&form).await {
            Ok(id) => {
                let mut draft = self.draft();
                draft.form.reset();
                draft.attachment = None;
                let notice = Notice::success(
                    "FIR Submitted Successfully",
                    format!("Your FIR has been recorded. FIR ID: #{id}"),
                );
                Outcome::ok(id, notice)
            }
            Err(err) => submission_failed(err),
        }
    }
}

/// Notice shown when an evidence file exceeds the `limit`-byte ceiling.
#[must_use]
pub fn file_too_large(limit: u64) -> Notice {
    Notice::error(
        "File Too Large",
        format!("Please upload a file smaller than {}", format_size(limit)),
    )
}

fn submission_failed<T>(err: FirError) -> Outcome<T> {
    let notice = Notice::error("Submission Failed", err.to_string());
    Outcome::err(err, notice)
}
