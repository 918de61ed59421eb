use serde::{Deserialize, Serialize};

use super::case::Category;
use crate::evidence::ContentHandle;

/// Raw input from the file-a-complaint form.
///
/// This is the only place the unmasked identity number lives; it is
/// fingerprinted and dropped when the record is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilingForm {
    pub name: String,
    pub identity_number: String,
    pub address: String,
    pub category: Option<Category>,
    pub incident_date: String,
    pub incident_time: String,
    pub location: String,
    pub description: String,
    pub evidence: Option<ContentHandle>,
    /// Wallet account the report is filed from, if one is connected.
    pub account: Option<String>,
}

impl FilingForm {
    /// Clear every field, as the form does after a successful submission.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
