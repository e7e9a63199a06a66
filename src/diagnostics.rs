use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::CashKickError;
use crate::types::{ContractId, Id, Source, UserId};

/// how loudly a diagnostic should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Notice,
    Warning,
    Error,
}

/// recoverable conditions raised while resolving, scheduling and aggregating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// no selected contracts recorded for the user
    MissingMapping {
        user_id: UserId,
    },
    /// contract skipped because its terms are malformed
    InvalidContract {
        contract_id: ContractId,
        reason: String,
    },
    /// draw amounts break `0 <= received <= financed`
    InvalidDraw {
        draw_id: Id,
        reason: String,
    },
    /// supplied total disagrees with per payment amount times term
    TotalMismatch {
        contract_id: ContractId,
        supplied: Money,
        computed: Money,
        adopted: Money,
    },
    /// one upstream fetch failed, its data is treated as empty
    SourceFailed {
        source: Source,
        message: String,
    },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::TotalMismatch { .. } => Severity::Notice,
            Diagnostic::MissingMapping { .. }
            | Diagnostic::InvalidContract { .. }
            | Diagnostic::InvalidDraw { .. } => Severity::Warning,
            Diagnostic::SourceFailed { .. } => Severity::Error,
        }
    }

    /// diagnostic for a failed fetch or a skipped contract
    pub fn from_error(err: &CashKickError) -> Option<Self> {
        match err {
            CashKickError::SourceFetch { origin, message } => Some(Diagnostic::SourceFailed {
                source: *origin,
                message: message.clone(),
            }),
            CashKickError::InvalidContract { contract_id, reason } => {
                Some(Diagnostic::InvalidContract {
                    contract_id: ContractId::from(contract_id.as_str()),
                    reason: reason.clone(),
                })
            }
            _ => None,
        }
    }

    fn log(&self) {
        match self {
            Diagnostic::MissingMapping { user_id } => {
                tracing::warn!(%user_id, "selected contracts not found for user");
            }
            Diagnostic::InvalidContract { contract_id, reason } => {
                tracing::warn!(%contract_id, %reason, "skipping malformed contract");
            }
            Diagnostic::InvalidDraw { draw_id, reason } => {
                tracing::warn!(%draw_id, %reason, "draw amounts out of bounds");
            }
            Diagnostic::TotalMismatch {
                contract_id,
                supplied,
                computed,
                adopted,
            } => {
                tracing::info!(%contract_id, %supplied, %computed, %adopted, "total payment amount mismatch");
            }
            Diagnostic::SourceFailed { source, message } => {
                tracing::error!(%source, %message, "fetch failed, continuing without it");
            }
        }
    }
}

/// collector for diagnostics raised during an operation
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        diagnostic.log();
        self.entries.push(diagnostic);
    }

    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.entries)
    }

    pub fn events(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// sources whose fetch failed, in emission order
    pub fn failed_sources(&self) -> Vec<Source> {
        self.entries
            .iter()
            .filter_map(|d| match d {
                Diagnostic::SourceFailed { source, .. } => Some(*source),
                _ => None,
            })
            .collect()
    }

    pub fn has_missing_mapping(&self, user_id: &UserId) -> bool {
        self.entries
            .iter()
            .any(|d| matches!(d, Diagnostic::MissingMapping { user_id: u } if u == user_id))
    }

    pub fn highest_severity(&self) -> Option<Severity> {
        self.entries.iter().map(Diagnostic::severity).max()
    }
}
