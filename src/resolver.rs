use std::collections::HashMap;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::models::{FinancingContract, SelectedContractsMapping};
use crate::types::{IdRef, UserId};

/// resolves which contracts belong to a user through the selected contracts mapping
#[derive(Debug, Clone, Copy, Default)]
pub struct ContractResolver;

impl ContractResolver {
    pub fn new() -> Self {
        Self
    }

    /// contracts selected by `user_id`, in mapping order
    ///
    /// A user absent from the mapping yields an empty result and a
    /// [`Diagnostic::MissingMapping`]. Mapped ids with no matching contract
    /// are skipped silently.
    pub fn resolve_contracts_for_user(
        &self,
        user_id: &UserId,
        mapping: &SelectedContractsMapping,
        contracts: &[FinancingContract],
        diagnostics: &mut Diagnostics,
    ) -> Vec<FinancingContract> {
        let Some(selected) = mapping.get(user_id) else {
            diagnostics.emit(Diagnostic::MissingMapping {
                user_id: user_id.clone(),
            });
            return Vec::new();
        };

        let mut by_id: HashMap<String, &FinancingContract> = HashMap::with_capacity(contracts.len());
        for contract in contracts {
            // first contract wins on duplicate ids
            by_id.entry(contract.id.canonical()).or_insert(contract);
        }

        selected
            .iter()
            .filter_map(|entry| by_id.get(&entry.canonical()).map(|c| (*c).clone()))
            .collect()
    }
}

/// true when a mapping entry refers to the given contract
pub fn matches_contract(entry: &IdRef, contract: &FinancingContract) -> bool {
    entry.canonical() == contract.id.canonical()
}
