use serde::Deserialize;
use std::collections::{HashMap, HashSet};

use crate::aggregation::{FetchOutcome, SummaryEvent};
use crate::errors::{CashKickError, Result};
use crate::models::{
    Account, CashKickDraw, FinancingContract, SelectedContracts, SelectedContractsMapping,
};
use crate::types::{ContractId, Source, UserId};

/// read-only record source behind the core; transport lives outside this crate
pub trait DataSource {
    fn fetch_contracts(&self, ids: &[ContractId]) -> Result<Vec<FinancingContract>>;

    fn fetch_draws(&self, user_id: &UserId) -> Result<Vec<CashKickDraw>>;

    fn fetch_account(&self, user_id: &UserId) -> Result<Account>;
}

/// issue the three independent fetches for a user and wrap them as a load event
///
/// A failing fetch never stops the others; its failure is carried in the event.
pub fn load_user_data(
    source: &dyn DataSource,
    user_id: &UserId,
    mapping: &SelectedContractsMapping,
) -> SummaryEvent {
    let ids = mapping.contract_ids_for(user_id);

    SummaryEvent::DataLoaded {
        contracts: FetchOutcome::from_result(source.fetch_contracts(&ids)),
        draws: FetchOutcome::from_result(source.fetch_draws(user_id)),
        account: FetchOutcome::from_result(source.fetch_account(user_id)),
    }
}

/// json document in the dashboard's data file layout
#[derive(Debug, Default, Deserialize)]
struct Document {
    #[serde(default)]
    contracts: Vec<FinancingContract>,
    #[serde(default, alias = "cashKicks")]
    cashkicks: Vec<CashKickDraw>,
    #[serde(default)]
    users: Vec<Account>,
    #[serde(default, rename = "SelectedContracts", alias = "selectedContracts")]
    selected_contracts: Vec<SelectedContracts>,
}

/// in-memory data source, mainly for fixtures and tests
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataSource {
    contracts: Vec<FinancingContract>,
    draws: Vec<CashKickDraw>,
    accounts: HashMap<String, Account>,
    mapping: SelectedContractsMapping,
    failing: HashSet<Source>,
}

impl InMemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// build from a json document with `contracts`, `cashkicks`, `users` and `SelectedContracts`
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(CashKickError::InvalidData {
                message: "data document must be a json object".to_string(),
            });
        }
        let document: Document = serde_json::from_value(value)?;

        let mut source = Self::new();
        source.contracts = document.contracts;
        source.draws = document.cashkicks;
        for account in document.users {
            let Some(key) = account.id.as_ref().map(|id| id.canonical()) else {
                return Err(CashKickError::InvalidData {
                    message: "user record without id".to_string(),
                });
            };
            source.accounts.insert(key, account);
        }
        source.mapping = SelectedContractsMapping::from_records(document.selected_contracts);

        Ok(source)
    }

    pub fn with_contract(mut self, contract: FinancingContract) -> Self {
        self.contracts.push(contract);
        self
    }

    pub fn with_draw(mut self, draw: CashKickDraw) -> Self {
        self.draws.push(draw);
        self
    }

    pub fn with_account(mut self, user_id: &UserId, account: Account) -> Self {
        self.accounts.insert(user_id.canonical(), account);
        self
    }

    pub fn with_mapping(mut self, mapping: SelectedContractsMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// make every fetch against `source` fail
    pub fn failing(mut self, source: Source) -> Self {
        self.failing.insert(source);
        self
    }

    /// selected contracts table carried by the document
    pub fn mapping(&self) -> &SelectedContractsMapping {
        &self.mapping
    }

    fn check(&self, source: Source) -> Result<()> {
        if self.failing.contains(&source) {
            return Err(CashKickError::SourceFetch {
                origin: source,
                message: format!("{source} unavailable"),
            });
        }
        Ok(())
    }
}

impl DataSource for InMemoryDataSource {
    fn fetch_contracts(&self, ids: &[ContractId]) -> Result<Vec<FinancingContract>> {
        self.check(Source::Contracts)?;
        Ok(self
            .contracts
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    fn fetch_draws(&self, user_id: &UserId) -> Result<Vec<CashKickDraw>> {
        self.check(Source::Draws)?;
        Ok(self
            .draws
            .iter()
            .filter(|d| d.user_id.as_ref() == Some(user_id))
            .cloned()
            .collect())
    }

    fn fetch_account(&self, user_id: &UserId) -> Result<Account> {
        self.check(Source::Account)?;
        self.accounts
            .get(&user_id.canonical())
            .cloned()
            .ok_or_else(|| CashKickError::SourceFetch {
                origin: Source::Account,
                message: format!("user {user_id} not found"),
            })
    }
}
