use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, ScheduleAnchor};
use crate::date_math::{days_until, today};
use crate::decimal::Money;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::errors::{CashKickError, Result};
use crate::models::{Account, CashKickDraw, FinancingContract, SelectedContractsMapping};
use crate::resolver::ContractResolver;
use crate::schedule::{PaymentSchedule, ScheduleBuilder};
use crate::types::{Source, UserId};

/// outcome of one upstream fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchOutcome<T> {
    Loaded(T),
    Failed { message: String },
}

impl<T> FetchOutcome<T> {
    pub fn failed(message: impl Into<String>) -> Self {
        FetchOutcome::Failed {
            message: message.into(),
        }
    }

    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(data) => FetchOutcome::Loaded(data),
            Err(CashKickError::SourceFetch { message, .. }) => FetchOutcome::Failed { message },
            Err(err) => FetchOutcome::Failed {
                message: err.to_string(),
            },
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, FetchOutcome::Loaded(_))
    }
}

impl<T: Clone + Default> FetchOutcome<T> {
    /// loaded data, or empty data plus a diagnostic tagged with `source`
    pub fn data_or_report(&self, source: Source, diagnostics: &mut Diagnostics) -> T {
        match self {
            FetchOutcome::Loaded(data) => data.clone(),
            FetchOutcome::Failed { message } => {
                diagnostics.emit(Diagnostic::SourceFailed {
                    source,
                    message: message.clone(),
                });
                T::default()
            }
        }
    }
}

/// input to the summary reducer
///
/// Any `type` other than `DATA_LOADED` decodes to [`SummaryEvent::Unknown`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SummaryEvent {
    DataLoaded {
        contracts: FetchOutcome<Vec<FinancingContract>>,
        draws: FetchOutcome<Vec<CashKickDraw>>,
        account: FetchOutcome<Account>,
    },
    #[serde(other)]
    Unknown,
}

/// user facing account summary, recomputed wholesale on every load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccountSummary {
    pub user_id: UserId,
    pub available_credit: Money,
    pub total_outstanding: Money,
    pub next_due_amount: Money,
    pub next_due_in_days: i64,
    pub next_due_date: Option<NaiveDate>,
}

impl UserAccountSummary {
    /// summary with every figure at its zero value
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            available_credit: Money::ZERO,
            total_outstanding: Money::ZERO,
            next_due_amount: Money::ZERO,
            next_due_in_days: 0,
            next_due_date: None,
        }
    }

    pub fn has_payment_due(&self) -> bool {
        self.next_due_date.is_some()
    }
}

/// collects the three independent fetch outcomes in whatever order they arrive
#[derive(Debug, Clone, Default)]
pub struct PendingLoad {
    contracts: Option<FetchOutcome<Vec<FinancingContract>>>,
    draws: Option<FetchOutcome<Vec<CashKickDraw>>>,
    account: Option<FetchOutcome<Account>>,
}

impl PendingLoad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contracts(mut self, outcome: FetchOutcome<Vec<FinancingContract>>) -> Self {
        self.contracts = Some(outcome);
        self
    }

    pub fn with_draws(mut self, outcome: FetchOutcome<Vec<CashKickDraw>>) -> Self {
        self.draws = Some(outcome);
        self
    }

    pub fn with_account(mut self, outcome: FetchOutcome<Account>) -> Self {
        self.account = Some(outcome);
        self
    }

    pub fn is_complete(&self) -> bool {
        self.contracts.is_some() && self.draws.is_some() && self.account.is_some()
    }

    /// sources still outstanding
    pub fn missing(&self) -> Vec<Source> {
        let mut missing = Vec::new();
        if self.contracts.is_none() {
            missing.push(Source::Contracts);
        }
        if self.draws.is_none() {
            missing.push(Source::Draws);
        }
        if self.account.is_none() {
            missing.push(Source::Account);
        }
        missing
    }

    /// `DataLoaded` once all three outcomes are in, otherwise the pending load back
    pub fn into_event(self) -> std::result::Result<SummaryEvent, Self> {
        match (self.contracts, self.draws, self.account) {
            (Some(contracts), Some(draws), Some(account)) => Ok(SummaryEvent::DataLoaded {
                contracts,
                draws,
                account,
            }),
            (contracts, draws, account) => Err(Self {
                contracts,
                draws,
                account,
            }),
        }
    }
}

/// derives a user's account summary from fetched contracts, draws and account data
#[derive(Debug, Clone)]
pub struct AggregationEngine {
    user_id: UserId,
    mapping: SelectedContractsMapping,
    config: EngineConfig,
    resolver: ContractResolver,
    builder: ScheduleBuilder,
}

impl AggregationEngine {
    pub fn new(user_id: UserId, mapping: SelectedContractsMapping, config: EngineConfig) -> Self {
        let builder = ScheduleBuilder::new(config.reconciliation);
        Self {
            user_id,
            mapping,
            config,
            resolver: ContractResolver::new(),
            builder,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// starting state for the reducer
    pub fn initial_summary(&self) -> UserAccountSummary {
        UserAccountSummary::empty(self.user_id.clone())
    }

    /// reducer transition
    ///
    /// `DataLoaded` replaces the summary wholesale; `Unknown` returns `current` untouched.
    pub fn apply(
        &self,
        current: UserAccountSummary,
        event: &SummaryEvent,
        time_provider: &SafeTimeProvider,
        diagnostics: &mut Diagnostics,
    ) -> UserAccountSummary {
        match event {
            SummaryEvent::DataLoaded {
                contracts,
                draws,
                account,
            } => self.summarize(contracts, draws, account, time_provider, diagnostics),
            SummaryEvent::Unknown => current,
        }
    }

    fn summarize(
        &self,
        contracts: &FetchOutcome<Vec<FinancingContract>>,
        draws: &FetchOutcome<Vec<CashKickDraw>>,
        account: &FetchOutcome<Account>,
        time_provider: &SafeTimeProvider,
        diagnostics: &mut Diagnostics,
    ) -> UserAccountSummary {
        let contracts = contracts.data_or_report(Source::Contracts, diagnostics);
        let draws = draws.data_or_report(Source::Draws, diagnostics);
        let account = account.data_or_report(Source::Account, diagnostics);

        let mut summary = self.initial_summary();
        summary.available_credit = account.available_credit;

        let active: Vec<&CashKickDraw> = draws.iter().filter(|d| d.is_active()).collect();
        for draw in &active {
            if let Err(err) = draw.validate() {
                diagnostics.emit(Diagnostic::InvalidDraw {
                    draw_id: draw.id.clone(),
                    reason: err.to_string(),
                });
            }
        }
        summary.total_outstanding = active.iter().map(|d| d.outstanding()).sum();

        if active.is_empty() {
            return summary;
        }

        let resolved = self.contracts_for_draws(&active, &contracts, diagnostics);
        let start_date = match self.config.schedule_anchor {
            ScheduleAnchor::AsOfDate => today(time_provider),
            ScheduleAnchor::Fixed(date) => date,
        };
        let schedules = self.builder.build_all(&resolved, start_date, diagnostics);

        if let Some((due_date, amount)) = earliest_due(&schedules) {
            summary.next_due_date = Some(due_date);
            summary.next_due_amount = amount;
            summary.next_due_in_days = days_until(due_date, time_provider);
        }

        summary
    }

    /// contracts mapped to the users owning the active draws, each contract once
    fn contracts_for_draws(
        &self,
        active: &[&CashKickDraw],
        contracts: &[FinancingContract],
        diagnostics: &mut Diagnostics,
    ) -> Vec<FinancingContract> {
        let mut owners: Vec<&UserId> = Vec::new();
        for draw in active {
            let owner = draw.user_id.as_ref().unwrap_or(&self.user_id);
            if !owners.contains(&owner) {
                owners.push(owner);
            }
        }

        let mut resolved: Vec<FinancingContract> = Vec::new();
        for owner in owners {
            for contract in
                self.resolver
                    .resolve_contracts_for_user(owner, &self.mapping, contracts, diagnostics)
            {
                if !resolved.iter().any(|c| c.id == contract.id) {
                    resolved.push(contract);
                }
            }
        }
        resolved
    }
}

/// earliest due date across schedules and the total expected on that date
fn earliest_due(schedules: &[PaymentSchedule]) -> Option<(NaiveDate, Money)> {
    let earliest = schedules
        .iter()
        .filter_map(|s| s.first_due().map(|e| e.due_date))
        .min()?;

    let amount = schedules
        .iter()
        .flat_map(|s| s.entries.iter())
        .filter(|e| e.due_date == earliest)
        .map(|e| e.expected_amount)
        .sum();

    Some((earliest, amount))
}
