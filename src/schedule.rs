use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::{ReconciliationPolicy, TotalPrecedence};
use crate::date_math::add_months;
use crate::decimal::Money;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::errors::{CashKickError, Result};
use crate::models::FinancingContract;
use crate::types::{ContractId, PaymentStatus};

/// one scheduled repayment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentScheduleEntry {
    /// 0-based position in the schedule
    pub index: u32,
    pub due_date: NaiveDate,
    pub expected_amount: Money,
    /// balance left once this entry is paid
    pub outstanding_amount: Money,
    pub status: PaymentStatus,
}

impl PaymentScheduleEntry {
    /// status of this entry as seen on `date`
    pub fn status_on(&self, date: NaiveDate) -> PaymentStatus {
        if self.due_date > date {
            PaymentStatus::Upcoming
        } else if self.due_date == date {
            PaymentStatus::Due
        } else {
            PaymentStatus::Overdue
        }
    }
}

/// repayment schedule derived from one contract, never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSchedule {
    pub contract_id: ContractId,
    pub start_date: NaiveDate,
    pub total_owed: Money,
    pub entries: Vec<PaymentScheduleEntry>,
}

impl PaymentSchedule {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, index: u32) -> Option<&PaymentScheduleEntry> {
        self.entries.get(index as usize)
    }

    pub fn first_due(&self) -> Option<&PaymentScheduleEntry> {
        self.entries.first()
    }

    /// first entry due on or after `date`
    pub fn next_due_on_or_after(&self, date: NaiveDate) -> Option<&PaymentScheduleEntry> {
        self.entries.iter().find(|e| e.due_date >= date)
    }

    /// sum of all expected amounts
    pub fn total_expected(&self) -> Money {
        self.entries.iter().map(|e| e.expected_amount).sum()
    }

    /// outstanding amount after the last entry
    pub fn final_balance(&self) -> Money {
        self.entries
            .last()
            .map(|e| e.outstanding_amount)
            .unwrap_or(self.total_owed)
    }
}

/// builds flat, fixed-payment schedules from contract terms
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleBuilder {
    policy: ReconciliationPolicy,
}

impl ScheduleBuilder {
    pub fn new(policy: ReconciliationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ReconciliationPolicy {
        &self.policy
    }

    /// schedule of exactly `term_length_months` entries, first due one month after `start_date`
    ///
    /// Entry `i` is due `i + 1` months after `start_date`, each offset taken
    /// from the start. For start days up to the 28th this equals stepping one
    /// month from the previous due date. Later start days keep their day where
    /// the month allows it, so a Jan 31 start gives Feb 29, Mar 31, Apr 30.
    ///
    /// Malformed terms, including ones whose last due date falls outside the
    /// calendar, fail with `CashKickError::InvalidContract` before anything is
    /// built. A supplied total that disagrees with the computed one is
    /// reconciled through the policy and reported as [`Diagnostic::TotalMismatch`].
    pub fn build_schedule(
        &self,
        contract: &FinancingContract,
        start_date: NaiveDate,
        diagnostics: &mut Diagnostics,
    ) -> Result<PaymentSchedule> {
        contract.validate()?;

        let term_months = contract.term_months();
        let last_offset = i32::try_from(term_months).unwrap_or(i32::MAX);
        if add_months(start_date, last_offset).is_err() {
            return Err(CashKickError::InvalidContract {
                contract_id: contract.id.canonical(),
                reason: format!("{term_months} months after {start_date} is out of range"),
            });
        }

        let total_owed = self.reconcile_total(contract, diagnostics);
        let payment = contract.per_payment_amount;

        let mut entries = Vec::new();
        let mut paid = Money::ZERO;

        for index in 0..term_months {
            let offset = i32::try_from(index + 1).unwrap_or(i32::MAX);
            let due_date = add_months(start_date, offset)?;
            paid += payment;

            entries.push(PaymentScheduleEntry {
                index,
                due_date,
                expected_amount: payment,
                outstanding_amount: total_owed - paid,
                status: PaymentStatus::Upcoming,
            });
        }

        Ok(PaymentSchedule {
            contract_id: contract.id.clone(),
            start_date,
            total_owed,
            entries,
        })
    }

    /// schedules for every buildable contract; malformed ones are reported and skipped
    pub fn build_all(
        &self,
        contracts: &[FinancingContract],
        start_date: NaiveDate,
        diagnostics: &mut Diagnostics,
    ) -> Vec<PaymentSchedule> {
        contracts
            .iter()
            .filter_map(|contract| match self.build_schedule(contract, start_date, diagnostics) {
                Ok(schedule) => Some(schedule),
                Err(err) => {
                    let diagnostic = Diagnostic::from_error(&err).unwrap_or_else(|| {
                        Diagnostic::InvalidContract {
                            contract_id: contract.id.clone(),
                            reason: err.to_string(),
                        }
                    });
                    diagnostics.emit(diagnostic);
                    None
                }
            })
            .collect()
    }

    /// total owed over the life of the contract
    pub fn reconcile_total(&self, contract: &FinancingContract, diagnostics: &mut Diagnostics) -> Money {
        let computed = contract.computed_total();

        let Some(supplied) = contract.total_payment_amount else {
            return computed;
        };

        if self.policy.agrees(supplied, computed) {
            return supplied;
        }

        let adopted = match self.policy.precedence {
            TotalPrecedence::Supplied => supplied,
            TotalPrecedence::Computed => computed,
        };

        diagnostics.emit(Diagnostic::TotalMismatch {
            contract_id: contract.id.clone(),
            supplied,
            computed,
            adopted,
        });

        adopted
    }
}
