use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::decimal::{Money, Rate};
use crate::errors::{CashKickError, Result};
use crate::types::{ContractId, DrawStatus, Id, IdRef, UserId};

/// financing contract terms, read-only once fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancingContract {
    pub id: ContractId,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub contract_type: String,
    #[serde(alias = "perPayment")]
    pub per_payment_amount: Money,
    pub term_length_months: i64,
    /// fee rate, display only
    #[serde(with = "crate::decimal::percentage", default)]
    pub term_length_percentage: Rate,
    /// total as supplied by the data source, may disagree with the computed one
    #[serde(alias = "paymentAmount", default, skip_serializing_if = "Option::is_none")]
    pub total_payment_amount: Option<Money>,
}

impl FinancingContract {
    /// flat contract with no supplied total
    pub fn new(id: impl Into<ContractId>, per_payment_amount: Money, term_length_months: i64) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            contract_type: String::new(),
            per_payment_amount,
            term_length_months,
            term_length_percentage: Rate::ZERO,
            total_payment_amount: None,
        }
    }

    pub fn with_total_payment_amount(mut self, total: Money) -> Self {
        self.total_payment_amount = Some(total);
        self
    }

    pub fn with_fee_percentage(mut self, fee: Rate) -> Self {
        self.term_length_percentage = fee;
        self
    }

    /// reject terms no schedule can be built from
    pub fn validate(&self) -> Result<()> {
        if self.term_length_months <= 0 {
            return Err(CashKickError::InvalidContract {
                contract_id: self.id.canonical(),
                reason: format!("term length must be positive, got {} months", self.term_length_months),
            });
        }

        if i32::try_from(self.term_length_months).is_err() {
            return Err(CashKickError::InvalidContract {
                contract_id: self.id.canonical(),
                reason: format!("term length of {} months is out of range", self.term_length_months),
            });
        }

        if !self.per_payment_amount.is_positive() {
            return Err(CashKickError::InvalidContract {
                contract_id: self.id.canonical(),
                reason: format!("per payment amount must be positive, got {}", self.per_payment_amount),
            });
        }

        Ok(())
    }

    /// number of payments, zero for terms that fail [`FinancingContract::validate`]
    pub fn term_months(&self) -> u32 {
        u32::try_from(self.term_length_months).unwrap_or(0)
    }

    /// per payment amount times term length
    pub fn computed_total(&self) -> Money {
        self.per_payment_amount.times(self.term_months())
    }

    /// fee implied by the fee rate on the computed total
    pub fn fee_amount(&self) -> Money {
        self.computed_total().apply(self.term_length_percentage)
    }
}

/// a cash kick drawn against the user's contracts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashKickDraw {
    pub id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub name: String,
    pub status: DrawStatus,
    #[serde(alias = "maturity", with = "crate::date_math::calendar_date")]
    pub maturity_date: NaiveDate,
    #[serde(alias = "totalRecievedPercentage", with = "crate::decimal::percentage", default)]
    pub total_received_percentage: Rate,
    pub total_financed: Money,
    pub total_received: Money,
}

impl CashKickDraw {
    pub fn is_active(&self) -> bool {
        self.status == DrawStatus::Active
    }

    /// remaining balance, never below zero
    pub fn outstanding(&self) -> Money {
        (self.total_financed - self.total_received).max(Money::ZERO)
    }

    /// check `0 <= total_received <= total_financed`
    pub fn validate(&self) -> Result<()> {
        if self.total_financed.is_negative() || self.total_received.is_negative() {
            return Err(CashKickError::InvalidData {
                message: format!("draw {} has negative amounts", self.id),
            });
        }

        if self.total_received > self.total_financed {
            return Err(CashKickError::InvalidData {
                message: format!(
                    "draw {} received {} exceeds financed {}",
                    self.id, self.total_received, self.total_financed
                ),
            });
        }

        Ok(())
    }
}

/// account level figures
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    #[serde(alias = "availbleCredit", default)]
    pub available_credit: Money,
}

impl Account {
    pub fn with_available_credit(available_credit: Money) -> Self {
        Self {
            id: None,
            available_credit,
        }
    }
}

/// one row of the user-to-contracts association table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedContracts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub user_id: UserId,
    #[serde(default)]
    pub contract_ids: Vec<IdRef>,
}

/// user id to selected contract ids, keyed by canonical user id
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Vec<SelectedContracts>")]
pub struct SelectedContractsMapping {
    entries: HashMap<String, Vec<IdRef>>,
}

impl SelectedContractsMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// rows for the same user concatenate in row order
    pub fn from_records(records: impl IntoIterator<Item = SelectedContracts>) -> Self {
        let mut mapping = Self::new();
        for record in records {
            mapping.insert(&record.user_id, record.contract_ids);
        }
        mapping
    }

    pub fn insert(&mut self, user_id: &UserId, ids: impl IntoIterator<Item = IdRef>) {
        self.entries
            .entry(user_id.canonical())
            .or_default()
            .extend(ids);
    }

    pub fn get(&self, user_id: &UserId) -> Option<&[IdRef]> {
        self.entries.get(&user_id.canonical()).map(Vec::as_slice)
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        self.entries.contains_key(&user_id.canonical())
    }

    /// ids to request from the data source, in mapping order
    pub fn contract_ids_for(&self, user_id: &UserId) -> Vec<ContractId> {
        self.get(user_id)
            .map(|refs| refs.iter().map(|r| r.id().clone()).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<SelectedContracts>> for SelectedContractsMapping {
    fn from(records: Vec<SelectedContracts>) -> Self {
        Self::from_records(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_contract_decodes_legacy_keys() {
        let contract: FinancingContract = serde_json::from_value(json!({
            "id": 1,
            "name": "Contract 1",
            "type": "Monthly",
            "perPayment": 1000,
            "termLengthMonths": 12,
            "termLengthPercentage": 10,
            "paymentAmount": 12000
        }))
        .unwrap();

        assert_eq!(contract.id, Id::from("1"));
        assert_eq!(contract.contract_type, "Monthly");
        assert_eq!(contract.per_payment_amount, Money::from_major(1_000));
        assert_eq!(contract.term_length_percentage, Rate::from_percentage(dec!(10)));
        assert_eq!(contract.total_payment_amount, Some(Money::from_major(12_000)));
        assert_eq!(contract.computed_total(), Money::from_major(12_000));
        assert_eq!(contract.fee_amount(), Money::from_major(1_200));
    }

    #[test]
    fn test_contract_validation() {
        assert!(FinancingContract::new(1, Money::from_major(1_000), 12).validate().is_ok());

        let zero_term = FinancingContract::new(1, Money::from_major(1_000), 0);
        assert!(matches!(
            zero_term.validate(),
            Err(CashKickError::InvalidContract { .. })
        ));
        assert_eq!(zero_term.computed_total(), Money::ZERO);

        let negative_term = FinancingContract::new(1, Money::from_major(1_000), -3);
        assert!(negative_term.validate().is_err());

        let endless = FinancingContract::new(1, Money::from_major(1_000), 5_000_000_000);
        assert!(matches!(
            endless.validate(),
            Err(CashKickError::InvalidContract { .. })
        ));

        let free = FinancingContract::new(1, Money::ZERO, 12);
        assert!(free.validate().is_err());
    }

    #[test]
    fn test_draw_decoding_and_outstanding() {
        let draw: CashKickDraw = serde_json::from_value(json!({
            "id": 1,
            "name": "Cashkick 1",
            "status": "Active",
            "maturity": "2024-12-31",
            "totalRecievedPercentage": 80,
            "totalFinanced": 8000,
            "totalReceived": 6400
        }))
        .unwrap();

        assert!(draw.is_active());
        assert_eq!(draw.user_id, None);
        assert_eq!(draw.maturity_date, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!(draw.total_received_percentage, Rate::from_percentage(dec!(80)));
        assert_eq!(draw.outstanding(), Money::from_major(1_600));
        assert!(draw.validate().is_ok());
    }

    #[test]
    fn test_draw_overpaid_is_invalid_and_floored() {
        let draw: CashKickDraw = serde_json::from_value(json!({
            "id": "9",
            "userId": 1,
            "status": "Completed",
            "maturityDate": "2024-06-30",
            "totalFinanced": 100,
            "totalReceived": 150
        }))
        .unwrap();

        assert!(draw.validate().is_err());
        assert_eq!(draw.outstanding(), Money::ZERO);
    }

    #[test]
    fn test_account_decodes_legacy_key() {
        let account: Account = serde_json::from_value(json!({ "availbleCredit": 50000 })).unwrap();
        assert_eq!(account.available_credit, Money::from_major(50_000));
    }

    #[test]
    fn test_mapping_from_records() {
        let mapping: SelectedContractsMapping = serde_json::from_value(json!([
            { "id": "1", "userId": 2, "contractIds": ["1", "2"] },
            { "id": "2", "userId": "2", "contractIds": [{ "id": 3, "amount": 3000 }] },
            { "id": "3", "userId": 3, "contractIds": [1, 2, 3] }
        ]))
        .unwrap();

        assert_eq!(mapping.len(), 2);
        assert!(mapping.contains(&Id::from(2)));
        assert!(!mapping.contains(&Id::from(999)));

        let ids: Vec<String> = mapping
            .contract_ids_for(&Id::from("2"))
            .iter()
            .map(Id::canonical)
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert!(mapping.contract_ids_for(&Id::from(999)).is_empty());
    }
}
