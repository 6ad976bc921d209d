use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LendingError, Result};
use crate::types::{CustomerCategory, DocumentKind};

/// underwriting policy consumed by the lifecycle guards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// credit scores below this are rejected outright
    pub min_credit_score: u32,
    /// hard ceiling on the request as a multiple of the pre-approved limit
    pub max_limit_multiple: Decimal,
    /// largest share of monthly salary an EMI may take
    pub max_emi_to_income: Decimal,
    /// documents that must be on file for automatic approval
    pub required_documents: Vec<DocumentKind>,
    /// customer categories that are never approved without manual review
    pub review_categories: Vec<CustomerCategory>,
    pub risk_tiers: Vec<RiskTier>,
}

/// credit-score band with its pricing and tenure cap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskTier {
    pub label: String,
    pub min_score: u32,
    /// percentage points added to the requested annual rate
    pub rate_spread: Decimal,
    pub max_tenure_months: u32,
}

impl RiskTier {
    pub fn new(label: &str, min_score: u32, rate_spread: Decimal, max_tenure_months: u32) -> Self {
        Self {
            label: label.to_string(),
            min_score,
            rate_spread,
            max_tenure_months,
        }
    }
}

impl PolicyConfig {
    /// retail personal-loan policy
    pub fn standard() -> Self {
        Self {
            min_credit_score: 650,
            max_limit_multiple: dec!(2),
            max_emi_to_income: dec!(0.5),
            required_documents: vec![DocumentKind::SalarySlip, DocumentKind::BankStatement],
            review_categories: vec![CustomerCategory::Risk],
            risk_tiers: vec![
                RiskTier::new("Excellent", 800, dec!(-0.5), 72),
                RiskTier::new("Low Risk", 750, dec!(0), 60),
                RiskTier::new("Medium Risk", 700, dec!(1.5), 48),
                RiskTier::new("High Risk", 650, dec!(3.5), 24),
            ],
        }
    }

    /// parse and validate a policy; omitted fields take the standard values
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PolicyConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(300..=900).contains(&self.min_credit_score) {
            return Err(invalid(format!(
                "min_credit_score must be between 300 and 900, got {}",
                self.min_credit_score
            )));
        }
        if self.max_limit_multiple < Decimal::ONE {
            return Err(invalid(format!(
                "max_limit_multiple must be at least 1, got {}",
                self.max_limit_multiple
            )));
        }
        if self.max_emi_to_income <= Decimal::ZERO || self.max_emi_to_income > Decimal::ONE {
            return Err(invalid(format!(
                "max_emi_to_income must be in (0, 1], got {}",
                self.max_emi_to_income
            )));
        }

        for (i, tier) in self.risk_tiers.iter().enumerate() {
            if tier.label.trim().is_empty() {
                return Err(invalid("risk tier label must not be empty".to_string()));
            }
            if tier.max_tenure_months == 0 {
                return Err(invalid(format!("risk tier {} has a zero tenure cap", tier.label)));
            }
            if self.risk_tiers[..i].iter().any(|other| other.min_score == tier.min_score) {
                return Err(invalid(format!(
                    "duplicate risk tier threshold {}",
                    tier.min_score
                )));
            }
        }

        Ok(())
    }

    /// highest tier whose threshold the score meets
    pub fn risk_tier(&self, credit_score: u32) -> Option<&RiskTier> {
        self.risk_tiers
            .iter()
            .filter(|tier| credit_score >= tier.min_score)
            .max_by_key(|tier| tier.min_score)
    }

    /// largest amount that can ever be approved against a pre-approved limit
    ///
    /// Saturates at `Decimal::MAX`.
    pub fn hard_cap(&self, pre_approved_limit: Money) -> Money {
        pre_approved_limit
            .as_decimal()
            .checked_mul(self.max_limit_multiple)
            .map_or(Money::from_decimal(Decimal::MAX), Money::from_decimal)
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::standard()
    }
}

fn invalid(message: String) -> LendingError {
    LendingError::InvalidConfiguration { message }
}
