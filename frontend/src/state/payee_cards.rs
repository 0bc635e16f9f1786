use shared::{Payee, PaymentCycle};

use crate::services::masking::{mask_account_number, mask_owner_name};

/// A payee as shown on the payee screen, with sensitive fields masked
#[derive(Debug, Clone, PartialEq)]
pub struct PayeeCard {
    pub id: String,
    pub name: String,
    pub bank_name: String,
    pub account_number: String,
    pub owner_name: String,
    pub cycle: Option<PaymentCycle>,
    /// Cycle code, or the raw text when it is not a known cycle
    pub cycle_label: String,
    pub amount: Option<f64>,
}

impl PayeeCard {
    pub fn from_payee(payee: &Payee) -> Self {
        let cycle = PaymentCycle::parse(&payee.payment_cycle);
        Self {
            id: payee.id.clone(),
            name: payee.name.clone(),
            bank_name: payee.bank_name.clone(),
            account_number: mask_account_number(&payee.account_number),
            owner_name: mask_owner_name(&payee.owner_name),
            cycle,
            cycle_label: cycle
                .map(|c| c.code().to_string())
                .unwrap_or_else(|| payee.payment_cycle.trim().to_string()),
            amount: payee.amount,
        }
    }
}

pub fn payee_cards(payees: &[Payee]) -> Vec<PayeeCard> {
    payees.iter().map(PayeeCard::from_payee).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cards_mask_without_touching_the_payee() {
        let payee = Payee {
            id: "p1".to_string(),
            name: "Piano Academy".to_string(),
            bank_name: "Shinhan".to_string(),
            account_number: "110-123-456789".to_string(),
            owner_name: "김현아".to_string(),
            payment_cycle: "12m".to_string(),
            amount: Some(150000.0),
        };
        let cards = payee_cards(std::slice::from_ref(&payee));

        assert_eq!(cards[0].account_number, "***-***-**6789");
        assert_eq!(cards[0].owner_name, "김*아");
        assert_eq!(cards[0].cycle, Some(PaymentCycle::Yearly));
        assert_eq!(cards[0].cycle_label, "1Y");
        assert_eq!(payee.account_number, "110-123-456789");
        assert_eq!(payee.owner_name, "김현아");
    }
}
