//! Spending statistics: grand total plus ranked totals per merchant,
//! payment method, payment cycle and category.

use shared::aggregation::{ranked_totals, total_amount, GroupBy};
use shared::{
    CategoryTotal, MerchantTotal, PaymentCycleTotal, PaymentMethodTotal, StatisticsResponse,
    Transaction,
};

#[derive(Clone, Default)]
pub struct StatisticsService;

impl StatisticsService {
    pub fn new() -> Self {
        Self
    }

    pub fn statistics(&self, transactions: &[Transaction]) -> StatisticsResponse {
        StatisticsResponse {
            total_amount: total_amount(transactions),
            merchant_totals: ranked_totals(transactions, GroupBy::Merchant)
                .into_iter()
                .map(|(merchant, total)| MerchantTotal { merchant, total })
                .collect(),
            payment_totals: ranked_totals(transactions, GroupBy::PaymentMethod)
                .into_iter()
                .map(|(payment_method, total)| PaymentMethodTotal { payment_method, total })
                .collect(),
            cycle_totals: ranked_totals(transactions, GroupBy::PaymentCycle)
                .into_iter()
                .map(|(payment_cycle, total)| PaymentCycleTotal { payment_cycle, total })
                .collect(),
            category_totals: ranked_totals(transactions, GroupBy::Category)
                .into_iter()
                .map(|(category, total)| CategoryTotal { category, total })
                .collect(),
        }
    }
}
