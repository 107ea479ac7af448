//! Aggregate statistics reported after a generation run.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::generator::ShopDataset;
use crate::records::{Country, OrderStatus, TrafficSource};

/// Share of orders in one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusShare {
    /// Number of orders in the status.
    pub count: usize,
    /// Share of all orders, in percent, rounded to one decimal.
    pub percent: Decimal,
}

/// Headline figures describing a [`ShopDataset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSummary {
    /// Number of customers.
    pub customers: usize,
    /// Number of orders.
    pub orders: usize,
    /// Number of sessions.
    pub sessions: usize,
    /// Number of ad-performance rows.
    pub ad_performance_rows: usize,
    /// Customers per country.
    pub customers_by_country: BTreeMap<Country, usize>,
    /// Orders per status with their share.
    pub orders_by_status: BTreeMap<OrderStatus, StatusShare>,
    /// Sum of completed order amounts.
    pub completed_revenue: Decimal,
    /// Sessions per traffic source.
    pub sessions_by_source: BTreeMap<TrafficSource, usize>,
    /// Total ad spend.
    pub total_ad_spend: Decimal,
    /// Total ad conversions.
    pub total_conversions: u64,
}

impl DatasetSummary {
    /// Computes the summary of `dataset`.
    #[must_use]
    pub fn from_dataset(dataset: &ShopDataset) -> Self {
        let mut customers_by_country = BTreeMap::new();
        for customer in &dataset.customers {
            *customers_by_country.entry(customer.country).or_insert(0) += 1;
        }

        let mut status_counts: BTreeMap<OrderStatus, usize> = BTreeMap::new();
        for order in &dataset.orders {
            *status_counts.entry(order.status).or_insert(0) += 1;
        }
        let orders_by_status = status_counts
            .into_iter()
            .map(|(status, count)| {
                let share = StatusShare {
                    count,
                    percent: percent_of(count, dataset.orders.len()),
                };
                (status, share)
            })
            .collect();

        let completed_revenue = dataset
            .orders
            .iter()
            .filter(|order| order.status == OrderStatus::Completed)
            .map(|order| order.total_amount)
            .sum();

        let mut sessions_by_source = BTreeMap::new();
        for session in &dataset.sessions {
            *sessions_by_source.entry(session.source).or_insert(0) += 1;
        }

        Self {
            customers: dataset.customers.len(),
            orders: dataset.orders.len(),
            sessions: dataset.sessions.len(),
            ad_performance_rows: dataset.ad_performance.len(),
            customers_by_country,
            orders_by_status,
            completed_revenue,
            sessions_by_source,
            total_ad_spend: dataset.ad_performance.iter().map(|row| row.spend).sum(),
            total_conversions: dataset
                .ad_performance
                .iter()
                .map(|row| u64::from(row.conversions))
                .sum(),
        }
    }

    /// Total number of generated records.
    #[must_use]
    pub const fn total_records(&self) -> usize {
        self.customers + self.orders + self.sessions + self.ad_performance_rows
    }
}

fn percent_of(count: usize, total: usize) -> Decimal {
    if total == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(count) * Decimal::ONE_HUNDRED / Decimal::from(total)).round_dp(1)
}
