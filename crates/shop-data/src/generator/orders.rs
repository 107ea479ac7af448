//! Order generation bound to an existing customer population.

use chrono::{NaiveDateTime, TimeDelta};
use rand::Rng;
use rand::seq::IndexedRandom;
use rand_distr::{Distribution, LogNormal};

use crate::config::GenerationConfig;
use crate::error::GenerationError;
use crate::records::{Customer, Order, OrderStatus};
use crate::sampling::{clamp_to_cents, uniform_timestamp, weighted_choice};

/// Relative frequency of each order status (4:2:1:1).
pub const STATUS_WEIGHTS: [(OrderStatus, f64); 4] = [
    (OrderStatus::Completed, 4.0),
    (OrderStatus::Pending, 2.0),
    (OrderStatus::Cancelled, 1.0),
    (OrderStatus::Refunded, 1.0),
];

/// Log-space mean of the order amount; puts the median near 74 EUR.
pub const AMOUNT_LOG_MEAN: f64 = 4.3;

/// Log-space standard deviation of the order amount.
pub const AMOUNT_LOG_SIGMA: f64 = 0.7;

/// Smallest absolute order value.
pub const MIN_ORDER_AMOUNT: f64 = 10.0;

/// Largest absolute order value.
pub const MAX_ORDER_AMOUNT: f64 = 500.0;

/// Longest delay, in hours, before an order's last update.
const MAX_UPDATE_LAG_HOURS: i64 = 72;

/// Generates `config.order_count` orders placed by `customers`.
///
/// Each order picks a customer uniformly and is dated no earlier than that
/// customer's creation. Refunded orders carry negative amounts.
///
/// # Errors
///
/// Returns [`GenerationError::NoCustomers`] when `customers` is empty and
/// [`GenerationError::Distribution`] if a sampling table is invalid.
pub fn generate_orders<R>(
    rng: &mut R,
    config: &GenerationConfig,
    customers: &[Customer],
    loaded_at: NaiveDateTime,
) -> Result<Vec<Order>, GenerationError>
where
    R: Rng + ?Sized,
{
    if customers.is_empty() {
        return Err(GenerationError::NoCustomers);
    }
    let amounts = LogNormal::new(AMOUNT_LOG_MEAN, AMOUNT_LOG_SIGMA)
        .map_err(|err| GenerationError::distribution("log-normal", err))?;
    let range_start = config.range_start();
    let range_end = config.range_end();
    let mut orders = Vec::with_capacity(config.order_count);

    for order_id in (1..).take(config.order_count) {
        let customer = customers.choose(rng).ok_or(GenerationError::NoCustomers)?;
        let earliest = customer.created_at.max(range_start);
        let order_date = uniform_timestamp(rng, earliest, range_end);
        let status = weighted_choice(rng, &STATUS_WEIGHTS, "order status")?;
        let amount = clamp_to_cents(amounts.sample(rng), MIN_ORDER_AMOUNT, MAX_ORDER_AMOUNT);
        let total_amount = if status == OrderStatus::Refunded {
            -amount
        } else {
            amount
        };
        let update_lag = TimeDelta::hours(rng.random_range(0..=MAX_UPDATE_LAG_HOURS));

        orders.push(Order {
            order_id,
            customer_id: customer.customer_id,
            order_date,
            total_amount,
            status,
            created_at: order_date,
            updated_at: order_date + update_lag,
            loaded_at,
        });
    }

    Ok(orders)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rust_decimal::Decimal;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::generator::customers::generate_customers;

    struct Generated {
        customers: Vec<Customer>,
        orders: Vec<Order>,
        config: GenerationConfig,
    }

    fn loaded_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 2, 7)
            .and_then(|date| date.and_hms_opt(9, 30, 0))
            .expect("valid timestamp")
    }

    #[fixture]
    fn generated() -> Generated {
        let config = GenerationConfig {
            customer_count: 100,
            order_count: 2_000,
            ..GenerationConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let customers =
            generate_customers(&mut rng, &config, loaded_at()).expect("customers generate");
        let orders =
            generate_orders(&mut rng, &config, &customers, loaded_at()).expect("orders generate");
        Generated {
            customers,
            orders,
            config,
        }
    }

    #[rstest]
    fn generates_requested_count_with_sequential_ids(generated: Generated) {
        assert_eq!(generated.orders.len(), 2_000);
        for (expected, order) in (1..).zip(&generated.orders) {
            assert_eq!(order.order_id, expected);
        }
    }

    #[rstest]
    fn orders_never_predate_their_customer(generated: Generated) {
        let created: HashMap<u32, NaiveDateTime> = generated
            .customers
            .iter()
            .map(|c| (c.customer_id, c.created_at))
            .collect();

        for order in &generated.orders {
            let customer_created = created
                .get(&order.customer_id)
                .expect("order references a generated customer");
            assert!(order.order_date >= *customer_created, "{order:?}");
            assert!(order.order_date >= generated.config.range_start());
            assert!(order.order_date <= generated.config.range_end());
        }
    }

    #[rstest]
    fn amounts_are_clamped_and_signed_by_status(generated: Generated) {
        let min = Decimal::new(1_000, 2);
        let max = Decimal::new(50_000, 2);

        for order in &generated.orders {
            let magnitude = order.total_amount.abs();
            assert!(magnitude >= min && magnitude <= max, "{order:?}");
            assert_eq!(
                order.total_amount.is_sign_negative(),
                order.status == OrderStatus::Refunded,
                "{order:?}"
            );
            assert!(order.total_amount.scale() <= 2);
        }
    }

    #[rstest]
    fn timestamps_follow_order_date(generated: Generated) {
        for order in &generated.orders {
            assert_eq!(order.created_at, order.order_date);
            let lag = order.updated_at - order.order_date;
            assert!(lag >= TimeDelta::zero() && lag <= TimeDelta::hours(72));
        }
    }

    #[rstest]
    fn status_frequencies_follow_weights(generated: Generated) {
        let completed = generated
            .orders
            .iter()
            .filter(|o| o.status == OrderStatus::Completed)
            .count();
        let refunded = generated
            .orders
            .iter()
            .filter(|o| o.status == OrderStatus::Refunded)
            .count();

        // Expected 1000 completed and 250 refunded out of 2000.
        assert!((850..=1_150).contains(&completed), "completed={completed}");
        assert!((150..=350).contains(&refunded), "refunded={refunded}");
    }

    #[test]
    fn rejects_empty_customer_population() {
        let config = GenerationConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let result = generate_orders(&mut rng, &config, &[], loaded_at());
        assert_eq!(result, Err(GenerationError::NoCustomers));
    }
}
