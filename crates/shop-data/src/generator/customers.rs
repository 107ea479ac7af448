//! Customer population generation.

use chrono::{NaiveDateTime, TimeDelta};
use fake::Fake;
use fake::faker::internet::raw::SafeEmail;
use fake::faker::name::raw::{FirstName, LastName};
use fake::locales::EN;
use rand::Rng;

use crate::config::GenerationConfig;
use crate::error::GenerationError;
use crate::records::{Country, Customer};
use crate::sampling::{uniform_timestamp, weighted_choice};

/// Relative frequency of each customer country; sums to 1.0.
pub const COUNTRY_WEIGHTS: [(Country, f64); 8] = [
    (Country::France, 0.30),
    (Country::Germany, 0.20),
    (Country::Spain, 0.15),
    (Country::Italy, 0.12),
    (Country::Belgium, 0.08),
    (Country::Netherlands, 0.07),
    (Country::UnitedKingdom, 0.05),
    (Country::Switzerland, 0.03),
];

/// Largest gap, in days, between account creation and the last profile update.
const MAX_UPDATE_LAG_DAYS: i64 = 10;

/// Generates `config.customer_count` customers.
///
/// Each customer is created uniformly within
/// [`GenerationConfig::customer_window_end`] of the range start and updated
/// 0–10 whole days later.
///
/// # Errors
///
/// Returns [`GenerationError::Distribution`] if the country table is invalid.
pub fn generate_customers<R>(
    rng: &mut R,
    config: &GenerationConfig,
    loaded_at: NaiveDateTime,
) -> Result<Vec<Customer>, GenerationError>
where
    R: Rng + ?Sized,
{
    let window_start = config.range_start();
    let window_end = config.customer_window_end();
    let mut customers = Vec::with_capacity(config.customer_count);

    for customer_id in (1..).take(config.customer_count) {
        let created_at = uniform_timestamp(rng, window_start, window_end);
        let email: String = SafeEmail(EN).fake_with_rng(rng);
        let first_name: String = FirstName(EN).fake_with_rng(rng);
        let last_name: String = LastName(EN).fake_with_rng(rng);
        let country = weighted_choice(rng, &COUNTRY_WEIGHTS, "country")?;
        let update_lag = TimeDelta::days(rng.random_range(0..=MAX_UPDATE_LAG_DAYS));

        customers.push(Customer {
            customer_id,
            email,
            first_name,
            last_name,
            country,
            created_at,
            updated_at: created_at + update_lag,
            loaded_at,
        });
    }

    Ok(customers)
}
