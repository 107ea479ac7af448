//! Sampling primitives shared by the generators.
//!
//! Every helper draws from the caller's RNG so that the order of draws per
//! record stays under the generator's control.

use chrono::{NaiveDateTime, TimeDelta};
use rand::Rng;
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;

use crate::error::GenerationError;

/// Draws one option from a fixed table of `(option, relative weight)` pairs.
///
/// # Errors
///
/// Returns [`GenerationError::Distribution`] when the table is empty or its
/// weights are invalid.
pub(crate) fn weighted_choice<T, R>(
    rng: &mut R,
    table: &[(T, f64)],
    name: &'static str,
) -> Result<T, GenerationError>
where
    T: Copy,
    R: Rng + ?Sized,
{
    table
        .choose_weighted(rng, |(_, weight)| *weight)
        .map(|(option, _)| *option)
        .map_err(|err| GenerationError::distribution(name, err))
}

/// Draws a timestamp uniformly between `start` and `end` at whole-second
/// resolution. A non-positive span yields `start`.
pub(crate) fn uniform_timestamp<R>(
    rng: &mut R,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> NaiveDateTime
where
    R: Rng + ?Sized,
{
    let span = (end - start).num_seconds();
    if span <= 0 {
        return start;
    }
    start + TimeDelta::seconds(rng.random_range(0..=span))
}

/// Forces `value` into `[min, max]` and rounds it to cents.
///
/// The clamp is a hard floor/ceiling, so out-of-range draws pile up on the
/// boundaries instead of being resampled.
pub(crate) fn clamp_to_cents(value: f64, min: f64, max: f64) -> Decimal {
    to_cents(value.clamp(min, max))
}

/// Rounds a finite value to two decimal places.
#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    reason = "generated amounts are bounded well inside i64 cents"
)]
pub(crate) fn to_cents(value: f64) -> Decimal {
    let cents = (value * 100.0).round() as i64;
    Decimal::new(cents, 2)
}

/// Truncates `count × rate` towards zero.
#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "rates lie in [0, 1] so the share never exceeds count"
)]
pub(crate) fn truncated_share(count: u32, rate: f64) -> u32 {
    (f64::from(count) * rate).floor() as u32
}
