//! Daily ad-performance grid generation.

use chrono::NaiveDateTime;
use rand::Rng;

use crate::config::GenerationConfig;
use crate::records::AdPerformance;
use crate::sampling::{to_cents, truncated_share};

const IMPRESSIONS: std::ops::RangeInclusive<u32> = 500..=15_000;
const CLICK_THROUGH_RATE: std::ops::RangeInclusive<f64> = 0.01..=0.05;
const CONVERSION_RATE: std::ops::RangeInclusive<f64> = 0.02..=0.10;
const DAILY_SPEND: std::ops::RangeInclusive<f64> = 20.0..=300.0;

/// Generates one row per ad per calendar day of the configured range.
///
/// Ads are emitted in order, each covering every day from the start to the
/// end date inclusive. Clicks and conversions are truncated rate shares of
/// their parent count; spend is drawn independently of traffic.
pub fn generate_ad_performance<R>(
    rng: &mut R,
    config: &GenerationConfig,
    loaded_at: NaiveDateTime,
) -> Vec<AdPerformance>
where
    R: Rng + ?Sized,
{
    let days: Vec<_> = config.calendar_days().collect();
    let mut rows = Vec::with_capacity(days.len().saturating_mul(config.ad_count));

    for ad_number in 1..=config.ad_count {
        let ad_id = format!("ad_{ad_number:03}");
        for date in &days {
            let impressions = rng.random_range(IMPRESSIONS);
            let clicks = truncated_share(impressions, rng.random_range(CLICK_THROUGH_RATE));
            let conversions = truncated_share(clicks, rng.random_range(CONVERSION_RATE));
            let spend = to_cents(rng.random_range(DAILY_SPEND));

            rows.push(AdPerformance {
                ad_id: ad_id.clone(),
                date: *date,
                impressions,
                clicks,
                spend,
                conversions,
                loaded_at,
            });
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rust_decimal::Decimal;
    use rstest::rstest;

    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, day).expect("valid date")
    }

    fn generate(ad_count: usize, start: NaiveDate, end: NaiveDate) -> Vec<AdPerformance> {
        let config = GenerationConfig {
            ad_count,
            start_date: start,
            end_date: end,
            ..GenerationConfig::default()
        };
        let loaded_at = config.range_start();
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        generate_ad_performance(&mut rng, &config, loaded_at)
    }

    #[rstest]
    #[case(2, 1, 3, 6)]
    #[case(1, 1, 1, 1)]
    #[case(5, 27, 29, 15)]
    fn forms_an_exact_ad_by_day_grid(
        #[case] ads: usize,
        #[case] first_day: u32,
        #[case] last_day: u32,
        #[case] expected_rows: usize,
    ) {
        let rows = generate(ads, date(first_day), date(last_day));
        let keys: HashSet<(String, NaiveDate)> =
            rows.iter().map(|r| (r.ad_id.clone(), r.date)).collect();

        assert_eq!(rows.len(), expected_rows);
        assert_eq!(keys.len(), expected_rows, "no duplicate (ad, day) pairs");
        for ad_number in 1..=ads {
            for day in first_day..=last_day {
                assert!(keys.contains(&(format!("ad_{ad_number:03}"), date(day))));
            }
        }
    }

    #[test]
    fn funnel_counts_never_widen() {
        for row in generate(10, date(1), date(29)) {
            assert!((500..=15_000).contains(&row.impressions), "{row:?}");
            assert!(row.clicks <= row.impressions, "{row:?}");
            assert!(row.conversions <= row.clicks, "{row:?}");
            // A 1% minimum CTR on 500 impressions yields at least 5 clicks.
            assert!(row.clicks >= 5, "{row:?}");
        }
    }

    #[test]
    fn spend_is_bounded_and_in_cents() {
        let min = Decimal::new(2_000, 2);
        let max = Decimal::new(30_000, 2);

        for row in generate(4, date(1), date(10)) {
            assert!(row.spend >= min && row.spend <= max, "{row:?}");
            assert!(row.spend.scale() <= 2);
        }
    }

    #[test]
    fn ad_ids_are_zero_padded() {
        let rows = generate(12, date(1), date(1));
        assert_eq!(rows.first().map(|r| r.ad_id.as_str()), Some("ad_001"));
        assert_eq!(rows.last().map(|r| r.ad_id.as_str()), Some("ad_012"));
    }
}
