//! Web-analytics session generation.
//!
//! Sessions model the wider visitor population: `user_id` is drawn from an
//! identifier space twice the size of the customer base and is never checked
//! against customers.

use chrono::NaiveDateTime;
use rand::Rng;
use rand::seq::IndexedRandom;
use rand_distr::{Distribution, Pareto};

use crate::config::GenerationConfig;
use crate::error::GenerationError;
use crate::records::{Medium, Session, TrafficSource};
use crate::sampling::{uniform_timestamp, weighted_choice};

/// Relative frequency of each traffic source; sums to 1.0.
pub const SOURCE_WEIGHTS: [(TrafficSource, f64); 5] = [
    (TrafficSource::Organic, 0.50),
    (TrafficSource::Paid, 0.33),
    (TrafficSource::Direct, 0.11),
    (TrafficSource::Referral, 0.055),
    (TrafficSource::Social, 0.005),
];

/// Media drawn uniformly for every session.
pub const MEDIA: [Medium; 7] = [
    Medium::Google,
    Medium::Facebook,
    Medium::Instagram,
    Medium::Email,
    Medium::Direct,
    Medium::Referral,
    Medium::Linkedin,
];

/// Number of labelled paid campaigns.
pub const CAMPAIGN_COUNT: u32 = 20;

/// Shape of the page-view power law.
pub const PAGE_VIEW_SHAPE: f64 = 2.0;

/// Most pages a single session can view.
pub const MAX_PAGE_VIEWS: u32 = 20;

/// Shortest recorded session.
pub const MIN_SESSION_SECONDS: i64 = 10;

const SECONDS_PER_PAGE: std::ops::RangeInclusive<i64> = 30..=120;
const DURATION_JITTER_SECONDS: std::ops::RangeInclusive<i64> = -20..=60;

/// Generates `config.session_count` analytics sessions.
///
/// Page views follow a Pareto law with scale 1, truncated to whole pages and
/// capped at [`MAX_PAGE_VIEWS`]. Duration scales with page views plus jitter
/// and is floored at [`MIN_SESSION_SECONDS`]. Only paid sessions carry a
/// campaign.
///
/// # Errors
///
/// Returns [`GenerationError::Distribution`] if a sampling table is invalid.
pub fn generate_sessions<R>(
    rng: &mut R,
    config: &GenerationConfig,
    loaded_at: NaiveDateTime,
) -> Result<Vec<Session>, GenerationError>
where
    R: Rng + ?Sized,
{
    let page_view_law = Pareto::new(1.0, PAGE_VIEW_SHAPE)
        .map_err(|err| GenerationError::distribution("pareto", err))?;
    let range_start = config.range_start();
    let range_end = config.range_end();
    let user_id_space = config.user_id_space().max(1);
    let mut sessions = Vec::with_capacity(config.session_count);

    for index in 1..=config.session_count {
        let session_date = uniform_timestamp(rng, range_start, range_end);
        let source = weighted_choice(rng, &SOURCE_WEIGHTS, "traffic source")?;
        let page_views = page_views_from(page_view_law.sample(rng));
        let seconds_per_page = rng.random_range(SECONDS_PER_PAGE);
        let jitter = rng.random_range(DURATION_JITTER_SECONDS);
        let user_number = rng.random_range(1..=user_id_space);
        let medium = *MEDIA
            .choose(rng)
            .ok_or_else(|| GenerationError::distribution("medium", "no media configured"))?;
        let campaign = if source == TrafficSource::Paid {
            Some(campaign_label(rng.random_range(1..=CAMPAIGN_COUNT)))
        } else {
            None
        };

        sessions.push(Session {
            session_id: format!("session_{index}"),
            user_id: format!("user_{user_number}"),
            session_date,
            page_views,
            session_duration_seconds: duration_seconds(page_views, seconds_per_page, jitter),
            source,
            medium,
            campaign,
            loaded_at,
        });
    }

    Ok(sessions)
}

/// Truncates a Pareto draw (always at least 1) to whole pages, capped.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is clamped to [1, MAX_PAGE_VIEWS] before the cast"
)]
fn page_views_from(draw: f64) -> u32 {
    let pages = draw.floor().clamp(1.0, f64::from(MAX_PAGE_VIEWS));
    pages as u32
}

fn duration_seconds(page_views: u32, seconds_per_page: i64, jitter: i64) -> u32 {
    let raw = i64::from(page_views) * seconds_per_page + jitter;
    u32::try_from(raw.max(MIN_SESSION_SECONDS)).unwrap_or(u32::MAX)
}

fn campaign_label(number: u32) -> String {
    format!("campaign_{number:02}")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rstest::{fixture, rstest};

    use super::*;

    fn loaded_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 2, 7)
            .and_then(|date| date.and_hms_opt(9, 30, 0))
            .expect("valid timestamp")
    }

    #[fixture]
    fn config() -> GenerationConfig {
        GenerationConfig {
            customer_count: 50,
            session_count: 3_000,
            ..GenerationConfig::default()
        }
    }

    fn generate(config: &GenerationConfig) -> Vec<Session> {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        generate_sessions(&mut rng, config, loaded_at()).expect("sessions generate")
    }

    #[rstest]
    #[case(1.0, 1)]
    #[case(1.999, 1)]
    #[case(2.0, 2)]
    #[case(19.7, 19)]
    #[case(20.0, 20)]
    #[case(4_000.0, 20)]
    fn page_views_truncate_and_cap(#[case] draw: f64, #[case] expected: u32) {
        assert_eq!(page_views_from(draw), expected);
    }

    #[rstest]
    #[case(1, 30, -20, 10)]
    #[case(1, 30, 60, 90)]
    #[case(3, 100, -20, 280)]
    #[case(20, 120, 60, 2_460)]
    fn duration_scales_with_pages_and_floors(
        #[case] pages: u32,
        #[case] per_page: i64,
        #[case] jitter: i64,
        #[case] expected: u32,
    ) {
        assert_eq!(duration_seconds(pages, per_page, jitter), expected);
    }

    #[test]
    fn campaign_labels_are_zero_padded() {
        assert_eq!(campaign_label(3), "campaign_03");
        assert_eq!(campaign_label(20), "campaign_20");
    }

    #[test]
    fn source_weights_sum_to_one() {
        let total: f64 = SOURCE_WEIGHTS.iter().map(|(_, weight)| weight).sum();
        assert!((total - 1.0).abs() < 1e-9, "weights sum to {total}");
    }

    #[rstest]
    fn engagement_metrics_stay_in_bounds(config: GenerationConfig) {
        for session in generate(&config) {
            assert!((1..=MAX_PAGE_VIEWS).contains(&session.page_views), "{session:?}");
            assert!(session.session_duration_seconds >= 10, "{session:?}");
            assert!(session.session_date >= config.range_start());
            assert!(session.session_date <= config.range_end());
        }
    }

    #[rstest]
    fn campaign_present_only_for_paid_traffic(config: GenerationConfig) {
        for session in generate(&config) {
            assert_eq!(
                session.campaign.is_some(),
                session.source == TrafficSource::Paid,
                "{session:?}"
            );
        }
    }

    #[rstest]
    fn user_ids_span_twice_the_customer_base(config: GenerationConfig) {
        let sessions = generate(&config);
        let numbers: Vec<usize> = sessions
            .iter()
            .filter_map(|s| s.user_id.strip_prefix("user_"))
            .map(|n| n.parse().expect("numeric user suffix"))
            .collect();

        assert_eq!(numbers.len(), sessions.len());
        assert!(numbers.iter().all(|n| (1..=100).contains(n)));
        assert!(numbers.iter().any(|n| *n > 50), "visitors beyond customers");
    }

    #[rstest]
    fn most_sessions_view_few_pages(config: GenerationConfig) {
        let sessions = generate(&config);
        let shallow = sessions.iter().filter(|s| s.page_views <= 3).count();

        // P(page_views <= 3) = 1 - 1/16 under shape 2.
        assert!(shallow * 10 > sessions.len() * 8, "shallow={shallow}");
    }

    #[rstest]
    fn session_ids_are_sequential(config: GenerationConfig) {
        let sessions = generate(&config);
        assert_eq!(
            sessions.first().map(|s| s.session_id.as_str()),
            Some("session_1")
        );
        assert_eq!(
            sessions.last().map(|s| s.session_id.as_str()),
            Some("session_3000")
        );
    }
}
