//! Generated record types and their categorical attributes.
//!
//! Field names and textual encodings match the CSV columns consumed by the
//! warehouse loader.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;

/// Customer country of residence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Country {
    /// France.
    France,
    /// Germany.
    Germany,
    /// Spain.
    Spain,
    /// Italy.
    Italy,
    /// Belgium.
    Belgium,
    /// The Netherlands.
    Netherlands,
    /// The United Kingdom.
    #[serde(rename = "UK")]
    UnitedKingdom,
    /// Switzerland.
    Switzerland,
}

impl Country {
    /// Returns the label written to CSV.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::France => "France",
            Self::Germany => "Germany",
            Self::Spain => "Spain",
            Self::Italy => "Italy",
            Self::Belgium => "Belgium",
            Self::Netherlands => "Netherlands",
            Self::UnitedKingdom => "UK",
            Self::Switzerland => "Switzerland",
        }
    }
}

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Paid and fulfilled.
    Completed,
    /// Awaiting payment or fulfilment.
    Pending,
    /// Cancelled before fulfilment.
    Cancelled,
    /// Refunded; recorded as negative revenue.
    Refunded,
}

impl OrderStatus {
    /// Returns the label written to CSV.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Pending => "pending",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }
}

/// Acquisition channel of an analytics session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficSource {
    /// Unpaid search traffic.
    Organic,
    /// Paid campaign traffic; the only source carrying a campaign.
    Paid,
    /// Typed-in or bookmarked visits.
    Direct,
    /// Links from other sites.
    Referral,
    /// Social network traffic.
    Social,
}

impl TrafficSource {
    /// Returns the label written to CSV.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Organic => "organic",
            Self::Paid => "paid",
            Self::Direct => "direct",
            Self::Referral => "referral",
            Self::Social => "social",
        }
    }
}

/// Marketing medium of an analytics session.
///
/// Drawn independently of [`TrafficSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Medium {
    /// Google properties.
    Google,
    /// Facebook.
    Facebook,
    /// Instagram.
    Instagram,
    /// Email newsletters.
    Email,
    /// No medium.
    Direct,
    /// Referring site.
    Referral,
    /// LinkedIn.
    Linkedin,
}

/// A generated customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Customer {
    /// Sequential identifier starting at 1.
    pub customer_id: u32,
    /// Contact email address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Country of residence.
    pub country: Country,
    /// Account creation time.
    #[serde(serialize_with = "csv_text::timestamp")]
    pub created_at: NaiveDateTime,
    /// Last profile update; never earlier than `created_at`.
    #[serde(serialize_with = "csv_text::timestamp")]
    pub updated_at: NaiveDateTime,
    /// Ingestion timestamp.
    #[serde(rename = "_loaded_at", serialize_with = "csv_text::loaded_at")]
    pub loaded_at: NaiveDateTime,
}

/// A generated order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    /// Sequential identifier starting at 1.
    pub order_id: u32,
    /// Identifier of the ordering customer.
    pub customer_id: u32,
    /// Time the order was placed.
    #[serde(serialize_with = "csv_text::timestamp")]
    pub order_date: NaiveDateTime,
    /// Order value in euros; negative for refunds.
    #[serde(serialize_with = "csv_text::money")]
    pub total_amount: Decimal,
    /// Order status.
    pub status: OrderStatus,
    /// Record creation time, equal to `order_date`.
    #[serde(serialize_with = "csv_text::timestamp")]
    pub created_at: NaiveDateTime,
    /// Last status change, up to 72 hours after `order_date`.
    #[serde(serialize_with = "csv_text::timestamp")]
    pub updated_at: NaiveDateTime,
    /// Ingestion timestamp.
    #[serde(rename = "_loaded_at", serialize_with = "csv_text::loaded_at")]
    pub loaded_at: NaiveDateTime,
}

/// A generated web-analytics session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Identifier of the form `session_{n}`.
    pub session_id: String,
    /// Visitor identifier of the form `user_{k}`; not tied to a customer.
    pub user_id: String,
    /// Session start time.
    #[serde(serialize_with = "csv_text::timestamp")]
    pub session_date: NaiveDateTime,
    /// Pages viewed, between 1 and 20.
    pub page_views: u32,
    /// Time on site, at least 10 seconds.
    pub session_duration_seconds: u32,
    /// Acquisition channel.
    pub source: TrafficSource,
    /// Marketing medium.
    pub medium: Medium,
    /// Campaign label, present only for paid traffic.
    pub campaign: Option<String>,
    /// Ingestion timestamp.
    #[serde(rename = "_loaded_at", serialize_with = "csv_text::loaded_at")]
    pub loaded_at: NaiveDateTime,
}

/// Daily performance of one ad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdPerformance {
    /// Identifier of the form `ad_{NNN}`.
    pub ad_id: String,
    /// Calendar day reported on.
    #[serde(serialize_with = "csv_text::date")]
    pub date: NaiveDate,
    /// Times the ad was shown.
    pub impressions: u32,
    /// Clicks, never more than impressions.
    pub clicks: u32,
    /// Spend in euros, independent of traffic.
    #[serde(serialize_with = "csv_text::money")]
    pub spend: Decimal,
    /// Conversions, never more than clicks.
    pub conversions: u32,
    /// Ingestion timestamp.
    #[serde(rename = "_loaded_at", serialize_with = "csv_text::loaded_at")]
    pub loaded_at: NaiveDateTime,
}

mod csv_text {
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal::Decimal;
    use serde::Serializer;

    pub(super) fn timestamp<S: Serializer>(
        value: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format("%Y-%m-%d %H:%M:%S"))
    }

    pub(super) fn loaded_at<S: Serializer>(
        value: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format("%Y-%m-%d %H:%M:%S%.6f"))
    }

    pub(super) fn date<S: Serializer>(value: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format("%Y-%m-%d"))
    }

    pub(super) fn money<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!("{value:.2}"))
    }
}
