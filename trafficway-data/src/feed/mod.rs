//! Live congestion feed decoding.
//!
//! Roadside workers publish one JSON object per observation:
//!
//! ```json
//! {"junction_id": 7, "latitude": 17.4435, "longitude": 78.3772,
//!  "congestion_level": "High", "vehicle_count": 21,
//!  "observed_at": "2025-10-01T08:15:00Z"}
//! ```
//!
//! `congestion_level` is optional; when absent the level is derived from
//! `vehicle_count`. Streams and snapshot files carry one object per line.
//!
//! [`read_events`] loads a snapshot strictly, failing on the first bad line.
//! [`pump_events`] forwards a live stream into a channel and skips bad lines
//! with a warning, since one broken sensor must not stall the others.

use std::io::{self, BufRead};

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Deserialize;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use trafficway_core::{
    CongestionLevel, GeoPoint, GeoPointError, JunctionId, JunctionState, ParseCongestionLevelError,
};

/// Errors raised while decoding feed events.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The line is not a well-formed event object.
    #[error("malformed feed event: {source}")]
    Json {
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// The junction position is out of range.
    #[error("invalid junction position: {source}")]
    Position {
        /// Validation error.
        #[source]
        source: GeoPointError,
    },
    /// The congestion level is not one of Low, Medium or High.
    #[error("invalid congestion level: {source}")]
    Level {
        /// Parse error.
        #[source]
        source: ParseCongestionLevelError,
    },
    /// A line of a snapshot failed to decode.
    #[error("line {line}: {source}")]
    Line {
        /// One-based line number.
        line: usize,
        /// Decoding failure.
        #[source]
        source: Box<FeedError>,
    },
    /// Reading the underlying stream failed.
    #[error("failed to read congestion feed: {source}")]
    Io {
        /// I/O error.
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Deserialize)]
struct FeedEvent {
    junction_id: JunctionId,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    congestion_level: Option<String>,
    vehicle_count: u32,
    observed_at: DateTime<Utc>,
}

impl TryFrom<FeedEvent> for JunctionState {
    type Error = FeedError;

    fn try_from(event: FeedEvent) -> Result<Self, Self::Error> {
        let point = GeoPoint::new(event.latitude, event.longitude)
            .map_err(|source| FeedError::Position { source })?;
        let congestion_level = match event.congestion_level.as_deref() {
            Some(label) => label
                .parse::<CongestionLevel>()
                .map_err(|source| FeedError::Level { source })?,
            None => CongestionLevel::from_vehicle_count(event.vehicle_count),
        };
        Ok(Self {
            id: event.junction_id,
            point,
            congestion_level,
            vehicle_count: event.vehicle_count,
            observed_at: event.observed_at,
        })
    }
}

/// Decode one feed event.
///
/// # Errors
///
/// Returns [`FeedError`] when the JSON is malformed, the position is out of
/// range or the level label is unknown.
///
/// # Examples
///
/// ```
/// use trafficway_core::CongestionLevel;
/// use trafficway_data::feed::decode_event;
///
/// let state = decode_event(
///     r#"{"junction_id": 3, "latitude": 51.5, "longitude": -0.1,
///         "vehicle_count": 18, "observed_at": "2025-10-01T08:15:00Z"}"#,
/// )?;
/// assert_eq!(state.congestion_level, CongestionLevel::High);
/// # Ok::<(), trafficway_data::feed::FeedError>(())
/// ```
pub fn decode_event(line: &str) -> Result<JunctionState, FeedError> {
    let event: FeedEvent =
        serde_json::from_str(line).map_err(|source| FeedError::Json { source })?;
    JunctionState::try_from(event)
}

/// Read every event from a snapshot, skipping blank lines.
///
/// # Errors
///
/// Returns [`FeedError::Line`] for the first line that fails to decode and
/// [`FeedError::Io`] when reading fails.
pub fn read_events<R: BufRead>(reader: R) -> Result<Vec<JunctionState>, FeedError> {
    let mut events = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let text = line.map_err(|source| FeedError::Io { source })?;
        if text.trim().is_empty() {
            continue;
        }
        let state = decode_event(&text).map_err(|source| FeedError::Line {
            line: index + 1,
            source: Box::new(source),
        })?;
        events.push(state);
    }
    Ok(events)
}

/// Totals reported by [`pump_events`] when the stream ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PumpSummary {
    /// Events forwarded to the channel.
    pub delivered: usize,
    /// Lines skipped because they failed to decode.
    pub skipped: usize,
}

/// Forward events from a live stream into `sink` until either side closes.
///
/// Malformed lines are logged and skipped. The function returns when the
/// stream reaches end of input or the receiving side of `sink` is dropped.
///
/// # Errors
///
/// Returns [`FeedError::Io`] when reading the stream fails.
pub async fn pump_events<R>(
    reader: R,
    sink: mpsc::Sender<JunctionState>,
) -> Result<PumpSummary, FeedError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut summary = PumpSummary::default();
    while let Some(text) = lines
        .next_line()
        .await
        .map_err(|source| FeedError::Io { source })?
    {
        if text.trim().is_empty() {
            continue;
        }
        match decode_event(&text) {
            Ok(state) => {
                if sink.send(state).await.is_err() {
                    info!("congestion feed consumer went away");
                    return Ok(summary);
                }
                summary.delivered += 1;
            }
            Err(err) => {
                warn!("skipping feed line: {err}");
                summary.skipped += 1;
            }
        }
    }
    info!(
        "congestion feed closed after {} events ({} skipped)",
        summary.delivered, summary.skipped
    );
    Ok(summary)
}
