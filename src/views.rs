use crate::model::PlayEvent;
use crate::normalize::round3;
use std::cmp::Ordering;
use std::collections::HashMap;
use time::{Date, PrimitiveDateTime};

pub const TOP_ROWS: usize = 10;
/// The word cloud draws from a much deeper pool than the ranked tables.
pub const CLOUD_ROWS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityColumn {
    Artist,
    Track,
}

impl EntityColumn {
    pub fn label(self) -> &'static str {
        match self {
            Self::Artist => "artists",
            Self::Track => "tracks",
        }
    }

    fn value(self, event: &PlayEvent) -> Option<&str> {
        match self {
            Self::Artist => event.artist.as_deref(),
            Self::Track => event.track.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityRow {
    pub name: String,
    pub plays: u64,
    pub hours: f64,
    pub minutes: f64,
}

#[derive(Debug, Clone, Default)]
pub struct EntityBreakdown {
    /// Distinct non-null values.
    pub unique: usize,
    /// Total non-null occurrences.
    pub total: usize,
    pub unique_percentage: f64,
    /// Empty when the dataset has no duration column.
    pub top_by_time: Vec<EntityRow>,
    pub top_by_plays: Vec<EntityRow>,
}

/// Aggregates one entity column: uniqueness ratio plus the two top-10
/// tables. Ties keep first-appearance order (the sorts are stable and the
/// rows are accumulated in input order).
pub fn entity_breakdown(
    events: &[PlayEvent],
    column: EntityColumn,
    has_duration: bool,
) -> EntityBreakdown {
    let mut rows: Vec<EntityRow> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut total = 0_usize;

    for event in events {
        let Some(name) = column.value(event) else {
            continue;
        };
        total += 1;
        let slot = *index.entry(name).or_insert_with(|| {
            rows.push(EntityRow {
                name: name.to_string(),
                plays: 0,
                hours: 0.0,
                minutes: 0.0,
            });
            rows.len() - 1
        });
        let row = &mut rows[slot];
        row.plays += 1;
        if let Some(hours) = event.hours_played {
            row.hours = round3(row.hours + hours);
        }
        if let Some(minutes) = event.minutes_played {
            row.minutes = round3(row.minutes + minutes);
        }
    }

    let unique = rows.len();
    let unique_percentage = if total == 0 {
        0.0
    } else {
        unique as f64 / total as f64 * 100.0
    };

    let mut top_by_plays = rows.clone();
    top_by_plays.sort_by(|a, b| b.plays.cmp(&a.plays));
    top_by_plays.truncate(TOP_ROWS);

    let top_by_time = if has_duration {
        let mut by_time = rows;
        by_time.sort_by(|a, b| b.hours.partial_cmp(&a.hours).unwrap_or(Ordering::Equal));
        by_time.truncate(TOP_ROWS);
        by_time
    } else {
        Vec::new()
    };

    EntityBreakdown {
        unique,
        total,
        unique_percentage,
        top_by_time,
        top_by_plays,
    }
}

/// Play-count frequencies for the word cloud: the top [`CLOUD_ROWS`]
/// entities by play count, descending, ties in first-appearance order.
pub fn cloud_frequencies(events: &[PlayEvent], column: EntityColumn) -> Vec<(String, u64)> {
    let mut rows: Vec<(String, u64)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for event in events {
        let Some(name) = column.value(event) else {
            continue;
        };
        match index.get(name) {
            Some(&slot) => rows[slot].1 += 1,
            None => {
                index.insert(name, rows.len());
                rows.push((name.to_string(), 1));
            }
        }
    }
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    rows.truncate(CLOUD_ROWS);
    rows
}

#[derive(Debug, Clone, Default)]
pub struct DayWise {
    /// Weekday name with play count, descending by count.
    pub counts: Vec<(&'static str, u64)>,
    pub total: u64,
}

pub fn day_wise(events: &[PlayEvent]) -> DayWise {
    let mut counts: Vec<(&'static str, u64)> = Vec::new();
    for event in events {
        match counts
            .iter_mut()
            .find(|(name, _)| *name == event.weekday_name)
        {
            Some((_, count)) => *count += 1,
            None => counts.push((event.weekday_name, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    let total = counts.iter().map(|(_, count)| *count).sum();
    DayWise { counts, total }
}

#[derive(Debug, Clone)]
pub struct Hourly {
    pub buckets: [u64; 24],
    /// Gaussian-smoothed histogram, same scale as the buckets.
    pub density: [f64; 24],
}

pub fn hourly(events: &[PlayEvent]) -> Hourly {
    let mut buckets = [0_u64; 24];
    for event in events {
        buckets[usize::from(event.hour.min(23))] += 1;
    }
    let density = smooth(&buckets);
    Hourly { buckets, density }
}

/// Truncated Gaussian kernel over neighbouring hour buckets, renormalized at
/// the edges so a flat histogram smooths to itself.
fn smooth(buckets: &[u64; 24]) -> [f64; 24] {
    // exp(-d^2 / (2 * sigma^2)) with sigma = 1.5, offsets -3..=3.
    const KERNEL: [f64; 7] = [0.1353, 0.4111, 0.8007, 1.0, 0.8007, 0.4111, 0.1353];

    let mut density = [0.0_f64; 24];
    for (hour, slot) in density.iter_mut().enumerate() {
        let mut weighted = 0.0;
        let mut weight_sum = 0.0;
        for (offset, weight) in KERNEL.iter().enumerate() {
            let neighbour = hour as i64 + offset as i64 - 3;
            if !(0..24).contains(&neighbour) {
                continue;
            }
            weighted += buckets[neighbour as usize] as f64 * weight;
            weight_sum += weight;
        }
        *slot = if weight_sum > 0.0 {
            weighted / weight_sum
        } else {
            0.0
        };
    }
    density
}

#[derive(Debug, Clone, Default)]
pub struct ListeningTime {
    /// Sum of per-event listening hours; `None` without a duration column.
    pub total_hours: Option<f64>,
    /// Elapsed hours between the earliest and latest event.
    pub span_hours: Option<f64>,
    pub listening_percentage: Option<f64>,
    pub average_daily_plays: Option<u64>,
    pub busiest_day: Option<(Date, u64)>,
    /// Per-calendar-date play counts in date order.
    pub per_day: Vec<(Date, u64)>,
    /// Mean of the per-day counts, for the chart overlay.
    pub mean_daily_plays: f64,
    pub warnings: Vec<String>,
}

/// Aggregate listening-time statistics. Events are explicitly ordered by
/// timestamp before the span computation; upload order is not trusted.
pub fn listening_time(events: &[PlayEvent], has_duration: bool) -> ListeningTime {
    let mut out = ListeningTime::default();
    if events.is_empty() {
        out.warnings.push(String::from("no play events loaded"));
        return out;
    }

    if has_duration {
        let total: f64 = events.iter().filter_map(|event| event.hours_played).sum();
        out.total_hours = Some(round3(total));
    } else {
        out.warnings.push(String::from(
            "duration column missing; total listening time unavailable",
        ));
    }

    let mut stamps: Vec<PrimitiveDateTime> = events.iter().map(|event| event.played_at).collect();
    stamps.sort();
    let span_days = match (stamps.first(), stamps.last()) {
        (Some(first), Some(last)) if stamps.len() > 1 => {
            Some((*last - *first).as_seconds_f64() / 86_400.0)
        }
        _ => None,
    };
    match span_days {
        Some(days) if days > 0.0 => {
            let span_hours = days * 24.0;
            out.span_hours = Some(span_hours);
            if let Some(total) = out.total_hours {
                out.listening_percentage = Some(total / span_hours * 100.0);
            }
            out.average_daily_plays = Some((events.len() as f64 / days).round() as u64);
        }
        _ => {
            out.warnings.push(String::from(
                "not enough data to calculate listening time percentage",
            ));
        }
    }

    let mut per_day: Vec<(Date, u64)> = Vec::new();
    for stamp in &stamps {
        let date = stamp.date();
        match per_day.iter_mut().find(|(day, _)| *day == date) {
            Some((_, count)) => *count += 1,
            None => per_day.push((date, 1)),
        }
    }
    out.mean_daily_plays = events.len() as f64 / per_day.len() as f64;
    out.busiest_day = per_day
        .iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .copied();
    out.per_day = per_day;
    out
}
