//! Lenient parsing of recurrence rule text into a [`StructuredRule`].

use std::fmt;

/// Recurrence frequency as far as descriptions distinguish it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    /// Any other frequency, uppercased (`YEARLY`, `HOURLY`, ...).
    Other(String),
}

impl Frequency {
    fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "DAILY" => Self::Daily,
            "WEEKLY" => Self::Weekly,
            "MONTHLY" => Self::Monthly,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the frequency name as written in rule text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recurrence rule reduced to the parts the schedule interprets.
///
/// Multi-valued parts are always lists, single values included. Every
/// well-formed `KEY=value` pair is also kept in order in `components`, with
/// the key uppercased, so that uninterpreted parts survive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredRule {
    pub frequency: Frequency,
    /// Always at least 1.
    pub interval: u32,
    /// Weekday codes as written, e.g. `MO` or `-1FR`.
    pub by_day: Vec<String>,
    pub by_month_day: Vec<i32>,
    pub by_set_pos: Vec<i32>,
    pub components: Vec<(String, String)>,
}

impl StructuredRule {
    /// Returns the last value given for a key.
    #[must_use]
    pub fn component(&self, key: &str) -> Option<&str> {
        self.components
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// ## Summary
/// Parses rule text such as `FREQ=MONTHLY;BYDAY=MO;BYSETPOS=1`.
///
/// Keys are case-insensitive. Segments without `=`, empty segments and
/// empty keys are skipped, as are integers that do not parse inside
/// INTERVAL, BYMONTHDAY and BYSETPOS. An INTERVAL below 1 becomes 1.
///
/// Returns `None` if no frequency is given.
#[must_use]
#[tracing::instrument(level = "trace")]
pub fn parse_rule(raw: &str) -> Option<StructuredRule> {
    let mut components = Vec::new();

    for segment in raw.split(';').map(str::trim) {
        let Some((key, value)) = segment.split_once('=') else {
            if !segment.is_empty() {
                tracing::debug!(%segment, "Skipping rule segment without '='");
            }
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            tracing::debug!(%segment, "Skipping rule segment with empty key");
            continue;
        }
        components.push((key.to_ascii_uppercase(), value.trim().to_string()));
    }

    let mut frequency = None;
    let mut interval = 1;
    let mut by_day = Vec::new();
    let mut by_month_day = Vec::new();
    let mut by_set_pos = Vec::new();

    for (key, value) in &components {
        match key.as_str() {
            "FREQ" if !value.is_empty() => frequency = Some(Frequency::parse(value)),
            "INTERVAL" => {
                interval = value.parse::<i64>().ok().map_or(1, |n| {
                    u32::try_from(n).ok().filter(|n| *n >= 1).unwrap_or(1)
                });
            }
            "BYDAY" => by_day = split_values(value).map(str::to_string).collect(),
            "BYMONTHDAY" => by_month_day = parse_integers(key, value),
            "BYSETPOS" => by_set_pos = parse_integers(key, value),
            _ => {}
        }
    }

    let Some(frequency) = frequency else {
        tracing::debug!(rule = %raw, "Rule has no frequency");
        return None;
    };

    Some(StructuredRule {
        frequency,
        interval,
        by_day,
        by_month_day,
        by_set_pos,
        components,
    })
}

fn split_values(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|v| !v.is_empty())
}

fn parse_integers(key: &str, value: &str) -> Vec<i32> {
    split_values(value)
        .filter_map(|v| match v.parse::<i32>() {
            Ok(n) => Some(n),
            Err(_) => {
                tracing::debug!(%key, value = %v, "Skipping non-integer rule value");
                None
            }
        })
        .collect()
}
