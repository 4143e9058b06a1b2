//! Template rotation.
//!
//! # Responsibilities
//! - Choose which named template renders the HTML page
//! - Remember previous choices for policies that need them
//!
//! # Design Decisions
//! - The lock is held only while computing an index, never across I/O
//! - "On each request" never repeats the previous pick (shift by one on
//!   collision), which makes the distribution non-uniform for large N
//! - Daily/hourly buckets follow the local calendar

use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Datelike, Local, Timelike};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How the template is chosen across requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum RotationMode {
    /// Always the configured template.
    #[default]
    Disabled,
    /// Random template picked once, on first use.
    RandomOnStartup,
    /// Random template on every request, never the same twice in a row.
    RandomOnEachRequest,
    /// Random template, redrawn when the day changes.
    RandomDaily,
    /// Random template, redrawn when the hour changes.
    RandomHourly,
}

impl RotationMode {
    pub const ALL: [RotationMode; 5] = [
        RotationMode::Disabled,
        RotationMode::RandomOnStartup,
        RotationMode::RandomOnEachRequest,
        RotationMode::RandomDaily,
        RotationMode::RandomHourly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RotationMode::Disabled => "disabled",
            RotationMode::RandomOnStartup => "random-on-startup",
            RotationMode::RandomOnEachRequest => "random-on-each-request",
            RotationMode::RandomDaily => "random-daily",
            RotationMode::RandomHourly => "random-hourly",
        }
    }
}

impl fmt::Display for RotationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized rotation mode: {0:?}")]
pub struct UnknownRotationMode(pub String);

impl FromStr for RotationMode {
    type Err = UnknownRotationMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();

        if lower.is_empty() {
            return Ok(RotationMode::Disabled);
        }

        RotationMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == lower)
            .ok_or_else(|| UnknownRotationMode(s.to_string()))
    }
}

impl TryFrom<String> for RotationMode {
    type Error = UnknownRotationMode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RotationMode> for String {
    fn from(mode: RotationMode) -> Self {
        mode.as_str().to_string()
    }
}

/// Last choice, shared between requests.
#[derive(Debug, Default)]
struct RotationState {
    last_idx: Option<usize>,
    /// Calendar bucket (day or hour number) of the last draw.
    bucket: Option<i64>,
}

/// Picks a template name according to a [`RotationMode`].
#[derive(Debug)]
pub struct TemplatePicker {
    mode: RotationMode,
    fixed: String,
    names: Vec<String>,
    state: Mutex<RotationState>,
}

impl TemplatePicker {
    /// `names` are the rotation candidates, `fixed` is used when rotation is disabled.
    pub fn new(mode: RotationMode, names: Vec<String>, fixed: impl Into<String>) -> Self {
        Self {
            mode,
            fixed: fixed.into(),
            names,
            state: Mutex::new(RotationState::default()),
        }
    }

    pub fn mode(&self) -> RotationMode {
        self.mode
    }

    /// Pick the template name for the current moment.
    pub fn pick(&self) -> Option<String> {
        self.pick_at(Local::now())
    }

    /// Pick the template name as if the local time were `now`.
    pub fn pick_at(&self, now: DateTime<Local>) -> Option<String> {
        let len = self.names.len();

        let idx = match self.mode {
            RotationMode::Disabled => return Some(self.fixed.clone()).filter(|name| !name.is_empty()),
            _ if len == 0 => return None,
            RotationMode::RandomOnStartup => *self.state().last_idx.get_or_insert_with(|| draw(len)),
            RotationMode::RandomOnEachRequest => {
                let mut state = self.state();
                let mut idx = draw(len);
                if state.last_idx == Some(idx) {
                    idx = (idx + 1) % len;
                }
                state.last_idx = Some(idx);
                idx
            }
            RotationMode::RandomDaily | RotationMode::RandomHourly => {
                let bucket = self.bucket(now);
                let mut state = self.state();
                match state.last_idx {
                    Some(idx) if state.bucket == Some(bucket) => idx,
                    _ => {
                        let idx = draw(len);
                        state.last_idx = Some(idx);
                        state.bucket = Some(bucket);
                        tracing::debug!(mode = %self.mode, template = %self.names[idx], "Template rotated");
                        idx
                    }
                }
            }
        };

        Some(self.names[idx].clone())
    }

    fn state(&self) -> MutexGuard<'_, RotationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bucket(&self, now: DateTime<Local>) -> i64 {
        let day = i64::from(now.num_days_from_ce());

        match self.mode {
            RotationMode::RandomHourly => day * 24 + i64::from(now.hour()),
            _ => day,
        }
    }
}

fn draw(len: usize) -> usize {
    rand::thread_rng().gen_range(0..len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("template-{i}")).collect()
    }

    #[test]
    fn test_parse_rotation_mode() {
        assert_eq!("".parse::<RotationMode>().unwrap(), RotationMode::Disabled);
        assert_eq!("Random-Daily".parse::<RotationMode>().unwrap(), RotationMode::RandomDaily);
        for mode in RotationMode::ALL {
            assert_eq!(mode.to_string().parse::<RotationMode>().unwrap(), mode);
        }
        assert!("sometimes".parse::<RotationMode>().is_err());
    }

    #[test]
    fn test_disabled_returns_fixed_name() {
        let picker = TemplatePicker::new(RotationMode::Disabled, names(3), "ghost");
        for _ in 0..10 {
            assert_eq!(picker.pick().as_deref(), Some("ghost"));
        }
    }

    #[test]
    fn test_disabled_without_name() {
        let picker = TemplatePicker::new(RotationMode::Disabled, names(3), "");
        assert!(picker.pick().is_none());
    }

    #[test]
    fn test_no_candidates() {
        for mode in &RotationMode::ALL[1..] {
            let picker = TemplatePicker::new(*mode, Vec::new(), "");
            assert!(picker.pick().is_none(), "{mode}");
        }
    }

    #[test]
    fn test_random_once_is_sticky() {
        let picker = TemplatePicker::new(RotationMode::RandomOnStartup, names(10), "");
        let first = picker.pick();

        for _ in 0..98 {
            picker.pick();
        }
        assert_eq!(picker.pick(), first);
    }

    #[test]
    fn test_random_each_request_never_repeats() {
        let picker = TemplatePicker::new(RotationMode::RandomOnEachRequest, names(2), "");
        let mut last = picker.pick();

        for _ in 0..1000 {
            let next = picker.pick();
            assert_ne!(next, last);
            last = next;
        }
    }

    #[test]
    fn test_random_each_request_single_candidate() {
        let picker = TemplatePicker::new(RotationMode::RandomOnEachRequest, names(1), "");
        assert_eq!(picker.pick().as_deref(), Some("template-0"));
        assert_eq!(picker.pick().as_deref(), Some("template-0"));
    }

    #[test]
    fn test_hourly_sticks_within_the_hour() {
        let picker = TemplatePicker::new(RotationMode::RandomHourly, names(50), "");
        let start = Local.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let first = picker.pick_at(start);

        for minute in 0..60 {
            let at = Local.with_ymd_and_hms(2024, 6, 10, 12, minute, 30).unwrap();
            assert_eq!(picker.pick_at(at), first);
        }
    }

    #[test]
    fn test_daily_redraws_on_new_day() {
        let picker = TemplatePicker::new(RotationMode::RandomDaily, names(1000), "");
        let mut seen = std::collections::HashSet::new();

        for day in 1..=20 {
            let at = Local.with_ymd_and_hms(2024, 6, day, 12, 0, 0).unwrap();
            let pick = picker.pick_at(at).unwrap();
            assert_eq!(picker.pick_at(at + chrono::Duration::hours(1)).unwrap(), pick);
            seen.insert(pick);
        }

        // 20 draws out of 1000 candidates, collisions are possible but rare
        assert!(seen.len() > 1);
    }

    #[test]
    fn test_concurrent_random_once() {
        let picker = std::sync::Arc::new(TemplatePicker::new(RotationMode::RandomOnStartup, names(100), ""));

        let picks: Vec<_> = (0..8)
            .map(|_| {
                let picker = picker.clone();
                std::thread::spawn(move || picker.pick())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect();

        assert!(picks.windows(2).all(|w| w[0] == w[1]));
    }
}
