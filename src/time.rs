//! Fixed-reference incident time handling
//!
//! Every incident and claim timestamp is rendered and compared in a single
//! regional reference (IST, UTC+05:30). There is no timezone database: the
//! reference is a constant offset, and validation compares two renderings of
//! the same format rather than zone-aware instants.
//!
//! The formatter ([`ReferenceTime::render`]) and the parser ([`parse`]) share
//! one format contract, defined by the constants below:
//!
//! ```text
//! 2024-03-01 09:15 AM IST
//! └─ YYYY-MM-DD HH:MM AM/PM <ZONE>
//! ```

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Offset of the fixed reference from UTC, in seconds (+05:30)
pub const REFERENCE_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Zone literal appended to every rendered timestamp
pub const ZONE_LABEL: &str = "IST";

/// chrono format for the part before the zone literal. 12-hour clock.
pub const TIME_FORMAT: &str = "%Y-%m-%d %I:%M %p";

/// Human-readable shape, used in validation messages and input placeholders
pub const FORMAT_HINT: &str = "YYYY-MM-DD HH:MM AM/PM IST";

pub const MSG_INVALID_FORMAT: &str = "Invalid format. Use: YYYY-MM-DD HH:MM AM/PM IST";
pub const MSG_FUTURE: &str = "Time entered is in the future.";
pub const MSG_VALID: &str = "Valid input.";
pub const MSG_BAD_REFERENCE: &str = "Reference time is malformed.";

/// The reference as a chrono offset.
pub fn reference_offset() -> FixedOffset {
    FixedOffset::east_opt(REFERENCE_OFFSET_SECS).expect("reference offset is within one day")
}

static TIMESTAMP_RE: OnceLock<Regex> = OnceLock::new();

fn timestamp_re() -> &'static Regex {
    TIMESTAMP_RE.get_or_init(|| {
        // shape of `TIME_FORMAT` output, then the zone literal
        let pattern = format!(
            r"^(\d{{4}}-\d{{2}}-\d{{2}} (\d{{1,2}}):\d{{2}} [AaPp][Mm]) {}$",
            regex::escape(ZONE_LABEL)
        );
        Regex::new(&pattern).expect("timestamp pattern is valid")
    })
}

// ============================================================================
// REFERENCE TIME
// ============================================================================

/// Wall-clock time in the fixed reference, at minute resolution once parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReferenceTime(NaiveDateTime);

impl ReferenceTime {
    /// Shift a UTC instant into the fixed reference.
    pub fn from_utc(instant: DateTime<Utc>) -> Self {
        Self(instant.with_timezone(&reference_offset()).naive_local())
    }

    pub fn from_naive(wall_clock: NaiveDateTime) -> Self {
        Self(wall_clock)
    }

    pub fn naive(&self) -> NaiveDateTime {
        self.0
    }

    /// Render under the shared format contract.
    pub fn render(&self) -> String {
        format!("{} {}", self.0.format(TIME_FORMAT), ZONE_LABEL)
    }
}

impl fmt::Display for ReferenceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

// ============================================================================
// CLOCK
// ============================================================================

/// Source of "now" in the fixed reference.
pub trait Clock: Send + Sync {
    fn now(&self) -> ReferenceTime;

    /// Current instant rendered under the format contract.
    fn format_now(&self) -> String {
        self.now().render()
    }
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> ReferenceTime {
        ReferenceTime::from_utc(Utc::now())
    }
}

/// Always reports the same instant. Used by tests and replay tooling.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub ReferenceTime);

impl Clock for FixedClock {
    fn now(&self) -> ReferenceTime {
        self.0
    }
}

/// Render the current system time in the fixed reference.
pub fn format_now() -> String {
    SystemClock.format_now()
}

// ============================================================================
// PARSING
// ============================================================================

/// Parse a timestamp in the fixed format.
///
/// Returns `None` for anything that is not exactly the contract shape
/// (surrounding whitespace aside) or that names a date that does not exist.
/// The zone literal is [`ZONE_LABEL`] and the rest is read back with
/// [`TIME_FORMAT`], the same pair [`ReferenceTime::render`] writes with.
/// Hour folding: 12 AM is hour 0, 12 PM is hour 12, other PM hours add 12.
pub fn parse(text: &str) -> Option<ReferenceTime> {
    let caps = timestamp_re().captures(text.trim())?;

    let hour12: u32 = caps[2].parse().ok()?;
    if !(1..=12).contains(&hour12) {
        return None;
    }
    NaiveDateTime::parse_from_str(&caps[1], TIME_FORMAT)
        .ok()
        .map(ReferenceTime)
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Outcome of a future-time check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeCheck {
    pub valid: bool,
    pub message: &'static str,
}

impl TimeCheck {
    fn ok() -> Self {
        Self {
            valid: true,
            message: MSG_VALID,
        }
    }

    fn rejected(message: &'static str) -> Self {
        Self {
            valid: false,
            message,
        }
    }
}

/// Reject malformed text and any time later than `now_text`.
///
/// Equality with `now_text` is accepted. Both sides go through [`parse`],
/// so the comparison is at minute resolution.
pub fn validate_not_future(text: &str, now_text: &str) -> TimeCheck {
    let Some(entered) = parse(text) else {
        return TimeCheck::rejected(MSG_INVALID_FORMAT);
    };
    let Some(now) = parse(now_text) else {
        return TimeCheck::rejected(MSG_BAD_REFERENCE);
    };
    if entered > now {
        TimeCheck::rejected(MSG_FUTURE)
    } else {
        TimeCheck::ok()
    }
}

/// Elapsed hours from `incident` to `claim`; negative if the claim is earlier.
pub fn hours_between(incident: ReferenceTime, claim: ReferenceTime) -> f64 {
    (claim.0 - incident.0).num_minutes() as f64 / 60.0
}
