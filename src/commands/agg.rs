use std::time::Duration;

use super::{Command, CommandError};
use crate::aggregator::{scrape_feeds, Scheduler};
use crate::feed::HttpFetcher;
use crate::state::State;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Units in match order: two-letter suffixes before their one-letter prefixes.
const UNITS: [(&str, u128); 8] = [
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000),
    ("μs", 1_000),
    ("ms", 1_000_000),
    ("s", NANOS_PER_SEC),
    ("m", 60 * NANOS_PER_SEC),
    ("h", 3_600 * NANOS_PER_SEC),
];

/// Runs the scrape cycle every `<duration>` until the process is killed.
pub(super) async fn handler_agg(state: &mut State, cmd: Command) -> Result<(), CommandError> {
    let period = parse_duration(cmd.arg(0, "time_between_reqs")?)?;
    let fetcher = HttpFetcher::new(state.config.fetch_timeout())?;

    writeln!(state.out(), "Collecting feeds every {}", format_duration(period))?;
    state.out().flush()?;

    let db = &state.db;
    let fetcher = &fetcher;
    Scheduler::new(period)
        .run(move || scrape_feeds(db, fetcher))
        .await;
    Ok(())
}

/// Parse a duration such as `"1h30m"`, `"45s"`, `"1.5m"` or `"500ms"`.
///
/// The input is a sequence of decimal numbers, each with a unit (`ns`, `us`,
/// `ms`, `s`, `m`, `h`). The result must be positive.
pub fn parse_duration(input: &str) -> Result<Duration, CommandError> {
    let invalid = |reason: &str| CommandError::InvalidDuration {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let mut rest = input.trim();
    if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    } else if rest.starts_with('-') {
        return Err(invalid("must be positive"));
    }
    if rest.is_empty() {
        return Err(invalid("empty duration"));
    }
    if rest == "0" {
        return Err(invalid("must be positive"));
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let (int_part, after_int) = rest.split_at(int_len);

        let (frac_part, after_number) = match after_int.strip_prefix('.') {
            Some(after_dot) => {
                let frac_len = after_dot
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(after_dot.len());
                after_dot.split_at(frac_len)
            }
            None => ("", after_int),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid("expected a number"));
        }

        let (unit, scale) = UNITS
            .iter()
            .find(|(suffix, _)| after_number.starts_with(suffix))
            .ok_or_else(|| invalid("missing or unknown unit"))?;
        rest = &after_number[unit.len()..];

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid("number too large"))?
        };
        // Fractional digits beyond nanosecond precision are dropped
        let mut divisor: u128 = 1;
        let mut fraction: u128 = 0;
        for digit in frac_part.bytes().take(18) {
            fraction = fraction * 10 + u128::from(digit - b'0');
            divisor *= 10;
        }
        let nanos = whole
            .checked_mul(*scale)
            .and_then(|n| n.checked_add(fraction * scale / divisor))
            .ok_or_else(|| invalid("duration too large"))?;

        total = total
            .checked_add(nanos)
            .filter(|t| *t <= u128::from(u64::MAX))
            .ok_or_else(|| invalid("duration too large"))?;
    }

    if total == 0 {
        return Err(invalid("must be positive"));
    }
    u64::try_from(total)
        .map(Duration::from_nanos)
        .map_err(|_| invalid("duration too large"))
}

/// Format a duration the way it is accepted: `1h30m0s`, `45s`, `500ms`.
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < 1_000 {
        return format!("{nanos}ns");
    }
    if nanos < 1_000_000 {
        return format!("{}µs", decimal(nanos, 1_000));
    }
    if nanos < NANOS_PER_SEC {
        return format!("{}ms", decimal(nanos, 1_000_000));
    }

    let secs = d.as_secs();
    let (hours, minutes) = (secs / 3_600, (secs % 3_600) / 60);
    let seconds = u128::from(secs % 60) * NANOS_PER_SEC + u128::from(d.subsec_nanos());

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    out.push_str(&decimal(seconds, NANOS_PER_SEC));
    out.push('s');
    out
}

/// `value / unit` as a decimal without trailing zeros.
fn decimal(value: u128, unit: u128) -> String {
    let (whole, rem) = (value / unit, value % unit);
    if rem == 0 {
        return whole.to_string();
    }
    let width = unit.ilog10() as usize;
    let digits = format!("{rem:0width$}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}
