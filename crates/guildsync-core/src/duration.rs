use regex::Regex;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Duration token grammar
// ---------------------------------------------------------------------------

static DURATION_RE: OnceLock<Regex> = OnceLock::new();

fn duration_re() -> &'static Regex {
    DURATION_RE.get_or_init(|| Regex::new(r"^(\d+)([smhd])$").unwrap())
}

/// Parse a human duration token ("30m", "1h", "7d") into milliseconds.
///
/// Grammar: one or more digits followed by exactly one of `s`, `m`, `h`, `d`
/// (case-sensitive). No sign, no decimals, no combined units. Anything else —
/// including a numeric overflow — returns `None`; the caller decides how to
/// surface it.
pub fn parse_duration(token: &str) -> Option<u64> {
    let caps = duration_re().captures(token)?;
    let amount: u64 = caps[1].parse().ok()?;
    let unit_ms: u64 = match &caps[2] {
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        "d" => 86_400_000,
        _ => unreachable!("unit constrained by regex"),
    };
    amount.checked_mul(unit_ms)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
