//! Time management: convert clock parameters to search limits.

use std::time::Duration;

use qchess_core::Color;

use crate::search::control::SearchLimits;

/// Time held back from every move for communication lag.
pub const MOVE_OVERHEAD: Duration = Duration::from_millis(10);

/// Moves assumed left in the game when the GUI does not say.
pub const DEFAULT_MOVES_TO_GO: u32 = 30;

/// Compute soft and hard time limits from remaining time and increment.
///
/// | limit | formula                                           |
/// |-------|---------------------------------------------------|
/// | soft  | `usable / moves_to_go + 3/4 · increment`          |
/// | hard  | `min(3 · soft, usable / 4)`                       |
///
/// where `usable` is the remaining time minus [`MOVE_OVERHEAD`]. Both are at
/// least 1 ms and soft never exceeds hard.
pub fn compute_limits(
    remaining: Duration,
    increment: Duration,
    moves_to_go: Option<u32>,
) -> (Duration, Duration) {
    let one_ms = Duration::from_millis(1);
    if remaining < MOVE_OVERHEAD {
        return (one_ms, one_ms);
    }

    let usable = remaining - MOVE_OVERHEAD;
    let mtg = moves_to_go.unwrap_or(DEFAULT_MOVES_TO_GO).max(1);

    let soft = usable / mtg + increment * 3 / 4;
    let hard = (soft * 3).min(usable / 4).max(one_ms);
    let soft = soft.clamp(one_ms, hard);

    (soft, hard)
}

/// Build [`SearchLimits`] from UCI `go` clock parameters and the side to move.
///
/// Priority order:
/// 1. `infinite: true` -> no time limit
/// 2. `movetime: Some(d)` -> soft and hard both `d`
/// 3. remaining time for `side` present -> [`compute_limits`]
/// 4. otherwise -> no time limit
///
/// Depth and node limits are left for the caller to fill in.
#[allow(clippy::too_many_arguments)]
pub fn limits_from_go(
    wtime: Option<Duration>,
    btime: Option<Duration>,
    winc: Option<Duration>,
    binc: Option<Duration>,
    movestogo: Option<u32>,
    movetime: Option<Duration>,
    infinite: bool,
    side: Color,
) -> SearchLimits {
    let (remaining, increment) = match side {
        Color::White => (wtime, winc),
        Color::Black => (btime, binc),
    };

    if infinite {
        return SearchLimits::infinite();
    }

    let (soft, hard) = if let Some(mt) = movetime {
        (mt, mt)
    } else if let Some(rem) = remaining {
        compute_limits(rem, increment.unwrap_or(Duration::ZERO), movestogo)
    } else {
        return SearchLimits::infinite();
    };

    tracing::debug!(
        soft_ms = soft.as_millis() as u64,
        hard_ms = hard.as_millis() as u64,
        "time limits"
    );
    SearchLimits {
        soft_time: Some(soft),
        hard_time: Some(hard),
        ..SearchLimits::default()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use qchess_core::Color;

    use crate::time::{compute_limits, limits_from_go};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn compute_limits_default_moves_to_go() {
        // usable = 299_990 ms, soft = usable / 30, hard = 3 x soft (below usable / 4).
        let (soft, hard) = compute_limits(Duration::from_secs(300), Duration::ZERO, None);
        assert_eq!(soft.as_millis(), 9_999);
        assert_eq!(hard.as_millis(), 29_998);
    }

    #[test]
    fn compute_limits_with_increment() {
        // soft = 59_990 / 30 + 1_500 = 3_499.66..
        let (soft, hard) = compute_limits(Duration::from_secs(60), ms(2_000), None);
        assert_eq!(soft.as_millis(), 3_499);
        assert!(hard > soft);
        assert!(hard <= ms(59_990) / 4);
    }

    #[test]
    fn compute_limits_hard_capped_by_quarter_of_remaining() {
        // One move to go: soft = 990, 3 x soft = 2_970, quarter = 247.5.
        let (soft, hard) = compute_limits(ms(1_000), Duration::ZERO, Some(1));
        assert_eq!(hard.as_micros(), 247_500);
        assert_eq!(soft, hard);
    }

    #[test]
    fn compute_limits_very_low_time() {
        let (soft, hard) = compute_limits(ms(5), Duration::ZERO, None);
        assert_eq!(soft, ms(1));
        assert_eq!(hard, ms(1));
    }

    #[test]
    fn compute_limits_zero_remaining() {
        let (soft, hard) = compute_limits(Duration::ZERO, Duration::ZERO, None);
        assert_eq!(soft, ms(1));
        assert_eq!(hard, ms(1));
    }

    #[test]
    fn compute_limits_with_movestogo() {
        // soft = 59_990 / 10 = 5_999
        let (soft, _) = compute_limits(Duration::from_secs(60), Duration::ZERO, Some(10));
        assert_eq!(soft, ms(5_999));
    }

    #[test]
    fn zero_movestogo_is_treated_as_one() {
        let (a, _) = compute_limits(Duration::from_secs(60), Duration::ZERO, Some(0));
        let (b, _) = compute_limits(Duration::from_secs(60), Duration::ZERO, Some(1));
        assert_eq!(a, b);
    }

    #[test]
    fn limits_from_go_infinite() {
        let limits = limits_from_go(
            Some(ms(1_000)), None, None, None, None, Some(ms(50)),
            true, Color::White,
        );
        assert_eq!(limits.soft_time, None);
        assert_eq!(limits.hard_time, None);
    }

    #[test]
    fn limits_from_go_movetime() {
        let limits = limits_from_go(
            Some(ms(100_000)), None, None, None, None, Some(ms(500)),
            false, Color::White,
        );
        assert_eq!(limits.soft_time, Some(ms(500)));
        assert_eq!(limits.hard_time, Some(ms(500)));
    }

    #[test]
    fn limits_from_go_uses_side_to_move_clock() {
        let limits = limits_from_go(
            Some(Duration::from_secs(300)),
            Some(Duration::from_secs(60)),
            None, None, None, None,
            false, Color::Black,
        );
        let (soft, hard) = compute_limits(Duration::from_secs(60), Duration::ZERO, None);
        assert_eq!(limits.soft_time, Some(soft));
        assert_eq!(limits.hard_time, Some(hard));
    }

    #[test]
    fn limits_from_go_without_clock_is_untimed() {
        let limits = limits_from_go(None, None, None, None, None, None, false, Color::White);
        assert_eq!(limits.soft_time, None);
        assert_eq!(limits.hard_time, None);
        assert_eq!(limits.depth, None);
    }
}
