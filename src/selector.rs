use crate::config::TimeserverConfig;
use crate::gateway::Candidate;
use crate::timestamp::{ClockOffset, Timestamp};

/// The gateway time chosen to answer from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub candidate: Candidate,
    pub offset: ClockOffset,
}

/// Whether a gateway time lies in `(server - tolerance, server]`.
///
/// Times after the server's reception are impossible and point to a skewed
/// gateway clock. Times older than the tolerance are stale.
pub fn within_window(time: &Timestamp, server: &Timestamp, tolerance_ms: u32) -> bool {
    let age = server.since(time).as_millis();
    age >= 0 && age < i64::from(tolerance_ms)
}

/// Pick the earliest gateway time inside the tolerance window.
///
/// The earliest reception is closest to the moment the node transmitted.
/// Gateways reporting the same millisecond keep their report order.
pub fn select(
    candidates: &[Candidate],
    server: &Timestamp,
    config: &TimeserverConfig,
) -> Option<Selection> {
    let mut fresh: Vec<&Candidate> = candidates
        .iter()
        .filter(|c| within_window(&c.time, server, config.tolerance_ms))
        .collect();

    // stable sort, ties stay in report order
    fresh.sort_by_key(|c| c.time.millis());

    fresh.first().map(|c| Selection {
        candidate: (*c).clone(),
        offset: server.since(&c.time),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::Precision;
    use rand::Rng;

    const SERVER_MS: i64 = 1_570_188_785_500;

    fn cand(id: &str, millis: i64) -> Candidate {
        Candidate {
            time: Timestamp::from_millis(millis, Precision::SubSecond),
            gtw_id: id.to_string(),
        }
    }

    fn server() -> Timestamp {
        Timestamp::from_millis(SERVER_MS, Precision::SubSecond)
    }

    #[test]
    fn test_window_bounds() {
        let s = server();
        let at = |ms| Timestamp::from_millis(ms, Precision::SubSecond);
        assert!(within_window(&at(SERVER_MS), &s, 1000));
        assert!(within_window(&at(SERVER_MS - 999), &s, 1000));
        assert!(!within_window(&at(SERVER_MS - 1000), &s, 1000));
        assert!(!within_window(&at(SERVER_MS + 1), &s, 1000));
    }

    #[test]
    fn test_empty_candidates() {
        assert!(select(&[], &server(), &TimeserverConfig::default()).is_none());
    }

    #[test]
    fn test_selects_earliest() {
        let candidates = vec![
            cand("late", SERVER_MS - 100),
            cand("early", SERVER_MS - 300),
            cand("mid", SERVER_MS - 200),
        ];
        let sel = select(&candidates, &server(), &TimeserverConfig::default()).unwrap();
        assert_eq!(sel.candidate.gtw_id, "early");
        assert_eq!(sel.offset.as_millis(), 300);
    }

    #[test]
    fn test_future_time_excluded() {
        let candidates = vec![cand("future", SERVER_MS + 1), cand("ok", SERVER_MS - 10)];
        let sel = select(&candidates, &server(), &TimeserverConfig::default()).unwrap();
        assert_eq!(sel.candidate.gtw_id, "ok");

        let only_future = vec![cand("future", SERVER_MS + 5)];
        assert!(select(&only_future, &server(), &TimeserverConfig::default()).is_none());
    }

    #[test]
    fn test_stale_time_excluded() {
        let candidates = vec![cand("stale", SERVER_MS - 1000), cand("ok", SERVER_MS - 999)];
        let sel = select(&candidates, &server(), &TimeserverConfig::default()).unwrap();
        assert_eq!(sel.candidate.gtw_id, "ok");
    }

    #[test]
    fn test_exact_server_time_selected() {
        let candidates = vec![cand("same", SERVER_MS)];
        let sel = select(&candidates, &server(), &TimeserverConfig::default()).unwrap();
        assert_eq!(sel.candidate.gtw_id, "same");
        assert_eq!(sel.offset.as_millis(), 0);
    }

    #[test]
    fn test_tie_keeps_report_order() {
        let candidates = vec![
            cand("first", SERVER_MS - 50),
            cand("second", SERVER_MS - 50),
            cand("later", SERVER_MS - 10),
        ];
        let sel = select(&candidates, &server(), &TimeserverConfig::default()).unwrap();
        assert_eq!(sel.candidate.gtw_id, "first");
    }

    #[test]
    fn test_custom_tolerance() {
        let config = TimeserverConfig {
            tolerance_ms: 100,
            ..TimeserverConfig::default()
        };
        let candidates = vec![cand("old", SERVER_MS - 150), cand("new", SERVER_MS - 20)];
        let sel = select(&candidates, &server(), &config).unwrap();
        assert_eq!(sel.candidate.gtw_id, "new");
    }

    #[test]
    fn test_random_sets_select_in_window_minimum() {
        let mut rng = rand::rng();
        let config = TimeserverConfig::default();
        let s = server();

        for _ in 0..500 {
            let n = rng.random_range(0..8);
            let candidates: Vec<Candidate> = (0..n)
                .map(|i| cand(&format!("gw{}", i), SERVER_MS + rng.random_range(-2000..200)))
                .collect();

            let expected = candidates
                .iter()
                .filter(|c| within_window(&c.time, &s, config.tolerance_ms))
                .map(|c| c.time.millis())
                .min();

            let first = select(&candidates, &s, &config);
            let again = select(&candidates, &s, &config);
            assert_eq!(first, again);

            match (first, expected) {
                (Some(sel), Some(min)) => {
                    assert_eq!(sel.candidate.time.millis(), min);
                    assert!(sel.candidate.time.millis() <= SERVER_MS);
                    assert!(sel.candidate.time.millis() > SERVER_MS - 1000);
                }
                (None, None) => {}
                (got, want) => panic!("selection {:?} does not match minimum {:?}", got, want),
            }
        }
    }
}
