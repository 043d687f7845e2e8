use crate::gaze::GazeEvent;
use itertools::Itertools;

/// Seconds added before and after every event of an attention interval
pub const DEFAULT_LENIENCY: f64 = 0.5;

/// Time intervals during which `track_id` was looked at.
///
/// Every event becomes the window `[max(0, time - leniency), time + leniency]`; overlapping or
/// touching windows are merged. The result is ordered by start time.
///
pub fn attention_intervals(
    events: &[GazeEvent],
    track_id: u64,
    leniency: f64,
) -> Vec<(f64, f64)> {
    let windows = events
        .iter()
        .filter(|e| e.track_id == track_id)
        .map(|e| ((e.time - leniency).max(0.0), e.time + leniency))
        .sorted_by(|l, r| l.0.total_cmp(&r.0));

    let mut merged: Vec<(f64, f64)> = Vec::default();
    for (start, end) in windows {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Orders events by track identity, keeping the time order within a track
///
pub fn sort_by_track(events: &mut [GazeEvent]) {
    events.sort_by_key(|e| e.track_id);
}

#[cfg(test)]
mod tests {
    use crate::gaze::intervals::{attention_intervals, sort_by_track, DEFAULT_LENIENCY};
    use crate::gaze::GazeEvent;

    fn ev(time: f64, track_id: u64) -> GazeEvent {
        GazeEvent { time, track_id }
    }

    #[test]
    fn merge() {
        let events = vec![
            ev(5.0, 1),
            ev(0.25, 1),
            ev(1.0, 2),
            ev(0.75, 1),
            ev(6.0, 1),
            ev(10.0, 1),
        ];
        assert_eq!(
            attention_intervals(&events, 1, DEFAULT_LENIENCY),
            vec![(0.0, 1.25), (4.5, 6.5), (9.5, 10.5)]
        );
        assert_eq!(
            attention_intervals(&events, 2, DEFAULT_LENIENCY),
            vec![(0.5, 1.5)]
        );
        assert!(attention_intervals(&events, 3, DEFAULT_LENIENCY).is_empty());
    }

    #[test]
    fn sort() {
        let mut events = vec![ev(0.0, 3), ev(0.1, 1), ev(0.2, 3), ev(0.3, 2), ev(0.4, 1)];
        sort_by_track(&mut events);
        assert_eq!(
            events,
            vec![ev(0.1, 1), ev(0.4, 1), ev(0.3, 2), ev(0.0, 3), ev(0.2, 3)]
        );
    }
}
