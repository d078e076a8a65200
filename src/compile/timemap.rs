use crate::foundation::core::Frame;

/// Maps absolute event time onto schedule frames.
///
/// The origin is fixed to the timestamp of the first event processed in a
/// compilation pass and never changes afterward. The mapping uses floor
/// division, so fractional frames are truncated the way real-time playback
/// compression truncates them; it is monotonic non-decreasing for a sorted
/// input stream.
#[derive(Clone, Copy, Debug)]
pub struct TimeMap {
    origin_ms: i64,
    fps: u32,
    playback_divisor: u32,
    start_frame: i64,
}

impl TimeMap {
    /// Create a mapper anchored at `origin_ms`.
    ///
    /// `playback_divisor` is the event-time milliseconds compressed into one
    /// animation second and must be non-zero (enforced by stage validation).
    pub fn new(origin_ms: i64, fps: u32, playback_divisor: u32, start_frame: i64) -> Self {
        Self {
            origin_ms,
            fps,
            playback_divisor,
            start_frame,
        }
    }

    /// Frame for an event at `time_ms`.
    ///
    /// Euclidean division keeps floor semantics for times before the origin,
    /// which only occur when the input violates the sortedness precondition.
    pub fn frame_for(&self, time_ms: i64) -> Frame {
        let delta = time_ms - self.origin_ms;
        let scaled = delta * i64::from(self.fps);
        Frame(self.start_frame + scaled.div_euclid(i64::from(self.playback_divisor)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_maps_to_the_start_frame() {
        let map = TimeMap::new(1000, 30, 250, 0);
        assert_eq!(map.frame_for(1000), Frame(0));

        let offset = TimeMap::new(1000, 30, 250, 180);
        assert_eq!(offset.frame_for(1000), Frame(180));
    }

    #[test]
    fn quarter_speed_mapping_matches_the_reference_values() {
        let map = TimeMap::new(1000, 30, 250, 0);
        assert_eq!(map.frame_for(1250), Frame(30));
        assert_eq!(map.frame_for(1200), Frame(24));
    }

    #[test]
    fn fractional_frames_truncate() {
        let map = TimeMap::new(0, 30, 1000, 0);
        // 33 ms * 30 / 1000 = 0.99 frames.
        assert_eq!(map.frame_for(33), Frame(0));
        assert_eq!(map.frame_for(34), Frame(1));
    }

    #[test]
    fn mapping_is_monotonic_for_sorted_input() {
        let map = TimeMap::new(500, 60, 100, 3);
        let mut prev = Frame(i64::MIN);
        for t in (500..5000).step_by(7) {
            let f = map.frame_for(t);
            assert!(f >= prev);
            prev = f;
        }
    }

    #[test]
    fn times_before_the_origin_floor_toward_negative_frames() {
        let map = TimeMap::new(1000, 30, 250, 0);
        // -100 ms * 30 / 250 = -12 exactly; -10 ms scales to -1.2 -> -2.
        assert_eq!(map.frame_for(900), Frame(-12));
        assert_eq!(map.frame_for(990), Frame(-2));
    }
}
