use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

/// Nose-y samples retained across frames.
const BUFFER_CAPACITY: usize = 15;
/// Samples required before any detection attempt.
const MIN_SAMPLES: usize = 10;
/// Normalized vertical swing that counts as a nod.
const AMPLITUDE_THRESHOLD: f32 = 0.02;
/// Minimum gap between reported nods.
const COOLDOWN: Duration = Duration::from_secs(2);

/// Detects head nods from the vertical track of the nose tip.
///
/// The only stateful piece of the whole pipeline: a rolling window of
/// nose-y samples plus the time of the last reported nod. Feed it one
/// sample per frame in which a face was detected, and only then.
pub struct NodDetector {
    positions: VecDeque<f32>,
    last_nod: Option<Instant>,
}

impl NodDetector {
    pub fn new() -> Self {
        Self {
            positions: VecDeque::with_capacity(BUFFER_CAPACITY + 1),
            last_nod: None,
        }
    }

    /// Record one nose-y sample; returns true iff a new nod is reported.
    pub fn observe(&mut self, nose_y: f32, now: Instant) -> bool {
        self.positions.push_back(nose_y);
        while self.positions.len() > BUFFER_CAPACITY {
            self.positions.pop_front();
        }

        if self.positions.len() < MIN_SAMPLES {
            return false;
        }

        let skip = self.positions.len() - MIN_SAMPLES;
        let recent: Vec<f32> = self.positions.iter().copied().skip(skip).collect();

        let mut last_peak = None;
        let mut last_valley = None;
        for i in 1..recent.len() - 1 {
            if recent[i] > recent[i - 1] && recent[i] > recent[i + 1] {
                last_peak = Some(recent[i]);
            }
            if recent[i] < recent[i - 1] && recent[i] < recent[i + 1] {
                last_valley = Some(recent[i]);
            }
        }

        // Amplitude comes from the last peak and last valley in scan order,
        // not the window extrema. Kept as tuned in the field.
        let (Some(peak), Some(valley)) = (last_peak, last_valley) else {
            return false;
        };
        let amplitude = (peak - valley).abs();
        if amplitude <= AMPLITUDE_THRESHOLD {
            return false;
        }

        if let Some(last) = self.last_nod {
            if now.duration_since(last) <= COOLDOWN {
                return false;
            }
        }

        self.last_nod = Some(now);
        log::debug!("nod detected, amplitude {amplitude:.4}");
        true
    }

    #[cfg(test)]
    fn buffered(&self) -> Vec<f32> {
        self.positions.iter().copied().collect()
    }
}

impl Default for NodDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A clean single oscillation: one valley, one peak, well above threshold.
    const OSCILLATION: [f32; 10] = [
        0.50, 0.50, 0.50, 0.50, 0.46, 0.50, 0.50, 0.56, 0.50, 0.50,
    ];

    fn feed(detector: &mut NodDetector, samples: &[f32], now: Instant) -> bool {
        samples
            .iter()
            .map(|&y| detector.observe(y, now))
            .fold(false, |fired, r| fired || r)
    }

    #[test]
    fn buffer_keeps_the_most_recent_fifteen() {
        let mut detector = NodDetector::new();
        let now = Instant::now();
        for i in 0..20 {
            detector.observe(i as f32, now);
        }
        let expected: Vec<f32> = (5..20).map(|i| i as f32).collect();
        assert_eq!(detector.buffered(), expected);
    }

    #[test]
    fn no_detection_before_ten_samples() {
        let mut detector = NodDetector::new();
        let now = Instant::now();
        // Strong oscillation, but only nine samples.
        for &y in OSCILLATION.iter().take(9) {
            assert!(!detector.observe(y, now));
        }
    }

    #[test]
    fn oscillation_fires_once() {
        let mut detector = NodDetector::new();
        let now = Instant::now();
        assert!(feed(&mut detector, &OSCILLATION, now));
    }

    #[test]
    fn small_amplitude_does_not_fire() {
        let mut detector = NodDetector::new();
        let now = Instant::now();
        let ripple = [
            0.500, 0.500, 0.500, 0.500, 0.495, 0.500, 0.500, 0.505, 0.500, 0.500,
        ];
        assert!(!feed(&mut detector, &ripple, now));
    }

    #[test]
    fn cooldown_suppresses_close_repeats() {
        let mut detector = NodDetector::new();
        let start = Instant::now();

        assert!(feed(&mut detector, &OSCILLATION, start));
        assert!(!feed(
            &mut detector,
            &OSCILLATION,
            start + Duration::from_secs(1)
        ));
        assert!(feed(
            &mut detector,
            &OSCILLATION,
            start + Duration::from_millis(2500)
        ));
    }

    #[test]
    fn amplitude_uses_last_extrema_not_global() {
        let mut detector = NodDetector::new();
        let now = Instant::now();
        // Global swing is 0.10, but the last peak/valley pair spans exactly
        // the threshold, which does not qualify.
        let window = [
            0.55, 0.60, 0.55, 0.50, 0.51, 0.52, 0.51, 0.50, 0.50, 0.50,
        ];
        assert!(!feed(&mut detector, &window, now));
    }
}
