//! Sinusoidal Tracker: Frame-to-frame continuation of spectral peaks
//!
//! Each tracked partial owns a *slot*: a fixed index into parallel
//! frequency/magnitude/phase arrays. The slot index is the track's identity
//! and never changes. A slot frequency of `0.0` means the slot is empty.
//!
//! ## One tracking step
//!
//! ```text
//!   previous slots       current peaks (by magnitude)      next slots
//!   ┌──────────┐         ┌──────────────┐                  ┌──────────┐
//!   │0:  440 Hz│◄────────│ 441 Hz  1.0  │  continuation    │0:  441 Hz│
//!   │1:  880 Hz│   ✗     │ 1320 Hz 0.4  │──┐               │1:    0   │ died
//!   │2:    0   │◄────────┼──────────────┼──┘ birth         │2: 1320 Hz│
//!   └──────────┘         └──────────────┘                  └──────────┘
//! ```
//!
//! 1. **Continuation.** Peaks are visited strongest first. Each takes the
//!    closest still-unclaimed live slot (lowest slot index on ties) when the
//!    distance is strictly inside `freq_dev_offset + freq_dev_slope · f`.
//! 2. **Birth.** Leftover peaks, strongest first, fill the slots that were
//!    empty in the previous frame (lowest index first), then extend the
//!    arrays.
//!
//! Slots that were live but found no continuation are zeroed: frequency,
//! magnitude and phase. The slot array never shrinks.
//!
//! Peaks at exactly 0 Hz cannot be told apart from an empty slot and are
//! ignored by tracking.
//!
//! ## Example
//!
//! ```rust
//! use sinetrack_core::sine_tracker::SineTracker;
//! use sinetrack_core::types::Peak;
//!
//! let mut tracker = SineTracker::new();
//! tracker
//!     .update(&[Peak::new(440.0, 1.0, 0.0), Peak::new(880.0, 0.5, 0.0)])
//!     .unwrap();
//! assert_eq!(tracker.state().frequencies(), &[440.0, 880.0]);
//!
//! let step = tracker.update(&[Peak::new(441.0, 1.0, 0.0)]).unwrap();
//! assert_eq!(tracker.state().frequencies(), &[441.0, 0.0]);
//! assert_eq!((step.continued, step.died, step.born), (1, 1, 0));
//! ```

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::types::{peaks_from_parts, Peak, SineModelError, SineResult};

/// Default minimum frequency deviation at 0 Hz.
pub const DEFAULT_FREQ_DEV_OFFSET: f64 = 20.0;
/// Default increase of the allowed deviation per Hz.
pub const DEFAULT_FREQ_DEV_SLOPE: f64 = 0.01;

/// Frequency deviation window for continuing a track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingParams {
    /// Allowed deviation at 0 Hz, in Hz
    pub freq_dev_offset: f64,
    /// Additional allowed deviation per Hz of peak frequency
    pub freq_dev_slope: f64,
}

impl Default for TrackingParams {
    fn default() -> Self {
        Self {
            freq_dev_offset: DEFAULT_FREQ_DEV_OFFSET,
            freq_dev_slope: DEFAULT_FREQ_DEV_SLOPE,
        }
    }
}

impl TrackingParams {
    pub fn new(freq_dev_offset: f64, freq_dev_slope: f64) -> Self {
        Self {
            freq_dev_offset,
            freq_dev_slope,
        }
    }

    /// Width of the deviation window at `frequency`.
    #[inline]
    pub fn max_deviation(&self, frequency: f64) -> f64 {
        self.freq_dev_offset + self.freq_dev_slope * frequency
    }

    pub fn validate(&self) -> SineResult<()> {
        if !(self.freq_dev_offset.is_finite() && self.freq_dev_offset >= 0.0) {
            return Err(SineModelError::InvalidArgument(format!(
                "freq_dev_offset must be finite and non-negative, got {}",
                self.freq_dev_offset
            )));
        }
        if !(self.freq_dev_slope.is_finite() && self.freq_dev_slope >= 0.0) {
            return Err(SineModelError::InvalidArgument(format!(
                "freq_dev_slope must be finite and non-negative, got {}",
                self.freq_dev_slope
            )));
        }
        Ok(())
    }
}

/// Track slot arrays, indexed by track identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackState {
    frequencies: Vec<f64>,
    magnitudes: Vec<f64>,
    phases: Vec<f64>,
}

impl TrackState {
    /// Empty state with no slots.
    pub fn new() -> Self {
        Self::default()
    }

    /// `len` empty slots.
    pub fn zeroed(len: usize) -> Self {
        Self {
            frequencies: vec![0.0; len],
            magnitudes: vec![0.0; len],
            phases: vec![0.0; len],
        }
    }

    /// Build a state from parallel arrays, e.g. to resume a session.
    pub fn from_parts(frequencies: Vec<f64>, magnitudes: Vec<f64>, phases: Vec<f64>) -> SineResult<Self> {
        // Validates lengths and values
        peaks_from_parts(&frequencies, &magnitudes, &phases)?;
        let mut state = Self {
            frequencies,
            magnitudes,
            phases,
        };
        for slot in 0..state.len() {
            if state.frequencies[slot] == 0.0 {
                state.clear(slot);
            }
        }
        Ok(state)
    }

    /// Number of slots, live or empty.
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn magnitudes(&self) -> &[f64] {
        &self.magnitudes
    }

    pub fn phases(&self) -> &[f64] {
        &self.phases
    }

    /// Whether `slot` holds a live track.
    pub fn is_active(&self, slot: usize) -> bool {
        self.frequencies.get(slot).map_or(false, |&f| f != 0.0)
    }

    /// Indices of live slots, ascending.
    pub fn active_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.frequencies
            .iter()
            .enumerate()
            .filter(|(_, &f)| f != 0.0)
            .map(|(slot, _)| slot)
    }

    /// Number of live slots.
    pub fn active_count(&self) -> usize {
        self.frequencies.iter().filter(|&&f| f != 0.0).count()
    }

    /// The peak held by a live slot.
    pub fn peak(&self, slot: usize) -> Option<Peak> {
        if !self.is_active(slot) {
            return None;
        }
        Some(Peak::new(
            self.frequencies[slot],
            self.magnitudes[slot],
            self.phases[slot],
        ))
    }

    /// `(slot, peak)` for every live slot, ascending by slot.
    pub fn active_peaks(&self) -> impl Iterator<Item = (usize, Peak)> + '_ {
        self.active_slots().filter_map(move |slot| self.peak(slot).map(|p| (slot, p)))
    }

    fn assign(&mut self, slot: usize, peak: &Peak) {
        self.frequencies[slot] = peak.frequency;
        self.magnitudes[slot] = peak.magnitude;
        self.phases[slot] = peak.phase;
    }

    fn push(&mut self, peak: &Peak) {
        self.frequencies.push(peak.frequency);
        self.magnitudes.push(peak.magnitude);
        self.phases.push(peak.phase);
    }

    fn clear(&mut self, slot: usize) {
        self.frequencies[slot] = 0.0;
        self.magnitudes[slot] = 0.0;
        self.phases[slot] = 0.0;
    }
}

/// What one tracking step did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackUpdate {
    /// Peaks that continued a live track
    pub continued: usize,
    /// Peaks that started a new track (reused or appended slot)
    pub born: usize,
    /// Live tracks that found no continuation
    pub died: usize,
    /// Slots appended to the arrays
    pub appended: usize,
}

/// One tracking step: previous slots and current peaks to next slots.
///
/// Pure function; `prev` is not modified. Any invalid peak fails the whole
/// step.
pub fn track_step(
    prev: &TrackState,
    peaks: &[Peak],
    params: &TrackingParams,
) -> SineResult<(TrackState, TrackUpdate)> {
    for peak in peaks {
        peak.validate()?;
    }

    // Strongest first; stable, so equal magnitudes keep the caller's order
    let mut order: Vec<usize> = (0..peaks.len())
        .filter(|&i| peaks[i].frequency != 0.0)
        .collect();
    order.sort_by(|&a, &b| peaks[b].magnitude.total_cmp(&peaks[a].magnitude));

    let mut next = TrackState::zeroed(prev.len());
    let mut update = TrackUpdate::default();
    let mut consumed = vec![false; peaks.len()];
    let mut incoming: Vec<usize> = prev.active_slots().collect();

    for &i in &order {
        if incoming.is_empty() {
            break;
        }
        let peak = &peaks[i];

        // Closest incoming track; strict `<` keeps the lowest slot on ties
        let mut best = 0;
        let mut best_dist = f64::INFINITY;
        for (k, &slot) in incoming.iter().enumerate() {
            let dist = (peak.frequency - prev.frequencies[slot]).abs();
            if dist < best_dist {
                best = k;
                best_dist = dist;
            }
        }

        if best_dist < params.max_deviation(peak.frequency) {
            let slot = incoming.remove(best);
            next.assign(slot, peak);
            consumed[i] = true;
            update.continued += 1;
        }
    }
    update.died = incoming.len();

    let mut empty_slots = prev
        .frequencies
        .iter()
        .enumerate()
        .filter(|(_, &f)| f == 0.0)
        .map(|(slot, _)| slot);

    for &i in order.iter().filter(|&&i| !consumed[i]) {
        match empty_slots.next() {
            Some(slot) => next.assign(slot, &peaks[i]),
            None => {
                next.push(&peaks[i]);
                update.appended += 1;
            }
        }
        update.born += 1;
    }

    Ok((next, update))
}

/// Stateful tracker for one analysis session.
///
/// Frames must be fed strictly in temporal order. A frame that fails
/// validation leaves the state exactly as it was after the last good frame.
#[derive(Debug, Clone, Default)]
pub struct SineTracker {
    params: TrackingParams,
    state: TrackState,
    frames: u64,
}

impl SineTracker {
    /// Tracker with default deviation window (20 Hz + 1%).
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker with a custom deviation window.
    pub fn with_params(params: TrackingParams) -> SineResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            ..Self::default()
        })
    }

    /// Resume tracking from an existing slot state.
    pub fn with_state(params: TrackingParams, state: TrackState) -> SineResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            state,
            frames: 0,
        })
    }

    /// Track one frame of peaks.
    pub fn update(&mut self, peaks: &[Peak]) -> SineResult<TrackUpdate> {
        let (next, update) = match track_step(&self.state, peaks, &self.params) {
            Ok(step) => step,
            Err(e) => {
                warn!(frame = self.frames, error = %e, "Rejected tracking frame");
                return Err(e);
            }
        };

        trace!(
            frame = self.frames,
            peaks = peaks.len(),
            continued = update.continued,
            born = update.born,
            died = update.died,
            slots = next.len(),
            "Tracking step"
        );

        self.state = next;
        self.frames += 1;
        Ok(update)
    }

    /// Track one frame given as parallel arrays.
    pub fn update_parts(
        &mut self,
        frequencies: &[f64],
        magnitudes: &[f64],
        phases: &[f64],
    ) -> SineResult<TrackUpdate> {
        let peaks = peaks_from_parts(frequencies, magnitudes, phases)?;
        self.update(&peaks)
    }

    pub fn state(&self) -> &TrackState {
        &self.state
    }

    pub fn params(&self) -> &TrackingParams {
        &self.params
    }

    /// Number of slots ever allocated.
    pub fn track_count(&self) -> usize {
        self.state.len()
    }

    /// Number of live tracks after the last frame.
    pub fn active_count(&self) -> usize {
        self.state.active_count()
    }

    /// Frames successfully tracked since creation or reset.
    pub fn frames_processed(&self) -> u64 {
        self.frames
    }

    /// Drop all tracks and start a new session.
    pub fn reset(&mut self) {
        self.state = TrackState::new();
        self.frames = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn p(frequency: f64, magnitude: f64) -> Peak {
        Peak::new(frequency, magnitude, 0.0)
    }

    #[test]
    fn test_birth_then_continuation_and_death() {
        let mut tracker = SineTracker::new();
        let step = tracker.update(&[p(440.0, 1.0), p(880.0, 0.5)]).unwrap();
        assert_eq!(tracker.state().frequencies(), &[440.0, 880.0]);
        assert_eq!(step.born, 2);
        assert_eq!(step.appended, 2);

        let step = tracker.update(&[p(441.0, 1.0)]).unwrap();
        assert_eq!(tracker.state().frequencies(), &[441.0, 0.0]);
        assert_eq!(tracker.track_count(), 2);
        assert_eq!(
            step,
            TrackUpdate {
                continued: 1,
                born: 0,
                died: 1,
                appended: 0
            }
        );
    }

    #[test]
    fn test_empty_frame_on_empty_state() {
        let state = TrackState::zeroed(3);
        let (next, update) = track_step(&state, &[], &TrackingParams::default()).unwrap();
        assert_eq!(next, TrackState::zeroed(3));
        assert_eq!(update, TrackUpdate::default());

        let mut tracker = SineTracker::new();
        tracker.update(&[]).unwrap();
        assert!(tracker.state().is_empty());
    }

    #[test]
    fn test_dead_slot_is_fully_cleared() {
        let mut tracker = SineTracker::new();
        tracker
            .update(&[Peak::new(440.0, 1.0, 0.3), Peak::new(880.0, 0.5, -1.2)])
            .unwrap();
        tracker.update(&[Peak::new(441.0, 0.9, 0.4)]).unwrap();

        let state = tracker.state();
        assert_eq!(state.frequencies()[1], 0.0);
        assert_eq!(state.magnitudes()[1], 0.0);
        assert_eq!(state.phases()[1], 0.0);
        assert_eq!(state.peak(1), None);
        assert_eq!(state.peak(0), Some(Peak::new(441.0, 0.9, 0.4)));
    }

    #[test]
    fn test_deviation_window_is_strict_offset_only() {
        let params = TrackingParams::new(20.0, 0.0);
        let prev = TrackState::from_parts(vec![1000.0], vec![1.0], vec![0.0]).unwrap();

        // Exactly on the boundary: no continuation, track dies, peak is born
        let (next, update) = track_step(&prev, &[p(1020.0, 1.0)], &params).unwrap();
        assert_eq!(next.frequencies(), &[0.0, 1020.0]);
        assert_eq!((update.continued, update.died, update.born), (0, 1, 1));

        let (next, _) = track_step(&prev, &[p(980.0, 1.0)], &params).unwrap();
        assert_eq!(next.frequencies(), &[0.0, 980.0]);

        // Just inside
        let (next, update) = track_step(&prev, &[p(1019.5, 1.0)], &params).unwrap();
        assert_eq!(next.frequencies(), &[1019.5]);
        assert_eq!(update.continued, 1);
    }

    #[test]
    fn test_deviation_window_scales_with_peak_frequency() {
        // Window at f: 10 + 0.5·f
        let params = TrackingParams::new(10.0, 0.5);
        let prev = TrackState::from_parts(vec![100.0], vec![1.0], vec![0.0]).unwrap();

        // |220 - 100| = 120 = 10 + 0.5·220
        let (next, _) = track_step(&prev, &[p(220.0, 1.0)], &params).unwrap();
        assert_eq!(next.frequencies(), &[0.0, 220.0]);

        // |219 - 100| = 119 < 119.5
        let (next, _) = track_step(&prev, &[p(219.0, 1.0)], &params).unwrap();
        assert_eq!(next.frequencies(), &[219.0]);

        // |100 - 60| = 40 = 10 + 0.5·60
        let (next, _) = track_step(&prev, &[p(60.0, 1.0)], &params).unwrap();
        assert_eq!(next.frequencies(), &[0.0, 60.0]);
    }

    #[test]
    fn test_each_track_matches_once() {
        let prev = TrackState::from_parts(vec![440.0], vec![1.0], vec![0.0]).unwrap();
        let peaks = [p(445.0, 0.5), p(441.0, 1.0)];
        let (next, update) = track_step(&prev, &peaks, &TrackingParams::default()).unwrap();
        // Stronger peak wins the track, weaker one is born
        assert_eq!(next.frequencies(), &[441.0, 445.0]);
        assert_eq!((update.continued, update.born, update.appended), (1, 1, 1));
    }

    #[test]
    fn test_peaks_sorted_by_magnitude_internally() {
        let prev = TrackState::from_parts(vec![440.0], vec![1.0], vec![0.0]).unwrap();
        let ascending = [p(439.0, 0.2), p(441.0, 0.9)];
        let descending = [p(441.0, 0.9), p(439.0, 0.2)];
        let params = TrackingParams::default();
        let (a, _) = track_step(&prev, &ascending, &params).unwrap();
        let (b, _) = track_step(&prev, &descending, &params).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.frequencies(), &[441.0, 439.0]);
    }

    #[test]
    fn test_equidistant_tracks_pick_lowest_slot() {
        let prev = TrackState::from_parts(vec![430.0, 450.0], vec![1.0, 1.0], vec![0.0, 0.0]).unwrap();
        let (next, _) = track_step(&prev, &[p(440.0, 1.0)], &TrackingParams::default()).unwrap();
        assert_eq!(next.frequencies(), &[440.0, 0.0]);
    }

    #[test]
    fn test_closest_track_wins() {
        let prev = TrackState::from_parts(vec![430.0, 445.0], vec![1.0, 1.0], vec![0.0, 0.0]).unwrap();
        let (next, _) = track_step(&prev, &[p(440.0, 1.0)], &TrackingParams::default()).unwrap();
        assert_eq!(next.frequencies(), &[0.0, 440.0]);
    }

    #[test]
    fn test_births_fill_empty_slots_first() {
        let prev = TrackState::from_parts(
            vec![0.0, 500.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 0.0],
        )
        .unwrap();
        let peaks = [p(100.0, 0.2), p(300.0, 0.9), p(500.5, 0.5)];
        let (next, update) = track_step(&prev, &peaks, &TrackingParams::default()).unwrap();
        assert_eq!(next.frequencies(), &[300.0, 500.5, 100.0]);
        assert_eq!((update.continued, update.born, update.appended), (1, 2, 0));
    }

    #[test]
    fn test_births_overflow_appends_in_magnitude_order() {
        let prev = TrackState::from_parts(vec![0.0, 500.0], vec![0.0, 1.0], vec![0.0, 0.0]).unwrap();
        let peaks = [p(1000.0, 0.3), p(2000.0, 0.8), p(3000.0, 0.5)];
        let (next, update) = track_step(&prev, &peaks, &TrackingParams::default()).unwrap();
        // Slot 1 dies and is not reused in the same frame
        assert_eq!(next.frequencies(), &[2000.0, 0.0, 3000.0, 1000.0]);
        assert_eq!(next.magnitudes(), &[0.8, 0.0, 0.5, 0.3]);
        assert_eq!(
            update,
            TrackUpdate {
                continued: 0,
                born: 3,
                died: 1,
                appended: 2
            }
        );
    }

    #[test]
    fn test_dead_slot_reused_next_frame() {
        let mut tracker = SineTracker::new();
        tracker.update(&[p(440.0, 1.0), p(880.0, 0.5)]).unwrap();
        tracker.update(&[p(441.0, 1.0)]).unwrap();
        tracker.update(&[p(442.0, 1.0), p(3000.0, 0.7)]).unwrap();
        assert_eq!(tracker.state().frequencies(), &[442.0, 3000.0]);
    }

    #[test]
    fn test_slow_drift_keeps_identity() {
        let mut tracker = SineTracker::new();
        for k in 0..50 {
            let f = 440.0 + k as f64 * 2.0;
            tracker.update(&[p(f, 1.0), p(2000.0 + k as f64, 0.5)]).unwrap();
        }
        assert_eq!(tracker.track_count(), 2);
        assert_eq!(tracker.state().frequencies(), &[538.0, 2049.0]);
        assert_eq!(tracker.frames_processed(), 50);
    }

    #[test]
    fn test_zero_frequency_peaks_ignored() {
        let mut tracker = SineTracker::new();
        let step = tracker.update(&[p(0.0, 2.0), p(440.0, 1.0)]).unwrap();
        assert_eq!(tracker.state().frequencies(), &[440.0]);
        assert_eq!(step.born, 1);
    }

    #[test]
    fn test_failed_frame_leaves_state_untouched() {
        let mut tracker = SineTracker::new();
        tracker.update(&[p(440.0, 1.0), p(880.0, 0.5)]).unwrap();
        let before = tracker.state().clone();

        let err = tracker.update(&[p(441.0, 1.0), p(-5.0, 0.2)]).unwrap_err();
        assert!(matches!(err, SineModelError::InvalidArgument(_)));
        assert_eq!(tracker.state(), &before);
        assert_eq!(tracker.frames_processed(), 1);

        let err = tracker
            .update_parts(&[441.0, 900.0], &[1.0], &[0.0, 0.0])
            .unwrap_err();
        assert!(matches!(err, SineModelError::LengthMismatch { .. }));
        assert_eq!(tracker.state(), &before);
    }

    #[test]
    fn test_update_parts() {
        let mut tracker = SineTracker::new();
        tracker
            .update_parts(&[440.0, 880.0], &[1.0, 0.5], &[0.1, 0.2])
            .unwrap();
        assert_eq!(tracker.state().phases(), &[0.1, 0.2]);
    }

    #[test]
    fn test_from_parts_validation() {
        assert!(TrackState::from_parts(vec![1.0, 2.0], vec![1.0], vec![0.0, 0.0]).is_err());
        assert!(TrackState::from_parts(vec![-1.0], vec![1.0], vec![0.0]).is_err());
        // Empty slots drop stale magnitude/phase
        let state = TrackState::from_parts(vec![0.0], vec![3.0], vec![1.0]).unwrap();
        assert_eq!(state.magnitudes(), &[0.0]);
        assert_eq!(state.phases(), &[0.0]);
    }

    #[test]
    fn test_invalid_params() {
        assert!(SineTracker::with_params(TrackingParams::new(-1.0, 0.01)).is_err());
        assert!(SineTracker::with_params(TrackingParams::new(20.0, f64::NAN)).is_err());
        assert!(SineTracker::with_params(TrackingParams::new(0.0, 0.0)).is_ok());
    }

    #[test]
    fn test_reset() {
        let mut tracker = SineTracker::new();
        tracker.update(&[p(440.0, 1.0)]).unwrap();
        tracker.reset();
        assert_eq!(tracker.track_count(), 0);
        assert_eq!(tracker.frames_processed(), 0);
    }

    #[test]
    fn test_active_peaks() {
        let state = TrackState::from_parts(
            vec![100.0, 0.0, 300.0],
            vec![1.0, 0.0, 0.5],
            vec![0.1, 0.0, 0.3],
        )
        .unwrap();
        let active: Vec<(usize, Peak)> = state.active_peaks().collect();
        assert_eq!(
            active,
            vec![(0, Peak::new(100.0, 1.0, 0.1)), (2, Peak::new(300.0, 0.5, 0.3))]
        );
        assert_eq!(state.active_count(), 2);
        assert!(!state.is_active(1));
        assert!(!state.is_active(7));
    }

    #[test]
    fn test_random_frames_monotonic_and_injective() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut tracker = SineTracker::new();
        let mut prev_len = 0;

        for _ in 0..300 {
            let n = rng.gen_range(0..12);
            let peaks: Vec<Peak> = (0..n)
                .map(|_| p(rng.gen_range(20.0..8000.0), rng.gen_range(0.01..1.0)))
                .collect();

            let prev = tracker.state().clone();
            let update = tracker.update(&peaks).unwrap();
            let state = tracker.state();

            assert!(state.len() >= prev_len);
            prev_len = state.len();

            // Every peak lands in exactly one slot, every live slot holds one peak
            assert_eq!(state.active_count(), peaks.len());
            assert_eq!(update.continued + update.born, peaks.len());
            for peak in &peaks {
                let hits = state
                    .active_peaks()
                    .filter(|(_, q)| q.frequency == peak.frequency && q.magnitude == peak.magnitude)
                    .count();
                assert_eq!(hits, 1);
            }

            // Continuations stay inside the window of the slot they came from
            for (slot, q) in state.active_peaks() {
                if let Some(old) = prev.peak(slot) {
                    let dist = (q.frequency - old.frequency).abs();
                    assert!(dist < tracker.params().max_deviation(q.frequency));
                }
            }
        }
    }
}
