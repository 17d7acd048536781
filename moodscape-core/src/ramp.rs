//! Linear parameter ramps — the automation primitive of the mood bed.
//!
//! Every automatable parameter (oscillator frequencies, layer gains, filter
//! cutoff/Q, rain mix, master level) is a [`LinearRamp`]. Retargeting always
//! departs from the **current instantaneous value**, never from the old
//! target or some baseline, so overlapping mood changes and play/pause
//! toggles can race without producing audible steps.
//!
//! Ramps are allocation-free and tick once per sample; durations are cached
//! as a per-sample increment plus a remaining-sample count so the hot path
//! is one add and one compare.

/// A linear ramp towards a target value over a fixed number of samples.
#[derive(Copy, Clone, Debug)]
pub struct LinearRamp {
    value: f32,
    target: f32,
    inc: f32,
    remaining: u32,
}

impl LinearRamp {
    /// A ramp that is already settled at `v0`.
    #[inline]
    pub fn new(v0: f32) -> Self {
        Self { value: v0, target: v0, inc: 0.0, remaining: 0 }
    }

    /// Jump immediately to `v` and cancel any pending ramp.
    #[inline]
    pub fn snap(&mut self, v: f32) {
        self.value = v;
        self.target = v;
        self.inc = 0.0;
        self.remaining = 0;
    }

    /// Schedule a ramp from the current instantaneous value to `target`
    /// over `secs` at sample rate `sr`. A non-positive duration snaps.
    /// Supersedes any pending ramp (last writer wins on the target).
    #[inline]
    pub fn set_target(&mut self, target: f32, secs: f32, sr: f32) {
        if secs <= 0.0 || sr <= 0.0 {
            self.snap(target);
            return;
        }
        let n = (secs * sr).max(1.0) as u32;
        self.target = target;
        self.inc = (target - self.value) / n as f32;
        self.remaining = n;
    }

    /// Advance one sample and return the new value.
    #[inline]
    pub fn next(&mut self) -> f32 {
        if self.remaining > 0 {
            self.value += self.inc;
            self.remaining -= 1;
            if self.remaining == 0 {
                // Land exactly; accumulated float error stays out of the state.
                self.value = self.target;
            }
        }
        self.value
    }

    #[inline] pub fn value(&self) -> f32 { self.value }
    #[inline] pub fn target(&self) -> f32 { self.target }
    #[inline] pub fn is_settled(&self) -> bool { self.remaining == 0 }
}

// ------------------------------------ Tests --------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SR: f32 = 48_000.0;

    #[test]
    fn reaches_target_in_duration() {
        let mut r = LinearRamp::new(0.0);
        r.set_target(1.0, 0.5, SR);
        let n = (0.5 * SR) as usize;
        let mut last = 0.0;
        for _ in 0..n {
            last = r.next();
        }
        assert_eq!(last, 1.0);
        assert!(r.is_settled());
    }

    #[test]
    fn retarget_departs_from_instantaneous_value() {
        let mut r = LinearRamp::new(0.0);
        r.set_target(1.0, 1.0, SR);
        // run 25% of the way
        for _ in 0..(SR as usize / 4) {
            r.next();
        }
        let mid = r.value();
        assert_relative_eq!(mid, 0.25, epsilon = 1e-3);

        // retarget downwards; the very next sample must be adjacent to `mid`,
        // not to the superseded target or a reset baseline
        r.set_target(0.0, 1.0, SR);
        let step = r.next();
        assert_relative_eq!(step, mid, epsilon = 1e-4);
    }

    #[test]
    fn zero_duration_snaps() {
        let mut r = LinearRamp::new(0.3);
        r.set_target(0.9, 0.0, SR);
        assert_eq!(r.value(), 0.9);
        assert!(r.is_settled());
    }

    #[test]
    fn last_writer_wins_on_target() {
        let mut r = LinearRamp::new(0.0);
        r.set_target(0.5, 1.0, SR);
        r.set_target(1.0, 0.001, SR);
        for _ in 0..96 {
            r.next();
        }
        assert_eq!(r.value(), 1.0);
    }

    #[test]
    fn settled_ramp_holds_value() {
        let mut r = LinearRamp::new(0.42);
        for _ in 0..1000 {
            assert_eq!(r.next(), 0.42);
        }
    }
}
