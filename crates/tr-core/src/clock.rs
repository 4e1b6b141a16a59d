use std::time::Duration;

use crate::config::Pacing;
use crate::error::CoreError;

/// Horloge de trame à intervalle fixe.
///
/// Pas d'horloge maître : la boucle de frames dort un intervalle constant.
/// En mode [`Pacing::Fixed`] le coût d'écriture n'est pas soustrait, la dérive
/// par rapport à l'audio s'accumule sur les longues séquences.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use tr_core::clock::FrameClock;
/// use tr_core::config::Pacing;
/// let clock = FrameClock::new(25, Pacing::Fixed).unwrap();
/// assert_eq!(clock.interval(), Duration::from_millis(40));
/// assert_eq!(clock.delay_after(Duration::from_millis(15)), Duration::from_millis(40));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameClock {
    interval: Duration,
    pacing: Pacing,
}

impl FrameClock {
    /// Build a clock for `framerate` frames per second.
    ///
    /// # Errors
    /// [`CoreError::Config`] if `framerate == 0`.
    pub fn new(framerate: u32, pacing: Pacing) -> Result<Self, CoreError> {
        if framerate == 0 {
            return Err(CoreError::Config("le framerate doit être positif".into()));
        }
        Ok(Self {
            interval: Duration::from_secs_f64(1.0 / f64::from(framerate)),
            pacing,
        })
    }

    /// Nominal time between two frames.
    #[inline]
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Temps à dormir après une frame dont l'écriture a pris `elapsed`.
    #[inline]
    #[must_use]
    pub fn delay_after(&self, elapsed: Duration) -> Duration {
        match self.pacing {
            Pacing::Fixed => self.interval,
            Pacing::Compensated => self.interval.saturating_sub(elapsed),
        }
    }

    /// Total blocking time of `frames` frames in fixed pacing.
    #[must_use]
    pub fn nominal_span(&self, frames: usize) -> Duration {
        self.interval.mul_f64(frames as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_framerate_rejected() {
        assert!(FrameClock::new(0, Pacing::Fixed).is_err());
    }

    #[test]
    fn compensated_subtracts_elapsed() {
        let clock = FrameClock::new(10, Pacing::Compensated).unwrap();
        assert_eq!(
            clock.delay_after(Duration::from_millis(30)),
            Duration::from_millis(70)
        );
        assert_eq!(clock.delay_after(Duration::from_millis(500)), Duration::ZERO);
    }

    #[test]
    fn nominal_span_scales_with_frames() {
        let clock = FrameClock::new(30, Pacing::Fixed).unwrap();
        let span = clock.nominal_span(90);
        assert!((span.as_secs_f64() - 3.0).abs() < 1e-6);
    }
}
