//! Jitter offsets and capture file naming.

use rand::Rng;

/// Offset magnitudes (mm) of the two capture passes, in run order.
pub const JITTER_OFFSETS_MM: [f64; 2] = [0.025, 0.05];

/// A signed X/Y jitter step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Jitter {
    pub dx: f64,
    pub dy: f64,
}

impl Jitter {
    /// Draw a jitter of `magnitude` with an independent random sign per axis.
    pub fn random<R: Rng + ?Sized>(magnitude: f64, rng: &mut R) -> Self {
        Self {
            dx: magnitude * random_sign(rng),
            dy: magnitude * random_sign(rng),
        }
    }
}

/// +1.0 or -1.0 with equal probability.
pub fn random_sign<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    if rng.gen_bool(0.5) {
        1.0
    } else {
        -1.0
    }
}

/// `capture_<offset>_<seq>.jpg`, with `seq` zero-padded to three digits.
pub fn capture_file_name(offset: f64, sequence: u32) -> String {
    format!("capture_{}_{:03}.jpg", offset, sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_capture_file_name() {
        assert_eq!(capture_file_name(0.025, 1), "capture_0.025_001.jpg");
        assert_eq!(capture_file_name(0.05, 10), "capture_0.05_010.jpg");
        assert_eq!(capture_file_name(0.05, 123), "capture_0.05_123.jpg");
    }

    #[test]
    fn test_jitter_magnitude_is_fixed() {
        let mut rng = StdRng::seed_from_u64(7);
        for offset in JITTER_OFFSETS_MM {
            for _ in 0..100 {
                let jitter = Jitter::random(offset, &mut rng);
                assert_eq!(jitter.dx.abs(), offset);
                assert_eq!(jitter.dy.abs(), offset);
            }
        }
    }

    #[test]
    fn test_signs_are_independent_and_both_occur() {
        let mut rng = StdRng::seed_from_u64(42);
        let jitters: Vec<Jitter> = (0..200).map(|_| Jitter::random(0.05, &mut rng)).collect();

        let mixed = jitters.iter().filter(|j| j.dx.signum() != j.dy.signum()).count();
        let positive_x = jitters.iter().filter(|j| j.dx > 0.0).count();

        // With 200 draws every quadrant shows up; exact counts depend on the seed
        assert!(mixed > 0 && mixed < 200);
        assert!(positive_x > 0 && positive_x < 200);
    }
}
