use tr_core::error::CoreError;

/// Bornes supérieures inclusives des 5 niveaux de luminosité.
pub const BUCKET_BOUNDS: [u16; 5] = [51, 102, 153, 204, 255];

/// Moyenne entière des trois canaux, dans [0, 255].
///
/// # Example
/// ```
/// use tr_glyph::shading::brightness;
/// assert_eq!(brightness(255, 255, 255), 255);
/// assert_eq!(brightness(10, 200, 30), 80);
/// ```
#[inline(always)]
#[must_use]
pub fn brightness(r: u8, g: u8, b: u8) -> u16 {
    (u16::from(r) + u16::from(g) + u16::from(b)) / 3
}

/// Index de palette pour une luminosité.
///
/// ≤51 → 0, ≤102 → 1, ≤153 → 2, ≤204 → 3, ≤255 → 4.
///
/// # Errors
/// [`CoreError::Invariant`] for a value above 255. [`brightness`] can never
/// produce one, so hitting this means the pipeline is broken.
///
/// # Example
/// ```
/// use tr_glyph::shading::bucket_index;
/// assert_eq!(bucket_index(51).unwrap(), 0);
/// assert_eq!(bucket_index(52).unwrap(), 1);
/// assert!(bucket_index(256).is_err());
/// ```
#[inline]
pub fn bucket_index(brightness: u16) -> Result<usize, CoreError> {
    BUCKET_BOUNDS
        .iter()
        .position(|&upper| brightness <= upper)
        .ok_or_else(|| {
            CoreError::Invariant(format!("luminosité {brightness} hors de [0, 255]"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_boundaries_are_inclusive() {
        let cases = [
            (0, 0),
            (51, 0),
            (52, 1),
            (102, 1),
            (103, 2),
            (153, 2),
            (154, 3),
            (204, 3),
            (205, 4),
            (255, 4),
        ];
        for (value, expected) in cases {
            assert_eq!(bucket_index(value).unwrap(), expected, "luminosité {value}");
        }
    }

    #[test]
    fn every_rgb_average_lands_in_a_bucket() {
        for sum in 0u16..=765 {
            let r = sum.min(255) as u8;
            let g = sum.saturating_sub(255).min(255) as u8;
            let b = sum.saturating_sub(510) as u8;
            let lum = brightness(r, g, b);
            assert_eq!(lum, sum / 3);
            let bucket = bucket_index(lum).unwrap();
            let lower = if bucket == 0 { 0 } else { BUCKET_BOUNDS[bucket - 1] + 1 };
            assert!(lum >= lower && lum <= BUCKET_BOUNDS[bucket]);
        }
    }

    #[test]
    fn out_of_range_is_an_invariant_violation() {
        assert!(matches!(bucket_index(256), Err(CoreError::Invariant(_))));
        assert!(matches!(bucket_index(u16::MAX), Err(CoreError::Invariant(_))));
    }
}
