//! Volume above 100% through an amplification stage.

pub const MIN_VOLUME: f64 = 0.0;
pub const MAX_VOLUME: f64 = 2.0;

/// How a requested volume is split between the media element and the gain stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeMapping {
    /// Effective volume after clamping to the available range.
    pub effective: f64,
    /// Native element volume, always within `[0, 1]`.
    pub native: f64,
    /// Amplification gain; unity unless boosting.
    pub gain: f64,
}

/// Splits `requested` (clamped to `[0, 2]`).
///
/// Without an amplification stage the result is capped at 1.0.
pub fn map_volume(requested: f64, amplifier_available: bool) -> VolumeMapping {
    let requested = if requested.is_nan() {
        MIN_VOLUME
    } else {
        requested.clamp(MIN_VOLUME, MAX_VOLUME)
    };

    if requested <= 1.0 {
        VolumeMapping {
            effective: requested,
            native: requested,
            gain: 1.0,
        }
    } else if amplifier_available {
        VolumeMapping {
            effective: requested,
            native: 1.0,
            gain: requested,
        }
    } else {
        VolumeMapping {
            effective: 1.0,
            native: 1.0,
            gain: 1.0,
        }
    }
}
