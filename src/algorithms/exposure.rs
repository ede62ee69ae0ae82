//! Exposure and imaging-quality estimation.

/// Clamp bounds for the exposure estimate, keeping pathological magnitudes
/// or sky conditions from destabilizing scheduling scores.
pub const MIN_EXPOSURE_HOURS: f64 = 0.5;
pub const MAX_EXPOSURE_HOURS: f64 = 20.0;

/// Required integration time for a target.
///
/// `base_hours * 2.5^(magnitude - 10) * (bortle / 4)^1.5`, clamped to
/// `[0.5, 20.0]` hours. Each magnitude step costs a factor of 2.5 in flux;
/// brighter skies (higher Bortle) scale the time up super-linearly.
pub fn required_exposure_hours(magnitude: f64, bortle_index: u8, base_hours: f64) -> qtty::Hours {
    let magnitude_factor = 2.5f64.powf(magnitude - 10.0);
    let sky_factor = (bortle_index as f64 / 4.0).powf(1.5);
    let hours = (base_hours * magnitude_factor * sky_factor)
        .clamp(MIN_EXPOSURE_HOURS, MAX_EXPOSURE_HOURS);
    qtty::Hours::new(hours)
}

/// Imaging-quality score for the `optimal_snr` strategy: how many times over
/// the required integration fits into the available moon-free time. Higher
/// is better; zero moon-free time scores zero.
pub fn snr_quality(
    magnitude: f64,
    bortle_index: u8,
    base_hours: f64,
    moon_free: qtty::Hours,
) -> f64 {
    let required = required_exposure_hours(magnitude, bortle_index, base_hours);
    moon_free.value().max(0.0) / required.value()
}

/// Normalized difficulty in [0, 1]: the required exposure relative to the
/// clamp range. Used by the `difficulty_balanced` strategy.
pub fn difficulty(magnitude: f64, bortle_index: u8, base_hours: f64) -> f64 {
    let required = required_exposure_hours(magnitude, bortle_index, base_hours).value();
    (required - MIN_EXPOSURE_HOURS) / (MAX_EXPOSURE_HOURS - MIN_EXPOSURE_HOURS)
}
