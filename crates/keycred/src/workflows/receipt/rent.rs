use super::features::FinancialFeatures;

/// Share of stable monthly income that may go to rent at full confidence.
pub const RENT_TO_INCOME_SHARE: f64 = 0.40;
/// Score at which confidence starts to grow above zero.
pub const CONFIDENCE_FLOOR_SCORE: u16 = 300;
pub const RENT_STEP: u32 = 100;

/// Linear confidence in `[0, 1]` between the floor score and 1000.
pub fn confidence(score: u16) -> f64 {
    let span = f64::from(1000 - CONFIDENCE_FLOOR_SCORE);
    ((f64::from(score) - f64::from(CONFIDENCE_FLOOR_SCORE)) / span).clamp(0.0, 1.0)
}

/// Recommended monthly rent ceiling in whole lira, rounded down to `RENT_STEP`.
/// Zero whenever no income was observed.
pub fn max_rent_limit(score: u16, features: &FinancialFeatures) -> u32 {
    let Some(stable) = features.stable_monthly_income() else {
        return 0;
    };
    if !stable.is_finite() || stable <= 0.0 {
        return 0;
    }

    let raw = stable * RENT_TO_INCOME_SHARE * confidence(score);
    let steps = (raw / f64::from(RENT_STEP)).floor();
    if steps >= f64::from(u32::MAX / RENT_STEP) {
        return u32::MAX / RENT_STEP * RENT_STEP;
    }
    steps as u32 * RENT_STEP
}
