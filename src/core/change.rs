use crate::core::series::PricePoint;

/// Percentage move from the oldest to the newest point of an ascending
/// series. Fewer than two points, or a zero starting value, yield `0`.
pub fn change_percent(history: &[PricePoint]) -> f64 {
    let (Some(oldest), Some(newest)) = (history.first(), history.last()) else {
        return 0.0;
    };
    if history.len() < 2 || oldest.value == 0.0 {
        return 0.0;
    }

    (newest.value - oldest.value) / oldest.value * 100.0
}
