/// Values within this distance of a whole number of increments are treated
/// as exactly on it.
const SNAP_EPSILON: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundDirection {
    Down,
    Up,
}

/// Rounds `value` to a multiple of `increment`, to the nearest one unless a
/// direction is given. A missing value (empty row set) rounds to 0.
pub fn round_to_increment(
    value: Option<f64>,
    increment: f64,
    direction: Option<RoundDirection>,
) -> f64 {
    let Some(value) = value else {
        return 0.0;
    };
    let denominator = 1.0 / increment;
    let scaled = snap(value * denominator);
    let rounded = match direction {
        None => scaled.round(),
        Some(RoundDirection::Down) => scaled.floor(),
        Some(RoundDirection::Up) => scaled.ceil(),
    };
    rounded / denominator
}

/// Whole number of `increment`s in `span`, rounded down.
pub fn whole_increments(span: f64, increment: f64) -> f64 {
    snap(span / increment).floor()
}

fn snap(x: f64) -> f64 {
    let nearest = x.round();
    if (x - nearest).abs() < SNAP_EPSILON {
        nearest
    } else {
        x
    }
}
