// The rotation engine: pure functions over a rotation snapshot
// Everything here is deterministic in (rotation, instant) and never fails

pub mod assign;
pub mod check;
pub mod round;

pub use assign::*;
pub use check::*;
pub use round::*;

/// Mathematically correct modulo: the result is always in `[0, modulus)`,
/// including for negative values.
pub fn wrap_index(value: i64, modulus: usize) -> usize {
    if modulus == 0 {
        return 0;
    }
    value.rem_euclid(modulus as i64) as usize
}
