use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
///
/// Used for elapsed run time so that repeated tick increments stay exact
/// and hash identically across machines.
pub type Fixed64 = I32F32;

/// Ticks are the atomic unit of simulation time.
pub type Ticks = u64;

/// Convert an f64 to Fixed64. Use only for initialization, never in sim loop.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display, never in sim loop.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Seconds represented by a whole number of milliseconds.
#[inline]
pub fn millis_to_seconds(ms: u32) -> Fixed64 {
    Fixed64::from_num(ms) / Fixed64::from_num(1000)
}

/// Whole seconds, rounded down. Negative values clamp to zero.
#[inline]
pub fn floor_seconds(v: Fixed64) -> u32 {
    if v <= Fixed64::ZERO {
        return 0;
    }
    v.floor().to_num::<u32>()
}
