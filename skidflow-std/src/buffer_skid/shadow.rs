//! Shadow register data path.

use skidflow::*;

use crate::valid_ready::*;

/// Next value of the shadow data.
///
/// In low-power mode the data is cleared whenever nothing needs to be held, so that an empty
/// slot always carries zero.
pub(crate) fn next_data(
    low_power: bool, reset: bool, capture: bool, i_fwd: &Valid<Bits>, o_fwd: &Valid<Bits>, o_bwd: &Ready,
    data: &Bits,
) -> Bits {
    select! {
        low_power && (reset || !o_fwd.valid || o_bwd.ready) => Bits::zero(data.width()),
        capture => i_fwd.inner.clone(),
        default => data.clone(),
    }
}
