//! Handshake controller.
//!
//! Two states: EMPTY (initial and reset target) and OCCUPIED. The state bit is the `valid` flag
//! of the shadow slot.

use skidflow::*;

use crate::valid_ready::*;

/// Upstream accept signal: the buffer takes a new item whenever the shadow slot is free.
pub(crate) fn accept(shadow: &Valid<Bits>) -> Ready { Ready::new(!shadow.valid) }

/// An item arrives while the output slot is full and the consumer stalls.
pub(crate) fn capture(i_fwd: &Valid<Bits>, i_bwd: &Ready, o_fwd: &Valid<Bits>, o_bwd: &Ready) -> bool {
    i_fwd.transfer(i_bwd) && (o_fwd.valid && !o_bwd.ready)
}

/// Next value of the occupied flag.
pub(crate) fn next_occupied(reset: bool, capture: bool, o_bwd: &Ready, occupied: bool) -> bool {
    select! {
        reset => false,
        capture => true,
        o_bwd.ready => false,
        default => occupied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fwd(valid: bool) -> Valid<Bits> { Valid::new(valid, Bits::from_u64(4, 0xa)) }

    #[test]
    fn accepts_only_when_shadow_is_free() {
        assert!(accept(&Valid::invalid(4)).ready);
        assert!(!accept(&fwd(true)).ready);
    }

    #[test]
    fn captures_on_arrival_during_stall() {
        let (accepting, stalled, draining) = (Ready::new(true), Ready::new(false), Ready::new(true));

        assert!(capture(&fwd(true), &accepting, &fwd(true), &stalled));
        assert!(!capture(&fwd(false), &accepting, &fwd(true), &stalled));
        assert!(!capture(&fwd(true), &Ready::new(false), &fwd(true), &stalled));
        assert!(!capture(&fwd(true), &accepting, &fwd(false), &stalled));
        assert!(!capture(&fwd(true), &accepting, &fwd(true), &draining));
    }

    #[test]
    fn transitions() {
        let (ready, stalled) = (Ready::new(true), Ready::new(false));

        // Reset wins over everything.
        assert!(!next_occupied(true, true, &stalled, true));
        // EMPTY -> OCCUPIED.
        assert!(next_occupied(false, true, &stalled, false));
        // OCCUPIED -> EMPTY once the consumer is ready.
        assert!(!next_occupied(false, false, &ready, true));
        // Hold while stalled.
        assert!(next_occupied(false, false, &stalled, true));
        assert!(!next_occupied(false, false, &stalled, false));
    }
}
