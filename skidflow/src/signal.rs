//! Bit-representable values.

use std::fmt;

use crate::utils::{bitvec_to_u64, u64_to_bitvec};

/// Bit-representable values.
///
/// Unlike a hardware description, a simulated signal carries its width at run time, so that the
/// same block can be instantiated for any data width.
pub trait Signal: 'static + fmt::Debug + Clone + PartialEq {
    /// Signal's bit width.
    fn width(&self) -> usize;

    /// Bits of the signal, least significant bit first.
    ///
    /// # Note
    ///
    /// `self.transl().len()` and `self.width()` should be equal.
    fn transl(&self) -> Vec<bool>;

    /// Returns `true` if all bits are low.
    fn is_zero(&self) -> bool { self.transl().into_iter().all(|bit| !bit) }
}

impl Signal for () {
    fn width(&self) -> usize { 0 }

    fn transl(&self) -> Vec<bool> { vec![] }
}

impl Signal for bool {
    fn width(&self) -> usize { 1 }

    fn transl(&self) -> Vec<bool> { vec![*self] }
}

/// Opaque data word of a fixed width.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Bits {
    inner: Vec<bool>,
}

impl Bits {
    /// Creates an all-zero word.
    pub fn zero(width: usize) -> Self { Self { inner: vec![false; width] } }

    /// Creates a word from an integer. Bits that do not fit in `width` are dropped.
    pub fn from_u64(width: usize, value: u64) -> Self { Self { inner: u64_to_bitvec(width, value) } }

    /// Returns the integer value of the lowest 64 bits.
    pub fn to_u64(&self) -> u64 { bitvec_to_u64(&self.inner) }

    /// Zero-extends or truncates to `width` bits.
    #[must_use]
    pub fn resize(&self, width: usize) -> Self {
        let mut inner = self.inner.clone();
        inner.resize(width, false);
        Self { inner }
    }

    /// Hexadecimal digits, most significant first.
    fn hex_digits(&self) -> String {
        if self.inner.is_empty() {
            return "0".to_string();
        }

        self.inner
            .chunks(4)
            .rev()
            .map(|nibble| {
                let value = nibble.iter().enumerate().fold(0, |acc, (i, bit)| if *bit { acc | (1 << i) } else { acc });
                char::from_digit(value, 16).unwrap_or('0')
            })
            .collect()
    }
}

impl<const N: usize> From<[bool; N]> for Bits {
    fn from(inner: [bool; N]) -> Self { Self { inner: inner.to_vec() } }
}

impl Signal for Bits {
    fn width(&self) -> usize { self.inner.len() }

    fn transl(&self) -> Vec<bool> { self.inner.clone() }

    fn is_zero(&self) -> bool { self.inner.iter().all(|bit| !bit) }
}

impl fmt::Debug for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Bits({})", self) }
}

/// Formats as a sized Verilog literal, e.g. `8'h2a`.
impl fmt::Display for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'h{}", self.inner.len(), self.hex_digits())
    }
}
