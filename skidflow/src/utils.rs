//! Utilities.

/// Returns bit-represented value of an integer, least significant bit first.
///
/// Bits above `n` are dropped, and bits beyond the 64th are zero.
pub fn u64_to_bitvec(n: usize, value: u64) -> Vec<bool> {
    let size_of_u64 = ::std::mem::size_of::<u64>();
    (0..n).map(|i| if i >= size_of_u64 * 8 { false } else { (value & (1 << i)) != 0 }).collect::<Vec<_>>()
}

/// Returns the integer value of the lowest 64 bits.
pub fn bitvec_to_u64(bits: &[bool]) -> u64 {
    bits.iter().take(64).enumerate().fold(0, |acc, (i, bit)| if *bit { acc | (1 << i) } else { acc })
}

/// Indents every line in the string.
pub fn indent(str: String, indent: usize) -> String {
    str.lines().map(|l| format!("{}{}", " ".repeat(indent), l)).collect::<Vec<_>>().join("\n")
}

/// Cond operator (aka. if-then-else) on the value level.
pub trait Cond {
    /// Returns `lhs` if `self` holds, `rhs` otherwise.
    fn cond<V>(self, lhs: V, rhs: V) -> V;
}

impl Cond for bool {
    #[inline]
    fn cond<V>(self, lhs: V, rhs: V) -> V {
        if self {
            lhs
        } else {
            rhs
        }
    }
}

/// Priority select: the first arm whose condition holds wins, otherwise `default`.
///
/// ```ignore
/// let next = select! {
///     reset => false,
///     capture => true,
///     default => occupied,
/// };
/// ```
#[macro_export]
macro_rules! select {
    (
        default => $a:expr,
    ) => {
        $a
    };
    (
        $a:expr => $b:expr,
        $($c:tt)*
    ) => {
        $crate::Cond::cond($a, $b, $crate::select!($($c)*))
    }
}

/// Some or executing the given expression.
#[macro_export]
macro_rules! some_or {
    ($e:expr, $err:expr) => {{
        match $e {
            Some(r) => r,
            None => $err,
        }
    }};
}
