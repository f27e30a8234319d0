use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Copy)]
pub struct Number(f64);

impl Number {
    /// Creates a new `Number` from an `f64` value.
    pub fn new(value: f64) -> Self {
        Number(value)
    }

    /// Returns the underlying `f64` value.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Returns `true` if the number is zero or very close to zero.
    pub fn is_zero(&self) -> bool {
        self.0.abs() < f64::EPSILON
    }
}

impl Default for Number {
    fn default() -> Self {
        Number(0.0)
    }
}

macro_rules! impl_from_primitive {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Number(value as f64)
                }
            }
        )*
    };
}

impl_from_primitive!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// Magnitudes outside `[SMALL, LARGE)` print in exponent form.
const SMALL: f64 = 1e-6;
const LARGE: f64 = 1e21;

impl fmt::Display for Number {
    /// Shortest digits that round-trip. Whole numbers have no fraction, and
    /// very small or very large magnitudes use exponent form (`1e+21`, `1e-7`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs = self.0.abs();

        if self.0.is_nan() {
            write!(f, "NaN")
        } else if self.0.is_infinite() {
            write!(f, "{}Inf", if self.0 > 0.0 { "+" } else { "-" })
        } else if self.0 == 0.0 {
            write!(f, "0")
        } else if !(SMALL..LARGE).contains(&abs) {
            let s = format!("{:e}", self.0);
            match s.split_once('e') {
                Some((mantissa, exp)) if !exp.starts_with('-') => write!(f, "{}e+{}", mantissa, exp),
                _ => write!(f, "{}", s),
            }
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for Number {}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.is_nan(), other.0.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.0.partial_cmp(&other.0).unwrap_or(Ordering::Less),
        }
    }
}
