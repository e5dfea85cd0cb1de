use std::fmt::Debug;

/// Intermediate representation used to convert between sample types.
///
/// Integers widen losslessly into `i128`, floats into `f64`. Narrowing uses
/// `as` semantics (truncation for float to integer).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Widened {
    Int(i128),
    Float(f64),
}

impl Widened {
    /// `self + rhs`; mixing an integer with a float yields a float.
    pub fn add(self, rhs: Widened) -> Widened {
        match (self, rhs) {
            (Widened::Int(a), Widened::Int(b)) => Widened::Int(a.wrapping_add(b)),
            (a, b) => Widened::Float(a.as_f64() + b.as_f64()),
        }
    }

    /// `self / count`, truncating toward zero for integers. A zero count
    /// yields zero.
    pub fn div_count(self, count: usize) -> Widened {
        match self {
            Widened::Int(v) => Widened::Int(v.checked_div(count as i128).unwrap_or(0)),
            Widened::Float(_) if count == 0 => Widened::Float(0.0),
            Widened::Float(v) => Widened::Float(v / count as f64),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Widened::Int(v) => v as f64,
            Widened::Float(v) => v,
        }
    }
}

/// A scalar numeric value that can be kept in a sample window.
///
/// Integer arithmetic wraps instead of panicking: a counter that rolled over
/// produces the same huge delta the kernel counter would, and callers are
/// expected to consult `has_wrapped` before trusting it.
pub trait Sample: Copy + Default + PartialOrd + Debug + Send + Sync + 'static {
    /// Converts a sample count into this type.
    fn from_count(n: usize) -> Self;

    /// `self - older`
    fn diff(self, older: Self) -> Self;

    /// `self * factor`
    fn scale(self, factor: Self) -> Self;

    fn is_zero(self) -> bool;

    fn widen(self) -> Widened;

    fn narrow(value: Widened) -> Self;

    /// Converts this sample into another sample type with `as` semantics.
    fn cast<V: Sample>(self) -> V {
        V::narrow(self.widen())
    }
}

macro_rules! impl_integer_sample {
    ($($t:ty),* $(,)?) => {
        $(
            impl Sample for $t {
                fn from_count(n: usize) -> Self {
                    n as $t
                }

                fn diff(self, older: Self) -> Self {
                    self.wrapping_sub(older)
                }

                fn scale(self, factor: Self) -> Self {
                    self.wrapping_mul(factor)
                }

                fn is_zero(self) -> bool {
                    self == 0
                }

                fn widen(self) -> Widened {
                    Widened::Int(self as i128)
                }

                fn narrow(value: Widened) -> Self {
                    match value {
                        Widened::Int(v) => v as $t,
                        Widened::Float(v) => v as $t,
                    }
                }
            }
        )*
    };
}

macro_rules! impl_float_sample {
    ($($t:ty),* $(,)?) => {
        $(
            impl Sample for $t {
                fn from_count(n: usize) -> Self {
                    n as $t
                }

                fn diff(self, older: Self) -> Self {
                    self - older
                }

                fn scale(self, factor: Self) -> Self {
                    self * factor
                }

                fn is_zero(self) -> bool {
                    self == 0.0
                }

                fn widen(self) -> Widened {
                    Widened::Float(self as f64)
                }

                fn narrow(value: Widened) -> Self {
                    match value {
                        Widened::Int(v) => v as $t,
                        Widened::Float(v) => v as $t,
                    }
                }
            }
        )*
    };
}

impl_integer_sample!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);
impl_float_sample!(f32, f64);
