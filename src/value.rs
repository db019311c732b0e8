//! Parameter values bound into translation templates.

use std::{fmt, rc::Rc};

/// A value that can be substituted into a placeholder.
///
/// The string written into the template is the value's [`Display`](fmt::Display) form.
#[derive(Clone)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    /// Any other displayable value. Compared by identity, not by content.
    Object(Rc<dyn fmt::Display>),
}

impl ParamValue {
    /// Wraps an arbitrary displayable value.
    pub fn object<T: fmt::Display + 'static>(value: T) -> Self {
        ParamValue::Object(Rc::new(value))
    }
}

impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        use ParamValue::*;
        match (self, other) {
            (Str(a), Str(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (UInt(a), UInt(b)) => a == b,
            // Bitwise, so `-0.0` and `0.0` differ like their text does. Any NaN equals any NaN.
            (Float(a), Float(b)) => a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan()),
            (Bool(a), Bool(b)) => a == b,
            (Object(a), Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(value) => f.write_str(value),
            ParamValue::Int(value) => write!(f, "{}", value),
            ParamValue::UInt(value) => write!(f, "{}", value),
            ParamValue::Float(value) => write!(f, "{}", value),
            ParamValue::Bool(value) => write!(f, "{}", value),
            ParamValue::Object(value) => write!(f, "{}", value),
        }
    }
}

impl fmt::Debug for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(value) => f.debug_tuple("Str").field(value).finish(),
            ParamValue::Int(value) => f.debug_tuple("Int").field(value).finish(),
            ParamValue::UInt(value) => f.debug_tuple("UInt").field(value).finish(),
            ParamValue::Float(value) => f.debug_tuple("Float").field(value).finish(),
            ParamValue::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            ParamValue::Object(value) => write!(f, "Object({})", value),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Str(value.clone())
    }
}

impl From<char> for ParamValue {
    fn from(value: char) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

macro_rules! impl_from_signed {
    ($($ty:ty),*) => {
        $(impl From<$ty> for ParamValue {
            fn from(value: $ty) -> Self {
                ParamValue::Int(value as i64)
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($ty:ty),*) => {
        $(impl From<$ty> for ParamValue {
            fn from(value: $ty) -> Self {
                ParamValue::UInt(value as u64)
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        ParamValue::Float(f64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}
