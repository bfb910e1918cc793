use serde::{Deserialize, Serialize};
use std::fmt;

/// Four-state logic level carried by `Logic` ports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Logic {
    /// Logic low.
    Zero,
    /// Logic high.
    One,
    /// Unknown or uninitialized.
    X,
    /// High impedance.
    Z,
}

impl Logic {
    /// Both `X` and `Z` count as undefined.
    pub fn is_defined(self) -> bool {
        matches!(self, Logic::Zero | Logic::One)
    }

    pub fn from_bool(bit: bool) -> Self {
        if bit {
            Logic::One
        } else {
            Logic::Zero
        }
    }

    /// Logical inversion; undefined levels stay `X`.
    pub fn not(self) -> Self {
        match self {
            Logic::Zero => Logic::One,
            Logic::One => Logic::Zero,
            Logic::X | Logic::Z => Logic::X,
        }
    }

    fn vcd_char(self) -> char {
        match self {
            Logic::Zero => '0',
            Logic::One => '1',
            Logic::X => 'x',
            Logic::Z => 'z',
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.vcd_char())
    }
}

/// Structural type of a port, queue or value.
///
/// Two endpoints are compatible when their types are equal; word widths
/// must match exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// Single four-state bit.
    Logic,
    /// Unsigned bit vector of the given width (1..=64).
    Word(u32),
    /// Signed 64-bit integer.
    Int,
}

impl ValueType {
    /// Bit width used when dumping the type to a waveform.
    pub fn width(self) -> u32 {
        match self {
            ValueType::Logic => 1,
            ValueType::Word(width) => width,
            ValueType::Int => 64,
        }
    }

    pub fn is_valid(self) -> bool {
        match self {
            ValueType::Word(width) => (1..=64).contains(&width),
            _ => true,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Logic => write!(f, "logic"),
            ValueType::Word(width) => write!(f, "word<{}>", width),
            ValueType::Int => write!(f, "int"),
        }
    }
}

/// A value travelling on a port.
///
/// UNKNOWN is a first-class value: `Logic(X)` for logic ports and
/// `Unknown(ty)` for the other types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    Logic(Logic),
    Word { bits: u64, width: u32 },
    Int(i64),
    Unknown(ValueType),
}

impl Value {
    pub const ZERO: Value = Value::Logic(Logic::Zero);
    pub const ONE: Value = Value::Logic(Logic::One);
    pub const X: Value = Value::Logic(Logic::X);

    /// The unknown value of `ty`.
    pub fn unknown(ty: ValueType) -> Self {
        match ty {
            ValueType::Logic => Value::Logic(Logic::X),
            other => Value::Unknown(other),
        }
    }

    /// A word value; bits above `width` are masked off.
    pub fn word(bits: u64, width: u32) -> Self {
        let mask = if width >= 64 { u64::MAX } else { (1u64 << width) - 1 };
        Value::Word {
            bits: bits & mask,
            width,
        }
    }

    pub fn bit(bit: bool) -> Self {
        Value::Logic(Logic::from_bool(bit))
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Logic(_) => ValueType::Logic,
            Value::Word { width, .. } => ValueType::Word(*width),
            Value::Int(_) => ValueType::Int,
            Value::Unknown(ty) => *ty,
        }
    }

    pub fn is_defined(&self) -> bool {
        match self {
            Value::Logic(level) => level.is_defined(),
            Value::Unknown(_) => false,
            _ => true,
        }
    }

    /// Whether the value is a defined "true" level. Undefined values are
    /// never asserted.
    pub fn is_asserted(&self) -> bool {
        match self {
            Value::Logic(level) => *level == Logic::One,
            Value::Word { bits, .. } => *bits != 0,
            Value::Int(value) => *value != 0,
            Value::Unknown(_) => false,
        }
    }

    pub fn as_logic(&self) -> Option<Logic> {
        match self {
            Value::Logic(level) => Some(*level),
            _ => None,
        }
    }

    /// Numeric view of a defined value, used for time references.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Logic(Logic::Zero) => Some(0),
            Value::Logic(Logic::One) => Some(1),
            Value::Word { bits, .. } => Some(*bits),
            Value::Int(value) => u64::try_from(*value).ok(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            Value::Word { bits, .. } => i64::try_from(*bits).ok(),
            Value::Logic(Logic::Zero) => Some(0),
            Value::Logic(Logic::One) => Some(1),
            _ => None,
        }
    }

    /// Formats the value as a VCD value token (without the identifier).
    pub fn to_vcd(&self) -> String {
        match self {
            Value::Logic(level) => level.vcd_char().to_string(),
            Value::Word { bits, width } => format!("b{:0w$b}", bits, w = *width as usize),
            Value::Int(value) => format!("b{:b}", *value as u64),
            Value::Unknown(ty) if ty.width() == 1 => "x".to_string(),
            Value::Unknown(_) => "bx".to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Logic(level) => write!(f, "{}", level),
            Value::Word { bits, width } => write!(f, "{}'h{:x}", width, bits),
            Value::Int(value) => write!(f, "{}", value),
            Value::Unknown(ty) => write!(f, "{}:x", ty),
        }
    }
}

impl From<Logic> for Value {
    fn from(level: Logic) -> Self {
        Value::Logic(level)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<bool> for Value {
    fn from(bit: bool) -> Self {
        Value::bit(bit)
    }
}
