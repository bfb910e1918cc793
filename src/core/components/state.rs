use crate::core::values::Value;

/// Runtime state of one port.
///
/// Besides the current value, a port remembers whether it has ever held a
/// defined value; `AllDefined` scheduling conditions gate on that flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortState {
    value: Value,
    ever_defined: bool,
}

impl PortState {
    pub fn new(initial: Value) -> Self {
        Self {
            value: initial,
            ever_defined: initial.is_defined(),
        }
    }

    pub fn value(&self) -> Value {
        self.value
    }

    pub fn ever_defined(&self) -> bool {
        self.ever_defined
    }

    pub(crate) fn set(&mut self, value: Value) {
        self.value = value;
        self.ever_defined |= value.is_defined();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ever_defined_latches() {
        let mut port = PortState::new(Value::X);
        assert!(!port.ever_defined());
        port.set(Value::ONE);
        assert!(port.ever_defined());
        port.set(Value::X);
        assert!(port.ever_defined());
        assert_eq!(port.value(), Value::X);
    }
}
