use crate::core::components::port_specs::{PortSpec, QueueSpec};
use crate::core::errors::TopologyError;
use crate::core::types::join_path;
use crate::core::values::ValueType;
use std::collections::HashSet;

/// Declaration checks for a single part
pub struct PortValidator;

impl PortValidator {
    /// Validate a part's ports, queues and child names.
    ///
    /// Ports and queues share one namespace; children have their own.
    pub fn validate_declarations(
        path: &str,
        ports: &[PortSpec],
        queues: &[QueueSpec],
        children: &[&str],
    ) -> Result<(), TopologyError> {
        let mut endpoints = HashSet::new();

        for port in ports {
            Self::validate_name(path, &port.name)?;
            if !endpoints.insert(port.name.as_str()) {
                return Err(TopologyError::DuplicateIdentifier {
                    path: path.to_string(),
                    kind: "port",
                    name: port.name.clone(),
                });
            }
            Self::validate_port(path, port)?;
        }

        for queue in queues {
            Self::validate_name(path, &queue.name)?;
            if !endpoints.insert(queue.name.as_str()) {
                return Err(TopologyError::DuplicateIdentifier {
                    path: path.to_string(),
                    kind: "queue",
                    name: queue.name.clone(),
                });
            }
            Self::validate_queue(path, queue)?;
        }

        let mut names = HashSet::new();
        for &child in children {
            Self::validate_name(path, child)?;
            if !names.insert(child) {
                return Err(TopologyError::DuplicateIdentifier {
                    path: path.to_string(),
                    kind: "child",
                    name: child.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Names are single path segments
    fn validate_name(path: &str, name: &str) -> Result<(), TopologyError> {
        if name.is_empty() || name.contains('.') {
            return Err(TopologyError::InvalidDeclaration {
                path: path.to_string(),
                reason: format!("'{}' is not a valid identifier", name),
            });
        }
        Ok(())
    }

    fn validate_port(path: &str, port: &PortSpec) -> Result<(), TopologyError> {
        let port_path = join_path(path, &port.name);
        Self::validate_type(&port_path, port.value_type)?;
        let found = port.initial.value_type();
        if found != port.value_type {
            return Err(TopologyError::InitialValueType {
                path: port_path,
                expected: port.value_type,
                found,
            });
        }
        Ok(())
    }

    fn validate_queue(path: &str, queue: &QueueSpec) -> Result<(), TopologyError> {
        let queue_path = join_path(path, &queue.name);
        Self::validate_type(&queue_path, queue.value_type)?;
        if queue.capacity == 0 {
            return Err(TopologyError::InvalidDeclaration {
                path: queue_path,
                reason: "queue capacity must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    fn validate_type(path: &str, value_type: ValueType) -> Result<(), TopologyError> {
        if !value_type.is_valid() {
            return Err(TopologyError::InvalidDeclaration {
                path: path.to_string(),
                reason: format!("unsupported type {}", value_type),
            });
        }
        Ok(())
    }

    /// Both endpoints of a wire must carry the same type
    pub fn validate_types(
        source_path: &str,
        source_type: ValueType,
        dest: &str,
        dest_type: ValueType,
    ) -> Result<(), TopologyError> {
        if source_type != dest_type {
            return Err(TopologyError::TypeMismatch {
                source_path: source_path.to_string(),
                source_type,
                dest: dest.to_string(),
                dest_type,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::values::Value;

    #[test]
    fn test_port_and_queue_share_namespace() {
        let ports = vec![PortSpec::input("req", ValueType::Logic)];
        let queues = vec![QueueSpec::input("req", ValueType::Logic, 4)];
        let err = PortValidator::validate_declarations("top", &ports, &queues, &[]).unwrap_err();
        assert_eq!(
            err,
            TopologyError::DuplicateIdentifier {
                path: "top".to_string(),
                kind: "queue",
                name: "req".to_string(),
            }
        );
    }

    #[test]
    fn test_child_names_are_separate_namespace() {
        let ports = vec![PortSpec::input("alu", ValueType::Logic)];
        assert!(PortValidator::validate_declarations("top", &ports, &[], &["alu"]).is_ok());
        assert!(matches!(
            PortValidator::validate_declarations("top", &[], &[], &["alu", "alu"]),
            Err(TopologyError::DuplicateIdentifier { kind: "child", .. })
        ));
    }

    #[test]
    fn test_initial_value_type() {
        let ports = vec![PortSpec::output("count", ValueType::Word(8)).with_initial(Value::ONE)];
        assert_eq!(
            PortValidator::validate_declarations("top", &ports, &[], &[]),
            Err(TopologyError::InitialValueType {
                path: "top.count".to_string(),
                expected: ValueType::Word(8),
                found: ValueType::Logic,
            })
        );
    }

    #[test]
    fn test_invalid_declarations() {
        let zero_cap = vec![QueueSpec::input("q", ValueType::Int, 0)];
        assert!(matches!(
            PortValidator::validate_declarations("top", &[], &zero_cap, &[]),
            Err(TopologyError::InvalidDeclaration { path, .. }) if path == "top.q"
        ));

        let wide = vec![PortSpec::input("bus", ValueType::Word(65))];
        assert!(PortValidator::validate_declarations("top", &wide, &[], &[]).is_err());

        let dotted = vec![PortSpec::input("a.b", ValueType::Logic)];
        assert!(PortValidator::validate_declarations("top", &dotted, &[], &[]).is_err());
    }
}
