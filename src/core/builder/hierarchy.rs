//! Path lookup over the elaborated part arena.

use crate::core::components::instance::PartInstance;
use crate::core::components::port_specs::{Direction, QueueSpec, Semantic};
use crate::core::errors::TopologyError;
use crate::core::types::{split_endpoint, PartId, PortRef, QueueRef};
use crate::core::values::{Value, ValueType};

/// Resolved target of a dotted path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Port(PortRef),
    Queue(QueueRef),
}

/// Find the part named by a full dotted path such as `top.alu`
pub fn find_part(parts: &[PartInstance], path: &str) -> Option<PartId> {
    let mut segments = path.split('.');
    let root = parts.first()?;
    if segments.next()? != root.meta.name {
        return None;
    }
    let mut current = PartId::from_raw(0);
    for segment in segments {
        current = *parts[current.index()].meta.child_index.get(segment)?;
    }
    Some(current)
}

/// Resolve a full dotted path to a port or queue
pub fn resolve_endpoint(parts: &[PartInstance], path: &str) -> Result<Endpoint, TopologyError> {
    let unresolved = || TopologyError::UnresolvedPath {
        path: path.to_string(),
    };
    let (owner, name) = split_endpoint(path).ok_or_else(unresolved)?;
    if owner.is_empty() {
        return Err(unresolved());
    }
    let part = find_part(parts, &owner.join(".")).ok_or_else(unresolved)?;
    let meta = &parts[part.index()].meta;
    if let Some(&port) = meta.port_index.get(name) {
        return Ok(Endpoint::Port(part.port(port)));
    }
    if let Some(&queue) = meta.queue_index.get(name) {
        return Ok(Endpoint::Queue(part.queue(queue)));
    }
    Err(unresolved())
}

/// Resolve a full dotted path that must name a port
pub fn resolve_port(parts: &[PartInstance], path: &str) -> Result<PortRef, TopologyError> {
    match resolve_endpoint(parts, path)? {
        Endpoint::Port(port) => Ok(port),
        Endpoint::Queue(_) => Err(TopologyError::InvalidDeclaration {
            path: path.to_string(),
            reason: "expected a port, found an event queue".to_string(),
        }),
    }
}

/// Declared interface of a port: name, type and reset value
#[derive(Debug, Clone, PartialEq)]
pub struct PortInfo {
    pub name: String,
    pub direction: Direction,
    pub value_type: ValueType,
    pub initial: Value,
    pub semantic: Semantic,
}

/// Declared interface of a part, as needed to generate code for it
#[derive(Debug, Clone)]
pub struct PartInfo {
    pub path: String,
    pub ports: Vec<PortInfo>,
    pub queues: Vec<QueueSpec>,
    pub children: Vec<String>,
}

/// Collect the interface of the part at `path`
pub fn part_info(parts: &[PartInstance], path: &str) -> Option<PartInfo> {
    let id = find_part(parts, path)?;
    let meta = &parts[id.index()].meta;
    Some(PartInfo {
        path: meta.path.clone(),
        ports: meta
            .ports
            .iter()
            .map(|spec| PortInfo {
                name: spec.name.clone(),
                direction: spec.direction,
                value_type: spec.value_type,
                initial: spec.initial,
                semantic: spec.semantic,
            })
            .collect(),
        queues: meta.queues.clone(),
        children: meta
            .children
            .iter()
            .map(|child| parts[child.index()].meta.name.clone())
            .collect(),
    })
}
