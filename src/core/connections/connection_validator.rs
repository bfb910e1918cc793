use crate::core::components::port_specs::Direction;
use crate::core::errors::TopologyError;
use crate::core::types::PartId;

/// Structural relation between the owners of a wire's endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireKind {
    /// Output of one child to an input of a sibling (or of itself)
    Sibling,
    /// Input of a parent passed down to an input of its child
    Down,
    /// Output of a child passed up to an output of its parent
    Up,
}

/// One endpoint of a port wire as seen by the validator
#[derive(Debug, Clone, Copy)]
pub struct EndpointInfo<'a> {
    pub path: &'a str,
    pub part: PartId,
    pub parent: Option<PartId>,
    pub direction: Direction,
}

/// Wire legality checks
pub struct ConnectionValidator;

impl ConnectionValidator {
    /// Classify a port wire, rejecting anything outside sibling and
    /// parent/child scope or with the wrong directions for its scope
    pub fn classify_port_wire(
        source: EndpointInfo<'_>,
        dest: EndpointInfo<'_>,
    ) -> Result<WireKind, TopologyError> {
        let illegal = |reason: &str| TopologyError::IllegalWire {
            source_path: source.path.to_string(),
            dest: dest.path.to_string(),
            reason: reason.to_string(),
        };
        let direction = |reason: &str| TopologyError::DirectionMismatch {
            source_path: source.path.to_string(),
            dest: dest.path.to_string(),
            reason: reason.to_string(),
        };

        let kind = if source.part == dest.part {
            if source.parent.is_none() {
                return Err(illegal("the root part cannot wire to itself"));
            }
            WireKind::Sibling
        } else if source.parent.is_some() && source.parent == dest.parent {
            WireKind::Sibling
        } else if dest.parent == Some(source.part) {
            WireKind::Down
        } else if source.parent == Some(dest.part) {
            WireKind::Up
        } else {
            return Err(illegal("endpoints are neither siblings nor parent and child"));
        };

        match (kind, source.direction, dest.direction) {
            (WireKind::Sibling, Direction::Out, Direction::In) => Ok(kind),
            (WireKind::Sibling, _, _) => Err(direction("sibling wires go from an output to an input")),
            (WireKind::Down, Direction::In, Direction::In) => Ok(kind),
            (WireKind::Down, _, _) => Err(direction(
                "parent to child wires go from a parent input to a child input",
            )),
            (WireKind::Up, Direction::Out, Direction::Out) => Ok(kind),
            (WireKind::Up, _, _) => Err(direction(
                "child to parent wires go from a child output to a parent output",
            )),
        }
    }

    /// A queue of part Q may feed input ports of Q or of Q's direct children
    pub fn validate_queue_wire(
        queue_path: &str,
        queue_owner: PartId,
        dest: EndpointInfo<'_>,
    ) -> Result<(), TopologyError> {
        if dest.part != queue_owner && dest.parent != Some(queue_owner) {
            return Err(TopologyError::IllegalWire {
                source_path: queue_path.to_string(),
                dest: dest.path.to_string(),
                reason: "queues feed their own part or its direct children".to_string(),
            });
        }
        if dest.direction != Direction::In {
            return Err(TopologyError::DirectionMismatch {
                source_path: queue_path.to_string(),
                dest: dest.path.to_string(),
                reason: "queues feed input ports".to_string(),
            });
        }
        Ok(())
    }
}
