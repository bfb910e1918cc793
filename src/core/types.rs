/// Arena index of an elaborated part.
///
/// Parts are stored in pre-order, so the subtree rooted at a part occupies
/// the contiguous range `id .. id + subtree_len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartId(u32);

impl PartId {
    /// Create a part ID from a raw arena index
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Get the raw arena index
    pub fn as_raw(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }

    /// Create a handle to one of this part's ports
    pub fn port(self, port: usize) -> PortRef {
        PortRef { part: self, port }
    }

    /// Create a handle to one of this part's event queues
    pub fn queue(self, queue: usize) -> QueueRef {
        QueueRef { part: self, queue }
    }
}

impl std::fmt::Display for PartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Resolved handle for a port: owning part plus index in its port list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortRef {
    pub(crate) part: PartId,
    pub(crate) port: usize,
}

impl PortRef {
    pub fn part(&self) -> PartId {
        self.part
    }

    pub fn port_index(&self) -> usize {
        self.port
    }
}

/// Resolved handle for an event queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueRef {
    pub(crate) part: PartId,
    pub(crate) queue: usize,
}

impl QueueRef {
    pub fn part(&self) -> PartId {
        self.part
    }

    pub fn queue_index(&self) -> usize {
        self.queue
    }
}

/// Join a parent path and a child name with the hierarchy separator
pub fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}

/// Split a dotted path into its hierarchy segments and final endpoint name
pub fn split_endpoint(path: &str) -> Option<(Vec<&str>, &str)> {
    let mut segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    let endpoint = segments.pop()?;
    Some((segments, endpoint))
}
