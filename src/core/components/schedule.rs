//! Scheduling predicates and edge triggers.
//!
//! A part's [`Schedule`] is a conjunction of terms. Each term pairs a
//! pluggable [`Condition`] with the names of the ports and queues it reads;
//! names are resolved to slots once, when the design is elaborated.

use crate::core::components::state::PortState;
use crate::core::errors::TopologyError;
use crate::core::events::EventQueue;
use crate::core::values::Value;

/// A resolved scheduling argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgSlot {
    Port(usize),
    Queue(usize),
}

/// Snapshot of one scheduling argument as seen by a condition
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArgState {
    Port(PortState),
    Queue { pending: bool },
}

impl ArgState {
    /// Port held a defined value at least once, or queue has a pending event
    pub fn is_available(&self) -> bool {
        match self {
            ArgState::Port(port) => port.ever_defined(),
            ArgState::Queue { pending } => *pending,
        }
    }
}

/// Read-only view of a term's arguments in declaration order
pub struct ConditionInputs<'a> {
    names: &'a [String],
    slots: &'a [ArgSlot],
    ports: &'a [PortState],
    queues: &'a [EventQueue],
}

impl<'a> ConditionInputs<'a> {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// State of the `index`-th argument
    pub fn get(&self, index: usize) -> Option<ArgState> {
        let state = match self.slots.get(index)? {
            ArgSlot::Port(port) => ArgState::Port(self.ports[*port]),
            ArgSlot::Queue(queue) => ArgState::Queue {
                pending: self.queues[*queue].has_pending(),
            },
        };
        Some(state)
    }

    /// State of the argument called `name`
    pub fn by_name(&self, name: &str) -> Option<ArgState> {
        let index = self.names.iter().position(|n| n == name)?;
        self.get(index)
    }

    /// Current value of a port argument
    pub fn value(&self, name: &str) -> Option<Value> {
        match self.by_name(name)? {
            ArgState::Port(port) => Some(port.value()),
            ArgState::Queue { .. } => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ArgState)> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i).map(|state| (self.names[i].as_str(), state)))
    }
}

/// Pluggable scheduling predicate.
///
/// Implementations must be pure: the same inputs give the same answer.
pub trait Condition: Send + Sync {
    fn is_ready(&self, inputs: &ConditionInputs<'_>) -> bool;
}

/// Always ready
pub struct Always;

impl Condition for Always {
    fn is_ready(&self, _inputs: &ConditionInputs<'_>) -> bool {
        true
    }
}

/// Ready once every argument port has been assigned a defined value at
/// least once; queue arguments must have a pending event.
pub struct AllDefined;

impl Condition for AllDefined {
    fn is_ready(&self, inputs: &ConditionInputs<'_>) -> bool {
        inputs.iter().all(|(_, state)| state.is_available())
    }
}

/// Ready when every argument queue has a pending event; port arguments must
/// currently hold a defined value.
pub struct QueuePending;

impl Condition for QueuePending {
    fn is_ready(&self, inputs: &ConditionInputs<'_>) -> bool {
        inputs.iter().all(|(_, state)| match state {
            ArgState::Queue { pending } => pending,
            ArgState::Port(port) => port.value().is_defined(),
        })
    }
}

/// Closure-backed condition
pub struct FnCondition<F>(pub F);

impl<F> Condition for FnCondition<F>
where
    F: Fn(&ConditionInputs<'_>) -> bool + Send + Sync,
{
    fn is_ready(&self, inputs: &ConditionInputs<'_>) -> bool {
        (self.0)(inputs)
    }
}

struct Term {
    condition: Box<dyn Condition>,
    args: Vec<String>,
}

/// Declared scheduling condition of a part
pub struct Schedule {
    terms: Vec<Term>,
}

impl Schedule {
    /// No condition: the part runs every step
    pub fn always() -> Self {
        Self { terms: Vec::new() }
    }

    /// Single-term schedule with a custom condition
    pub fn when<C, I, S>(condition: C, args: I) -> Self
    where
        C: Condition + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            terms: vec![Term {
                condition: Box::new(condition),
                args: args.into_iter().map(Into::into).collect(),
            }],
        }
    }

    pub fn all_defined<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::when(AllDefined, args)
    }

    pub fn queue_pending<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::when(QueuePending, args)
    }

    pub fn from_fn<F, I, S>(args: I, f: F) -> Self
    where
        F: Fn(&ConditionInputs<'_>) -> bool + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::when(FnCondition(f), args)
    }

    /// Conjunction of two schedules
    pub fn and(mut self, other: Schedule) -> Self {
        self.terms.extend(other.terms);
        self
    }

    /// Names of every argument across all terms
    pub fn arg_names(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().flat_map(|t| t.args.iter().map(String::as_str))
    }

    pub(crate) fn resolve<R>(self, path: &str, lookup: R) -> Result<ResolvedSchedule, TopologyError>
    where
        R: Fn(&str) -> Option<ArgSlot>,
    {
        let mut terms = Vec::with_capacity(self.terms.len());
        for term in self.terms {
            let mut slots = Vec::with_capacity(term.args.len());
            for arg in &term.args {
                let slot = lookup(arg).ok_or_else(|| TopologyError::UnresolvedPath {
                    path: format!("{}.{}", path, arg),
                })?;
                slots.push(slot);
            }
            terms.push(ResolvedTerm {
                condition: term.condition,
                names: term.args,
                slots,
            });
        }
        Ok(ResolvedSchedule { terms })
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::always()
    }
}

impl std::fmt::Debug for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.terms.iter().map(|t| &t.args)).finish()
    }
}

struct ResolvedTerm {
    condition: Box<dyn Condition>,
    names: Vec<String>,
    slots: Vec<ArgSlot>,
}

pub(crate) struct ResolvedSchedule {
    terms: Vec<ResolvedTerm>,
}

impl ResolvedSchedule {
    pub(crate) fn is_ready(&self, ports: &[PortState], queues: &[EventQueue]) -> bool {
        self.terms.iter().all(|term| {
            term.condition.is_ready(&ConditionInputs {
                names: &term.names,
                slots: &term.slots,
                ports,
                queues,
            })
        })
    }
}

/// Transition an edge-sensitive behavior waits for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Non-asserted to asserted
    Rising,
    /// Asserted to non-asserted
    Falling,
}

/// Edge sensitivity declared on a part's behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeTrigger {
    pub port: String,
    pub kind: EdgeKind,
}

impl EdgeTrigger {
    pub fn rising(port: &str) -> Self {
        Self {
            port: port.to_string(),
            kind: EdgeKind::Rising,
        }
    }

    pub fn falling(port: &str) -> Self {
        Self {
            port: port.to_string(),
            kind: EdgeKind::Falling,
        }
    }
}

/// Latch of the previously sampled trigger value.
///
/// Starts out UNKNOWN, so the very first sample can never fire. Undefined
/// samples on either side of a transition never fire either.
#[derive(Debug, Clone)]
pub struct EdgeDetector {
    pub(crate) port: usize,
    kind: EdgeKind,
    previous: Option<Value>,
}

impl EdgeDetector {
    pub fn new(port: usize, kind: EdgeKind) -> Self {
        Self {
            port,
            kind,
            previous: None,
        }
    }

    /// Whether `current` completes a transition from the latched value
    pub fn fires(&self, current: &Value) -> bool {
        let Some(previous) = self.previous else {
            return false;
        };
        if !previous.is_defined() || !current.is_defined() {
            return false;
        }
        match self.kind {
            EdgeKind::Rising => !previous.is_asserted() && current.is_asserted(),
            EdgeKind::Falling => previous.is_asserted() && !current.is_asserted(),
        }
    }

    /// Record the value sampled this step
    pub fn latch(&mut self, current: Value) {
        self.previous = Some(current);
    }

    pub fn previous(&self) -> Option<Value> {
        self.previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::values::ValueType;

    fn fire_pattern(kind: EdgeKind, samples: &[Value]) -> Vec<bool> {
        let mut detector = EdgeDetector::new(0, kind);
        samples
            .iter()
            .map(|v| {
                let fired = detector.fires(v);
                detector.latch(*v);
                fired
            })
            .collect()
    }

    #[test]
    fn test_rising_edge_ignores_unknown_start() {
        let fired = fire_pattern(
            EdgeKind::Rising,
            &[Value::X, Value::ONE, Value::ONE, Value::ZERO, Value::ONE],
        );
        assert_eq!(fired, vec![false, false, false, false, true]);
    }

    #[test]
    fn test_falling_edge() {
        let fired = fire_pattern(
            EdgeKind::Falling,
            &[Value::ONE, Value::ZERO, Value::X, Value::ZERO, Value::ONE, Value::ZERO],
        );
        assert_eq!(fired, vec![false, true, false, false, false, true]);
    }

    #[test]
    fn test_first_sample_never_fires() {
        let detector = EdgeDetector::new(0, EdgeKind::Rising);
        assert!(!detector.fires(&Value::ONE));
        assert_eq!(detector.previous(), None);
    }

    #[test]
    fn test_schedule_resolution_and_conjunction() {
        let schedule = Schedule::all_defined(["a"]).and(Schedule::queue_pending(["q"]));
        assert_eq!(schedule.arg_names().collect::<Vec<_>>(), vec!["a", "q"]);

        let resolved = schedule
            .resolve("top.p", |name| match name {
                "a" => Some(ArgSlot::Port(0)),
                "q" => Some(ArgSlot::Queue(0)),
                _ => None,
            })
            .unwrap();

        let queue = EventQueue::new("top.p.q", ValueType::Int, 2);
        let mut ports = vec![PortState::new(Value::X)];
        let queues = vec![queue.clone()];

        assert!(!resolved.is_ready(&ports, &queues));
        ports[0].set(Value::ONE);
        assert!(!resolved.is_ready(&ports, &queues));
        queue.enqueue(Value::Int(1), 0).unwrap();
        assert!(resolved.is_ready(&ports, &queues));
    }

    #[test]
    fn test_unresolved_argument() {
        let result = Schedule::all_defined(["missing"]).resolve("top.p", |_| None);
        assert!(matches!(
            result,
            Err(TopologyError::UnresolvedPath { path }) if path == "top.p.missing"
        ));
    }

    #[test]
    fn test_custom_condition_sees_values() {
        let schedule = Schedule::from_fn(["en"], |inputs| {
            inputs.value("en").map_or(false, |v| v.is_asserted())
        });
        let resolved = schedule
            .resolve("top", |name| (name == "en").then_some(ArgSlot::Port(0)))
            .unwrap();
        let mut ports = vec![PortState::new(Value::ZERO)];
        assert!(!resolved.is_ready(&ports, &[]));
        ports[0].set(Value::ONE);
        assert!(resolved.is_ready(&ports, &[]));
    }
}
