use crate::core::components::evaluation_context::EvalContext;
use crate::core::components::module::PartBuilder;
use crate::core::components::port_specs::PortSpec;
use crate::core::components::schedule::{EdgeTrigger, Schedule};
use crate::core::errors::SimError;

/// Behavior routine of a part.
///
/// `evaluate` is called at most once per step, after the scheduling
/// predicate (and edge trigger, if any) allowed it. Reads observe the values
/// committed before the call; writes are staged and committed when the call
/// returns `Ok`.
pub trait Behavior: Send {
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) -> Result<(), SimError>;
}

/// Adapter turning a closure into a [`Behavior`]
pub struct FnBehavior<F>(pub F);

impl<F> Behavior for FnBehavior<F>
where
    F: FnMut(&mut EvalContext<'_>) -> Result<(), SimError> + Send,
{
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) -> Result<(), SimError> {
        (self.0)(ctx)
    }
}

/// Manual part definition trait
///
/// Types implementing this trait bundle their port list, scheduling and
/// behavior so they can be instantiated by name with [`Component::into_part`].
pub trait Component: Behavior + Sized + 'static {
    /// Define all ports of this part type
    fn ports(&self) -> Vec<PortSpec>;

    /// Scheduling condition; runs every step by default
    fn schedule(&self) -> Schedule {
        Schedule::always()
    }

    /// Optional edge sensitivity of the behavior body
    fn edge(&self) -> Option<EdgeTrigger> {
        None
    }

    /// Convert this component into a leaf part builder
    fn into_part(self, name: &str) -> PartBuilder {
        let mut part = PartBuilder::new(name)
            .ports(self.ports())
            .schedule(self.schedule());
        if let Some(edge) = self.edge() {
            part = part.edge(edge);
        }
        part.behavior(self)
    }
}
