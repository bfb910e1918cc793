pub mod evaluation_context;
pub mod instance;
pub mod module;
pub mod port_specs;
pub mod schedule;
pub mod state;
pub mod traits;

// Re-export commonly used types
pub use evaluation_context::EvalContext;
pub use instance::{PartInstance, PartMeta};
pub use module::PartBuilder;
pub use port_specs::{Direction, PortSpec, QueueSpec, Semantic};
pub use schedule::{
    AllDefined, Always, ArgState, Condition, ConditionInputs, EdgeDetector, EdgeKind, EdgeTrigger,
    FnCondition, QueuePending, Schedule,
};
pub use state::PortState;
pub use traits::{Behavior, Component, FnBehavior};
