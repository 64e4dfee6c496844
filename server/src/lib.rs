mod fleet;
mod planner;
mod queue;
mod runner;
mod scheduler;

pub use fleet::Fleet;
pub use planner::{PlanOutcome, RoutePlan, RoutePlanner};
pub use queue::OrderQueue;
pub use runner::CsvRunner;
pub use scheduler::DispatchScheduler;
