//! Dashboard page assembly: the orchestrator that runs a page load, the
//! row → chart mapping, and the HTML view.

pub mod orchestrator;
pub mod render;
pub mod template;

pub use orchestrator::DashboardOrchestrator;
