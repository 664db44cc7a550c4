//! CLI commands for the news sentiment pipeline.

pub mod common;
pub mod demo;
pub mod eval;
pub mod features;
pub mod simulate;
pub mod sweep;

pub use common::{load_config, OverrideArgs};
pub use demo::{run_demo, DemoArgs};
pub use eval::{run_eval, EvalArgs};
pub use features::{run_features, FeaturesArgs};
pub use simulate::{run_simulate, SimulateArgs};
pub use sweep::{run_sweep_stage, SweepArgs};
