//! Scenario flow editing
//!
//! A [`Draft`] holds the step being composed, [`FlowEditor`] applies it to the
//! flow according to the current [`Mode`], and [`ScenarioBuilder`] persists
//! the result.

mod builder;
mod draft;
mod flow;

pub use builder::ScenarioBuilder;
pub use draft::Draft;
pub use flow::{FlowEditor, Mode};
