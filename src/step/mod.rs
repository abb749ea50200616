//! Step model
//!
//! The closed set of step variants, the metadata table describing each
//! action key, and the sentence renderer used for previews.

mod meta;
pub mod sentence;
mod types;

pub use meta::{ActionKey, ActionMeta, Category, ValueShape};
pub use sentence::{describe, describe_with, preview, preview_with, Plain, Style};
pub use types::{
    Action, ActionStep, AssertKind, AssertStep, CaptureKey, ElementRef, OutputAction, OutputStep,
    Step, StepData,
};
