//! Adaptive refinement of multi-tessellation models.
//!
//! [`refine`] turns a [`RefinementTrigger`] into seed points, subdivides the
//! top level of every tessellation the seeds touch, synthesises profiles for
//! the vertices that joined a top level and splits radial intervals around
//! each seed node. The input model is never modified.

mod error;
mod radial;
mod refine;
mod spatial;
mod trigger;

pub use error::RefineError;
pub use refine::{RefineReport, refine, refine_with_report};
pub use trigger::{Comparison, RefinementTrigger, Threshold};
