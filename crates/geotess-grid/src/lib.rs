//! Multi-tessellation triangular grids on the unit sphere.
//!
//! A [`Grid`] is a shared vertex array plus an ordered list of
//! [`Tessellation`]s, each a stack of conforming refinement levels grown from
//! a [`PlatonicSolid`] seed. [`GridBuilder`] constructs grids from
//! [`GridOptions`]; [`subdivide`] performs one red/green refinement pass and is
//! shared with model refinement.

mod builder;
mod error;
mod grid;
mod grid_id;
pub mod io;
mod locator;
mod platonic;
mod subdivide;
mod topology;

pub use builder::{GridBuilder, GridOptions, PolygonRefinement};
pub use error::GridError;
pub use grid::{Grid, LEVEL0_EDGE_DEG, Level, Tessellation, Triangle};
pub use grid_id::GridId;
pub use locator::{LocatedMidpoints, VertexLocator};
pub use platonic::PlatonicSolid;
pub use subdivide::{EdgeMidpoints, MidpointSource, SubdivisionStats, subdivide};
pub use topology::TopLevelTopology;
