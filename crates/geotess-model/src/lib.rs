//! 3-D Earth models on a multi-tessellation grid.
//!
//! A [`Model`] attaches a radial [`Profile`] to every (vertex, layer) cell of
//! a [`Grid`](geotess_grid::Grid). Each layer is bound to one tessellation;
//! only vertices in that tessellation's top level carry data. The
//! [`PointMap`] enumerates data-bearing nodes inside the active region
//! described by a [`Polygon3D`].

mod error;
mod horizon;
pub mod io;
mod metadata;
mod model;
mod point_map;
mod profile;

pub use error::ModelError;
pub use horizon::{Horizon, Polygon3D};
pub use metadata::{DataType, MetaData};
pub use model::Model;
pub use point_map::{PointMap, PointRef};
pub use profile::{Profile, ProfileKind};
