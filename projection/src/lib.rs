//! Projection of the bands of one PAW calculation onto the bands of another.
//!
//! A `Wavefunction` binds a structure, its PAW datasets and a plane-wave
//! session opened by a `ProjectionEngine`. After `setup_projection` against a
//! basis wavefunction, bands of the defect (self) calculation can be expanded
//! in the bands of the basis and split into valence and conduction weight.

mod engine;
pub use engine::*;

mod handle;
pub use handle::*;

mod labels;
pub use labels::*;

mod arrays;
pub use arrays::*;

mod sites;
pub use sites::*;

mod wavefunction;
pub use wavefunction::*;

mod band;
pub use band::*;

#[cfg(feature = "native")]
mod native;
#[cfg(feature = "native")]
pub use native::*;

#[cfg(test)]
mod mock;

#[cfg(test)]
mod tests;
