#![doc = include_str!("../README.md")]
#![doc(html_logo_url = "https://avatars.githubusercontent.com/u/79236386")]
#![doc(html_favicon_url = "https://avatars.githubusercontent.com/u/79236386")]
// cannot use forbid, because props derive macro generates #[allow(missing_docs)]
#![deny(missing_docs)]

mod controller;
mod error;
mod measurement;
mod reader;
mod scheduler;
mod sensor;

pub mod testing;

#[cfg(feature = "web")]
pub mod web;

#[cfg(feature = "web")]
mod component;

pub use controller::*;
pub use error::*;
pub use measurement::*;
pub use reader::*;
pub use scheduler::*;
pub use sensor::*;

#[cfg(feature = "web")]
pub use component::*;

/// A collection of useful items most applications might need.
pub mod prelude {
    pub use crate::{with_dimensions, Measurement, ReaderPair, WithDimensions};

    #[cfg(feature = "web")]
    pub use crate::{compose, MeasureIt, Measured, MeasuredView};
}
