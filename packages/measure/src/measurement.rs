use std::fmt::{Display, Formatter};

/// The rendered size of a container, in CSS pixels.
///
/// Both dimensions are finite and non-negative. A fresh wrapper starts out at [`Measurement::ZERO`] until the
/// container has been laid out by its parent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Measurement {
    /// The width of the container
    pub width: f64,
    /// The height of the container
    pub height: f64,
}

impl Measurement {
    /// A container that has not been sized yet
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    /// Create a new measurement
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns true if neither dimension has any extent.
    ///
    /// A measurement with only one zero dimension (a `300x0` strip for example) is not zero.
    pub fn is_zero(&self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }
}

impl From<(f64, f64)> for Measurement {
    fn from((width, height): (f64, f64)) -> Self {
        Self::new(width, height)
    }
}

impl Display for Measurement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}px x {}px", self.width, self.height)
    }
}

/// Props that can receive the measured size of their container.
///
/// The measurement is merged after the original props, so it replaces any value the caller passed for the same
/// fields. Use [`with_dimensions!`](crate::with_dimensions) to implement this for props with two `f64` fields.
pub trait WithDimensions {
    /// Return the props with the measured dimensions filled in
    fn with_dimensions(self, measurement: Measurement) -> Self;
}

/// Implement [`WithDimensions`] by writing the measured width and height into two `f64` fields.
///
/// ```rust
/// # use dioxus::prelude::*;
/// # use dioxus_measure::{with_dimensions, Measurement, WithDimensions};
/// #[derive(Props, Clone, PartialEq)]
/// struct ChartProps {
///     title: String,
///     #[props(default)]
///     container_width: f64,
///     #[props(default)]
///     container_height: f64,
/// }
///
/// with_dimensions!(ChartProps {
///     width: container_width,
///     height: container_height
/// });
///
/// let props = ChartProps { title: "Sales".into(), container_width: 1.0, container_height: 1.0 };
/// let measured = props.with_dimensions(Measurement::new(120.0, 80.0));
/// assert_eq!(measured.container_width, 120.0);
/// assert_eq!(measured.title, "Sales");
/// ```
#[macro_export]
macro_rules! with_dimensions {
    ($props:ty { width: $width:ident, height: $height:ident $(,)? }) => {
        impl $crate::WithDimensions for $props {
            fn with_dimensions(self, measurement: $crate::Measurement) -> Self {
                Self {
                    $width: measurement.width,
                    $height: measurement.height,
                    ..self
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_sided_measurements_are_not_zero() {
        assert!(Measurement::ZERO.is_zero());
        assert!(Measurement::default().is_zero());
        assert!(!Measurement::new(0.0, 50.0).is_zero());
        assert!(!Measurement::new(300.0, 0.0).is_zero());
    }

    #[test]
    fn displays_like_css() {
        assert_eq!(Measurement::new(150.0, 40.5).to_string(), "150px x 40.5px");
        assert_eq!(Measurement::from((1.0, 2.0)), Measurement::new(1.0, 2.0));
    }
}
