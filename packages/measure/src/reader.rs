//! Dimension readers turn a mounted container into a [`Measurement`].

use crate::{Dimension, MeasureError, MeasureResult, Measurement, ReadError};
use std::{fmt::Debug, rc::Rc};

/// A node that has a rendered box which can be measured.
///
/// Renderers implement this for their element handle. The web renderer implements it for [`web_sys::Element`]
/// with `getBoundingClientRect`.
pub trait Container {
    /// The size of the container's own bounding box
    fn own_size(&self) -> Result<Measurement, ReadError>;

    /// The size of the bounding box of the container's parent
    fn parent_size(&self) -> Result<Measurement, ReadError>;
}

/// Reads a single dimension from a container.
///
/// Readers are compared by identity, so cloning a reader keeps it equal to the original.
pub struct Reader<N: ?Sized> {
    read: Rc<dyn Fn(&N) -> Result<f64, ReadError>>,
}

impl<N: ?Sized> Reader<N> {
    /// Create a reader from an infallible function
    pub fn new(read: impl Fn(&N) -> f64 + 'static) -> Self {
        Self::fallible(move |node| Ok(read(node)))
    }

    /// Create a reader from a function that may fail
    pub fn fallible(read: impl Fn(&N) -> Result<f64, ReadError> + 'static) -> Self {
        Self {
            read: Rc::new(read),
        }
    }

    /// Read `dimension` from the container, rejecting anything that is not a finite, non-negative number.
    pub fn read(&self, node: &N, dimension: Dimension) -> MeasureResult<f64> {
        let value = (self.read)(node)
            .and_then(|value| match value.is_finite() && value >= 0.0 {
                true => Ok(value),
                false => Err(ReadError::NotANumber(value)),
            })
            .map_err(|source| MeasureError::ReaderFailure { dimension, source })?;

        Ok(value)
    }
}

impl<N: Container + ?Sized> Reader<N> {
    /// Read the width of the container's own box
    pub fn own_width() -> Self {
        Self::fallible(|node: &N| node.own_size().map(|size| size.width))
    }

    /// Read the height of the container's own box
    pub fn own_height() -> Self {
        Self::fallible(|node: &N| node.own_size().map(|size| size.height))
    }

    /// Read the width of the container's parent
    pub fn parent_width() -> Self {
        Self::fallible(|node: &N| node.parent_size().map(|size| size.width))
    }

    /// Read the height of the container's parent
    pub fn parent_height() -> Self {
        Self::fallible(|node: &N| node.parent_size().map(|size| size.height))
    }
}

impl<N: ?Sized> Clone for Reader<N> {
    fn clone(&self) -> Self {
        Self {
            read: self.read.clone(),
        }
    }
}

impl<N: ?Sized> PartialEq for Reader<N> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.read, &other.read)
    }
}

impl<N: ?Sized> Debug for Reader<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader")
            .field("read", &Rc::as_ptr(&self.read))
            .finish()
    }
}

/// The width and height readers a wrapper measures its container with.
///
/// The pair is fixed when the wrapper is configured. The default measures the container's own box, while
/// [`ReaderPair::parent_box`] measures the space the parent allocated, which is useful when the wrapper itself does
/// not take up any room.
///
/// ```rust
/// # use dioxus_measure::{Container, Measurement, ReadError, Reader, ReaderPair};
/// struct Fixed(Measurement);
///
/// impl Container for Fixed {
///     fn own_size(&self) -> Result<Measurement, ReadError> {
///         Ok(self.0)
///     }
///
///     fn parent_size(&self) -> Result<Measurement, ReadError> {
///         Err(ReadError::NoParent)
///     }
/// }
///
/// let readers = ReaderPair::<Fixed>::self_box().with_height(Reader::new(|_| 10.0));
/// let measured = readers.measure(&Fixed(Measurement::new(300.0, 200.0))).unwrap();
/// assert_eq!(measured, Measurement::new(300.0, 10.0));
/// ```
pub struct ReaderPair<N: ?Sized> {
    width: Reader<N>,
    height: Reader<N>,
}

impl<N: ?Sized> ReaderPair<N> {
    /// Create a reader pair from two readers
    pub fn new(width: Reader<N>, height: Reader<N>) -> Self {
        Self { width, height }
    }

    /// Replace the width reader
    pub fn with_width(self, width: Reader<N>) -> Self {
        Self { width, ..self }
    }

    /// Replace the height reader
    pub fn with_height(self, height: Reader<N>) -> Self {
        Self { height, ..self }
    }

    /// Measure the container with both readers
    pub fn measure(&self, node: &N) -> MeasureResult<Measurement> {
        Ok(Measurement {
            width: self.width.read(node, Dimension::Width)?,
            height: self.height.read(node, Dimension::Height)?,
        })
    }
}

impl<N: Container + ?Sized> ReaderPair<N> {
    /// Measure the container's own bounding box
    pub fn self_box() -> Self {
        Self::new(Reader::own_width(), Reader::own_height())
    }

    /// Measure the bounding box of the container's parent
    pub fn parent_box() -> Self {
        Self::new(Reader::parent_width(), Reader::parent_height())
    }
}

impl<N: Container + ?Sized> Default for ReaderPair<N> {
    fn default() -> Self {
        Self::self_box()
    }
}

impl<N: ?Sized> Clone for ReaderPair<N> {
    fn clone(&self) -> Self {
        Self {
            width: self.width.clone(),
            height: self.height.clone(),
        }
    }
}

impl<N: ?Sized> Debug for ReaderPair<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderPair")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl<N: ?Sized> PartialEq for ReaderPair<N> {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height
    }
}
