//! Conversion of host-owned arguments into native-owned values
//!
//! Everything the JVM hands over is only borrowed for the duration of one
//! call. The functions here deep-copy it into `String`s and `Vec<Point>`s so
//! that nothing a sink receives can point back into host memory.

use crate::types::{Point, Result};
use jni::strings::JNIStr;
use std::borrow::Cow;

/// An ordered, indexable collection of point-like objects owned by the host
///
/// The JNI implementation wraps a `java.awt.Point[]`; tests and the replay
/// CLI use plain slices of points, tuples or `[x, y]` pairs.
pub trait HostPointArray {
    /// Number of elements in the collection
    fn len(&mut self) -> Result<usize>;

    /// Read the coordinates of the element at `index`
    fn point_at(&mut self, index: usize) -> Result<Point>;
}

impl HostPointArray for &[Point] {
    fn len(&mut self) -> Result<usize> {
        Ok(<[Point]>::len(self))
    }

    fn point_at(&mut self, index: usize) -> Result<Point> {
        Ok(self[index])
    }
}

impl HostPointArray for &[(f32, f32)] {
    fn len(&mut self) -> Result<usize> {
        Ok(<[(f32, f32)]>::len(self))
    }

    fn point_at(&mut self, index: usize) -> Result<Point> {
        Ok(Point::from(self[index]))
    }
}

impl HostPointArray for &[[f32; 2]] {
    fn len(&mut self) -> Result<usize> {
        Ok(<[[f32; 2]]>::len(self))
    }

    fn point_at(&mut self, index: usize) -> Result<Point> {
        let [x, y] = self[index];
        Ok(Point::new(x, y))
    }
}

/// Copy a host point collection into a native stroke
///
/// The result has the same length and order as the source, with every
/// coordinate copied by value. An empty source yields an empty stroke. The
/// first element that cannot be read aborts the conversion; no partial stroke
/// is returned.
pub fn convert_points<A: HostPointArray>(mut array: A) -> Result<Vec<Point>> {
    let len = array.len()?;
    let mut points = Vec::with_capacity(len);

    for index in 0..len {
        points.push(array.point_at(index)?);
    }

    log::trace!("Converted {} stroke points", points.len());
    Ok(points)
}

/// Decode a Java modified UTF-8 string into an owned Rust string
///
/// Invalid sequences are replaced rather than rejected, matching how the JVM
/// itself treats unpaired surrogates.
pub fn decode_text(raw: &JNIStr) -> String {
    Cow::from(raw).into_owned()
}
