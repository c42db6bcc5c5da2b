//! Core types for the CoVida native bridge
//!
//! This module defines the values that cross from the JVM into native code:
//! stroke points, annotation headers and shape geometry. None of these outlive
//! a single notification; they are built by the boundary adapter, handed to a
//! sink by reference and dropped when the call returns.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// A 2-D point of a drawn stroke
///
/// The layout is C-compatible so that a converted stroke can be handed to a
/// native plugin as a plain `(pointer, length)` pair.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Kind of media the host application has open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// Coordinate convention of stroke points and shape geometry
///
/// The host decides per installation whether it reports absolute pixel
/// coordinates or coordinates relative to the media size. The bridge only
/// labels the values; it never rescales them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateSpace {
    /// Pixel coordinates of the displayed media
    #[default]
    Absolute,
    /// Coordinates normalized to [0, 1]
    Relative,
}

impl fmt::Display for CoordinateSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinateSpace::Absolute => write!(f, "absolute"),
            CoordinateSpace::Relative => write!(f, "relative"),
        }
    }
}

/// Inclusive range of video frames an annotation applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRange {
    pub start: i64,
    pub stop: i64,
}

/// Fields shared by every annotation notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationHeader {
    /// Absolute path of the annotated image or video
    pub path: String,
    /// Free-text annotation entered by the user
    pub description: String,
    /// Start frame as sent by the host (0 for still images)
    pub start: i64,
    /// Stop frame as sent by the host (0 for still images)
    pub stop: i64,
    /// Kind under which `path` is currently open, if the bridge saw it opened
    pub media: Option<MediaKind>,
    /// Coordinate convention of the geometry and stroke
    pub space: CoordinateSpace,
}

impl AnnotationHeader {
    /// Create a header for an annotation on media the bridge does not track yet
    pub fn new(
        path: impl Into<String>,
        description: impl Into<String>,
        start: i64,
        stop: i64,
    ) -> Self {
        Self {
            path: path.into(),
            description: description.into(),
            start,
            stop,
            media: None,
            space: CoordinateSpace::default(),
        }
    }

    /// Frame range this annotation applies to
    ///
    /// Images have no frames, so `start`/`stop` are ignored for them. For paths
    /// the bridge never saw opened, a `0..0` pair is read as "no frames".
    pub fn frames(&self) -> Option<FrameRange> {
        let range = FrameRange {
            start: self.start,
            stop: self.stop,
        };
        match self.media {
            Some(MediaKind::Video) => Some(range),
            Some(MediaKind::Image) => None,
            None if self.start == 0 && self.stop == 0 => None,
            None => Some(range),
        }
    }
}

/// Summary geometry of a drawn circle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point,
    pub radius: f32,
}

/// Summary geometry of a drawn line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: Point,
    pub end: Point,
}

/// Errors raised while crossing the boundary or dispatching to a sink
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Null {0} passed across the JNI boundary")]
    NullArgument(&'static str),

    #[error("Null element at index {0} of the point array")]
    NullPoint(usize),

    #[error("JNI error: {0}")]
    Jni(#[from] jni::errors::Error),

    #[error("Failed to parse config file: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    #[error("Failed to load plugin: {0}")]
    PluginLoadError(String),

    #[error("Callback failed: {0}")]
    CallbackError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_display() {
        assert_eq!(Point::new(34.0, 12.5).to_string(), "(34, 12.5)");
        assert_eq!(Point::from((1.0, 2.0)), Point::new(1.0, 2.0));
    }

    #[test]
    fn test_frames_follow_media_kind() {
        let mut header = AnnotationHeader::new("clip.mp4", "wilting", 10, 42);

        header.media = Some(MediaKind::Video);
        assert_eq!(header.frames(), Some(FrameRange { start: 10, stop: 42 }));

        header.media = Some(MediaKind::Image);
        assert_eq!(header.frames(), None);
    }

    #[test]
    fn test_frames_for_untracked_media() {
        let still = AnnotationHeader::new("a.png", "d", 0, 0);
        assert_eq!(still.frames(), None);

        let clip = AnnotationHeader::new("b.avi", "d", 0, 7);
        assert_eq!(clip.frames(), Some(FrameRange { start: 0, stop: 7 }));
    }

    #[test]
    fn test_enum_serialization() {
        assert_eq!(serde_json::to_string(&MediaKind::Video).unwrap(), "\"video\"");
        assert_eq!(
            serde_json::to_string(&CoordinateSpace::Relative).unwrap(),
            "\"relative\""
        );
    }
}
