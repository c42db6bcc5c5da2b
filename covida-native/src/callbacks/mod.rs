//! Core callback surface
//!
//! The extension points a native implementation fills in to react to media
//! and annotation events. The bridge calls exactly one method per host
//! notification, synchronously, with fully decoded values.

use crate::types::{AnnotationHeader, Circle, Line, MediaKind, Point, Result};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};

pub mod plugin;
pub mod text;

// Re-export sink implementations
pub use plugin::{CovidaCallbacks, CAnnotationHeader, PluginSink};
pub use text::{LogSink, TextSink};

/// Receiver of media and annotation notifications
pub trait AnnotationSink {
    fn on_image_opened(&mut self, path: &str) -> Result<()>;

    fn on_image_closed(&mut self, path: &str) -> Result<()>;

    fn on_video_opened(&mut self, path: &str) -> Result<()>;

    fn on_video_closed(&mut self, path: &str) -> Result<()>;

    /// A circle was drawn; `stroke` is the raw traced outline
    fn on_circle(
        &mut self,
        header: &AnnotationHeader,
        circle: &Circle,
        stroke: &[Point],
    ) -> Result<()>;

    /// A line was drawn between `line.start` and `line.end`
    fn on_line(&mut self, header: &AnnotationHeader, line: &Line, stroke: &[Point]) -> Result<()>;

    /// A polygon was drawn; its vertices are the stroke itself
    fn on_polygon(&mut self, header: &AnnotationHeader, stroke: &[Point]) -> Result<()>;
}

/// A single notification as observed by a sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BridgeEvent {
    MediaOpened {
        kind: MediaKind,
        path: String,
    },
    MediaClosed {
        kind: MediaKind,
        path: String,
    },
    Circle {
        header: AnnotationHeader,
        circle: Circle,
        stroke: Vec<Point>,
    },
    Line {
        header: AnnotationHeader,
        line: Line,
        stroke: Vec<Point>,
    },
    Polygon {
        header: AnnotationHeader,
        stroke: Vec<Point>,
    },
}

impl BridgeEvent {
    /// Path of the media this event refers to
    pub fn path(&self) -> &str {
        match self {
            BridgeEvent::MediaOpened { path, .. } | BridgeEvent::MediaClosed { path, .. } => path,
            BridgeEvent::Circle { header, .. }
            | BridgeEvent::Line { header, .. }
            | BridgeEvent::Polygon { header, .. } => &header.path,
        }
    }

    /// Stroke carried by an annotation event (empty for media events)
    pub fn stroke(&self) -> &[Point] {
        match self {
            BridgeEvent::Circle { stroke, .. }
            | BridgeEvent::Line { stroke, .. }
            | BridgeEvent::Polygon { stroke, .. } => stroke,
            _ => &[],
        }
    }
}

/// Sink that keeps every notification it receives, in order
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Vec<BridgeEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[BridgeEvent] {
        &self.events
    }

    /// Remove and return everything recorded so far
    pub fn take(&mut self) -> Vec<BridgeEvent> {
        std::mem::take(&mut self.events)
    }
}

impl AnnotationSink for RecordingSink {
    fn on_image_opened(&mut self, path: &str) -> Result<()> {
        self.events.push(BridgeEvent::MediaOpened {
            kind: MediaKind::Image,
            path: path.to_owned(),
        });
        Ok(())
    }

    fn on_image_closed(&mut self, path: &str) -> Result<()> {
        self.events.push(BridgeEvent::MediaClosed {
            kind: MediaKind::Image,
            path: path.to_owned(),
        });
        Ok(())
    }

    fn on_video_opened(&mut self, path: &str) -> Result<()> {
        self.events.push(BridgeEvent::MediaOpened {
            kind: MediaKind::Video,
            path: path.to_owned(),
        });
        Ok(())
    }

    fn on_video_closed(&mut self, path: &str) -> Result<()> {
        self.events.push(BridgeEvent::MediaClosed {
            kind: MediaKind::Video,
            path: path.to_owned(),
        });
        Ok(())
    }

    fn on_circle(
        &mut self,
        header: &AnnotationHeader,
        circle: &Circle,
        stroke: &[Point],
    ) -> Result<()> {
        self.events.push(BridgeEvent::Circle {
            header: header.clone(),
            circle: *circle,
            stroke: stroke.to_vec(),
        });
        Ok(())
    }

    fn on_line(&mut self, header: &AnnotationHeader, line: &Line, stroke: &[Point]) -> Result<()> {
        self.events.push(BridgeEvent::Line {
            header: header.clone(),
            line: *line,
            stroke: stroke.to_vec(),
        });
        Ok(())
    }

    fn on_polygon(&mut self, header: &AnnotationHeader, stroke: &[Point]) -> Result<()> {
        self.events.push(BridgeEvent::Polygon {
            header: header.clone(),
            stroke: stroke.to_vec(),
        });
        Ok(())
    }
}

/// A sink shared with code outside the bridge, e.g. a test inspecting it
impl<S: AnnotationSink> AnnotationSink for Arc<Mutex<S>> {
    fn on_image_opened(&mut self, path: &str) -> Result<()> {
        self.lock().unwrap_or_else(PoisonError::into_inner).on_image_opened(path)
    }

    fn on_image_closed(&mut self, path: &str) -> Result<()> {
        self.lock().unwrap_or_else(PoisonError::into_inner).on_image_closed(path)
    }

    fn on_video_opened(&mut self, path: &str) -> Result<()> {
        self.lock().unwrap_or_else(PoisonError::into_inner).on_video_opened(path)
    }

    fn on_video_closed(&mut self, path: &str) -> Result<()> {
        self.lock().unwrap_or_else(PoisonError::into_inner).on_video_closed(path)
    }

    fn on_circle(
        &mut self,
        header: &AnnotationHeader,
        circle: &Circle,
        stroke: &[Point],
    ) -> Result<()> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on_circle(header, circle, stroke)
    }

    fn on_line(&mut self, header: &AnnotationHeader, line: &Line, stroke: &[Point]) -> Result<()> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on_line(header, line, stroke)
    }

    fn on_polygon(&mut self, header: &AnnotationHeader, stroke: &[Point]) -> Result<()> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on_polygon(header, stroke)
    }
}

/// Sink that drops every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl AnnotationSink for NullSink {
    fn on_image_opened(&mut self, _path: &str) -> Result<()> {
        Ok(())
    }

    fn on_image_closed(&mut self, _path: &str) -> Result<()> {
        Ok(())
    }

    fn on_video_opened(&mut self, _path: &str) -> Result<()> {
        Ok(())
    }

    fn on_video_closed(&mut self, _path: &str) -> Result<()> {
        Ok(())
    }

    fn on_circle(&mut self, _: &AnnotationHeader, _: &Circle, _: &[Point]) -> Result<()> {
        Ok(())
    }

    fn on_line(&mut self, _: &AnnotationHeader, _: &Line, _: &[Point]) -> Result<()> {
        Ok(())
    }

    fn on_polygon(&mut self, _: &AnnotationHeader, _: &[Point]) -> Result<()> {
        Ok(())
    }
}
