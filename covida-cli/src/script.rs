//! Session scripts
//!
//! A session script is a recorded sequence of host notifications, replayed
//! against a bridge outside of the JVM:
//!
//! ```toml
//! [[event]]
//! kind = "image-opened"
//! path = "/data/IMAGE_4_0002.tif"
//!
//! [[event]]
//! kind = "line"
//! path = "/data/IMAGE_4_0002.tif"
//! description = "annotation_string"
//! begin = [34.0, 34.0]
//! end = [100.0, 100.0]
//! points = [[34.0, 34.0], [100.0, 100.0]]
//! ```

use anyhow::{Context, Result};
use covida_native::{
    convert_points, AnnotationHeader, Bridge, Circle, Line, MediaKind, Point,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionScript {
    #[serde(default, rename = "event")]
    pub events: Vec<ScriptEvent>,
}

/// Fields shared by the annotation events
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScriptHeader {
    pub path: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start: i64,
    #[serde(default)]
    pub stop: i64,
    #[serde(default)]
    pub points: Vec<[f32; 2]>,
}

impl ScriptHeader {
    fn to_header(&self) -> AnnotationHeader {
        AnnotationHeader::new(&self.path, &self.description, self.start, self.stop)
    }

    fn stroke(&self) -> covida_native::Result<Vec<Point>> {
        convert_points(self.points.as_slice())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ScriptEvent {
    ImageOpened {
        path: String,
    },
    ImageClosed {
        path: String,
    },
    VideoOpened {
        path: String,
    },
    VideoClosed {
        path: String,
    },
    Circle {
        #[serde(flatten)]
        header: ScriptHeader,
        center: [f32; 2],
        radius: f32,
    },
    Line {
        #[serde(flatten)]
        header: ScriptHeader,
        begin: [f32; 2],
        end: [f32; 2],
    },
    Polygon {
        #[serde(flatten)]
        header: ScriptHeader,
    },
}

/// Load a session script from a TOML file
pub fn load_script(path: &Path) -> Result<SessionScript> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read session script: {:?}", path))?;

    let script: SessionScript = toml::from_str(&content)
        .with_context(|| format!("Failed to parse session script: {:?}", path))?;

    log::debug!("Loaded {} events from {:?}", script.events.len(), path);
    Ok(script)
}

/// The session the original native test harness ran
pub fn demo_session() -> SessionScript {
    let image = "D:\\data\\plant-image-ayumi\\BY2\\IMAGE_4_0002.tif".to_string();

    SessionScript {
        events: vec![
            ScriptEvent::ImageOpened {
                path: image.clone(),
            },
            ScriptEvent::Line {
                header: ScriptHeader {
                    path: image.clone(),
                    description: "annotation_string".to_string(),
                    start: 0,
                    stop: 0,
                    points: vec![[34.0, 34.0], [100.0, 100.0]],
                },
                begin: [34.0, 34.0],
                end: [100.0, 100.0],
            },
            ScriptEvent::ImageClosed { path: image },
        ],
    }
}

fn point([x, y]: [f32; 2]) -> Point {
    Point::new(x, y)
}

/// Dispatch every event of `script` to `bridge`, in order
pub fn replay(bridge: &mut Bridge, script: &SessionScript) -> Result<usize> {
    for (index, event) in script.events.iter().enumerate() {
        match event {
            ScriptEvent::ImageOpened { path } => bridge.media_opened(MediaKind::Image, path),
            ScriptEvent::ImageClosed { path } => bridge.media_closed(MediaKind::Image, path),
            ScriptEvent::VideoOpened { path } => bridge.media_opened(MediaKind::Video, path),
            ScriptEvent::VideoClosed { path } => bridge.media_closed(MediaKind::Video, path),
            ScriptEvent::Circle {
                header,
                center,
                radius,
            } => bridge.circle_annotation(
                header.to_header(),
                Circle {
                    center: point(*center),
                    radius: *radius,
                },
                &header
                    .stroke()
                    .with_context(|| format!("Event {}: invalid stroke", index))?,
            ),
            ScriptEvent::Line { header, begin, end } => bridge.line_annotation(
                header.to_header(),
                Line {
                    start: point(*begin),
                    end: point(*end),
                },
                &header
                    .stroke()
                    .with_context(|| format!("Event {}: invalid stroke", index))?,
            ),
            ScriptEvent::Polygon { header } => bridge.polygon_annotation(
                header.to_header(),
                &header
                    .stroke()
                    .with_context(|| format!("Event {}: invalid stroke", index))?,
            ),
        }
    }
    Ok(script.events.len())
}
