//! JSON lines output for replayed sessions

use chrono::Utc;
use covida_native::{
    AnnotationHeader, AnnotationSink, BridgeError, BridgeEvent, Circle, Line, Point,
    RecordingSink,
};
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct Stamped<'a> {
    received_at: String,
    #[serde(flatten)]
    event: &'a BridgeEvent,
}

/// Sink that writes every notification as one JSON object per line
pub struct JsonSink<W: Write> {
    out: W,
    recorder: RecordingSink,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            recorder: RecordingSink::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn flush_events(&mut self) -> covida_native::Result<()> {
        for event in self.recorder.take() {
            let stamped = Stamped {
                received_at: Utc::now().to_rfc3339(),
                event: &event,
            };
            serde_json::to_writer(&mut self.out, &stamped)
                .map_err(|e| BridgeError::CallbackError(format!("JSON encoding failed: {}", e)))?;
            writeln!(self.out)?;
        }
        Ok(())
    }
}

impl<W: Write> AnnotationSink for JsonSink<W> {
    fn on_image_opened(&mut self, path: &str) -> covida_native::Result<()> {
        self.recorder.on_image_opened(path)?;
        self.flush_events()
    }

    fn on_image_closed(&mut self, path: &str) -> covida_native::Result<()> {
        self.recorder.on_image_closed(path)?;
        self.flush_events()
    }

    fn on_video_opened(&mut self, path: &str) -> covida_native::Result<()> {
        self.recorder.on_video_opened(path)?;
        self.flush_events()
    }

    fn on_video_closed(&mut self, path: &str) -> covida_native::Result<()> {
        self.recorder.on_video_closed(path)?;
        self.flush_events()
    }

    fn on_circle(
        &mut self,
        header: &AnnotationHeader,
        circle: &Circle,
        stroke: &[Point],
    ) -> covida_native::Result<()> {
        self.recorder.on_circle(header, circle, stroke)?;
        self.flush_events()
    }

    fn on_line(
        &mut self,
        header: &AnnotationHeader,
        line: &Line,
        stroke: &[Point],
    ) -> covida_native::Result<()> {
        self.recorder.on_line(header, line, stroke)?;
        self.flush_events()
    }

    fn on_polygon(&mut self, header: &AnnotationHeader, stroke: &[Point]) -> covida_native::Result<()> {
        self.recorder.on_polygon(header, stroke)?;
        self.flush_events()
    }
}
