//! Human-readable reporting sinks
//!
//! The reference behavior of the bridge: one line per notification naming
//! every field received.

use super::AnnotationSink;
use crate::types::{AnnotationHeader, Circle, Line, Point, Result};
use std::io::{self, Stdout, Write};

fn header_fields(header: &AnnotationHeader) -> String {
    format!(
        "[path]:= {} [description]:= {} [start]:= {} [stop]:= {}",
        header.path, header.description, header.start, header.stop
    )
}

pub(crate) fn circle_line(header: &AnnotationHeader, circle: &Circle, stroke: &[Point]) -> String {
    format!(
        "circle annotation {} [center]:= {} [radius]:= {} [points]:= {}",
        header_fields(header),
        circle.center,
        circle.radius,
        stroke.len()
    )
}

pub(crate) fn line_line(header: &AnnotationHeader, line: &Line, stroke: &[Point]) -> String {
    format!(
        "line annotation {} [begin]:= {} [end]:= {} [points]:= {}",
        header_fields(header),
        line.start,
        line.end,
        stroke.len()
    )
}

pub(crate) fn polygon_line(header: &AnnotationHeader, stroke: &[Point]) -> String {
    format!(
        "polygon annotation {} [points]:= {}",
        header_fields(header),
        stroke.len()
    )
}

/// Writes one line per notification to `W` (stdout by default)
pub struct TextSink<W: Write = Stdout> {
    out: W,
}

impl TextSink<Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: &str) -> Result<()> {
        writeln!(self.out, "{}", line)?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> AnnotationSink for TextSink<W> {
    fn on_image_opened(&mut self, path: &str) -> Result<()> {
        self.emit(&format!("image opened: {}", path))
    }

    fn on_image_closed(&mut self, path: &str) -> Result<()> {
        self.emit(&format!("image closed: {}", path))
    }

    fn on_video_opened(&mut self, path: &str) -> Result<()> {
        self.emit(&format!("video opened: {}", path))
    }

    fn on_video_closed(&mut self, path: &str) -> Result<()> {
        self.emit(&format!("video closed: {}", path))
    }

    fn on_circle(
        &mut self,
        header: &AnnotationHeader,
        circle: &Circle,
        stroke: &[Point],
    ) -> Result<()> {
        self.emit(&circle_line(header, circle, stroke))
    }

    fn on_line(&mut self, header: &AnnotationHeader, line: &Line, stroke: &[Point]) -> Result<()> {
        self.emit(&line_line(header, line, stroke))
    }

    fn on_polygon(&mut self, header: &AnnotationHeader, stroke: &[Point]) -> Result<()> {
        self.emit(&polygon_line(header, stroke))
    }
}

/// Reports each notification as an `info` record through the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl AnnotationSink for LogSink {
    fn on_image_opened(&mut self, path: &str) -> Result<()> {
        log::info!("image opened: {}", path);
        Ok(())
    }

    fn on_image_closed(&mut self, path: &str) -> Result<()> {
        log::info!("image closed: {}", path);
        Ok(())
    }

    fn on_video_opened(&mut self, path: &str) -> Result<()> {
        log::info!("video opened: {}", path);
        Ok(())
    }

    fn on_video_closed(&mut self, path: &str) -> Result<()> {
        log::info!("video closed: {}", path);
        Ok(())
    }

    fn on_circle(
        &mut self,
        header: &AnnotationHeader,
        circle: &Circle,
        stroke: &[Point],
    ) -> Result<()> {
        log::info!("{}", circle_line(header, circle, stroke));
        Ok(())
    }

    fn on_line(&mut self, header: &AnnotationHeader, line: &Line, stroke: &[Point]) -> Result<()> {
        log::info!("{}", line_line(header, line, stroke));
        Ok(())
    }

    fn on_polygon(&mut self, header: &AnnotationHeader, stroke: &[Point]) -> Result<()> {
        log::info!("{}", polygon_line(header, stroke));
        Ok(())
    }
}
