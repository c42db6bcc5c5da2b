//! Bridge context
//!
//! The `Bridge` is the object the boundary adapter forwards every decoded
//! notification to. It owns the configured sink and remembers which media are
//! currently open, so annotation headers can say whether they refer to an
//! image or a video.

use crate::callbacks::{AnnotationSink, LogSink, NullSink, PluginSink, TextSink};
use crate::config::{BridgeConfig, OutputTarget};
use crate::types::{
    AnnotationHeader, Circle, CoordinateSpace, Line, MediaKind, Point, Result,
};
use std::collections::HashMap;

/// Media currently open in the host application, keyed by path
#[derive(Debug, Default)]
pub struct MediaRegistry {
    open: HashMap<String, MediaKind>,
}

impl MediaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path` as open; returns the kind it was already open as, if any
    pub fn open(&mut self, kind: MediaKind, path: &str) -> Option<MediaKind> {
        self.open.insert(path.to_owned(), kind)
    }

    /// Forget `path`; returns the kind it was open as, if it was open
    pub fn close(&mut self, path: &str) -> Option<MediaKind> {
        self.open.remove(path)
    }

    pub fn kind_of(&self, path: &str) -> Option<MediaKind> {
        self.open.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Open paths in sorted order
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.open.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }
}

/// Counters of notifications dispatched by a bridge
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchStats {
    pub media_events: usize,
    pub annotations: usize,
    pub failures: usize,
}

/// Dispatch context shared by all host entry points
pub struct Bridge {
    sink: Box<dyn AnnotationSink + Send>,
    media: MediaRegistry,
    space: CoordinateSpace,
    stats: DispatchStats,
}

impl Bridge {
    /// Create a bridge around an explicit sink
    pub fn new(sink: Box<dyn AnnotationSink + Send>, space: CoordinateSpace) -> Self {
        Self {
            sink,
            media: MediaRegistry::new(),
            space,
            stats: DispatchStats::default(),
        }
    }

    /// Create a bridge with the sink the configuration asks for
    ///
    /// A configured plugin takes precedence over the output target.
    pub fn from_config(config: &BridgeConfig) -> Result<Self> {
        let sink: Box<dyn AnnotationSink + Send> = match &config.plugin.library {
            Some(library) => Box::new(PluginSink::load(library)?),
            None => match config.output.target {
                OutputTarget::Stdout => Box::new(TextSink::stdout()),
                OutputTarget::Log => Box::new(LogSink),
                OutputTarget::Discard => Box::new(NullSink),
            },
        };
        Ok(Self::new(sink, config.coordinate_space))
    }

    pub fn media(&self) -> &MediaRegistry {
        &self.media
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    pub fn coordinate_space(&self) -> CoordinateSpace {
        self.space
    }

    pub fn media_opened(&mut self, kind: MediaKind, path: &str) {
        log::debug!("{} opened: {}", kind, path);
        if let Some(previous) = self.media.open(kind, path) {
            log::warn!("{} opened again while open as {}: {}", kind, previous, path);
        }

        let result = match kind {
            MediaKind::Image => self.sink.on_image_opened(path),
            MediaKind::Video => self.sink.on_video_opened(path),
        };
        self.stats.media_events += 1;
        self.record(result, "media opened");
    }

    pub fn media_closed(&mut self, kind: MediaKind, path: &str) {
        log::debug!("{} closed: {}", kind, path);
        match self.media.close(path) {
            None => log::warn!("{} closed but never opened: {}", kind, path),
            Some(previous) if previous != kind => {
                log::warn!("{} closed while open as {}: {}", kind, previous, path)
            }
            Some(_) => {}
        }

        let result = match kind {
            MediaKind::Image => self.sink.on_image_closed(path),
            MediaKind::Video => self.sink.on_video_closed(path),
        };
        self.stats.media_events += 1;
        self.record(result, "media closed");
    }

    pub fn circle_annotation(&mut self, header: AnnotationHeader, circle: Circle, stroke: &[Point]) {
        let header = self.tag(header);
        log::debug!(
            "Circle annotation on {:?}: center {} radius {} ({} points)",
            header.path,
            circle.center,
            circle.radius,
            stroke.len()
        );

        let result = self.sink.on_circle(&header, &circle, stroke);
        self.stats.annotations += 1;
        self.record(result, "circle annotation");
    }

    pub fn line_annotation(&mut self, header: AnnotationHeader, line: Line, stroke: &[Point]) {
        let header = self.tag(header);
        log::debug!(
            "Line annotation on {:?}: {} -> {} ({} points)",
            header.path,
            line.start,
            line.end,
            stroke.len()
        );

        let result = self.sink.on_line(&header, &line, stroke);
        self.stats.annotations += 1;
        self.record(result, "line annotation");
    }

    pub fn polygon_annotation(&mut self, header: AnnotationHeader, stroke: &[Point]) {
        let header = self.tag(header);
        log::debug!(
            "Polygon annotation on {:?} ({} points)",
            header.path,
            stroke.len()
        );

        let result = self.sink.on_polygon(&header, stroke);
        self.stats.annotations += 1;
        self.record(result, "polygon annotation");
    }

    /// Tear the bridge down, dropping the sink
    pub fn shutdown(self) -> DispatchStats {
        if !self.media.is_empty() {
            log::warn!(
                "Bridge shut down with {} media still open: {:?}",
                self.media.len(),
                self.media.paths()
            );
        }
        log::info!(
            "Bridge shut down after {} media events and {} annotations ({} failed)",
            self.stats.media_events,
            self.stats.annotations,
            self.stats.failures
        );
        self.stats
    }

    fn tag(&self, mut header: AnnotationHeader) -> AnnotationHeader {
        header.media = self.media.kind_of(&header.path);
        header.space = self.space;
        header
    }

    fn record(&mut self, result: Result<()>, what: &str) {
        if let Err(e) = result {
            self.stats.failures += 1;
            log::error!("Sink failed to handle {}: {}", what, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::{BridgeEvent, RecordingSink};
    use crate::types::{BridgeError, FrameRange};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<RecordingSink>>);

    impl Shared {
        fn events(&self) -> Vec<BridgeEvent> {
            self.0.lock().unwrap().take()
        }
    }

    fn bridge() -> (Bridge, Shared) {
        let shared = Shared::default();
        let bridge = Bridge::new(Box::new(shared.0.clone()), CoordinateSpace::Absolute);
        (bridge, shared)
    }

    #[test]
    fn test_media_bookkeeping() {
        let (mut bridge, sink) = bridge();

        bridge.media_opened(MediaKind::Image, "a.png");
        bridge.media_opened(MediaKind::Video, "b.mp4");
        assert_eq!(bridge.media().kind_of("a.png"), Some(MediaKind::Image));
        assert_eq!(bridge.media().paths(), vec!["a.png", "b.mp4"]);

        bridge.media_closed(MediaKind::Image, "a.png");
        assert_eq!(bridge.media().kind_of("a.png"), None);
        assert_eq!(bridge.media().len(), 1);

        // Unknown path: tolerated, still forwarded
        bridge.media_closed(MediaKind::Image, "never.png");

        let events = sink.events();
        assert_eq!(events.len(), 4);
        assert_eq!(events[3].path(), "never.png");
        assert_eq!(bridge.stats().media_events, 4);
    }

    #[test]
    fn test_circle_uses_distinct_parameters() {
        let (mut bridge, sink) = bridge();

        let circle = Circle {
            center: Point::new(34.0, 21.0),
            radius: 12.5,
        };
        bridge.circle_annotation(
            AnnotationHeader::new("img.tif", "leaf spot", 0, 0),
            circle,
            &[],
        );

        let events = sink.events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            BridgeEvent::Circle {
                header,
                circle,
                stroke,
            } => {
                assert_eq!(header.path, "img.tif");
                assert_eq!(header.description, "leaf spot");
                assert_eq!((header.start, header.stop), (0, 0));
                assert_eq!(circle.center, Point::new(34.0, 21.0));
                assert_eq!(circle.radius, 12.5);
                assert!(stroke.is_empty());
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_headers_tagged_with_media_and_space() {
        let shared = Shared::default();
        let mut bridge = Bridge::new(Box::new(shared.0.clone()), CoordinateSpace::Relative);

        bridge.media_opened(MediaKind::Video, "clip.mp4");
        bridge.polygon_annotation(
            AnnotationHeader::new("clip.mp4", "lesion", 12, 40),
            &[Point::new(0.1, 0.2), Point::new(0.3, 0.4), Point::new(0.5, 0.1)],
        );

        let events = shared.events();
        let BridgeEvent::Polygon { header, stroke } = &events[1] else {
            panic!("expected polygon, got {:?}", events[1]);
        };
        assert_eq!(header.media, Some(MediaKind::Video));
        assert_eq!(header.space, CoordinateSpace::Relative);
        assert_eq!(header.frames(), Some(FrameRange { start: 12, stop: 40 }));
        assert_eq!(stroke.len(), 3);
    }

    #[test]
    fn test_line_forwarded_once() {
        let (mut bridge, sink) = bridge();
        let line = Line {
            start: Point::new(34.0, 34.0),
            end: Point::new(100.0, 100.0),
        };
        let stroke = [Point::new(34.0, 34.0), Point::new(100.0, 100.0)];

        bridge.line_annotation(AnnotationHeader::new("a.png", "d", 0, 0), line, &stroke);

        let events = sink.events();
        assert_eq!(
            events,
            vec![BridgeEvent::Line {
                header: AnnotationHeader::new("a.png", "d", 0, 0),
                line,
                stroke: stroke.to_vec(),
            }]
        );
        assert_eq!(bridge.stats().annotations, 1);
    }

    struct Failing;

    impl AnnotationSink for Failing {
        fn on_image_opened(&mut self, _: &str) -> Result<()> {
            Err(BridgeError::CallbackError("rejected".into()))
        }
        fn on_image_closed(&mut self, _: &str) -> Result<()> {
            Ok(())
        }
        fn on_video_opened(&mut self, _: &str) -> Result<()> {
            Ok(())
        }
        fn on_video_closed(&mut self, _: &str) -> Result<()> {
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

    #[test]
    fn test_sink_failure_is_counted() {
        let mut bridge = Bridge::new(Box::new(Failing), CoordinateSpace::Absolute);

        bridge.media_opened(MediaKind::Image, "a.png");
        // Bookkeeping happens regardless of the sink
        assert_eq!(bridge.media().kind_of("a.png"), Some(MediaKind::Image));

        let stats = bridge.shutdown();
        assert_eq!(stats.failures, 1);
        assert_eq!(stats.media_events, 1);
    }

    #[test]
    fn test_from_config_discard() {
        let config = BridgeConfig::new().with_output(OutputTarget::Discard);
        let mut bridge = Bridge::from_config(&config).unwrap();

        bridge.media_opened(MediaKind::Image, "a.png");
        assert_eq!(bridge.stats().failures, 0);
    }

    #[test]
    fn test_from_config_log_target() {
        let config = BridgeConfig::new()
            .with_output(OutputTarget::Log)
            .with_coordinate_space(CoordinateSpace::Relative);
        let mut bridge = Bridge::from_config(&config).unwrap();
        assert_eq!(bridge.coordinate_space(), CoordinateSpace::Relative);

        bridge.media_opened(MediaKind::Image, "a.png");
        bridge.polygon_annotation(
            AnnotationHeader::new("a.png", "d", 0, 0),
            &[Point::new(0.1, 0.1), Point::new(0.9, 0.5)],
        );

        assert_eq!(
            bridge.shutdown(),
            DispatchStats {
                media_events: 1,
                annotations: 1,
                failures: 0,
            }
        );
    }

    #[test]
    fn test_from_config_missing_plugin() {
        let config = BridgeConfig::new().with_plugin("/nonexistent/libplugin.so");
        assert!(Bridge::from_config(&config).is_err());
    }
}
