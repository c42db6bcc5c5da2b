//! CoVida Native Bridge
//!
//! Native side of the CoVida annotation tool. The Java application notifies
//! this library when images or videos are opened or closed and when the user
//! draws a circle, line or polygon annotation over them.
//!
//! # Architecture
//!
//! - [`jvm`]: the boundary adapter. JNI entry points decode Java strings and
//!   `Point[]` arrays into owned Rust values and forward them to the bridge.
//! - [`Bridge`]: the dispatch context. Tracks which media are open and calls
//!   the configured sink once per notification.
//! - [`AnnotationSink`]: the callback surface a native implementation fills
//!   in. The library ships a reporting sink (stdout or `log`), a recording sink
//!   and a sink forwarding to a dynamically loaded C plugin.
//!
//! The library does NOT:
//! - Persist annotations
//! - Validate or normalize geometry
//! - Decode images or video frames
//!
//! # Example Usage
//!
//! ```
//! use covida_native::{AnnotationHeader, Bridge, Circle, CoordinateSpace, MediaKind, Point};
//! use covida_native::callbacks::TextSink;
//!
//! let mut bridge = Bridge::new(Box::new(TextSink::stdout()), CoordinateSpace::Absolute);
//!
//! bridge.media_opened(MediaKind::Image, "/data/IMAGE_4_0002.tif");
//! bridge.circle_annotation(
//!     AnnotationHeader::new("/data/IMAGE_4_0002.tif", "leaf spot", 0, 0),
//!     Circle { center: Point::new(34.0, 34.0), radius: 12.5 },
//!     &[Point::new(21.5, 34.0), Point::new(34.0, 46.5)],
//! );
//! bridge.media_closed(MediaKind::Image, "/data/IMAGE_4_0002.tif");
//! ```

// Public modules
pub mod bridge;
pub mod callbacks;
pub mod config;
pub mod convert;
pub mod jvm;
pub mod types;

// Re-export main types for convenience
pub use bridge::{Bridge, DispatchStats, MediaRegistry};
pub use callbacks::{AnnotationSink, BridgeEvent, RecordingSink};
pub use config::{BridgeConfig, OutputTarget};
pub use convert::{convert_points, HostPointArray};
pub use types::{
    AnnotationHeader, BridgeError, Circle, CoordinateSpace, FrameRange, Line, MediaKind, Point,
    Result,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
