//! Native plugin sink
//!
//! Lets a native implementation fill in the callback surface without being
//! compiled into the bridge. A plugin is a shared library exporting
//!
//! ```c
//! CovidaCallbacks covida_plugin_callbacks(void);
//! ```
//!
//! which returns a table of C function pointers. Any pointer may be null, in
//! which case that notification is skipped for the plugin.
//!
//! Strings are passed as NUL-terminated UTF-8 and strokes as a
//! `(const Point*, size_t)` pair; both are only valid for the duration of the
//! call. When the count is 0 the point pointer must not be dereferenced.

use super::AnnotationSink;
use crate::types::{
    AnnotationHeader, BridgeError, Circle, CoordinateSpace, Line, MediaKind, Point, Result,
};
use libloading::{Library, Symbol};
use std::ffi::{c_char, c_void, CString};
use std::path::Path;

/// Exported symbol every plugin must provide
pub const PLUGIN_ENTRY_SYMBOL: &[u8] = b"covida_plugin_callbacks";

/// C view of [`AnnotationHeader`]
#[repr(C)]
#[derive(Debug)]
pub struct CAnnotationHeader {
    pub path: *const c_char,
    pub description: *const c_char,
    pub start: i64,
    pub stop: i64,
    /// 0 = not tracked by the bridge, 1 = image, 2 = video
    pub media: u32,
    /// 0 = absolute pixels, 1 = relative [0, 1]
    pub coordinate_space: u32,
}

pub type PathCallback = extern "C" fn(context: *mut c_void, path: *const c_char);

pub type CircleCallback = extern "C" fn(
    context: *mut c_void,
    header: *const CAnnotationHeader,
    center_x: f32,
    center_y: f32,
    radius: f32,
    points: *const Point,
    count: usize,
);

pub type LineCallback = extern "C" fn(
    context: *mut c_void,
    header: *const CAnnotationHeader,
    begin_x: f32,
    begin_y: f32,
    end_x: f32,
    end_y: f32,
    points: *const Point,
    count: usize,
);

pub type PolygonCallback = extern "C" fn(
    context: *mut c_void,
    header: *const CAnnotationHeader,
    points: *const Point,
    count: usize,
);

pub type UnloadCallback = extern "C" fn(context: *mut c_void);

/// Callback table returned by a plugin's entry point
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CovidaCallbacks {
    /// Opaque pointer handed back to every callback
    pub context: *mut c_void,
    pub on_image_opened: Option<PathCallback>,
    pub on_image_closed: Option<PathCallback>,
    pub on_video_opened: Option<PathCallback>,
    pub on_video_closed: Option<PathCallback>,
    pub on_circle: Option<CircleCallback>,
    pub on_line: Option<LineCallback>,
    pub on_polygon: Option<PolygonCallback>,
    /// Called once before the library is unloaded
    pub on_unload: Option<UnloadCallback>,
}

impl CovidaCallbacks {
    /// A table with no callbacks installed
    pub fn empty(context: *mut c_void) -> Self {
        Self {
            context,
            on_image_opened: None,
            on_image_closed: None,
            on_video_opened: None,
            on_video_closed: None,
            on_circle: None,
            on_line: None,
            on_polygon: None,
            on_unload: None,
        }
    }
}

type PluginEntry = unsafe extern "C" fn() -> CovidaCallbacks;

/// Forwards notifications to a native plugin over the C ABI
pub struct PluginSink {
    callbacks: CovidaCallbacks,
    // Dropped after `on_unload` has run
    _library: Option<Library>,
}

// The plugin context is only touched from the thread holding the bridge lock.
unsafe impl Send for PluginSink {}

impl PluginSink {
    /// Load a plugin library and fetch its callback table
    pub fn load(path: &Path) -> Result<Self> {
        log::info!("Loading annotation plugin: {:?}", path);

        let library = unsafe { Library::new(path) }
            .map_err(|e| BridgeError::PluginLoadError(format!("{:?}: {}", path, e)))?;

        let callbacks = unsafe {
            let entry: Symbol<PluginEntry> = library.get(PLUGIN_ENTRY_SYMBOL).map_err(|e| {
                BridgeError::PluginLoadError(format!(
                    "{:?} does not export covida_plugin_callbacks: {}",
                    path, e
                ))
            })?;
            entry()
        };

        log::info!("Annotation plugin loaded: {:?}", path);
        Ok(Self {
            callbacks,
            _library: Some(library),
        })
    }

    /// Wrap a callback table that is linked into the current process
    ///
    /// # Safety
    /// `callbacks.context` must stay valid for as long as the sink lives and
    /// every callback must accept it.
    pub unsafe fn from_callbacks(callbacks: CovidaCallbacks) -> Self {
        Self {
            callbacks,
            _library: None,
        }
    }

    fn path_callback(&self, callback: Option<PathCallback>, path: &str) -> Result<()> {
        if let Some(callback) = callback {
            let path = c_string(path)?;
            callback(self.callbacks.context, path.as_ptr());
        }
        Ok(())
    }
}

impl Drop for PluginSink {
    fn drop(&mut self) {
        if let Some(on_unload) = self.callbacks.on_unload {
            on_unload(self.callbacks.context);
        }
    }
}

fn c_string(value: &str) -> Result<CString> {
    CString::new(value).map_err(|_| {
        BridgeError::CallbackError(format!("string contains a NUL byte: {:?}", value))
    })
}

/// Owns the C strings a [`CAnnotationHeader`] points into
struct HeaderStrings {
    path: CString,
    description: CString,
}

impl HeaderStrings {
    fn new(header: &AnnotationHeader) -> Result<Self> {
        Ok(Self {
            path: c_string(&header.path)?,
            description: c_string(&header.description)?,
        })
    }

    fn view(&self, header: &AnnotationHeader) -> CAnnotationHeader {
        CAnnotationHeader {
            path: self.path.as_ptr(),
            description: self.description.as_ptr(),
            start: header.start,
            stop: header.stop,
            media: match header.media {
                None => 0,
                Some(MediaKind::Image) => 1,
                Some(MediaKind::Video) => 2,
            },
            coordinate_space: match header.space {
                CoordinateSpace::Absolute => 0,
                CoordinateSpace::Relative => 1,
            },
        }
    }
}

impl AnnotationSink for PluginSink {
    fn on_image_opened(&mut self, path: &str) -> Result<()> {
        self.path_callback(self.callbacks.on_image_opened, path)
    }

    fn on_image_closed(&mut self, path: &str) -> Result<()> {
        self.path_callback(self.callbacks.on_image_closed, path)
    }

    fn on_video_opened(&mut self, path: &str) -> Result<()> {
        self.path_callback(self.callbacks.on_video_opened, path)
    }

    fn on_video_closed(&mut self, path: &str) -> Result<()> {
        self.path_callback(self.callbacks.on_video_closed, path)
    }

    fn on_circle(
        &mut self,
        header: &AnnotationHeader,
        circle: &Circle,
        stroke: &[Point],
    ) -> Result<()> {
        let Some(callback) = self.callbacks.on_circle else {
            return Ok(());
        };
        let strings = HeaderStrings::new(header)?;
        let c_header = strings.view(header);
        callback(
            self.callbacks.context,
            &c_header,
            circle.center.x,
            circle.center.y,
            circle.radius,
            stroke.as_ptr(),
            stroke.len(),
        );
        Ok(())
    }

    fn on_line(&mut self, header: &AnnotationHeader, line: &Line, stroke: &[Point]) -> Result<()> {
        let Some(callback) = self.callbacks.on_line else {
            return Ok(());
        };
        let strings = HeaderStrings::new(header)?;
        let c_header = strings.view(header);
        callback(
            self.callbacks.context,
            &c_header,
            line.start.x,
            line.start.y,
            line.end.x,
            line.end.y,
            stroke.as_ptr(),
            stroke.len(),
        );
        Ok(())
    }

    fn on_polygon(&mut self, header: &AnnotationHeader, stroke: &[Point]) -> Result<()> {
        let Some(callback) = self.callbacks.on_polygon else {
            return Ok(());
        };
        let strings = HeaderStrings::new(header)?;
        let c_header = strings.view(header);
        callback(
            self.callbacks.context,
            &c_header,
            stroke.as_ptr(),
            stroke.len(),
        );
        Ok(())
    }
}
