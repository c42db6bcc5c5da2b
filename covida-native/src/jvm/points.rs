//! `java.awt.Point[]` access for stroke conversion

use super::require_present;
use crate::convert::HostPointArray;
use crate::types::{BridgeError, Point, Result};
use jni::objects::JObjectArray;
use jni::sys::jsize;
use jni::JNIEnv;

// Each element read creates at most a handful of local references
const ELEMENT_FRAME_CAPACITY: i32 = 4;

/// A host point array viewed through a JNI environment
///
/// Elements are read through `getX()`/`getY()`, so any `java.awt.geom.Point2D`
/// works, not just `java.awt.Point`. Every element is read inside its own
/// local frame; the frame is popped on every exit path, so no local reference
/// into the array outlives the read.
pub struct JniPointArray<'a, 'local> {
    env: &'a mut JNIEnv<'local>,
    array: &'a JObjectArray<'local>,
}

impl<'a, 'local> JniPointArray<'a, 'local> {
    pub fn new(env: &'a mut JNIEnv<'local>, array: &'a JObjectArray<'local>) -> Result<Self> {
        require_present(array, "point array")?;
        Ok(Self { env, array })
    }
}

impl HostPointArray for JniPointArray<'_, '_> {
    fn len(&mut self) -> Result<usize> {
        let len = self.env.get_array_length(self.array)?;
        Ok(len as usize)
    }

    fn point_at(&mut self, index: usize) -> Result<Point> {
        let array = self.array;
        self.env
            .with_local_frame(ELEMENT_FRAME_CAPACITY, |env| -> Result<Point> {
                let element = env.get_object_array_element(array, index as jsize)?;
                if element.is_null() {
                    return Err(BridgeError::NullPoint(index));
                }

                let x = env.call_method(&element, "getX", "()D", &[])?.d()?;
                let y = env.call_method(&element, "getY", "()D", &[])?.d()?;
                Ok(Point::new(x as f32, y as f32))
            })
    }
}
