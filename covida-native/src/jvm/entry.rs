//! Native methods of `de.dfki.covida.nativealgorithm.NativeInterface`
//!
//! ```java
//! private native void onVideoOpened(final String path);
//! private native void onVideoClosed(final String path);
//! private native void onImageOpened(final String path);
//! private native void onImageClosed(final String path);
//! private native void circleAnnotation(String path, String description, long start, long stop,
//!         float dx, float dy, float radius, Point[] points);
//! private native void lineAnnotation(String path, String description, long start, long stop,
//!         float bx, float by, float ex, float ey, Point[] points);
//! private native void polygonAnnotation(String path, String description, long start, long stop,
//!         Point[] points);
//! ```

use super::{decode_header, decode_string, run_entry, with_bridge, JniPointArray};
use crate::convert::convert_points;
use crate::types::{Circle, Line, MediaKind, Point};
use jni::objects::{JObject, JObjectArray, JString};
use jni::sys::{jfloat, jlong};
use jni::JNIEnv;

/// Circle geometry from the `dx`, `dy`, `radius` arguments of `circleAnnotation`
pub(crate) fn circle_from_args(dx: jfloat, dy: jfloat, radius: jfloat) -> Circle {
    Circle {
        center: Point::new(dx, dy),
        radius,
    }
}

/// Line geometry from the `bx`, `by`, `ex`, `ey` arguments of `lineAnnotation`
pub(crate) fn line_from_args(bx: jfloat, by: jfloat, ex: jfloat, ey: jfloat) -> Line {
    Line {
        start: Point::new(bx, by),
        end: Point::new(ex, ey),
    }
}

fn media_entry(env: &mut JNIEnv, entry: &str, path: JString, kind: MediaKind, opened: bool) {
    run_entry(env, entry, |env| {
        let path = decode_string(env, &path, "path")?;
        with_bridge(|bridge| {
            if opened {
                bridge.media_opened(kind, &path)
            } else {
                bridge.media_closed(kind, &path)
            }
        });
        Ok(())
    });
}

#[no_mangle]
pub extern "system" fn Java_de_dfki_covida_nativealgorithm_NativeInterface_onImageOpened(
    mut env: JNIEnv,
    _this: JObject,
    path: JString,
) {
    media_entry(&mut env, "onImageOpened", path, MediaKind::Image, true);
}

#[no_mangle]
pub extern "system" fn Java_de_dfki_covida_nativealgorithm_NativeInterface_onImageClosed(
    mut env: JNIEnv,
    _this: JObject,
    path: JString,
) {
    media_entry(&mut env, "onImageClosed", path, MediaKind::Image, false);
}

#[no_mangle]
pub extern "system" fn Java_de_dfki_covida_nativealgorithm_NativeInterface_onVideoOpened(
    mut env: JNIEnv,
    _this: JObject,
    path: JString,
) {
    media_entry(&mut env, "onVideoOpened", path, MediaKind::Video, true);
}

#[no_mangle]
pub extern "system" fn Java_de_dfki_covida_nativealgorithm_NativeInterface_onVideoClosed(
    mut env: JNIEnv,
    _this: JObject,
    path: JString,
) {
    media_entry(&mut env, "onVideoClosed", path, MediaKind::Video, false);
}

#[no_mangle]
pub extern "system" fn Java_de_dfki_covida_nativealgorithm_NativeInterface_circleAnnotation<
    'local,
>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    path: JString<'local>,
    description: JString<'local>,
    start: jlong,
    stop: jlong,
    dx: jfloat,
    dy: jfloat,
    radius: jfloat,
    points: JObjectArray<'local>,
) {
    run_entry(&mut env, "circleAnnotation", |env| {
        let header = decode_header(env, &path, &description, start, stop)?;
        let stroke = convert_points(JniPointArray::new(env, &points)?)?;
        let circle = circle_from_args(dx, dy, radius);
        with_bridge(|bridge| bridge.circle_annotation(header, circle, &stroke));
        Ok(())
    });
}

#[no_mangle]
pub extern "system" fn Java_de_dfki_covida_nativealgorithm_NativeInterface_lineAnnotation<
    'local,
>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    path: JString<'local>,
    description: JString<'local>,
    start: jlong,
    stop: jlong,
    bx: jfloat,
    by: jfloat,
    ex: jfloat,
    ey: jfloat,
    points: JObjectArray<'local>,
) {
    run_entry(&mut env, "lineAnnotation", |env| {
        let header = decode_header(env, &path, &description, start, stop)?;
        let stroke = convert_points(JniPointArray::new(env, &points)?)?;
        let line = line_from_args(bx, by, ex, ey);
        with_bridge(|bridge| bridge.line_annotation(header, line, &stroke));
        Ok(())
    });
}

#[no_mangle]
pub extern "system" fn Java_de_dfki_covida_nativealgorithm_NativeInterface_polygonAnnotation<
    'local,
>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    path: JString<'local>,
    description: JString<'local>,
    start: jlong,
    stop: jlong,
    points: JObjectArray<'local>,
) {
    run_entry(&mut env, "polygonAnnotation", |env| {
        let header = decode_header(env, &path, &description, start, stop)?;
        let stroke = convert_points(JniPointArray::new(env, &points)?)?;
        with_bridge(|bridge| bridge.polygon_annotation(header, &stroke));
        Ok(())
    });
}
