//! JVM boundary
//!
//! The Java side (`de.dfki.covida.nativealgorithm.NativeInterface`) declares
//! its native methods without any handle argument, so the bridge context lives
//! in a single process-wide slot:
//!
//! - `JNI_OnLoad` builds a [`Bridge`] from `COVIDA_NATIVE_CONFIG` and installs it
//! - every `Java_..._NativeInterface_*` entry point decodes its arguments and
//!   forwards them to the installed bridge
//! - `JNI_OnUnload` removes the bridge and shuts it down
//!
//! Calls from several JVM threads are serialized on the slot's mutex.

use crate::bridge::{Bridge, DispatchStats};
use crate::callbacks::TextSink;
use crate::config::BridgeConfig;
use crate::convert::decode_text;
use crate::types::{AnnotationHeader, BridgeError, Result};
use jni::objects::{JObject, JString};
use jni::sys::{jint, jlong, JNI_VERSION_1_8};
use jni::{JNIEnv, JavaVM};
use log::LevelFilter;
use std::ffi::c_void;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError};
use std::thread;

pub mod entry;
pub mod points;

pub use points::JniPointArray;

static BRIDGE: Mutex<Option<Bridge>> = Mutex::new(None);

/// Install `bridge` as the context used by the JNI entry points
///
/// Returns the bridge it replaces, if one was installed.
pub fn install(bridge: Bridge) -> Option<Bridge> {
    let mut slot = BRIDGE.lock().unwrap_or_else(PoisonError::into_inner);
    slot.replace(bridge)
}

/// Remove the installed bridge and shut it down
pub fn teardown() -> Option<DispatchStats> {
    let bridge = BRIDGE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    bridge.map(Bridge::shutdown)
}

/// Run `f` against the installed bridge, building one from the environment
/// if `JNI_OnLoad` has not run
pub fn with_bridge<R>(f: impl FnOnce(&mut Bridge) -> R) -> R {
    let mut slot = BRIDGE.lock().unwrap_or_else(PoisonError::into_inner);
    let bridge = slot.get_or_insert_with(|| {
        log::warn!("Native interface used before JNI_OnLoad, initializing now");
        build_bridge(BridgeConfig::from_env())
    });
    f(bridge)
}

/// Build the bridge for a loaded (or failed) configuration
///
/// The JVM must always get a working bridge, so a broken config falls back
/// to the defaults and a plugin that fails to load falls back to stdout.
fn build_bridge(config: Result<BridgeConfig>) -> Bridge {
    let config = config.unwrap_or_else(|e| {
        log::error!("Failed to load bridge config, using defaults: {}", e);
        BridgeConfig::default()
    });
    match Bridge::from_config(&config) {
        Ok(bridge) => bridge,
        Err(e) => {
            log::error!("Failed to build configured sink, reporting to stdout: {}", e);
            Bridge::new(Box::new(TextSink::stdout()), config.coordinate_space)
        }
    }
}

/// Install a logger unless the host process already has one
fn init_logging(level: LevelFilter) {
    use env_logger::Builder;
    use std::io::Write;

    let _ = Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init();
}

#[no_mangle]
pub extern "system" fn JNI_OnLoad(_vm: JavaVM, _reserved: *mut c_void) -> jint {
    let config = BridgeConfig::from_env();
    let level = config
        .as_ref()
        .map(|c| LevelFilter::from(c.log_level))
        .unwrap_or(LevelFilter::Info);
    init_logging(level);

    log::info!("CoVida native interface v{}", crate::VERSION);

    if install(build_bridge(config)).is_some() {
        log::warn!("Replaced a bridge left over from a previous load");
    }
    JNI_VERSION_1_8
}

#[no_mangle]
pub extern "system" fn JNI_OnUnload(_vm: JavaVM, _reserved: *mut c_void) {
    teardown();
}

/// Reject a null object reference passed for argument `what`
pub(crate) fn require_present(value: &JObject, what: &'static str) -> Result<()> {
    if value.is_null() {
        return Err(BridgeError::NullArgument(what));
    }
    Ok(())
}

/// Decode a Java string argument into an owned string
///
/// The UTF chars borrowed from the JVM are released when the `JavaStr` guard
/// drops, before this function returns.
pub(crate) fn decode_string(
    env: &mut JNIEnv,
    value: &JString,
    what: &'static str,
) -> Result<String> {
    require_present(value, what)?;
    let borrowed = env.get_string(value)?;
    Ok(decode_text(&borrowed))
}

pub(crate) fn decode_header(
    env: &mut JNIEnv,
    path: &JString,
    description: &JString,
    start: jlong,
    stop: jlong,
) -> Result<AnnotationHeader> {
    let path = decode_string(env, path, "path")?;
    let description = decode_string(env, description, "description")?;
    Ok(AnnotationHeader::new(path, description, start, stop))
}

/// Java exception class and message for the outcome of an entry point body
fn exception_for(
    entry: &str,
    outcome: thread::Result<Result<()>>,
) -> Option<(&'static str, String)> {
    match outcome {
        Ok(Ok(())) => None,
        Ok(Err(e)) => {
            log::error!("{}: rejected call: {}", entry, e);
            Some((
                "java/lang/IllegalArgumentException",
                format!("{}: {}", entry, e),
            ))
        }
        Err(_) => {
            log::error!("{}: native handler panicked", entry);
            Some((
                "java/lang/RuntimeException",
                format!("{}: native handler panicked", entry),
            ))
        }
    }
}

/// Run one entry point body, turning failures into Java exceptions
///
/// A decoding failure raises `IllegalArgumentException` and a panic raises
/// `RuntimeException`; in both cases the bridge is not notified. If the failure
/// came from a Java exception that is already pending, that exception is left
/// to propagate instead.
pub(crate) fn run_entry<'local, F>(env: &mut JNIEnv<'local>, entry: &str, body: F)
where
    F: FnOnce(&mut JNIEnv<'local>) -> Result<()>,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| body(&mut *env)));

    let Some((class, message)) = exception_for(entry, outcome) else {
        return;
    };

    if env.exception_check().unwrap_or(true) {
        return;
    }
    if let Err(e) = env.throw_new(class, message) {
        log::error!("{}: failed to raise {}: {}", entry, class, e);
    }
}
