// JNI entry points driven from an embedded JVM
//
// Run with: cargo test -p covida-native --features jvm-tests
#![cfg(feature = "jvm-tests")]

use covida_native::jvm::entry::{
    Java_de_dfki_covida_nativealgorithm_NativeInterface_circleAnnotation as circle_annotation,
    Java_de_dfki_covida_nativealgorithm_NativeInterface_lineAnnotation as line_annotation,
    Java_de_dfki_covida_nativealgorithm_NativeInterface_onImageClosed as on_image_closed,
    Java_de_dfki_covida_nativealgorithm_NativeInterface_onImageOpened as on_image_opened,
    Java_de_dfki_covida_nativealgorithm_NativeInterface_polygonAnnotation as polygon_annotation,
};
use covida_native::jvm::{install, teardown};
use covida_native::{
    Bridge, BridgeEvent, Circle, CoordinateSpace, MediaKind, Point, RecordingSink,
};
use jni::objects::{JObject, JObjectArray, JString, JValue};
use jni::{InitArgsBuilder, JNIEnv, JNIVersion, JavaVM};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

static JVM: OnceLock<JavaVM> = OnceLock::new();

// The bridge slot is process-wide
static SERIAL: Mutex<()> = Mutex::new(());

fn jvm() -> &'static JavaVM {
    JVM.get_or_init(|| {
        let args = InitArgsBuilder::new()
            .version(JNIVersion::V8)
            .option("-Djava.awt.headless=true")
            .build()
            .unwrap();
        JavaVM::new(args).unwrap()
    })
}

/// Run `f` with a recording bridge installed and return what it recorded
fn recorded(f: impl FnOnce(&mut JNIEnv<'static>)) -> Vec<BridgeEvent> {
    let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
    let mut env = jvm().attach_current_thread_permanently().unwrap();

    let sink = Arc::new(Mutex::new(RecordingSink::new()));
    install(Bridge::new(Box::new(sink.clone()), CoordinateSpace::Absolute));
    f(&mut env);
    teardown();

    let events = sink.lock().unwrap().take();
    events
}

/// A second handle on the same thread's environment, passed by value like the JVM does
fn entry_env(env: &JNIEnv<'static>) -> JNIEnv<'static> {
    unsafe { JNIEnv::from_raw(env.get_raw()) }.unwrap()
}

fn jstring(env: &mut JNIEnv<'static>, value: &str) -> JString<'static> {
    env.new_string(value).unwrap()
}

/// `java.awt.Point[]` with a null element wherever `points` has `None`
fn point_array(env: &mut JNIEnv<'static>, points: &[Option<(i32, i32)>]) -> JObjectArray<'static> {
    let array = env
        .new_object_array(points.len() as i32, "java/awt/Point", JObject::null())
        .unwrap();
    for (index, point) in points.iter().enumerate() {
        if let Some((x, y)) = *point {
            let element = env
                .new_object("java/awt/Point", "(II)V", &[JValue::Int(x), JValue::Int(y)])
                .unwrap();
            env.set_object_array_element(&array, index as i32, &element)
                .unwrap();
            env.delete_local_ref(element).unwrap();
        }
    }
    array
}

/// Class name of the pending Java exception, clearing it
fn take_exception(env: &mut JNIEnv<'static>) -> Option<String> {
    if !env.exception_check().unwrap() {
        return None;
    }
    let exception = env.exception_occurred().unwrap();
    env.exception_clear().unwrap();

    let class = env.get_object_class(&exception).unwrap();
    let name = env
        .call_method(&class, "getName", "()Ljava/lang/String;", &[])
        .unwrap()
        .l()
        .unwrap();
    let name: String = env.get_string(&JString::from(name)).unwrap().into();
    Some(name)
}

#[test]
fn circle_arguments_reach_sink_unchanged() {
    let mut raised = None;
    let events = recorded(|env| {
        let path = jstring(env, "img.tif");
        let description = jstring(env, "leaf spot");
        let points = point_array(env, &[]);
        circle_annotation(
            entry_env(env),
            JObject::null(),
            path,
            description,
            0,
            0,
            34.0,
            21.0,
            12.5,
            points,
        );
        raised = take_exception(env);
    });

    assert_eq!(raised, None);
    assert_eq!(events.len(), 1);
    let BridgeEvent::Circle {
        header,
        circle,
        stroke,
    } = &events[0]
    else {
        panic!("expected circle, got {:?}", events[0]);
    };
    assert_eq!(header.path, "img.tif");
    assert_eq!(header.description, "leaf spot");
    assert_eq!(
        *circle,
        Circle {
            center: Point::new(34.0, 21.0),
            radius: 12.5
        }
    );
    assert!(stroke.is_empty());
}

#[test]
fn stroke_is_copied_in_order() {
    let source: Vec<Option<(i32, i32)>> = (0..2_000).map(|i| Some((i, 2 * i + 1))).collect();

    let events = recorded(|env| {
        let path = jstring(env, "/videos/growth.avi");
        let description = jstring(env, "stem axis");
        let points = point_array(env, &source);
        line_annotation(
            entry_env(env),
            JObject::null(),
            path,
            description,
            120,
            180,
            10.0,
            200.0,
            12.0,
            40.0,
            points,
        );
        assert_eq!(take_exception(env), None);
    });

    let BridgeEvent::Line { header, line, stroke } = &events[0] else {
        panic!("expected line, got {:?}", events[0]);
    };
    assert_eq!((header.start, header.stop), (120, 180));
    assert_eq!(line.start, Point::new(10.0, 200.0));
    assert_eq!(line.end, Point::new(12.0, 40.0));
    assert_eq!(stroke.len(), source.len());
    for (i, point) in stroke.iter().enumerate() {
        assert_eq!(*point, Point::new(i as f32, (2 * i + 1) as f32));
    }
}

#[test]
fn null_point_element_raises_without_notifying() {
    let mut raised = None;
    let events = recorded(|env| {
        let path = jstring(env, "img.tif");
        let description = jstring(env, "lesion");
        let points = point_array(env, &[Some((1, 1)), None, Some((3, 3))]);
        polygon_annotation(
            entry_env(env),
            JObject::null(),
            path,
            description,
            0,
            0,
            points,
        );
        raised = take_exception(env);
    });

    assert_eq!(raised.as_deref(), Some("java.lang.IllegalArgumentException"));
    assert!(events.is_empty());
}

#[test]
fn null_description_raises_without_notifying() {
    let mut raised = None;
    let events = recorded(|env| {
        let path = jstring(env, "img.tif");
        let points = point_array(env, &[]);
        circle_annotation(
            entry_env(env),
            JObject::null(),
            path,
            JString::from(JObject::null()),
            0,
            0,
            34.0,
            21.0,
            12.5,
            points,
        );
        raised = take_exception(env);
    });

    assert_eq!(raised.as_deref(), Some("java.lang.IllegalArgumentException"));
    assert!(events.is_empty());
}

#[test]
fn media_session_with_non_ascii_description() {
    let events = recorded(|env| {
        let path = jstring(env, "img.tif");
        on_image_opened(entry_env(env), JObject::null(), path);

        let path = jstring(env, "img.tif");
        let description = jstring(env, "Blattfleck über 5 mm 🌱");
        let points = point_array(env, &[Some((0, 0)), Some((4, 0)), Some((4, 4))]);
        polygon_annotation(
            entry_env(env),
            JObject::null(),
            path,
            description,
            0,
            0,
            points,
        );

        let path = jstring(env, "img.tif");
        on_image_closed(entry_env(env), JObject::null(), path);
        assert_eq!(take_exception(env), None);
    });

    assert_eq!(events.len(), 3);
    assert_eq!(
        events[0],
        BridgeEvent::MediaOpened {
            kind: MediaKind::Image,
            path: "img.tif".into()
        }
    );
    let BridgeEvent::Polygon { header, stroke } = &events[1] else {
        panic!("expected polygon, got {:?}", events[1]);
    };
    assert_eq!(header.description, "Blattfleck über 5 mm 🌱");
    assert_eq!(header.media, Some(MediaKind::Image));
    assert_eq!(stroke.len(), 3);
    assert!(matches!(events[2], BridgeEvent::MediaClosed { .. }));
}
