//! JNI bindings for the Java visualization front ends.
//!
//! `imau.visualization.SageFrame` hands over `int[]` pixel arrays and drives
//! the pixel-array bridge. `nl.esciencecenter.visualization.esalsa.jni.SageInterface`
//! hands over direct `ByteBuffer`s read back from GL and drives the
//! direct-buffer bridge. Failures return the negative status code and raise
//! `IllegalStateException` with the error message.

use crate::errors::BridgeError;
use crate::ffi;
use jni::objects::{JByteBuffer, JIntArray, JObject, ReleaseMode};
use jni::sys::jint;
use jni::JNIEnv;

const EXCEPTION_CLASS: &str = "java/lang/IllegalStateException";

fn jni_error(e: jni::errors::Error) -> BridgeError {
    BridgeError::InvalidParameters(format!("JNI call failed: {}", e))
}

fn finish(env: &mut JNIEnv, entry: &str, result: Result<(), BridgeError>) -> jint {
    let message = result.as_ref().err().map(ToString::to_string);
    let status = ffi::report(entry, result);
    if let Some(message) = message {
        // A pending exception from a failed JNI call takes precedence.
        if !env.exception_check().unwrap_or(true) {
            let _ = env.throw_new(EXCEPTION_CLASS, message);
        }
    }
    status
}

#[no_mangle]
pub extern "system" fn Java_imau_visualization_SageFrame_setup(
    mut env: JNIEnv,
    _obj: JObject,
    width: jint,
    height: jint,
    fps: jint,
) -> jint {
    let result = ffi::pixels().setup(width, height, fps);
    finish(&mut env, "SageFrame.setup", result)
}

/// Submits the Java pixel array as one frame.
///
/// The array is borrowed for the duration of the call and never written back.
#[no_mangle]
pub extern "system" fn Java_imau_visualization_SageFrame_display(
    mut env: JNIEnv,
    _obj: JObject,
    pixels: JIntArray,
) -> jint {
    let result = || -> Result<(), BridgeError> {
        if pixels.as_raw().is_null() {
            return Err(BridgeError::InvalidParameters(
                "pixel array is null".to_string(),
            ));
        }
        // SAFETY: nothing else in this call accesses the array while the
        // elements are held, and they are released before returning.
        let elements = unsafe { env.get_array_elements(&pixels, ReleaseMode::NoCopyBack) }
            .map_err(jni_error)?;
        ffi::pixels().submit_pixels(bytemuck::cast_slice::<jint, u32>(&elements[..]))
    }();
    finish(&mut env, "SageFrame.display", result)
}

#[no_mangle]
pub extern "system" fn Java_nl_esciencecenter_visualization_esalsa_jni_SageInterface_setup(
    mut env: JNIEnv,
    _obj: JObject,
    width: jint,
    height: jint,
    fps: jint,
) -> jint {
    let result = ffi::direct().setup(width, height, fps);
    finish(&mut env, "SageInterface.setup", result)
}

/// Submits the contents of a direct `ByteBuffer` as one frame.
#[no_mangle]
pub extern "system" fn Java_nl_esciencecenter_visualization_esalsa_jni_SageInterface_start(
    mut env: JNIEnv,
    _obj: JObject,
    frame: JByteBuffer,
) -> jint {
    let result = || -> Result<(), BridgeError> {
        if frame.as_raw().is_null() {
            return Err(BridgeError::InvalidParameters(
                "frame buffer is null".to_string(),
            ));
        }
        let address = env.get_direct_buffer_address(&frame).map_err(jni_error)?;
        let capacity = env.get_direct_buffer_capacity(&frame).map_err(jni_error)?;
        // SAFETY: the JVM keeps a direct buffer's memory alive while the Java
        // caller holds a reference to it, which it does for this whole call.
        let bytes = unsafe { std::slice::from_raw_parts(address, capacity) };
        ffi::direct().submit(bytes)
    }();
    finish(&mut env, "SageInterface.start", result)
}

/// Closes the pixel-array session.
#[no_mangle]
pub extern "system" fn Java_imau_visualization_SageFrame_shutdown(
    mut env: JNIEnv,
    _obj: JObject,
) -> jint {
    let result = ffi::pixels().shutdown();
    finish(&mut env, "SageFrame.shutdown", result)
}

/// Closes the direct-buffer session.
#[no_mangle]
pub extern "system" fn Java_nl_esciencecenter_visualization_esalsa_jni_SageInterface_shutdown(
    mut env: JNIEnv,
    _obj: JObject,
) -> jint {
    let result = ffi::direct().shutdown();
    finish(&mut env, "SageInterface.shutdown", result)
}
