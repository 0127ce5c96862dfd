// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android platform bridge via JNI.
//
// Requires the Android NDK and targets `aarch64-linux-android` or
// `armv7-linux-androideabi`.
//
// ## Architecture notes
//
// Content access goes through `ContentResolver.openFileDescriptor`. The
// returned `ParcelFileDescriptor` is detached immediately and the raw fd is
// owned by Rust from then on, so reads and writes never cross JNI.
//
// The player notification is rendered by the host app's
// `org.contentbridge.NotificationHelper`, obtained from the activity's
// `notification()` method. The Java side must provide:
//
//   void setNativeHandle(long handle)
//   void showPlayerNotification(boolean playing, String icon, String text, String title)
//   void hidePlayerNotification()
//   static native void callback(long handle, String action)
//
// Its broadcast receiver calls `callback(handle, intent.getAction())` for the
// PLAY, PAUSE and NEXT intents. The handle is the address of the
// `ActionBridge` given to `AndroidStatusSurface::new`; zero means released.

#![cfg(target_os = "android")]

use std::fs::File;
use std::os::fd::FromRawFd;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use jni::errors::Error as JniError;
use jni::objects::{GlobalRef, JClass, JObject, JString, JValue};
use jni::sys::jlong;
use jni::{JNIEnv, JavaVM};

use contentbridge_core::error::{BridgeError, Result};
use contentbridge_core::types::{HandleMode, PlayerNotification, ResourceIdentifier};
use tracing::{debug, info, warn};

use crate::action::ActionBridge;
use crate::fd::FileCapability;
use crate::traits::*;

/// `OpenableColumns.DISPLAY_NAME`.
const DISPLAY_NAME_COLUMN: &str = "_display_name";

/// JNI class of the host app's notification helper.
const NOTIFICATION_HELPER_CLASS: &str = "org/contentbridge/NotificationHelper";

// ---------------------------------------------------------------------------
// JNI bootstrap helpers
// ---------------------------------------------------------------------------

/// Run `f` with an attached [`JNIEnv`] and the hosting `Activity`.
///
/// The `JavaVM*` and activity come from `ndk_context::android_context()`,
/// set by `android_main` or `ANativeActivity_onCreate`. The current thread is
/// attached for the duration of the call if it is not already.
fn with_env<T>(f: impl FnOnce(&mut JNIEnv<'_>, &JObject<'_>) -> Result<T>) -> Result<T> {
    let ctx = ndk_context::android_context();
    // SAFETY: `ctx.vm()` returns the `JavaVM*` set by the NDK glue code.
    // The pointer is guaranteed valid for the lifetime of the process.
    let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }
        .map_err(|e| BridgeError::Bridge(format!("failed to obtain JavaVM: {e}")))?;
    let mut env = vm
        .attach_current_thread()
        .map_err(|e| BridgeError::Bridge(format!("failed to attach JNI thread: {e}")))?;

    let ptr = ctx.context();
    if ptr.is_null() {
        return Err(BridgeError::Bridge(
            "Android context is null; native activity not initialised".into(),
        ));
    }
    // SAFETY: the NDK guarantees this pointer is a valid global jobject for
    // the hosting Activity. `JObject` does not delete the reference on drop.
    let activity = unsafe { JObject::from_raw(ptr.cast()) };

    f(&mut env, &activity)
}

/// Convenience: map any `jni::errors::Error` into `BridgeError::Bridge`.
fn jni_err(context: &str, e: JniError) -> BridgeError {
    BridgeError::Bridge(format!("{context}: {e}"))
}

/// Turn a failed resolver call into the matching content error.
///
/// A pending Java exception is cleared and classified by type:
/// `FileNotFoundException` / `IllegalArgumentException` mean the URI does not
/// resolve, `SecurityException` means the grant was refused.
fn resolver_err(env: &mut JNIEnv<'_>, resource: &str, context: &str, e: JniError) -> BridgeError {
    if !matches!(e, JniError::JavaException) {
        return jni_err(context, e);
    }
    let throwable = match env.exception_occurred() {
        Ok(throwable) => throwable,
        Err(inner) => return jni_err(context, inner),
    };
    if let Err(inner) = env.exception_clear() {
        return jni_err(context, inner);
    }

    let mut is_a = |class: &str| env.is_instance_of(&throwable, class).unwrap_or(false);
    if is_a("java/lang/SecurityException") {
        BridgeError::AccessDenied(format!("{resource}: {context} refused"))
    } else if is_a("java/io/FileNotFoundException") || is_a("java/lang/IllegalArgumentException") {
        BridgeError::ResourceNotFound(format!("{resource}: {context} failed"))
    } else {
        BridgeError::IoFailure(format!("{resource}: {context} threw"))
    }
}

/// `Uri.parse(id)`.
fn parse_uri<'local>(env: &mut JNIEnv<'local>, id: &ResourceIdentifier) -> Result<JObject<'local>> {
    let j_uri_str: JString = env
        .new_string(id.as_str())
        .map_err(|e| jni_err("new_string(uri)", e))?;

    env.call_static_method(
        "android/net/Uri",
        "parse",
        "(Ljava/lang/String;)Landroid/net/Uri;",
        &[JValue::Object(&j_uri_str)],
    )
    .map_err(|e| jni_err("Uri.parse", e))?
    .l()
    .map_err(|e| jni_err("Uri.parse->l", e))
}

/// `activity.getContentResolver()`.
fn content_resolver<'local>(
    env: &mut JNIEnv<'local>,
    activity: &JObject<'_>,
) -> Result<JObject<'local>> {
    env.call_method(
        activity,
        "getContentResolver",
        "()Landroid/content/ContentResolver;",
        &[],
    )
    .map_err(|e| jni_err("getContentResolver", e))?
    .l()
    .map_err(|e| jni_err("getContentResolver->l", e))
}

// ---------------------------------------------------------------------------
// ContentResolver: android.content.ContentResolver
// ---------------------------------------------------------------------------

/// Resolver backed by the Android content provider framework.
///
/// Zero-sized; all state lives on the Java side.
#[derive(Debug, Default, Clone, Copy)]
pub struct AndroidResolver;

impl AndroidResolver {
    /// This does **not** touch JNI; the first JNI call happens lazily.
    pub fn new() -> Self {
        Self
    }
}

impl ContentResolver for AndroidResolver {
    /// Open a `ParcelFileDescriptor` and take ownership of its fd.
    fn open_descriptor(
        &self,
        id: &ResourceIdentifier,
        mode: HandleMode,
    ) -> Result<Box<dyn CapabilityDescriptor>> {
        with_env(|env, activity| {
            info!(uri = %id, %mode, "Android: openFileDescriptor");

            let uri = parse_uri(env, id)?;
            let resolver = content_resolver(env, activity)?;
            let j_mode: JString = env
                .new_string(mode.as_platform_mode())
                .map_err(|e| jni_err("new_string(mode)", e))?;

            let pfd = env
                .call_method(
                    &resolver,
                    "openFileDescriptor",
                    "(Landroid/net/Uri;Ljava/lang/String;)Landroid/os/ParcelFileDescriptor;",
                    &[JValue::Object(&uri), JValue::Object(&j_mode)],
                )
                .map_err(|e| resolver_err(env, id.as_str(), "openFileDescriptor", e))?
                .l()
                .map_err(|e| jni_err("openFileDescriptor->l", e))?;

            if pfd.is_null() {
                return Err(BridgeError::ResourceNotFound(format!(
                    "{id}: provider returned no descriptor"
                )));
            }

            // After detachFd the ParcelFileDescriptor no longer closes the fd.
            let fd = env
                .call_method(&pfd, "detachFd", "()I", &[])
                .map_err(|e| resolver_err(env, id.as_str(), "detachFd", e))?
                .i()
                .map_err(|e| jni_err("detachFd->i", e))?;

            // SAFETY: detachFd transferred sole ownership of a valid, open fd.
            let file = unsafe { File::from_raw_fd(fd) };
            debug!(uri = %id, fd, "Android: descriptor detached");

            Ok(Box::new(FileCapability::new(file, mode, id.as_str())) as Box<dyn CapabilityDescriptor>)
        })
    }

    /// Query `OpenableColumns.DISPLAY_NAME` for the URI.
    fn query_display_name(&self, id: &ResourceIdentifier) -> Result<Option<String>> {
        with_env(|env, activity| {
            let uri = parse_uri(env, id)?;
            let resolver = content_resolver(env, activity)?;
            let null = JObject::null();

            let cursor = env
                .call_method(
                    &resolver,
                    "query",
                    "(Landroid/net/Uri;[Ljava/lang/String;Ljava/lang/String;[Ljava/lang/String;Ljava/lang/String;)Landroid/database/Cursor;",
                    &[
                        JValue::Object(&uri),
                        JValue::Object(&null),
                        JValue::Object(&null),
                        JValue::Object(&null),
                        JValue::Object(&null),
                    ],
                )
                .map_err(|e| resolver_err(env, id.as_str(), "query", e))?
                .l()
                .map_err(|e| jni_err("query->l", e))?;

            if cursor.is_null() {
                return Ok(None);
            }

            let name = read_display_name(env, &cursor);

            // Close the cursor on every path, then report the read result.
            env.call_method(&cursor, "close", "()V", &[])
                .map_err(|e| jni_err("Cursor.close", e))?;

            name
        })
    }
}

fn read_display_name(env: &mut JNIEnv<'_>, cursor: &JObject<'_>) -> Result<Option<String>> {
    let has_row = env
        .call_method(cursor, "moveToFirst", "()Z", &[])
        .map_err(|e| jni_err("Cursor.moveToFirst", e))?
        .z()
        .map_err(|e| jni_err("moveToFirst->z", e))?;
    if !has_row {
        return Ok(None);
    }

    let j_column: JString = env
        .new_string(DISPLAY_NAME_COLUMN)
        .map_err(|e| jni_err("new_string(column)", e))?;
    let index = env
        .call_method(
            cursor,
            "getColumnIndex",
            "(Ljava/lang/String;)I",
            &[JValue::Object(&j_column)],
        )
        .map_err(|e| jni_err("Cursor.getColumnIndex", e))?
        .i()
        .map_err(|e| jni_err("getColumnIndex->i", e))?;
    if index < 0 {
        return Ok(None);
    }

    let value = env
        .call_method(cursor, "getString", "(I)Ljava/lang/String;", &[JValue::Int(index)])
        .map_err(|e| jni_err("Cursor.getString", e))?
        .l()
        .map_err(|e| jni_err("getString->l", e))?;
    if value.is_null() {
        return Ok(None);
    }

    let j_value = JString::from(value);
    let name: String = env
        .get_string(&j_value)
        .map_err(|e| jni_err("get_string(display name)", e))?
        .into();
    Ok(Some(name))
}

// ---------------------------------------------------------------------------
// StatusSurface: org.contentbridge.NotificationHelper
// ---------------------------------------------------------------------------

/// Player notification rendered by the host app's `NotificationHelper`.
///
/// Holds the `ActionBridge` alive for as long as the Java side may call back
/// into it. `release` (or drop) clears the handle on the Java side first.
pub struct AndroidStatusSurface {
    helper: GlobalRef,
    bridge: Arc<ActionBridge>,
    released: AtomicBool,
}

impl AndroidStatusSurface {
    /// Look up the helper and hand it the bridge address.
    ///
    /// Must run on the UI thread, the same thread the helper's broadcast
    /// receiver delivers on.
    pub fn new(bridge: Arc<ActionBridge>) -> Result<Self> {
        with_env(|env, activity| {
            let helper = env
                .call_method(
                    activity,
                    "notification",
                    &format!("()L{NOTIFICATION_HELPER_CLASS};"),
                    &[],
                )
                .map_err(|e| jni_err("notification", e))?
                .l()
                .map_err(|e| jni_err("notification->l", e))?;
            if helper.is_null() {
                return Err(BridgeError::Bridge(
                    "activity returned no NotificationHelper".into(),
                ));
            }
            let helper = env
                .new_global_ref(helper)
                .map_err(|e| jni_err("new_global_ref(helper)", e))?;

            let handle = Arc::as_ptr(&bridge) as jlong;
            env.call_method(&helper, "setNativeHandle", "(J)V", &[JValue::Long(handle)])
                .map_err(|e| jni_err("setNativeHandle", e))?;

            info!("Android: notification helper attached");
            Ok(Self {
                helper,
                bridge,
                released: AtomicBool::new(false),
            })
        })
    }

    pub fn bridge(&self) -> &Arc<ActionBridge> {
        &self.bridge
    }
}

impl StatusSurface for AndroidStatusSurface {
    fn show(&self, notification: &PlayerNotification) -> Result<()> {
        with_env(|env, _activity| {
            let j_icon: JString = env
                .new_string(&notification.icon_path)
                .map_err(|e| jni_err("new_string(icon)", e))?;
            let j_text: JString = env
                .new_string(&notification.body_text)
                .map_err(|e| jni_err("new_string(text)", e))?;
            let j_title: JString = env
                .new_string(&notification.title_text)
                .map_err(|e| jni_err("new_string(title)", e))?;

            env.call_method(
                &self.helper,
                "showPlayerNotification",
                "(ZLjava/lang/String;Ljava/lang/String;Ljava/lang/String;)V",
                &[
                    JValue::Bool(u8::from(notification.playing)),
                    JValue::Object(&j_icon),
                    JValue::Object(&j_text),
                    JValue::Object(&j_title),
                ],
            )
            .map_err(|e| jni_err("showPlayerNotification", e))?;

            info!(playing = notification.playing, "Android: player notification shown");
            Ok(())
        })
    }

    fn hide(&self) -> Result<()> {
        with_env(|env, _activity| {
            env.call_method(&self.helper, "hidePlayerNotification", "()V", &[])
                .map_err(|e| jni_err("hidePlayerNotification", e))?;
            Ok(())
        })
    }

    fn release(&self) -> Result<()> {
        if self.released.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        with_env(|env, _activity| {
            env.call_method(&self.helper, "setNativeHandle", "(J)V", &[JValue::Long(0)])
                .map_err(|e| jni_err("setNativeHandle(0)", e))?;
            Ok(())
        })?;
        info!("Android: notification helper detached");
        self.hide()
    }
}

impl Drop for AndroidStatusSurface {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(error = %e, "Android: releasing notification helper failed");
        }
    }
}

/// Native half of `NotificationHelper.callback(long, String)`.
#[unsafe(no_mangle)]
pub extern "system" fn Java_org_contentbridge_NotificationHelper_callback<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    handle: jlong,
    action: JString<'local>,
) {
    if handle == 0 {
        debug!("Android: action arrived after release, dropped");
        return;
    }
    let name: String = match env.get_string(&action) {
        Ok(name) => name.into(),
        Err(e) => {
            warn!(error = %e, "Android: unreadable action name");
            return;
        }
    };
    // SAFETY: a non-zero handle is the address of the `ActionBridge` kept
    // alive by `AndroidStatusSurface`, which zeroes it before dropping.
    let bridge = unsafe { &*(handle as *const ActionBridge) };
    bridge.dispatch(&name);
}
