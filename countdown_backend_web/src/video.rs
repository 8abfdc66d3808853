// Copyright 2026 the Countdown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `<video>` playback handle.

use std::rc::Rc;

use countdown_core::playback::{PlaybackError, PlaybackHandle};
use wasm_bindgen::{JsCast as _, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlVideoElement;

/// Callback receiving the outcome of a `play()` request.
pub type PlaySettled = Rc<dyn Fn(Result<(), PlaybackError>)>;

/// [`PlaybackHandle`] over an `HtmlVideoElement`.
///
/// `HTMLMediaElement.play()` returns a promise. The outcome is delivered to
/// the `on_settled` callback from a spawned future, never synchronously, so
/// the callback may freely borrow the engine that issued the request.
pub struct VideoPlayback {
    video: HtmlVideoElement,
    on_settled: PlaySettled,
}

impl core::fmt::Debug for VideoPlayback {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VideoPlayback")
            .field("src", &self.video.src())
            .finish_non_exhaustive()
    }
}

impl VideoPlayback {
    /// Wraps `video`; `on_settled` receives every play outcome.
    #[must_use]
    pub fn new(video: HtmlVideoElement, on_settled: PlaySettled) -> Self {
        Self { video, on_settled }
    }

    /// Points the element at `path` and starts buffering.
    pub fn load(&self, path: &str) {
        self.video.set_src(path);
        self.video.load();
    }

    /// `readyState >= HAVE_FUTURE_DATA`.
    #[must_use]
    pub fn can_play(&self) -> bool {
        self.video.ready_state() >= web_sys::HtmlMediaElement::HAVE_FUTURE_DATA
    }
}

impl PlaybackHandle for VideoPlayback {
    fn seek(&mut self, position: f64) {
        self.video.set_current_time(position);
    }

    fn set_volume(&mut self, volume: f64) {
        self.video.set_volume(volume.clamp(0.0, 1.0));
    }

    fn play(&mut self) {
        let on_settled = Rc::clone(&self.on_settled);
        let request = self.video.play();
        wasm_bindgen_futures::spawn_local(async move {
            let outcome = match request {
                Ok(promise) => JsFuture::from(promise).await.map(|_| ()),
                Err(err) => Err(err),
            };
            on_settled(outcome.map_err(|err| playback_error(&err)));
        });
    }

    fn pause(&mut self) {
        if let Err(err) = self.video.pause() {
            tracing::debug!(?err, "pause failed");
        }
    }
}

/// Maps a rejected `play()` promise to a [`PlaybackError`].
///
/// Auto-play policies reject with a `NotAllowedError` `DOMException`.
fn playback_error(err: &JsValue) -> PlaybackError {
    let (name, message) = match err.dyn_ref::<js_sys::Error>() {
        Some(e) => (String::from(e.name()), String::from(e.message())),
        None => (String::new(), format!("{err:?}")),
    };
    classify(&name, message)
}

fn classify(name: &str, message: String) -> PlaybackError {
    match name {
        "NotAllowedError" => PlaybackError::Blocked(message),
        "" => PlaybackError::Failed(message),
        _ => PlaybackError::Failed(format!("{name}: {message}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn autoplay_policy_rejection_is_blocked() {
        assert_eq!(
            classify("NotAllowedError", "play() needs a user gesture".into()),
            PlaybackError::Blocked("play() needs a user gesture".into())
        );
    }

    #[test]
    fn other_rejections_keep_their_name() {
        assert_eq!(
            classify("NotSupportedError", "no source".into()),
            PlaybackError::Failed("NotSupportedError: no source".into())
        );
        assert_eq!(
            classify("", "opaque".into()),
            PlaybackError::Failed("opaque".into())
        );
    }
}
