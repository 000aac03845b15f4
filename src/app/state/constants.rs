use iced::widget::scrollable::Id as ScrollId;
use once_cell::sync::Lazy;

/// Limits for reader controls.
pub(crate) const MIN_FONT_SIZE: u32 = 10;
pub(crate) const MAX_FONT_SIZE: u32 = 48;
pub(crate) const MIN_SPEECH_RATE_WPM: u32 = 60;
pub(crate) const MAX_SPEECH_RATE_WPM: u32 = 400;
pub(crate) const MIN_SPEECH_VOLUME: f32 = 0.0;
pub(crate) const MAX_SPEECH_VOLUME: f32 = 2.0;

/// Shown in the modal while the definition request is in flight.
pub(crate) const DEFINITION_LOADING_TEXT: &str = "Loading definition...";
/// Fixed fallback when the definition request fails.
pub(crate) const DEFINITION_ERROR_TEXT: &str = "Could not load definition. Please try again.";

/// File types the backend accepts; enforced client-side before any request.
pub(crate) const ALLOWED_EXTENSIONS: &[&str] =
    &["jpg", "jpeg", "png", "heic", "heif", "webp", "pdf"];

pub(crate) static TEXT_SCROLL_ID: Lazy<ScrollId> = Lazy::new(|| ScrollId::new("document-scroll"));
