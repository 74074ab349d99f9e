//! Responsive background elements.
//!
//! A [`ResponsiveBackground`] renders a container element whose CSS
//! `background-image` is a multi-format, resolution-aware `image-set()`,
//! kept in sync with the element's own rendered width.
//!
//! ## Width tracking
//!
//! Each instance owns exactly one width cell. With a fixed width the cell is
//! set once and never touched again. Otherwise [`ResponsiveBackground::mount`]
//! measures the element through an injected [`SizeObserver`] and registers a
//! resize callback; every callback writes the new width and recomputes the
//! CSS value. The returned [`Observation`] releases the registration on drop.
//!
//! Callbacks only hold a [`Weak`] handle to the instance state, so a callback
//! delivered after the component is gone is a no-op.
//!
//! ## The image-set value
//!
//! For each format in the descriptor's `image_types`, two candidates are
//! emitted, 2x density first:
//!
//! ```text
//! image-set(
//!   url("images/bg-2048.avif") 2x type("image/avif"),
//!   url("images/bg-1024.avif") 1x type("image/avif"),
//!   url("images/bg-2048.jpg") 2x type("image/jpeg"),
//!   url("images/bg-1024.jpg") 1x type("image/jpeg")
//! )
//! ```
//!
//! The browser picks the candidate; this module performs no selection of its own.

use crate::descriptor::{DescriptorError, ImageDescriptor, ImageType};
use maud::{Markup, PreEscaped, html};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum BackgroundError {
    #[error("Descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Element kinds a responsive background can render as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Div,
    Main,
    Header,
    Section,
}

impl Tag {
    pub fn name(self) -> &'static str {
        match self {
            Tag::Div => "div",
            Tag::Main => "main",
            Tag::Header => "header",
            Tag::Section => "section",
        }
    }
}

/// Handle for one registered size observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub u64);

/// Called with the element's new rendered width, in CSS pixels.
pub type ResizeCallback = Box<dyn FnMut(u32)>;

/// "Observe my own rendered box" capability supplied by the host runtime.
///
/// Callbacks for one registration are delivered sequentially; there is no
/// ordering between registrations.
pub trait SizeObserver {
    /// Current rendered width of `element`.
    fn measure(&self, element: &str) -> u32;

    /// Start delivering width changes of `element` to `on_resize`.
    fn observe(&self, element: &str, on_resize: ResizeCallback) -> ObserverId;

    /// Stop a registration made by [`observe`](SizeObserver::observe).
    fn unobserve(&self, id: ObserverId);
}

/// Scope guard for a size observation. Dropping it unregisters the callback.
pub struct Observation<'o> {
    observer: &'o dyn SizeObserver,
    id: ObserverId,
}

impl Observation<'_> {
    pub fn id(&self) -> ObserverId {
        self.id
    }
}

impl Drop for Observation<'_> {
    fn drop(&mut self) {
        self.observer.unobserve(self.id);
    }
}

/// Size observer for build-time rendering.
///
/// Every element measures as the configured viewport width and never
/// resizes. In-browser resizes are handled by the page script.
pub struct StaticViewport {
    width: u32,
    next_id: Cell<u64>,
}

impl StaticViewport {
    pub fn new(width: u32) -> Self {
        Self {
            width,
            next_id: Cell::new(0),
        }
    }
}

impl SizeObserver for StaticViewport {
    fn measure(&self, _element: &str) -> u32 {
        self.width
    }

    fn observe(&self, _element: &str, _on_resize: ResizeCallback) -> ObserverId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        ObserverId(id)
    }

    fn unobserve(&self, _id: ObserverId) {}
}

/// Compute the `image-set(...)` value for `width` CSS pixels.
///
/// Produces exactly two candidates per entry of `image_types`, in that order,
/// 2x before 1x. An empty `image_types` yields `image-set()`.
pub fn image_set(src: &ImageDescriptor, width: u32) -> Result<String, DescriptorError> {
    let mut candidates = Vec::with_capacity(src.image_types.len() * 2);
    for &format in &src.image_types {
        let hi = src.image_url_for(Some(width.saturating_mul(2)), Some(format))?;
        let lo = src.image_url_for(Some(width), Some(format))?;
        candidates.push(candidate(hi, 2, format));
        candidates.push(candidate(lo, 1, format));
    }
    Ok(format!("image-set({})", candidates.join(", ")))
}

fn candidate(url: &str, density: u32, format: ImageType) -> String {
    format!(r#"url("{url}") {density}x type("{}")"#, format.mime())
}

/// The `background-image` value for `width`.
///
/// A descriptor without formats falls back to its no-argument URL, or
/// `none` when even that cannot be resolved.
pub fn background_image(src: &ImageDescriptor, width: u32) -> Result<String, DescriptorError> {
    if src.image_types.is_empty() {
        return Ok(match src.image_url_for(None, None) {
            Ok(url) => format!(r#"url("{url}")"#),
            Err(_) => "none".to_string(),
        });
    }
    image_set(src, width)
}

/// Width cell and derived CSS value of one instance.
struct BackgroundState {
    src: ImageDescriptor,
    width: Cell<u32>,
    css: RefCell<String>,
}

impl BackgroundState {
    fn new(src: ImageDescriptor, width: u32) -> Result<Self, DescriptorError> {
        let css = background_image(&src, width)?;
        Ok(Self {
            src,
            width: Cell::new(width),
            css: RefCell::new(css),
        })
    }

    fn set_width(&self, width: u32) {
        if width == self.width.get() {
            return;
        }
        match background_image(&self.src, width) {
            Ok(css) => {
                self.width.set(width);
                *self.css.borrow_mut() = css;
            }
            Err(e) => warn!(width, error = %e, "keeping previous background"),
        }
    }
}

/// A container element with a responsive `image-set()` background.
///
/// ```rust,ignore
/// let bg = ResponsiveBackground::observed(descriptor, Tag::Div, 1920)?
///     .class("App");
/// let _observation = bg.mount(&observer);
/// let markup = bg.render(html! { h1 { "Hello" } })?;
/// ```
pub struct ResponsiveBackground {
    tag: Tag,
    fixed_width: Option<u32>,
    state: Rc<BackgroundState>,
    attrs: Vec<(String, String)>,
}

impl ResponsiveBackground {
    /// Background that tracks its element's width once mounted.
    ///
    /// `body_width` is used until the first measurement.
    pub fn observed(
        src: ImageDescriptor,
        tag: Tag,
        body_width: u32,
    ) -> Result<Self, DescriptorError> {
        Ok(Self {
            tag,
            fixed_width: None,
            state: Rc::new(BackgroundState::new(src, body_width)?),
            attrs: Vec::new(),
        })
    }

    /// Background computed once for `width` and never re-measured.
    pub fn fixed(src: ImageDescriptor, tag: Tag, width: u32) -> Result<Self, DescriptorError> {
        Ok(Self {
            tag,
            fixed_width: Some(width),
            state: Rc::new(BackgroundState::new(src, width)?),
            attrs: Vec::new(),
        })
    }

    pub fn class(self, class: impl Into<String>) -> Self {
        self.attr("class", class)
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    /// Forward an attribute to the rendered element unchanged.
    ///
    /// A `style` attribute is kept and the background declaration appended to it.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Width the current CSS value was computed for.
    pub fn width(&self) -> u32 {
        self.state.width.get()
    }

    /// Whether the width was set at construction and is never re-measured.
    pub fn is_fixed(&self) -> bool {
        self.fixed_width.is_some()
    }

    /// Current `background-image` value.
    pub fn background_image(&self) -> String {
        self.state.css.borrow().clone()
    }

    /// Key the element is known by to the size observer: its `id`, else its
    /// `class`, else the tag name.
    pub fn element_key(&self) -> &str {
        self.attr_value("id")
            .or_else(|| self.attr_value("class"))
            .unwrap_or(self.tag.name())
    }

    fn attr_value(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Measure the element and start tracking its width.
    ///
    /// Fixed-width instances perform no measurement and return `None`.
    pub fn mount<'o>(&self, observer: &'o dyn SizeObserver) -> Option<Observation<'o>> {
        if self.is_fixed() {
            return None;
        }
        let key = self.element_key().to_string();
        self.state.set_width(observer.measure(&key));

        let state: Weak<BackgroundState> = Rc::downgrade(&self.state);
        let id = observer.observe(
            &key,
            Box::new(move |width| {
                if let Some(state) = state.upgrade() {
                    state.set_width(width);
                }
            }),
        );
        Some(Observation { observer, id })
    }

    /// Render the element with `children` inside.
    ///
    /// The descriptor's variant table is attached as
    /// `data-responsive-background` for the page script.
    pub fn render(&self, children: Markup) -> Result<Markup, BackgroundError> {
        let table = serde_json::to_string(&self.state.src)?;
        let background = format!("background-image: {}", self.background_image());

        let mut open = format!("<{}", self.tag.name());
        let mut style = None;
        for (name, value) in &self.attrs {
            if name == "style" {
                style = Some(value.trim_end().trim_end_matches(';'));
            } else {
                push_attr(&mut open, name, value);
            }
        }
        let style = match style {
            Some(s) if !s.is_empty() => format!("{s}; {background}"),
            _ => background,
        };
        push_attr(&mut open, "style", &style);
        push_attr(&mut open, "data-responsive-background", &table);
        if let Some(width) = self.fixed_width {
            push_attr(&mut open, "data-fixed-width", &width.to_string());
        }
        open.push('>');

        Ok(html! {
            (PreEscaped(open))
            (children)
            (PreEscaped(format!("</{}>", self.tag.name())))
        })
    }
}

fn push_attr(buf: &mut String, name: &str, value: &str) {
    let escaped = html! { (value) }.into_string();
    buf.push_str(&format!(r#" {name}="{escaped}""#));
}
