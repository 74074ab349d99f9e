//! # Folio
//!
//! A static builder for a single-page personal home page: a name card over a
//! full-bleed photo, a sidebar with headshot, education and contact details,
//! and a column of prose sections and publications.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! Folio processes content through three independent stages, each producing
//! a JSON manifest that the next stage consumes:
//!
//! ```text
//! 1. Scan      content/  →  manifest.json    (files → structured data)
//! 2. Process   manifest  →  processed/       (image variants + descriptors)
//! 3. Generate  manifest  →  dist/            (index.html + images/)
//! ```
//!
//! Each manifest is human-readable JSON you can inspect, and each stage can
//! be tested without running the others.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1 — reads config, records, sections, and checks asset sources |
//! | [`process`] | Stage 2 — encodes every asset at its widths and formats, writes descriptors |
//! | [`generate`] | Stage 3 — renders the page from the processed manifest using Maud |
//! | [`descriptor`] | `ImageDescriptor`: format list and width → URL resolution |
//! | [`background`] | Responsive `image-set()` backgrounds with injected size observation |
//! | [`components`] | Education and publication lists, prose sections, `<picture>` |
//! | [`disclosure`] | Click-to-reveal contact email |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`types`] | Content records shared between stages |
//! | [`naming`] | `NNN-name` filename convention for sections |
//! | [`imaging`] | Pure-Rust resize and encode |
//! | [`cache`] | Content-addressed variant cache |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Descriptors, Not Paths
//!
//! Page components never build image URLs. They receive an
//! [`ImageDescriptor`](descriptor::ImageDescriptor) and ask it for the URL
//! that serves a width in a format. Changing widths or formats in
//! `config.toml` changes the page without touching any rendering code.
//!
//! ## Backgrounds Follow Their Element
//!
//! A background is sized for the element it paints, not the window. Build
//! time assumes `render.viewport_width`; the inlined page script re-measures
//! each element with `ResizeObserver` and applies the same resolution rules.
//! The content tile is the exception: it is repeated at a fixed width.
//!
//! ## Pure-Rust Imaging
//!
//! The [`imaging`] module uses the `image` crate (Lanczos3 resampling) and
//! `rav1e` (AVIF encoding). No system libraries, no ImageMagick: the binary
//! is self-contained.

pub mod background;
pub mod cache;
pub mod components;
pub mod config;
pub mod descriptor;
pub mod disclosure;
pub mod generate;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
