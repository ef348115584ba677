//! # respimg
//!
//! Responsive image attributes from a compact width spec. Given `"50vw
//! lg:400px"` and a breakpoint ladder, respimg works out how wide the image is
//! displayed at every breakpoint, builds the matching `srcset` and `sizes`,
//! and asks an image CDN provider for one URL per candidate width.
//!
//! # Pipeline
//!
//! ```text
//! 1. Parse      "50vw lg:400px"  →  partial width map   (default, lg)
//! 2. Resolve    partial map      →  complete map        (default, sm..2xl)
//! 3. Attributes complete map     →  sizes, srcset widths, eager width
//! 4. URLs       width + request  →  provider URL per candidate
//! ```
//!
//! Steps 1–3 are pure functions in [`width`] and know nothing about URLs;
//! step 4 is a [`provider::ModifierMapper`] chosen from the
//! [`provider::ProviderRegistry`]. [`render::Renderer`] drives all four.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`width`] | Breakpoint ladder, width spec parsing, propagation, `sizes`/`srcset` generation |
//! | [`modifiers`] | Backend-independent modifier values and ordered modifier sets |
//! | [`provider`] | `ModifierMapper` trait, Cloudinary / Fastly / LiipImagine / placeholder mappers, registry |
//! | [`render`] | Request layering (preset, defaults), fallback handling, parallel batches |
//! | [`config`] | `respimg.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Viewport Math Happens Once
//!
//! `vw` widths are converted to pixels by the width engine against each
//! breakpoint's threshold. Providers only ever see pixel widths; a `vw` width
//! that reaches a mapper is dropped with a warning.
//!
//! ## Propagation Modes
//!
//! A breakpoint without an explicit width is filled according to the mode set
//! by `default`: a fixed width copies the nearest smaller explicit one, a
//! viewport width re-applies `default`'s percentage to the breakpoint's own
//! threshold. A spec may switch between fixed and
//! viewport widths once (`50vw lg:400px`, `1000 lg:100vw`); a second switch
//! is rejected.
//!
//! ## Order Is Data
//!
//! Breakpoint ladders, modifier sets and provider lists are `IndexMap`s.
//! Ladder order defines propagation; modifier order defines the
//! transformation order of providers without their own ordering rules.
//!
//! ## Explicit Registry
//!
//! The provider registry is a plain value built from configuration at
//! startup and passed by reference. Mappers are `Send + Sync` and immutable,
//! so batch rendering shares one registry across rayon workers without
//! locking.

pub mod config;
pub mod modifiers;
pub mod output;
pub mod provider;
pub mod render;
pub mod width;

#[cfg(test)]
pub(crate) mod test_helpers;
