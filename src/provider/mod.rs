//! Image providers: translate backend-independent modifiers into delivery URLs.
//!
//! | Provider | URL shape |
//! |---|---|
//! | [`cloudinary`] | `<base>/w_300,q_80,f_jpg/<src>` |
//! | [`fastly`] | `<base>/<src>?width=300&quality=80` |
//! | [`liip`] | `<base>/<filter>/rc/<hash>/<src>?filters[...]=...` |
//! | [`placeholder`] | `https://placehold.co/<w>x<h>/<bg>/<fg>?text=...` |
//!
//! Every provider implements [`ModifierMapper`]. Providers share nothing but
//! the trait: each owns its key and value tables. The [`registry`] holds the
//! configured set and picks one by name or default.
//!
//! Viewport-relative `width`/`height` values (`"50vw"`) are never forwarded to
//! a backend; the width engine turns them into pixels before a URL is built.

pub mod cloudinary;
pub mod fastly;
pub mod liip;
pub mod placeholder;
pub mod registry;

pub use cloudinary::{CloudinaryConfig, CloudinaryProvider};
pub use fastly::{FastlyConfig, FastlyProvider};
pub use liip::{LiipConfig, LiipImagineProvider};
pub use placeholder::{PlaceholderConfig, PlaceholderProvider};
pub use registry::{ProviderError, ProviderRegistry};

use tracing::{trace, warn};

use crate::modifiers::{ModifierSet, ModifierValue};

/// A backend-specific URL builder.
///
/// Implementations are immutable after construction, so a single instance can
/// be shared across rayon workers.
pub trait ModifierMapper: Send + Sync {
    /// Registry key, e.g. `"cloudinary"`.
    fn name(&self) -> &str;

    /// Build the delivery URL for `src` with the given modifiers.
    fn build_url(&self, src: &str, modifiers: &ModifierSet) -> String;
}

/// Remove one leading `/` so sources join cleanly onto base URLs.
pub(crate) fn strip_leading_slash(src: &str) -> &str {
    src.strip_prefix('/').unwrap_or(src)
}

/// Whether a modifier must be dropped before mapping: `width`/`height`
/// values in `vw` only make sense to the width engine.
pub(crate) fn is_unmappable(provider: &str, key: &str, value: &ModifierValue) -> bool {
    let dimension = key == "width" || key == "height";
    if dimension && value.is_viewport_relative() {
        warn!(provider, key, value = %value, "dropping viewport-relative dimension");
        return true;
    }
    false
}

/// Trace an ignored modifier key.
pub(crate) fn skip_unknown(provider: &str, key: &str) {
    trace!(provider, key, "modifier not supported, skipped");
}
