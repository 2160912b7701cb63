//! Media-host image pipeline.
//!
//! Uploads are forwarded to the media host; the catalog only ever stores URL
//! strings. Rendition URLs are derived deterministically from the host's
//! public id, so no per-size state is persisted.

use serde::Serialize;

/// Content types accepted for product images.
pub const ALLOWED_IMAGE_TYPES: &[&str] =
    &["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Upload size ceiling (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Pre-rendered size variants for one uploaded image.
#[derive(Clone, Debug, Serialize)]
pub struct Renditions {
    /// Capped original, used by the product gallery.
    pub original: String,
    /// Square crop for grid cells.
    pub thumbnail: String,
    /// Product cards.
    pub medium: String,
    /// Fullscreen viewer.
    pub large: String,
    /// Low-quality blurred placeholder shown while the real image loads.
    pub placeholder: String,
}

/// Builds the rendition URL set for a media-host public id.
pub fn renditions(cloud_name: &str, public_id: &str) -> Renditions {
    let base = format!("https://res.cloudinary.com/{cloud_name}/image/upload");
    Renditions {
        original: format!("{base}/f_auto,q_auto:best,dpr_auto,w_1200,c_limit/{public_id}"),
        thumbnail: format!("{base}/f_auto,q_auto:good,dpr_auto,w_400,h_400,c_fill,g_auto/{public_id}"),
        medium: format!("{base}/f_auto,q_auto:best,dpr_auto,w_800,c_limit/{public_id}"),
        large: format!("{base}/f_auto,q_auto:best,dpr_auto,w_1600,c_limit/{public_id}"),
        placeholder: format!("{base}/f_auto,q_auto:low,w_50,e_blur:1000/{public_id}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renditions_embed_cloud_and_public_id() {
        let urls = renditions("aurea", "tienda/collar-luna");
        assert_eq!(
            urls.original,
            "https://res.cloudinary.com/aurea/image/upload/f_auto,q_auto:best,dpr_auto,w_1200,c_limit/tienda/collar-luna"
        );
        assert!(urls.thumbnail.contains("w_400,h_400,c_fill"));
        assert!(urls.large.contains("w_1600"));
        assert!(urls.placeholder.contains("e_blur:1000"));
    }
}
