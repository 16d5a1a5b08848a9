//! # SVG Rasterization
//!
//! Image-mode printers get their receipt as one picture: the dispatcher
//! renders an SVG preview, hands it to a [`Rasterizer`], and embeds the PNG in
//! a new document. The capability is optional; a dispatcher without one sends
//! plain commands instead.
//!
//! [`SvgRasterizer`] is available with the `raster` feature.

use async_trait::async_trait;

use crate::error::RasterError;

/// SVG to PNG conversion.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn rasterize(&self, svg: &str) -> Result<Vec<u8>, RasterError>;
}

/// resvg-backed rasterizer. Rendering runs on the blocking pool.
#[cfg(feature = "raster")]
#[derive(Debug, Clone, Default)]
pub struct SvgRasterizer;

#[cfg(feature = "raster")]
#[async_trait]
impl Rasterizer for SvgRasterizer {
    async fn rasterize(&self, svg: &str) -> Result<Vec<u8>, RasterError> {
        let svg = svg.to_string();
        tokio::task::spawn_blocking(move || render_png(&svg))
            .await
            .map_err(|e| RasterError::Render(format!("Task join failed: {}", e)))?
    }
}

#[cfg(feature = "raster")]
fn render_png(svg: &str) -> Result<Vec<u8>, RasterError> {
    use resvg::{tiny_skia, usvg};

    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &options).map_err(|e| RasterError::Svg(e.to_string()))?;
    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| RasterError::Render(format!("empty canvas {:?}", size)))?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
    pixmap
        .encode_png()
        .map_err(|e| RasterError::Render(e.to_string()))
}

#[cfg(all(test, feature = "raster"))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rasterize_produces_png() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24"><rect width="12" height="24" fill="black"/></svg>"#;
        let png = SvgRasterizer.rasterize(svg).await.unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[tokio::test]
    async fn test_invalid_svg() {
        assert!(SvgRasterizer.rasterize("not svg").await.is_err());
    }
}
