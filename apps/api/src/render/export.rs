//! PNG encoding, resized copies, data URLs and saving to disk.

use std::io::Cursor;
use std::path::Path;

use anyhow::Context;
use base64::Engine as _;
use bytes::Bytes;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use tiny_skia::Pixmap;

use crate::errors::AppError;

/// Display size of the desktop preview.
pub const DEFAULT_THUMBNAIL_SIZE: (u32, u32) = (600, 400);

/// Resampling filter for resized copies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    /// Box average over the source pixels behind each target pixel.
    Area,
    #[default]
    Lanczos,
}

impl std::str::FromStr for ResizeFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" => Ok(ResizeFilter::Nearest),
            "area" => Ok(ResizeFilter::Area),
            "lanczos" | "" => Ok(ResizeFilter::Lanczos),
            other => Err(AppError::Validation(format!(
                "unknown resize filter '{other}' (expected nearest, area or lanczos)"
            ))),
        }
    }
}

/// Encodes a premultiplied pixmap as straight-alpha PNG.
pub fn encode_png(pixmap: &Pixmap) -> Result<Bytes, AppError> {
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    let img = RgbaImage::from_raw(pixmap.width(), pixmap.height(), rgba)
        .ok_or_else(|| AppError::Render("pixel buffer does not match canvas size".into()))?;
    write_png(DynamicImage::ImageRgba8(img))
}

fn write_png(img: DynamicImage) -> Result<Bytes, AppError> {
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| AppError::Render(format!("PNG encoding failed: {e}")))?;
    Ok(Bytes::from(buffer))
}

/// Returns a resized copy of `png`; the input is left untouched.
pub fn thumbnail(png: &[u8], width: u32, height: u32, filter: ResizeFilter) -> Result<Bytes, AppError> {
    if width == 0 || height == 0 {
        return Err(AppError::Validation(format!(
            "thumbnail size must be positive, got {width}x{height}"
        )));
    }
    let source = image::load_from_memory_with_format(png, ImageFormat::Png)
        .map_err(|e| AppError::Render(format!("stored image is not a valid PNG: {e}")))?;

    let resized = match filter {
        ResizeFilter::Nearest => source.resize_exact(width, height, FilterType::Nearest),
        ResizeFilter::Lanczos => source.resize_exact(width, height, FilterType::Lanczos3),
        ResizeFilter::Area => {
            let rgba = source.to_rgba8();
            DynamicImage::ImageRgba8(image::imageops::thumbnail(&rgba, width, height))
        }
    };
    write_png(resized)
}

/// `data:image/png;base64,…` for inline display.
pub fn data_url(png: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}

pub fn save_png(png: &[u8], path: &Path) -> anyhow::Result<()> {
    std::fs::write(path, png).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia::Color;

    fn sample_png(width: u32, height: u32) -> Bytes {
        let mut pixmap = Pixmap::new(width, height).unwrap();
        pixmap.fill(Color::from_rgba8(200, 40, 40, 255));
        encode_png(&pixmap).unwrap()
    }

    #[test]
    fn test_png_decodes_to_canvas_size_and_color() {
        let png = sample_png(30, 20);
        let img = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (30, 20));
        assert_eq!(img.get_pixel(5, 5).0, [200, 40, 40, 255]);
    }

    #[test]
    fn test_encode_unpremultiplies_alpha() {
        let mut pixmap = Pixmap::new(2, 2).unwrap();
        pixmap.fill(Color::from_rgba8(255, 0, 0, 128));
        let png = encode_png(&pixmap).unwrap();
        let px = image::load_from_memory(&png).unwrap().to_rgba8().get_pixel(0, 0).0;
        assert_eq!(px[3], 128);
        assert!(px[0] >= 253, "red should be restored, got {}", px[0]);
    }

    #[test]
    fn test_thumbnail_has_requested_size_for_each_filter() {
        let png = sample_png(60, 40);
        for filter in [ResizeFilter::Nearest, ResizeFilter::Area, ResizeFilter::Lanczos] {
            let small = thumbnail(&png, 15, 10, filter).unwrap();
            let img = image::load_from_memory(&small).unwrap();
            assert_eq!((img.width(), img.height()), (15, 10), "{filter:?}");
        }
    }

    #[test]
    fn test_thumbnail_leaves_original_untouched() {
        let png = sample_png(60, 40);
        let before = png.clone();
        let _ = thumbnail(&png, 30, 20, ResizeFilter::Area).unwrap();
        assert_eq!(png, before);
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!((img.width(), img.height()), (60, 40));
    }

    #[test]
    fn test_thumbnail_rejects_zero_size_and_garbage() {
        let png = sample_png(4, 4);
        assert!(matches!(thumbnail(&png, 0, 4, ResizeFilter::Nearest), Err(AppError::Validation(_))));
        assert!(matches!(thumbnail(b"nope", 4, 4, ResizeFilter::Nearest), Err(AppError::Render(_))));
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("Area".parse::<ResizeFilter>().unwrap(), ResizeFilter::Area);
        assert_eq!("".parse::<ResizeFilter>().unwrap(), ResizeFilter::Lanczos);
        assert!("bicubic".parse::<ResizeFilter>().is_err());
    }

    #[test]
    fn test_data_url_prefix() {
        let url = data_url(&[0x89, b'P', b'N', b'G']);
        assert_eq!(url, "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn test_save_png_writes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cloud.png");
        let png = sample_png(8, 8);
        save_png(&png, &path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), png.to_vec());
    }

    #[test]
    fn test_save_png_reports_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("cloud.png");
        let err = save_png(&sample_png(2, 2), &path).unwrap_err();
        assert!(format!("{err:#}").contains("failed to write"));
    }
}
