use super::*;
use common::test_utils::test_output_subdir;
use image::{Rgb, RgbImage};

#[test]
fn test_png_roundtrip_preserves_pixels() {
    let dir = test_output_subdir("codec_png_roundtrip");
    let path = dir.join("gradient.png");
    let buffer = PixelBuffer::from_fn(13, 7, |x, y| (x * 19 + y * 5) as u8);

    save_gray(&path, &buffer, ImageFormat::Png).unwrap();
    let loaded = load_gray(&path).unwrap();

    assert_eq!(loaded.buffer, buffer);
    assert_eq!(loaded.format, ImageFormat::Png);
    assert_eq!(loaded.color, ColorType::L8);
    assert!(!loaded.was_converted());
}

#[test]
fn test_color_image_converted_to_luma() {
    let dir = test_output_subdir("codec_color_to_luma");
    let path = dir.join("color.png");
    let rgb = RgbImage::from_fn(4, 3, |x, _| {
        if x < 2 {
            Rgb([255, 255, 255])
        } else {
            Rgb([0, 0, 0])
        }
    });
    rgb.save_with_format(&path, ImageFormat::Png).unwrap();

    let loaded = load_gray(&path).unwrap();

    assert_eq!(loaded.color, ColorType::Rgb8);
    assert!(loaded.was_converted());
    assert_eq!(loaded.buffer.width(), 4);
    assert_eq!(loaded.buffer.height(), 3);
    assert_eq!(loaded.buffer[(0, 0)], 255);
    assert_eq!(loaded.buffer[(3, 2)], 0);
}

#[test]
fn test_format_detected_from_contents() {
    let dir = test_output_subdir("codec_content_sniffing");
    let path = dir.join("actually_png.img");
    let buffer = PixelBuffer::new_filled(5, 5, 9);
    save_gray(&path, &buffer, ImageFormat::Png).unwrap();

    let loaded = load_gray(&path).unwrap();

    assert_eq!(loaded.format, ImageFormat::Png);
    assert_eq!(loaded.buffer, buffer);
}

#[test]
fn test_missing_file_is_open_error() {
    let dir = test_output_subdir("codec_missing");
    let err = load_gray(&dir.join("nope.png")).unwrap_err();
    assert!(matches!(err, CodecError::Open { .. }), "got {:?}", err);
}

#[test]
fn test_unknown_format_rejected() {
    let dir = test_output_subdir("codec_unknown");
    let path = dir.join("notes.xyz");
    std::fs::write(&path, b"definitely not an image").unwrap();

    let err = load_gray(&path).unwrap_err();
    assert!(matches!(err, CodecError::UnknownFormat { .. }), "got {:?}", err);
}

#[test]
fn test_corrupt_file_is_decode_error() {
    let dir = test_output_subdir("codec_corrupt");
    let path = dir.join("broken.png");
    std::fs::write(&path, b"not really a png").unwrap();

    let err = load_gray(&path).unwrap_err();
    assert!(matches!(err, CodecError::Decode { .. }), "got {:?}", err);
    assert!(err.to_string().contains("broken.png"));
}

#[test]
fn test_output_path_next_to_input() {
    let path = output_path(Path::new("images/cat.png"), None, "new_").unwrap();
    assert_eq!(path, PathBuf::from("images/new_cat.png"));

    let path = output_path(Path::new("cat.tif"), None, "new_").unwrap();
    assert_eq!(path, PathBuf::from("new_cat.tif"));
}

#[test]
fn test_output_path_in_output_dir() {
    let path = output_path(Path::new("images/cat.png"), Some(Path::new("out")), "f_").unwrap();
    assert_eq!(path, PathBuf::from("out/f_cat.png"));

    let path = output_path(Path::new("images/cat.png"), Some(Path::new("out")), "").unwrap();
    assert_eq!(path, PathBuf::from("out/cat.png"));
}

#[test]
fn test_output_path_requires_file_name() {
    let err = output_path(Path::new(".."), None, "new_").unwrap_err();
    assert!(matches!(err, CodecError::InvalidPath { .. }));
}
