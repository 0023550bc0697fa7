use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use floorplan_core::PlanError;
use png::{BitDepth, ColorType, Compression, Encoder, FilterType};
use tiny_skia::Pixmap;

/// Publishes the pixmap as a PNG at `path`. Encoding goes to a temp file in
/// the target directory which is then renamed into place, so a failed run
/// never leaves a partial image. An existing file at `path` is silently
/// overwritten.
pub fn write_png_atomic(pixmap: &Pixmap, path: &Path) -> Result<(), PlanError> {
    let tmp = tmp_path(path);
    if let Err(e) = encode_png(pixmap, &tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(PlanError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        });
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(PlanError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        });
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "floorplan.png".into());
    name.push(".tmp");
    path.with_file_name(name)
}

// Fixed filter and compression settings keep the byte stream deterministic
// for identical pixel data.
fn encode_png(pixmap: &Pixmap, path: &Path) -> io::Result<()> {
    let file = fs::File::create(path)?;
    let mut enc = Encoder::new(file, pixmap.width(), pixmap.height());
    enc.set_color(ColorType::Rgba);
    enc.set_depth(BitDepth::Eight);
    enc.set_filter(FilterType::NoFilter);
    enc.set_compression(Compression::Default);
    let mut writer = enc.write_header().map_err(png_to_io)?;
    writer.write_image_data(pixmap.data()).map_err(png_to_io)?;
    writer.finish().map_err(png_to_io)?;
    Ok(())
}

fn png_to_io(e: png::EncodingError) -> io::Error {
    match e {
        png::EncodingError::IoError(e) => e,
        other => io::Error::other(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("floorplan-export-{tag}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn tiny_pixmap() -> Pixmap {
        let mut pixmap = Pixmap::new(4, 4).unwrap();
        pixmap.fill(tiny_skia::Color::WHITE);
        pixmap
    }

    #[test]
    fn writes_and_silently_overwrites() {
        let dir = scratch_dir("ok");
        let out = dir.join("plot.png");
        write_png_atomic(&tiny_pixmap(), &out).unwrap();
        let first = fs::read(&out).unwrap();
        write_png_atomic(&tiny_pixmap(), &out).unwrap();
        let second = fs::read(&out).unwrap();
        assert_eq!(first, second);
        assert!(!tmp_path(&out).exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_parent_dir_fails_without_output() {
        let dir = scratch_dir("missing");
        let out = dir.join("nope").join("plot.png");
        let err = write_png_atomic(&tiny_pixmap(), &out).unwrap_err();
        assert!(matches!(err, PlanError::WriteFailed { .. }));
        assert!(!out.exists());
        assert!(!tmp_path(&out).exists());
        let _ = fs::remove_dir_all(&dir);
    }
}
