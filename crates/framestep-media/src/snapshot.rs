// crates/framestep-media/src/snapshot.rs
//
// Write the currently displayed frame to disk as PNG. The pixels are the
// exact RGBA buffer that was delivered — no rescale, no recompress-decode.

use std::io::BufWriter;
use std::path::Path;

use framestep_core::DecodedFrame;

pub fn save_png(frame: &DecodedFrame, dest: &Path) -> Result<(), png::EncodingError> {
    let file = std::fs::File::create(dest)?;
    let w    = &mut BufWriter::new(file);
    let mut encoder = png::Encoder::new(w, frame.width, frame.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&frame.data)?;
    eprintln!(
        "[media] PNG saved → {} (frame {}, {}x{})",
        dest.display(),
        frame.frame,
        frame.width,
        frame.height
    );
    Ok(())
}
