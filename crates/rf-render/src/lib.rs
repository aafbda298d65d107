//! SVG rendering of block orientation fields.
//!
//! Each block becomes one line segment on a grid of `spacing` pixel cells,
//! drawn along the block's ridge angle with a gray level proportional to its
//! coherence. Blocks below `min_coherence` are left out.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use rf_core::{Point2f, Segment2f};
use rf_orient::Fingerprint;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Side of one block cell in the output, in SVG user units.
    pub spacing: usize,
    pub min_coherence: f32,
    pub stroke_width: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            spacing: 20,
            min_coherence: 0.2,
            stroke_width: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeSegment {
    pub segment: Segment2f,
    /// Stroke gray level, `round(coherence * 255)`.
    pub gray: u8,
}

pub fn segments(fp: &Fingerprint, cfg: &RenderConfig) -> Vec<StrokeSegment> {
    let half = (cfg.spacing / 2) as f32;
    fp.iter()
        .filter(|(_, _, r)| r.coherence >= cfg.min_coherence)
        .map(|(bx, by, r)| {
            let center = Point2f {
                x: (bx * cfg.spacing) as f32 + half,
                y: (by * cfg.spacing) as f32 + half,
            };
            StrokeSegment {
                segment: Segment2f::centered(center, r.angle, half),
                gray: (r.coherence.clamp(0.0, 1.0) * 255.0).round() as u8,
            }
        })
        .collect()
}

pub fn write_svg<W: Write>(mut w: W, fp: &Fingerprint, cfg: &RenderConfig) -> io::Result<()> {
    let (sw, sh) = (fp.width * cfg.spacing, fp.height * cfg.spacing);
    writeln!(w, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
    writeln!(
        w,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {sw} {sh}\" width=\"{sw}\" height=\"{sh}\">"
    )?;
    writeln!(w, "<rect width=\"{sw}\" height=\"{sh}\" fill=\"#000000\"/>")?;

    let strokes = segments(fp, cfg);
    for s in &strokes {
        let g = s.gray;
        writeln!(
            w,
            "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"#{g:02x}{g:02x}{g:02x}\" stroke-width=\"{}\" stroke-linecap=\"round\"/>",
            s.segment.a.x, s.segment.a.y, s.segment.b.x, s.segment.b.y, cfg.stroke_width
        )?;
    }
    writeln!(w, "</svg>")?;

    log::debug!(
        "rendered {} of {} blocks into a {sw}x{sh} svg",
        strokes.len(),
        fp.width * fp.height
    );
    w.flush()
}

pub fn save_svg(path: impl AsRef<Path>, fp: &Fingerprint, cfg: &RenderConfig) -> io::Result<()> {
    let file = File::create(path.as_ref())?;
    write_svg(BufWriter::new(file), fp, cfg)
}
