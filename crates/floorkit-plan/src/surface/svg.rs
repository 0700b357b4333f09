use base64::Engine;
use floorkit_core::model::TextStyle;
use floorkit_core::units::format_decimal;
use floorkit_core::{Color, Rect};
use image::RgbaImage;
use lyon::path::{Event, Path};
use std::fmt::Write as _;
use std::io::{self, Cursor, Write};
use tiny_skia::Transform;

use super::pattern::{tile_line_width, tile_marks, TileMark};
use super::{LineCap, LineJoin, Paint, PlanSurface, StrokeStyle};

#[derive(Clone, Copy)]
struct State {
    transform: Transform,
    alpha: f32,
    open_groups: usize,
}

/// Surface streaming an SVG document.
///
/// Output only depends on what is drawn: numbers are written with `.`
/// decimals and at most 3 fractional digits, and definitions are numbered in
/// drawing order. The first write error stops all output and is returned by
/// [`finish`](Self::finish).
pub struct SvgSurface<W: Write> {
    out: W,
    error: Option<io::Error>,
    state: State,
    stack: Vec<State>,
    next_id: usize,
}

impl<W: Write> SvgSurface<W> {
    /// Starts a `width` x `height` document.
    pub fn new(out: W, width: f32, height: f32) -> Self {
        let mut surface = Self {
            out,
            error: None,
            state: State {
                transform: Transform::identity(),
                alpha: 1.0,
                open_groups: 0,
            },
            stack: Vec::new(),
            next_id: 0,
        };
        let (w, h) = (num(width), num(height));
        surface.write(&format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n"
        ));
        surface
    }

    /// Replaces the current transform.
    pub fn set_transform(&mut self, transform: Transform) {
        self.state.transform = transform;
    }

    /// Closes the document and returns the writer.
    pub fn finish(mut self) -> io::Result<W> {
        let groups = self.state.open_groups;
        for _ in 0..groups {
            self.write("</g>\n");
        }
        self.write("</svg>\n");
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn write(&mut self, text: &str) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.out.write_all(text.as_bytes()) {
            self.error = Some(err);
        }
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{}", prefix, self.next_id)
    }

    fn transform_attr(&self) -> String {
        let t = self.state.transform;
        if t.is_identity() {
            return String::new();
        }
        format!(
            " transform=\"matrix({} {} {} {} {} {})\"",
            num(t.sx),
            num(t.ky),
            num(t.kx),
            num(t.sy),
            num(t.tx),
            num(t.ty)
        )
    }

    fn opacity_attr(&self, color: Color) -> String {
        let opacity = color.a as f32 / 255.0 * self.state.alpha;
        if opacity >= 1.0 {
            String::new()
        } else {
            format!(" opacity=\"{}\"", num(opacity))
        }
    }

    fn define_pattern(&mut self, paint: &Paint) -> Option<String> {
        let id;
        let mut defs = String::new();
        match paint {
            Paint::Solid(_) => return None,
            Paint::Pattern {
                pattern,
                foreground,
                background,
                tile,
            } => {
                id = self.next_id("pattern");
                let t = *tile;
                let _ = write!(
                    defs,
                    "<defs><pattern id=\"{id}\" patternUnits=\"userSpaceOnUse\" width=\"{s}\" height=\"{s}\">\
                     <rect width=\"{s}\" height=\"{s}\" fill=\"{bg}\"/>",
                    s = num(t),
                    bg = background.to_hex()
                );
                let fg = foreground.to_hex();
                if matches!(pattern, floorkit_core::model::WallPattern::Solid) {
                    let _ = write!(defs, "<rect width=\"{s}\" height=\"{s}\" fill=\"{fg}\"/>", s = num(t));
                }
                for mark in tile_marks(*pattern) {
                    match mark {
                        TileMark::Line { x1, y1, x2, y2 } => {
                            let _ = write!(
                                defs,
                                "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{fg}\" stroke-width=\"{}\"/>",
                                num(x1 * t),
                                num(y1 * t),
                                num(x2 * t),
                                num(y2 * t),
                                num(tile_line_width() * t)
                            );
                        }
                        TileMark::Dot { x, y, r } => {
                            let _ = write!(
                                defs,
                                "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"{fg}\"/>",
                                num(x * t),
                                num(y * t),
                                num(r * t)
                            );
                        }
                    }
                }
            }
            Paint::Texture {
                image,
                width,
                height,
            } => {
                id = self.next_id("texture");
                let (w, h) = (num(*width), num(*height));
                let _ = write!(
                    defs,
                    "<defs><pattern id=\"{id}\" patternUnits=\"userSpaceOnUse\" width=\"{w}\" height=\"{h}\">\
                     <image width=\"{w}\" height=\"{h}\" preserveAspectRatio=\"none\" href=\"{}\"/>",
                    png_data_url(image)
                );
            }
        }
        defs.push_str("</pattern></defs>\n");
        self.write(&defs);
        Some(id)
    }
}

impl<W: Write> PlanSurface for SvgSurface<W> {
    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(saved) = self.stack.pop() {
            for _ in saved.open_groups..self.state.open_groups {
                self.write("</g>\n");
            }
            self.state = saved;
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.state.transform = self.state.transform.pre_translate(dx, dy);
    }

    fn rotate(&mut self, angle: f32) {
        self.state.transform = self
            .state
            .transform
            .pre_concat(Transform::from_rotate(angle.to_degrees()));
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.state.transform = self.state.transform.pre_scale(sx, sy);
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }

    fn fill_path(&mut self, path: &Path, paint: &Paint) {
        let d = path_data(path);
        if d.is_empty() {
            return;
        }
        let (fill, opacity) = match paint {
            Paint::Solid(color) => (color.to_hex(), self.opacity_attr(*color)),
            other => match self.define_pattern(other) {
                Some(id) => (format!("url(#{id})"), self.opacity_attr(Color::BLACK)),
                None => return,
            },
        };
        let element = format!(
            "<path d=\"{d}\" fill=\"{fill}\" fill-rule=\"evenodd\"{}{}/>\n",
            opacity,
            self.transform_attr()
        );
        self.write(&element);
    }

    fn stroke_path(&mut self, path: &Path, color: Color, style: &StrokeStyle) {
        let d = path_data(path);
        if d.is_empty() {
            return;
        }
        let mut element = format!(
            "<path d=\"{d}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"",
            color.to_hex(),
            num(style.width)
        );
        match style.cap {
            LineCap::Butt => {}
            LineCap::Round => element.push_str(" stroke-linecap=\"round\""),
            LineCap::Square => element.push_str(" stroke-linecap=\"square\""),
        }
        match style.join {
            LineJoin::Miter => {}
            LineJoin::Round => element.push_str(" stroke-linejoin=\"round\""),
            LineJoin::Bevel => element.push_str(" stroke-linejoin=\"bevel\""),
        }
        if let Some(dash) = &style.dash {
            let dash: Vec<String> = dash.iter().map(|d| num(*d)).collect();
            let _ = write!(element, " stroke-dasharray=\"{}\"", dash.join(" "));
        }
        element.push_str(&self.opacity_attr(color));
        element.push_str(&self.transform_attr());
        element.push_str("/>\n");
        self.write(&element);
    }

    fn clip_path(&mut self, path: &Path) {
        let d = path_data(path);
        let id = self.next_id("clip");
        let element = format!(
            "<clipPath id=\"{id}\"><path d=\"{d}\" clip-rule=\"evenodd\"{}/></clipPath>\n<g clip-path=\"url(#{id})\">\n",
            self.transform_attr()
        );
        self.write(&element);
        self.state.open_groups += 1;
    }

    fn draw_image(&mut self, image: &RgbaImage, dest: Rect) {
        let element = format!(
            "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"none\" href=\"{}\"{}{}/>\n",
            num(dest.min_x),
            num(dest.min_y),
            num(dest.width()),
            num(dest.height()),
            png_data_url(image),
            self.opacity_attr(Color::BLACK),
            self.transform_attr()
        );
        self.write(&element);
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle, color: Color) {
        let mut element = format!(
            "<text x=\"{}\" y=\"{}\" font-family=\"sans-serif\" font-size=\"{}\" text-anchor=\"middle\" fill=\"{}\"",
            num(x),
            num(y),
            num(style.font_size),
            color.to_hex()
        );
        if style.bold {
            element.push_str(" font-weight=\"bold\"");
        }
        if style.italic {
            element.push_str(" font-style=\"italic\"");
        }
        element.push_str(&self.opacity_attr(color));
        element.push_str(&self.transform_attr());
        let _ = writeln!(element, ">{}</text>", escape(text));
        self.write(&element);
    }
}

/// Locale independent number with at most 3 fractional digits.
fn num(value: f32) -> String {
    format_decimal(value as f64, 3, false)
}

fn path_data(path: &Path) -> String {
    let mut d = String::new();
    for event in path.iter() {
        let _ = match event {
            Event::Begin { at } => write!(d, "M{} {} ", num(at.x), num(at.y)),
            Event::Line { to, .. } => write!(d, "L{} {} ", num(to.x), num(to.y)),
            Event::Quadratic { ctrl, to, .. } => write!(
                d,
                "Q{} {} {} {} ",
                num(ctrl.x),
                num(ctrl.y),
                num(to.x),
                num(to.y)
            ),
            Event::Cubic {
                ctrl1, ctrl2, to, ..
            } => write!(
                d,
                "C{} {} {} {} {} {} ",
                num(ctrl1.x),
                num(ctrl1.y),
                num(ctrl2.x),
                num(ctrl2.y),
                num(to.x),
                num(to.y)
            ),
            Event::End { close: true, .. } => write!(d, "Z "),
            Event::End { .. } => Ok(()),
        };
    }
    d.trim_end().to_string()
}

fn png_data_url(image: &RgbaImage) -> String {
    let mut bytes = Vec::new();
    if let Err(err) = image.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png) {
        tracing::warn!("Cannot encode image for SVG export: {}", err);
        return String::new();
    }
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{line_path, polygon_path};

    fn render(draw: impl FnOnce(&mut SvgSurface<Vec<u8>>)) -> String {
        let mut surface = SvgSurface::new(Vec::new(), 100.0, 50.0);
        draw(&mut surface);
        String::from_utf8(surface.finish().unwrap()).unwrap()
    }

    #[test]
    fn test_header_and_footer() {
        let svg = render(|_| {});
        assert!(svg.contains("width=\"100\" height=\"50\" viewBox=\"0 0 100 50\""));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_numbers_are_locale_independent() {
        let svg = render(|s| {
            s.translate(1234.56789, 0.5);
            s.stroke_path(&line_path(0.0, 0.0, 1.0 / 3.0, 2.0), Color::BLACK, &StrokeStyle::new(1.5));
        });
        assert!(svg.contains("matrix(1 0 0 1 1234.568 0.5)"), "{svg}");
        assert!(svg.contains("d=\"M0 0 L0.333 2\""), "{svg}");
        assert!(!svg.contains("1,234"));
    }

    #[test]
    fn test_clip_groups_closed_on_restore() {
        let svg = render(|s| {
            s.save();
            s.clip_path(&polygon_path(&Rect::new(0.0, 0.0, 10.0, 10.0).corners()));
            s.fill_path(
                &polygon_path(&Rect::new(0.0, 0.0, 20.0, 20.0).corners()),
                &Paint::Solid(Color::BLACK),
            );
            s.restore();
        });
        assert_eq!(svg.matches("<g ").count(), svg.matches("</g>").count());
        assert!(svg.contains("clip-path=\"url(#clip1)\""));
    }

    #[test]
    fn test_text_is_escaped() {
        let svg = render(|s| {
            s.set_alpha(0.5);
            s.draw_text("A & <B>", 10.0, 20.0, &TextStyle::new(12.0).bold(), Color::BLACK);
        });
        assert!(svg.contains(">A &amp; &lt;B&gt;</text>"));
        assert!(svg.contains("font-weight=\"bold\""));
        assert!(svg.contains("opacity=\"0.5\""));
    }

    #[test]
    fn test_pattern_fill_defines_pattern() {
        let svg = render(|s| {
            s.fill_path(
                &polygon_path(&Rect::new(0.0, 0.0, 20.0, 20.0).corners()),
                &Paint::Pattern {
                    pattern: floorkit_core::model::WallPattern::CrossHatch,
                    foreground: Color::BLACK,
                    background: Color::WHITE,
                    tile: 10.0,
                },
            );
        });
        assert!(svg.contains("<pattern id=\"pattern1\""));
        assert!(svg.contains("fill=\"url(#pattern1)\""));
        assert_eq!(svg.matches("<line").count(), 6);
    }

    #[test]
    fn test_write_error_is_reported() {
        struct Failing;
        impl Write for Failing {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "disk full"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        let surface = SvgSurface::new(Failing, 1.0, 1.0);
        assert!(surface.finish().is_err());
    }
}
