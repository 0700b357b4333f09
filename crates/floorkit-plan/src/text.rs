//! Text measurement and glyph outlines.
//!
//! Fonts are located once through a shared `fontdb` database loaded with the
//! system fonts, and parsed with `rusttype`. Font sizes are model units, so
//! glyph outlines come out in model coordinates.
//!
//! When no font can be found, measurement falls back to a fixed
//! approximation and [`TextMetrics::outline`] returns `None`.

use floorkit_core::model::TextStyle;
use floorkit_core::{Point, Rect};
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use lyon::math::point;
use lyon::path::Path;
use parking_lot::Mutex;
use rusttype::{point as rt_point, Font, OutlineBuilder, Scale};
use std::collections::HashMap;
use std::sync::OnceLock;

const APPROX_ADVANCE: f32 = 0.6;
const APPROX_ASCENT: f32 = 0.8;
const APPROX_DESCENT: f32 = 0.2;

/// Horizontal extent and vertical metrics of a text line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextBounds {
    pub width: f32,
    pub ascent: f32,
    /// Distance below the baseline, positive.
    pub descent: f32,
}

#[derive(Clone, Eq, PartialEq, Hash)]
struct FontKey {
    family: Option<String>,
    bold: bool,
    italic: bool,
}

fn db() -> &'static Database {
    static DB: OnceLock<Database> = OnceLock::new();
    DB.get_or_init(|| {
        let mut db = Database::new();
        db.load_system_fonts();
        tracing::debug!("Loaded {} font faces", db.len());
        db
    })
}

fn font_for(family: Option<&str>, bold: bool, italic: bool) -> Option<&'static Font<'static>> {
    static CACHE: OnceLock<Mutex<HashMap<FontKey, Option<&'static Font<'static>>>>> =
        OnceLock::new();
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let key = FontKey {
        family: family.map(str::to_string),
        bold,
        italic,
    };
    if let Some(font) = cache.lock().get(&key) {
        return *font;
    }
    let font = load_system_font(family, bold, italic)
        .map(|font| &*Box::leak(Box::new(font)));
    if font.is_none() {
        tracing::warn!("No font found for family {:?}, using approximate text metrics", family);
    }
    cache.lock().insert(key, font);
    font
}

fn load_system_font(family: Option<&str>, bold: bool, italic: bool) -> Option<Font<'static>> {
    let families: Vec<Family<'_>> = match family.map(str::trim) {
        None | Some("") | Some("Sans") => vec![Family::SansSerif],
        Some("Serif") => vec![Family::Serif],
        Some("Monospace") => vec![Family::Monospace],
        Some(other) => vec![Family::Name(other), Family::SansSerif],
    };
    let query = Query {
        families: &families,
        weight: if bold { Weight::BOLD } else { Weight::NORMAL },
        stretch: Stretch::Normal,
        style: if italic { Style::Italic } else { Style::Normal },
    };
    let id = db().query(&query)?;
    db().with_face_data(id, |data, index| {
        Font::try_from_vec_and_index(data.to_vec(), index)
    })?
}

/// Measures texts and builds their outlines.
#[derive(Debug, Clone, Default)]
pub struct TextMetrics {
    family: Option<String>,
    approximate: bool,
}

impl TextMetrics {
    /// Metrics backed by the system font of `family` (sans serif when unset).
    pub fn new(family: Option<String>) -> Self {
        Self {
            family,
            approximate: false,
        }
    }

    /// Metrics that never touch system fonts.
    pub fn approximate() -> Self {
        Self {
            family: None,
            approximate: true,
        }
    }

    fn font(&self, style: &TextStyle) -> Option<&'static Font<'static>> {
        if self.approximate {
            return None;
        }
        font_for(self.family.as_deref(), style.bold, style.italic)
    }

    /// True when glyph outlines are available for `style`.
    pub fn has_font(&self, style: &TextStyle) -> bool {
        self.font(style).is_some()
    }

    pub fn measure(&self, text: &str, style: &TextStyle) -> TextBounds {
        let size = style.font_size;
        let Some(font) = self.font(style) else {
            return TextBounds {
                width: text.chars().count() as f32 * size * APPROX_ADVANCE,
                ascent: size * APPROX_ASCENT,
                descent: size * APPROX_DESCENT,
            };
        };
        let scale = Scale::uniform(size);
        let v_metrics = font.v_metrics(scale);
        let width = font
            .layout(text, scale, rt_point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0);
        TextBounds {
            width,
            ascent: v_metrics.ascent,
            descent: -v_metrics.descent,
        }
    }

    /// Model rectangle covered by `text` drawn centred at `anchor`.
    pub fn bounds_at(&self, text: &str, style: &TextStyle, anchor: Point) -> Rect {
        let bounds = self.measure(text, style);
        Rect::from_ltrb(
            anchor.x - bounds.width / 2.0,
            anchor.y - bounds.ascent,
            anchor.x + bounds.width / 2.0,
            anchor.y + bounds.descent,
        )
    }

    /// Outline of `text` centred on `anchor.x` with its baseline at `anchor.y`.
    pub fn outline(&self, text: &str, style: &TextStyle, anchor: Point) -> Option<Path> {
        let font = self.font(style)?;
        let scale = Scale::uniform(style.font_size);
        let width = self.measure(text, style).width;
        let mut builder = GlyphPathBuilder {
            builder: Path::builder(),
            offset: (0.0, 0.0),
            open: false,
        };
        for glyph in font.layout(text, scale, rt_point(0.0, 0.0)) {
            let pos = glyph.position();
            builder.offset = (anchor.x - width / 2.0 + pos.x, anchor.y + pos.y);
            glyph.unpositioned().build_outline(&mut builder);
            builder.end();
        }
        Some(builder.builder.build())
    }
}

/// Feeds rusttype outlines into a lyon path, translated by `offset`.
struct GlyphPathBuilder {
    builder: lyon::path::path::Builder,
    offset: (f32, f32),
    open: bool,
}

impl GlyphPathBuilder {
    fn at(&self, x: f32, y: f32) -> lyon::math::Point {
        point(x + self.offset.0, y + self.offset.1)
    }

    fn end(&mut self) {
        if self.open {
            self.builder.close();
            self.open = false;
        }
    }
}

impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.end();
        let p = self.at(x, y);
        self.builder.begin(p);
        self.open = true;
    }

    fn line_to(&mut self, x: f32, y: f32) {
        if self.open {
            let p = self.at(x, y);
            self.builder.line_to(p);
        }
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        if self.open {
            let (c, p) = (self.at(x1, y1), self.at(x, y));
            self.builder.quadratic_bezier_to(c, p);
        }
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        if self.open {
            let (c1, c2, p) = (self.at(x1, y1), self.at(x2, y2), self.at(x, y));
            self.builder.cubic_bezier_to(c1, c2, p);
        }
    }

    fn close(&mut self) {
        self.end();
    }
}
