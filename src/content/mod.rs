//! The content-stream builder: a stateful operator emitter with a
//! `q`/`Q` graphics-state stack, text-object bracket tracking, and
//! path-construction tracking. Operands are written directly into a
//! `Vec<u8>` buffer followed by their operator; graphics-state diffing
//! means a value like the fill color or line width is only re-emitted
//! when it actually changes.

mod shapes;
mod text;

pub use text::{show_wrapped, wrap_lines, Alignment, WrapResult};

use crate::error::PdfError;
use crate::geometry::{Matrix, Point};
use crate::object::Value;

/// RGB, gray, or CMYK color, matching the three color-setting operator
/// families (`rg`/`RG`, `g`/`G`, `k`/`K`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    Gray(f64),
    Rgb(f64, f64, f64),
    Cmyk(f64, f64, f64, f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

impl LineCap {
    fn code(self) -> i64 {
        match self {
            LineCap::Butt => 0,
            LineCap::Round => 1,
            LineCap::Square => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineJoin {
    Miter,
    Round,
    Bevel,
}

impl LineJoin {
    fn code(self) -> i64 {
        match self {
            LineJoin::Miter => 0,
            LineJoin::Round => 1,
            LineJoin::Bevel => 2,
        }
    }
}

/// `/Intent` values for the `ri` operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderingIntent {
    AbsoluteColorimetric,
    RelativeColorimetric,
    Saturation,
    Perceptual,
}

impl RenderingIntent {
    fn name(self) -> &'static str {
        match self {
            RenderingIntent::AbsoluteColorimetric => "AbsoluteColorimetric",
            RenderingIntent::RelativeColorimetric => "RelativeColorimetric",
            RenderingIntent::Saturation => "Saturation",
            RenderingIntent::Perceptual => "Perceptual",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRenderingMode {
    Fill,
    Stroke,
    FillStroke,
    Invisible,
    FillClip,
    StrokeClip,
    FillStrokeClip,
    Clip,
}

impl TextRenderingMode {
    fn code(self) -> i64 {
        match self {
            TextRenderingMode::Fill => 0,
            TextRenderingMode::Stroke => 1,
            TextRenderingMode::FillStroke => 2,
            TextRenderingMode::Invisible => 3,
            TextRenderingMode::FillClip => 4,
            TextRenderingMode::StrokeClip => 5,
            TextRenderingMode::FillStrokeClip => 6,
            TextRenderingMode::Clip => 7,
        }
    }
}

/// The part of graphics state the `q`/`Q` stack saves and restores.
#[derive(Debug, Clone, PartialEq)]
struct GraphicsState {
    ctm: Matrix,
    line_width: f64,
    line_cap: LineCap,
    line_join: LineJoin,
    miter_limit: f64,
    dash_pattern: (Vec<f64>, f64),
    fill_color: Color,
    stroke_color: Color,
    fill_alpha: f64,
    stroke_alpha: f64,
    ext_gstate_name: Option<String>,
    rendering_intent: &'static str,
    flatness: f64,
    blend_mode: String,
}

impl Default for GraphicsState {
    fn default() -> Self {
        GraphicsState {
            ctm: crate::geometry::identity(),
            line_width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: 10.0,
            dash_pattern: (Vec::new(), 0.0),
            fill_color: Color::Gray(0.0),
            stroke_color: Color::Gray(0.0),
            fill_alpha: 1.0,
            stroke_alpha: 1.0,
            ext_gstate_name: None,
            rendering_intent: "RelativeColorimetric",
            flatness: 0.0,
            blend_mode: "Normal".to_string(),
        }
    }
}

/// Text-object state, reset to defaults at each `begin_text`.
#[derive(Debug, Clone, PartialEq)]
struct TextState {
    font: Option<(String, f64)>,
    char_spacing: f64,
    word_spacing: f64,
    horizontal_scale: f64,
    leading: f64,
    rise: f64,
    rendering_mode: TextRenderingMode,
}

impl Default for TextState {
    fn default() -> Self {
        TextState {
            font: None,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 100.0,
            leading: 0.0,
            rise: 0.0,
            rendering_mode: TextRenderingMode::Fill,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Page,
    Text,
    Path,
}

/// Builds one page's content stream byte-by-byte, tracking enough state
/// to (a) diff graphics-state changes so only the operators that
/// actually changed get re-emitted, and (b) reject operator sequences
/// that violate the content-stream grammar.
pub struct ContentStreamBuilder {
    buf: Vec<u8>,
    state_stack: Vec<GraphicsState>,
    text_state: TextState,
    mode: Mode,
    has_current_point: bool,
}

impl Default for ContentStreamBuilder {
    fn default() -> Self {
        ContentStreamBuilder {
            buf: Vec::new(),
            state_stack: vec![GraphicsState::default()],
            text_state: TextState::default(),
            mode: Mode::Page,
            has_current_point: false,
        }
    }
}

impl ContentStreamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn top(&self) -> &GraphicsState {
        self.state_stack.last().expect("state stack is never empty")
    }

    fn top_mut(&mut self) -> &mut GraphicsState {
        self.state_stack.last_mut().expect("state stack is never empty")
    }

    fn op(&mut self, op: &str) {
        self.buf.extend_from_slice(op.as_bytes());
        self.buf.push(b'\n');
    }

    fn write_value(&mut self, v: &Value) {
        let mut tmp = Vec::new();
        v.write(&mut tmp).expect("writing to a Vec cannot fail");
        self.buf.extend_from_slice(&tmp);
        self.buf.push(b' ');
    }

    fn num(&mut self, v: f64) -> Result<(), PdfError> {
        let value = Value::number(v)?;
        self.write_value(&value);
        Ok(())
    }

    fn require_page_or_path(&self) -> Result<(), PdfError> {
        match self.mode {
            Mode::Text => Err(PdfError::TextModeViolation),
            Mode::Page | Mode::Path => Ok(()),
        }
    }

    /// `q`: pushes a copy of the current graphics state.
    pub fn save_state(&mut self) -> Result<(), PdfError> {
        self.require_page_or_path()?;
        let top = self.top().clone();
        self.state_stack.push(top);
        self.op("q");
        Ok(())
    }

    /// `Q`: pops the graphics-state stack. Fails `UnbalancedStack` if
    /// this would pop the implicit base state.
    pub fn restore_state(&mut self) -> Result<(), PdfError> {
        self.require_page_or_path()?;
        if self.state_stack.len() <= 1 {
            return Err(PdfError::UnbalancedStack);
        }
        self.state_stack.pop();
        self.op("Q");
        Ok(())
    }

    /// `cm`: concatenates `matrix` onto the CTM. Always emitted — a
    /// `cm` is a relative operation, not a value with a "current"
    /// baseline to diff against.
    pub fn concat_matrix(&mut self, matrix: Matrix) -> Result<(), PdfError> {
        self.require_page_or_path()?;
        self.top_mut().ctm = self.top().ctm.then(&matrix);
        let m = matrix.to_array();
        for component in m {
            self.num(component)?;
        }
        self.op("cm");
        Ok(())
    }

    pub fn set_line_width(&mut self, width: f64) -> Result<(), PdfError> {
        self.require_page_or_path()?;
        if self.top().line_width == width {
            return Ok(());
        }
        self.top_mut().line_width = width;
        self.num(width)?;
        self.op("w");
        Ok(())
    }

    pub fn set_line_cap(&mut self, cap: LineCap) -> Result<(), PdfError> {
        self.require_page_or_path()?;
        if self.top().line_cap == cap {
            return Ok(());
        }
        self.top_mut().line_cap = cap;
        self.num(cap.code() as f64)?;
        self.op("J");
        Ok(())
    }

    pub fn set_line_join(&mut self, join: LineJoin) -> Result<(), PdfError> {
        self.require_page_or_path()?;
        if self.top().line_join == join {
            return Ok(());
        }
        self.top_mut().line_join = join;
        self.num(join.code() as f64)?;
        self.op("j");
        Ok(())
    }

    /// `M`: sets the miter limit, diffed against the current value.
    pub fn set_miter_limit(&mut self, limit: f64) -> Result<(), PdfError> {
        self.require_page_or_path()?;
        if self.top().miter_limit == limit {
            return Ok(());
        }
        self.top_mut().miter_limit = limit;
        self.num(limit)?;
        self.op("M");
        Ok(())
    }

    /// `d`: sets the dash array and phase, diffed against the current
    /// value. An empty `pattern` means a solid line.
    pub fn set_dash_pattern(&mut self, pattern: &[f64], phase: f64) -> Result<(), PdfError> {
        self.require_page_or_path()?;
        let value = (pattern.to_vec(), phase);
        if self.top().dash_pattern == value {
            return Ok(());
        }
        self.top_mut().dash_pattern = value;
        let entries = pattern
            .iter()
            .map(|v| Value::number(*v))
            .collect::<Result<Vec<_>, _>>()?;
        self.write_value(&Value::Array(entries));
        self.num(phase)?;
        self.op("d");
        Ok(())
    }

    /// `ri`: sets the color rendering intent, diffed against the
    /// current value.
    pub fn set_rendering_intent(&mut self, intent: RenderingIntent) -> Result<(), PdfError> {
        self.require_page_or_path()?;
        if self.top().rendering_intent == intent.name() {
            return Ok(());
        }
        self.top_mut().rendering_intent = intent.name();
        self.write_value(&Value::name(intent.name())?);
        self.op("ri");
        Ok(())
    }

    /// `i`: sets the flatness tolerance, diffed against the current
    /// value.
    pub fn set_flatness(&mut self, flatness: f64) -> Result<(), PdfError> {
        self.require_page_or_path()?;
        if self.top().flatness == flatness {
            return Ok(());
        }
        self.top_mut().flatness = flatness;
        self.num(flatness)?;
        self.op("i");
        Ok(())
    }

    /// Sets the blend mode, diffed against the current value. Blend
    /// mode has no dedicated operator — it rides on the `gs` operator
    /// via an `ExtGState` resource, so `resource_name` must already
    /// point at one built with this `mode` (see
    /// `ResourceCatalog::add_ext_gstate`).
    pub fn set_blend_mode(&mut self, mode: &str, resource_name: &str) -> Result<(), PdfError> {
        self.require_page_or_path()?;
        if self.top().blend_mode == mode {
            return Ok(());
        }
        self.top_mut().blend_mode = mode.to_string();
        self.write_value(&Value::name(resource_name)?);
        self.op("gs");
        Ok(())
    }

    pub fn set_fill_color(&mut self, color: Color) -> Result<(), PdfError> {
        self.require_page_or_path()?;
        if self.top().fill_color == color {
            return Ok(());
        }
        self.top_mut().fill_color = color;
        self.emit_color(color, false)
    }

    pub fn set_stroke_color(&mut self, color: Color) -> Result<(), PdfError> {
        self.require_page_or_path()?;
        if self.top().stroke_color == color {
            return Ok(());
        }
        self.top_mut().stroke_color = color;
        self.emit_color(color, true)
    }

    fn emit_color(&mut self, color: Color, stroke: bool) -> Result<(), PdfError> {
        match color {
            Color::Gray(g) => {
                self.num(g)?;
                self.op(if stroke { "G" } else { "g" });
            }
            Color::Rgb(r, g, b) => {
                self.num(r)?;
                self.num(g)?;
                self.num(b)?;
                self.op(if stroke { "RG" } else { "rg" });
            }
            Color::Cmyk(c, m, y, k) => {
                self.num(c)?;
                self.num(m)?;
                self.num(y)?;
                self.num(k)?;
                self.op(if stroke { "K" } else { "k" });
            }
        }
        Ok(())
    }

    /// `Do`: paints a named `XObject` (an image or a form), using a
    /// resource name the page's resource catalog already allocated.
    pub fn paint_xobject(&mut self, resource_name: &str) -> Result<(), PdfError> {
        self.require_page_or_path()?;
        self.write_value(&Value::name(resource_name)?);
        self.op("Do");
        Ok(())
    }

    /// Sets a page-local `ExtGState` resource name, used for fill/stroke
    /// alpha, so only the name the resource catalog already allocated is
    /// needed here.
    pub fn set_ext_gstate(&mut self, name: &str) -> Result<(), PdfError> {
        self.require_page_or_path()?;
        if self.top().ext_gstate_name.as_deref() == Some(name) {
            return Ok(());
        }
        self.top_mut().ext_gstate_name = Some(name.to_string());
        self.write_value(&Value::name(name)?);
        self.op("gs");
        Ok(())
    }

    // -- path construction --

    pub fn move_to(&mut self, p: Point) -> Result<(), PdfError> {
        self.require_page_or_path()?;
        self.mode = Mode::Path;
        self.num(p.x)?;
        self.num(p.y)?;
        self.op("m");
        self.has_current_point = true;
        Ok(())
    }

    pub fn line_to(&mut self, p: Point) -> Result<(), PdfError> {
        self.require_in_path()?;
        self.num(p.x)?;
        self.num(p.y)?;
        self.op("l");
        Ok(())
    }

    pub fn curve_to(&mut self, c1: Point, c2: Point, end: Point) -> Result<(), PdfError> {
        self.require_in_path()?;
        for p in [c1, c2, end] {
            self.num(p.x)?;
            self.num(p.y)?;
        }
        self.op("c");
        Ok(())
    }

    pub fn close_path(&mut self) -> Result<(), PdfError> {
        self.require_in_path()?;
        self.op("h");
        Ok(())
    }

    pub fn rectangle(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<(), PdfError> {
        self.require_page_or_path()?;
        self.mode = Mode::Path;
        self.num(x)?;
        self.num(y)?;
        self.num(width)?;
        self.num(height)?;
        self.op("re");
        self.has_current_point = true;
        Ok(())
    }

    fn require_in_path(&self) -> Result<(), PdfError> {
        match self.mode {
            Mode::Text => Err(PdfError::TextModeViolation),
            Mode::Path if self.has_current_point => Ok(()),
            Mode::Path | Mode::Page => Err(PdfError::PathStateViolation),
        }
    }

    fn end_path(&mut self, op: &str) -> Result<(), PdfError> {
        if self.mode != Mode::Path || !self.has_current_point {
            return Err(PdfError::PathStateViolation);
        }
        self.op(op);
        self.mode = Mode::Page;
        self.has_current_point = false;
        Ok(())
    }

    pub fn stroke(&mut self) -> Result<(), PdfError> {
        self.end_path("S")
    }

    pub fn fill(&mut self) -> Result<(), PdfError> {
        self.end_path("f")
    }

    pub fn fill_and_stroke(&mut self) -> Result<(), PdfError> {
        self.end_path("B")
    }

    pub fn close_and_stroke(&mut self) -> Result<(), PdfError> {
        self.require_in_path()?;
        self.end_path("s")
    }

    pub fn clip_nonzero(&mut self) -> Result<(), PdfError> {
        self.require_in_path()?;
        self.op("W");
        self.end_path("n")
    }

    // -- text --

    pub fn begin_text(&mut self) -> Result<(), PdfError> {
        if self.mode != Mode::Page {
            return Err(PdfError::TextModeViolation);
        }
        self.mode = Mode::Text;
        self.text_state = TextState::default();
        self.op("BT");
        Ok(())
    }

    pub fn end_text(&mut self) -> Result<(), PdfError> {
        if self.mode != Mode::Text {
            return Err(PdfError::TextModeViolation);
        }
        self.mode = Mode::Page;
        self.op("ET");
        Ok(())
    }

    fn require_text(&self) -> Result<(), PdfError> {
        if self.mode != Mode::Text {
            return Err(PdfError::TextModeViolation);
        }
        Ok(())
    }

    /// `Tf`: sets the font and size for subsequent text-showing
    /// operators. `resource_name` must already be the page-local name
    /// the resource catalog assigned this font (e.g. `"F1"`, without
    /// the leading slash).
    pub fn set_font(&mut self, resource_name: &str, size: f64) -> Result<(), PdfError> {
        self.require_text()?;
        self.text_state.font = Some((resource_name.to_string(), size));
        self.write_value(&Value::name(resource_name)?);
        self.num(size)?;
        self.op("Tf");
        Ok(())
    }

    pub fn set_text_position(&mut self, x: f64, y: f64) -> Result<(), PdfError> {
        self.require_text()?;
        self.num(x)?;
        self.num(y)?;
        self.op("Td");
        Ok(())
    }

    pub fn set_char_spacing(&mut self, spacing: f64) -> Result<(), PdfError> {
        self.require_text()?;
        self.text_state.char_spacing = spacing;
        self.num(spacing)?;
        self.op("Tc");
        Ok(())
    }

    pub fn set_word_spacing(&mut self, spacing: f64) -> Result<(), PdfError> {
        self.require_text()?;
        self.text_state.word_spacing = spacing;
        self.num(spacing)?;
        self.op("Tw");
        Ok(())
    }

    pub fn set_leading(&mut self, leading: f64) -> Result<(), PdfError> {
        self.require_text()?;
        self.text_state.leading = leading;
        self.num(leading)?;
        self.op("TL");
        Ok(())
    }

    pub fn next_line(&mut self) -> Result<(), PdfError> {
        self.require_text()?;
        self.op("T*");
        Ok(())
    }

    pub fn set_rendering_mode(&mut self, mode: TextRenderingMode) -> Result<(), PdfError> {
        self.require_text()?;
        self.text_state.rendering_mode = mode;
        self.num(mode.code() as f64)?;
        self.op("Tr");
        Ok(())
    }

    /// `Tj`: shows a literal string verbatim, with no word-wrap, using
    /// the already-encoded glyph bytes `encoded`. Fails
    /// `MissingFont` if no font is set in the current text object.
    pub fn show_encoded(&mut self, encoded: &[u8]) -> Result<(), PdfError> {
        self.require_text()?;
        if self.text_state.font.is_none() {
            return Err(PdfError::MissingFont);
        }
        self.write_value(&Value::LiteralString(encoded.to_vec()));
        self.op("Tj");
        Ok(())
    }

    pub fn current_font(&self) -> Option<(&str, f64)> {
        self.text_state.font.as_ref().map(|(name, size)| (name.as_str(), *size))
    }

    pub fn word_spacing(&self) -> f64 {
        self.text_state.word_spacing
    }

    pub fn leading(&self) -> f64 {
        self.text_state.leading
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn is_balanced(&self) -> bool {
        self.state_stack.len() == 1 && self.mode == Mode::Page
    }
}

pub use shapes::{circle, ellipse, polygon, rounded_rectangle};
