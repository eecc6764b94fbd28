// Rich text layout
// Word-wraps text runs mixed with inline widgets (diagrams, images). Runs may
// override the font family and color. Widgets are owned by the rich text and
// positioned on their line during layout.

use crate::draw_context::{DrawContext, FontSpec, TextMetrics};
use crate::geometry::{Point, Rect};
use crate::node::LayoutNode;
use crate::theme::Theme;

/// Input to a rich text
pub enum TextRun {
    Plain(String),
    Styled {
        text: String,
        font: Option<String>,
        color: Option<u32>,
    },
    Widget(LayoutNode),
}

enum Run {
    Text {
        text: String,
        font: Option<String>,
        color: Option<u32>,
    },
    Widget(usize),
}

/// One laid-out word. Spaces are either merged into the following word's
/// text or kept as a separate `" "` word.
#[derive(Debug, Clone, PartialEq)]
pub enum Word {
    Text {
        text: String,
        font: Option<String>,
        color: Option<u32>,
    },
    /// Index into the rich text's widgets
    Widget(usize),
}

impl Word {
    fn plain(text: &str) -> Self {
        Word::Text {
            text: text.to_string(),
            font: None,
            color: None,
        }
    }

    fn font(&self) -> Option<&str> {
        match self {
            Word::Text { font, .. } => font.as_deref(),
            Word::Widget(_) => None,
        }
    }

    fn text(&self) -> Option<&str> {
        match self {
            Word::Text { text, .. } => Some(text),
            Word::Widget(_) => None,
        }
    }

    fn is_plain(&self) -> bool {
        matches!(self, Word::Text { font: None, color: None, .. })
    }

    /// No space goes in front of a word that closes or ends a clause
    fn suppresses_space_before(&self) -> bool {
        match self.text() {
            Some(text) => matches!(text, "." | "," | "!") || text.starts_with(')'),
            None => false,
        }
    }
}

enum Token {
    Word(Word),
    Newline,
}

struct PlacedText {
    text: String,
    font: FontSpec,
    color: u32,
    /// Baseline origin relative to the rich text's position
    offset: Point,
}

pub struct RichText {
    runs: Vec<Run>,
    widgets: Vec<LayoutNode>,
    pub font: FontSpec,
    pub color: u32,
    /// Wrap width; 0 means unbounded
    pub max_width: f64,
    pub bounds: Rect,
    lines: Vec<Vec<Word>>,
    max_line_width: f64,
    placed: Vec<PlacedText>,
}

impl RichText {
    pub fn new(runs: Vec<TextRun>, font: FontSpec, color: u32, metrics: &dyn TextMetrics) -> Self {
        let mut widgets = Vec::new();
        let runs = runs
            .into_iter()
            .map(|run| match run {
                TextRun::Plain(text) => Run::Text {
                    text,
                    font: None,
                    color: None,
                },
                TextRun::Styled { text, font, color } => Run::Text { text, font, color },
                TextRun::Widget(node) => {
                    widgets.push(node);
                    Run::Widget(widgets.len() - 1)
                }
            })
            .collect();
        let mut rich = RichText {
            runs,
            widgets,
            font,
            color,
            max_width: 0.0,
            bounds: Rect::default(),
            lines: Vec::new(),
            max_line_width: 0.0,
            placed: Vec::new(),
        };
        rich.fix_layout(metrics);
        rich
    }

    pub fn widgets(&self) -> &[LayoutNode] {
        &self.widgets
    }

    pub fn widgets_mut(&mut self) -> &mut [LayoutNode] {
        &mut self.widgets
    }

    pub fn lines(&self) -> &[Vec<Word>] {
        &self.lines
    }

    pub fn max_line_width(&self) -> f64 {
        self.max_line_width
    }

    fn word_font(&self, family: Option<&str>) -> FontSpec {
        self.font.with_family(family)
    }

    pub fn word_width(&self, word: &Word, metrics: &dyn TextMetrics) -> f64 {
        match word {
            Word::Widget(i) => self.widgets[*i].width(),
            Word::Text { text, font, .. } => {
                metrics.text_width(text, &self.word_font(font.as_deref()))
            }
        }
    }

    pub fn line_width(&self, line: &[Word], metrics: &dyn TextMetrics) -> f64 {
        line.iter().map(|word| self.word_width(word, metrics)).sum()
    }

    fn word_height(&self, word: &Word, metrics: &dyn TextMetrics) -> f64 {
        match word {
            Word::Widget(i) => self.widgets[*i].height(),
            Word::Text { .. } => metrics.font_height(self.font.size),
        }
    }

    pub fn line_height(&self, line: &[Word], metrics: &dyn TextMetrics) -> f64 {
        line.iter()
            .map(|word| self.word_height(word, metrics))
            .fold(0.0, f64::max)
    }

    /// Deepest descent among the fonts used on the line
    pub fn line_descent(&self, line: &[Word], metrics: &dyn TextMetrics) -> f64 {
        line.iter()
            .filter_map(Word::font)
            .map(|family| metrics.font_descent(&self.word_font(Some(family))))
            .fold(metrics.font_descent(&self.font), f64::max)
    }

    pub fn first_line_height(&self, metrics: &dyn TextMetrics) -> f64 {
        self.lines
            .first()
            .map(|line| self.line_height(line, metrics))
            .unwrap_or(0.0)
    }

    fn tokens(&self) -> Vec<Token> {
        let mut tokens = Vec::new();
        for run in &self.runs {
            match run {
                Run::Widget(i) => tokens.push(Token::Word(Word::Widget(*i))),
                Run::Text { text, font, color } => {
                    for (n, paragraph) in text.split('\n').enumerate() {
                        if n > 0 {
                            tokens.push(Token::Newline);
                        }
                        tokens.extend(paragraph.split(' ').filter(|w| !w.is_empty()).map(
                            |w| {
                                Token::Word(Word::Text {
                                    text: w.to_string(),
                                    font: font.clone(),
                                    color: *color,
                                })
                            },
                        ));
                    }
                }
            }
        }
        tokens
    }

    /// Break the runs into lines. Re-parsing with unchanged input and
    /// metrics gives the same lines.
    pub fn parse(&mut self, metrics: &dyn TextMetrics) {
        let tokens = self.tokens();
        let mut lines = Vec::new();
        let mut line: Vec<Word> = Vec::new();
        let mut line_width: f64 = 0.0;
        let mut max_line_width: f64 = 0.0;
        let mut prepend_space = false;
        let mut previous: Option<&Word> = None;

        for (i, token) in tokens.iter().enumerate() {
            let word = match token {
                Token::Newline => {
                    lines.push(std::mem::take(&mut line));
                    max_line_width = max_line_width.max(line_width);
                    line_width = 0.0;
                    continue;
                }
                Token::Word(word) => word,
            };

            let same_font = previous.is_some_and(|p| p.font() == word.font());
            let own_width = self.word_width(word, metrics);
            let mut width = own_width;
            if prepend_space {
                let space_font = if same_font { word.font() } else { None };
                width += metrics.text_width(" ", &self.word_font(space_font));
            }

            if self.max_width > 0.0 && !line.is_empty() && line_width + width > self.max_width {
                lines.push(std::mem::replace(&mut line, vec![word.clone()]));
                max_line_width = max_line_width.max(line_width);
                line_width = own_width;
            } else {
                if prepend_space {
                    match word {
                        Word::Text { text, font, color } if word.is_plain() || same_font => {
                            line.push(Word::Text {
                                text: format!(" {text}"),
                                font: font.clone(),
                                color: *color,
                            });
                        }
                        _ => {
                            line.push(Word::plain(" "));
                            line.push(word.clone());
                        }
                    }
                } else {
                    line.push(word.clone());
                }
                line_width += width;
            }

            prepend_space = match tokens.get(i + 1) {
                None | Some(Token::Newline) => false,
                Some(Token::Word(next)) => {
                    word.text() != Some("(") && !next.suppresses_space_before()
                }
            };
            previous = Some(word);
        }
        lines.push(line);
        max_line_width = max_line_width.max(line_width);

        self.lines = lines;
        self.max_line_width = max_line_width;
    }

    pub fn set_max_width(&mut self, width: f64, metrics: &dyn TextMetrics) {
        self.max_width = width;
        self.fix_layout(metrics);
    }

    pub fn fix_layout(&mut self, metrics: &dyn TextMetrics) {
        self.parse(metrics);

        let line_metrics: Vec<(f64, f64)> = self
            .lines
            .iter()
            .map(|line| (self.line_height(line, metrics), self.line_descent(line, metrics)))
            .collect();
        let mut height: f64 = line_metrics.iter().map(|(h, _)| h).sum();
        if let Some((_, descent)) = line_metrics.last() {
            height += descent;
        }
        self.bounds.w = if self.max_width == 0.0 {
            self.max_line_width
        } else {
            self.max_width
        };
        self.bounds.h = height;

        self.place(&line_metrics, metrics);
    }

    /// Position the widgets and record text baselines, line by line
    fn place(&mut self, line_metrics: &[(f64, f64)], metrics: &dyn TextMetrics) {
        let origin = self.bounds.origin();
        let text_height = metrics.font_height(self.font.size);
        let mut placed = Vec::new();
        let mut y = 0.0;
        for (line, &(line_height, line_descent)) in self.lines.iter().zip(line_metrics) {
            y += line_height / 2.0;
            let mut x = 0.0;
            for word in line {
                match word {
                    Word::Widget(i) => {
                        let widget = &mut self.widgets[*i];
                        let top = y - widget.height() / 2.0 + line_descent;
                        widget.set_position(origin + Point::new(x, top));
                        x += widget.width();
                    }
                    Word::Text { text, font, color } => {
                        let font = self.font.with_family(font.as_deref());
                        let width = metrics.text_width(text, &font);
                        placed.push(PlacedText {
                            text: text.clone(),
                            font,
                            color: color.unwrap_or(self.color),
                            offset: Point::new(x, y + text_height / 2.0),
                        });
                        x += width;
                    }
                }
            }
            y += line_height / 2.0;
        }
        self.placed = placed;
    }

    pub fn move_by(&mut self, delta: Point) {
        self.bounds = self.bounds.translated(delta);
        for widget in &mut self.widgets {
            widget.move_by(delta);
        }
    }

    pub fn render(&self, ctx: &mut dyn DrawContext, theme: &Theme) {
        let origin = self.bounds.origin();
        for text in &self.placed {
            ctx.set_font(&text.font);
            ctx.set_color(text.color);
            let at = origin + text.offset;
            ctx.draw_text(&text.text, at.x, at.y);
        }
        for widget in &self.widgets {
            widget.render(ctx, theme);
        }
    }
}
