// Block outlines
// Turns <script>, <block> and <custom-block> elements, and custom block
// definitions, into laid-out script element trees. Blocks are labelled
// rectangles; C-slots indent their nested scripts and the next block of a
// stack is nested as the last child of the one above it.

use crate::color::rgb;
use crate::document::DocElement;
use crate::draw_context::FontSpec;
use crate::error::LoadError;
use crate::geometry::{Point, Rect};
use crate::node::LayoutCx;
use crate::script::{AnchorTags, ElementKind, Script, ScriptElement, ScriptKind};

const PART_GAP: f64 = 4.0;
const INSET: f64 = 5.0;
const VERTICAL_PADDING: f64 = 3.0;
const C_SLOT_INDENT: f64 = 10.0;
const C_SLOT_ARM: f64 = 8.0;
const EMPTY_SLOT: f64 = 12.0;
const ARG_INSET: f64 = 3.0;
const MIN_ARG_WIDTH: f64 = 12.0;

/// Source of rendered scripts for help diagrams
pub trait ScriptFactory {
    /// Replace the registered custom block definitions with those of a
    /// `<blocks>` section
    fn register_definitions(&mut self, blocks: &DocElement);

    /// Build a `<script>`, or a lone block element
    fn script(&self, element: &DocElement, cx: LayoutCx<'_>) -> Result<Script, LoadError>;

    /// Build the prototype hat and body of the custom block matching `spec`
    fn definition(&self, spec: &str, cx: LayoutCx<'_>) -> Result<Script, LoadError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockShape {
    Command,
    Reporter,
    Predicate,
}

impl BlockShape {
    fn from_type(value: Option<&str>) -> Self {
        match value {
            Some("reporter") => BlockShape::Reporter,
            Some("predicate") => BlockShape::Predicate,
            _ => BlockShape::Command,
        }
    }

    fn element_kind(self) -> ElementKind {
        match self {
            BlockShape::Command => ElementKind::Command,
            BlockShape::Reporter => ElementKind::Reporter,
            BlockShape::Predicate => ElementKind::Predicate,
        }
    }
}

#[derive(Debug, Clone)]
struct Definition {
    spec: String,
    shape: BlockShape,
    category: String,
    body: Option<DocElement>,
}

#[derive(Debug, Clone, Default)]
pub struct OutlineScriptFactory {
    definitions: Vec<Definition>,
}

impl OutlineScriptFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }

    fn find_definition(&self, spec: &str) -> Option<&Definition> {
        let key = spec_key(spec);
        self.definitions.iter().find(|d| spec_key(&d.spec) == key)
    }
}

impl ScriptFactory for OutlineScriptFactory {
    fn register_definitions(&mut self, blocks: &DocElement) {
        self.definitions.clear();
        for child in blocks.children.iter().filter(|c| c.tag == "block-definition") {
            let Some(spec) = child.attr("s") else {
                log::debug!("skipping block definition without a spec");
                continue;
            };
            self.definitions.push(Definition {
                spec: spec.to_string(),
                shape: BlockShape::from_type(child.attr("type")),
                category: child.attr("category").unwrap_or("other").to_string(),
                body: child.child_named("script").cloned(),
            });
        }
    }

    fn script(&self, element: &DocElement, cx: LayoutCx<'_>) -> Result<Script, LoadError> {
        let outliner = Outliner::new(self, cx);
        let blocks: Vec<&DocElement> = if is_block_tag(&element.tag) {
            vec![element]
        } else {
            element.children.iter().filter(|c| is_block_tag(&c.tag)).collect()
        };
        let root = outliner
            .stack(&blocks, Point::ZERO)?
            .unwrap_or_else(|| ScriptElement::new(ElementKind::Other, Rect::default()));
        Ok(Script::new(ScriptKind::Blocks, root))
    }

    fn definition(&self, spec: &str, cx: LayoutCx<'_>) -> Result<Script, LoadError> {
        let definition = self
            .find_definition(spec)
            .ok_or_else(|| LoadError::UnknownDefinition(spec.to_string()))?;
        let outliner = Outliner::new(self, cx);

        let prototype = outliner.prototype(definition, Point::new(INSET, VERTICAL_PADDING));
        let proto_bounds = prototype.full_bounds();
        let mut hat = ScriptElement::new(
            ElementKind::Hat,
            Rect::new(
                0.0,
                0.0,
                proto_bounds.right() + INSET,
                proto_bounds.bottom() + VERTICAL_PADDING,
            ),
        );
        hat.color = category_color(&definition.category);
        hat.children.push(prototype);

        if let Some(body) = &definition.body {
            let blocks: Vec<&DocElement> =
                body.children.iter().filter(|c| is_block_tag(&c.tag)).collect();
            if let Some(next) = outliner.stack(&blocks, Point::new(0.0, hat.bounds.bottom()))? {
                hat.children.push(next);
            }
        }
        Ok(Script::new(ScriptKind::Blocks, hat))
    }
}

enum Part<'e> {
    Label(String),
    Input(&'e DocElement),
    /// Empty input slot of a custom block used without enough inputs
    EmptyInput,
}

struct Outliner<'a> {
    factory: &'a OutlineScriptFactory,
    cx: LayoutCx<'a>,
    font: FontSpec,
    line_height: f64,
}

impl<'a> Outliner<'a> {
    fn new(factory: &'a OutlineScriptFactory, cx: LayoutCx<'a>) -> Self {
        let font = cx.theme.block_font();
        let line_height = cx.metrics.font_height(font.size);
        Outliner {
            factory,
            cx,
            font,
            line_height,
        }
    }

    fn stack(
        &self,
        blocks: &[&DocElement],
        origin: Point,
    ) -> Result<Option<ScriptElement>, LoadError> {
        let Some((first, rest)) = blocks.split_first() else {
            return Ok(None);
        };
        let mut block = self.block(first, origin)?;
        if let Some(next) = self.stack(rest, Point::new(origin.x, block.bounds.bottom()))? {
            block.children.push(next);
        }
        Ok(Some(block))
    }

    fn block(&self, element: &DocElement, origin: Point) -> Result<ScriptElement, LoadError> {
        if let Some(name) = element.attr("var") {
            return Ok(self.variable(name, element, origin));
        }

        let (kind, color, parts, slots) = self.describe(element);
        let mut children = Vec::new();
        let mut x = origin.x + INSET;
        let top = origin.y + VERTICAL_PADDING;
        let mut row_height = self.line_height;
        for part in parts {
            let child = match part {
                Part::Label(text) => self.label(&text, Point::new(x, top)),
                Part::Input(input) => self.input(input, Point::new(x, top))?,
                Part::EmptyInput => self.argument(None, Point::new(x, top)),
            };
            let bounds = child.full_bounds();
            x = bounds.right() + PART_GAP;
            row_height = row_height.max(bounds.h);
            children.push(child);
        }
        for child in &mut children {
            let bounds = child.full_bounds();
            let centered = top + (row_height - bounds.h) / 2.0;
            child.translate(Point::new(0.0, centered - bounds.top()));
        }

        let mut width = (x - PART_GAP + INSET - origin.x).max(2.0 * INSET);
        let mut bottom = top + row_height + VERTICAL_PADDING;
        for slot in slots {
            let blocks: Vec<&DocElement> =
                slot.children.iter().filter(|c| is_block_tag(&c.tag)).collect();
            match self.stack(&blocks, Point::new(origin.x + C_SLOT_INDENT, bottom))? {
                Some(nested) => {
                    let bounds = nested.full_bounds();
                    bottom = bounds.bottom();
                    width = width.max(bounds.right() - origin.x);
                    children.push(nested);
                }
                None => bottom += EMPTY_SLOT,
            }
            bottom += C_SLOT_ARM;
        }

        let mut block = ScriptElement::new(
            kind,
            Rect::new(origin.x, origin.y, width, bottom - origin.y),
        );
        block.color = color;
        block.tags = AnchorTags::from_element(element);
        block.children = children;
        Ok(block)
    }

    /// Kind, color, label row and C-slot scripts of a block element
    fn describe<'e>(
        &self,
        element: &'e DocElement,
    ) -> (ElementKind, u32, Vec<Part<'e>>, Vec<&'e DocElement>) {
        let mut inputs = element.children.iter().filter(|c| c.tag != "script");
        let slots = element.children.iter().filter(|c| c.tag == "script").collect();
        let mut parts = Vec::new();

        if element.tag == "custom-block" {
            let spec = element.attr("s").unwrap_or_default();
            for token in spec.split_whitespace() {
                if token.starts_with('%') {
                    parts.push(inputs.next().map_or(Part::EmptyInput, Part::Input));
                } else {
                    parts.push(Part::Label(token.to_string()));
                }
            }
            parts.extend(inputs.map(Part::Input));
            let (shape, category) = match self.factory.find_definition(spec) {
                Some(def) => (def.shape, def.category.as_str()),
                None => (BlockShape::Command, "other"),
            };
            return (shape.element_kind(), category_color(category), parts, slots);
        }

        let selector = element.attr("s").unwrap_or_default();
        parts.push(Part::Label(selector.to_string()));
        parts.extend(inputs.map(Part::Input));
        let kind = if selector.starts_with("receive") {
            ElementKind::Hat
        } else {
            primitive_shape(selector).element_kind()
        };
        (kind, category_color(selector_category(selector)), parts, slots)
    }

    fn input(&self, element: &DocElement, origin: Point) -> Result<ScriptElement, LoadError> {
        let mut input = match element.tag.as_str() {
            "block" | "custom-block" => return self.block(element, origin),
            "l" => {
                let text = element
                    .child_named("option")
                    .map_or(element.contents.trim(), |option| option.contents.trim());
                self.argument(Some(text), origin)
            }
            "color" => self.argument(None, origin),
            "list" => self.argument(Some("list"), origin),
            _ => self.argument(Some(element.contents.trim()), origin),
        };
        input.tags = AnchorTags::from_element(element);
        Ok(input)
    }

    fn argument(&self, text: Option<&str>, origin: Point) -> ScriptElement {
        let text_width = text.map_or(0.0, |t| self.cx.metrics.text_width(t, &self.font));
        let width = (text_width + 2.0 * ARG_INSET).max(MIN_ARG_WIDTH);
        let mut arg = ScriptElement::new(
            ElementKind::Argument,
            Rect::new(origin.x, origin.y, width, self.line_height + 2.0),
        );
        arg.label = text.filter(|t| !t.is_empty()).map(str::to_string);
        arg
    }

    fn label(&self, text: &str, origin: Point) -> ScriptElement {
        let width = self.cx.metrics.text_width(text, &self.font);
        let mut label = ScriptElement::new(
            ElementKind::Label,
            Rect::new(origin.x, origin.y, width, self.line_height),
        );
        label.label = Some(text.to_string());
        label
    }

    fn variable(&self, name: &str, element: &DocElement, origin: Point) -> ScriptElement {
        let label = self.label(name, Point::new(origin.x + INSET, origin.y + VERTICAL_PADDING));
        let mut reporter = ScriptElement::new(
            ElementKind::Reporter,
            Rect::new(
                origin.x,
                origin.y,
                label.bounds.w + 2.0 * INSET,
                self.line_height + 2.0 * VERTICAL_PADDING,
            ),
        );
        reporter.color = category_color("variables");
        reporter.tags = AnchorTags::from_element(element);
        reporter.children.push(label);
        reporter
    }

    /// The custom block as shown inside its definition's hat; inputs appear
    /// as named slots
    fn prototype(&self, definition: &Definition, origin: Point) -> ScriptElement {
        let mut children = Vec::new();
        let mut x = origin.x + INSET;
        let top = origin.y + VERTICAL_PADDING;
        let mut row_height = self.line_height;
        for token in definition.spec.split_whitespace() {
            let child = match token.strip_prefix('%') {
                Some(name) => self.argument(Some(name.trim_matches('\'')), Point::new(x, top)),
                None => self.label(token, Point::new(x, top)),
            };
            x = child.bounds.right() + PART_GAP;
            row_height = row_height.max(child.bounds.h);
            children.push(child);
        }
        for child in &mut children {
            let centered = top + (row_height - child.bounds.h) / 2.0;
            child.translate(Point::new(0.0, centered - child.bounds.top()));
        }
        let width = (x - PART_GAP + INSET - origin.x).max(2.0 * INSET);
        let mut block = ScriptElement::new(
            definition.shape.element_kind(),
            Rect::new(origin.x, origin.y, width, row_height + 2.0 * VERTICAL_PADDING),
        );
        block.color = category_color(&definition.category);
        block.children = children;
        block
    }
}

fn is_block_tag(tag: &str) -> bool {
    matches!(tag, "block" | "custom-block")
}

/// Spec with every input token collapsed, so `double %'n'` matches `double %n`
fn spec_key(spec: &str) -> String {
    spec.split_whitespace()
        .map(|token| if token.starts_with('%') { "%" } else { token })
        .collect::<Vec<_>>()
        .join(" ")
}

const PREDICATES: &[&str] = &[
    "reportTouchingObject",
    "reportTouchingColor",
    "reportColorIsTouchingColor",
    "reportKeyPressed",
    "reportMouseDown",
    "reportLessThan",
    "reportEquals",
    "reportGreaterThan",
    "reportVariadicLessThan",
    "reportVariadicEquals",
    "reportVariadicGreaterThan",
    "reportAnd",
    "reportOr",
    "reportVariadicAnd",
    "reportVariadicOr",
    "reportNot",
    "reportBoolean",
    "reportTrue",
    "reportFalse",
    "reportIsA",
    "reportIsIdentical",
    "reportListContainsItem",
    "reportListIsEmpty",
];

const GETTERS: &[&str] = &[
    "xPosition",
    "yPosition",
    "direction",
    "getScale",
    "getCostumeIdx",
    "getLastAnswer",
    "getTimer",
    "getPenDown",
];

fn primitive_shape(selector: &str) -> BlockShape {
    if PREDICATES.contains(&selector) {
        BlockShape::Predicate
    } else if selector.starts_with("report") || GETTERS.contains(&selector) {
        BlockShape::Reporter
    } else {
        BlockShape::Command
    }
}

fn selector_category(selector: &str) -> &'static str {
    match selector {
        "forward" | "turn" | "turnLeft" | "setHeading" | "doFaceTowards" | "gotoXY"
        | "doGotoObject" | "doGlide" | "changeXPosition" | "setXPosition"
        | "changeYPosition" | "setYPosition" | "bounceOffEdge" | "xPosition"
        | "yPosition" | "direction" => "motion",
        "doSayFor" | "bubble" | "doThinkFor" | "doThink" | "doSwitchToCostume"
        | "doWearNextCostume" | "getCostumeIdx" | "changeEffect" | "setEffect"
        | "clearEffects" | "changeScale" | "setScale" | "getScale" | "show" | "hide"
        | "goToLayer" | "goBack" => "looks",
        "playSound" | "doPlaySoundUntilDone" | "doStopAllSounds" | "doRest"
        | "doPlayNote" | "doSetTempo" | "doChangeTempo" => "sound",
        "clear" | "down" | "up" | "setColor" | "changeHue" | "setHue" | "changeSize"
        | "setSize" | "doStamp" | "floodFill" | "write" | "getPenDown" => "pen",
        "doSetVar" | "doChangeVar" | "doShowVar" | "doHideVar" | "doDeclareVariables" => {
            "variables"
        }
        "reportNewList" | "reportCONS" | "reportListItem" | "reportCDR"
        | "reportListLength" | "reportListContainsItem" | "reportListIsEmpty"
        | "doAddToList" | "doDeleteFromList" | "doInsertInList" | "doReplaceInList"
        | "reportMap" | "reportKeep" | "reportCombine" | "doForEach" | "reportNumbers" => {
            "lists"
        }
        "reportTouchingObject" | "reportTouchingColor" | "reportColorIsTouchingColor"
        | "doAsk" | "getLastAnswer" | "reportMouseX" | "reportMouseY" | "reportMouseDown"
        | "reportKeyPressed" | "reportDistanceTo" | "doResetTimer" | "getTimer"
        | "reportAttributeOf" | "reportDate" => "sensing",
        "createClone" | "removeClone" | "reportIfElse" | "evaluate" | "fork" => "control",
        s if s.starts_with("receive") || s.starts_with("do") => "control",
        s if s.starts_with("report") => "operators",
        _ => "other",
    }
}

/// Block color of a palette category
pub fn category_color(category: &str) -> u32 {
    match category {
        "motion" => rgb(74, 108, 212),
        "looks" => rgb(143, 86, 227),
        "sound" => rgb(207, 74, 217),
        "pen" => rgb(0, 161, 120),
        "control" => rgb(230, 168, 34),
        "sensing" => rgb(4, 148, 220),
        "operators" => rgb(98, 194, 19),
        "variables" => rgb(243, 118, 29),
        "lists" => rgb(217, 77, 17),
        _ => rgb(150, 150, 150),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_document;
    use crate::metrics::ApproxMetrics;
    use crate::script::AnchorAttr;
    use crate::theme::Theme;

    fn build(xml: &str) -> Script {
        let metrics = ApproxMetrics::default();
        let theme = Theme::default();
        let cx = LayoutCx::new(&metrics, &theme);
        let element = parse_document(xml).unwrap();
        OutlineScriptFactory::new().script(&element, cx).unwrap()
    }

    #[test]
    fn test_stack_nests_next_block() {
        let script = build(
            r#"<script><block s="forward"><l>10</l></block><block s="turn"><l>15</l></block></script>"#,
        );
        let first = &script.root;
        assert_eq!(first.kind, ElementKind::Command);
        assert_eq!(first.color, category_color("motion"));
        // label row is the argument height plus vertical padding
        assert_eq!(first.bounds.h, 20.0);
        let next = first.children.last().unwrap();
        assert_eq!(next.bounds.top(), 20.0);
        assert_eq!(script.full_bounds().h, 40.0);
        // "forward" + gap + "10" slot
        assert!((first.bounds.w - 79.4).abs() < 1e-9);
    }

    #[test]
    fn test_hat_and_anchor_tags() {
        let script = build(
            r#"<script><block s="receiveGo" annotation="1"/><block s="forward"><l annotation="2">10</l></block></script>"#,
        );
        assert_eq!(script.root.kind, ElementKind::Hat);
        let hat = script.find_anchor(AnchorAttr::Annotation, 1).unwrap();
        assert!(hat.is_top);
        let arg = script.find_anchor(AnchorAttr::Annotation, 2).unwrap();
        assert_eq!(arg.element.kind, ElementKind::Argument);
        assert_eq!(arg.element.label.as_deref(), Some("10"));
        assert!(!arg.is_top);
    }

    #[test]
    fn test_c_slot_wraps_nested_script() {
        let script = build(
            r#"<script><block s="doRepeat"><l>3</l><script><block s="forward"/></script></block></script>"#,
        );
        let repeat = &script.root;
        let nested = repeat.children.last().unwrap();
        assert_eq!(nested.bounds.origin(), Point::new(10.0, 20.0));
        assert_eq!(nested.bounds.h, 18.0);
        assert_eq!(repeat.bounds.h, 20.0 + 18.0 + 8.0);
    }

    #[test]
    fn test_nested_predicate() {
        let script = build(
            r#"<script><block s="doIf"><block s="reportLessThan"><l>1</l><l>2</l></block><script/></block></script>"#,
        );
        let predicate = script
            .root
            .children
            .iter()
            .find(|c| c.kind.is_block())
            .unwrap();
        assert_eq!(predicate.kind, ElementKind::Predicate);
        // empty C-slot keeps its minimum height
        assert!(script.root.bounds.h > predicate.bounds.h + 12.0);
    }

    #[test]
    fn test_custom_block_definition() {
        let metrics = ApproxMetrics::default();
        let theme = Theme::default();
        let cx = LayoutCx::new(&metrics, &theme);
        let blocks = parse_document(
            r#"<blocks><block-definition s="double %'n'" type="reporter" category="operators"><script><block s="doReport"><block var="n"/></block></script></block-definition></blocks>"#,
        )
        .unwrap();
        let mut factory = OutlineScriptFactory::new();
        factory.register_definitions(&blocks);
        assert_eq!(factory.definition_count(), 1);

        let script = factory.definition("double %'n'", cx).unwrap();
        assert_eq!(script.root.kind, ElementKind::Hat);
        let prototype = &script.root.children[0];
        assert_eq!(prototype.kind, ElementKind::Reporter);
        assert_eq!(prototype.children[1].label.as_deref(), Some("n"));
        let body = script.root.children.last().unwrap();
        assert_eq!(body.bounds.top(), script.root.bounds.bottom());

        let used = factory
            .script(
                &parse_document(r#"<custom-block s="double %n"><l>4</l></custom-block>"#).unwrap(),
                cx,
            )
            .unwrap();
        assert_eq!(used.root.kind, ElementKind::Reporter);
        assert_eq!(used.root.color, category_color("operators"));

        assert!(matches!(
            factory.definition("triple %'n'", cx),
            Err(LoadError::UnknownDefinition(_))
        ));
    }
}
