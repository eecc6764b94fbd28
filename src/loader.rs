// Help document loader
// Builds a HelpScreen from a parsed help document, lays it out, then fetches
// every image concurrently. Completion is reported exactly once: success
// after all images arrived, or the first failure.

use crate::alignment::{Alignment, Orientation};
use crate::bubble::BubbleValue;
use crate::color::{parse_color, BoxColor};
use crate::config::HelpConfig;
use crate::diagram::ScriptDiagram;
use crate::document::DocElement;
use crate::draw_context::TextMetrics;
use crate::error::{FetchError, LoadError};
use crate::help_box::HelpBox;
use crate::image::ImageNode;
use crate::menu::build_menu;
use crate::node::{AnnotationSpec, LayoutCx, LayoutNode, NodeKind};
use crate::outline::{OutlineScriptFactory, ScriptFactory};
use crate::paragraph::Paragraph;
use crate::placeholder::{parse_placeholders, resolve_reference, Segment};
use crate::resources::{ImageFetcher, LoadedImage, ResourceLocator};
use crate::rich_text::{RichText, TextRun};
use crate::screen::HelpScreen;
use crate::script::Script;
use crate::theme::Theme;
use crate::translate::Translator;
use futures::stream::{FuturesUnordered, StreamExt};
use std::path::PathBuf;

/// Resource category images are looked up in
const IMAGE_CATEGORY: &str = "help";

/// An image node waiting for its pixels
#[derive(Debug, Clone, PartialEq)]
pub struct PendingImage {
    pub slot: usize,
    pub src: String,
}

/// A laid-out screen whose images have not been fetched yet
pub struct BuiltScreen {
    pub screen: HelpScreen,
    pub images: Vec<PendingImage>,
}

/// What a single document element turns into
enum Loaded {
    Node(LayoutNode),
    Text {
        text: String,
        font: Option<String>,
        color: Option<u32>,
    },
    Bool(bool),
}

impl Loaded {
    fn into_run(self) -> TextRun {
        match self {
            Loaded::Node(node) => TextRun::Widget(node),
            Loaded::Text {
                text,
                font: None,
                color: None,
            } => TextRun::Plain(text),
            Loaded::Text { text, font, color } => TextRun::Styled { text, font, color },
            Loaded::Bool(value) => TextRun::Plain(value.to_string()),
        }
    }
}

/// Font family and color inherited by text further down the tree
#[derive(Debug, Clone)]
struct TextStyle {
    font: Option<String>,
    color: u32,
}

pub struct HelpLoader<'a, F = OutlineScriptFactory> {
    theme: &'a Theme,
    metrics: &'a dyn TextMetrics,
    translator: &'a dyn Translator,
    locator: ResourceLocator,
    supported_version: f64,
    factory: F,
    images: Vec<PendingImage>,
}

impl<'a> HelpLoader<'a, OutlineScriptFactory> {
    pub fn new(
        config: &'a HelpConfig,
        metrics: &'a dyn TextMetrics,
        translator: &'a dyn Translator,
    ) -> Self {
        Self::with_factory(config, metrics, translator, OutlineScriptFactory::new())
    }
}

impl<'a, F: ScriptFactory> HelpLoader<'a, F> {
    pub fn with_factory(
        config: &'a HelpConfig,
        metrics: &'a dyn TextMetrics,
        translator: &'a dyn Translator,
        factory: F,
    ) -> Self {
        HelpLoader {
            theme: &config.theme,
            metrics,
            translator,
            locator: ResourceLocator::new(
                config.resource_root.clone().unwrap_or_default(),
                &config.locale,
                &config.fallback_locale,
            ),
            supported_version: config.supported_version,
            factory,
            images: Vec::new(),
        }
    }

    fn cx(&self) -> LayoutCx<'a> {
        LayoutCx::new(self.metrics, self.theme)
    }

    /// Build and lay out the screen described by `doc`. Images are left
    /// pending; their slots are returned alongside the screen.
    pub fn build(&mut self, doc: &DocElement) -> Result<BuiltScreen, LoadError> {
        if let Some(found) = doc.number_attr("version") {
            if found > self.supported_version {
                return Err(LoadError::UnsupportedVersion {
                    found,
                    supported: self.supported_version,
                });
            }
        }

        self.images.clear();
        let no_blocks = DocElement::new("blocks");
        self.factory
            .register_definitions(doc.child_named("blocks").unwrap_or(&no_blocks));

        let mut screen = HelpScreen::new(self.theme);
        let style = TextStyle {
            font: None,
            color: self.theme.default_text_color,
        };
        for child in &doc.children {
            if matches!(child.tag.as_str(), "blocks" | "libraries") {
                continue;
            }
            match (child.tag.as_str(), self.element(child, &style)?) {
                ("thumbnail", Some(Loaded::Node(node))) => screen.thumbnail = Some(node),
                ("header" | "small-header", Some(Loaded::Node(node))) => screen.header = Some(node),
                (_, Some(Loaded::Node(node))) if node.is_box() => screen.children.push(node),
                (tag, Some(_)) => log::warn!("ignoring top-level <{tag}>, only boxes are stacked"),
                (_, None) => {}
            }
        }

        screen.fix_layout(self.cx());
        log::debug!(
            "built help screen {:.0}x{:.0} with {} pending images",
            screen.bounds.w,
            screen.bounds.h,
            self.images.len()
        );
        Ok(BuiltScreen {
            screen,
            images: std::mem::take(&mut self.images),
        })
    }

    /// Build the screen and fetch all of its images. Every fetch is driven
    /// to completion; the first failure is the one reported.
    pub async fn load<I: ImageFetcher>(
        &mut self,
        doc: &DocElement,
        fetcher: &I,
    ) -> Result<HelpScreen, LoadError> {
        let BuiltScreen { mut screen, images } = self.build(doc)?;

        let mut pending: FuturesUnordered<_> = images
            .iter()
            .map(|image| {
                let candidates = self.locator.candidates(IMAGE_CATEGORY, &image.src);
                fetch_image(fetcher, image, candidates)
            })
            .collect();

        let mut loaded = Vec::with_capacity(images.len());
        let mut first_error = None;
        while let Some(result) = pending.next().await {
            match result {
                Ok(image) => loaded.push(image),
                Err(err) if first_error.is_none() => first_error = Some(err),
                Err(err) => log::debug!("additional image failure: {err}"),
            }
        }
        if let Some(err) = first_error {
            return Err(err);
        }

        let cx = self.cx();
        for (slot, image) in loaded {
            if !screen.image_loaded(slot, &image.location, cx) {
                log::debug!("no image node for slot {slot}");
            }
        }
        log::info!("help screen ready, {} images loaded", images.len());
        Ok(screen)
    }

    /// Blocking variant of [`HelpLoader::load`]. `callback` runs exactly
    /// once with the finished screen or the error.
    pub fn load_with_callback<I, C>(&mut self, doc: &DocElement, fetcher: &I, callback: C)
    where
        I: ImageFetcher,
        C: FnOnce(Result<HelpScreen, LoadError>),
    {
        callback(futures::executor::block_on(self.load(doc, fetcher)));
    }

    fn element(
        &mut self,
        element: &DocElement,
        style: &TextStyle,
    ) -> Result<Option<Loaded>, LoadError> {
        let cx = self.cx();
        let mut style = style.clone();
        let kind = match element.tag.as_str() {
            "block-definition" | "script" => {
                // lone scripts get a diagram of their own so they can be scaled
                let script = self.script(element, cx)?;
                NodeKind::Diagram(Box::new(ScriptDiagram::new(
                    script,
                    Vec::new(),
                    Vec::new(),
                    Vec::new(),
                    style.color,
                    cx,
                )))
            }
            "bool" => return Ok(Some(Loaded::Bool(element.contents.trim() == "true"))),
            "box" => {
                let color = BoxColor::from_name(element.attr("color"));
                style.color = color.text_color();
                NodeKind::Box(HelpBox::new(color, false))
            }
            "thumbnail" => NodeKind::Box(HelpBox::new(BoxColor::Blue, true)),
            "column" => NodeKind::Alignment(Alignment::new(
                Orientation::Column,
                self.theme.vertical_padding,
            )),
            "row" => NodeKind::Alignment(Alignment::new(Orientation::Row, self.theme.padding)),
            "diagram" => NodeKind::Diagram(Box::new(self.diagram(element, &style)?)),
            "img" => {
                let src = element.attr("src").unwrap_or_default();
                let slot = self.images.len();
                self.images.push(PendingImage {
                    slot,
                    src: src.to_string(),
                });
                NodeKind::Image(ImageNode::new(
                    slot,
                    src,
                    element.number_attr("width").unwrap_or(0.0),
                    element.number_attr("height").unwrap_or(0.0),
                ))
            }
            "menu" => NodeKind::Menu(build_menu(
                &element.children,
                truthy(element, "no-empty-option"),
                self.translator,
                cx,
            )),
            "header" | "small-header" | "p" | "small-p" | "i" | "small-i" => {
                self.text_block(element, &mut style)?
            }
            "text" => {
                return Ok(Some(Loaded::Text {
                    text: self.literal(element),
                    font: element.attr("font").map(str::to_string),
                    color: element.attr("color").and_then(parse_color),
                }));
            }
            other => {
                log::debug!("ignoring unknown element <{other}>");
                return Ok(None);
            }
        };

        let mut node = LayoutNode::new(kind);
        if matches!(
            node.kind,
            NodeKind::Alignment(_)
                | NodeKind::Box(_)
                | NodeKind::Diagram(_)
                | NodeKind::Paragraph(_)
                | NodeKind::RichText(_)
        ) {
            node.relative_width = Some(relative_width(element, &mut node, cx));
        }
        if let NodeKind::Alignment(alignment) = &mut node.kind {
            if let Some(padding) = element.number_attr("padding") {
                alignment.padding = padding;
            }
        }
        node.shift.x = element.number_attr("x").unwrap_or(0.0);
        node.shift.y = element.number_attr("y").unwrap_or(0.0);

        if matches!(node.kind, NodeKind::Box(_) | NodeKind::Alignment(_)) {
            for child in &element.children {
                let Some(loaded) = self.element(child, &style)? else {
                    continue;
                };
                let Loaded::Node(child_node) = loaded else {
                    log::debug!("<{}> inside <{}> is not a node", child.tag, element.tag);
                    continue;
                };
                match &mut node.kind {
                    NodeKind::Box(b) => b.children.push(child_node),
                    NodeKind::Alignment(a) => a.children.push(child_node),
                    _ => {}
                }
            }
        }
        Ok(Some(Loaded::Node(node)))
    }

    fn script(&self, source: &DocElement, cx: LayoutCx<'_>) -> Result<Script, LoadError> {
        let mut script = match source.tag.as_str() {
            "menu" => {
                return Ok(build_menu(
                    &source.children,
                    truthy(source, "no-empty-option"),
                    self.translator,
                    cx,
                ));
            }
            "block-definition" => self
                .factory
                .definition(source.attr("s").unwrap_or_default(), cx)?,
            _ => self.factory.script(source, cx)?,
        };
        if let Some(scale) = source.number_attr("scale") {
            script.scale = scale;
        }
        Ok(script)
    }

    fn diagram(
        &mut self,
        element: &DocElement,
        style: &TextStyle,
    ) -> Result<ScriptDiagram, LoadError> {
        let cx = self.cx();
        let source = match element
            .child_named("block-definition")
            .or_else(|| element.child_named("menu"))
        {
            Some(source) => source,
            None => element.require("script")?,
        };
        let script = self.script(source, cx)?;

        // every child keeps its slot, ids are positional
        let mut annotations = Vec::new();
        for child in section(element, "annotations") {
            annotations.push(match self.element(child, style)? {
                Some(Loaded::Node(mut node)) => {
                    node.annotation = Some(annotation_spec(child));
                    Some(node)
                }
                _ => {
                    log::debug!("annotation <{}> is not a node, skipping", child.tag);
                    None
                }
            });
        }

        let mut menus = Vec::new();
        for child in section(element, "menus") {
            menus.push(match self.element(child, style)? {
                Some(Loaded::Node(LayoutNode {
                    kind: NodeKind::Menu(menu),
                    ..
                })) => Some(menu),
                _ => {
                    log::debug!("<{}> in <menus> is not a menu, skipping", child.tag);
                    None
                }
            });
        }

        let mut bubbles = Vec::new();
        for child in section(element, "bubbles") {
            bubbles.push(match self.element(child, style)? {
                Some(Loaded::Node(node)) => Some(BubbleValue::Node(Box::new(node))),
                Some(Loaded::Bool(value)) => Some(BubbleValue::Bool(value)),
                Some(Loaded::Text { text, .. }) => Some(BubbleValue::Text(text)),
                None => {
                    log::debug!("empty bubble <{}>", child.tag);
                    None
                }
            });
        }

        Ok(ScriptDiagram::new(
            script,
            annotations,
            menus,
            bubbles,
            style.color,
            cx,
        ))
    }

    fn text_block(
        &mut self,
        element: &DocElement,
        style: &mut TextStyle,
    ) -> Result<NodeKind, LoadError> {
        if let Some(value) = element.attr("color") {
            match parse_color(value) {
                Some(color) => style.color = color,
                None => log::warn!("unknown color '{value}' on <{}>", element.tag),
            }
        }
        if let Some(font) = element.attr("font") {
            style.font = Some(font.to_string());
        }

        let tag = element.tag.as_str();
        let font = self.theme.text_font(
            style.font.as_deref(),
            tag.starts_with("small-"),
            matches!(tag, "header" | "small-header"),
            matches!(tag, "i" | "small-i"),
        );

        if element.children.is_empty() {
            let text = self.literal(element);
            return Ok(NodeKind::Paragraph(Paragraph::new(
                &text,
                font,
                style.color,
                self.metrics,
            )));
        }

        let runs = match element.attr("id") {
            Some(id) => self.translate_rich(element, id, style)?,
            None => {
                let mut runs = Vec::with_capacity(element.children.len());
                for child in &element.children {
                    if let Some(loaded) = self.element(child, style)? {
                        runs.push(loaded.into_run());
                    }
                }
                runs
            }
        };
        Ok(NodeKind::RichText(RichText::new(
            runs,
            font,
            style.color,
            self.metrics,
        )))
    }

    /// Translated text for elements with an id, normalized contents otherwise
    fn literal(&self, element: &DocElement) -> String {
        match element.attr("id") {
            Some(id) => self.translator.translate(id),
            None => normalize_whitespace(&element.contents),
        }
    }

    /// Substitute `{N}` / `{name}` in the translation of `id` with the
    /// element's children
    fn translate_rich(
        &mut self,
        element: &DocElement,
        id: &str,
        style: &TextStyle,
    ) -> Result<Vec<TextRun>, LoadError> {
        let translation = self.translator.translate(id);
        let segments = parse_placeholders(&translation).map_err(|source| LoadError::Placeholder {
            id: id.to_string(),
            source,
        })?;

        let mut runs = Vec::with_capacity(segments.len());
        for segment in segments {
            match segment {
                Segment::Text(text) => runs.push(TextRun::Plain(text)),
                Segment::Ref(name) => {
                    let index = resolve_reference(&name, element.children.len(), |i| {
                        element.children[i].attr("id").map(str::to_string)
                    });
                    match index {
                        Some(i) => {
                            if let Some(loaded) = self.element(&element.children[i], style)? {
                                runs.push(loaded.into_run());
                            }
                        }
                        None => runs.push(TextRun::Plain(format!("{{{name}}}"))),
                    }
                }
            }
        }
        Ok(runs)
    }
}

async fn fetch_image<I: ImageFetcher>(
    fetcher: &I,
    image: &PendingImage,
    candidates: Vec<PathBuf>,
) -> Result<(usize, LoadedImage), LoadError> {
    let mut last_error = None;
    for location in candidates {
        match fetcher.fetch(location).await {
            Ok(loaded) => return Ok((image.slot, loaded)),
            Err(err) => {
                log::debug!("image {} not available: {err}", image.src);
                last_error = Some(err);
            }
        }
    }
    Err(LoadError::Image {
        src: image.src.clone(),
        source: last_error.unwrap_or_else(|| FetchError::NotFound(PathBuf::from(&image.src))),
    })
}

/// Trim, collapse whitespace runs to one space, and turn a literal `\n`
/// together with the spaces around it into a line break
pub fn normalize_whitespace(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .split("\\n")
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
}

fn truthy(element: &DocElement, key: &str) -> bool {
    element.attr(key).is_some_and(|v| v != "false")
}

fn section<'e>(element: &'e DocElement, tag: &str) -> &'e [DocElement] {
    element
        .child_named(tag)
        .map_or(&[][..], |section| section.children.as_slice())
}

fn annotation_spec(element: &DocElement) -> AnnotationSpec {
    AnnotationSpec {
        reverse: truthy(element, "arrow-reverse"),
        detour: element.number_attr("arrow-detour").unwrap_or(0.0),
        horizontal: element.flag_attr("arrow-horizontal"),
        color: element.attr("arrow-color").and_then(parse_color),
    }
}

/// Width sharing weight for a sized node; an explicit `width` also sets it
fn relative_width(element: &DocElement, node: &mut LayoutNode, cx: LayoutCx<'_>) -> f64 {
    if let Some(width) = element.number_attr("width") {
        node.set_width(width, cx);
        return 0.0;
    }
    if let Some(value) = element.attr("rel-width") {
        return value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|w| *w != 0.0 && w.is_finite())
            .unwrap_or(1.0);
    }
    match &node.kind {
        NodeKind::Diagram(d) if !d.has_annotations() => 0.0,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color;
    use crate::document::parse_document;
    use crate::metrics::ApproxMetrics;
    use crate::rich_text::Word;
    use std::cell::Cell;
    use std::collections::{HashMap, HashSet};
    use std::future::Future;

    /// Serves a fixed set of paths
    struct MapFetcher {
        files: HashSet<PathBuf>,
    }

    impl MapFetcher {
        fn new(paths: &[&str]) -> Self {
            MapFetcher {
                files: paths.iter().map(PathBuf::from).collect(),
            }
        }
    }

    impl ImageFetcher for MapFetcher {
        fn fetch(&self, location: PathBuf) -> impl Future<Output = Result<LoadedImage, FetchError>> {
            let result = if self.files.contains(&location) {
                Ok(LoadedImage {
                    location,
                    data: vec![0x89, b'P', b'N', b'G'],
                })
            } else {
                Err(FetchError::NotFound(location))
            };
            futures::future::ready(result)
        }
    }

    fn config() -> HelpConfig {
        HelpConfig {
            locale: "de".to_string(),
            resource_root: Some(PathBuf::from("/res")),
            ..HelpConfig::default()
        }
    }

    fn build(xml: &str, translations: &HashMap<String, String>) -> Result<BuiltScreen, LoadError> {
        let config = config();
        let metrics = ApproxMetrics::default();
        let doc = parse_document(xml)?;
        HelpLoader::new(&config, &metrics, translations).build(&doc)
    }

    fn no_translations() -> HashMap<String, String> {
        HashMap::new()
    }

    fn first_box_child(screen: &HelpScreen) -> &LayoutNode {
        screen.children[0].children().next().unwrap()
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \t b  \n c "), "a b c");
        assert_eq!(normalize_whitespace("first \\n  second"), "first\nsecond");
        assert_eq!(normalize_whitespace(""), "");
    }

    #[test]
    fn test_newer_version_is_rejected() {
        let result = build(r#"<help version="3"/>"#, &no_translations());
        assert!(matches!(
            result,
            Err(LoadError::UnsupportedVersion { found, .. }) if found == 3.0
        ));
        assert!(build("<help/>", &no_translations()).is_ok());
    }

    #[test]
    fn test_text_tags_and_box_colors() {
        let built = build(
            r#"<help>
                <header>Title</header>
                <box color="blue"><p>dark</p></box>
                <box><small-i color="red">light</small-i></box>
            </help>"#,
            &no_translations(),
        )
        .unwrap();
        let screen = built.screen;

        let Some(NodeKind::Paragraph(header)) = screen.header.as_ref().map(|h| &h.kind) else {
            panic!("header should be a paragraph");
        };
        assert!(header.font.bold);
        assert_eq!(header.font.size, 20);

        let NodeKind::Paragraph(dark) = &first_box_child(&screen).kind else {
            panic!("expected paragraph");
        };
        assert_eq!(dark.color, color::BLACK);

        let light = screen.children[1].children().next().unwrap();
        let NodeKind::Paragraph(light) = &light.kind else {
            panic!("expected paragraph");
        };
        assert_eq!(light.font.size, 16);
        assert!(light.font.italic);
        assert_eq!(light.color, color::rgb(255, 0, 0));
    }

    #[test]
    fn test_top_level_non_boxes_are_dropped() {
        let built = build("<help><p>stray</p><box/></help>", &no_translations()).unwrap();
        assert_eq!(built.screen.children.len(), 1);
        assert!(built.screen.children[0].is_box());
    }

    #[test]
    fn test_relative_width_defaults() {
        let built = build(
            r#"<help><box><row>
                <column rel-width="2"/>
                <column width="100"><p>x</p></column>
                <column rel-width="wide"/>
                <script><block s="forward"/></script>
                <column/>
            </row></box></help>"#,
            &no_translations(),
        )
        .unwrap();
        let row = first_box_child(&built.screen);
        let weights: Vec<Option<f64>> = row.children().map(|c| c.relative_width).collect();
        assert_eq!(
            weights,
            vec![Some(2.0), Some(0.0), Some(1.0), Some(0.0), Some(1.0)]
        );
        assert_eq!(row.children().nth(1).unwrap().width(), 100.0);
        assert_eq!(row.children().nth(3).unwrap().kind_name(), "diagram");
    }

    #[test]
    fn test_rich_translation_substitutes_children() {
        let translations = HashMap::from([(
            "drag".to_string(),
            "Drag {1} onto {missing}.".to_string(),
        )]);
        let built = build(
            r#"<help><box><p id="drag"><text>this</text></p></box></help>"#,
            &translations,
        )
        .unwrap();
        let NodeKind::RichText(rich) = &first_box_child(&built.screen).kind else {
            panic!("expected rich text");
        };
        let words: Vec<String> = rich
            .lines()
            .iter()
            .flatten()
            .filter_map(|w| match w {
                Word::Text { text, .. } => Some(text.trim().to_string()),
                Word::Widget(_) => None,
            })
            .filter(|w| !w.is_empty())
            .collect();
        assert_eq!(words, vec!["Drag", "this", "onto", "{missing}", "."]);
    }

    #[test]
    fn test_malformed_translation_is_fatal() {
        let translations = HashMap::from([("bad".to_string(), "oops {1".to_string())]);
        let result = build(
            r#"<help><box><p id="bad"><text>x</text></p></box></help>"#,
            &translations,
        );
        assert!(matches!(result, Err(LoadError::Placeholder { id, .. }) if id == "bad"));
    }

    #[test]
    fn test_unknown_definition_is_fatal() {
        let result = build(
            r#"<help><box><block-definition s="nothing %n"/></box></help>"#,
            &no_translations(),
        );
        assert!(matches!(result, Err(LoadError::UnknownDefinition(_))));
    }

    #[test]
    fn test_diagram_requires_script() {
        let result = build(r#"<help><box><diagram/></box></help>"#, &no_translations());
        assert!(matches!(
            result,
            Err(LoadError::MissingElement { parent, tag }) if parent == "diagram" && tag == "script"
        ));
    }

    #[test]
    fn test_diagram_overlays() {
        let built = build(
            r#"<help><box><diagram>
                <script><block s="forward" annotation="1" bubble="1"><l>10</l></block></script>
                <annotations><small-p arrow-reverse="true" arrow-detour="20">moves</small-p></annotations>
                <bubbles><bool>true</bool></bubbles>
            </diagram></box></help>"#,
            &no_translations(),
        )
        .unwrap();
        let node = first_box_child(&built.screen);
        let NodeKind::Diagram(diagram) = &node.kind else {
            panic!("expected diagram");
        };
        assert_eq!(node.relative_width, Some(1.0));
        let spec = diagram.annotations().next().unwrap().annotation.clone().unwrap();
        assert!(spec.reverse);
        assert_eq!(spec.detour, 20.0);
        assert!(!spec.horizontal);
        assert_eq!(diagram.arrows().len(), 1);
        assert!(diagram.width_no_bubble() < diagram.width_no_annotations());
    }

    #[test]
    fn test_skipped_annotation_keeps_later_ids() {
        let built = build(
            r#"<help><box><diagram>
                <script><block s="forward" annotation="2"><l>10</l></block></script>
                <annotations><text>first</text><p>second</p></annotations>
            </diagram></box></help>"#,
            &no_translations(),
        )
        .unwrap();
        let node = first_box_child(&built.screen);
        let NodeKind::Diagram(diagram) = &node.kind else {
            panic!("expected diagram");
        };
        assert_eq!(diagram.annotations().count(), 1);
        assert_eq!(diagram.placed_annotations().count(), 1);
        assert_eq!(diagram.arrows().len(), 1);
    }

    #[test]
    fn test_images_get_distinct_slots() {
        let built = build(
            r#"<help><thumbnail><img src="a.png" width="40" height="40"/></thumbnail>
               <box><row><img src="b.png" width="10" height="10"/><img src="c.png" width="10" height="10"/></row></box></help>"#,
            &no_translations(),
        )
        .unwrap();
        let slots: Vec<(usize, &str)> = built
            .images
            .iter()
            .map(|i| (i.slot, i.src.as_str()))
            .collect();
        assert_eq!(slots, vec![(0, "a.png"), (1, "b.png"), (2, "c.png")]);
    }

    const THREE_IMAGES: &str = r#"<help>
        <thumbnail><img src="a.png" width="40" height="40"/></thumbnail>
        <box><p><img src="b.png" width="10" height="10"/></p><img src="c.png" width="10" height="10"/></box>
    </help>"#;

    #[test]
    fn test_load_waits_for_every_image() {
        let config = config();
        let metrics = ApproxMetrics::default();
        let translations = no_translations();
        let doc = parse_document(THREE_IMAGES).unwrap();
        // b.png only exists for the fallback locale
        let fetcher = MapFetcher::new(&[
            "/res/help/de/a.png",
            "/res/help/en/b.png",
            "/res/help/de/c.png",
        ]);
        let mut loader = HelpLoader::new(&config, &metrics, &translations);
        let screen = futures::executor::block_on(loader.load(&doc, &fetcher)).unwrap();

        let mut svg = crate::svg::SvgDrawContext::new(screen.bounds.w, screen.bounds.h);
        screen.render(&mut svg, &config.theme);
        let out = svg.finish();
        assert!(out.contains("/res/help/de/a.png"));
        assert!(out.contains("/res/help/en/b.png"));
        assert!(out.contains("/res/help/de/c.png"));
    }

    #[test]
    fn test_failed_image_reports_once() {
        let config = config();
        let metrics = ApproxMetrics::default();
        let translations = no_translations();
        let doc = parse_document(THREE_IMAGES).unwrap();
        let fetcher = MapFetcher::new(&["/res/help/de/a.png"]);
        let mut loader = HelpLoader::new(&config, &metrics, &translations);

        let calls = Cell::new(0);
        let mut outcome = None;
        loader.load_with_callback(&doc, &fetcher, |result| {
            calls.set(calls.get() + 1);
            outcome = Some(result);
        });
        assert_eq!(calls.get(), 1);
        let Some(Err(LoadError::Image { src, source })) = outcome else {
            panic!("expected an image error");
        };
        assert!(src == "b.png" || src == "c.png");
        assert!(matches!(source, FetchError::NotFound(path) if path.starts_with("/res/help")));
    }

    #[test]
    fn test_rebuild_gives_same_layout() {
        let config = config();
        let metrics = ApproxMetrics::default();
        let translations = no_translations();
        let doc = parse_document(
            r#"<help><header>Again</header><box><row><p>left side</p><p rel-width="2">right side text</p></row></box></help>"#,
        )
        .unwrap();
        let mut loader = HelpLoader::new(&config, &metrics, &translations);
        let first = loader.build(&doc).unwrap().screen.describe();
        let second = loader.build(&doc).unwrap().screen.describe();
        assert_eq!(first, second);
    }
}
