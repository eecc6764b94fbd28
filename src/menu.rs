// Dropdown menus shown in help diagrams
// A menu is built as a Script of kind Menu so diagrams can anchor
// annotations on its items exactly like on blocks.

use crate::color;
use crate::document::DocElement;
use crate::geometry::Rect;
use crate::node::LayoutCx;
use crate::script::{parse_id_list, ElementKind, Script, ScriptElement, ScriptKind};
use crate::translate::Translator;

const LINE_HEIGHT: f64 = 5.0;

enum Entry {
    Item {
        label: String,
        color: Option<u32>,
        annotation: Vec<u32>,
    },
    Line,
}

/// Build a menu from `<item>` and `<line>` children. Unless
/// `no_empty_option` is set the menu starts with an empty item.
pub fn build_menu(
    items: &[DocElement],
    no_empty_option: bool,
    translator: &dyn Translator,
    cx: LayoutCx<'_>,
) -> Script {
    let theme = cx.theme;
    let font = theme.menu_font();
    let padding = theme.menu_item_padding;

    let mut entries = Vec::new();
    if !no_empty_option {
        entries.push(Entry::Item {
            label: String::new(),
            color: None,
            annotation: Vec::new(),
        });
    }
    for item in items {
        match item.tag.as_str() {
            "line" => entries.push(Entry::Line),
            "item" => entries.push(Entry::Item {
                label: translator.translate(item.contents.trim()),
                color: item.attr("color").and_then(color::parse_color),
                annotation: item.attr("annotation").map(parse_id_list).unwrap_or_default(),
            }),
            other => log::debug!("ignoring <{other}> inside menu"),
        }
    }

    let item_height = cx.metrics.font_height(font.size) + padding;
    let width = entries
        .iter()
        .map(|entry| match entry {
            Entry::Item { label, .. } => cx.metrics.text_width(label, &font) + 2.0 * padding,
            Entry::Line => 0.0,
        })
        .fold(2.0 * padding, f64::max);

    let mut children = Vec::with_capacity(entries.len());
    let mut y = 0.0;
    for entry in entries {
        let element = match entry {
            Entry::Item {
                label,
                color,
                annotation,
            } => {
                let mut element =
                    ScriptElement::new(ElementKind::MenuItem, Rect::new(0.0, y, width, item_height));
                element.label = Some(label);
                element.color = color.unwrap_or(theme.menu_color);
                element.tags.annotation = annotation;
                element
            }
            Entry::Line => {
                let mut element =
                    ScriptElement::new(ElementKind::MenuLine, Rect::new(0.0, y, width, LINE_HEIGHT));
                element.color = theme.menu_text_color;
                element
            }
        };
        y += element.bounds.h;
        children.push(element);
    }

    let mut root = ScriptElement::new(ElementKind::Menu, Rect::new(0.0, 0.0, width, y));
    root.color = theme.menu_color;
    root.children = children;
    Script::new(ScriptKind::Menu, root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ApproxMetrics;
    use crate::script::AnchorAttr;
    use crate::theme::Theme;
    use std::collections::HashMap;

    fn items() -> Vec<DocElement> {
        vec![
            DocElement::new("item").with_contents("left"),
            DocElement::new("line"),
            DocElement::new("item")
                .with_contents("right")
                .with_attr("annotation", "2")
                .with_attr("color", "#ff0000"),
        ]
    }

    #[test]
    fn test_leading_empty_item() {
        let metrics = ApproxMetrics::default();
        let theme = Theme::default();
        let cx = LayoutCx::new(&metrics, &theme);
        let menu = build_menu(&items(), false, &HashMap::<String, String>::new(), cx);
        let kinds: Vec<ElementKind> = menu.root.children.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ElementKind::MenuItem,
                ElementKind::MenuItem,
                ElementKind::MenuLine,
                ElementKind::MenuItem,
            ]
        );
        assert_eq!(menu.root.children[0].label.as_deref(), Some(""));
        assert_eq!(menu.kind, ScriptKind::Menu);
    }

    #[test]
    fn test_items_share_widest_width() {
        let metrics = ApproxMetrics::default();
        let theme = Theme::default();
        let cx = LayoutCx::new(&metrics, &theme);
        let translations = HashMap::from([("right".to_string(), "rechts".to_string())]);
        let menu = build_menu(&items(), true, &translations, cx);
        // "rechts" at 12px: 6 * 7.2 + 2 * 4
        let widest = 6.0 * 7.2 + 8.0;
        assert!(menu
            .root
            .children
            .iter()
            .all(|c| (c.bounds.w - widest).abs() < 1e-9));
        assert_eq!(menu.root.children[2].label.as_deref(), Some("rechts"));
        // item, line, item
        let height = 2.0 * (14.4 + 4.0) + 5.0;
        assert!((menu.full_bounds().h - height).abs() < 1e-9);
    }

    #[test]
    fn test_item_tags_carry_through() {
        let metrics = ApproxMetrics::default();
        let theme = Theme::default();
        let cx = LayoutCx::new(&metrics, &theme);
        let menu = build_menu(&items(), true, &HashMap::<String, String>::new(), cx);
        let anchor = menu.find_anchor(AnchorAttr::Annotation, 2).unwrap();
        assert_eq!(anchor.element.label.as_deref(), Some("right"));
        assert_eq!(anchor.element.color, 0xFF0000FF);
        assert!(!anchor.is_top);
    }
}
