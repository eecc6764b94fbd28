// Script diagrams
// A diagram composites a script with its bubbles and menus into a recorded
// picture once, then places annotation callouts to its right and connects
// them to their anchors with arrows on every layout pass.
//
// Script, bubbles and menus live in container coordinates with the origin at
// the diagram's top left corner (unscaled). Annotations and arrows are laid
// out in absolute coordinates like every other node.

use crate::arrow::DiagramArrow;
use crate::bubble::{Bubble, BubbleValue};
use crate::draw_context::DrawContext;
use crate::geometry::{Point, Rect};
use crate::node::{LayoutCx, LayoutNode};
use crate::picture::{Picture, Recorder};
use crate::script::{Anchor, AnchorAttr, PaintOptions, Script};
use crate::theme::Theme;
use std::path::Path;

pub struct ScriptDiagram {
    pub bounds: Rect,
    script: Script,
    bubbles: Vec<Bubble>,
    menus: Vec<Script>,
    /// One slot per declared annotation; slot `i` answers to id `i + 1`
    annotations: Vec<Option<LayoutNode>>,
    /// Indices of the annotations placed by the last layout pass
    placed: Vec<usize>,
    arrows: Vec<DiagramArrow>,
    default_arrow_color: u32,
    scale: f64,
    width_no_bubble: f64,
    width_no_annotations: f64,
    height_no_annotations: f64,
    picture: Picture,
}

impl ScriptDiagram {
    pub fn new(
        script: Script,
        annotations: Vec<Option<LayoutNode>>,
        menus: Vec<Option<Script>>,
        bubbles: Vec<Option<BubbleValue>>,
        default_arrow_color: u32,
        cx: LayoutCx<'_>,
    ) -> Self {
        let scale = if script.scale > 0.0 { script.scale } else { 1.0 };
        let mut diagram = ScriptDiagram {
            bounds: Rect::default(),
            script,
            bubbles: Vec::new(),
            menus: Vec::new(),
            annotations,
            placed: Vec::new(),
            arrows: Vec::new(),
            default_arrow_color,
            scale,
            width_no_bubble: 0.0,
            width_no_annotations: 0.0,
            height_no_annotations: 0.0,
            picture: Picture::default(),
        };
        for annotation in diagram.annotations_mut().filter(|a| !a.is_text()) {
            annotation.fix_layout(cx);
        }
        diagram.populate(menus, bubbles, cx);
        diagram
    }

    fn populate(
        &mut self,
        menus: Vec<Option<Script>>,
        bubbles: Vec<Option<BubbleValue>>,
        cx: LayoutCx<'_>,
    ) {
        let theme = cx.theme;
        self.script.set_position(Point::ZERO);
        let script_height = self.script.full_bounds().h;
        let mut display = self.script.full_bounds().extent();
        self.width_no_bubble = display.x;

        for (i, value) in bubbles.into_iter().enumerate() {
            let id = i as u32 + 1;
            let Some(value) = value else {
                continue;
            };
            if self.script.find_anchor(AnchorAttr::Bubble, id).is_none() {
                log::debug!("no anchor for bubble {id}, skipping");
                continue;
            }
            let mut bubble = Bubble::new(value, cx);
            let left = self.script.root.bounds.right() + 2.0;
            bubble.set_position(Point::new(left, 2.0), theme);
            let top = self.script.full_bounds().top();
            if !self.has_annotations() {
                self.script
                    .set_top(top.max(bubble.bounds.bottom() - script_height / 2.0));
            } else {
                // leave the space beside the script to the annotations
                self.script.set_top(top.max(bubble.bounds.bottom()));
            }
            display.x = display.x.max(bubble.bounds.right());
            display.y = display.y.max(self.script.full_bounds().bottom());
            self.bubbles.push(bubble);
        }

        for (i, menu) in menus.into_iter().enumerate() {
            let id = i as u32 + 1;
            let Some(mut menu) = menu else {
                continue;
            };
            let Some(anchor) = self.find_anchor(AnchorAttr::Menu, id) else {
                log::debug!("no anchor for menu {id}, skipping");
                continue;
            };
            let offset = Point::new(theme.menu_offset_x, theme.menu_offset_y);
            let position = anchor.element.bounds.right_center() + offset;
            menu.set_position(position);
            let extent = menu.full_bounds();
            self.width_no_bubble = self.width_no_bubble.max(extent.right());
            display.x = display.x.max(extent.right());
            display.y = display.y.max(extent.bottom());
            self.menus.push(menu);
        }

        let container = Point::new(display.x.ceil(), display.y.ceil());
        self.width_no_bubble *= self.scale;
        self.width_no_annotations = (container.x * self.scale).ceil();
        self.height_no_annotations = (container.y * self.scale).ceil();
        self.bounds.w = self.width_no_annotations;
        self.bounds.h = self.height_no_annotations;
        self.record(container, cx);
    }

    fn record(&mut self, extent: Point, cx: LayoutCx<'_>) {
        let options = PaintOptions {
            blurred_shadows: false,
            alpha: 1.0,
        };
        let mut recorder = Recorder::new(cx.metrics);
        self.script.paint(&mut recorder, cx.theme, options);
        for bubble in &self.bubbles {
            bubble.render(&mut recorder, cx.theme);
        }
        for menu in &self.menus {
            menu.paint(&mut recorder, cx.theme, options);
        }
        self.picture = recorder.finish(extent);
    }

    /// Re-composite the script picture, e.g. after a bubble image loaded
    pub fn refresh_picture(&mut self, cx: LayoutCx<'_>) {
        let extent = self.picture.extent();
        self.record(extent, cx);
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn picture(&self) -> &Picture {
        &self.picture
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn width_no_bubble(&self) -> f64 {
        self.width_no_bubble
    }

    pub fn width_no_annotations(&self) -> f64 {
        self.width_no_annotations
    }

    pub fn height_no_annotations(&self) -> f64 {
        self.height_no_annotations
    }

    pub fn annotations(&self) -> impl Iterator<Item = &LayoutNode> {
        self.annotations.iter().flatten()
    }

    pub fn annotations_mut(&mut self) -> impl Iterator<Item = &mut LayoutNode> {
        self.annotations.iter_mut().flatten()
    }

    pub fn has_annotations(&self) -> bool {
        self.annotations.iter().any(Option::is_some)
    }

    /// Annotations that found their anchor in the last layout pass
    pub fn placed_annotations(&self) -> impl Iterator<Item = &LayoutNode> {
        self.placed
            .iter()
            .filter_map(|&i| self.annotations[i].as_ref())
    }

    pub fn arrows(&self) -> &[DiagramArrow] {
        &self.arrows
    }

    /// First element tagged with `id`, searching the script, then the menus
    pub fn find_anchor(&self, attr: AnchorAttr, id: u32) -> Option<Anchor<'_>> {
        self.script
            .find_anchor(attr, id)
            .or_else(|| self.menus.iter().find_map(|menu| menu.find_anchor(attr, id)))
    }

    pub fn fix_layout(&mut self, cx: LayoutCx<'_>) {
        self.arrows.clear();
        self.placed.clear();
        let annotations_height = self.add_annotations(cx);
        self.bounds.h = annotations_height.max(self.height_no_annotations);
    }

    /// Place all annotations and explicit arrows; returns the height they
    /// reach below the diagram's top
    fn add_annotations(&mut self, cx: LayoutCx<'_>) -> f64 {
        let origin = self.bounds.origin();
        let mut min_top = origin.y + self.script.full_bounds().top() * self.scale;
        let mut annotations_height: f64 = 0.0;

        let horizontal: Vec<usize> = self
            .annotations
            .iter()
            .enumerate()
            .filter(|(_, a)| {
                a.as_ref()
                    .and_then(|a| a.annotation.as_ref())
                    .is_some_and(|spec| spec.horizontal)
            })
            .map(|(i, _)| i)
            .collect();

        // each horizontal arrow closes a chain laid out bottom to top, so the
        // chain's callouts stack upwards from the horizontal one
        let mut next = 0;
        for chain_end in horizontal {
            let chain_min_top = min_top;
            let mut max_bottom = None;
            for i in (next..=chain_end).rev() {
                if let Some(placed) = self.add_annotation(i, chain_min_top, max_bottom, cx) {
                    min_top = min_top.max(placed.bottom());
                    max_bottom = Some(placed.top());
                    annotations_height = annotations_height.max(placed.bottom() - origin.y);
                }
            }
            next = chain_end + 1;
        }
        for i in next..self.annotations.len() {
            if let Some(placed) = self.add_annotation(i, min_top, None, cx) {
                min_top = placed.bottom();
                annotations_height = annotations_height.max(placed.bottom() - origin.y);
            }
        }

        let padding = cx.theme.diagram_padding;
        let mut id = 1;
        while let Some(start) = self.find_anchor(AnchorAttr::ArrowStart, id) {
            let Some(end) = self.find_anchor(AnchorAttr::ArrowEnd, id) else {
                log::debug!("arrow {id} has a start but no end, skipping");
                id += 1;
                continue;
            };
            let from = origin + start.element.bounds.center() * self.scale;
            let mut to = origin + end.element.bounds.center() * self.scale;
            let sharing = &end.element.tags.arrow_end;
            if sharing.len() > 1 {
                // spread arrows that share one end into lanes
                let lanes = sharing.len() as f64;
                let lane = sharing.iter().position(|&other| other == id).unwrap_or(0) as f64;
                to.x += padding * (1.0 - lanes) / 2.0 + padding * lane;
            }
            let tags = &start.element.tags;
            let mut arrow = DiagramArrow::new(
                from,
                to,
                true,
                tags.arrow_reverse,
                tags.arrow_detour,
                tags.arrow_color.unwrap_or(self.default_arrow_color),
                cx.theme,
            );
            arrow.fix_layout();
            annotations_height = annotations_height.max(arrow.bounds.bottom() - origin.y);
            self.arrows.push(arrow);
            id += 1;
        }

        annotations_height
    }

    /// Place annotation `index` next to its anchor and add its arrow.
    /// Returns the annotation's bounds, or `None` for an empty slot or a missing anchor.
    fn add_annotation(
        &mut self,
        index: usize,
        min_top: f64,
        max_bottom: Option<f64>,
        cx: LayoutCx<'_>,
    ) -> Option<Rect> {
        let theme = cx.theme;
        let origin = self.bounds.origin();
        let padding = theme.diagram_padding;
        let annotation_x = origin.x + self.width_no_bubble + theme.diagram_margin;
        let annotation_width = (self.bounds.right() - annotation_x).max(0.0);
        let id = index as u32 + 1;
        let spec = self.annotations[index]
            .as_ref()?
            .annotation
            .clone()
            .unwrap_or_default();

        let Some(anchor) = self.find_anchor(AnchorAttr::Annotation, id) else {
            log::debug!("no anchor for annotation {id}, skipping");
            return None;
        };
        let element = anchor.element;
        let local = if spec.detour > 0.0 {
            element.bounds.center()
        } else if element.kind.is_command_shaped() || anchor.is_top {
            Point::new(element.bounds.right() + padding, element.label_center_y())
        } else if id == 1 {
            Point::new(element.bounds.right(), element.bounds.center().y)
        } else {
            element.bounds.bottom_center()
        };
        let arrow_end = origin + local * self.scale;

        let annotation = self.annotations[index].as_mut()?;
        if annotation.is_text() {
            annotation.set_width(annotation_width, cx);
        }
        let line_height = annotation.first_line_height(cx.metrics);
        annotation.set_position(Point::new(annotation_x, arrow_end.y - line_height / 2.0));
        if !spec.horizontal {
            let top = annotation.top();
            // tiny nudges would only put a kink in the arrow
            if top < min_top && min_top - top > theme.min_annotation_adjustment {
                annotation.set_top(min_top);
            }
            if let Some(max_bottom) = max_bottom {
                annotation.set_bottom(max_bottom.min(annotation.bottom()));
            }
        }

        let arrow_start = Point::new(annotation.left() - padding, annotation.top() + line_height / 2.0);
        let mut arrow = DiagramArrow::new(
            arrow_start,
            arrow_end,
            false,
            spec.reverse,
            spec.detour,
            spec.color.unwrap_or(self.default_arrow_color),
            theme,
        );
        arrow.fix_layout();
        let placed = annotation.bounds();
        self.arrows.push(arrow);
        self.placed.push(index);
        Some(placed)
    }

    pub fn move_by(&mut self, delta: Point) {
        self.bounds = self.bounds.translated(delta);
        for annotation in self.annotations_mut() {
            annotation.move_by(delta);
        }
        for arrow in &mut self.arrows {
            arrow.translate(delta);
        }
    }

    pub fn full_bounds(&self) -> Rect {
        let with_annotations = self
            .placed_annotations()
            .fold(self.bounds, |acc, a| acc.union(&a.full_bounds()));
        self.arrows
            .iter()
            .fold(with_annotations, |acc, arrow| acc.union(&arrow.bounds))
    }

    pub fn image_loaded(&mut self, slot: usize, location: &Path, cx: LayoutCx<'_>) -> bool {
        if self
            .bubbles
            .iter_mut()
            .any(|bubble| bubble.image_loaded(slot, location, cx))
        {
            self.refresh_picture(cx);
            return true;
        }
        self.annotations_mut()
            .any(|annotation| annotation.image_loaded(slot, location, cx))
    }

    pub fn render(&self, ctx: &mut dyn DrawContext, theme: &Theme) {
        let crop = Point::new(self.width_no_annotations, self.height_no_annotations);
        self.picture
            .replay(ctx, self.bounds.origin(), self.scale, crop);
        for annotation in self.placed_annotations() {
            annotation.render(ctx, theme);
        }
        for arrow in &self.arrows {
            arrow.render(ctx, theme);
        }
    }
}
