use clap::Parser;
use fltk::{enums::*, prelude::*, valuator::Scrollbar, *};
use helpscreen::config::{self, HelpConfig};
use helpscreen::document::parse_document;
use helpscreen::fltk_draw_context::{FltkDrawContext, FltkMetrics, ImageCache};
use helpscreen::geometry::Point;
use helpscreen::loader::HelpLoader;
use helpscreen::resources::FsImageFetcher;
use helpscreen::screen::HelpScreen;
use helpscreen::theme::Theme;
use helpscreen::translate::Catalog;
use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::rc::Rc;

const SCROLLBAR_SIZE: i32 = 15;
const SCROLL_STEP: i32 = 20;

#[derive(Parser, Debug)]
#[command(name = "helpscreen-viewer")]
#[command(about = "Show a help screen in a window", long_about = None)]
struct Args {
    /// Help document to show
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Locale for translations and images
    #[arg(short, long)]
    locale: Option<String>,

    /// Resource root holding help/<locale>/ images
    #[arg(short, long, value_name = "DIR")]
    resources: Option<PathBuf>,
}

struct ScreenView {
    screen: HelpScreen,
    theme: Theme,
    images: ImageCache,
    scroll: i32,
    visible_height: i32,
}

impl ScreenView {
    fn content_height(&self) -> i32 {
        self.screen.bounds.h.ceil() as i32
    }

    fn max_scroll(&self) -> i32 {
        (self.content_height() - self.visible_height).max(0)
    }

    fn set_scroll(&mut self, scroll: i32) {
        self.scroll = scroll.clamp(0, self.max_scroll());
    }
}

fn load_screen(args: &Args, config: &HelpConfig) -> Result<HelpScreen, String> {
    let xml = fs::read_to_string(&args.file)
        .map_err(|err| format!("cannot read {}: {err}", args.file.display()))?;
    let doc = parse_document(&xml).map_err(|err| err.to_string())?;
    let translations = config
        .translations_dir
        .as_deref()
        .map(|dir| Catalog::load(dir, &config.locale, &config.fallback_locale))
        .unwrap_or_default();

    let mut loader = HelpLoader::new(config, &FltkMetrics, &translations);
    let mut outcome = None;
    loader.load_with_callback(&doc, &FsImageFetcher, |result| outcome = Some(result));
    match outcome {
        Some(Ok(screen)) => Ok(screen),
        Some(Err(err)) => Err(err.to_string()),
        None => Err("loader finished without a result".to_string()),
    }
}

fn create_screen_widget(
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    view: Rc<RefCell<ScreenView>>,
) -> group::Group {
    let mut widget = group::Group::new(x, y, w, h, None);

    let mut vscroll = Scrollbar::default()
        .with_pos(x + w - SCROLLBAR_SIZE, y)
        .with_size(SCROLLBAR_SIZE, h);
    vscroll.set_type(valuator::ScrollbarType::Vertical);
    vscroll.set_step(1.0, SCROLL_STEP);
    vscroll.set_callback({
        let view = view.clone();
        let mut widget = widget.clone();
        move |s| {
            view.borrow_mut().set_scroll(s.value() as i32);
            widget.redraw();
        }
    });

    widget.draw({
        let view = view.clone();
        let mut vscroll = vscroll.clone();
        move |w| {
            let mut view = view.borrow_mut();
            view.visible_height = w.h();
            let content_height = view.content_height();
            if content_height > 0 {
                vscroll.set_bounds(0.0, view.max_scroll() as f64);
                vscroll.set_slider_size((w.h() as f32 / content_height as f32).min(1.0));
                vscroll.set_value(view.scroll as f64);
            }

            draw::set_draw_color(Color::from_rgb(220, 220, 220));
            draw::draw_rectf(w.x(), w.y(), w.w(), w.h());
            draw::push_clip(w.x(), w.y(), w.w() - SCROLLBAR_SIZE, w.h());
            let offset = Point::new(w.x() as f64, (w.y() - view.scroll) as f64);
            let ScreenView {
                screen,
                theme,
                images,
                ..
            } = &mut *view;
            let mut ctx = FltkDrawContext::new(offset, images);
            screen.render(&mut ctx, theme);
            draw::pop_clip();

            w.draw_children();
        }
    });

    widget.handle({
        let view = view.clone();
        let mut vscroll = vscroll.clone();
        move |w, event| {
            let mut view = view.borrow_mut();
            let scroll = view.scroll;
            let target = match event {
                Event::Push => {
                    w.take_focus().ok();
                    return true;
                }
                Event::MouseWheel => scroll - app::event_dy() as i32 * SCROLL_STEP,
                Event::KeyDown => match app::event_key() {
                    Key::Up => scroll - SCROLL_STEP,
                    Key::Down => scroll + SCROLL_STEP,
                    Key::PageUp => scroll - view.visible_height,
                    Key::PageDown => scroll + view.visible_height,
                    Key::Home => 0,
                    Key::End => view.max_scroll(),
                    _ => return false,
                },
                Event::Focus | Event::Unfocus => return true,
                _ => return false,
            };
            view.set_scroll(target);
            if view.scroll != scroll {
                vscroll.set_value(view.scroll as f64);
                w.redraw();
            }
            true
        }
    });

    widget.end();
    widget.resizable(&widget);
    widget
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut config = config::config_file_path()
        .map(|path| config::load_config(&path))
        .unwrap_or_default();
    if let Some(locale) = &args.locale {
        config.locale = locale.clone();
    }
    if let Some(resources) = &args.resources {
        config.resource_root = Some(resources.clone());
    }

    // fonts must be available before text is measured
    let app = app::App::default();

    let screen = match load_screen(&args, &config) {
        Ok(screen) => screen,
        Err(err) => {
            eprintln!("Error: {err}");
            process::exit(1);
        }
    };

    let width = screen.bounds.w.ceil() as i32 + SCROLLBAR_SIZE;
    let height = (screen.bounds.h.ceil() as i32).clamp(200, 800);
    let title = args
        .file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Help".to_string());

    let mut window = window::Window::default()
        .with_size(width, height)
        .with_label(&title);
    let view = Rc::new(RefCell::new(ScreenView {
        screen,
        theme: config.theme.clone(),
        images: ImageCache::new(),
        scroll: 0,
        visible_height: height,
    }));
    create_screen_widget(0, 0, width, height, view);
    window.end();
    window.make_resizable(true);
    window.show();

    if let Err(err) = app.run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
