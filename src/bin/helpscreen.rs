use clap::{Parser, Subcommand};
use helpscreen::config::{self, HelpConfig};
use helpscreen::document::parse_document;
use helpscreen::loader::HelpLoader;
use helpscreen::metrics::ApproxMetrics;
use helpscreen::resources::FsImageFetcher;
use helpscreen::screen::HelpScreen;
use helpscreen::svg::SvgDrawContext;
use helpscreen::translate::Catalog;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "helpscreen")]
#[command(about = "Lay out and render help screens", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: the per-user config location)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Locale for translations and images
    #[arg(short, long, global = true)]
    locale: Option<String>,

    /// Resource root holding help/<locale>/ images
    #[arg(short, long, global = true, value_name = "DIR")]
    resources: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a help document to SVG
    Render {
        /// Help document
        file: PathBuf,

        /// Output file (default: the input with an .svg extension)
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },
    /// Render every help document below a directory
    Batch {
        /// Directory to search for *.xml help documents
        dir: PathBuf,

        /// Directory receiving the SVG files
        out_dir: PathBuf,
    },
    /// Load a help document and print its laid-out tree
    Check {
        /// Help document
        file: PathBuf,
    },
    /// Write the effective settings to the config file
    InitConfig,
}

fn load_settings(args: &Args) -> HelpConfig {
    let mut config = args
        .config
        .clone()
        .or_else(config::config_file_path)
        .map(|path| config::load_config(&path))
        .unwrap_or_default();
    if let Some(locale) = &args.locale {
        config.locale = locale.clone();
    }
    if let Some(resources) = &args.resources {
        config.resource_root = Some(resources.clone());
    }
    config
}

fn load_screen(file: &Path, config: &HelpConfig) -> Result<HelpScreen, String> {
    let xml =
        fs::read_to_string(file).map_err(|e| format!("Failed to read {}: {}", file.display(), e))?;
    let doc = parse_document(&xml).map_err(|e| format!("{}: {}", file.display(), e))?;
    let translations = config
        .translations_dir
        .as_deref()
        .map(|dir| Catalog::load(dir, &config.locale, &config.fallback_locale))
        .unwrap_or_default();

    let metrics = ApproxMetrics::default();
    let mut loader = HelpLoader::new(config, &metrics, &translations);
    let mut outcome = None;
    loader.load_with_callback(&doc, &FsImageFetcher, |result| outcome = Some(result));
    match outcome {
        Some(result) => result.map_err(|e| format!("{}: {}", file.display(), e)),
        None => Err(format!("{}: loader finished without a result", file.display())),
    }
}

fn render_svg(screen: &HelpScreen, config: &HelpConfig) -> String {
    let mut svg = SvgDrawContext::new(screen.bounds.w, screen.bounds.h);
    screen.render(&mut svg, &config.theme);
    svg.finish()
}

fn cmd_render(file: &Path, output: Option<PathBuf>, config: &HelpConfig) -> Result<(), String> {
    let screen = load_screen(file, config)?;
    let output = output.unwrap_or_else(|| file.with_extension("svg"));
    fs::write(&output, render_svg(&screen, config))
        .map_err(|e| format!("Failed to write {}: {}", output.display(), e))?;
    log::info!("wrote {}", output.display());
    Ok(())
}

fn cmd_batch(dir: &Path, out_dir: &Path, config: &HelpConfig) -> Result<(), String> {
    fs::create_dir_all(out_dir)
        .map_err(|e| format!("Failed to create {}: {}", out_dir.display(), e))?;

    let mut failures = 0;
    let mut rendered = 0;
    for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("xml")
        {
            continue;
        }
        let relative = path.strip_prefix(dir).unwrap_or(path);
        let output = out_dir.join(relative).with_extension("svg");
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
        }
        match cmd_render(path, Some(output), config) {
            Ok(()) => rendered += 1,
            Err(e) => {
                eprintln!("{}", e);
                failures += 1;
            }
        }
    }

    println!("Rendered {} help screens", rendered);
    if failures > 0 {
        return Err(format!("{} help screens failed to render", failures));
    }
    Ok(())
}

fn cmd_check(file: &Path, config: &HelpConfig) -> Result<(), String> {
    let screen = load_screen(file, config)?;
    print!("{}", screen.describe());
    Ok(())
}

fn cmd_init_config(args: &Args, config: &HelpConfig) -> Result<(), String> {
    let path = args
        .config
        .clone()
        .or_else(config::config_file_path)
        .ok_or_else(|| "No config location for this platform, pass --config".to_string())?;
    config::save_config(&path, config)
        .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let config = load_settings(&args);

    let result = match &args.command {
        Commands::Render { file, output } => cmd_render(file, output.clone(), &config),
        Commands::Batch { dir, out_dir } => cmd_batch(dir, out_dir, &config),
        Commands::Check { file } => cmd_check(file, &config),
        Commands::InitConfig => cmd_init_config(&args, &config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
