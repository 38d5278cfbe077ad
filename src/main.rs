// qrsheet-pdf: Generate a printable sheet of labelled QR codes from a spreadsheet

use std::path::PathBuf;

use clap::Parser;

use qrsheet_pdf::document::write_pdf;
use qrsheet_pdf::layout::{
    LayoutConfig, COLUMNS_PER_ROW, GLYPH_PIXELS, GLYPH_SIZE_MM, MARGIN_MM, PAGE_HEIGHT_MM,
    PAGE_WIDTH_MM, START_X_MM, START_Y_MM,
};
use qrsheet_pdf::manifest::Manifest;
use qrsheet_pdf::preview::{listing, write_previews, PREVIEW_PIXELS};
use qrsheet_pdf::{AppError, QrGlyphRenderer, Session};

// ============================================================================
// Data Structures
// ============================================================================

/// CLI Arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Generate a PDF grid of QR codes from two spreadsheet columns")]
struct Args {
    /// Spreadsheet to read (xlsx, xls, xlsb or ods; first sheet only)
    file: PathBuf,

    /// Column whose cells become the caption under each QR code
    #[arg(short, long = "label")]
    label_column: String,

    /// Column whose cells are encoded in the QR codes
    #[arg(short = 'c', long = "value")]
    value_column: String,

    /// Output filename
    #[arg(short, long, default_value = "qrcodes.pdf")]
    output: PathBuf,

    /// QR code edge in mm
    #[arg(long, default_value_t = GLYPH_SIZE_MM)]
    glyph_size: f32,

    /// Gap between QR codes in mm
    #[arg(long, default_value_t = MARGIN_MM)]
    margin: f32,

    /// QR codes per row
    #[arg(long, default_value_t = COLUMNS_PER_ROW)]
    columns: u32,

    /// Left edge of the grid in mm
    #[arg(long, default_value_t = START_X_MM)]
    start_x: f32,

    /// Top edge of the grid in mm
    #[arg(long, default_value_t = START_Y_MM)]
    start_y: f32,

    /// Page width in mm (A4 by default)
    #[arg(long, default_value_t = PAGE_WIDTH_MM)]
    page_width: f32,

    /// Page height in mm (A4 by default)
    #[arg(long, default_value_t = PAGE_HEIGHT_MM)]
    page_height: f32,

    /// Pixel resolution of each embedded QR code
    #[arg(long, default_value_t = GLYPH_PIXELS)]
    glyph_pixels: u32,

    /// Also write one PNG per entry into this directory
    #[arg(long)]
    preview_dir: Option<PathBuf>,

    /// Also write a JSON record of every placement
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Don't list entries
    #[arg(short, long)]
    quiet: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn layout(&self) -> LayoutConfig {
        LayoutConfig {
            glyph_size: self.glyph_size,
            margin: self.margin,
            columns_per_row: self.columns,
            start_x: self.start_x,
            start_y: self.start_y,
            page_height: self.page_height,
            glyph_pixels: self.glyph_pixels,
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let env = env_logger::Env::default().default_filter_or("warn");
    let mut builder = env_logger::Builder::from_env(env);
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

fn run(args: Args) -> Result<(), AppError> {
    let cfg = args.layout();
    cfg.validate()?;
    check_page_width(&cfg, args.page_width)?;

    // Upload
    let file_name = args.file.display().to_string();
    let bytes = std::fs::read(&args.file)
        .map_err(|e| AppError::Decode(format!("{}: {}", file_name, e)))?;
    let mut session = Session::new();
    session.upload(&file_name, &bytes)?;

    session.set_label_column(&args.label_column);
    session.set_value_column(&args.value_column);

    // Export
    let pass = match session.begin_export() {
        Ok(pass) => pass,
        Err(AppError::NoData) => {
            log::warn!("{}: file data is too short to process", file_name);
            return Ok(());
        }
        Err(e) => return Err(e),
    };
    let has_entries = !pass.entries().is_empty();
    let outcome = pass.run(&cfg, &QrGlyphRenderer::for_print());
    session.commit(outcome);

    let results = session.results();
    if !args.quiet {
        for line in listing(results) {
            println!("{}", line);
        }
    }

    if let Some(dir) = &args.preview_dir {
        let renderer = QrGlyphRenderer::for_screen();
        let slots = write_previews(dir, &results.entries, &renderer, PREVIEW_PIXELS)?;
        let written = slots.iter().filter(|s| s.outcome.is_ok()).count();
        println!("✓ Previews: {} of {} in {}", written, slots.len(), dir.display());
    }

    if !has_entries {
        log::warn!("No QR codes to generate");
        return Ok(());
    }

    let pagination = &results.pagination;
    let pages = write_pdf(&args.output, pagination, &cfg, args.page_width)?;

    if let Some(path) = &args.manifest {
        Manifest::new(&file_name, &args.label_column, &args.value_column, &cfg, pagination)
            .save(path)?;
    }

    println!("✓ Generated: {}", args.output.display());
    println!("  QR codes: {}", pagination.placements.len());
    if !pagination.failures.is_empty() {
        println!("  Skipped: {}", pagination.failures.len());
    }
    println!("  Pages: {}", pages);

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

fn check_page_width(cfg: &LayoutConfig, page_width: f32) -> Result<(), AppError> {
    if !page_width.is_finite() || page_width <= 0.0 {
        return Err(AppError::Layout(format!(
            "page width must be positive, got {}",
            page_width
        )));
    }

    let row_width = cfg.start_x + cfg.columns_per_row as f32 * cfg.step() - cfg.margin;
    if row_width > page_width {
        log::warn!(
            "A full row of {} QR codes ends at {} mm, past the {} mm page edge",
            cfg.columns_per_row,
            row_width,
            page_width
        );
    }
    Ok(())
}
