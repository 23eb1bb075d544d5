//! crcgrid - byte-grid calculator producing MODBUS CRC16 framed rows

mod logging;
mod settings;

use anyhow::{Context, bail};
use crcgrid_core::Document;
use crcgrid_core::storage::ReportFormat;
use crcgrid_engine::engine::{
    CellClass, CellInput, CrcOrder, evaluate_formula, evaluate_formula_cell, format_byte,
    preprocess_formula,
};
use std::env;
use std::path::{Path, PathBuf};

fn print_usage() {
    eprintln!("Usage: crcgrid [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [FILE]                    Saved grid configuration (.json)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --command <TEXT>      Evaluate one formula cell text and print the byte");
    eprintln!("  -s, --set <NAME=TEXT>     Set a cell's text (can be repeated)");
    eprintln!("  --rows <N>                Number of rows (1-30)");
    eprintln!("  --dec-cols <N>            Decimal (A) columns per row (0-4)");
    eprintln!("  --hex-cols <N>            Hex (B) columns per row (1-20)");
    eprintln!("  --order <ORDER>           CRC byte order: low_first or high_first");
    eprintln!("  --rounds <N>              Maximum resolution rounds (default: 5)");
    eprintln!("  --compact                 Print rows without spaces");
    eprintln!("  --explain                 Show formulas after substitution");
    eprintln!("  -o, --output <FILE>       Export rows (.txt, .hex or .md)");
    eprintln!("  -w, --write               Save back to FILE");
    eprintln!("  --save-as <FILE>          Save the configuration to a new file");
    eprintln!("  --settings <FILE>         Load settings from this TOML file");
    eprintln!("  --no-settings             Ignore settings.toml");
    eprintln!("  -h, --help                Print help");
}

#[derive(Debug, Default)]
struct Options {
    file_path: Option<PathBuf>,
    command: Option<String>,
    sets: Vec<(String, String)>,
    rows: Option<usize>,
    dec_cols: Option<usize>,
    hex_cols: Option<usize>,
    order: Option<CrcOrder>,
    rounds: Option<usize>,
    compact: bool,
    explain: bool,
    output_file: Option<PathBuf>,
    write: bool,
    save_as: Option<PathBuf>,
    settings_file: Option<PathBuf>,
    no_settings: bool,
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn next_value<'a>(args: &'a [String], i: &mut usize, flag: &str, what: &str) -> &'a str {
    *i += 1;
    match args.get(*i) {
        Some(value) => value.as_str(),
        None => fail(&format!("{} requires {}", flag, what)),
    }
}

fn next_count(args: &[String], i: &mut usize, flag: &str) -> usize {
    let value = next_value(args, i, flag, "a number");
    value
        .trim()
        .parse()
        .unwrap_or_else(|_| fail(&format!("{} requires a number, got '{}'", flag, value)))
}

fn parse_args(args: &[String]) -> Options {
    let mut opts = Options::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            "-c" | "--command" => {
                opts.command = Some(next_value(args, &mut i, "--command", "a value").to_string());
            }
            "-s" | "--set" => {
                let assignment = next_value(args, &mut i, "--set", "NAME=TEXT");
                let Some((name, text)) = assignment.split_once('=') else {
                    fail(&format!("--set expects NAME=TEXT, got '{}'", assignment));
                };
                opts.sets.push((name.to_string(), text.to_string()));
            }
            "--rows" => opts.rows = Some(next_count(args, &mut i, "--rows")),
            "--dec-cols" => opts.dec_cols = Some(next_count(args, &mut i, "--dec-cols")),
            "--hex-cols" => opts.hex_cols = Some(next_count(args, &mut i, "--hex-cols")),
            "--rounds" => opts.rounds = Some(next_count(args, &mut i, "--rounds")),
            "--order" => {
                let label = next_value(args, &mut i, "--order", "a value");
                match CrcOrder::from_label(label) {
                    Some(order) => opts.order = Some(order),
                    None => fail(&format!("Unknown CRC order: {}", label)),
                }
            }
            "--compact" => opts.compact = true,
            "--explain" => opts.explain = true,
            "-o" | "--output" => {
                opts.output_file =
                    Some(PathBuf::from(next_value(args, &mut i, "--output", "a file path")));
            }
            "-w" | "--write" => opts.write = true,
            "--save-as" => {
                opts.save_as =
                    Some(PathBuf::from(next_value(args, &mut i, "--save-as", "a file path")));
            }
            "--settings" => {
                opts.settings_file =
                    Some(PathBuf::from(next_value(args, &mut i, "--settings", "a file path")));
            }
            "--no-settings" => opts.no_settings = true,
            arg if arg.starts_with('-') && arg.len() > 1 => {
                eprintln!("Error: Unknown option: {}", arg);
                print_usage();
                std::process::exit(1);
            }
            _ => {
                if opts.file_path.is_none() {
                    opts.file_path = Some(PathBuf::from(&args[i]));
                } else {
                    eprintln!("Error: Unexpected argument: {}", args[i]);
                    print_usage();
                    std::process::exit(1);
                }
            }
        }
        i += 1;
    }

    opts
}

/// Build the document: settings, then the saved file, then flags, then edits.
fn build_document(opts: &Options) -> anyhow::Result<(Document, bool)> {
    let (settings, warnings) = if opts.no_settings {
        (settings::Settings::default(), Vec::new())
    } else {
        settings::load_settings(opts.settings_file.as_deref())
    };
    let mut warnings = warnings;

    let grid = settings.apply_grid(Default::default(), &mut warnings);
    for warning in &warnings {
        eprintln!("Warning: {}", warning);
    }

    let (mut doc, dropped) =
        Document::with_file(grid, opts.file_path.clone()).with_context(|| {
            let path = opts.file_path.as_deref().map(Path::display);
            format!("failed to load {}", path.map(|p| p.to_string()).unwrap_or_default())
        })?;
    for name in dropped {
        eprintln!("Warning: dropped cell '{}' outside the grid", name);
    }
    if let Some(rounds) = settings.max_rounds {
        doc.set_max_rounds(rounds);
    }

    if let Some(rows) = opts.rows {
        doc.set_row_count(rows);
    }
    if let Some(cols) = opts.dec_cols {
        doc.set_dec_col_count(cols);
    }
    if let Some(cols) = opts.hex_cols {
        doc.set_hex_col_count(cols);
    }
    if let Some(order) = opts.order {
        doc.set_crc_order(order);
    }
    if let Some(rounds) = opts.rounds {
        doc.set_max_rounds(rounds);
    }

    for (name, text) in &opts.sets {
        doc.set_cell_text(name, text)
            .with_context(|| format!("cannot set {}", name))?;
    }
    doc.ensure_resolved();
    tracing::debug!(
        rows = doc.grid.rows,
        cells = doc.raw_text.len(),
        rounds = doc.resolution.rounds,
        "document ready"
    );

    let compact = opts.compact || settings.compact.unwrap_or(false);
    Ok((doc, compact))
}

/// Evaluate one formula cell's text against the document's values.
/// Returns the process exit code.
fn run_command(doc: &Document, text: &str, explain: bool) -> i32 {
    let values = &doc.resolution.values;
    match CellInput::classify(text) {
        CellInput::Formula(formula) => {
            if explain {
                println!("{}", preprocess_formula(formula, values));
            }
            match evaluate_formula(formula, values) {
                Ok(value) => {
                    println!("{}", format_byte(value, CellClass::Formula));
                    0
                }
                Err(err) => {
                    println!("#ERR: {}", err);
                    1
                }
            }
        }
        _ => {
            let value = evaluate_formula_cell(text, values);
            println!("{}", format_byte(value, CellClass::Formula));
            0
        }
    }
}

fn print_rows(doc: &Document, compact: bool, explain: bool) {
    for row in doc.rows() {
        let frame = if compact {
            row.compact_hex()
        } else {
            row.spaced_hex()
        };
        println!("R{:02} CRC={}  {}", row.row, row.crc_hex(), frame);

        if explain {
            for cell in doc.grid.row_cells(row.row) {
                if let Some(expr) = doc.explain_cell(&cell) {
                    println!("  {} = {} -> {}", cell, expr, doc.cell_display(&cell));
                }
            }
        }
    }

    if !doc.converged() {
        eprintln!(
            "Warning: values did not settle within {} rounds",
            doc.resolution.rounds
        );
    }
}

fn run(opts: Options) -> anyhow::Result<i32> {
    let (mut doc, compact) = build_document(&opts)?;

    if let Some(text) = &opts.command {
        return Ok(run_command(&doc, text, opts.explain));
    }

    print_rows(&doc, compact, opts.explain);

    if let Some(output_path) = &opts.output_file {
        let format = ReportFormat::from_path(output_path);
        let format = if compact && format == ReportFormat::Text {
            ReportFormat::Compact
        } else {
            format
        };
        doc.export_report(output_path, format)
            .with_context(|| format!("failed to export {}", output_path.display()))?;
        eprintln!("Exported to {}", output_path.display());
    }

    if let Some(path) = &opts.save_as {
        let saved = doc
            .save_as(path)
            .with_context(|| format!("failed to save {}", path.display()))?;
        eprintln!("Saved to {}", saved.display());
    } else if opts.write {
        if doc.file_path.is_none() {
            bail!("--write needs a FILE argument");
        }
        let saved = doc.save_file().context("failed to save")?;
        eprintln!("Saved to {}", saved.display());
    }

    Ok(0)
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let opts = parse_args(&args);

    logging::init_logging();

    match run(opts) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
