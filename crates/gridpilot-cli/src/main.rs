//! gridpilot CLI - spreadsheet inspection and conversion tool

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gridpilot::prelude::*;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "gridpilot")]
#[command(author, version, about = "Spreadsheet inspection and conversion tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show sheets and cell counts of a spreadsheet
    Info {
        /// Input spreadsheet file (xlsx, csv)
        input: PathBuf,

        /// Workbook password
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Print every cell as ADDRESS<TAB>value[<TAB>=formula]
    Cells {
        /// Input spreadsheet file (xlsx, csv)
        input: PathBuf,

        /// Sheet to print (default: first sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Workbook password
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Convert between xlsx and csv, chosen by file extension
    Convert {
        /// Input spreadsheet file
        input: PathBuf,

        /// Output spreadsheet file
        output: PathBuf,

        /// Convert only this sheet
        #[arg(short, long)]
        sheet: Option<String>,

        /// Password of the input workbook
        #[arg(short, long)]
        password: Option<String>,

        /// Protect the output workbook with this password
        #[arg(long)]
        output_password: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Info { input, password } => show_info(&input, password).await,
        Commands::Cells {
            input,
            sheet,
            password,
        } => print_cells(&input, sheet, password).await,
        Commands::Convert {
            input,
            output,
            sheet,
            password,
            output_password,
        } => convert(&input, &output, sheet, password, output_password).await,
    }
}

fn format_of(path: &Path) -> Result<FileFormat> {
    FileFormat::from_path(path)
        .with_context(|| format!("Unsupported file format: '{}'", path.display()))
}

async fn open(input: &Path, sheet: Option<String>, password: Option<String>) -> Result<Session> {
    let options = ImportOptions {
        format: format_of(input)?,
        sheet_name: sheet,
        password,
    };

    let mut session = Session::new();
    session
        .import_file(input, &options)
        .await
        .with_context(|| format!("Failed to open '{}'", input.display()))?;
    Ok(session)
}

async fn show_info(input: &Path, password: Option<String>) -> Result<()> {
    let session = open(input, None, password).await?;

    println!("File: {}", input.display());
    println!("Sheets: {}", session.sheet_count());

    for (i, sheet) in session.data().sheets().enumerate() {
        let cells = sheet.cells();

        println!();
        println!("  Sheet {}: \"{}\"", i, sheet.name());
        println!("    Cells: {}", cells.len());
        match cells.used_range() {
            Some(range) => println!(
                "    Used range: {} ({} rows x {} columns)",
                range,
                range.row_count(),
                range.col_count()
            ),
            None => println!("    Used range: empty"),
        }
        println!("    Formulas: {}", cells.formula_cells().count());
    }

    Ok(())
}

async fn print_cells(input: &Path, sheet: Option<String>, password: Option<String>) -> Result<()> {
    let session = open(input, sheet, password).await?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (coord, cell) in session.active_sheet_data().iter() {
        let written = match cell.formula() {
            Some(formula) => writeln!(out, "{}\t{}\t={}", coord, cell.value, formula),
            None => writeln!(out, "{}\t{}", coord, cell.value),
        };
        written.context("Failed to write to stdout")?;
    }

    Ok(())
}

async fn convert(
    input: &Path,
    output: &Path,
    sheet: Option<String>,
    password: Option<String>,
    output_password: Option<String>,
) -> Result<()> {
    let export_format = format_of(output)?;
    let file_name = output
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Invalid output path '{}'", output.display()))?;
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut session = open(input, sheet, password).await?;

    let options = ExportOptions {
        format: export_format,
        sheet_name: None,
        password: output_password,
        file_name: Some(file_name.to_string()),
    };
    let written = session
        .export_file(dir, &options)
        .await
        .with_context(|| format!("Failed to write '{}'", output.display()))?;

    eprintln!("Wrote '{}'", written.display());
    Ok(())
}
