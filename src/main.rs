//! faktur – command-line invoice → PDF exporter.
//!
//! Usage:
//!   faktur <invoice.json> [output.pdf] [--stretch] [--scale N] [--dump-sheet]
//!
//! If `output.pdf` is omitted the PDF is written to the current directory
//! under the pipeline's own name (`Invoice-<number>.pdf`, or
//! `Invoice-untitled.pdf` when the invoice number is empty).

use std::{env, fs, path::PathBuf, process};

use faktur::error::FakturError;
use faktur::export::{export_invoice, ExportConfig};
use faktur::invoice::Invoice;
use faktur::pdf::FitPolicy;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut input_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut fit = FitPolicy::Contain;
    let mut scale: Option<f32> = None;
    let mut dump_sheet = false;
    let mut positional = 0usize;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--stretch" => fit = FitPolicy::Stretch,
            "--dump-sheet" => dump_sheet = true,
            "--scale" | "-s" => match iter.next().and_then(|v| v.parse::<f32>().ok()) {
                Some(v) => scale = Some(v),
                None => {
                    eprintln!("Error: --scale expects a number.");
                    process::exit(1);
                }
            },
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
            path => {
                if positional == 0 {
                    input_path = Some(PathBuf::from(path));
                } else if positional == 1 {
                    output_path = Some(PathBuf::from(path));
                } else {
                    eprintln!("Unexpected argument: {path}");
                    print_usage(&args[0]);
                    process::exit(1);
                }
                positional += 1;
            }
        }
    }

    let input = match input_path {
        Some(p) => p,
        None => {
            eprintln!("Error: no invoice file specified.");
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    let invoice = match load_invoice(&input) {
        Ok(inv) => inv,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let mut config = ExportConfig {
        fit,
        ..ExportConfig::default()
    };
    if let Some(s) = scale {
        config.raster_scale = s;
    }

    let exported = match export_invoice(&invoice, &config) {
        Ok(out) => out,
        Err(e) => {
            eprintln!("Error exporting invoice: {e}");
            process::exit(1);
        }
    };

    if dump_sheet {
        println!("{}", exported.sheet.to_json());
    }

    let output = output_path.unwrap_or_else(|| PathBuf::from(&exported.file_name));
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("Error creating output directory: {e}");
                process::exit(1);
            }
        }
    }
    if let Err(e) = fs::write(&output, &exported.pdf) {
        eprintln!("Error writing '{}': {e}", output.display());
        process::exit(1);
    }
    eprintln!(
        "Wrote '{}' ({} bytes)",
        output.display(),
        exported.pdf.len()
    );
}

fn load_invoice(path: &PathBuf) -> Result<Invoice, FakturError> {
    let json = fs::read_to_string(path)?;
    serde_json::from_str(&json).map_err(|e| FakturError::InvoiceParse {
        path: path.clone(),
        source: e,
    })
}

fn print_usage(prog: &str) {
    eprintln!("faktur – invoice to PDF exporter");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <invoice.json> [output.pdf] [--stretch] [--scale N] [--dump-sheet]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <invoice.json>  Invoice description (see demos/sample-invoice.json)");
    eprintln!("  [output.pdf]    Output path  (default: Invoice-<number>.pdf in the current dir)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --stretch       Stretch the captured bitmap to fill the page (default: scale and center)");
    eprintln!("  --scale, -s     Supersampling factor for the capture stage (default: 2)");
    eprintln!("  --dump-sheet    Print the computed sheet layout as JSON");
    eprintln!("  --help          Print this message");
}
