//! `plotlab` CLI — run plot scripts headlessly and snapshot frames as SVG.
//!
//! The animation loop is driven by calling `tick` a fixed number of times
//! (the headless stand-in for display-refresh callbacks); the last frame,
//! and optionally every Nth frame, is written as an SVG file.

use std::fs;
use std::path::Path;
use std::process;

use clap::Parser;

use plotlab_core::error::Severity;
use plotlab_core::Engine;
use plotlab_svg::SvgSurface;

#[derive(Parser)]
#[command(version, about = "plotlab \u{2014} MATLAB-subset scatter animation runner")]
struct Cli {
    /// Input script file to run
    file: Option<String>,

    /// Evaluate source text instead of reading a file
    #[arg(short = 'e', long = "eval")]
    eval: Option<String>,

    /// Output directory for SVG snapshots
    #[arg(short, long, default_value = ".")]
    output: String,

    /// Number of animation frames to run
    #[arg(long, default_value_t = 120)]
    frames: u64,

    /// Surface width in pixels
    #[arg(long, default_value_t = 900)]
    width: u32,

    /// Surface height in pixels
    #[arg(long, default_value_t = 900)]
    height: u32,

    /// Also write a snapshot every N frames (`job.<frame>.svg`)
    #[arg(long, value_name = "N")]
    dump_every: Option<u64>,
}

fn main() {
    let cli = Cli::parse();

    let job_name = cli.file.as_ref().map_or_else(
        || "output".to_owned(),
        |file| {
            Path::new(file)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("output")
                .to_owned()
        },
    );

    let source = read_source(&cli);

    let mut engine = Engine::new(SvgSurface::new(cli.width, cli.height));
    engine.execute(&source);

    if engine.is_running() {
        for frame in 1..=cli.frames {
            if !engine.tick() {
                break;
            }
            if let Some(every) = cli.dump_every {
                if every > 0 && frame % every == 0 {
                    let filename = format!("{job_name}.{frame}.svg");
                    write_svg(&cli.output, &filename, &engine.surface().to_svg_string());
                }
            }
        }
        engine.stop();
    }

    print_diagnostics(&engine);

    if engine.surface().is_blank() {
        eprintln!("No frames rendered (the program never reached drawnow)");
    } else {
        let filename = format!("{job_name}.svg");
        write_svg(&cli.output, &filename, &engine.surface().to_svg_string());
    }
}

fn read_source(cli: &Cli) -> String {
    if let Some(ref source) = cli.eval {
        return source.clone();
    }
    if let Some(ref file) = cli.file {
        match fs::read_to_string(file) {
            Ok(s) => return s,
            Err(e) => {
                eprintln!("Error reading {file}: {e}");
                process::exit(1);
            }
        }
    }
    eprintln!("No input file or source specified");
    process::exit(1);
}

fn print_diagnostics(engine: &Engine<SvgSurface>) {
    for err in &engine.context().diagnostics {
        match err.severity {
            Severity::Info => {
                println!("{}", err.message);
            }
            Severity::Warning => {
                eprintln!("Warning: {}", err.message);
            }
            Severity::Error => {
                eprintln!("Error: {}", err.message);
            }
        }
    }
}

fn write_svg(output_dir: &str, filename: &str, content: &str) {
    let path = Path::new(output_dir).join(filename);
    match fs::write(&path, content) {
        Ok(()) => {
            eprintln!("Wrote {}", path.display());
        }
        Err(e) => {
            eprintln!("Error writing {}: {e}", path.display());
        }
    }
}
