//! WASM bindings for `plotlab`.
//!
//! Browser hosts that want full-rate animation drive the engine through
//! their own `requestAnimationFrame` loop; this module provides the simpler
//! embedding: run a program for a number of frames and get back the final
//! frame as an SVG string plus the collected diagnostics.

use wasm_bindgen::prelude::*;

use plotlab_core::error::Severity;
use plotlab_core::Engine;
use plotlab_svg::SvgSurface;

/// Surface dimensions for the embedded runner; matches the default figure
/// rectangle of the script grammar.
const SURFACE_SIZE: u32 = 900;

#[wasm_bindgen]
pub struct RunOutput {
    svg: String,
    diagnostics: String,
    has_warnings: bool,
}

#[wasm_bindgen]
impl RunOutput {
    #[wasm_bindgen(getter)]
    pub fn svg(&self) -> String {
        self.svg.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn diagnostics(&self) -> String {
        self.diagnostics.clone()
    }

    #[wasm_bindgen(getter, js_name = hasWarnings)]
    pub fn has_warnings(&self) -> bool {
        self.has_warnings
    }
}

/// Run `source` for `frames` animation frames and snapshot the last one.
#[wasm_bindgen]
pub fn render_plot(source: &str, frames: u32) -> RunOutput {
    run_program(source, frames)
}

fn run_program(source: &str, frames: u32) -> RunOutput {
    let mut engine = Engine::new(SvgSurface::new(SURFACE_SIZE, SURFACE_SIZE));
    engine.execute(source);

    for _ in 0..frames {
        if !engine.tick() {
            break;
        }
    }
    engine.stop();

    let diagnostics = collect_diagnostics(&engine);
    let has_warnings = engine
        .context()
        .diagnostics
        .iter()
        .any(|d| matches!(d.severity, Severity::Warning | Severity::Error));
    let svg = if engine.surface().is_blank() {
        String::new()
    } else {
        engine.surface().to_svg_string()
    };

    RunOutput {
        svg,
        diagnostics,
        has_warnings,
    }
}

fn collect_diagnostics(engine: &Engine<SvgSurface>) -> String {
    engine
        .context()
        .diagnostics
        .iter()
        .map(|err| {
            let label = match err.severity {
                Severity::Info => "info",
                Severity::Warning => "warning",
                Severity::Error => "error",
            };
            format!("{label} {}", err.message)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
