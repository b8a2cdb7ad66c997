//! Upscaler comparison viewer
//!
//! Loads a still image, upscales it to the window with one of four scaling modes and
//! lets the user switch between them with the number keys. Useful for judging FSR
//! against the classic resamplers on the same content.
//!
//! # Usage
//! ```bash
//! cargo run --example viewer -- image.png shaders/ --width 1600 --height 1200
//! ```
//!
//! The shader directory must contain `lanczos.wgsl`, `fsr_easu.wgsl` and `fsr_rcas.wgsl`.

/// Application event handling
mod app;

/// Window, GPU and upscaler state
mod context;

/// Controller Back button polling
mod gamepad;

use crate::app::ViewerApp;
use clap::Parser;
use std::path::PathBuf;
use upscale_compare::{ClearColors, ExitSignal, Rgba, SurfaceSize, UpscalerConfig};
use winit::event_loop::{ControlFlow, EventLoop};

/// Command-line arguments for the viewer
#[derive(Parser)]
#[command(version, about, long_about=None)]
struct Args {
    /// Source image to upscale
    image: PathBuf,

    /// Directory containing the WGSL upscaling shaders
    shader_dir: PathBuf,

    /// Output width in pixels
    #[arg(long, default_value_t = 1600)]
    width: u32,

    /// Output height in pixels
    #[arg(long, default_value_t = 1200)]
    height: u32,

    /// Clear colour of the intermediate surface (#rrggbb or #rrggbbaa)
    #[arg(long, default_value = "#800080")]
    intermediate_clear: Rgba,

    /// Clear colour of the window surface (#rrggbb or #rrggbbaa)
    #[arg(long, default_value = "#6495ed")]
    final_clear: Rgba,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let subscriber = tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let exit_signal = ExitSignal::new();
    let handler_signal = exit_signal.clone();
    ctrlc::set_handler(move || handler_signal.request())?;

    let config = UpscalerConfig {
        output_size: SurfaceSize::new(args.width, args.height),
        clear_colors: ClearColors {
            intermediate: args.intermediate_clear,
            presentable: args.final_clear,
        },
    };

    tracing::info!("Starting viewer at {}", config.output_size);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::new(args.image, args.shader_dir, config, exit_signal);
    event_loop.run_app(&mut app)?;

    // Failures inside the event loop end it early and surface here
    app.into_result()?;
    Ok(())
}
