//! Application runner: wires the shared bridge, the HTTP server and the
//! render loop together.

use anyhow::Result;
use log::info;
use std::sync::Arc;

use crate::cli::Args;
use crate::config::Settings;
use crate::core::{Bridge, MonotonicClock};
use crate::render::{HeadlessSurface, RenderLoop};
use crate::server::ApiServer;

/// Run until the render loop stops.
///
/// The HTTP server runs on background threads; the render loop runs on the
/// calling thread, which becomes the only thread touching the surface.
pub fn run(args: Args) -> Result<()> {
    let settings = Settings::resolve(&args)?;
    info!(
        "Capturing {}x{} {} every {} ms, commands every {} ms",
        settings.width,
        settings.height,
        settings.format,
        settings.capture_interval_ms,
        settings.command_interval_ms
    );

    let bridge = Arc::new(Bridge::new());
    let server = ApiServer::start(&settings.bind_addr(), Arc::clone(&bridge), settings.stream_interval())?;

    let surface = HeadlessSurface::new(settings.width, settings.height);
    let render_loop = RenderLoop::new(surface, bridge, settings.loop_config(), MonotonicClock::new());

    // Held for the whole run; dropping it would stop the loop
    let (_shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(1);
    render_loop.run(&shutdown_rx);

    server.stop();
    Ok(())
}
