use anyhow::{Context, Result};
use ecosim::render::backends::pixels::PixelSurface;
use ecosim::render::SurfaceSize;
use ecosim::{EngineConfig, EngineEvent, LogStatSink, ModuleKind, Orchestrator};
use std::path::PathBuf;

const SURFACE_SIZE: SurfaceSize = SurfaceSize {
    width: 400,
    height: 300,
};

#[tokio::main]
async fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info"))
        .filter_module("reqwest", log::LevelFilter::Warn)
        .init();

    // Data server, asset root and tick rate come from ECOSIM_* variables.
    let config = EngineConfig::from_env().context("invalid configuration")?;
    log::info!("Polling {} every {:?}", config.data_url, config.tick_interval);

    let mut orchestrator = Orchestrator::new(config)?;
    for kind in selected_modules()? {
        orchestrator.register(
            kind,
            Box::new(PixelSurface::new(SURFACE_SIZE)),
            Box::new(LogStatSink::new(kind.name())),
        )?;
    }

    // Preload everything, then start all modules even if some assets failed.
    orchestrator.boot().await;

    let (engine, join) = orchestrator.start();
    let mut events = engine.subscribe_events();

    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let EngineEvent::FrameRendered { module, skipped, .. } = event {
                if skipped > 0 {
                    log::debug!("{}: {} instructions skipped", module, skipped);
                }
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    log::info!("Shutting down");
    engine.shutdown().await?;
    let orchestrator = join.await?;

    // Keep the last frame of every module around when asked to.
    if let Some(dir) = std::env::var_os("ECOSIM_FRAME_DIR").map(PathBuf::from) {
        std::fs::create_dir_all(&dir)?;
        for name in orchestrator.module_names() {
            let Some(surface) = orchestrator
                .surface(&name)
                .and_then(|s| s.as_any().downcast_ref::<PixelSurface>())
            else {
                continue;
            };

            let path = dir.join(format!("{name}.png"));
            let file = std::fs::File::create(&path).with_context(|| format!("cannot create {}", path.display()))?;
            surface.write_png(std::io::BufWriter::new(file))?;
            log::info!("Wrote {}", path.display());
        }
    }

    Ok(())
}

/// Modules named in `ECOSIM_MODULES` (comma separated), or all of them.
fn selected_modules() -> Result<Vec<ModuleKind>> {
    let Ok(list) = std::env::var("ECOSIM_MODULES") else {
        return Ok(ModuleKind::ALL.to_vec());
    };

    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| ModuleKind::from_name(name).with_context(|| format!("unknown module {name:?}")))
        .collect()
}
