use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use checkergen::signal::{DEFAULT_BAUD, SignalSession};
use checkergen::{
    DisplayOpts, ExportOpts, ImageFormat, PresenterSource, Project, SessionRegistry, Shell,
    SignalPorts,
};

/// Generate flashing checkerboard patterns for display or export as a series of images,
/// intended for use in psychophysics experiments. Enters interactive command line mode if no
/// options are specified.
#[derive(Parser, Debug)]
#[command(name = "checkergen", version)]
struct Cli {
    /// Checkergen project file to open.
    path: Option<PathBuf>,

    /// Enter command line mode regardless of other options.
    #[arg(short = 'c', long = "cmd")]
    cmd_mode: bool,

    /// Display the animation on the screen.
    #[arg(short = 'd', long = "disp")]
    display: bool,

    /// Export the animation to the specified directory.
    #[arg(short = 'e', long = "export", value_name = "DIR")]
    export_dir: Option<PathBuf>,

    /// Display the animation in fullscreen mode.
    #[arg(short, long)]
    fullscreen: bool,

    /// Image format for the exported animation.
    #[arg(long)]
    fmt: Option<ImageFormat>,

    /// Export even when the frame count exceeds the limit.
    #[arg(long)]
    force: bool,

    /// Log frame intervals of the display to `{name}.log`.
    #[arg(long)]
    logtime: bool,

    /// Serial device receiving trigger codes.
    #[arg(long, value_name = "DEV")]
    serial: Option<PathBuf>,

    /// Line speed of the serial trigger device (8N1).
    #[arg(long, value_name = "BPS", default_value_t = DEFAULT_BAUD, requires = "serial")]
    baud: u32,

    /// Parallel port device receiving trigger codes.
    #[arg(long, value_name = "DEV")]
    parallel: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let cmd_mode = cli.cmd_mode || (!cli.display && cli.export_dir.is_none());

    let project = match &cli.path {
        Some(path) => {
            if !path.is_file() {
                anyhow::bail!("path specified is not a file: '{}'", path.display());
            }
            Some(Project::load(path)?)
        }
        None => None,
    };
    if project.is_none() && (cli.display || cli.export_dir.is_some()) {
        if !cmd_mode {
            anyhow::bail!("no project file specified for display or export");
        }
        eprintln!("error: no project file specified for display or export");
    }

    let ports = SignalPorts {
        serial: cli.serial.clone(),
        baud: cli.baud,
        parallel: cli.parallel.clone(),
    };
    let registry = SessionRegistry::new();
    let presenters = presenter_source();

    let mut display = None;
    if cli.display
        && let Some(project) = &project
    {
        let signals = SignalSession::open(&ports)?;
        let signals = (!signals.is_empty()).then_some(signals);
        let opts = DisplayOpts {
            fullscreen: cli.fullscreen,
            log_path: cli
                .logtime
                .then(|| DisplayOpts::log_path_for(project.name())),
            pace: true,
        };
        let source = Arc::clone(&presenters);
        let title = project.name().to_owned();
        display = Some(registry.spawn_display(
            project,
            opts,
            Box::new(move |res, fullscreen| source(&title, res, fullscreen)),
            signals,
        )?);
    }

    if let (Some(dir), Some(project)) = (&cli.export_dir, &project) {
        let mut opts = ExportOpts::new(dir);
        opts.format = cli.fmt;
        opts.force = cli.force;
        println!("exporting...");
        let stats = registry
            .spawn_export(project, opts)?
            .wait()
            .context("export failed")?;
        println!(
            "export done: {} frames written to \"{}\"",
            stats.frames,
            stats.out_dir.display()
        );
    }

    if cmd_mode {
        let stdin = io::stdin();
        let mut shell = Shell::new(stdin.lock(), io::stdout(), presenters)
            .with_project(project)
            .with_registry(registry)
            .with_signal_ports(ports);
        shell.run()?;
    }

    if let Some(handle) = display {
        let stats = handle.wait().context("display failed")?;
        tracing::info!(frames = stats.frames, "display closed");
    }
    Ok(())
}

#[cfg(feature = "window")]
fn presenter_source() -> PresenterSource {
    Arc::new(|title, res, fullscreen| {
        let presenter = checkergen::WindowPresenter::open(title, res, fullscreen)?;
        Ok(Box::new(presenter) as Box<dyn checkergen::Presenter>)
    })
}

#[cfg(not(feature = "window"))]
fn presenter_source() -> PresenterSource {
    Arc::new(|_, _, _| {
        Err(checkergen::CheckergenError::validation(
            "on-screen display needs the `window` feature",
        ))
    })
}
