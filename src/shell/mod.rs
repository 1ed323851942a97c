//! Interactive command shell over a single open project.

mod commands;
mod lexer;

use std::fmt;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{CommandFactory as _, Parser as _};

use crate::board::checkerboard::CheckerBoard;
use crate::foundation::core::Resolution;
use crate::foundation::error::{CheckergenError, CheckergenResult};
use crate::project::model::{DEFAULT_NAME, Project};
use crate::project::store::CKG_EXT;
use crate::render::format::ImageFormat;
use crate::session::display::{DisplayOpts, DisplayStats, Presenter};
use crate::session::export::{ExportOpts, plan_export};
use crate::session::worker::{SessionHandle, SessionRegistry};
use crate::signal::{SignalPorts, SignalSession};

use commands::{EdArgs, ShellCommand, ShellLine};
use lexer::split_line;

/// Prompt printed before every command.
pub const PROMPT: &str = "(ckg) ";

const INTRO: &str = "Enter 'help' for a list of commands.\nEnter 'quit' or Ctrl-D to exit.";

/// Creates a presenter for a display session from the project name, surface size and
/// fullscreen flag. Called on the display worker thread.
pub type PresenterSource =
    Arc<dyn Fn(&str, Resolution, bool) -> CheckergenResult<Box<dyn Presenter>> + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Line-oriented shell reading commands from `R` and writing replies to `W`.
pub struct Shell<R, W> {
    input: R,
    out: W,
    project: Option<Project>,
    registry: SessionRegistry,
    display: Option<SessionHandle<DisplayStats>>,
    presenters: PresenterSource,
    ports: SignalPorts,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    /// Shell with no open project.
    pub fn new(input: R, out: W, presenters: PresenterSource) -> Self {
        Self {
            input,
            out,
            project: None,
            registry: SessionRegistry::new(),
            display: None,
            presenters,
            ports: SignalPorts::default(),
        }
    }

    /// Start with `project` open.
    pub fn with_project(mut self, project: Option<Project>) -> Self {
        self.project = project;
        self
    }

    /// Share `registry` with other session starters, so displays started elsewhere also count
    /// against the single display slot.
    pub fn with_registry(mut self, registry: SessionRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Open these trigger devices for every display session.
    pub fn with_signal_ports(mut self, ports: SignalPorts) -> Self {
        self.ports = ports;
        self
    }

    /// The open project, if any.
    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    /// Read and run commands until `quit` or end of input. A running display is stopped
    /// before returning.
    pub fn run(&mut self) -> CheckergenResult<()> {
        self.say(INTRO)?;
        loop {
            write!(self.out, "{PROMPT}")
                .and_then(|()| self.out.flush())
                .context("write prompt")?;
            let Some(line) = self.read_line()? else {
                self.say("")?;
                break;
            };
            if self.execute(&line)? == Flow::Quit {
                break;
            }
        }
        self.stop_display()
    }

    fn execute(&mut self, line: &str) -> CheckergenResult<Flow> {
        self.reap_display()?;

        let words = match split_line(line) {
            Ok(w) if w.is_empty() => return Ok(Flow::Continue),
            Ok(w) => w,
            Err(e) => {
                self.say(format_args!("error: {e}"))?;
                return Ok(Flow::Continue);
            }
        };
        let cmd = match ShellLine::try_parse_from(&words) {
            Ok(l) => l.cmd,
            Err(e) => {
                self.say(e.render().to_string().trim_end())?;
                return Ok(Flow::Continue);
            }
        };
        tracing::debug!(?cmd, "shell command");

        match self.dispatch(cmd) {
            Ok(flow) => Ok(flow),
            Err(e) => {
                self.say(format_args!("error: {e}"))?;
                Ok(Flow::Continue)
            }
        }
    }

    fn dispatch(&mut self, cmd: ShellCommand) -> CheckergenResult<Flow> {
        match cmd {
            ShellCommand::New { name } => self.cmd_new(&name.join(" ")),
            ShellCommand::Open { path } => self.cmd_open(&path),
            ShellCommand::Close => self.cmd_close(),
            ShellCommand::Save { path } => self.cmd_save(path),
            ShellCommand::Set(args) => {
                self.ensure_project()?;
                self.open_project()?.apply_settings(args.into())?;
                Ok(Flow::Continue)
            }
            ShellCommand::Mk(args) => {
                self.ensure_project()?;
                let board = CheckerBoard::new(args.into())?;
                let id = self.open_project()?.add_board(board);
                self.say(format_args!("checkerboard {id} added"))?;
                Ok(Flow::Continue)
            }
            ShellCommand::Ed(args) => self.cmd_ed(&args),
            ShellCommand::Rm { ids, all } => self.cmd_rm(&ids, all),
            ShellCommand::Ls {
                ids,
                settings,
                boards,
            } => self.cmd_ls(&ids, settings, boards),
            ShellCommand::Display {
                fullscreen,
                logtime,
            } => self.cmd_display(fullscreen, logtime),
            ShellCommand::Export {
                dir,
                fmt,
                nofolder,
                force,
            } => self.cmd_export(dir, fmt, !nofolder, force),
            ShellCommand::Quit => {
                if self.save_check()? {
                    Ok(Flow::Quit)
                } else {
                    Ok(Flow::Continue)
                }
            }
            ShellCommand::Help { topic } => self.cmd_help(topic.as_deref()),
        }
    }

    fn cmd_new(&mut self, name: &str) -> CheckergenResult<Flow> {
        let name = name.trim();
        let name = if name.is_empty() { DEFAULT_NAME } else { name };
        if !self.save_check()? {
            return Ok(Flow::Continue);
        }
        let project = Project::new(name);
        self.say(format_args!("project '{}' created", project.name()))?;
        self.project = Some(project);
        Ok(Flow::Continue)
    }

    fn cmd_open(&mut self, path: &Path) -> CheckergenResult<Flow> {
        if !path.is_file() {
            return Err(CheckergenError::validation("path specified is not a file"));
        }
        if !self.save_check()? {
            return Ok(Flow::Continue);
        }
        let project = Project::load(path)?;
        self.say(format_args!("project '{}' loaded", project.name()))?;
        self.project = Some(project);
        Ok(Flow::Continue)
    }

    fn cmd_close(&mut self) -> CheckergenResult<Flow> {
        if self.project.is_none() {
            self.say("no project to close")?;
            return Ok(Flow::Continue);
        }
        if !self.save_check()? {
            return Ok(Flow::Continue);
        }
        self.project = None;
        self.say("project closed")?;
        Ok(Flow::Continue)
    }

    fn cmd_save(&mut self, path: Option<PathBuf>) -> CheckergenResult<Flow> {
        if self.project.is_none() {
            self.say("no project to save")?;
            return Ok(Flow::Continue);
        }
        let path = match path {
            Some(p) => p,
            None => std::env::current_dir().context("resolve working directory")?,
        };
        let project = self.open_project()?;
        let target = if path.is_dir() {
            path.join(format!("{}.{CKG_EXT}", project.name()))
        } else {
            let parent = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            if !parent.is_dir() {
                return Err(CheckergenError::validation(
                    "specified directory does not exist",
                ));
            }
            path
        };
        let written = project.save(&target)?;
        self.say(format_args!("project saved to \"{}\"", written.display()))?;
        Ok(Flow::Continue)
    }

    fn cmd_ed(&mut self, args: &EdArgs) -> CheckergenResult<Flow> {
        let edit = args.edit();
        let report = self.open_project()?.edit_boards(&args.ids, &edit)?;
        for id in report.missing {
            self.say(format_args!("checkerboard {id} does not exist"))?;
        }
        Ok(Flow::Continue)
    }

    fn cmd_rm(&mut self, ids: &[usize], all: bool) -> CheckergenResult<Flow> {
        self.open_project()?;
        if all {
            self.open_project()?.clear_boards();
            self.say("all checkerboards removed")?;
            return Ok(Flow::Continue);
        }
        if ids.is_empty() {
            self.say("please specify at least one id")?;
            return Ok(Flow::Continue);
        }
        let report = self.open_project()?.remove_boards(ids);
        for id in ids {
            if report.missing.contains(id) {
                self.say(format_args!("checkerboard {id} does not exist"))?;
            } else {
                self.say(format_args!("checkerboard {id} removed"))?;
            }
        }
        Ok(Flow::Continue)
    }

    fn cmd_ls(&mut self, ids: &[usize], settings: bool, boards: bool) -> CheckergenResult<Flow> {
        let project = self.open_project()?.clone();
        let count = project.boards().len();
        let mut listed = Vec::new();
        for &id in ids {
            if id < count {
                listed.push(id);
            } else {
                self.say(format_args!("checkerboard {id} does not exist"))?;
            }
        }
        let boards = boards || !listed.is_empty();
        if listed.is_empty() {
            listed = (0..count).collect();
        }

        if !boards {
            self.say(format_args!(
                "{:>13} {:>6} {:>12} {:>16} {:>7}",
                "name", "fps", "resolution", "bg color", "format"
            ))?;
            self.say(format_args!(
                "{:>13} {:>6} {:>12} {:>16} {:>7}",
                project.name(),
                project.fps().to_string(),
                project.res().to_string(),
                project.bg().to_string(),
                project.export_fmt().to_string()
            ))?;
        }
        if !settings && !boards {
            self.say("")?;
        }
        if !settings {
            self.say(format_args!(
                "{:>2} {:>10} {:>14} {:>14} {:>14}",
                "id", "dims", "init_unit", "end_unit", "position"
            ))?;
            for &id in &listed {
                let p = project.boards()[id].params();
                self.say(format_args!(
                    "{:>2} {:>10} {:>14} {:>14} {:>14}",
                    id,
                    pair(&p.dims),
                    pair(&p.init_unit),
                    pair(&p.end_unit),
                    pair(&p.position)
                ))?;
            }
            self.say("")?;
            self.say(format_args!(
                "{:>2} {:>27} {:>12} {:>6} {:>7}",
                "id", "colors", "origin", "freq", "phase"
            ))?;
            for &id in &listed {
                let p = project.boards()[id].params();
                self.say(format_args!(
                    "{:>2} {:>27} {:>12} {:>6} {:>7}",
                    id,
                    pair(&p.cols),
                    p.origin.to_string(),
                    p.freq.to_string(),
                    p.phase.to_string()
                ))?;
            }
        }
        Ok(Flow::Continue)
    }

    fn cmd_display(&mut self, fullscreen: bool, logtime: bool) -> CheckergenResult<Flow> {
        let project = self.open_project()?.snapshot();
        let name = project.name().to_owned();
        let opts = DisplayOpts {
            fullscreen,
            log_path: logtime.then(|| DisplayOpts::log_path_for(&name)),
            pace: true,
        };
        let signals = SignalSession::open(&self.ports)?;
        let signals = (!signals.is_empty()).then_some(signals);

        let source = Arc::clone(&self.presenters);
        let title = name.clone();
        let handle = self.registry.spawn_display(
            &project,
            opts,
            Box::new(move |res, fullscreen| source(&title, res, fullscreen)),
            signals,
        )?;
        self.display = Some(handle);
        self.say(format_args!("displaying '{name}', press ESC to stop"))?;
        Ok(Flow::Continue)
    }

    fn cmd_export(
        &mut self,
        dir: PathBuf,
        format: Option<ImageFormat>,
        folder: bool,
        force: bool,
    ) -> CheckergenResult<Flow> {
        let project = self.open_project()?.snapshot();
        let mut opts = ExportOpts::new(dir);
        opts.format = format;
        opts.folder = folder;
        opts.force = force;

        let plan = plan_export(&project, &opts)?;
        if plan.exceeds_limit() && !force {
            self.say(format_args!(
                "More than {} frames are going to be exported ({}).",
                plan.max_frames, plan.frames
            ))?;
            self.say("Are you sure you want to continue? (y/n)")?;
            if !self.ask_yn()? {
                self.say("export cancelled")?;
                return Ok(Flow::Continue);
            }
            opts.force = true;
        }

        self.say("exporting...")?;
        let stats = self.registry.spawn_export(&project, opts)?.wait()?;
        self.say(format_args!(
            "export done: {} frames written to \"{}\"",
            stats.frames,
            stats.out_dir.display()
        ))?;
        Ok(Flow::Continue)
    }

    fn cmd_help(&mut self, topic: Option<&str>) -> CheckergenResult<Flow> {
        let mut cmd = ShellLine::command();
        match topic {
            None => {
                self.say("commands (type help <command> for details):")?;
                let lines: Vec<String> = cmd
                    .get_subcommands()
                    .map(|c| {
                        format!(
                            "  {:<8} {}",
                            c.get_name(),
                            c.get_about().map(|a| a.to_string()).unwrap_or_default()
                        )
                    })
                    .collect();
                for line in lines {
                    self.say(line)?;
                }
            }
            Some(topic) => match cmd.find_subcommand_mut(topic) {
                Some(sub) => {
                    let help = sub.render_long_help().to_string();
                    self.say(help.trim_end())?;
                }
                None => self.say(format_args!("no help on '{topic}'"))?,
            },
        }
        Ok(Flow::Continue)
    }

    fn ensure_project(&mut self) -> CheckergenResult<()> {
        if self.project.is_none() {
            self.say("no project open, automatically creating project...")?;
            self.cmd_new("")?;
        }
        Ok(())
    }

    fn open_project(&mut self) -> CheckergenResult<&mut Project> {
        self.project
            .as_mut()
            .ok_or_else(|| CheckergenError::validation("please create or open a project first"))
    }

    /// Offer to save a dirty project. Returns `false` when the caller should abort.
    fn save_check(&mut self) -> CheckergenResult<bool> {
        if !self.project.as_ref().is_some_and(Project::is_dirty) {
            return Ok(true);
        }
        self.say("Would you like to save the current project first? (y/n)")?;
        match self.ask_yn_or_abort()? {
            None => Ok(false),
            Some(false) => Ok(true),
            Some(true) => match self.cmd_save(None) {
                Ok(_) => Ok(true),
                Err(e) => {
                    self.say(format_args!("error: {e}"))?;
                    Ok(false)
                }
            },
        }
    }

    /// `Some(answer)`, or `None` at end of input.
    fn ask_yn_or_abort(&mut self) -> CheckergenResult<Option<bool>> {
        loop {
            let Some(answer) = self.read_line()? else {
                return Ok(None);
            };
            match yn_parse(answer.trim()) {
                Some(yes) => return Ok(Some(yes)),
                None => self.say("only 'y', 'n' or variants accepted")?,
            }
        }
    }

    fn ask_yn(&mut self) -> CheckergenResult<bool> {
        Ok(self.ask_yn_or_abort()?.unwrap_or(false))
    }

    fn reap_display(&mut self) -> CheckergenResult<()> {
        let Some(mut handle) = self.display.take() else {
            return Ok(());
        };
        match handle.try_result() {
            None => self.display = Some(handle),
            Some(Ok(stats)) => {
                self.say(format_args!("display ended after {} frames", stats.frames))?;
            }
            Some(Err(e)) => self.say(format_args!("error: display failed: {e}"))?,
        }
        Ok(())
    }

    fn stop_display(&mut self) -> CheckergenResult<()> {
        if let Some(handle) = self.display.take() {
            handle.cancel();
            if let Err(e) = handle.wait() {
                self.say(format_args!("error: display failed: {e}"))?;
            }
        }
        Ok(())
    }

    fn read_line(&mut self) -> CheckergenResult<Option<String>> {
        let mut buf = String::new();
        let n = self
            .input
            .read_line(&mut buf)
            .context("read shell input")?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(buf.trim_end_matches(['\n', '\r']).to_owned()))
    }

    fn say(&mut self, msg: impl fmt::Display) -> CheckergenResult<()> {
        writeln!(self.out, "{msg}").context("write shell output")?;
        Ok(())
    }
}

fn yn_parse(s: &str) -> Option<bool> {
    match s {
        "y" | "Y" | "yes" | "Yes" | "YES" => Some(true),
        "n" | "N" | "no" | "No" | "NO" => Some(false),
        _ => None,
    }
}

fn pair<T: fmt::Display>(v: &[T; 2]) -> String {
    format!("{},{}", v[0], v[1])
}

#[cfg(test)]
#[path = "../../tests/unit/shell/shell.rs"]
mod tests;
