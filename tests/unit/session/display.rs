use super::*;
use crate::board::anchor::Anchor;
use crate::board::checkerboard::{BoardParams, CheckerBoard};
use crate::foundation::core::{Resolution, Rgb8};
use crate::foundation::error::CheckergenError;
use crate::project::model::SettingsEdit;
use crate::signal::{GROUP_START, GROUP_STOP, RecordingPort};
use rust_decimal::Decimal;

fn project(freq: i64) -> Project {
    let mut p = Project::new("disp");
    p.apply_settings(SettingsEdit {
        res: Some(Resolution::new(6, 4).unwrap()),
        bg: Some(Rgb8::GRAY),
        ..SettingsEdit::default()
    })
    .unwrap();
    p.add_board(
        CheckerBoard::new(BoardParams {
            dims: [1, 1],
            init_unit: [Decimal::from(4), Decimal::from(4)],
            end_unit: [Decimal::from(4), Decimal::from(4)],
            position: [Decimal::ZERO, Decimal::ZERO],
            origin: Anchor::TopLeft,
            cols: [Rgb8::BLACK, Rgb8::WHITE],
            freq: Decimal::from(freq),
            phase: Decimal::ZERO,
        })
        .unwrap(),
    );
    p
}

fn headless() -> DisplayOpts {
    DisplayOpts {
        pace: false,
        ..DisplayOpts::default()
    }
}

struct FailingPresenter;

impl Presenter for FailingPresenter {
    fn present(&mut self, _frame: &FrameRGB) -> CheckergenResult<()> {
        Err(CheckergenError::validation("gone"))
    }
}

/// Accepts `ok` frames, then fails.
struct DyingPresenter {
    ok: u32,
}

impl Presenter for DyingPresenter {
    fn present(&mut self, _frame: &FrameRGB) -> CheckergenResult<()> {
        if self.ok == 0 {
            return Err(CheckergenError::validation("window lost"));
        }
        self.ok -= 1;
        Ok(())
    }
}

#[test]
fn plays_until_the_presenter_closes() {
    let mut p = project(30);
    let mut presenter = CapturePresenter::new(Some(3));
    let stats = run_display(&mut p, &mut presenter, &headless(), &CancelToken::new(), None)
        .unwrap();

    assert_eq!(stats.frames, 3);
    assert_eq!(stats.intervals.len(), 2);
    let board_px: Vec<Rgb8> = presenter
        .frames()
        .iter()
        .map(|f| f.pixel(0, 0).unwrap())
        .collect();
    assert_eq!(board_px, vec![Rgb8::BLACK, Rgb8::WHITE, Rgb8::BLACK]);
    assert!(presenter.frames().iter().all(|f| f.pixel(5, 3) == Some(Rgb8::GRAY)));
}

#[test]
fn cancelled_token_stops_before_the_first_frame() {
    let mut p = project(30);
    let cancel = CancelToken::new();
    cancel.clone().cancel();
    let mut presenter = CapturePresenter::counting(None);
    let stats = run_display(&mut p, &mut presenter, &headless(), &cancel, None).unwrap();
    assert_eq!(stats.frames, 0);
    assert_eq!(presenter.count(), 0);
}

#[test]
fn brackets_playback_with_group_signals() {
    let port = RecordingPort::new();
    let mut signals = SignalSession::new();
    signals.add_port(Box::new(port.clone()));

    let mut p = project(0);
    let mut presenter = CapturePresenter::counting(Some(2));
    run_display(
        &mut p,
        &mut presenter,
        &headless(),
        &CancelToken::new(),
        Some(&mut signals),
    )
    .unwrap();
    assert_eq!(port.sent(), vec![Some(GROUP_START), Some(GROUP_STOP)]);

    let mut failing = FailingPresenter;
    let err = run_display(
        &mut p,
        &mut failing,
        &headless(),
        &CancelToken::new(),
        Some(&mut signals),
    )
    .unwrap_err();
    assert!(matches!(err, CheckergenError::Validation(_)));
    assert_eq!(port.sent().len(), 4);
    assert_eq!(port.sent()[3], Some(GROUP_STOP));
}

#[test]
fn writes_one_interval_per_line() {
    let dir = PathBuf::from("target").join("unit_display");
    std::fs::create_dir_all(&dir).unwrap();
    let log = dir.join("disp.log");

    let mut p = project(10);
    let opts = DisplayOpts {
        log_path: Some(log.clone()),
        ..headless()
    };
    let mut presenter = CapturePresenter::counting(Some(4));
    run_display(&mut p, &mut presenter, &opts, &CancelToken::new(), None).unwrap();

    let text = std::fs::read_to_string(&log).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|l| l.parse::<f64>().is_ok()));
}

#[test]
fn ticker_holds_the_frame_rate() {
    let mut ticker = FrameTicker::new(Fps::new(100, 1).unwrap());
    assert_eq!(ticker.period(), Duration::from_millis(10));
    let start = Instant::now();
    assert_eq!(ticker.tick(), None);
    for _ in 0..5 {
        assert!(ticker.tick().is_some());
    }
    assert!(start.elapsed() >= Duration::from_millis(45));
}

#[test]
fn log_path_uses_project_name() {
    assert_eq!(DisplayOpts::log_path_for("trial"), PathBuf::from("trial.log"));
}

#[test]
fn interval_log_survives_a_failed_present() {
    let dir = PathBuf::from("target").join("unit_display");
    std::fs::create_dir_all(&dir).unwrap();
    let log = dir.join("dying.log");
    let _ = std::fs::remove_file(&log);

    let mut p = project(10);
    let opts = DisplayOpts {
        log_path: Some(log.clone()),
        ..headless()
    };
    let mut presenter = DyingPresenter { ok: 3 };
    let err = run_display(&mut p, &mut presenter, &opts, &CancelToken::new(), None).unwrap_err();
    assert!(matches!(err, CheckergenError::Validation(_)));

    // Three good frames plus the tick of the failed one.
    let text = std::fs::read_to_string(&log).unwrap();
    assert_eq!(text.lines().count(), 3);
}
