use super::*;
use crate::board::anchor::Anchor;
use crate::board::checkerboard::{BoardParams, CheckerBoard};
use crate::foundation::core::Rgb8;
use crate::project::model::SettingsEdit;
use crate::session::display::CapturePresenter;
use rust_decimal::Decimal;
use std::path::PathBuf;

fn project() -> Project {
    let mut p = Project::new("worker");
    p.apply_settings(SettingsEdit {
        res: Some(Resolution::new(8, 8).unwrap()),
        ..SettingsEdit::default()
    })
    .unwrap();
    p.add_board(
        CheckerBoard::new(BoardParams {
            dims: [2, 2],
            init_unit: [Decimal::from(4), Decimal::from(4)],
            end_unit: [Decimal::from(4), Decimal::from(4)],
            position: [Decimal::ZERO, Decimal::ZERO],
            origin: Anchor::TopLeft,
            cols: [Rgb8::BLACK, Rgb8::WHITE],
            freq: Decimal::from(12),
            phase: Decimal::ZERO,
        })
        .unwrap(),
    );
    p
}

fn endless() -> PresenterFactory {
    Box::new(|_, _| Ok(Box::new(CapturePresenter::counting(None)) as Box<dyn Presenter>))
}

#[test]
fn only_one_display_at_a_time() {
    let reg = SessionRegistry::new();
    let p = project();
    let first = reg
        .spawn_display(&p, DisplayOpts::default(), endless(), None)
        .unwrap();
    assert!(reg.display_active());

    let second = reg.spawn_display(&p, DisplayOpts::default(), endless(), None);
    assert!(matches!(second, Err(CheckergenError::SessionBusy)));

    first.cancel();
    first.wait().unwrap();
    assert!(!reg.display_active());

    let again = reg
        .spawn_display(&p, DisplayOpts::default(), endless(), None)
        .unwrap();
    again.cancel();
    again.wait().unwrap();
}

#[test]
fn presenter_failure_releases_the_slot() {
    let reg = SessionRegistry::new();
    let failing: PresenterFactory =
        Box::new(|_, _| Err(CheckergenError::validation("no display available")));
    let handle = reg
        .spawn_display(&project(), DisplayOpts::default(), failing, None)
        .unwrap();
    assert!(matches!(handle.wait(), Err(CheckergenError::Validation(_))));
    assert!(!reg.display_active());
}

#[test]
fn display_factory_sees_project_resolution() {
    let reg = SessionRegistry::new();
    let factory: PresenterFactory = Box::new(|res, fullscreen| {
        assert_eq!(res, Resolution::new(8, 8).unwrap());
        assert!(fullscreen);
        Ok(Box::new(CapturePresenter::counting(Some(3))) as Box<dyn Presenter>)
    });
    let opts = DisplayOpts {
        fullscreen: true,
        pace: false,
        ..DisplayOpts::default()
    };
    let stats = reg
        .spawn_display(&project(), opts, factory, None)
        .unwrap()
        .wait()
        .unwrap();
    assert_eq!(stats.frames, 3);
}

#[test]
fn export_runs_on_a_snapshot() {
    let dir = PathBuf::from("target").join("unit_worker");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();

    let reg = SessionRegistry::new();
    let mut p = project();
    let mut handle = reg.spawn_export(&p, ExportOpts::new(&dir)).unwrap();
    p.clear_boards();

    let stats = loop {
        if let Some(res) = handle.try_result() {
            break res.unwrap();
        }
        std::thread::sleep(std::time::Duration::from_millis(5));
    };
    // 60 fps / 12 Hz
    assert_eq!(stats.frames, 5);
    assert!(dir.join("worker").join("worker4.png").is_file());
    assert!(handle.is_finished());
}
