use super::*;
use crate::board::anchor::Anchor;
use crate::board::checkerboard::BoardParams;
use rust_decimal::Decimal;

fn board(freq: i64) -> CheckerBoard {
    CheckerBoard::new(BoardParams {
        dims: [2, 2],
        init_unit: [Decimal::from(10); 2],
        end_unit: [Decimal::from(10); 2],
        position: [Decimal::ZERO; 2],
        origin: Anchor::TopLeft,
        cols: [Rgb8::BLACK, Rgb8::WHITE],
        freq: Decimal::from(freq),
        phase: Decimal::ZERO,
    })
    .unwrap()
}

#[test]
fn new_project_has_defaults() {
    let p = Project::new("  ");
    assert_eq!(p.name(), DEFAULT_NAME);
    assert_eq!(p.fps(), Fps::new(60, 1).unwrap());
    assert_eq!(p.res(), Resolution::new(800, 600).unwrap());
    assert_eq!(p.bg(), Rgb8::GRAY);
    assert_eq!(p.export_fmt(), ImageFormat::Png);
    assert!(p.is_dirty());
}

#[test]
fn settings_edit_requires_a_field() {
    let mut p = Project::new("x");
    assert!(p.apply_settings(SettingsEdit::default()).is_err());
    p.set_dirty(false);
    p.apply_settings(SettingsEdit {
        fps: Some(Fps::new(30, 1).unwrap()),
        export_fmt: Some(ImageFormat::Bmp),
        ..SettingsEdit::default()
    })
    .unwrap();
    assert_eq!(p.fps(), Fps::new(30, 1).unwrap());
    assert_eq!(p.export_fmt(), ImageFormat::Bmp);
    assert!(p.is_dirty());
}

#[test]
fn edit_reports_missing_ids_and_applies_the_rest() {
    let mut p = Project::new("x");
    p.add_board(board(1));
    p.add_board(board(1));
    let report = p
        .edit_boards(
            &[1, 5, 0],
            &BoardEdit {
                freq: Some(Decimal::from(8)),
                ..BoardEdit::default()
            },
        )
        .unwrap();
    assert_eq!(report.applied, vec![1, 0]);
    assert_eq!(report.missing, vec![5]);
    assert!(p.boards().iter().all(|b| b.freq() == Decimal::from(8)));
}

#[test]
fn invalid_edit_touches_no_board() {
    let mut p = Project::new("x");
    p.add_board(board(1));
    p.add_board(board(2));
    let before = p.boards().to_vec();
    let res = p.edit_boards(
        &[0, 1],
        &BoardEdit {
            freq: Some(Decimal::from(3)),
            init_unit: Some([Decimal::ZERO, Decimal::ONE]),
            ..BoardEdit::default()
        },
    );
    assert!(res.is_err());
    assert_eq!(p.boards(), before.as_slice());
}

#[test]
fn remove_uses_original_positions() {
    let mut p = Project::new("x");
    for f in 0..4 {
        p.add_board(board(f));
    }
    let report = p.remove_boards(&[3, 1, 9, 1]);
    assert_eq!(report.missing, vec![9]);
    let freqs: Vec<Decimal> = p.boards().iter().map(|b| b.freq()).collect();
    assert_eq!(freqs, vec![Decimal::from(0), Decimal::from(2)]);
}

#[test]
fn snapshot_is_independent() {
    let mut p = Project::new("x");
    p.add_board(board(6));
    let snap = p.snapshot();
    p.clear_boards();
    assert_eq!(snap.boards().len(), 1);
    assert!(p.boards().is_empty());
}

#[test]
fn reset_phases_rewinds_every_board() {
    let mut p = Project::new("x");
    p.add_board(board(6));
    let fps = p.fps();
    for b in p.boards_mut() {
        b.advance(fps);
    }
    assert_ne!(p.boards()[0].cur_phase(), Decimal::ZERO);
    p.reset_phases();
    assert_eq!(p.boards()[0].cur_phase(), Decimal::ZERO);
}
