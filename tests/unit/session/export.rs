use super::*;
use crate::board::anchor::Anchor;
use crate::board::checkerboard::{BoardParams, CheckerBoard};
use crate::foundation::core::{Fps, Resolution, Rgb8};
use crate::project::model::SettingsEdit;
use crate::session::sink::InMemorySink;
use rust_decimal::Decimal;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_export").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn board(freq: &str) -> CheckerBoard {
    CheckerBoard::new(BoardParams {
        dims: [1, 1],
        init_unit: [Decimal::from(4), Decimal::from(4)],
        end_unit: [Decimal::from(4), Decimal::from(4)],
        position: [Decimal::ZERO, Decimal::ZERO],
        origin: Anchor::TopLeft,
        cols: [Rgb8::BLACK, Rgb8::WHITE],
        freq: freq.parse().unwrap(),
        phase: Decimal::ZERO,
    })
    .unwrap()
}

fn project(fps: &str, freqs: &[&str]) -> Project {
    let mut p = Project::new("stim");
    p.apply_settings(SettingsEdit {
        fps: Some(fps.parse::<Fps>().unwrap()),
        res: Some(Resolution::new(4, 4).unwrap()),
        ..SettingsEdit::default()
    })
    .unwrap();
    for f in freqs {
        p.add_board(board(f));
    }
    p
}

#[test]
fn loop_length_is_lcm_of_board_periods() {
    assert_eq!(loop_frames(&project("60", &["6"])).unwrap(), Some(10));
    assert_eq!(loop_frames(&project("60", &["6", "4"])).unwrap(), Some(30));
    assert_eq!(loop_frames(&project("60", &["6", "0", "4"])).unwrap(), Some(30));
    assert_eq!(loop_frames(&project("60", &[])).unwrap(), None);
    assert_eq!(loop_frames(&project("60", &["0"])).unwrap(), None);
}

#[test]
fn fractional_periods_extend_to_whole_cycles() {
    // 60/7 frames per period: 60 frames hold exactly 7 periods.
    assert_eq!(loop_frames(&project("60", &["7"])).unwrap(), Some(60));
    // 60/2.5 = 24 frames.
    assert_eq!(loop_frames(&project("60", &["2.5"])).unwrap(), Some(24));
    assert_eq!(
        loop_frames(&project("30000/1001", &["1"])).unwrap(),
        Some(30000)
    );
}

#[test]
fn ceiling_override_falls_back_on_bad_values() {
    assert_eq!(ceiling_from(None), MAX_EXPORT_FRAMES);
    assert_eq!(ceiling_from(Some("250")), 250);
    assert_eq!(ceiling_from(Some(" 12 ")), 12);
    assert_eq!(ceiling_from(Some("0")), MAX_EXPORT_FRAMES);
    assert_eq!(ceiling_from(Some("lots")), MAX_EXPORT_FRAMES);
}

#[test]
fn plan_resolves_folder_format_and_padding() {
    let dir = scratch_dir("plan");
    let p = project("60", &["6", "4"]);

    let plan = plan_export(&p, &ExportOpts::new(&dir)).unwrap();
    assert_eq!(plan.frames, 30);
    assert_eq!(plan.digits, 2);
    assert_eq!(plan.out_dir, dir.join("stim"));
    assert_eq!(plan.format, ImageFormat::Png);

    let mut opts = ExportOpts::new(&dir);
    opts.folder = false;
    opts.format = Some(ImageFormat::Jpg);
    let plan = plan_export(&p, &opts).unwrap();
    assert_eq!(plan.out_dir, dir);
    assert_eq!(plan.format, ImageFormat::Jpg);
}

#[test]
fn static_projects_export_the_requested_count() {
    let dir = scratch_dir("static");
    let mut opts = ExportOpts::new(&dir);
    assert_eq!(plan_export(&project("60", &["0"]), &opts).unwrap().frames, 1);
    opts.static_frames = 5;
    assert_eq!(plan_export(&project("60", &["0"]), &opts).unwrap().frames, 5);
}

#[test]
fn plan_rejects_a_file_as_target() {
    let dir = scratch_dir("not_dir");
    let file = dir.join("file.txt");
    std::fs::write(&file, b"x").unwrap();
    let err = plan_export(&project("60", &["6"]), &ExportOpts::new(&file)).unwrap_err();
    assert!(matches!(err, CheckergenError::InvalidConfiguration(_)));
}

#[test]
fn run_export_starts_from_initial_phase() {
    let mut p = project("60", &["30"]);
    for b in p.boards_mut() {
        b.advance(Fps::default());
    }
    let mut sink = InMemorySink::new();
    run_export(&mut p, 4, &mut sink).unwrap();

    let colors: Vec<Rgb8> = sink
        .frames()
        .iter()
        .map(|(_, f)| f.pixel(0, 0).unwrap())
        .collect();
    assert_eq!(
        colors,
        vec![Rgb8::BLACK, Rgb8::WHITE, Rgb8::BLACK, Rgb8::WHITE]
    );
    assert_eq!(sink.config().unwrap().frames, 4);
}

#[test]
fn over_limit_export_fails_without_force() {
    let dir = scratch_dir("overflow");
    let p = project("60", &["6", "4"]);
    let mut opts = ExportOpts::new(&dir);
    opts.max_frames = 20;

    let err = export_project(&p, &opts).unwrap_err();
    assert!(matches!(
        err,
        CheckergenError::FrameOverflow { frames: 30, max: 20 }
    ));
    assert!(!dir.join("stim").exists());

    opts.force = true;
    let stats = export_project(&p, &opts).unwrap();
    assert_eq!(stats.frames, 30);
    assert!(dir.join("stim").join("stim29.png").is_file());
}

#[test]
fn declined_confirmation_writes_nothing() {
    let dir = scratch_dir("confirm");
    let p = project("60", &["6"]);
    let mut opts = ExportOpts::new(&dir);
    opts.max_frames = 5;

    let mut asked = 0;
    let err = export_project_with(&p, &opts, &mut |plan| {
        asked += 1;
        assert_eq!(plan.frames, 10);
        false
    })
    .unwrap_err();
    assert!(matches!(err, CheckergenError::ExportCancelled));
    assert_eq!(asked, 1);
    assert!(!dir.join("stim").exists());

    let stats = export_project_with(&p, &opts, &mut |_| true).unwrap();
    assert_eq!(stats.frames, 10);
    assert!(dir.join("stim").join("stim9.png").is_file());
}

#[test]
fn export_leaves_the_live_project_alone() {
    let dir = scratch_dir("snapshot");
    let mut p = project("60", &["6"]);
    p.boards_mut()[0].advance(Fps::default());
    let phase = p.boards()[0].cur_phase();

    let mut opts = ExportOpts::new(&dir);
    opts.folder = false;
    export_project(&p, &opts).unwrap();
    assert_eq!(p.boards()[0].cur_phase(), phase);
    assert!(dir.join("stim0.png").is_file());
}
