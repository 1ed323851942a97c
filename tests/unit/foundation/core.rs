use super::*;

#[test]
fn fps_parses_integer_decimal_and_ratio() {
    assert_eq!("60".parse::<Fps>().unwrap(), Fps::new(60, 1).unwrap());
    assert_eq!("59.94".parse::<Fps>().unwrap(), Fps::new(2997, 50).unwrap());
    assert_eq!(
        "30000/1001".parse::<Fps>().unwrap(),
        Fps::new(30000, 1001).unwrap()
    );
    assert!("0".parse::<Fps>().is_err());
    assert!("-5".parse::<Fps>().is_err());
    assert!("60/0".parse::<Fps>().is_err());
    assert!("fast".parse::<Fps>().is_err());
}

#[test]
fn fps_is_kept_in_lowest_terms() {
    let fps = Fps::new(120, 2).unwrap();
    assert_eq!((fps.num, fps.den), (60, 1));
}

#[test]
fn fps_display_prefers_decimal_when_exact() {
    assert_eq!(Fps::new(60, 1).unwrap().to_string(), "60");
    assert_eq!(Fps::new(2997, 50).unwrap().to_string(), "59.94");
    assert_eq!(Fps::new(30000, 1001).unwrap().to_string(), "30000/1001");
}

#[test]
fn fps_frame_duration() {
    let d = Fps::new(50, 1).unwrap().frame_duration();
    assert_eq!(d.as_millis(), 20);
}

#[test]
fn resolution_rejects_zero() {
    assert!(Resolution::new(0, 600).is_err());
    assert_eq!(Resolution::default().to_string(), "800,600");
}

#[test]
fn color_parses_all_notations() {
    assert_eq!("255;0;0".parse::<Rgb8>().unwrap(), Rgb8::new(255, 0, 0));
    assert_eq!("1,2,3".parse::<Rgb8>().unwrap(), Rgb8::new(1, 2, 3));
    assert_eq!("#0a0B0c".parse::<Rgb8>().unwrap(), Rgb8::new(10, 11, 12));
    assert_eq!("White".parse::<Rgb8>().unwrap(), Rgb8::WHITE);
    assert!("256;0;0".parse::<Rgb8>().is_err());
    assert!("1;2".parse::<Rgb8>().is_err());
    assert!("#12345".parse::<Rgb8>().is_err());
    assert!("chartreuse".parse::<Rgb8>().is_err());
}

#[test]
fn color_display_roundtrips_through_parse() {
    let c = Rgb8::new(12, 34, 56);
    assert_eq!(c.to_string().parse::<Rgb8>().unwrap(), c);
}

#[test]
fn deserialization_goes_through_the_constructors() {
    let fps: Fps = serde_json::from_str(r#"{"num": 120, "den": 2}"#).unwrap();
    assert_eq!((fps.num, fps.den), (60, 1));
    assert!(serde_json::from_str::<Fps>(r#"{"num": 0, "den": 1}"#).is_err());
    assert!(serde_json::from_str::<Fps>(r#"{"num": 60, "den": 0}"#).is_err());

    let res: Resolution = serde_json::from_str(r#"{"width": 640, "height": 480}"#).unwrap();
    assert_eq!(res, Resolution::new(640, 480).unwrap());
    assert!(serde_json::from_str::<Resolution>(r#"{"width": 0, "height": 480}"#).is_err());
}
