use super::*;

fn scratch_file(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_signal");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, b"").unwrap();
    path
}

#[test]
fn codes_match_trigger_protocol() {
    assert_eq!(Signal::GroupStart.code(), Some(0b0010_1010));
    assert_eq!(Signal::GroupStop.code(), Some(0b0001_0001));
    assert_eq!(Signal::None.code(), None);
}

#[test]
fn session_fans_out_to_every_port() {
    let a = RecordingPort::new();
    let b = RecordingPort::new();
    let mut s = SignalSession::new();
    s.add_port(Box::new(a.clone()));
    s.add_port(Box::new(b.clone()));
    s.send(Signal::GroupStart).unwrap();
    s.send(Signal::None).unwrap();
    s.close().unwrap();
    assert_eq!(a.sent(), vec![Some(GROUP_START), None]);
    assert_eq!(b.sent(), a.sent());
    assert!(a.is_closed() && b.is_closed());
    assert!(s.is_empty());
}

#[test]
fn dropping_the_session_closes_ports() {
    let port = RecordingPort::new();
    {
        let mut s = SignalSession::new();
        s.add_port(Box::new(port.clone()));
    }
    assert!(port.is_closed());
}

#[test]
fn serial_line_writes_ascii_codes() {
    let mut line = SerialLine::from_writer("mem", Vec::new());
    line.send(Signal::GroupStart).unwrap();
    line.send(Signal::None).unwrap();
    line.send(Signal::GroupStop).unwrap();
    line.close().unwrap();
    assert_eq!(line.get_ref().as_slice(), b"4217");
}

#[test]
fn default_ports_run_at_9600_baud() {
    let ports = SignalPorts::default();
    assert_eq!(ports.baud, DEFAULT_BAUD);
    assert_eq!(DEFAULT_BAUD, 9600);
    assert!(SignalSession::open(&ports).unwrap().is_empty());
}

#[test]
fn parallel_device_writes_raw_bytes_and_clears() {
    let path = scratch_file("parallel");
    let ports = SignalPorts {
        parallel: Some(path.clone()),
        ..SignalPorts::default()
    };
    let mut s = SignalSession::open(&ports).unwrap();
    s.send(Signal::GroupStart).unwrap();
    s.send(Signal::None).unwrap();
    s.close().unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), vec![0, GROUP_START, 0, 0]);
}

#[test]
fn missing_devices_are_errors() {
    let missing = PathBuf::from("target/unit_signal/does/not/exist");
    let serial = SignalPorts {
        serial: Some(missing.clone()),
        ..SignalPorts::default()
    };
    assert!(SignalSession::open(&serial).is_err());
    let parallel = SignalPorts {
        parallel: Some(missing),
        ..SignalPorts::default()
    };
    assert!(SignalSession::open(&parallel).is_err());
}
