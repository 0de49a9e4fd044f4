use pathtile_compute::{
    get_session_preset, BufferParams, ConfigError, CpuDevice, Device, RenderBuffer, Session, SessionConfig,
    SessionError,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn flat_kernel(_x: u32, _y: u32, _sample: u32) -> f32 {
    1.0
}

#[test]
fn big_tiles_receive_every_sample() {
    init_logging();
    let session = Session::new(SessionConfig {
        samples: 12,
        threads: 4,
        use_auto_tile: true,
        tile_size: 32,
        start_samples: 1,
        max_samples_per_step: 4,
        ..SessionConfig::default()
    })
    .unwrap();
    let cpu = CpuDevice::new(flat_kernel, 3).with_path_states(100);
    let small = CpuDevice::new(flat_kernel, 1).with_path_states(40);

    let mut done: Vec<BufferParams> = Vec::new();
    let progress = session
        .render(70, 45, &[&cpu, &small], |params, buffer: &RenderBuffer| {
            assert_eq!(buffer.sample_count_range(), (12, 12), "tile {params:?}");
            assert!(buffer.means().iter().all(|&m| m == 1.0));
            done.push(*params);
        })
        .unwrap();

    assert_eq!(done.len(), 6);
    let covered: u64 = done.iter().map(BufferParams::num_pixels).sum();
    assert_eq!(covered, 70 * 45);
    assert!(progress.is_complete);
    assert_eq!(progress.completed_tiles, 6);
    assert_eq!(progress.completed_samples, 6 * 12);
}

#[test]
fn samples_use_configured_offset() {
    init_logging();
    let seen_max = AtomicU32::new(0);
    let seen_min = AtomicU32::new(u32::MAX);
    let kernel = |_x: u32, _y: u32, sample: u32| {
        seen_max.fetch_max(sample, Ordering::Relaxed);
        seen_min.fetch_min(sample, Ordering::Relaxed);
        0.0_f32
    };
    let session = Session::new(SessionConfig {
        samples: 5,
        sample_offset: 20,
        use_auto_tile: false,
        ..SessionConfig::default()
    })
    .unwrap();
    let device = CpuDevice::new(kernel, 2).with_path_states(16);

    session.render(9, 9, &[&device], |_, _| {}).unwrap();

    assert_eq!(seen_min.load(Ordering::Relaxed), 20);
    assert_eq!(seen_max.load(Ordering::Relaxed), 24);
}

#[test]
fn configured_threads_drive_cpu_queues() {
    init_logging();
    let workers = Mutex::new(HashSet::new());
    let kernel = |_x: u32, _y: u32, _sample: u32| {
        workers.lock().unwrap().insert(thread::current().id());
        thread::sleep(Duration::from_micros(500));
        0.0_f32
    };
    let session = Session::new(SessionConfig {
        samples: 1,
        threads: 4,
        use_auto_tile: false,
        ..SessionConfig::default()
    })
    .unwrap();
    let device = CpuDevice::new(kernel, 1).with_path_states(16);

    session.render(16, 16, &[&device], |_, _| {}).unwrap();

    assert_eq!(workers.lock().unwrap().len(), 4);
}

#[test]
fn time_limit_ends_each_tile_early() {
    init_logging();
    let slow = |_x: u32, _y: u32, _sample: u32| {
        std::thread::sleep(Duration::from_micros(200));
        0.0_f32
    };
    let session = Session::new(SessionConfig {
        samples: 10_000,
        time_limit: 0.05,
        use_auto_tile: false,
        start_samples: 1,
        max_samples_per_step: 2,
        ..SessionConfig::default()
    })
    .unwrap();
    let device = CpuDevice::new(slow, 2).with_path_states(64);

    let mut counts = None;
    let progress = session
        .render(8, 8, &[&device], |_, buffer| counts = Some(buffer.sample_count_range()))
        .unwrap();

    let (min, max) = counts.unwrap();
    assert_eq!(min, max);
    assert!(max >= 1 && max < 10_000);
    assert!(progress.completed_samples < 10_000);
    assert_eq!(progress.completed_tiles, 1);
}

#[test]
fn quick_cancel_from_kernel_stops_render() {
    init_logging();
    let session = Session::new(SessionConfig {
        samples: 64,
        use_auto_tile: true,
        tile_size: 16,
        ..SessionConfig::default()
    })
    .unwrap();
    let control = session.control();
    let rendered = AtomicU32::new(0);
    let kernel = |_x: u32, _y: u32, _sample: u32| {
        if rendered.fetch_add(1, Ordering::Relaxed) == 500 {
            control.cancel(true);
        }
        0.0_f32
    };
    let device = CpuDevice::new(kernel, 2).with_path_states(32);

    let mut tiles_done = 0;
    let progress = session
        .render(64, 64, &[&device], |_, _| tiles_done += 1)
        .unwrap();

    assert!(!progress.is_complete);
    assert_eq!(progress.completed_tiles, 0);
    assert_eq!(tiles_done, 1);
    assert!(rendered.load(Ordering::Relaxed) < 64 * 64 * 64);
}

#[test]
fn presets_render() {
    init_logging();
    let config = get_session_preset("preview").unwrap().config;
    let session = Session::new(config).unwrap();
    let device = CpuDevice::new(flat_kernel, 2);

    let progress = session.render(24, 16, &[&device], |_, _| {}).unwrap();
    assert!(progress.is_complete);
}

#[test]
fn errors_are_reported() {
    let session = Session::new(SessionConfig::default()).unwrap();
    let no_devices: &[&dyn Device] = &[];
    let err = session.render(4, 4, no_devices, |_, _| {}).unwrap_err();
    assert!(matches!(err, SessionError::NoDevices));
    assert_eq!(err.to_string(), "No render devices given");

    let err = Session::new(SessionConfig {
        start_samples: 0,
        ..SessionConfig::default()
    })
    .err()
    .unwrap();
    assert!(matches!(
        err,
        SessionError::Config(ConfigError::InvalidStepSamples { start: 0, .. })
    ));
}
