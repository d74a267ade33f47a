mod common;

use std::time::{Duration, Instant};

use glidelink::core::declaration::{Declaration, Waypoint};
use glidelink::core::io::{PortReceiver, TransportInfo};
use glidelink::core::nav::GeoPoint;
use glidelink::core::utils::nmea;
use glidelink::core::{Binding, DeviceEvent, Devices, DevicesConf, Dispatch, LinkState};
use glidelink::prelude::*;

use common::{catalogue, initialize, Calls, TestDriver};

const TIMEOUT: Duration = Duration::from_secs(10);

fn make_devices(drivers: Vec<TestDriver>) -> Devices {
    initialize();
    Devices::new(
        catalogue(drivers),
        DevicesConf::builder().link_timeout(TIMEOUT).build(),
    )
}

fn bind(devices: &mut Devices, index: usize, binding: Binding, now: Instant) -> PortReceiver {
    let (port, rx) = Port::new(TransportInfo::Memory {
        name: format!("device-{index}"),
    });
    devices
        .bind(SlotId::new(index), &binding, port, now)
        .unwrap();
    rx
}

fn slot(index: usize) -> SlotId {
    SlotId::new(index)
}

#[test]
fn single_baro_source_becomes_primary() {
    let mut devices = make_devices(vec![TestDriver::new("Baro").baro()]);
    let _rx = bind(&mut devices, 0, Binding::new("Baro"), Instant::now());

    assert_eq!(devices.baro_sources().primary(), Some(slot(0)));
    assert_eq!(devices.baro_sources().secondary(), None);
    assert!(devices.has_baro_source());
    assert!(devices.is_baro_source(slot(0)).unwrap());
    assert!(!devices.channels()[1].is_bound());
}

#[test]
fn secondary_baro_source_is_promoted() {
    let mut devices = make_devices(vec![TestDriver::new("Baro").baro()]);
    let now = Instant::now();
    let _rx0 = bind(&mut devices, 0, Binding::new("Baro"), now);
    let _rx1 = bind(&mut devices, 1, Binding::new("Baro"), now);

    assert_eq!(devices.baro_sources().primary(), Some(slot(0)));
    assert_eq!(devices.baro_sources().secondary(), Some(slot(1)));

    devices.unbind(slot(0)).unwrap();

    assert_eq!(devices.baro_sources().primary(), Some(slot(1)));
    assert_eq!(devices.baro_sources().secondary(), None);
}

#[test]
fn rebinding_primary_to_non_baro_driver_rearbitrates() {
    let mut devices = make_devices(vec![
        TestDriver::new("Baro").baro(),
        TestDriver::new("Plain"),
    ]);
    let now = Instant::now();
    let _rx0 = bind(&mut devices, 0, Binding::new("Baro"), now);
    let _rx1 = bind(&mut devices, 1, Binding::new("Baro"), now);

    devices
        .on_line_received(slot(1), b"$TEST,2000", now)
        .unwrap();
    assert_eq!(devices.nav().baro_altitude, None);

    let _rx0 = bind(&mut devices, 0, Binding::new("Plain"), now);
    assert_eq!(devices.baro_sources().primary(), Some(slot(1)));

    devices
        .on_line_received(slot(1), b"$TEST,2000", now)
        .unwrap();
    assert_eq!(devices.baro_altitude(), Some(2000.0));
}

#[test]
fn silent_channel_gets_one_timeout_call_per_tick() {
    let driver = TestDriver::new("Silent");
    let calls = driver.calls();
    let mut devices = make_devices(vec![driver]);
    let start = Instant::now();
    let _rx = bind(&mut devices, 0, Binding::new("Silent"), start);

    devices.on_tick(start + Duration::from_secs(5));
    assert_eq!(Calls::get(&calls.link_timeouts), 0);

    let report = devices.on_tick(start + TIMEOUT + Duration::from_secs(1));
    assert_eq!(report.timed_out, vec![slot(0)]);
    assert_eq!(report.restarted, vec![slot(0)]);
    assert_eq!(Calls::get(&calls.link_timeouts), 1);
    assert_eq!(Calls::get(&calls.closes), 1);
    assert_eq!(Calls::get(&calls.opens), 2);
    assert_eq!(devices.channels()[0].state(), LinkState::Healthy);
}

#[test]
fn recovered_channel_is_not_restarted() {
    let driver = TestDriver::new("Resilient").recovering();
    let calls = driver.calls();
    let mut devices = make_devices(vec![driver]);
    let start = Instant::now();
    let _rx = bind(&mut devices, 0, Binding::new("Resilient"), start);

    let report = devices.on_tick(start + TIMEOUT * 2);

    assert_eq!(report.recovered, vec![slot(0)]);
    assert!(report.restarted.is_empty());
    assert_eq!(Calls::get(&calls.opens), 1);
    assert_eq!(Calls::get(&calls.closes), 0);
}

#[test]
fn failed_channel_does_not_affect_others() {
    let fragile = TestDriver::new("Fragile").baro();
    let mut devices = make_devices(vec![fragile, TestDriver::new("Baro").baro()]);
    let mut events = devices.subscribe();
    let start = Instant::now();
    let _rx0 = bind(&mut devices, 0, Binding::new("Fragile"), start);
    let _rx1 = bind(&mut devices, 1, Binding::new("Baro"), start);

    let later = start + TIMEOUT + Duration::from_secs(1);
    devices.on_line_received(slot(1), b"$TEST,100", later).unwrap();
    let report = devices.on_tick(later);

    assert_eq!(report.failed, vec![slot(0)]);
    assert_eq!(devices.channels()[0].state(), LinkState::Failed);
    assert_eq!(devices.baro_sources().primary(), Some(slot(1)));

    let dispatch = devices.on_line_received(slot(0), b"$TEST,100", later).unwrap();
    assert_eq!(dispatch, Dispatch::Ignored);
    let dispatch = devices.on_line_received(slot(1), b"$TEST,200", later).unwrap();
    assert_eq!(dispatch, Dispatch::Handled);
    assert_eq!(devices.baro_altitude(), Some(200.0));

    let failed = std::iter::from_fn(|| events.try_recv().ok())
        .any(|event| matches!(event, DeviceEvent::Failed { slot, .. } if slot == SlotId::new(0)));
    assert!(failed);
}

#[test]
fn broadcast_counts_only_accepting_channels() {
    let mut devices = make_devices(vec![
        TestDriver::new("Setter").with_settings(),
        TestDriver::new("Plain"),
    ]);
    let now = Instant::now();
    let mut rx0 = bind(&mut devices, 0, Binding::new("Setter"), now);
    let _rx1 = bind(&mut devices, 1, Binding::new("Plain"), now);

    assert_eq!(devices.broadcast_mac_cready(2.0).unwrap(), 1);
    assert_eq!(devices.broadcast_ballast(0.5).unwrap(), 1);
    assert_eq!(devices.broadcast_qnh(1013.25).unwrap(), 0);

    assert_eq!(rx0.try_recv().unwrap(), nmea::frame("PTMC,2.0").into_bytes());
    assert_eq!(rx0.try_recv().unwrap(), nmea::frame("PTBAL,0.50").into_bytes());
}

#[test]
fn broadcast_without_devices_fails() {
    let devices = make_devices(vec![]);

    assert!(matches!(
        devices.broadcast_mac_cready(1.0),
        Err(Error::NoDeviceBound)
    ));
}

#[test]
fn pipe_relays_every_line_verbatim() {
    let mut devices = make_devices(vec![TestDriver::new("Radio")]);
    let now = Instant::now();
    let _rx0 = bind(
        &mut devices,
        0,
        Binding::new("Radio").pipe_to(slot(1)),
        now,
    );
    let mut rx1 = bind(&mut devices, 1, Binding::new("Generic"), now);

    let lines: [&[u8]; 3] = [
        b"$TEST,100\r\n",
        b"$PVFRQ,123.500*00\r\n",
        b"\x00\x01 binary junk\n",
    ];
    for line in &lines {
        devices.on_line_received(slot(0), line, now).unwrap();
    }

    for line in lines {
        assert_eq!(rx1.try_recv().unwrap(), line);
    }
    assert!(rx1.try_recv().is_err());
}

#[test]
fn builtin_drivers_merge_navigation_data() {
    let mut devices = make_devices(vec![]);
    let now = Instant::now();
    let _rx0 = bind(&mut devices, 0, Binding::new("LX GPS"), now);
    let _rx1 = bind(&mut devices, 1, Binding::new("LX"), now);

    let gga = nmea::frame("GPGGA,120000,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,");
    let lxwp0 = nmea::frame("LXWP0,Y,90.0,1234.5,1.2,,,,,,239,180,36");

    assert_eq!(
        devices.on_line_received(slot(0), gga.as_bytes(), now).unwrap(),
        Dispatch::Handled
    );
    assert_eq!(
        devices.on_line_received(slot(0), lxwp0.as_bytes(), now).unwrap(),
        Dispatch::Handled
    );
    assert_eq!(devices.baro_altitude(), None);

    devices
        .on_line_received(slot(1), lxwp0.as_bytes(), now)
        .unwrap();

    assert_eq!(devices.baro_sources().primary(), Some(slot(1)));
    assert_eq!(devices.baro_altitude(), Some(1234.5));
    assert_eq!(devices.nav().gps_altitude, Some(545.4));
    assert_eq!(devices.nav().vario, Some(1.2));
}

#[test]
fn declaration_reaches_loggers() {
    let mut devices = make_devices(vec![TestDriver::new("Plain")]);
    let now = Instant::now();
    let mut rx0 = bind(&mut devices, 0, Binding::new("LX"), now);
    let _rx1 = bind(&mut devices, 1, Binding::new("Plain"), now);
    // Stream request sent by the LX driver on open.
    rx0.try_recv().unwrap();

    let waypoints = vec![Waypoint::new("Start", GeoPoint::default(), 0.0).unwrap()];
    let declaration = Declaration::new("Pilot", "LS8", "D-1234", waypoints).unwrap();

    assert_eq!(devices.declare_all(&declaration).unwrap(), 1);
    assert!(rx0.try_recv().is_ok());
}

#[test]
fn shutdown_unbinds_everything() {
    let driver = TestDriver::new("Baro").baro();
    let calls = driver.calls();
    let mut devices = make_devices(vec![driver]);
    let now = Instant::now();
    let _rx0 = bind(&mut devices, 0, Binding::new("Baro"), now);
    let _rx1 = bind(&mut devices, 1, Binding::new("Baro"), now);

    devices.shutdown();

    assert!(devices.channels().iter().all(|channel| !channel.is_bound()));
    assert!(!devices.has_baro_source());
    assert_eq!(Calls::get(&calls.closes), 2);
    assert!(matches!(
        devices.broadcast_mac_cready(1.0),
        Err(Error::NoDeviceBound)
    ));
}

#[test]
fn binding_same_driver_twice_is_idempotent() {
    let drivers = || {
        vec![
            TestDriver::new("Baro").baro(),
            TestDriver::new("Plain"),
        ]
    };
    let now = Instant::now();

    let mut once = make_devices(drivers());
    let _rx0 = bind(&mut once, 0, Binding::new("Baro"), now);
    let _rx1 = bind(&mut once, 1, Binding::new("Baro"), now);

    let mut twice = make_devices(drivers());
    let _rx2 = bind(&mut twice, 0, Binding::new("Baro"), now);
    let _rx3 = bind(&mut twice, 1, Binding::new("Baro"), now);
    let _rx4 = bind(&mut twice, 1, Binding::new("Baro"), now);
    let _rx5 = bind(&mut twice, 0, Binding::new("Baro"), now);

    assert_eq!(once.baro_sources(), twice.baro_sources());
    assert_eq!(twice.baro_sources().primary(), Some(slot(0)));
    assert_eq!(twice.baro_sources().secondary(), Some(slot(1)));
}

#[test]
fn baro_sources_stay_consistent_across_rebinding() {
    const SLOTS: usize = 3;

    fn assert_consistent(devices: &Devices, step: usize) {
        let sources = devices.baro_sources();
        let is_valid = |source: Option<SlotId>| {
            source.map_or(true, |slot| {
                let channel = &devices.channels()[slot.index()];
                channel.is_operational() && channel.is_baro_source()
            })
        };

        assert!(is_valid(sources.primary()), "step {step}: {sources:?}");
        assert!(is_valid(sources.secondary()), "step {step}: {sources:?}");
        if sources.secondary().is_some() {
            assert!(sources.primary().is_some(), "step {step}: {sources:?}");
            assert_ne!(sources.primary(), sources.secondary(), "step {step}");
        }

        let baro_channels = devices
            .channels()
            .iter()
            .filter(|channel| channel.is_operational() && channel.is_baro_source())
            .count();
        assert_eq!(sources.is_available(), baro_channels > 0, "step {step}");
    }

    let mut devices = Devices::new(
        catalogue(vec![
            TestDriver::new("Baro").baro(),
            TestDriver::new("Plain"),
        ]),
        DevicesConf::builder()
            .slot_count(SLOTS)
            .link_timeout(TIMEOUT)
            .build(),
    );
    let now = Instant::now();

    let steps: &[(usize, Option<&str>)] = &[
        (0, Some("Baro")),
        (1, Some("Baro")),
        (2, Some("Baro")),
        (0, Some("Plain")),
        (1, None),
        (0, Some("Baro")),
        (2, Some("LX GPS")),
        (1, Some("LX")),
        (0, None),
        (1, Some("Baro")),
        (2, Some("Baro")),
        (1, None),
        (2, None),
        (0, Some("Condor")),
    ];

    let mut receivers = Vec::new();
    for (step, (index, driver)) in steps.iter().enumerate() {
        match driver {
            Some(driver) => receivers.push(bind(&mut devices, *index, Binding::new(*driver), now)),
            None => devices.unbind(slot(*index)).unwrap(),
        }
        assert_consistent(&devices, step);
    }
}
