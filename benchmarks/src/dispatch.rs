use std::time::Instant;

use glidelink::core::driver::DriverCatalogue;
use glidelink::core::io::TransportInfo;
use glidelink::core::utils::nmea;
use glidelink::core::{Binding, Devices, DevicesConf};
use glidelink::prelude::*;

fn make_lines() -> Vec<String> {
    vec![
        nmea::frame("GPGGA,120000,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,"),
        nmea::frame("GPRMC,120000,A,4807.038,N,01131.000,E,20.0,84.4,230394,,"),
        nmea::frame("LXWP0,Y,90.0,1234.5,1.2,,,,,,239,180,36"),
        nmea::frame("LXWP2,1.5,1.0,5"),
        "garbage line\r\n".to_string(),
    ]
}

/// Delivers `n_iter` rounds of mixed sentences to two channels, the first one piped into the
/// second.
pub fn benchmark_dispatch(n_iter: usize) {
    let mut devices = Devices::new(DriverCatalogue::builtin(), DevicesConf::default());
    let (vario_port, _vario_rx) = Port::new(TransportInfo::Null);
    let (gps_port, mut gps_rx) = Port::new(TransportInfo::Null);

    devices
        .bind(
            SlotId::new(0),
            &Binding::new("LX").pipe_to(SlotId::new(1)),
            vario_port,
            Instant::now(),
        )
        .unwrap();
    devices
        .bind(SlotId::new(1), &Binding::new("LX GPS"), gps_port, Instant::now())
        .unwrap();

    let lines = make_lines();
    let n_lines = n_iter * lines.len() * 2;
    let start = Instant::now();

    for _ in 0..n_iter {
        for line in &lines {
            for index in 0..2 {
                devices
                    .on_line_received(SlotId::new(index), line.as_bytes(), Instant::now())
                    .unwrap();
            }
            // Keep the relay queue from filling up.
            while gps_rx.try_recv().is_ok() {}
        }
    }

    let elapsed = start.elapsed();
    log::info!(
        "dispatched {n_lines} lines in {elapsed:?}, {:.0} lines/s",
        n_lines as f64 / elapsed.as_secs_f64()
    );
    log::info!("stats: {:?}", devices.channels()[0].stats());
}
