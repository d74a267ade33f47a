use std::time::Instant;

use tokio::io::AsyncWriteExt;

use glidelink::asnc::transport::MemoryTransport;
use glidelink::asnc::{DeviceManager, ManagerConf, SlotConf};
use glidelink::core::driver::DriverCatalogue;
use glidelink::core::utils::nmea;
use glidelink::core::Binding;
use glidelink::prelude::*;

/// Streams `n_iter` LX sentences through each of two in-memory links.
pub async fn benchmark_async_dispatch(n_iter: usize) {
    let (vario, mut vario_device) = MemoryTransport::pair("vario");
    let (gps, mut gps_device) = MemoryTransport::pair("gps");

    let conf = ManagerConf::builder()
        .slot(SlotId::new(0), SlotConf::new(Binding::new("LX"), vario))
        .slot(SlotId::new(1), SlotConf::new(Binding::new("LX GPS"), gps))
        .build();
    let manager = DeviceManager::start(conf, DriverCatalogue::builtin()).await;

    let line = nmea::frame("LXWP0,Y,90.0,1234.5,1.2,,,,,,239,180,36");
    let start = Instant::now();

    let vario_writer = {
        let line = line.clone();
        tokio::spawn(async move {
            for _ in 0..n_iter {
                vario_device.write_all(line.as_bytes()).await.unwrap();
            }
            vario_device
        })
    };
    let gps_writer = tokio::spawn(async move {
        for _ in 0..n_iter {
            gps_device.write_all(line.as_bytes()).await.unwrap();
        }
        gps_device
    });
    let _vario_device = vario_writer.await.unwrap();
    let _gps_device = gps_writer.await.unwrap();

    loop {
        let handled: u64 = manager
            .devices()
            .await
            .channels()
            .iter()
            .map(|channel| channel.stats().handled)
            .sum();
        if handled >= 2 * n_iter as u64 {
            break;
        }
        tokio::task::yield_now().await;
    }

    let elapsed = start.elapsed();
    log::info!(
        "dispatched {} lines over two links in {elapsed:?}, {:.0} lines/s",
        2 * n_iter,
        2.0 * n_iter as f64 / elapsed.as_secs_f64()
    );

    manager.shutdown().await;
}
