#[cfg(feature = "async")]
use glidelink_benchmarks::asnc::benchmark_async_dispatch;
#[cfg(feature = "dispatch")]
use glidelink_benchmarks::dispatch::benchmark_dispatch;

fn main() {
    // Setup logger
    env_logger::builder()
        .filter_level(log::LevelFilter::Info) // Suppress everything below `info` for third-party modules.
        .filter_module(env!("CARGO_PKG_NAME"), log::LevelFilter::Trace) // Allow everything from current package
        .init();

    #[cfg(feature = "dispatch")]
    {
        log::info!("[benchmark_dispatch]");
        benchmark_dispatch(100_000);
    }

    #[cfg(feature = "async")]
    {
        log::info!("[benchmark_async_dispatch]");
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(benchmark_async_dispatch(10_000));
    }
}
