use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::asnc::event::EventStream;
use crate::asnc::link::{Link, LinkHandle};
use crate::asnc::monitor::Monitor;
use crate::asnc::transport::Transport;
use crate::consts::DEFAULT_TICK_INTERVAL;
use crate::core::declaration::Declaration;
use crate::core::driver::DriverCatalogue;
use crate::core::io::Retry;
use crate::core::{
    BaroSources, Binding, Command, DeviceEvent, Devices, DevicesConf, Dispatch, Expectation,
    Reconnect,
};

use crate::prelude::*;

/// <sup>[`async`](crate::asnc)</sup>
/// Binding of a slot together with the transport it talks over.
#[derive(Clone, Debug)]
pub struct SlotConf {
    binding: Binding,
    transport: Arc<dyn Transport>,
}

impl SlotConf {
    /// Creates slot configuration.
    pub fn new(binding: Binding, transport: impl Transport + 'static) -> Self {
        Self::shared(binding, Arc::new(transport))
    }

    /// Creates slot configuration with a shared transport.
    pub fn shared(binding: Binding, transport: Arc<dyn Transport>) -> Self {
        Self { binding, transport }
    }

    /// Driver binding.
    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    /// Transport.
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }
}

/// <sup>[`async`](crate::asnc)</sup>
/// Device manager configuration.
///
/// Instantiated through [`ManagerConf::builder`].
#[derive(Clone, Debug)]
pub struct ManagerConf {
    devices: DevicesConf,
    tick_interval: Duration,
    retry: Retry,
    slots: Vec<(SlotId, SlotConf)>,
}

impl ManagerConf {
    /// Creates a [`ManagerConfBuilder`] populated with default values.
    pub fn builder() -> ManagerConfBuilder {
        ManagerConfBuilder {
            conf: ManagerConf::default(),
        }
    }

    /// Registry configuration.
    pub fn devices(&self) -> &DevicesConf {
        &self.devices
    }

    /// Interval between health checks.
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Transport reconnect policy.
    pub fn retry(&self) -> Retry {
        self.retry
    }

    /// Slots bound at startup.
    pub fn slots(&self) -> &[(SlotId, SlotConf)] {
        &self.slots
    }
}

impl Default for ManagerConf {
    fn default() -> Self {
        Self {
            devices: DevicesConf::default(),
            tick_interval: DEFAULT_TICK_INTERVAL,
            retry: Retry::default(),
            slots: Vec::new(),
        }
    }
}

/// <sup>[`async`](crate::asnc)</sup>
/// Builder for [`ManagerConf`].
#[derive(Clone, Debug)]
pub struct ManagerConfBuilder {
    conf: ManagerConf,
}

impl ManagerConfBuilder {
    /// Sets registry configuration.
    pub fn devices(mut self, devices: DevicesConf) -> Self {
        self.conf.devices = devices;
        self
    }

    /// Sets interval between health checks.
    pub fn tick_interval(mut self, tick_interval: Duration) -> Self {
        self.conf.tick_interval = tick_interval;
        self
    }

    /// Sets transport reconnect policy.
    pub fn retry(mut self, retry: Retry) -> Self {
        self.conf.retry = retry;
        self
    }

    /// Adds a slot to bind at startup.
    pub fn slot(mut self, slot: SlotId, conf: SlotConf) -> Self {
        self.conf.slots.push((slot, conf));
        self
    }

    /// Builds configuration.
    pub fn build(self) -> ManagerConf {
        self.conf
    }
}

/// Link tasks and configuration of bound slots.
#[derive(Debug)]
pub(crate) struct LinkTable {
    links: Vec<Option<LinkHandle>>,
    slots: Vec<Option<SlotConf>>,
    devices: Arc<Mutex<Devices>>,
    retry: Retry,
    token: CancellationToken,
}

impl LinkTable {
    /// Spawns a link for `slot` and returns the port of its outbound queue.
    ///
    /// The traffic log of the binding is written by the link itself.
    fn spawn_link(&mut self, slot: SlotId, conf: &SlotConf) -> Port {
        let (port, outgoing) = Port::new(conf.transport.info());
        let link = Link {
            slot,
            transport: conf.transport.clone(),
            devices: self.devices.clone(),
            outgoing,
            retry: self.retry,
            token: self.token.child_token(),
            traffic_log: conf.binding.traffic_log.clone(),
        };
        self.links[slot.index()] = Some(link.spawn());
        port
    }

    async fn stop_link(&mut self, slot: SlotId) {
        if let Some(link) = self.links[slot.index()].take() {
            link.stop().await;
        }
    }

    /// Restores the transport of a channel restarted by the health monitor.
    ///
    /// A running link keeps its port. An exited link is replaced by a fresh one unless the
    /// transport can't be connected again.
    pub(crate) fn reconnect(&mut self, slot: SlotId, port: &Port) -> Reconnect {
        let running = self
            .links
            .get(slot.index())
            .and_then(Option::as_ref)
            .is_some_and(|link| !link.is_finished());
        if running && !port.is_closed() {
            return Reconnect::Keep;
        }

        let Some(conf) = self.slots.get(slot.index()).cloned().flatten() else {
            return Reconnect::Unavailable;
        };
        if !conf.transport.is_repairable() || self.token.is_cancelled() {
            return Reconnect::Unavailable;
        }

        if let Some(link) = self.links[slot.index()].take() {
            link.cancel();
        }
        log::debug!("[{slot}] spawning a new link to {:?}", conf.transport.info());
        Reconnect::Replace(self.spawn_link(slot, &conf))
    }
}

/// <sup>[`async`](crate::asnc)</sup>
/// Asynchronous device manager.
///
/// Owns the [`Devices`] registry, one link task per bound channel and the health monitor task.
///
/// # Usage
///
/// ```rust,no_run
/// # #[tokio::main(flavor = "current_thread")] async fn main() -> glidelink::error::Result<()> {
/// use glidelink::asnc::transport::TcpClient;
/// use glidelink::asnc::{DeviceManager, ManagerConf, SlotConf};
/// use glidelink::core::driver::DriverCatalogue;
/// use glidelink::core::Binding;
/// use glidelink::prelude::*;
///
/// let conf = ManagerConf::builder()
///     .slot(
///         SlotId::new(0),
///         SlotConf::new(Binding::new("Condor"), TcpClient::new("127.0.0.1:4353")?),
///     )
///     .build();
///
/// let manager = DeviceManager::start(conf, DriverCatalogue::builtin()).await;
/// manager.broadcast_mac_cready(1.5).await?;
///
/// manager.shutdown().await;
/// # Ok(())
/// # }
/// ```
///
/// Locks are always taken in the same order: the link table first, then the registry.
#[derive(Debug)]
pub struct DeviceManager {
    devices: Arc<Mutex<Devices>>,
    table: Arc<Mutex<LinkTable>>,
    token: CancellationToken,
    monitor: Mutex<Option<JoinHandle<()>>>,
}

impl DeviceManager {
    /// Starts the manager: spawns the health monitor and binds startup slots.
    ///
    /// Startup slots which fail to bind are logged and left unbound. Must be called within a
    /// Tokio runtime.
    pub async fn start(conf: ManagerConf, catalogue: DriverCatalogue) -> Self {
        let slot_count = conf.devices.slot_count();
        let devices = Arc::new(Mutex::new(Devices::new(catalogue, conf.devices)));
        let token = CancellationToken::new();
        let table = Arc::new(Mutex::new(LinkTable {
            links: (0..slot_count).map(|_| None).collect(),
            slots: vec![None; slot_count],
            devices: devices.clone(),
            retry: conf.retry,
            token: token.clone(),
        }));

        let monitor = Monitor {
            devices: devices.clone(),
            table: table.clone(),
            interval: conf.tick_interval,
            token: token.child_token(),
        }
        .spawn();

        let manager = Self {
            devices,
            table,
            token,
            monitor: Mutex::new(Some(monitor)),
        };

        for (slot, slot_conf) in conf.slots {
            if let Err(err) = manager.bind(slot, slot_conf).await {
                log::warn!("[{slot}] startup binding failed: {err}");
            }
        }
        log::debug!("device manager started with {slot_count} slots");

        manager
    }

    /// Binds a slot to a driver and spawns a link over the configured transport.
    ///
    /// The previous link of the slot, if any, is stopped first. Invalid bindings are rejected
    /// before the current binding is touched.
    pub async fn bind(&self, slot: SlotId, conf: SlotConf) -> Result<()> {
        let mut table = self.table.lock().await;
        if self.token.is_cancelled() {
            return Err(Error::Shutdown);
        }
        self.devices
            .lock()
            .await
            .check_binding(slot, &conf.binding)?;

        table.stop_link(slot).await;
        table.slots[slot.index()] = None;

        let port = table.spawn_link(slot, &conf);
        let mut binding = conf.binding.clone();
        binding.traffic_log = None;
        if let Err(err) = self.devices.lock().await.bind(slot, &binding, port, now()) {
            table.stop_link(slot).await;
            return Err(err);
        }
        table.slots[slot.index()] = Some(conf);

        Ok(())
    }

    /// Unbinds a slot and stops its link.
    pub async fn unbind(&self, slot: SlotId) -> Result<()> {
        let mut table = self.table.lock().await;
        self.devices.lock().await.check_slot(slot)?;

        table.stop_link(slot).await;
        table.slots[slot.index()] = None;

        self.devices.lock().await.unbind(slot)
    }

    /// Rebinds every bound slot with its current configuration, reconnecting the transports.
    ///
    /// Returns the number of slots bound successfully. Transports which can be connected only
    /// once, like [`MemoryTransport`](crate::asnc::transport::MemoryTransport), stay silent after
    /// a restart.
    pub async fn restart_all(&self) -> Result<usize> {
        if self.token.is_cancelled() {
            return Err(Error::Shutdown);
        }

        let slots: Vec<(SlotId, SlotConf)> = {
            let table = self.table.lock().await;
            table
                .slots
                .iter()
                .enumerate()
                .filter_map(|(index, conf)| Some((SlotId::new(index), conf.clone()?)))
                .collect()
        };

        let mut restarted = 0;
        for (slot, conf) in slots {
            match self.bind(slot, conf).await {
                Ok(_) => restarted += 1,
                Err(err) => log::warn!("[{slot}] restart failed: {err}"),
            }
        }
        log::debug!("{restarted} devices restarted");

        Ok(restarted)
    }

    /// Stops all links and the health monitor, then unbinds every channel.
    ///
    /// Calling it more than once is harmless.
    pub async fn shutdown(&self) {
        self.token.cancel();

        {
            let mut table = self.table.lock().await;
            for link in table.links.iter_mut().filter_map(Option::take) {
                link.stop().await;
            }
            table.slots.iter_mut().for_each(|conf| *conf = None);

            self.devices.lock().await.shutdown();
        }

        if let Some(monitor) = self.monitor.lock().await.take() {
            if let Err(err) = monitor.await {
                log::error!("health monitor failed: {err}");
            }
        }

        log::debug!("device manager is shut down");
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) has been requested.
    pub fn is_shut_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Locks the registry.
    ///
    /// Link tasks and the health monitor wait while the guard is held.
    pub async fn devices(&self) -> MutexGuard<'_, Devices> {
        self.devices.lock().await
    }

    /// Delivers a line as if it was received by the channel at `slot`.
    pub async fn on_line_received(&self, slot: SlotId, raw: &[u8]) -> Result<Dispatch> {
        self.devices.lock().await.on_line_received(slot, raw, now())
    }

    /// Sends a command to the channel at `slot`.
    pub async fn command(&self, slot: SlotId, command: &Command) -> Result<Outcome> {
        self.devices.lock().await.command(slot, command)
    }

    /// Sends a command to every bound channel, returns the number of accepting channels.
    pub async fn broadcast(&self, command: &Command) -> Result<usize> {
        self.devices.lock().await.broadcast(command)
    }

    /// Broadcasts MacCready setting, m/s.
    pub async fn broadcast_mac_cready(&self, value: f64) -> Result<usize> {
        self.broadcast(&Command::MacCready(value)).await
    }

    /// Broadcasts QNH, hPa.
    pub async fn broadcast_qnh(&self, value: f64) -> Result<usize> {
        self.broadcast(&Command::Qnh(value)).await
    }

    /// Uploads a task declaration to every bound flight recorder.
    pub async fn declare_all(&self, declaration: &Declaration) -> Result<usize> {
        self.devices.lock().await.declare_all(declaration)
    }

    /// Starts watching the channel at `slot` for a line containing `token`.
    ///
    /// Register the expectation before sending the command the device acknowledges, then wait
    /// for it with a timeout:
    ///
    /// ```rust,no_run
    /// # use std::time::Duration;
    /// # use glidelink::asnc::DeviceManager;
    /// # use glidelink::core::Command;
    /// # use glidelink::prelude::*;
    /// # async fn confirm(manager: &DeviceManager) -> Result<bool> {
    /// let slot = SlotId::new(0);
    /// let ack = manager.expect(slot, "PFLX2").await?;
    /// manager.command(slot, &Command::MacCready(1.5)).await?;
    ///
    /// Ok(tokio::time::timeout(Duration::from_secs(2), ack.wait())
    ///     .await
    ///     .unwrap_or(false))
    /// # }
    /// ```
    pub async fn expect(&self, slot: SlotId, token: &str) -> Result<Expectation> {
        self.devices.lock().await.expect(slot, token)
    }

    /// Snapshot of the navigation state.
    pub async fn nav(&self) -> NavInfo {
        self.devices.lock().await.nav().clone()
    }

    /// Current barometric altitude sources.
    pub async fn baro_sources(&self) -> BaroSources {
        self.devices.lock().await.baro_sources()
    }

    /// Subscribes to device events.
    pub async fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.devices.lock().await.subscribe()
    }

    /// Stream of device events.
    pub async fn events(&self) -> EventStream {
        EventStream::new(self.subscribe().await)
    }
}

impl Drop for DeviceManager {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}
