// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::{GeolocationError, GeolocationSource};
use common::position::Position;
use futures::StreamExt;
use gpsd_proto::{Mode, Tpv};
use std::{
    io::{self, Error, ErrorKind},
    net::SocketAddr,
    sync::{
        Arc, RwLock,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::{io::AsyncWriteExt, net::TcpStream, time::Instant};
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{debug, error, info};

/// Default age after which a gpsd fix is no longer handed out.
pub const DEFAULT_MAX_FIX_AGE: Duration = Duration::from_secs(10);

/// Latest fix reported by gpsd together with its arrival time.
#[derive(Debug, Clone, Copy)]
struct Fix {
    position: Position,
    received: Instant,
}

/// State shared between the gpsd reader task and the source
#[derive(Debug, Default)]
struct GpsdShared {
    latest_fix: RwLock<Option<Fix>>,
    connected: AtomicBool,
}

impl GpsdShared {
    fn process_tpv_msg(&self, tpv: &Tpv) {
        if matches!(tpv.mode, Mode::NoFix) {
            return;
        }
        let Some(lat) = tpv.lat else { return };
        let Some(lon) = tpv.lon else { return };
        let fix = Fix {
            position: Position::new(lat, lon),
            received: Instant::now(),
        };
        debug!("gpsd fix {:?}", fix.position);
        let mut latest_fix = self
            .latest_fix
            .write()
            .unwrap_or_else(|fix| fix.into_inner());
        *latest_fix = Some(fix);
    }
}

async fn gpsd_reader(mut stream: TcpStream, shared: Arc<GpsdShared>) {
    if let Err(e) = stream
        .write_all(gpsd_proto::ENABLE_WATCH_CMD.as_bytes())
        .await
    {
        error!("Failed to enable gpsd watch mode. Error: {e}");
        shared.connected.store(false, Ordering::Release);
        return;
    }
    let mut framed = Framed::new(stream, LinesCodec::new());
    while let Some(result) = framed.next().await {
        match result {
            Ok(ref line) => {
                if let Ok(tpv) = serde_json::from_str::<Tpv>(line) {
                    shared.process_tpv_msg(&tpv);
                }
            }
            Err(e) => {
                error!("gpsd receive error {e:?}");
            }
        }
    }
    info!("gpsd connection closed");
    shared.connected.store(false, Ordering::Release);
}

/// A geolocation source backed by a gpsd daemon.
///
/// The source keeps the latest TPV fix reported by gpsd and hands it out on
/// request. Fixes older than the configured maximum age are rejected with
/// [`GeolocationError::Timeout`].
pub struct GpsdGeolocation {
    shared: Arc<GpsdShared>,
    max_fix_age: Duration,
    reader_handle: tokio::task::JoinHandle<()>,
}

impl GpsdGeolocation {
    /// Connects to the gpsd daemon at `address` and enables the watch mode.
    pub async fn new(address: &str, max_fix_age: Duration) -> Result<Self, Error> {
        let address: SocketAddr = match address.parse() {
            Ok(addr) => addr,
            Err(e) => return Err(io::Error::new(ErrorKind::InvalidInput, e)),
        };
        let socket = TcpStream::connect(address).await?;
        info!("Connected to gpsd on {address}");
        let shared = Arc::new(GpsdShared::default());
        shared.connected.store(true, Ordering::Release);
        let reader_shared = shared.clone();
        let reader_handle = tokio::spawn(async move { gpsd_reader(socket, reader_shared).await });
        Ok(GpsdGeolocation {
            shared,
            max_fix_age,
            reader_handle,
        })
    }
}

#[async_trait::async_trait]
impl GeolocationSource for GpsdGeolocation {
    fn is_available(&self) -> bool {
        self.shared.connected.load(Ordering::Acquire)
    }

    async fn current_position(&self) -> Result<Position, GeolocationError> {
        if !self.is_available() {
            return Err(GeolocationError::Unavailable);
        }
        let latest_fix = *self
            .shared
            .latest_fix
            .read()
            .unwrap_or_else(|fix| fix.into_inner());
        match latest_fix {
            None => Err(GeolocationError::PositionUnavailable),
            Some(fix) if fix.received.elapsed() > self.max_fix_age => {
                Err(GeolocationError::Timeout)
            }
            Some(fix) => Ok(fix.position),
        }
    }
}

impl Drop for GpsdGeolocation {
    fn drop(&mut self) {
        self.reader_handle.abort();
    }
}
