// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

mod console;
mod positions;

use anyhow::{Context, Result, anyhow, bail};
use clap::{CommandFactory, Parser};
use common::{config::TrackerConfig, position::BusInfo};
use console::{ConsoleInput, ConsoleUi};
use fleet_monitor::{DEFAULT_MAP_CENTER, DEFAULT_MAP_ZOOM, FleetMonitor};
use futures::future::join_all;
use geolocation::{
    GeolocationSource, UnavailableGeolocation,
    constant_source::ConstantGeolocation,
    gpsd_source::{DEFAULT_MAX_FIX_AGE, GpsdGeolocation},
};
use location_api::HttpLocationApi;
use module_core::{Event, EventBus, EventKind, Module};
use std::{path::PathBuf, sync::Arc};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;
use tracking_session::TrackingSession;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file, defaults to <config dir>/bus_tracker/config.json
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Base URL of the bus tracking server
    #[arg(short, long)]
    server: Option<String>,
    /// Bus whose position is reported while tracking
    #[arg(short, long)]
    bus_id: Option<String>,
    /// Start tracking right away instead of waiting for <Enter>
    #[arg(long)]
    start: bool,
    #[arg(short, long)]
    gps_fake: bool,
    #[arg(short = 'f', long)]
    gps_source_file: Option<String>,
    /// Use the gpsd daemon at this address as geolocation source
    #[arg(short = 'd', long, value_name = "ADDR")]
    gpsd: Option<String>,
    /// Bus numbers to show on the marker board
    #[arg(short, long)]
    watch: Vec<String>,
    /// JSON bus list `[{"bus_number", "latitude", "longitude"}]` to seed the marker board
    #[arg(long)]
    bus_list: Option<PathBuf>,
    #[arg(long)]
    report_period_ms: Option<u64>,
}

fn default_config_path() -> Option<PathBuf> {
    let mut path = dirs::config_dir()?;
    path.push("bus_tracker");
    path.push("config.json");
    Some(path)
}

fn load_config(cli: &Cli) -> Result<TrackerConfig> {
    let mut config = match &cli.config {
        Some(path) => TrackerConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => match default_config_path().filter(|path| path.exists()) {
            Some(path) => {
                debug!("Using configuration {}", path.display());
                TrackerConfig::from_file(&path)?
            }
            None => TrackerConfig::default(),
        },
    };
    if let Some(server) = &cli.server {
        config.server_url = server.clone();
    }
    if let Some(gpsd_address) = &cli.gpsd {
        config.gpsd_address = gpsd_address.clone();
    }
    if let Some(period) = cli.report_period_ms {
        config.report_period_ms = period;
    }
    config.validate()?;
    Ok(config)
}

async fn create_geolocation(
    cli: &Cli,
    config: &TrackerConfig,
) -> Result<Arc<dyn GeolocationSource>> {
    if cli.gpsd.is_some() {
        let gpsd = GpsdGeolocation::new(&config.gpsd_address, DEFAULT_MAX_FIX_AGE)
            .await
            .with_context(|| format!("Failed to connect to gpsd on {}", config.gpsd_address))?;
        Ok(Arc::new(gpsd))
    } else if cli.gps_fake {
        let Some(source_file) = &cli.gps_source_file else {
            Cli::command().print_help()?;
            bail!("Failed to create fake geolocation. Error: gps_source_file not set");
        };
        let positions = positions::read_positions_from_file(source_file)?;
        Ok(Arc::new(ConstantGeolocation::new(&positions)?))
    } else {
        info!("No geolocation source specified, tracking is unavailable");
        Ok(Arc::new(UnavailableGeolocation))
    }
}

fn read_bus_list(cli: &Cli) -> Result<Vec<BusInfo>> {
    let mut buses = match &cli.bus_list {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read bus list {}", path.display()))?;
            BusInfo::list_from_json(&json)?
        }
        None => Vec::new(),
    };
    buses.extend(cli.watch.iter().map(|bus_number| BusInfo {
        bus_number: bus_number.clone(),
        latitude: DEFAULT_MAP_CENTER.latitude,
        longitude: DEFAULT_MAP_CENTER.longitude,
    }));
    Ok(buses)
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let buses = read_bus_list(&cli)?;
    if cli.bus_id.is_none() && buses.is_empty() {
        Cli::command().print_help()?;
        bail!("Nothing to do. Use --bus-id to report a bus or --watch to monitor buses");
    }

    let api = Arc::new(HttpLocationApi::new(&config.server_url)?);
    let eb = EventBus::default();

    let mut modules: Vec<Box<dyn Module + Send>> = Vec::new();
    modules.push(Box::new(ConsoleInput::new(eb.context())));
    if let Some(bus_id) = &cli.bus_id {
        let geolocation = create_geolocation(&cli, &config).await?;
        let session = TrackingSession::new(
            eb.context(),
            geolocation,
            api.clone(),
            Arc::new(ConsoleUi::new(bus_id)),
            config.report_period(),
        )?;
        modules.push(Box::new(session));
    }
    if !buses.is_empty() {
        let monitor = FleetMonitor::new(eb.context(), api.clone(), &buses, config.poll_period())?;
        info!(
            "Monitoring {} buses, map centre {:?} zoom {}",
            buses.len(),
            DEFAULT_MAP_CENTER,
            DEFAULT_MAP_ZOOM
        );
        modules.push(Box::new(monitor));
    }

    let quit_sender = eb.sender();
    ctrlc::set_handler(move || {
        let _ = quit_sender.send(Event {
            kind: EventKind::QuitEvent,
        });
    })?;

    if cli.start && cli.bus_id.is_some() {
        eb.publish(&Event {
            kind: EventKind::ToggleTrackingEvent,
        });
    }

    info!("Starting modules...");
    let results = join_all(modules.iter_mut().map(|module| module.run())).await;
    if results.iter().any(Result::is_err) {
        return Err(anyhow!("A module terminated with an error"));
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            error!("{e:#}");
            1
        }
    };
    // The stdin reader thread can't be cancelled, exit without waiting for it.
    std::process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write_config(name: &str, json: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "bus_tracker_{}_{name}.json",
            std::process::id()
        ));
        std::fs::write(&path, json).unwrap();
        path
    }

    fn parse(config: &Path, args: &[&str]) -> Cli {
        let config = config.to_str().unwrap();
        let mut argv = vec!["tracker_headless", "--config", config];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn file_values_are_used_without_overrides() {
        let path = write_config(
            "file_values",
            r#"{ "server_url": "http://10.0.0.1:8000", "report_period_ms": 2000 }"#,
        );
        let config = load_config(&parse(&path, &[])).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.server_url, "http://10.0.0.1:8000");
        assert_eq!(config.report_period_ms, 2000);
        assert_eq!(config.gpsd_address, "127.0.0.1:2947");
    }

    #[test]
    fn cli_flags_override_file_values() {
        let path = write_config(
            "overrides",
            r#"{ "server_url": "http://10.0.0.1:8000", "report_period_ms": 2000, "gpsd_address": "10.0.0.1:2947" }"#,
        );
        let cli = parse(
            &path,
            &[
                "--server",
                "http://192.168.1.20:8000",
                "--report-period-ms",
                "1000",
                "--gpsd",
                "10.0.0.5:2947",
            ],
        );
        let config = load_config(&cli).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.server_url, "http://192.168.1.20:8000");
        assert_eq!(config.report_period_ms, 1000);
        assert_eq!(config.gpsd_address, "10.0.0.5:2947");
        assert_eq!(config.poll_period_ms, 5000);
    }

    #[test]
    fn zero_period_override_is_rejected() {
        let path = write_config("zero_period", r#"{ "report_period_ms": 2000 }"#);
        let result = load_config(&parse(&path, &["--report-period-ms", "0"]));
        std::fs::remove_file(&path).unwrap();

        assert!(result.is_err());
    }

    #[test]
    fn gpsd_flag_takes_an_address() {
        let cli = Cli::parse_from(["tracker_headless", "-b", "B12", "-d", "10.0.0.5:2947"]);
        assert_eq!(cli.gpsd.as_deref(), Some("10.0.0.5:2947"));
        assert_eq!(cli.bus_id.as_deref(), Some("B12"));
    }
}
