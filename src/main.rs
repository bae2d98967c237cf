use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use clap_stdin::MaybeStdin;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mdl_monitor::engine::simulated::SimulatedEngine;
use mdl_monitor::engine::MonitoringEngine;
use mdl_monitor::events::EventKind;
use mdl_monitor::monitor::{Monitor, MonitorConfig};
use mdl_monitor::request::{DataElements, MonitoringRequest, Namespaces};

const NAMESPACE: &str = "org.iso.18013.5.1";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON request payload passed to the engine as-is ('-' reads stdin).
    /// Defaults to a standard mDL field request.
    #[arg(long)]
    request: Option<MaybeStdin<String>>,
    /// Session timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout: u32,
    /// Skip the engine's internal verification of received data.
    #[arg(long)]
    skip_verification: bool,
    /// Run against the built-in simulated engine instead of the native
    /// library.
    #[arg(long)]
    simulate: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let request = match &args.request {
        Some(json) => MonitoringRequest::new(json.to_string().into_bytes()),
        None => demo_request()?,
    };
    let verify = !args.skip_verification;
    let config = MonitorConfig {
        timeout_secs: args.timeout,
        ..MonitorConfig::default()
    };

    if args.simulate {
        run(
            Monitor::with_config(demo_engine(verify), config),
            &request,
            verify,
        )?;
    } else {
        #[cfg(feature = "native")]
        run(
            Monitor::with_config(mdl_monitor::engine::native::NativeEngine::new(), config),
            &request,
            verify,
        )?;
        #[cfg(not(feature = "native"))]
        anyhow::bail!(
            "built without the native engine; rerun with --simulate \
             or rebuild with --features native"
        );
    }

    println!("Press Enter to exit...");
    io::stdin()
        .read_line(&mut String::new())
        .context("could not read from stdin")?;
    Ok(())
}

fn run<E: MonitoringEngine>(
    mut monitor: Monitor<E>,
    request: &MonitoringRequest,
    verify: bool,
) -> Result<()> {
    monitor
        .start_monitoring(request, verify, |line| println!("{line}"))
        .context("monitoring session failed")
}

/// The standard demo request: which mDL fields the reader wants, and
/// whether the holder must release each one.
fn demo_request() -> Result<MonitoringRequest> {
    let mut elements = DataElements::new("family_name".to_string(), false);
    elements.insert("given_name".to_string(), false);
    elements.insert("portrait".to_string(), false);
    elements.insert("issuing_country".to_string(), true);
    elements.insert("birth_date".to_string(), false);
    elements.insert("issuing_authority".to_string(), true);
    MonitoringRequest::from_namespaces(&Namespaces::new(NAMESPACE.to_string(), elements))
        .context("could not build the demo request")
}

/// A scripted session resembling a real device presentation, so the demo
/// has something to show without the native library attached.
fn demo_engine(verify: bool) -> SimulatedEngine {
    let mut engine = SimulatedEngine::new()
        .emit_after(
            Duration::from_millis(300),
            EventKind::DeviceConnected as i32,
            Some("mDL holder device attached"),
        )
        .emit_after(
            Duration::from_millis(900),
            EventKind::QrCodeScanned as i32,
            Some("engagement QR scanned"),
        )
        .emit_after(
            Duration::from_millis(1500),
            EventKind::DeviceHkdfKey as i32,
            Some("session keys derived"),
        )
        .emit_after(
            Duration::from_millis(1800),
            EventKind::BleConnected as i32,
            Some("GATT session open"),
        )
        .emit_after(
            Duration::from_millis(2600),
            EventKind::BleReceiving as i32,
            None,
        )
        .emit_after(
            Duration::from_millis(3400),
            EventKind::DataReceived as i32,
            Some("device response received"),
        );
    if verify {
        engine = engine.emit_after(
            Duration::from_millis(3700),
            EventKind::VerifyingData as i32,
            Some("checking issuer signature"),
        );
    }
    engine
        .emit_after(
            Duration::from_millis(4200),
            EventKind::BleDisconnected as i32,
            Some("session closed"),
        )
        .deactivate_after(Duration::from_secs(5))
}
