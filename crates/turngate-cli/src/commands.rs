use anyhow::{Context, Result};
use std::future::Future;
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};
use turngate_checkin::CheckInService;
use turngate_core::Config;
use turngate_hardware::RelayController;
use turngate_hardware::mock::MockPin;
use turngate_network::CheckInClient;

use crate::cli::{GlobalOpts, SetArgs};

/// One line of operator input.
#[derive(Debug, PartialEq, Eq)]
pub enum Input<'a> {
    Quit,
    Test,
    Empty,
    Scan(&'a str),
}

impl<'a> Input<'a> {
    /// Classify a line. Scans are passed on verbatim.
    pub fn classify(line: &'a str) -> Self {
        match line.trim() {
            "" => Input::Empty,
            "quit" | "exit" | "q" => Input::Quit,
            "test" => Input::Test,
            _ => Input::Scan(line),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    Config::load_or_init(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))
}

pub fn build_service(config: Config, global: &GlobalOpts) -> Result<CheckInService> {
    if global.mock_relay {
        warn!("Using an in-memory relay, the gate will not open");
        let client = CheckInClient::from_config(&config).context("failed to build API client")?;
        let (pin, _handle) = MockPin::with_name("Simulated relay".to_string());
        let relay = RelayController::new(pin, &config);
        return Ok(CheckInService::new(config, client, relay));
    }

    CheckInService::from_config(config).context("failed to set up check-in service")
}

/// Initialize the relay, probe the backend, then handle scans until the
/// operator quits, input ends or `shutdown` resolves. The relay is released
/// on every path out once it was initialized.
pub async fn run<R, W>(
    service: &CheckInService,
    input: R,
    out: &mut W,
    shutdown: impl Future<Output = ()>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    info!(
        version = turngate_core::VERSION,
        pin = %service.relay().pin_id(),
        "Starting check-in loop"
    );
    service
        .initialize()
        .await
        .context("failed to initialize relay")?;

    match service.probe().await {
        Ok(site) => writeln!(out, "Connected to {site}")?,
        Err(e) if e.kind().is_fatal_at_startup() => {
            if let Err(release_err) = service.shutdown().await {
                warn!(error = %release_err, "Failed to release relay");
            }
            return Err(e).context("backend probe failed");
        }
        Err(e) => {
            warn!(error = %e, kind = %e.kind(), "Backend probe failed, accepting scans anyway");
            writeln!(out, "Backend not reachable: {e}")?;
        }
    }

    let result = scan_loop(service, input, out, shutdown).await;

    if let Err(e) = service.shutdown().await {
        warn!(error = %e, "Failed to release relay");
    }
    result
}

async fn scan_loop<R, W>(
    service: &CheckInService,
    input: R,
    out: &mut W,
    shutdown: impl Future<Output = ()>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    tokio::pin!(shutdown);

    writeln!(out, "Ready for scans (\"test\" pulses the relay, \"quit\" exits)")?;

    loop {
        let line = tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
            line = lines.next_line() => line.context("failed to read scan input")?,
        };

        let Some(line) = line else {
            info!("Scan input closed");
            break;
        };

        match Input::classify(&line) {
            Input::Empty => continue,
            Input::Quit => break,
            Input::Test => match service.test_pulse().await {
                Ok(()) => writeln!(out, "Relay pulsed")?,
                Err(e) => writeln!(out, "Error: {e}")?,
            },
            Input::Scan(scan) => match service.handle_scan(scan).await {
                Ok(message) => writeln!(out, "{message}")?,
                Err(e) => writeln!(out, "Error: {e}")?,
            },
        }
        out.flush()?;
    }

    Ok(())
}

pub async fn probe<W: Write>(service: &CheckInService, out: &mut W) -> Result<()> {
    let site = service.probe().await.context("backend probe failed")?;
    writeln!(out, "Connected to {site}")?;
    Ok(())
}

pub async fn pulse<W: Write>(service: &CheckInService, out: &mut W) -> Result<()> {
    service
        .initialize()
        .await
        .context("failed to initialize relay")?;
    let result = service.test_pulse().await;
    service.shutdown().await.context("failed to release relay")?;
    result.context("relay pulse failed")?;

    if service.relay().is_faulted() {
        writeln!(out, "Relay pulse hit a pin fault, check the wiring")?;
    } else {
        writeln!(out, "Relay pulsed")?;
    }
    Ok(())
}

pub fn show_config<W: Write>(config: &Config, out: &mut W) -> Result<()> {
    let mut shown = config.clone();
    if shown.api_key.is_some() {
        shown.api_key = Some("<redacted>".to_string());
    }
    write!(out, "{}", serde_yaml::to_string(&shown)?)?;
    Ok(())
}

/// Apply `args` on top of `config`. Untouched fields keep their value.
pub fn apply_set(mut config: Config, args: SetArgs) -> Config {
    if let Some(v) = args.demo_mode {
        config.demo_mode = v;
    }
    if let Some(v) = args.single_mode {
        config.single_mode = v;
    }
    if let Some(v) = args.direction_out {
        config.direction_out = v;
    }
    if args.clear_api_key {
        config.api_key = None;
    } else if let Some(v) = args.api_key {
        config.api_key = Some(v);
    }
    if let Some(v) = args.relay_pin {
        config.relay_pin = v;
    }
    if let Some(v) = args.high_mode {
        config.high_mode = v;
    }
    if let Some(v) = args.signal_duration_ms {
        config.signal_duration_ms = v;
    }
    if let Some(v) = args.request_timeout_ms {
        config.request_timeout_ms = v;
    }
    config
}

pub fn set_config(path: &Path, args: SetArgs) -> Result<Config> {
    let config = apply_set(load_config(path)?, args);
    config
        .store(path)
        .with_context(|| format!("failed to write configuration to {}", path.display()))?;
    info!(path = %path.display(), "Configuration updated");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use turngate_core::PinId;
    use turngate_network::CheckInClientConfig;
    use url::Url;

    fn mock_service() -> CheckInService {
        let config = Config {
            signal_duration_ms: 5,
            request_timeout_ms: 200,
            ..Config::default()
        };
        let global = GlobalOpts {
            config: PathBuf::from("unused.yaml"),
            verbose: 0,
            mock_relay: true,
        };
        build_service(config, &global).unwrap()
    }

    #[rstest]
    #[case("", Input::Empty)]
    #[case("   ", Input::Empty)]
    #[case("quit", Input::Quit)]
    #[case("exit", Input::Quit)]
    #[case("q", Input::Quit)]
    #[case("test", Input::Test)]
    #[case("SU_ABC123", Input::Scan("SU_ABC123"))]
    #[case(" SU_ABC123", Input::Scan(" SU_ABC123"))]
    fn test_classify_input(#[case] line: &str, #[case] expected: Input<'static>) {
        assert_eq!(Input::classify(line), expected);
    }

    #[tokio::test]
    async fn test_scan_loop_handles_commands_until_quit() {
        let service = mock_service();
        service.initialize().await.unwrap();

        let input: &[u8] = b"\nGC_1\ntest\nquit\ntest\n";
        let mut out = Vec::new();
        scan_loop(&service, input, &mut out, std::future::pending())
            .await
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Error: GC_1 is not permitted"));
        // Only the test before quit fires
        assert_eq!(out.matches("Relay pulsed").count(), 1);
        service.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_run_keeps_going_when_backend_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = Config {
            signal_duration_ms: 5,
            ..Config::default()
        };
        let client_config = CheckInClientConfig::from_config(&config)
            .unwrap()
            .with_base_url(Url::parse(&format!("http://127.0.0.1:{port}/v2/turnstiles/")).unwrap());
        let client = CheckInClient::new(client_config).unwrap();
        let (pin, handle) = MockPin::new();
        let relay = RelayController::new(pin, &config);
        let service = CheckInService::new(config, client, relay);

        let input: &[u8] = b"test\nquit\n";
        let mut out = Vec::new();
        run(&service, input, &mut out, std::future::pending())
            .await
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Backend not reachable"));
        assert!(out.contains("Relay pulsed"));
        // The relay is handed back on the way out
        assert_eq!(handle.release_count(), 1);
    }

    #[tokio::test]
    async fn test_scan_loop_stops_on_shutdown() {
        let service = mock_service();
        service.initialize().await.unwrap();

        let mut out = Vec::new();
        scan_loop(&service, tokio::io::empty(), &mut out, async {})
            .await
            .unwrap();
        service.shutdown().await.unwrap();
    }

    #[test]
    fn test_apply_set_replaces_only_given_fields() {
        let config = Config {
            api_key: Some("old".to_string()),
            ..Config::default()
        };
        let args = SetArgs {
            demo_mode: Some(false),
            relay_pin: Some(PinId::Number(22)),
            ..SetArgs::default()
        };

        let updated = apply_set(config.clone(), args);

        assert!(!updated.demo_mode);
        assert_eq!(updated.relay_pin, PinId::Number(22));
        assert_eq!(updated.api_key, config.api_key);
        assert_eq!(updated.signal_duration_ms, config.signal_duration_ms);
    }

    #[test]
    fn test_apply_set_clears_api_key() {
        let config = Config {
            api_key: Some("old".to_string()),
            ..Config::default()
        };
        let args = SetArgs {
            clear_api_key: true,
            ..SetArgs::default()
        };
        assert_eq!(apply_set(config, args).api_key, None);
    }

    #[test]
    fn test_set_config_persists_whole_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        let args = SetArgs {
            high_mode: Some(true),
            api_key: Some("key-1".to_string()),
            ..SetArgs::default()
        };

        let written = set_config(&path, args).unwrap();

        assert_eq!(load_config(&path).unwrap(), written);
        assert!(written.high_mode);
    }

    #[test]
    fn test_set_config_rejects_invalid_duration() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        let args = SetArgs {
            signal_duration_ms: Some(0),
            ..SetArgs::default()
        };

        assert!(set_config(&path, args).is_err());
        // Defaults were written on first load, the invalid record was not
        assert_eq!(load_config(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_show_config_redacts_api_key() {
        let config = Config {
            api_key: Some("top-secret".to_string()),
            ..Config::default()
        };
        let mut out = Vec::new();

        show_config(&config, &mut out).unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(!out.contains("top-secret"));
        assert!(out.contains("<redacted>"));
        assert!(out.contains("relay_pin: 17"));
    }
}
