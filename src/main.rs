use comfort_cloud::cli::{Cli, USAGE};
use comfort_cloud::client::ComfortClient;
use comfort_cloud::config::{self, Config};
use comfort_cloud::models::comfort::{Device, OperationMode};
use comfort_cloud::transport::{Transport, UreqTransport};
use log::{debug, error, info, warn};
use std::path::PathBuf;

#[derive(Debug)]
struct LoadedEnvFile {
    path: PathBuf,
    explicit: bool,
}

fn load_env(cli: &Cli) -> Result<Option<LoadedEnvFile>, String> {
    if let Some(path) = cli.env_file.clone() {
        if !path.is_file() {
            return Err(format!("env file not found: {}", path.display()));
        }
        config::load_env_file(&path)?;
        return Ok(Some(LoadedEnvFile { path, explicit: true }));
    }

    let cwd = std::env::current_dir().map_err(|e| format!("unable to read current directory: {}", e))?;
    let default_path = cwd.join(".env");
    if default_path.is_file() {
        config::load_env_file(&default_path)?;
        Ok(Some(LoadedEnvFile {
            path: default_path,
            explicit: false,
        }))
    } else {
        Ok(None)
    }
}

/// Reuse the configured token when the server still accepts it, otherwise log in again.
fn ensure_session<T: Transport>(client: &mut ComfortClient<T>, cfg: &Config) -> Result<(), String> {
    if let Some(token) = cfg.token.as_deref() {
        match client.validate_session(token) {
            Ok(()) => {
                debug!("Stored session token is valid");
                return Ok(());
            }
            Err(e) => info!("Stored session token rejected, creating a new session: {}", e),
        }
    }

    let (username, password) = cfg.credentials()?;
    let token = client
        .create_session(username, password)
        .map_err(|e| format!("login failed: {}", e))?
        .to_string();
    config::store_token(&cfg.token_file, &token)?;
    debug!("New session token written to {}", cfg.token_file.display());
    Ok(())
}

fn print_status(device: &Device) {
    let caps = &device.capabilities;
    let params = &device.parameters;
    println!("Device GUID: {}", device.device_guid.as_deref().unwrap_or("-"));
    if let Some(name) = device.device_name.as_deref() {
        println!("Name: {}", name);
    }
    println!("Capabilities:");
    for mode in OperationMode::ALL {
        let range = caps
            .temperature_range(*mode)
            .map(|(lo, hi)| format!(" ({}-{})", lo, hi))
            .unwrap_or_default();
        println!("  {} mode: {}{}", mode, caps.supports(*mode), range);
    }
    println!("  Fan speed modes: {}", caps.fan_speed_mode.unwrap_or_default());
    println!("  Quiet mode: {}", caps.quiet_mode.unwrap_or_default());
    println!("  Powerful mode: {}", caps.powerful_mode.unwrap_or_default());
    println!("  Eco function: {}", caps.eco_function.unwrap_or_default());
    println!("  EcoNavi: {}", caps.eco_navi.unwrap_or_default());
    println!("  nanoe: {}", caps.nanoe.unwrap_or_default());
    println!("Current status:");
    println!("  Status: {}", params.operate);
    if let Some(online) = params.online {
        println!("  Online: {}", online);
    }
    println!("  Mode: {}", params.operation_mode);
    println!("  Temperature: {:.1}", params.temperature_set);
    if let Some(t) = params.inside_temperature {
        println!("  Inside temperature: {:.1}", t);
    }
    if let Some(t) = params.outside_temperature {
        println!("  Outside temperature: {:.1}", t);
    }
    println!("  Fan speed: {}", params.fan_speed);
    println!("  Eco mode: {}", params.eco_mode);
}

fn run(cli: &Cli) -> Result<(), String> {
    // 1) Load config
    let cfg = Config::from_env()?;
    info!(
        "Config loaded (base_url={}, token_file={}, os_timezone={}, timeout={}s)",
        cfg.base_url,
        cfg.token_file.display(),
        cfg.os_timezone,
        cfg.timeout.as_secs()
    );

    // 2) Init client and session
    let transport = UreqTransport::new(cfg.timeout);
    let mut client = ComfortClient::with_base_url(transport, cfg.base_url.clone()).with_os_timezone(cfg.os_timezone.clone());
    ensure_session(&mut client, &cfg)?;

    // 3) Listing ends the run
    if cli.list {
        info!("Listing available devices");
        let devices = client.list_device_ids().map_err(|e| format!("listing devices failed: {}", e))?;
        if devices.is_empty() {
            return Err("found no devices for configured account".into());
        }
        info!("{} device(s) found", devices.len());
        for device in devices {
            println!("{}", device);
        }
        return Ok(());
    }

    // 4) Resolve device; the flag wins over the environment
    if let Some(device) = cfg.device.as_deref() {
        debug!("Using device {} from environment", device);
        client.set_device(device);
    }
    if let Some(device) = cli.device.as_deref() {
        debug!("Using device {} from flag", device);
        client.set_device(device);
    }
    if client.device_guid().is_none() {
        return Err("no device configured, use --device or set COMFORT_DEVICE".into());
    }
    if !cli.has_device_action() {
        warn!("No action requested");
        return Ok(());
    }

    // 5) Queries
    if cli.status {
        info!("Fetching device status");
        let device = client.device_status().map_err(|e| format!("status failed: {}", e))?;
        print_status(&device);
    }

    if let Some(mode) = cli.history {
        info!("Fetching {} history", mode);
        let history = client
            .device_history(mode)
            .map_err(|e| format!("history failed: {}", e))?;
        let empty = history.entries.iter().filter(|e| !e.has_data()).count();
        debug!("{} of {} bucket(s) carry no data", empty, history.entries.len());
        println!("#,AverageSettingTemp,AverageInsideTemp,AverageOutsideTemp,Consumption");
        for v in &history.entries {
            println!(
                "{},{},{},{},{}",
                v.data_number + 1,
                v.average_setting_temp,
                v.average_inside_temp,
                v.average_outside_temp,
                v.consumption
            );
        }
    }

    // 6) Commands
    if cli.on {
        info!("Turning device on");
        client.turn_on().map_err(|e| format!("turn on failed: {}", e))?;
        println!("device turned on");
    }

    if cli.off {
        info!("Turning device off");
        client.turn_off().map_err(|e| format!("turn off failed: {}", e))?;
        println!("device turned off");
    }

    if let Some(celsius) = cli.temperature {
        info!("Setting temperature to {} degrees", celsius);
        client
            .set_temperature(celsius)
            .map_err(|e| format!("set temperature failed: {}", e))?;
        println!("temperature set to {} degrees", celsius);
    }

    if let Some(speed) = cli.fan_speed {
        info!("Setting fan speed to {}", speed);
        client.set_fan_speed(speed).map_err(|e| format!("set fan speed failed: {}", e))?;
        println!("fan speed set to {}", speed);
    }

    if let Some(mode) = cli.mode {
        info!("Setting mode to {}", mode);
        client.set_mode(mode).map_err(|e| format!("set mode failed: {}", e))?;
        println!("mode set to {}", mode);
    }

    if let Some(mode) = cli.eco_mode {
        info!("Setting eco mode to {}", mode);
        client.set_eco_mode(mode).map_err(|e| format!("set eco mode failed: {}", e))?;
        println!("eco mode set to {}", mode);
    }

    Ok(())
}

fn main() {
    let mut args = std::env::args_os();
    args.next(); // skip program name
    if args.len() == 0 {
        eprintln!("{}", USAGE);
        std::process::exit(1);
    }

    let cli = match Cli::parse(args) {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("fatal: {}\n\n{}", err, USAGE);
            std::process::exit(1);
        }
    };

    if cli.version {
        println!("comfort-cloud {} (git {})", env!("CARGO_PKG_VERSION"), env!("BUILD_TIME_GIT_HASH"));
        return;
    }

    let loaded_env = match load_env(&cli) {
        Ok(info) => info,
        Err(err) => {
            eprintln!("fatal: {}", err);
            std::process::exit(1);
        }
    };

    // Init logging after environment so RUST_LOG from .env is respected.
    let level = cli.log_level.map(|l| l.as_str().to_ascii_lowercase());
    let default_filter = env_logger::Env::default().default_filter_or(level.as_deref().unwrap_or("info"));
    env_logger::Builder::from_env(default_filter)
        .format_timestamp_secs()
        .init();

    if let Some(info) = loaded_env.as_ref() {
        let origin = if info.explicit { "CLI-specified" } else { "default" };
        info!("Environment loaded from {} .env file: {}", origin, info.path.display());
    }

    debug!(
        "comfort-cloud {} (git {}) starting",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TIME_GIT_HASH")
    );
    if let Err(e) = run(&cli) {
        error!("fatal: {}", e);
        std::process::exit(1);
    }
}
