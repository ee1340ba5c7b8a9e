//! Command-line flags.

use std::ffi::OsString;
use std::path::PathBuf;

use log::LevelFilter;

use crate::models::comfort::{EcoMode, FanSpeed, HistoryDataMode, OperationMode};

pub const USAGE: &str = "\
usage: comfort-cloud [options]

  --env-file PATH     load variables from PATH instead of ./.env
  --debug             show debug output
  --quiet             only log errors
  --version           show build version information
  --list              list available devices
  --device GUID       device to issue commands to (overrides COMFORT_DEVICE)
  --status            display current status of the device
  --history RANGE     display history: day,week,month,year
  --on                turn the device on
  --off               turn the device off
  --temp CELSIUS      set the temperature
  --speed SPEED       set fan speed: auto,1,2,3,4,5
  --mode MODE         set mode: auto,dry,cool,heat,fan
  --eco MODE          set eco mode: auto,powerful,quiet";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cli {
    pub env_file: Option<PathBuf>,
    pub log_level: Option<LevelFilter>,
    pub version: bool,
    pub list: bool,
    pub device: Option<String>,
    pub status: bool,
    pub history: Option<HistoryDataMode>,
    pub on: bool,
    pub off: bool,
    pub temperature: Option<f64>,
    pub fan_speed: Option<FanSpeed>,
    pub mode: Option<OperationMode>,
    pub eco_mode: Option<EcoMode>,
}

impl Cli {
    /// Parse arguments, excluding the program name.
    pub fn parse<I>(args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = OsString>,
    {
        let mut cli = Cli::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let arg = arg.into_string().map_err(|_| "argument contains invalid UTF-8".to_string())?;
            let (flag, inline) = match arg.split_once('=') {
                Some((f, v)) if f.starts_with("--") => (f.to_string(), Some(v.to_string())),
                _ => (arg, None),
            };

            let mut value = |name: &str| -> Result<String, String> {
                let v = match inline.clone() {
                    Some(v) => v,
                    None => args
                        .next()
                        .and_then(|v| v.into_string().ok())
                        .ok_or_else(|| format!("`{}` requires a value", name))?,
                };
                if v.is_empty() {
                    return Err(format!("`{}` requires a value", name));
                }
                Ok(v)
            };

            match flag.as_str() {
                "--env-file" => set_once(&mut cli.env_file, PathBuf::from(value("--env-file")?), "--env-file")?,
                "--device" => set_once(&mut cli.device, value("--device")?, "--device")?,
                "--history" => set_once(&mut cli.history, value("--history")?.parse()?, "--history")?,
                "--speed" => set_once(&mut cli.fan_speed, value("--speed")?.parse()?, "--speed")?,
                "--mode" => set_once(&mut cli.mode, value("--mode")?.parse()?, "--mode")?,
                "--eco" => set_once(&mut cli.eco_mode, value("--eco")?.parse()?, "--eco")?,
                "--temp" => {
                    let raw = value("--temp")?;
                    let celsius = raw
                        .parse::<f64>()
                        .ok()
                        .filter(|v| v.is_finite())
                        .ok_or_else(|| format!("invalid temperature: {}", raw))?;
                    set_once(&mut cli.temperature, celsius, "--temp")?
                }
                "--debug" => cli.log_level = Some(LevelFilter::Debug),
                "--quiet" => cli.log_level = Some(LevelFilter::Error),
                "--version" => cli.version = true,
                "--list" => cli.list = true,
                "--status" => cli.status = true,
                "--on" => cli.on = true,
                "--off" => cli.off = true,
                other => return Err(format!("unrecognised argument: {}", other)),
            }
        }

        if cli.on && cli.off {
            return Err("`--on` and `--off` are mutually exclusive".to_string());
        }
        Ok(cli)
    }

    /// True when at least one device-scoped action was requested.
    pub fn has_device_action(&self) -> bool {
        self.status
            || self.history.is_some()
            || self.on
            || self.off
            || self.temperature.is_some()
            || self.fan_speed.is_some()
            || self.mode.is_some()
            || self.eco_mode.is_some()
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, flag: &str) -> Result<(), String> {
    if slot.is_some() {
        return Err(format!("`{}` provided more than once", flag));
    }
    *slot = Some(value);
    Ok(())
}
