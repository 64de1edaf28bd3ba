//! Command line interface
//!
//! - `status`: refresh and print the controller state (default)
//! - `reset`: hard reset through the web configuration page
//! - `current get|set`: actual charging current
//! - `avail get|set`: charging station availability
//! - `digimode get|set`: digital communication mode

use crate::commander::Commander;
use crate::config::Config;
use crate::error::{EmcpError, Result};
use crate::format::write_formatted_status;
use crate::logging::{get_logger, init_logging};
use crate::modbus::ModbusClient;
use crate::status_cache::StatusCache;
use crate::transport::ModbusTransport;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

/// Interface to the Phoenix Contact EM-CP-PP-ETH charge controller
#[derive(Parser, Debug)]
#[command(name = "emcp", version = env!("APP_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Controller host, e.g. 10.0.0.1
    #[arg(short = 'H', long, env = "EMCP_HOST", global = true)]
    pub host: Option<String>,

    /// Modbus TCP port [default: 502]
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Modbus unit (slave) ID [default: 180]
    #[arg(short = 's', long = "unit", global = true)]
    pub unit_id: Option<u8>,

    /// Configuration file (YAML)
    #[arg(short, long, env = "EMCP_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Query the charge controller state
    Status {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Reset the charge controller via HTTP
    Reset,
    /// Get and set the actual charging current
    #[command(subcommand)]
    Current(CurrentCommand),
    /// Make the charging station (un)available
    #[command(subcommand)]
    Avail(ToggleCommand),
    /// Get and set the digital communication mode
    #[command(subcommand)]
    Digimode(ToggleCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CurrentCommand {
    /// Get the charging current
    Get,
    /// Set the charging current
    Set {
        /// Charge current to set (amps)
        amps: u16,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ToggleCommand {
    /// Read the current state
    Get,
    /// Switch on (true) or off (false)
    Set {
        #[arg(action = ArgAction::Set, value_parser = BoolishValueParser::new())]
        state: bool,
    },
}

impl Cli {
    /// Command to run, `status` when none was given
    pub fn effective_command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Status { json: false })
    }

    /// Load the configuration file and apply command line overrides
    pub fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::load()?,
        };
        if let Some(host) = &self.host {
            config.modbus.host = host.clone();
        }
        if let Some(port) = self.port {
            config.modbus.port = port;
        }
        if let Some(unit_id) = self.unit_id {
            config.modbus.unit_id = unit_id;
        }
        if self.verbose {
            config.logging.level = "DEBUG".to_string();
        }
        config.validate()?;
        Ok(config)
    }
}

/// Parse-independent entry point used by the binary
pub async fn execute(cli: Cli) -> Result<()> {
    let config = cli.resolve_config()?;
    init_logging(&config.logging)?;

    let command = cli.effective_command();
    let mut stdout = std::io::stdout();

    if command == Command::Reset {
        return reset(&config, &mut stdout).await;
    }

    let mut client = ModbusClient::new(&config.modbus);
    client.connect().await?;
    let outcome = run_command(&command, &config, &mut client, &mut stdout).await;
    client.disconnect();
    outcome
}

#[cfg(feature = "http-reset")]
async fn reset<W: Write>(config: &Config, out: &mut W) -> Result<()> {
    crate::commander::hard_reset(&config.modbus.host, config.http.reset_timeout()).await?;
    writeln!(out, "Reset sent to {}", config.modbus.host)?;
    Ok(())
}

#[cfg(not(feature = "http-reset"))]
async fn reset<W: Write>(_config: &Config, _out: &mut W) -> Result<()> {
    Err(EmcpError::config(
        "emcp was built without the http-reset feature",
    ))
}

/// Run a Modbus command against an open session and print its result
pub async fn run_command<T, W>(
    command: &Command,
    config: &Config,
    transport: &mut T,
    out: &mut W,
) -> Result<()>
where
    T: ModbusTransport + ?Sized,
    W: Write,
{
    let logger = get_logger("cli");
    match command {
        Command::Status { json } => {
            let mut cache = StatusCache::new(&config.status);
            let status = cache.refresh(transport).await?;
            if *json {
                serde_json::to_writer_pretty(&mut *out, status)?;
                writeln!(out)?;
            } else {
                write_formatted_status(out, status)?;
            }
        }
        Command::Reset => {
            return Err(EmcpError::config("reset does not use the Modbus session"));
        }
        Command::Current(CurrentCommand::Get) => {
            let amps = Commander::new(transport)
                .read_actual_charging_current()
                .await?;
            writeln!(out, "Actual charging current: {} A", amps)?;
        }
        Command::Current(CurrentCommand::Set { amps }) => {
            Commander::new(transport)
                .write_actual_charging_current(*amps)
                .await?;
            writeln!(out, "New charging current: {} A", amps)?;
        }
        Command::Avail(ToggleCommand::Get) => {
            let available = Commander::new(transport).read_charging_enabled().await?;
            writeln!(out, "Charging station available: {}", available)?;
        }
        Command::Avail(ToggleCommand::Set { state }) => {
            Commander::new(transport)
                .write_charging_enabled(*state)
                .await?;
            writeln!(out, "New availability: {}", state)?;
        }
        Command::Digimode(ToggleCommand::Get) => {
            let enabled = Commander::new(transport).read_digimode_enabled().await?;
            writeln!(out, "Digital communication mode: {}", enabled)?;
        }
        Command::Digimode(ToggleCommand::Set { state }) => {
            Commander::new(transport)
                .write_digimode_enabled(*state)
                .await?;
            writeln!(out, "Digital communication mode: {}", state)?;
        }
    }
    logger.debug(&format!("Command {:?} completed", command));
    Ok(())
}
