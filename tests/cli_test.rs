mod common;

use clap::Parser;
use common::{MockTransport, Write};
use emcp::cli::{Cli, Command, CurrentCommand, ToggleCommand, run_command};
use emcp::config::Config;
use emcp::registers::{CHARGING_CURRENT_ADDR, CHARGING_ENABLED_COIL_ADDR};

fn config() -> Config {
    let mut config = Config::default();
    config.modbus.host = "10.0.0.1".to_string();
    config
}

async fn run(command: Command, mock: &mut MockTransport) -> String {
    let mut out = Vec::new();
    run_command(&command, &config(), mock, &mut out)
        .await
        .unwrap();
    String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn status_prints_text_report() {
    let mut mock = MockTransport::healthy();
    let out = run(Command::Status { json: false }, &mut mock).await;
    assert!(out.contains("EV status: C"));
    assert!(out.contains("Charge time: 1:25"));
    assert!(out.contains("Voltage [V]: L1 230.00, L2 231.50, L3 229.87"));
    assert!(out.contains("Error state: OK"));
    assert!(out.contains("Digital inputs: EN=true XR=false LD=false ML=true"));
    assert!(out.contains("Actual charging current: 16 A"));
}

#[tokio::test]
async fn status_json_is_machine_readable() {
    let mut mock = MockTransport::healthy();
    let out = run(Command::Status { json: true }, &mut mock).await;
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["ev_status"], "C");
    assert_eq!(value["overcurrent_protection"], 20);
    assert_eq!(value["actual_charging_current"], 16);
    assert_eq!(value["measurements"]["l1_voltage"], 230.0);
}

#[tokio::test]
async fn status_fails_when_controller_does_not_answer() {
    let mut mock = MockTransport::new();
    let mut out = Vec::new();
    let err = run_command(&Command::Status { json: false }, &config(), &mut mock, &mut out)
        .await
        .unwrap_err();
    assert!(err.refresh_stage().is_some());
    assert!(out.is_empty());
}

#[tokio::test]
async fn set_commands_write_and_confirm() {
    let mut mock = MockTransport::new();
    let out = run(
        Command::Current(CurrentCommand::Set { amps: 10 }),
        &mut mock,
    )
    .await;
    assert_eq!(out, "New charging current: 10 A\n");

    let out = run(
        Command::Avail(ToggleCommand::Set { state: false }),
        &mut mock,
    )
    .await;
    assert_eq!(out, "New availability: false\n");

    assert_eq!(
        mock.writes,
        vec![
            Write::Register(CHARGING_CURRENT_ADDR, 10),
            Write::Coil(CHARGING_ENABLED_COIL_ADDR, 0x0000),
        ]
    );

    let out = run(Command::Current(CurrentCommand::Get), &mut mock).await;
    assert_eq!(out, "Actual charging current: 10 A\n");
    let out = run(Command::Avail(ToggleCommand::Get), &mut mock).await;
    assert_eq!(out, "Charging station available: false\n");
}

#[test]
fn missing_host_is_a_usage_error() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(tmp.path(), "modbus:\n  port: 502\n").unwrap();
    let path = tmp.path().to_string_lossy().to_string();

    let cli = Cli::try_parse_from(["emcp", "-c", &path, "status"]).unwrap();
    let err = cli.resolve_config().unwrap_err();
    assert!(err.to_string().contains("modbus.host"));
}

#[test]
fn invalid_boolean_argument_is_rejected() {
    assert!(Cli::try_parse_from(["emcp", "avail", "set", "maybe"]).is_err());
    assert!(Cli::try_parse_from(["emcp", "current", "set", "-1"]).is_err());
}
