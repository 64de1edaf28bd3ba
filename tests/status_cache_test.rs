mod common;

use common::{MockTransport, Region, sample_discrete, sample_input};
use emcp::config::StatusConfig;
use emcp::decoder::encode_input_register_block;
use emcp::error::{EmcpError, RefreshStage};
use emcp::registers::{
    CHARGING_CURRENT_ADDR, DISCRETE_INPUT_STATUS_ADDR, INPUT_REGISTER_STATUS_ADDR,
    OVERCURRENT_PROTECTION_ADDR,
};
use emcp::status::{DigitalInputs, DigitalOutputs, VehicleState};
use emcp::status_cache::{CacheState, StatusCache};

#[tokio::test]
async fn successful_refresh_commits_every_stage() {
    let mut mock = MockTransport::healthy();
    let mut cache = StatusCache::default();
    assert!(cache.status().is_none());
    assert_eq!(cache.state(), CacheState::Stale);

    let status = cache.refresh(&mut mock).await.unwrap().clone();
    assert_eq!(status.ev_status, VehicleState::C);
    assert_eq!(status.measurements, sample_input().measurements);
    assert_eq!(status.overcurrent_protection, 20);
    assert_eq!(status.digital_inputs, DigitalInputs::EN | DigitalInputs::ML);
    assert_eq!(status.digital_outputs, DigitalOutputs::CR);
    assert_eq!(status.actual_charging_current, Some(16));

    assert!(cache.is_fresh());
    assert!(cache.refreshed_at().is_some());
    assert_eq!(cache.status(), Some(&status));

    assert_eq!(
        mock.reads,
        vec![
            (Region::Input, INPUT_REGISTER_STATUS_ADDR, 42),
            (Region::Input, OVERCURRENT_PROTECTION_ADDR, 1),
            (Region::Discrete, DISCRETE_INPUT_STATUS_ADDR, 8),
            (Region::Holding, CHARGING_CURRENT_ADDR, 1),
        ]
    );
}

#[tokio::test]
async fn charging_current_stage_is_optional() {
    let mut mock = MockTransport::healthy();
    let mut cache = StatusCache::new(&StatusConfig {
        read_charging_current: false,
    });

    let status = cache.refresh(&mut mock).await.unwrap();
    assert_eq!(status.actual_charging_current, None);
    assert!(!mock.reads.iter().any(|(region, ..)| *region == Region::Holding));
}

#[tokio::test]
async fn failed_discrete_read_keeps_previous_status() {
    let mut mock = MockTransport::healthy();
    let mut cache = StatusCache::default();
    cache.refresh(&mut mock).await.unwrap();
    let committed = cache.status().cloned();
    let committed_at = cache.refreshed_at();

    // The controller moved on, but the discrete input read fails
    let mut next = sample_input();
    next.ev_status = VehicleState::B;
    next.measurements.l1_voltage = 0.0;
    mock.set_status(&next, 10, &sample_discrete(), 6);
    mock.fail(Region::Discrete, DISCRETE_INPUT_STATUS_ADDR);

    let err = cache.refresh(&mut mock).await.unwrap_err();
    assert_eq!(err.refresh_stage(), Some(RefreshStage::ReadDiscreteInputs));
    assert!(err.is_transport());
    assert!(
        err.to_string()
            .starts_with("Failed to read discrete input status:"),
        "{}",
        err
    );

    assert_eq!(cache.state(), CacheState::Stale);
    assert_eq!(cache.status().cloned(), committed);
    assert_eq!(cache.refreshed_at(), committed_at);
    assert_eq!(cache.status().unwrap().ev_status, VehicleState::C);

    // Once the link recovers the new state is committed whole
    mock.heal(Region::Discrete, DISCRETE_INPUT_STATUS_ADDR);
    let status = cache.refresh(&mut mock).await.unwrap();
    assert_eq!(status.ev_status, VehicleState::B);
    assert_eq!(status.overcurrent_protection, 10);
    assert_eq!(status.actual_charging_current, Some(6));
    assert!(cache.is_fresh());
}

#[tokio::test]
async fn invalid_vehicle_state_fails_parse_stage() {
    let mut mock = MockTransport::healthy();
    let mut payload = encode_input_register_block(&sample_input()).to_vec();
    payload[0..2].copy_from_slice(&u16::from(b'G').to_be_bytes());
    mock.set_payload(Region::Input, INPUT_REGISTER_STATUS_ADDR, payload);

    let mut cache = StatusCache::default();
    let err = cache.refresh(&mut mock).await.unwrap_err();
    assert_eq!(err.refresh_stage(), Some(RefreshStage::ParseInputRegisters));
    assert!(matches!(
        err.root(),
        EmcpError::InvalidVehicleState { code: 71 }
    ));
    assert!(!err.is_transport());
    assert!(cache.status().is_none());

    // Nothing after the failing stage is read
    assert_eq!(mock.reads.len(), 1);
}

#[tokio::test]
async fn short_payloads_are_reported_per_stage() {
    let cases = [
        (
            Region::Input,
            INPUT_REGISTER_STATUS_ADDR,
            vec![0u8; 83],
            RefreshStage::ParseInputRegisters,
        ),
        (
            Region::Input,
            OVERCURRENT_PROTECTION_ADDR,
            vec![0u8; 1],
            RefreshStage::ParseOvercurrentProtection,
        ),
        (
            Region::Discrete,
            DISCRETE_INPUT_STATUS_ADDR,
            vec![],
            RefreshStage::ParseDiscreteInputs,
        ),
        (
            Region::Holding,
            CHARGING_CURRENT_ADDR,
            vec![0u8; 4],
            RefreshStage::ReadChargingCurrent,
        ),
    ];

    for (region, address, payload, stage) in cases {
        let mut mock = MockTransport::healthy();
        mock.set_payload(region, address, payload);
        let mut cache = StatusCache::default();
        let err = cache.refresh(&mut mock).await.unwrap_err();
        assert_eq!(err.refresh_stage(), Some(stage));
        assert!(matches!(err.root(), EmcpError::InvalidLength { .. }));
    }
}

#[tokio::test]
async fn first_stage_failure_leaves_cache_empty() {
    let mut mock = MockTransport::healthy();
    mock.fail(Region::Input, INPUT_REGISTER_STATUS_ADDR);

    let mut cache = StatusCache::default();
    let err = cache.refresh(&mut mock).await.unwrap_err();
    assert_eq!(err.refresh_stage(), Some(RefreshStage::ReadInputRegisters));
    assert!(cache.status().is_none());
    assert!(cache.refreshed_at().is_none());
    assert!(!cache.is_fresh());
}
