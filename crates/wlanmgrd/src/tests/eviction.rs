//! Hardware that cannot hold every interface at once.

use rstest::rstest;

use wlanmgr_config::HardwareProfile;

use crate::iface::{IfaceType, InterfaceClass};
use crate::metrics::{FailureReason, MetricKey};
use crate::orchestrator::SetupError;
use crate::subsystems::Subsystem;

use super::support::{Harness, HealthEvent};

#[rstest]
fn creating_the_other_class_evicts_synchronously() {
    let mut harness = Harness::new(HardwareProfile::SingleInterface);
    let client = harness.owner("client");
    let hotspot = harness.owner("hotspot");
    harness
        .setup(IfaceType::StaConnectivity, &client)
        .expect("client setup");

    let name = harness
        .setup(IfaceType::AccessPoint, &hotspot)
        .expect("soft AP setup");

    assert_eq!(name, "wlan0");
    let created = harness.position("vendor_hal.create_ap_iface");
    let evicted = harness.position("vendor_hal.evict(wlan0)");
    let destroyed = harness.position("client.on_destroyed(wlan0)");
    let bound = harness.position("radio.setup_soft_ap(wlan0)");
    assert!(created < evicted && evicted < destroyed && destroyed < bound);
    assert!(harness.position("sta_auth.terminate") < destroyed);
    assert_eq!(harness.log.count("vendor_hal.stop"), 0);
    assert_eq!(harness.log.count("radio.tear_down_interfaces"), 0);
    assert!(harness.hardware.is_hal_started());

    let iface = harness
        .orchestrator
        .registry()
        .get("wlan0")
        .expect("soft AP registered");
    assert_eq!(iface.kind(), IfaceType::AccessPoint);
    assert_eq!(harness.orchestrator.client_interface_name(), None);
    assert!(harness.reporter.events().contains(&HealthEvent::InterfaceDestroyed {
        kind: IfaceType::StaConnectivity,
        name: "wlan0".to_owned(),
    }));
}

#[rstest]
fn evicted_owner_is_not_notified_twice() {
    let mut harness = Harness::new(HardwareProfile::SingleInterface);
    let client = harness.owner("client");
    let hotspot = harness.owner("hotspot");
    harness
        .setup(IfaceType::StaConnectivity, &client)
        .expect("client setup");
    harness
        .setup(IfaceType::AccessPoint, &hotspot)
        .expect("soft AP setup");

    harness.pump();
    harness.orchestrator.teardown_interface("wlan0");

    assert_eq!(harness.log.count("client.on_destroyed(wlan0)"), 1);
    assert_eq!(harness.log.count("hotspot.on_destroyed(wlan0)"), 1);
    assert_eq!(harness.log.count("vendor_hal.stop"), 1);
}

#[rstest]
fn same_class_request_is_refused_without_eviction() {
    let mut harness = Harness::new(HardwareProfile::SingleInterface);
    let client = harness.owner("client");
    let scanner = harness.owner("scanner");
    harness
        .setup(IfaceType::StaConnectivity, &client)
        .expect("client setup");

    let result = harness.setup(IfaceType::StaScanOnly, &scanner);

    assert_eq!(
        result,
        Err(SetupError::HalCreateIfaceFailure {
            kind: IfaceType::StaScanOnly
        })
    );
    assert_eq!(harness.interface_names(), vec!["wlan0".to_owned()]);
    assert!(!harness.log.contains("client.on_destroyed(wlan0)"));
    assert!(!harness.log.contains("vendor_hal.stop"));
    assert!(harness.hardware.is_daemon_running(Subsystem::StaAuth));
    assert_eq!(
        harness
            .metrics
            .count(MetricKey::SetupFailure(InterfaceClass::Client, FailureReason::Hal)),
        1
    );
}

#[rstest]
fn legacy_hardware_replaces_the_single_interface() {
    let mut harness = Harness::new(HardwareProfile::Legacy);
    let client = harness.owner("client");
    let hotspot = harness.owner("hotspot");
    let first = harness
        .setup(IfaceType::StaConnectivity, &client)
        .expect("client setup");
    let second = harness
        .setup(IfaceType::AccessPoint, &hotspot)
        .expect("soft AP setup");

    assert_eq!(first, "wlan0");
    assert_eq!(second, "wlan0");
    assert!(
        harness
            .log
            .entries()
            .iter()
            .all(|entry| !entry.starts_with("vendor_hal.")),
        "legacy hardware has no vendor HAL to drive"
    );
    assert!(
        harness.position("client.on_destroyed(wlan0)")
            < harness.position("radio.setup_soft_ap(wlan0)")
    );
    assert_eq!(harness.orchestrator.supported_feature_set("wlan0"), Some(0));
}

#[rstest]
fn legacy_teardown_completes_without_a_removal_round_trip() {
    let mut harness = Harness::new(HardwareProfile::Legacy);
    let client = harness.owner("client");
    harness
        .setup(IfaceType::StaConnectivity, &client)
        .expect("client setup");
    harness.log.clear();

    harness.orchestrator.teardown_interface("wlan0");

    assert_eq!(harness.pump(), 0);
    assert!(harness.orchestrator.registry().is_empty());
    assert_eq!(harness.log.count("client.on_destroyed(wlan0)"), 1);
    assert!(harness.log.contains("sta_auth.terminate"));
    assert!(harness.log.contains("radio.tear_down_interfaces"));
    assert!(!harness.log.contains("vendor_hal.stop"));
}
