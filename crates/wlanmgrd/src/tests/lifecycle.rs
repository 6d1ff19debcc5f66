//! Setup and teardown sequencing on dual-capable hardware.

use std::sync::Arc;

use mockall::Sequence;
use rstest::{fixture, rstest};

use wlanmgr_config::HardwareProfile;

use crate::iface::IfaceType;
use crate::sim::{Fault, SIM_HAL_FEATURES, SIM_KEY_MGMT_FEATURES};
use crate::subsystems::{SoftApConfig, Subsystem};
use crate::SoftApError;

use super::support::{Harness, HealthEvent, MockOwner};

#[fixture]
fn harness() -> Harness {
    Harness::new(HardwareProfile::Concurrent)
}

#[rstest]
fn client_setup_follows_the_ordered_sequence(mut harness: Harness) {
    let owner = harness.owner("cb0");
    let name = harness
        .setup(IfaceType::StaConnectivity, &owner)
        .expect("setup should succeed");

    assert_eq!(name, "wlan0");
    assert_eq!(
        harness.log.entries(),
        vec![
            "vendor_hal.start",
            "sta_auth.initialize",
            "sta_auth.start_daemon",
            "sta_auth.register_death_handler",
            "vendor_hal.create_sta_iface(false)",
            "radio.setup_client(wlan0)",
            "sta_auth.setup_iface(wlan0)",
            "link.register_observer(wlan0)",
            "monitor.start(wlan0)",
            "link.clear_addresses(wlan0)",
            "link.ipv6_privacy(wlan0, true)",
            "link.disable_ipv6(wlan0)",
        ]
    );
    assert!(harness.hardware.is_monitoring("wlan0"));
    assert_eq!(
        harness.reporter.events(),
        vec![
            HealthEvent::SetupStarting(IfaceType::StaConnectivity),
            HealthEvent::InterfaceReady {
                kind: IfaceType::StaConnectivity,
                name: "wlan0".to_owned(),
            },
        ]
    );
}

#[rstest]
fn last_teardown_releases_every_dependency(mut harness: Harness) {
    let owner = harness.owner("cb0");
    harness
        .setup(IfaceType::StaConnectivity, &owner)
        .expect("setup should succeed");
    harness.log.clear();

    harness.orchestrator.teardown_interface("wlan0");

    assert_eq!(
        harness.log.entries(),
        vec![
            "vendor_hal.remove_sta_iface(wlan0)",
            "monitor.stop(wlan0)",
            "link.unregister_observer(wlan0)",
            "sta_auth.teardown_iface(wlan0)",
            "radio.tear_down_client(wlan0)",
            "sta_auth.deregister_death_handler",
            "sta_auth.terminate",
            "radio.tear_down_interfaces",
            "vendor_hal.stop",
            "cb0.on_destroyed(wlan0)",
        ]
    );
    assert!(harness.orchestrator.registry().is_empty());
    assert!(!harness.hardware.is_hal_started());
    assert_eq!(harness.hardware.observer_count(), 0);
}

#[rstest]
fn second_interface_reuses_the_running_stack(mut harness: Harness) {
    let client = harness.owner("cb0");
    let hotspot = harness.owner("cb1");
    harness
        .setup(IfaceType::StaConnectivity, &client)
        .expect("client setup");
    let name = harness
        .setup(IfaceType::AccessPoint, &hotspot)
        .expect("soft AP setup");

    assert_eq!(name, "wlan1");
    assert_eq!(harness.log.count("vendor_hal.start"), 1);
    assert_eq!(harness.log.count("sta_auth.start_daemon"), 1);
    assert_eq!(harness.log.count("ap_host.start_daemon"), 1);
    assert!(!harness.log.contains("monitor.start(wlan1)"));
    assert_eq!(
        harness.orchestrator.client_interface_name().as_deref(),
        Some("wlan0")
    );
    assert_eq!(
        harness.orchestrator.soft_ap_interface_name().as_deref(),
        Some("wlan1")
    );
}

#[rstest]
fn removing_one_interface_keeps_the_stack_for_the_other(mut harness: Harness) {
    let client = harness.owner("cb0");
    let hotspot = harness.owner("cb1");
    harness
        .setup(IfaceType::StaConnectivity, &client)
        .expect("client setup");
    harness
        .setup(IfaceType::AccessPoint, &hotspot)
        .expect("soft AP setup");

    harness.orchestrator.teardown_interface("wlan0");

    assert!(!harness.log.contains("vendor_hal.stop"));
    assert!(!harness.log.contains("radio.tear_down_interfaces"));
    assert!(!harness.hardware.is_daemon_running(Subsystem::StaAuth));
    assert!(harness.hardware.is_daemon_running(Subsystem::ApHost));
    assert_eq!(harness.interface_names(), vec!["wlan1".to_owned()]);
    assert_eq!(harness.orchestrator.client_interface_name(), None);
    assert_eq!(
        harness.orchestrator.soft_ap_interface_name().as_deref(),
        Some("wlan1")
    );
}

#[rstest]
fn teardown_all_releases_dependencies_once(mut harness: Harness) {
    let client = harness.owner("cb0");
    let hotspot = harness.owner("cb1");
    harness
        .setup(IfaceType::StaConnectivity, &client)
        .expect("client setup");
    harness
        .setup(IfaceType::AccessPoint, &hotspot)
        .expect("soft AP setup");
    harness.log.clear();

    harness.orchestrator.teardown_all_interfaces();

    assert!(harness.orchestrator.registry().is_empty());
    assert_eq!(harness.log.count("cb0.on_destroyed(wlan0)"), 1);
    assert_eq!(harness.log.count("cb1.on_destroyed(wlan1)"), 1);
    assert_eq!(harness.log.count("radio.tear_down_interfaces"), 1);
    assert_eq!(harness.log.count("vendor_hal.stop"), 1);
    assert!(harness.position("cb1.on_destroyed(wlan1)") < harness.position("sta_auth.terminate"));
    assert!(harness.position("ap_host.terminate") < harness.position("vendor_hal.stop"));
}

#[rstest]
fn teardown_of_unknown_interface_is_a_no_op(mut harness: Harness) {
    harness.orchestrator.teardown_interface("wlan7");
    harness.orchestrator.teardown_all_interfaces();

    assert!(harness.log.entries().is_empty());
}

#[rstest]
fn scan_only_clients_do_not_use_the_station_daemon(mut harness: Harness) {
    let owner = harness.owner("scan");
    let name = harness
        .setup(IfaceType::StaScanOnly, &owner)
        .expect("scan setup");

    assert!(harness.log.contains("vendor_hal.create_sta_iface(true)"));
    assert!(harness.log.contains(&format!("monitor.start({name})")));
    assert!(
        harness
            .log
            .entries()
            .iter()
            .all(|entry| !entry.starts_with("sta_auth.") && !entry.starts_with("link.clear"))
    );

    harness.orchestrator.teardown_interface(&name);
    assert!(!harness.log.contains("sta_auth.terminate"));
    assert!(harness.log.contains("vendor_hal.stop"));
}

#[rstest]
fn scan_only_client_keeps_the_daemon_for_a_connectivity_client(mut harness: Harness) {
    let client = harness.owner("cb0");
    let scan = harness.owner("scan");
    harness
        .setup(IfaceType::StaConnectivity, &client)
        .expect("client setup");
    let scan_name = harness
        .setup(IfaceType::StaScanOnly, &scan)
        .expect("scan setup");

    harness.orchestrator.teardown_interface(&scan_name);

    assert!(harness.hardware.is_daemon_running(Subsystem::StaAuth));
    assert!(harness.hardware.is_hal_started());
}

#[rstest]
#[case(IfaceType::StaConnectivity, SIM_HAL_FEATURES | SIM_KEY_MGMT_FEATURES)]
#[case(IfaceType::StaScanOnly, SIM_HAL_FEATURES)]
#[case(IfaceType::AccessPoint, SIM_HAL_FEATURES)]
fn feature_set_is_cached_at_setup(
    mut harness: Harness,
    #[case] kind: IfaceType,
    #[case] expected: u64,
) {
    let owner = harness.owner("cb0");
    let name = harness.setup(kind, &owner).expect("setup");

    assert_eq!(
        harness.orchestrator.supported_feature_set(&name),
        Some(expected)
    );
    assert_eq!(harness.orchestrator.supported_feature_set("wlan9"), None);
}

#[rstest]
fn soft_ap_starts_on_access_point_interfaces(mut harness: Harness) {
    let client = harness.owner("cb0");
    let hotspot = harness.owner("cb1");
    harness
        .setup(IfaceType::StaConnectivity, &client)
        .expect("client setup");
    let name = harness
        .setup(IfaceType::AccessPoint, &hotspot)
        .expect("soft AP setup");
    let config = SoftApConfig::open("lab").with_passphrase("correct horse");

    harness
        .orchestrator
        .start_soft_ap(&name, &config)
        .expect("access point should start");
    assert_eq!(harness.hardware.access_point(&name), Some(config.clone()));

    assert_eq!(
        harness.orchestrator.start_soft_ap("wlan0", &config),
        Err(SoftApError::NotAccessPoint {
            name: "wlan0".to_owned(),
            kind: IfaceType::StaConnectivity,
        })
    );
    assert_eq!(
        harness.orchestrator.start_soft_ap("wlan5", &config),
        Err(SoftApError::UnknownInterface {
            name: "wlan5".to_owned(),
        })
    );

    harness.hardware.inject_fault(Fault::AccessPointAdd);
    assert_eq!(
        harness.orchestrator.start_soft_ap(&name, &config),
        Err(SoftApError::Rejected { name: name.clone() })
    );

    harness.orchestrator.teardown_interface(&name);
    assert!(harness.hardware.access_point(&name).is_none());
}

#[rstest]
fn refused_removal_completes_teardown_locally(mut harness: Harness) {
    let owner = harness.owner("cb0");
    harness
        .setup(IfaceType::StaConnectivity, &owner)
        .expect("setup");
    harness.hardware.inject_fault(Fault::HalRemoveIface);

    harness.orchestrator.teardown_interface("wlan0");

    assert!(harness.orchestrator.registry().is_empty());
    assert_eq!(harness.log.count("cb0.on_destroyed(wlan0)"), 1);
    assert!(harness.log.contains("vendor_hal.stop"));
}

#[rstest]
fn deferred_removal_completes_when_the_hal_reports_it(mut harness: Harness) {
    let owner = harness.owner("cb0");
    harness
        .setup(IfaceType::StaConnectivity, &owner)
        .expect("setup");
    harness.hardware.set_deferred_removal(true);

    harness.orchestrator.teardown_interface("wlan0");
    assert!(harness.orchestrator.registry().get("wlan0").is_some());
    assert!(!harness.log.contains("cb0.on_destroyed(wlan0)"));

    assert_eq!(harness.hardware.complete_pending_removals(), 1);
    assert_eq!(harness.pump(), 1);

    assert!(harness.orchestrator.registry().is_empty());
    assert_eq!(harness.log.count("cb0.on_destroyed(wlan0)"), 1);
    assert!(harness.log.contains("vendor_hal.stop"));
}

#[rstest]
fn setup_reusing_a_name_pending_removal_replaces_the_old_instance(mut harness: Harness) {
    let first = harness.owner("cb0");
    let second = harness.owner("cb1");
    harness
        .setup(IfaceType::StaConnectivity, &first)
        .expect("first setup");
    harness.hardware.set_deferred_removal(true);
    harness.orchestrator.teardown_interface("wlan0");
    harness.orchestrator.teardown_interface("wlan0");
    assert_eq!(harness.log.count("vendor_hal.remove_sta_iface(wlan0)"), 1);
    harness.log.clear();

    let name = harness
        .setup(IfaceType::StaConnectivity, &second)
        .expect("setup reusing the pending name");

    assert_eq!(name, "wlan0");
    assert_eq!(harness.log.count("cb0.on_destroyed(wlan0)"), 1);
    assert!(
        harness.position("cb0.on_destroyed(wlan0)") < harness.position("radio.setup_client(wlan0)")
    );
    assert!(!harness.log.contains("sta_auth.terminate"));
    assert!(!harness.log.contains("vendor_hal.stop"));

    assert_eq!(harness.hardware.complete_pending_removals(), 1);
    assert_eq!(harness.pump(), 1);

    assert_eq!(harness.interface_names(), vec!["wlan0".to_owned()]);
    assert_eq!(harness.hardware.hal_interfaces(), vec!["wlan0".to_owned()]);
    assert!(harness.hardware.is_hal_started());
    assert_eq!(harness.log.count("cb0.on_destroyed(wlan0)"), 1);
    assert!(!harness.log.contains("cb1.on_destroyed(wlan0)"));

    harness.hardware.set_deferred_removal(false);
    harness.orchestrator.teardown_interface("wlan0");

    assert!(harness.orchestrator.registry().is_empty());
    assert!(harness.hardware.hal_interfaces().is_empty());
    assert!(!harness.hardware.is_hal_started());
    assert_eq!(harness.log.count("cb1.on_destroyed(wlan0)"), 1);
}

#[rstest]
fn owner_receives_exactly_one_destroyed_notification(mut harness: Harness) {
    let mut seq = Sequence::new();
    let mut owner = MockOwner::new();
    owner.expect_on_up().times(1).in_sequence(&mut seq).return_const(());
    owner
        .expect_on_destroyed()
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());
    owner.expect_on_down().never();

    harness
        .orchestrator
        .setup_interface_for_client_in_connectivity_mode(Arc::new(owner))
        .expect("setup");
    harness.hardware.set_link_state("wlan0", true);
    harness.pump();
    harness.orchestrator.teardown_interface("wlan0");
    harness.orchestrator.teardown_interface("wlan0");
    harness.pump();
}
