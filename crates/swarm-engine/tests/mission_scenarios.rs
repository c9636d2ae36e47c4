//! End-to-end mission scenarios (spec.md §8 S1, S5).

use std::time::Duration;

use swarm_core::config::MissionConfig;
use swarm_core::event::CamReportResult;
use swarm_core::model::ObjectiveState;
use swarm_engine::centre::RunConfig;
use swarm_engine::run_mission;

fn base_run(mission: MissionConfig, proceed_timeout_ticks: u64) -> RunConfig {
    RunConfig {
        mission,
        tick_period: Duration::from_millis(1),
        defence_sample_period: Duration::from_millis(2),
        proceed_timeout_ticks,
        mission_deadline: Some(Duration::from_secs(20)),
        defence_seed: 11,
        link_seed: 22,
        permutation_seed: 33,
        spawn_seed: 44,
    }
}

/// S1 - no attrition: every drone reaches its target, every swarm's
/// objective ends up Destroyed, and the mission exits cleanly.
#[tokio::test(start_paused = true)]
async fn s1_no_attrition_destroys_every_objective() {
    let mission = MissionConfig { defence_hit_pct: 0, link_loss_pct: 0, reconnect_timeout_secs: 4, speed: 1, fuel: 500, ticks: 1000 };
    // Reassembly sits well past 80 ticks of travel at speed 1; the timeout
    // is set high enough that the transition is arrival-driven, not timed.
    let report = run_mission(base_run(mission, 250)).await;

    assert!(!report.forced_shutdown);
    assert_eq!(report.swarms.len(), 3);
    for swarm in &report.swarms {
        assert_eq!(swarm.attack_total, 4);
        assert_eq!(swarm.camera_total, 1);
        assert_eq!(swarm.detonated, 4, "swarm {} should have all attackers detonate", swarm.swarm_id);
        assert_eq!(swarm.destroyed, 0);
        assert_eq!(swarm.fuel_empty, 0);
        assert_eq!(swarm.link_lost, 0);
    }

    assert_eq!(report.cam_reports.len(), 3);
    assert!(report.cam_reports.iter().all(|r| r.result == CamReportResult::Destroyed));

    assert_eq!(report.objectives.len(), 3);
    assert!(report.objectives.iter().all(|o| o.state == ObjectiveState::Destroyed));
}

/// S5 - fuel exhaustion: every drone runs dry before its target, no
/// Attack drone ever detonates, and each swarm still files a Partial
/// CamReport once its attackers have all terminated.
#[tokio::test(start_paused = true)]
async fn s5_fuel_exhaustion_yields_partial_reports() {
    let mission = MissionConfig { defence_hit_pct: 0, link_loss_pct: 0, reconnect_timeout_secs: 4, speed: 1, fuel: 30, ticks: 1000 };
    // Nobody ever reaches reassembly on 30 fuel, so Proceed only advances
    // via its timeout guard; keep it short relative to the fuel-out tick.
    let report = run_mission(base_run(mission, 60)).await;

    assert!(!report.forced_shutdown);
    for swarm in &report.swarms {
        assert_eq!(swarm.detonated, 0, "swarm {} must not detonate when fuel runs out first", swarm.swarm_id);
        // The camera shares the same truck, assembly and reassembly legs as
        // its attackers, so it burns through 30 fuel on the same schedule
        // and ends up FuelEmpty right alongside them.
        assert_eq!(swarm.fuel_empty, 5, "every drone in swarm {} should run dry", swarm.swarm_id);
    }

    assert_eq!(report.cam_reports.len(), 3);
    assert!(report.cam_reports.iter().all(|r| r.result == CamReportResult::Partial));
}

/// S4 - link outage exceeding the reconnect timeout: a lost drone never
/// detonates and never blocks the mission from finishing. Individual
/// drones are randomised, so this asserts the accounting invariant and
/// the shape of the outcome rather than exact per-drone identities.
#[tokio::test(start_paused = true)]
async fn s4_link_outage_drops_drones_without_stalling_the_mission() {
    let mission = MissionConfig { defence_hit_pct: 0, link_loss_pct: 80, reconnect_timeout_secs: 2, speed: 1, fuel: 500, ticks: 1000 };
    let report = run_mission(base_run(mission, 150)).await;

    assert!(!report.forced_shutdown);
    assert_eq!(report.swarms.len(), 3);

    let mut total_link_lost = 0usize;
    for swarm in &report.swarms {
        let accounted = swarm.detonated + swarm.destroyed + swarm.fuel_empty + swarm.link_lost + swarm.mission_complete;
        assert_eq!(accounted, swarm.attack_total + swarm.camera_total, "swarm {} must end with every drone in exactly one terminal bucket", swarm.swarm_id);
        total_link_lost += swarm.link_lost;
    }

    // 80% per-tick loss odds over a multi-hundred-tick mission makes at
    // least one outage that outlasts the 2-tick reconnect window a
    // near-certainty; this is what actually exercises the DroneLost path.
    assert!(total_link_lost > 0, "expected at least one drone to exceed the reconnect timeout");
}
