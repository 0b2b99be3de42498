//! headless 模拟：固定步长的虚拟时钟驱动推广区域。

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::input::Scenario;
use crate::render_state::RenderState;
use crate::storefront::Storefront;

/// 模拟结果
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub frames: u64,
    pub events: usize,
    pub elapsed_ms: u128,
    pub final_state: RenderState,
}

/// 运行模拟直到 `duration`，结束时卸载
///
/// 每帧先分发到期的场景事件，再推进一帧。
pub fn run_simulation(
    mut storefront: Storefront,
    mut scenario: Scenario,
    duration: Duration,
    frame_interval: Duration,
) -> SimulationReport {
    let step = frame_interval.max(Duration::from_millis(1));
    storefront.mount();

    let mut now = Duration::ZERO;
    let mut frames = 0;
    let mut events = 0;

    while now < duration {
        for event in scenario.drain_due(now) {
            debug!(at_ms = now.as_millis() as u64, event = ?event, "分发场景事件");
            storefront.dispatch(event);
            events += 1;
        }

        storefront.update(step);
        now += step;
        frames += 1;
    }

    SimulationReport {
        frames,
        events,
        elapsed_ms: now.as_millis(),
        final_state: storefront.unmount(),
    }
}
