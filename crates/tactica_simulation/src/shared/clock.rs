//! Simulation clock
//!
//! AI читает время только отсюда: в App синхронизируется с `Time<Fixed>`,
//! в headless прогоне двигается вручную через `step_world`.

use bevy::prelude::*;

#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimClock {
    pub elapsed: f32,
    pub delta: f32,
}

impl SimClock {
    pub fn advance(&mut self, delta: f32) {
        self.delta = delta;
        self.elapsed += delta;
    }
}

/// System: синхронизация SimClock с fixed timestep
pub fn sync_sim_clock(time: Res<Time<Fixed>>, mut clock: ResMut<SimClock>) {
    clock.advance(time.delta_secs());
}
