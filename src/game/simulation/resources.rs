/// Resource definitions for the simulation.

use bevy::prelude::*;

/// Number of fixed ticks simulated so far.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavTick(pub u64);

impl NavTick {
    pub fn increment(&mut self) {
        self.0 += 1;
    }
}
