//! Numerical run parameters
//!
//! `Parameters` holds runtime settings:
//! - fixed step size and number of steps,
//! - how often progress is logged

#[derive(Debug, Clone)]
pub struct Parameters {
    pub dt: f64, // step size
    pub steps: usize, // number of steps to record
    pub log_every: usize, // progress log interval, 0 disables it
}

impl Parameters {
    /// Simulated time at the end of the run
    pub fn t_end(&self) -> f64 {
        self.dt * self.steps as f64
    }
}
