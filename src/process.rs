//! Synthetic processes.
//!
//! Stochastic worlds that produce a true state and a noisy observation of it each step, for the
//! filters to consume. The random source is supplied by the caller.

use nalgebra::DVector;
use rand_core::RngCore;
use rand_distr::{Distribution, Normal, Standard};

use crate::error::{EstimateError, EstimateResult};
use crate::linalg::{check_shape, check_timestep};

/// One step of a synthetic process.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Ground truth
    pub truth: DVector<f64>,
    /// Noisy observation of the truth
    pub observation: DVector<f64>,
}

/// A process producing noisy observations of a true state.
pub trait SyntheticProcess {
    /// (observation, control) dimensions.
    fn dims(&self) -> (usize, usize);

    /// Advance the process by dt under a control input.
    fn step<R: RngCore + ?Sized>(&mut self, dt: f64, control: &DVector<f64>, rng: &mut R) -> EstimateResult<Sample>;
}

// rand_distr accepts a negative std_dev, mirroring the distribution
fn normal(mean: f64, std_dev: f64) -> EstimateResult<Normal<f64>> {
    const MESSAGE: &str = "noise standard deviation must be finite and >= 0";
    if !(std_dev >= 0.0) {
        return Err(EstimateError::Configuration(MESSAGE));
    }
    Normal::new(mean, std_dev).map_err(|_| EstimateError::Configuration(MESSAGE))
}

/// Water tank configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WaterTankConfig {
    /// Level sensor noise standard deviation per unit time
    pub level_sensor_noise: f64,
    /// Capacity, the level is held within [0, max_level]
    pub max_level: f64,
    /// Initial level
    pub level_now: f64,
    /// Level rise per unit time with the inlet open
    pub fill_rate: f64,
    /// Level fall per unit time
    pub leak_rate: f64,
}

impl Default for WaterTankConfig {
    fn default() -> Self {
        WaterTankConfig {
            level_sensor_noise: 20.0,
            max_level: 100.0,
            level_now: 30.0,
            fill_rate: 2.0,
            leak_rate: 0.1,
        }
    }
}

/// A leaking tank filled through an on/off inlet.
#[derive(Debug, Clone)]
pub struct WaterTank {
    config: WaterTankConfig,
    level: f64,
}

impl WaterTank {
    pub fn new(config: WaterTankConfig) -> EstimateResult<Self> {
        normal(0.0, config.level_sensor_noise)?;
        if !(config.max_level > 0.0) {
            return Err(EstimateError::Configuration("max_level must be > 0"));
        }
        Ok(WaterTank { config, level: config.level_now.max(0.0).min(config.max_level) })
    }

    pub fn true_value(&self) -> f64 {
        self.level
    }
}

impl SyntheticProcess for WaterTank {
    fn dims(&self) -> (usize, usize) {
        (1, 1)
    }

    /// The reading is drawn from Normal(level, level_sensor_noise * dt).
    fn step<R: RngCore + ?Sized>(&mut self, dt: f64, control: &DVector<f64>, rng: &mut R) -> EstimateResult<Sample> {
        check_timestep(dt)?;
        check_shape("control input", control, (1, 1))?;
        let c = &self.config;
        let level = self.level + control[0] * c.fill_rate * dt - c.leak_rate * dt;
        self.level = level.max(0.0).min(c.max_level);

        let reading = normal(self.level, c.level_sensor_noise * dt)?.sample(rng);
        Ok(Sample {
            truth: DVector::from_vec(vec![self.level]),
            observation: DVector::from_vec(vec![reading]),
        })
    }
}

/// Random walk configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RandomWalkConfig {
    pub x: f64,
    pub y: f64,
    /// Initial heading (radians)
    pub theta: f64,
    /// Distance moved each step
    pub v: f64,
    /// Heading change per step is uniform in [-random_scale/2, random_scale/2)
    pub random_scale: f64,
    /// Standard deviation of the position observation noise
    pub observation_noise: f64,
}

impl Default for RandomWalkConfig {
    fn default() -> Self {
        RandomWalkConfig {
            x: 300.0,
            y: 300.0,
            theta: 0.3,
            v: 1.0,
            random_scale: 0.6,
            observation_noise: 0.0,
        }
    }
}

/// A walker with a randomly drifting heading in the plane.
///
/// The control input is ignored.
#[derive(Debug, Clone)]
pub struct RandomWalk {
    config: RandomWalkConfig,
    x: f64,
    y: f64,
    theta: f64,
    noise: Normal<f64>,
}

impl RandomWalk {
    pub fn new(config: RandomWalkConfig) -> EstimateResult<Self> {
        let noise = normal(0.0, config.observation_noise)?;
        Ok(RandomWalk { config, x: config.x, y: config.y, theta: config.theta, noise })
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn heading(&self) -> f64 {
        self.theta
    }
}

impl SyntheticProcess for RandomWalk {
    fn dims(&self) -> (usize, usize) {
        (2, 1)
    }

    fn step<R: RngCore + ?Sized>(&mut self, dt: f64, _control: &DVector<f64>, rng: &mut R) -> EstimateResult<Sample> {
        check_timestep(dt)?;
        let u: f64 = Standard.sample(rng);
        self.theta += (u - 0.5) * self.config.random_scale;
        self.x += self.config.v * self.theta.cos();
        self.y += self.config.v * self.theta.sin();

        let observation = vec![self.x + self.noise.sample(rng), self.y + self.noise.sample(rng)];
        Ok(Sample {
            truth: DVector::from_vec(vec![self.x, self.y]),
            observation: DVector::from_vec(observation),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn tank_fills_and_leaks() {
        let mut rng = StdRng::seed_from_u64(1);
        let config = WaterTankConfig { level_sensor_noise: 0.0, ..WaterTankConfig::default() };
        let mut tank = WaterTank::new(config).unwrap();
        let open = DVector::from_vec(vec![1.0]);
        let sample = tank.step(0.5, &open, &mut rng).unwrap();
        assert_relative_eq!(tank.true_value(), 30.0 + 1.0 - 0.05);
        assert_eq!(sample.observation, sample.truth);

        let closed = DVector::from_vec(vec![0.0]);
        tank.step(0.5, &closed, &mut rng).unwrap();
        assert_relative_eq!(tank.true_value(), 30.95 - 0.05);
    }

    #[test]
    fn tank_level_held_in_capacity() {
        let mut rng = StdRng::seed_from_u64(2);
        let config = WaterTankConfig { level_now: 0.0, ..WaterTankConfig::default() };
        let mut tank = WaterTank::new(config).unwrap();
        tank.step(1.0, &DVector::from_vec(vec![0.0]), &mut rng).unwrap();
        assert_eq!(tank.true_value(), 0.0);
        for _ in 0..100 {
            tank.step(1.0, &DVector::from_vec(vec![1.0]), &mut rng).unwrap();
        }
        assert_eq!(tank.true_value(), 100.0);
    }

    #[test]
    fn tank_rejects_bad_input() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(WaterTank::new(WaterTankConfig { level_sensor_noise: -1.0, ..WaterTankConfig::default() }).is_err());
        let mut tank = WaterTank::new(WaterTankConfig::default()).unwrap();
        assert!(tank.step(0.0, &DVector::from_vec(vec![0.0]), &mut rng).is_err());
        assert!(tank.step(0.5, &DVector::from_vec(vec![0.0, 1.0]), &mut rng).is_err());
    }

    #[test]
    fn walk_rejects_negative_noise() {
        let config = RandomWalkConfig { observation_noise: -2.0, ..RandomWalkConfig::default() };
        assert!(matches!(RandomWalk::new(config), Err(EstimateError::Configuration(_))));
        let nan = RandomWalkConfig { observation_noise: std::f64::NAN, ..RandomWalkConfig::default() };
        assert!(RandomWalk::new(nan).is_err());
        assert!(RandomWalk::new(RandomWalkConfig { observation_noise: 0.0, ..RandomWalkConfig::default() }).is_ok());
    }

    #[test]
    fn walk_moves_one_step() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut walk = RandomWalk::new(RandomWalkConfig::default()).unwrap();
        let sample = walk.step(0.06, &DVector::from_vec(vec![0.0]), &mut rng).unwrap();
        let (x, y) = walk.position();
        assert_relative_eq!(((x - 300.0).powi(2) + (y - 300.0).powi(2)).sqrt(), 1.0, epsilon = 1e-12);
        assert!((walk.heading() - 0.3).abs() <= 0.3);
        assert_eq!(sample.observation, sample.truth);
    }
}
