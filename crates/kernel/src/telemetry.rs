use crate::flight::{FlightPhase, FlightSim};
use glam::Vec3;

/// Read-only snapshot of the flight for panels and logs.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightSummary {
    pub tick: u64,
    pub position: Vec3,
    pub velocity: f32,
    pub fly_time: f32,
    pub pitch_degrees: f32,
    pub phase: &'static str,
    /// Reset completion in `0.0..=1.0`, when resetting.
    pub reset_progress: Option<f32>,
}

impl FlightSummary {
    pub fn capture(sim: &FlightSim) -> Self {
        let (phase, reset_progress) = match sim.phase() {
            FlightPhase::Flying => ("flying", None),
            FlightPhase::Grounded => ("grounded", None),
            FlightPhase::Resetting { progress, .. } => ("resetting", Some(progress)),
        };
        Self {
            tick: sim.tick(),
            position: sim.position(),
            velocity: sim.velocity(),
            fly_time: sim.fly_time(),
            pitch_degrees: sim.pitch().to_degrees(),
            phase,
            reset_progress,
        }
    }
}

impl std::fmt::Display for FlightSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "tick={} phase={} pos=({:.0}, {:.0}, {:.0}) v={:.2} t={:.2}s pitch={:.2}deg",
            self.tick,
            self.phase,
            self.position.x,
            self.position.y,
            self.position.z,
            self.velocity,
            self.fly_time,
            self.pitch_degrees
        )?;
        if let Some(p) = self.reset_progress {
            write!(f, " reset={:.0}%", p * 100.0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight::Pressures;

    #[test]
    fn summary_of_fresh_sim() {
        let summary = FlightSummary::capture(&FlightSim::default());
        assert_eq!(summary.tick, 0);
        assert_eq!(summary.phase, "flying");
        assert!(summary.reset_progress.is_none());
        let text = summary.to_string();
        assert!(text.contains("tick=0"));
        assert!(text.contains("pos=(0, 250000, 0)"));
    }

    #[test]
    fn summary_reports_reset_progress() {
        let mut sim = FlightSim::default();
        // Climb straight through the ceiling.
        let mut params = *sim.params();
        params.origin = Vec3::new(0.0, 9_999_990.0, 0.0);
        sim = FlightSim::new(params);
        sim.step(Pressures::new(0.0, 1000.0));
        sim.step(Pressures::default());
        let summary = FlightSummary::capture(&sim);
        assert_eq!(summary.phase, "resetting");
        assert!(summary.reset_progress.unwrap() > 0.0);
        assert!(summary.to_string().contains("reset="));
    }
}
