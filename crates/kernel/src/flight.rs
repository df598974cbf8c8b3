use crate::airflow::{AirflowField, AirflowSide, StreamlineLayout};
use glam::{EulerRot, Quat, Vec3};
use liftsim_common::{Bounds, Transform};
use serde::{Deserialize, Serialize};

/// Tuning constants for the lift model. All rates are per simulation frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightParams {
    pub origin: Vec3,
    pub initial_velocity: f32,
    pub max_velocity: f32,
    pub acceleration: f32,
    /// Speed after resuming from the ground or finishing a reset.
    pub resume_velocity: f32,
    pub frame_time: f32,
    pub reset_duration: f32,
    pub lift_factor: f32,
    pub pitch_factor: f32,
    pub max_pitch: f32,
    pub ground_y: f32,
    pub ground_clearance: f32,
    pub bounds: Bounds,
    pub model_scale: f32,
    pub airflow_above_speed: f32,
    pub airflow_below_speed: f32,
    pub airflow: StreamlineLayout,
}

impl Default for FlightParams {
    fn default() -> Self {
        Self {
            origin: Vec3::new(0.0, 250_000.0, 0.0),
            initial_velocity: 2000.0,
            max_velocity: 1000.0,
            acceleration: 0.01,
            resume_velocity: 200.0,
            frame_time: 0.02,
            reset_duration: 2.0,
            lift_factor: 0.5,
            pitch_factor: 0.0001,
            max_pitch: 0.3,
            ground_y: 0.0,
            ground_clearance: 10.0,
            bounds: Bounds::new(
                Vec3::new(-5.0e6, 0.0, -5.0e6),
                Vec3::new(5.0e6, 1.0e7, 5.0e6),
            ),
            model_scale: 100.0,
            airflow_above_speed: 0.2,
            airflow_below_speed: 0.1,
            airflow: StreamlineLayout::default(),
        }
    }
}

impl FlightParams {
    /// Whether `p` has left the flight volume. The floor is handled by
    /// grounding, so only the ceiling counts on the vertical axis.
    pub fn out_of_bounds(&self, p: Vec3) -> bool {
        let b = &self.bounds;
        p.x < b.min.x || p.x > b.max.x || p.y > b.max.y || p.z < b.min.z || p.z > b.max.z
    }
}

/// Pressure readings driving one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pressures {
    pub above: f32,
    pub below: f32,
}

impl Pressures {
    pub fn new(above: f32, below: f32) -> Self {
        Self { above, below }
    }

    /// Positive when the underside pushes harder.
    pub fn delta(&self) -> f32 {
        self.below - self.above
    }
}

/// Where the plane is in its flight lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FlightPhase {
    Flying,
    /// Touched the ground; waits for `below > above` to take off again.
    Grounded,
    /// Gliding back to the origin after leaving the bounds.
    Resetting {
        from: Vec3,
        progress: f32,
        /// The plane grounded on the same frame it left the bounds.
        grounded_after: bool,
    },
}

/// Record of a phase change. The log is drained by the frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FlightEvent {
    Grounded { tick: u64, position: Vec3 },
    Resumed { tick: u64 },
    ResetStarted { tick: u64, from: Vec3 },
    ResetFinished { tick: u64 },
}

impl FlightEvent {
    /// Grounding and take-off can alternate every frame while a grounded
    /// plane gets too little lift to clear the ground; resets cannot.
    pub fn is_routine(&self) -> bool {
        matches!(self, FlightEvent::Grounded { .. } | FlightEvent::Resumed { .. })
    }
}

/// The authoritative flight state.
///
/// `step` advances exactly one frame. Callers pace it; the desktop app runs
/// it from a fixed 60 Hz accumulator.
#[derive(Debug, Clone)]
pub struct FlightSim {
    params: FlightParams,
    position: Vec3,
    pitch: f32,
    velocity: f32,
    fly_time: f32,
    phase: FlightPhase,
    airflow: AirflowField,
    tick: u64,
    event_log: Vec<FlightEvent>,
}

impl Default for FlightSim {
    fn default() -> Self {
        Self::new(FlightParams::default())
    }
}

impl FlightSim {
    pub fn new(params: FlightParams) -> Self {
        Self {
            position: params.origin,
            pitch: 0.0,
            velocity: params.initial_velocity,
            fly_time: 0.0,
            phase: FlightPhase::Flying,
            airflow: AirflowField::new(&params.airflow),
            tick: 0,
            event_log: Vec::new(),
            params,
        }
    }

    pub fn params(&self) -> &FlightParams {
        &self.params
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn fly_time(&self) -> f32 {
        self.fly_time
    }

    /// Nose angle in radians; positive means climbing.
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn phase(&self) -> FlightPhase {
        self.phase
    }

    pub fn is_resetting(&self) -> bool {
        matches!(self.phase, FlightPhase::Resetting { .. })
    }

    pub fn airflow(&self) -> &AirflowField {
        &self.airflow
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Model transform: scaled, tilted nose-up and rolled by the pitch.
    pub fn transform(&self) -> Transform {
        Transform {
            position: self.position,
            rotation: Quat::from_euler(EulerRot::XYZ, -self.pitch, 0.0, self.pitch),
            scale: Vec3::splat(self.params.model_scale),
        }
    }

    pub fn events(&self) -> &[FlightEvent] {
        &self.event_log
    }

    pub fn drain_events(&mut self) -> Vec<FlightEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Advance the simulation by one frame.
    pub fn step(&mut self, pressures: Pressures) {
        self.tick += 1;

        if let FlightPhase::Resetting {
            from,
            progress,
            grounded_after,
        } = self.phase
        {
            self.advance_reset(from, progress, grounded_after);
            return;
        }

        if self.phase == FlightPhase::Grounded && pressures.below > pressures.above {
            self.phase = FlightPhase::Flying;
            self.velocity = self.params.resume_velocity;
            self.event_log.push(FlightEvent::Resumed { tick: self.tick });
        }

        if self.phase != FlightPhase::Flying {
            return;
        }

        let p = self.params;
        self.fly_time += p.frame_time;
        self.velocity = (self.velocity + p.acceleration).min(p.max_velocity);
        self.position.x += self.velocity;

        self.airflow.detach();
        if pressures.above != pressures.below {
            let lift = pressures.delta() * p.lift_factor;
            self.position.y += lift;
            self.pitch = (lift * p.pitch_factor).clamp(-p.max_pitch, p.max_pitch);

            if pressures.above > pressures.below {
                self.airflow.attach_and_scroll(
                    AirflowSide::Above,
                    (pressures.above - pressures.below) * p.airflow_above_speed,
                );
            } else {
                self.airflow.attach_and_scroll(
                    AirflowSide::Below,
                    (pressures.below - pressures.above) * p.airflow_below_speed,
                );
            }
        }

        let mut grounded = false;
        if self.position.y <= p.ground_y + p.ground_clearance {
            grounded = true;
            self.phase = FlightPhase::Grounded;
            self.velocity = 0.0;
            self.event_log.push(FlightEvent::Grounded {
                tick: self.tick,
                position: self.position,
            });
        }

        if p.out_of_bounds(self.position) {
            self.start_reset(grounded);
        }
    }

    fn start_reset(&mut self, grounded_after: bool) {
        self.phase = FlightPhase::Resetting {
            from: self.position,
            progress: 0.0,
            grounded_after,
        };
        self.event_log.push(FlightEvent::ResetStarted {
            tick: self.tick,
            from: self.position,
        });
    }

    fn advance_reset(&mut self, from: Vec3, progress: f32, grounded_after: bool) {
        let progress = progress + self.params.frame_time / self.params.reset_duration;
        if progress >= 1.0 {
            self.position = self.params.origin;
            self.fly_time = 0.0;
            self.velocity = self.params.resume_velocity;
            self.phase = if grounded_after {
                FlightPhase::Grounded
            } else {
                FlightPhase::Flying
            };
            self.event_log
                .push(FlightEvent::ResetFinished { tick: self.tick });
        } else {
            self.position = from.lerp(self.params.origin, progress);
            self.phase = FlightPhase::Resetting {
                from,
                progress,
                grounded_after,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim_at(position: Vec3) -> FlightSim {
        let mut sim = FlightSim::default();
        sim.position = position;
        sim
    }

    #[test]
    fn starts_at_origin_flying() {
        let sim = FlightSim::default();
        assert_eq!(sim.position(), Vec3::new(0.0, 250_000.0, 0.0));
        assert_eq!(sim.phase(), FlightPhase::Flying);
        assert_eq!(sim.tick(), 0);
        assert_eq!(sim.transform().scale, Vec3::splat(100.0));
    }

    #[test]
    fn first_step_clamps_velocity() {
        let mut sim = FlightSim::default();
        sim.step(Pressures::new(500.0, 500.0));
        assert_eq!(sim.velocity(), 1000.0);
        assert_eq!(sim.position().x, 1000.0);
        assert!((sim.fly_time() - 0.02).abs() < 1e-6);
    }

    #[test]
    fn equal_pressures_hold_altitude_and_attitude() {
        let mut sim = FlightSim::default();
        sim.step(Pressures::new(0.0, 1000.0));
        let pitch = sim.pitch();
        let y = sim.position().y;
        sim.step(Pressures::new(700.0, 700.0));
        assert_eq!(sim.position().y, y);
        assert_eq!(sim.pitch(), pitch);
        assert!(sim.airflow().attached().is_none());
    }

    #[test]
    fn higher_pressure_below_climbs() {
        let mut sim = FlightSim::default();
        sim.step(Pressures::new(400.0, 1000.0));
        // lift = 600 * 0.5
        assert_eq!(sim.position().y, 250_300.0);
        assert!((sim.pitch() - 0.03).abs() < 1e-6);
        assert_eq!(sim.airflow().attached(), Some(AirflowSide::Below));
        // below side scrolls by 600 * 0.1
        let first = sim.airflow().group(AirflowSide::Below).lines()[0][0];
        assert!((first.x - 60.0).abs() < 1e-3);
    }

    #[test]
    fn higher_pressure_above_sinks_and_shows_upper_flow() {
        let mut sim = FlightSim::default();
        sim.step(Pressures::new(1000.0, 0.0));
        assert_eq!(sim.position().y, 249_500.0);
        assert!((sim.pitch() + 0.05).abs() < 1e-6);
        assert_eq!(sim.airflow().attached(), Some(AirflowSide::Above));
        let first = sim.airflow().group(AirflowSide::Above).lines()[0][0];
        assert!((first.x - 200.0).abs() < 1e-3);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut params = FlightParams::default();
        params.lift_factor = 100.0;
        let mut sim = FlightSim::new(params);
        sim.step(Pressures::new(0.0, 2000.0));
        assert_eq!(sim.pitch(), 0.3);
        sim.step(Pressures::new(2000.0, 0.0));
        assert_eq!(sim.pitch(), -0.3);
    }

    #[test]
    fn transform_tilts_with_pitch() {
        let mut sim = FlightSim::default();
        sim.step(Pressures::new(0.0, 1000.0));
        let forward = sim.transform().rotation * Vec3::Z;
        // rotation.x = -pitch tips local +Z upward
        assert!(forward.y > 0.0);
    }

    #[test]
    fn touching_ground_grounds_the_plane() {
        let mut sim = sim_at(Vec3::new(0.0, 100.0, 0.0));
        sim.step(Pressures::new(1000.0, 0.0));
        assert_eq!(sim.phase(), FlightPhase::Grounded);
        assert_eq!(sim.velocity(), 0.0);
        assert!(matches!(sim.events(), [FlightEvent::Grounded { .. }]));

        // Grounded plane does not move while the top pressure dominates.
        let pos = sim.position();
        sim.step(Pressures::new(1000.0, 0.0));
        sim.step(Pressures::new(500.0, 500.0));
        assert_eq!(sim.position(), pos);
        assert_eq!(sim.phase(), FlightPhase::Grounded);
    }

    #[test]
    fn grounded_plane_resumes_when_pushed_from_below() {
        let mut sim = sim_at(Vec3::new(0.0, 5.0, 0.0));
        sim.step(Pressures::new(10.0, 0.0));
        assert_eq!(sim.phase(), FlightPhase::Grounded);

        sim.step(Pressures::new(0.0, 100.0));
        assert_eq!(sim.phase(), FlightPhase::Flying);
        // resume speed plus one frame of acceleration
        assert!((sim.velocity() - 200.01).abs() < 1e-3);
        assert!(sim.position().y > 5.0);
        assert!(sim
            .events()
            .iter()
            .any(|e| matches!(e, FlightEvent::Resumed { .. })));
    }

    #[test]
    fn tiny_lift_on_the_ground_alternates_routine_events() {
        let mut sim = sim_at(Vec3::new(0.0, 5.0, 0.0));
        sim.step(Pressures::new(10.0, 0.0));
        sim.drain_events();

        for _ in 0..3 {
            sim.step(Pressures::new(1000.0, 1001.0));
            let events = sim.drain_events();
            assert!(matches!(
                events.as_slice(),
                [FlightEvent::Resumed { .. }, FlightEvent::Grounded { .. }]
            ));
            assert!(events.iter().all(FlightEvent::is_routine));
            assert_eq!(sim.phase(), FlightPhase::Grounded);
        }
    }

    #[test]
    fn resets_are_not_routine() {
        let from = Vec3::ZERO;
        assert!(!FlightEvent::ResetStarted { tick: 1, from }.is_routine());
        assert!(!FlightEvent::ResetFinished { tick: 2 }.is_routine());
        assert!(FlightEvent::Resumed { tick: 3 }.is_routine());
    }

    #[test]
    fn leaving_bounds_starts_reset() {
        let mut sim = sim_at(Vec3::new(4_999_500.0, 250_000.0, 0.0));
        sim.step(Pressures::default());
        assert!(sim.is_resetting());
        let from = sim.position();
        assert!(from.x > 5.0e6);

        sim.step(Pressures::default());
        let expected = from.lerp(sim.params().origin, 0.01);
        assert!((sim.position() - expected).length() < 1.0);
    }

    #[test]
    fn reset_takes_two_seconds_of_frames() {
        let mut sim = sim_at(Vec3::new(5.0e6, 250_000.0, 0.0));
        sim.step(Pressures::default());
        assert!(sim.is_resetting());

        let mut frames = 0;
        while sim.is_resetting() {
            sim.step(Pressures::new(0.0, 1000.0));
            frames += 1;
            assert!(frames <= 101, "reset did not finish");
        }
        // 0.02 / 2 per frame; float accumulation may need one extra frame.
        assert!((100..=101).contains(&frames));
        assert_eq!(sim.position(), sim.params().origin);
        assert_eq!(sim.velocity(), 200.0);
        assert_eq!(sim.fly_time(), 0.0);
        assert_eq!(sim.phase(), FlightPhase::Flying);
        assert!(matches!(
            sim.events().last(),
            Some(FlightEvent::ResetFinished { .. })
        ));
    }

    #[test]
    fn ceiling_triggers_reset_but_floor_does_not() {
        let mut sim = sim_at(Vec3::new(0.0, 1.0e7 - 100.0, 0.0));
        sim.step(Pressures::new(0.0, 1000.0));
        assert!(sim.is_resetting());

        let params = FlightParams::default();
        assert!(!params.out_of_bounds(Vec3::new(0.0, -50.0, 0.0)));
        assert!(params.out_of_bounds(Vec3::new(0.0, 10.0, -5.1e6)));
    }

    #[test]
    fn grounding_while_leaving_bounds_stays_grounded_after_reset() {
        let mut sim = sim_at(Vec3::new(4_999_500.0, 5.0, 0.0));
        sim.step(Pressures::new(10.0, 0.0));
        match sim.phase() {
            FlightPhase::Resetting { grounded_after, .. } => assert!(grounded_after),
            other => panic!("expected reset, got {other:?}"),
        }
        while sim.is_resetting() {
            sim.step(Pressures::new(10.0, 0.0));
        }
        assert_eq!(sim.phase(), FlightPhase::Grounded);
        assert_eq!(sim.position(), sim.params().origin);
    }

    #[test]
    fn drain_events_clears_log() {
        let mut sim = sim_at(Vec3::new(0.0, 5.0, 0.0));
        sim.step(Pressures::new(1.0, 0.0));
        assert_eq!(sim.drain_events().len(), 1);
        assert!(sim.events().is_empty());
    }

    #[test]
    fn same_inputs_give_same_trajectory() {
        let mut a = FlightSim::default();
        let mut b = FlightSim::default();
        for i in 0..500 {
            let p = Pressures::new((i % 7) as f32 * 100.0, (i % 5) as f32 * 150.0);
            a.step(p);
            b.step(p);
        }
        assert_eq!(a.position(), b.position());
        assert_eq!(a.phase(), b.phase());
        assert_eq!(a.events(), b.events());
    }
}
