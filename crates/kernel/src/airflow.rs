use glam::Vec3;
use liftsim_common::Rgb;
use serde::{Deserialize, Serialize};

/// Which face of the wing a streamline group belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AirflowSide {
    Above,
    Below,
}

/// Shape of one streamline group, in plane-local units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamlineLayout {
    pub lines: usize,
    pub points_per_line: usize,
    pub spacing: f32,
    pub amplitude: f32,
    pub lateral_spread: f32,
    /// Points scrolled past `+wrap_extent` reappear at `-wrap_extent`.
    pub wrap_extent: f32,
}

impl Default for StreamlineLayout {
    fn default() -> Self {
        Self {
            lines: 12,
            points_per_line: 80,
            spacing: 50.0,
            amplitude: 50.0,
            lateral_spread: 200.0,
            wrap_extent: 5000.0,
        }
    }
}

/// A bundle of streamlines drawn on one side of the plane.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamlineGroup {
    pub side: AirflowSide,
    pub color: Rgb,
    pub opacity: f32,
    lines: Vec<Vec<Vec3>>,
    wrap_extent: f32,
}

impl StreamlineGroup {
    pub fn new(side: AirflowSide, offset_y: f32, color: Rgb, layout: &StreamlineLayout) -> Self {
        let lines = (0..layout.lines)
            .map(|i| {
                let fi = i as f32;
                (0..layout.points_per_line)
                    .map(|j| {
                        let fj = j as f32;
                        Vec3::new(
                            fj * layout.spacing,
                            offset_y + (fj * 0.3 + fi).sin() * layout.amplitude,
                            (fi * 0.5).cos() * layout.lateral_spread,
                        )
                    })
                    .collect()
            })
            .collect();
        Self {
            side,
            color,
            opacity: 0.6,
            lines,
            wrap_extent: layout.wrap_extent,
        }
    }

    pub fn lines(&self) -> &[Vec<Vec3>] {
        &self.lines
    }

    /// Slide every point along +X by `speed`, wrapping at the extent.
    pub fn scroll(&mut self, speed: f32) {
        let extent = self.wrap_extent;
        for point in self.lines.iter_mut().flatten() {
            point.x += speed;
            if point.x > extent {
                point.x = -extent;
            }
        }
    }
}

/// Both streamline groups plus which one is currently attached to the plane.
#[derive(Debug, Clone, PartialEq)]
pub struct AirflowField {
    above: StreamlineGroup,
    below: StreamlineGroup,
    attached: Option<AirflowSide>,
}

impl Default for AirflowField {
    fn default() -> Self {
        Self::new(&StreamlineLayout::default())
    }
}

impl AirflowField {
    pub fn new(layout: &StreamlineLayout) -> Self {
        Self {
            above: StreamlineGroup::new(AirflowSide::Above, 1200.0, Rgb::from_hex(0xff3333), layout),
            below: StreamlineGroup::new(AirflowSide::Below, -800.0, Rgb::from_hex(0x3399ff), layout),
            attached: None,
        }
    }

    pub fn attached(&self) -> Option<AirflowSide> {
        self.attached
    }

    /// The currently attached group, if any.
    pub fn visible(&self) -> Option<&StreamlineGroup> {
        self.attached.map(|side| self.group(side))
    }

    pub fn group(&self, side: AirflowSide) -> &StreamlineGroup {
        match side {
            AirflowSide::Above => &self.above,
            AirflowSide::Below => &self.below,
        }
    }

    pub fn detach(&mut self) {
        self.attached = None;
    }

    /// Attach `side` and advance its streamlines.
    pub fn attach_and_scroll(&mut self, side: AirflowSide, speed: f32) {
        self.attached = Some(side);
        match side {
            AirflowSide::Above => self.above.scroll(speed),
            AirflowSide::Below => self.below.scroll(speed),
        }
    }
}
