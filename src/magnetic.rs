// Magnetic button: keeps track of the element center, pulls toward the pointer
// when it comes close and springs back once it leaves

use nalgebra_glm as glm;
use vecmath::Vector2;

// Damped spring, advanced with semi-implicit Euler in small substeps
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Spring {
    pub value: f64,
    pub velocity: f64,
    pub target: f64,
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
}

impl Spring {
    const MAX_SUBSTEP: f64 = 0.004;
    // Longer steps are cut to this, seconds
    const MAX_STEP: f64 = 0.1;
    const REST_EPSILON: f64 = 0.01;

    pub fn new(stiffness: f64, damping: f64) -> Spring {
        Spring {
            value: 0.0,
            velocity: 0.0,
            target: 0.0,
            stiffness,
            damping,
            mass: 1.0,
        }
    }

    pub fn step(&mut self, dt: f64) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let dt = dt.min(Spring::MAX_STEP);
        let substeps = (dt / Spring::MAX_SUBSTEP).ceil().max(1.0) as usize;
        let h = dt / substeps as f64;
        for _ in 0..substeps {
            let force = -self.stiffness * (self.value - self.target) - self.damping * self.velocity;
            self.velocity += force / self.mass * h;
            self.value += self.velocity * h;
        }
    }

    pub fn is_at_rest(&self) -> bool {
        (self.value - self.target).abs() < Spring::REST_EPSILON
            && self.velocity.abs() < Spring::REST_EPSILON
    }
}

pub struct MagneticButton {
    pub center: Vector2<f64>,
    pub is_hovered: bool,
    x: Spring,
    y: Spring,
    // Last transform handed out by `advance`
    applied: Option<String>,
}

impl MagneticButton {
    pub const RADIUS: f64 = 80.0;
    pub const MAX_PULL: f64 = 8.0;
    pub const HOVER_SCALE: f64 = 1.02;
    pub const STIFFNESS: f64 = 300.0;
    pub const DAMPING: f64 = 20.0;

    pub fn new(center: Vector2<f64>) -> Self {
        MagneticButton {
            center,
            is_hovered: false,
            x: Spring::new(MagneticButton::STIFFNESS, MagneticButton::DAMPING),
            y: Spring::new(MagneticButton::STIFFNESS, MagneticButton::DAMPING),
            applied: None,
        }
    }

    // Whether the pointer is close enough to pull the button
    pub fn is_point_inside(&self, x: f64, y: f64) -> bool {
        let distance = glm::length(&glm::vec2(x - self.center[0], y - self.center[1]));
        distance < MagneticButton::RADIUS
    }

    // Offset the button wants toward the pointer at (x, y): full strength at
    // the center, fading to nothing at `RADIUS`
    pub fn pull(&self, x: f64, y: f64) -> Vector2<f64> {
        let delta = glm::vec2(x - self.center[0], y - self.center[1]);
        let distance = glm::length(&delta);
        if distance <= std::f64::EPSILON {
            return [0.0, 0.0];
        }
        let strength = ((MagneticButton::RADIUS - distance) / MagneticButton::RADIUS)
            .max(0.0)
            .min(1.0);
        let offset = delta / distance * strength * MagneticButton::MAX_PULL;
        [offset.x, offset.y]
    }

    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        let [tx, ty] = if self.is_point_inside(x, y) {
            self.pull(x, y)
        } else {
            [0.0, 0.0]
        };
        self.x.target = tx;
        self.y.target = ty;
    }

    pub fn pointer_entered(&mut self) {
        self.is_hovered = true;
    }

    pub fn pointer_left(&mut self) {
        self.is_hovered = false;
        self.x.target = 0.0;
        self.y.target = 0.0;
    }

    pub fn move_to(&mut self, center: Vector2<f64>) {
        self.center = center;
    }

    // Advances the springs by `dt` seconds, returns whether the button is
    // still moving
    pub fn step(&mut self, dt: f64) -> bool {
        self.x.step(dt);
        self.y.step(dt);
        !(self.x.is_at_rest() && self.y.is_at_rest())
    }

    // Steps the springs and returns the CSS transform, or None when the
    // button is at rest and already shows it
    pub fn advance(&mut self, dt: f64) -> Option<String> {
        let moving = self.step(dt);
        let transform = self.transform();
        if !moving && self.applied.as_ref() == Some(&transform) {
            return None;
        }
        self.applied = Some(transform.clone());
        Some(transform)
    }

    // Forget the applied transform, the next `advance` writes it again
    pub fn detach(&mut self) {
        self.applied = None;
    }

    pub fn offset(&self) -> Vector2<f64> {
        [self.x.value, self.y.value]
    }

    pub fn target(&self) -> Vector2<f64> {
        [self.x.target, self.y.target]
    }

    pub fn scale(&self) -> f64 {
        if self.is_hovered {
            MagneticButton::HOVER_SCALE
        } else {
            1.0
        }
    }

    // CSS transform for the current offset and scale
    pub fn transform(&self) -> String {
        let [x, y] = self.offset();
        format!("translate({:.2}px, {:.2}px) scale({})", x, y, self.scale())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pull_is_zero_outside_radius() {
        let button = MagneticButton::new([100.0, 100.0]);
        assert_eq!(button.pull(100.0, 180.0), [0.0, 0.0]);
        assert_eq!(button.pull(300.0, 300.0), [0.0, 0.0]);
        assert!(!button.is_point_inside(100.0, 180.0));
        assert!(button.is_point_inside(100.0, 179.0));
    }

    #[test]
    fn pull_grows_toward_center() {
        let button = MagneticButton::new([0.0, 0.0]);
        let far = button.pull(60.0, 0.0);
        let near = button.pull(20.0, 0.0);
        assert!((far[0] - 2.0).abs() < 1e-9);
        assert!((near[0] - 6.0).abs() < 1e-9);
        assert_eq!(far[1], 0.0);
        // Never more than the maximum pull
        let [x, y] = button.pull(0.001, 0.001);
        assert!((x * x + y * y).sqrt() <= MagneticButton::MAX_PULL + 1e-9);
        assert_eq!(button.pull(0.0, 0.0), [0.0, 0.0]);
    }

    #[test]
    fn spring_settles_on_target() {
        let mut button = MagneticButton::new([0.0, 0.0]);
        button.pointer_entered();
        button.pointer_moved(40.0, -40.0);
        let target = button.target();
        for _ in 0..120 {
            button.step(1.0 / 60.0);
        }
        let [x, y] = button.offset();
        assert!((x - target[0]).abs() < 0.01);
        assert!((y - target[1]).abs() < 0.01);
        assert!(!button.step(1.0 / 60.0));
        assert_eq!(button.scale(), MagneticButton::HOVER_SCALE);
    }

    #[test]
    fn leaving_springs_back_home() {
        let mut button = MagneticButton::new([0.0, 0.0]);
        button.pointer_entered();
        button.pointer_moved(10.0, 10.0);
        for _ in 0..30 {
            button.step(1.0 / 60.0);
        }
        button.pointer_left();
        assert_eq!(button.target(), [0.0, 0.0]);
        for _ in 0..120 {
            button.step(1.0 / 60.0);
        }
        let [x, y] = button.offset();
        assert!(x.abs() < 0.01 && y.abs() < 0.01);
        assert_eq!(button.transform(), format!("translate({:.2}px, {:.2}px) scale(1)", x, y));
    }

    #[test]
    fn far_pointer_sets_no_target() {
        let mut button = MagneticButton::new([10.0, 10.0]);
        button.pointer_moved(30.0, 10.0);
        assert!(button.target()[0] > 0.0);
        button.pointer_moved(200.0, 10.0);
        assert_eq!(button.target(), [0.0, 0.0]);

        // Re-centering changes which pointers are close enough
        button.move_to([200.0, 0.0]);
        button.pointer_moved(200.0, 10.0);
        assert!(button.target()[1] > 0.0);
    }

    #[test]
    fn long_step_is_cut_short() {
        let mut long = Spring::new(MagneticButton::STIFFNESS, MagneticButton::DAMPING);
        let mut short = long;
        long.target = 8.0;
        short.target = 8.0;
        long.step(2000.0);
        short.step(0.1);
        assert_eq!(long, short);
    }

    #[test]
    fn transform_only_reported_on_change() {
        let mut button = MagneticButton::new([0.0, 0.0]);
        assert_eq!(
            button.advance(1.0 / 60.0).as_deref(),
            Some("translate(0.00px, 0.00px) scale(1)")
        );
        assert_eq!(button.advance(1.0 / 60.0), None);

        button.pointer_entered();
        assert!(button.advance(1.0 / 60.0).is_some());
        button.pointer_moved(20.0, 0.0);
        let mut writes = 0;
        for _ in 0..240 {
            if button.advance(1.0 / 60.0).is_some() {
                writes += 1;
            }
        }
        assert!(writes > 0 && writes < 240);
        assert_eq!(button.advance(1.0 / 60.0), None);

        button.detach();
        assert!(button.advance(1.0 / 60.0).is_some());
    }
}
