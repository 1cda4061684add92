//! Hero globe
//!
//! A wireframe globe wrapped in a glow shell, a web of connection lines, a
//! cloud of pulsing data points and two orbital rings. The scene is a flat
//! node list; per-point animation state lives in a separate [`PointMotion`]
//! array, where entry `i` drives node `FIRST_POINT + i`.

use crate::math::{spiral_point, Vec3};
use rand::Rng;
use serde::Serialize;
use spatial_core::{DisposeBag, Host, PointerEvent, ScrollState, Tick};
use std::cell::RefCell;
use std::f32::consts::PI;
use std::rc::Rc;

pub const GLOBE_RADIUS: f32 = 2.0;
pub const GLOW_RADIUS: f32 = 1.95;
pub const LINE_RADIUS: f32 = 2.1;
pub const POINT_RADIUS: f32 = 2.2;
pub const RING_RADIUS: f32 = 2.5;

pub const LINE_COUNT: usize = 20;
pub const POINT_COUNT: usize = 100;

/// How far a data point drifts from its origin
pub const POINT_DRIFT: f32 = 0.1;

const AUTO_ROTATE: f32 = 0.003;
const POINTER_EASE: f32 = 0.02;
const POINTER_REACH: f32 = 0.3;

pub const GLOBE: usize = 0;
pub const GLOW: usize = 1;
pub const LINES: usize = 2;
pub const RING_INNER: usize = 3;
pub const RING_OUTER: usize = 4;
pub const FIRST_POINT: usize = 5;

const CYAN: u32 = 0x64ffda;
const BLUE: u32 = 0x3b82f6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Wireframe,
    Glow,
    Lines,
    Ring,
    DataPoint,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SceneNode {
    pub kind: NodeKind,
    pub position: Vec3,
    /// Euler angles in radians
    pub rotation: Vec3,
    pub scale: f32,
    pub color: u32,
}

impl SceneNode {
    fn new(kind: NodeKind, color: u32) -> Self {
        Self {
            kind,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: 1.0,
            color,
        }
    }
}

/// Drift state of one data point
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PointMotion {
    pub origin: Vec3,
    pub phase: f32,
    /// Phase advance per frame, in [0.01, 0.03)
    pub speed: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Camera {
    pub fov_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl Camera {
    fn new(aspect: f32) -> Self {
        Self {
            fov_deg: 75.0,
            aspect,
            near: 0.1,
            far: 1000.0,
            position: Vec3::new(0.0, 0.0, 5.0),
        }
    }
}

/// The globe scene state, advanced one display frame at a time
#[derive(Clone, Debug)]
pub struct GlobeScene {
    nodes: Vec<SceneNode>,
    motions: Vec<PointMotion>,
    segments: Vec<(Vec3, Vec3)>,
    camera: Camera,
    /// Rotation the pointer is pulling the globe toward (x, y)
    target_rotation: (f32, f32),
}

impl GlobeScene {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, aspect: f32) -> Self {
        let mut nodes = Vec::with_capacity(FIRST_POINT + POINT_COUNT);
        nodes.push(SceneNode::new(NodeKind::Wireframe, CYAN));
        nodes.push(SceneNode::new(NodeKind::Glow, CYAN));
        nodes.push(SceneNode::new(NodeKind::Lines, BLUE));

        let mut inner = SceneNode::new(NodeKind::Ring, CYAN);
        inner.rotation.x = PI / 2.0;
        nodes.push(inner);
        let mut outer = SceneNode::new(NodeKind::Ring, BLUE);
        outer.rotation.z = PI / 3.0;
        nodes.push(outer);

        let reach = (LINE_COUNT as f32 * PI).sqrt();
        let segments = (0..LINE_COUNT)
            .map(|_| {
                let mut endpoint = || {
                    let phi = (-1.0 + 2.0 * rng.gen::<f32>()).acos();
                    Vec3::from_spherical(LINE_RADIUS, phi, reach * phi)
                };
                (endpoint(), endpoint())
            })
            .collect();

        let mut motions = Vec::with_capacity(POINT_COUNT);
        for i in 0..POINT_COUNT {
            let origin = spiral_point(i, POINT_COUNT, POINT_RADIUS);
            let color = if rng.gen_bool(0.5) { CYAN } else { BLUE };
            let mut node = SceneNode::new(NodeKind::DataPoint, color);
            node.position = origin;
            nodes.push(node);
            motions.push(PointMotion {
                origin,
                phase: rng.gen_range(0.0..2.0 * PI),
                speed: rng.gen_range(0.01..0.03),
            });
        }

        Self {
            nodes,
            motions,
            segments,
            camera: Camera::new(aspect),
            target_rotation: (0.0, 0.0),
        }
    }

    /// Aim the globe at a pointer position in client coordinates
    pub fn point_at(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let half_w = (width / 2.0).max(1.0);
        let half_h = (height / 2.0).max(1.0);
        let nx = ((x - half_w) / half_w).clamp(-1.0, 1.0) as f32;
        let ny = ((y - half_h) / half_h).clamp(-1.0, 1.0) as f32;
        self.target_rotation = (ny * POINTER_REACH, nx * POINTER_REACH);
    }

    pub fn resize(&mut self, scroll: &ScrollState) {
        self.camera.aspect = scroll.aspect() as f32;
    }

    /// Advance one frame; `time` is the clock in seconds
    pub fn step(&mut self, time: f64) {
        let t = time as f32;
        let (target_x, target_y) = self.target_rotation;

        let globe = &mut self.nodes[GLOBE].rotation;
        globe.y += AUTO_ROTATE;
        globe.x += (target_x - globe.x) * POINTER_EASE;
        globe.y += (target_y - globe.y) * POINTER_EASE;

        let glow = &mut self.nodes[GLOW].rotation;
        glow.y -= 0.002;
        glow.x = (t * 0.5).sin() * 0.1;

        let lines = &mut self.nodes[LINES].rotation;
        lines.y += 0.001;
        lines.z = (t * 0.3).sin() * 0.1;

        self.nodes[RING_INNER].rotation.z += 0.004;
        self.nodes[RING_OUTER].rotation.y += 0.003;

        let points = &mut self.nodes[FIRST_POINT..];
        for (i, (node, motion)) in points.iter_mut().zip(self.motions.iter_mut()).enumerate() {
            motion.phase += motion.speed;
            let drift = Vec3::new(
                motion.phase.sin(),
                (motion.phase * 1.3).cos(),
                (motion.phase * 0.8).sin(),
            );
            node.position = motion.origin + drift * POINT_DRIFT;
            node.scale = 1.0 + (t * 2.0 + i as f32 * 0.1).sin() * 0.3;
        }
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn motions(&self) -> &[PointMotion] {
        &self.motions
    }

    pub fn segments(&self) -> &[(Vec3, Vec3)] {
        &self.segments
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn globe_rotation(&self) -> Vec3 {
        self.nodes[GLOBE].rotation
    }
}

/// A globe scene animating every display frame while mounted
pub struct GlobeView {
    scene: Rc<RefCell<GlobeScene>>,
    _subscriptions: DisposeBag,
}

impl GlobeView {
    pub fn mount<R: Rng + ?Sized>(host: &Host, rng: &mut R) -> Self {
        let scroll = host.scroll();
        let scene = Rc::new(RefCell::new(GlobeScene::new(rng, scroll.aspect() as f32)));
        let mut subscriptions = DisposeBag::new();

        let frame_scene = Rc::downgrade(&scene);
        subscriptions.add(host.scheduler.scoped_frame(move |now| {
            let Some(scene) = frame_scene.upgrade() else {
                return Tick::Done;
            };
            scene.borrow_mut().step(now * 0.001);
            Tick::Continue
        }));

        let pointer_scene = Rc::downgrade(&scene);
        let viewport = Rc::downgrade(&host.viewport);
        subscriptions.add(host.viewport.on_pointer(move |event| {
            let PointerEvent::Move { x, y } = *event else {
                return;
            };
            let (Some(scene), Some(viewport)) = (pointer_scene.upgrade(), viewport.upgrade())
            else {
                return;
            };
            let state = viewport.state();
            scene.borrow_mut().point_at(x, y, state.width, state.height);
        }));

        let resize_scene = Rc::downgrade(&scene);
        subscriptions.add(host.viewport.on_resize(move |state| {
            if let Some(scene) = resize_scene.upgrade() {
                scene.borrow_mut().resize(state);
            }
        }));

        tracing::debug!(nodes = scene.borrow().nodes().len(), "globe mounted");
        Self {
            scene,
            _subscriptions: subscriptions,
        }
    }

    pub fn globe_rotation(&self) -> Vec3 {
        self.scene.borrow().globe_rotation()
    }

    pub fn camera(&self) -> Camera {
        *self.scene.borrow().camera()
    }

    /// Run `f` against the current scene state
    pub fn with_scene<T>(&self, f: impl FnOnce(&GlobeScene) -> T) -> T {
        f(&self.scene.borrow())
    }
}

impl std::fmt::Debug for GlobeView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobeView")
            .field("rotation", &self.globe_rotation())
            .finish()
    }
}
