//! End-to-end session scenarios through the public API.

use glam::{Quat, Vec3};
use lightrig_core::assignment::{organized_light_name, AssignmentMode};
use lightrig_core::*;

const EPS: f32 = 1e-4;

fn approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPS
}

/// Cube spanning ±1 seen from +X, so the viewport center hits (1,0,0) with
/// normal +X.
struct World {
    scene: PrimitiveScene,
    camera: CameraPose,
    viewport: Viewport,
    lights: LightScene,
    assignments: AssignmentMap,
    config: RigConfig,
}

impl World {
    fn new() -> Self {
        let mut config = RigConfig::default();
        config.positioning.default_distance = 2.0;
        Self {
            scene: PrimitiveScene::new().with("cube", scene::Primitive::Aabb { min: Vec3::splat(-1.0), max: Vec3::ONE }),
            camera: CameraPose::looking_at(Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO),
            viewport: Viewport::new(800.0, 600.0),
            lights: LightScene::new(),
            assignments: AssignmentMap::new(),
            config,
        }
    }

    fn ctx(&mut self) -> SessionContext<'_> {
        SessionContext::new(
            &self.scene,
            &self.camera,
            &self.viewport,
            &mut self.lights,
            &mut self.assignments,
            &self.config,
        )
    }
}

fn start_pose() -> LightTransform {
    LightTransform::new(Vec3::new(-4.0, 5.0, 1.0), Quat::from_rotation_x(0.3))
}

#[test]
fn test_normal_session_commit() {
    let mut world = World::new();
    let id = world.lights.insert(LightEntity::new("key", LightKind::Spot).with_transform(start_pose()));
    let center = world.viewport.center();

    let mut ctx = world.ctx();
    let mut session = ModalSession::begin(id, PositioningMode::Normal, &ctx).unwrap();
    session.handle_event(InputEvent::pointer(center.x, center.y, 0.0), &mut ctx).unwrap();

    let snapshot = session.last_snapshot().unwrap();
    assert!(approx(snapshot.hit_point.unwrap(), Vec3::X));
    assert!(approx(snapshot.normal.unwrap(), Vec3::X));

    assert_eq!(session.handle_event(InputEvent::Confirm, &mut ctx).unwrap(), SessionState::Confirmed);
    drop(ctx);

    let light = world.lights.get(id).unwrap();
    assert!(approx(light.transform.position, Vec3::new(3.0, 0.0, 0.0)));
    assert!(approx(light.transform.forward(), Vec3::NEG_X));
    assert_eq!(light.pivot, Some(Vec3::X));
}

#[test]
fn test_normal_session_cancel_keeps_pose() {
    let mut world = World::new();
    let id = world.lights.insert(LightEntity::new("key", LightKind::Spot).with_transform(start_pose()));
    let center = world.viewport.center();

    let mut ctx = world.ctx();
    let mut session = ModalSession::begin(id, PositioningMode::Normal, &ctx).unwrap();
    session.handle_event(InputEvent::pointer(center.x, center.y, 0.0), &mut ctx).unwrap();
    assert!(approx(session.working().transform.position, Vec3::new(3.0, 0.0, 0.0)));
    session.handle_event(InputEvent::Cancel, &mut ctx).unwrap();
    drop(ctx);

    let light = world.lights.get(id).unwrap();
    assert_eq!(light.transform, start_pose());
    assert_eq!(light.pivot, None);
}

#[test]
fn test_scripted_session_replay() {
    let mut world = World::new();
    let id = world.lights.insert(LightEntity::new("rim", LightKind::Area).with_transform(start_pose()));

    let script = r#"[
        {"event": "pointer_move", "position": [400.0, 300.0], "time": 0.0},
        {"event": "wheel", "ticks": 1},
        {"event": "set_control", "parameter": "temperature"},
        {"event": "wheel", "ticks": -10},
        {"event": "confirm"}
    ]"#;
    let events: Vec<InputEvent> = serde_json::from_str(script).unwrap();

    let mut ctx = world.ctx();
    let mut session = ModalSession::begin(id, PositioningMode::Normal, &ctx).unwrap();
    let mut state = session.state();
    for event in events {
        state = session.handle_event(event, &mut ctx).unwrap();
    }
    assert_eq!(state, SessionState::Confirmed);
    drop(ctx);

    let light = world.lights.get(id).unwrap();
    // Distance 2.0 grew by one 10% step along the normal.
    assert!(approx(light.transform.position, Vec3::new(3.2, 0.0, 0.0)));
    assert!((light.params.temperature - 5500.0).abs() < 1e-2);
}

#[test]
fn test_orbit_then_flip_then_commit() {
    let mut world = World::new();
    let id = world.lights.insert(
        LightEntity::new("fill", LightKind::Point)
            .with_transform(LightTransform::looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO))
            .with_pivot(Vec3::ZERO),
    );

    let mut ctx = world.ctx();
    let mut session = ModalSession::begin(id, PositioningMode::Orbit, &ctx).unwrap();
    session.handle_event(InputEvent::pointer(100.0, 100.0, 0.0), &mut ctx).unwrap();
    session.handle_event(InputEvent::pointer(150.0, 100.0, 0.1), &mut ctx).unwrap();
    let orbited = session.working().transform.position;
    assert!((orbited.length() - 5.0).abs() < 1e-3);
    assert!(approx(session.working().transform.forward(), -orbited.normalize()));

    let flip = PositioningMode::Flip { plane: FlipPlane::AcrossPivot };
    session.handle_event(InputEvent::SetMode { mode: flip }, &mut ctx).unwrap();
    assert!(approx(session.working().transform.position, -orbited));
    session.handle_event(InputEvent::Confirm, &mut ctx).unwrap();
    drop(ctx);

    assert!(approx(world.lights.get(id).unwrap().transform.position, -orbited));
}

#[test]
fn test_registry_commit_with_assignment() {
    let mut world = World::new();
    let id = world.lights.insert(LightEntity::new("key", LightKind::Spot).with_transform(start_pose()));
    let camera = CameraId::from("Camera.002");
    let center = world.viewport.center();

    let mut registry = SessionRegistry::new();
    {
        let mut ctx = world.ctx();
        let session = ModalSession::begin(id, PositioningMode::Normal, &ctx)
            .unwrap()
            .with_assignment(camera.clone());
        registry.insert(session, &mut ctx).unwrap();
        registry
            .handle_event(id, InputEvent::pointer(center.x, center.y, 0.0), &mut ctx)
            .unwrap();
        registry.handle_event(id, InputEvent::Confirm, &mut ctx).unwrap();
    }
    assert!(registry.is_empty());
    assert!(world.assignments.lights_for(&camera).contains(&id));

    let light = world.lights.get(id).unwrap();
    assert_eq!(light.assigned_camera, Some(camera.clone()));
    assert_eq!(organized_light_name(&light.name, AssignmentMode::Camera, Some(&camera)), "C_02_key");
}

#[test]
fn test_session_free_functions_for_templates() {
    // Positioning is usable without a session (template application).
    let world = World::new();
    let light = LightEntity::new("bounce", LightKind::Area);
    let ray = scene::Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::NEG_X);
    let snapshot = world.scene.cast(&ray, 100.0);
    let ctx = positioning::ModeContext::new(&snapshot, &light, &world.camera, 4.0);
    let result = positioning::compute(&PositioningMode::Normal, &ctx, &world.config.positioning);
    assert!(result.valid);
    assert!(approx(result.transform.position, Vec3::new(5.0, 0.0, 0.0)));
}
