//! End-to-end behaviour of scenes driven through the engine and a local host.

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use ambient3d::config::{CircuitConfig, CubeConfig, ParticleConfig, PhoneConfig};
use ambient3d::state::Pointer;
use ambient3d::surface::DrawCommand;
use ambient3d::{
    CircuitGrid, CubeViewer, DrawSurface, Engine, HostEvent, LifecycleError, LocalHost, LoopState,
    ParticleField, PhoneScene, PixelCanvas, Recorder, Scene, SurfaceSize, ThreadedLoader,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn recorder_host(width: f64, height: f64) -> LocalHost<Recorder> {
    LocalHost::new(Recorder::new(SurfaceSize::new(width, height)))
}

fn run_frames<S: Scene, D: DrawSurface>(
    engine: &mut Engine<S>,
    host: &mut LocalHost<D>,
    frames: usize,
) {
    for _ in 0..frames {
        let frame = host.next_frame().expect("engine keeps one frame scheduled");
        assert!(engine.tick(host, frame));
    }
}

#[test]
fn particle_field_800_by_600() {
    let mut engine = Engine::new(
        ParticleField::new(ParticleConfig::default()),
        StdRng::seed_from_u64(42),
    );
    let mut host = recorder_host(800.0, 600.0);
    engine.start(&mut host).unwrap();

    let particles = engine.scene().particles();
    assert_eq!(particles.len(), 100);
    for particle in particles {
        let [x, y, _] = particle.body.position;
        assert!((0.0..=800.0).contains(&x) && (0.0..=600.0).contains(&y));
    }

    let mut still = Engine::new(
        ParticleField::new(ParticleConfig::default()),
        StdRng::seed_from_u64(42),
    );
    let mut still_host = recorder_host(800.0, 600.0);
    still.start(&mut still_host).unwrap();

    // Far enough from every particle that it exerts no force.
    host.dispatch(HostEvent::PointerMove { x: 5000.0, y: 5000.0 });
    run_frames(&mut engine, &mut host, 1);
    run_frames(&mut still, &mut still_host, 1);

    for (pushed, free) in engine.scene().particles().iter().zip(still.scene().particles()) {
        assert_eq!(pushed.body.velocity, free.body.velocity);
    }
}

#[test]
fn pointer_on_top_of_a_particle_is_harmless() {
    let mut engine = Engine::new(
        ParticleField::new(ParticleConfig::default()),
        StdRng::seed_from_u64(1),
    );
    let mut host = recorder_host(400.0, 400.0);
    engine.start(&mut host).unwrap();

    let particles = engine.scene_mut().particles_mut();
    particles.truncate(1);
    particles[0].body = ambient3d::physics::Body::at([100.0, 100.0, 0.0]);
    particles[0].phase = 0.0;

    host.dispatch(HostEvent::PointerMove { x: 100.0, y: 100.0 });
    run_frames(&mut engine, &mut host, 1);

    let body = &engine.scene().particles()[0].body;
    assert!(body.is_finite());
    assert_ne!(body.position, [100.0, 100.0, 0.0]);
}

#[test]
fn no_surface_means_no_loop() {
    let mut engine = Engine::new(
        CircuitGrid::new(CircuitConfig::default()),
        StdRng::seed_from_u64(0),
    );
    let mut host = LocalHost::<Recorder>::detached();
    assert_eq!(engine.start(&mut host), Err(LifecycleError::NoContext));
    assert_eq!(engine.scene().entity_count(), 0);
    assert_eq!(host.pending_frames(), 0);
    assert_eq!(host.listener_count(), 0);
}

#[test]
fn resize_rebuilds_the_grid_on_the_next_tick() {
    let mut engine = Engine::new(
        CircuitGrid::new(CircuitConfig::default()),
        StdRng::seed_from_u64(5),
    );
    let mut host = recorder_host(800.0, 600.0);
    engine.start(&mut host).unwrap();
    assert_eq!(engine.scene().entity_count(), 15 * 11);

    host.resize(SurfaceSize::new(300.0, 300.0));
    assert_eq!(engine.scene().entity_count(), 15 * 11);
    run_frames(&mut engine, &mut host, 1);
    assert_eq!(engine.scene().entity_count(), 6 * 6);
    for dot in engine.scene().dots() {
        let [x, y, _] = dot.body.anchor;
        assert!((0.0..=300.0).contains(&x) && (0.0..=300.0).contains(&y));
    }
}

#[test]
fn stopping_mid_flight_leaves_the_surface_untouched() {
    let mut engine = Engine::new(CubeViewer::new(CubeConfig::default()), StdRng::seed_from_u64(0));
    let mut host = recorder_host(400.0, 400.0);
    engine.start(&mut host).unwrap();
    run_frames(&mut engine, &mut host, 3);

    let late = host.next_frame().unwrap();
    host.surface_mut().unwrap().take();
    engine.stop(&mut host);

    assert!(!engine.tick(&mut host, late));
    assert!(host.surface_ref().unwrap().commands().is_empty());
    assert_eq!(engine.state(), LoopState::Stopped);
    assert_eq!(host.listener_count(), 0);
}

#[test]
fn idle_cube_turns_at_a_fixed_rate() {
    let mut engine = Engine::new(CubeViewer::new(CubeConfig::default()), StdRng::seed_from_u64(0));
    let mut host = recorder_host(400.0, 400.0);
    engine.start(&mut host).unwrap();
    run_frames(&mut engine, &mut host, 100);

    let rotation = engine.scene().rotation();
    assert!((rotation.x - 0.5).abs() < 1e-9);
    assert!((rotation.y - 1.0).abs() < 1e-9);

    // Hovering at the centre eases the cube back to face the viewer.
    host.dispatch(HostEvent::PointerMove { x: 200.0, y: 200.0 });
    run_frames(&mut engine, &mut host, 50);
    assert!(engine.scene().rotation().y.abs() < 0.01);
    assert_eq!(engine.input().snapshot().pointer, Pointer::at(200.0, 200.0));
}

#[test]
fn cube_rasterises_amber_pixels() {
    let mut engine = Engine::new(CubeViewer::new(CubeConfig::default()), StdRng::seed_from_u64(0));
    let mut host = LocalHost::new(PixelCanvas::new(SurfaceSize::new(200.0, 200.0)));
    engine.start(&mut host).unwrap();
    run_frames(&mut engine, &mut host, 1);

    let canvas = host.surface_ref().unwrap();
    let lit = canvas
        .pixel_data()
        .chunks_exact(4)
        .filter(|px| px[3] > 0)
        .count();
    assert!(lit > 0);
    assert_eq!(canvas.pixel(0, 0), [0, 0, 0, 0]);
}

fn scratch_file(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("ambient3d-{}-{name}", std::process::id()))
}

#[test]
fn decoded_icons_are_blitted_and_missing_ones_stay_placeholders() {
    let good = scratch_file("icon.png");
    image::RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 0, 255]))
        .save(&good)
        .unwrap();
    let missing = scratch_file("missing.png");

    let config = PhoneConfig::default().with_sources([good.clone(), missing]);
    let mut engine = Engine::new(
        PhoneScene::new(config, Box::new(ThreadedLoader::new())),
        StdRng::seed_from_u64(8),
    );
    let mut host = recorder_host(800.0, 600.0);
    engine.start(&mut host).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while !engine.scene().icons().iter().any(|icon| icon.slot == 0 && icon.is_ready()) {
        assert!(Instant::now() < deadline, "sprite never arrived");
        run_frames(&mut engine, &mut host, 1);
        thread::sleep(Duration::from_millis(5));
    }
    host.surface_mut().unwrap().take();
    run_frames(&mut engine, &mut host, 1);

    let ready: Vec<usize> = engine
        .scene()
        .icons()
        .iter()
        .filter(|icon| icon.is_ready())
        .map(|icon| icon.slot)
        .collect();
    assert_eq!(ready, vec![0]);
    let sprites = host
        .surface_ref()
        .unwrap()
        .commands()
        .iter()
        .filter(|c| matches!(c, DrawCommand::Sprite { .. }))
        .count();
    assert_eq!(sprites, 1);

    let _ = std::fs::remove_file(good);
}
