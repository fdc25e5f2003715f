//! End-to-end rendering tests.

use std::io::Cursor;

use prism_core::Mesh;
use prism_renderer::scheduler::trace_pixel;
use prism_renderer::{
    render, Bvh, BvhOptions, Camera, Color, Light, Material, Object, Plane, RenderConfig, Scene,
    Sphere, TraceStats, Transform, Vec3,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn lit_sphere_scene() -> Scene {
    let mut scene = Scene::new().with_ambient(Color::splat(0.1));
    let material = Material::new(Color::splat(0.1), Color::new(0.8, 0.3, 0.3), Color::splat(0.2), 20.0);
    scene.add_object(Object::new(Sphere::new(Vec3::new(0.0, 0.0, 5.0), 1.5), material));
    scene.add_light(Light::new(Vec3::new(-10.0, 0.0, 5.0), Color::splat(50.0)));
    scene
}

#[test]
fn sphere_is_brighter_on_the_side_facing_the_light() {
    init_logging();
    let scene = lit_sphere_scene();
    let camera = Camera::new(64, 64, 60.0);
    let config = RenderConfig::default();
    let mut stats = TraceStats::default();

    // Left and right of center on the middle row, both on the sphere
    let left = trace_pixel(&scene, &camera, &config, 20, 32, &mut stats).unwrap();
    let right = trace_pixel(&scene, &camera, &config, 43, 32, &mut stats).unwrap();

    assert!(left.x > right.x + 0.05, "left {} right {}", left, right);
    // The far side only gets ambient light
    assert!((right - Color::splat(0.1 * 0.1)).length() < 1e-5);
}

#[test]
fn rendering_is_deterministic_across_runs_and_thread_counts() {
    init_logging();
    let mut scene = lit_sphere_scene();
    let glass = Material::default().refractive(1.5);
    scene.add_object(Object::new(Sphere::new(Vec3::new(1.0, 0.5, 3.0), 0.4), glass));
    scene.add_object(Object::new(
        Plane::new(Vec3::new(0.0, -1.5, 0.0), Vec3::Y),
        Material::default().reflective(0.3),
    ));
    let camera = Camera::new(40, 30, 75.0);

    let one = RenderConfig {
        threads: Some(1),
        ..Default::default()
    };
    let four = RenderConfig {
        threads: Some(4),
        ..Default::default()
    };

    let first = render(&scene, &camera, &four).unwrap();
    let second = render(&scene, &camera, &four).unwrap();
    let serial = render(&scene, &camera, &one).unwrap();

    assert_eq!(first.image.pixels, second.image.pixels);
    assert_eq!(first.image.pixels, serial.image.pixels);
    assert_eq!(first.stats.trace, serial.stats.trace);
    assert_eq!(first.stats.bands, 4);
    assert_eq!(serial.stats.bands, 1);
}

#[test]
fn non_finite_pixels_are_black_and_counted() {
    init_logging();
    let mut scene = Scene::new();
    let broken = Material::default().reflective(f32::NAN);
    let sphere = Sphere::new(Vec3::new(0.0, 0.0, 5.0), 1.0);
    scene.add_object(Object::new(sphere, broken));
    scene.add_object(Object::new(
        Plane::new(Vec3::new(0.0, 0.0, 20.0), -Vec3::Z),
        Material::default(),
    ));
    scene.add_light(Light::new(Vec3::ZERO, Color::splat(100.0)));

    let camera = Camera::new(16, 16, 60.0);
    let config = RenderConfig {
        threads: Some(3),
        ..Default::default()
    };
    let output = render(&scene, &camera, &config).unwrap();

    let mut expected_faults = 0;
    for y in 0..16 {
        for x in 0..16 {
            let on_sphere = sphere.intersect(&camera.ray_for_pixel(x, y)).is_some();
            let pixel = output.image.get(x, y);
            if on_sphere {
                expected_faults += 1;
                assert_eq!(pixel, Color::ZERO, "pixel ({}, {}) should be black", x, y);
            } else {
                assert!(pixel.x > 0.5, "pixel ({}, {}) should still render", x, y);
            }
        }
    }

    assert!(expected_faults > 0);
    assert_eq!(output.stats.faults, expected_faults);
    assert_eq!(output.stats.pixels, 256);
}

#[test]
fn transformed_mesh_is_visible_through_its_bvh() {
    init_logging();
    let obj = "\
o tetra
v 0 0 0
v 1 0 0
v 0 1 0
v 0 0 1
f 1 3 2
f 1 2 4
f 1 4 3
f 2 3 4
";
    let mesh = Mesh::read_obj(&mut Cursor::new(obj), "tetra").unwrap();
    let bvh = Bvh::from_mesh(
        &mesh,
        Material::default(),
        Some(Transform::from_scale_translation(Vec3::splat(2.0), Vec3::new(-0.5, -0.5, 4.0))),
        BvhOptions { max_leaf_size: 1 },
    )
    .unwrap();
    assert_eq!(bvh.count(), 4);

    let mut scene = Scene::new().with_ambient(Color::ONE);
    scene.add_mesh(bvh);

    let camera = Camera::new(9, 9, 30.0);
    let config = RenderConfig::default();
    let mut stats = TraceStats::default();

    // The face at z = 4 fills the view center; ambient only, no lights
    let center = trace_pixel(&scene, &camera, &config, 4, 4, &mut stats).unwrap();
    assert!((center - Material::default().ambient).length() < 1e-6);

    let corner = trace_pixel(&scene, &camera, &config, 0, 0, &mut stats).unwrap();
    assert_eq!(corner, config.background);
}
