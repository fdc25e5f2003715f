//! The demo scene: a closed room with spheres, cones and an optional mesh.

use std::f32::consts::PI;
use std::path::Path;

use prism_core::{Color, Light, Material, Mesh, Texture};
use prism_math::{Mat4, Transform, Vec3};
use prism_renderer::{Bvh, Cone, Object, Plane, Scene, Sphere};

use crate::settings::Settings;

pub fn build_scene(settings: &Settings) -> Scene {
    let mut scene = Scene::new().with_ambient(Color::splat(0.001));

    for position in [
        Vec3::new(0.0, 26.0, 5.0),
        Vec3::new(0.0, 1.0, 12.0),
        Vec3::new(0.0, 5.0, 1.0),
    ] {
        scene.add_light(Light::new(position, Color::splat(0.4)));
    }

    add_room(&mut scene);
    add_props(&mut scene);

    if let Some(path) = &settings.mesh {
        add_mesh(&mut scene, path, settings);
    }

    log::info!(
        "Scene: {} objects, {} meshes ({} triangles), {} lights",
        scene.objects.len(),
        scene.meshes.len(),
        scene.triangle_count(),
        scene.lights.len()
    );
    scene
}

fn add_room(scene: &mut Scene) {
    let floor = Material::new(Color::splat(0.1), Color::splat(0.8), Color::ZERO, 1.0).with_texture(
        Texture::Checkerboard {
            scale: 0.25,
            even: Color::splat(0.9),
            odd: Color::splat(0.2),
        },
    );
    let red = Material::new(Color::new(0.07, 0.01, 0.01), Color::new(0.8, 0.1, 0.1), Color::ZERO, 1.0);
    let green = Material::new(Color::new(0.01, 0.07, 0.01), Color::new(0.1, 0.8, 0.1), Color::ZERO, 1.0);
    let blue = Material::new(Color::new(0.02, 0.02, 0.07), Color::new(0.2, 0.2, 0.9), Color::ZERO, 1.0);
    let white = Material::new(Color::splat(0.05), Color::splat(0.7), Color::ZERO, 1.0);

    let walls = [
        (Vec3::new(0.0, -3.0, 0.0), Vec3::Y, floor),
        (Vec3::new(0.0, 27.0, 0.0), -Vec3::Y, white.clone()),
        (Vec3::new(0.0, 0.0, 30.0), -Vec3::Z, blue),
        (Vec3::new(0.0, 0.0, -0.01), Vec3::Z, white),
        (Vec3::new(-15.0, 0.0, 0.0), Vec3::X, red),
        (Vec3::new(15.0, 0.0, 0.0), -Vec3::X, green),
    ];
    for (point, normal, material) in walls {
        scene.add_object(Object::new(Plane::new(point, normal), material));
    }
}

fn add_props(scene: &mut Scene) {
    let mirror = Material::new(Color::splat(0.01), Color::splat(0.2), Color::splat(0.6), 100.0).reflective(1.0);
    let red_specular = Material::new(
        Color::new(0.01, 0.03, 0.03),
        Color::new(1.0, 0.2, 0.2),
        Color::splat(0.5),
        10.0,
    );
    let glass = Material::new(Color::ZERO, Color::ZERO, Color::splat(0.5), 100.0).refractive(2.0);
    let rainbow = Material::new(Color::splat(0.05), Color::ONE, Color::splat(0.2), 20.0)
        .with_texture(Texture::Rainbow { scale: 3.0 });
    let yellow = Material::new(Color::new(0.1, 0.1, 0.0), Color::new(0.4, 0.4, 0.0), Color::ONE, 100.0);
    let green = Material::new(Color::new(0.07, 0.09, 0.07), Color::new(0.5, 0.9, 0.5), Color::ZERO, 1.0);

    scene.add_object(Object::new(Sphere::new(Vec3::new(1.0, -2.0, 8.0), 1.0), mirror));
    scene.add_object(Object::new(Sphere::new(Vec3::new(-1.0, -2.5, 6.0), 0.5), red_specular));
    scene.add_object(Object::new(Sphere::new(Vec3::new(-3.0, -1.0, 8.0), 2.0), glass));
    scene.add_object(Object::new(Sphere::new(Vec3::new(-6.0, 4.0, 19.0), 2.5), rainbow));

    // Tall cone hanging apex-up from the floor
    let tall = Mat4::from_translation(Vec3::new(5.0, 9.0, 14.0))
        * Mat4::from_rotation_x(PI)
        * Mat4::from_scale(Vec3::new(3.0, 12.0, 3.0));
    scene.add_object(Object::new(Cone::new(), yellow).with_transform(Transform::new(tall)));

    // Short cone lying on its side
    let lying = Mat4::from_translation(Vec3::new(6.0, -3.0, 7.0))
        * Mat4::from_rotation_z(3.0_f32.atan())
        * Mat4::from_scale(Vec3::new(1.0, 3.0, 1.0));
    scene.add_object(Object::new(Cone::new(), green).with_transform(Transform::new(lying)));
}

/// Load an OBJ and add it through a BVH. An unreadable or empty mesh is
/// skipped with a warning.
fn add_mesh(scene: &mut Scene, path: &Path, settings: &Settings) {
    let mesh = Mesh::load_or_empty(path);
    let material = Material::new(Color::new(0.09, 0.06, 0.06), Color::new(0.9, 0.6, 0.6), Color::ZERO, 1.0);
    let transform = Transform::from_scale_translation(settings.mesh_scale, settings.mesh_offset);

    match Bvh::from_mesh(&mesh, material, Some(transform), settings.bvh) {
        Ok(bvh) => scene.add_mesh(bvh),
        Err(err) => log::warn!("Skipping mesh {}: {}", path.display(), err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_scene_without_mesh() {
        let settings = Settings {
            mesh: None,
            ..Default::default()
        };
        let scene = build_scene(&settings);

        assert_eq!(scene.lights.len(), 3);
        assert_eq!(scene.objects.len(), 12);
        assert!(scene.meshes.is_empty());
    }

    #[test]
    fn test_missing_mesh_is_skipped() {
        let _ = env_logger::builder().is_test(true).try_init();

        let settings = Settings {
            mesh: Some(PathBuf::from("/nonexistent/prism/bunny.obj")),
            ..Default::default()
        };
        let scene = build_scene(&settings);
        assert!(scene.meshes.is_empty());
    }

    #[test]
    fn test_mesh_from_disk_is_added() {
        let dir = std::env::temp_dir().join(format!("prism_scene_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tri.obj");
        std::fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let settings = Settings {
            mesh: Some(path),
            ..Default::default()
        };
        let scene = build_scene(&settings);
        assert_eq!(scene.meshes.len(), 1);
        assert_eq!(scene.triangle_count(), 1);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_camera_sees_the_room() {
        let settings = Settings {
            mesh: None,
            ..Default::default()
        };
        let scene = build_scene(&settings);
        let camera = prism_renderer::Camera::new(16, 12, settings.fov);

        // Every primary ray ends on a wall or a prop
        for (x, y) in [(0, 0), (15, 0), (0, 11), (15, 11), (8, 6)] {
            assert!(scene.nearest_hit(&camera.ray_for_pixel(x, y)).is_some());
        }
    }
}
