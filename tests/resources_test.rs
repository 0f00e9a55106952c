use std::{collections::HashMap, path::PathBuf};

use campus_ngin::{
    SceneError,
    config::{ASSET_DIR_VAR, Config, WINDOW_SIZE_VAR},
    data_structures::scene_graph::NodeKind,
    resources::{
        self,
        label::{LABEL_BACKGROUND, LABEL_SIZE, label_texture, render_label},
        texture::{decode_image, sibling_path},
    },
};

const QUAD_OBJ: &str = "o quad
v -1.0 0.0 -1.0
v 1.0 0.0 -1.0
v 1.0 0.0 1.0
v -1.0 0.0 1.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
f 1/1 2/2 3/3 4/4
";

/// A fresh directory under the system temp dir holding `files`.
fn asset_dir(name: &str, files: &[(&str, &[u8])]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("campus-ngin-{name}-{}", std::process::id()));
    for (file, bytes) in files {
        let path = dir.join(file);
        std::fs::create_dir_all(path.parent().expect("file has a parent")).expect("create asset dir");
        std::fs::write(path, bytes).expect("write asset");
    }
    dir
}

fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn should_render_label_with_ink_on_background() {
    let label = render_label("301");

    assert_eq!(label.dimensions(), (LABEL_SIZE, LABEL_SIZE));
    assert_eq!(*label.get_pixel(0, 0), LABEL_BACKGROUND);
    assert_eq!(*label.get_pixel(LABEL_SIZE - 1, LABEL_SIZE - 1), LABEL_BACKGROUND);
    let ink = label.pixels().filter(|p| p[0] < 0x20).count();
    assert!(ink > 100, "digits are drawn, found {ink} dark pixels");
    assert!(label.pixels().all(|p| p[3] == 0xff));
}

#[test]
fn should_leave_unknown_characters_blank() {
    let label = render_label("€");

    assert!(label.pixels().all(|p| *p == LABEL_BACKGROUND));
}

#[test]
fn should_generate_ready_label_maps() {
    let first = label_texture("801");
    let second = label_texture("801");

    assert!(first.is_ready());
    assert_eq!(first.source(), "label:801");
    assert_ne!(first.id(), second.id());
}

#[test]
fn should_use_defaults_without_environment() {
    let config = Config::default().apply_env(env(&[]));

    assert_eq!(config, Config::default());
    assert_eq!((config.width, config.height), (800, 600));
}

#[test]
fn should_read_overrides_from_environment() {
    let config = Config::default().apply_env(env(&[
        (ASSET_DIR_VAR, "/srv/classroom"),
        (WINDOW_SIZE_VAR, "1024x768"),
    ]));

    assert_eq!(config.asset_root, PathBuf::from("/srv/classroom"));
    assert_eq!((config.width, config.height), (1024, 768));
}

#[test]
fn should_ignore_malformed_window_size() {
    for size in ["wide", "1024", "0x768", "1024x-1"] {
        let config = Config::default().apply_env(env(&[(WINDOW_SIZE_VAR, size)]));

        assert_eq!((config.width, config.height), (800, 600), "{size}");
    }
}

#[test]
fn should_resolve_sibling_paths() {
    assert_eq!(
        sibling_path("/objects/school_desk/school_desk.gltf", "scene.bin"),
        "/objects/school_desk/scene.bin"
    );
    assert_eq!(sibling_path("desk.obj", "desk.mtl"), "desk.mtl");
}

#[test]
fn should_decode_png_bytes() {
    let source = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
    let mut bytes = std::io::Cursor::new(Vec::new());
    source
        .write_to(&mut bytes, image::ImageFormat::Png)
        .expect("encode png");

    let decoded = decode_image(bytes.get_ref(), "/textures/wall.png").expect("decode png");

    assert_eq!(decoded, source);
}

#[test]
fn should_load_obj_as_group_of_meshes() {
    let root = asset_dir("obj", &[("objects/quad.obj", QUAD_OBJ.as_bytes())]);

    let node = futures::executor::block_on(resources::load_model(&root, "/objects/quad.obj"))
        .expect("obj loads");

    assert_eq!(node.children().len(), 1);
    let NodeKind::Mesh { geometry, .. } = &node.children()[0].kind else {
        panic!("expected a mesh child");
    };
    let data = geometry.mesh_data();
    assert_eq!(data.vertex_count(), 4);
    assert_eq!(data.indices.len(), 6);
}

#[test]
fn should_report_missing_model_file() {
    let root = asset_dir("missing", &[]);

    let result = futures::executor::block_on(resources::load_model(&root, "/objects/none.obj"));

    assert!(result.is_err());
}

#[test]
fn should_reject_unknown_model_format() {
    let root = asset_dir("fbx", &[]);

    let err = futures::executor::block_on(resources::load_model(&root, "/objects/desk.fbx"))
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SceneError>(),
        Some(SceneError::UnsupportedAsset(_))
    ));
}
