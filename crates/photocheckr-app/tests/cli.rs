use photocheckr_app::{App, AppConfig, AppError, Command, parse_args};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn solid_png(path: &Path, width: u32, height: u32, rgb: [u8; 3]) {
    let mut data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut data, width, height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        let pixels: Vec<u8> = (0..width * height).flat_map(|_| rgb).collect();
        writer.write_image_data(&pixels).unwrap();
    }
    std::fs::write(path, data).unwrap();
}

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        solid_png(&dir.path().join("before.png"), 16, 10, [200, 30, 30]);
        solid_png(&dir.path().join("after.png"), 16, 10, [30, 200, 30]);
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn run(&self, line: &str) -> Result<String, AppError> {
        let mut raw: Vec<OsString> = vec![
            "--store".into(),
            self.path("store").into(),
            "--out".into(),
            self.path("out").into(),
            "--quality".into(),
            "1".into(),
        ];
        raw.extend(line.split_whitespace().map(|s| {
            OsString::from(s.replace("$DIR", &self.dir.path().to_string_lossy()))
        }));
        let (config, command) = parse_args(raw)?;
        App::new(config)?.run(command)
    }
}

#[test]
fn test_add_fills_first_tab_then_creates_more() {
    let fx = Fixture::new();
    fx.run("add $DIR/before.png $DIR/after.png --name Hallway").unwrap();
    fx.run("add $DIR/before.png $DIR/after.png --mode side-by-side").unwrap();

    let tabs = fx.run("tabs").unwrap();
    let lines: Vec<_> = tabs.lines().collect();
    assert_eq!(lines.len(), 2, "{}", tabs);
    assert!(lines[0].contains("Hallway"));
    assert!(lines[0].contains("before+after"));
    assert!(lines[1].starts_with('*'));
    assert!(lines[1].contains("Comparison 2"));
    assert!(lines[1].contains("Side by side"));
}

#[test]
fn test_session_survives_between_runs() {
    let fx = Fixture::new();
    fx.run("--title Kitchen add $DIR/before.png $DIR/after.png --notes Tiles")
        .unwrap();

    let config = AppConfig {
        storage_dir: Some(fx.path("store")),
        ..Default::default()
    };
    let ws = App::new(config).unwrap().load().unwrap();
    assert_eq!(ws.title, "Kitchen");
    assert_eq!(ws.description(), "Tiles");
    assert!(ws.has_images());
    assert!(fx.path("store").join("photocheckr_project.json").exists());
}

#[test]
fn test_rename_select_remove() {
    let fx = Fixture::new();
    fx.run("add $DIR/before.png $DIR/after.png").unwrap();
    fx.run("add $DIR/before.png $DIR/after.png").unwrap();

    let config = AppConfig {
        storage_dir: Some(fx.path("store")),
        ..Default::default()
    };
    let ws = App::new(config).unwrap().load().unwrap();
    let ids: Vec<String> = ws.tabs().iter().map(|t| t.id.clone()).collect();

    fx.run(&format!("rename {} Porch", ids[0])).unwrap();
    fx.run(&format!("select {}", ids[0])).unwrap();
    let tabs = fx.run("tabs").unwrap();
    assert!(tabs.lines().next().unwrap().starts_with("* "));
    assert!(tabs.contains("Porch"));

    fx.run(&format!("remove {}", ids[0])).unwrap();
    let tabs = fx.run("tabs").unwrap();
    assert_eq!(tabs.lines().count(), 1);
    assert!(tabs.starts_with('*'));
    assert!(matches!(
        fx.run(&format!("remove {}", ids[1])),
        Err(AppError::Tab(_))
    ));
}

#[test]
fn test_export_pdf_and_png() {
    let fx = Fixture::new();
    fx.run("--title Bath add $DIR/before.png $DIR/after.png").unwrap();

    let out = fx.run("export").unwrap();
    assert!(out.contains("1 page(s)"));
    let pdf = std::fs::read(fx.path("out").join("Bath.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF"));

    fx.run("export --png").unwrap();
    let png = std::fs::read(fx.path("out").join("Bath-1.png")).unwrap();
    let decoder = png::Decoder::new(std::io::Cursor::new(png));
    let reader = decoder.read_info().unwrap();
    // 16×10 photo area plus the 40 px footer.
    assert_eq!((reader.info().width, reader.info().height), (16, 50));
}

#[test]
fn test_export_without_photos() {
    let fx = Fixture::new();
    assert!(matches!(fx.run("export"), Err(AppError::Export(_))));
}

#[test]
fn test_inline_gltf() {
    let fx = Fixture::new();
    std::fs::write(
        fx.path("scene.gltf"),
        r#"{"asset":{"version":"2.0"},"buffers":[{"uri":"scene.bin","byteLength":4}],"images":[{"uri":"before.png"}]}"#,
    )
    .unwrap();
    std::fs::write(fx.path("scene.bin"), [1u8, 2, 3, 4]).unwrap();

    let out = fx
        .run("inline-gltf $DIR/scene.gltf $DIR/scene.bin $DIR/before.png")
        .unwrap();
    assert!(out.contains("scene.inlined.gltf"));

    let text = std::fs::read_to_string(fx.path("scene.inlined.gltf")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        doc["buffers"][0]["uri"],
        "data:application/octet-stream;base64,AQIDBA=="
    );
    assert!(
        doc["images"][0]["uri"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,")
    );
    assert_eq!(doc["asset"]["version"], "2.0");
}

#[test]
fn test_inline_gltf_missing_buffer() {
    let fx = Fixture::new();
    std::fs::write(
        fx.path("scene.gltf"),
        r#"{"buffers":[{"uri":"scene.bin"}]}"#,
    )
    .unwrap();
    assert!(matches!(
        fx.run("inline-gltf $DIR/scene.gltf"),
        Err(AppError::Gltf(_))
    ));
}

#[test]
fn test_models_links_cameras() {
    let fx = Fixture::new();
    std::fs::write(fx.path("a.glb"), b"glTF").unwrap();
    std::fs::write(fx.path("b.obj"), b"v 0 0 0").unwrap();

    let out = fx.run("models $DIR/a.glb --right $DIR/b.obj").unwrap();
    assert!(out.contains("Left: [ModelViewer] Source: a.glb"));
    assert!(out.contains("Right: [Generic] Source: b.obj"));
    assert!(out.contains("Cameras linked"));

    let out = fx.run("models $DIR/a.glb").unwrap();
    assert!(out.contains("Right: [empty]"));
    assert!(!out.contains("Cameras linked"));
}

#[test]
fn test_parse_help_command() {
    let (_, command) = parse_args(vec![OsString::from("help")]).unwrap();
    assert_eq!(command, Command::Help);
}

#[test]
fn test_export_title_cannot_escape_out_dir() {
    let fx = Fixture::new();
    fx.run("--title ../escaped add $DIR/before.png $DIR/after.png")
        .unwrap();

    fx.run("export").unwrap();
    assert!(fx.path("out").join("___escaped.pdf").exists());
    assert!(!fx.path("escaped.pdf").exists());
}
