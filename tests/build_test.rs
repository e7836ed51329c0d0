//! End-to-end build tests against a temporary project directory.

use std::fs;
use std::path::Path;

use reve::codec;
use reve::{BuildError, RegistryError, Reve, Settings};
use tempfile::TempDir;

fn payload(module_path: &Path) -> String {
    let module = fs::read_to_string(module_path).unwrap();
    module
        .strip_prefix("export default \"")
        .and_then(|s| s.strip_suffix('"'))
        .expect("module exports a single string literal")
        .to_string()
}

fn write_source(dir: &Path, rel: &str, bytes: &[u8]) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, bytes).unwrap();
}

#[tokio::test]
async fn test_single_resource_build() {
    let temp_dir = TempDir::new().unwrap();
    let png = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 13];
    write_source(temp_dir.path(), "logo.png", &png);

    let mut reve = Reve::new(temp_dir.path(), false);
    reve.add_resource("logo", "./logo.png").unwrap();
    let report = reve.build().await.unwrap();
    assert!(report.is_clean());

    let module = temp_dir.path().join("reve/source/logo.ts");
    assert_eq!(codec::decode(&payload(&module)).unwrap(), png);

    let index = fs::read_to_string(temp_dir.path().join("reve/index.ts")).unwrap();
    assert!(index.starts_with("import { decodeBase64 } from"));
    assert!(!index.contains("gunzip"));
    assert!(index.contains(
        "\"logo\": decodeBase64((await import(\"./source/logo.ts\")).default),"
    ));
}

#[tokio::test]
async fn test_space_in_name_uses_sanitized_path() {
    let temp_dir = TempDir::new().unwrap();
    write_source(temp_dir.path(), "a.bin", b"abc");

    let mut reve = Reve::new(temp_dir.path(), false);
    reve.add_resource("a b", "./a.bin").unwrap();
    reve.build().await.unwrap();

    assert!(temp_dir.path().join("reve/source/a_b.ts").is_file());

    let index = fs::read_to_string(temp_dir.path().join("reve/index.ts")).unwrap();
    assert!(index.contains("\"a b\": decodeBase64((await import(\"./source/a_b.ts\")).default)"));
}

#[tokio::test]
async fn test_compressed_build_is_reproducible() {
    let temp_dir = TempDir::new().unwrap();
    let content: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    write_source(temp_dir.path(), "assets/blob.bin", &content);

    let module = temp_dir.path().join("reve/source/blob.ts");
    let index = temp_dir.path().join("reve/index.ts");

    let mut first = Reve::new(temp_dir.path(), true);
    first.add_resource("blob", "./assets/blob.bin").unwrap();
    first.build().await.unwrap();
    let module_first = fs::read(&module).unwrap();
    let index_first = fs::read(&index).unwrap();

    let mut second = Reve::new(temp_dir.path(), true);
    second.add_resource("blob", "./assets/blob.bin").unwrap();
    second.build().await.unwrap();

    assert_eq!(fs::read(&module).unwrap(), module_first);
    assert_eq!(fs::read(&index).unwrap(), index_first);

    let decoded = codec::decode_payload(&payload(&module), true).unwrap();
    assert_eq!(decoded, content);

    let index_text = String::from_utf8(index_first).unwrap();
    assert!(index_text.contains("import { gunzip } from"));
    assert!(index_text.contains("\"blob\": gunzip(decodeBase64("));
}

#[tokio::test]
async fn test_rebuild_same_instance_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    write_source(temp_dir.path(), "one.bin", b"one");
    write_source(temp_dir.path(), "two.bin", b"two");

    let mut reve = Reve::new(temp_dir.path(), false);
    reve.add_resource("one", "./one.bin").unwrap();
    reve.add_resource("two", "./two.bin").unwrap();

    let first = reve.build().await.unwrap();
    let index_first = fs::read_to_string(&first.index_path).unwrap();

    let second = reve.build().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second.index_path).unwrap(), index_first);
}

#[tokio::test]
async fn test_build_clears_stale_modules() {
    let temp_dir = TempDir::new().unwrap();
    write_source(temp_dir.path(), "keep.bin", b"keep");
    write_source(temp_dir.path(), "reve/source/stale.ts", b"export default \"\"");

    let mut reve = Reve::new(temp_dir.path(), false);
    reve.add_resource("keep", "./keep.bin").unwrap();
    reve.build().await.unwrap();

    let source_dir = temp_dir.path().join("reve/source");
    let mut entries: Vec<_> = fs::read_dir(&source_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    entries.sort();
    assert_eq!(entries, vec!["keep.ts"]);
}

#[tokio::test]
async fn test_failed_resource_stays_in_index() {
    let temp_dir = TempDir::new().unwrap();
    write_source(temp_dir.path(), "ok.bin", b"ok");

    let mut reve = Reve::new(temp_dir.path(), false);
    reve.add_resource("ok", "./ok.bin").unwrap();
    reve.add_resource("broken", "./does-not-exist.bin").unwrap();

    let report = reve.build().await.unwrap();
    assert_eq!(report.built_count(), 1);

    let index = fs::read_to_string(&report.index_path).unwrap();
    assert!(index.contains("\"ok\":"));
    assert!(index.contains("\"broken\":"));
    assert!(!temp_dir.path().join("reve/source/broken.ts").exists());
}

#[tokio::test]
async fn test_registry_frozen_after_build() {
    let temp_dir = TempDir::new().unwrap();
    write_source(temp_dir.path(), "a.bin", b"a");

    let mut reve = Reve::new(temp_dir.path(), false);
    reve.add_resource("a", "./a.bin").unwrap();
    reve.build().await.unwrap();

    reve.add_resource("late", "./a.bin").unwrap();
    reve.remove_resource("a");

    let report = reve.build().await.unwrap();
    let names: Vec<_> = report.resources.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["a"]);

    let index = fs::read_to_string(&report.index_path).unwrap();
    assert!(!index.contains("\"late\""));
}

#[test]
fn test_registration_errors() {
    let mut reve = Reve::new("/project", false);

    assert!(matches!(
        reve.add_resource("", "./x"),
        Err(RegistryError::InvalidName { .. })
    ));
    assert!(matches!(
        reve.add_resource("no-dashes", "./x"),
        Err(RegistryError::InvalidName { .. })
    ));

    reve.add_resource("icon set", "./icons.bin").unwrap();
    match reve.add_resource("icon_set", "./other.bin") {
        Err(RegistryError::NameCollision { conflicting, .. }) => {
            assert_eq!(conflicting, "icon set");
        }
        other => panic!("expected collision, got {other:?}"),
    }
    assert!(matches!(
        reve.add_resource("icon set", "./replacement.bin"),
        Err(RegistryError::NameCollision { .. })
    ));
    assert_eq!(reve.registry().len(), 1);
    assert_eq!(
        reve.registry().source("icon set"),
        Some(Path::new("/project/icons.bin"))
    );
}

#[tokio::test]
async fn test_custom_layout_from_settings() {
    let temp_dir = TempDir::new().unwrap();
    write_source(temp_dir.path(), "a.bin", b"a");

    let settings = Settings {
        output_dir: "generated/assets".into(),
        module_extension: "js".to_string(),
        ..Settings::default()
    };
    let mut reve = Reve::with_settings(temp_dir.path(), &settings);
    reve.add_resource("a", "a.bin").unwrap();
    let report = reve.build().await.unwrap();

    assert_eq!(
        report.index_path,
        temp_dir.path().join("generated/assets/index.js")
    );
    assert!(temp_dir.path().join("generated/assets/source/a.js").is_file());
}

#[tokio::test]
async fn test_unwritable_output_fails_build() {
    let temp_dir = TempDir::new().unwrap();
    // A file where the output directory should be
    fs::write(temp_dir.path().join("reve"), b"in the way").unwrap();

    let mut reve = Reve::new(temp_dir.path(), false);
    let err = reve.build().await.unwrap_err();
    assert!(matches!(err, BuildError::ClearOutput { .. }));
}
