//! Data-root fixture builders

use serde_json::{json, Value};
use std::fs;
use std::path::Path;

pub fn write_bytes(root: &Path, rel: &str, bytes: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, bytes).unwrap();
}

pub fn write_json(root: &Path, rel: &str, document: &Value) {
    write_bytes(root, rel, &serde_json::to_vec_pretty(document).unwrap());
}

/// Minimal exported-result document
pub fn export_document(title: &str, uuid: Option<&str>) -> Value {
    let mut meta = json!({
        "REW Version": "5.31",
        "Dated": "2025-Mar-14 09:26:53",
        "notes": "",
        "Measurement": title,
        "Start Frequency": 2.0,
        "End Frequency": 24000.0,
    });
    if let Some(uuid) = uuid {
        meta["UUID"] = json!(uuid);
    }
    json!({
        "filename": title,
        "Freq(Hz)": [20.0, 40.0, 80.0],
        "SPL(dB)": [70.0, 72.5, 71.0],
        "ppo": 1,
        "Meta Data": meta,
    })
}

/// Data root with two containers and three exports
pub fn populate_standard_root(root: &Path) {
    write_bytes(root, "mdat/session-1.mdat", b"\x00\x01container one");
    write_bytes(root, "mdat/session-2.mdat", b"\x00\x02container two");
    write_json(
        root,
        "json/ResonX 1.json",
        &export_document("ResonX 1", Some("0b9e4f4c-4c1e-4a8e-9a53-5d3c2f0e7a11")),
    );
    write_json(root, "json/ResonX 2.json", &export_document("ResonX 2", None));
    write_json(root, "json/batch/Exciter 5.json", &export_document("Exciter 5", None));
}
