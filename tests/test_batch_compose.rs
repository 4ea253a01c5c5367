// tests/test_batch_compose.rs
// End-to-end batch assembly over a stub converter
//
// RELEVANT FILES: src/convert/batch.rs, src/convert/compose.rs,
// src/convert/gateway.rs, src/tiles3d/bounds.rs

use std::fs;
use std::path::Path;

use tilefuse::convert::batch::{run, BatchConfig};
use tilefuse::convert::gateway::{BlockConverter, ConvertedBlock};
use tilefuse::error::{TileError, TileResult};
use tilefuse::geo::{geodetic_to_ecef, GeoAnchor};
use tilefuse::tiles3d::{load_tileset, Aabb, BoundingBox, Tile, TileContent};

/// Stub gateway: each block's primary file holds six numbers
/// (min x y z, max x y z); conversion writes one content payload and
/// returns the parsed bound.
struct StubConverter;

impl BlockConverter for StubConverter {
    fn source_extension(&self) -> &str {
        "osgb"
    }

    fn convert(
        &self,
        source_dir: &Path,
        output_dir: &Path,
        _max_level: u32,
    ) -> TileResult<ConvertedBlock> {
        let name = source_dir.file_name().unwrap().to_str().unwrap().to_string();
        let text = fs::read_to_string(source_dir.join(format!("{name}.osgb")))?;
        let nums: Vec<f64> = text
            .split_whitespace()
            .map(|t| t.parse().unwrap())
            .collect();
        let bound = Aabb::from_min_max(
            [nums[0], nums[1], nums[2]],
            [nums[3], nums[4], nums[5]],
        );
        let content = format!("{name}.b3dm");
        fs::write(output_dir.join(&content), b"stub payload")?;
        let fragment = Tile {
            bounding_volume: BoundingBox::from_aabb(&bound),
            geometric_error: 16.0,
            refine: None,
            transform: None,
            content: Some(TileContent { url: content }),
            children: Vec::new(),
        };
        Ok(ConvertedBlock { bound, fragment })
    }
}

/// Stub that faults on one named block, as an internal converter error would
struct FaultyConverter {
    fail_on: &'static str,
}

impl BlockConverter for FaultyConverter {
    fn source_extension(&self) -> &str {
        "osgb"
    }

    fn convert(
        &self,
        source_dir: &Path,
        output_dir: &Path,
        max_level: u32,
    ) -> TileResult<ConvertedBlock> {
        let name = source_dir.file_name().unwrap().to_str().unwrap();
        if name == self.fail_on {
            return Err(TileError::conversion(name, "decoder fault"));
        }
        StubConverter.convert(source_dir, output_dir, max_level)
    }
}

fn write_block(source_root: &Path, name: &str, bounds: &str) {
    let dir = source_root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{name}.osgb")), bounds).unwrap();
}

fn anchored_config(source: &Path, output: &Path) -> BatchConfig {
    let mut config = BatchConfig::new(source, output);
    config.anchor = Some(GeoAnchor::new(116.39, 39.91, 0.0));
    config
}

#[test]
fn assembles_two_blocks_into_a_two_level_tree() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("src");
    let output = tmp.path().join("out");
    write_block(&source, "Tile_001", "0 0 0 10 10 10");
    write_block(&source, "Tile_002", "5 5 5 20 20 20");

    let report = run(&StubConverter, &anchored_config(&source, &output)).unwrap();
    assert_eq!(report.converted, vec!["Tile_001", "Tile_002"]);
    assert!(report.skipped.is_empty());

    let root = load_tileset(&output.join("tileset.json")).unwrap();
    // aggregate box: center [10,10,10], half extents [10,10,10]
    assert_eq!(
        root.root.bounding_volume.data,
        [
            10.0, 10.0, 10.0,
            10.0, 0.0, 0.0,
            0.0, 10.0, 0.0,
            0.0, 0.0, 10.0,
        ]
    );
    assert_eq!(root.geometric_error, Some(1000.0));
    let transform = root.root.transform.expect("root carries the placement");
    assert_eq!([transform[3], transform[7], transform[11]], [0.0, 0.0, 0.0]);
    assert_eq!(transform[15], 1.0);

    // children delegate to the per-block documents, in discovery order
    let urls: Vec<_> = root
        .root
        .children
        .iter()
        .map(|c| c.content_url().unwrap().to_string())
        .collect();
    assert_eq!(
        urls,
        vec!["Data/Tile_001/tileset.json", "Data/Tile_002/tileset.json"]
    );

    // per-block documents reference their own content, without a transform
    let block = load_tileset(&output.join("Data/Tile_001/tileset.json")).unwrap();
    assert_eq!(block.root.content_url(), Some("Tile_001.b3dm"));
    assert!(block.root.transform.is_none());
    assert_eq!(block.geometric_error, None);
    assert!(output.join("Data/Tile_001/Tile_001.b3dm").is_file());
}

#[test]
fn missing_primary_file_skips_the_block_only() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("src");
    let output = tmp.path().join("out");
    write_block(&source, "Tile_001", "0 0 0 10 10 10");
    fs::create_dir_all(source.join("Tile_002")).unwrap(); // no primary file
    write_block(&source, "Tile_003", "5 5 5 20 20 20");

    let report = run(&StubConverter, &anchored_config(&source, &output)).unwrap();
    assert_eq!(report.converted, vec!["Tile_001", "Tile_003"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].0, "Tile_002");

    let root = load_tileset(&output.join("tileset.json")).unwrap();
    assert_eq!(root.root.children.len(), 2);
    assert!(root
        .root
        .children
        .iter()
        .all(|c| c.content_url() != Some("Data/Tile_002/tileset.json")));
}

#[test]
fn converter_fault_skips_the_block_only() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("src");
    let output = tmp.path().join("out");
    write_block(&source, "Tile_001", "0 0 0 10 10 10");
    write_block(&source, "Tile_002", "5 5 5 20 20 20");

    let converter = FaultyConverter {
        fail_on: "Tile_002",
    };
    let report = run(&converter, &anchored_config(&source, &output)).unwrap();
    assert_eq!(report.converted, vec!["Tile_001"]);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].1.contains("decoder fault"));

    // the aggregate only covers what converted
    let root = load_tileset(&output.join("tileset.json")).unwrap();
    assert_eq!(root.root.bounding_volume.data[0], 5.0);
    assert_eq!(root.root.children.len(), 1);
}

#[test]
fn zero_converted_blocks_is_fatal_and_writes_no_root() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("src");
    let output = tmp.path().join("out");
    fs::create_dir_all(source.join("Tile_001")).unwrap(); // no primary file

    let err = run(&StubConverter, &anchored_config(&source, &output)).unwrap_err();
    assert!(matches!(err, TileError::EmptyAggregate));
    assert!(!output.join("tileset.json").exists());
}

#[test]
fn empty_source_root_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("src");
    let output = tmp.path().join("out");
    fs::create_dir_all(&source).unwrap();

    let err = run(&StubConverter, &anchored_config(&source, &output)).unwrap_err();
    assert!(matches!(err, TileError::EmptyAggregate));
}

#[test]
fn rerun_produces_byte_identical_artifacts() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("src");
    let output = tmp.path().join("out");
    write_block(&source, "Tile_001", "0 0 0 10 10 10");
    write_block(&source, "Tile_002", "-4 1 2 6 12 9");

    let config = anchored_config(&source, &output);
    run(&StubConverter, &config).unwrap();
    let root_first = fs::read(output.join("tileset.json")).unwrap();
    let block_first = fs::read(output.join("Data/Tile_002/tileset.json")).unwrap();

    run(&StubConverter, &config).unwrap();
    assert_eq!(root_first, fs::read(output.join("tileset.json")).unwrap());
    assert_eq!(
        block_first,
        fs::read(output.join("Data/Tile_002/tileset.json")).unwrap()
    );
}

#[test]
fn child_order_is_stable_across_concurrency_limits() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("src");
    for i in 1..=8 {
        write_block(
            &source,
            &format!("Tile_{i:03}"),
            &format!("{i} {i} {i} {} {} {}", i + 1, i + 1, i + 1),
        );
    }

    let serial_out = tmp.path().join("serial");
    let mut serial = anchored_config(&source, &serial_out);
    serial.concurrency = Some(1);
    run(&StubConverter, &serial).unwrap();

    let parallel_out = tmp.path().join("parallel");
    let mut parallel = anchored_config(&source, &parallel_out);
    parallel.concurrency = Some(4);
    run(&StubConverter, &parallel).unwrap();

    assert_eq!(
        fs::read(serial_out.join("tileset.json")).unwrap(),
        fs::read(parallel_out.join("tileset.json")).unwrap()
    );
}

#[test]
fn ground_offset_rebases_the_anchor_height() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("src");
    let output = tmp.path().join("out");
    write_block(&source, "Tile_001", "0 0 2 10 10 10");

    let mut config = BatchConfig::new(&source, &output);
    config.anchor = Some(GeoAnchor::new(0.0, 0.0, 99.0));
    config.ground_offset = Some(0.0);
    run(&StubConverter, &config).unwrap();

    // lowest point sits at z = 2, so the effective anchor height is -2
    let root = load_tileset(&output.join("tileset.json")).unwrap();
    let transform = root.root.transform.unwrap();
    let expected = geodetic_to_ecef(0.0, 0.0, -2.0);
    assert_eq!([transform[12], transform[13], transform[14]], [
        expected.x, expected.y, expected.z
    ]);
}

#[cfg(unix)]
#[test]
fn external_converter_reads_back_the_block_document() {
    use std::os::unix::fs::PermissionsExt;
    use tilefuse::ExternalConverter;

    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("src");
    let output = tmp.path().join("out");
    write_block(&source, "Tile_001", "ignored by the script");

    // fake converter: writes a fixed sub-tileset into its output directory
    let script = tmp.path().join("fake-converter.sh");
    fs::write(
        &script,
        r#"#!/bin/sh
cat > "$2/tileset.json" <<'EOF'
{
  "asset": { "version": "1.0", "gltfUpAxis": "Y" },
  "root": {
    "boundingVolume": { "box": [5,5,5, 5,0,0, 0,5,0, 0,0,5] },
    "geometricError": 16.0,
    "content": { "url": "Tile_001.b3dm" }
  }
}
EOF
"#,
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let converter = ExternalConverter::new(script, "osgb");
    let config = anchored_config(&source, &output);
    let report = run(&converter, &config).unwrap();
    assert_eq!(report.converted, vec!["Tile_001"]);

    let root = load_tileset(&output.join("tileset.json")).unwrap();
    // bound recovered from the document the script wrote: [0,10]^3
    assert_eq!(
        root.root.bounding_volume.data,
        [5.0, 5.0, 5.0, 5.0, 0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0, 5.0]
    );
    assert_eq!(
        root.root.children[0].content_url(),
        Some("Data/Tile_001/tileset.json")
    );
}
