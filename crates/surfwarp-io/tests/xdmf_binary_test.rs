//! Reads an XDMF descriptor whose heavy data lives in raw binary files, then
//! warps and exports it.

use std::fs;
use std::path::Path;

use surfwarp_core::{warp, DVec3, SurfwarpError};
use surfwarp_io::{export, MeshSource, XdmfReader};

fn write_f64s(path: &Path, values: &[f64]) {
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    fs::write(path, bytes).unwrap();
}

fn write_descriptor(dir: &Path) -> std::path::PathBuf {
    write_f64s(&dir.join("geometry.bin"), &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    write_f64s(&dir.join("u.bin"), &[0.5, 0.0, 0.0, 0.0, 0.25, 0.0]);
    let stress: Vec<u8> = [7.0f32, 8.0].iter().flat_map(|v| v.to_be_bytes()).collect();
    fs::write(dir.join("stress.bin"), stress).unwrap();

    let xml = r#"<?xml version="1.0"?>
<Xdmf Version="2.0">
  <Domain>
    <Grid Name="mesh" GridType="Uniform">
      <Geometry GeometryType="XYZ">
        <DataItem Dimensions="2 3" Format="Binary" NumberType="Float" Precision="8" Endian="Little">geometry.bin</DataItem>
      </Geometry>
      <Attribute Name="Displacement Vector" AttributeType="Vector" Center="Node">
        <DataItem Dimensions="2 3" Format="Binary" NumberType="Float" Precision="8" Endian="Little">u.bin</DataItem>
      </Attribute>
      <Attribute Name="Stress" AttributeType="Scalar" Center="Node">
        <DataItem Dimensions="2" Format="Binary" NumberType="Float" Precision="4" Endian="Big">stress.bin</DataItem>
      </Attribute>
    </Grid>
  </Domain>
</Xdmf>"#;
    let path = dir.join("binary_snapshot.xdmf");
    fs::write(&path, xml).unwrap();
    path
}

#[test]
fn test_binary_snapshot_warp_and_export() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_descriptor(dir.path());

    let snapshot = XdmfReader::new().load(&path).unwrap();
    assert_eq!(snapshot.name, "binary_snapshot");

    let warped = warp(&snapshot.mesh, "Displacement Vector").unwrap();
    assert_eq!(
        warped.points(),
        &[DVec3::new(0.5, 0.0, 0.0), DVec3::new(1.0, 0.25, 0.0)]
    );

    let dest = dir.path().join("binary_snapshot_all.csv");
    export(&warped, &["Stress"], &dest).unwrap();
    assert_eq!(fs::read_to_string(dest).unwrap(), "Stress\n7.0\n8.0\n");
}

#[test]
fn test_missing_binary_file_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_descriptor(dir.path());
    fs::remove_file(dir.path().join("u.bin")).unwrap();

    let err = XdmfReader::new().load(&path).unwrap_err();
    assert!(matches!(err, SurfwarpError::Read { ref reason, .. } if reason.contains("u.bin")));
}

#[test]
fn test_unselected_arrays_are_not_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_descriptor(dir.path());
    // Only Stress is selected, so the missing displacement file is never opened.
    fs::remove_file(dir.path().join("u.bin")).unwrap();

    let snapshot = XdmfReader::new()
        .with_point_arrays(["Stress"])
        .load(&path)
        .unwrap();
    assert!(snapshot.mesh.attribute("Displacement Vector").is_none());

    let err = warp(&snapshot.mesh, "Displacement Vector").unwrap_err();
    assert!(matches!(err, SurfwarpError::MissingField { .. }));
}
