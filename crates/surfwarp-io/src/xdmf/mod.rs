//! XDMF snapshot reader.
//!
//! Reads the point geometry and nodal attributes of one grid from an XDMF
//! (2 or 3) descriptor. Topology is ignored: warping and export only need
//! points. Heavy data may be inline XML or raw binary files next to the
//! descriptor; HDF5 references are reported as a read error.

mod data_item;

use std::path::Path;

use glam::DVec3;
use roxmltree::{Document, Node, ParsingOptions};
use surfwarp_core::{
    snapshot_name, AttributeData, AttributeKind, Mesh, Options, PointAttribute, Result, Snapshot,
    SurfwarpError,
};

use crate::source::MeshSource;
use data_item::{read_data_item, DataArray, ParseResult};

/// Reads `.xdmf` snapshots.
#[derive(Debug, Clone, Default)]
pub struct XdmfReader {
    point_arrays: Vec<String>,
    time_step: usize,
}

impl XdmfReader {
    /// Creates a reader that loads every nodal array of the first time step.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a reader configured from batch options. The warp and export
    /// fields are always loaded, even when `point_arrays` does not list them.
    pub fn from_options(options: &Options) -> Self {
        Self::new()
            .with_point_arrays(options.required_point_arrays())
            .with_time_step(options.time_step)
    }

    /// Restricts loading to the named point arrays. An empty list loads all of them.
    #[must_use]
    pub fn with_point_arrays<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        self.point_arrays = names.into_iter().map(Into::into).collect();
        self
    }

    /// Selects which grid of a temporal collection is read.
    #[must_use]
    pub fn with_time_step(mut self, time_step: usize) -> Self {
        self.time_step = time_step;
        self
    }

    /// Parses an XDMF document. `path` is used for error messages and to
    /// resolve binary data files.
    pub fn parse(&self, text: &str, path: &Path) -> Result<Snapshot> {
        let ctx = Ctx {
            path,
            base_dir: path.parent().unwrap_or_else(|| Path::new(".")),
        };

        let mut parsing = ParsingOptions::default();
        parsing.allow_dtd = true;
        let doc = Document::parse_with_options(text, parsing).map_err(|e| ctx.fail(e))?;

        let domain = child(doc.root_element(), "Domain")
            .ok_or_else(|| ctx.fail("no Domain element"))?;
        let (grid, time) = self.select_grid(domain).map_err(|e| ctx.fail(e))?;

        let geometry = child(grid, "Geometry")
            .or_else(|| shared_geometry(domain))
            .ok_or_else(|| ctx.fail("grid has no Geometry"))?;
        let points = read_geometry(geometry, ctx.base_dir).map_err(|e| ctx.fail(e))?;

        let mut mesh = Mesh::new(points);
        for node in children(grid, "Attribute") {
            if let Some(attribute) = self.read_attribute(node, mesh.num_points(), &ctx)? {
                mesh.add_attribute(attribute)?;
            }
        }
        for wanted in &self.point_arrays {
            if mesh.attribute(wanted).is_none() {
                log::debug!("{}: point array '{wanted}' not present", path.display());
            }
        }

        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let name = snapshot_name(file_name, MeshSource::extension(self)).unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
        Ok(Snapshot::new(name, mesh).with_time(time))
    }

    fn wants(&self, name: &str) -> bool {
        self.point_arrays.is_empty() || self.point_arrays.iter().any(|n| n == name)
    }

    /// Picks the grid to read: the requested step of the first temporal
    /// collection, or the first grid of the domain if there is none.
    fn select_grid<'a, 'input>(
        &self,
        domain: Node<'a, 'input>,
    ) -> ParseResult<(Node<'a, 'input>, Option<f64>)> {
        let grids: Vec<_> = children(domain, "Grid").collect();
        let grid = grids
            .iter()
            .copied()
            .find(|g| is_temporal(*g))
            .or_else(|| grids.first().copied())
            .ok_or("Domain has no Grid")?;

        match grid.attribute("GridType").unwrap_or("Uniform") {
            "Uniform" => Ok((grid, grid_time(grid))),
            "Collection" if is_temporal(grid) => {
                let steps: Vec<_> = children(grid, "Grid").collect();
                let step = steps.get(self.time_step).copied().ok_or_else(|| {
                    format!(
                        "time step {} requested but the collection has {}",
                        self.time_step,
                        steps.len()
                    )
                })?;
                Ok((step, grid_time(step)))
            }
            other => Err(format!(
                "GridType '{other}' (CollectionType '{}') is not supported",
                grid.attribute("CollectionType").unwrap_or("")
            )),
        }
    }

    fn read_attribute(
        &self,
        node: Node<'_, '_>,
        num_points: usize,
        ctx: &Ctx<'_>,
    ) -> Result<Option<PointAttribute>> {
        let Some(name) = node.attribute("Name") else {
            log::warn!("{}: skipping unnamed Attribute", ctx.path.display());
            return Ok(None);
        };
        if !self.wants(name) {
            log::debug!("{}: skipping unselected array '{name}'", ctx.path.display());
            return Ok(None);
        }
        let center = node.attribute("Center").unwrap_or("Node");
        if center != "Node" {
            log::debug!(
                "{}: skipping '{name}' centered on {center}",
                ctx.path.display()
            );
            return Ok(None);
        }

        let attribute_type = node
            .attribute("AttributeType")
            .or_else(|| node.attribute("Type"))
            .unwrap_or("Scalar");
        let (kind, accepted) = match attribute_type {
            "Scalar" => (AttributeKind::Scalar, 1..=1),
            "Vector" => (AttributeKind::Vector, 2..=3),
            "Tensor" => (AttributeKind::Tensor, 9..=9),
            "Tensor6" => (AttributeKind::Tensor, 6..=6),
            other => {
                log::warn!(
                    "{}: skipping '{name}' with unsupported AttributeType '{other}'",
                    ctx.path.display()
                );
                return Ok(None);
            }
        };

        let item = child(node, "DataItem")
            .ok_or_else(|| ctx.fail(format!("Attribute '{name}' has no DataItem")))?;
        let array = read_data_item(item, ctx.base_dir).map_err(|e| ctx.fail(e))?;
        let (rows, components) = row_shape(&array, num_points);

        if rows != num_points || !accepted.contains(&components) {
            return Err(SurfwarpError::FieldShape {
                field: name.to_string(),
                expected_components: kind.num_components(),
                components,
                expected_len: num_points,
                len: rows,
            });
        }

        let values = array.values;
        let data = match (kind, components) {
            (AttributeKind::Scalar, _) => AttributeData::Scalar(values),
            (AttributeKind::Vector, 2) => AttributeData::Vector(
                values
                    .chunks_exact(2)
                    .map(|c| DVec3::new(c[0], c[1], 0.0))
                    .collect(),
            ),
            (AttributeKind::Vector, _) => {
                AttributeData::Vector(values.chunks_exact(3).map(DVec3::from_slice).collect())
            }
            (AttributeKind::Tensor, 6) => AttributeData::Tensor(
                values
                    .chunks_exact(6)
                    .map(|c| [c[0], c[1], c[2], c[1], c[3], c[4], c[2], c[4], c[5]])
                    .collect(),
            ),
            (AttributeKind::Tensor, _) => AttributeData::Tensor(
                values
                    .chunks_exact(9)
                    .map(|c| {
                        let mut t = [0.0; 9];
                        t.copy_from_slice(c);
                        t
                    })
                    .collect(),
            ),
        };
        Ok(Some(PointAttribute::new(name, data)))
    }
}

impl MeshSource for XdmfReader {
    fn extension(&self) -> &str {
        "xdmf"
    }

    fn load(&self, path: &Path) -> Result<Snapshot> {
        let text =
            std::fs::read_to_string(path).map_err(|e| SurfwarpError::read(path, e.to_string()))?;
        self.parse(&text, path)
    }
}

struct Ctx<'a> {
    path: &'a Path,
    base_dir: &'a Path,
}

impl Ctx<'_> {
    fn fail(&self, reason: impl ToString) -> SurfwarpError {
        SurfwarpError::read(self.path, reason.to_string())
    }
}

fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == tag)
}

fn child<'a, 'input: 'a>(node: Node<'a, 'input>, tag: &'a str) -> Option<Node<'a, 'input>> {
    children(node, tag).next()
}

fn is_temporal(grid: Node<'_, '_>) -> bool {
    grid.attribute("GridType") == Some("Collection")
        && grid.attribute("CollectionType") == Some("Temporal")
}

fn grid_time(grid: Node<'_, '_>) -> Option<f64> {
    child(grid, "Time")?.attribute("Value")?.trim().parse().ok()
}

/// Geometry of the first grid in the domain that defines one. Time-series
/// writers often store the mesh once and let each step refer back to it.
fn shared_geometry<'a, 'input>(domain: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    domain
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "Grid")
        .find_map(|g| child(g, "Geometry"))
}

fn read_geometry(node: Node<'_, '_>, base_dir: &Path) -> ParseResult<Vec<DVec3>> {
    let geometry_type = node
        .attribute("GeometryType")
        .or_else(|| node.attribute("Type"))
        .unwrap_or("XYZ");
    let items: Vec<_> = children(node, "DataItem")
        .map(|item| read_data_item(item, base_dir))
        .collect::<ParseResult<_>>()?;

    match (geometry_type, items.as_slice()) {
        ("XYZ", [xyz, ..]) => interleaved(&xyz.values, 3),
        ("XY", [xy, ..]) => interleaved(&xy.values, 2),
        ("X_Y_Z", [x, y, z, ..]) => {
            if x.values.len() != y.values.len() || x.values.len() != z.values.len() {
                return Err("X_Y_Z geometry arrays differ in length".into());
            }
            Ok(x.values
                .iter()
                .zip(&y.values)
                .zip(&z.values)
                .map(|((&x, &y), &z)| DVec3::new(x, y, z))
                .collect())
        }
        ("XYZ" | "XY" | "X_Y_Z", _) => {
            Err(format!("{geometry_type} geometry is missing DataItems"))
        }
        (other, _) => Err(format!("GeometryType '{other}' is not supported")),
    }
}

fn interleaved(values: &[f64], dim: usize) -> ParseResult<Vec<DVec3>> {
    if values.len() % dim != 0 {
        return Err(format!(
            "{} coordinates do not form {dim}-component points",
            values.len()
        ));
    }
    Ok(values
        .chunks_exact(dim)
        .map(|c| DVec3::new(c[0], c[1], if dim == 3 { c[2] } else { 0.0 }))
        .collect())
}

/// Rows and components of an attribute array. The point count decides the
/// split when it divides the value count, so flat `Dimensions="3N"` arrays
/// are accepted as well as `Dimensions="N 3"`.
fn row_shape(array: &DataArray, num_points: usize) -> (usize, usize) {
    let len = array.values.len();
    if num_points > 0 && len % num_points == 0 {
        (num_points, len / num_points)
    } else {
        (array.rows(), array.components())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(reader: &XdmfReader, xml: &str) -> Result<Snapshot> {
        reader.parse(xml, Path::new("/data/out/displacement_3.xdmf"))
    }

    const UNIFORM: &str = r#"<?xml version="1.0"?>
<!DOCTYPE Xdmf SYSTEM "Xdmf.dtd" []>
<Xdmf Version="3.0" xmlns:xi="http://www.w3.org/2001/XInclude">
  <Domain>
    <Grid Name="mesh" GridType="Uniform">
      <Topology TopologyType="Polyline" NumberOfElements="2" NodesPerElement="2">
        <DataItem Dimensions="2 2" NumberType="UInt" Format="XML">0 1 1 2</DataItem>
      </Topology>
      <Geometry GeometryType="XYZ">
        <DataItem Dimensions="3 3" Format="XML">0 0 0  1 0 0  2 0 0</DataItem>
      </Geometry>
      <Attribute Name="Displacement Vector" AttributeType="Vector" Center="Node">
        <DataItem Dimensions="3 3" Format="XML">0 0 1  0 1 0  1 0 0</DataItem>
      </Attribute>
      <Attribute Name="Stress" AttributeType="Scalar" Center="Node">
        <DataItem Dimensions="3" Format="XML">10 20 30</DataItem>
      </Attribute>
      <Attribute Name="Damage" AttributeType="Scalar" Center="Cell">
        <DataItem Dimensions="2" Format="XML">0 1</DataItem>
      </Attribute>
    </Grid>
  </Domain>
</Xdmf>"#;

    #[test]
    fn test_parse_uniform_grid() {
        let snapshot = parse(&XdmfReader::new(), UNIFORM).unwrap();
        assert_eq!(snapshot.name, "displacement_3");
        assert!(snapshot.time.is_none());

        let mesh = &snapshot.mesh;
        assert_eq!(mesh.num_points(), 3);
        assert_eq!(mesh.points()[2], DVec3::new(2.0, 0.0, 0.0));
        let names: Vec<_> = mesh.attribute_names().collect();
        assert_eq!(names, vec!["Displacement Vector", "Stress"]);
        assert_eq!(
            mesh.attribute("Stress").unwrap().as_scalars(),
            Some(&[10.0, 20.0, 30.0][..])
        );
        assert_eq!(
            mesh.attribute("Displacement Vector").unwrap().as_vectors().unwrap()[0],
            DVec3::Z
        );
    }

    #[test]
    fn test_point_array_selection() {
        let reader = XdmfReader::new().with_point_arrays(["Stress"]);
        let snapshot = parse(&reader, UNIFORM).unwrap();
        let names: Vec<_> = snapshot.mesh.attribute_names().collect();
        assert_eq!(names, vec!["Stress"]);
    }

    const TIME_SERIES: &str = r#"<Xdmf Version="3.0" xmlns:xi="http://www.w3.org/2001/XInclude">
  <Domain>
    <Grid Name="mesh" GridType="Uniform">
      <Geometry GeometryType="XY">
        <DataItem Dimensions="2 2" Format="XML">0 0 1 0</DataItem>
      </Geometry>
    </Grid>
    <Grid Name="TimeSeries" GridType="Collection" CollectionType="Temporal">
      <Grid Name="step" GridType="Uniform">
        <xi:include xpointer="xpointer(//Grid[@Name=&quot;mesh&quot;]/Geometry)" />
        <Time Value="0" />
        <Attribute Name="Stress" AttributeType="Scalar" Center="Node">
          <DataItem Dimensions="2 1" Format="XML">1 2</DataItem>
        </Attribute>
      </Grid>
      <Grid Name="step" GridType="Uniform">
        <xi:include xpointer="xpointer(//Grid[@Name=&quot;mesh&quot;]/Geometry)" />
        <Time Value="0.5" />
        <Attribute Name="Stress" AttributeType="Scalar" Center="Node">
          <DataItem Dimensions="2 1" Format="XML">3 4</DataItem>
        </Attribute>
        <Attribute Name="Strain" AttributeType="Tensor6" Center="Node">
          <DataItem Dimensions="2 6" Format="XML">1 2 3 4 5 6  0 0 0 0 0 0</DataItem>
        </Attribute>
      </Grid>
    </Grid>
  </Domain>
</Xdmf>"#;

    #[test]
    fn test_temporal_collection_first_step() {
        let snapshot = parse(&XdmfReader::new(), TIME_SERIES).unwrap();
        assert_eq!(snapshot.time, Some(0.0));
        assert_eq!(snapshot.mesh.points()[1], DVec3::X);
        assert_eq!(
            snapshot.mesh.attribute("Stress").unwrap().as_scalars(),
            Some(&[1.0, 2.0][..])
        );
    }

    #[test]
    fn test_first_uniform_grid_without_collection() {
        let xml = r#"<Xdmf><Domain>
  <Grid Name="first"><Geometry GeometryType="XY">
    <DataItem Dimensions="1 2">1 2</DataItem></Geometry></Grid>
  <Grid Name="second"><Geometry GeometryType="XY">
    <DataItem Dimensions="1 2">7 8</DataItem></Geometry></Grid>
</Domain></Xdmf>"#;
        let snapshot = parse(&XdmfReader::new(), xml).unwrap();
        assert_eq!(snapshot.mesh.points(), &[DVec3::new(1.0, 2.0, 0.0)]);
        assert_eq!(snapshot.time, None);
    }

    #[test]
    fn test_temporal_collection_selected_step() {
        let snapshot = parse(&XdmfReader::new().with_time_step(1), TIME_SERIES).unwrap();
        assert_eq!(snapshot.time, Some(0.5));
        let strain = snapshot.mesh.attribute("Strain").unwrap().as_tensors().unwrap();
        assert_eq!(strain[0], [1.0, 2.0, 3.0, 2.0, 4.0, 5.0, 3.0, 5.0, 6.0]);
    }

    #[test]
    fn test_temporal_collection_step_out_of_range() {
        let err = parse(&XdmfReader::new().with_time_step(5), TIME_SERIES).unwrap_err();
        assert!(matches!(err, SurfwarpError::Read { ref reason, .. } if reason.contains("time step 5")));
    }

    #[test]
    fn test_attribute_length_mismatch_is_shape_error() {
        let xml = UNIFORM.replace(
            r#"<DataItem Dimensions="3" Format="XML">10 20 30</DataItem>"#,
            r#"<DataItem Dimensions="2" Format="XML">10 20</DataItem>"#,
        );
        let err = parse(&XdmfReader::new(), &xml).unwrap_err();
        assert!(matches!(
            err,
            SurfwarpError::FieldShape { expected_len: 3, len: 2, .. }
        ));
    }

    #[test]
    fn test_malformed_xml_is_read_error() {
        let err = parse(&XdmfReader::new(), "<Xdmf><Domain>").unwrap_err();
        assert!(matches!(err, SurfwarpError::Read { .. }));
    }

    #[test]
    fn test_missing_geometry_is_read_error() {
        let xml = r#"<Xdmf><Domain><Grid GridType="Uniform"></Grid></Domain></Xdmf>"#;
        let err = parse(&XdmfReader::new(), xml).unwrap_err();
        assert!(matches!(err, SurfwarpError::Read { ref reason, .. } if reason.contains("Geometry")));
    }

    #[test]
    fn test_spatial_collection_unsupported() {
        let xml = r#"<Xdmf><Domain>
            <Grid GridType="Collection" CollectionType="Spatial"></Grid>
        </Domain></Xdmf>"#;
        let err = parse(&XdmfReader::new(), xml).unwrap_err();
        assert!(matches!(err, SurfwarpError::Read { ref reason, .. } if reason.contains("Spatial")));
    }

    #[test]
    fn test_load_missing_file() {
        let err = XdmfReader::new()
            .load(Path::new("/nonexistent/step.xdmf"))
            .unwrap_err();
        assert!(matches!(err, SurfwarpError::Read { .. }));
    }

    #[test]
    fn test_x_y_z_geometry() {
        let xml = r#"<Xdmf><Domain><Grid>
            <Geometry GeometryType="X_Y_Z">
              <DataItem Dimensions="2">0 1</DataItem>
              <DataItem Dimensions="2">2 3</DataItem>
              <DataItem Dimensions="2">4 5</DataItem>
            </Geometry>
        </Grid></Domain></Xdmf>"#;
        let snapshot = parse(&XdmfReader::new(), xml).unwrap();
        assert_eq!(
            snapshot.mesh.points(),
            &[DVec3::new(0.0, 2.0, 4.0), DVec3::new(1.0, 3.0, 5.0)]
        );
    }
}
