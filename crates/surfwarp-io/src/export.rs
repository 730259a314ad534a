//! CSV export of point attributes.
//!
//! One header row, then one row per point in point-index order. Only the
//! requested fields are written; positions are written only when asked for.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use surfwarp_core::{component_columns, Mesh, PointAttribute, Result, SurfwarpError};

const POINTS_COLUMN: &str = "Points";

/// Writes point-indexed tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvExporter {
    /// Prepend the point positions as `Points:0..2`.
    pub include_points: bool,
    /// Field delimiter.
    pub delimiter: u8,
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self {
            include_points: false,
            delimiter: b',',
        }
    }
}

impl CsvExporter {
    /// Creates an exporter with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether positions are exported.
    #[must_use]
    pub fn with_points(mut self, include_points: bool) -> Self {
        self.include_points = include_points;
        self
    }

    /// Writes `fields` of `mesh` to the file at `destination`, replacing it.
    ///
    /// Every field is checked before the file is touched, so a
    /// [`SurfwarpError::MissingField`] leaves no file behind. Parent
    /// directories are not created.
    pub fn export<S: AsRef<str>>(
        &self,
        mesh: &Mesh,
        fields: &[S],
        destination: &Path,
    ) -> Result<()> {
        let columns = resolve(mesh, fields)?;
        let file = File::create(destination).map_err(|e| SurfwarpError::write(destination, e))?;
        self.write_columns(mesh, &columns, file)
            .map_err(|e| SurfwarpError::write(destination, e))?;
        log::debug!(
            "wrote {} rows to {}",
            mesh.num_points(),
            destination.display()
        );
        Ok(())
    }

    /// Writes `fields` of `mesh` to any writer. A failing writer gives
    /// [`SurfwarpError::Sink`].
    pub fn write_table<S: AsRef<str>, W: Write>(
        &self,
        mesh: &Mesh,
        fields: &[S],
        writer: W,
    ) -> Result<()> {
        let columns = resolve(mesh, fields)?;
        self.write_columns(mesh, &columns, writer)
            .map_err(SurfwarpError::Sink)
    }

    fn write_columns<W: Write>(
        &self,
        mesh: &Mesh,
        columns: &[&PointAttribute],
        writer: W,
    ) -> std::io::Result<()> {
        let mut csv = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .from_writer(writer);

        let mut header = Vec::new();
        if self.include_points {
            header.extend(component_columns(POINTS_COLUMN, 3));
        }
        for attribute in columns {
            header.extend(attribute.column_names());
        }
        csv.write_record(&header)?;

        let mut row = Vec::with_capacity(header.len());
        for i in 0..mesh.num_points() {
            row.clear();
            if self.include_points {
                row.extend_from_slice(&mesh.points()[i].to_array());
            }
            for attribute in columns {
                attribute.data().extend_row(i, &mut row);
            }
            csv.serialize(&row)?;
        }
        csv.flush()
    }
}

/// Writes `fields` of `mesh` to `destination` with default settings.
pub fn export<S: AsRef<str>>(mesh: &Mesh, fields: &[S], destination: &Path) -> Result<()> {
    CsvExporter::new().export(mesh, fields, destination)
}

fn resolve<'m, S: AsRef<str>>(mesh: &'m Mesh, fields: &[S]) -> Result<Vec<&'m PointAttribute>> {
    fields
        .iter()
        .map(|name| mesh.require_attribute(name.as_ref(), "export"))
        .collect()
}
