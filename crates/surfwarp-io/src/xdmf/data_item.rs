//! Decoding of XDMF `DataItem` elements into flat `f64` arrays.

use std::path::Path;

use roxmltree::Node;

pub(crate) type ParseResult<T> = std::result::Result<T, String>;

/// Values of one `DataItem`, flattened in file order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DataArray {
    pub dims: Vec<usize>,
    pub values: Vec<f64>,
}

impl DataArray {
    /// Number of rows (the slowest-varying dimension).
    pub fn rows(&self) -> usize {
        self.dims.first().copied().unwrap_or(0)
    }

    /// Number of components per row.
    pub fn components(&self) -> usize {
        self.dims
            .iter()
            .skip(1)
            .fold(1usize, |n, &d| n.saturating_mul(d))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberType {
    Float,
    Int,
    UInt,
}

/// Reads a `DataItem`. Binary data files are resolved relative to `base_dir`.
pub(crate) fn read_data_item(node: Node<'_, '_>, base_dir: &Path) -> ParseResult<DataArray> {
    if node.attribute("Reference").is_some() {
        return Err("DataItem references are not supported".into());
    }
    let item_type = node.attribute("ItemType").unwrap_or("Uniform");
    if !item_type.eq_ignore_ascii_case("Uniform") {
        return Err(format!("DataItem ItemType '{item_type}' is not supported"));
    }

    let dims = node.attribute("Dimensions").map(parse_dims).transpose()?;
    let text = node.text().unwrap_or("").trim();

    match node.attribute("Format").unwrap_or("XML") {
        "XML" => {
            let values = parse_xml_values(text)?;
            let dims = dims.unwrap_or_else(|| vec![values.len()]);
            check_count(&dims, values.len())?;
            Ok(DataArray { dims, values })
        }
        "Binary" => {
            let dims = dims.ok_or("binary DataItem without Dimensions")?;
            let count = element_count(&dims)?;
            let values = read_binary(node, &base_dir.join(text), count)?;
            Ok(DataArray { dims, values })
        }
        "HDF" => Err(format!(
            "HDF5 heavy data ('{text}') is not supported; store DataItems as XML or Binary"
        )),
        other => Err(format!("DataItem Format '{other}' is not supported")),
    }
}

fn parse_dims(text: &str) -> ParseResult<Vec<usize>> {
    let dims = text
        .split_whitespace()
        .map(|d| {
            d.parse::<usize>()
                .map_err(|_| format!("invalid Dimensions '{text}'"))
        })
        .collect::<ParseResult<Vec<_>>>()?;
    if dims.is_empty() {
        return Err("empty Dimensions".into());
    }
    Ok(dims)
}

/// Total number of values `dims` describe.
fn element_count(dims: &[usize]) -> ParseResult<usize> {
    dims.iter()
        .try_fold(1usize, |n, &d| n.checked_mul(d))
        .ok_or_else(|| format!("Dimensions {dims:?} overflow"))
}

fn parse_xml_values(text: &str) -> ParseResult<Vec<f64>> {
    text.split_whitespace()
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| format!("invalid number '{token}' in DataItem"))
        })
        .collect()
}

fn check_count(dims: &[usize], count: usize) -> ParseResult<()> {
    let expected = element_count(dims)?;
    if expected == count {
        Ok(())
    } else {
        Err(format!(
            "DataItem has {count} values but Dimensions {dims:?} require {expected}"
        ))
    }
}

fn read_binary(node: Node<'_, '_>, file: &Path, count: usize) -> ParseResult<Vec<f64>> {
    let number_type = match node
        .attribute("NumberType")
        .or_else(|| node.attribute("DataType"))
        .unwrap_or("Float")
    {
        "Float" => NumberType::Float,
        "Int" | "Char" => NumberType::Int,
        "UInt" | "UChar" => NumberType::UInt,
        other => return Err(format!("NumberType '{other}' is not supported")),
    };
    let default_precision = match node.attribute("NumberType") {
        Some("Char" | "UChar") => "1",
        _ => "4",
    };
    let precision: usize = node
        .attribute("Precision")
        .unwrap_or(default_precision)
        .parse()
        .map_err(|_| "invalid Precision".to_string())?;
    let valid_precision = match number_type {
        NumberType::Float => matches!(precision, 4 | 8),
        NumberType::Int | NumberType::UInt => matches!(precision, 1 | 2 | 4 | 8),
    };
    if !valid_precision {
        return Err(format!(
            "{number_type:?} with Precision {precision} is not supported"
        ));
    }
    let big_endian = match node.attribute("Endian").unwrap_or("Native") {
        "Big" => true,
        "Little" => false,
        "Native" => cfg!(target_endian = "big"),
        other => return Err(format!("Endian '{other}' is not supported")),
    };
    let seek: usize = node
        .attribute("Seek")
        .unwrap_or("0")
        .parse()
        .map_err(|_| "invalid Seek".to_string())?;

    let len = count
        .checked_mul(precision)
        .ok_or_else(|| format!("{count} values of {precision} bytes overflow"))?;
    let end = seek
        .checked_add(len)
        .ok_or_else(|| format!("Seek {seek} plus {len} bytes overflows"))?;

    let bytes = std::fs::read(file).map_err(|e| format!("{}: {e}", file.display()))?;
    let slice = bytes
        .get(seek..end)
        .ok_or_else(|| {
            format!(
                "{} holds {} bytes, need {len} at offset {seek}",
                file.display(),
                bytes.len()
            )
        })?;

    slice
        .chunks_exact(precision)
        .map(|chunk| {
            decode_value(chunk, number_type, big_endian).ok_or_else(|| {
                format!("{number_type:?} with Precision {precision} is not supported")
            })
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn decode_value(chunk: &[u8], number_type: NumberType, big_endian: bool) -> Option<f64> {
    macro_rules! read {
        ($t:ty) => {{
            let bytes = chunk.try_into().ok()?;
            if big_endian {
                <$t>::from_be_bytes(bytes)
            } else {
                <$t>::from_le_bytes(bytes)
            }
        }};
    }

    Some(match (number_type, chunk.len()) {
        (NumberType::Float, 4) => f64::from(read!(f32)),
        (NumberType::Float, 8) => read!(f64),
        (NumberType::Int, 1) => f64::from(read!(i8)),
        (NumberType::Int, 2) => f64::from(read!(i16)),
        (NumberType::Int, 4) => f64::from(read!(i32)),
        (NumberType::Int, 8) => read!(i64) as f64,
        (NumberType::UInt, 1) => f64::from(read!(u8)),
        (NumberType::UInt, 2) => f64::from(read!(u16)),
        (NumberType::UInt, 4) => f64::from(read!(u32)),
        (NumberType::UInt, 8) => read!(u64) as f64,
        _ => return None,
    })
}
