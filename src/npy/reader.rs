use std::io::Read;
use std::path::Path;

use ndarray::{ArrayD, IxDyn};

use crate::error::{npy_error, IoResultExt, ToolResult};
use crate::npy::NPY_MAGIC;

/// Parsed `.npy` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpyHeader {
    pub version: (u8, u8),
    pub descr: String,
    pub fortran_order: bool,
    pub shape: Vec<usize>,
}

impl NpyHeader {
    pub fn element_count(&self) -> usize {
        self.shape.iter().product()
    }
}

/// Slice of `dict` right after `'key':`
fn dict_value<'a>(dict: &'a str, key: &str) -> ToolResult<&'a str> {
    let needle = format!("'{}':", key);
    let start = dict
        .find(&needle)
        .ok_or_else(|| npy_error(format!("header has no '{}' entry", key)))?;
    Ok(dict[start + needle.len()..].trim_start())
}

fn parse_descr(dict: &str) -> ToolResult<String> {
    let value = dict_value(dict, "descr")?;
    let quote = value
        .chars()
        .next()
        .filter(|c| *c == '\'' || *c == '"')
        .ok_or_else(|| npy_error("descr is not a string"))?;
    let rest = &value[1..];
    let end = rest
        .find(quote)
        .ok_or_else(|| npy_error("unterminated descr string"))?;
    Ok(rest[..end].to_string())
}

fn parse_fortran_order(dict: &str) -> ToolResult<bool> {
    let value = dict_value(dict, "fortran_order")?;
    if value.starts_with("True") {
        Ok(true)
    } else if value.starts_with("False") {
        Ok(false)
    } else {
        Err(npy_error("fortran_order is not a boolean"))
    }
}

fn parse_shape(dict: &str) -> ToolResult<Vec<usize>> {
    let value = dict_value(dict, "shape")?;
    let inner = value
        .strip_prefix('(')
        .and_then(|rest| rest.find(')').map(|end| &rest[..end]))
        .ok_or_else(|| npy_error("shape is not a tuple"))?;

    inner
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.trim_end_matches('L')
                .parse::<usize>()
                .map_err(|_| npy_error(format!("invalid shape entry '{}'", part)))
        })
        .collect()
}

pub fn read_header<R: Read>(reader: &mut R) -> ToolResult<NpyHeader> {
    let io_error = |e: std::io::Error| npy_error(format!("truncated header: {}", e));

    let mut preamble = [0u8; 8];
    reader.read_exact(&mut preamble).map_err(io_error)?;
    if &preamble[0..6] != NPY_MAGIC {
        return Err(npy_error("missing \\x93NUMPY magic"));
    }
    let version = (preamble[6], preamble[7]);

    let header_len = match version.0 {
        1 => {
            let mut len = [0u8; 2];
            reader.read_exact(&mut len).map_err(io_error)?;
            u16::from_le_bytes(len) as usize
        }
        2 | 3 => {
            let mut len = [0u8; 4];
            reader.read_exact(&mut len).map_err(io_error)?;
            u32::from_le_bytes(len) as usize
        }
        major => {
            return Err(npy_error(format!(
                "unsupported format version {}.{}",
                major, version.1
            )))
        }
    };

    let mut dict = vec![0u8; header_len];
    reader.read_exact(&mut dict).map_err(io_error)?;
    let dict = String::from_utf8(dict).map_err(|_| npy_error("header is not UTF-8"))?;

    Ok(NpyHeader {
        version,
        descr: parse_descr(&dict)?,
        fortran_order: parse_fortran_order(&dict)?,
        shape: parse_shape(&dict)?,
    })
}

/// Load a C-ordered `|u1` or `|b1` array
pub fn load_u8(path: impl AsRef<Path>) -> ToolResult<ArrayD<u8>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).with_path(path)?;
    let mut reader = std::io::BufReader::new(file);

    let header = read_header(&mut reader)?;
    if header.descr != "|u1" && header.descr != "|b1" {
        return Err(npy_error(format!("expected a byte array, found dtype '{}'", header.descr)));
    }
    if header.fortran_order {
        return Err(npy_error("Fortran-ordered arrays are not supported"));
    }

    let mut data = vec![0u8; header.element_count()];
    reader
        .read_exact(&mut data)
        .map_err(|e| npy_error(format!("truncated data in {}: {}", path.display(), e)))?;

    ArrayD::from_shape_vec(IxDyn(&header.shape), data).map_err(|e| npy_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::npy::{encode_header, save};
    use ndarray::Array3;

    #[test]
    fn test_read_written_header() {
        let bytes = encode_header("|u1", &[10, 20, 30]);
        let header = read_header(&mut bytes.as_slice()).expect("Header should parse");
        assert_eq!(header.version, (1, 0));
        assert_eq!(header.descr, "|u1");
        assert!(!header.fortran_order);
        assert_eq!(header.shape, vec![10, 20, 30]);
        assert_eq!(header.element_count(), 6000);
    }

    #[test]
    fn test_read_header_written_by_numpy() {
        let dict = "{'descr': '<f8', 'fortran_order': True, 'shape': (5,), }";
        let mut bytes = NPY_MAGIC.to_vec();
        bytes.extend_from_slice(&[1, 0]);
        bytes.extend_from_slice(&((dict.len() + 1) as u16).to_le_bytes());
        bytes.extend_from_slice(dict.as_bytes());
        bytes.push(b'\n');

        let header = read_header(&mut bytes.as_slice()).expect("Header should parse");
        assert_eq!(header.descr, "<f8");
        assert!(header.fortran_order);
        assert_eq!(header.shape, vec![5]);
    }

    #[test]
    fn test_scalar_shape() {
        let bytes = encode_header("|u1", &[]);
        let header = read_header(&mut bytes.as_slice()).expect("Header should parse");
        assert!(header.shape.is_empty());
        assert_eq!(header.element_count(), 1);
    }

    #[test]
    fn test_bad_magic() {
        let bytes = b"\x93NUMPX\x01\x00\x00\x00".to_vec();
        assert!(read_header(&mut bytes.as_slice()).is_err());
    }

    #[test]
    fn test_load_saved_array() {
        let dir = tempfile::TempDir::new().expect("Failed to create temporary directory");
        let path = dir.path().join("model.npy");

        let mut array = Array3::<u8>::zeros((3, 1, 2));
        array[[2, 0, 1]] = 42;
        save(&path, &array).expect("Save should succeed");

        let loaded = load_u8(&path).expect("Load should succeed");
        assert_eq!(loaded.shape(), &[3, 1, 2]);
        assert_eq!(loaded[&[2, 0, 1][..]], 42);
        assert_eq!(loaded.iter().map(|&v| v as u32).sum::<u32>(), 42);
    }

    #[test]
    fn test_load_rejects_wide_dtype() {
        let dir = tempfile::TempDir::new().expect("Failed to create temporary directory");
        let path = dir.path().join("floats.npy");
        save(&path, &ndarray::arr1(&[1.0f32, 2.0])).expect("Save should succeed");

        assert!(load_u8(&path).is_err());
    }
}
