//! NumPy `.npy` array files
//!
//! Arrays are written as format version 1.0 (2.0 when the header does not
//! fit in 64 KiB) in C order, so `numpy.load` reads them unchanged.

mod reader;

pub use reader::{load_u8, read_header, NpyHeader};

use std::io::Write;
use std::path::Path;

use ndarray::{ArrayBase, Data, Dimension};

use crate::error::{IoResultExt, ToolResult};

pub const NPY_MAGIC: &[u8; 6] = b"\x93NUMPY";

/// Preamble plus header is padded to a multiple of this
const HEADER_ALIGNMENT: usize = 64;

/// Element types with a fixed NumPy dtype
pub trait NpyElement: Copy {
    /// NumPy dtype descriptor, e.g. `|u1`
    const DESCR: &'static str;

    fn append_le_bytes(&self, out: &mut Vec<u8>);
}

impl NpyElement for u8 {
    const DESCR: &'static str = "|u1";

    fn append_le_bytes(&self, out: &mut Vec<u8>) {
        out.push(*self);
    }
}

impl NpyElement for bool {
    const DESCR: &'static str = "|b1";

    fn append_le_bytes(&self, out: &mut Vec<u8>) {
        out.push(*self as u8);
    }
}

impl NpyElement for i32 {
    const DESCR: &'static str = "<i4";

    fn append_le_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

impl NpyElement for f32 {
    const DESCR: &'static str = "<f4";

    fn append_le_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

/// Tuple syntax of npy headers: `()`, `(4,)`, `(2, 3, 4)`
pub fn format_shape(shape: &[usize]) -> String {
    match shape {
        [] => "()".to_string(),
        [n] => format!("({},)", n),
        dims => format!(
            "({})",
            dims.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(", ")
        ),
    }
}

fn header_dict(descr: &str, shape: &[usize]) -> String {
    format!(
        "{{'descr': '{}', 'fortran_order': False, 'shape': {}, }}",
        descr,
        format_shape(shape)
    )
}

/// Magic, version, header length and the padded header dict
pub fn encode_header(descr: &str, shape: &[usize]) -> Vec<u8> {
    let dict = header_dict(descr, shape);

    // (preamble, padding, header length) for a given width of the length field
    let layout = |length_bytes: usize| {
        let preamble = NPY_MAGIC.len() + 2 + length_bytes;
        let unpadded = preamble + dict.len() + 1;
        let padding = (HEADER_ALIGNMENT - unpadded % HEADER_ALIGNMENT) % HEADER_ALIGNMENT;
        (preamble, padding, dict.len() + padding + 1)
    };

    // Version 1.0 stores the header length in a u16, 2.0 in a u32
    let version: u8 = if layout(2).2 <= u16::MAX as usize { 1 } else { 2 };
    let (preamble, padding, header_len) = layout(if version == 1 { 2 } else { 4 });

    let mut out = Vec::with_capacity(preamble + header_len);
    out.extend_from_slice(NPY_MAGIC);
    out.push(version);
    out.push(0);
    if version == 1 {
        out.extend_from_slice(&(header_len as u16).to_le_bytes());
    } else {
        out.extend_from_slice(&(header_len as u32).to_le_bytes());
    }
    out.extend_from_slice(dict.as_bytes());
    out.extend(std::iter::repeat(b' ').take(padding));
    out.push(b'\n');
    out
}

/// Write `array` in C order regardless of its memory layout
pub fn write_array<W, A, S, D>(writer: &mut W, array: &ArrayBase<S, D>) -> std::io::Result<()>
where
    W: Write,
    A: NpyElement,
    S: Data<Elem = A>,
    D: Dimension,
{
    writer.write_all(&encode_header(A::DESCR, array.shape()))?;

    let mut body = Vec::with_capacity(array.len() * std::mem::size_of::<A>());
    for element in array.iter() {
        element.append_le_bytes(&mut body);
    }
    writer.write_all(&body)?;
    writer.flush()
}

/// Save `array` to `path`, replacing any existing file
pub fn save<A, S, D>(path: impl AsRef<Path>, array: &ArrayBase<S, D>) -> ToolResult<()>
where
    A: NpyElement,
    S: Data<Elem = A>,
    D: Dimension,
{
    let path = path.as_ref();
    let file = std::fs::File::create(path).with_path(path)?;
    let mut writer = std::io::BufWriter::new(file);
    write_array(&mut writer, array).with_path(path)?;
    log::debug!(
        "[npy] Saved {} array {} to {}",
        A::DESCR,
        format_shape(array.shape()),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, Array3};

    #[test]
    fn test_format_shape() {
        assert_eq!(format_shape(&[]), "()");
        assert_eq!(format_shape(&[7]), "(7,)");
        assert_eq!(format_shape(&[2, 3, 4]), "(2, 3, 4)");
    }

    #[test]
    fn test_header_layout() {
        let header = encode_header("|u1", &[2, 3, 4]);

        assert_eq!(&header[0..6], NPY_MAGIC);
        assert_eq!(header[6], 1);
        assert_eq!(header[7], 0);
        assert_eq!(header.len() % 64, 0);

        let header_len = u16::from_le_bytes([header[8], header[9]]) as usize;
        assert_eq!(header_len + 10, header.len());
        assert_eq!(*header.last().expect("Header is not empty"), b'\n');

        let text = std::str::from_utf8(&header[10..]).expect("Header dict should be ASCII");
        let dict = "{'descr': '|u1', 'fortran_order': False, 'shape': (2, 3, 4), }";
        assert!(text.starts_with(dict));
    }

    #[test]
    fn test_write_array_body_is_c_order() {
        let mut array = Array3::<u8>::zeros((2, 2, 2));
        array[[0, 0, 1]] = 1;
        array[[1, 1, 0]] = 6;

        let mut out = Vec::new();
        write_array(&mut out, &array).expect("Writing to a Vec should succeed");
        let body = &out[out.len() - 8..];
        assert_eq!(body, &[0, 1, 0, 0, 0, 0, 6, 0]);

        // A transposed view must still be written in logical order
        let mut out_t = Vec::new();
        write_array(&mut out_t, &array.t()).expect("Writing to a Vec should succeed");
        let body_t = &out_t[out_t.len() - 8..];
        assert_eq!(body_t, &[0, 0, 0, 6, 1, 0, 0, 0]);
    }

    #[test]
    fn test_write_f32_and_bool() {
        let mut out = Vec::new();
        write_array(&mut out, &arr1(&[1.5f32])).expect("Writing to a Vec should succeed");
        assert_eq!(&out[out.len() - 4..], &1.5f32.to_le_bytes());
        assert!(String::from_utf8_lossy(&out).contains("'<f4'"));

        let mut out = Vec::new();
        write_array(&mut out, &arr1(&[true, false])).expect("Writing to a Vec should succeed");
        assert_eq!(&out[out.len() - 2..], &[1, 0]);
        assert!(String::from_utf8_lossy(&out).contains("(2,)"));
    }
}
