//! Raw host-endian streaming codec shared by every command.
//!
//! A frame is a fixed number of packed values with no header. Readers
//! return `Ok(None)` at the end of the stream so a command can stop
//! cleanly, and `Err` only for genuine I/O failures.
use crate::error::{Result, SptkError};
use crate::math::symmetric_matrix::SymmetricMatrix;
use ndarray::Array2;
use std::io::{ErrorKind, Read, Write};
pub trait StreamValue: Copy + Default {
    const SIZE: usize;
    fn from_ne_slice(bytes: &[u8]) -> Self;
    fn write_ne<W: Write + ?Sized>(self, writer: &mut W) -> std::io::Result<()>;
}
macro_rules! impl_stream_value {
    ($($t:ty),*) => {
        $(
            impl StreamValue for $t {
                const SIZE: usize = std::mem::size_of::<$t>();
                #[inline(always)]
                fn from_ne_slice(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$t>()];
                    raw.copy_from_slice(bytes);
                    <$t>::from_ne_bytes(raw)
                }
                #[inline(always)]
                fn write_ne<W: Write + ?Sized>(self, writer: &mut W) -> std::io::Result<()> {
                    writer.write_all(&self.to_ne_bytes())
                }
            }
        )*
    };
}
impl_stream_value!(f64, f32, i16, i32);
/// Fills `buf` as far as the stream allows and returns the byte count.
fn read_fully<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(SptkError::IoFailure(e)),
        }
    }
    Ok(filled)
}
/// Reads `length` values. A short final frame is zero-filled when
/// `zero_padding` is set and at least one value was read; otherwise it
/// ends the stream.
pub fn read_vector<T: StreamValue, R: Read + ?Sized>(
    reader: &mut R,
    length: usize,
    zero_padding: bool,
) -> Result<Option<Vec<T>>> {
    if length == 0 {
        return Ok(None);
    }
    let mut bytes = vec![0u8; length * T::SIZE];
    let filled = read_fully(reader, &mut bytes)?;
    let count = filled / T::SIZE;
    if count < length && !(zero_padding && count > 0) {
        return Ok(None);
    }
    let mut values = vec![T::default(); length];
    bytes
        .chunks_exact(T::SIZE)
        .take(count)
        .zip(values.iter_mut())
        .for_each(|(chunk, v)| *v = T::from_ne_slice(chunk));
    Ok(Some(values))
}
pub fn read_scalar<T: StreamValue, R: Read + ?Sized>(reader: &mut R) -> Result<Option<T>> {
    Ok(read_vector::<T, R>(reader, 1, false)?.map(|v| v[0]))
}
/// Reads everything left in the stream.
pub fn read_all<T: StreamValue, R: Read + ?Sized>(reader: &mut R) -> Result<Vec<T>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(bytes.chunks_exact(T::SIZE).map(T::from_ne_slice).collect())
}
/// Reads a row-major `rows` x `cols` matrix.
pub fn read_matrix<R: Read + ?Sized>(
    reader: &mut R,
    rows: usize,
    cols: usize,
) -> Result<Option<Array2<f64>>> {
    match read_vector::<f64, R>(reader, rows * cols, false)? {
        Some(values) => Array2::from_shape_vec((rows, cols), values)
            .map(Some)
            .map_err(|e| SptkError::invalid(e.to_string())),
        None => Ok(None),
    }
}
/// Reads the lower triangle of a `dim` x `dim` symmetric matrix in row-major order.
pub fn read_symmetric_matrix<R: Read + ?Sized>(
    reader: &mut R,
    dim: usize,
) -> Result<Option<SymmetricMatrix>> {
    match read_vector::<f64, R>(reader, dim * (dim + 1) / 2, false)? {
        Some(values) => SymmetricMatrix::from_lower_triangle(dim, values).map(Some),
        None => Ok(None),
    }
}
pub fn write_vector<T: StreamValue, W: Write + ?Sized>(values: &[T], writer: &mut W) -> Result<()> {
    values.iter().try_for_each(|v| v.write_ne(&mut *writer))?;
    Ok(())
}
pub fn write_scalar<T: StreamValue, W: Write + ?Sized>(value: T, writer: &mut W) -> Result<()> {
    value.write_ne(writer)?;
    Ok(())
}
pub fn write_matrix<W: Write + ?Sized>(matrix: &Array2<f64>, writer: &mut W) -> Result<()> {
    matrix.iter().try_for_each(|v| v.write_ne(&mut *writer))?;
    Ok(())
}
pub fn write_symmetric_matrix<W: Write + ?Sized>(matrix: &SymmetricMatrix, writer: &mut W) -> Result<()> {
    write_vector(matrix.lower_triangle(), writer)
}
