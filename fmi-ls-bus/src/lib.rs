#![doc = include_str!("../README.md")]
//! ## Feature flags
#![doc = document_features::document_features!()]
#![deny(clippy::all)]

use bytes::BufMut;

mod buffer;
#[cfg(feature = "can")]
pub mod can;
pub mod wire;

pub use buffer::LsBusBuffer;
pub use wire::{OperationHeader, Operations};

#[derive(Debug, thiserror::Error)]
pub enum FmiLsBusError {
    #[error("Buffer overflow: operation needs {needed} bytes, {available} available")]
    BufferOverflow { needed: usize, available: usize },
    #[error("Payload of {0} bytes exceeds the maximum data length")]
    PayloadTooLarge(usize),
    #[error("Invalid variant code: {0}")]
    InvalidVariant(u32),
}

/// An operation that can be appended to an [`LsBusBuffer`].
///
/// An operation is laid out as the [`OperationHeader`], followed by its fixed fields and finally
/// its variable payload (if any). The header is written by the buffer, implementors only describe
/// the fields after it.
pub trait LsBusOperation {
    /// Operation code written into the header.
    fn op_code(&self) -> wire::OperationCode;

    /// Size in bytes of the fields written by [`put_fields`](Self::put_fields).
    fn fields_len(&self) -> usize;

    /// Write the fixed fields, in wire order, following the header.
    fn put_fields<B: BufMut>(&self, dst: &mut B);

    /// Variable data appended after the fixed fields.
    fn payload(&self) -> &[u8] {
        &[]
    }

    /// Exact number of bytes this operation occupies in a buffer.
    fn encoded_len(&self) -> usize {
        wire::HEADER_LEN + self.fields_len() + self.payload().len()
    }
}

/// Format Error operation, reporting a received buffer that could not be interpreted.
///
/// The offending buffer content is carried as payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatError<'a> {
    pub data: &'a [u8],
}

impl LsBusOperation for FormatError<'_> {
    fn op_code(&self) -> wire::OperationCode {
        wire::OP_FORMAT_ERROR
    }

    fn fields_len(&self) -> usize {
        std::mem::size_of::<wire::DataLength>()
    }

    fn put_fields<B: BufMut>(&self, dst: &mut B) {
        dst.put_u16_ne(self.data.len() as wire::DataLength);
    }

    fn payload(&self) -> &[u8] {
        self.data
    }
}
