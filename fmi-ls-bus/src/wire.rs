//! Bus-independent parts of the FMI-LS-BUS wire format.
//!
//! Every operation starts with an [`OperationHeader`] holding the operation code and the total
//! length of the operation in bytes (header included). Fields are packed without padding and
//! stored in host byte order, matching the C structures of the standard which are copied into
//! the buffer with `memcpy`.

use std::mem;

/// Operation code identifying the layout of an operation.
pub type OperationCode = u32;

/// Total length of an operation in bytes, including the header.
pub type OperationLength = u32;

/// Length of the variable data of an operation.
pub type DataLength = u16;

/// Bus-independent operation reporting a buffer that could not be interpreted.
pub const OP_FORMAT_ERROR: OperationCode = 0x0001;

/// Size of [`OperationHeader`] on the wire.
pub const HEADER_LEN: usize = mem::size_of::<OperationCode>() + mem::size_of::<OperationLength>();

/// The common header in front of every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationHeader {
    pub op_code: OperationCode,
    pub length: OperationLength,
}

impl OperationHeader {
    /// Read the header at the start of `bytes`.
    ///
    /// Returns `None` if fewer than [`HEADER_LEN`] bytes are available.
    pub fn peek(bytes: &[u8]) -> Option<Self> {
        let op_code = bytes.get(..4)?.try_into().ok()?;
        let length = bytes.get(4..HEADER_LEN)?.try_into().ok()?;
        Some(Self {
            op_code: OperationCode::from_ne_bytes(op_code),
            length: OperationLength::from_ne_bytes(length),
        })
    }
}

/// Iterator over the operations contained in a filled buffer.
///
/// Operations are delimited solely by the `length` of their header, so unknown operation codes
/// are stepped over without knowledge of their layout. Iteration stops at a trailing fragment
/// shorter than a header, or at a header whose length is shorter than a header or runs past the
/// end of the data.
#[derive(Debug, Clone)]
pub struct Operations<'a> {
    bytes: &'a [u8],
}

impl<'a> Operations<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// The bytes not yet visited.
    pub fn remainder(&self) -> &'a [u8] {
        self.bytes
    }
}

impl<'a> Iterator for Operations<'a> {
    /// The header and the complete operation bytes, header included.
    type Item = (OperationHeader, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let header = OperationHeader::peek(self.bytes)?;
        let length = header.length as usize;
        if length < HEADER_LEN || length > self.bytes.len() {
            log::debug!(
                "Malformed operation 0x{:04X}: length {} with {} bytes left",
                header.op_code,
                length,
                self.bytes.len()
            );
            return None;
        }
        let (operation, rest) = self.bytes.split_at(length);
        self.bytes = rest;
        Some((header, operation))
    }
}
