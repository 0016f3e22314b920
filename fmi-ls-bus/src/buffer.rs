use bytes::BufMut;

use crate::{
    wire::{self, OperationLength, Operations},
    FmiLsBusError, LsBusOperation,
};

/// Append cursor over an externally owned FMI-LS-BUS buffer.
///
/// This is the Rust counterpart of the write side of `fmi3LsBusUtilBufferInfo`: the buffer memory
/// belongs to the caller (typically the binary variable of a bus terminal), while this struct only
/// tracks the write position and the outcome of the last write.
///
/// Operations are appended atomically: an operation that does not fit into the remaining space is
/// rejected without touching the buffer, and [`status`](Self::status) reports `false` until the
/// next write.
#[derive(Debug)]
pub struct LsBusBuffer<'a> {
    data: &'a mut [u8],
    write_pos: usize,
    status: bool,
}

impl<'a> LsBusBuffer<'a> {
    /// Wrap the buffer `data`, starting with an empty write position.
    ///
    /// Equivalent to `FMI3_LS_BUS_BUFFER_INFO_INIT`.
    pub fn new(data: &'a mut [u8]) -> Self {
        Self {
            data,
            write_pos: 0,
            status: true,
        }
    }

    /// Rewind the write position to the start of the buffer.
    ///
    /// The buffer content is left as is. Equivalent to `FMI3_LS_BUS_BUFFER_INFO_RESET`.
    pub fn reset(&mut self) {
        self.write_pos = 0;
        self.status = true;
    }

    /// Total size of the underlying buffer.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Number of bytes written so far.
    ///
    /// Equivalent to `FMI3_LS_BUS_BUFFER_LENGTH`.
    pub fn len(&self) -> usize {
        self.write_pos
    }

    /// Equivalent to `FMI3_LS_BUS_BUFFER_IS_EMPTY`.
    pub fn is_empty(&self) -> bool {
        self.write_pos == 0
    }

    /// Space left between the write position and the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.write_pos
    }

    /// Whether the most recent write succeeded.
    pub fn status(&self) -> bool {
        self.status
    }

    /// The bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.write_pos]
    }

    /// Iterate over the operations written so far.
    pub fn operations(&self) -> Operations<'_> {
        Operations::new(self.as_bytes())
    }

    /// Write raw data to the buffer, replacing existing content.
    ///
    /// Equivalent to `FMI3_LS_BUS_BUFFER_WRITE`.
    pub fn write(&mut self, data: &[u8]) -> Result<(), FmiLsBusError> {
        if data.len() > self.data.len() {
            self.status = false;
            return Err(FmiLsBusError::BufferOverflow {
                needed: data.len(),
                available: self.data.len(),
            });
        }

        self.data[..data.len()].copy_from_slice(data);
        self.write_pos = data.len();
        self.status = true;
        Ok(())
    }

    /// Append `op` at the write position.
    ///
    /// The full length of the operation is checked against the remaining space before anything is
    /// written. On failure the buffer and write position are unchanged and
    /// [`status`](Self::status) is `false`.
    pub fn write_operation<OP: LsBusOperation>(&mut self, op: &OP) -> Result<(), FmiLsBusError> {
        let result = self.append(op);
        self.status = result.is_ok();
        result
    }

    fn append<OP: LsBusOperation>(&mut self, op: &OP) -> Result<(), FmiLsBusError> {
        let payload = op.payload();
        if payload.len() > wire::DataLength::MAX as usize {
            log::debug!(
                "Rejected operation 0x{:04X}: payload of {} bytes",
                op.op_code(),
                payload.len()
            );
            return Err(FmiLsBusError::PayloadTooLarge(payload.len()));
        }

        let needed = op.encoded_len();
        let available = self.remaining();
        if needed > available {
            log::debug!(
                "Rejected operation 0x{:04X}: needs {needed} bytes, {available} available",
                op.op_code()
            );
            return Err(FmiLsBusError::BufferOverflow { needed, available });
        }

        let end = self.write_pos + needed;
        let mut dst = &mut self.data[self.write_pos..end];
        dst.put_u32_ne(op.op_code());
        dst.put_u32_ne(needed as OperationLength);
        op.put_fields(&mut dst);
        dst.put_slice(payload);
        debug_assert!(dst.is_empty(), "operation length mismatch");

        log::trace!(
            "Wrote operation 0x{:04X} ({needed} bytes) at {}",
            op.op_code(),
            self.write_pos
        );
        self.write_pos = end;
        Ok(())
    }
}
