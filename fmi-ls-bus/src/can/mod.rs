//! CAN, CAN FD and CAN XL operations of the FMI-LS-BUS CAN layer.

use std::{borrow::Cow, mem};

use bytes::BufMut;

use crate::{
    wire::{DataLength, OperationCode},
    FmiLsBusError, LsBusOperation,
};


/// MIME type for FMI-LS-BUS CAN payloads.
pub const CAN_MIME_TYPE: &str =
    "application/org.fmi-standard.fmi-ls-bus.can; version=\"1.0.0-beta.1\"";

/// Default maximum CAN bus buffer size.
pub const DEFAULT_CAN_BUFFER_SIZE: usize = 2048;

pub const OP_CAN_TRANSMIT: OperationCode = 0x0010;
pub const OP_CANFD_TRANSMIT: OperationCode = 0x0011;
pub const OP_CANXL_TRANSMIT: OperationCode = 0x0012;
pub const OP_CONFIRM: OperationCode = 0x0020;
pub const OP_ARBITRATION_LOST: OperationCode = 0x0030;
pub const OP_BUS_ERROR: OperationCode = 0x0031;
pub const OP_CONFIGURATION: OperationCode = 0x0040;
pub const OP_STATUS: OperationCode = 0x0041;
pub const OP_WAKEUP: OperationCode = 0x0042;

/// CAN message identifier (11 or 29 bit).
pub type LsBusCanId = u32;
/// Bit rate in bit/s.
pub type LsBusCanBaudrate = u32;
/// CAN XL SDU type.
pub type LsBusCanSdt = u8;
/// CAN XL virtual CAN network ID.
pub type LsBusCanVcId = u8;
/// CAN XL acceptance field.
pub type LsBusCanAf = u32;

const ID_LEN: usize = mem::size_of::<LsBusCanId>();
const FLAG_LEN: usize = mem::size_of::<u8>();
const DATA_LENGTH_LEN: usize = mem::size_of::<DataLength>();

/// CAN bus operations that can be transmitted over FMI-LS-BUS.
///
/// This enum represents the different types of CAN operations that can be
/// serialized and transmitted between FMUs using the FMI-LS-BUS interface.
///
/// # Example
///
/// Appending a basic CAN message:
///
/// ```rust
/// use fmi_ls_bus::{LsBusBuffer, can::{self, LsBusCanOp}};
/// use std::borrow::Cow;
///
/// let mut memory = vec![0u8; can::DEFAULT_CAN_BUFFER_SIZE];
/// let mut buffer = LsBusBuffer::new(&mut memory);
///
/// buffer.write_operation(&LsBusCanOp::Transmit {
///     id: 0x123,
///     ide: false, // Standard ID
///     rtr: false, // Data frame
///     data: Cow::Borrowed(b"Hello"),
/// }).unwrap();
///
/// let (header, _) = buffer.operations().next().unwrap();
/// assert_eq!(header.op_code, can::OP_CAN_TRANSMIT);
/// assert_eq!(header.length, 21);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LsBusCanOp<'a> {
    /// CAN transmit operation
    Transmit {
        id: LsBusCanId,
        /// Extended (29 bit) identifier
        ide: bool,
        /// Remote transmission request
        rtr: bool,
        data: Cow<'a, [u8]>,
    },
    /// CAN FD transmit operation
    FdTransmit {
        id: LsBusCanId,
        ide: bool,
        /// Bit rate switch
        brs: bool,
        /// Error state indicator
        esi: bool,
        data: Cow<'a, [u8]>,
    },
    /// CAN XL transmit operation
    XlTransmit {
        id: LsBusCanId,
        ide: bool,
        /// Simple extended content
        sec: bool,
        sdt: LsBusCanSdt,
        vcid: LsBusCanVcId,
        af: LsBusCanAf,
        data: Cow<'a, [u8]>,
    },
    /// CAN confirm operation
    Confirm(LsBusCanId),
    /// CAN configuration operation
    Configuration(LsBusCanConfig),
    /// CAN arbitration lost operation
    ArbitrationLost { id: LsBusCanId },
    /// CAN bus error operation
    BusError {
        id: LsBusCanId,
        error_code: LsBusCanErrorCode,
        error_flag: LsBusCanErrorFlag,
        /// Whether the error occurred in response to a transmission of this FMU
        is_sender: bool,
    },
    /// CAN status operation
    Status(LsBusCanStatusKind),
    /// CAN wakeup operation
    Wakeup,
}

/// The parameter carried by a CAN configuration operation.
///
/// Only the selected value is encoded, so the length of the operation depends on the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LsBusCanConfig {
    /// CAN baud rate setting
    Baudrate(LsBusCanBaudrate),
    /// CAN FD baud rate setting
    FdBaudrate(LsBusCanBaudrate),
    /// CAN XL baud rate setting
    XlBaudrate(LsBusCanBaudrate),
    /// Arbitration lost behavior setting
    ArbitrationLostBehavior(LsBusCanArbitrationLostBehavior),
}

impl LsBusCanConfig {
    pub fn parameter_type(&self) -> LsBusCanConfigParameterType {
        match self {
            LsBusCanConfig::Baudrate(_) => LsBusCanConfigParameterType::CanBaudrate,
            LsBusCanConfig::FdBaudrate(_) => LsBusCanConfigParameterType::CanFdBaudrate,
            LsBusCanConfig::XlBaudrate(_) => LsBusCanConfigParameterType::CanXlBaudrate,
            LsBusCanConfig::ArbitrationLostBehavior(_) => {
                LsBusCanConfigParameterType::ArbitrationLostBehavior
            }
        }
    }

    fn value_len(&self) -> usize {
        match self {
            LsBusCanConfig::Baudrate(_)
            | LsBusCanConfig::FdBaudrate(_)
            | LsBusCanConfig::XlBaudrate(_) => mem::size_of::<LsBusCanBaudrate>(),
            LsBusCanConfig::ArbitrationLostBehavior(_) => {
                mem::size_of::<LsBusCanArbitrationLostBehavior>()
            }
        }
    }

    fn put_value<B: BufMut>(&self, dst: &mut B) {
        match *self {
            LsBusCanConfig::Baudrate(baudrate)
            | LsBusCanConfig::FdBaudrate(baudrate)
            | LsBusCanConfig::XlBaudrate(baudrate) => dst.put_u32_ne(baudrate),
            LsBusCanConfig::ArbitrationLostBehavior(behavior) => dst.put_u8(behavior as u8),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LsBusCanConfigParameterType {
    CanBaudrate = 0x1,
    CanFdBaudrate = 0x2,
    CanXlBaudrate = 0x3,
    ArbitrationLostBehavior = 0x4,
}

impl TryFrom<u8> for LsBusCanConfigParameterType {
    type Error = FmiLsBusError;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x1 => Ok(LsBusCanConfigParameterType::CanBaudrate),
            0x2 => Ok(LsBusCanConfigParameterType::CanFdBaudrate),
            0x3 => Ok(LsBusCanConfigParameterType::CanXlBaudrate),
            0x4 => Ok(LsBusCanConfigParameterType::ArbitrationLostBehavior),
            _ => Err(FmiLsBusError::InvalidVariant(value as u32)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LsBusCanArbitrationLostBehavior {
    /// On arbitration lost, buffer the message and retransmit later.
    BufferAndRetransmit = 0x1,
    /// On arbitration lost, discard the message and notify the user.
    DiscardAndNotify = 0x2,
}

impl TryFrom<u8> for LsBusCanArbitrationLostBehavior {
    type Error = FmiLsBusError;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x1 => Ok(LsBusCanArbitrationLostBehavior::BufferAndRetransmit),
            0x2 => Ok(LsBusCanArbitrationLostBehavior::DiscardAndNotify),
            _ => Err(FmiLsBusError::InvalidVariant(value as u32)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LsBusCanErrorCode {
    /// Represents a CAN bus error of type 'BIT_ERROR'.
    BitError = 0x1,
    /// Represents a CAN bus error of type 'BIT_STUFFING_ERROR'.
    BitStuffingError = 0x2,
    /// Represents a CAN bus error of type 'FORM_ERROR'.
    FormError = 0x3,
    /// Represents a CAN bus error of type 'CRC_ERROR'.
    CrcError = 0x4,
    /// Represents a CAN bus error of type 'ACK_ERROR'.
    AckError = 0x5,
    /// Represents a CAN bus error of type 'BROKEN_ERROR_FRAME'.
    BrokenErrorFrame = 0x6,
}

impl TryFrom<u8> for LsBusCanErrorCode {
    type Error = FmiLsBusError;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x1 => Ok(LsBusCanErrorCode::BitError),
            0x2 => Ok(LsBusCanErrorCode::BitStuffingError),
            0x3 => Ok(LsBusCanErrorCode::FormError),
            0x4 => Ok(LsBusCanErrorCode::CrcError),
            0x5 => Ok(LsBusCanErrorCode::AckError),
            0x6 => Ok(LsBusCanErrorCode::BrokenErrorFrame),
            _ => Err(FmiLsBusError::InvalidVariant(value as u32)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LsBusCanErrorFlag {
    /// Indicates that a specified Network FMU is detecting the given Bus Error first.
    Primary = 0x1,

    /// Indicates that a specified Network FMU is reacting on a Bus Error and does not detect it.
    Secondary = 0x2,
}

impl TryFrom<u8> for LsBusCanErrorFlag {
    type Error = FmiLsBusError;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x1 => Ok(LsBusCanErrorFlag::Primary),
            0x2 => Ok(LsBusCanErrorFlag::Secondary),
            _ => Err(FmiLsBusError::InvalidVariant(value as u32)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LsBusCanStatusKind {
    /// Indicates that the CAN node is in state 'ERROR_ACTIVE'.
    ErrorActive = 0x1,
    /// Indicates that the CAN node is in state 'ERROR_PASSIVE'.
    ErrorPassive = 0x2,
    /// Indicates that the CAN node is in state 'BUS_OFF'.
    BusOff = 0x3,
}

impl TryFrom<u8> for LsBusCanStatusKind {
    type Error = FmiLsBusError;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x1 => Ok(LsBusCanStatusKind::ErrorActive),
            0x2 => Ok(LsBusCanStatusKind::ErrorPassive),
            0x3 => Ok(LsBusCanStatusKind::BusOff),
            _ => Err(FmiLsBusError::InvalidVariant(value as u32)),
        }
    }
}

impl LsBusOperation for LsBusCanOp<'_> {
    fn op_code(&self) -> OperationCode {
        match self {
            LsBusCanOp::Transmit { .. } => OP_CAN_TRANSMIT,
            LsBusCanOp::FdTransmit { .. } => OP_CANFD_TRANSMIT,
            LsBusCanOp::XlTransmit { .. } => OP_CANXL_TRANSMIT,
            LsBusCanOp::Confirm(_) => OP_CONFIRM,
            LsBusCanOp::Configuration(_) => OP_CONFIGURATION,
            LsBusCanOp::ArbitrationLost { .. } => OP_ARBITRATION_LOST,
            LsBusCanOp::BusError { .. } => OP_BUS_ERROR,
            LsBusCanOp::Status(_) => OP_STATUS,
            LsBusCanOp::Wakeup => OP_WAKEUP,
        }
    }

    fn fields_len(&self) -> usize {
        match self {
            // id, ide, rtr, dataLength
            LsBusCanOp::Transmit { .. } => ID_LEN + 2 * FLAG_LEN + DATA_LENGTH_LEN,
            // id, ide, brs, esi, dataLength
            LsBusCanOp::FdTransmit { .. } => ID_LEN + 3 * FLAG_LEN + DATA_LENGTH_LEN,
            // id, ide, sec, sdt, vcid, af, dataLength
            LsBusCanOp::XlTransmit { .. } => {
                ID_LEN
                    + 2 * FLAG_LEN
                    + mem::size_of::<LsBusCanSdt>()
                    + mem::size_of::<LsBusCanVcId>()
                    + mem::size_of::<LsBusCanAf>()
                    + DATA_LENGTH_LEN
            }
            LsBusCanOp::Confirm(_) | LsBusCanOp::ArbitrationLost { .. } => ID_LEN,
            LsBusCanOp::Configuration(config) => {
                mem::size_of::<LsBusCanConfigParameterType>() + config.value_len()
            }
            // id, errorCode, errorFlag, isSender
            LsBusCanOp::BusError { .. } => {
                ID_LEN
                    + mem::size_of::<LsBusCanErrorCode>()
                    + mem::size_of::<LsBusCanErrorFlag>()
                    + FLAG_LEN
            }
            LsBusCanOp::Status(_) => mem::size_of::<LsBusCanStatusKind>(),
            LsBusCanOp::Wakeup => 0,
        }
    }

    fn put_fields<B: BufMut>(&self, dst: &mut B) {
        match self {
            LsBusCanOp::Transmit { id, ide, rtr, data } => {
                dst.put_u32_ne(*id);
                dst.put_u8(*ide as u8);
                dst.put_u8(*rtr as u8);
                dst.put_u16_ne(data.len() as DataLength);
            }
            LsBusCanOp::FdTransmit {
                id,
                ide,
                brs,
                esi,
                data,
            } => {
                dst.put_u32_ne(*id);
                dst.put_u8(*ide as u8);
                dst.put_u8(*brs as u8);
                dst.put_u8(*esi as u8);
                dst.put_u16_ne(data.len() as DataLength);
            }
            LsBusCanOp::XlTransmit {
                id,
                ide,
                sec,
                sdt,
                vcid,
                af,
                data,
            } => {
                dst.put_u32_ne(*id);
                dst.put_u8(*ide as u8);
                dst.put_u8(*sec as u8);
                dst.put_u8(*sdt);
                dst.put_u8(*vcid);
                dst.put_u32_ne(*af);
                dst.put_u16_ne(data.len() as DataLength);
            }
            LsBusCanOp::Confirm(id) | LsBusCanOp::ArbitrationLost { id } => dst.put_u32_ne(*id),
            LsBusCanOp::Configuration(config) => {
                dst.put_u8(config.parameter_type() as u8);
                config.put_value(dst);
            }
            LsBusCanOp::BusError {
                id,
                error_code,
                error_flag,
                is_sender,
            } => {
                dst.put_u32_ne(*id);
                dst.put_u8(*error_code as u8);
                dst.put_u8(*error_flag as u8);
                dst.put_u8(*is_sender as u8);
            }
            LsBusCanOp::Status(kind) => dst.put_u8(*kind as u8),
            LsBusCanOp::Wakeup => {}
        }
    }

    fn payload(&self) -> &[u8] {
        match self {
            LsBusCanOp::Transmit { data, .. }
            | LsBusCanOp::FdTransmit { data, .. }
            | LsBusCanOp::XlTransmit { data, .. } => &data[..],
            _ => &[],
        }
    }
}
