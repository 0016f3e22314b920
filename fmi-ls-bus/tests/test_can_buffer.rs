use std::borrow::Cow;

use fmi_ls_bus::{
    can::{self, LsBusCanConfig, LsBusCanErrorCode, LsBusCanErrorFlag, LsBusCanOp},
    FmiLsBusError, FormatError, LsBusBuffer, LsBusOperation,
};

#[test_log::test]
fn test_sequential_append() {
    let mut memory = vec![0u8; can::DEFAULT_CAN_BUFFER_SIZE];
    let mut buffer = LsBusBuffer::new(&mut memory);

    let ops = [
        LsBusCanOp::Transmit {
            id: 0x123,
            ide: false,
            rtr: false,
            data: Cow::Borrowed(&[0, 1, 2, 3, 4, 5, 6, 7]),
        },
        LsBusCanOp::Configuration(LsBusCanConfig::FdBaudrate(2_000_000)),
        LsBusCanOp::BusError {
            id: 0x321,
            error_code: LsBusCanErrorCode::FormError,
            error_flag: LsBusCanErrorFlag::Primary,
            is_sender: false,
        },
    ];

    let mut expected_len = 0;
    for op in &ops {
        let before = buffer.len();
        buffer.write_operation(op).unwrap();
        assert_eq!(buffer.len() - before, op.encoded_len());
        expected_len += op.encoded_len();
    }
    assert_eq!(buffer.len(), expected_len);
    assert_eq!(expected_len, 24 + 13 + 15);

    let written: Vec<_> = buffer.operations().collect();
    assert_eq!(written.len(), ops.len());
    for ((header, bytes), op) in written.iter().zip(&ops) {
        assert_eq!(header.op_code, op.op_code());
        assert_eq!(header.length as usize, bytes.len());
        assert_eq!(bytes.len(), op.encoded_len());
    }

    let (_, transmit) = written[0];
    assert_eq!(&transmit[16..], &[0, 1, 2, 3, 4, 5, 6, 7]);
    let (_, config) = written[1];
    assert_eq!(config[8], 0x2);
    assert_eq!(&config[9..], &2_000_000u32.to_ne_bytes());
    let (_, bus_error) = written[2];
    assert_eq!(&bus_error[8..12], &0x321u32.to_ne_bytes());
    assert_eq!(&bus_error[12..], &[0x3, 0x1, 0x0]);
}

#[test_log::test]
fn test_fill_until_full_then_reset() {
    let mut memory = vec![0u8; 100];
    let mut buffer = LsBusBuffer::new(&mut memory);
    let frame = LsBusCanOp::FdTransmit {
        id: 0x10,
        ide: false,
        brs: true,
        esi: false,
        data: Cow::Borrowed(&[0xEE; 16]),
    };
    assert_eq!(frame.encoded_len(), 33);

    let mut accepted = 0;
    while buffer.write_operation(&frame).is_ok() {
        accepted += 1;
    }
    assert_eq!(accepted, 3);
    assert!(!buffer.status());
    assert_eq!(buffer.len(), 99);
    assert_eq!(buffer.remaining(), 1);

    // Not even a bare header fits into what is left.
    assert!(matches!(
        buffer.write_operation(&LsBusCanOp::Wakeup),
        Err(FmiLsBusError::BufferOverflow {
            needed: 8,
            available: 1
        })
    ));
    assert_eq!(buffer.operations().count(), 3);

    buffer.reset();
    assert!(buffer.status());
    assert!(buffer.is_empty());
    buffer.write_operation(&LsBusCanOp::Wakeup).unwrap();
    buffer.write_operation(&frame).unwrap();
    assert_eq!(buffer.len(), 8 + 33);
    assert_eq!(buffer.operations().count(), 2);
}

#[test_log::test]
fn test_echo_format_error() {
    let mut rx_memory = vec![0u8; 64];
    let mut rx = LsBusBuffer::new(&mut rx_memory);
    rx.write(&[0xFF, 0x00, 0x12]).unwrap();
    // Not even a full header, so nothing can be read.
    assert_eq!(rx.operations().count(), 0);

    let mut tx_memory = vec![0u8; 64];
    let mut tx = LsBusBuffer::new(&mut tx_memory);
    tx.write_operation(&FormatError {
        data: rx.as_bytes(),
    })
    .unwrap();

    let (header, bytes) = tx.operations().next().unwrap();
    assert_eq!(header.op_code, fmi_ls_bus::wire::OP_FORMAT_ERROR);
    assert_eq!(header.length, 13);
    assert_eq!(&bytes[10..], &[0xFF, 0x00, 0x12]);
}
