//! Row codec: CRC16-MODBUS over a row of resolved bytes.
//!
//! The checksum register starts at `0xFFFF` and uses the reflected
//! polynomial `0xA001`. The two checksum bytes are appended to the row in
//! the configured [`CrcOrder`].

use serde::{Deserialize, Serialize};
use std::fmt;

use super::format::{format_hex_compact, format_hex_spaced};

const CRC16_MODBUS_INIT: u16 = 0xFFFF;
const CRC16_MODBUS_POLY: u16 = 0xA001;

/// Compute the MODBUS CRC16 of `data`.
pub fn crc16_modbus(data: &[u8]) -> u16 {
    let mut crc = CRC16_MODBUS_INIT;
    for &byte in data {
        crc ^= byte as u16;
        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ CRC16_MODBUS_POLY;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// Which checksum byte is emitted first.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrcOrder {
    /// Low byte first (the MODBUS RTU wire order).
    #[default]
    LowFirst,
    HighFirst,
}

impl CrcOrder {
    /// Parse a byte order label. Accepts the canonical names plus a few
    /// aliases, including the Chinese labels found in older saved records.
    pub fn from_label(label: &str) -> Option<CrcOrder> {
        match label.trim().to_ascii_lowercase().as_str() {
            "low_first" | "low" | "little" | "lo" | "低位在前" => Some(CrcOrder::LowFirst),
            "high_first" | "high" | "big" | "hi" | "高位在前" => Some(CrcOrder::HighFirst),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CrcOrder::LowFirst => "low_first",
            CrcOrder::HighFirst => "high_first",
        }
    }

    /// Split a checksum into its two bytes in this order.
    pub fn split(self, crc: u16) -> [u8; 2] {
        let [low, high] = crc.to_le_bytes();
        match self {
            CrcOrder::LowFirst => [low, high],
            CrcOrder::HighFirst => [high, low],
        }
    }
}

impl fmt::Display for CrcOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One encoded row: its bytes plus the checksum in output order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RowOutput {
    /// 1-based row index.
    pub row: usize,
    pub bytes: Vec<u8>,
    pub crc: [u8; 2],
}

impl RowOutput {
    pub fn encode(row: usize, bytes: Vec<u8>, order: CrcOrder) -> RowOutput {
        let crc = order.split(crc16_modbus(&bytes));
        RowOutput { row, bytes, crc }
    }

    /// The checksum as four hex digits, e.g. `C5CD`.
    pub fn crc_hex(&self) -> String {
        format_hex_compact(&self.crc)
    }

    /// Row bytes followed by the checksum bytes.
    pub fn frame(&self) -> Vec<u8> {
        let mut frame = Vec::with_capacity(self.bytes.len() + 2);
        frame.extend_from_slice(&self.bytes);
        frame.extend_from_slice(&self.crc);
        frame
    }

    /// Display form: `01 03 00 00 00 0A C5 CD`.
    pub fn spaced_hex(&self) -> String {
        format_hex_spaced(&self.frame())
    }

    /// Copy/export form: `01030000000AC5CD`.
    pub fn compact_hex(&self) -> String {
        format_hex_compact(&self.frame())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const READ_HOLDING: [u8; 6] = [0x01, 0x03, 0x00, 0x00, 0x00, 0x0A];

    #[test]
    fn test_empty_input_leaves_seed() {
        assert_eq!(crc16_modbus(&[]), 0xFFFF);
        assert_eq!(CrcOrder::LowFirst.split(crc16_modbus(&[])), [0xFF, 0xFF]);
        assert_eq!(CrcOrder::HighFirst.split(crc16_modbus(&[])), [0xFF, 0xFF]);
    }

    #[test]
    fn test_known_vectors() {
        assert_eq!(crc16_modbus(&[0x00]), 0x40BF);
        assert_eq!(crc16_modbus(&READ_HOLDING), 0xCDC5);
        assert_eq!(crc16_modbus(&[0x11, 0x22, 0x33]), 0x7079);
        assert_eq!(crc16_modbus(&[0x01, 0x06, 0x00, 0x01, 0x00, 0x03]), 0x0B98);
    }

    #[test]
    fn test_orders_are_permutations() {
        for data in [&[][..], &[0x00][..], &READ_HOLDING[..], &[0xFF; 6][..]] {
            let crc = crc16_modbus(data);
            let mut low = CrcOrder::LowFirst.split(crc);
            low.reverse();
            assert_eq!(low, CrcOrder::HighFirst.split(crc));
        }
    }

    #[test]
    fn test_row_output_formats() {
        let row = RowOutput::encode(1, READ_HOLDING.to_vec(), CrcOrder::LowFirst);
        assert_eq!(row.crc, [0xC5, 0xCD]);
        assert_eq!(row.crc_hex(), "C5CD");
        assert_eq!(row.spaced_hex(), "01 03 00 00 00 0A C5 CD");
        assert_eq!(row.compact_hex(), "01030000000AC5CD");

        let row = RowOutput::encode(1, READ_HOLDING.to_vec(), CrcOrder::HighFirst);
        assert_eq!(row.crc_hex(), "CDC5");
        assert_eq!(row.spaced_hex(), "01 03 00 00 00 0A CD C5");
    }

    #[test]
    fn test_from_label_aliases() {
        assert_eq!(CrcOrder::from_label("low_first"), Some(CrcOrder::LowFirst));
        assert_eq!(CrcOrder::from_label(" Little "), Some(CrcOrder::LowFirst));
        assert_eq!(CrcOrder::from_label("低位在前"), Some(CrcOrder::LowFirst));
        assert_eq!(CrcOrder::from_label("HIGH_FIRST"), Some(CrcOrder::HighFirst));
        assert_eq!(CrcOrder::from_label("高位在前"), Some(CrcOrder::HighFirst));
        assert_eq!(CrcOrder::from_label("middle"), None);
    }
}
