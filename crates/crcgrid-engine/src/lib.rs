//! crcgrid_engine - Byte grid engine: cell naming, formulas, fixed-point
//! resolution and CRC16-MODBUS row encoding.

pub mod engine;
