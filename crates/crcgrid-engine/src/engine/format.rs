use super::cell_name::CellClass;

/// Format bytes as two-digit uppercase hex separated by single spaces.
pub fn format_hex_spaced(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format bytes as uppercase hex with no separators.
pub fn format_hex_compact(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

/// Format a single cell value for display: decimal for `A` cells, two hex
/// digits for `B` cells.
pub fn format_byte(value: u8, class: CellClass) -> String {
    match class {
        CellClass::Decimal => value.to_string(),
        CellClass::Formula => format!("{:02X}", value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_forms() {
        assert_eq!(format_hex_spaced(&[]), "");
        assert_eq!(format_hex_spaced(&[0x0a, 0xff, 0x00]), "0A FF 00");
        assert_eq!(format_hex_compact(&[0x0a, 0xff, 0x00]), "0AFF00");
    }

    #[test]
    fn test_byte_follows_cell_class() {
        assert_eq!(format_byte(10, CellClass::Formula), "0A");
        assert_eq!(format_byte(10, CellClass::Decimal), "10");
        assert_eq!(format_byte(255, CellClass::Decimal), "255");
    }
}
