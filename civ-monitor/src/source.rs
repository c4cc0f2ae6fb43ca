//! Byte sources: hex text lines and serial ports

use serialport::{available_ports, SerialPortType};
use tracing::info;

use crate::error::MonitorError;

/// Parse one line of hex bytes
///
/// Accepts `FE FE E0 A4 11 10 FD`, `fefee0a41110fd` or `FE:FE:...`.
/// Text after `#` is a comment.
pub fn parse_hex_line(line: &str) -> Result<Vec<u8>, MonitorError> {
    let line = line.split('#').next().unwrap_or("");
    let digits: String = line
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':' && *c != ',')
        .collect();

    if digits.len() % 2 != 0 {
        return Err(MonitorError::InvalidHex(format!(
            "odd number of hex digits in {:?}",
            line.trim()
        )));
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            let pair = digits.get(i..i + 2).unwrap_or("");
            u8::from_str_radix(pair, 16)
                .map_err(|_| MonitorError::InvalidHex(format!("bad byte {pair:?}")))
        })
        .collect()
}

/// Log the serial ports present on this machine
pub fn list_ports() -> Result<Vec<String>, MonitorError> {
    let ports = available_ports()?;
    if ports.is_empty() {
        info!("No serial ports found");
    }

    Ok(ports
        .into_iter()
        .map(|p| {
            let desc = match &p.port_type {
                SerialPortType::UsbPort(usb) => usb.product.as_deref().unwrap_or("USB").to_string(),
                _ => "Unknown".to_string(),
            };
            format!("{} - {}", p.port_name, desc)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_spaced_hex() {
        assert_eq!(
            parse_hex_line("FE FE E0 A4 11 10 FD").unwrap(),
            vec![0xFE, 0xFE, 0xE0, 0xA4, 0x11, 0x10, 0xFD]
        );
    }

    #[test]
    fn test_packed_and_colon_hex() {
        assert_eq!(parse_hex_line("fefe").unwrap(), vec![0xFE, 0xFE]);
        assert_eq!(parse_hex_line("1c:00:01").unwrap(), vec![0x1C, 0x00, 0x01]);
    }

    #[test]
    fn test_comment_and_blank() {
        assert!(parse_hex_line("# capture from IC-705").unwrap().is_empty());
        assert!(parse_hex_line("   ").unwrap().is_empty());
        assert_eq!(parse_hex_line("11 10 # att on").unwrap(), vec![0x11, 0x10]);
    }

    #[test]
    fn test_invalid_hex() {
        assert!(matches!(parse_hex_line("FE F"), Err(MonitorError::InvalidHex(_))));
        assert!(matches!(parse_hex_line("ZZ"), Err(MonitorError::InvalidHex(_))));
        assert!(matches!(parse_hex_line("é1"), Err(MonitorError::InvalidHex(_))));
    }

    proptest! {
        #[test]
        fn parse_formatted_bytes(bytes in proptest::collection::vec(any::<u8>(), 0..32)) {
            let line = bytes
                .iter()
                .map(|b| format!("{b:02X}"))
                .collect::<Vec<_>>()
                .join(" ");
            prop_assert_eq!(parse_hex_line(&line).unwrap(), bytes);
        }
    }
}
