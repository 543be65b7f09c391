use anyhow::{Context, Result};
use colored::*;
use serialport::SerialPortType;

/// List the serial ports currently visible on this machine.
pub fn list_ports() -> Result<()> {
    let ports = serialport::available_ports().context("Failed to enumerate serial ports")?;

    if ports.is_empty() {
        println!("{}", "[-] No serial ports found.".yellow());
        return Ok(());
    }

    println!("{}", "Available serial ports:".bold());
    for port in ports {
        let kind = match &port.port_type {
            SerialPortType::UsbPort(usb) => {
                let product = usb.product.as_deref().unwrap_or("USB serial device");
                format!("{} ({:04x}:{:04x})", product, usb.vid, usb.pid)
            }
            SerialPortType::PciPort => "PCI serial port".to_string(),
            SerialPortType::BluetoothPort => "Bluetooth serial port".to_string(),
            SerialPortType::Unknown => "serial port".to_string(),
        };
        println!("  {:<20} {}", port.port_name.cyan(), kind.dimmed());
    }
    Ok(())
}
