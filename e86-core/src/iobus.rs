//! Port-mapped I/O bus.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{EmulatorError, EmulatorErrorKind, EmulatorResult};

/// A device claiming an inclusive range of 16-bit ports.
pub trait IoDevice {
    fn start_port(&self) -> u16;
    fn end_port(&self) -> u16;

    fn read(&self, port: u16, size: u8) -> u16;
    fn write(&mut self, port: u16, data: u16, size: u8);

    fn uses_port(&self, port: u16) -> bool {
        port >= self.start_port() && port <= self.end_port()
    }
}

/// Dispatches port reads and writes to the attached devices.
///
/// Unmapped reads return 0 and unmapped writes are dropped, matching
/// open-bus behavior on real hardware.
#[derive(Default)]
pub struct IoBus {
    devices: Vec<Rc<RefCell<dyn IoDevice>>>
}
impl IoBus {
    /// Creates a bus with no attached devices.
    pub fn new() -> Self {
        IoBus { devices: Vec::new() }
    }

    /// Attaches a device.
    ///
    /// # Errors
    /// Fails with [`EmulatorErrorKind::DeviceOverlap`] if the device's port
    /// range intersects an already attached device.
    pub fn attach_device(&mut self, device: Rc<RefCell<dyn IoDevice>>) -> EmulatorResult<()> {
        let start = device.borrow().start_port();
        let end = device.borrow().end_port();

        for existing in &self.devices {
            let existing = existing.borrow();
            if start <= existing.end_port() && end >= existing.start_port() {
                return Err(EmulatorError::from(EmulatorErrorKind::DeviceOverlap));
            }
        }

        self.devices.push(device);
        Ok(())
    }

    /// Detaches a device.
    ///
    /// # Errors
    /// Fails with [`EmulatorErrorKind::DeviceNotFound`] if the device is not
    /// attached.
    pub fn detach_device(&mut self, device: &Rc<RefCell<dyn IoDevice>>) -> EmulatorResult<()> {
        let position = self.devices.iter()
            .position(|existing| Rc::ptr_eq(existing, device));

        match position {
            Some(index) => {
                self.devices.remove(index);
                Ok(())
            }
            None => Err(EmulatorError::from(EmulatorErrorKind::DeviceNotFound))
        }
    }

    /// Reads `size` bits from `port`; unmapped ports read as zero.
    pub fn read(&self, port: u16, size: u8) -> u16 {
        for device in &self.devices {
            let device = device.borrow();
            if device.uses_port(port) {
                return device.read(port, size);
            }
        }

        0x0000
    }

    /// Writes `size` bits of `data` to `port`; unmapped ports drop the write.
    pub fn write(&self, port: u16, data: u16, size: u8) {
        for device in &self.devices {
            if device.borrow().uses_port(port) {
                device.borrow_mut().write(port, data, size);
                return;
            }
        }
    }
}
