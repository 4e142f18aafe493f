//! Memory bus: segmented address resolution, device dispatch and observers.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{EmulatorError, EmulatorErrorKind, EmulatorResult};

/// The address space is 20 bits wide; segment arithmetic wraps past it.
pub const PHYSICAL_ADDRESS_MASK: u32 = 0xF_FFFF;

/// Resolves a `segment:offset` pair into a 20-bit physical address.
pub fn physical_address(offset: u16, segment: u16) -> u32 {
    ((u32::from(segment) << 4) + u32::from(offset)) & PHYSICAL_ADDRESS_MASK
}

/// A device that can be mapped into the physical address space.
///
/// Addresses handed to a device are local to it, starting at zero. A
/// `size == 16` access is little-endian over two consecutive local bytes;
/// a word access that would cross the end of the device must fail with
/// [`EmulatorErrorKind::OutOfRange`].
pub trait MemoryDevice {
    fn read(&self, address: u32, size: u8) -> EmulatorResult<u16>;
    fn write(&mut self, address: u32, data: u16, size: u8) -> EmulatorResult<()>;
    fn size(&self) -> usize;
}

/// Receives bus traffic notifications, synchronously and in registration order.
///
/// Observers must not perform bus operations of their own; the bus is not
/// re-entrant.
pub trait MemoryObserver {
    fn on_read(&mut self, address: u32);
    fn on_write(&mut self, address: u32, data: u16);
}

struct Mapping {
    device: Rc<RefCell<dyn MemoryDevice>>,
    start: u32,
    end: u32
}

/// Dispatches segmented reads and writes to the mapped devices.
#[derive(Default)]
pub struct MemoryBus {
    mappings: Vec<Mapping>,
    observers: Vec<Rc<RefCell<dyn MemoryObserver>>>
}
impl MemoryBus {
    /// Creates a bus with no mapped devices.
    pub fn new() -> Self {
        MemoryBus {
            mappings: Vec::new(),
            observers: Vec::new()
        }
    }

    /// Maps `device` over the inclusive physical range `[start, end]`.
    ///
    /// # Errors
    /// Fails with [`EmulatorErrorKind::DeviceOverlap`] if the range
    /// intersects an existing mapping.
    pub fn attach_device(&mut self, device: Rc<RefCell<dyn MemoryDevice>>, start: u32, end: u32) -> EmulatorResult<()> {
        for mapping in &self.mappings {
            if start <= mapping.end && end >= mapping.start {
                return Err(EmulatorError::from(EmulatorErrorKind::DeviceOverlap));
            }
        }

        self.mappings.push(Mapping { device, start, end });
        Ok(())
    }

    /// Removes the mapping for `device`.
    ///
    /// # Errors
    /// Fails with [`EmulatorErrorKind::DeviceNotFound`] if the device is not
    /// attached.
    pub fn detach_device(&mut self, device: &Rc<RefCell<dyn MemoryDevice>>) -> EmulatorResult<()> {
        let position = self.mappings.iter()
            .position(|mapping| Rc::ptr_eq(&mapping.device, device));

        match position {
            Some(index) => {
                self.mappings.remove(index);
                Ok(())
            }
            None => Err(EmulatorError::from(EmulatorErrorKind::DeviceNotFound))
        }
    }

    /// Reads `size` bits from `segment:offset`.
    ///
    /// With `notify` set, observers are invoked before the value is returned
    /// to the caller.
    ///
    /// # Errors
    /// Fails with [`EmulatorErrorKind::OutOfRange`] when no device owns the
    /// target address.
    pub fn read(&self, offset: u16, segment: u16, size: u8, notify: bool) -> EmulatorResult<u16> {
        let physical = physical_address(offset, segment);

        for mapping in &self.mappings {
            if physical >= mapping.start && physical <= mapping.end {
                if notify {
                    for observer in &self.observers {
                        observer.borrow_mut().on_read(physical);
                    }
                }

                return mapping.device.borrow().read(physical - mapping.start, size);
            }
        }

        Err(EmulatorError::from(EmulatorErrorKind::OutOfRange))
    }

    /// Writes `size` bits of `data` to `segment:offset`.
    ///
    /// The device write happens first; with `notify` set, observers are
    /// invoked afterwards. The memory-editor view relies on this ordering.
    ///
    /// # Errors
    /// Fails with [`EmulatorErrorKind::OutOfRange`] when no device owns the
    /// target address.
    pub fn write(&mut self, offset: u16, data: u16, segment: u16, size: u8, notify: bool) -> EmulatorResult<()> {
        let physical = physical_address(offset, segment);

        for mapping in &self.mappings {
            if physical >= mapping.start && physical <= mapping.end {
                mapping.device.borrow_mut().write(physical - mapping.start, data, size)?;

                if notify {
                    for observer in &self.observers {
                        observer.borrow_mut().on_write(physical, data);
                    }
                }

                return Ok(());
            }
        }

        Err(EmulatorError::from(EmulatorErrorKind::OutOfRange))
    }

    /// Produces a flat byte image of the mapped ranges; unmapped bytes stay zero.
    pub fn dump_memory(&self, out: &mut Vec<u8>) -> EmulatorResult<()> {
        out.clear();
        out.resize(self.size(), 0);

        for mapping in &self.mappings {
            let length = (mapping.end - mapping.start + 1) as usize;
            let device = mapping.device.borrow();

            for i in 0..length {
                let index = mapping.start as usize + i;
                if index < out.len() {
                    out[index] = device.read(i as u32, 8)? as u8;
                }
            }
        }

        Ok(())
    }

    /// Returns the sum of the mapped range lengths in bytes.
    pub fn size(&self) -> usize {
        self.mappings.iter()
            .map(|mapping| (mapping.end - mapping.start + 1) as usize)
            .sum()
    }

    /// Appends an observer; it is invoked in registration order.
    pub fn register_observer(&mut self, observer: Rc<RefCell<dyn MemoryObserver>>) {
        self.observers.push(observer);
    }

    /// Removes a previously registered observer, if present.
    pub fn unregister_observer(&mut self, observer: &Rc<RefCell<dyn MemoryObserver>>) {
        self.observers.retain(|existing| !Rc::ptr_eq(existing, observer));
    }
}
