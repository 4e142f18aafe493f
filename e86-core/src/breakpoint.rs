//! Breakpoint membership set consulted by front ends.

/// An unordered set of 20-bit physical addresses.
///
/// The executor never reads this set; stepping policy belongs to the
/// front end driving it.
#[derive(Clone, Debug, Default)]
pub struct BreakpointSet {
    addresses: Vec<u32>
}
impl BreakpointSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        BreakpointSet { addresses: Vec::new() }
    }

    /// Adds or removes `address` according to `enabled`.
    pub fn set(&mut self, address: u32, enabled: bool) {
        let position = self.addresses.iter().position(|&a| a == address);

        match (position, enabled) {
            (None, true) => self.addresses.push(address),
            (Some(index), false) => { self.addresses.swap_remove(index); },
            _ => {}
        }
    }

    /// Returns whether `address` is in the set.
    pub fn contains(&self, address: u32) -> bool {
        self.addresses.iter().any(|&a| a == address)
    }

    /// Iterates over the addresses in the set, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.addresses.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}
