//! Fetch/decode/execute engine for the 8086 instruction set.

pub mod alu;
mod ops;

use std::cell::RefCell;
use std::rc::Rc;

use crate::breakpoint::BreakpointSet;
use crate::bus::MemoryBus;
use crate::error::EmulatorResult;
use crate::register::Segment;
use crate::state::{CpuState, Modrm, RepKind};
use crate::{BYTE, WORD};

pub(crate) type OpcodeHandler = fn(&mut Cpu) -> EmulatorResult<()>;

/// The processor: registers, flags, deferred prefix state and the dispatch
/// machinery, wired to a shared memory bus.
pub struct Cpu {
    state: CpuState,
    bus: Rc<RefCell<MemoryBus>>,
    breakpoints: BreakpointSet
}
impl Cpu {
    /// Creates a CPU attached to `bus`. The stack pointer starts at 0xFFFE;
    /// every other register and flag starts at zero.
    pub fn new(bus: Rc<RefCell<MemoryBus>>) -> Self {
        let mut state = CpuState::default();
        state.sp = 0xFFFE;

        Cpu {
            state,
            bus,
            breakpoints: BreakpointSet::new()
        }
    }

    /// Executes up to `count` instructions, then materializes a pending STI.
    ///
    /// A halted CPU executes nothing; HLT stops the batch early. The delayed
    /// interrupt-enable update runs after the batch either way, giving STI
    /// its documented one-instruction delay.
    pub fn cycles(&mut self, count: u32) -> EmulatorResult<()> {
        if !self.state.halted {
            self.execute_instructions(count)?;
        }

        if self.state.pending_interrupt_enable {
            self.state.flags.i = true;
            self.state.pending_interrupt_enable = false;
        }

        Ok(())
    }

    /// Returns a value copy of the register and flag state.
    pub fn snapshot(&self) -> CpuState {
        self.state.clone()
    }

    /// Read access to the live CPU state.
    pub fn state(&self) -> &CpuState {
        &self.state
    }

    /// Write access to the live CPU state, for front-end setup such as
    /// pointing CS:IP at a loaded image.
    pub fn state_mut(&mut self) -> &mut CpuState {
        &mut self.state
    }

    /// Adds or removes a breakpoint at a 20-bit physical address.
    ///
    /// The executor never consults the set; stepping policy belongs to the
    /// front end.
    pub fn set_breakpoint(&mut self, address: u32, enabled: bool) {
        self.breakpoints.set(address, enabled);
    }

    /// The current breakpoint set.
    pub fn breakpoints(&self) -> &BreakpointSet {
        &self.breakpoints
    }

    /// Delivers an interrupt: pushes flags, CS and IP, loads the handler
    /// address from the interrupt vector table at physical `vector * 4`,
    /// clears I and T, and resumes a halted CPU.
    pub fn interrupt(&mut self, vector: u8) -> EmulatorResult<()> {
        let flags = self.state.flags.get();
        self.push(flags)?;
        self.push(self.state.cs)?;
        self.push(self.state.ip)?;

        let entry = u16::from(vector) * 4;
        self.state.ip = self.bus_read(entry, 0x0000, WORD)?;
        self.state.cs = self.bus_read(entry.wrapping_add(2), 0x0000, WORD)?;

        self.state.flags.i = false;
        self.state.flags.t = false;
        self.state.halted = false;

        Ok(())
    }

    fn execute_instructions(&mut self, count: u32) -> EmulatorResult<()> {
        for _ in 0..count {
            if self.state.halted {
                break;
            }

            let opcode = self.fetch(BYTE)? as u8;
            self.state.opcode = opcode;
            self.state.operand_size = (opcode & 1) * 8 + 8;

            ops::OPCODE_TABLE[opcode as usize](self)?;

            if let Some(kind) = self.state.rep.take() {
                self.handle_rep(kind)?;
            }
        }

        Ok(())
    }

    /// Runs the string opcode following a repeat prefix in a CX-counted loop.
    ///
    /// CMPS and SCAS additionally stop once Z disagrees with the prefix's
    /// continue condition: 0xF3 stops on Z = 0, 0xF2 stops on Z = 1.
    fn handle_rep(&mut self, kind: RepKind) -> EmulatorResult<()> {
        let opcode = self.fetch(BYTE)? as u8;
        self.state.opcode = opcode;
        self.state.operand_size = (opcode & 1) * 8 + 8;

        let masked = opcode & 0xFE;
        let use_z_stop = masked == 0xA6 || masked == 0xAE;

        while self.state.c.word() != 0 {
            ops::OPCODE_TABLE[opcode as usize](self)?;
            self.state.c.set_word(self.state.c.word().wrapping_sub(1));

            if use_z_stop {
                let stop = match kind {
                    RepKind::WhileEqual => !self.state.flags.z,
                    RepKind::WhileNotEqual => self.state.flags.z
                };

                if stop {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Fetches `size` bits at CS:IP and advances IP.
    fn fetch(&mut self, size: u8) -> EmulatorResult<u16> {
        let data = self.bus_read(self.state.ip, self.state.cs, size)?;
        self.state.ip = self.state.ip.wrapping_add(u16::from(size / 8));
        Ok(data)
    }

    fn fetch_byte(&mut self) -> EmulatorResult<u8> {
        Ok(self.fetch(BYTE)? as u8)
    }

    fn fetch_word(&mut self) -> EmulatorResult<u16> {
        self.fetch(WORD)
    }

    fn fetch_modrm(&mut self) -> EmulatorResult<()> {
        let byte = self.fetch_byte()?;

        self.state.modrm = Modrm {
            mode: (byte & 0xC0) >> 6,
            reg: (byte & 0x38) >> 3,
            rm: byte & 0x07
        };

        Ok(())
    }

    /// Resolves the current ModR/M fields into an effective address and its
    /// implicit segment.
    ///
    /// A pending segment override is consumed here; it replaces the default
    /// segment only for DS-defaulting modes, while BP-based modes keep
    /// addressing the stack segment.
    fn effective_address(&mut self) -> EmulatorResult<()> {
        let overridden = self.state.seg_override.take()
            .map(|segment| self.segment_value(segment));
        let ds = overridden.unwrap_or(self.state.ds);

        let Modrm { mode, rm, .. } = self.state.modrm;

        if mode == 0 && rm == 6 {
            self.state.ea = self.fetch_word()?;
            self.state.seg = ds;
            return Ok(());
        }

        if mode == 3 {
            self.state.seg = ds;
            return Ok(());
        }

        let (base, segment) = match rm {
            0 => (self.state.b.word().wrapping_add(self.state.si), ds),
            1 => (self.state.b.word().wrapping_add(self.state.di), ds),
            2 => (self.state.bp.wrapping_add(self.state.si), self.state.ss),
            3 => (self.state.bp.wrapping_add(self.state.di), self.state.ss),
            4 => (self.state.si, ds),
            5 => (self.state.di, ds),
            6 => (self.state.bp, self.state.ss),
            _ => (self.state.b.word(), ds)
        };

        self.state.ea = base;
        self.state.seg = segment;

        if mode == 1 {
            let displacement = self.fetch_byte()? as i8;
            self.state.ea = self.state.ea.wrapping_add(displacement as u16);
        } else if mode == 2 {
            let displacement = self.fetch_word()?;
            self.state.ea = self.state.ea.wrapping_add(displacement);
        }

        Ok(())
    }

    fn segment_value(&self, segment: Segment) -> u16 {
        match segment {
            Segment::ES => self.state.es,
            Segment::CS => self.state.cs,
            Segment::SS => self.state.ss,
            Segment::DS => self.state.ds
        }
    }

    /// Reads the 16-bit register selected by a three-bit encoding.
    fn reg16(&self, index: u8) -> u16 {
        match index & 7 {
            0 => self.state.a.word(),
            1 => self.state.c.word(),
            2 => self.state.d.word(),
            3 => self.state.b.word(),
            4 => self.state.sp,
            5 => self.state.bp,
            6 => self.state.si,
            _ => self.state.di
        }
    }

    fn set_reg16(&mut self, index: u8, value: u16) {
        match index & 7 {
            0 => self.state.a.set_word(value),
            1 => self.state.c.set_word(value),
            2 => self.state.d.set_word(value),
            3 => self.state.b.set_word(value),
            4 => self.state.sp = value,
            5 => self.state.bp = value,
            6 => self.state.si = value,
            _ => self.state.di = value
        }
    }

    /// Reads the 8-bit register selected by a three-bit encoding: AL, CL,
    /// DL, BL, then AH, CH, DH, BH.
    fn reg8(&self, index: u8) -> u8 {
        match index & 7 {
            0 => self.state.a.low(),
            1 => self.state.c.low(),
            2 => self.state.d.low(),
            3 => self.state.b.low(),
            4 => self.state.a.high(),
            5 => self.state.c.high(),
            6 => self.state.d.high(),
            _ => self.state.b.high()
        }
    }

    fn set_reg8(&mut self, index: u8, value: u8) {
        match index & 7 {
            0 => self.state.a.set_low(value),
            1 => self.state.c.set_low(value),
            2 => self.state.d.set_low(value),
            3 => self.state.b.set_low(value),
            4 => self.state.a.set_high(value),
            5 => self.state.c.set_high(value),
            6 => self.state.d.set_high(value),
            _ => self.state.b.set_high(value)
        }
    }

    fn reg(&self, index: u8, size: u8) -> u16 {
        if size == 8 {
            u16::from(self.reg8(index))
        } else {
            self.reg16(index)
        }
    }

    fn set_reg(&mut self, index: u8, value: u16, size: u8) {
        if size == 8 {
            self.set_reg8(index, (value & 0xFF) as u8);
        } else {
            self.set_reg16(index, value);
        }
    }

    /// Reads the register-or-memory operand selected by the current ModR/M.
    fn read_rm(&self, size: u8) -> EmulatorResult<u16> {
        if self.state.modrm.mode == 3 {
            return Ok(self.reg(self.state.modrm.rm, size));
        }

        self.bus_read(self.state.ea, self.state.seg, size)
    }

    /// Writes back to the register-or-memory operand selected by the current
    /// ModR/M.
    fn write_rm(&mut self, data: u16, size: u8) -> EmulatorResult<()> {
        if self.state.modrm.mode == 3 {
            self.set_reg(self.state.modrm.rm, data, size);
            return Ok(());
        }

        self.bus_write(self.state.ea, data, self.state.seg, size)
    }

    fn push(&mut self, value: u16) -> EmulatorResult<()> {
        self.state.sp = self.state.sp.wrapping_sub(2);
        self.bus_write(self.state.sp, value, self.state.ss, WORD)
    }

    fn pop(&mut self) -> EmulatorResult<u16> {
        let value = self.bus_read(self.state.sp, self.state.ss, WORD)?;
        self.state.sp = self.state.sp.wrapping_add(2);
        Ok(value)
    }

    fn bus_read(&self, offset: u16, segment: u16, size: u8) -> EmulatorResult<u16> {
        self.bus.borrow().read(offset, segment, size, false)
    }

    fn bus_write(&mut self, offset: u16, data: u16, segment: u16, size: u8) -> EmulatorResult<()> {
        self.bus.borrow_mut().write(offset, data, segment, size, false)
    }
}
