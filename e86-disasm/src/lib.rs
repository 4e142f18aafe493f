//! Static disassembler for the e86 instruction encoding.
//!
//! The disassembler walks the same memory bus as the CPU through byte-level
//! reads at segment zero, keeping a private address counter. Decoding is
//! table-driven from the same opcode space the executor dispatches on, so a
//! decoded instruction always spans exactly the bytes the executor would
//! consume.

pub mod token;

mod table;

use std::cell::RefCell;
use std::rc::Rc;

use e86_core::bus::MemoryBus;
use e86_core::error::EmulatorResult;
use e86_core::state::Modrm;

use crate::table::{group_index, Entry, Operand, EA_BASE, GROUP_TABLE, INSTR_TABLE, REG16_NAMES, REG8_NAMES};
use crate::token::{tokenize, Token};

/// One decoded instruction, ready for a listing view.
#[derive(Clone, Debug, Default)]
pub struct DisassembledInstruction {
    /// Physical address of the first byte.
    pub address: u32,
    /// The raw encoding, in fetch order.
    pub bytes: Vec<u8>,
    /// Classified display tokens.
    pub tokens: Vec<Token>,
    /// Whether a breakpoint is set on this address; filled in by the
    /// front end.
    pub breakpoint: bool
}

/// Decodes instruction streams into [`DisassembledInstruction`] records.
pub struct Disassembler {
    bus: Rc<RefCell<MemoryBus>>,
    instructions: Vec<DisassembledInstruction>,
    max_instr_bytes: u8,
    ip: u32,
    modrm: Modrm,
    current: DisassembledInstruction
}
impl Disassembler {
    /// Creates a disassembler reading from `bus`.
    pub fn new(bus: Rc<RefCell<MemoryBus>>) -> Self {
        Disassembler {
            bus,
            instructions: Vec::new(),
            max_instr_bytes: 0,
            ip: 0,
            modrm: Modrm::default(),
            current: DisassembledInstruction::default()
        }
    }

    /// Rebuilds the instruction list over `[start, end)`.
    ///
    /// Decoding a stream cut off mid-instruction at `end` is undefined; the
    /// final record may span past it.
    ///
    /// # Errors
    /// Surfaces bus errors from unmapped reads.
    pub fn disassemble(&mut self, start: u32, end: u32) -> EmulatorResult<()> {
        self.ip = start;
        self.max_instr_bytes = 0;
        self.instructions = Vec::new();

        while self.ip < end {
            self.current = DisassembledInstruction {
                address: self.ip,
                ..DisassembledInstruction::default()
            };

            let opcode = self.fetch()?;
            self.decode(opcode)?;

            if self.current.bytes.len() as u8 > self.max_instr_bytes {
                self.max_instr_bytes = self.current.bytes.len() as u8;
            }

            let record = std::mem::take(&mut self.current);
            self.instructions.push(record);
        }

        Ok(())
    }

    /// Number of decoded instructions.
    pub fn count(&self) -> usize {
        self.instructions.len()
    }

    /// The `index`th decoded instruction.
    pub fn get(&self, index: usize) -> Option<&DisassembledInstruction> {
        self.instructions.get(index)
    }

    /// Mutable access, so the front end can mark breakpoints.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut DisassembledInstruction> {
        self.instructions.get_mut(index)
    }

    /// All decoded instructions.
    pub fn instructions(&self) -> &[DisassembledInstruction] {
        &self.instructions[..]
    }

    /// Mutable view over all decoded instructions, so the front end can
    /// mark breakpoints in bulk.
    pub fn instructions_mut(&mut self) -> &mut [DisassembledInstruction] {
        &mut self.instructions[..]
    }

    /// Longest encoding seen by the last [`Self::disassemble`] call, for
    /// column alignment.
    pub fn max_instr_bytes(&self) -> u8 {
        self.max_instr_bytes
    }

    fn fetch(&mut self) -> EmulatorResult<u8> {
        let byte = self.bus.borrow().read(self.ip as u16, 0x0000, 8, false)? as u8;
        self.current.bytes.push(byte);
        self.ip += 1;
        Ok(byte)
    }

    fn fetch16(&mut self) -> EmulatorResult<u16> {
        let low = self.fetch()?;
        let high = self.fetch()?;
        Ok(u16::from(low) | (u16::from(high) << 8))
    }

    fn decode(&mut self, opcode: u8) -> EmulatorResult<()> {
        let primary = &INSTR_TABLE[opcode as usize];

        if primary.has_modrm {
            let byte = self.fetch()?;
            self.modrm = Modrm {
                mode: (byte & 0xC0) >> 6,
                reg: (byte & 0x38) >> 3,
                rm: byte & 0x07
            };
        }

        let entry = match group_index(opcode) {
            Some(group) => &GROUP_TABLE[group * 8 + self.modrm.reg as usize],
            None => primary
        };

        let line = self.render(entry)?;
        self.current.tokens = tokenize(&line);
        Ok(())
    }

    fn render(&mut self, entry: &Entry) -> EmulatorResult<String> {
        let first = self.operand(entry.operand1)?;
        let second = self.operand(entry.operand2)?;
        Ok(substitute(entry.mnemonic, &first, &second))
    }

    fn operand(&mut self, kind: Operand) -> EmulatorResult<String> {
        let text = match kind {
            Operand::None | Operand::Implied => String::new(),
            Operand::Rel8 => (self.fetch()? as i8).to_string(),
            Operand::Se8 => i16::from(self.fetch()? as i8).to_string(),
            Operand::I8 => self.fetch()?.to_string(),
            Operand::I16 => self.fetch16()?.to_string(),
            Operand::Rm8 => {
                if self.modrm.mode == 3 {
                    REG8_NAMES[self.modrm.rm as usize].to_string()
                } else {
                    format!("BYTE PTR {}", self.memory_operand()?)
                }
            }
            Operand::Rm16 => {
                if self.modrm.mode == 3 {
                    REG16_NAMES[self.modrm.rm as usize].to_string()
                } else {
                    format!("WORD PTR {}", self.memory_operand()?)
                }
            }
            Operand::R8 => REG8_NAMES[self.modrm.reg as usize].to_string(),
            Operand::R16 => REG16_NAMES[self.modrm.reg as usize].to_string(),
            Operand::Addr => format!("0x{:04X}", self.fetch16()?),
            Operand::SegAddr => {
                let offset = self.fetch16()?;
                let segment = self.fetch16()?;
                format!("0x{:04X}:0x{:04X}", segment, offset)
            }
        };

        Ok(text)
    }

    /// Renders the memory form of a ModR/M operand, fetching any
    /// displacement bytes it needs.
    fn memory_operand(&mut self) -> EmulatorResult<String> {
        let rm = self.modrm.rm as usize;

        let text = match self.modrm.mode {
            0 if rm == 6 => format!("[0x{:04X}]", self.fetch16()?),
            0 => format!("[{}]", EA_BASE[rm]),
            1 => {
                let displacement = i16::from(self.fetch()? as i8);
                format!("[{}{:+}]", EA_BASE[rm], displacement)
            }
            _ => format!("[{} + 0x{:04X}]", EA_BASE[rm], self.fetch16()?)
        };

        Ok(text)
    }
}

/// Fills the template's two `{}` slots in order; missing slots are ignored.
fn substitute(template: &str, first: &str, second: &str) -> String {
    let line = template.replacen("{}", first, 1);
    line.replacen("{}", second, 1)
}
