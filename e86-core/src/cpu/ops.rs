//! Opcode handlers and the 256-entry dispatch table.

use crate::cpu::{alu, Cpu, OpcodeHandler};
use crate::error::EmulatorResult;
use crate::register::Segment;
use crate::state::RepKind;
use crate::{BYTE, WORD};

/// One handler per opcode byte. Reserved and unimplemented encodings point
/// at [`Cpu::nop`], which matches how the silicon quietly executes them.
pub(super) static OPCODE_TABLE: [OpcodeHandler; 256] = [
    // 0x00 - 0x0F
    Cpu::add_rm_r, Cpu::add_rm_r, Cpu::add_r_rm, Cpu::add_r_rm,
    Cpu::add_acc_imm, Cpu::add_acc_imm, Cpu::push_es, Cpu::pop_es,
    Cpu::or_rm_r, Cpu::or_rm_r, Cpu::or_r_rm, Cpu::or_r_rm,
    Cpu::or_acc_imm, Cpu::or_acc_imm, Cpu::nop, Cpu::nop,
    // 0x10 - 0x1F
    Cpu::adc_rm_r, Cpu::adc_rm_r, Cpu::adc_r_rm, Cpu::adc_r_rm,
    Cpu::adc_acc_imm, Cpu::adc_acc_imm, Cpu::push_ss, Cpu::pop_ss,
    Cpu::sbb_rm_r, Cpu::sbb_rm_r, Cpu::sbb_r_rm, Cpu::sbb_r_rm,
    Cpu::sbb_acc_imm, Cpu::sbb_acc_imm, Cpu::push_ds, Cpu::pop_ds,
    // 0x20 - 0x2F
    Cpu::and_rm_r, Cpu::and_rm_r, Cpu::and_r_rm, Cpu::and_r_rm,
    Cpu::and_acc_imm, Cpu::and_acc_imm, Cpu::segment_override, Cpu::daa,
    Cpu::sub_rm_r, Cpu::sub_rm_r, Cpu::sub_r_rm, Cpu::sub_r_rm,
    Cpu::sub_acc_imm, Cpu::sub_acc_imm, Cpu::segment_override, Cpu::das,
    // 0x30 - 0x3F
    Cpu::xor_rm_r, Cpu::xor_rm_r, Cpu::xor_r_rm, Cpu::xor_r_rm,
    Cpu::xor_acc_imm, Cpu::xor_acc_imm, Cpu::segment_override, Cpu::aaa,
    Cpu::cmp_rm_r, Cpu::cmp_rm_r, Cpu::cmp_r_rm, Cpu::cmp_r_rm,
    Cpu::cmp_acc_imm, Cpu::cmp_acc_imm, Cpu::segment_override, Cpu::aas,
    // 0x40 - 0x4F
    Cpu::inc_r16, Cpu::inc_r16, Cpu::inc_r16, Cpu::inc_r16,
    Cpu::inc_r16, Cpu::inc_r16, Cpu::inc_r16, Cpu::inc_r16,
    Cpu::dec_r16, Cpu::dec_r16, Cpu::dec_r16, Cpu::dec_r16,
    Cpu::dec_r16, Cpu::dec_r16, Cpu::dec_r16, Cpu::dec_r16,
    // 0x50 - 0x5F
    Cpu::push_r16, Cpu::push_r16, Cpu::push_r16, Cpu::push_r16,
    Cpu::push_r16, Cpu::push_r16, Cpu::push_r16, Cpu::push_r16,
    Cpu::pop_r16, Cpu::pop_r16, Cpu::pop_r16, Cpu::pop_r16,
    Cpu::pop_r16, Cpu::pop_r16, Cpu::pop_r16, Cpu::pop_r16,
    // 0x60 - 0x6F: reserved on the 8086
    Cpu::nop, Cpu::nop, Cpu::nop, Cpu::nop,
    Cpu::nop, Cpu::nop, Cpu::nop, Cpu::nop,
    Cpu::nop, Cpu::nop, Cpu::nop, Cpu::nop,
    Cpu::nop, Cpu::nop, Cpu::nop, Cpu::nop,
    // 0x70 - 0x7F
    Cpu::jcc_rel8, Cpu::jcc_rel8, Cpu::jcc_rel8, Cpu::jcc_rel8,
    Cpu::jcc_rel8, Cpu::jcc_rel8, Cpu::jcc_rel8, Cpu::jcc_rel8,
    Cpu::jcc_rel8, Cpu::jcc_rel8, Cpu::jcc_rel8, Cpu::jcc_rel8,
    Cpu::jcc_rel8, Cpu::jcc_rel8, Cpu::jcc_rel8, Cpu::jcc_rel8,
    // 0x80 - 0x8F
    Cpu::group_80, Cpu::group_81, Cpu::group_80, Cpu::group_83,
    Cpu::test_rm_r, Cpu::test_rm_r, Cpu::xchg_r_rm, Cpu::xchg_r_rm,
    Cpu::mov_rm_r, Cpu::mov_rm_r, Cpu::mov_r_rm, Cpu::mov_r_rm,
    Cpu::group_8c, Cpu::lea_r16_rm16, Cpu::group_8e, Cpu::group_8f,
    // 0x90 - 0x9F
    Cpu::nop, Cpu::xchg_ax_r16, Cpu::xchg_ax_r16, Cpu::xchg_ax_r16,
    Cpu::xchg_ax_r16, Cpu::xchg_ax_r16, Cpu::xchg_ax_r16, Cpu::xchg_ax_r16,
    Cpu::cbw, Cpu::cwd, Cpu::call_far, Cpu::nop,
    Cpu::pushf, Cpu::popf, Cpu::sahf, Cpu::lahf,
    // 0xA0 - 0xAF
    Cpu::mov_acc_moffs, Cpu::mov_acc_moffs, Cpu::mov_moffs_acc, Cpu::mov_moffs_acc,
    Cpu::movs, Cpu::movs, Cpu::cmps, Cpu::cmps,
    Cpu::test_acc_imm, Cpu::test_acc_imm, Cpu::stos, Cpu::stos,
    Cpu::lods, Cpu::lods, Cpu::scas, Cpu::scas,
    // 0xB0 - 0xBF
    Cpu::mov_r8_imm, Cpu::mov_r8_imm, Cpu::mov_r8_imm, Cpu::mov_r8_imm,
    Cpu::mov_r8_imm, Cpu::mov_r8_imm, Cpu::mov_r8_imm, Cpu::mov_r8_imm,
    Cpu::mov_r16_imm, Cpu::mov_r16_imm, Cpu::mov_r16_imm, Cpu::mov_r16_imm,
    Cpu::mov_r16_imm, Cpu::mov_r16_imm, Cpu::mov_r16_imm, Cpu::mov_r16_imm,
    // 0xC0 - 0xCF
    Cpu::nop, Cpu::nop, Cpu::ret_imm, Cpu::ret,
    Cpu::les_r16_m16, Cpu::lds_r16_m16, Cpu::group_c6, Cpu::group_c7,
    Cpu::nop, Cpu::nop, Cpu::retf_imm, Cpu::retf,
    Cpu::int3, Cpu::int_imm8, Cpu::into_overflow, Cpu::iret,
    // 0xD0 - 0xDF
    Cpu::group_shift_1, Cpu::group_shift_1, Cpu::group_shift_cl, Cpu::group_shift_cl,
    Cpu::aam, Cpu::aad, Cpu::nop, Cpu::xlat,
    Cpu::nop, Cpu::nop, Cpu::nop, Cpu::nop,
    Cpu::nop, Cpu::nop, Cpu::nop, Cpu::nop,
    // 0xE0 - 0xEF
    Cpu::loopne_rel8, Cpu::loope_rel8, Cpu::loop_rel8, Cpu::jcxz_rel8,
    Cpu::in_acc_imm8, Cpu::in_acc_imm8, Cpu::out_imm8_acc, Cpu::out_imm8_acc,
    Cpu::call_rel16, Cpu::jmp_rel16, Cpu::jmp_far, Cpu::jmp_rel8,
    Cpu::nop, Cpu::nop, Cpu::nop, Cpu::nop,
    // 0xF0 - 0xFF
    Cpu::nop, Cpu::nop, Cpu::repne, Cpu::rep,
    Cpu::hlt, Cpu::cmc, Cpu::group_unary, Cpu::group_unary,
    Cpu::clc, Cpu::stc, Cpu::cli, Cpu::sti,
    Cpu::cld, Cpu::std, Cpu::group_fe, Cpu::group_ff
];

impl Cpu {
    fn nop(&mut self) -> EmulatorResult<()> {
        Ok(())
    }

    /* Two-operand ALU families */

    fn binop_rm_r(&mut self, op: alu::BinaryOp) -> EmulatorResult<()> {
        let size = self.state.operand_size;
        self.fetch_modrm()?;
        self.effective_address()?;

        let destination = self.read_rm(size)?;
        let source = self.reg(self.state.modrm.reg, size);
        let result = op(destination, source, size, &mut self.state.flags);

        self.write_rm(result, size)
    }

    fn binop_r_rm(&mut self, op: alu::BinaryOp) -> EmulatorResult<()> {
        let size = self.state.operand_size;
        self.fetch_modrm()?;
        self.effective_address()?;

        let destination = self.reg(self.state.modrm.reg, size);
        let source = self.read_rm(size)?;
        let result = op(destination, source, size, &mut self.state.flags);

        self.set_reg(self.state.modrm.reg, result, size);
        Ok(())
    }

    fn binop_acc_imm(&mut self, op: alu::BinaryOp) -> EmulatorResult<()> {
        let size = self.state.operand_size;
        let immediate = self.fetch(size)?;

        let accumulator = if size == BYTE {
            u16::from(self.state.a.low())
        } else {
            self.state.a.word()
        };
        let result = op(accumulator, immediate, size, &mut self.state.flags);

        if size == BYTE {
            self.state.a.set_low((result & 0xFF) as u8);
        } else {
            self.state.a.set_word(result);
        }
        Ok(())
    }

    fn add_rm_r(&mut self) -> EmulatorResult<()> { self.binop_rm_r(alu::add) }
    fn add_r_rm(&mut self) -> EmulatorResult<()> { self.binop_r_rm(alu::add) }
    fn add_acc_imm(&mut self) -> EmulatorResult<()> { self.binop_acc_imm(alu::add) }

    fn or_rm_r(&mut self) -> EmulatorResult<()> { self.binop_rm_r(alu::or) }
    fn or_r_rm(&mut self) -> EmulatorResult<()> { self.binop_r_rm(alu::or) }
    fn or_acc_imm(&mut self) -> EmulatorResult<()> { self.binop_acc_imm(alu::or) }

    fn adc_rm_r(&mut self) -> EmulatorResult<()> { self.binop_rm_r(alu::adc) }
    fn adc_r_rm(&mut self) -> EmulatorResult<()> { self.binop_r_rm(alu::adc) }
    fn adc_acc_imm(&mut self) -> EmulatorResult<()> { self.binop_acc_imm(alu::adc) }

    fn sbb_rm_r(&mut self) -> EmulatorResult<()> { self.binop_rm_r(alu::sbb) }
    fn sbb_r_rm(&mut self) -> EmulatorResult<()> { self.binop_r_rm(alu::sbb) }
    fn sbb_acc_imm(&mut self) -> EmulatorResult<()> { self.binop_acc_imm(alu::sbb) }

    fn and_rm_r(&mut self) -> EmulatorResult<()> { self.binop_rm_r(alu::and) }
    fn and_r_rm(&mut self) -> EmulatorResult<()> { self.binop_r_rm(alu::and) }
    fn and_acc_imm(&mut self) -> EmulatorResult<()> { self.binop_acc_imm(alu::and) }

    fn sub_rm_r(&mut self) -> EmulatorResult<()> { self.binop_rm_r(alu::sub) }
    fn sub_r_rm(&mut self) -> EmulatorResult<()> { self.binop_r_rm(alu::sub) }
    fn sub_acc_imm(&mut self) -> EmulatorResult<()> { self.binop_acc_imm(alu::sub) }

    fn xor_rm_r(&mut self) -> EmulatorResult<()> { self.binop_rm_r(alu::xor) }
    fn xor_r_rm(&mut self) -> EmulatorResult<()> { self.binop_r_rm(alu::xor) }
    fn xor_acc_imm(&mut self) -> EmulatorResult<()> { self.binop_acc_imm(alu::xor) }

    /* CMP and TEST discard the result and keep the flags */

    fn cmp_rm_r(&mut self) -> EmulatorResult<()> {
        let size = self.state.operand_size;
        self.fetch_modrm()?;
        self.effective_address()?;

        let destination = self.read_rm(size)?;
        let source = self.reg(self.state.modrm.reg, size);
        alu::sub(destination, source, size, &mut self.state.flags);
        Ok(())
    }

    fn cmp_r_rm(&mut self) -> EmulatorResult<()> {
        let size = self.state.operand_size;
        self.fetch_modrm()?;
        self.effective_address()?;

        let destination = self.reg(self.state.modrm.reg, size);
        let source = self.read_rm(size)?;
        alu::sub(destination, source, size, &mut self.state.flags);
        Ok(())
    }

    fn cmp_acc_imm(&mut self) -> EmulatorResult<()> {
        let size = self.state.operand_size;
        let immediate = self.fetch(size)?;

        let accumulator = if size == BYTE {
            u16::from(self.state.a.low())
        } else {
            self.state.a.word()
        };
        alu::sub(accumulator, immediate, size, &mut self.state.flags);
        Ok(())
    }

    fn test_rm_r(&mut self) -> EmulatorResult<()> {
        let size = self.state.operand_size;
        self.fetch_modrm()?;
        self.effective_address()?;

        let destination = self.read_rm(size)?;
        let source = self.reg(self.state.modrm.reg, size);
        alu::and(destination, source, size, &mut self.state.flags);
        Ok(())
    }

    fn test_acc_imm(&mut self) -> EmulatorResult<()> {
        let size = self.state.operand_size;
        let immediate = self.fetch(size)?;

        let accumulator = if size == BYTE {
            u16::from(self.state.a.low())
        } else {
            self.state.a.word()
        };
        alu::and(accumulator, immediate, size, &mut self.state.flags);
        Ok(())
    }

    /* Stack */

    fn push_es(&mut self) -> EmulatorResult<()> {
        let value = self.state.es;
        self.push(value)
    }

    fn pop_es(&mut self) -> EmulatorResult<()> {
        self.state.es = self.pop()?;
        Ok(())
    }

    fn push_ss(&mut self) -> EmulatorResult<()> {
        let value = self.state.ss;
        self.push(value)
    }

    fn pop_ss(&mut self) -> EmulatorResult<()> {
        self.state.ss = self.pop()?;
        Ok(())
    }

    fn push_ds(&mut self) -> EmulatorResult<()> {
        let value = self.state.ds;
        self.push(value)
    }

    fn pop_ds(&mut self) -> EmulatorResult<()> {
        self.state.ds = self.pop()?;
        Ok(())
    }

    /// PUSH of a 16-bit register. The value is read after SP moves, so
    /// `PUSH SP` stores the decremented pointer as the 8086 does.
    fn push_r16(&mut self) -> EmulatorResult<()> {
        let index = self.state.opcode & 7;
        self.state.sp = self.state.sp.wrapping_sub(2);

        let value = self.reg16(index);
        self.bus_write(self.state.sp, value, self.state.ss, WORD)
    }

    fn pop_r16(&mut self) -> EmulatorResult<()> {
        let value = self.pop()?;
        self.set_reg16(self.state.opcode & 7, value);
        Ok(())
    }

    /* Prefixes */

    fn segment_override(&mut self) -> EmulatorResult<()> {
        let segment = Segment::from_index((self.state.opcode >> 3) & 3);
        self.state.seg_override = Some(segment);
        Ok(())
    }

    fn rep(&mut self) -> EmulatorResult<()> {
        self.state.rep = Some(RepKind::WhileEqual);
        Ok(())
    }

    fn repne(&mut self) -> EmulatorResult<()> {
        self.state.rep = Some(RepKind::WhileNotEqual);
        Ok(())
    }

    /* BCD adjusts */

    fn daa(&mut self) -> EmulatorResult<()> {
        let al = alu::daa(self.state.a.low(), &mut self.state.flags);
        self.state.a.set_low(al);
        Ok(())
    }

    fn das(&mut self) -> EmulatorResult<()> {
        let al = alu::das(self.state.a.low(), &mut self.state.flags);
        self.state.a.set_low(al);
        Ok(())
    }

    fn aaa(&mut self) -> EmulatorResult<()> {
        let ax = alu::aaa(self.state.a.word(), &mut self.state.flags);
        self.state.a.set_word(ax);
        Ok(())
    }

    fn aas(&mut self) -> EmulatorResult<()> {
        let ax = alu::aas(self.state.a.word(), &mut self.state.flags);
        self.state.a.set_word(ax);
        Ok(())
    }

    fn aam(&mut self) -> EmulatorResult<()> {
        let base = self.fetch_byte()?;
        if base == 0 {
            return self.interrupt(0);
        }

        let al = self.state.a.low();
        self.state.a.set_high(al / base);
        self.state.a.set_low(al % base);

        let al = self.state.a.low();
        self.state.flags.check_parity(al);
        self.state.flags.check_zero(u32::from(al), BYTE);
        self.state.flags.check_sign(u32::from(al), BYTE);
        Ok(())
    }

    fn aad(&mut self) -> EmulatorResult<()> {
        let base = self.fetch_byte()?;

        let al = self.state.a.high().wrapping_mul(base).wrapping_add(self.state.a.low());
        self.state.a.set_low(al);
        self.state.a.set_high(0);

        self.state.flags.check_parity(al);
        self.state.flags.check_zero(u32::from(al), BYTE);
        self.state.flags.check_sign(u32::from(al), BYTE);
        Ok(())
    }

    /* INC/DEC on registers */

    fn inc_r16(&mut self) -> EmulatorResult<()> {
        let index = self.state.opcode & 7;
        let result = alu::inc(self.reg16(index), WORD, &mut self.state.flags);
        self.set_reg16(index, result);
        Ok(())
    }

    fn dec_r16(&mut self) -> EmulatorResult<()> {
        let index = self.state.opcode & 7;
        let result = alu::dec(self.reg16(index), WORD, &mut self.state.flags);
        self.set_reg16(index, result);
        Ok(())
    }

    /* Conditional jumps */

    fn jcc_rel8(&mut self) -> EmulatorResult<()> {
        let offset = self.fetch_byte()? as i8;
        let flags = self.state.flags;

        let taken = match self.state.opcode & 0x0F {
            0x0 => flags.o,
            0x1 => !flags.o,
            0x2 => flags.c,
            0x3 => !flags.c,
            0x4 => flags.z,
            0x5 => !flags.z,
            0x6 => flags.c || flags.z,
            0x7 => !flags.c && !flags.z,
            0x8 => flags.s,
            0x9 => !flags.s,
            0xA => flags.p,
            0xB => !flags.p,
            0xC => flags.s != flags.o,
            0xD => flags.s == flags.o,
            0xE => flags.z || (flags.s != flags.o),
            _ => !flags.z && (flags.s == flags.o)
        };

        if taken {
            self.state.ip = self.state.ip.wrapping_add(offset as u16);
        }
        Ok(())
    }

    /* Immediate ALU groups (0x80/0x81/0x82/0x83) */

    fn group_80(&mut self) -> EmulatorResult<()> {
        self.group_alu_imm(BYTE, false)
    }

    fn group_81(&mut self) -> EmulatorResult<()> {
        self.group_alu_imm(WORD, false)
    }

    fn group_83(&mut self) -> EmulatorResult<()> {
        self.group_alu_imm(WORD, true)
    }

    fn group_alu_imm(&mut self, size: u8, sign_extend: bool) -> EmulatorResult<()> {
        self.fetch_modrm()?;
        self.effective_address()?;

        let destination = self.read_rm(size)?;
        let immediate = if sign_extend {
            i16::from(self.fetch_byte()? as i8) as u16
        } else {
            self.fetch(size)?
        };

        let reg = self.state.modrm.reg;
        let op: alu::BinaryOp = match reg {
            0 => alu::add,
            1 => alu::or,
            2 => alu::adc,
            3 => alu::sbb,
            4 => alu::and,
            5 => alu::sub,
            6 => alu::xor,
            _ => alu::sub
        };
        let result = op(destination, immediate, size, &mut self.state.flags);

        if reg != 7 {
            self.write_rm(result, size)?;
        }
        Ok(())
    }

    /* Moves and exchanges */

    fn mov_rm_r(&mut self) -> EmulatorResult<()> {
        let size = self.state.operand_size;
        self.fetch_modrm()?;
        self.effective_address()?;

        let value = self.reg(self.state.modrm.reg, size);
        self.write_rm(value, size)
    }

    fn mov_r_rm(&mut self) -> EmulatorResult<()> {
        let size = self.state.operand_size;
        self.fetch_modrm()?;
        self.effective_address()?;

        let value = self.read_rm(size)?;
        self.set_reg(self.state.modrm.reg, value, size);
        Ok(())
    }

    fn xchg_r_rm(&mut self) -> EmulatorResult<()> {
        let size = self.state.operand_size;
        self.fetch_modrm()?;
        self.effective_address()?;

        let memory = self.read_rm(size)?;
        let register = self.reg(self.state.modrm.reg, size);

        self.write_rm(register, size)?;
        self.set_reg(self.state.modrm.reg, memory, size);
        Ok(())
    }

    fn xchg_ax_r16(&mut self) -> EmulatorResult<()> {
        let index = self.state.opcode & 7;
        let temp = self.state.a.word();

        self.state.a.set_word(self.reg16(index));
        self.set_reg16(index, temp);
        Ok(())
    }

    /// MOV r/m16, sreg. The effective address is resolved before the sreg
    /// subfield is examined, so reserved encodings still consume their
    /// displacement bytes; they just skip the write.
    fn group_8c(&mut self) -> EmulatorResult<()> {
        self.fetch_modrm()?;
        self.effective_address()?;

        if self.state.modrm.reg > 3 {
            return Ok(());
        }

        let value = self.segment_value(Segment::from_index(self.state.modrm.reg));
        self.write_rm(value, WORD)
    }

    /// MOV sreg, r/m16. The operand is resolved and read before the sreg
    /// subfield is examined; reserved encodings discard the value.
    fn group_8e(&mut self) -> EmulatorResult<()> {
        self.fetch_modrm()?;
        self.effective_address()?;

        let value = self.read_rm(WORD)?;
        match self.state.modrm.reg {
            0 => self.state.es = value,
            1 => self.state.cs = value,
            2 => self.state.ss = value,
            3 => self.state.ds = value,
            _ => {}
        }
        Ok(())
    }

    /// LEA r16, m. A register operand (Mod == 3) is architecturally
    /// undefined and performs no operation here.
    fn lea_r16_rm16(&mut self) -> EmulatorResult<()> {
        self.fetch_modrm()?;

        if self.state.modrm.mode != 3 {
            self.effective_address()?;
            let ea = self.state.ea;
            self.set_reg16(self.state.modrm.reg, ea);
        }
        Ok(())
    }

    /// POP r/m16; only the reg == 0 encoding is defined.
    fn group_8f(&mut self) -> EmulatorResult<()> {
        self.fetch_modrm()?;
        if self.state.modrm.reg != 0 {
            return Ok(());
        }

        self.effective_address()?;
        let value = self.pop()?;
        self.write_rm(value, WORD)
    }

    /* Width conversions */

    fn cbw(&mut self) -> EmulatorResult<()> {
        let extension = if self.state.a.low() & 0x80 != 0 { 0xFF } else { 0x00 };
        self.state.a.set_high(extension);
        Ok(())
    }

    fn cwd(&mut self) -> EmulatorResult<()> {
        let extension = if self.state.a.high() & 0x80 != 0 { 0xFFFF } else { 0x0000 };
        self.state.d.set_word(extension);
        Ok(())
    }

    /* Flag transfers */

    fn pushf(&mut self) -> EmulatorResult<()> {
        let flags = self.state.flags.get();
        self.push(flags)
    }

    fn popf(&mut self) -> EmulatorResult<()> {
        let value = self.pop()?;
        self.state.flags.set(value);
        Ok(())
    }

    fn sahf(&mut self) -> EmulatorResult<()> {
        let flags = self.state.flags.get();
        let value = (flags & 0xFF00) | u16::from(self.state.a.high());
        self.state.flags.set(value);
        Ok(())
    }

    fn lahf(&mut self) -> EmulatorResult<()> {
        let low = (self.state.flags.get() & 0x00FF) as u8;
        self.state.a.set_high(low);
        Ok(())
    }

    /* Accumulator moves through a direct offset */

    fn mov_acc_moffs(&mut self) -> EmulatorResult<()> {
        let size = self.state.operand_size;
        let offset = self.fetch_word()?;
        let value = self.bus_read(offset, self.state.ds, size)?;

        if size == BYTE {
            self.state.a.set_low((value & 0xFF) as u8);
        } else {
            self.state.a.set_word(value);
        }
        Ok(())
    }

    fn mov_moffs_acc(&mut self) -> EmulatorResult<()> {
        let size = self.state.operand_size;
        let offset = self.fetch_word()?;

        let value = if size == BYTE {
            u16::from(self.state.a.low())
        } else {
            self.state.a.word()
        };
        self.bus_write(offset, value, self.state.ds, size)
    }

    /* String instructions */

    fn string_step(&self) -> u16 {
        u16::from(self.state.operand_size / 8)
    }

    fn advance_si(&mut self) {
        let step = self.string_step();
        self.state.si = if self.state.flags.d {
            self.state.si.wrapping_sub(step)
        } else {
            self.state.si.wrapping_add(step)
        };
    }

    fn advance_di(&mut self) {
        let step = self.string_step();
        self.state.di = if self.state.flags.d {
            self.state.di.wrapping_sub(step)
        } else {
            self.state.di.wrapping_add(step)
        };
    }

    fn movs(&mut self) -> EmulatorResult<()> {
        let size = self.state.operand_size;
        let value = self.bus_read(self.state.si, self.state.ds, size)?;
        self.bus_write(self.state.di, value, self.state.es, size)?;

        self.advance_si();
        self.advance_di();
        Ok(())
    }

    fn cmps(&mut self) -> EmulatorResult<()> {
        let size = self.state.operand_size;
        let source = self.bus_read(self.state.si, self.state.ds, size)?;
        let destination = self.bus_read(self.state.di, self.state.es, size)?;
        alu::sub(source, destination, size, &mut self.state.flags);

        self.advance_si();
        self.advance_di();
        Ok(())
    }

    fn stos(&mut self) -> EmulatorResult<()> {
        let size = self.state.operand_size;
        let value = if size == BYTE {
            u16::from(self.state.a.low())
        } else {
            self.state.a.word()
        };
        self.bus_write(self.state.di, value, self.state.es, size)?;

        self.advance_di();
        Ok(())
    }

    fn lods(&mut self) -> EmulatorResult<()> {
        let size = self.state.operand_size;
        let value = self.bus_read(self.state.si, self.state.ds, size)?;

        if size == BYTE {
            self.state.a.set_low((value & 0xFF) as u8);
        } else {
            self.state.a.set_word(value);
        }

        self.advance_si();
        Ok(())
    }

    fn scas(&mut self) -> EmulatorResult<()> {
        let size = self.state.operand_size;
        let destination = self.bus_read(self.state.di, self.state.es, size)?;
        let accumulator = if size == BYTE {
            u16::from(self.state.a.low())
        } else {
            self.state.a.word()
        };
        alu::sub(destination, accumulator, size, &mut self.state.flags);

        self.advance_di();
        Ok(())
    }

    /* Register-immediate moves */

    fn mov_r8_imm(&mut self) -> EmulatorResult<()> {
        let index = self.state.opcode & 7;
        let value = self.fetch_byte()?;
        self.set_reg8(index, value);
        Ok(())
    }

    fn mov_r16_imm(&mut self) -> EmulatorResult<()> {
        let index = self.state.opcode & 7;
        let value = self.fetch_word()?;
        self.set_reg16(index, value);
        Ok(())
    }

    /* Calls, returns and jumps */

    fn ret_imm(&mut self) -> EmulatorResult<()> {
        let offset = self.fetch_word()?;
        self.state.ip = self.pop()?;
        self.state.sp = self.state.sp.wrapping_add(offset);
        Ok(())
    }

    fn ret(&mut self) -> EmulatorResult<()> {
        self.state.ip = self.pop()?;
        Ok(())
    }

    fn retf_imm(&mut self) -> EmulatorResult<()> {
        let offset = self.fetch_word()?;
        self.state.ip = self.pop()?;
        self.state.cs = self.pop()?;
        self.state.sp = self.state.sp.wrapping_add(offset);
        Ok(())
    }

    fn retf(&mut self) -> EmulatorResult<()> {
        self.state.ip = self.pop()?;
        self.state.cs = self.pop()?;
        Ok(())
    }

    fn call_far(&mut self) -> EmulatorResult<()> {
        let offset = self.fetch_word()?;
        let segment = self.fetch_word()?;

        self.push(self.state.cs)?;
        self.push(self.state.ip)?;

        self.state.ip = offset;
        self.state.cs = segment;
        Ok(())
    }

    fn call_rel16(&mut self) -> EmulatorResult<()> {
        let offset = self.fetch_word()?;
        self.push(self.state.ip)?;
        self.state.ip = self.state.ip.wrapping_add(offset);
        Ok(())
    }

    fn jmp_rel16(&mut self) -> EmulatorResult<()> {
        let offset = self.fetch_word()?;
        self.state.ip = self.state.ip.wrapping_add(offset);
        Ok(())
    }

    fn jmp_far(&mut self) -> EmulatorResult<()> {
        let offset = self.fetch_word()?;
        let segment = self.fetch_word()?;

        self.state.ip = offset;
        self.state.cs = segment;
        Ok(())
    }

    fn jmp_rel8(&mut self) -> EmulatorResult<()> {
        let offset = self.fetch_byte()? as i8;
        self.state.ip = self.state.ip.wrapping_add(offset as u16);
        Ok(())
    }

    /* LES/LDS */

    fn les_r16_m16(&mut self) -> EmulatorResult<()> {
        self.fetch_modrm()?;
        if self.state.modrm.mode == 3 {
            return Ok(());
        }

        self.effective_address()?;
        let offset = self.bus_read(self.state.ea, self.state.seg, WORD)?;
        let segment = self.bus_read(self.state.ea.wrapping_add(2), self.state.seg, WORD)?;

        self.set_reg16(self.state.modrm.reg, offset);
        self.state.es = segment;
        Ok(())
    }

    fn lds_r16_m16(&mut self) -> EmulatorResult<()> {
        self.fetch_modrm()?;
        if self.state.modrm.mode == 3 {
            return Ok(());
        }

        self.effective_address()?;
        let offset = self.bus_read(self.state.ea, self.state.seg, WORD)?;
        let segment = self.bus_read(self.state.ea.wrapping_add(2), self.state.seg, WORD)?;

        self.set_reg16(self.state.modrm.reg, offset);
        self.state.ds = segment;
        Ok(())
    }

    /* MOV r/m, imm groups */

    fn group_c6(&mut self) -> EmulatorResult<()> {
        self.fetch_modrm()?;
        if self.state.modrm.reg != 0 {
            return Ok(());
        }

        self.effective_address()?;
        let value = self.fetch_byte()?;
        self.write_rm(u16::from(value), BYTE)
    }

    fn group_c7(&mut self) -> EmulatorResult<()> {
        self.fetch_modrm()?;
        if self.state.modrm.reg != 0 {
            return Ok(());
        }

        self.effective_address()?;
        let value = self.fetch_word()?;
        self.write_rm(value, WORD)
    }

    /* Software interrupts */

    fn int3(&mut self) -> EmulatorResult<()> {
        self.interrupt(3)
    }

    fn int_imm8(&mut self) -> EmulatorResult<()> {
        let vector = self.fetch_byte()?;
        self.interrupt(vector)
    }

    fn into_overflow(&mut self) -> EmulatorResult<()> {
        if self.state.flags.o {
            return self.interrupt(4);
        }
        Ok(())
    }

    fn iret(&mut self) -> EmulatorResult<()> {
        self.state.ip = self.pop()?;
        self.state.cs = self.pop()?;
        let flags = self.pop()?;
        self.state.flags.set(flags);
        Ok(())
    }

    /* Shift/rotate group (0xD0 - 0xD3) */

    fn group_shift_1(&mut self) -> EmulatorResult<()> {
        self.group_shift(1)
    }

    fn group_shift_cl(&mut self) -> EmulatorResult<()> {
        let count = self.state.c.low();
        self.group_shift(count)
    }

    fn group_shift(&mut self, count: u8) -> EmulatorResult<()> {
        let size = self.state.operand_size;
        self.fetch_modrm()?;

        // Subfield 6 is a reserved slot and decodes as a bare ModR/M byte.
        if self.state.modrm.reg == 6 {
            return Ok(());
        }

        self.effective_address()?;
        let value = self.read_rm(size)?;
        let flags = &mut self.state.flags;

        let result = match self.state.modrm.reg {
            0 => alu::rol(value, count, size, flags),
            1 => alu::ror(value, count, size, flags),
            2 => alu::rcl(value, count, size, flags),
            3 => alu::rcr(value, count, size, flags),
            4 => alu::shl(value, count, size, flags),
            5 => alu::shr(value, count, size, flags),
            _ => alu::sar(value, count, size, flags)
        };

        self.write_rm(result, size)
    }

    /* Unary group (0xF6/0xF7) */

    fn group_unary(&mut self) -> EmulatorResult<()> {
        let size = self.state.operand_size;
        self.fetch_modrm()?;

        // Subfield 1 is a reserved slot and decodes as a bare ModR/M byte.
        if self.state.modrm.reg == 1 {
            return Ok(());
        }

        self.effective_address()?;

        match self.state.modrm.reg {
            0 => {
                let value = self.read_rm(size)?;
                let immediate = self.fetch(size)?;
                alu::and(value, immediate, size, &mut self.state.flags);
                Ok(())
            }
            2 => {
                let value = self.read_rm(size)?;
                self.write_rm(alu::not(value, size), size)
            }
            3 => {
                let value = self.read_rm(size)?;
                let result = alu::neg(value, size, &mut self.state.flags);
                self.write_rm(result, size)
            }
            4 => {
                let value = self.read_rm(size)?;
                self.multiply(value, false)
            }
            5 => {
                let value = self.read_rm(size)?;
                self.multiply(value, true)
            }
            6 => {
                let value = self.read_rm(size)?;
                self.divide(value, false)
            }
            _ => {
                let value = self.read_rm(size)?;
                self.divide(value, true)
            }
        }
    }

    fn multiply(&mut self, value: u16, signed: bool) -> EmulatorResult<()> {
        let size = self.state.operand_size;
        let accumulator = if size == BYTE {
            u16::from(self.state.a.low())
        } else {
            self.state.a.word()
        };

        let product = if signed {
            alu::imul(accumulator, value, size, &mut self.state.flags)
        } else {
            alu::mul(accumulator, value, size, &mut self.state.flags)
        };

        if size == BYTE {
            self.state.a.set_word(product as u16);
        } else {
            self.state.a.set_word((product & 0xFFFF) as u16);
            self.state.d.set_word((product >> 16) as u16);
        }
        Ok(())
    }

    /// DIV/IDIV write quotient and remainder back to the accumulator pair;
    /// a divide error raises interrupt vector 0.
    fn divide(&mut self, value: u16, signed: bool) -> EmulatorResult<()> {
        let size = self.state.operand_size;
        let dividend = if size == BYTE {
            u32::from(self.state.a.word())
        } else {
            (u32::from(self.state.d.word()) << 16) | u32::from(self.state.a.word())
        };

        let outcome = if signed {
            alu::idiv(dividend, value, size)
        } else {
            alu::div(dividend, value, size)
        };

        match outcome {
            Some((quotient, remainder)) => {
                if size == BYTE {
                    self.state.a.set_low((quotient & 0xFF) as u8);
                    self.state.a.set_high((remainder & 0xFF) as u8);
                } else {
                    self.state.a.set_word(quotient);
                    self.state.d.set_word(remainder);
                }
                Ok(())
            }
            None => self.interrupt(0)
        }
    }

    /* INC/DEC group (0xFE) */

    fn group_fe(&mut self) -> EmulatorResult<()> {
        self.fetch_modrm()?;
        if self.state.modrm.reg > 1 {
            return Ok(());
        }

        self.effective_address()?;
        let value = self.read_rm(BYTE)?;
        let result = if self.state.modrm.reg == 0 {
            alu::inc(value, BYTE, &mut self.state.flags)
        } else {
            alu::dec(value, BYTE, &mut self.state.flags)
        };
        self.write_rm(result, BYTE)
    }

    /* INC/DEC/CALL/JMP/PUSH group (0xFF) */

    fn group_ff(&mut self) -> EmulatorResult<()> {
        self.fetch_modrm()?;

        // Subfield 7 is a reserved slot and decodes as a bare ModR/M byte.
        if self.state.modrm.reg == 7 {
            return Ok(());
        }

        self.effective_address()?;

        match self.state.modrm.reg {
            0 => {
                let value = self.read_rm(WORD)?;
                let result = alu::inc(value, WORD, &mut self.state.flags);
                self.write_rm(result, WORD)
            }
            1 => {
                let value = self.read_rm(WORD)?;
                let result = alu::dec(value, WORD, &mut self.state.flags);
                self.write_rm(result, WORD)
            }
            2 => {
                let target = self.read_rm(WORD)?;
                self.push(self.state.ip)?;
                self.state.ip = target;
                Ok(())
            }
            3 => {
                // Far call through memory; a register operand is undefined
                // and does nothing.
                if self.state.modrm.mode == 3 {
                    return Ok(());
                }

                let offset = self.bus_read(self.state.ea, self.state.seg, WORD)?;
                let segment = self.bus_read(self.state.ea.wrapping_add(2), self.state.seg, WORD)?;

                self.push(self.state.cs)?;
                self.push(self.state.ip)?;
                self.state.ip = offset;
                self.state.cs = segment;
                Ok(())
            }
            4 => {
                self.state.ip = self.read_rm(WORD)?;
                Ok(())
            }
            5 => {
                if self.state.modrm.mode == 3 {
                    return Ok(());
                }

                self.state.ip = self.bus_read(self.state.ea, self.state.seg, WORD)?;
                self.state.cs = self.bus_read(self.state.ea.wrapping_add(2), self.state.seg, WORD)?;
                Ok(())
            }
            _ => {
                let value = self.read_rm(WORD)?;
                self.push(value)
            }
        }
    }

    /* Loops */

    fn loopne_rel8(&mut self) -> EmulatorResult<()> {
        let offset = self.fetch_byte()? as i8;
        self.state.c.set_word(self.state.c.word().wrapping_sub(1));

        if self.state.c.word() != 0 && !self.state.flags.z {
            self.state.ip = self.state.ip.wrapping_add(offset as u16);
        }
        Ok(())
    }

    fn loope_rel8(&mut self) -> EmulatorResult<()> {
        let offset = self.fetch_byte()? as i8;
        self.state.c.set_word(self.state.c.word().wrapping_sub(1));

        if self.state.c.word() != 0 && self.state.flags.z {
            self.state.ip = self.state.ip.wrapping_add(offset as u16);
        }
        Ok(())
    }

    fn loop_rel8(&mut self) -> EmulatorResult<()> {
        let offset = self.fetch_byte()? as i8;
        self.state.c.set_word(self.state.c.word().wrapping_sub(1));

        if self.state.c.word() != 0 {
            self.state.ip = self.state.ip.wrapping_add(offset as u16);
        }
        Ok(())
    }

    fn jcxz_rel8(&mut self) -> EmulatorResult<()> {
        let offset = self.fetch_byte()? as i8;

        if self.state.c.word() == 0 {
            self.state.ip = self.state.ip.wrapping_add(offset as u16);
        }
        Ok(())
    }

    /* Port I/O decodes but carries no traffic; the immediate forms still
       consume their port byte so IP stays correct. */

    fn in_acc_imm8(&mut self) -> EmulatorResult<()> {
        let _port = self.fetch_byte()?;
        Ok(())
    }

    fn out_imm8_acc(&mut self) -> EmulatorResult<()> {
        let _port = self.fetch_byte()?;
        Ok(())
    }

    /* Table lookup */

    fn xlat(&mut self) -> EmulatorResult<()> {
        let offset = self.state.b.word().wrapping_add(u16::from(self.state.a.low()));
        let value = self.bus_read(offset, self.state.ds, BYTE)?;
        self.state.a.set_low((value & 0xFF) as u8);
        Ok(())
    }

    /* Processor control */

    fn hlt(&mut self) -> EmulatorResult<()> {
        self.state.halted = true;
        Ok(())
    }

    fn cmc(&mut self) -> EmulatorResult<()> {
        self.state.flags.c = !self.state.flags.c;
        Ok(())
    }

    fn clc(&mut self) -> EmulatorResult<()> {
        self.state.flags.c = false;
        Ok(())
    }

    fn stc(&mut self) -> EmulatorResult<()> {
        self.state.flags.c = true;
        Ok(())
    }

    fn cli(&mut self) -> EmulatorResult<()> {
        self.state.flags.i = false;
        Ok(())
    }

    /// STI posts the interrupt-enable update; it materializes only after the
    /// current batch, one instruction late.
    fn sti(&mut self) -> EmulatorResult<()> {
        self.state.pending_interrupt_enable = true;
        Ok(())
    }

    fn cld(&mut self) -> EmulatorResult<()> {
        self.state.flags.d = false;
        Ok(())
    }

    fn std(&mut self) -> EmulatorResult<()> {
        self.state.flags.d = true;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::bus::MemoryBus;
    use crate::cpu::Cpu;
    use crate::ram::Ram;

    fn setup(program: &[u8]) -> (Cpu, Rc<RefCell<MemoryBus>>) {
        let bus = Rc::new(RefCell::new(MemoryBus::new()));
        let ram = Rc::new(RefCell::new(Ram::new(0x10_0000)));
        bus.borrow_mut().attach_device(ram, 0x00000, 0xFFFFF).unwrap();

        for (i, &byte) in program.iter().enumerate() {
            bus.borrow_mut().write(i as u16, u16::from(byte), 0x0000, 8, false).unwrap();
        }

        let cpu = Cpu::new(bus.clone());
        (cpu, bus)
    }

    fn poke(bus: &Rc<RefCell<MemoryBus>>, offset: u16, segment: u16, data: u8) {
        bus.borrow_mut().write(offset, u16::from(data), segment, 8, false).unwrap();
    }

    fn peek(bus: &Rc<RefCell<MemoryBus>>, offset: u16, segment: u16) -> u8 {
        bus.borrow().read(offset, segment, 8, false).unwrap() as u8
    }

    #[test]
    fn test_initial_state() {
        let (cpu, _bus) = setup(&[]);
        let state = cpu.snapshot();

        assert_eq!(state.sp, 0xFFFE);
        assert_eq!(state.ip, 0);
        assert_eq!(state.a.word(), 0);
        assert_eq!(state.flags.get(), 0);
        assert!(!state.halted);
    }

    #[test]
    fn test_add_ax_imm16() {
        // ADD AX, 0x1234
        let (mut cpu, _bus) = setup(&[0x05, 0x34, 0x12]);
        cpu.state_mut().a.set_word(0x0001);

        cpu.cycles(1).unwrap();

        let state = cpu.snapshot();
        assert_eq!(state.a.word(), 0x1235);
        assert_eq!(state.ip, 3);
        assert!(!state.flags.c);
        assert!(!state.flags.z);
        assert!(!state.flags.s);
        assert!(!state.flags.o);
        assert!(state.flags.p);
    }

    #[test]
    fn test_push_pop_round_trip() {
        // PUSH AX; POP AX
        let (mut cpu, bus) = setup(&[0x50, 0x58]);
        cpu.state_mut().ss = 0x0000;
        cpu.state_mut().sp = 0x0100;
        cpu.state_mut().a.set_word(0xBEEF);

        cpu.cycles(2).unwrap();

        let state = cpu.snapshot();
        assert_eq!(state.a.word(), 0xBEEF);
        assert_eq!(state.sp, 0x0100);
        assert_eq!(peek(&bus, 0x00FE, 0x0000), 0xEF);
        assert_eq!(peek(&bus, 0x00FF, 0x0000), 0xBE);
    }

    #[test]
    fn test_push_sp_stores_decremented_pointer() {
        // PUSH SP
        let (mut cpu, bus) = setup(&[0x54]);
        cpu.state_mut().ss = 0x0000;
        cpu.state_mut().sp = 0x0100;

        cpu.cycles(1).unwrap();

        assert_eq!(cpu.state().sp, 0x00FE);
        assert_eq!(peek(&bus, 0x00FE, 0x0000), 0xFE);
        assert_eq!(peek(&bus, 0x00FF, 0x0000), 0x00);
    }

    #[test]
    fn test_segment_override() {
        // MOV AL, ES:[BX]; MOV AL, [BX]
        let (mut cpu, bus) = setup(&[0x26, 0x8A, 0x07, 0x8A, 0x07]);
        cpu.state_mut().ds = 0x1000;
        cpu.state_mut().es = 0x2000;
        cpu.state_mut().b.set_word(0x0010);
        poke(&bus, 0x0010, 0x2000, 0x42);
        poke(&bus, 0x0010, 0x1000, 0xFF);

        // The override prefix executes as its own instruction.
        cpu.cycles(2).unwrap();
        assert_eq!(cpu.state().a.low(), 0x42);

        cpu.cycles(1).unwrap();
        assert_eq!(cpu.state().a.low(), 0xFF);
    }

    #[test]
    fn test_override_does_not_replace_stack_segment() {
        // ES: MOV AL, [BP+0] keeps addressing SS.
        let (mut cpu, bus) = setup(&[0x26, 0x8A, 0x46, 0x00]);
        cpu.state_mut().ds = 0x1000;
        cpu.state_mut().es = 0x2000;
        cpu.state_mut().ss = 0x3000;
        cpu.state_mut().bp = 0x0010;
        poke(&bus, 0x0010, 0x3000, 0xAA);
        poke(&bus, 0x0010, 0x2000, 0xBB);

        cpu.cycles(2).unwrap();
        assert_eq!(cpu.state().a.low(), 0xAA);
        // The override was still consumed.
        assert!(cpu.state().seg_override.is_none());
    }

    #[test]
    fn test_bp_addressing_defaults_to_stack_segment() {
        // MOV AL, [BP+0]
        let (mut cpu, bus) = setup(&[0x8A, 0x46, 0x00]);
        cpu.state_mut().ds = 0x1000;
        cpu.state_mut().ss = 0x3000;
        cpu.state_mut().bp = 0x0010;
        poke(&bus, 0x0010, 0x3000, 0xAA);
        poke(&bus, 0x0010, 0x1000, 0xBB);

        cpu.cycles(1).unwrap();
        assert_eq!(cpu.state().a.low(), 0xAA);
    }

    #[test]
    fn test_rep_movsb() {
        // REP MOVSB
        let (mut cpu, bus) = setup(&[0xF3, 0xA4]);
        cpu.state_mut().si = 0x0100;
        cpu.state_mut().di = 0x0200;
        cpu.state_mut().c.set_word(4);
        for (i, &byte) in [0x41u8, 0x42, 0x43, 0x44].iter().enumerate() {
            poke(&bus, 0x0100 + i as u16, 0x0000, byte);
        }

        cpu.cycles(1).unwrap();

        let state = cpu.snapshot();
        assert_eq!(state.c.word(), 0);
        assert_eq!(state.si, 0x0104);
        assert_eq!(state.di, 0x0204);
        for (i, &byte) in [0x41u8, 0x42, 0x43, 0x44].iter().enumerate() {
            assert_eq!(peek(&bus, 0x0200 + i as u16, 0x0000), byte);
        }
    }

    #[test]
    fn test_rep_cmpsb_stops_at_first_difference() {
        let (mut cpu, bus) = setup(&[0xF3, 0xA6]);
        cpu.state_mut().si = 0x0100;
        cpu.state_mut().di = 0x0200;
        cpu.state_mut().c.set_word(4);
        for (i, &byte) in [1u8, 2, 3, 4].iter().enumerate() {
            poke(&bus, 0x0100 + i as u16, 0x0000, byte);
        }
        for (i, &byte) in [1u8, 2, 9, 4].iter().enumerate() {
            poke(&bus, 0x0200 + i as u16, 0x0000, byte);
        }

        cpu.cycles(1).unwrap();

        let state = cpu.snapshot();
        // Three iterations ran; the third comparison differed.
        assert_eq!(state.c.word(), 1);
        assert_eq!(state.si, 0x0103);
        assert_eq!(state.di, 0x0203);
        assert!(!state.flags.z);
    }

    #[test]
    fn test_rep_cmpsb_full_match() {
        let (mut cpu, bus) = setup(&[0xF3, 0xA6]);
        cpu.state_mut().si = 0x0100;
        cpu.state_mut().di = 0x0200;
        cpu.state_mut().c.set_word(3);
        for i in 0..3u16 {
            poke(&bus, 0x0100 + i, 0x0000, 0x7A);
            poke(&bus, 0x0200 + i, 0x0000, 0x7A);
        }

        cpu.cycles(1).unwrap();

        let state = cpu.snapshot();
        assert_eq!(state.c.word(), 0);
        assert!(state.flags.z);
    }

    #[test]
    fn test_repne_scasb() {
        let (mut cpu, bus) = setup(&[0xF2, 0xAE]);
        cpu.state_mut().di = 0x0200;
        cpu.state_mut().c.set_word(8);
        cpu.state_mut().a.set_low(0x33);
        for (i, &byte) in [0x10u8, 0x20, 0x33, 0x40].iter().enumerate() {
            poke(&bus, 0x0200 + i as u16, 0x0000, byte);
        }

        cpu.cycles(1).unwrap();

        let state = cpu.snapshot();
        // The scan stops once AL matches, Z set.
        assert_eq!(state.di, 0x0203);
        assert_eq!(state.c.word(), 5);
        assert!(state.flags.z);
    }

    #[test]
    fn test_conditional_jump_taken_skips_instruction() {
        // CMP AX, BX; JE +5; MOV AL, 0xFF
        let (mut cpu, _bus) = setup(&[0x39, 0xD8, 0x74, 0x05, 0xB0, 0xFF]);
        cpu.state_mut().a.set_word(5);
        cpu.state_mut().b.set_word(5);
        cpu.state_mut().a.set_low(0x05);

        cpu.cycles(2).unwrap();

        let state = cpu.snapshot();
        assert_eq!(state.ip, 9);
        // The MOV AL was jumped over.
        assert_eq!(state.a.low(), 0x05);
    }

    #[test]
    fn test_conditional_jump_not_taken() {
        // CMP AX, BX; JE +5; MOV AL, 0xFF
        let (mut cpu, _bus) = setup(&[0x39, 0xD8, 0x74, 0x05, 0xB0, 0xFF]);
        cpu.state_mut().a.set_word(5);
        cpu.state_mut().b.set_word(6);

        cpu.cycles(3).unwrap();

        let state = cpu.snapshot();
        assert_eq!(state.ip, 6);
        assert_eq!(state.a.low(), 0xFF);
    }

    #[test]
    fn test_sti_delays_interrupt_enable() {
        // STI; PUSHF: the pushed image must still show I = 0.
        let (mut cpu, bus) = setup(&[0xFB, 0x9C]);
        cpu.state_mut().ss = 0x0000;
        cpu.state_mut().sp = 0x0100;

        cpu.cycles(2).unwrap();

        let pushed = u16::from(peek(&bus, 0x00FE, 0x0000))
            | (u16::from(peek(&bus, 0x00FF, 0x0000)) << 8);
        assert_eq!(pushed & (1 << 9), 0);
        assert!(cpu.state().flags.i);
    }

    #[test]
    fn test_interrupt_vector_read_from_segment_zero() {
        // INT 0x21 with the vector table at physical 0x84.
        let (mut cpu, bus) = setup(&[0xCD, 0x21]);
        cpu.state_mut().ss = 0x0000;
        cpu.state_mut().sp = 0x0100;
        cpu.state_mut().flags.i = true;
        cpu.state_mut().flags.t = true;
        poke(&bus, 0x0084, 0x0000, 0x00);
        poke(&bus, 0x0085, 0x0000, 0x30);
        poke(&bus, 0x0086, 0x0000, 0x00);
        poke(&bus, 0x0087, 0x0000, 0x50);

        cpu.cycles(1).unwrap();

        let state = cpu.snapshot();
        assert_eq!(state.ip, 0x3000);
        assert_eq!(state.cs, 0x5000);
        assert!(!state.flags.i);
        assert!(!state.flags.t);
        // Return address on the stack points past the INT instruction.
        assert_eq!(peek(&bus, 0x00FA, 0x0000), 0x02);
    }

    #[test]
    fn test_hlt_then_interrupt_resumes() {
        let (mut cpu, bus) = setup(&[0xF4, 0x40]);
        cpu.state_mut().ss = 0x0000;
        cpu.state_mut().sp = 0x0100;
        poke(&bus, 0x0004, 0x0000, 0x00);
        poke(&bus, 0x0005, 0x0000, 0x02);

        cpu.cycles(5).unwrap();
        assert!(cpu.state().halted);
        assert_eq!(cpu.state().ip, 1);

        cpu.interrupt(1).unwrap();
        assert!(!cpu.state().halted);
        assert_eq!(cpu.state().ip, 0x0200);

        // The CPU executes again once resumed.
        cpu.cycles(1).unwrap();
        assert_ne!(cpu.state().ip, 0x0200);
    }

    #[test]
    fn test_hlt_stops_batch_early() {
        // INC AX; HLT; INC AX
        let (mut cpu, _bus) = setup(&[0x40, 0xF4, 0x40]);

        cpu.cycles(3).unwrap();

        let state = cpu.snapshot();
        assert_eq!(state.a.word(), 1);
        assert!(state.halted);
    }

    #[test]
    fn test_iret_restores_flow() {
        // INT 0x21 to a handler holding IRET.
        let (mut cpu, bus) = setup(&[0xCD, 0x21]);
        cpu.state_mut().ss = 0x0000;
        cpu.state_mut().sp = 0x0100;
        poke(&bus, 0x0084, 0x0000, 0x00);
        poke(&bus, 0x0085, 0x0000, 0x03);
        // Handler at 0x0300: IRET.
        poke(&bus, 0x0300, 0x0000, 0xCF);

        cpu.cycles(2).unwrap();

        let state = cpu.snapshot();
        assert_eq!(state.cs, 0x0000);
        assert_eq!(state.ip, 0x0002);
        assert_eq!(state.sp, 0x0100);
    }

    #[test]
    fn test_shift_group_by_one() {
        // SHL AL, 1 (D0 /4 with AL)
        let (mut cpu, _bus) = setup(&[0xD0, 0xE0]);
        cpu.state_mut().a.set_low(0x40);

        cpu.cycles(1).unwrap();

        let state = cpu.snapshot();
        assert_eq!(state.a.low(), 0x80);
        assert!(state.flags.o);
        assert!(!state.flags.c);
    }

    #[test]
    fn test_shift_group_by_cl() {
        // SHR AX, CL (D3 /5 with AX)
        let (mut cpu, _bus) = setup(&[0xD3, 0xE8]);
        cpu.state_mut().a.set_word(0x8000);
        cpu.state_mut().c.set_low(4);

        cpu.cycles(1).unwrap();
        assert_eq!(cpu.state().a.word(), 0x0800);
    }

    #[test]
    fn test_unary_group_mul() {
        // MUL CX (F7 /4)
        let (mut cpu, _bus) = setup(&[0xF7, 0xE1]);
        cpu.state_mut().a.set_word(0x8000);
        cpu.state_mut().c.set_word(0x0002);

        cpu.cycles(1).unwrap();

        let state = cpu.snapshot();
        assert_eq!(state.a.word(), 0x0000);
        assert_eq!(state.d.word(), 0x0001);
        assert!(state.flags.c);
        assert!(state.flags.o);
    }

    #[test]
    fn test_unary_group_neg() {
        // NEG BL (F6 /3)
        let (mut cpu, _bus) = setup(&[0xF6, 0xDB]);
        cpu.state_mut().b.set_low(0x01);

        cpu.cycles(1).unwrap();
        assert_eq!(cpu.state().b.low(), 0xFF);
        assert!(cpu.state().flags.c);
    }

    #[test]
    fn test_divide_by_zero_raises_vector_zero() {
        // Vector 0 occupies physical 0..4, so the program lives at 0x0500.
        let (mut cpu, bus) = setup(&[0x00, 0x04, 0x00, 0x00]);
        // DIV DH (F6 /6) with DH = 0.
        poke(&bus, 0x0500, 0x0000, 0xF6);
        poke(&bus, 0x0501, 0x0000, 0xF6);
        cpu.state_mut().ip = 0x0500;
        cpu.state_mut().ss = 0x0000;
        cpu.state_mut().sp = 0x0100;

        cpu.cycles(1).unwrap();
        assert_eq!(cpu.state().ip, 0x0400);
        assert_eq!(cpu.state().cs, 0x0000);
    }

    #[test]
    fn test_group_fe_inc_memory() {
        // INC BYTE PTR [0x0200] (FE /0, direct address)
        let (mut cpu, bus) = setup(&[0xFE, 0x06, 0x00, 0x02]);
        poke(&bus, 0x0200, 0x0000, 0x7F);

        cpu.cycles(1).unwrap();
        assert_eq!(peek(&bus, 0x0200, 0x0000), 0x80);
        assert!(cpu.state().flags.o);
    }

    #[test]
    fn test_group_ff_push_and_call() {
        // PUSH WORD PTR [0x0200]; CALL AX
        let (mut cpu, bus) = setup(&[0xFF, 0x36, 0x00, 0x02, 0xFF, 0xD0]);
        cpu.state_mut().ss = 0x0000;
        cpu.state_mut().sp = 0x0100;
        cpu.state_mut().a.set_word(0x0050);
        poke(&bus, 0x0200, 0x0000, 0x34);
        poke(&bus, 0x0201, 0x0000, 0x12);

        cpu.cycles(2).unwrap();

        let state = cpu.snapshot();
        assert_eq!(state.ip, 0x0050);
        // Pushed word and return address are both on the stack.
        assert_eq!(peek(&bus, 0x00FE, 0x0000), 0x34);
        assert_eq!(peek(&bus, 0x00FF, 0x0000), 0x12);
        assert_eq!(peek(&bus, 0x00FC, 0x0000), 0x06);
    }

    #[test]
    fn test_group_ff_far_jump_through_memory() {
        // JMP FAR [0x0200]
        let (mut cpu, bus) = setup(&[0xFF, 0x2E, 0x00, 0x02]);
        poke(&bus, 0x0200, 0x0000, 0x10);
        poke(&bus, 0x0201, 0x0000, 0x00);
        poke(&bus, 0x0202, 0x0000, 0x00);
        poke(&bus, 0x0203, 0x0000, 0x20);

        cpu.cycles(1).unwrap();
        assert_eq!(cpu.state().ip, 0x0010);
        assert_eq!(cpu.state().cs, 0x2000);
    }

    #[test]
    fn test_lea_register_operand_is_noop() {
        // LEA with Mod == 3 is undefined and performs no operation.
        let (mut cpu, _bus) = setup(&[0x8D, 0xC0]);
        cpu.state_mut().a.set_word(0x1234);

        cpu.cycles(1).unwrap();
        assert_eq!(cpu.state().a.word(), 0x1234);
        assert_eq!(cpu.state().ip, 2);
    }

    #[test]
    fn test_lea_computes_offset_without_memory_access() {
        // LEA AX, [BX+SI+0x10]
        let (mut cpu, _bus) = setup(&[0x8D, 0x40, 0x10]);
        cpu.state_mut().b.set_word(0x0100);
        cpu.state_mut().si = 0x0020;

        cpu.cycles(1).unwrap();
        assert_eq!(cpu.state().a.word(), 0x0130);
    }

    #[test]
    fn test_in_out_consume_immediate() {
        // IN AL, 0x60; OUT 0x60, AL
        let (mut cpu, _bus) = setup(&[0xE4, 0x60, 0xE6, 0x60]);

        cpu.cycles(2).unwrap();
        assert_eq!(cpu.state().ip, 4);
    }

    #[test]
    fn test_xchg_and_nop() {
        // NOP (XCHG AX, AX); XCHG AX, CX
        let (mut cpu, _bus) = setup(&[0x90, 0x91]);
        cpu.state_mut().a.set_word(0x1111);
        cpu.state_mut().c.set_word(0x2222);

        cpu.cycles(2).unwrap();
        assert_eq!(cpu.state().a.word(), 0x2222);
        assert_eq!(cpu.state().c.word(), 0x1111);
    }

    #[test]
    fn test_mov_segment_registers() {
        // MOV AX, 0x8000; MOV DS, AX; MOV BX, DS
        let (mut cpu, _bus) = setup(&[0xB8, 0x00, 0x80, 0x8E, 0xD8, 0x8C, 0xDB]);

        cpu.cycles(3).unwrap();
        assert_eq!(cpu.state().ds, 0x8000);
        assert_eq!(cpu.state().b.word(), 0x8000);
    }

    #[test]
    fn test_call_and_ret() {
        // CALL +0x10 at 0; RET at 0x13
        let (mut cpu, bus) = setup(&[0xE8, 0x10, 0x00]);
        cpu.state_mut().ss = 0x0000;
        cpu.state_mut().sp = 0x0100;
        poke(&bus, 0x0013, 0x0000, 0xC3);

        cpu.cycles(1).unwrap();
        assert_eq!(cpu.state().ip, 0x0013);

        cpu.cycles(1).unwrap();
        assert_eq!(cpu.state().ip, 0x0003);
        assert_eq!(cpu.state().sp, 0x0100);
    }

    #[test]
    fn test_loop_decrements_cx() {
        // LOOP -2 (spins on itself until CX exhausts)
        let (mut cpu, _bus) = setup(&[0xE2, 0xFE]);
        cpu.state_mut().c.set_word(3);

        cpu.cycles(3).unwrap();

        let state = cpu.snapshot();
        assert_eq!(state.c.word(), 0);
        assert_eq!(state.ip, 2);
    }

    #[test]
    fn test_xlat() {
        let (mut cpu, bus) = setup(&[0xD7]);
        cpu.state_mut().b.set_word(0x0300);
        cpu.state_mut().a.set_low(0x05);
        poke(&bus, 0x0305, 0x0000, 0x99);

        cpu.cycles(1).unwrap();
        assert_eq!(cpu.state().a.low(), 0x99);
    }

    #[test]
    fn test_les_loads_pair() {
        // LES BX, [0x0200]
        let (mut cpu, bus) = setup(&[0xC4, 0x1E, 0x00, 0x02]);
        poke(&bus, 0x0200, 0x0000, 0x34);
        poke(&bus, 0x0201, 0x0000, 0x12);
        poke(&bus, 0x0202, 0x0000, 0x00);
        poke(&bus, 0x0203, 0x0000, 0xB8);

        cpu.cycles(1).unwrap();
        assert_eq!(cpu.state().b.word(), 0x1234);
        assert_eq!(cpu.state().es, 0xB800);
    }

    #[test]
    fn test_daa_after_packed_add() {
        // MOV AL, 0x15; ADD AL, 0x27; DAA -> 0x42 in BCD.
        let (mut cpu, _bus) = setup(&[0xB0, 0x15, 0x04, 0x27, 0x27]);

        cpu.cycles(3).unwrap();
        assert_eq!(cpu.state().a.low(), 0x42);
        assert!(cpu.state().flags.a);
        assert!(!cpu.state().flags.c);
    }

    #[test]
    fn test_aam_splits_digits() {
        // MOV AL, 0x3F; AAM
        let (mut cpu, _bus) = setup(&[0xB0, 0x3F, 0xD4, 0x0A]);

        cpu.cycles(2).unwrap();
        // 63 = 6 * 10 + 3.
        assert_eq!(cpu.state().a.high(), 6);
        assert_eq!(cpu.state().a.low(), 3);
        assert_eq!(cpu.state().ip, 4);
    }

    #[test]
    fn test_aad_recombines_digits() {
        // AAD with AH = 6, AL = 3.
        let (mut cpu, _bus) = setup(&[0xD5, 0x0A]);
        cpu.state_mut().a.set_word(0x0603);

        cpu.cycles(1).unwrap();
        assert_eq!(cpu.state().a.word(), 0x003F);
    }

    #[test]
    fn test_cbw_cwd() {
        let (mut cpu, _bus) = setup(&[0x98, 0x99]);
        cpu.state_mut().a.set_word(0x0080);

        cpu.cycles(1).unwrap();
        assert_eq!(cpu.state().a.word(), 0xFF80);

        cpu.cycles(1).unwrap();
        assert_eq!(cpu.state().d.word(), 0xFFFF);
    }

    #[test]
    fn test_sahf_lahf_round_trip() {
        // SAHF; LAHF
        let (mut cpu, _bus) = setup(&[0x9E, 0x9F]);
        cpu.state_mut().a.set_high(0xD5);

        cpu.cycles(2).unwrap();
        // Only the low-byte flag bits survive the trip.
        assert_eq!(cpu.state().a.high(), 0xD5 & 0b1101_0101);
        assert!(cpu.state().flags.c);
        assert!(cpu.state().flags.z);
        assert!(cpu.state().flags.s);
    }

    #[test]
    fn test_mov_moffs_forms() {
        // MOV AX, [0x0200]; MOV [0x0202], AX
        let (mut cpu, bus) = setup(&[0xA1, 0x00, 0x02, 0xA3, 0x02, 0x02]);
        poke(&bus, 0x0200, 0x0000, 0xCD);
        poke(&bus, 0x0201, 0x0000, 0xAB);

        cpu.cycles(2).unwrap();
        assert_eq!(cpu.state().a.word(), 0xABCD);
        assert_eq!(peek(&bus, 0x0202, 0x0000), 0xCD);
        assert_eq!(peek(&bus, 0x0203, 0x0000), 0xAB);
    }

    #[test]
    fn test_rep_stosw() {
        // REP STOSW fills a word pattern.
        let (mut cpu, bus) = setup(&[0xF3, 0xAB]);
        cpu.state_mut().di = 0x0200;
        cpu.state_mut().c.set_word(3);
        cpu.state_mut().a.set_word(0x5AA5);

        cpu.cycles(1).unwrap();

        let state = cpu.snapshot();
        assert_eq!(state.c.word(), 0);
        assert_eq!(state.di, 0x0206);
        for i in 0..3u16 {
            assert_eq!(peek(&bus, 0x0200 + i * 2, 0x0000), 0xA5);
            assert_eq!(peek(&bus, 0x0201 + i * 2, 0x0000), 0x5A);
        }
    }

    #[test]
    fn test_lods_respects_direction_flag() {
        // STD; LODSB; LODSB
        let (mut cpu, bus) = setup(&[0xFD, 0xAC, 0xAC]);
        cpu.state_mut().si = 0x0201;
        poke(&bus, 0x0201, 0x0000, 0x11);
        poke(&bus, 0x0200, 0x0000, 0x22);

        cpu.cycles(2).unwrap();
        assert_eq!(cpu.state().a.low(), 0x11);
        assert_eq!(cpu.state().si, 0x0200);

        cpu.cycles(1).unwrap();
        assert_eq!(cpu.state().a.low(), 0x22);
        assert_eq!(cpu.state().si, 0x01FF);
    }

    #[test]
    fn test_call_far_retf_round_trip() {
        // CALL 0x0100:0x0005 ... RETF at 0x0100:0x0005.
        let (mut cpu, bus) = setup(&[0x9A, 0x05, 0x00, 0x00, 0x01]);
        cpu.state_mut().ss = 0x0000;
        cpu.state_mut().sp = 0x0100;
        // Physical 0x1005: RETF.
        poke(&bus, 0x0005, 0x0100, 0xCB);

        cpu.cycles(1).unwrap();
        assert_eq!(cpu.state().cs, 0x0100);
        assert_eq!(cpu.state().ip, 0x0005);

        cpu.cycles(1).unwrap();
        assert_eq!(cpu.state().cs, 0x0000);
        assert_eq!(cpu.state().ip, 0x0005);
        assert_eq!(cpu.state().sp, 0x0100);
    }

    #[test]
    fn test_jmp_far_loads_both_halves() {
        // JMP 0x0200:0x0010
        let (mut cpu, _bus) = setup(&[0xEA, 0x10, 0x00, 0x00, 0x02]);

        cpu.cycles(1).unwrap();
        assert_eq!(cpu.state().cs, 0x0200);
        assert_eq!(cpu.state().ip, 0x0010);
    }

    #[test]
    fn test_jcxz_taken_only_at_zero() {
        let (mut cpu, _bus) = setup(&[0xE3, 0x10]);
        cpu.state_mut().c.set_word(1);
        cpu.cycles(1).unwrap();
        assert_eq!(cpu.state().ip, 2);

        let (mut cpu, _bus) = setup(&[0xE3, 0x10]);
        cpu.cycles(1).unwrap();
        assert_eq!(cpu.state().ip, 0x12);
    }

    #[test]
    fn test_loope_requires_zero_flag() {
        // CMP AX, AX sets Z; LOOPE -4 keeps looping until CX drains.
        let (mut cpu, _bus) = setup(&[0x39, 0xC0, 0xE1, 0xFC]);
        cpu.state_mut().c.set_word(2);

        cpu.cycles(4).unwrap();

        let state = cpu.snapshot();
        assert_eq!(state.c.word(), 0);
        assert_eq!(state.ip, 4);
    }

    #[test]
    fn test_xchg_register_with_memory() {
        // XCHG AX, [0x0200]
        let (mut cpu, bus) = setup(&[0x87, 0x06, 0x00, 0x02]);
        cpu.state_mut().a.set_word(0x1111);
        poke(&bus, 0x0200, 0x0000, 0x22);
        poke(&bus, 0x0201, 0x0000, 0x22);

        cpu.cycles(1).unwrap();
        assert_eq!(cpu.state().a.word(), 0x2222);
        assert_eq!(peek(&bus, 0x0200, 0x0000), 0x11);
        assert_eq!(peek(&bus, 0x0201, 0x0000), 0x11);
    }

    #[test]
    fn test_group_83_sign_extends() {
        // ADD BX, -1 via the sign-extended immediate group.
        let (mut cpu, _bus) = setup(&[0x83, 0xC3, 0xFF]);
        cpu.state_mut().b.set_word(0x0005);

        cpu.cycles(1).unwrap();
        assert_eq!(cpu.state().b.word(), 0x0004);
        assert!(cpu.state().flags.c);
    }

    #[test]
    fn test_group_cmp_skips_write_back() {
        // CMP BYTE PTR [0x0200], 7 leaves memory untouched.
        let (mut cpu, bus) = setup(&[0x80, 0x3E, 0x00, 0x02, 0x07]);
        poke(&bus, 0x0200, 0x0000, 0x07);

        cpu.cycles(1).unwrap();
        assert_eq!(peek(&bus, 0x0200, 0x0000), 0x07);
        assert!(cpu.state().flags.z);
    }

    #[test]
    fn test_mov_rm_imm_groups() {
        // MOV BYTE PTR [0x0200], 0x77; MOV WORD PTR [0x0202], 0x1234
        let (mut cpu, bus) = setup(&[
            0xC6, 0x06, 0x00, 0x02, 0x77,
            0xC7, 0x06, 0x02, 0x02, 0x34, 0x12
        ]);

        cpu.cycles(2).unwrap();
        assert_eq!(peek(&bus, 0x0200, 0x0000), 0x77);
        assert_eq!(peek(&bus, 0x0202, 0x0000), 0x34);
        assert_eq!(peek(&bus, 0x0203, 0x0000), 0x12);
    }

    #[test]
    fn test_idiv_group() {
        // IDIV CL (F6 /7): -100 / 10.
        let (mut cpu, _bus) = setup(&[0xF6, 0xF9]);
        cpu.state_mut().a.set_word(0xFF9C);
        cpu.state_mut().c.set_low(0x0A);

        cpu.cycles(1).unwrap();
        assert_eq!(cpu.state().a.low(), 0xF6);
        assert_eq!(cpu.state().a.high(), 0x00);
    }

    #[test]
    fn test_div_group_word() {
        // DIV CX (F7 /6): 0x0001_2345 / 0x0100.
        let (mut cpu, _bus) = setup(&[0xF7, 0xF1]);
        cpu.state_mut().d.set_word(0x0001);
        cpu.state_mut().a.set_word(0x2345);
        cpu.state_mut().c.set_word(0x0100);

        cpu.cycles(1).unwrap();
        assert_eq!(cpu.state().a.word(), 0x0123);
        assert_eq!(cpu.state().d.word(), 0x0045);
    }

    #[test]
    fn test_into_dispatches_on_overflow() {
        let (mut cpu, bus) = setup(&[0xCE]);
        cpu.state_mut().ss = 0x0000;
        cpu.state_mut().sp = 0x0100;
        cpu.state_mut().flags.o = true;
        // Vector 4 at physical 0x10.
        poke(&bus, 0x0010, 0x0000, 0x00);
        poke(&bus, 0x0011, 0x0000, 0x06);

        cpu.cycles(1).unwrap();
        assert_eq!(cpu.state().ip, 0x0600);

        let (mut cpu, _bus) = setup(&[0xCE]);
        cpu.cycles(1).unwrap();
        assert_eq!(cpu.state().ip, 1);
    }

    #[test]
    fn test_pushf_popf_round_trip() {
        // PUSHF; POPF
        let (mut cpu, _bus) = setup(&[0x9C, 0x9D]);
        cpu.state_mut().ss = 0x0000;
        cpu.state_mut().sp = 0x0100;
        cpu.state_mut().flags.set(0x0AD5);

        cpu.cycles(2).unwrap();
        assert_eq!(cpu.state().flags.get(), 0x0AD5);
        assert_eq!(cpu.state().sp, 0x0100);
    }

    #[test]
    fn test_breakpoints_do_not_affect_execution() {
        let (mut cpu, _bus) = setup(&[0x40, 0x40]);
        cpu.set_breakpoint(0x0001, true);

        cpu.cycles(2).unwrap();
        assert_eq!(cpu.state().a.word(), 2);
        assert!(cpu.breakpoints().contains(0x0001));

        cpu.set_breakpoint(0x0001, false);
        assert!(!cpu.breakpoints().contains(0x0001));
    }
}
