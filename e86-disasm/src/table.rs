//! Static opcode tables mirroring the executor's instruction encoding.

/// How an operand slot is fetched and rendered.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum Operand {
    /// No operand; renders as an empty string.
    None,
    /// Operand is spelled inside the mnemonic template; renders as empty.
    Implied,
    /// Signed 8-bit relative offset, decimal.
    Rel8,
    /// Sign-extended 8-bit immediate, decimal.
    Se8,
    /// Unsigned 8-bit immediate, decimal.
    I8,
    /// Unsigned 16-bit immediate, decimal.
    I16,
    /// Byte-sized register-or-memory operand from the ModR/M byte.
    Rm8,
    /// Word-sized register-or-memory operand from the ModR/M byte.
    Rm16,
    /// Byte register selected by the ModR/M reg field.
    R8,
    /// Word register selected by the ModR/M reg field.
    R16,
    /// 16-bit absolute offset, hexadecimal.
    Addr,
    /// Far pointer: 16-bit offset then 16-bit segment.
    SegAddr
}

/// One opcode-table row: a template with up to two `{}` slots plus the
/// operand kinds that fill them.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Entry {
    pub mnemonic: &'static str,
    pub operand1: Operand,
    pub operand2: Operand,
    pub has_modrm: bool
}

const fn e(mnemonic: &'static str, operand1: Operand, operand2: Operand, has_modrm: bool) -> Entry {
    Entry { mnemonic, operand1, operand2, has_modrm }
}

use Operand::{Addr, I16, I8, Implied, None as NoOp, R16, R8, Rel8, Rm16, Rm8, Se8, SegAddr};

/// Memory-operand base expressions indexed by the ModR/M rm field.
pub(crate) const EA_BASE: [&str; 8] = [
    "BX + SI", "BX + DI", "BP + SI", "BP + DI", "SI", "DI", "BP", "BX"
];

/// Byte register names in ModR/M encoding order.
pub(crate) const REG8_NAMES: [&str; 8] = ["AL", "CL", "DL", "BL", "AH", "CH", "DH", "BH"];

/// Word register names in ModR/M encoding order.
pub(crate) const REG16_NAMES: [&str; 8] = ["AX", "CX", "DX", "BX", "SP", "BP", "SI", "DI"];

/// Maps a group opcode to its block index in [`GROUP_TABLE`].
pub(crate) fn group_index(opcode: u8) -> Option<usize> {
    match opcode {
        0x80 => Some(0),
        0x81 => Some(1),
        0x82 => Some(2),
        0x83 => Some(3),
        0x8C => Some(4),
        0x8E => Some(5),
        0x8F => Some(6),
        0xC6 => Some(7),
        0xC7 => Some(8),
        0xD0 => Some(9),
        0xD1 => Some(10),
        0xD2 => Some(11),
        0xD3 => Some(12),
        0xF6 => Some(13),
        0xF7 => Some(14),
        0xFE => Some(15),
        0xFF => Some(16),
        _ => None
    }
}

/// The primary 256-entry opcode table. `GRP` rows defer to [`GROUP_TABLE`]
/// through the ModR/M reg field.
pub(crate) const INSTR_TABLE: [Entry; 256] = [
    // 0x00 - 0x0F
    e("ADD {}, {}", Rm8, R8, true), e("ADD {}, {}", Rm16, R16, true),
    e("ADD {}, {}", R8, Rm8, true), e("ADD {}, {}", R16, Rm16, true),
    e("ADD AL, {}{}", Implied, I8, false), e("ADD AX, {}{}", Implied, I16, false),
    e("PUSH ES", Implied, NoOp, false), e("POP ES", Implied, NoOp, false),
    e("OR {}, {}", Rm8, R8, true), e("OR {}, {}", Rm16, R16, true),
    e("OR {}, {}", R8, Rm8, true), e("OR {}, {}", R16, Rm16, true),
    e("OR AL, {}{}", Implied, I8, false), e("OR AX, {}{}", Implied, I16, false),
    e("PUSH CS", Implied, NoOp, false), e("POP CS", Implied, NoOp, false),
    // 0x10 - 0x1F
    e("ADC {}, {}", Rm8, R8, true), e("ADC {}, {}", Rm16, R16, true),
    e("ADC {}, {}", R8, Rm8, true), e("ADC {}, {}", R16, Rm16, true),
    e("ADC AL, {}{}", Implied, I8, false), e("ADC AX, {}{}", Implied, I16, false),
    e("PUSH SS", Implied, NoOp, false), e("POP SS", Implied, NoOp, false),
    e("SBB {}, {}", Rm8, R8, true), e("SBB {}, {}", Rm16, R16, true),
    e("SBB {}, {}", R8, Rm8, true), e("SBB {}, {}", R16, Rm16, true),
    e("SBB AL, {}{}", Implied, I8, false), e("SBB AX, {}{}", Implied, I16, false),
    e("PUSH DS", Implied, NoOp, false), e("POP DS", Implied, NoOp, false),
    // 0x20 - 0x2F
    e("AND {}, {}", Rm8, R8, true), e("AND {}, {}", Rm16, R16, true),
    e("AND {}, {}", R8, Rm8, true), e("AND {}, {}", R16, Rm16, true),
    e("AND AL, {}{}", Implied, I8, false), e("AND AX, {}{}", Implied, I16, false),
    e("ES:", NoOp, NoOp, false), e("DAA", NoOp, NoOp, false),
    e("SUB {}, {}", Rm8, R8, true), e("SUB {}, {}", Rm16, R16, true),
    e("SUB {}, {}", R8, Rm8, true), e("SUB {}, {}", R16, Rm16, true),
    e("SUB AL, {}{}", Implied, I8, false), e("SUB AX, {}{}", Implied, I16, false),
    e("CS:", NoOp, NoOp, false), e("DAS", NoOp, NoOp, false),
    // 0x30 - 0x3F
    e("XOR {}, {}", Rm8, R8, true), e("XOR {}, {}", Rm16, R16, true),
    e("XOR {}, {}", R8, Rm8, true), e("XOR {}, {}", R16, Rm16, true),
    e("XOR AL, {}{}", Implied, I8, false), e("XOR AX, {}{}", Implied, I16, false),
    e("SS:", NoOp, NoOp, false), e("AAA", NoOp, NoOp, false),
    e("CMP {}, {}", Rm8, R8, true), e("CMP {}, {}", Rm16, R16, true),
    e("CMP {}, {}", R8, Rm8, true), e("CMP {}, {}", R16, Rm16, true),
    e("CMP AL, {}{}", Implied, I8, false), e("CMP AX, {}{}", Implied, I16, false),
    e("DS:", NoOp, NoOp, false), e("AAS", NoOp, NoOp, false),
    // 0x40 - 0x4F
    e("INC AX", Implied, NoOp, false), e("INC CX", Implied, NoOp, false),
    e("INC DX", Implied, NoOp, false), e("INC BX", Implied, NoOp, false),
    e("INC SP", Implied, NoOp, false), e("INC BP", Implied, NoOp, false),
    e("INC SI", Implied, NoOp, false), e("INC DI", Implied, NoOp, false),
    e("DEC AX", Implied, NoOp, false), e("DEC CX", Implied, NoOp, false),
    e("DEC DX", Implied, NoOp, false), e("DEC BX", Implied, NoOp, false),
    e("DEC SP", Implied, NoOp, false), e("DEC BP", Implied, NoOp, false),
    e("DEC SI", Implied, NoOp, false), e("DEC DI", Implied, NoOp, false),
    // 0x50 - 0x5F
    e("PUSH AX", Implied, NoOp, false), e("PUSH CX", Implied, NoOp, false),
    e("PUSH DX", Implied, NoOp, false), e("PUSH BX", Implied, NoOp, false),
    e("PUSH SP", Implied, NoOp, false), e("PUSH BP", Implied, NoOp, false),
    e("PUSH SI", Implied, NoOp, false), e("PUSH DI", Implied, NoOp, false),
    e("POP AX", Implied, NoOp, false), e("POP CX", Implied, NoOp, false),
    e("POP DX", Implied, NoOp, false), e("POP BX", Implied, NoOp, false),
    e("POP SP", Implied, NoOp, false), e("POP BP", Implied, NoOp, false),
    e("POP SI", Implied, NoOp, false), e("POP DI", Implied, NoOp, false),
    // 0x60 - 0x6F: reserved encodings decode as NOP
    e("NOP", NoOp, NoOp, false), e("NOP", NoOp, NoOp, false),
    e("NOP", NoOp, NoOp, false), e("NOP", NoOp, NoOp, false),
    e("NOP", NoOp, NoOp, false), e("NOP", NoOp, NoOp, false),
    e("NOP", NoOp, NoOp, false), e("NOP", NoOp, NoOp, false),
    e("NOP", NoOp, NoOp, false), e("NOP", NoOp, NoOp, false),
    e("NOP", NoOp, NoOp, false), e("NOP", NoOp, NoOp, false),
    e("NOP", NoOp, NoOp, false), e("NOP", NoOp, NoOp, false),
    e("NOP", NoOp, NoOp, false), e("NOP", NoOp, NoOp, false),
    // 0x70 - 0x7F
    e("JO {}{}", Rel8, NoOp, false), e("JNO {}{}", Rel8, NoOp, false),
    e("JC {}{}", Rel8, NoOp, false), e("JNC {}{}", Rel8, NoOp, false),
    e("JZ {}{}", Rel8, NoOp, false), e("JNZ {}{}", Rel8, NoOp, false),
    e("JNA {}{}", Rel8, NoOp, false), e("JA {}{}", Rel8, NoOp, false),
    e("JS {}{}", Rel8, NoOp, false), e("JNS {}{}", Rel8, NoOp, false),
    e("JP {}{}", Rel8, NoOp, false), e("JNP {}{}", Rel8, NoOp, false),
    e("JL {}{}", Rel8, NoOp, false), e("JNL {}{}", Rel8, NoOp, false),
    e("JLE {}{}", Rel8, NoOp, false), e("JG {}{}", Rel8, NoOp, false),
    // 0x80 - 0x8F
    e("GRP", NoOp, NoOp, true), e("GRP", NoOp, NoOp, true),
    e("GRP", NoOp, NoOp, true), e("GRP", NoOp, NoOp, true),
    e("TEST {}, {}", Rm8, R8, true), e("TEST {}, {}", Rm16, R16, true),
    e("XCHG {}, {}", R8, Rm8, true), e("XCHG {}, {}", R16, Rm16, true),
    e("MOV {}, {}", Rm8, R8, true), e("MOV {}, {}", Rm16, R16, true),
    e("MOV {}, {}", R8, Rm8, true), e("MOV {}, {}", R16, Rm16, true),
    e("GRP", NoOp, NoOp, true), e("LEA {}, {}", R16, Rm16, true),
    e("GRP", NoOp, NoOp, true), e("GRP", NoOp, NoOp, true),
    // 0x90 - 0x9F
    e("NOP", NoOp, NoOp, false), e("XCHG CX", Implied, NoOp, false),
    e("XCHG DX", Implied, NoOp, false), e("XCHG BX", Implied, NoOp, false),
    e("XCHG SP", Implied, NoOp, false), e("XCHG BP", Implied, NoOp, false),
    e("XCHG SI", Implied, NoOp, false), e("XCHG DI", Implied, NoOp, false),
    e("CBW", NoOp, NoOp, false), e("CWD", NoOp, NoOp, false),
    e("CALL {}{}", SegAddr, NoOp, false), e("WAIT", NoOp, NoOp, false),
    e("PUSHF", NoOp, NoOp, false), e("POPF", NoOp, NoOp, false),
    e("SAHF", NoOp, NoOp, false), e("LAHF", NoOp, NoOp, false),
    // 0xA0 - 0xAF
    e("MOV AL, {}{}", Implied, Addr, false), e("MOV AX, {}{}", Implied, Addr, false),
    e("MOV {}{}, AL", Addr, Implied, false), e("MOV {}{}, AX", Addr, Implied, false),
    e("MOVSB", NoOp, NoOp, false), e("MOVSW", NoOp, NoOp, false),
    e("CMPSB", NoOp, NoOp, false), e("CMPSW", NoOp, NoOp, false),
    e("TEST AL, {}{}", Implied, I8, false), e("TEST AX, {}{}", Implied, I16, false),
    e("STOSB", NoOp, NoOp, false), e("STOSW", NoOp, NoOp, false),
    e("LODSB", NoOp, NoOp, false), e("LODSW", NoOp, NoOp, false),
    e("SCASB", NoOp, NoOp, false), e("SCASW", NoOp, NoOp, false),
    // 0xB0 - 0xBF
    e("MOV AL, {}{}", Implied, I8, false), e("MOV CL, {}{}", Implied, I8, false),
    e("MOV DL, {}{}", Implied, I8, false), e("MOV BL, {}{}", Implied, I8, false),
    e("MOV AH, {}{}", Implied, I8, false), e("MOV CH, {}{}", Implied, I8, false),
    e("MOV DH, {}{}", Implied, I8, false), e("MOV BH, {}{}", Implied, I8, false),
    e("MOV AX, {}{}", Implied, I16, false), e("MOV CX, {}{}", Implied, I16, false),
    e("MOV DX, {}{}", Implied, I16, false), e("MOV BX, {}{}", Implied, I16, false),
    e("MOV SP, {}{}", Implied, I16, false), e("MOV BP, {}{}", Implied, I16, false),
    e("MOV SI, {}{}", Implied, I16, false), e("MOV DI, {}{}", Implied, I16, false),
    // 0xC0 - 0xCF
    e("NOP", NoOp, NoOp, false), e("NOP", NoOp, NoOp, false),
    e("RET {}{}", I16, NoOp, false), e("RET", NoOp, NoOp, false),
    e("LES {}, {}", R16, Rm16, true), e("LDS {}, {}", R16, Rm16, true),
    e("GRP", NoOp, NoOp, true), e("GRP", NoOp, NoOp, true),
    e("NOP", NoOp, NoOp, false), e("NOP", NoOp, NoOp, false),
    e("RETF {}{}", I16, NoOp, false), e("RETF", NoOp, NoOp, false),
    e("INT 3", Implied, NoOp, false), e("INT {}{}", I8, NoOp, false),
    e("INTO", NoOp, NoOp, false), e("IRET", NoOp, NoOp, false),
    // 0xD0 - 0xDF
    e("GRP", NoOp, NoOp, true), e("GRP", NoOp, NoOp, true),
    e("GRP", NoOp, NoOp, true), e("GRP", NoOp, NoOp, true),
    e("AAM {}{}", I8, NoOp, false), e("AAD {}{}", I8, NoOp, false),
    e("NOP", NoOp, NoOp, false), e("XLAT", NoOp, NoOp, false),
    e("ESC", NoOp, NoOp, false), e("ESC", NoOp, NoOp, false),
    e("ESC", NoOp, NoOp, false), e("ESC", NoOp, NoOp, false),
    e("ESC", NoOp, NoOp, false), e("ESC", NoOp, NoOp, false),
    e("ESC", NoOp, NoOp, false), e("ESC", NoOp, NoOp, false),
    // 0xE0 - 0xEF
    e("LOOPNZ {}{}", Rel8, NoOp, false), e("LOOPZ {}{}", Rel8, NoOp, false),
    e("LOOP {}{}", Rel8, NoOp, false), e("JCXZ {}{}", Rel8, Implied, false),
    e("IN AL, {}{}", Implied, I8, false), e("IN AX, {}{}", Implied, I8, false),
    e("OUT {}, AL", I8, Implied, false), e("OUT {}, AX", I8, Implied, false),
    e("CALL {}", Addr, NoOp, false), e("JMP {}", Addr, NoOp, false),
    e("JMP {}{}", SegAddr, NoOp, false), e("JMP {}{}", Rel8, NoOp, false),
    e("IN AL, DX", Implied, Implied, false), e("IN AX, DX", Implied, Implied, false),
    e("OUT DX, AL", Implied, Implied, false), e("OUT DX, AX", Implied, Implied, false),
    // 0xF0 - 0xFF
    e("LOCK", NoOp, NoOp, false), e("NOP", NoOp, NoOp, false),
    e("REPNZ", NoOp, NoOp, false), e("REP", NoOp, NoOp, false),
    e("HLT", NoOp, NoOp, false), e("CMC", NoOp, NoOp, false),
    e("GRP", NoOp, NoOp, true), e("GRP", NoOp, NoOp, true),
    e("CLC", NoOp, NoOp, false), e("STC", NoOp, NoOp, false),
    e("CLI", NoOp, NoOp, false), e("STI", NoOp, NoOp, false),
    e("CLD", NoOp, NoOp, false), e("STD", NoOp, NoOp, false),
    e("GRP", NoOp, NoOp, true), e("GRP", NoOp, NoOp, true)
];

/// The group table: one eight-entry block per group opcode, selected by the
/// ModR/M reg field. The indirect CALL/JMP rows of 0xFF render their r/m16
/// operand so the decoded length always matches what the executor consumes.
pub(crate) const GROUP_TABLE: [Entry; 136] = [
    // 0x80
    e("ADD {}, {}", Rm8, I8, false), e("OR {}, {}", Rm8, I8, false),
    e("ADC {}, {}", Rm8, I8, false), e("SBB {}, {}", Rm8, I8, false),
    e("AND {}, {}", Rm8, I8, false), e("SUB {}, {}", Rm8, I8, false),
    e("XOR {}, {}", Rm8, I8, false), e("CMP {}, {}", Rm8, I8, false),
    // 0x81
    e("ADD {}, {}", Rm16, I16, false), e("OR {}, {}", Rm16, I16, false),
    e("ADC {}, {}", Rm16, I16, false), e("SBB {}, {}", Rm16, I16, false),
    e("AND {}, {}", Rm16, I16, false), e("SUB {}, {}", Rm16, I16, false),
    e("XOR {}, {}", Rm16, I16, false), e("CMP {}, {}", Rm16, I16, false),
    // 0x82
    e("ADD {}, {}", Rm8, I8, false), e("OR {}, {}", Rm8, I8, false),
    e("ADC {}, {}", Rm8, I8, false), e("SBB {}, {}", Rm8, I8, false),
    e("AND {}, {}", Rm8, I8, false), e("SUB {}, {}", Rm8, I8, false),
    e("XOR {}, {}", Rm8, I8, false), e("CMP {}, {}", Rm8, I8, false),
    // 0x83
    e("ADD {}, {}", Rm16, Se8, false), e("OR {}, {}", Rm16, Se8, false),
    e("ADC {}, {}", Rm16, Se8, false), e("SBB {}, {}", Rm16, Se8, false),
    e("AND {}, {}", Rm16, Se8, false), e("SUB {}, {}", Rm16, Se8, false),
    e("XOR {}, {}", Rm16, Se8, false), e("CMP {}, {}", Rm16, Se8, false),
    // 0x8C: the reserved sreg rows still decode their r/m operand, since
    // the executor resolves the effective address before checking reg.
    e("MOV {}, ES", Rm16, Implied, false), e("MOV {}, CS", Rm16, Implied, false),
    e("MOV {}, SS", Rm16, Implied, false), e("MOV {}, DS", Rm16, Implied, false),
    e("NOP", Rm16, Implied, false), e("NOP", Rm16, Implied, false),
    e("NOP", Rm16, Implied, false), e("NOP", Rm16, Implied, false),
    // 0x8E: same as 0x8C, with the operand in the source slot.
    e("MOV ES, {}{}", Implied, Rm16, false), e("MOV CS, {}{}", Implied, Rm16, false),
    e("MOV SS, {}{}", Implied, Rm16, false), e("MOV DS, {}{}", Implied, Rm16, false),
    e("NOP", Implied, Rm16, false), e("NOP", Implied, Rm16, false),
    e("NOP", Implied, Rm16, false), e("NOP", Implied, Rm16, false),
    // 0x8F
    e("POP {}", Rm16, NoOp, false), e("NOP", NoOp, NoOp, false),
    e("NOP", NoOp, NoOp, false), e("NOP", NoOp, NoOp, false),
    e("NOP", NoOp, NoOp, false), e("NOP", NoOp, NoOp, false),
    e("NOP", NoOp, NoOp, false), e("NOP", NoOp, NoOp, false),
    // 0xC6
    e("MOV {}, {}", Rm8, I8, false), e("NOP", NoOp, NoOp, false),
    e("NOP", NoOp, NoOp, false), e("NOP", NoOp, NoOp, false),
    e("NOP", NoOp, NoOp, false), e("NOP", NoOp, NoOp, false),
    e("NOP", NoOp, NoOp, false), e("NOP", NoOp, NoOp, false),
    // 0xC7
    e("MOV {}, {}", Rm16, I16, false), e("NOP", NoOp, NoOp, false),
    e("NOP", NoOp, NoOp, false), e("NOP", NoOp, NoOp, false),
    e("NOP", NoOp, NoOp, false), e("NOP", NoOp, NoOp, false),
    e("NOP", NoOp, NoOp, false), e("NOP", NoOp, NoOp, false),
    // 0xD0
    e("ROL {}, 1", Rm8, Implied, false), e("ROR {}, 1", Rm8, Implied, false),
    e("RCL {}, 1", Rm8, Implied, false), e("RCR {}, 1", Rm8, Implied, false),
    e("SHL {}, 1", Rm8, Implied, false), e("SHR {}, 1", Rm8, Implied, false),
    e("NOP", NoOp, NoOp, false), e("SAR {}, 1", Rm8, Implied, false),
    // 0xD1
    e("ROL {}, 1", Rm16, Implied, false), e("ROR {}, 1", Rm16, Implied, false),
    e("RCL {}, 1", Rm16, Implied, false), e("RCR {}, 1", Rm16, Implied, false),
    e("SHL {}, 1", Rm16, Implied, false), e("SHR {}, 1", Rm16, Implied, false),
    e("NOP", NoOp, NoOp, false), e("SAR {}, 1", Rm16, Implied, false),
    // 0xD2
    e("ROL {}, CL", Rm8, Implied, false), e("ROR {}, CL", Rm8, Implied, false),
    e("RCL {}, CL", Rm8, Implied, false), e("RCR {}, CL", Rm8, Implied, false),
    e("SHL {}, CL", Rm8, Implied, false), e("SHR {}, CL", Rm8, Implied, false),
    e("NOP", NoOp, NoOp, false), e("SAR {}, CL", Rm8, Implied, false),
    // 0xD3
    e("ROL {}, CL", Rm16, Implied, false), e("ROR {}, CL", Rm16, Implied, false),
    e("RCL {}, CL", Rm16, Implied, false), e("RCR {}, CL", Rm16, Implied, false),
    e("SHL {}, CL", Rm16, Implied, false), e("SHR {}, CL", Rm16, Implied, false),
    e("NOP", NoOp, NoOp, false), e("SAR {}, CL", Rm16, Implied, false),
    // 0xF6
    e("TEST {}, {}", Rm8, I8, false), e("NOP", NoOp, NoOp, false),
    e("NOT {}", Rm8, NoOp, false), e("NEG {}", Rm8, NoOp, false),
    e("MUL {}", Rm8, NoOp, false), e("IMUL {}", Rm8, NoOp, false),
    e("DIV {}", Rm8, NoOp, false), e("IDIV {}", Rm8, NoOp, false),
    // 0xF7
    e("TEST {}, {}", Rm16, I16, false), e("NOP", NoOp, NoOp, false),
    e("NOT {}", Rm16, NoOp, false), e("NEG {}", Rm16, NoOp, false),
    e("MUL {}", Rm16, NoOp, false), e("IMUL {}", Rm16, NoOp, false),
    e("DIV {}", Rm16, NoOp, false), e("IDIV {}", Rm16, NoOp, false),
    // 0xFE
    e("INC {}", Rm8, NoOp, false), e("DEC {}", Rm8, NoOp, false),
    e("NOP", NoOp, NoOp, false), e("NOP", NoOp, NoOp, false),
    e("NOP", NoOp, NoOp, false), e("NOP", NoOp, NoOp, false),
    e("NOP", NoOp, NoOp, false), e("NOP", NoOp, NoOp, false),
    // 0xFF
    e("INC {}", Rm16, NoOp, false), e("DEC {}", Rm16, NoOp, false),
    e("CALL {}", Rm16, NoOp, false), e("CALL FAR {}", Rm16, NoOp, false),
    e("JMP {}", Rm16, NoOp, false), e("JMP FAR {}", Rm16, NoOp, false),
    e("PUSH {}", Rm16, NoOp, false), e("NOP", NoOp, NoOp, false)
];
