//! Text panels: registers, flags and the disassembly listing.

use std::fmt::Write;

use e86_core::state::CpuState;
use e86_disasm::Disassembler;

use crate::theme::ColorTheme;

/// Formats the register panel in two columns, general then segment.
pub fn registers(state: &CpuState) -> String {
    let mut panel = String::new();

    let _ = writeln!(panel, "AX {:04X}    CS {:04X}", state.a.word(), state.cs);
    let _ = writeln!(panel, "BX {:04X}    DS {:04X}", state.b.word(), state.ds);
    let _ = writeln!(panel, "CX {:04X}    SS {:04X}", state.c.word(), state.ss);
    let _ = writeln!(panel, "DX {:04X}    ES {:04X}", state.d.word(), state.es);
    let _ = writeln!(panel, "SP {:04X}    IP {:04X}", state.sp, state.ip);
    let _ = writeln!(panel, "BP {:04X}", state.bp);
    let _ = writeln!(panel, "SI {:04X}", state.si);
    let _ = writeln!(panel, "DI {:04X}", state.di);

    panel
}

/// Formats the flag row; set flags show their letter, clear flags a dot.
pub fn flags(state: &CpuState) -> String {
    let mark = |set: bool| if set { '1' } else { '.' };
    let f = &state.flags;

    format!(
        "O{} D{} I{} T{} S{} Z{} A{} P{} C{}",
        mark(f.o), mark(f.d), mark(f.i),
        mark(f.t), mark(f.s), mark(f.z),
        mark(f.a), mark(f.p), mark(f.c)
    )
}

/// Formats the disassembly listing: address, raw bytes padded for
/// alignment, breakpoint marker and the colored instruction text.
pub fn listing(disassembler: &Disassembler, theme: &ColorTheme) -> String {
    let mut text = String::new();
    let byte_column = usize::from(disassembler.max_instr_bytes()) * 3;

    for instruction in disassembler.instructions() {
        let mut bytes = String::new();
        for byte in &instruction.bytes {
            let _ = write!(bytes, "{:02X} ", byte);
        }

        let mut line = String::new();
        for token in &instruction.tokens {
            let styled = theme.token_style(token.kind).apply_to(&token.text);
            let _ = write!(line, "{}", styled);
            if token.trailing_space {
                line.push(' ');
            }
        }

        let marker = if instruction.breakpoint { '*' } else { ' ' };
        let _ = writeln!(
            text,
            "{} {} {:byte_column$} {}",
            marker,
            theme.address_style().apply_to(format!("{:05X}", instruction.address)),
            theme.bytes_style().apply_to(bytes),
            line.trim_end()
        );
    }

    text
}
