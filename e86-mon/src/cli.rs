use std::path::PathBuf;

use clap::Parser;

/// What the monitor was asked to do.
pub enum Mode {
    /// Execute the image and print the CPU panel afterwards.
    Run {
        image: PathBuf,
        base: u32,
        memory: usize,
        steps: u32,
        breakpoints: Vec<u32>,
        theme: Option<PathBuf>,
        output: Option<PathBuf>
    },
    /// Decode the image into a listing without executing it.
    Disassemble {
        image: PathBuf,
        base: u32,
        memory: usize,
        theme: Option<PathBuf>
    },
    /// Write the loaded memory image to a file without executing anything.
    Dump {
        image: PathBuf,
        base: u32,
        memory: usize,
        output: PathBuf
    }
}

/// Drives the e86 emulator core from the terminal.
#[derive(Parser)]
#[command(name = "e86-mon")]
pub struct Options {
    /// Raw binary image to load into memory.
    ///
    /// No headers are interpreted; the file bytes are copied verbatim to
    /// the load address.
    #[arg(short, long)]
    image: PathBuf,
    /// Physical load address for the image (decimal or 0x-prefixed hex).
    ///
    /// Execution starts with CS:IP pointing at this address.
    #[arg(short, long, default_value = "0", value_parser = parse_address)]
    base: u32,
    /// Size of the RAM device in bytes.
    #[arg(long, default_value = "1048576", value_parser = parse_size)]
    memory: usize,
    /// Number of instructions to execute.
    #[arg(short, long, default_value_t = 0)]
    steps: u32,
    /// Decodes the image into a listing instead of running it.
    #[arg(short, long)]
    disassemble: bool,
    /// Writes the loaded memory image to the `--output` file without
    /// executing anything.
    #[arg(long, requires = "output")]
    dump: bool,
    /// Breakpoint at a physical address; stepping stops there. May repeat.
    #[arg(long = "breakpoint", value_parser = parse_address)]
    breakpoints: Vec<u32>,
    /// Color theme for the listing and panels.
    #[arg(short, long)]
    theme: Option<PathBuf>,
    /// Destination file for the memory image (after the run, or as the
    /// target of `--dump`).
    #[arg(short, long)]
    output: Option<PathBuf>
}
impl Options {
    pub fn from_command_line() -> Self {
        Self::parse()
    }

    pub fn into_mode(self) -> Mode {
        if self.disassemble {
            Mode::Disassemble {
                image: self.image,
                base: self.base,
                memory: self.memory,
                theme: self.theme
            }
        } else if self.dump {
            Mode::Dump {
                image: self.image,
                base: self.base,
                memory: self.memory,
                // `--dump` requires `--output`; clap rejects the bare form.
                output: self.output.unwrap_or_default()
            }
        } else {
            Mode::Run {
                image: self.image,
                base: self.base,
                memory: self.memory,
                steps: self.steps,
                breakpoints: self.breakpoints,
                theme: self.theme,
                output: self.output
            }
        }
    }
}

fn parse_address(text: &str) -> Result<u32, String> {
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else {
        text.parse()
    };

    match parsed {
        Ok(address) if address <= 0xF_FFFF => Ok(address),
        Ok(_) => Err(String::from("address exceeds the 20-bit physical space")),
        Err(e) => Err(e.to_string())
    }
}

fn parse_size(text: &str) -> Result<usize, String> {
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16)
    } else {
        text.parse()
    };

    match parsed {
        Ok(size) if size > 0 && size <= 0x10_0000 => Ok(size),
        Ok(_) => Err(String::from("memory size must be between 1 byte and 1 MiB")),
        Err(e) => Err(e.to_string())
    }
}
