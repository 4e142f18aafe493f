use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use console::{style, Emoji};
use indicatif::{ProgressBar, ProgressStyle};

use e86_core::bus::{physical_address, MemoryBus};
use e86_core::cpu::Cpu;
use e86_core::ram::Ram;
use e86_disasm::Disassembler;

use e86_mon::cli::{Mode, Options};
use e86_mon::error::MonitorResult;
use e86_mon::panel;
use e86_mon::theme::ColorTheme;

struct Machine {
    bus: Rc<RefCell<MemoryBus>>,
    image_size: usize
}

fn boot(image: &Path, base: u32, memory: usize) -> MonitorResult<Machine> {
    let bus = Rc::new(RefCell::new(MemoryBus::new()));
    let ram = Rc::new(RefCell::new(Ram::new(memory)));

    let image_size = ram.borrow_mut().load_image(image, base)?;
    bus.borrow_mut().attach_device(ram, 0, memory as u32 - 1)?;

    println!(
        "{} {} {} bytes at {:#07X}",
        Emoji("ℹ️", "ℹ"), style("Loaded:").bright().cyan(), image_size, base
    );

    Ok(Machine { bus, image_size })
}

fn load_theme(path: Option<PathBuf>) -> MonitorResult<ColorTheme> {
    match path {
        Some(path) => ColorTheme::load(path),
        None => Ok(ColorTheme::default())
    }
}

fn run(
    image: PathBuf,
    base: u32,
    memory: usize,
    steps: u32,
    breakpoints: Vec<u32>,
    theme: Option<PathBuf>,
    output: Option<PathBuf>
) -> MonitorResult<()> {
    println!("{} {} {}", Emoji("ℹ️", "ℹ"), style("Mode:").bright().cyan(), "run");

    let theme = load_theme(theme)?;
    let machine = boot(&image, base, memory)?;

    let mut cpu = Cpu::new(machine.bus.clone());
    cpu.state_mut().cs = (base >> 4) as u16;
    cpu.state_mut().ip = (base & 0xF) as u16;

    for &address in &breakpoints {
        cpu.set_breakpoint(address, true);
    }

    let bar = ProgressBar::new(u64::from(steps));
    bar.set_style(
        ProgressStyle::with_template("{spinner}  {msg:24} [{bar:64.cyan/blue}]  {percent}%")
            .unwrap()
            .progress_chars("#>-")
    );
    bar.set_message("Executing...");

    let mut executed = 0;
    while executed < steps {
        let state = cpu.snapshot();
        let next = physical_address(state.ip, state.cs);

        if executed > 0 && cpu.breakpoints().contains(next) {
            bar.finish_and_clear();
            println!(
                "{} {} {:#07X}",
                Emoji("⏸️", "||"), style("Breakpoint:").bright().yellow(), next
            );
            break;
        }

        cpu.cycles(1)?;
        executed += 1;
        bar.inc(1);

        if cpu.state().halted {
            bar.finish_and_clear();
            println!(
                "{} {} after {} instruction(s)",
                Emoji("ℹ️", "ℹ"), style("Halted:").bright().yellow(), executed
            );
            break;
        }
    }
    bar.finish_and_clear();

    let state = cpu.snapshot();
    println!();
    print!("{}", panel::registers(&state));
    println!("{}", panel::flags(&state));

    println!();
    let mut disassembler = Disassembler::new(machine.bus.clone());
    disassembler.disassemble(base, base + machine.image_size as u32)?;
    for instruction in disassembler.instructions_mut() {
        instruction.breakpoint = breakpoints.contains(&instruction.address);
    }
    print!("{}", panel::listing(&disassembler, &theme));

    if let Some(output) = output {
        let mut dump = Vec::new();
        machine.bus.borrow().dump_memory(&mut dump)?;
        std::fs::write(&output, &dump)?;
        println!(
            "{} {} {}",
            Emoji("✔️", "✔"), style("Dumped:").bright().green(), output.display()
        );
    }

    Ok(())
}

fn dump(image: PathBuf, base: u32, memory: usize, output: PathBuf) -> MonitorResult<()> {
    println!("{} {} {}", Emoji("ℹ️", "ℹ"), style("Mode:").bright().cyan(), "dump");

    let machine = boot(&image, base, memory)?;

    let mut memory_image = Vec::new();
    machine.bus.borrow().dump_memory(&mut memory_image)?;
    std::fs::write(&output, &memory_image)?;

    println!(
        "{} {} {} bytes to {}",
        Emoji("✔️", "✔"), style("Dumped:").bright().green(), memory_image.len(), output.display()
    );
    Ok(())
}

fn disassemble(image: PathBuf, base: u32, memory: usize, theme: Option<PathBuf>) -> MonitorResult<()> {
    println!("{} {} {}", Emoji("ℹ️", "ℹ"), style("Mode:").bright().cyan(), "disassemble");

    let theme = load_theme(theme)?;
    let machine = boot(&image, base, memory)?;

    let mut disassembler = Disassembler::new(machine.bus);
    disassembler.disassemble(base, base + machine.image_size as u32)?;

    print!("{}", panel::listing(&disassembler, &theme));
    Ok(())
}

fn main() {
    let mode = Options::from_command_line().into_mode();

    let outcome = match mode {
        Mode::Run { image, base, memory, steps, breakpoints, theme, output } => {
            run(image, base, memory, steps, breakpoints, theme, output)
        }
        Mode::Disassemble { image, base, memory, theme } => {
            disassemble(image, base, memory, theme)
        }
        Mode::Dump { image, base, memory, output } => {
            dump(image, base, memory, output)
        }
    };

    if let Err(error) = outcome {
        println!("{} {} {}", Emoji("❌", "X"), style("Error:").bright().red(), error);
        std::process::exit(1);
    }
}
