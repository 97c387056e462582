// Tools for manipulating ELF files
// Copyright (C) 2015-present Alex Iadicicco <http://ajitek.net>

//! Prints the structure of an ELF file, and optionally writes it back out.
//!
//!     elfdump [-v]... FILE [OUT]

use std::env;
use std::error::Error;
use std::fs;
use std::process;

use log::{LevelFilter, Log, Metadata, Record};

use elfcodec::format::{pt_name, sht_name};
use elfcodec::{Elf, ElfReader, ElfWriter, FileHeader, ProgramHeader, SectionHeader};

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        eprintln!("{}: {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

trait Dumpable {
    fn dump(&self);
}

impl Dumpable for FileHeader {
    fn dump(&self) {
        println!("ELF file");
        println!("  class: {:?}", self.ident.class);
        println!("  data format: {:?}", self.ident.data);
        println!("  os/abi: {} (abi version {})", self.ident.osabi, self.ident.abiversion);
        println!("  type: {:?}", self.file_type());
        println!("  machine: {:?}", self.machine());
        println!("  entry: {}", match self.entry {
            0 => "unspecified".to_string(),
            x => format!("{:#x}", x),
        });
        println!("  flags: {:#x}", self.flags);
    }
}

impl Dumpable for ProgramHeader {
    fn dump(&self) {
        let typ = pt_name(self.typ).map_or_else(|| format!("{:#x}", self.typ), str::to_string);
        println!(
            "  {:<8} off {:#010x} vaddr {:#018x} filesz {:#x} memsz {:#x} {:?}",
            typ, self.offset, self.vaddr, self.filesz, self.memsz, self.flags
        );
    }
}

fn dump_section(elf: &Elf, i: usize, sh: &SectionHeader) {
    let typ = sht_name(sh.typ).map_or_else(|| format!("{:#x}", sh.typ), str::to_string);
    let stored = if elf.section_data.contains_key(&i) { "" } else { " (no data)" };
    println!(
        "  [{:2}] {:<20} {:<12} off {:#010x} size {:#x}{}",
        i,
        elf.section_name(i),
        typ,
        sh.offset,
        sh.size,
        stored
    );
}

fn run(args: &[String]) -> Result<(), Box<dyn Error>> {
    let verbosity = args.iter().filter(|a| a.as_str() == "-v").count();
    let paths: Vec<&String> = args.iter().filter(|a| a.as_str() != "-v").collect();

    log::set_logger(&LOGGER).map_err(|e| e.to_string())?;
    log::set_max_level(match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    });

    let input = match paths.first() {
        Some(p) => p,
        None => return Err("missing input file argument".into()),
    };

    let bytes = fs::read(input)?;
    let elf = ElfReader::new(&bytes).read()?;

    elf.header.dump();

    println!("program headers: {}", elf.program_headers.len());
    for ph in &elf.program_headers {
        ph.dump();
    }

    println!("section headers: {}", elf.section_headers.len());
    for (i, sh) in elf.section_headers.iter().enumerate() {
        dump_section(&elf, i, sh);
    }

    if let Some(out) = paths.get(1) {
        let encoded = ElfWriter::new().write(&elf)?;
        fs::write(out, &encoded)?;
        println!("wrote {} bytes to {}", encoded.len(), out);
    }

    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    if let Err(e) = run(&args) {
        eprintln!("elfdump: {}", e);
        process::exit(1);
    }
}
