//! Command-line recognizer. Takes a grammar file (one production per line,
//! whitespace-separated, first token the left-hand side) and an input: a
//! file of whitespace-separated symbols, or the symbols themselves if the
//! argument doesn't open as a file. Prints one CSV line to stdout with the
//! fields: input length, elapsed milliseconds, descriptors processed,
//! workers used, descriptor set size, EPN set size. Building with the
//! `action-counts` or `thread-histogram` feature replaces the line with
//! per-action counts or the pool coordinator's busy-worker histogram.

use std::{
    env,
    fs::File,
    io::Read,
    path::Path,
    process,
    time::{Duration, Instant},
};

use cdsgrammar::parse_grammar;
use cdspar::{CdsParserBuilder, EngineKind, ParseOutput};
use getopts::Options;

fn usage(prog: &str, msg: &str) -> ! {
    let path = Path::new(prog);
    let leaf = match path.file_name().and_then(|x| x.to_str()) {
        Some(m) => m,
        None => "cdsparse",
    };
    if !msg.is_empty() {
        eprintln!("{}", msg);
    }
    eprintln!(
        "Usage: {} [-e <sequential|pool|tree>] <grammar file> <input file or inline input>",
        leaf
    );
    process::exit(1);
}

fn read_file(path: &str) -> String {
    let mut f = match File::open(path) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Can't open file {}: {}", path, e);
            process::exit(1);
        }
    };
    let mut s = String::new();
    if let Err(e) = f.read_to_string(&mut s) {
        eprintln!("Can't read file {}: {}", path, e);
        process::exit(1);
    }
    s
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let prog = &args[0];
    let matches = match Options::new()
        .optflag("h", "help", "")
        .optopt(
            "e",
            "engine",
            "Engine to run (default: pool)",
            "sequential|pool|tree",
        )
        .parse(&args[1..])
    {
        Ok(m) => m,
        Err(f) => usage(prog, f.to_string().as_str()),
    };

    if matches.opt_present("h") {
        usage(prog, "");
    }

    let engine = match matches.opt_str("e") {
        None => EngineKind::Pool,
        Some(s) => match &*s.to_lowercase() {
            "sequential" => EngineKind::Sequential,
            "pool" => EngineKind::Pool,
            "tree" => EngineKind::Tree,
            _ => usage(prog, &format!("Unknown engine '{}'.", s)),
        },
    };

    if matches.free.len() != 2 {
        usage(prog, "Too few arguments given.");
    }

    let grammar_src = read_file(&matches.free[0]);
    let (grm, warnings) = match parse_grammar(&grammar_src) {
        Ok(x) => x,
        Err(e) => {
            eprintln!("{}: {}", &matches.free[0], e);
            process::exit(1);
        }
    };
    for w in &warnings {
        eprintln!("{}", w);
    }

    // The second argument is an input file if it opens, and the input itself
    // if it doesn't.
    let input_src = match File::open(&matches.free[1]) {
        Ok(mut f) => {
            let mut s = String::new();
            if let Err(e) = f.read_to_string(&mut s) {
                eprintln!("Can't read file {}: {}", &matches.free[1], e);
                process::exit(1);
            }
            s
        }
        Err(_) => matches.free[1].clone(),
    };
    let input = input_src.split_whitespace().collect::<Vec<_>>();

    let before = Instant::now();
    let out = CdsParserBuilder::new(&grm).engine(engine).parse(&input);
    let elapsed = before.elapsed();

    println!("{}", data_line(input.len(), elapsed, &out));
}

#[cfg(feature = "thread-histogram")]
fn data_line(input_len: usize, _elapsed: Duration, out: &ParseOutput) -> String {
    let mut s = input_len.to_string();
    for h in &out.stats.busy_histogram {
        s.push(',');
        s.push_str(&h.to_string());
    }
    s
}

#[cfg(all(feature = "action-counts", not(feature = "thread-histogram")))]
fn data_line(input_len: usize, _elapsed: Duration, out: &ParseOutput) -> String {
    let [matches, descends, skips, ascends] = out.stats.actions;
    format!(
        "{},{},{},{},{}",
        input_len, matches, descends, skips, ascends
    )
}

#[cfg(not(any(feature = "action-counts", feature = "thread-histogram")))]
fn data_line(input_len: usize, elapsed: Duration, out: &ParseOutput) -> String {
    format!(
        "{},{},{},{},{},{}",
        input_len,
        elapsed.as_secs_f64() * 1000.0,
        out.stats.processed,
        out.stats.workers,
        out.descriptors.len(),
        out.epns.len()
    )
}
