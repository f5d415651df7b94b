use std::env;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::process;

use snafu::ResultExt;
use tacc::error::ReadInputSnafu;
use tacc::{CompileResult, translate_into};

fn read_source(path: Option<&str>) -> CompileResult<String> {
  match path {
    Some(path) if path != "-" => fs::read_to_string(path).context(ReadInputSnafu { path }),
    _ => {
      let mut stdin = io::stdin();
      if path.is_none() && stdin.is_terminal() {
        eprintln!("Enter statements, then end input with Ctrl-D:");
      }
      let mut source = String::new();
      stdin
        .read_to_string(&mut source)
        .context(ReadInputSnafu { path: "<stdin>" })?;
      Ok(source)
    }
  }
}

fn main() {
  let args: Vec<String> = env::args().collect();
  let program = args.first().map(String::as_str).unwrap_or("tacc");
  if matches!(args.get(1).map(String::as_str), Some("-h" | "--help")) {
    println!("usage: {program} [FILE]");
    return;
  }
  if args.len() > 2 {
    eprintln!("usage: {program} [FILE]");
    process::exit(1);
  }

  let source = match read_source(args.get(1).map(String::as_str)) {
    Ok(source) => source,
    Err(err) => {
      eprintln!("{err}");
      process::exit(1);
    }
  };

  let result = translate_into(&source, io::stdout().lock(), &mut io::stderr().lock());
  match result {
    Ok(summary) => eprintln!(
      "Translation complete: {} line(s) of three-address code, {} error(s) recovered.",
      summary.lines, summary.errors
    ),
    Err(err) => {
      eprintln!("{err}");
      process::exit(1);
    }
  }
}
