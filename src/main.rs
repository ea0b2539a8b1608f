use std::fs::File;
use std::io::{self, BufReader, IsTerminal, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use itertools::Itertools;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use deskcalc::{
    format_value, BufSource, CalcError, FunctionTable, LineSource, Outcome, Session, Store,
};

const PROMPT: &str = "> ";
const RESULT: &str = "= ";

#[derive(Parser)]
#[command(version, about = "Desk calculator with variables and saved environments")]
struct Cli {
    /// Read statements from this file instead of standard input
    file: Option<PathBuf>,

    /// Directory that `save`, `load` and `show` resolve store names against
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    dir: PathBuf,

    /// Do not print the banner or the prompt
    #[arg(short, long)]
    quiet: bool,
}

struct EditorSource {
    editor: DefaultEditor,
}

impl LineSource for EditorSource {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        match self.editor.readline(PROMPT) {
            Ok(line) => {
                let _ = self.editor.add_history_entry(line.as_str());
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(ReadlineError::Io(err)) => Err(err),
            Err(err) => Err(io::Error::new(io::ErrorKind::Other, err.to_string())),
        }
    }
}

/// Prints the prompt before each line it reads, for input that does not come from the editor.
struct PromptSource<S> {
    inner: S,
}

impl<S: LineSource> LineSource for PromptSource<S> {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", PROMPT)?;
        stdout.flush()?;

        self.inner.read_line()
    }
}

fn prompted<S: LineSource + 'static>(inner: S, quiet: bool) -> Box<dyn LineSource> {
    if quiet {
        Box::new(inner)
    } else {
        Box::new(PromptSource { inner })
    }
}

fn open_source(cli: &Cli) -> io::Result<(Box<dyn LineSource>, bool)> {
    if let Some(path) = &cli.file {
        let file = File::open(path)?;
        let source = BufSource::new(BufReader::new(file));
        return Ok((prompted(source, cli.quiet), false));
    }

    if io::stdin().is_terminal() && !cli.quiet {
        match DefaultEditor::new() {
            Ok(editor) => return Ok((Box::new(EditorSource { editor }), true)),
            Err(err) => eprintln!("warning: line editing unavailable: {}", err),
        }
    }

    let source = BufSource::new(BufReader::new(io::stdin()));
    Ok((prompted(source, cli.quiet), false))
}

fn print_help(funcs: &FunctionTable) {
    println!("This is a simple calculator.");
    println!("It can do addition (+), subtraction (-), multiplication (*), division (/) and modulus (%).");
    println!("Note: all expressions are terminated with a semicolon.");
    println!();
    println!("  1+2*3;            = 7");
    println!("  let a = 1;        declare a variable");
    println!("  const g = 9.81;   declare a constant");
    println!("  set a = a + 1;    update a variable");
    println!("  save <name>       write all variables to a file");
    println!("  load <name>       read variables back from a file");
    println!("  show <name>       list the variables in a file");
    println!("  quit              leave the calculator");
    println!();
    println!("Functions of one argument: {}", funcs.unary_names().sorted().join(", "));
    println!("Functions of two arguments: {}", funcs.binary_names().sorted().join(", "));
    println!("Constants: pi, e");
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn run(session: &mut Session) -> Result<(), CalcError> {
    loop {
        match session.next() {
            Ok(Outcome::Value(x)) => println!("{}{}", RESULT, format_value(x)),
            Ok(Outcome::Help) => print_help(session.functions()),
            Ok(Outcome::Quit) => return Ok(()),
            Ok(Outcome::Saved { name, count }) => {
                println!("saved {} variable{} to {}", count, plural(count), name)
            }
            Ok(Outcome::Loaded { name, count }) => {
                println!("loaded {} variable{} from {}", count, plural(count), name)
            }
            Ok(Outcome::Shown(lines)) => {
                for line in lines {
                    println!("{}", line);
                }
            }
            Err(err) if err.is_recoverable() => {
                eprintln!("error: {}", err);
                session.recover()?;
            }
            Err(err) => return Err(err),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let (source, interactive) = match open_source(&cli) {
        Ok(x) => x,
        Err(err) => {
            let name = cli.file.as_ref().map(|p| p.display().to_string());
            eprintln!("error: cannot open {}: {}", name.unwrap_or_default(), err);
            process::exit(1);
        }
    };

    if interactive {
        println!("deskcalc: type 'help' for help, 'quit' to leave");
    }

    let mut session = Session::new(source, Store::new(cli.dir.clone()));

    if let Err(err) = run(&mut session) {
        eprintln!("exception: {}", err);
        let _ = session.recover();
        process::exit(1);
    }
}
