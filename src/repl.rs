use rustyline::{error::ReadlineError, Editor};

use crate::{config::Config, memory::Heap, vm::Vm};

const PROMPT: &str = "> ";

/// Reads one expression per line and prints its value until Ctrl-C or Ctrl-D.
///
/// Strings allocated by earlier lines stay alive until the session ends.
pub fn run_repl(config: Config) -> rustyline::Result<()> {
    let heap = Heap::new();
    let mut vm = Vm::with_config(&heap, config, std::io::stdout());
    let mut editor = Editor::<()>::new();

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                editor.add_history_entry(line.as_str());
                if let Err(err) = vm.interpret(&line) {
                    eprintln!("{}", err);
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(()),
            Err(err) => return Err(err),
        }
    }
}
