use anyhow::{Result, anyhow, bail};
use clap::ValueEnum;
use nback_core::{GameType, Modality};

use crate::cli::Mode;

/// One line typed on stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    End,
    Match(Modality),
    SetMode(GameType),
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "commands: s=start  e=end  a=audio match  v=visual match  \
m <audio|visual|audio-visual>=mode  i=status  h=help  q=quit";

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            bail!("empty command");
        };
        let command = match head.to_ascii_lowercase().as_str() {
            "s" | "start" => Command::Start,
            "e" | "end" => Command::End,
            "a" | "audio" => Command::Match(Modality::Audio),
            "v" | "visual" => Command::Match(Modality::Visual),
            "i" | "status" => Command::Status,
            "h" | "help" | "?" => Command::Help,
            "q" | "quit" | "exit" => Command::Quit,
            "m" | "mode" => {
                let name = words.next().ok_or_else(|| anyhow!("mode needs a name"))?;
                let mode = Mode::from_str(name, true).map_err(|e| anyhow!(e))?;
                Command::SetMode(mode.into())
            }
            other => bail!("unknown command `{other}`"),
        };
        Ok(command)
    }
}
