//! Command definitions and `:` command-line parsing

use maia_audio::TrackRole;
use thiserror::Error;

/// Commands that can be dispatched from input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // Playback
    TogglePlay(TrackRole),
    ToggleSync,

    // Volume (percent)
    SetVolume(TrackRole, f32),
    AdjustVolume(TrackRole, f32),

    // Seeking
    JumpToTime(f64),
    JumpToRegion(usize), // 1-based region number
    Nudge(f64),          // relative to the original's playhead

    // Samples
    SelectSample(usize), // 0-based index
    NextSample,
    PrevSample,

    // Sample browser
    BrowserSelectNext,
    BrowserSelectPrev,
    BrowserSelectFirst,
    BrowserSelectLast,
    BrowserLoadSelected,

    // UI
    ToggleHelp,
    HelpScrollUp,
    HelpScrollDown,
    ToggleCharts,
    SetTheme(String),

    // Mode changes
    EnterCommandMode,
    EnterNormalMode,
    EnterBrowserMode,

    // Application
    Quit,
    Cancel,

    /// A `:` command that could not be parsed
    Invalid(CommandError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),
    #[error("Missing argument for :{0}")]
    MissingArgument(&'static str),
    #[error("Invalid {what}: {value}")]
    InvalidArgument { what: &'static str, value: String },
}

fn invalid(what: &'static str, value: &str) -> CommandError {
    CommandError::InvalidArgument {
        what,
        value: value.to_string(),
    }
}

fn parse_role(s: &str) -> Option<TrackRole> {
    match s {
        "o" | "orig" | "original" => Some(TrackRole::Original),
        "a" | "adv" | "adversarial" => Some(TrackRole::Adversarial),
        _ => None,
    }
}

/// Parse a time given as seconds (`12.5`) or `M:SS` (`1:05`)
pub fn parse_time(s: &str) -> Option<f64> {
    let secs = match s.split_once(':') {
        Some((m, sec)) => {
            let minutes: u32 = m.parse().ok()?;
            let seconds: f64 = sec.parse().ok()?;
            if !(0.0..60.0).contains(&seconds) {
                return None;
            }
            minutes as f64 * 60.0 + seconds
        }
        None => s.parse().ok()?,
    };
    (secs.is_finite() && secs >= 0.0).then_some(secs)
}

/// Parse a `:` command line (without the leading colon)
pub fn parse_command(input: &str) -> Result<Command, CommandError> {
    let input = input.trim();
    let mut parts = input.split_whitespace();
    let Some(name) = parts.next() else {
        return Err(CommandError::Unknown(String::new()));
    };
    let args: Vec<&str> = parts.collect();

    match name {
        "q" | "quit" => Ok(Command::Quit),
        "help" => Ok(Command::ToggleHelp),
        "sync" => Ok(Command::ToggleSync),
        "charts" => Ok(Command::ToggleCharts),
        "next" => Ok(Command::NextSample),
        "prev" => Ok(Command::PrevSample),

        // :sample N (1-based, as shown in the selector)
        "sample" | "s" => {
            let arg = args.first().ok_or(CommandError::MissingArgument("sample"))?;
            match arg.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(Command::SelectSample(n - 1)),
                _ => Err(invalid("sample number", arg)),
            }
        }

        // :vol o|a N
        "vol" | "volume" => {
            let (role, value) = match args.as_slice() {
                [role, value] => (*role, *value),
                [_] | [] => return Err(CommandError::MissingArgument("vol")),
                _ => return Err(invalid("volume", &args.join(" "))),
            };
            let role = parse_role(role).ok_or_else(|| invalid("track", role))?;
            let percent: f32 = value.parse().map_err(|_| invalid("volume", value))?;
            if !percent.is_finite() {
                return Err(invalid("volume", value));
            }
            Ok(Command::SetVolume(role, percent))
        }

        // :jump 12.5 | :jump 0:12
        "jump" | "j" => {
            let arg = args.first().ok_or(CommandError::MissingArgument("jump"))?;
            parse_time(arg)
                .map(Command::JumpToTime)
                .ok_or_else(|| invalid("time", arg))
        }

        "region" | "r" => {
            let arg = args.first().ok_or(CommandError::MissingArgument("region"))?;
            match arg.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(Command::JumpToRegion(n)),
                _ => Err(invalid("region number", arg)),
            }
        }

        "theme" => {
            let name = args.join(" ");
            if name.is_empty() {
                Err(CommandError::MissingArgument("theme"))
            } else {
                Ok(Command::SetTheme(name))
            }
        }

        _ => Err(CommandError::Unknown(input.to_string())),
    }
}
