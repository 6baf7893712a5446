use clap::{Parser, Subcommand, ValueEnum};

/// Schoolboard: grading, results and finance-admin monitoring for a school backend
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Log formatter to use
    #[arg(long, value_enum, default_value_t = default_tracing_format())]
    pub tracing: TracingFormat,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Load monitoring data once and print it as JSON
    Monitor,
    /// Print the letter grade for a percentage
    Grade {
        #[arg(allow_negative_numbers = true)]
        percentage: f64,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable output with colors
    Pretty,
    /// Structured JSON, one event per line
    Json,
}

const fn default_tracing_format() -> TracingFormat {
    if cfg!(debug_assertions) {
        TracingFormat::Pretty
    } else {
        TracingFormat::Json
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_none() {
        let args = Args::try_parse_from(["schoolboard"]).unwrap();
        assert_eq!(args.command, None);
    }

    #[test]
    fn test_grade_accepts_negative() {
        let args = Args::try_parse_from(["schoolboard", "grade", "-5"]).unwrap();
        assert_eq!(args.command, Some(Command::Grade { percentage: -5.0 }));
    }

    #[test]
    fn test_tracing_flag() {
        let args = Args::try_parse_from(["schoolboard", "--tracing", "json", "monitor"]).unwrap();
        assert_eq!(args.tracing, TracingFormat::Json);
        assert_eq!(args.command, Some(Command::Monitor));
    }
}
