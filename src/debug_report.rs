use soundchange::Evolution;
use std::io::{self, Write};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

/// What a trace line came from, judged by its canonical text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Comment,
    Rule,
    Category,
}

fn classify(line: &str) -> LineKind {
    if line.starts_with("//") {
        LineKind::Comment
    } else if line.contains(" > ") {
        LineKind::Rule
    } else {
        LineKind::Category
    }
}

pub fn print_evolution(out: &mut impl Write, evolution: &Evolution, color: bool) -> io::Result<()> {
    let palette = ansi::Palette::new(color);
    writeln!(out, "{}", palette.paint("━━━ Trace ━━━", ansi::GRAY))?;

    for line in &evolution.trace {
        let painted = match classify(line) {
            LineKind::Comment => palette.dim(line),
            LineKind::Rule => palette.paint(line, ansi::CYAN),
            LineKind::Category => palette.paint(line, ansi::BLUE),
        };
        writeln!(out, "  {painted}")?;
    }

    let arrow = if evolution.is_unchanged() { palette.dim("=") } else { palette.paint("→", ansi::YELLOW) };
    writeln!(
        out,
        "{} {} {}  {}",
        evolution.input,
        arrow,
        palette.bold(palette.paint(&evolution.output, ansi::GREEN)),
        palette.dim(format!("({:?})", evolution.elapsed)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn classify_trace_lines() {
        let cases: Vec<(&str, LineKind)> = vec![
            ("// stops", LineKind::Comment),
            ("{0:P} > {0:N} / _#", LineKind::Rule),
            ("P = p t k", LineKind::Category),
            ("E = ", LineKind::Category),
        ];
        for (line, expected) in cases {
            assert_eq!(classify(line), expected, "line `{line}`");
        }
    }

    #[test]
    fn plain_report_without_color() {
        let evolution = Evolution {
            input: "ta".to_string(),
            output: "na".to_string(),
            trace: vec!["P = p t k".to_string(), "{0:P} > {0:N}".to_string()],
            elapsed: Duration::from_micros(3),
        };
        let mut buf = Vec::new();
        print_evolution(&mut buf, &evolution, false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "━━━ Trace ━━━\n  P = p t k\n  {0:P} > {0:N}\nta → na  (3µs)\n");
    }
}
