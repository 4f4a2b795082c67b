//! Line formatting: template substitution, color tokens and the line layout.
//!
//! Templates use printf-style verbs (`%v`, `%s`, `%d`, `%f`, `%q`, `%%`) and
//! may carry inline color tokens such as `{R` (red) or `{0` (reset). Tokens
//! are translated in the template before substitution, either to ANSI
//! escapes or to nothing, so argument text is written as given.

use crate::Level;
use chrono::{DateTime, Local};
use std::fmt::{self, Write};
use std::iter::Peekable;
use std::str::Chars;

/// Timestamp layout used in every log line (`DD.MM.YYYY HH:MM:SS`)
pub const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

const STACK_BEGIN: &str = "Stacktrace follows: ";
const STACK_END: &str = "End of stacktrace. ";

/// What to do with inline color tokens
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Replace tokens with ANSI escape sequences
    Ansi,
    /// Remove tokens
    #[default]
    Strip,
}

impl ColorMode {
    pub fn from_ansi(ansi: bool) -> Self {
        if ansi {
            ColorMode::Ansi
        } else {
            ColorMode::Strip
        }
    }
}

/// ANSI escape for a color token character, `None` if it is not a token
pub fn color_escape(token: char) -> Option<&'static str> {
    let escape = match token {
        '0' => "\x1b[0m",
        '*' => "\x1b[1m",
        'K' => "\x1b[30m",
        'R' => "\x1b[31m",
        'G' => "\x1b[32m",
        'Y' => "\x1b[33m",
        'B' => "\x1b[34m",
        'M' => "\x1b[35m",
        'C' => "\x1b[36m",
        'W' => "\x1b[37m",
        'A' => "\x1b[90m",
        _ => return None,
    };
    Some(escape)
}

/// Translate `{X` color tokens in `text` according to `mode`.
///
/// A `{` not followed by a token character is kept as is.
pub fn translate_color_tokens(text: &str, mode: ColorMode) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '{' {
            if let Some(escape) = chars.peek().copied().and_then(color_escape) {
                chars.next();
                if mode == ColorMode::Ansi {
                    out.push_str(escape);
                }
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Flags, width and precision between `%` and the verb
#[derive(Debug, Default)]
struct Directive {
    left: bool,
    zero: bool,
    plus: bool,
    space: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

impl Directive {
    fn parse(chars: &mut Peekable<Chars<'_>>) -> Self {
        let mut directive = Directive::default();
        while let Some(&c) = chars.peek() {
            match c {
                '-' => directive.left = true,
                '0' => directive.zero = true,
                '+' => directive.plus = true,
                ' ' => directive.space = true,
                '#' => {}
                _ => break,
            }
            chars.next();
        }
        directive.width = read_number(chars);
        if chars.peek() == Some(&'.') {
            chars.next();
            directive.precision = Some(read_number(chars).unwrap_or(0));
        }
        directive
    }

    fn apply(&self, verb: char, arg: &dyn fmt::Display) -> String {
        let mut text = match (verb, self.precision) {
            ('q', _) => format!("{:?}", arg.to_string()),
            (_, Some(precision)) => format!("{:.*}", precision, arg),
            (_, None) => arg.to_string(),
        };
        if matches!(verb, 'd' | 'f') && !text.starts_with('-') {
            if self.plus {
                text.insert(0, '+');
            } else if self.space {
                text.insert(0, ' ');
            }
        }

        let len = text.chars().count();
        let fill = match self.width {
            Some(width) if width > len => width - len,
            _ => return text,
        };
        if self.left {
            text.push_str(&" ".repeat(fill));
            text
        } else if self.zero && matches!(verb, 'd' | 'f') {
            let sign_len = if text.starts_with(['-', '+', ' ']) { 1 } else { 0 };
            text.insert_str(sign_len, &"0".repeat(fill));
            text
        } else {
            " ".repeat(fill) + &text
        }
    }
}

fn read_number(chars: &mut Peekable<Chars<'_>>) -> Option<usize> {
    let mut number: Option<usize> = None;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        chars.next();
        number = Some(number.unwrap_or(0).saturating_mul(10).saturating_add(digit as usize));
    }
    number
}

/// Substitute `args` into a printf-style `template`.
///
/// Each of `%v %s %d %f` takes the next argument's `Display` form, `%q`
/// takes it quoted and `%%` is a literal percent sign. A verb may carry
/// flags (`-` left-align, `0` zero-pad, `+` or space for a sign), a width
/// and a precision, as in `%-8s` or `%06.2f`. Mismatches are reported
/// inline: `%!d(MISSING)` for a verb without an argument, `%!z(BADVERB)`
/// for an unknown verb and `%!(EXTRA a, b)` for leftovers.
pub fn render_template(template: &str, args: &[&dyn fmt::Display]) -> String {
    let mut out = String::with_capacity(template.len() + 16 * args.len());
    let mut remaining = args.iter();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'%') {
            chars.next();
            out.push('%');
            continue;
        }
        let directive = Directive::parse(&mut chars);
        let verb = match chars.next() {
            Some(verb) => verb,
            None => {
                out.push_str("%!(NOVERB)");
                break;
            }
        };
        let arg = match remaining.next() {
            Some(arg) => arg,
            None => {
                let _ = write!(out, "%!{}(MISSING)", verb);
                continue;
            }
        };
        match verb {
            'v' | 's' | 'd' | 'f' | 'q' => out.push_str(&directive.apply(verb, *arg)),
            _ => {
                let _ = write!(out, "%!{}(BADVERB)", verb);
            }
        }
    }

    let extra: Vec<String> = remaining.map(|arg| arg.to_string()).collect();
    if !extra.is_empty() {
        let _ = write!(out, "%!(EXTRA {})", extra.join(", "));
    }
    out
}

/// Demarcated stack block appended to a message.
///
/// Only the markers are colored; the frames are written as captured.
pub fn stack_block(frames: &str, mode: ColorMode) -> String {
    let paint = |token: char| match mode {
        ColorMode::Ansi => color_escape(token).unwrap_or_default(),
        ColorMode::Strip => "",
    };
    format!(
        "\n{}{}\n{}{}{}{}{}",
        paint('R'),
        STACK_BEGIN,
        paint('A'),
        frames,
        paint('R'),
        STACK_END,
        paint('0')
    )
}

/// One complete log line, newline-terminated
pub fn format_line(level: Level, at: &DateTime<Local>, message: &str) -> String {
    format!(
        "[{:>8}] [{}] :: {}\n",
        level,
        at.format(TIMESTAMP_FORMAT),
        message
    )
}

/// Build the message text of a record from its parts.
///
/// Color tokens are taken from the template only. Arguments and frames are
/// never scanned for them.
pub fn format_message(
    template: &str,
    args: &[&dyn fmt::Display],
    stack: Option<&str>,
    mode: ColorMode,
) -> String {
    let template = translate_color_tokens(template, mode);
    let mut message = render_template(&template, args);
    if let Some(frames) = stack {
        message.push_str(&stack_block(frames, mode));
    }
    message
}
