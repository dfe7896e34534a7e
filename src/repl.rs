use std::io::{BufRead, Lines};

/// Lines typed at the prompt, one chunk per line: every line is scanned and parsed on its own.
/// An empty line ends the session, same as closing stdin.
pub struct PromptInput<T: BufRead> {
    lines: Lines<T>,
}

impl<T: BufRead> PromptInput<T> {
    pub fn new(lines: Lines<T>) -> PromptInput<T> {
        PromptInput { lines }
    }
}

impl<T: BufRead> Iterator for PromptInput<T> {
    type Item = std::io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.lines.next()? {
            Ok(line) if line.trim_end().is_empty() => None,
            line => Some(line),
        }
    }
}
