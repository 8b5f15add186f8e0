use std::io;

/// Builder for shell scripts that are written to disk and executed inside a container.
///
/// Invariants:
/// - Each pushed line must not contain `\n`, `\r`, or `\0`; generated text cannot change the
///   script's structure by smuggling extra lines.
/// - Nesting is expressed with `indent`/`dedent`, two spaces per level.
/// - `build()` joins lines with `\n` and ensures a trailing newline when non-empty.
#[derive(Debug, Default, Clone)]
pub struct ShellFile {
    lines: Vec<String>,
    depth: usize,
}

impl ShellFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a bash script with its shebang line.
    pub fn bash() -> Self {
        let mut sf = Self::new();
        sf.push("#!/bin/bash");
        sf
    }

    /// Push one logical line (no embedded newlines) at the current indentation.
    pub fn push(&mut self, line: impl Into<String>) -> &mut Self {
        let line = line.into();
        if line.is_empty() {
            self.lines.push(line);
        } else {
            self.lines.push(format!("{}{}", "  ".repeat(self.depth), line));
        }
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    pub fn indent(&mut self) -> &mut Self {
        self.depth += 1;
        self
    }

    pub fn dedent(&mut self) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self
    }

    /// Append another script's lines at the current indentation.
    pub fn append(&mut self, other: &ShellFile) -> &mut Self {
        for l in &other.lines {
            self.push(l.clone());
        }
        self
    }

    pub fn build(&self) -> io::Result<String> {
        for (i, l) in self.lines.iter().enumerate() {
            if l.contains('\n') || l.contains('\r') || l.contains('\0') {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("shell file line {i} contains a newline or NUL; use atomic lines"),
                ));
            }
        }

        if self.lines.is_empty() {
            return Ok(String::new());
        }

        let mut out = self.lines.join("\n");
        out.push('\n');
        Ok(out)
    }
}
