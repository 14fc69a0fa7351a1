use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper, Result};

/// Characters that end a key while typing a filter expression.
const KEY_BOUNDARY: &str = "()&|!=<>~?,\"'";

pub struct KeyCompleter {
	keys: Vec<String>,
	commands: Vec<&'static str>,
}

impl KeyCompleter {
	pub fn new(keys: Vec<String>) -> Self {
		Self {
			keys,
			commands: vec![
				".help",
				".exit",
				".quit",
				".clear",
				".use",
				".collections",
				".keys",
				".filters",
				".save",
				".rm",
				".update",
				".history",
			],
		}
	}

	fn word_start(line: &str, pos: usize) -> usize {
		line[..pos]
			.rfind(|c: char| c.is_whitespace() || KEY_BOUNDARY.contains(c))
			.map(|i| i + 1)
			.unwrap_or(0)
	}

	fn get_completions(&self, line: &str, pos: usize) -> Vec<Pair> {
		let start = Self::word_start(line, pos);
		let partial = &line[start..pos];
		let mut completions = Vec::new();

		// Dot-commands complete only at the start of the line
		if start == 0 && partial.starts_with('.') {
			for command in &self.commands {
				if command.starts_with(partial) {
					completions.push(Pair {
						display: command.to_string(),
						replacement: command.to_string(),
					});
				}
			}
			return completions;
		}

		if partial.is_empty() {
			return completions;
		}

		for key in &self.keys {
			if key.starts_with(partial) {
				completions.push(Pair {
					display: key.clone(),
					replacement: key.clone(),
				});
			}
		}

		// Exact matches first, shorter keys before longer ones
		completions.sort_by(|a, b| {
			let a_exact = a.display == partial;
			let b_exact = b.display == partial;

			match (a_exact, b_exact) {
				(true, false) => std::cmp::Ordering::Less,
				(false, true) => std::cmp::Ordering::Greater,
				_ => a.display.len().cmp(&b.display.len()),
			}
		});

		completions
	}
}

impl Completer for KeyCompleter {
	type Candidate = Pair;

	fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Result<(usize, Vec<Pair>)> {
		let completions = self.get_completions(line, pos);
		let start = Self::word_start(line, pos);

		Ok((start, completions))
	}
}

impl Hinter for KeyCompleter {
	type Hint = String;

	fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
		if pos < line.len() {
			return None;
		}

		match line.trim() {
			".use" => Some(" <collection>".to_string()),
			".save" => Some(" <name> <filter>".to_string()),
			".update" => Some(" <id> <name> <filter>".to_string()),
			".rm" => Some(" <id>".to_string()),
			".keys" => Some(" [limit]".to_string()),
			_ => None,
		}
	}
}

impl Highlighter for KeyCompleter {
	fn highlight<'l>(&self, line: &'l str, _pos: usize) -> std::borrow::Cow<'l, str> {
		std::borrow::Cow::Borrowed(line)
	}

	fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
		&'s self,
		prompt: &'p str,
		_default: bool,
	) -> std::borrow::Cow<'b, str> {
		std::borrow::Cow::Borrowed(prompt)
	}

	fn highlight_hint<'h>(&self, hint: &'h str) -> std::borrow::Cow<'h, str> {
		std::borrow::Cow::Owned(format!("\x1b[2m{}\x1b[0m", hint))
	}
}

impl Validator for KeyCompleter {}

impl Helper for KeyCompleter {}
