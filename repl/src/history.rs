use crate::completer::KeyCompleter;
use rustyline::history::{DefaultHistory, History, SearchDirection};
use rustyline::{Editor, Result};

pub struct HistoryManager {
	history_file: String,
}

impl HistoryManager {
	pub fn new(history_file: &str) -> Result<Self> {
		Ok(Self {
			history_file: history_file.to_string(),
		})
	}

	pub fn load(&self, editor: &mut Editor<KeyCompleter, DefaultHistory>) -> Result<()> {
		let _ = editor.load_history(&self.history_file);
		Ok(())
	}

	pub fn save(&self, editor: &mut Editor<KeyCompleter, DefaultHistory>) -> Result<()> {
		editor.save_history(&self.history_file)
	}

	pub fn display(&self, editor: &Editor<KeyCompleter, DefaultHistory>) -> Result<()> {
		let history_len = editor.history().len();

		if history_len == 0 {
			println!("No history available");
			return Ok(());
		}

		println!("\nInput History:");
		println!("{}", "─".repeat(60));

		// Show last 20 entries
		let start = if history_len > 20 {
			history_len - 20
		} else {
			0
		};

		for i in start..history_len {
			if let Ok(Some(search_result)) = editor.history().get(i, SearchDirection::Forward) {
				let entry_str = search_result.entry;
				let display_entry = if entry_str.len() > 60 {
					format!("{}...", &entry_str[..57])
				} else {
					entry_str.to_string()
				};

				println!("{:4} │ {}", i + 1, display_entry);
			}
		}

		println!("{}", "─".repeat(60));

		Ok(())
	}
}
