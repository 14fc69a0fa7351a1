use super::display;
use colored::Colorize;

pub enum CommandResult {
	Continue,
	Exit,
	Error(String),
	ClearScreen,
	ShowHistory,
	ShowCollections,
	UseCollection(String),
	ShowKeys(usize),
	ShowFilters,
	SaveFilter { name: String, filter: String },
	RemoveFilter(String),
	UpdateFilter { id: String, name: String, filter: String },
}

pub struct CommandHandler {
	// No fields needed for now
}

impl CommandHandler {
	pub fn new() -> Self {
		CommandHandler {}
	}

	pub fn handle(&self, line: &str, display_config: &display::DisplayConfig) -> CommandResult {
		let parts: Vec<&str> = line.trim().split_whitespace().collect();
		if parts.is_empty() {
			return CommandResult::Continue;
		}

		match parts[0] {
			".help" | ".h" | ".?" => {
				self.show_help();
				CommandResult::Continue
			}
			".exit" | ".quit" | ".q" => CommandResult::Exit,
			".clear" | ".cls" => CommandResult::ClearScreen,
			".history" => CommandResult::ShowHistory,
			".collections" => CommandResult::ShowCollections,
			".use" => match parts.get(1) {
				Some(name) => CommandResult::UseCollection(name.to_string()),
				None => CommandResult::Error("Usage: .use <collection>".to_string()),
			},
			".keys" => {
				let limit = parts
					.get(1)
					.and_then(|p| p.parse().ok())
					.unwrap_or(display_config.max_keys_shown);
				CommandResult::ShowKeys(limit)
			}
			".filters" => CommandResult::ShowFilters,
			".save" => {
				if parts.len() < 3 {
					CommandResult::Error("Usage: .save <name> <filter>".to_string())
				} else {
					CommandResult::SaveFilter {
						name: parts[1].to_string(),
						filter: parts[2..].join(" "),
					}
				}
			}
			".rm" => match parts.get(1) {
				Some(id) => CommandResult::RemoveFilter(id.to_string()),
				None => CommandResult::Error("Usage: .rm <id>".to_string()),
			},
			".update" => {
				if parts.len() < 4 {
					CommandResult::Error("Usage: .update <id> <name> <filter>".to_string())
				} else {
					CommandResult::UpdateFilter {
						id: parts[1].to_string(),
						name: parts[2].to_string(),
						filter: parts[3..].join(" "),
					}
				}
			}
			unknown => CommandResult::Error(format!(
				"Unknown command: {}. Type .help for available commands",
				unknown
			)),
		}
	}

	fn show_help(&self) {
		println!("\n{}", "Available commands:".bright_yellow());
		println!("{}", "─".repeat(60).bright_black());

		let commands = [
			(".help", "Show this help"),
			(".exit, .quit", "Leave the shell"),
			(".clear", "Clear the screen"),
			(".collections", "List the snapshot's collections"),
			(".use <collection>", "Switch the base collection"),
			(".keys [limit]", "Show the current autocomplete keys"),
			(".filters", "List saved filters for the base collection"),
			(".save <name> <filter>", "Save a named filter"),
			(".rm <id>", "Remove a saved filter"),
			(".update <id> <name> <filter>", "Replace a saved filter"),
			(".history", "Show recent inputs"),
		];

		for (command, description) in commands {
			println!(
				"  {:<30} {}",
				command.bright_green(),
				description.bright_white()
			);
		}

		println!("{}", "─".repeat(60).bright_black());
		println!(
			"{}",
			"Anything else is treated as a filter expression draft.".dimmed()
		);
		println!();
	}
}
