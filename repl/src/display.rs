use colored::Colorize;
use keyloom_core::SavedFilter;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DisplayConfig {
	pub show_counts: bool,
	pub use_colors: bool,
	pub max_keys_shown: usize,
}

impl Default for DisplayConfig {
	fn default() -> Self {
		Self {
			show_counts: true,
			use_colors: true,
			max_keys_shown: 20,
		}
	}
}

pub fn print_welcome() {
	println!(
		"\n{}",
		"╔═══════════════════════════════════════╗".bright_cyan()
	);
	println!(
		"{}",
		format!("║        Keyloom shell v{}          ║", keyloom_common::VERSION)
			.bright_cyan()
			.bold()
	);
	println!(
		"{}",
		"╚═══════════════════════════════════════╝".bright_cyan()
	);
	println!();
	println!(
		"Type {} for help, {} to exit",
		".help".bright_green(),
		".exit".bright_green()
	);
	println!(
		"Press {} while typing a filter to complete schema keys",
		"Tab".bright_green()
	);
	println!();
}

pub fn print_goodbye(input_count: usize, duration: Duration) {
	println!();
	println!("{}", "─".repeat(40).bright_black());
	println!("{}", "Thanks for using Keyloom!".bright_cyan());
	println!("   Handled {} inputs in {:.1?}", input_count, duration);
	println!();
}

pub fn clear_screen() {
	print!("\x1B[2J\x1B[1;1H");
}

pub fn print_error(msg: &str) {
	println!("{} {}", "✗".bright_red().bold(), msg.bright_red());
}

pub fn print_warning(msg: &str) {
	println!("{} {}", "⚠".bright_yellow(), msg.bright_yellow());
}

pub fn print_info(msg: &str) {
	println!("{} {}", "ℹ".bright_blue(), msg.bright_white());
}

pub fn print_success(msg: &str) {
	println!("{} {}", "✓".bright_green().bold(), msg.bright_green());
}

pub fn print_hint(msg: &str) {
	println!("{} {}", "»".bright_white(), msg.bright_white().dimmed());
}

pub fn print_key_list(title: &str, keys: &[String], limit: usize) {
	println!("\n{} ({})", title.bright_yellow(), keys.len());
	println!("{}", "─".repeat(60).bright_black());

	for key in keys.iter().take(limit) {
		println!("  {}", key);
	}

	if keys.len() > limit {
		println!(
			"  {}",
			format!("… {} more, rerun with a higher limit", keys.len() - limit).bright_black()
		);
	}

	println!("{}", "─".repeat(60).bright_black());
}

pub fn print_filter_list(collection: &str, filters: &[SavedFilter]) {
	if filters.is_empty() {
		print_info(&format!("No saved filters for {}", collection));
		return;
	}

	println!(
		"\n{} {}",
		"Saved filters for".bright_yellow(),
		collection.bright_white().bold()
	);
	println!("{}", "─".repeat(60).bright_black());

	for filter in filters {
		println!(
			"  {} │ {} │ {}",
			filter.id.bright_black(),
			filter.name.bright_white(),
			filter.filter.dimmed()
		);
	}

	println!("{}", "─".repeat(60).bright_black());
}
