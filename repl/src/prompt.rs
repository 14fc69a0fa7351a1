use super::display::DisplayConfig;
use colored::Colorize;

pub fn generate_prompt(base: Option<&str>, input_count: usize, config: &DisplayConfig) -> String {
	let base = base.unwrap_or("-");

	if config.use_colors {
		format!(
			"{}{}{}> ",
			"keyloom".bright_cyan().bold(),
			format!("({})", base).bright_white(),
			format!("[{}]", input_count).bright_black()
		)
	} else {
		format!("keyloom({})[{}]> ", base, input_count)
	}
}
