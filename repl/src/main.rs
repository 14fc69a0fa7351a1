mod commands;
mod completer;
pub mod display;
mod history;
mod prompt;

use anyhow::Context as _;
use keyloom_common::{Snapshot, SuggestRequest, SuggestResponse};
use keyloom_core::config::Config;
use keyloom_core::{BlockingSuggestClient, FileBackend, SavedFilterStore, SchemaKeyGenerator};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Editor, Result};
use std::time::Instant;
use std::{env, fs};
use tracing_subscriber::EnvFilter;

pub use self::commands::CommandHandler;
pub use self::display::DisplayConfig;

use self::commands::CommandResult;

pub struct Repl {
	editor: Editor<completer::KeyCompleter, DefaultHistory>,
	command_handler: CommandHandler,
	display_config: DisplayConfig,
	client: BlockingSuggestClient,
	store: SavedFilterStore,
	snapshot: Snapshot,
	base: Option<String>,
	suggestions: Option<SuggestResponse>,
	history: history::HistoryManager,
	request_seq: u64,
	input_count: usize,
	start_time: Instant,
}

impl Repl {
	pub fn new(snapshot: Snapshot, store: SavedFilterStore) -> Result<Self> {
		let config = rustyline::Config::builder()
			.history_ignore_space(true)
			.completion_type(rustyline::CompletionType::List)
			.edit_mode(rustyline::EditMode::Emacs)
			.build();

		let mut editor = Editor::with_config(config)?;
		editor.set_helper(Some(completer::KeyCompleter::new(Vec::new())));

		let history = history::HistoryManager::new(".keyloom_history")?;
		history.load(&mut editor)?;

		let base = snapshot
			.base_collection
			.clone()
			.or_else(|| snapshot.collections.first().map(|c| c.name.clone()));

		let mut repl = Self {
			editor,
			command_handler: CommandHandler::new(),
			display_config: DisplayConfig::default(),
			client: BlockingSuggestClient::new(SchemaKeyGenerator::new()),
			store,
			snapshot,
			base,
			suggestions: None,
			history,
			request_seq: 0,
			input_count: 0,
			start_time: Instant::now(),
		};
		repl.refresh_suggestions();

		Ok(repl)
	}

	pub fn run(&mut self) -> Result<()> {
		display::print_welcome();
		self.show_status();

		loop {
			let prompt_str = prompt::generate_prompt(
				self.base.as_deref(),
				self.input_count,
				&self.display_config,
			);

			match self.editor.readline(&prompt_str) {
				Ok(line) => {
					if !self.handle_line(line)? {
						break;
					}
				}
				Err(ReadlineError::Interrupted) => {
					display::print_hint("Use .exit or Ctrl+D to quit");
				}
				Err(ReadlineError::Eof) => {
					println!();
					display::print_goodbye(self.input_count, self.start_time.elapsed());
					break;
				}
				Err(err) => {
					display::print_error(&format!("Readline error: {:?}", err));
					break;
				}
			}
		}

		self.cleanup()
	}

	fn handle_line(&mut self, line: String) -> Result<bool> {
		if line.trim().is_empty() {
			return Ok(true);
		}

		self.editor.add_history_entry(&line)?;

		if line.trim().starts_with('.') {
			return Ok(self.handle_command(&line));
		}

		self.handle_draft(&line);
		Ok(true)
	}

	fn handle_command(&mut self, line: &str) -> bool {
		match self.command_handler.handle(line, &self.display_config) {
			CommandResult::Continue => true,
			CommandResult::Exit => {
				display::print_goodbye(self.input_count, self.start_time.elapsed());
				false
			}
			CommandResult::Error(msg) => {
				display::print_error(&msg);
				true
			}
			CommandResult::ClearScreen => {
				display::clear_screen();
				display::print_welcome();
				self.show_status();
				true
			}
			CommandResult::ShowHistory => {
				let _ = self.history.display(&self.editor);
				true
			}
			CommandResult::ShowCollections => {
				self.show_collections();
				true
			}
			CommandResult::UseCollection(name) => {
				self.use_collection(&name);
				true
			}
			CommandResult::ShowKeys(limit) => {
				self.show_keys(limit);
				true
			}
			CommandResult::ShowFilters => {
				self.show_filters();
				true
			}
			CommandResult::SaveFilter { name, filter } => {
				self.save_filter(&name, &filter);
				true
			}
			CommandResult::RemoveFilter(id) => {
				self.remove_filter(&id);
				true
			}
			CommandResult::UpdateFilter { id, name, filter } => {
				self.update_filter(&id, &name, &filter);
				true
			}
		}
	}

	/// Non-command input is a filter expression draft; report how much of
	/// it lines up with the schema before the user decides to save it.
	fn handle_draft(&mut self, line: &str) {
		self.input_count += 1;

		let Some(suggestions) = &self.suggestions else {
			display::print_warning("No schema keys loaded, draft kept as-is");
			return;
		};

		let referenced = suggestions
			.base_keys
			.iter()
			.filter(|key| line.contains(key.as_str()))
			.count();

		if self.display_config.show_counts {
			if referenced == 0 {
				display::print_warning("Draft references no known record keys");
			} else {
				display::print_info(&format!(
					"Draft references {} known record key(s)",
					referenced
				));
			}
		}

		display::print_hint("Use .save <name> <filter> to keep it");
	}

	fn refresh_suggestions(&mut self) {
		self.request_seq += 1;
		let request = SuggestRequest {
			id: self.request_seq,
			collections: self.snapshot.collections.clone(),
			base_collection: self.base.clone(),
			disable_request_keys: false,
			disable_collection_join_keys: false,
		};

		match self.client.suggest(request) {
			Ok(Some(response)) => {
				let mut keys = response.base_keys.clone();
				if let Some(request_keys) = &response.request_keys {
					keys.extend(request_keys.iter().cloned());
				}
				if let Some(join_keys) = &response.collection_join_keys {
					keys.extend(join_keys.iter().cloned());
				}

				self.editor
					.set_helper(Some(completer::KeyCompleter::new(keys)));
				self.suggestions = Some(response);
			}
			Ok(None) => {
				display::print_warning("Snapshot has no collections, autocomplete is empty");
				self.suggestions = None;
			}
			Err(e) => {
				display::print_error(&format!("Suggestion worker failed: {}", e));
				self.suggestions = None;
			}
		}
	}

	fn current_collection_id(&self) -> Option<String> {
		self.base
			.as_deref()
			.and_then(|name| self.snapshot.collection(name))
			.map(|c| c.id.clone())
	}

	fn show_status(&self) {
		match &self.base {
			Some(base) => display::print_success(&format!(
				"Loaded {} collection(s), base is {}",
				self.snapshot.collections.len(),
				base
			)),
			None => display::print_warning("Snapshot has no collections"),
		}

		display::print_hint("Type a filter expression and press Tab for key suggestions");
	}

	fn show_collections(&self) {
		println!();
		for collection in &self.snapshot.collections {
			let marker = if Some(collection.name.as_str()) == self.base.as_deref() {
				"*"
			} else {
				" "
			};
			println!(
				" {} {} ({:?}, {} fields)",
				marker,
				collection.name,
				collection.kind,
				collection.fields.len()
			);
		}
		println!();
	}

	fn use_collection(&mut self, name: &str) {
		if self.snapshot.collection(name).is_none() {
			display::print_error(&format!("Unknown collection: {}", name));
			return;
		}

		self.base = Some(name.to_string());
		self.refresh_suggestions();
		display::print_success(&format!("Base collection set to {}", name));
	}

	fn show_keys(&self, limit: usize) {
		let Some(suggestions) = &self.suggestions else {
			display::print_warning("No suggestions available");
			return;
		};

		display::print_key_list("Record keys", &suggestions.base_keys, limit);
		if let Some(keys) = &suggestions.request_keys {
			display::print_key_list("Request keys", keys, limit);
		}
		if let Some(keys) = &suggestions.collection_join_keys {
			display::print_key_list("Join keys", keys, limit);
		}
	}

	fn show_filters(&self) {
		let Some(collection_id) = self.current_collection_id() else {
			display::print_error("No base collection selected");
			return;
		};

		let filters = self.store.saved_filters(&collection_id);
		display::print_filter_list(self.base.as_deref().unwrap_or("-"), &filters);
	}

	fn save_filter(&mut self, name: &str, filter: &str) {
		let Some(collection_id) = self.current_collection_id() else {
			display::print_error("No base collection selected");
			return;
		};

		let entry = self.store.add(&collection_id, name, filter);
		display::print_success(&format!("Saved filter {} ({})", entry.name, entry.id));
	}

	fn remove_filter(&mut self, id: &str) {
		let Some(collection_id) = self.current_collection_id() else {
			display::print_error("No base collection selected");
			return;
		};

		self.store.remove(&collection_id, id);
		display::print_info(&format!("Removed filter {} (if it existed)", id));
	}

	fn update_filter(&mut self, id: &str, name: &str, filter: &str) {
		let Some(collection_id) = self.current_collection_id() else {
			display::print_error("No base collection selected");
			return;
		};

		self.store.update(&collection_id, id, name, filter);
		display::print_success(&format!("Updated filter {}", id));
	}

	fn cleanup(&mut self) -> Result<()> {
		self.history.save(&mut self.editor)
	}
}

fn get_env_filter() -> EnvFilter {
	if std::env::var_os("RUST_LOG").is_some() {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
	} else if cfg!(debug_assertions) {
		EnvFilter::new("keyloom=debug")
	} else {
		EnvFilter::new("keyloom=info")
	}
}

/// First positional argument, skipping the --config/-c flag and its value.
fn find_snapshot_arg(args: &[String]) -> Option<String> {
	let mut iter = args.iter().skip(1);
	while let Some(a) = iter.next() {
		if a == "--config" || a == "-c" {
			iter.next();
			continue;
		}
		if a.starts_with('-') {
			continue;
		}
		return Some(a.clone());
	}
	None
}

fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(get_env_filter())
		.with_target(false)
		.compact()
		.init();

	let args: Vec<String> = env::args().collect();
	let Some(snapshot_path) = find_snapshot_arg(&args) else {
		display::print_error("Usage: keyloom [--config <path>] <snapshot.json>");
		std::process::exit(1);
	};

	let config = Config::load_from_path("keyloom.toml")?;

	let payload = fs::read_to_string(&snapshot_path)
		.with_context(|| format!("Failed to read snapshot {}", snapshot_path))?;
	let snapshot = Snapshot::from_json(&payload)?;

	let store = SavedFilterStore::new(Box::new(FileBackend::new(&config.storage.data_dir)));

	let mut repl = Repl::new(snapshot, store)?;
	repl.run()?;

	Ok(())
}
