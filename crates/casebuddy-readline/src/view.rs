//! Terminal rendering of conversation snapshots.

use std::collections::HashMap;

use colored::{ColoredString, Colorize};

use casebuddy_application::engine::THINKING_TEXT;
use casebuddy_application::render::{StatsLayer, TimelineLayer, TranscriptEntry};
use casebuddy_application::{CardKey, ConversationSnapshot, NavigatorRegistry, render_transcript};
use casebuddy_core::card::stats::StatsBody;
use casebuddy_core::navigator::{SIMULATOR_TITLE, SimulatorView};
use casebuddy_core::session::MessageRole;

/// Prints each message once, and again whenever its content changes (a
/// placeholder being resolved).
pub struct TerminalView {
    printed: HashMap<String, String>,
    thinking_shown: bool,
    last_error: Option<String>,
    pink_mode: bool,
    registry: NavigatorRegistry,
}

impl TerminalView {
    pub fn new() -> Self {
        Self {
            printed: HashMap::new(),
            thinking_shown: false,
            last_error: None,
            pink_mode: false,
            registry: NavigatorRegistry::new(),
        }
    }

    pub fn render(&mut self, snapshot: &ConversationSnapshot) {
        self.pink_mode = snapshot.pink_mode;

        let entries = render_transcript(snapshot.transcript.messages());
        self.registry.sync(&entries);

        for entry in &entries {
            if self.printed.get(&entry.message_id) == Some(&entry.content) {
                continue;
            }
            self.print_entry(entry);
            self.printed
                .insert(entry.message_id.clone(), entry.content.clone());
        }

        if snapshot.show_thinking() && !self.thinking_shown {
            println!("{}", THINKING_TEXT.bright_black().italic());
        }
        self.thinking_shown = snapshot.show_thinking();

        if snapshot.last_error != self.last_error {
            if let Some(error) = &snapshot.last_error {
                eprintln!("{}", format!("! {}", error).red());
            }
            self.last_error = snapshot.last_error.clone();
        }
    }

    /// Activates choice `n` (1-based) on the latest simulator card.
    pub fn activate_simulator(&mut self, n: usize) {
        let Some(navigator) = self.registry.latest_mut() else {
            println!("{}", "No simulator to drive yet.".bright_black());
            return;
        };
        if !navigator.activate(n - 1) {
            println!("{}", format!("Choice {} is not available.", n).bright_black());
            return;
        }
        self.print_latest_simulator();
    }

    pub fn simulator_back(&mut self) {
        let Some(navigator) = self.registry.latest_mut() else {
            println!("{}", "No simulator to drive yet.".bright_black());
            return;
        };
        if !navigator.back() {
            println!("{}", "Already at the first step.".bright_black());
            return;
        }
        self.print_latest_simulator();
    }

    fn print_latest_simulator(&self) {
        if let Some(navigator) = self
            .registry
            .latest_key()
            .and_then(|key| self.registry.get(key))
        {
            print_simulator(&navigator.view());
        }
    }

    fn assistant_text(&self, text: &str) -> ColoredString {
        if self.pink_mode {
            text.magenta()
        } else {
            text.bright_blue()
        }
    }

    fn print_entry(&self, entry: &TranscriptEntry) {
        if entry.role == MessageRole::User {
            println!("{}", format!("> {}", entry.content).green());
            return;
        }

        for layer in &entry.timelines {
            print_timeline(layer);
        }
        for layer in &entry.stats {
            print_stats(layer);
        }

        for line in entry.content.lines() {
            println!("{}", self.assistant_text(line));
        }

        for layer in &entry.simulators {
            let key = CardKey::new(entry.message_id.clone(), layer.card_index);
            if let Some(navigator) = self.registry.get(&key) {
                print_simulator(&navigator.view());
            }
        }

        if entry.inert_cards > 0 {
            tracing::debug!(
                "Message {} carries {} unrendered card(s)",
                entry.message_id,
                entry.inert_cards
            );
        }
        println!();
    }
}

fn print_timeline(layer: &TimelineLayer) {
    let view = &layer.view;
    let heading = if view.stage.is_empty() {
        "Timeline".to_string()
    } else {
        format!("Timeline · {}", view.stage)
    };
    println!("{}", heading.bright_yellow().bold());

    for row in &layer.layout.rows {
        let mut line = row.title.clone();
        if let Some(date) = &row.date {
            line.push_str(&format!("  ({})", date));
        }
        if row.is_now {
            println!("  {} {}", "◉".bright_yellow(), format!("{}  ← now", line).bold());
        } else {
            println!("  {} {}", "●".bright_black(), line);
        }
        if let Some(subtitle) = &row.subtitle {
            println!("      {}", subtitle.bright_black());
        }
    }

    if let Some(context) = &view.context {
        println!("  {}", context.title.yellow());
        println!("  {}", context.subtitle.bright_black());
        for bullet in &context.bullets {
            println!("    - {}", bullet);
        }
    }
    for warning in &view.warnings {
        println!("  {}", warning.yellow());
    }
}

fn print_stats(layer: &StatsLayer) {
    let view = &layer.view;
    println!("{}", view.title.bright_yellow().bold());
    if !view.subtitle.is_empty() {
        println!("  {}", view.subtitle.bright_black());
    }

    match &view.body {
        StatsBody::Chart { .. } => {
            for slice in &layer.slices {
                println!(
                    "  {:<18} {:>6.1}%  {}",
                    slice.label,
                    slice.value,
                    format!("{:.0}°", slice.span().to_degrees()).bright_black()
                );
            }
        }
        StatsBody::NoData { message } => println!("  {}", message.bright_black()),
    }

    if let Some(footer) = view.footer {
        println!("  {}", footer.bright_black().italic());
    }
}

fn print_simulator(view: &SimulatorView) {
    match view {
        SimulatorView::Node {
            stage_label,
            title,
            body,
            choices,
            can_back,
            ..
        } => {
            println!(
                "{}",
                format!("{} · {}", SIMULATOR_TITLE, stage_label)
                    .bright_cyan()
                    .bold()
            );
            println!("  {}", title.bold());
            if let Some(body) = body {
                for line in body.lines() {
                    println!("  {}", line);
                }
            }
            for (index, choice) in choices.iter().enumerate() {
                let line = format!("  {}. {}", index + 1, choice.label);
                if choice.enabled {
                    println!("{}", line.cyan());
                } else {
                    println!("{}", line.bright_black().strikethrough());
                }
            }
            if *can_back {
                println!("{}", "  /back to go up a step".bright_black());
            }
            if let Some(crumb) = view.crumb() {
                println!("  {}", crumb.bright_black());
            }
        }
        SimulatorView::DataMissing {
            stage_label,
            message,
        } => {
            println!(
                "{}",
                format!("{} · {}", SIMULATOR_TITLE, stage_label)
                    .bright_cyan()
                    .bold()
            );
            println!("  {}", message.red());
        }
    }
}
