use mirrorboard_domain::{Board, BoardNotFound, Card};
use mirrorboard_sync::{MutationKind, MutationOutcome, Presenter};
use serde::Serialize;
use std::fmt::Write;

#[derive(Serialize)]
pub struct CliResponse<T: Serialize> {
    pub success: bool,
    pub api_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct ListResponse<T: Serialize> {
    pub items: Vec<T>,
    pub count: usize,
}

fn to_json<T: Serialize>(response: &CliResponse<T>) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        format!(r#"{{"success":false,"error":"failed to encode response: {}"}}"#, e)
    })
}

pub fn output_success<T: Serialize>(data: T) {
    let response = CliResponse {
        success: true,
        api_version: env!("CARGO_PKG_VERSION"),
        data: Some(data),
        error: None,
    };
    println!("{}", to_json(&response));
}

pub fn output_list<T: Serialize>(items: Vec<T>) {
    let count = items.len();
    let list = ListResponse { items, count };
    output_success(list);
}

/// Prints an error response to stderr and exits with status 1.
pub fn output_error(message: &str) -> ! {
    let response: CliResponse<()> = CliResponse {
        success: false,
        api_version: env!("CARGO_PKG_VERSION"),
        data: None,
        error: Some(message.to_string()),
    };
    eprintln!("{}", to_json(&response));
    std::process::exit(1);
}

pub fn placeholder(missing: &BoardNotFound) -> String {
    format!(
        "Board not found or not loaded yet ({})",
        missing.reference
    )
}

fn render_card(out: &mut String, card: &Card) {
    let _ = writeln!(out, "  - {} [{}]", card.name, card.id);
    if let Some(description) = &card.description {
        for line in description.lines() {
            let _ = writeln!(out, "      {}", line);
        }
    }
    if let Some(due) = card.due_date {
        let _ = writeln!(out, "      due {}", due.format("%Y-%m-%d %H:%M"));
    }
}

/// Plain-text board: one section per list in display order.
pub fn render_board(board: &Board) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", board.name);
    for list in &board.lists {
        let _ = writeln!(out, "== {} ({}) ==", list.name, list.card_count);
        for card in &list.cards {
            render_card(&mut out, card);
        }
    }
    out
}

/// Prints every redraw to stdout and settlement notices to stderr.
pub struct TerminalPresenter;

impl Presenter for TerminalPresenter {
    fn on_snapshot_changed(&self, board: &Board) {
        println!("--- {} ---", chrono::Local::now().format("%H:%M:%S"));
        print!("{}", render_board(board));
    }

    fn on_board_missing(&self, missing: &BoardNotFound) {
        println!("{}", placeholder(missing));
    }

    fn on_mutation_settled(&self, kind: MutationKind, outcome: &MutationOutcome) {
        if let Some(message) = outcome.notification(kind) {
            eprintln!("{}", message);
        }
    }
}
