//! ## Printing Module
//!
//! Makes terminal logging easier to read. Messages are printed in a colour matching their
//! category, and every category can be switched off through the `PRINT_*_ON` toggles in
//! [crate::config]. It also provides a table format for the [WorldView].
use crate::config;
use crate::world_view::{Dirn, OperationState, WorldView};
use ansi_term::Colour::{self, Green, Purple, Red, Yellow};

use unicode_width::UnicodeWidthStr;

/// Prints a message in a specified color to the terminal.
///
/// If `PRINT_ELSE_ON` is `false`, the message will not be printed.
///
/// ## Parameters
/// - `msg`: The message to print.
/// - `color`: The color to use for the text output.
///
/// ## Example
/// ```
/// use ansi_term::Colour;
/// use liftsim::print;
///
/// print::color("Hello, World!".to_string(), Colour::Green);
/// ```
pub fn color(msg: String, color: Colour) {
    if config::print_enabled(&config::PRINT_ELSE_ON) {
        println!("{}{}\n", color.paint("[CUSTOM]:  "), color.paint(msg));
    }
}

/// Prints an error message in red to the terminal.
///
/// If `PRINT_ERR_ON` is `false`, the message will not be printed.
///
/// ## Terminal output
/// - "\[ERROR\]:   {}", msg
///
/// ## Example
/// ```
/// use liftsim::print;
///
/// print::err("Elevator #2 failed to dock".to_string());
/// ```
pub fn err(msg: String) {
    if config::print_enabled(&config::PRINT_ERR_ON) {
        println!("{}{}\n", Red.paint("[ERROR]:   "), Red.paint(msg));
    }
}

/// Prints a warning message in yellow to the terminal.
///
/// If `PRINT_WARN_ON` is `false`, the message will not be printed.
///
/// ## Terminal output
/// - "\[WARNING\]: {}", msg
pub fn warn(msg: String) {
    if config::print_enabled(&config::PRINT_WARN_ON) {
        println!("{}{}\n", Yellow.paint("[WARNING]: "), Yellow.paint(msg));
    }
}

/// Prints a success message in green to the terminal.
///
/// If `PRINT_OK_ON` is `false`, the message will not be printed.
///
/// ## Terminal output
/// - "\[OK\]:      {}", msg
pub fn ok(msg: String) {
    if config::print_enabled(&config::PRINT_OK_ON) {
        println!("{}{}\n", Green.paint("[OK]:      "), Green.paint(msg));
    }
}

/// Prints an informational message in light blue to the terminal.
///
/// If `PRINT_INFO_ON` is `false`, the message will not be printed.
///
/// ## Terminal output
/// - "\[INFO\]:    {}", msg
pub fn info(msg: String) {
    let light_blue = Colour::RGB(102, 178, 255);
    if config::print_enabled(&config::PRINT_INFO_ON) {
        println!("{}{}\n", light_blue.paint("[INFO]:    "), light_blue.paint(msg));
    }
}

/// Prints an error for something that should be impossible, with the message in rainbow colours.
///
/// Used when a controller task dies in a way no code path is meant to allow.
///
/// ## Terminal output
/// - "\[ERROR\]: Cosmic rays flipped a bit! IN: {fun}"
pub fn cosmic_err(fun: String) {
    if !config::print_enabled(&config::PRINT_ERR_ON) {
        return;
    }
    print!("{}", Colour::Red.paint("[ERROR]: "));

    let colors = [
        Colour::Red,
        Colour::Yellow,
        Colour::Green,
        Colour::Cyan,
        Colour::Blue,
        Colour::Purple,
    ];
    let message = format!("Cosmic rays flipped a bit! IN: {}", fun);
    for (i, c) in message.chars().enumerate() {
        let color = colors[i % colors.len()];
        print!("{}", color.paint(c.to_string()));
    }
    println!();
}

/// Pads the input text to a fixed display width using spaces.
///
/// Accounts for characters that take more than one column (arrows, symbols), so table columns
/// stay aligned.
///
/// # Returns
/// The text left-aligned and padded with spaces to `width` columns.
pub fn pad_text(text: &str, width: usize) -> String {
    let visible_width = UnicodeWidthStr::width(text);
    let padding = width.saturating_sub(visible_width);
    format!("{}{}", text, " ".repeat(padding))
}

/// Coloured, padded label for an operation state.
fn operation_label(state: OperationState, width: usize) -> String {
    match state {
        OperationState::Running => Green.paint(pad_text("Running", width)).to_string(),
        OperationState::Shutdown => Yellow.paint(pad_text("Shutdown", width)).to_string(),
        OperationState::Emergency => Red.bold().paint(pad_text("EMERGENCY", width)).to_string(),
    }
}

/// Arrow for a direction, padded.
fn dirn_label(dirn: Dirn, width: usize) -> String {
    let arrow = match dirn {
        Dirn::Up => "↑ Up",
        Dirn::Down => "↓ Down",
        Dirn::Idle => "· Idle",
    };
    pad_text(arrow, width)
}

/// Prints the current [WorldView] as a table.
///
/// Shows pending floor calls, every floor with waiting passengers, and one row per elevator
/// (state, direction, floor, load, task list).
///
/// # Behavior
/// - Exits early when `config::PRINT_WV_ON` is false.
/// - Floors with nobody waiting are left out to keep tall buildings readable.
pub fn worldview(worldview: &WorldView) {
    if !config::print_enabled(&config::PRINT_WV_ON) {
        return;
    }

    println!("{}", Purple.bold().paint("┌────────────────────────────────┐"));
    println!("{}", Purple.bold().paint("│        WORLD VIEW STATUS       │"));
    println!("{}", Purple.bold().paint("└────────────────────────────────┘"));

    println!("┌────────────────────────────────┐");
    println!("│ Pending calls: {} │", pad_text(&worldview.pending_calls.to_string(), 15));
    println!("│ Waiting:       {} │", pad_text(&worldview.waiting().to_string(), 15));
    println!("└────────────────────────────────┘");

    let busy_floors: Vec<_> = worldview
        .floors
        .iter()
        .filter(|f| f.waiting_up + f.waiting_down > 0)
        .collect();
    if !busy_floors.is_empty() {
        println!("┌───────┬────────┬────────┐");
        println!("│ Floor │ Up     │ Down   │");
        println!("├───────┼────────┼────────┤");
        for floor in busy_floors {
            println!(
                "│ {} │ {} │ {} │",
                pad_text(&floor.level.to_string(), 5),
                pad_text(&floor.waiting_up.to_string(), 6),
                pad_text(&floor.waiting_down.to_string(), 6),
            );
        }
        println!("└───────┴────────┴────────┘");
    }

    println!("┌──────┬───────────┬────────┬───────┬────────────┬──────────────────────┐");
    println!("│ ID   │ State     │ Dirn   │ Floor │ Load       │ Tasks                │");
    println!("├──────┼───────────┼────────┼───────┼────────────┼──────────────────────┤");
    for elev in &worldview.elevators {
        let load = format!("{}/{} {}kg", elev.occupants, elev.passenger_capacity, elev.load);
        let tasks = format!("{:?}", elev.tasks);
        println!(
            "│ {} │ {} │ {} │ {} │ {} │ {} │",
            pad_text(&elev.id.to_string(), 4),
            operation_label(elev.operation, 9),
            dirn_label(elev.dirn, 6),
            pad_text(&elev.current_floor.to_string(), 5),
            pad_text(&load, 10),
            pad_text(&tasks, 20),
        );
    }
    println!("└──────┴───────────┴────────┴───────┴────────────┴──────────────────────┘");
}
