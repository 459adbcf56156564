//! Welcome banner display for chat sessions.

use console::style;

use parley_types::preset::RolePreset;

/// Print the welcome banner at the start of a chat session.
pub fn print_welcome_banner(model: &str, role: RolePreset, session_id: &str, streaming: bool) {
    println!();
    println!("  {} {}", "*", style("Parley").cyan().bold());
    println!("  {}", style(role.label()).dim());
    println!();
    println!("  {}  {}", style("Model:").bold(), style(model).dim());
    println!(
        "  {}   {}",
        style("Role:").bold(),
        style(format!("{} ({})", role.label(), role.slug())).dim()
    );
    println!(
        "  {}  {}",
        style("Session:").bold(),
        style(&session_id[..8.min(session_id.len())]).dim()
    );
    if !streaming {
        println!("  {}  {}", style("Stream:").bold(), style("off").dim());
    }
    println!();
    println!(
        "  {}",
        style("Type /help for commands, Ctrl+D to exit").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}
