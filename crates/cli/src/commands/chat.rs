//! `cornerman chat` — Interactive console assistant.

use cornerman_config::AppConfig;
use cornerman_core::message::Role;
use cornerman_core::text::truncate_chars;
use std::io::{BufRead, Write};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let mut agent = super::build_agent(&config)?;

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║        Cornerman — Asistente {:<16}║", config.brand);
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Modelo:  {}", config.chat.model);
    println!("  Índice:  {}", config.index.dir.display());
    println!();
    println!("  Comandos:");
    println!("    salir     - Terminar");
    println!("    limpiar   - Borrar memoria");
    println!("    historial - Ver conversación");
    println!();
    println!("  Ejemplos:");
    println!("    ¿Qué guantes recomiendas?");
    println!("    Calcula 15% descuento en $50000");
    println!("    ¿Cuál es la política de devolución?");
    println!();

    let stdin = std::io::stdin();
    print!("  Tú > ");
    std::io::stdout().flush()?;

    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();

        match input.to_lowercase().as_str() {
            "salir" | "exit" | "quit" | "q" => break,
            "limpiar" | "clear" | "reset" => {
                agent.clear_memory();
                println!();
                println!("  🧹 Memoria limpiada");
                println!();
            }
            "historial" | "history" | "h" => {
                print_history(&agent);
            }
            "" => {}
            _ => {
                let reply = agent.process(input).await;
                println!();
                for reply_line in reply.lines() {
                    println!("  Asistente > {reply_line}");
                }
                println!();
            }
        }

        print!("  Tú > ");
        std::io::stdout().flush()?;
    }

    println!();
    println!("  ¡Hasta luego! 👋");
    println!();
    Ok(())
}

fn print_history(agent: &cornerman_agent::ReasoningAgent) {
    println!();
    println!("  HISTORIAL ({} mensajes):", agent.memory().len());
    if agent.memory().is_empty() {
        println!("  (vacío)");
    }
    for (i, message) in agent.memory().entries().iter().enumerate() {
        let role = match message.role {
            Role::User => "TÚ",
            Role::Assistant => "ASISTENTE",
            Role::System => "SISTEMA",
        };
        let preview = truncate_chars(&message.content, 300, "...");
        println!("  {}. {role}: {preview}", i + 1);
    }
    println!();
}
