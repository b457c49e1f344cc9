use super::AppContext;
use super::output::{print_error, print_message};
use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use ephone_application::{ChatSession, SendOutcome};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

#[derive(Subcommand, Debug)]
pub enum ChatAction {
    /// Send one message and print the reply
    Send {
        #[arg(required = true, trailing_var_arg = true)]
        message: Vec<String>,
    },
    /// Print the saved transcript
    History,
    /// Ask again for a reply to the last unanswered message
    Retry,
    /// Delete the transcript
    Clear,
}

/// Runs a chat subcommand, or the interactive REPL when none is given.
pub async fn run(ctx: &AppContext, action: Option<ChatAction>) -> Result<()> {
    let chat = ctx.chat().await;
    attach_products(ctx, &chat).await;

    match action {
        None => repl(&chat).await?,
        Some(ChatAction::Send { message }) => {
            let outcome = chat.send_message(&message.join(" ")).await;
            report(&chat, outcome);
        }
        Some(ChatAction::History) => {
            let messages = chat.messages();
            if messages.is_empty() {
                println!("{}", "No messages yet.".bright_black());
            }
            messages.iter().for_each(print_message);
        }
        Some(ChatAction::Retry) => {
            let outcome = chat.retry().await;
            report(&chat, outcome);
        }
        Some(ChatAction::Clear) => {
            chat.clear_chat().await;
            println!("{}", "Chat history cleared".green());
        }
    }

    chat.flush().await;
    Ok(())
}

/// Gives the assistant the catalog as context; chat still works without it.
async fn attach_products(ctx: &AppContext, chat: &ChatSession) {
    match ctx.loaded_feed().await {
        Ok(feed) => chat.set_product_context(feed.catalog().to_vec()),
        Err(err) => tracing::warn!(error = %err, "Chatting without product context"),
    }
}

async fn repl(chat: &ChatSession) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    println!("{}", "=== e-phone Shopping Assistant ===".bright_magenta().bold());
    println!(
        "{}",
        "Ask about products. '/retry', '/clear', '/history', or 'quit' to exit.".bright_black()
    );
    println!();

    for message in chat.messages() {
        print_message(&message);
    }

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "quit" || trimmed == "exit" {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match trimmed {
                    "/retry" => report(chat, chat.retry().await),
                    "/clear" => {
                        chat.clear_chat().await;
                        println!("{}", "Chat history cleared".green());
                    }
                    "/history" => chat.messages().iter().for_each(print_message),
                    _ => report(chat, chat.send_message(trimmed).await),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                print_error(&format!("Error: {err:?}"));
                break;
            }
        }
    }

    Ok(())
}

fn report(chat: &ChatSession, outcome: SendOutcome) {
    match outcome {
        SendOutcome::Replied(message) => print_message(&message),
        SendOutcome::Failed(err) => {
            tracing::debug!(error = %err, "Chat reply failed");
            let message = chat.last_error().unwrap_or_else(|| err.to_string());
            print_error(&message);
        }
        SendOutcome::Busy => print_error("Still waiting for the previous reply."),
        SendOutcome::Ignored => println!("{}", "Nothing to send.".bright_black()),
        SendOutcome::Cancelled => println!("{}", "Reply discarded.".bright_black()),
    }
}
