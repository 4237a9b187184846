//! Question prompt loop.

use dialoguer::Input;
use samarth_assistant::QueryEngine;

use crate::render::render_answer;

/// Prompts for questions until the user enters an empty line or `exit`.
///
/// # Errors
///
/// Returns an error if the terminal prompt fails.
pub fn run(engine: &QueryEngine) -> Result<(), Box<dyn std::error::Error>> {
    println!("Ask about crop production and rainfall. Empty line or 'exit' quits.");

    loop {
        println!();
        let question: String = Input::new()
            .with_prompt("Question")
            .allow_empty(true)
            .interact_text()?;
        let question = question.trim();

        if question.is_empty() || question.eq_ignore_ascii_case("exit") {
            break;
        }

        match engine.answer_query(question) {
            Ok(answer) => println!("{}", render_answer(&answer)),
            Err(e) => {
                println!("{e}");
                println!("{}", e.guidance());
            }
        }
    }

    Ok(())
}
